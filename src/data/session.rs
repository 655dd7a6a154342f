//! Login session data access object

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use super::database::format_timestamp;
use super::models::User;
use super::{Database, DatabaseError, UserStore};

/// Data access object for login sessions.
///
/// Rows are keyed by the SHA-256 digest of the cookie token; the token
/// itself never reaches the database.
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(
        &self,
        token_hash: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    token_hash,
                    user_id,
                    format_timestamp(Utc::now()),
                    format_timestamp(expires_at),
                ],
            )?;
            Ok(())
        })
    }

    /// The user owning an unexpired session
    pub fn find_user(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, DatabaseError> {
        self.db.with_connection(|conn| {
            conn.query_row(
                "SELECT u.id, u.username, u.password_hash, u.created_at
                 FROM sessions s JOIN users u ON u.id = s.user_id
                 WHERE s.token_hash = ?1 AND s.expires_at > ?2",
                params![token_hash, format_timestamp(now)],
                UserStore::row_to_user,
            )
            .optional()
        })
    }

    pub fn delete(&self, token_hash: &str) -> Result<(), DatabaseError> {
        self.db.with_connection(|conn| {
            conn.execute(
                "DELETE FROM sessions WHERE token_hash = ?1",
                params![token_hash],
            )?;
            Ok(())
        })
    }

    /// Remove expired sessions, returning how many were dropped
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
        self.db.with_connection(|conn| {
            conn.execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![format_timestamp(now)],
            )
        })
    }
}

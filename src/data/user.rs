//! User data access object

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use super::database::{format_timestamp, is_constraint_violation, parse_timestamp};
use super::models::User;
use super::{Database, DatabaseError};

/// Data access object for User operations
#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new user. Fails with `DatabaseError::Conflict` when the
    /// username is already registered.
    pub fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let created_at = Utc::now();
        let result = self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
                params![username, password_hash, format_timestamp(created_at)],
            )?;
            Ok(conn.last_insert_rowid())
        });

        match result {
            Ok(id) => Ok(User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                created_at,
            }),
            Err(DatabaseError::Sqlite(e)) if is_constraint_violation(&e) => Err(
                DatabaseError::Conflict(format!("username '{}' is already taken", username)),
            ),
            Err(e) => Err(e),
        }
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        self.db.with_connection(|conn| {
            conn.query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                params![id],
                Self::row_to_user,
            )
            .optional()
        })
    }

    /// Usernames are matched exactly (case-sensitive)
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        self.db.with_connection(|conn| {
            conn.query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                params![username],
                Self::row_to_user,
            )
            .optional()
        })
    }

    pub fn count(&self) -> Result<u64, DatabaseError> {
        let count: i64 = self.db.with_connection(|conn| {
            conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        })?;
        Ok(count.max(0) as u64)
    }

    pub(super) fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            password_hash: row.get(2)?,
            created_at: parse_timestamp(&created_at),
        })
    }
}

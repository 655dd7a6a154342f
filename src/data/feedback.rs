//! Feedback data access object

use chrono::Utc;
use rusqlite::params;

use super::database::{format_timestamp, parse_timestamp};
use super::models::{Feedback, NewFeedback};
use super::{Database, DatabaseError};

#[derive(Clone)]
pub struct FeedbackStore {
    db: Database,
}

impl FeedbackStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn create(&self, feedback: &NewFeedback) -> Result<Feedback, DatabaseError> {
        let created_at = Utc::now();
        let id = self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO feedback (user_id, name, email, message, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    feedback.user_id,
                    feedback.name,
                    feedback.email,
                    feedback.message,
                    format_timestamp(created_at),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Feedback {
            id,
            user_id: feedback.user_id,
            name: feedback.name.clone(),
            email: feedback.email.clone(),
            message: feedback.message.clone(),
            created_at,
        })
    }

    /// Most recent feedback first
    pub fn recent(&self, limit: u32) -> Result<Vec<Feedback>, DatabaseError> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, name, email, message, created_at
                 FROM feedback ORDER BY created_at DESC, id DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map(params![limit], |row| {
                    let created_at: String = row.get(5)?;
                    Ok(Feedback {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        name: row.get(2)?,
                        email: row.get(3)?,
                        message: row.get(4)?,
                        created_at: parse_timestamp(&created_at),
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

//! Task data access object

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::database::{format_timestamp, parse_timestamp, LOWER_FN};
use super::models::{clamp_page, NewTask, Task, TaskChanges, TaskPage, TaskQuery, TaskStatusFilter};
use super::{Database, DatabaseError};

const TASK_COLUMNS: &str = "id, user_id, title, description, completed, created_at, updated_at";

/// Data access object for Task operations.
///
/// Every read and write other than `list_all` is scoped to an owning user; a
/// task that belongs to someone else behaves exactly like a missing one.
#[derive(Clone)]
pub struct TaskStore {
    db: Database,
}

impl TaskStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new, not yet completed task
    pub fn create(&self, user_id: i64, task: &NewTask) -> Result<Task, DatabaseError> {
        let now = Utc::now();
        let id = self.db.with_connection(|conn| {
            conn.execute(
                "INSERT INTO tasks (user_id, title, description, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, 0, ?4, ?4)",
                params![user_id, task.title, task.description, format_timestamp(now)],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        Ok(Task {
            id,
            user_id,
            title: task.title.clone(),
            description: task.description.clone(),
            completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_for_user(&self, id: i64, user_id: i64) -> Result<Option<Task>, DatabaseError> {
        self.db
            .with_connection(|conn| Self::fetch_owned(conn, id, user_id))
    }

    /// Replace the editable fields of a task. Returns the updated task, or
    /// `None` when the user owns no such task.
    pub fn update_for_user(
        &self,
        id: i64,
        user_id: i64,
        changes: &TaskChanges,
    ) -> Result<Option<Task>, DatabaseError> {
        self.db.with_connection(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET title = ?3, description = ?4, completed = ?5, updated_at = ?6
                 WHERE id = ?1 AND user_id = ?2",
                params![
                    id,
                    user_id,
                    changes.title,
                    changes.description,
                    changes.completed,
                    format_timestamp(Utc::now()),
                ],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            Self::fetch_owned(conn, id, user_id)
        })
    }

    /// Flip the completion state of a task
    pub fn toggle_for_user(&self, id: i64, user_id: i64) -> Result<Option<Task>, DatabaseError> {
        self.db.with_connection(|conn| {
            let updated = conn.execute(
                "UPDATE tasks SET completed = NOT completed, updated_at = ?3
                 WHERE id = ?1 AND user_id = ?2",
                params![id, user_id, format_timestamp(Utc::now())],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            Self::fetch_owned(conn, id, user_id)
        })
    }

    /// Delete a task. Returns whether a row was removed.
    pub fn delete_for_user(&self, id: i64, user_id: i64) -> Result<bool, DatabaseError> {
        let removed = self.db.with_connection(|conn| {
            conn.execute(
                "DELETE FROM tasks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
        })?;
        Ok(removed > 0)
    }

    /// One page of the user's tasks matching the query's search and filter
    pub fn list_for_user(&self, user_id: i64, query: &TaskQuery) -> Result<TaskPage, DatabaseError> {
        let mut clauses = vec!["user_id = ?".to_string()];
        let mut values = vec![Value::Integer(user_id)];

        match query.status {
            TaskStatusFilter::All => {}
            TaskStatusFilter::Completed => clauses.push("completed = 1".to_string()),
            TaskStatusFilter::Pending => clauses.push("completed = 0".to_string()),
        }

        if let Some(term) = query.search_term() {
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            clauses.push(format!(
                "({f}(title) LIKE ? ESCAPE '\\' OR {f}(IFNULL(description, '')) LIKE ? ESCAPE '\\')",
                f = LOWER_FN
            ));
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }

        let where_clause = clauses.join(" AND ");
        let per_page = query.per_page.max(1);

        self.db.with_connection(|conn| {
            let total: i64 = conn.query_row(
                &format!("SELECT COUNT(*) FROM tasks WHERE {}", where_clause),
                params_from_iter(values.iter()),
                |row| row.get(0),
            )?;
            let total = total.max(0) as u64;
            let page = clamp_page(query.page, total, per_page);
            let offset = i64::from(page - 1) * i64::from(per_page);

            let mut page_values = values.clone();
            page_values.push(Value::Integer(i64::from(per_page)));
            page_values.push(Value::Integer(offset));

            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM tasks WHERE {} ORDER BY {} LIMIT ? OFFSET ?",
                TASK_COLUMNS,
                where_clause,
                query.sort.order_by()
            ))?;
            let tasks = stmt
                .query_map(params_from_iter(page_values.iter()), Self::row_to_task)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(TaskPage {
                tasks,
                total,
                page,
                per_page,
            })
        })
    }

    /// Every task in the database, oldest first
    pub fn list_all(&self) -> Result<Vec<Task>, DatabaseError> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM tasks ORDER BY id ASC",
                TASK_COLUMNS
            ))?;
            let tasks = stmt
                .query_map([], Self::row_to_task)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    fn fetch_owned(conn: &Connection, id: i64, user_id: i64) -> rusqlite::Result<Option<Task>> {
        conn.query_row(
            &format!(
                "SELECT {} FROM tasks WHERE id = ?1 AND user_id = ?2",
                TASK_COLUMNS
            ),
            params![id, user_id],
            Self::row_to_task,
        )
        .optional()
    }

    fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
        let created_at: String = row.get(5)?;
        let updated_at: String = row.get(6)?;
        Ok(Task {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            completed: row.get(4)?,
            created_at: parse_timestamp(&created_at),
            updated_at: parse_timestamp(&updated_at),
        })
    }
}

/// Escape LIKE wildcards so user text matches literally (used with `ESCAPE '\'`)
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

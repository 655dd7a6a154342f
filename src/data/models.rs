//! Data models for users, tasks and feedback

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// PHC-formatted password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A task owned by exactly one user
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Full replacement of a task's editable fields
#[derive(Debug, Clone)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Completion filter for task listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatusFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl TaskStatusFilter {
    pub const ALL: [TaskStatusFilter; 3] = [Self::All, Self::Completed, Self::Pending];

    /// Parse a query-string value. Unknown values mean `All`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "completed" | "done" => Self::Completed,
            "pending" | "open" => Self::Pending,
            _ => Self::All,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Completed => "Completed",
            Self::Pending => "Pending",
        }
    }
}

/// Ordering for task listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskSort {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl TaskSort {
    pub const ALL: [TaskSort; 3] = [Self::Newest, Self::Oldest, Self::Title];

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "oldest" => Self::Oldest,
            "title" => Self::Title,
            _ => Self::Newest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Title => "title",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Newest => "Newest first",
            Self::Oldest => "Oldest first",
            Self::Title => "Title",
        }
    }

    pub(crate) fn order_by(&self) -> &'static str {
        match self {
            Self::Newest => "created_at DESC, id DESC",
            Self::Oldest => "created_at ASC, id ASC",
            Self::Title => "title COLLATE NOCASE ASC, id ASC",
        }
    }
}

/// Search, filter and paging parameters for a task listing
#[derive(Debug, Clone)]
pub struct TaskQuery {
    pub search: Option<String>,
    pub status: TaskStatusFilter,
    pub sort: TaskSort,
    /// 1-based page number; 0 is treated as 1
    pub page: u32,
    pub per_page: u32,
}

impl Default for TaskQuery {
    fn default() -> Self {
        Self {
            search: None,
            status: TaskStatusFilter::All,
            sort: TaskSort::Newest,
            page: 1,
            per_page: 5,
        }
    }
}

impl TaskQuery {
    /// The search text, if it contains anything besides whitespace
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One page of a task listing
#[derive(Debug, Clone)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    /// Number of tasks matching the query across all pages
    pub total: u64,
    /// The page actually returned, after clamping
    pub page: u32,
    pub per_page: u32,
}

impl TaskPage {
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.per_page)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

/// Number of pages needed for `total` rows, never less than 1
pub fn total_pages(total: u64, per_page: u32) -> u32 {
    let per_page = u64::from(per_page.max(1));
    let pages = total.div_ceil(per_page).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Clamp a requested page into `1..=total_pages`
pub fn clamp_page(requested: u32, total: u64, per_page: u32) -> u32 {
    requested.clamp(1, total_pages(total, per_page))
}

/// A submitted feedback message
#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub user_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub message: String,
}

//! Data persistence layer for taskdesk
//!
//! This module provides SQLite-based storage for users, tasks, login
//! sessions and feedback.

mod database;
mod feedback;
mod migrations;
mod models;
mod session;
mod task;
mod user;

pub use database::{Database, DatabaseError};
pub use feedback::FeedbackStore;
pub use models::{
    clamp_page, total_pages, Feedback, NewFeedback, NewTask, Task, TaskChanges, TaskPage,
    TaskQuery, TaskSort, TaskStatusFilter, User,
};
pub use session::SessionStore;
pub use task::TaskStore;
pub use user::UserStore;

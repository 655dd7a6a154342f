pub mod auth;
pub mod cli;
pub mod config;
pub mod data;
pub mod util;
pub mod web;

pub use auth::{AuthError, AuthService};
pub use config::Config;
pub use data::{
    Database, DatabaseError, FeedbackStore, NewTask, Task, TaskQuery, TaskStore, User, UserStore,
};
pub use web::{build_router, AppState};

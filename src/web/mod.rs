//! Browser-facing HTTP layer: router, handlers, templates and session cookies.

pub mod error;
pub mod flash;
pub mod forms;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod session;
pub mod state;
pub mod views;

pub use error::WebError;
pub use server::{bind_listener, build_router, run_server};
pub use state::AppState;

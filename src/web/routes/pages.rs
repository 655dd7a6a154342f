//! HTML page route definitions.

use axum::{
    routing::{get, post},
    Router,
};

use crate::web::handlers::{auth, feedback, home, tasks};
use crate::web::state::AppState;

/// Build the router with every server-rendered page.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        // Account routes
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        // Task routes
        .route("/tasks", get(tasks::list_tasks))
        .route(
            "/tasks/new",
            get(tasks::new_task_form).post(tasks::create_task),
        )
        .route(
            "/tasks/{id}/edit",
            get(tasks::edit_task_form).post(tasks::update_task),
        )
        .route("/tasks/{id}/toggle", post(tasks::toggle_task))
        .route("/tasks/{id}/delete", post(tasks::delete_task))
        // Feedback routes
        .route(
            "/feedback",
            get(feedback::feedback_form).post(feedback::submit_feedback),
        )
}

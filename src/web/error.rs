//! Web error types for the taskdesk server.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::auth::AuthError;
use crate::data::DatabaseError;

use super::views::{ErrorPage, Layout};

/// Error type for request handlers.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Resource not found (or owned by someone else).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with validation error.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Internal(_) | WebError::Database(_) | WebError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AuthError> for WebError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Database(e) => WebError::Database(e),
            AuthError::Hashing(msg) => WebError::Internal(msg),
            other => WebError::BadRequest(other.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (heading, message) = match &self {
            WebError::NotFound(msg) => ("Not Found", msg.clone()),
            WebError::BadRequest(msg) => ("Bad Request", msg.clone()),
            WebError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                ("Internal Server Error", "Something went wrong.".to_string())
            }
            WebError::Database(e) => {
                tracing::error!("Database error: {}", e);
                ("Internal Server Error", "Something went wrong.".to_string())
            }
            WebError::Template(e) => {
                tracing::error!("Template error: {}", e);
                ("Internal Server Error", "Something went wrong.".to_string())
            }
        };

        error_page(status, heading, &message)
    }
}

/// Render the HTML error page, degrading to plain text if that fails too
pub fn error_page(status: StatusCode, heading: &str, message: &str) -> Response {
    let page = ErrorPage {
        layout: Layout::default(),
        status: status.as_u16(),
        heading: heading.to_string(),
        message: message.to_string(),
    };
    match page.render() {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render error page: {}", e);
            (status, format!("{}: {}", heading, message)).into_response()
        }
    }
}

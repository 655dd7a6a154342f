//! Axum web server implementation for taskdesk.

use anyhow::Context;
use axum::{http::StatusCode, response::Response, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::error::error_page;
use super::routes::pages::page_routes;
use super::routes::static_files::serve_static_file;
use super::state::AppState;

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Health check endpoint handler.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> Response {
    error_page(
        StatusCode::NOT_FOUND,
        "Not Found",
        "The page you were looking for does not exist.",
    )
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(page_routes())
        .route("/health", get(health))
        .route("/static/{*path}", get(serve_static_file))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind the configured listener. `host` may be an IP address or a hostname.
pub async fn bind_listener(server: &ServerConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind((server.host.as_str(), server.port)).await
}

/// Run the web server.
///
/// This starts the Axum server and blocks until Ctrl-C.
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let server = &state.config().server;
    let listener = bind_listener(server)
        .await
        .with_context(|| format!("Failed to bind {}:{}", server.host, server.port))?;
    let app = build_router(state);

    tracing::info!("Starting web server at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::data::{Database, NewTask, User};
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        AppState::new(db, Config::default().with_per_page(2))
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_request(uri: &str, body: &str, cookies: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str, cookies: &str) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if !cookies.is_empty() {
            builder = builder.header(header::COOKIE, cookies);
        }
        builder.body(Body::empty()).unwrap()
    }

    /// `name=value` pairs from every Set-Cookie header that isn't a removal
    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| !v.contains("Max-Age=0"))
            .filter_map(|v| v.split(';').next())
            .map(str::to_string)
            .collect()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    /// Register and log in, returning the user and the session cookie pair
    async fn login_cookie(state: &AppState, username: &str) -> (User, String) {
        let user = state
            .auth()
            .register(username, "secret1", "secret1")
            .unwrap();
        let response = build_router(state.clone())
            .oneshot(form_request(
                "/login",
                &format!("username={}&password=secret1", username),
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let cookie = set_cookies(&response)
            .into_iter()
            .find(|c| c.starts_with("taskdesk_session="))
            .expect("session cookie");
        (user, cookie)
    }

    #[tokio::test]
    async fn test_bind_accepts_hostname() {
        let server = Config::default().with_host("localhost").with_port(0).server;

        let listener = bind_listener(&server).await.unwrap();

        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_run_server_on_hostname_keeps_serving() {
        let db = Database::open_in_memory().unwrap();
        let state = AppState::new(db, Config::default().with_host("localhost").with_port(0));

        // Still running after the timeout means bind succeeded
        let outcome =
            tokio::time::timeout(std::time::Duration::from_millis(300), run_server(state)).await;

        assert!(outcome.is_err(), "server exited early: {:?}", outcome);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = build_router(test_state());

        let response = app.oneshot(get_request("/health", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("ok"));
    }

    #[tokio::test]
    async fn test_home_page() {
        let app = build_router(test_state());

        let response = app.oneshot(get_request("/", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Welcome to the Task Management App!"));
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let app = build_router(test_state());

        let response = app.oneshot(get_request("/nope", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_assets() {
        let state = test_state();

        let response = build_router(state.clone())
            .oneshot(get_request("/static/script.js", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get(header::CONTENT_TYPE).unwrap();
        assert!(content_type.to_str().unwrap().contains("javascript"));

        let response = build_router(state)
            .oneshot(get_request("/static/missing.css", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tasks_require_login() {
        let app = build_router(test_state());

        let response = app.oneshot(get_request("/tasks?page=2", "")).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?next=%2Ftasks%3Fpage%3D2");
        assert!(set_cookies(&response)
            .iter()
            .any(|c| c.starts_with("taskdesk_flash=")));
    }

    #[tokio::test]
    async fn test_register_flow() {
        let state = test_state();

        let response = build_router(state.clone())
            .oneshot(form_request(
                "/register",
                "username=alice&password=secret1&confirm_password=secret1",
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        // Flash is shown once on the login page
        let flash = set_cookies(&response).join("; ");
        let response = build_router(state.clone())
            .oneshot(get_request("/login", &flash))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Registration successful. Please log in."));

        let response = build_router(state)
            .oneshot(form_request(
                "/register",
                "username=alice&password=secret1&confirm_password=secret1",
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Username is already taken"));
        assert!(html.contains("value=\"alice\""));
    }

    #[tokio::test]
    async fn test_register_validation_keeps_username() {
        let app = build_router(test_state());

        let response = app
            .oneshot(form_request(
                "/register",
                "username=bobby&password=secret1&confirm_password=different",
                "",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Passwords do not match."));
        assert!(html.contains("value=\"bobby\""));
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let state = test_state();
        state.auth().register("alice", "secret1", "secret1").unwrap();

        let response = build_router(state)
            .oneshot(form_request("/login", "username=alice&password=wrong1", ""))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookies(&response)
            .iter()
            .all(|c| !c.starts_with("taskdesk_session=")));
        let html = body_text(response).await;
        assert!(html.contains("Invalid username or password"));
    }

    #[tokio::test]
    async fn test_login_redirects_to_next() {
        let state = test_state();
        state.auth().register("alice", "secret1", "secret1").unwrap();

        let response = build_router(state.clone())
            .oneshot(form_request(
                "/login",
                "username=alice&password=secret1&next=%2Ffeedback",
                "",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/feedback");

        let response = build_router(state)
            .oneshot(form_request(
                "/login",
                "username=alice&password=secret1&next=https%3A%2F%2Fevil.example",
                "",
            ))
            .await
            .unwrap();
        assert_eq!(location(&response), "/tasks");
    }

    #[tokio::test]
    async fn test_create_and_list_tasks() {
        let state = test_state();
        let (_, cookie) = login_cookie(&state, "alice").await;

        let response = build_router(state.clone())
            .oneshot(form_request(
                "/tasks/new",
                "title=Buy+milk&description=Semi-skimmed",
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/tasks");

        let response = build_router(state)
            .oneshot(get_request("/tasks", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Buy milk"));
        assert!(html.contains("Semi-skimmed"));
        assert!(html.contains("alice"));
    }

    #[tokio::test]
    async fn test_create_task_requires_title() {
        let state = test_state();
        let (_, cookie) = login_cookie(&state, "alice").await;

        let response = build_router(state)
            .oneshot(form_request("/tasks/new", "title=++&description=x", &cookie))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Title is required."));
    }

    #[tokio::test]
    async fn test_search_and_pagination() {
        let state = test_state();
        let (user, cookie) = login_cookie(&state, "alice").await;
        let store = state.task_store();
        for title in ["alpha one", "beta", "alpha two", "alpha three"] {
            store.create(user.id, &NewTask::new(title)).unwrap();
        }

        // per_page is 2 in the test config
        let response = build_router(state.clone())
            .oneshot(get_request("/tasks?q=alpha&page=2", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("alpha one"));
        assert!(!html.contains("alpha three"));
        assert!(!html.contains(">beta<"));
        assert!(html.contains("Page 2 of 2"));

        let response = build_router(state)
            .oneshot(get_request("/tasks?page=banana", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Page 1 of 2"));
    }

    #[tokio::test]
    async fn test_cannot_touch_other_users_tasks() {
        let state = test_state();
        let (alice, alice_cookie) = login_cookie(&state, "alice").await;
        let (_, bob_cookie) = login_cookie(&state, "bobby").await;
        let task = state
            .task_store()
            .create(alice.id, &NewTask::new("mine"))
            .unwrap();

        let edit = format!("/tasks/{}/edit", task.id);
        let response = build_router(state.clone())
            .oneshot(get_request(&edit, &bob_cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let delete = format!("/tasks/{}/delete", task.id);
        let response = build_router(state.clone())
            .oneshot(form_request(&delete, "", &bob_cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = build_router(state.clone())
            .oneshot(form_request(&edit, "title=", &bob_cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = build_router(state)
            .oneshot(get_request(&edit, &alice_cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_edit_toggle_delete() {
        let state = test_state();
        let (alice, cookie) = login_cookie(&state, "alice").await;
        let store = state.task_store();
        let task = store.create(alice.id, &NewTask::new("draft")).unwrap();

        let response = build_router(state.clone())
            .oneshot(form_request(
                &format!("/tasks/{}/edit", task.id),
                "title=final&description=&completed=on",
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let updated = store.get_for_user(task.id, alice.id).unwrap().unwrap();
        assert_eq!(updated.title, "final");
        assert!(updated.completed);
        assert_eq!(updated.description, None);

        let response = build_router(state.clone())
            .oneshot(form_request(
                &format!("/tasks/{}/toggle", task.id),
                "",
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(!store.get_for_user(task.id, alice.id).unwrap().unwrap().completed);

        let response = build_router(state)
            .oneshot(form_request(
                &format!("/tasks/{}/delete", task.id),
                "",
                &cookie,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(store.get_for_user(task.id, alice.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let state = test_state();
        let (_, cookie) = login_cookie(&state, "alice").await;

        let response = build_router(state.clone())
            .oneshot(form_request("/logout", "", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        // The old cookie no longer grants access
        let response = build_router(state)
            .oneshot(get_request("/tasks", &cookie))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[tokio::test]
    async fn test_feedback_submission() {
        let state = test_state();

        let response = build_router(state.clone())
            .oneshot(form_request(
                "/feedback",
                "name=Ada&email=ada%40example.com&message=Lovely",
                "",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");

        let saved = state.feedback_store().recent(5).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].message, "Lovely");
        assert_eq!(saved[0].user_id, None);

        let response = build_router(state)
            .oneshot(form_request("/feedback", "name=Ada&email=nope&message=", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = body_text(response).await;
        assert!(html.contains("Please enter a valid email address."));
        assert!(html.contains("Message is required."));
    }
}

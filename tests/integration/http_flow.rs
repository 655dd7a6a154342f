//! End-to-end browser flows through the HTTP router

use super::common::fixtures::test_state;
use super::common::http::{body_text, location, TestClient};
use axum::http::StatusCode;
use taskdesk::{Database, UserStore};

async fn signed_in_client(state: &taskdesk::AppState, username: &str) -> TestClient {
    let mut client = TestClient::new(state.clone());
    let response = client
        .post_form(
            "/register",
            &format!(
                "username={}&password=secret1&confirm_password=secret1",
                username
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = client
        .post_form(
            "/login",
            &format!("username={}&password=secret1", username),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(client.has_cookie("taskdesk_session"));
    client
}

/// Full lifecycle: register, log in, add, edit, complete, delete, log out
#[tokio::test]
async fn test_task_lifecycle() {
    let (state, _dir) = test_state(5);
    let mut client = signed_in_client(&state, "alice").await;

    let response = client.get("/tasks").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Logged in successfully."));
    assert!(html.contains("Here are your tasks!"));

    let response = client
        .post_form("/tasks/new", "title=Water+plants&description=Balcony")
        .await;
    assert_eq!(location(&response), "/tasks");

    let html = body_text(client.get("/tasks").await).await;
    assert!(html.contains("Task added."));
    assert!(html.contains("Water plants"));

    // Flash is one-shot
    let html = body_text(client.get("/tasks").await).await;
    assert!(!html.contains("Task added."));

    let task = state
        .task_store()
        .list_all()
        .unwrap()
        .pop()
        .expect("task was created");

    let response = client
        .post_form(
            &format!("/tasks/{}/edit", task.id),
            "title=Water+all+plants&description=Balcony+and+kitchen",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = client
        .post_form(&format!("/tasks/{}/toggle", task.id), "")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let html = body_text(client.get("/tasks?status=completed").await).await;
    assert!(html.contains("Task marked as completed."));
    assert!(html.contains("Water all plants"));

    let html = body_text(client.get("/tasks?status=pending").await).await;
    assert!(!html.contains("Water all plants"));

    let response = client
        .post_form(&format!("/tasks/{}/delete", task.id), "")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(state.task_store().list_all().unwrap().is_empty());

    let response = client.post_form("/logout", "").await;
    assert_eq!(location(&response), "/");
    assert!(!client.has_cookie("taskdesk_session"));

    let response = client.get("/tasks").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/login?next="));
}

/// Users only ever see their own tasks
#[tokio::test]
async fn test_tasks_are_private() {
    let (state, _dir) = test_state(5);
    let mut alice = signed_in_client(&state, "alice").await;
    let mut bob = signed_in_client(&state, "bobby").await;

    alice
        .post_form("/tasks/new", "title=Alice+secret&description=")
        .await;
    bob.post_form("/tasks/new", "title=Bob+errand&description=")
        .await;

    let html = body_text(alice.get("/tasks").await).await;
    assert!(html.contains("Alice secret"));
    assert!(!html.contains("Bob errand"));

    let html = body_text(bob.get("/tasks").await).await;
    assert!(html.contains("Bob errand"));
    assert!(!html.contains("Alice secret"));
}

/// A login redirect brings the user back to the page they asked for
#[tokio::test]
async fn test_login_returns_to_requested_page() {
    let (state, _dir) = test_state(5);
    state
        .auth()
        .register("carol", "secret1", "secret1")
        .unwrap();
    let mut client = TestClient::new(state);

    let response = client.get("/tasks/new").await;
    assert_eq!(location(&response), "/login?next=%2Ftasks%2Fnew");

    let html = body_text(client.get("/login?next=%2Ftasks%2Fnew").await).await;
    assert!(html.contains("Please log in to access this page."));

    let response = client
        .post_form(
            "/login",
            "username=carol&password=secret1&next=%2Ftasks%2Fnew",
        )
        .await;
    assert_eq!(location(&response), "/tasks/new");
}

/// Paging walks the whole filtered result set and clamps out-of-range pages
#[tokio::test]
async fn test_paging_through_search_results() {
    let (state, _dir) = test_state(2);
    let mut client = signed_in_client(&state, "alice").await;
    for n in 1..=5 {
        client
            .post_form("/tasks/new", &format!("title=report+{}&description=", n))
            .await;
    }
    client.post_form("/tasks/new", "title=groceries&description=").await;

    let html = body_text(client.get("/tasks?q=report&sort=oldest").await).await;
    assert!(html.contains("Page 1 of 3"));
    assert!(html.contains("report 1"));
    assert!(html.contains("report 2"));
    assert!(!html.contains("groceries"));

    let html = body_text(client.get("/tasks?q=report&sort=oldest&page=99").await).await;
    assert!(html.contains("Page 3 of 3"));
    assert!(html.contains("report 5"));
}

/// Feedback from a signed-in user is linked to the account
#[tokio::test]
async fn test_feedback_from_signed_in_user() {
    let (state, dir) = test_state(5);
    let mut client = signed_in_client(&state, "alice").await;

    let html = body_text(client.get("/feedback").await).await;
    assert!(html.contains("value=\"alice\""));

    let response = client
        .post_form(
            "/feedback",
            "name=Alice&email=alice%40example.com&message=Please+add+due+dates",
        )
        .await;
    assert_eq!(location(&response), "/");

    let html = body_text(client.get("/").await).await;
    assert!(html.contains("Thank you for your feedback!"));

    // Second handle on the same database file
    let db = Database::open(dir.path().join("taskdesk.db")).unwrap();
    let user = UserStore::new(db)
        .get_by_username("alice")
        .unwrap()
        .unwrap();
    let saved = state.feedback_store().recent(1).unwrap();
    assert_eq!(saved[0].user_id, Some(user.id));
}

//! Task list and task CRUD handlers. All of them require a logged-in user
//! and only ever touch that user's tasks.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::data::{TaskQuery, TaskSort, TaskStatusFilter};
use crate::web::error::WebError;
use crate::web::flash::{set_flash, take_flash, FlashKind};
use crate::web::forms::{TaskForm, TaskListParams};
use crate::web::session::CurrentUser;
use crate::web::state::AppState;
use crate::web::views::{
    render, Layout, PaginationView, SelectOption, TaskFormPage, TaskListPage, TaskView,
};

fn not_found(id: i64) -> WebError {
    WebError::NotFound(format!("Task {} not found", id))
}

/// List the user's tasks with search, filter, sort and pagination.
pub async fn list_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Query(params): Query<TaskListParams>,
) -> Result<Response, WebError> {
    let query = TaskQuery {
        search: params.q.clone(),
        status: params
            .status
            .as_deref()
            .map(TaskStatusFilter::parse)
            .unwrap_or_default(),
        sort: params
            .sort
            .as_deref()
            .map(TaskSort::parse)
            .unwrap_or_default(),
        page: params.page(),
        per_page: state.config().tasks.per_page,
    };

    let result = state.task_store().list_for_user(user.id, &query)?;
    tracing::debug!(
        user_id = user.id,
        total = result.total,
        page = result.page,
        "Listed tasks"
    );

    let (jar, flash) = take_flash(jar);
    let page = TaskListPage {
        layout: Layout::new(Some(&user), flash),
        pagination: PaginationView::new(&result, &query),
        search: query.search_term().unwrap_or_default().to_string(),
        filtered: query.search_term().is_some() || query.status != TaskStatusFilter::All,
        status_options: SelectOption::statuses(query.status),
        sort_options: SelectOption::sorts(query.sort),
        tasks: result.tasks.into_iter().map(TaskView::from).collect(),
    };
    Ok((jar, render(&page)?).into_response())
}

fn new_task_page(layout: Layout, form: &TaskForm, errors: Vec<String>) -> TaskFormPage {
    TaskFormPage {
        layout,
        heading: "Add a task".to_string(),
        action: "/tasks/new".to_string(),
        submit_label: "Add task".to_string(),
        show_completed: false,
        title: form.title.clone(),
        description: form.description.clone(),
        completed: false,
        errors,
    }
}

fn edit_task_page(layout: Layout, id: i64, form: &TaskForm, errors: Vec<String>) -> TaskFormPage {
    TaskFormPage {
        layout,
        heading: "Edit task".to_string(),
        action: format!("/tasks/{}/edit", id),
        submit_label: "Save changes".to_string(),
        show_completed: true,
        title: form.title.clone(),
        description: form.description.clone(),
        completed: form.completed.is_some(),
        errors,
    }
}

/// Show the add-task form.
pub async fn new_task_form(
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
) -> Result<Response, WebError> {
    let (jar, flash) = take_flash(jar);
    let page = new_task_page(
        Layout::new(Some(&user), flash),
        &TaskForm::default(),
        Vec::new(),
    );
    Ok((jar, render(&page)?).into_response())
}

/// Create a task for the current user.
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Form(form): Form<TaskForm>,
) -> Result<Response, WebError> {
    let new_task = match form.validate_new() {
        Ok(task) => task,
        Err(errors) => {
            let page = new_task_page(Layout::new(Some(&user), None), &form, errors);
            return Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response());
        }
    };

    let task = state.task_store().create(user.id, &new_task)?;
    tracing::info!(user_id = user.id, task_id = task.id, "Task created");

    let jar = set_flash(jar, FlashKind::Success, "Task added.");
    Ok((jar, Redirect::to("/tasks")).into_response())
}

/// Show the edit form for one of the user's tasks.
pub async fn edit_task_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let task = state
        .task_store()
        .get_for_user(id, user.id)?
        .ok_or_else(|| not_found(id))?;

    let form = TaskForm {
        title: task.title,
        description: task.description.unwrap_or_default(),
        completed: task.completed.then(|| "on".to_string()),
    };
    let (jar, flash) = take_flash(jar);
    let page = edit_task_page(Layout::new(Some(&user), flash), id, &form, Vec::new());
    Ok((jar, render(&page)?).into_response())
}

/// Save edits to one of the user's tasks.
pub async fn update_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(id): Path<i64>,
    Form(form): Form<TaskForm>,
) -> Result<Response, WebError> {
    let store = state.task_store();
    let changes = match form.validate() {
        Ok(changes) => changes,
        Err(errors) => {
            // Don't reveal a validation form for someone else's task
            if store.get_for_user(id, user.id)?.is_none() {
                return Err(not_found(id));
            }
            let page = edit_task_page(Layout::new(Some(&user), None), id, &form, errors);
            return Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response());
        }
    };

    store
        .update_for_user(id, user.id, &changes)?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(user_id = user.id, task_id = id, "Task updated");

    let jar = set_flash(jar, FlashKind::Success, "Task updated.");
    Ok((jar, Redirect::to("/tasks")).into_response())
}

/// Flip a task between completed and pending.
pub async fn toggle_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    let task = state
        .task_store()
        .toggle_for_user(id, user.id)?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(
        user_id = user.id,
        task_id = id,
        completed = task.completed,
        "Task toggled"
    );

    let message = if task.completed {
        "Task marked as completed."
    } else {
        "Task marked as pending."
    };
    let jar = set_flash(jar, FlashKind::Success, message);
    Ok((jar, Redirect::to("/tasks")).into_response())
}

/// Delete one of the user's tasks.
pub async fn delete_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: CookieJar,
    Path(id): Path<i64>,
) -> Result<Response, WebError> {
    if !state.task_store().delete_for_user(id, user.id)? {
        return Err(not_found(id));
    }
    tracing::info!(user_id = user.id, task_id = id, "Task deleted");

    let jar = set_flash(jar, FlashKind::Success, "Task deleted.");
    Ok((jar, Redirect::to("/tasks")).into_response())
}

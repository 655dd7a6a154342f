//! Server-rendered pages (askama templates under `templates/`).

use askama::Template;
use axum::response::Html;

use crate::data::{Task, TaskPage, TaskQuery, TaskSort, TaskStatusFilter, User};

use super::error::WebError;
use super::flash::Flash;

/// Values every page shares through `base.html`
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub logged_in: bool,
    pub username: String,
    pub flash_kind: String,
    pub flash_message: String,
}

impl Layout {
    pub fn new(user: Option<&User>, flash: Option<Flash>) -> Self {
        let (flash_kind, flash_message) = flash
            .map(|f| (f.kind.as_str().to_string(), f.message))
            .unwrap_or_default();
        Self {
            logged_in: user.is_some(),
            username: user.map(|u| u.username.clone()).unwrap_or_default(),
            flash_kind,
            flash_message,
        }
    }

    pub fn has_flash(&self) -> bool {
        !self.flash_message.is_empty()
    }
}

pub fn render<T: Template>(page: &T) -> Result<Html<String>, WebError> {
    Ok(Html(page.render()?))
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub layout: Layout,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterPage {
    pub layout: Layout,
    pub username: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub layout: Layout,
    pub username: String,
    pub next: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "tasks.html")]
pub struct TaskListPage {
    pub layout: Layout,
    pub tasks: Vec<TaskView>,
    pub search: String,
    pub filtered: bool,
    pub status_options: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
    pub pagination: PaginationView,
}

#[derive(Template)]
#[template(path = "task_form.html")]
pub struct TaskFormPage {
    pub layout: Layout,
    pub heading: String,
    pub action: String,
    pub submit_label: String,
    pub show_completed: bool,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "feedback.html")]
pub struct FeedbackPage {
    pub layout: Layout,
    pub name: String,
    pub email: String,
    pub message: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub layout: Layout,
    pub status: u16,
    pub heading: String,
    pub message: String,
}

/// A task as shown in the list
#[derive(Debug, Clone)]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: String,
}

impl From<Task> for TaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description.unwrap_or_default(),
            completed: task.completed,
            created_at: task.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn statuses(current: TaskStatusFilter) -> Vec<Self> {
        TaskStatusFilter::ALL
            .iter()
            .map(|s| Self {
                value: s.as_str().to_string(),
                label: s.label().to_string(),
                selected: *s == current,
            })
            .collect()
    }

    pub fn sorts(current: TaskSort) -> Vec<Self> {
        TaskSort::ALL
            .iter()
            .map(|s| Self {
                value: s.as_str().to_string(),
                label: s.label().to_string(),
                selected: *s == current,
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Page navigation; an empty href means the link is not shown
#[derive(Debug, Clone)]
pub struct PaginationView {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub prev_href: String,
    pub next_href: String,
    pub links: Vec<PageLink>,
}

impl PaginationView {
    /// Build links that keep the query's search, status and sort
    pub fn new(page: &TaskPage, query: &TaskQuery) -> Self {
        let total_pages = page.total_pages();
        let href = |n: u32| task_list_href(query, n);

        Self {
            page: page.page,
            total_pages,
            total: page.total,
            prev_href: if page.has_prev() {
                href(page.page - 1)
            } else {
                String::new()
            },
            next_href: if page.has_next() {
                href(page.page + 1)
            } else {
                String::new()
            },
            links: (1..=total_pages)
                .map(|n| PageLink {
                    number: n,
                    href: href(n),
                    current: n == page.page,
                })
                .collect(),
        }
    }

    pub fn is_multi_page(&self) -> bool {
        self.total_pages > 1
    }
}

/// `/tasks` URL for page `n` of the given query
pub fn task_list_href(query: &TaskQuery, n: u32) -> String {
    let mut params = vec![format!("page={}", n)];
    if let Some(term) = query.search_term() {
        params.push(format!("q={}", urlencoding::encode(term)));
    }
    if query.status != TaskStatusFilter::All {
        params.push(format!("status={}", query.status.as_str()));
    }
    if query.sort != TaskSort::Newest {
        params.push(format!("sort={}", query.sort.as_str()));
    }
    format!("/tasks?{}", params.join("&"))
}

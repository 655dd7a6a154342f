//! HTML form payloads and their validation rules.

use serde::Deserialize;

use crate::data::{NewFeedback, NewTask, TaskChanges};

pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MAX: usize = 200;
pub const FEEDBACK_NAME_MAX: usize = 100;
pub const EMAIL_MAX: usize = 120;
pub const MESSAGE_MAX: usize = 1000;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginParams {
    pub next: Option<String>,
}

/// Add/edit task form. An unchecked checkbox is simply absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub completed: Option<String>,
}

impl TaskForm {
    pub fn validate(&self) -> Result<TaskChanges, Vec<String>> {
        let mut errors = Vec::new();
        let title = self.title.trim();
        let description = self.description.trim();

        if title.is_empty() {
            errors.push("Title is required.".to_string());
        } else if title.chars().count() > TITLE_MAX {
            errors.push(format!("Title must be at most {} characters.", TITLE_MAX));
        }
        if description.chars().count() > DESCRIPTION_MAX {
            errors.push(format!(
                "Description must be at most {} characters.",
                DESCRIPTION_MAX
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(TaskChanges {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            completed: self.completed.is_some(),
        })
    }

    pub fn validate_new(&self) -> Result<NewTask, Vec<String>> {
        let changes = self.validate()?;
        Ok(NewTask {
            title: changes.title,
            description: changes.description,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TaskListParams {
    pub page: Option<String>,
    pub q: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

impl TaskListParams {
    /// Garbage page numbers fall back to the first page
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .unwrap_or(1)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl FeedbackForm {
    pub fn validate(&self, user_id: Option<i64>) -> Result<NewFeedback, Vec<String>> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if name.chars().count() > FEEDBACK_NAME_MAX {
            errors.push(format!("Name must be at most {} characters.", FEEDBACK_NAME_MAX));
        }

        if !is_plausible_email(email) {
            errors.push("Please enter a valid email address.".to_string());
        } else if email.chars().count() > EMAIL_MAX {
            errors.push(format!("Email must be at most {} characters.", EMAIL_MAX));
        }

        if message.is_empty() {
            errors.push("Message is required.".to_string());
        } else if message.chars().count() > MESSAGE_MAX {
            errors.push(format!("Message must be at most {} characters.", MESSAGE_MAX));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewFeedback {
            user_id,
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

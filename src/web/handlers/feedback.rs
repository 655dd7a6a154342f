//! Feedback form, open to anonymous and logged-in visitors alike.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::web::error::WebError;
use crate::web::flash::{set_flash, take_flash, FlashKind};
use crate::web::forms::FeedbackForm;
use crate::web::session::MaybeUser;
use crate::web::state::AppState;
use crate::web::views::{render, FeedbackPage, Layout};

pub async fn feedback_form(user: MaybeUser, jar: CookieJar) -> Result<Response, WebError> {
    let (jar, flash) = take_flash(jar);
    let page = FeedbackPage {
        layout: Layout::new(user.user(), flash),
        name: user.user().map(|u| u.username.clone()).unwrap_or_default(),
        email: String::new(),
        message: String::new(),
        errors: Vec::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    user: MaybeUser,
    jar: CookieJar,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, WebError> {
    let user_id = user.user().map(|u| u.id);
    let feedback = match form.validate(user_id) {
        Ok(feedback) => feedback,
        Err(errors) => {
            let page = FeedbackPage {
                layout: Layout::new(user.user(), None),
                name: form.name,
                email: form.email,
                message: form.message,
                errors,
            };
            return Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response());
        }
    };

    let saved = state.feedback_store().create(&feedback)?;
    tracing::info!(feedback_id = saved.id, user_id = ?saved.user_id, "Feedback received");

    let jar = set_flash(jar, FlashKind::Success, "Thank you for your feedback!");
    Ok((jar, Redirect::to("/")).into_response())
}

//! Registration, login and logout handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::AuthError;
use crate::web::error::WebError;
use crate::web::flash::{set_flash, take_flash, FlashKind};
use crate::web::forms::{LoginForm, LoginParams, RegisterForm};
use crate::web::session::{
    clear_session_cookie, safe_next, session_cookie, MaybeUser, SESSION_COOKIE,
};
use crate::web::state::AppState;
use crate::web::views::{render, Layout, LoginPage, RegisterPage};

/// Show the registration form.
pub async fn register_form(user: MaybeUser, jar: CookieJar) -> Result<Response, WebError> {
    if user.0.is_some() {
        return Ok(Redirect::to("/tasks").into_response());
    }

    let (jar, flash) = take_flash(jar);
    let page = RegisterPage {
        layout: Layout::new(None, flash),
        username: String::new(),
        errors: Vec::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

/// Create an account, then send the user to the login page.
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, WebError> {
    match state
        .auth()
        .register(&form.username, &form.password, &form.confirm_password)
    {
        Ok(_) => {
            let jar = set_flash(
                jar,
                FlashKind::Success,
                "Registration successful. Please log in.",
            );
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(e @ (AuthError::Validation(_) | AuthError::UsernameTaken)) => {
            let page = RegisterPage {
                layout: Layout::new(None, None),
                username: form.username.trim().to_string(),
                errors: vec![e.to_string()],
            };
            Ok((StatusCode::BAD_REQUEST, render(&page)?).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Show the login form.
pub async fn login_form(
    user: MaybeUser,
    jar: CookieJar,
    Query(params): Query<LoginParams>,
) -> Result<Response, WebError> {
    if user.0.is_some() {
        return Ok(Redirect::to(safe_next(params.next.as_deref())).into_response());
    }

    let (jar, flash) = take_flash(jar);
    let page = LoginPage {
        layout: Layout::new(None, flash),
        username: String::new(),
        next: params.next.unwrap_or_default(),
        errors: Vec::new(),
    };
    Ok((jar, render(&page)?).into_response())
}

/// Check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, WebError> {
    match state.auth().login(&form.username, &form.password) {
        Ok(issued) => {
            let secure = state.config().server.secure_cookies;
            let jar = jar.add(session_cookie(issued.token, secure));
            let jar = set_flash(jar, FlashKind::Success, "Logged in successfully.");
            let target = safe_next(form.next.as_deref());
            Ok((jar, Redirect::to(target)).into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            let page = LoginPage {
                layout: Layout::new(None, None),
                username: form.username.trim().to_string(),
                next: form.next.clone().unwrap_or_default(),
                errors: vec![AuthError::InvalidCredentials.to_string()],
            };
            Ok((StatusCode::UNAUTHORIZED, render(&page)?).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// End the current session, if there is one.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, WebError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.auth().logout(cookie.value())?;
    }

    let jar = clear_session_cookie(jar);
    let jar = set_flash(jar, FlashKind::Info, "You have been logged out.");
    Ok((jar, Redirect::to("/")).into_response())
}

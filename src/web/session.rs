//! Cookie-backed login sessions and the extractors that read them.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::data::User;

use super::error::WebError;
use super::flash::{set_flash, FlashKind};
use super::state::AppState;

pub const SESSION_COOKIE: &str = "taskdesk_session";

/// The logged-in user. Anonymous requests are redirected to the login page.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The logged-in user, if any
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

impl MaybeUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

fn lookup_user(jar: &CookieJar, state: &AppState) -> Result<Option<User>, WebError> {
    match jar.get(SESSION_COOKIE) {
        Some(cookie) => Ok(state.auth().authenticate(cookie.value())?),
        None => Ok(None),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match lookup_user(&jar, state) {
            Ok(Some(user)) => Ok(CurrentUser(user)),
            Ok(None) => {
                let next = parts
                    .uri
                    .path_and_query()
                    .map(|pq| pq.as_str())
                    .unwrap_or("/tasks");
                tracing::debug!(next, "Anonymous request to protected page");
                let jar = set_flash(jar, FlashKind::Info, "Please log in to access this page.");
                let target = format!("/login?next={}", urlencoding::encode(next));
                Err((jar, Redirect::to(&target)).into_response())
            }
            Err(e) => Err(e.into_response()),
        }
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(MaybeUser(lookup_user(&jar, state)?))
    }
}

pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

pub fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Where to send the user after login. Only same-site absolute paths are
/// honored so the parameter cannot be used as an open redirect.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') =>
        {
            path
        }
        _ => "/tasks",
    }
}

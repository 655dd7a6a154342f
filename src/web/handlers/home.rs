//! Landing page.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::web::error::WebError;
use crate::web::flash::take_flash;
use crate::web::session::MaybeUser;
use crate::web::views::{render, HomePage, Layout};

pub async fn home(user: MaybeUser, jar: CookieJar) -> Result<Response, WebError> {
    let (jar, flash) = take_flash(jar);
    let page = HomePage {
        layout: Layout::new(user.user(), flash),
    };
    Ok((jar, render(&page)?).into_response())
}

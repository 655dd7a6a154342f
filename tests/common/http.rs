//! Helpers for sending requests through the router and reading responses

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use http_body_util::BodyExt;
use taskdesk::{build_router, AppState};
use tower::ServiceExt;

/// Minimal cookie-carrying client over a router built per request
pub struct TestClient {
    state: AppState,
    cookies: Vec<(String, String)>,
}

impl TestClient {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            cookies: Vec::new(),
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = self.request(Method::GET, uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, body: &str) -> Response<Body> {
        let request = self
            .request(Method::POST, uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.iter().any(|(n, _)| n == name)
    }

    fn request(&self, method: Method, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let header_value = self
                .cookies
                .iter()
                .map(|(n, v)| format!("{}={}", n, v))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, header_value);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> Response<Body> {
        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .expect("router is infallible");
        self.store_cookies(&response);
        response
    }

    fn store_cookies(&mut self, response: &Response<Body>) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            let pair = value.split(';').next().unwrap_or_default();
            let Some((name, val)) = pair.split_once('=') else {
                continue;
            };
            self.cookies.retain(|(n, _)| n != name);
            if !value.contains("Max-Age=0") && !val.is_empty() {
                self.cookies.push((name.to_string(), val.to_string()));
            }
        }
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

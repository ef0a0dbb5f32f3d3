//! Test servers over the review router

use axum::{
    http::{HeaderName, HeaderValue},
    Router,
};
use axum_test::{TestResponse, TestServer};
use scrutinize::backend::middleware::{XSRF_COOKIE, XSRF_HEADER};

use crate::common::TEST_PORT;

/// Name of the session cookie for the test port
pub fn session_cookie() -> String {
    format!("SESSION-{}", TEST_PORT)
}

/// A server that keeps cookies between requests, like a browser tab
pub fn browser(app: Router) -> TestServer {
    TestServer::builder().save_cookies().build(app).unwrap()
}

/// A server that never keeps cookies
pub fn stranger(app: Router) -> TestServer {
    TestServer::new(app).unwrap()
}

/// Tokens handed out when the session was bound
#[derive(Debug, Clone)]
pub struct Issued {
    pub session: String,
    pub xsrf: String,
}

impl Issued {
    pub fn from_response(response: &TestResponse) -> Self {
        Self {
            session: response.cookie(&session_cookie()).value().to_string(),
            xsrf: response.cookie(XSRF_COOKIE).value().to_string(),
        }
    }
}

/// Bind the session with a GET and return the issued tokens
pub async fn bind(server: &TestServer) -> Issued {
    let response = server.get("/api/scope").await;
    response.assert_status_ok();
    Issued::from_response(&response)
}

/// The `X-XSRF-TOKEN` header carrying `token`
pub fn xsrf_header(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_bytes(XSRF_HEADER.as_bytes()).unwrap(),
        HeaderValue::from_str(token).unwrap(),
    )
}

/// Post form fields to `uri` echoing `token` in the XSRF header
pub async fn post_form(
    server: &TestServer,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
) -> TestResponse {
    let (name, value) = xsrf_header(token);
    server
        .post(uri)
        .add_header(name, value)
        .form(&fields.to_vec())
        .await
}

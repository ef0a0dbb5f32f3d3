//! Session gate integration tests
//!
//! One browser session binds the server; everybody else is locked out,
//! and mutating requests need the XSRF token.

use std::time::Duration;

use axum::http::StatusCode;
use cookie::{Cookie, SameSite};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::common::{bind, browser, post_form, session_cookie, stranger, TestRepo};
use scrutinize::backend::error::UNAUTHORIZED_MESSAGE;
use scrutinize::backend::middleware::XSRF_COOKIE;

#[tokio::test]
async fn test_first_request_binds_session() {
    let repo = TestRepo::new();
    let webroot = TempDir::new().unwrap();
    let (state, app) = repo.app(webroot.path());
    let server = browser(app);

    let response = server.get("/api/scope").await;
    crate::assert_status!(response, StatusCode::OK);
    assert_eq!(
        response.json::<Value>(),
        json!({ "scope": "refs/notes/scrutinize/main", "branch": "main" })
    );
    assert!(state.session_gate.is_bound());

    let session = response.cookie(&session_cookie());
    assert_eq!(session.http_only(), Some(true));
    assert_eq!(session.path(), Some("/"));
    assert_eq!(session.same_site(), Some(SameSite::Strict));
    assert_eq!(session.value().len(), 64);
    let xsrf = response.cookie(XSRF_COOKIE);
    assert_eq!(xsrf.http_only(), None);
    assert_ne!(xsrf.value(), session.value());

    // Later requests carry the cookie and are not re-issued one.
    let response = server.get("/api/scope").await;
    crate::assert_status!(response, StatusCode::OK);
    crate::assert_no_cookies!(response);
}

#[tokio::test]
async fn test_second_client_is_rejected() {
    let repo = TestRepo::new();
    let webroot = TempDir::new().unwrap();
    let (_state, app) = repo.app(webroot.path());
    let owner = browser(app.clone());
    let intruder = stranger(app);

    crate::assert_status!(owner.get("/api/notes").await, StatusCode::OK);

    let response = intruder.get("/api/notes").await;
    crate::assert_error_body!(response, StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE);
    crate::assert_no_cookies!(response);

    // A guessed cookie fares no better.
    let response = intruder
        .get("/api/notes")
        .add_cookie(Cookie::new(session_cookie(), "0".repeat(64)))
        .await;
    crate::assert_status!(response, StatusCode::UNAUTHORIZED);

    // The owner is unaffected.
    crate::assert_status!(owner.get("/api/notes").await, StatusCode::OK);
}

#[tokio::test]
async fn test_post_requires_xsrf_header() {
    let repo = TestRepo::new();
    let commit = repo.commit("second");
    let webroot = TempDir::new().unwrap();
    let (_state, app) = repo.app(webroot.path());
    let owner = browser(app.clone());
    let issued = bind(&owner).await;
    let uri = format!("/api/notes/{}", commit);

    // Cookies alone are not enough.
    let response = owner.post(&uri).form(&[("text", "sneaky")]).await;
    crate::assert_error_body!(response, StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE);

    // A forged token, even if cookie and header agree.
    let forged = "f".repeat(64);
    let (name, value) = crate::common::xsrf_header(&forged);
    let response = stranger(app)
        .post(&uri)
        .add_cookie(Cookie::new(session_cookie(), issued.session.clone()))
        .add_cookie(Cookie::new(XSRF_COOKIE, forged.clone()))
        .add_header(name, value)
        .form(&[("text", "sneaky")])
        .await;
    crate::assert_status!(response, StatusCode::UNAUTHORIZED);

    // Nothing was written.
    let response = owner.get(&uri).await;
    crate::assert_status!(response, StatusCode::OK);
    assert_eq!(response.json::<Value>()["notes"], json!([]));

    // The issued token goes through.
    crate::assert_status!(
        post_form(&owner, &uri, &issued.xsrf, &[("text", "fine")]).await,
        StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn test_rejected_first_request_still_binds() {
    let repo = TestRepo::new();
    let commit = repo.commit("second");
    let webroot = TempDir::new().unwrap();
    let (_state, app) = repo.app(webroot.path());
    let server = browser(app);
    let uri = format!("/api/notes/{}", commit);

    // First contact is a POST without any XSRF token.
    let response = server.post(&uri).form(&[("text", "hello")]).await;
    crate::assert_status!(response, StatusCode::UNAUTHORIZED);
    let issued = crate::common::Issued::from_response(&response);

    // With the cookies it was given, the same client can now write.
    crate::assert_status!(
        post_form(&server, &uri, &issued.xsrf, &[("text", "hello")]).await,
        StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn test_static_files_are_gated() {
    let repo = TestRepo::new();
    let webroot = TempDir::new().unwrap();
    std::fs::write(webroot.path().join("index.html"), "<h1>review</h1>").unwrap();
    let (_state, app) = repo.app(webroot.path());
    let owner = browser(app.clone());
    let intruder = stranger(app);

    let response = owner.get("/index.html").await;
    crate::assert_status!(response, StatusCode::OK);
    assert_eq!(response.text(), "<h1>review</h1>");

    crate::assert_status!(intruder.get("/index.html").await, StatusCode::UNAUTHORIZED);
    crate::assert_status!(owner.get("/missing.html").await, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_quit_signals_shutdown() {
    let repo = TestRepo::new();
    let webroot = TempDir::new().unwrap();
    let (state, app) = repo.app(webroot.path());
    let server = browser(app);
    let issued = bind(&server).await;

    let (name, value) = crate::common::xsrf_header(&issued.xsrf);
    let response = server.post("/quit").add_header(name, value).await;
    crate::assert_status!(response, StatusCode::OK);
    assert_eq!(response.text(), "Bye...");

    tokio::time::timeout(Duration::from_secs(1), state.shutdown.notified())
        .await
        .expect("shutdown was not signalled");
}

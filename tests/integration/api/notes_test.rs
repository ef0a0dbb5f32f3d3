//! Annotation API integration tests

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::common::{bind, browser, post_form, Issued, TestRepo};

/// A browser-like server whose session is already bound
async fn bound_server(repo: &TestRepo, webroot: &TempDir) -> (TestServer, Issued) {
    let (_state, app) = repo.app(webroot.path());
    let server = browser(app);
    let issued = bind(&server).await;
    (server, issued)
}

async fn post_note(
    server: &TestServer,
    issued: &Issued,
    uri: &str,
    fields: &[(&str, &str)],
) -> TestResponse {
    post_form(server, uri, &issued.xsrf, fields).await
}

fn header_value<'a>(note: &'a Value, field: &str) -> &'a Value {
    &note["header"][field]
}

#[tokio::test]
async fn test_append_then_list() {
    let repo = TestRepo::new();
    let commit = repo.commit("add parser");
    let webroot = TempDir::new().unwrap();
    let (server, issued) = bound_server(&repo, &webroot).await;
    let uri = format!("/api/notes/{}", commit);

    let response = post_note(
        &server,
        &issued,
        &uri,
        &[
            ("text", "looks good"),
            ("verdict", "ok"),
            ("Author", "Somebody Else <forged@example.com>"),
        ],
    )
    .await;
    crate::assert_status!(response, StatusCode::NO_CONTENT);
    assert!(response.text().is_empty());

    let response = post_note(
        &server,
        &issued,
        &uri,
        &[("text", "one nit"), ("line", "12"), ("line", "40")],
    )
    .await;
    crate::assert_status!(response, StatusCode::NO_CONTENT);

    let response = server.get(&uri).await;
    crate::assert_status!(response, StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["scope"], "refs/notes/scrutinize/main");
    assert_eq!(body["commit"], commit.as_str());

    let notes = body["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["body"], "looks good");
    assert_eq!(header_value(&notes[0], "Verdict"), &json!(["ok"]));
    assert_eq!(
        header_value(&notes[0], "Author"),
        &json!(["Test Reviewer <reviewer@example.com>"])
    );
    assert_eq!(header_value(&notes[0], "Date").as_array().unwrap().len(), 1);
    assert_eq!(notes[1]["body"], "one nit");
    assert_eq!(header_value(&notes[1], "Line"), &json!(["12", "40"]));

    let response = server.get("/api/notes").await;
    crate::assert_status!(response, StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["scope"], "refs/notes/scrutinize/main");
    let all = body["notes"].as_object().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[&commit], Value::Array(notes.clone()));
}

#[tokio::test]
async fn test_body_survives_framing() {
    let repo = TestRepo::new();
    let commit = repo.commit("tricky");
    let webroot = TempDir::new().unwrap();
    let (server, issued) = bound_server(&repo, &webroot).await;
    let uri = format!("/api/notes/{}", commit);
    let text = "first\n.\n..two dots\n\nVerdict: not a header\nlast";

    crate::assert_status!(
        post_note(&server, &issued, &uri, &[("text", text)]).await,
        StatusCode::NO_CONTENT
    );
    let body = server.get(&uri).await.json::<Value>();
    assert_eq!(body["notes"][0]["body"], text);
    assert!(body["notes"][0]["header"].get("Verdict").is_none());
}

#[tokio::test]
async fn test_header_values_are_line_normalized() {
    let repo = TestRepo::new();
    let commit = repo.commit("values");
    let webroot = TempDir::new().unwrap();
    let (server, issued) = bound_server(&repo, &webroot).await;
    let uri = format!("/api/notes/{}", commit);

    crate::assert_status!(
        post_note(&server, &issued, &uri, &[("text", "x"), ("status", "  open\nnow ")]).await,
        StatusCode::NO_CONTENT
    );
    let body = server.get(&uri).await.json::<Value>();
    assert_eq!(header_value(&body["notes"][0], "Status"), &json!(["open now"]));
}

#[tokio::test]
async fn test_invalid_commit_is_bad_request() {
    let repo = TestRepo::new();
    let webroot = TempDir::new().unwrap();
    let (server, issued) = bound_server(&repo, &webroot).await;

    crate::assert_error_body!(
        server.get("/api/notes/not-a-commit").await,
        StatusCode::BAD_REQUEST
    );

    crate::assert_status!(
        post_note(&server, &issued, "/api/notes/abc123", &[("text", "x")]).await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_unknown_commit_is_not_found() {
    let repo = TestRepo::new();
    let webroot = TempDir::new().unwrap();
    let (server, issued) = bound_server(&repo, &webroot).await;
    let uri = format!("/api/notes/{}", "ab".repeat(20));

    crate::assert_error_body!(
        post_note(&server, &issued, &uri, &[("text", "x")]).await,
        StatusCode::NOT_FOUND
    );
    let body = server.get("/api/notes").await.json::<Value>();
    assert_eq!(body["notes"], json!({}));
}

#[tokio::test]
async fn test_invalid_field_name_is_bad_request() {
    let repo = TestRepo::new();
    let commit = repo.commit("second");
    let webroot = TempDir::new().unwrap();
    let (server, issued) = bound_server(&repo, &webroot).await;

    crate::assert_status!(
        post_note(
            &server,
            &issued,
            &format!("/api/notes/{}", commit),
            &[("bad field", "x")]
        )
        .await,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_detached_head_has_no_scope() {
    let repo = TestRepo::new();
    let webroot = TempDir::new().unwrap();
    let (server, _issued) = bound_server(&repo, &webroot).await;
    repo.detach();

    crate::assert_error_body!(server.get("/api/scope").await, StatusCode::CONFLICT);
    crate::assert_status!(server.get("/api/notes").await, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_scope_follows_checkout() {
    let repo = TestRepo::new();
    let commit = repo.commit("shared");
    let webroot = TempDir::new().unwrap();
    let (server, issued) = bound_server(&repo, &webroot).await;
    let uri = format!("/api/notes/{}", commit);

    crate::assert_status!(
        post_note(&server, &issued, &uri, &[("text", "on main")]).await,
        StatusCode::NO_CONTENT
    );

    repo.checkout_new_branch("feature/x");
    let body = server.get("/api/scope").await.json::<Value>();
    assert_eq!(body["branch"], "feature/x");
    assert_eq!(body["scope"], "refs/notes/scrutinize/feature/x");
    assert_eq!(server.get(&uri).await.json::<Value>()["notes"], json!([]));
}

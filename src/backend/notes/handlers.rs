//! Annotation HTTP Handlers
//!
//! Every store call touches the repository and blocks, so it runs on the
//! blocking pool. Appends hold the write permit for the whole
//! read-append-overwrite sequence.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use serde::Serialize;
use tokio::sync::Notify;

use crate::backend::error::BackendError;
use crate::backend::notes::commit::CommitId;
use crate::backend::notes::permit::WriteGate;
use crate::backend::notes::store::Annotations;
use crate::backend::server::state::SharedStore;
use crate::shared::message::{Header, Message};

/// Form field carrying the message body; every other field is a header
pub const BODY_FIELD: &str = "text";

#[derive(Debug, Serialize)]
pub struct NotesResponse {
    pub scope: String,
    pub notes: Annotations,
}

#[derive(Debug, Serialize)]
pub struct CommitNotesResponse {
    pub scope: String,
    pub commit: CommitId,
    pub notes: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ScopeResponse {
    pub scope: String,
    pub branch: String,
}

async fn run_blocking<T, F>(task: F) -> Result<T, BackendError>
where
    F: FnOnce() -> Result<T, BackendError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await.map_err(|e| {
        tracing::error!("Repository task failed: {:?}", e);
        BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "repository task failed")
    })?
}

/// Split submitted form fields into header fields and the body
///
/// Repeated fields become repeated header values in submission order. Only
/// the first `text` field is used as the body.
pub fn header_from_form(fields: Vec<(String, String)>) -> Result<(Header, String), BackendError> {
    let mut header = Header::new();
    let mut body = None;
    for (name, value) in fields {
        if name == BODY_FIELD {
            body.get_or_insert(value);
        } else {
            header.add(&name, value)?;
        }
    }
    Ok((header, body.unwrap_or_default()))
}

/// `GET /api/notes`
pub async fn list_notes(
    State(store): State<SharedStore>,
) -> Result<Json<NotesResponse>, BackendError> {
    run_blocking(move || {
        let scope = store.scope()?;
        let notes = store.list_all()?;
        Ok(Json(NotesResponse {
            scope: scope.notes_ref().to_string(),
            notes,
        }))
    })
    .await
}

/// `GET /api/notes/{commit}`
pub async fn get_commit_notes(
    State(store): State<SharedStore>,
    Path(commit): Path<String>,
) -> Result<Json<CommitNotesResponse>, BackendError> {
    let commit = CommitId::parse(&commit)?;
    run_blocking(move || {
        let scope = store.scope()?;
        let notes = store.list(commit.as_str())?;
        Ok(Json(CommitNotesResponse {
            scope: scope.notes_ref().to_string(),
            commit,
            notes,
        }))
    })
    .await
}

/// `POST /api/notes/{commit}`
///
/// Returns `204 No Content` once the note is written.
pub async fn post_note(
    State(store): State<SharedStore>,
    State(write_gate): State<WriteGate>,
    Path(commit): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<StatusCode, BackendError> {
    // Reject bad input before queueing for the permit.
    let commit = CommitId::parse(&commit)?;
    let (header, body) = header_from_form(fields)?;

    let permit = write_gate.acquire().await;
    run_blocking(move || {
        store.append(&permit, commit.as_str(), header, body)?;
        Ok(())
    })
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/scope`
pub async fn get_scope(
    State(store): State<SharedStore>,
) -> Result<Json<ScopeResponse>, BackendError> {
    run_blocking(move || {
        let scope = store.scope()?;
        Ok(Json(ScopeResponse {
            scope: scope.notes_ref().to_string(),
            branch: scope.branch().to_string(),
        }))
    })
    .await
}

/// `POST /quit`: ask the server to shut down gracefully
pub async fn quit(State(shutdown): State<Arc<Notify>>) -> &'static str {
    tracing::info!("Shutdown requested by client");
    shutdown.notify_one();
    "Bye..."
}

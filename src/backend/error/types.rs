/**
 * Backend Error Types
 *
 * This module defines the errors raised by the annotation store, the
 * session gate and the HTTP handlers. Each variant maps to one HTTP status
 * code and renders a message that names the commit and scope involved
 * without exposing raw object-store internals.
 *
 * # Error Categories
 *
 * ## Store Errors
 *
 * - `InvalidReference` - commit id is not syntactically valid
 * - `CommitNotFound` - commit id is valid but no such commit exists
 * - `ScopeUnavailable` - no branch is checked out (e.g. detached HEAD)
 * - `StoreIo` - reading or writing a note failed
 * - `Format` - an existing note could not be decoded
 *
 * ## Gate Errors
 *
 * - `Unauthorized` - missing or mismatched session cookie or XSRF token;
 *   always rendered with the same message
 *
 * ## Handler Errors
 *
 * - `HandlerError` - bad request input, with an explicit status code
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::SharedError;

/// Message rendered for every gate rejection
pub const UNAUTHORIZED_MESSAGE: &str = "missing or invalid credentials";

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use scrutinize::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid request");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
///
/// let err = BackendError::invalid_reference("not-a-commit");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., malformed form input)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// The commit identifier is not a well-formed object id
    #[error("invalid commit reference {value:?}")]
    InvalidReference {
        /// The rejected input
        value: String,
    },

    /// The commit identifier is well-formed but names no commit
    #[error("commit {commit} not found")]
    CommitNotFound {
        commit: String,
    },

    /// The current notes scope cannot be resolved
    #[error("no review scope: {reason}")]
    ScopeUnavailable {
        /// Why the branch could not be resolved
        reason: String,
    },

    /// Reading or writing a note failed
    ///
    /// The underlying git error is kept as the source for logging but is
    /// not part of the rendered message.
    #[error("failed to {action} annotations{} in {scope}", commit_suffix(.commit))]
    StoreIo {
        /// What was being done ("read", "list", "write")
        action: &'static str,
        scope: String,
        commit: Option<String>,
        #[source]
        source: git2::Error,
    },

    /// An existing note holds a malformed frame
    #[error("malformed annotation in note {object} (scope {scope}): {source}")]
    Format {
        scope: String,
        /// Id of the note blob that failed to decode
        object: String,
        #[source]
        source: SharedError,
    },

    /// Access gate rejection
    #[error("{}", UNAUTHORIZED_MESSAGE)]
    Unauthorized,

    /// Shared error (header validation)
    #[error(transparent)]
    SharedError(#[from] SharedError),
}

fn commit_suffix(commit: &Option<String>) -> String {
    commit
        .as_ref()
        .map(|c| format!(" for {}", c))
        .unwrap_or_default()
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn invalid_reference(value: impl Into<String>) -> Self {
        Self::InvalidReference {
            value: value.into(),
        }
    }

    pub fn scope_unavailable(reason: impl Into<String>) -> Self {
        Self::ScopeUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a store I/O error
    ///
    /// # Arguments
    ///
    /// * `action` - What was being attempted
    /// * `scope` - Notes ref the operation targeted
    /// * `commit` - Commit the operation targeted, if any
    /// * `source` - Underlying git error
    pub fn store_io(
        action: &'static str,
        scope: impl Into<String>,
        commit: Option<String>,
        source: git2::Error,
    ) -> Self {
        Self::StoreIo {
            action,
            scope: scope.into(),
            commit,
            source,
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `InvalidReference`, `SharedError` - 400 Bad Request
    /// - `Unauthorized` - 401 Unauthorized
    /// - `CommitNotFound` - 404 Not Found
    /// - `ScopeUnavailable` - 409 Conflict
    /// - `StoreIo`, `Format` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::InvalidReference { .. } => StatusCode::BAD_REQUEST,
            Self::CommitNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ScopeUnavailable { .. } => StatusCode::CONFLICT,
            Self::StoreIo { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Format { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::SharedError(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::FormatError { .. } => StatusCode::BAD_REQUEST,
                SharedError::IoError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

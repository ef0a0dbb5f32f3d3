//! Backend Module
//!
//! Server-side code for the review server: an Axum HTTP server over the
//! annotation log of one git repository.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`notes`** - Annotation store over git notes, and its handlers
//! - **`auth`** - Single-session gate
//! - **`middleware`** - Request logging and session enforcement
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── notes/          - Annotation log
//! ├── auth/           - Session gate
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # Thread Safety
//!
//! - Repository access is blocking and runs on `spawn_blocking`
//! - Appends are serialized by the write permit
//! - The session binding is read and written under one mutex
//!
//! # Error Handling
//!
//! Handlers return `BackendError`, which renders as a JSON body with the
//! matching status code.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Annotation log
pub mod notes;

/// Backend error types
pub mod error;

/// Single-session access control
pub mod auth;

/// Middleware for request processing
pub mod middleware;

pub use error::BackendError;
pub use notes::{AnnotationStore, CommitId, GitNotes, NotesBackend, Scope, WriteGate, WritePermit};
pub use server::{create_app, AppState};

/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container, holding:
 * - The annotation store over the repository being reviewed
 * - The write gate serializing appends
 * - The single-session gate
 * - The shutdown signal raised by `POST /quit`
 *
 * # Thread Safety
 *
 * Everything is behind `Arc` and cheap to clone per request. The
 * repository handle inside the store has its own mutex; the session gate
 * guards its binding with a `std::sync::Mutex`.
 *
 * # Example
 *
 * ```rust,ignore
 * use scrutinize::backend::server::state::SharedStore;
 * use axum::extract::State;
 *
 * async fn handler(State(store): State<SharedStore>) {
 *     let scope = store.scope();
 *     // ...
 * }
 * ```
 */

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::Notify;

use crate::backend::auth::gate::SessionGate;
use crate::backend::middleware::logging::RequestLogging;
use crate::backend::notes::permit::WriteGate;
use crate::backend::notes::repo::NotesBackend;
use crate::backend::notes::store::AnnotationStore;

/// Annotation store shared by all handlers
pub type SharedStore = Arc<AnnotationStore<Box<dyn NotesBackend>>>;

/// Application state shared by every request handler
///
/// # Fields
///
/// * `store` - Annotation store for the reviewed repository
/// * `write_gate` - Hands out the single write permit
/// * `session_gate` - Single-session gate, bound by the first request
/// * `shutdown` - Notified once to stop the server gracefully
/// * `webroot` - Directory served for static files
/// * `logging` - Request logging settings
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub write_gate: WriteGate,
    pub session_gate: Arc<SessionGate>,
    pub shutdown: Arc<Notify>,
    pub webroot: PathBuf,
    pub logging: RequestLogging,
}

impl AppState {
    /// Create state for a server listening on `port`
    ///
    /// The port names the session cookie, so it must be the port actually
    /// bound, not the configured one (which may be 0).
    pub fn new(
        backend: Box<dyn NotesBackend>,
        notes_ref: impl Into<String>,
        port: u16,
        webroot: impl Into<PathBuf>,
        verbose: bool,
    ) -> Self {
        Self {
            store: Arc::new(AnnotationStore::new(backend, notes_ref)),
            write_gate: WriteGate::new(),
            session_gate: Arc::new(SessionGate::for_port(port)),
            shutdown: Arc::new(Notify::new()),
            webroot: webroot.into(),
            logging: RequestLogging { verbose },
        }
    }
}

impl FromRef<AppState> for SharedStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for WriteGate {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.write_gate.clone()
    }
}

impl FromRef<AppState> for Arc<Notify> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.shutdown.clone()
    }
}

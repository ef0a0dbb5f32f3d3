/**
 * API Route Handlers
 *
 * # Routes
 *
 * ## Annotations
 * - `GET /api/notes` - Every annotation in the current scope, grouped by commit
 * - `GET /api/notes/{commit}` - Annotations of one commit
 * - `POST /api/notes/{commit}` - Append an annotation (form-encoded)
 *
 * ## Scope
 * - `GET /api/scope` - Current notes ref and branch
 *
 * ## Control
 * - `POST /quit` - Stop the server
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::notes::handlers::{get_commit_notes, get_scope, list_notes, post_note, quit};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// All routes sit behind the session gate added in `create_router`;
/// `POST` routes additionally need the XSRF header.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/notes", get(list_notes))
        .route("/api/notes/{commit}", get(get_commit_notes).post(post_note))
        .route("/api/scope", get(get_scope))
        .route("/quit", post(quit))
}

/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. API routes (annotations, scope, quit)
 * 2. Fallback: static files from the web root
 *
 * # Middleware
 *
 * Applied to every route including the static fallback, outermost first:
 * request logging, panic recovery, then the session gate.
 */

use axum::{middleware::from_fn_with_state, Router};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, services::ServeDir};

use crate::backend::middleware::gate::session_gate;
use crate::backend::middleware::logging::{log_requests, recover_panic};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state holding the store and gates
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new());

    // Anything else is a static file
    let router = router.fallback_service(ServeDir::new(&app_state.webroot));

    let router = router.layer(
        ServiceBuilder::new()
            .layer(from_fn_with_state(app_state.logging, log_requests))
            .layer(CatchPanicLayer::custom(recover_panic))
            .layer(from_fn_with_state(app_state.session_gate.clone(), session_gate)),
    );

    router.with_state(app_state)
}

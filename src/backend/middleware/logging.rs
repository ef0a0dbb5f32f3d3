//! Request logging.
//!
//! Failed requests (status >= 400) are always logged; with `verbose`
//! every request is, and at debug level their headers too. A panicking
//! handler is turned into a logged 500 by [`recover_panic`].

use std::any::Any;
use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::backend::error::BackendError;

#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogging {
    pub verbose: bool,
}

pub async fn log_requests(
    State(logging): State<RequestLogging>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();
    if logging.verbose {
        tracing::debug!(%method, %uri, headers = ?request.headers(), "request headers");
    }

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.as_u16() >= 400 {
        tracing::warn!(%remote, %method, %uri, status = status.as_u16(), elapsed_ms, "request failed");
    } else if logging.verbose {
        tracing::info!(%remote, %method, %uri, status = status.as_u16(), elapsed_ms, "request");
    }
    if logging.verbose {
        tracing::debug!(%method, %uri, headers = ?response.headers(), "response headers");
    }
    response
}

/// Response for a handler that panicked, for `CatchPanicLayer::custom`
pub fn recover_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(%detail, "Request handler panicked");
    BackendError::handler(StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
}

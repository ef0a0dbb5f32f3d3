//! Middleware Module
//!
//! HTTP middleware applied to every route, outermost first:
//!
//! - **`logging`** - Request logging (failures always, everything when verbose)
//!   and recovery from panicking handlers
//! - **`gate`** - Single-session gate with XSRF checks on mutating requests
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware::from_fn_with_state, Router};
//! use scrutinize::backend::middleware::session_gate;
//!
//! // let router = router.layer(from_fn_with_state(gate, session_gate));
//! ```

pub mod gate;
pub mod logging;

pub use gate::{cookie_value, session_gate, XSRF_COOKIE, XSRF_HEADER};
pub use logging::{log_requests, recover_panic, RequestLogging};

//! Backend Error Module
//!
//! This module defines error types specific to the backend server.
//! These errors are used by the annotation store, the session gate and the
//! HTTP handlers, and can be converted to HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Propagation
//!
//! Store errors are never recovered internally: a malformed note aborts the
//! whole listing, and a failed write fails the request without retrying.

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

// Re-export commonly used types
pub use types::{BackendError, UNAUTHORIZED_MESSAGE};

//! Access Control
//!
//! The review server trusts exactly one browser session. This module holds
//! the session state; `backend::middleware::gate` applies it to requests.
//!
//! # Security
//!
//! - Session and XSRF tokens are 32 random bytes, hex-encoded
//! - Tokens are compared without early exit
//! - Every rejection returns the same 401 message (no information leakage)

/// Single-session gate
pub mod gate;

pub use gate::{generate_token, Admission, Binding, SessionGate};

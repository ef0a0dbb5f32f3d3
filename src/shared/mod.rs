//! Shared Module
//!
//! This module contains the types that do not depend on the server: the
//! review message codec, its errors, and the application configuration.
//!
//! # Overview
//!
//! Everything in here is pure data handling. The codec can decode a notes
//! blob read by any means, and the configuration types can be built without
//! a running server.

/// Review message codec
pub mod message;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use message::{Header, Message, MessageReader, decode_frame, encode_frame};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, FileConfig};

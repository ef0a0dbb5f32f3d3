//! Shared Error Types
//!
//! This module defines the errors raised by the message codec and by
//! header validation. They carry no server-side types so the codec can be
//! used on its own, e.g. by tooling that inspects notes offline.
//!
//! # Error Categories
//!
//! - `FormatError` - a frame that cannot be decoded (malformed header line,
//!   unterminated body, invalid UTF-8, truncated input)
//! - `ValidationError` - a header field name or value rejected on insertion
//! - `IoError` - the underlying reader or writer failed
//!
//! # Usage
//!
//! ```rust
//! use scrutinize::shared::error::SharedError;
//!
//! let error = SharedError::validation("Sta tus", "field names may not contain spaces");
//! assert!(error.to_string().contains("Sta tus"));
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread boundaries.
use thiserror::Error;

/// Errors produced while encoding, decoding or building messages
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// The input is not a well-formed message frame
    #[error("format error at line {line}: {message}")]
    FormatError {
        /// 1-based line number within the decoded buffer
        line: usize,
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// Reading or writing the underlying stream failed
    #[error("I/O error: {message}")]
    IoError {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new format error
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::FormatError {
            line,
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by malformed input rather than I/O
    pub fn is_format(&self) -> bool {
        matches!(self, Self::FormatError { .. })
    }
}

impl From<std::io::Error> for SharedError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            message: err.to_string(),
        }
    }
}

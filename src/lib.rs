//! scrutinize - commit review annotations stored as git notes
//!
//! A small local web server for reviewing the commits of a git repository.
//! Review messages are kept as git notes, one note per commit and branch,
//! so they travel with the repository.
//!
//! # Module Structure
//!
//! - **`shared`** - Types with no server dependencies
//!   - Message codec (header + dot-stuffed body frames)
//!   - Configuration
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Annotation store over git notes
//!   - Single-session gate with XSRF protection
//!   - Axum routes and middleware
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - enables the backend modules and the binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use scrutinize::shared::message::{decode_frame, Header, Message};
//!
//! let mut header = Header::new();
//! header.add("Verdict", "ok").unwrap();
//! let frame = Message::new(header, "looks good").encode();
//! assert_eq!(decode_frame(&frame).unwrap().len(), 1);
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

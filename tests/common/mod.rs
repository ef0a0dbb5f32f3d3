//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - Throwaway git repositories
//! - `axum_test` servers that do or do not keep cookies
//! - Custom assertion macros

#[cfg(feature = "ssr")]
pub mod repo;
#[cfg(feature = "ssr")]
pub mod server;

#[cfg(feature = "ssr")]
pub use repo::*;
#[cfg(feature = "ssr")]
pub use server::*;

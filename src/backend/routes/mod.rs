//! Route Configuration Module
//!
//! This module configures all HTTP routes for the review server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation, static files, middleware
//! └── api_routes.rs   - API endpoints
//! ```
//!
//! # Route Types
//!
//! ## API Routes
//!
//! - `GET /api/notes` - All annotations in the current scope
//! - `GET /api/notes/{commit}` - Annotations of one commit
//! - `POST /api/notes/{commit}` - Append an annotation
//! - `GET /api/scope` - Current scope
//! - `POST /quit` - Stop the server
//!
//! ## Static Files
//!
//! Every other path is served from the web root.

/// Main router creation
pub mod router;

/// API endpoint handlers
pub mod api_routes;

pub use router::create_router;

//! API integration tests
//!
//! Integration tests for all API endpoints

mod notes_test;
mod session_test;

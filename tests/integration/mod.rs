//! Integration tests
//!
//! Drive the router in-process and the store against real repositories.

mod api;

//! Test suite for scrutinize
//!
//! This module organizes all tests

pub mod common;
#[cfg(feature = "ssr")]
pub mod integration;

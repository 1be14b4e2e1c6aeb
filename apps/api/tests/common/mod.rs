//! Common test utilities for API integration tests
//!
//! This module provides shared test infrastructure for integration tests,
//! including the test application fixture and request helpers.

#![allow(unused_imports)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

//! Utilities for schema_compare
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod text;

// Re-export key utility functions
pub use text::{normalize_key, similarity, Sensitivity};

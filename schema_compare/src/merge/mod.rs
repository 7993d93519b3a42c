//! Merge module for schema_compare
//!
//! This module resolves comparison results into a merged model.

pub mod resolver;

// Re-export key types
pub use resolver::{
    resolve, unresolved_conflicts, Decision, Decisions, ManualValue, MergedNode, MergedTree,
    ValueSource,
};

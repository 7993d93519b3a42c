//! Compare module for schema_compare
//!
//! This module matches two model trees and derives a per-node status.

pub mod comparator;
pub mod result;

// Re-export key types
pub use comparator::Comparator;
pub use result::{
    AttributeChange, ChangeNote, ComparisonResult, ComparisonSummary, Payload, Status,
};

use crate::error::Result;
use crate::model::SchemaObject;
use crate::options::{CompareSettings, ComparisonOptions};

/// Compare two model trees with default heuristics
pub fn compare(
    left: Option<&SchemaObject>,
    right: Option<&SchemaObject>,
    options: &ComparisonOptions,
) -> Result<ComparisonResult> {
    Comparator::new(options).compare(left, right)
}

/// Compare two revisions of a model against their common ancestor
pub fn compare_with_base(
    base: &SchemaObject,
    left: Option<&SchemaObject>,
    right: Option<&SchemaObject>,
    options: &ComparisonOptions,
    settings: CompareSettings,
) -> Result<ComparisonResult> {
    Comparator::new(options)
        .with_settings(settings)
        .with_base(Some(base))
        .compare(left, right)
}

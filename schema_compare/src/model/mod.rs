//! Model module for schema_compare
//!
//! This module holds the normalized object tree of one model snapshot,
//! independent of whether it came from a file, a live database or a catalog.

pub mod types;
pub mod walk;

// Re-export key types
pub use types::{AttributeValue, Attributes, ObjectId, ObjectKind, SchemaObject};
pub use walk::{validate, walk, ObjectPath, Walk};

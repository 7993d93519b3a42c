//! Error types for schema_compare

use std::time::Duration;
use thiserror::Error;

use crate::model::ObjectId;

/// Result type for schema_compare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for schema_compare
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Unresolved conflict: {0}")]
    UnresolvedConflict(ObjectId),

    #[error("Malformed tree: {0}")]
    MalformedTree(MalformedTree),

    #[error("Load cancelled")]
    Cancelled,

    #[error("Load timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Failures raised by model loaders, surfaced to the caller as-is
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Model not found: {0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Unauthorized(String),

    #[error("Failed to parse model {source_name}: {message}")]
    ParseFailure { source_name: String, message: String },

    #[error("Unsupported model source: {0}")]
    Unsupported(String),
}

/// Precondition violations detected while validating a model tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedTree {
    #[error("duplicate object id '{0}'")]
    DuplicateId(ObjectId),

    #[error("object '{id}' of kind {kind} cannot have children")]
    ChildrenOnLeaf { id: ObjectId, kind: String },
}

impl From<MalformedTree> for Error {
    fn from(error: MalformedTree) -> Self {
        Error::MalformedTree(error)
    }
}

/// Convert Serde JSON errors to schema_compare errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert YAML errors to schema_compare errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to schema_compare errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}

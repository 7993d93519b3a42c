//! File-based model loader
//!
//! Reads model snapshots stored as JSON, YAML or TOML documents.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::LoadError;
use crate::loader::{ModelDescriptor, ModelLoader};
use crate::model::SchemaObject;

/// Serialization format of a model file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Json,
    Yaml,
    Toml,
}

impl ModelFormat {
    pub const EXTENSIONS: [&'static str; 4] = ["json", "yaml", "yml", "toml"];

    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        match extension.as_str() {
            "json" => Some(ModelFormat::Json),
            "yaml" | "yml" => Some(ModelFormat::Yaml),
            "toml" => Some(ModelFormat::Toml),
            _ => None,
        }
    }
}

/// Parse a model document
pub fn parse_model(content: &str, format: ModelFormat, source_name: &str) -> Result<SchemaObject, LoadError> {
    let parsed = match format {
        ModelFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        ModelFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        ModelFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    };

    parsed.map_err(|message| LoadError::ParseFailure {
        source_name: source_name.to_string(),
        message,
    })
}

/// Read and parse a model file, mapping IO failures to load errors
pub async fn load_file(path: &Path) -> Result<SchemaObject, LoadError> {
    let source_name = path.display().to_string();

    let format = ModelFormat::from_path(path)
        .ok_or_else(|| LoadError::Unsupported(format!("unknown model file type: {}", source_name)))?;

    let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(source_name.clone()),
        ErrorKind::PermissionDenied => LoadError::Unauthorized(source_name.clone()),
        _ => LoadError::ParseFailure {
            source_name: source_name.clone(),
            message: e.to_string(),
        },
    })?;

    tracing::debug!(path = %source_name, bytes = content.len(), "Read model file");

    parse_model(&content, format, &source_name)
}

/// Loads models from files on the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ModelLoader for FileLoader {
    async fn load_model(&self, descriptor: &ModelDescriptor) -> Result<SchemaObject, LoadError> {
        match descriptor {
            ModelDescriptor::File(path) => load_file(path).await,
            other => Err(LoadError::Unsupported(other.to_string())),
        }
    }
}

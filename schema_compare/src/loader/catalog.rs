//! Catalog loader
//!
//! Resolves catalog entry ids to model files below a catalog root directory.
//! An entry id matches a file whose stem equals the id, in any supported
//! model format.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::LoadError;
use crate::loader::file::{load_file, ModelFormat};
use crate::loader::{ModelDescriptor, ModelLoader};
use crate::model::SchemaObject;

/// Loads catalog entries and plain files
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    root: PathBuf,
}

impl CatalogLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find the model file of a catalog entry
    pub fn locate(&self, entry_id: &str) -> Result<PathBuf, LoadError> {
        if !self.root.is_dir() {
            return Err(LoadError::NotFound(format!(
                "catalog root {}",
                self.root.display()
            )));
        }

        let mut matches: Vec<PathBuf> = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                ModelFormat::from_path(path).is_some()
                    && path.file_stem().and_then(|stem| stem.to_str()) == Some(entry_id)
            })
            .collect();

        // Shallowest, then lexicographically first, for a stable pick
        matches.sort_by(|a, b| {
            a.components()
                .count()
                .cmp(&b.components().count())
                .then_with(|| a.cmp(b))
        });

        matches
            .into_iter()
            .next()
            .ok_or_else(|| LoadError::NotFound(format!("catalog entry {}", entry_id)))
    }
}

#[async_trait]
impl ModelLoader for CatalogLoader {
    async fn load_model(&self, descriptor: &ModelDescriptor) -> Result<SchemaObject, LoadError> {
        match descriptor {
            ModelDescriptor::Catalog(entry_id) => {
                let root = self.clone();
                let entry = entry_id.clone();
                let path = tokio::task::spawn_blocking(move || root.locate(&entry))
                    .await
                    .map_err(|e| LoadError::Unsupported(format!("catalog lookup failed: {}", e)))??;
                tracing::debug!(entry = %entry_id, path = %path.display(), "Resolved catalog entry");
                load_file(&path).await
            }
            ModelDescriptor::File(path) => load_file(path).await,
            other => Err(LoadError::Unsupported(other.to_string())),
        }
    }
}

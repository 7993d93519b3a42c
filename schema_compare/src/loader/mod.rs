//! Loader module for schema_compare
//!
//! Loading a model is the only I/O the crate performs. Loads run on the tokio
//! runtime and hand back a [`LoadHandle`]; a cancelled handle never yields its
//! tree, so the comparator only ever sees completed snapshots.

pub mod catalog;
pub mod file;

use async_trait::async_trait;
use futures::future::{AbortHandle, Abortable, Aborted};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::{Error, LoadError, Result};
use crate::model::SchemaObject;

// Re-export key types
pub use catalog::CatalogLoader;
pub use file::{FileLoader, ModelFormat};

/// Where a model snapshot comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelDescriptor {
    File(PathBuf),
    Database { connection: String, environment: String },
    Catalog(String),
}

impl fmt::Display for ModelDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelDescriptor::File(path) => write!(f, "file {}", path.display()),
            ModelDescriptor::Database {
                connection,
                environment,
            } => write!(f, "database {} ({})", connection, environment),
            ModelDescriptor::Catalog(entry) => write!(f, "catalog entry {}", entry),
        }
    }
}

/// Source of model trees (file parser, live introspection, catalog)
#[async_trait]
pub trait ModelLoader: Send + Sync {
    /// Load one model snapshot
    async fn load_model(&self, descriptor: &ModelDescriptor) -> std::result::Result<SchemaObject, LoadError>;
}

/// Handle to an in-flight load
pub struct LoadHandle {
    abort: AbortHandle,
    task: JoinHandle<std::result::Result<Result<SchemaObject>, Aborted>>,
}

/// Start loading a model in the background
///
/// `timeout` is the caller's policy; the crate imposes none of its own.
pub fn spawn_load(
    loader: Arc<dyn ModelLoader>,
    descriptor: ModelDescriptor,
    timeout: Option<Duration>,
) -> LoadHandle {
    let (abort, registration) = AbortHandle::new_pair();

    let load = async move {
        tracing::debug!(source = %descriptor, "Loading model");
        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, loader.load_model(&descriptor)).await {
                Ok(result) => result.map_err(Error::from),
                Err(_) => Err(Error::Timeout(limit)),
            },
            None => loader.load_model(&descriptor).await.map_err(Error::from),
        };

        if let Err(e) = &result {
            tracing::warn!(source = %descriptor, error = %e, "Model load failed");
        }
        result
    };

    LoadHandle {
        abort,
        task: tokio::spawn(Abortable::new(load, registration)),
    }
}

impl LoadHandle {
    /// Stop the load; `wait` will report [`Error::Cancelled`]
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_cancelled(&self) -> bool {
        self.abort.is_aborted()
    }

    /// Wait for the loaded tree
    pub async fn wait(self) -> Result<SchemaObject> {
        let LoadHandle { abort, task } = self;

        match task.await {
            // A load that finished after cancellation is still discarded
            Ok(Ok(_)) if abort.is_aborted() => Err(Error::Cancelled),
            Ok(Ok(result)) => result,
            Ok(Err(Aborted)) => Err(Error::Cancelled),
            Err(e) => Err(Error::Unknown(format!("load task failed: {}", e))),
        }
    }
}

//! schema_compare: hierarchical comparison and merging of data-model snapshots
//!
//! Two model trees (a left/source and a right/target snapshot) are compared
//! under a set of comparison options. The result tree can be filtered for
//! display and resolved into a merged model once every conflict has a decision.

pub mod compare;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod model;
pub mod options;
pub mod script;
pub mod sequence;
pub mod utils;


use std::sync::Arc;

// Re-export main types for easier access
pub use compare::{compare, compare_with_base, ComparisonResult, ComparisonSummary, Status};
pub use config::Config;
pub use error::{Error, LoadError, Result};
pub use filter::{filter, StatusFilter};
pub use loader::{spawn_load, LoadHandle, ModelDescriptor, ModelLoader};
pub use merge::{resolve, Decision, Decisions, MergedTree};
pub use model::{ObjectId, ObjectKind, SchemaObject};
pub use options::{CompareSettings, ComparisonOptions, Preset, SelectedProfile};
pub use schema_compare_macros::OptionFlags;
pub use script::{Dialect, ScriptGenerator};

use compare::Comparator;
use loader::{CatalogLoader, FileLoader};
use sequence::RequestSequencer;

/// Initialize a client from the specified configuration file
pub fn init(config_path: &str) -> Result<CompareClient> {
    let config = config::load_from_file(config_path)?;
    Ok(CompareClient::new(config))
}

/// The main entry point tying configuration, loading and the comparison core together
pub struct CompareClient {
    config: Config,
    loader: Arc<dyn ModelLoader>,
    profile: SelectedProfile,
    sequencer: RequestSequencer,
}

impl CompareClient {
    /// Create a client with the loader implied by the configuration
    pub fn new(config: Config) -> Self {
        let loader: Arc<dyn ModelLoader> = match &config.loader.catalog_root {
            Some(root) => Arc::new(CatalogLoader::new(root)),
            None => Arc::new(FileLoader::new()),
        };
        Self::with_loader(config, loader)
    }

    /// Create a client with a caller-supplied loader
    pub fn with_loader(config: Config, loader: Arc<dyn ModelLoader>) -> Self {
        let profile = config.comparison.profile();
        Self {
            config,
            loader,
            profile,
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The active option profile
    pub fn profile(&self) -> &SelectedProfile {
        &self.profile
    }

    /// Mutable access for preset selection and flag toggles
    pub fn profile_mut(&mut self) -> &mut SelectedProfile {
        &mut self.profile
    }

    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    /// Start loading one model in the background
    pub fn load(&self, descriptor: ModelDescriptor) -> LoadHandle {
        spawn_load(self.loader.clone(), descriptor, self.config.loader.timeout())
    }

    /// Load both sides concurrently; an absent descriptor yields an absent model
    pub async fn load_pair(
        &self,
        left: Option<ModelDescriptor>,
        right: Option<ModelDescriptor>,
    ) -> Result<(Option<SchemaObject>, Option<SchemaObject>)> {
        let left = left.map(|descriptor| self.load(descriptor));
        let right = right.map(|descriptor| self.load(descriptor));

        tokio::try_join!(wait_optional(left), wait_optional(right))
    }

    /// Compare two loaded trees with the active profile and configured heuristics
    pub fn compare(
        &self,
        left: Option<&SchemaObject>,
        right: Option<&SchemaObject>,
        base: Option<&SchemaObject>,
    ) -> Result<ComparisonResult> {
        let options = self.profile.options();
        Comparator::new(&options)
            .with_settings(self.config.comparison.settings())
            .with_base(base)
            .compare(left, right)
    }

    /// Load and compare two models
    ///
    /// Returns `None` when a newer comparison was started on this client
    /// before this one finished.
    pub async fn compare_models(
        &self,
        left: ModelDescriptor,
        right: ModelDescriptor,
    ) -> Result<Option<ComparisonResult>> {
        let ticket = self.sequencer.begin();
        let (left, right) = self.load_pair(Some(left), Some(right)).await?;
        let result = self.compare(left.as_ref(), right.as_ref(), None)?;

        let summary = result.summary();
        tracing::info!(
            profile = self.profile.name(),
            ticket = ticket.sequence(),
            changed = summary.changed(),
            conflicts = summary.conflict,
            "Models compared"
        );

        Ok(self.sequencer.accept(ticket, result))
    }

    /// Resolve a comparison result with the given decisions
    pub fn resolve(&self, result: &ComparisonResult, decisions: &Decisions) -> Result<MergedTree> {
        merge::resolve(result, decisions)
    }

    /// Reduce a result tree for display
    pub fn filter(
        &self,
        result: &ComparisonResult,
        status: StatusFilter,
        query: &str,
    ) -> Option<ComparisonResult> {
        filter::filter(result, status, query)
    }
}

async fn wait_optional(handle: Option<LoadHandle>) -> Result<Option<SchemaObject>> {
    match handle {
        Some(handle) => handle.wait().await.map(Some),
        None => Ok(None),
    }
}

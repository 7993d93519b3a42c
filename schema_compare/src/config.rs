//! Configuration handling for schema_compare

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::options::{CompareSettings, Preset, SelectedProfile};

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete schema_compare configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub comparison: ComparisonConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    pub logging: Option<LoggingConfig>,
}

/// Comparison behaviour configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ComparisonConfig {
    #[serde(default = "default_preset")]
    pub preset: Preset,
    /// Flag overrides applied on top of the preset, keyed like `compareTriggers`
    #[serde(default)]
    pub overrides: BTreeMap<String, bool>,
    #[serde(default = "default_rename_threshold")]
    pub rename_threshold: f64,
    #[serde(default = "default_conflict_field_threshold")]
    pub conflict_field_threshold: usize,
}

fn default_preset() -> Preset {
    Preset::Complete
}

fn default_rename_threshold() -> f64 {
    CompareSettings::default().rename_threshold
}

fn default_conflict_field_threshold() -> usize {
    CompareSettings::default().conflict_field_threshold
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            overrides: BTreeMap::new(),
            rename_threshold: default_rename_threshold(),
            conflict_field_threshold: default_conflict_field_threshold(),
        }
    }
}

impl ComparisonConfig {
    /// The selected profile: the preset, turned custom by any known override
    pub fn profile(&self) -> SelectedProfile {
        let mut profile = SelectedProfile::Preset(self.preset);
        for (key, value) in &self.overrides {
            if !profile.set(key, *value) {
                tracing::warn!(key = %key, "Ignoring unknown comparison option");
            }
        }
        profile
    }

    pub fn settings(&self) -> CompareSettings {
        CompareSettings {
            rename_threshold: self.rename_threshold,
            conflict_field_threshold: self.conflict_field_threshold,
        }
    }
}

/// Model loading configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct LoaderConfig {
    pub catalog_root: Option<String>,
    pub timeout_seconds: Option<u64>,
}

impl LoaderConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}

//! Logging utilities for schema_compare
//!
//! This module provides logging setup and configuration.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Parse a level name, defaulting to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Filter that lets `level` and above through for this crate
pub fn env_filter(level: &str) -> Result<EnvFilter> {
    let directive = format!("schema_compare={}", parse_level(level))
        .parse::<Directive>()
        .map_err(|e| Error::ConfigError(format!("Invalid log directive: {}", e)))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Destination of log lines; `None` when logging is switched off
fn make_writer(config: &LoggingConfig) -> Result<Option<(BoxMakeWriter, bool)>> {
    match &config.file {
        Some(file_path) => {
            if let Some(parent) = Path::new(file_path).parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(file_path)?;
            Ok(Some((BoxMakeWriter::new(Mutex::new(file)), false)))
        }
        None if config.stdout => Ok(Some((BoxMakeWriter::new(std::io::stdout), true))),
        None => Ok(None),
    }
}

/// Initialize logging based on configuration
pub fn init_logging(config: &Option<LoggingConfig>) -> Result<()> {
    let Some(config) = config else {
        return Ok(());
    };
    let Some((writer, ansi)) = make_writer(config)? else {
        return Ok(());
    };

    let layer: Box<dyn Layer<Registry> + Send + Sync> = if config.format.eq_ignore_ascii_case("json") {
        fmt::layer().json().with_writer(writer).boxed()
    } else {
        fmt::layer().with_writer(writer).with_ansi(ansi).boxed()
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter(&config.level)?)
        .try_init()
        .map_err(|e| Error::Unknown(e.to_string()))
}

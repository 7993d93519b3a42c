use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use schema_compare::config::{self, LoggingConfig};
use schema_compare::loader::ModelDescriptor;
use schema_compare::utils::logging::init_logging;
use schema_compare::{CompareClient, Config, Decisions, Preset, StatusFilter};

#[derive(Parser)]
#[command(name = "schema_compare")]
#[command(about = "Compare and merge data-model snapshots")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Log level when no logging section is configured
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two model files and print the result tree as JSON
    Compare {
        /// Left (source) model file
        left: PathBuf,

        /// Right (target) model file
        right: PathBuf,

        /// Common ancestor for a three-way comparison
        #[arg(long)]
        base: Option<PathBuf>,

        /// Option preset, overriding the configured one
        #[arg(short, long)]
        preset: Option<Preset>,

        /// Flag override as key=value, e.g. compareTriggers=false
        #[arg(long = "set", value_parser = parse_flag)]
        overrides: Vec<(String, bool)>,

        /// Status filter: all, changed, equal, different, left-only, right-only or conflict
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,

        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        query: String,

        /// JSON file of merge decisions; prints the merged tree instead
        #[arg(short, long)]
        decisions: Option<PathBuf>,

        /// Print per-status counts only
        #[arg(long)]
        summary: bool,
    },
    /// List the option presets and their flags
    Presets,
}

fn parse_flag(raw: &str) -> std::result::Result<(String, bool), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {}", raw))?;
    let value = value
        .trim()
        .parse::<bool>()
        .map_err(|e| format!("invalid value for {}: {}", key, e))?;
    Ok((key.trim().to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::default(),
    };

    let logging = config.logging.clone().or_else(|| {
        Some(LoggingConfig {
            level: args.log_level.clone(),
            file: None,
            format: "text".to_string(),
            stdout: true,
        })
    });
    init_logging(&logging)?;

    match args.command {
        Commands::Compare {
            left,
            right,
            base,
            preset,
            overrides,
            status,
            query,
            decisions,
            summary,
        } => {
            let request = CompareRequest {
                left,
                right,
                base,
                preset,
                overrides,
                status,
                query,
                decisions,
                summary,
            };
            compare_command(config, request).await
        }
        Commands::Presets => presets_command(),
    }
}

struct CompareRequest {
    left: PathBuf,
    right: PathBuf,
    base: Option<PathBuf>,
    preset: Option<Preset>,
    overrides: Vec<(String, bool)>,
    status: StatusFilter,
    query: String,
    decisions: Option<PathBuf>,
    summary: bool,
}

async fn compare_command(config: Config, request: CompareRequest) -> Result<()> {
    let mut client = CompareClient::new(config);

    if let Some(preset) = request.preset {
        client.profile_mut().select(preset);
    }
    for (key, value) in &request.overrides {
        if !client.profile_mut().set(key, *value) {
            anyhow::bail!("Unknown comparison option: {}", key);
        }
    }

    let (left, right) = client
        .load_pair(
            Some(ModelDescriptor::File(request.left.clone())),
            Some(ModelDescriptor::File(request.right.clone())),
        )
        .await?;

    let base = match &request.base {
        Some(path) => Some(client.load(ModelDescriptor::File(path.clone())).wait().await?),
        None => None,
    };

    let result = client.compare(left.as_ref(), right.as_ref(), base.as_ref())?;
    info!(
        profile = client.profile().name(),
        conflicts = result.conflict_ids().len(),
        "Comparison complete"
    );

    if request.summary {
        println!("{}", serde_json::to_string_pretty(&result.summary())?);
        return Ok(());
    }

    if let Some(path) = &request.decisions {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read decisions file: {}", path.display()))?;
        let decisions: Decisions = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse decisions file: {}", path.display()))?;
        let merged = client.resolve(&result, &decisions)?;
        println!("{}", serde_json::to_string_pretty(&merged)?);
        return Ok(());
    }

    match client.filter(&result, request.status, &request.query) {
        Some(filtered) => println!("{}", serde_json::to_string_pretty(&filtered)?),
        None => println!("null"),
    }

    Ok(())
}

fn presets_command() -> Result<()> {
    for preset in Preset::ALL {
        let options = preset.options();
        let enabled: Vec<&str> = schema_compare::ComparisonOptions::FLAG_KEYS
            .iter()
            .copied()
            .filter(|key| options.flag(key).unwrap_or(false))
            .collect();
        println!("{}: {}", preset, enabled.join(", "));
    }
    Ok(())
}

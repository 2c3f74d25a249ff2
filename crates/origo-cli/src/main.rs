//! origo CLI: run origin determinations from the command line.
//!
//! Loads a calculation request and a rule catalog from YAML, runs the
//! deterministic engine and, when a consensus configuration is given, the
//! multi-provider consensus layer on top.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use origo_core::{OriginCalculationRequest, OriginEngine, StaticCatalog};
use origo_runtime::{
    ConsensusConfig, ConsensusOrchestrator, MemoryAuditSink, MemoryReviewQueue,
};

#[derive(Parser, Debug)]
#[command(name = "origo", version, about = "Preferential-origin determination engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one origin calculation
    Calculate {
        /// Calculation request document (YAML)
        #[arg(long)]
        request: PathBuf,

        /// Rule catalog document (YAML)
        #[arg(long)]
        rules: PathBuf,

        /// Consensus configuration (YAML); omit to skip the consensus layer
        #[arg(long)]
        consensus: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// List configured reasoning providers and their status
    Providers {
        /// Consensus configuration (YAML)
        #[arg(long)]
        consensus: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Calculate {
            request,
            rules,
            consensus,
            format,
        } => calculate(request, rules, consensus, format).await,
        Commands::Providers { consensus } => providers(consensus),
    }
}

async fn calculate(
    request_path: PathBuf,
    rules_path: PathBuf,
    consensus_path: Option<PathBuf>,
    format: Format,
) -> Result<()> {
    let request_yaml = std::fs::read_to_string(&request_path)
        .with_context(|| format!("reading request {}", request_path.display()))?;
    let request: OriginCalculationRequest =
        serde_yaml::from_str(&request_yaml).context("parsing request document")?;

    let catalog = StaticCatalog::from_yaml_file(&rules_path)
        .with_context(|| format!("loading rule catalog {}", rules_path.display()))?;

    let engine = OriginEngine::new(Arc::new(catalog));
    let (result, evaluations) = engine.calculate_with_evaluations(&request);

    let result = match consensus_path {
        Some(path) => {
            let config = ConsensusConfig::from_yaml_file(&path)
                .with_context(|| format!("loading consensus config {}", path.display()))?;
            let audit = Arc::new(MemoryAuditSink::new());
            let reviews = Arc::new(MemoryReviewQueue::new());
            let orchestrator = ConsensusOrchestrator::builder(config)
                .audit_sink(audit)
                .review_queue(reviews)
                .build();
            orchestrator.enrich(&request, &evaluations, &result).await
        }
        None => result,
    };

    let rendered = match format {
        Format::Json => serde_json::to_string_pretty(&result)?,
        Format::Yaml => serde_yaml::to_string(&result)?,
    };
    println!("{}", rendered);
    Ok(())
}

fn providers(consensus_path: PathBuf) -> Result<()> {
    let config = ConsensusConfig::from_yaml_file(&consensus_path)
        .with_context(|| format!("loading consensus config {}", consensus_path.display()))?;

    if config.providers.is_empty() {
        println!("No providers configured; consensus will be synthetic.");
        return Ok(());
    }

    for provider in &config.providers {
        let missing = provider.missing_fields();
        if missing.is_empty() {
            println!("{:<24} active", provider.name());
        } else {
            println!("{:<24} inactive (missing {})", provider.name(), missing.join(", "));
        }
    }
    Ok(())
}

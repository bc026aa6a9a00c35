//! ContextWeave CLI — the main entry point.
//!
//! Commands:
//! - `budget`    — Show a model's limits and budget partition
//! - `analyze`   — Score a request and render its cognitive scaffold
//! - `normalize` — Normalize a `{messages, tools}` JSON file
//! - `assemble`  — Run a full turn from a JSON fixture
//! - `config`    — Show the effective configuration

use anyhow::Context;
use clap::{Parser, Subcommand};
use contextweave_agent::ProviderFormat;
use contextweave_config::AppConfig;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "contextweave",
    about = "ContextWeave — prompt and context orchestration",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.contextweave/config.toml
    #[arg(short, long, global = true, env = "CONTEXTWEAVE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a model's limits and budget partition
    Budget {
        /// Model identifier (lists known models when omitted)
        model: Option<String>,
    },

    /// Score a request and render its cognitive scaffold
    Analyze {
        /// The user request to analyze
        message: String,

        /// Render the one-line scaffold instead of the full one
        #[arg(long)]
        minimal: bool,
    },

    /// Normalize a JSON file of `{messages, tools}`
    Normalize {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Assemble a full turn from a JSON fixture
    Assemble {
        /// Path to the fixture
        file: PathBuf,

        /// Tool payload convention to print
        #[arg(long, default_value = "openai")]
        format: ProviderFormat,

        /// Print the assembled turn as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Print the config file path instead
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    tracing::debug!(model = %config.default_model, "Configuration loaded");

    match cli.command {
        Commands::Budget { model } => commands::budget::run(&config, model.as_deref())?,
        Commands::Analyze { message, minimal } => {
            commands::analyze::run(&config, &message, minimal)?
        }
        Commands::Normalize { file } => commands::normalize::run(&file)?,
        Commands::Assemble { file, format, json } => {
            commands::assemble::run(&config, &file, format, json).await?
        }
        Commands::Config { path } => commands::config_cmd::run(&config, cli.config, path)?,
    }

    Ok(())
}

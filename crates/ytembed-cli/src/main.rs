//! YtEmbed CLI - embed adapter inspection tool
//!
//! Features:
//! - Content id extraction from provider URLs
//! - Media type detection
//! - Provider state code translation
//! - Simulated adapter runs with a full event log

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod console;
mod output;

/// YtEmbed CLI - embedded player adapter toolkit
#[derive(Parser)]
#[command(name = "ytembed-cli")]
#[command(version)]
#[command(about = "Inspect embed URLs, state translation and simulated adapter runs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Emit log lines as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the content id from one or more URLs
    Extract {
        /// Media reference URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Detect the media type of a URL
    Detect {
        /// Media reference URL
        url: String,
    },

    /// Translate a sequence of provider state codes
    Translate {
        /// Provider state codes, in arrival order
        #[arg(required = true, allow_hyphen_values = true)]
        codes: Vec<i32>,
    },

    /// Run an adapter against the simulated provider
    Simulate {
        /// Media source URL
        #[arg(default_value = "https://youtu.be/abc123")]
        src: String,

        /// Adapter options as a JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Volume set before the player is ready
        #[arg(long, default_value = "0.5")]
        volume: f64,

        /// Element requests autoplay
        #[arg(long)]
        autoplay: bool,

        /// Provider state codes reported after ready
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true, default_value = "5,1,2,0")]
        states: Vec<i32>,

        /// Delay between reported states in milliseconds
        #[arg(long, default_value = "600")]
        step_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose { "debug" } else { "info" };
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(level)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_writer(std::io::stderr)
            .init();
    }

    ytembed_core::init();

    match cli.command {
        Commands::Extract { urls } => {
            commands::extract(&urls, &cli.format)?;
        }
        Commands::Detect { url } => {
            commands::detect(&url, &cli.format)?;
        }
        Commands::Translate { codes } => {
            commands::translate(&codes, &cli.format)?;
        }
        Commands::Simulate { src, config, volume, autoplay, states, step_ms } => {
            let run = commands::SimulateArgs {
                src,
                config,
                volume,
                autoplay,
                states,
                step_ms,
            };
            commands::simulate(run, &cli.format).await?;
        }
    }

    Ok(())
}

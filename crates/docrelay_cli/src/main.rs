//! docrelay CLI
//!
//! Incremental REST-to-REST document replication daemon.
//!
//! # Commands
//!
//! - `run` - Run the scheduled replication daemon
//! - `tick` - Run a single reconciliation pass
//! - `pending` - List status records awaiting delivery
//! - `version` - Show version information

mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use config::Settings;

/// Incremental REST-to-REST document replication.
#[derive(Parser)]
#[command(name = "docrelay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(global = true, short, long, default_value = "docrelay.yaml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduled replication daemon
    Run,

    /// Run a single reconciliation pass and exit
    Tick,

    /// List status records awaiting delivery
    Pending,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run => {
            let settings = Settings::load(&cli.config)?;
            commands::run::run(&settings)?;
        }
        Commands::Tick => {
            let settings = Settings::load(&cli.config)?;
            commands::tick::run(&settings)?;
        }
        Commands::Pending => {
            let settings = Settings::load(&cli.config)?;
            commands::pending::run(&settings)?;
        }
        Commands::Version => {
            println!("docrelay v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

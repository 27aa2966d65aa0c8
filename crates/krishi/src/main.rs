// SPDX-FileCopyrightText: 2026 Krishi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Krishi - agricultural assistant server.
//!
//! This is the binary entry point: it loads configuration and dispatches
//! to `serve` or `check-config`.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use krishi_config::ConfigError;
use krishi_config::model::KrishiConfig;

mod check;
mod serve;

/// Krishi - crop disease and pest detection with a weather-aware assistant.
#[derive(Parser, Debug)]
#[command(name = "krishi", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,
    /// Load and validate configuration, then print a summary.
    CheckConfig,
}

fn load(path: Option<&PathBuf>) -> Result<KrishiConfig, Vec<ConfigError>> {
    match path {
        Some(path) => krishi_config::load_and_validate_path(path),
        None => krishi_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            krishi_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config).await,
        Commands::CheckConfig => check::run_check_config(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

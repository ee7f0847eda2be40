//! # lcv CLI entry point
//!
//! Parses command-line arguments, installs logging, loads the
//! configuration file, and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lcv_cli::config::VerifierConfig;
use lcv_cli::normalize::{run_normalize, NormalizeArgs};
use lcv_cli::verify::{run_verify, VerifyArgs};

/// Component lifecycle verifier.
///
/// Normalizes declarative component metadata and checks component classes
/// against it, failing the build on any error.
#[derive(Parser, Debug)]
#[command(name = "lcv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true, default_value = "lcv.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Normalize a raw descriptor document and print the canonical form.
    Normalize(NormalizeArgs),

    /// Verify component classes described by canonical descriptors.
    Verify(VerifyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = VerifierConfig::load_or_default(&cli.config).and_then(|config| {
        tracing::debug!(config = %cli.config.display(), "loaded configuration");
        match &cli.command {
            Commands::Normalize(args) => run_normalize(args, &config),
            Commands::Verify(args) => run_verify(args, &config),
        }
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

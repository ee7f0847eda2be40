//! # Verify Subcommand
//!
//! Verifies every class in a set of canonical descriptor documents against
//! the build's type catalog and schema resources.
//!
//! ```bash
//! lcv verify                      # descriptors listed in lcv.yaml
//! lcv verify build/descriptors    # or explicit files and directories
//! lcv verify --format json build/descriptors
//! ```
//!
//! Prints one `class: [Severity] description` line per issue. Exits 1 if
//! any error-severity issue was found; notices alone exit 0.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use lcv_schema::SchemaValidator;
use lcv_verify::{ComponentVerifier, DirectoryResources, TypeCatalog};

use crate::config::VerifierConfig;
use crate::documents::load_all;

/// Report format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per issue.
    #[default]
    Text,
    /// The whole batch report as JSON.
    Json,
}

/// Arguments for the verify subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Descriptor files or directories. Defaults to `descriptors` from the config file.
    pub paths: Vec<PathBuf>,

    /// Type catalog document, overriding the config file.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Execute the verify subcommand.
pub fn run_verify(args: &VerifyArgs, config: &VerifierConfig) -> Result<u8> {
    let validator = SchemaValidator::builtin()?;

    let catalog = match args.catalog.as_ref().or(config.catalog.as_ref()) {
        Some(path) => TypeCatalog::load(path, &validator)
            .with_context(|| format!("failed to load type catalog: {}", path.display()))?,
        None => {
            tracing::warn!("no type catalog configured; only built-in types are known");
            TypeCatalog::default()
        }
    }
    .with_builtins();

    let paths = if args.paths.is_empty() {
        &config.descriptors
    } else {
        &args.paths
    };
    if paths.is_empty() {
        bail!("no descriptor documents given and none configured");
    }
    let descriptors = load_all(paths, &validator)?;
    if descriptors.is_empty() {
        tracing::warn!(paths = paths.len(), "no descriptors found; nothing to verify");
    }

    let resources = DirectoryResources::new(config.resource_roots.iter().cloned());
    let verifier = ComponentVerifier::new(&catalog, resources);
    let report = verifier.verify_batch(&descriptors);

    match args.format {
        OutputFormat::Text => {
            for line in report.render_lines() {
                println!("{line}");
            }
            println!(
                "{} classes, {} errors, {} notices",
                report.classes.len(),
                report.error_count(),
                report.notice_count()
            );
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(if report.is_valid() { 0 } else { 1 })
}

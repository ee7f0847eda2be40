//! # Normalize Subcommand
//!
//! Turns raw descriptors (attributes as written in source) into canonical
//! descriptors and prints them as YAML.
//!
//! ```bash
//! lcv normalize build/raw/Mailer.yaml > build/descriptors/Mailer.yaml
//! ```
//!
//! Classes without the component marker are reported on stderr and left
//! out. Malformed attributes are configuration errors and exit with 2.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use lcv_core::ClassDescriptor;
use lcv_meta::{AttributeNormalizer, ComponentFilter, FilterMatch};
use lcv_schema::SchemaValidator;
use lcv_verify::TypeCatalog;
use serde::Serialize;

use crate::config::VerifierConfig;
use crate::documents::load_descriptors;

/// Exit code for malformed source metadata.
pub const EXIT_CONFIGURATION_ERROR: u8 = 2;

/// Arguments for the normalize subcommand.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Raw descriptor document (YAML or JSON).
    pub path: PathBuf,
}

#[derive(Serialize)]
struct CanonicalDocument<'a> {
    classes: &'a [ClassDescriptor],
}

/// Execute the normalize subcommand.
pub fn run_normalize(args: &NormalizeArgs, config: &VerifierConfig) -> Result<u8> {
    let validator = SchemaValidator::builtin()?;
    let raw = load_descriptors(&args.path, &validator)?;

    let mut resolver = config.resolver();
    if let Some(catalog_path) = &config.catalog {
        let catalog = load_catalog(catalog_path, &validator)?;
        resolver = resolver.with_known_types(catalog.type_names());
    }
    let normalizer = AttributeNormalizer::new(resolver);
    let filter = ComponentFilter::new();

    let mut canonical = Vec::new();
    for class in &raw {
        if filter.check(class) == FilterMatch::NoMatch {
            eprintln!("{}: not a component, skipped", class.name());
            continue;
        }
        match normalizer.normalize_class(class) {
            Ok(normalized) => canonical.push(normalized),
            Err(e) => {
                tracing::error!(class = class.name(), "{e}");
                eprintln!("{}: {e}", class.name());
                return Ok(EXIT_CONFIGURATION_ERROR);
            }
        }
    }

    let yaml = match canonical.as_slice() {
        [] => return Ok(0),
        [single] => serde_yaml::to_string(single)?,
        many => serde_yaml::to_string(&CanonicalDocument { classes: many })?,
    };
    print!("{yaml}");
    tracing::info!(classes = canonical.len(), "normalized descriptors");
    Ok(0)
}

fn load_catalog(path: &Path, validator: &SchemaValidator) -> Result<TypeCatalog> {
    TypeCatalog::load(path, validator)
        .with_context(|| format!("failed to load type catalog: {}", path.display()))
}

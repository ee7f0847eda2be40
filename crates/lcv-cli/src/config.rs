//! # Configuration File
//!
//! `lcv.yaml` tells the CLI where the build's type catalog, schema
//! resources, and descriptor documents live, and how the normalizer
//! resolves unqualified type names:
//!
//! ```yaml
//! catalog: build/types.yaml
//! resource_roots: [src/main/resources]
//! descriptors: [build/descriptors]
//! imports:
//!   Store: org.store.Store
//! implicit_packages: [java.lang]
//! ```
//!
//! Every field is optional. Relative paths are resolved against the
//! directory holding the configuration file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lcv_meta::ImportResolver;
use serde::Deserialize;

/// Settings read from `lcv.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VerifierConfig {
    /// Type catalog document backing the class loader.
    pub catalog: Option<PathBuf>,
    /// Directories searched when checking that schema documents exist.
    pub resource_roots: Vec<PathBuf>,
    /// Descriptor files or directories verified when none are given on the command line.
    pub descriptors: Vec<PathBuf>,
    /// Simple name to fully-qualified name.
    pub imports: BTreeMap<String, String>,
    /// Packages searched for unqualified names after the class's own package.
    pub implicit_packages: Vec<String>,
}

impl VerifierConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.relative_to(base))
    }

    /// Like [`VerifierConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    fn relative_to(mut self, base: &Path) -> Self {
        let join = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        self.catalog = self.catalog.map(join);
        self.resource_roots = self.resource_roots.into_iter().map(join).collect();
        self.descriptors = self.descriptors.into_iter().map(join).collect();
        self
    }

    /// Type resolver for the normalizer, seeded with the configured imports
    /// and implicit packages.
    pub fn resolver(&self) -> ImportResolver {
        let resolver = self
            .imports
            .iter()
            .fold(ImportResolver::new(), |r, (simple, qualified)| {
                r.with_alias(simple.clone(), qualified.clone())
            });
        self.implicit_packages
            .iter()
            .fold(resolver, |r, package| r.with_implicit_package(package.clone()))
    }
}

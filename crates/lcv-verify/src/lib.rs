//! # lcv-verify: Component Verification
//!
//! Checks each component class against its canonical metadata and reports
//! every problem found as a [`VerifyIssue`](lcv_core::VerifyIssue).
//!
//! ## Pieces
//!
//! - [`types`]: the read-only collaborators. [`TypeFacts`] describes one
//!   type, [`ClassLoader`] finds types by name, [`ResourceLocator`] checks
//!   that schema documents exist.
//! - [`catalog`]: [`TypeCatalog`], a class loader built from a YAML or
//!   JSON catalog document.
//! - [`rules`]: the rule battery, one [`Rule`] per concern.
//! - [`verifier`]: [`ComponentVerifier`], which runs the battery.
//! - [`batch`]: per-class reports for a whole run.
//!
//! ## Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use lcv_core::{Attribute, ClassDescriptor};
//! use lcv_verify::{ClassLoader, ComponentVerifier, TypeCatalog, TypeSpec};
//!
//! let catalog = TypeCatalog::from_specs([TypeSpec::class("org.example.Mailer")]).unwrap();
//! let verifier = ComponentVerifier::new(&catalog, BTreeSet::<String>::new());
//!
//! let descriptor = ClassDescriptor::new(
//!     "org.example.Mailer",
//!     vec![Attribute::new("component")],
//!     vec![],
//!     vec![],
//! )
//! .unwrap();
//! let class = catalog.load("org.example.Mailer").unwrap();
//! assert!(verifier.verify_type(class, &descriptor).is_empty());
//! ```

pub mod batch;
pub mod catalog;
pub mod rules;
pub mod types;
pub mod verifier;

pub use batch::{BatchReport, ClassReport};
pub use catalog::{CatalogError, CatalogType, TypeCatalog, TypeSpec};
pub use rules::{default_rules, Rule, RuleContext, RuleError};
pub use types::{ClassLoader, DirectoryResources, LoadError, ResourceLocator, TypeFacts, TypeKind};
pub use verifier::ComponentVerifier;

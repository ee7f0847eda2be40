//! # Type Catalog
//!
//! A [`ClassLoader`] backed by an explicit list of type facts, usually read
//! from a YAML or JSON catalog document:
//!
//! ```yaml
//! types:
//!   - name: org.example.Mailer
//!     extends: [org.example.Sender]
//!   - name: org.example.Sender
//!     kind: interface
//! ```
//!
//! Omitted flags default to a public, non-abstract class with a public
//! no-argument constructor. Supertype lists are direct; the catalog closes
//! them transitively when it is built. Supertypes the catalog does not
//! define are still recorded by name.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::path::Path;

use lcv_core::Capability;
use lcv_schema::{SchemaValidationError, SchemaValidator, TYPE_CATALOG_SCHEMA};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ClassLoader, LoadError, TypeFacts, TypeKind};

/// Primitive type names registered by [`TypeCatalog::with_builtins`].
const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Error building a type catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Two entries share a name.
    #[error("type '{0}' is defined more than once")]
    DuplicateType(String),

    /// The catalog document failed to load or validate.
    #[error(transparent)]
    Document(#[from] SchemaValidationError),

    /// The validated document could not be deserialized.
    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),
}

fn yes() -> bool {
    true
}

/// Facts about one type as written in a catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    /// Fully-qualified name.
    pub name: String,
    /// Structural category.
    #[serde(default)]
    pub kind: TypeKind,
    /// Publicly visible.
    #[serde(default = "yes")]
    pub public: bool,
    /// Declared abstract.
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Has a public no-argument constructor.
    #[serde(default = "yes")]
    pub default_constructor: bool,
    /// Direct supertypes (superclass and implemented interfaces).
    #[serde(default)]
    pub extends: Vec<String>,
}

impl TypeSpec {
    /// A public concrete class with a public no-argument constructor.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            public: true,
            is_abstract: false,
            default_constructor: true,
            extends: Vec::new(),
        }
    }

    /// A public interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Interface,
            is_abstract: true,
            default_constructor: false,
            ..Self::class(name)
        }
    }

    /// A primitive type.
    pub fn primitive(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Primitive,
            default_constructor: false,
            ..Self::class(name)
        }
    }

    /// Builder-style direct supertype.
    pub fn extending(mut self, supertype: impl Into<String>) -> Self {
        self.extends.push(supertype.into());
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    types: Vec<TypeSpec>,
}

/// A catalog entry with its supertypes closed transitively.
#[derive(Debug, Clone)]
pub struct CatalogType {
    spec: TypeSpec,
    ancestors: BTreeSet<String>,
}

impl CatalogType {
    /// The entry as written.
    pub fn spec(&self) -> &TypeSpec {
        &self.spec
    }

    /// Every transitive supertype name.
    pub fn ancestors(&self) -> &BTreeSet<String> {
        &self.ancestors
    }
}

impl TypeFacts for CatalogType {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn kind(&self) -> TypeKind {
        self.spec.kind
    }

    fn is_abstract(&self) -> bool {
        self.spec.is_abstract || self.spec.kind == TypeKind::Interface
    }

    fn is_public(&self) -> bool {
        self.spec.public
    }

    fn has_public_no_arg_constructor(&self) -> bool {
        self.spec.kind == TypeKind::Class && self.spec.default_constructor
    }

    fn implements(&self, type_name: &str) -> bool {
        self.spec.name == type_name || self.ancestors.contains(type_name)
    }
}

/// Class loader over an explicit set of types.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: BTreeMap<String, CatalogType>,
}

impl TypeCatalog {
    /// Build a catalog from type specs.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateType`] if a name appears twice.
    pub fn from_specs(specs: impl IntoIterator<Item = TypeSpec>) -> Result<Self, CatalogError> {
        let mut by_name: BTreeMap<String, TypeSpec> = BTreeMap::new();
        for spec in specs {
            if by_name.contains_key(&spec.name) {
                return Err(CatalogError::DuplicateType(spec.name));
            }
            by_name.insert(spec.name.clone(), spec);
        }
        Ok(Self::close(by_name))
    }

    /// Build a catalog from a parsed catalog document.
    pub fn from_document(document: serde_json::Value) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_value(document)?;
        Self::from_specs(doc.types)
    }

    /// Load, validate, and build a catalog from a YAML or JSON file.
    pub fn load(path: &Path, validator: &SchemaValidator) -> Result<Self, CatalogError> {
        let document = validator.validate_file(path, TYPE_CATALOG_SCHEMA)?;
        let catalog = Self::from_document(document)?;
        tracing::debug!(path = %path.display(), types = catalog.len(), "loaded type catalog");
        Ok(catalog)
    }

    /// Add the primitive types and lifecycle capability interfaces unless
    /// the catalog already defines them.
    pub fn with_builtins(self) -> Self {
        let mut specs: Vec<TypeSpec> = self.types.into_values().map(|t| t.spec).collect();
        let defined: BTreeSet<String> = specs.iter().map(|s| s.name.clone()).collect();

        let builtins = PRIMITIVE_TYPES
            .iter()
            .map(|name| TypeSpec::primitive(*name))
            .chain(
                Capability::ALL
                    .iter()
                    .map(|c| TypeSpec::interface(c.interface_name())),
            );
        specs.extend(builtins.filter(|s| !defined.contains(&s.name)));

        Self::close(specs.into_iter().map(|s| (s.name.clone(), s)).collect())
    }

    fn close(by_name: BTreeMap<String, TypeSpec>) -> Self {
        let types = by_name
            .iter()
            .map(|(name, spec)| {
                let ancestors = close_supertypes(spec, &by_name);
                (
                    name.clone(),
                    CatalogType {
                        spec: spec.clone(),
                        ancestors,
                    },
                )
            })
            .collect();
        Self { types }
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Look up an entry.
    pub fn get(&self, name: &str) -> Option<&CatalogType> {
        self.types.get(name)
    }
}

impl ClassLoader for TypeCatalog {
    fn load(&self, name: &str) -> Result<&dyn TypeFacts, LoadError> {
        self.types
            .get(name)
            .map(|t| t as &dyn TypeFacts)
            .ok_or_else(|| LoadError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Breadth-first closure of a type's supertypes. Cycles terminate because
/// each name is visited once.
fn close_supertypes(spec: &TypeSpec, by_name: &BTreeMap<String, TypeSpec>) -> BTreeSet<String> {
    let mut ancestors = BTreeSet::new();
    let mut queue: VecDeque<&str> = spec.extends.iter().map(String::as_str).collect();
    while let Some(next) = queue.pop_front() {
        if next == spec.name || !ancestors.insert(next.to_string()) {
            continue;
        }
        if let Some(parent) = by_name.get(next) {
            queue.extend(parent.extends.iter().map(String::as_str));
        }
    }
    ancestors
}

//! # Type Facts & Collaborators
//!
//! The verifier never reflects over real types. Everything it needs to
//! know about a type comes through [`TypeFacts`], and types are obtained
//! by name through a [`ClassLoader`]. Schema documents are checked through
//! a [`ResourceLocator`]. All three are read-only and safe to share.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// A concrete or abstract class.
    #[default]
    Class,
    /// An interface.
    Interface,
    /// A primitive such as `int`.
    Primitive,
    /// An array type.
    Array,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Primitive => "primitive",
            Self::Array => "array",
        };
        f.write_str(s)
    }
}

/// Structural facts about a loaded type.
pub trait TypeFacts {
    /// Fully-qualified name.
    fn name(&self) -> &str;

    /// Structural category.
    fn kind(&self) -> TypeKind;

    /// Whether the type is declared abstract. Interfaces count as abstract.
    fn is_abstract(&self) -> bool;

    /// Whether the type is publicly visible.
    fn is_public(&self) -> bool;

    /// Whether the type can be instantiated through a public no-argument constructor.
    fn has_public_no_arg_constructor(&self) -> bool;

    /// Whether this type is `type_name` or a transitive subtype of it.
    fn implements(&self, type_name: &str) -> bool;

    /// Whether the type is a primitive.
    fn is_primitive(&self) -> bool {
        self.kind() == TypeKind::Primitive
    }

    /// Whether the type is an array.
    fn is_array(&self) -> bool {
        self.kind() == TypeKind::Array
    }

    /// Whether the type is an interface.
    fn is_interface(&self) -> bool {
        self.kind() == TypeKind::Interface
    }

    /// Whether a value of type `other` may be used where this type is expected.
    fn is_assignable_from(&self, other: &dyn TypeFacts) -> bool {
        other.implements(self.name())
    }
}

/// Error raised when a type cannot be loaded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No type with this name is known.
    #[error("type '{name}' not found")]
    NotFound {
        /// Requested type name.
        name: String,
    },
}

/// Loads types by fully-qualified name.
pub trait ClassLoader {
    /// Load the named type.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::NotFound`] when the type is unknown.
    fn load(&self, name: &str) -> Result<&dyn TypeFacts, LoadError>;
}

impl<T: ClassLoader + ?Sized> ClassLoader for &T {
    fn load(&self, name: &str) -> Result<&dyn TypeFacts, LoadError> {
        (**self).load(name)
    }
}

/// Answers whether a resource exists at a location.
pub trait ResourceLocator {
    /// Whether a resource exists at the `/`-separated `location`.
    fn exists(&self, location: &str) -> bool;
}

impl<T: ResourceLocator + ?Sized> ResourceLocator for &T {
    fn exists(&self, location: &str) -> bool {
        (**self).exists(location)
    }
}

impl ResourceLocator for BTreeSet<String> {
    fn exists(&self, location: &str) -> bool {
        self.contains(location)
    }
}

/// Resource locator searching a list of root directories.
#[derive(Debug, Clone, Default)]
pub struct DirectoryResources {
    roots: Vec<PathBuf>,
}

impl DirectoryResources {
    /// Create a locator over `roots`, searched in order.
    pub fn new(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            roots: roots.into_iter().collect(),
        }
    }

    /// Root directories searched.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ResourceLocator for DirectoryResources {
    fn exists(&self, location: &str) -> bool {
        let relative = location.trim_start_matches('/');
        if relative.is_empty() || relative.split('/').any(|part| part == "..") {
            return false;
        }
        self.roots.iter().any(|root| root.join(relative).is_file())
    }
}

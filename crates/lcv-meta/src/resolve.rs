//! # Type Resolution
//!
//! Raw attributes name types the way source code does: sometimes fully
//! qualified, often by simple name relative to the imports and package of
//! the class they annotate. A [`TypeResolver`] turns such a name into a
//! fully-qualified one.

use std::collections::{BTreeMap, BTreeSet};

/// Names that never take a package prefix.
const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Array type suffix.
const ARRAY_SUFFIX: &str = "[]";

/// Resolves a type name as written next to a class into a fully-qualified name.
pub trait TypeResolver {
    /// Resolve `short_name` in the context of the class named `context_class`.
    ///
    /// Returns `None` when the name cannot be resolved.
    fn resolve(&self, short_name: &str, context_class: &str) -> Option<String>;
}

impl<T: TypeResolver + ?Sized> TypeResolver for &T {
    fn resolve(&self, short_name: &str, context_class: &str) -> Option<String> {
        (**self).resolve(short_name, context_class)
    }
}

/// Whether `name` is a primitive type name.
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// Resolver driven by explicit imports and package search.
///
/// Resolution order for a simple name:
///
/// 1. primitives resolve to themselves;
/// 2. an explicit import of that simple name;
/// 3. the context class's own package;
/// 4. each implicit package, in the order given.
///
/// Steps 3 and 4 consult the set of known types when one was supplied and
/// skip candidates that are not in it. Without known types, step 3 always
/// succeeds. Names that already contain a `.` are returned unchanged, and
/// array suffixes are carried over from the element type.
#[derive(Debug, Clone, Default)]
pub struct ImportResolver {
    imports: BTreeMap<String, String>,
    implicit_packages: Vec<String>,
    known_types: BTreeSet<String>,
}

impl ImportResolver {
    /// Create a resolver with no imports and no known types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an import. The simple name is derived from `qualified`.
    pub fn with_import(mut self, qualified: impl Into<String>) -> Self {
        let qualified = qualified.into();
        let simple = lcv_core::simple_name(&qualified).to_string();
        self.imports.insert(simple, qualified);
        self
    }

    /// Register an import under an explicit simple name.
    pub fn with_alias(mut self, simple: impl Into<String>, qualified: impl Into<String>) -> Self {
        self.imports.insert(simple.into(), qualified.into());
        self
    }

    /// Append a package searched after the context class's own package.
    pub fn with_implicit_package(mut self, package: impl Into<String>) -> Self {
        self.implicit_packages.push(package.into());
        self
    }

    /// Restrict package search to these fully-qualified type names.
    pub fn with_known_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_types.extend(types.into_iter().map(Into::into));
        self
    }

    fn is_known(&self, candidate: &str) -> bool {
        self.known_types.is_empty() || self.known_types.contains(candidate)
    }

    fn resolve_element(&self, name: &str, context_class: &str) -> Option<String> {
        if is_primitive(name) || name.contains('.') {
            return Some(name.to_string());
        }
        if let Some(imported) = self.imports.get(name) {
            return Some(imported.clone());
        }

        let own_package = match context_class.rfind('.') {
            Some(idx) => &context_class[..idx],
            None => "",
        };
        let own = qualify(own_package, name);
        if self.is_known(&own) {
            return Some(own);
        }
        self.implicit_packages
            .iter()
            .map(|package| qualify(package, name))
            .find(|candidate| self.known_types.contains(candidate))
    }
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

impl TypeResolver for ImportResolver {
    fn resolve(&self, short_name: &str, context_class: &str) -> Option<String> {
        let name = short_name.trim();
        if name.is_empty() {
            return None;
        }
        let mut element = name;
        let mut dims = 0usize;
        while let Some(stripped) = element.strip_suffix(ARRAY_SUFFIX) {
            element = stripped.trim_end();
            dims += 1;
        }
        let resolved = self.resolve_element(element, context_class)?;
        Some(format!("{resolved}{}", ARRAY_SUFFIX.repeat(dims)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_names_pass_through() {
        let resolver = ImportResolver::new();
        assert_eq!(
            resolver.resolve("org.other.Store", "org.example.Mailer").as_deref(),
            Some("org.other.Store")
        );
    }

    #[test]
    fn imports_win_over_own_package() {
        let resolver = ImportResolver::new().with_import("org.other.Store");
        assert_eq!(
            resolver.resolve("Store", "org.example.Mailer").as_deref(),
            Some("org.other.Store")
        );
    }

    #[test]
    fn own_package_is_default_without_known_types() {
        let resolver = ImportResolver::new();
        assert_eq!(
            resolver.resolve("Store", "org.example.Mailer").as_deref(),
            Some("org.example.Store")
        );
        assert_eq!(resolver.resolve("Store", "Mailer").as_deref(), Some("Store"));
    }

    #[test]
    fn implicit_packages_consulted_when_types_are_known() {
        let resolver = ImportResolver::new()
            .with_implicit_package("framework.service")
            .with_known_types(["framework.service.ServiceManager"]);
        assert_eq!(
            resolver.resolve("ServiceManager", "org.example.Mailer").as_deref(),
            Some("framework.service.ServiceManager")
        );
        assert_eq!(resolver.resolve("Missing", "org.example.Mailer"), None);
    }

    #[test]
    fn primitives_and_arrays() {
        let resolver = ImportResolver::new();
        assert_eq!(resolver.resolve("int", "a.B").as_deref(), Some("int"));
        assert_eq!(resolver.resolve("Store[][]", "a.B").as_deref(), Some("a.Store[][]"));
        assert_eq!(resolver.resolve("  ", "a.B"), None);
    }

    #[test]
    fn alias_imports() {
        let resolver = ImportResolver::new().with_alias("Sink", "org.io.OutputSink");
        assert_eq!(resolver.resolve("Sink", "a.B").as_deref(), Some("org.io.OutputSink"));
    }
}

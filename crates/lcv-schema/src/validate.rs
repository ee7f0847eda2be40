//! # Document Validation
//!
//! Validates class-descriptor and type-catalog documents (YAML or JSON)
//! against the JSON Schemas shipped in the repository's `schemas/`
//! directory (Draft 2020-12).
//!
//! ## Trust Boundary
//!
//! Documents are produced by other tools, sometimes by hand. Every
//! document is validated before it is deserialized, and a rejection
//! carries the instance path, schema path, and message of each violation.
//!
//! ## Schema Sources
//!
//! [`SchemaValidator::builtin`] compiles the schemas from `schemas/` into
//! the binary, so a descriptor is always checked against the revision the
//! verifier was built with.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::Validator;
use serde_json::Value;
use thiserror::Error;

/// Schema for class-descriptor documents.
pub const CLASS_DESCRIPTOR_SCHEMA: &str = "class-descriptor.schema.json";
/// Schema for type-catalog documents.
pub const TYPE_CATALOG_SCHEMA: &str = "type-catalog.schema.json";

const BUILTIN_SCHEMAS: &[(&str, &str)] = &[
    (
        CLASS_DESCRIPTOR_SCHEMA,
        include_str!("../../../schemas/class-descriptor.schema.json"),
    ),
    (
        TYPE_CATALOG_SCHEMA,
        include_str!("../../../schemas/type-catalog.schema.json"),
    ),
];

/// Error loading or validating a document.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document does not conform; every violation is listed.
    #[error("{document} does not conform to {schema_name}:\n{violations}")]
    ValidationFailed {
        /// Schema the document was checked against.
        schema_name: String,
        /// What was checked: a file path, or `document` for in-memory values.
        document: String,
        /// Each violation found.
        violations: ValidationViolations,
    },

    /// No schema with this name is loaded, or a built-in schema is not JSON.
    #[error("schema {schema_name} unavailable: {reason}")]
    SchemaLoadError {
        /// Schema name.
        schema_name: String,
        /// Why it is unavailable.
        reason: String,
    },

    /// The document could not be read or parsed.
    #[error("cannot load {path}: {reason}")]
    DocumentLoadError {
        /// Document path.
        path: String,
        /// Why it could not be loaded.
        reason: String,
    },

    /// The schema loaded but did not compile.
    #[error("schema {schema_name} does not compile: {reason}")]
    ValidatorBuildError {
        /// Schema name.
        schema_name: String,
        /// Compiler message.
        reason: String,
    },
}

/// One place where a document breaks its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer into the document; empty for the root.
    pub instance_path: String,
    /// JSON Pointer to the schema keyword that failed.
    pub schema_path: String,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() {
            "(root)"
        } else {
            self.instance_path.as_str()
        };
        write!(f, "  {at}: {}", self.message)
    }
}

/// Non-empty list of violations, in validator order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations(Vec<Violation>);

impl ValidationViolations {
    /// Number of violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a list carried by [`SchemaValidationError::ValidationFailed`].
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The violations.
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(Violation::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

impl From<jsonschema::ValidationError<'_>> for Violation {
    fn from(e: jsonschema::ValidationError<'_>) -> Self {
        Self {
            instance_path: e.instance_path.to_string(),
            schema_path: e.schema_path.to_string(),
            message: e.to_string(),
        }
    }
}

fn compile(name: &str, source: &str) -> Result<Validator, SchemaValidationError> {
    let schema: Value =
        serde_json::from_str(source).map_err(|e| SchemaValidationError::SchemaLoadError {
            schema_name: name.to_string(),
            reason: format!("not JSON: {e}"),
        })?;
    jsonschema::options()
        .with_draft(jsonschema::Draft::Draft202012)
        .build(&schema)
        .map_err(|e| SchemaValidationError::ValidatorBuildError {
            schema_name: name.to_string(),
            reason: e.to_string(),
        })
}

/// Validates documents against the built-in JSON Schemas.
///
/// Every schema is compiled once, in [`SchemaValidator::builtin`]. The
/// validator is `Send + Sync` and can be shared by reference.
pub struct SchemaValidator {
    compiled: BTreeMap<&'static str, Validator>,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("schemas", &self.schema_names())
            .finish()
    }
}

impl SchemaValidator {
    /// Compile the schemas shipped with this crate.
    ///
    /// # Errors
    ///
    /// `SchemaLoadError` if a schema is not JSON, `ValidatorBuildError` if
    /// it is not a valid Draft 2020-12 schema.
    pub fn builtin() -> Result<Self, SchemaValidationError> {
        let mut compiled = BTreeMap::new();
        for &(name, source) in BUILTIN_SCHEMAS {
            compiled.insert(name, compile(name, source)?);
        }
        tracing::debug!(schemas = compiled.len(), "compiled built-in schemas");
        Ok(Self { compiled })
    }

    /// Names of the compiled schemas, sorted.
    pub fn schema_names(&self) -> Vec<&str> {
        self.compiled.keys().copied().collect()
    }

    /// Validate a parsed value against the named schema.
    ///
    /// # Errors
    ///
    /// `SchemaLoadError` for an unknown schema name; `ValidationFailed`,
    /// carrying every violation, if the value does not conform.
    pub fn validate_document(
        &self,
        instance: &Value,
        schema_name: &str,
    ) -> Result<(), SchemaValidationError> {
        let validator =
            self.compiled
                .get(schema_name)
                .ok_or_else(|| SchemaValidationError::SchemaLoadError {
                    schema_name: schema_name.to_string(),
                    reason: "no such built-in schema".to_string(),
                })?;

        let found: Vec<Violation> = validator.iter_errors(instance).map(Violation::from).collect();
        if found.is_empty() {
            return Ok(());
        }
        Err(SchemaValidationError::ValidationFailed {
            schema_name: schema_name.to_string(),
            document: "document".to_string(),
            violations: ValidationViolations(found),
        })
    }

    /// Load a YAML or JSON document from `path` and validate it.
    ///
    /// The format is chosen by extension: `.json` is parsed as JSON,
    /// anything else as YAML. Returns the parsed document on success so
    /// callers can deserialize it without reading the file again.
    ///
    /// # Errors
    ///
    /// Returns `DocumentLoadError` if the file cannot be read or parsed,
    /// and `ValidationFailed` if it does not conform.
    pub fn validate_file(
        &self,
        document_path: &Path,
        schema_name: &str,
    ) -> Result<Value, SchemaValidationError> {
        let document = load_document(document_path)?;
        self.validate_document(&document, schema_name)
            .map_err(|e| match e {
                SchemaValidationError::ValidationFailed {
                    schema_name,
                    violations,
                    ..
                } => SchemaValidationError::ValidationFailed {
                    schema_name,
                    document: document_path.display().to_string(),
                    violations,
                },
                other => other,
            })?;
        Ok(document)
    }
}

/// Read a YAML or JSON document into a JSON value.
///
/// # Errors
///
/// Returns `DocumentLoadError` if the file cannot be read or parsed.
pub fn load_document(path: &Path) -> Result<Value, SchemaValidationError> {
    let load_error = |reason: String| SchemaValidationError::DocumentLoadError {
        path: path.display().to_string(),
        reason,
    };

    let content = std::fs::read_to_string(path)
        .map_err(|e| load_error(format!("cannot read file: {e}")))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}")))
        }
        _ => serde_yaml::from_str(&content).map_err(|e| load_error(format!("invalid YAML: {e}"))),
    }
}

/// Whether `path` has an extension this crate can load.
pub fn is_document_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

/// Collect every loadable document under `dir`, recursively, sorted.
///
/// Directories that cannot be listed are logged and skipped.
pub fn find_documents(dir: &Path) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "cannot list directory");
            return Vec::new();
        }
    };
    let mut documents = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            documents.extend(find_documents(&path));
        } else if is_document_path(&path) {
            documents.push(path);
        }
    }
    documents.sort();
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> SchemaValidator {
        SchemaValidator::builtin().unwrap()
    }

    #[test]
    fn builtin_schemas_are_loaded() {
        let v = validator();
        let names = v.schema_names();
        assert_eq!(names, vec![CLASS_DESCRIPTOR_SCHEMA, TYPE_CATALOG_SCHEMA]);
    }

    #[test]
    fn debug_lists_schema_names() {
        let shown = format!("{:?}", validator());
        assert!(shown.contains(CLASS_DESCRIPTOR_SCHEMA));
    }

    #[test]
    fn single_class_document_is_valid() {
        let doc = json!({
            "name": "org.example.Mailer",
            "attributes": [
                { "name": "component" },
                { "name": "service", "parameters": { "type": "org.example.Sender" } }
            ],
            "methods": [
                {
                    "name": "service",
                    "parameters": [{ "name": "manager", "type": "framework.service.ServiceManager" }],
                    "attributes": [{ "name": "dependency", "parameters": { "type": "org.store.Store" } }]
                }
            ]
        });
        validator()
            .validate_document(&doc, CLASS_DESCRIPTOR_SCHEMA)
            .unwrap();
    }

    #[test]
    fn class_list_document_is_valid() {
        let doc = json!({ "classes": [{ "name": "a.One" }, { "name": "a.Two" }] });
        validator()
            .validate_document(&doc, CLASS_DESCRIPTOR_SCHEMA)
            .unwrap();
    }

    #[test]
    fn non_string_parameter_value_is_rejected() {
        let doc = json!({
            "name": "a.One",
            "attributes": [{ "name": "dependency", "parameters": { "optional": true } }]
        });
        let err = validator()
            .validate_document(&doc, CLASS_DESCRIPTOR_SCHEMA)
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::ValidationFailed { .. }));
    }

    #[test]
    fn blank_class_name_is_rejected() {
        let err = validator()
            .validate_document(&json!({ "name": "  " }), CLASS_DESCRIPTOR_SCHEMA)
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::ValidationFailed { .. }));
    }

    #[test]
    fn catalog_rejects_unknown_kind() {
        let doc = json!({ "types": [{ "name": "a.B", "kind": "enum" }] });
        let err = validator()
            .validate_document(&doc, TYPE_CATALOG_SCHEMA)
            .unwrap_err();
        match err {
            SchemaValidationError::ValidationFailed { violations, .. } => {
                assert!(!violations.is_empty());
                assert!(violations.violations()[0].instance_path.contains("kind"));
            }
            other => panic!("Expected ValidationFailed, got: {other}"),
        }
    }

    #[test]
    fn unknown_schema_is_a_load_error() {
        let err = validator()
            .validate_document(&json!({}), "nonexistent.schema.json")
            .unwrap_err();
        assert!(matches!(err, SchemaValidationError::SchemaLoadError { .. }));
    }

    #[test]
    fn violation_display_root() {
        let v = Violation {
            instance_path: String::new(),
            schema_path: "/required".to_string(),
            message: r#""name" is a required property"#.to_string(),
        };
        assert!(v.to_string().contains("(root)"));
    }

    #[test]
    fn document_path_extensions() {
        assert!(is_document_path(Path::new("a/b.yaml")));
        assert!(is_document_path(Path::new("a/b.yml")));
        assert!(is_document_path(Path::new("a/b.json")));
        assert!(!is_document_path(Path::new("a/b.xml")));
    }
}

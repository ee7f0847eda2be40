//! # lcv-schema: Document Validation
//!
//! Class descriptors and type catalogs cross process boundaries as YAML or
//! JSON documents. This crate validates them against the JSON Schemas in
//! the repository's `schemas/` directory before anything deserializes them.
//!
//! - [`SchemaValidator::validate_file`]: load a document and validate it,
//!   returning the parsed value.
//! - [`find_documents`]: discover every document under a directory.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lcv-*` crates.
//! - Schema `$id` URIs must not change without updating every document
//!   that references them.
//! - Invalid documents are rejected with structured errors including the
//!   instance path, schema path, and message of each violation.

pub mod validate;

pub use validate::{
    find_documents, is_document_path, load_document, SchemaValidationError, SchemaValidator,
    ValidationViolations, Violation, CLASS_DESCRIPTOR_SCHEMA, TYPE_CATALOG_SCHEMA,
};

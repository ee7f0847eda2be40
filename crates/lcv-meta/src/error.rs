//! # Normalization Errors
//!
//! Every failure here is a configuration error: the source metadata is
//! malformed and must be corrected before a descriptor can be produced.
//! Errors always name the offending class and attribute.

use lcv_core::MetadataError;
use thiserror::Error;

/// Error raised while normalizing raw attributes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// A required parameter was not declared.
    #[error("class {class}: attribute '{attribute}' is missing required parameter '{parameter}'")]
    MissingParameter {
        /// Class being normalized.
        class: String,
        /// Offending attribute.
        attribute: String,
        /// Absent parameter.
        parameter: String,
    },

    /// A declared type name could not be resolved to a fully-qualified name.
    #[error("class {class}: attribute '{attribute}' names type '{type_name}' which cannot be resolved")]
    UnresolvedType {
        /// Class being normalized.
        class: String,
        /// Offending attribute.
        attribute: String,
        /// Type name as declared.
        type_name: String,
    },

    /// A parameter has a value outside its allowed set.
    #[error("class {class}: attribute '{attribute}' has invalid {parameter} '{value}'")]
    InvalidParameter {
        /// Class being normalized.
        class: String,
        /// Offending attribute.
        attribute: String,
        /// Parameter name.
        parameter: String,
        /// Value as declared.
        value: String,
    },

    /// The normalized descriptor could not be built.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

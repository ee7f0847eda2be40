//! # Error Types: Metadata and Lifecycle Errors
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Metadata errors name the attribute and parameter that were at fault.
//! - Lifecycle errors name the capability stage that failed, so a host can
//!   report which step of start-up or shut-down went wrong.

use thiserror::Error;

use crate::lifecycle::Capability;

/// Error raised while building or querying the metadata model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    /// A class descriptor was built with an empty name.
    #[error("class descriptor name must not be empty")]
    EmptyClassName,

    /// A parameter was required but absent and no default was supplied.
    #[error("attribute '{attribute}' is missing required parameter '{parameter}'")]
    MissingParameter {
        /// Name of the attribute that was queried.
        attribute: String,
        /// Name of the parameter that was absent.
        parameter: String,
    },

    /// A canonical attribute could not be decoded into its typed form.
    #[error("attribute '{attribute}' is not a valid canonical declaration: {reason}")]
    InvalidDeclaration {
        /// Name of the attribute that failed to decode.
        attribute: String,
        /// Reason the attribute was rejected.
        reason: String,
    },
}

/// Error raised by a component while a host drives it through its lifecycle.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The component rejected a lifecycle call.
    #[error("{stage} stage failed: {reason}")]
    StageFailed {
        /// Capability whose call failed.
        stage: Capability,
        /// Reason reported by the component.
        reason: String,
    },

    /// A dependency lookup failed.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// A configuration lookup failed.
    #[error("configuration parameter '{0}' is missing")]
    MissingConfiguration(String),
}

/// Error raised by a [`crate::lifecycle::ServiceManager`] lookup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// No service is registered under the canonical key.
    #[error("no service registered under key '{0}'")]
    NotFound(String),

    /// A service is registered but is not of the requested type.
    #[error("service '{key}' is not a {expected}")]
    WrongType {
        /// Canonical key that was looked up.
        key: String,
        /// Rust type name that was requested.
        expected: &'static str,
    },
}

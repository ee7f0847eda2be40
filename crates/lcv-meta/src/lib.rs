//! # lcv-meta: Attribute Normalization & Class Filtering
//!
//! Runs at metadata-generation time, before anything is verified:
//!
//! 1. [`ComponentFilter`] admits classes carrying the `component` marker.
//! 2. [`AttributeNormalizer`] rewrites their raw attributes into canonical
//!    form, resolving type names through an injected [`TypeResolver`].
//!
//! The resulting [`lcv_core::ClassDescriptor`] is what the verifier reads.
//!
//! ## Crate Policy
//!
//! - Depends only on `lcv-core` internally.
//! - Malformed metadata is a [`NormalizeError`], surfaced immediately.

pub mod error;
pub mod filter;
pub mod normalize;
pub mod resolve;

pub use error::NormalizeError;
pub use filter::{ComponentFilter, FilterMatch};
pub use normalize::{default_schema_location, AttributeNormalizer, DEFAULT_SCHEMA_SUFFIX};
pub use resolve::{ImportResolver, TypeResolver};

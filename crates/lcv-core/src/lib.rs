//! # lcv-core: Foundational Types for Component Verification
//!
//! This crate defines the vocabulary every other `lcv-*` crate speaks:
//!
//! - **Metadata model** (`descriptor`): [`ClassDescriptor`] and its
//!   attributes, fields, methods, and parameters. Immutable once built.
//! - **Typed declarations** (`declaration`): the [`Declaration`] variant
//!   each canonical attribute decodes to, plus the dependency key rules.
//! - **Issues** (`issue`): [`VerifyIssue`] and its two-level [`Severity`].
//! - **Lifecycle contracts** (`lifecycle`): the capabilities a host
//!   supplies to a component and the reserved interface names the
//!   verifier guards.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lcv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod declaration;
pub mod descriptor;
pub mod error;
pub mod issue;
pub mod lifecycle;

pub use declaration::{
    derive_dependency_key, key_follows_convention, Declaration, DeclarationSite,
    DependencyDeclaration, SchemaDeclaration, SchemaKind, ServiceDeclaration,
};
pub use descriptor::{
    simple_name, Attribute, ClassDescriptor, FieldDescriptor, MethodDescriptor,
    ParameterDescriptor,
};
pub use error::{LifecycleError, MetadataError, ServiceError};
pub use issue::{Severity, VerifyIssue};
pub use lifecycle::Capability;

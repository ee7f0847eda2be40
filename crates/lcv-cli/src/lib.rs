//! # lcv-cli: Command-Line Interface
//!
//! Provides the `lcv` binary, which a build runs after metadata
//! extraction to produce canonical descriptors and fail on invalid
//! components.
//!
//! ## Subcommands
//!
//! - `lcv normalize`: raw descriptor in, canonical descriptor out.
//! - `lcv verify`: verify canonical descriptors, exit 1 on any error.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers return an exit code.
//! - Handlers delegate to the library crates and hold no verification logic.

pub mod config;
pub mod documents;
pub mod normalize;
pub mod verify;

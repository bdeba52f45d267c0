//! Core types for the Thoughts rule engine.
//!
//! This crate provides:
//! - [`Term`] - The recursive value type for facts, patterns, and bindings
//! - [`TermKind`] - Variant descriptors used in diagnostics
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod kind;
pub mod term;

pub use error::{Error, ErrorContext, ErrorKind, SemanticLimit};
pub use kind::TermKind;
pub use term::{Term, TermList, TermMap};

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;

//! Console and CLI for the Thoughts rule engine.
//!
//! This crate provides:
//! - [`Repl`] - Interactive console with meta-commands
//! - [`LineEditor`] - Line editing abstraction backed by rustyline
//! - The `thoughts` binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod editor;
pub mod highlight;
pub mod repl;

pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use highlight::ThoughtsHighlighter;
pub use repl::{Repl, Reply, Turn, print_error, show};

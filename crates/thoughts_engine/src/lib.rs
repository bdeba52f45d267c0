//! Forward-chaining rule engine for Thoughts.
//!
//! This crate provides:
//! - [`unify`] - Term unification with a greedy textual matcher
//! - [`KnowledgeBase`] - Rulesets, token index, active arcs, and item store
//! - [`ActiveArc`] - Partial matches of sequence rules
//! - [`Engine`] - The agenda that drives assertions to saturation
//! - [`CommandRegistry`] - Pluggable handlers for `#` directives

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod agenda;
pub mod assertion;
pub mod bindings;
pub mod command;
pub mod config;
pub mod knowledge;
pub mod rule;
pub mod sequence;
pub mod substitute;
pub mod text;
pub mod trace;
pub mod unify;

pub use agenda::{Engine, extract_final_conclusions};
pub use assertion::{ASSERT_KEY, Assertion, Span};
pub use bindings::{Bindings, WHEN_KEY};
pub use command::{Command, CommandInput, CommandRegistry, Resolution};
pub use config::EngineConfig;
pub use knowledge::{DEFAULT_RULESET, KnowledgeBase};
pub use rule::{CompiledEntry, Condition, Entry, EntryId, Guard, Rule, RuleCompiler, Ruleset, SeqType, When};
pub use sequence::ActiveArc;
pub use substitute::Resolver;
pub use trace::{TraceBuffer, TraceKind, TraceRecord};
pub use unify::{unify, unify_text};

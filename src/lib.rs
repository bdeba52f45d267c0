//! Thoughts - Forward-chaining rule engine over text and JSON
//!
//! This crate re-exports all layers of the Thoughts system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: thoughts_runtime    Console, CLI, line editing
//! Layer 2: thoughts_stdlib     Built-in commands (#output, #lookup, ...)
//! Layer 1: thoughts_engine     Unifier, knowledge base, arcs, agenda
//! Layer 0: thoughts_foundation Core types (Term, Error)
//! ```
//!
//! # Example
//!
//! ```
//! use thoughts::foundation::Term;
//!
//! let mut engine = thoughts::engine();
//! engine
//!     .load_rules_from_str(
//!         r##"[{"when": "what time is it", "then": {"#output": "time for tea"}}]"##,
//!         None,
//!     )
//!     .unwrap();
//! engine.process(&Term::atom("what time is it")).unwrap();
//! assert_eq!(engine.knowledge_mut().drain_output(), vec!["time for tea"]);
//! ```

pub use thoughts_engine as engine;
pub use thoughts_foundation as foundation;
pub use thoughts_runtime as runtime;
pub use thoughts_stdlib as stdlib;

pub use thoughts_engine::{Engine, EngineConfig};

/// Creates an engine with the default configuration and every built-in
/// command registered.
#[must_use]
pub fn engine() -> Engine {
    engine_with_config(EngineConfig::default())
}

/// Creates an engine with `config` and every built-in command registered.
#[must_use]
pub fn engine_with_config(config: EngineConfig) -> Engine {
    let mut engine = Engine::with_config(config);
    thoughts_stdlib::register_builtins(&mut engine);
    engine
}

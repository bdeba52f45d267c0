//! Command dispatch.
//!
//! A directive such as `{"#output": "hello"}` names its command by a
//! reserved `#` key. Handlers implement [`Command`] and are looked up in a
//! [`CommandRegistry`]. The engine itself provides `#assert`, which runs
//! the matcher, and `#clear-arcs`.

use std::collections::HashMap;
use std::fmt;

use thoughts_foundation::{Error, Result, Term, TermMap};

use crate::assertion::{ASSERT_KEY, Assertion, CONCLUSIONS_KEY, SEQ_KEY, Span};
use crate::knowledge::KnowledgeBase;
use crate::sequence::{attempt_arcs, attempt_rulesets};
use crate::substitute::{COMBINE_KEY, STORAGE_KEYS};
use crate::unify::{SEQ_END, SEQ_START};

/// Key of the command that drops every active arc.
pub const CLEAR_ARCS_KEY: &str = "#clear-arcs";

/// Keys that carry bookkeeping and never name a command.
pub const BOOKKEEPING_KEYS: [&str; 6] = [
    SEQ_START,
    SEQ_END,
    SEQ_KEY,
    CONCLUSIONS_KEY,
    "#seq-idx",
    "#unification",
];

/// Keys that are arguments of some command and never name one.
pub const PARAMETER_KEYS: [&str; 5] = ["#as", "#on", "#val", "#do", "#default"];

// =============================================================================
// Command Trait
// =============================================================================

/// A handler for a reserved directive key.
pub trait Command {
    /// The directive key, including the leading `#`.
    fn name(&self) -> &str;

    /// Runs the command.
    ///
    /// Returns `Nil` for no conclusions, a list for several, or any other
    /// term for exactly one. When the command is nested inside another
    /// directive's arguments the returned term replaces it as is.
    ///
    /// # Errors
    /// Returns an error when the directive is malformed.
    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term>;

    /// Whether the command may be evaluated inline, nested inside another
    /// directive's arguments.
    fn inline(&self) -> bool {
        false
    }
}

/// What a command receives: the directive after reference substitution,
/// plus the node's positions and constituents.
#[derive(Clone, Copy, Debug)]
pub struct CommandInput<'a> {
    name: &'a str,
    node: &'a Assertion,
}

impl<'a> CommandInput<'a> {
    /// Creates an input for the command `name`.
    #[must_use]
    pub fn new(name: &'a str, node: &'a Assertion) -> Self {
        Self { name, node }
    }

    /// The command key.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The node being processed.
    #[must_use]
    pub fn node(&self) -> &'a Assertion {
        self.node
    }

    /// Positions of the node, if any.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.node.span
    }

    /// The directive map.
    #[must_use]
    pub fn directive(&self) -> Option<&'a TermMap> {
        self.node.term.as_map()
    }

    /// The value under the command key.
    #[must_use]
    pub fn target(&self) -> Option<&'a Term> {
        self.arg(self.name)
    }

    /// An argument of the directive.
    #[must_use]
    pub fn arg(&self, key: &str) -> Option<&'a Term> {
        self.node.term.get(key)
    }

    /// The value under the command key.
    ///
    /// # Errors
    /// Returns an invalid command error if it is absent or null.
    pub fn require_target(&self) -> Result<&'a Term> {
        self.require_arg(self.name)
    }

    /// A required argument.
    ///
    /// # Errors
    /// Returns an invalid command error if it is absent or null.
    pub fn require_arg(&self, key: &str) -> Result<&'a Term> {
        self.arg(key)
            .filter(|t| !t.is_nil())
            .ok_or_else(|| self.error(format!("missing {key}")))
    }

    /// A required textual argument.
    ///
    /// # Errors
    /// Returns an error if it is absent or not text.
    pub fn require_text(&self, key: &str) -> Result<&'a str> {
        let term = self.require_arg(key)?;
        term.as_text()
            .ok_or_else(|| self.error(format!("{key} must be text, got {}", term.kind())))
    }

    /// Stores `value` if the directive carries `#into`, `#append` or
    /// `#push`. Returns true if it was stored.
    pub fn store(&self, kb: &mut KnowledgeBase, value: &Term) -> bool {
        self.directive()
            .is_some_and(|directive| kb.store_item(directive, value.clone()))
    }

    /// An invalid command error for this command.
    #[must_use]
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::invalid_command(self.name, message)
    }
}

// =============================================================================
// Registry
// =============================================================================

/// How a directive resolves against the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// No command key; the directive is asserted.
    Assert,
    /// A registered command.
    Registered(String),
    /// A command key with no handler.
    Unknown(String),
    /// More than one registered command key, in key order.
    Conflict(Vec<String>),
}

/// Registry of command handlers, keyed by directive key.
#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("commands", &self.names())
            .finish()
    }
}

impl CommandRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the engine's own commands.
    #[must_use]
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        registry.register(AssertCommand);
        registry.register(ClearArcsCommand);
        registry
    }

    /// Registers a command, replacing any handler with the same key.
    pub fn register(&mut self, command: impl Command + 'static) {
        self.commands
            .insert(command.name().to_string(), Box::new(command));
    }

    /// Looks up a command by key.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Command> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns true if a handler is registered for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Registered keys, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Determines which command a directive invokes.
    ///
    /// A directive may carry one registered key; maps are ordered by key,
    /// so the order keys were written in is lost and two registered keys
    /// are reported as a conflict. Without a registered key, any other `#`
    /// key that is not bookkeeping, storage or a parameter names an
    /// unknown command. A bare `#` key is plain data.
    #[must_use]
    pub fn resolve(&self, directive: &TermMap) -> Resolution {
        let mut registered: Vec<String> = directive
            .keys()
            .filter(|key| self.contains(key))
            .map(ToString::to_string)
            .collect();
        match registered.len() {
            0 => {}
            1 => return Resolution::Registered(registered.remove(0)),
            _ => return Resolution::Conflict(registered),
        }
        directive
            .keys()
            .find(|key| is_command_key(key))
            .map_or(Resolution::Assert, |key| Resolution::Unknown(key.to_string()))
    }

    /// The inline command a nested map invokes, if any. With several
    /// inline keys the alphabetically first one runs.
    #[must_use]
    pub fn resolve_inline(&self, map: &TermMap) -> Option<&dyn Command> {
        map.keys()
            .filter_map(|key| self.get(key))
            .find(|command| command.inline())
    }
}

fn is_command_key(key: &str) -> bool {
    key.len() > 1
        && key.starts_with('#')
        && key != COMBINE_KEY
        && !STORAGE_KEYS.contains(&key)
        && !BOOKKEEPING_KEYS.contains(&key)
        && !PARAMETER_KEYS.contains(&key)
}

// =============================================================================
// Core Commands
// =============================================================================

/// `#assert`: tries the node against active arcs, then against the rules.
///
/// With a storage key the conclusions are stored instead of returned.
#[derive(Clone, Copy, Debug, Default)]
pub struct AssertCommand;

impl Command for AssertCommand {
    fn name(&self) -> &str {
        ASSERT_KEY
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        if input.arg(ASSERT_KEY).is_some_and(Term::is_nil) {
            return Ok(Term::Nil);
        }

        let node = input.node();
        let mut conclusions = attempt_arcs(kb, node)?;
        conclusions.extend(attempt_rulesets(kb, node)?);

        let value = Term::list(conclusions.iter().map(Assertion::to_term));
        if input.store(kb, &value) {
            return Ok(Term::Nil);
        }
        Ok(value)
    }
}

/// `#clear-arcs`: drops every active arc.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearArcsCommand;

impl Command for ClearArcsCommand {
    fn name(&self) -> &str {
        CLEAR_ARCS_KEY
    }

    fn execute(&self, _input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        kb.clear_arcs();
        Ok(Term::Nil)
    }
}

//! Rules, guards, and rulesets.
//!
//! Rules are compiled from JSON by [`RuleCompiler`] and stored in the
//! knowledge base arena, where they are addressed by [`EntryId`]. Active
//! arcs refer to their rule by id instead of copying it.

pub mod compiler;

pub use compiler::{CompiledEntry, RuleCompiler};

use std::fmt;
use std::path::PathBuf;

use thoughts_foundation::Term;

use crate::text::literal_tokens;

// =============================================================================
// Identifiers
// =============================================================================

/// Stable index of an entry in the knowledge base arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub usize);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Sequence Options
// =============================================================================

/// How consecutive constituents of a sequence rule must be positioned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeqType {
    /// Each constituent starts where the previous one ended.
    #[default]
    Default,
    /// Each constituent starts one position before the previous one ended.
    OverlapConnected,
    /// Constituents may be separated by unmatched positions.
    AllowJunk,
    /// Constituents match in any order, positions are ignored.
    Set,
}

impl SeqType {
    /// Parses the rule-file spelling of a sequence type.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::Default),
            "overlap-connected" => Some(Self::OverlapConnected),
            "allow-junk" => Some(Self::AllowJunk),
            "set" => Some(Self::Set),
            _ => None,
        }
    }

    /// Returns true if an assertion starting at `start` may extend an arc
    /// whose consumed window ends at `arc_end`.
    #[must_use]
    pub fn accepts(self, start: Option<usize>, arc_end: usize) -> bool {
        match self {
            Self::Default => start == Some(arc_end),
            Self::OverlapConnected => start.map(|s| s + 1) == Some(arc_end),
            Self::AllowJunk => start.is_some_and(|s| s >= arc_end),
            Self::Set => true,
        }
    }
}

impl fmt::Display for SeqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::OverlapConnected => "overlap-connected",
            Self::AllowJunk => "allow-junk",
            Self::Set => "set",
        })
    }
}

// =============================================================================
// Guards
// =============================================================================

/// A single equality test. Both sides are resolved against the item store.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    /// Left-hand side, usually a `$item` reference.
    pub value: Term,
    /// Right-hand side.
    pub equals: Term,
}

/// A rule or block guard.
#[derive(Clone, Debug, PartialEq)]
pub enum Guard {
    /// Conjunction of conditions.
    All(Vec<Condition>),
    /// A guard whose shape could not be understood. Never passes.
    Malformed(String),
}

// =============================================================================
// Rules
// =============================================================================

/// The antecedent of a rule.
#[derive(Clone, Debug, PartialEq)]
pub enum When {
    /// Matched against one assertion at a time.
    Single(Term),
    /// Ordered constituents, each matched against a separate assertion.
    Sequence(Vec<Term>),
}

/// A compiled rule.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    /// What the rule matches.
    pub when: When,
    /// What the rule asserts when it fires.
    pub then: Term,
    /// Optional condition checked before firing.
    pub guard: Option<Guard>,
    /// Positioning of sequence constituents.
    pub seq_type: SeqType,
    /// Lets one assertion fill several slots of a `set` rule.
    pub allow_multi: bool,
}

impl Rule {
    /// Creates a single-pattern rule.
    #[must_use]
    pub fn new(when: Term, then: Term) -> Self {
        Self {
            when: When::Single(when),
            then,
            guard: None,
            seq_type: SeqType::Default,
            allow_multi: false,
        }
    }

    /// Creates a sequence rule.
    #[must_use]
    pub fn sequence(when: Vec<Term>, then: Term) -> Self {
        Self {
            when: When::Sequence(when),
            ..Self::new(Term::Nil, then)
        }
    }

    /// Sets the sequence type.
    #[must_use]
    pub fn with_seq_type(mut self, seq_type: SeqType) -> Self {
        self.seq_type = seq_type;
        self
    }

    /// Sets the guard.
    #[must_use]
    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Returns true for multi-constituent rules.
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        matches!(self.when, When::Sequence(_))
    }

    /// Literal tokens to index this rule under.
    ///
    /// Returns `None` when the rule can match assertions that share no
    /// literal token with it: sequence rules, structured patterns, and text
    /// made only of variables and wildcards.
    #[must_use]
    pub fn index_tokens(&self) -> Option<Vec<String>> {
        match &self.when {
            When::Single(term) => {
                let tokens = literal_tokens(term.as_text()?);
                (!tokens.is_empty()).then_some(tokens)
            }
            When::Sequence(_) => None,
        }
    }
}

// =============================================================================
// Entries & Rulesets
// =============================================================================

/// An item stored in a ruleset.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// A matchable rule.
    Rule(Rule),
    /// Rules that are only tried while the guard holds.
    Block {
        /// Condition gating the nested rules.
        guard: Guard,
        /// Nested entries, tried in order.
        rules: Vec<EntryId>,
    },
    /// A plain fact, such as `{"#item": "$weather", "#": "sunny"}`.
    Fact(Term),
}

/// A named, loaded collection of entries.
#[derive(Clone, Debug, PartialEq)]
pub struct Ruleset {
    /// Logical name.
    pub name: String,
    /// Top-level entries in load order.
    pub entries: Vec<EntryId>,
    /// File the ruleset was read from, if any.
    pub path: Option<PathBuf>,
}

impl Ruleset {
    /// Creates an empty ruleset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            path: None,
        }
    }
}

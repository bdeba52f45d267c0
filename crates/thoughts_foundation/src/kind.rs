//! Variant descriptors for terms.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The variant of a [`Term`](crate::Term), without its payload.
///
/// Used to report what a command or rule expected versus what it was given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TermKind {
    /// JSON `null`, the absent term.
    Nil,
    /// Boolean atom.
    Bool,
    /// Integer atom.
    Int,
    /// Floating point atom.
    Float,
    /// Plain text.
    Atom,
    /// Single-slot variable (`?x`).
    Variable,
    /// Zero-or-more token wildcard (`*x`).
    Wildcard,
    /// Reference into the item store (`$x`).
    ItemRef,
    /// Ordered list of terms.
    List,
    /// String-keyed map of terms.
    Map,
}

impl TermKind {
    /// Returns true for the textual kinds (atoms, variables, wildcards, item references).
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(
            self,
            Self::Atom | Self::Variable | Self::Wildcard | Self::ItemRef
        )
    }

    /// Returns true for lists and maps.
    #[must_use]
    pub const fn is_compound(self) -> bool {
        matches!(self, Self::List | Self::Map)
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Atom => "text",
            Self::Variable => "variable",
            Self::Wildcard => "wildcard",
            Self::ItemRef => "item reference",
            Self::List => "list",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

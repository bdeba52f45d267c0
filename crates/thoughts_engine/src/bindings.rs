//! Variable bindings produced by unification.

use std::fmt;
use std::sync::Arc;

use im::OrdMap;
use thoughts_foundation::{Term, TermMap};

/// Bookkeeping key carrying the assertion that satisfied a match.
pub const WHEN_KEY: &str = "?#when";

/// Variable bindings from a successful match.
///
/// Keys are variable names including the leading `?`. Merging is
/// later-wins: a binding from a later constituent replaces an earlier one
/// for the same variable.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: OrdMap<Arc<str>, Term>,
}

impl Bindings {
    /// Create empty bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create bindings holding a single variable.
    #[must_use]
    pub fn single(var: &str, value: Term) -> Self {
        let mut bindings = Self::new();
        bindings.set(var, value);
        bindings
    }

    /// Get a binding by variable name.
    #[must_use]
    pub fn get(&self, var: &str) -> Option<&Term> {
        self.values.get(var)
    }

    /// Set a binding.
    pub fn set(&mut self, var: &str, value: Term) {
        self.values.insert(Arc::from(var), value);
    }

    /// Returns true if the variable is bound.
    #[must_use]
    pub fn contains(&self, var: &str) -> bool {
        self.values.contains_key(var)
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate all bindings in variable-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.values.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Merges `other` into `self`, overwriting shared variables.
    pub fn merge(&mut self, other: Bindings) {
        for (var, value) in other.values {
            self.values.insert(var, value);
        }
    }

    /// Returns a new set with `other` merged over `self`.
    #[must_use]
    pub fn merged(&self, other: &Bindings) -> Self {
        Self {
            values: other.values.clone().union(self.values.clone()),
        }
    }

    /// Converts the bindings into a map term.
    #[must_use]
    pub fn to_term(&self) -> Term {
        Term::Map(self.values.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<TermMap>())
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a> FromIterator<(&'a str, Term)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (&'a str, Term)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (var, value) in iter {
            bindings.set(var, value);
        }
        bindings
    }
}

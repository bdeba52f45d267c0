//! Core term type for facts, patterns, and bindings.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::{OrdMap, Vector};

use crate::kind::TermKind;

/// Persistent list of terms.
pub type TermList = Vector<Term>;

/// Persistent string-keyed map of terms.
pub type TermMap = OrdMap<Arc<str>, Term>;

/// Recursive value type for assertions, rule patterns, and bindings.
///
/// Terms are immutable and cheaply cloneable. Lists and maps use structural
/// sharing, so copying a rule or a binding set never deep-copies its contents.
///
/// Single-token strings are classified when a term is built from text:
/// `?x` is a [`Term::Variable`], `*x` a [`Term::Wildcard`], `$x` an
/// [`Term::ItemRef`]. Multi-word text is always an [`Term::Atom`]; the tokens
/// inside it are classified by the textual unifier.
#[derive(Clone)]
pub enum Term {
    /// The absent term (JSON `null`).
    Nil,
    /// Boolean atom.
    Bool(bool),
    /// Integer atom.
    Int(i64),
    /// Floating point atom.
    Float(f64),
    /// Plain text.
    Atom(Arc<str>),
    /// Single-slot variable, name includes the leading `?`.
    Variable(Arc<str>),
    /// Wildcard absorbing zero or more tokens, name includes the leading `*`.
    Wildcard(Arc<str>),
    /// Reference into the item store, name includes the leading `$`.
    ItemRef(Arc<str>),
    /// Ordered list.
    List(TermList),
    /// Map with unique string keys.
    Map(TermMap),
}

impl Term {
    /// Builds a term from text, classifying single-token variables,
    /// wildcards, and item references.
    #[must_use]
    pub fn from_text(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if !text.contains(char::is_whitespace) {
            match text.as_bytes().first() {
                Some(b'?') if text.len() > 1 => return Self::Variable(text.into()),
                Some(b'*') => return Self::Wildcard(text.into()),
                Some(b'$') if text.len() > 1 => return Self::ItemRef(text.into()),
                _ => {}
            }
        }
        Self::Atom(text.into())
    }

    /// Builds a plain text atom without classification.
    #[must_use]
    pub fn atom(text: impl AsRef<str>) -> Self {
        Self::Atom(text.as_ref().into())
    }

    /// Builds a map term from key/value pairs.
    #[must_use]
    pub fn map<K, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Term)>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (Arc::from(k.as_ref()), v))
                .collect(),
        )
    }

    /// Builds a list term.
    #[must_use]
    pub fn list<I: IntoIterator<Item = Term>>(items: I) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Returns the variant of this term.
    #[must_use]
    pub const fn kind(&self) -> TermKind {
        match self {
            Self::Nil => TermKind::Nil,
            Self::Bool(_) => TermKind::Bool,
            Self::Int(_) => TermKind::Int,
            Self::Float(_) => TermKind::Float,
            Self::Atom(_) => TermKind::Atom,
            Self::Variable(_) => TermKind::Variable,
            Self::Wildcard(_) => TermKind::Wildcard,
            Self::ItemRef(_) => TermKind::ItemRef,
            Self::List(_) => TermKind::List,
            Self::Map(_) => TermKind::Map,
        }
    }

    /// Returns true if this term is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns true if this term is a single-slot variable.
    #[must_use]
    pub const fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Returns true for lists and maps.
    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    /// Returns the text of any textual variant.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Atom(s) | Self::Variable(s) | Self::Wildcard(s) | Self::ItemRef(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract a list reference.
    #[must_use]
    pub const fn as_list(&self) -> Option<&TermList> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to extract a map reference.
    #[must_use]
    pub const fn as_map(&self) -> Option<&TermMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up a key if this term is a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Term> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Returns a copy with textual content lowercased.
    ///
    /// Only the top level is folded; map and list contents fold as they are
    /// visited by the unifier.
    #[must_use]
    pub fn folded(&self) -> Self {
        match self {
            Self::Atom(s) => Self::Atom(s.to_lowercase().into()),
            Self::Variable(s) => Self::Variable(s.to_lowercase().into()),
            Self::Wildcard(s) => Self::Wildcard(s.to_lowercase().into()),
            Self::ItemRef(s) => Self::ItemRef(s.to_lowercase().into()),
            other => other.clone(),
        }
    }

    /// Converts this term into a JSON value.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Self::Nil => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Int(n) => Json::from(*n),
            Self::Float(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
            Self::Atom(s) | Self::Variable(s) | Self::Wildcard(s) | Self::ItemRef(s) => {
                Json::String(s.to_string())
            }
            Self::List(items) => Json::Array(items.iter().map(Term::to_json).collect()),
            Self::Map(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Parses JSON text into a term.
    ///
    /// # Errors
    /// Returns an error if the text is not valid JSON.
    pub fn parse_json(text: &str) -> crate::Result<Self> {
        serde_json::from_str::<serde_json::Value>(text)
            .map(Self::from)
            .map_err(|e| crate::Error::json(e.to_string()))
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Atom(a), Self::Atom(b))
            | (Self::Variable(a), Self::Variable(b))
            | (Self::Wildcard(a), Self::Wildcard(b))
            | (Self::ItemRef(a), Self::ItemRef(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Term {}

impl Hash for Term {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Nil => {}
            Self::Bool(b) => b.hash(state),
            Self::Int(n) => n.hash(state),
            Self::Float(n) => n.to_bits().hash(state),
            Self::Atom(s) | Self::Variable(s) | Self::Wildcard(s) | Self::ItemRef(s) => {
                s.hash(state);
            }
            Self::List(items) => items.hash(state),
            Self::Map(map) => map.hash(state),
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(s) => write!(f, "{s:?}"),
            Self::Variable(s) | Self::Wildcard(s) | Self::ItemRef(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(text),
            None => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<serde_json::Value> for Term {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Json::Null => Self::Nil,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            Json::String(s) => Self::from_text(s),
            Json::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Json::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (Arc::from(k.as_str()), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Self::from_text(s)
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Self::from_text(s)
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<usize> for Term {
    fn from(n: usize) -> Self {
        i64::try_from(n).map_or(Self::Float(n as f64), Self::Int)
    }
}

impl From<f64> for Term {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl<T: Into<Term>> From<Vec<T>> for Term {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<TermMap> for Term {
    fn from(map: TermMap) -> Self {
        Self::Map(map)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Term {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.to_json(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Term {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <serde_json::Value as serde::Deserialize>::deserialize(deserializer).map(Self::from)
    }
}

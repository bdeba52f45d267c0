//! Substitution of variables and item references into terms.

use thoughts_foundation::{Term, TermMap};

use crate::bindings::Bindings;
use crate::text::{is_bare_variable, replace_variables, strip_class};

/// Keys whose values name a storage slot and are never substituted.
pub const STORAGE_KEYS: [&str; 3] = ["#into", "#append", "#push"];

/// Key whose list of maps is merged into the enclosing map.
pub const COMBINE_KEY: &str = "#combine";

/// Prefix marking text that must be left untouched.
pub const ESCAPE_PREFIX: &str = "#\\";

/// Resolves references found in text.
pub trait Resolver {
    /// Returns the replacement for `text`, or `None` to keep it unchanged.
    fn resolve_text(&self, text: &str) -> Option<Term>;
}

/// Substitutes references throughout a term.
///
/// Text is handed to the resolver. Lists and maps are walked recursively,
/// except the values of storage keys. A map containing `#combine` is
/// replaced by the merge of the maps listed under it.
#[must_use]
pub fn apply_values<R: Resolver + ?Sized>(term: &Term, resolver: &R) -> Term {
    match term {
        Term::List(items) => Term::List(items.iter().map(|t| apply_values(t, resolver)).collect()),
        Term::Map(map) => apply_map(map, resolver),
        other => match other.as_text() {
            Some(text) if !text.starts_with(ESCAPE_PREFIX) => {
                resolver.resolve_text(text).unwrap_or_else(|| other.clone())
            }
            _ => other.clone(),
        },
    }
}

fn apply_map<R: Resolver + ?Sized>(map: &TermMap, resolver: &R) -> Term {
    if let Some(parts) = map.get(COMBINE_KEY) {
        let mut combined = TermMap::new();
        if let Term::List(parts) = apply_values(parts, resolver) {
            for part in parts {
                if let Term::Map(part) = part {
                    combined = part.union(combined);
                }
            }
        }
        return Term::Map(combined);
    }

    Term::Map(
        map.iter()
            .map(|(key, value)| {
                let value = if STORAGE_KEYS.contains(&key.as_ref()) {
                    value.clone()
                } else {
                    apply_values(value, resolver)
                };
                (key.clone(), value)
            })
            .collect(),
    )
}

impl Resolver for Bindings {
    /// A bare variable is replaced by its bound term. Variables inside
    /// longer text are replaced with the bound term's text wherever they
    /// occur, including when glued to punctuation.
    fn resolve_text(&self, text: &str) -> Option<Term> {
        if is_bare_variable(text) {
            if let Some(value) = bound(self, strip_class(text)) {
                return Some(value.clone());
            }
        }
        if !text.contains('?') {
            return None;
        }
        replace_variables(text, |name| bound(self, name).map(ToString::to_string)).map(Term::from_text)
    }
}

fn bound<'a>(bindings: &'a Bindings, name: &str) -> Option<&'a Term> {
    bindings
        .get(name)
        .or_else(|| bindings.get(&name.to_lowercase()))
}

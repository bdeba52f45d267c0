//! Unification of terms.
//!
//! [`unify`] matches two terms and returns the variable bindings that make
//! them agree, or `None` when they cannot match. A failed match is the
//! normal outcome and is never an error.
//!
//! Textual terms are matched word by word with a greedy single-pass scan
//! (see [`unify_text`]). It does not backtrack: a variable absorbs words
//! until the words that follow it line up on both sides.

use thoughts_foundation::{Term, TermMap};

use crate::bindings::Bindings;
use crate::text::{is_bare_variable, is_variable, is_wildcard, strip_class, tokenize};

/// Reserved key holding an assertion's start position.
pub const SEQ_START: &str = "#seq-start";
/// Reserved key holding an assertion's end position.
pub const SEQ_END: &str = "#seq-end";

const ESCAPED_SEQ_START: &str = "##seq-start";
const ESCAPED_SEQ_END: &str = "##seq-end";

/// Unifies two terms.
///
/// Text is compared case-insensitively. A bare variable on either side
/// binds to the other term, checking `term1` first. Two maps unify when
/// every key of `term2` exists in `term1` and the values unify; `term1` may
/// carry extra keys. Lists only unify when equal.
#[must_use]
pub fn unify(term1: &Term, term2: &Term) -> Option<Bindings> {
    match (term1, term2) {
        (Term::Nil, Term::Nil) => return Some(Bindings::new()),
        (Term::Nil, _) | (_, Term::Nil) => return None,
        _ => {}
    }

    let term1 = term1.folded();
    let term2 = term2.folded();

    if term1 == term2 {
        return Some(Bindings::new());
    }

    if let Some(var) = bare_variable(&term1) {
        return Some(Bindings::single(var, term2));
    }
    if let Some(var) = bare_variable(&term2) {
        return Some(Bindings::single(var, term1));
    }

    match (&term1, &term2) {
        (Term::Map(m1), Term::Map(m2)) => unify_maps(m1, m2),
        _ => match (term1.as_text(), term2.as_text()) {
            (Some(a), Some(b)) => unify_text(a, b),
            _ => None,
        },
    }
}

fn bare_variable(term: &Term) -> Option<&str> {
    term.as_text().filter(|text| is_bare_variable(text))
}

fn unify_maps(m1: &TermMap, m2: &TermMap) -> Option<Bindings> {
    let mut result = Bindings::new();
    for (key, pattern) in m2 {
        let key1 = match key.as_ref() {
            SEQ_START | SEQ_END => continue,
            ESCAPED_SEQ_START => SEQ_START,
            ESCAPED_SEQ_END => SEQ_END,
            other => other,
        };
        let value = m1.get(key1)?;
        result.merge(unify(value, pattern)?);
    }
    Some(result)
}

/// Greedy word-level unification of two strings.
///
/// Walks both token lists left to right. Equal tokens advance both sides.
/// A wildcard skips tokens on the other side until that side's current
/// token matches the token following the wildcard. A variable facing
/// literal text collects words until the next tokens on both sides agree,
/// then binds the collected words. Any other mismatch stops the scan.
///
/// The match succeeds when both sides are consumed, or when the only
/// token left on the first side is a bare `*`.
#[must_use]
pub fn unify_text(m1: &str, m2: &str) -> Option<Bindings> {
    if m1 == m2 {
        return Some(Bindings::new());
    }

    let slotted = |s: &str| s.contains('?') || s.contains('*');
    if !slotted(m1) && !slotted(m2) && m1.chars().next() != m2.chars().next() {
        return None;
    }

    let a1 = tokenize(m1);
    let a2 = tokenize(m2);
    if a1.is_empty() || a2.is_empty() {
        return None;
    }

    let mut result = Bindings::new();
    let mut bound = String::new();
    let (mut i1, mut i2) = (0, 0);

    loop {
        let w1 = strip_class(a1[i1]);
        let w2 = strip_class(a2[i2]);
        let n1 = a1.get(i1 + 1).copied().unwrap_or("");
        let n2 = a2.get(i2 + 1).copied().unwrap_or("");
        let (v1, v2) = (is_variable(w1), is_variable(w2));

        if w1 == w2 {
            i1 += 1;
            i2 += 1;
        } else if is_wildcard(w2) {
            if w1 == n2 {
                i2 += 1;
            } else {
                i1 += 1;
            }
        } else if is_wildcard(w1) {
            if w2 == n1 {
                i1 += 1;
            } else {
                i2 += 1;
            }
        } else if v2 && !v1 {
            bound.push(' ');
            bound.push_str(w1);
            if n1 == n2 {
                result.set(w2, Term::from_text(bound.trim()));
                bound.clear();
                i2 += 1;
            }
            i1 += 1;
        } else if v1 && !v2 {
            bound.push(' ');
            bound.push_str(w2);
            if n1 == n2 {
                result.set(w1, Term::from_text(bound.trim()));
                bound.clear();
                i1 += 1;
            }
            i2 += 1;
        } else {
            break;
        }

        // a wildcard left on the second side once the first is exhausted matches nothing
        if i1 == a1.len() && i2 < a2.len() && is_wildcard(a2[i2]) {
            i2 += 1;
        }
        if i1 == a1.len() || i2 == a2.len() {
            break;
        }
    }

    let consumed = i1 == a1.len() && i2 == a2.len();
    let trailing_star = i1 + 1 == a1.len() && a1[i1] == "*";
    (consumed || trailing_star).then_some(result)
}

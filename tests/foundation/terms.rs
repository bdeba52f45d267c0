//! Integration tests for Term
//!
//! Tests classification, JSON conversion, serde, and display.

use proptest::prelude::*;
use thoughts_foundation::{Term, TermKind};

fn json(s: &str) -> Term {
    Term::parse_json(s).unwrap()
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn single_tokens_are_classified() {
    assert_eq!(Term::from_text("?name").kind(), TermKind::Variable);
    assert_eq!(Term::from_text("*rest").kind(), TermKind::Wildcard);
    assert_eq!(Term::from_text("$user").kind(), TermKind::ItemRef);
    assert_eq!(Term::from_text("hello").kind(), TermKind::Atom);
}

#[test]
fn lone_sigils_stay_atoms() {
    assert_eq!(Term::from_text("?").kind(), TermKind::Atom);
    assert_eq!(Term::from_text("$").kind(), TermKind::Atom);
}

#[test]
fn multi_word_text_is_an_atom() {
    let term = Term::from_text("hello ?name");
    assert_eq!(term.kind(), TermKind::Atom);
    assert_eq!(term.as_text(), Some("hello ?name"));
}

#[test]
fn json_strings_are_classified() {
    let term = json(r#"{"who": "?x", "what": "$thing", "say": "hi there"}"#);
    assert_eq!(term.get("who").map(Term::kind), Some(TermKind::Variable));
    assert_eq!(term.get("what").map(Term::kind), Some(TermKind::ItemRef));
    assert_eq!(term.get("say").map(Term::kind), Some(TermKind::Atom));
}

// =============================================================================
// JSON
// =============================================================================

#[test]
fn json_scalars() {
    assert!(json("null").is_nil());
    assert_eq!(json("true"), Term::Bool(true));
    assert_eq!(json("42"), Term::Int(42));
    assert_eq!(json("1.5"), Term::Float(1.5));
}

#[test]
fn json_round_trip_preserves_structure() {
    let text = r#"{"a":[1,"two",{"b":null}],"c":false}"#;
    let term = json(text);
    assert_eq!(Term::from(term.to_json()), term);
    assert_eq!(term.to_string(), text);
}

#[test]
fn malformed_json_is_an_error() {
    let err = Term::parse_json("[1, 2").unwrap_err();
    assert!(err.to_string().starts_with("invalid json"));
}

#[test]
fn serde_goes_through_json() {
    let term = json(r#"{"when": "hello ?x", "then": ["a", 1]}"#);
    let value = serde_json::to_value(&term).unwrap();
    let back: Term = serde_json::from_value(value).unwrap();
    assert_eq!(back, term);
}

// =============================================================================
// Accessors
// =============================================================================

#[test]
fn folding_lowercases_text_only() {
    assert_eq!(Term::atom("Hello World").folded(), Term::atom("hello world"));
    assert_eq!(Term::Int(3).folded(), Term::Int(3));
}

#[test]
fn display_prints_text_bare() {
    assert_eq!(Term::atom("plain words").to_string(), "plain words");
    assert_eq!(json("[1,2]").to_string(), "[1,2]");
}

#[test]
fn conversions() {
    assert_eq!(Term::from("x"), Term::from_text("x"));
    assert_eq!(Term::from(7_i64), Term::Int(7));
    assert_eq!(Term::from(true), Term::Bool(true));
    assert_eq!(Term::from(vec![Term::Int(1)]), json("[1]"));
}

proptest! {
    #[test]
    fn any_json_integer_round_trips(n in any::<i64>()) {
        let term = json(&n.to_string());
        prop_assert_eq!(term.as_int(), Some(n));
        prop_assert_eq!(term.to_json(), serde_json::Value::from(n));
    }

    #[test]
    fn plain_words_stay_atoms(words in prop::collection::vec("[a-z]{1,8}", 1..5)) {
        let text = words.join(" ");
        prop_assert_eq!(Term::from_text(&text), Term::atom(&text));
    }
}

//! Integration tests for unification
//!
//! Tests the unifier contract over nil, text, variables, and maps.

use proptest::prelude::*;
use thoughts_engine::{Bindings, unify, unify_text};
use thoughts_foundation::Term;

fn json(s: &str) -> Term {
    Term::parse_json(s).unwrap()
}

fn bound(pairs: &[(&str, &str)]) -> Bindings {
    pairs.iter().map(|(k, v)| (*k, Term::from_text(v))).collect()
}

#[test]
fn nil_unifies_only_with_nil() {
    assert_eq!(unify(&Term::Nil, &Term::Nil), Some(Bindings::new()));
    assert_eq!(unify(&Term::Nil, &Term::atom("x")), None);
    assert_eq!(unify(&Term::atom("x"), &Term::Nil), None);
}

#[test]
fn variable_in_sentence() {
    assert_eq!(
        unify(&Term::atom("I am ?x"), &Term::atom("I am happy")),
        Some(bound(&[("?x", "happy")]))
    );
}

#[test]
fn map_pattern_binds_variable() {
    let fact = json(r#"{"action": "talk", "subject": "alice"}"#);
    let pattern = json(r#"{"action": "talk", "subject": "?person"}"#);
    assert_eq!(unify(&fact, &pattern), Some(bound(&[("?person", "alice")])));
}

#[test]
fn map_superset_is_one_directional() {
    let big = json(r#"{"action": "talk", "subject": "alice", "mood": "calm"}"#);
    let small = json(r#"{"action": "talk"}"#);
    assert!(unify(&big, &small).is_some());
    assert!(unify(&small, &big).is_none());
}

#[test]
fn text_is_case_insensitive() {
    assert!(unify(&Term::atom("WHAT Time is it"), &Term::atom("what time is it")).is_some());
}

#[test]
fn wildcard_and_variable_together() {
    let result = unify_text("well my name is Ada Lovelace", "* name is ?who").unwrap();
    assert_eq!(result.get("?who"), Some(&Term::atom("Ada Lovelace")));

    let folded = unify(&Term::atom("My name is Ada"), &Term::atom("* name is ?who")).unwrap();
    assert_eq!(folded.get("?who"), Some(&Term::atom("ada")));
}

#[test]
fn failure_is_none_not_error() {
    assert!(unify(&Term::atom("good morning"), &Term::atom("good night")).is_none());
    assert!(unify(&Term::Int(1), &Term::Int(2)).is_none());
}

proptest! {
    #[test]
    fn literal_sentences_unify_with_themselves(words in prop::collection::vec("[a-z]{1,6}", 1..8)) {
        let text = words.join(" ");
        prop_assert_eq!(unify_text(&text, &text), Some(Bindings::new()));
    }

    #[test]
    fn maps_unify_with_their_subsets(
        keys in prop::collection::btree_set("[a-z]{1,4}", 1..6),
        keep in 0usize..6,
    ) {
        let full = Term::map(keys.iter().map(|k| (k.as_str(), Term::atom(k))));
        let subset = Term::map(keys.iter().take(keep).map(|k| (k.as_str(), Term::atom(k))));
        prop_assert!(unify(&full, &subset).is_some());
    }
}

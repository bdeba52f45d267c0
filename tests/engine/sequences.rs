//! Integration tests for sequence rules
//!
//! Tests ordered and set matching through the public engine API.

use thoughts_engine::{Engine, EngineConfig};
use thoughts_foundation::Term;

fn json(s: &str) -> Term {
    Term::parse_json(s).unwrap()
}

fn engine(rules: &str) -> Engine {
    let mut engine = Engine::with_config(EngineConfig::deterministic(1));
    engine.load_rules_from_str(rules, Some("test")).unwrap();
    engine
}

#[test]
fn consecutive_words_fire_once() {
    let mut engine = engine(r#"[{"when": ["hello", "?name"], "then": "hi ?name"}]"#);
    let leaves = engine.process(&json(r#"["hello", "Bob"]"#)).unwrap();
    assert_eq!(leaves, vec![Term::atom("hi bob")]);
}

#[test]
fn out_of_order_words_do_not_fire() {
    let mut engine = engine(r#"[{"when": ["hello", "?name"], "then": "hi ?name"}]"#);
    let leaves = engine.process(&json(r#"["Bob", "hello"]"#)).unwrap();
    assert!(!leaves.contains(&Term::atom("hi bob")));
    assert!(!leaves.iter().any(|t| t.as_text().is_some_and(|s| s.starts_with("hi "))));
}

#[test]
fn set_rules_fire_in_any_order() {
    let rules = r##"[{"when": ["red", "green", "blue"], "then": "rgb", "#seq-type": "set"}]"##;
    for input in [
        r#"["blue", "red", "green"]"#,
        r#"["green", "blue", "red"]"#,
    ] {
        let mut engine = engine(rules);
        let leaves = engine.process(&json(input)).unwrap();
        assert_eq!(
            leaves.iter().filter(|t| **t == Term::atom("rgb")).count(),
            1,
            "input {input}"
        );
    }
}

#[test]
fn set_constituents_are_not_matched_twice() {
    let rules = r##"[{"when": ["red", "green"], "then": "pair", "#seq-type": "set"}]"##;
    let mut engine = engine(rules);
    let leaves = engine.process(&json(r#"["red", "red"]"#)).unwrap();
    assert!(!leaves.contains(&Term::atom("pair")));

    let leaves = engine.process(&json(r#"["red", "green"]"#)).unwrap();
    assert_eq!(leaves.iter().filter(|t| **t == Term::atom("pair")).count(), 1);
}

#[test]
fn allow_junk_skips_gaps() {
    let rules = r##"[{"when": ["big", "dog"], "then": "found", "#seq-type": "allow-junk"}]"##;
    let mut engine = engine(rules);
    let leaves = engine.process(&json(r#"["big", "hairy", "dog"]"#)).unwrap();
    assert!(leaves.contains(&Term::atom("found")));
}

#[test]
fn default_rules_reject_gaps() {
    let rules = r#"[{"when": ["big", "dog"], "then": "found"}]"#;
    let mut engine = engine(rules);
    let leaves = engine.process(&json(r#"["big", "hairy", "dog"]"#)).unwrap();
    assert!(!leaves.contains(&Term::atom("found")));
}

#[test]
fn sequence_conclusions_chain_into_longer_sequences() {
    let rules = r#"[
        {"when": ["the", "?adj", "cat"], "then": "cat is ?adj"},
        {"when": "cat is ?adj", "then": "noted ?adj"}
    ]"#;
    let mut engine = engine(rules);
    let leaves = engine.process(&json(r#"["the", "lazy", "cat"]"#)).unwrap();
    assert!(leaves.contains(&Term::atom("noted lazy")));
}

#[test]
fn include_seq_keeps_positions() {
    let mut engine = Engine::with_config(EngineConfig::deterministic(1).with_include_seq(true));
    engine
        .load_rules_from_str(r#"[{"when": ["a", "b"], "then": "ab"}]"#, None)
        .unwrap();
    let leaves = engine.process(&json(r#"["a", "b"]"#)).unwrap();
    let ab = leaves
        .iter()
        .find(|t| t.get("#assert") == Some(&Term::atom("ab")))
        .unwrap();
    assert_eq!(ab.get("#seq-start"), Some(&Term::Int(0)));
    assert_eq!(ab.get("#seq-end"), Some(&Term::Int(2)));
    assert_eq!(ab.get("#seq").and_then(Term::as_list).map(|l| l.len()), Some(2));
}

//! Integration tests for the knowledge base
//!
//! Tests rule loading, the token index, and the item store.

use std::fs;
use std::path::PathBuf;

use proptest::prelude::*;
use thoughts_engine::{Engine, EngineConfig, Entry, KnowledgeBase, When, unify};
use thoughts_foundation::{ErrorKind, Term};

fn json(s: &str) -> Term {
    Term::parse_json(s).unwrap()
}

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("thoughts-kb-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

const WORDS: &[&str] = &["red", "green", "blue", "big", "small", "?x", "*"];

fn pattern_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 1..4).prop_map(|w| w.join(" "))
}

fn input_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(&WORDS[..5]), 1..5).prop_map(|w| w.join(" "))
}

// =============================================================================
// Index
// =============================================================================

proptest! {
    #[test]
    fn index_never_misses_a_matching_rule(
        patterns in prop::collection::vec(pattern_strategy(), 1..8),
        input in input_strategy(),
    ) {
        let rules = Term::list(patterns.iter().map(|p| {
            Term::map([("when", Term::from_text(p)), ("then", Term::atom("ok"))])
        }));
        let mut kb = KnowledgeBase::new(&EngineConfig::default());
        kb.add_ruleset(&rules, Some("p"), None).unwrap();

        let input = Term::from_text(&input);
        let hits = kb.search_index(&input).unwrap();
        let ruleset = kb.ruleset("p").unwrap();

        for id in &ruleset.entries {
            let Some(Entry::Rule(rule)) = kb.entry(*id) else { continue };
            let When::Single(pattern) = &rule.when else { continue };
            if unify(&input, pattern).is_some() {
                prop_assert!(hits.contains(id), "{pattern} matches {input} but {id} was not indexed");
            }
        }
    }

    #[test]
    fn index_hits_are_a_subset_of_candidates(
        patterns in prop::collection::vec(pattern_strategy(), 1..8),
        input in input_strategy(),
    ) {
        let rules = Term::list(patterns.iter().map(|p| {
            Term::map([("when", Term::from_text(p)), ("then", Term::atom("ok"))])
        }));
        let mut kb = KnowledgeBase::new(&EngineConfig::default());
        kb.add_ruleset(&rules, None, None).unwrap();

        let input = Term::from_text(&input);
        let hits = kb.search_index(&input).unwrap();
        let everything = kb.candidates(&Term::atom("?anything"));
        prop_assert!(hits.iter().all(|id| everything.contains(id)));
    }
}

#[test]
fn index_keeps_load_order() {
    let mut kb = KnowledgeBase::new(&EngineConfig::default());
    kb.load_rules_from_str(
        r#"[
            {"when": "red apple", "then": "a"},
            {"when": "?x", "then": "b"},
            {"when": "green apple", "then": "c"}
        ]"#,
        Some("fruit"),
    )
    .unwrap();

    let hits = kb.search_index(&Term::atom("red apple")).unwrap();
    let entries = &kb.ruleset("fruit").unwrap().entries;
    assert_eq!(hits, entries.clone());
}

// =============================================================================
// Rulesets
// =============================================================================

#[test]
fn file_rulesets_are_named_after_the_file() {
    let path = scratch_file("greetings.json", r#"[{"when": "hello", "then": "hi"}]"#);
    let mut engine = Engine::new();
    let name = engine.load_rules_from_file(&path, None).unwrap();
    assert_eq!(name, "greetings");
    assert_eq!(engine.process(&Term::atom("hello")).unwrap(), vec![Term::atom("hi")]);
}

#[test]
fn reload_picks_up_file_changes() {
    let path = scratch_file("moods.json", r#"[{"when": "how are you", "then": "fine"}]"#);
    let mut engine = Engine::new();
    let name = engine.load_rules_from_file(&path, Some("moods")).unwrap();
    assert_eq!(name, "moods");

    fs::write(&path, r#"[{"when": "how are you", "then": "splendid"}]"#).unwrap();
    engine.reload_ruleset("moods").unwrap();

    let out = engine.process(&Term::atom("how are you")).unwrap();
    assert_eq!(out, vec![Term::atom("splendid")]);
    assert_eq!(engine.knowledge().ruleset("moods").unwrap().entries.len(), 1);
}

#[test]
fn malformed_file_leaves_existing_rules_alone() {
    let path = scratch_file("broken.json", r#"[{"when": "a", "then": "b"}, {"when": "c"}]"#);
    let mut engine = Engine::new();
    engine
        .load_rules_from_str(r#"[{"when": "a", "then": "kept"}]"#, Some("broken"))
        .unwrap();

    let err = engine.load_rules_from_file(&path, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::InvalidRule(_) | ErrorKind::RuleLoad { .. }));
    assert_eq!(engine.process(&Term::atom("a")).unwrap(), vec![Term::atom("kept")]);
}

#[test]
fn unknown_ruleset_reload_is_an_error() {
    let mut engine = Engine::new();
    let err = engine.reload_ruleset("nowhere").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownRuleset(ref name) if name == "nowhere"));
}

#[test]
fn guarded_blocks_follow_items() {
    let mut engine = Engine::new();
    engine
        .load_rules_from_str(
            r##"[
                {"#if": {"value": "$mode", "equals": "formal"},
                 "#then": [{"when": "hi", "then": "good day"}]},
                {"when": "hi", "then": "hey"}
            ]"##,
            Some("manners"),
        )
        .unwrap();

    assert_eq!(engine.process(&Term::atom("hi")).unwrap(), vec![Term::atom("hey")]);

    engine.knowledge_mut().set_item("$mode", Term::atom("formal"));
    let out = engine.process(&Term::atom("hi")).unwrap();
    assert_eq!(out, vec![Term::atom("good day"), Term::atom("hey")]);
}

// =============================================================================
// Items
// =============================================================================

#[test]
fn dollar_items_outlive_clear_items() {
    let mut engine = Engine::new();
    engine
        .load_rules_from_str(r#"[{"when": "who am i", "then": "you are $name"}]"#, None)
        .unwrap();

    engine.knowledge_mut().set_item("$name", Term::atom("Ada"));
    engine.knowledge_mut().set_item("scratch", Term::Int(3));
    engine.clear_items();

    assert!(engine.knowledge().item("scratch").is_none());
    let out = engine.process(&Term::atom("who am i")).unwrap();
    assert_eq!(out, vec![Term::atom("you are Ada")]);
}

#[test]
fn item_facts_resolve_through_paths() {
    let mut engine = Engine::new();
    engine
        .load_rules_from_str(
            r##"[
                {"#item": "$pets", "name": "rex", "kind": "dog"},
                {"#item": "$pets", "name": "tom", "kind": "cat"},
                {"when": "list pets", "then": "pets: $pets.name"}
            ]"##,
            Some("pets"),
        )
        .unwrap();

    let out = engine.process(&Term::atom("list pets")).unwrap();
    assert_eq!(out, vec![Term::atom("pets: rex tom")]);
}

#[test]
fn retrieve_leaves_unknown_references() {
    let kb = KnowledgeBase::new(&EngineConfig::default());
    assert_eq!(kb.retrieve("hello $nobody"), Term::atom("hello $nobody"));
}

#[test]
fn retrieve_returns_structured_values_whole() {
    let mut kb = KnowledgeBase::new(&EngineConfig::default());
    kb.set_item("$point", json(r#"{"x": 1, "y": 2}"#));
    assert_eq!(kb.retrieve("$point"), json(r#"{"x": 1, "y": 2}"#));
    assert_eq!(kb.retrieve("$point.x"), Term::Int(1));
}

//! Integration tests for the agenda
//!
//! Tests saturation, conclusion extraction, and the step limit.

use thoughts_engine::{
    Command, CommandInput, Engine, EngineConfig, KnowledgeBase, TraceKind,
    extract_final_conclusions,
};
use thoughts_foundation::{ErrorKind, Result, SemanticLimit, Term};

fn json(s: &str) -> Term {
    Term::parse_json(s).unwrap()
}

fn engine(rules: &str) -> Engine {
    let mut engine = Engine::with_config(EngineConfig::deterministic(9));
    engine.load_rules_from_str(rules, Some("test")).unwrap();
    engine
}

/// Echoes its `#shout` argument in upper case.
struct Shout;

impl Command for Shout {
    fn name(&self) -> &str {
        "#shout"
    }

    fn execute(&self, input: &CommandInput<'_>, _kb: &mut KnowledgeBase) -> Result<Term> {
        let text = input.arg("#shout").and_then(Term::as_text).unwrap_or_default();
        Ok(Term::atom(text.to_uppercase()))
    }
}

#[test]
fn what_time_is_it() {
    let mut engine = engine(r#"[{"when": "what time is it", "then": "time to get a new watch"}]"#);
    let out = engine.process(&Term::atom("What time is it")).unwrap();
    assert_eq!(out, vec![Term::atom("time to get a new watch")]);
}

#[test]
fn fan_out_then_fan_in() {
    let mut engine = engine(
        r#"[
            {"when": "start", "then": ["left", "right"]},
            {"when": "left", "then": "done"},
            {"when": "right", "then": "done"}
        ]"#,
    );
    let out = engine.process(&Term::atom("start")).unwrap();
    assert_eq!(out, vec![Term::atom("done"), Term::atom("done")]);
}

#[test]
fn extraction_does_not_disturb_the_forest() {
    let mut engine = engine(r#"[{"when": "a", "then": "b"}, {"when": "b", "then": "c"}]"#);
    let forest = engine.process_tree(&Term::atom("a")).unwrap();
    let snapshot = forest.clone();

    let first = extract_final_conclusions(&forest, false);
    let second = extract_final_conclusions(&forest, false);
    assert_eq!(first, second);
    assert_eq!(first, vec![Term::atom("c")]);
    assert_eq!(forest, snapshot);
}

#[test]
fn every_node_is_resolved_after_processing() {
    let mut engine = engine(r#"[{"when": "a", "then": ["b", "c"]}, {"when": "b", "then": "d"}]"#);
    let forest = engine.process_tree(&Term::atom("a")).unwrap();

    fn all_resolved(nodes: &[thoughts_engine::Assertion]) -> bool {
        nodes.iter().all(|node| {
            node.is_resolved() && all_resolved(node.conclusions.as_deref().unwrap_or_default())
        })
    }
    assert!(all_resolved(&forest));
}

#[test]
fn cyclic_rules_stop_at_the_step_limit() {
    let mut engine = Engine::with_config(EngineConfig::default().with_max_steps(25));
    engine
        .load_rules_from_str(r#"[{"when": "ping", "then": "pong"}, {"when": "pong", "then": "ping"}]"#, None)
        .unwrap();

    let err = engine.process(&Term::atom("ping")).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::MaxSteps { limit: 25, .. })
    ));
}

#[test]
fn runaway_chains_fail_cleanly_under_the_default_config() {
    let mut engine = Engine::new();
    engine
        .load_rules_from_str(r#"[{"when": "again", "then": "again"}]"#, None)
        .unwrap();

    let err = engine.process(&Term::atom("again")).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(SemanticLimit::MaxDepth { .. })
    ));

    // The engine stays usable after the limit trips.
    engine.load_rules_from_str(r#"[{"when": "hello", "then": "hi"}]"#, None).unwrap();
    assert_eq!(engine.process(&Term::atom("hello")).unwrap(), vec![Term::atom("hi")]);
}

#[test]
fn deep_chains_within_the_limit_complete() {
    let rules: Vec<String> = (0..300)
        .map(|i| format!(r#"{{"when": "step {i}", "then": "step {}"}}"#, i + 1))
        .collect();
    let mut engine = Engine::new();
    engine
        .load_rules_from_str(&format!("[{}]", rules.join(",")), None)
        .unwrap();

    let out = engine.process(&Term::atom("step 0")).unwrap();
    assert_eq!(out, vec![Term::atom("step 300")]);
}

#[test]
fn process_single_stops_early_and_keeps_arcs() {
    let mut engine = engine(
        r#"[
            {"when": ["one", "two"], "then": "pair"},
            {"when": "three", "then": "lone"}
        ]"#,
    );

    let forest = engine.process_single(&json(r#"["three", "one"]"#)).unwrap();
    assert_eq!(forest.len(), 2);
    assert!(forest[0].is_resolved());
    assert!(!forest[1].is_resolved());
    assert!(engine.knowledge().arcs().is_empty());

    let forest = engine.process_single(&json(r#"["one"]"#)).unwrap();
    assert!(forest[0].is_resolved());
    assert_eq!(engine.knowledge().arcs().len(), 1);
}

#[test]
fn commands_run_through_the_agenda() {
    let mut engine = engine(r##"[{"when": "say ?word", "then": {"#shout": "?word"}}]"##);
    engine.register(Shout);

    let out = engine.process(&Term::atom("say hello")).unwrap();
    assert_eq!(out, vec![Term::atom("HELLO")]);
}

#[test]
fn command_failures_surface_with_the_command_name() {
    struct Fails;
    impl Command for Fails {
        fn name(&self) -> &str {
            "#fails"
        }
        fn execute(&self, input: &CommandInput<'_>, _kb: &mut KnowledgeBase) -> Result<Term> {
            Err(input.error("always"))
        }
    }

    let mut engine = engine(r##"[{"when": "go", "then": {"#fails": true}}]"##);
    engine.register(Fails);

    let err = engine.process(&Term::atom("go")).unwrap_err();
    assert!(err.to_string().contains("#fails"));
}

#[test]
fn trace_follows_the_agenda() {
    let mut engine = engine(r#"[{"when": "a", "then": "b"}]"#);
    engine.process(&Term::atom("a")).unwrap();

    let kinds: Vec<TraceKind> = engine.knowledge().trace().iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&TraceKind::Assert));
    assert!(kinds.contains(&TraceKind::Add));
}

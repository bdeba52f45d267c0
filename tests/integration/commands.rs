//! Built-in commands dispatched through the engine.

use thoughts::EngineConfig;
use thoughts::foundation::Term;

fn json(s: &str) -> Term {
    Term::parse_json(s).unwrap()
}

#[test]
fn format_runs_inline_inside_output() {
    let mut engine = thoughts::engine();
    engine
        .load_rules_from_str(
            r##"[{"when": "introduce ?who", "then": {"#output": {"#format": "?who", "#as": "proper"}}}]"##,
            None,
        )
        .unwrap();

    engine.process(&Term::atom("introduce ada")).unwrap();
    assert_eq!(engine.knowledge_mut().drain_output(), vec!["Ada"]);
}

#[test]
fn replace_translates_a_word() {
    let mut engine = thoughts::engine();
    engine
        .load_rules_from_str(
            r##"[{"when": "translate ?word",
                  "then": {"#replace": "?word", "with": {"hello": "bonjour", "cat": "chat"}}}]"##,
            None,
        )
        .unwrap();

    let out = engine.process(&Term::atom("translate cat")).unwrap();
    assert_eq!(out, vec![Term::atom("chat")]);
    let out = engine.process(&Term::atom("translate dog")).unwrap();
    assert!(out.iter().all(|t| t.as_text().is_none()));
}

#[test]
fn random_is_reproducible_with_a_seed() {
    let choices = ["heads", "tails", "edge"];
    let pick = |seed: u64| {
        let mut engine = thoughts::engine_with_config(EngineConfig::deterministic(seed));
        engine
            .process(&json(r##"{"#random": ["heads", "tails", "edge"]}"##))
            .unwrap()
    };

    for seed in [1, 2, 99] {
        let first = pick(seed);
        assert_eq!(first, pick(seed));
        assert_eq!(first.len(), 1);
        assert!(choices.iter().any(|c| first[0] == Term::atom(c)));
    }
}

#[test]
fn first_and_rest_split_text() {
    let mut engine = thoughts::engine();
    let head = engine.process(&json(r##"{"#first": "alpha beta gamma"}"##)).unwrap();
    assert_eq!(head, vec![Term::atom("alpha")]);

    let tail = engine.process(&json(r##"{"#rest": "alpha beta gamma"}"##)).unwrap();
    assert_eq!(tail, vec![Term::atom("beta"), Term::atom("gamma")]);
}

#[test]
fn date_formats_fixed_dates() {
    let mut engine = thoughts::engine();
    let out = engine
        .process(&json(r##"{"#date": "2024-03-04", "format": "%d/%m/%Y"}"##))
        .unwrap();
    assert_eq!(out, vec![Term::atom("04/03/2024")]);
}

#[test]
fn stored_results_are_visible_to_later_output() {
    let mut engine = thoughts::engine();
    engine
        .load_rules_from_str(
            r##"[{"when": "remember ?thing",
                  "then": [{"#first": "?thing forever", "#into": "$kept"},
                           {"#output": "kept $kept"}]}]"##,
            None,
        )
        .unwrap();

    engine.process(&Term::atom("remember tea")).unwrap();
    engine.clear_items();
    assert_eq!(engine.knowledge().item("$kept"), Some(&Term::atom("tea")));
    assert_eq!(engine.knowledge_mut().drain_output(), vec!["kept tea"]);
}

#[test]
fn unknown_commands_are_skipped() {
    let mut engine = thoughts::engine();
    let out = engine.process(&json(r##"{"#teleport": "mars"}"##)).unwrap();
    assert!(out.is_empty());
}

#[test]
fn bad_arguments_fail_the_call() {
    let mut engine = thoughts::engine();
    let err = engine
        .process(&json(r##"{"#format": "x", "#as": "sideways"}"##))
        .unwrap_err();
    assert!(err.to_string().contains("#format"));
}

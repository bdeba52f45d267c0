//! Rule files driven end to end through `thoughts::engine`.

use thoughts::engine::Assertion;
use thoughts::foundation::Term;

use crate::fixture;

fn json(s: &str) -> Term {
    Term::parse_json(s).unwrap()
}

fn contains_conclusion(nodes: &[Assertion], wanted: &Term) -> bool {
    nodes.iter().any(|node| {
        node.literal() == Some(wanted)
            || contains_conclusion(node.conclusions.as_deref().unwrap_or_default(), wanted)
    })
}

#[test]
fn what_time_is_it() {
    let mut engine = thoughts::engine();
    engine
        .load_rules_from_str(
            r#"[{"when": "what time is it", "then": "time to get a new watch"}]"#,
            None,
        )
        .unwrap();

    let out = engine.process(&Term::atom("what time is it")).unwrap();
    assert_eq!(out, vec![Term::atom("time to get a new watch")]);
}

#[test]
fn chained_rule_file_prints() {
    let mut engine = thoughts::engine();
    let name = engine.load_rules_from_file(fixture("time.json"), None).unwrap();
    assert_eq!(name, "time");

    let forest = engine.process_tree(&Term::atom("What time is it")).unwrap();
    assert!(contains_conclusion(&forest, &Term::atom("time to get a new watch")));
    assert_eq!(
        engine.knowledge_mut().drain_output(),
        vec!["try the shop on the corner"]
    );
}

#[test]
fn lookup_feeds_structured_rules() {
    let mut engine = thoughts::engine();
    engine.load_rules_from_file(fixture("pets.json"), None).unwrap();

    engine.process(&Term::atom("which pet is a cat")).unwrap();
    assert_eq!(
        engine.knowledge_mut().drain_output(),
        vec!["tom is a cat", "felix is a cat"]
    );

    engine.process(&Term::atom("which pet is a dragon")).unwrap();
    assert!(engine.knowledge_mut().drain_output().is_empty());
}

#[test]
fn switch_picks_a_case() {
    let mut engine = thoughts::engine();
    engine.load_rules_from_file(fixture("weather.json"), None).unwrap();

    let cases = [
        ("The weather is sunny", "wear a hat"),
        ("the weather is rainy", "take an umbrella"),
        ("the weather is foggy", "look outside"),
    ];
    for (input, expected) in cases {
        let out = engine.process(&Term::atom(input)).unwrap();
        assert_eq!(out, vec![Term::atom(expected)], "input {input}");
    }
}

#[test]
fn guarded_rules_wait_for_their_item() {
    let mut engine = thoughts::engine();
    engine.load_rules_from_file(fixture("weather.json"), None).unwrap();

    engine.process(&Term::atom("the weather is sunny")).unwrap();
    assert!(engine.knowledge_mut().drain_output().is_empty());

    engine
        .knowledge_mut()
        .set_item("$mood", Term::atom("grumpy"));
    engine.process(&Term::atom("the weather is sunny")).unwrap();
    assert_eq!(engine.knowledge_mut().drain_output(), vec!["fine, a hat"]);
}

#[test]
fn tokenized_text_completes_sequences() {
    let mut engine = thoughts::engine();
    engine.load_rules_from_file(fixture("phrases.json"), None).unwrap();

    engine
        .process(&json(r##"{"#tokenize": "the big dog"}"##))
        .unwrap();
    assert_eq!(engine.knowledge_mut().drain_output(), vec!["woof"]);

    engine
        .process(&json(r##"{"#tokenize": "the dog big"}"##))
        .unwrap();
    assert!(engine.knowledge_mut().drain_output().is_empty());
}

#[test]
fn arcs_carry_over_when_kept() {
    let mut engine =
        thoughts::engine_with_config(thoughts::EngineConfig::interactive().with_seed(3));
    engine
        .load_rules_from_str(
            r##"[{"when": ["knock knock", "?who"], "then": "?who who?", "#seq-type": "allow-junk"}]"##,
            None,
        )
        .unwrap();

    assert!(engine.process(&json(r#"["knock knock"]"#)).unwrap().is_empty());
    assert_eq!(engine.knowledge().arcs().len(), 1);
    engine.clear_arcs();
    assert!(engine.knowledge().arcs().is_empty());
}

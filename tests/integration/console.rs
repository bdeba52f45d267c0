//! The console driven by a scripted editor.

use thoughts::foundation::{Result, Term};
use thoughts::runtime::{LineEditor, ReadResult, Repl, Reply};

use crate::fixture;

/// Feeds canned lines, then reports end of input.
#[derive(Default)]
struct Script {
    lines: Vec<String>,
    history: Vec<String>,
}

impl Script {
    fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().rev().map(|l| (*l).to_string()).collect(),
            history: Vec::new(),
        }
    }
}

impl LineEditor for Script {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.lines.pop().map_or(ReadResult::Eof, ReadResult::Line))
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn set_keywords(&mut self, _keywords: Vec<String>) {}
}

#[test]
fn load_then_ask() {
    let mut repl = Repl::with_editor(Script::default()).without_banner();
    let path = fixture("pets.json");

    let reply = repl.eval(&format!("#load {}", path.display())).unwrap();
    assert_eq!(reply, Reply::Info(vec!["loaded ruleset pets".to_string()]));

    let Reply::Turn(turn) = repl.eval("which pet is a dog").unwrap() else {
        panic!("expected a turn");
    };
    assert_eq!(turn.output, vec!["rex is a dog"]);
}

#[test]
fn scripted_session_runs_to_exit() {
    let path = fixture("weather.json");
    let load = format!("#load {} sky", path.display());
    let script = Script::new(&[&load, "the weather is rainy", "#exit", "never read"]);

    let mut repl = Repl::with_editor(script).without_banner();
    repl.run().unwrap();

    assert!(repl.engine().knowledge().ruleset("sky").is_some());
    assert!(
        repl.engine()
            .knowledge()
            .trace()
            .iter()
            .any(|record| record.message.contains("take an umbrella"))
    );
}

#[test]
fn json_lists_assert_positioned_items() {
    let mut repl = Repl::with_editor(Script::default()).without_banner();
    repl.engine_mut()
        .load_rules_from_str(r#"[{"when": ["ready", "set"], "then": "go"}]"#, None)
        .unwrap();

    let Reply::Turn(turn) = repl.eval(r#"["ready", "set"]"#).unwrap() else {
        panic!("expected a turn");
    };
    assert!(turn.conclusions.contains(&Term::atom("go")));
}

#[test]
fn missing_rule_file_is_reported() {
    let mut repl = Repl::with_editor(Script::default()).without_banner();
    assert!(repl.eval("#load /nonexistent/rules.json").is_err());
    assert!(repl.eval("#load").is_err());
}

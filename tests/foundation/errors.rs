//! Integration tests for Error
//!
//! Tests error kinds, messages, and context frames.

use thoughts_foundation::{Error, ErrorContext, ErrorKind, SemanticLimit, TermKind};

#[test]
fn rule_load_names_the_source() {
    let err = Error::rule_load("rules/chat.json", "expected an array");
    assert!(matches!(err.kind, ErrorKind::RuleLoad { .. }));
    assert_eq!(
        err.to_string(),
        "failed to load rules from rules/chat.json: expected an array"
    );
}

#[test]
fn invalid_command_names_the_command() {
    let err = Error::invalid_command("#format", "unknown format \"wavy\"");
    assert_eq!(err.to_string(), "invalid #format command: unknown format \"wavy\"");
}

#[test]
fn type_mismatch_message() {
    let err = Error::type_mismatch(TermKind::List, TermKind::Atom);
    assert!(err.to_string().contains("expected"));
}

#[test]
fn limit_exceeded_message() {
    let err = Error::limit_exceeded(SemanticLimit::MaxSteps {
        limit: 10,
        context: Some("{\"#assert\":\"loop\"}".to_string()),
    });
    assert!(err.to_string().starts_with("limit exceeded: max steps (10) exceeded"));
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let err: Error = io.into();
    assert!(matches!(err.kind, ErrorKind::Io(_)));
}

#[test]
fn context_collects_frames() {
    let context = ErrorContext::new()
        .with_source("greetings")
        .with_rule(3)
        .with_frame("#lookup")
        .with_frame("#output");
    let err = Error::internal("broken").with_context(context);
    let context = err.context.unwrap();
    assert_eq!(context.stack, vec!["#lookup", "#output"]);
    let shown = context.to_string();
    assert!(shown.starts_with("at greetings rule #3"));
    assert!(shown.contains("in #output"));
}

//! List commands: `#first` and `#rest`.
//!
//! Both accept a list or text; text is split on single spaces.

use thoughts_engine::{Command, CommandInput, KnowledgeBase};
use thoughts_foundation::{Result, Term};

fn words(text: &str) -> impl Iterator<Item = Term> + '_ {
    text.split(' ').map(Term::from_text)
}

/// `#first`: the head of a list, or the first word of text.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstCommand;

impl Command for FirstCommand {
    fn name(&self) -> &str {
        "#first"
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        let value = match input.target() {
            Some(Term::List(items)) => items.head().cloned(),
            Some(other) => other.as_text().and_then(|text| words(text).next()),
            None => None,
        }
        .unwrap_or(Term::Nil);

        input.store(kb, &value);
        Ok(value)
    }

    fn inline(&self) -> bool {
        true
    }
}

/// `#rest`: everything after the head of a list, or the remaining words of
/// text as a list.
#[derive(Clone, Copy, Debug, Default)]
pub struct RestCommand;

impl Command for RestCommand {
    fn name(&self) -> &str {
        "#rest"
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        let value = match input.target() {
            Some(Term::List(items)) => Term::List(items.iter().skip(1).cloned().collect()),
            Some(other) => other
                .as_text()
                .map_or(Term::Nil, |text| Term::list(words(text).skip(1))),
            None => Term::Nil,
        };

        input.store(kb, &value);
        Ok(value)
    }

    fn inline(&self) -> bool {
        true
    }
}

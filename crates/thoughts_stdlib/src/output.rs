//! `#output`: writes to the knowledge base transcript.

use thoughts_engine::{Command, CommandInput, KnowledgeBase};
use thoughts_foundation::{Result, Term};
use tracing::debug;

/// `#output`: resolves references in the value and appends it to the
/// transcript. Lists print one numbered line per element.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputCommand;

impl Command for OutputCommand {
    fn name(&self) -> &str {
        "#output"
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        let target = input.target().cloned().unwrap_or(Term::Nil);
        let resolved = target.as_text().map(|text| kb.retrieve(text));
        let value = resolved.unwrap_or(target);

        for line in render(&value) {
            debug!(%line, "output");
            kb.emit(line);
        }
        Ok(Term::Nil)
    }
}

fn render(value: &Term) -> Vec<String> {
    match value {
        Term::Nil => Vec::new(),
        Term::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("[{}] {item}", i + 1))
            .collect(),
        other => vec![other.to_string()],
    }
}

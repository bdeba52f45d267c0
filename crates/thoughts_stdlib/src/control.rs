//! Control commands: `#switch` and `#random`.

use rand::seq::SliceRandom;
use thoughts_engine::{Command, CommandInput, KnowledgeBase};
use thoughts_foundation::{Result, Term};
use tracing::trace;

/// Value a `#switch` case matches when nothing else does.
pub const DEFAULT_CASE: &str = "#default";

/// Value a `#switch` target takes when it is still an unresolved reference.
pub const UNKNOWN_CASE: &str = "#unknown";

/// `#switch`: picks the `#do` of the first `#on` case whose `#val` equals
/// the target.
///
/// A target that is still a variable or item reference is treated as
/// `#unknown`. A case with `#val: "#default"` catches everything else.
#[derive(Clone, Copy, Debug, Default)]
pub struct SwitchCommand;

impl Command for SwitchCommand {
    fn name(&self) -> &str {
        "#switch"
    }

    fn execute(&self, input: &CommandInput<'_>, _kb: &mut KnowledgeBase) -> Result<Term> {
        let target = input.target().cloned().unwrap_or(Term::Nil);
        let value = match target.as_text() {
            Some(text) if text.starts_with('?') || text.starts_with('$') => {
                Term::atom(UNKNOWN_CASE)
            }
            _ => target,
        };

        let cases = input
            .require_arg("#on")?
            .as_list()
            .ok_or_else(|| input.error("#on must be a list of cases"))?;

        let mut fallback = None;
        for case in cases {
            let Some(val) = case.get("#val") else {
                continue;
            };
            if *val == value {
                trace!(case = %val, "switch matched");
                return Ok(case.get("#do").cloned().unwrap_or(Term::Nil));
            }
            if fallback.is_none() && val.as_text() == Some(DEFAULT_CASE) {
                fallback = case.get("#do").cloned();
            }
        }
        Ok(fallback.unwrap_or(Term::Nil))
    }
}

/// `#random`: picks one element of the target list.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomCommand;

impl Command for RandomCommand {
    fn name(&self) -> &str {
        "#random"
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        let Some(choices) = input.target().and_then(Term::as_list) else {
            return Ok(Term::Nil);
        };
        let choices: Vec<&Term> = choices.iter().collect();
        let Some(picked) = choices.choose(kb.rng_mut()).map(|t| (*t).clone()) else {
            return Ok(Term::Nil);
        };
        input.store(kb, &picked);
        Ok(picked)
    }
}

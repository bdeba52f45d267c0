//! `#lookup`: queries the item store and ruleset facts.

use thoughts_engine::unify::{SEQ_END, SEQ_START};
use thoughts_engine::{Command, CommandInput, KnowledgeBase, Span, unify};
use thoughts_foundation::{Result, Term};

/// Key added to map items naming the slot they were found in.
pub const ITEM_NAME_KEY: &str = "item";

/// `#lookup`: returns every stored item that unifies with the target, or
/// failing that every matching ruleset fact.
///
/// Map results carry the directive's positions so they can take part in
/// sequence rules. With a storage key the results are stored instead of
/// returned.
#[derive(Clone, Copy, Debug, Default)]
pub struct LookupCommand;

impl Command for LookupCommand {
    fn name(&self) -> &str {
        "#lookup"
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        let target = input.require_target()?;
        let span = input.span();

        let mut results: Vec<Term> = kb
            .items()
            .filter(|(_, item)| unify(item, target).is_some())
            .map(|(name, item)| match item {
                Term::Map(map) => {
                    Term::Map(map.update(ITEM_NAME_KEY.into(), Term::from_text(name)))
                }
                other => other.clone(),
            })
            .collect();

        if results.is_empty() {
            results = kb
                .facts()
                .filter(|fact| unify(fact, target).is_some())
                .cloned()
                .collect();
        }

        let results = Term::list(results.into_iter().map(|r| positioned(r, span)));
        if input.store(kb, &results) {
            return Ok(Term::Nil);
        }
        Ok(results)
    }
}

fn positioned(term: Term, span: Option<Span>) -> Term {
    match (term, span) {
        (Term::Map(map), Some(span)) => Term::Map(
            map.update(SEQ_START.into(), Term::from(span.start))
                .update(SEQ_END.into(), Term::from(span.end)),
        ),
        (term, _) => term,
    }
}

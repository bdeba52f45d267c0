//! Rule compiler - turns JSON rule definitions into [`Rule`]s.
//!
//! Both the plain (`when`, `then`, `if`) and hashed (`#when`, `#then`,
//! `#if`) spellings are accepted. A map with a guard and a list of nested
//! rules but no `when` is a guarded block. Any other item is kept as a fact.

use thoughts_foundation::{Error, ErrorContext, Result, Term, TermMap};
use tracing::warn;

use super::{Condition, Guard, Rule, SeqType, When};

/// A compiled entry before it is placed in the knowledge base arena.
#[derive(Clone, Debug, PartialEq)]
pub enum CompiledEntry {
    /// A matchable rule.
    Rule(Rule),
    /// A guarded block of nested entries.
    Block {
        /// Condition gating the nested entries.
        guard: Guard,
        /// Nested entries.
        rules: Vec<CompiledEntry>,
    },
    /// A plain fact.
    Fact(Term),
}

fn field<'a>(map: &'a TermMap, names: &[&str]) -> Option<&'a Term> {
    names.iter().find_map(|name| map.get(*name))
}

/// Compiles rule definitions.
pub struct RuleCompiler;

impl RuleCompiler {
    /// Compiles a rule file's contents, which must be a list of entries.
    ///
    /// # Errors
    /// Returns an error naming `source` and the failing entry if the input is
    /// not a list or any rule is malformed. Nothing is returned for a
    /// partially valid file.
    pub fn compile_all(rules: &Term, source: &str) -> Result<Vec<CompiledEntry>> {
        let Some(items) = rules.as_list() else {
            return Err(Error::rule_load(
                source,
                format!("expected a list of rules, found {}", rules.kind()),
            ));
        };

        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                Self::compile(item).map_err(|e| {
                    e.with_context(ErrorContext::new().with_source(source).with_rule(idx))
                })
            })
            .collect()
    }

    /// Compiles a single entry.
    ///
    /// # Errors
    /// Returns an error if the entry has a `when` without a `then`, an empty
    /// sequence, or an unusable nested block.
    pub fn compile(item: &Term) -> Result<CompiledEntry> {
        let Some(map) = item.as_map() else {
            return Ok(CompiledEntry::Fact(item.clone()));
        };

        let when = field(map, &["#when", "when"]);
        let then = field(map, &["#then", "then"]);
        let guard = field(map, &["#if", "if"]).map(|cond| Self::compile_guard(cond, map));

        let Some(when) = when else {
            return match (guard, then) {
                (Some(guard), Some(Term::List(nested))) => Ok(CompiledEntry::Block {
                    guard,
                    rules: nested.iter().map(Self::compile).collect::<Result<_>>()?,
                }),
                _ => Ok(CompiledEntry::Fact(item.clone())),
            };
        };

        let Some(then) = then else {
            return Err(Error::invalid_rule("rule has a when but no then"));
        };

        let when = match when {
            Term::List(constituents) if constituents.is_empty() => {
                return Err(Error::invalid_rule("sequence rule has no constituents"));
            }
            Term::List(constituents) => When::Sequence(constituents.iter().cloned().collect()),
            single => When::Single(single.clone()),
        };

        let seq_type = match field(map, &["#seq-type", "seq-type", "seqType"]) {
            None => SeqType::Default,
            Some(ty) => ty.as_text().and_then(SeqType::parse).unwrap_or_else(|| {
                warn!(seq_type = %ty, "unknown sequence type, using default");
                SeqType::Default
            }),
        };

        let allow_multi = field(map, &["#seq-allow-multi", "seq-allow-multi", "seqAllowMulti"])
            .and_then(Term::as_bool)
            .unwrap_or(false);

        Ok(CompiledEntry::Rule(Rule {
            when,
            then: then.clone(),
            guard,
            seq_type,
            allow_multi,
        }))
    }

    /// Compiles an `if` clause. Shapes that cannot be understood produce a
    /// guard that never passes.
    fn compile_guard(cond: &Term, holder: &TermMap) -> Guard {
        let guard = match cond {
            Term::List(items) => items
                .iter()
                .map(Self::compile_condition)
                .collect::<Option<Vec<_>>>()
                .map(Guard::All),
            Term::Map(_) => Self::compile_condition(cond).map(|c| Guard::All(vec![c])),
            text if text.as_text().is_some() => holder.get("equals").map(|equals| {
                Guard::All(vec![Condition {
                    value: text.clone(),
                    equals: equals.clone(),
                }])
            }),
            _ => None,
        };

        guard.unwrap_or_else(|| {
            warn!(guard = %cond, "malformed guard, rule will never fire");
            Guard::Malformed(cond.to_string())
        })
    }

    fn compile_condition(cond: &Term) -> Option<Condition> {
        Some(Condition {
            value: cond.get("value")?.clone(),
            equals: cond.get("equals")?.clone(),
        })
    }
}

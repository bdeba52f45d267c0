//! Rule matching: single-pattern rules and sequence arcs.
//!
//! A sequence rule is matched one constituent at a time. Each partial match
//! is an [`ActiveArc`]: a small cursor recording which rule it belongs to,
//! which constituents have been filled, the positions consumed so far and
//! the bindings collected. Extending an arc never mutates it; a new arc is
//! pushed instead, so the shorter match stays available to other
//! assertions.

use std::fmt;

use thoughts_foundation::{Error, Result, Term};

use crate::assertion::{Assertion, Span};
use crate::bindings::{Bindings, WHEN_KEY};
use crate::knowledge::KnowledgeBase;
use crate::rule::{Entry, EntryId, Guard, Rule, SeqType, When};
use crate::substitute::apply_values;
use crate::trace::TraceKind;
use crate::unify::unify;

// =============================================================================
// Active Arcs
// =============================================================================

/// A sequence rule in progress.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveArc {
    /// Identity within the knowledge base, assigned when the arc is stored.
    pub id: u64,
    /// The sequence rule being matched.
    pub rule: EntryId,
    /// Next constituent to match (unused by `set` rules).
    pub seq_idx: usize,
    /// Assertions filling each constituent slot.
    pub matched: Vec<Option<Assertion>>,
    /// Start of the first matched assertion.
    pub start: Option<usize>,
    /// End of the most recently matched assertion.
    pub end: Option<usize>,
    /// Bindings collected so far.
    pub bindings: Bindings,
}

impl ActiveArc {
    /// A fresh cursor at the beginning of a rule with `len` constituents.
    #[must_use]
    pub fn new(rule: EntryId, len: usize) -> Self {
        Self {
            id: 0,
            rule,
            seq_idx: 0,
            matched: vec![None; len],
            start: None,
            end: None,
            bindings: Bindings::new(),
        }
    }

    /// Number of filled constituents.
    #[must_use]
    pub fn filled(&self) -> usize {
        self.matched.iter().flatten().count()
    }

    /// Returns true once every constituent has been matched.
    #[must_use]
    pub fn is_complete(&self, seq_type: SeqType) -> bool {
        match seq_type {
            SeqType::Set => self.matched.iter().all(Option::is_some),
            _ => self.seq_idx == self.matched.len(),
        }
    }

    /// The window consumed so far, when both ends are known.
    #[must_use]
    pub fn span(&self) -> Option<Span> {
        self.start.zip(self.end).map(|(s, e)| Span::new(s, e))
    }

    fn constituent_spans(&self) -> Vec<Span> {
        self.matched.iter().flatten().flat_map(Assertion::spans).collect()
    }
}

impl fmt::Display for ActiveArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {} [{}/{}]", self.rule, self.filled(), self.matched.len())?;
        if let Some(span) = self.span() {
            write!(f, " @{span}")?;
        }
        if !self.bindings.is_empty() {
            let vars: Vec<String> = self
                .bindings
                .iter()
                .filter(|(var, _)| *var != WHEN_KEY)
                .map(|(var, value)| format!("{var}={value}"))
                .collect();
            write!(f, " {}", vars.join(" "))?;
        }
        Ok(())
    }
}

// =============================================================================
// Matching
// =============================================================================

/// Tries to extend every active arc with `assertion`.
///
/// Arcs created during this pass are not revisited. When the assertion
/// carries no position, an arc that accepted it is retired so the same
/// unpositioned input cannot be counted twice.
///
/// # Errors
/// Returns an internal error if an arc refers to a missing rule or its
/// cursor is out of range.
pub fn attempt_arcs(kb: &mut KnowledgeBase, assertion: &Assertion) -> Result<Vec<Assertion>> {
    let snapshot: Vec<ActiveArc> = kb.arcs().to_vec();
    let mut results = Vec::new();
    for arc in &snapshot {
        if let Some(found) = attempt_rule(kb, arc, assertion)? {
            if assertion.span.is_none() {
                kb.remove_arc(arc.id);
            }
            results.extend(found);
        }
    }
    Ok(results)
}

/// Tries `assertion` against the candidate entries of every ruleset.
///
/// # Errors
/// Returns an internal error on a corrupted arena.
pub fn attempt_rulesets(kb: &mut KnowledgeBase, assertion: &Assertion) -> Result<Vec<Assertion>> {
    let ids = kb.candidates(&assertion.match_term());
    attempt_entries(kb, assertion, &ids)
}

/// Tries `assertion` against the given entries in order. Guarded blocks
/// recurse into their nested entries while the guard holds.
///
/// # Errors
/// Returns an internal error on a corrupted arena.
pub fn attempt_entries(
    kb: &mut KnowledgeBase,
    assertion: &Assertion,
    ids: &[EntryId],
) -> Result<Vec<Assertion>> {
    let mut results = Vec::new();
    for &id in ids {
        let Some(entry) = kb.entry(id).cloned() else {
            return Err(Error::internal(format!("missing entry {id}")));
        };
        match entry {
            Entry::Rule(rule) => {
                let found = match &rule.when {
                    When::Sequence(when) => {
                        attempt_rule(kb, &ActiveArc::new(id, when.len()), assertion)?
                    }
                    When::Single(when) => attempt_single(kb, &rule, when, assertion),
                };
                results.extend(found.into_iter().flatten());
            }
            Entry::Block { guard, rules } => {
                if evaluate_guard(kb, &guard, &Bindings::new()) {
                    results.extend(attempt_entries(kb, assertion, &rules)?);
                }
            }
            Entry::Fact(_) => {}
        }
    }
    Ok(results)
}

/// Tries to extend `arc` with `assertion`.
///
/// Returns `None` when the assertion is rejected. Otherwise returns the
/// conclusions fired by a completed sequence, or an empty list when a
/// longer arc was stored for later.
///
/// # Errors
/// Returns an internal error if the arc's rule is missing, is not a
/// sequence rule, or the cursor is out of range.
pub fn attempt_rule(
    kb: &mut KnowledgeBase,
    arc: &ActiveArc,
    assertion: &Assertion,
) -> Result<Option<Vec<Assertion>>> {
    let rule = kb.rule(arc.rule)?.clone();
    let When::Sequence(when) = &rule.when else {
        return Err(Error::internal(format!(
            "arc for rule {} without a sequence",
            arc.rule
        )));
    };
    let set = rule.seq_type == SeqType::Set;
    if arc.matched.len() != when.len() || (!set && arc.seq_idx >= when.len()) {
        return Err(Error::internal(format!(
            "arc cursor {} out of range for rule {} with {} constituents",
            arc.seq_idx,
            arc.rule,
            when.len()
        )));
    }

    let start = assertion.span.map(|s| s.start);
    if let Some(end) = arc.end {
        if !rule.seq_type.accepts(start, end) {
            return Ok(None);
        }
    }

    let term = assertion.match_term();
    let found = if set {
        if !rule.allow_multi && shares_span(arc, assertion) {
            return Ok(None);
        }
        when.iter()
            .enumerate()
            .filter(|(slot, _)| arc.matched[*slot].is_none())
            .find_map(|(slot, pattern)| {
                unify(&term, &apply_values(pattern, &arc.bindings)).map(|b| (slot, b))
            })
    } else {
        let consumed = arc.matched[..arc.seq_idx]
            .iter()
            .flatten()
            .any(|earlier| earlier.span == assertion.span);
        if consumed {
            return Ok(None);
        }
        let pattern = apply_values(&when[arc.seq_idx], &arc.bindings);
        unify(&term, &pattern).map(|b| (arc.seq_idx, b))
    };
    let Some((slot, mut unification)) = found else {
        return Ok(None);
    };

    unification.set(WHEN_KEY, assertion.to_term());
    let mut next = arc.clone();
    next.matched[slot] = Some(assertion.clone());
    if !set {
        next.seq_idx += 1;
    }
    if next.start.is_none() {
        next.start = start;
    }
    next.end = assertion.span.map(|s| s.end);
    next.bindings.merge(unification);

    if !next.is_complete(rule.seq_type) {
        kb.push_arc(next);
        return Ok(Some(Vec::new()));
    }

    kb.record(TraceKind::ArcComplete, next.to_string());
    let constituents: Vec<Assertion> = next.matched.iter().flatten().cloned().collect();
    let mut conclusions = fire(kb, &rule, &next.bindings, next.span());
    for conclusion in &mut conclusions {
        conclusion.seq.clone_from(&constituents);
    }
    Ok(Some(conclusions))
}

fn attempt_single(
    kb: &mut KnowledgeBase,
    rule: &Rule,
    when: &Term,
    assertion: &Assertion,
) -> Option<Vec<Assertion>> {
    let pattern = kb.apply_values(when);
    let term = assertion.match_term();
    let mut bindings = unify(&term, &pattern)?;

    if let Some(guard) = &rule.guard {
        if !evaluate_guard(kb, guard, &bindings) {
            return None;
        }
    }

    kb.record(TraceKind::Matched, format!("{assertion} against {when}"));
    bindings.set(WHEN_KEY, term);
    Some(fire(kb, rule, &bindings, None))
}

/// Returns true if some span of `assertion` was already consumed by `arc`.
fn shares_span(arc: &ActiveArc, assertion: &Assertion) -> bool {
    let consumed = arc.constituent_spans();
    assertion.spans().iter().any(|span| consumed.contains(span))
}

/// Evaluates a guard. Each side of a condition has the rule's bindings and
/// then the item store substituted in before comparison. Malformed guards
/// never pass.
#[must_use]
pub fn evaluate_guard(kb: &KnowledgeBase, guard: &Guard, bindings: &Bindings) -> bool {
    match guard {
        Guard::Malformed(_) => false,
        Guard::All(conditions) => conditions.iter().all(|condition| {
            let resolve = |term: &Term| kb.apply_values(&apply_values(term, bindings));
            resolve(&condition.value) == resolve(&condition.equals)
        }),
    }
}

/// Substitutes bindings into a rule's `then` and builds one conclusion per
/// item, stamped with the span the rule consumed.
fn fire(
    kb: &mut KnowledgeBase,
    rule: &Rule,
    bindings: &Bindings,
    span: Option<Span>,
) -> Vec<Assertion> {
    let items: Vec<Term> = match apply_values(&rule.then, bindings) {
        Term::List(items) => items.into_iter().collect(),
        single => vec![single],
    };

    items
        .into_iter()
        .map(|item| {
            let mut conclusion = Assertion::new(item);
            if span.is_some() {
                conclusion.span = span;
            }
            kb.record(TraceKind::Add, conclusion.to_string());
            conclusion
        })
        .collect()
}

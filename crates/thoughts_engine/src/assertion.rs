//! Assertion nodes in the conclusion forest.
//!
//! Position metadata and provenance are kept in fields rather than in the
//! term itself. They are written back as `#seq-start`, `#seq-end`, `#seq`
//! and `#conclusions` keys only when a node is materialized.

use std::fmt;

use thoughts_foundation::{Error, Result, Term, TermMap};

use crate::unify::{SEQ_END, SEQ_START};

/// Key wrapping a literal assertion.
pub const ASSERT_KEY: &str = "#assert";
/// Key listing the constituents a sequence rule consumed.
pub const SEQ_KEY: &str = "#seq";
/// Key listing the conclusions drawn from a node.
pub const CONCLUSIONS_KEY: &str = "#conclusions";

/// Token window an assertion covers, end exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Span {
    /// First position.
    pub start: usize,
    /// One past the last position.
    pub end: usize,
}

impl Span {
    /// Creates a span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span of the single position `pos`.
    #[must_use]
    pub const fn at(pos: usize) -> Self {
        Self::new(pos, pos + 1)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A node in the conclusion forest.
#[derive(Clone, Debug, PartialEq)]
pub struct Assertion {
    /// The directive map, for example `{"#assert": "hello"}`.
    pub term: Term,
    /// Positions covered, if known.
    pub span: Option<Span>,
    /// Constituents consumed by the sequence rule that produced this node.
    pub seq: Vec<Assertion>,
    /// Conclusions drawn from this node; `None` until it is processed.
    pub conclusions: Option<Vec<Assertion>>,
}

fn position(term: Option<Term>) -> Option<usize> {
    term.and_then(|t| t.as_int()).and_then(|n| usize::try_from(n).ok())
}

fn lift_list(term: Option<Term>) -> Option<Vec<Assertion>> {
    match term {
        Some(Term::List(items)) => Some(items.into_iter().map(Assertion::new).collect()),
        _ => None,
    }
}

impl Assertion {
    /// Builds a node from a term.
    ///
    /// Non-map terms are wrapped as `{"#assert": term}`. Bookkeeping keys on
    /// a map are lifted into fields.
    #[must_use]
    pub fn new(term: Term) -> Self {
        let Term::Map(mut map) = term else {
            return Self::wrap(term);
        };

        let start = position(map.remove(SEQ_START));
        let end = position(map.remove(SEQ_END));
        let seq = lift_list(map.remove(SEQ_KEY)).unwrap_or_default();
        let conclusions = lift_list(map.remove(CONCLUSIONS_KEY));

        Self {
            term: Term::Map(map),
            span: start.zip(end).map(|(s, e)| Span::new(s, e)),
            seq,
            conclusions,
        }
    }

    /// Wraps a term as `{"#assert": term}`.
    #[must_use]
    pub fn wrap(term: Term) -> Self {
        Self {
            term: Term::map([(ASSERT_KEY, term)]),
            span: None,
            seq: Vec::new(),
            conclusions: None,
        }
    }

    /// Builds a node from caller input.
    ///
    /// Text beginning with `{` is parsed as a JSON directive.
    ///
    /// # Errors
    /// Returns an error if `{`-prefixed text is not valid JSON.
    pub fn from_input(term: &Term) -> Result<Self> {
        match term.as_text() {
            Some(text) if text.trim_start().starts_with('{') => {
                let parsed: serde_json::Value = serde_json::from_str(text)
                    .map_err(|e| Error::json(format!("{e} in assertion {text:?}")))?;
                Ok(Self::new(Term::from(parsed)))
            }
            _ => Ok(Self::new(term.clone())),
        }
    }

    /// Sets the span.
    #[must_use]
    pub fn with_span(mut self, span: Option<Span>) -> Self {
        self.span = span;
        self
    }

    /// Returns the directive map.
    #[must_use]
    pub fn directive(&self) -> TermMap {
        self.term.as_map().cloned().unwrap_or_default()
    }

    /// The wrapped literal, if this node is `{"#assert": <scalar>}`.
    #[must_use]
    pub fn literal(&self) -> Option<&Term> {
        self.term.get(ASSERT_KEY).filter(|t| !t.is_compound())
    }

    /// The term rules are matched against.
    ///
    /// This is the `#assert` payload when present, otherwise the whole map.
    /// Map payloads carry the node's positions as `#seq-start`/`#seq-end`
    /// so patterns can match them through the `##seq-start` escape.
    #[must_use]
    pub fn match_term(&self) -> Term {
        let base = self.term.get(ASSERT_KEY).unwrap_or(&self.term);
        match (base, self.span) {
            (Term::Map(map), Some(span)) => Term::Map(with_span_keys(map.clone(), span)),
            _ => base.clone(),
        }
    }

    /// Every span covered by this node and, recursively, its constituents.
    #[must_use]
    pub fn spans(&self) -> Vec<Span> {
        let mut spans: Vec<Span> = self.seq.iter().flat_map(Assertion::spans).collect();
        spans.extend(self.span);
        spans
    }

    /// Returns true once conclusions have been drawn.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.conclusions.is_some()
    }

    /// Writes the node back into a single term, bookkeeping included.
    #[must_use]
    pub fn to_term(&self) -> Term {
        let Term::Map(map) = &self.term else {
            return self.term.clone();
        };
        let mut map = match self.span {
            Some(span) => with_span_keys(map.clone(), span),
            None => map.clone(),
        };
        if !self.seq.is_empty() {
            map.insert(
                SEQ_KEY.into(),
                Term::list(self.seq.iter().map(Assertion::to_term)),
            );
        }
        if let Some(conclusions) = &self.conclusions {
            map.insert(
                CONCLUSIONS_KEY.into(),
                Term::list(conclusions.iter().map(Assertion::to_term)),
            );
        }
        Term::Map(map)
    }
}

fn with_span_keys(mut map: TermMap, span: Span) -> TermMap {
    map.insert(SEQ_START.into(), Term::from(span.start));
    map.insert(SEQ_END.into(), Term::from(span.end));
    map
}

impl fmt::Display for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literal() {
            Some(literal) => write!(f, "{literal}")?,
            None => write!(f, "{}", self.term)?,
        }
        if let Some(span) = self.span {
            write!(f, " @{span}")?;
        }
        Ok(())
    }
}

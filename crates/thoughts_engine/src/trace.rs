//! Ring buffer of processing events.
//!
//! Every record is also emitted as a `tracing` debug event. The buffer keeps
//! the most recent records for the REPL `#log` command.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

// =============================================================================
// Trace Events
// =============================================================================

/// What happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TraceKind {
    /// An assertion was taken off the agenda.
    Assert,
    /// A single-pattern rule fired.
    Matched,
    /// A sequence rule matched a constituent and is waiting for more.
    ArcExtend,
    /// A sequence rule matched its last constituent.
    ArcComplete,
    /// A conclusion was added to the agenda.
    Add,
    /// A value was written to the item store.
    Store,
    /// A command was dispatched.
    Command,
    /// Rules were loaded.
    Load,
    /// An arc was dropped to respect the arc limit.
    ArcEvict,
}

impl TraceKind {
    /// Short upper-case label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assert => "ASSERT",
            Self::Matched => "MATCHED",
            Self::ArcExtend => "ARC-EXTEND",
            Self::ArcComplete => "ARC-COMPLETE",
            Self::Add => "ADD",
            Self::Store => "STORE",
            Self::Command => "COMMAND",
            Self::Load => "LOAD",
            Self::ArcEvict => "ARC-EVICT",
        }
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single recorded event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Monotonic record id.
    pub id: u64,
    /// Event kind.
    pub kind: TraceKind,
    /// Human-readable detail.
    pub message: String,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<13}{}", format!("{}:", self.kind), self.message)
    }
}

// =============================================================================
// Trace Buffer
// =============================================================================

/// A bounded buffer of trace records, oldest first.
#[derive(Clone, Debug)]
pub struct TraceBuffer {
    records: VecDeque<TraceRecord>,
    max_size: usize,
    next_id: u64,
    enabled: bool,
}

impl TraceBuffer {
    /// Creates an enabled buffer holding at most `max_size` records.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size.min(1024)),
            max_size,
            next_id: 0,
            enabled: true,
        }
    }

    /// Creates a buffer that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(0)
        }
    }

    /// Returns true if records are being kept.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Records an event. Returns the record id, or `None` when disabled.
    pub fn push(&mut self, kind: TraceKind, message: impl Into<String>) -> Option<u64> {
        let message = message.into();
        debug!(event = kind.label(), "{message}");
        if !self.enabled {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.records.push_back(TraceRecord { id, kind, message });
        while self.records.len() > self.max_size {
            self.records.pop_front();
        }
        Some(id)
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops all records. Ids keep increasing.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Iterates records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// Returns the most recent `count` records.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<&TraceRecord> {
        let start = self.records.len().saturating_sub(count);
        self.records.iter().skip(start).collect()
    }

    /// Returns records of one kind.
    #[must_use]
    pub fn by_kind(&self, kind: TraceKind) -> Vec<&TraceRecord> {
        self.records.iter().filter(|r| r.kind == kind).collect()
    }
}

impl Default for TraceBuffer {
    fn default() -> Self {
        Self::new(10_000)
    }
}

//! Engine configuration.

/// Configuration for an [`Engine`](crate::Engine).
///
/// Controls the agenda bounds, arc retention, and trace output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum command dispatches for one call to `process`.
    pub max_steps: usize,

    /// Maximum nesting of derived conclusions below an input.
    pub max_depth: usize,

    /// Maximum number of active arcs; the oldest are evicted beyond this.
    pub max_arcs: usize,

    /// Keep arcs from earlier calls instead of clearing them.
    pub keep_arcs: bool,

    /// Keep positional bookkeeping on extracted conclusions.
    pub include_seq: bool,

    /// Record events in the in-memory trace buffer.
    pub trace_enabled: bool,

    /// Trace buffer capacity.
    pub trace_buffer_size: usize,

    /// Seed for `#random`; `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 10_000,
            max_depth: 512,
            max_arcs: 1_000,
            keep_arcs: false,
            include_seq: false,
            trace_enabled: true,
            trace_buffer_size: 10_000,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for an interactive session: arcs persist between turns
    /// so sequences can span several inputs.
    #[must_use]
    pub fn interactive() -> Self {
        Self {
            keep_arcs: true,
            ..Self::default()
        }
    }

    /// Configuration with a fixed random seed.
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Builder method to set the step budget.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Builder method to set the conclusion depth limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Builder method to set the arc limit.
    #[must_use]
    pub fn with_max_arcs(mut self, max_arcs: usize) -> Self {
        self.max_arcs = max_arcs;
        self
    }

    /// Builder method to keep arcs between calls.
    #[must_use]
    pub fn with_keep_arcs(mut self, keep_arcs: bool) -> Self {
        self.keep_arcs = keep_arcs;
        self
    }

    /// Builder method to keep positional bookkeeping on conclusions.
    #[must_use]
    pub fn with_include_seq(mut self, include_seq: bool) -> Self {
        self.include_seq = include_seq;
        self
    }

    /// Builder method to enable or disable the trace buffer.
    #[must_use]
    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace_enabled = enabled;
        self
    }

    /// Builder method to set the trace buffer capacity.
    #[must_use]
    pub fn with_trace_buffer_size(mut self, size: usize) -> Self {
        self.trace_buffer_size = size;
        self
    }

    /// Builder method to set the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

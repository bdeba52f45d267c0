//! Error types for the rule engine.
//!
//! Uses `thiserror` for the error enum, with optional context describing
//! which rule file or command produced the failure.

use std::fmt;

use thiserror::Error;

use crate::kind::TermKind;

/// The main error type for engine operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// Where it happened, when known.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Wraps `kind` with no context.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Attaches `context`, replacing any earlier one.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a rule loading error for the given source.
    #[must_use]
    pub fn rule_load(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RuleLoad {
            source_name: source.into(),
            message: message.into(),
        })
    }

    /// Creates a JSON parsing error.
    #[must_use]
    pub fn json(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Json(message.into()))
    }

    /// Creates an invalid rule error.
    #[must_use]
    pub fn invalid_rule(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRule(message.into()))
    }

    /// Creates an invalid command error.
    #[must_use]
    pub fn invalid_command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCommand {
            command: command.into(),
            message: message.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: TermKind, actual: TermKind) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an unknown ruleset error.
    #[must_use]
    pub fn unknown_ruleset(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownRuleset(name.into()))
    }

    /// Creates an error for a tripped processing bound.
    #[must_use]
    pub fn limit_exceeded(limit: SemanticLimit) -> Self {
        Self::new(ErrorKind::LimitExceeded(limit))
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal(message.into()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::json(err.to_string())
    }
}

/// What went wrong, for callers that branch on the failure.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A rule file or rule text could not be loaded.
    #[error("failed to load rules from {source_name}: {message}")]
    RuleLoad {
        /// File path or ruleset name.
        source_name: String,
        /// What went wrong.
        message: String,
    },

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON.
    #[error("invalid json: {0}")]
    Json(String),

    /// A rule definition is missing required parts.
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// A command received input it cannot act on.
    #[error("invalid {command} command: {message}")]
    InvalidCommand {
        /// Command name, including the leading `#`.
        command: String,
        /// What went wrong.
        message: String,
    },

    /// A term had the wrong shape.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected kind.
        expected: TermKind,
        /// The actual kind encountered.
        actual: TermKind,
    },

    /// Named ruleset does not exist.
    #[error("unknown ruleset: {0}")]
    UnknownRuleset(String),

    /// Processing ran past a configured bound.
    #[error("limit exceeded: {0}")]
    LimitExceeded(SemanticLimit),

    /// A failure outside rule processing, such as terminal setup.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Bounds that stop runaway processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticLimit {
    /// Too many command dispatches while processing one input.
    MaxSteps {
        /// The configured limit.
        limit: usize,
        /// The command being dispatched when the limit tripped.
        context: Option<String>,
    },
    /// A chain of derived conclusions grew too deep.
    MaxDepth {
        /// The configured limit.
        limit: usize,
        /// The assertion that would have gone past it.
        context: Option<String>,
    },
}

impl fmt::Display for SemanticLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxSteps { limit, context } => {
                write!(f, "max steps ({limit}) exceeded")?;
                if let Some(ctx) = context {
                    write!(f, ": {ctx}")?;
                }
                Ok(())
            }
            Self::MaxDepth { limit, context } => {
                write!(f, "conclusion depth ({limit}) exceeded")?;
                if let Some(ctx) = context {
                    write!(f, " at {ctx}")?;
                }
                Ok(())
            }
        }
    }
}

/// Where a failure happened in the rule files and command chain.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Rule file or ruleset name.
    pub source: Option<String>,
    /// Rule index within the source.
    pub rule: Option<usize>,
    /// Chain of commands being processed, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a context with nothing filled in.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the rule index.
    #[must_use]
    pub fn with_rule(mut self, index: usize) -> Self {
        self.rule = Some(index);
        self
    }

    /// Pushes the name of the command being processed.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let Some(rule) = self.rule {
                write!(f, " rule #{rule}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}

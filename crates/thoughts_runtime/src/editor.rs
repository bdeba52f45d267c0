//! Line editing for the console.
//!
//! The console reads through the [`LineEditor`] trait. The binary uses
//! [`RustylineEditor`]; tests feed scripted lines.

use std::borrow::Cow;

use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::HistoryHinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Completer, Config, Context, Editor, Helper, Hinter, Validator as RLValidator};
use thoughts_foundation::{Error, Result};

use crate::highlight::ThoughtsHighlighter;

/// Meta-commands understood by the console, offered for completion.
pub const META_COMMANDS: [&str; 6] = ["#log", "#items", "#clear-arcs", "#load", "#help", "#exit"];

const HISTORY_LIMIT: usize = 500;

/// Outcome of one read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadResult {
    /// A line was read.
    Line(String),
    /// Ctrl+C.
    Interrupted,
    /// Ctrl+D or end of input.
    Eof,
}

/// Source of console input.
pub trait LineEditor {
    /// Reads a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Records a completed entry in history.
    fn add_history(&mut self, line: &str);

    /// Replaces the words offered for completion.
    fn set_keywords(&mut self, keywords: Vec<String>);
}

// =============================================================================
// JSON Nesting
// =============================================================================

/// How far a piece of input is from being a complete JSON value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Nesting {
    /// Every bracket is closed (or there were none).
    Closed,
    /// This many `{`/`[` are still open.
    Open(usize),
    /// A string literal is still open.
    InString,
}

impl Nesting {
    /// Scans `input`, ignoring brackets inside string literals.
    #[must_use]
    pub fn of(input: &str) -> Self {
        let mut depth = 0usize;
        let mut chars = input.chars();
        let mut in_string = false;

        while let Some(c) = chars.next() {
            match (in_string, c) {
                (true, '\\') => {
                    chars.next();
                }
                (_, '"') => in_string = !in_string,
                (false, '{' | '[') => depth += 1,
                (false, '}' | ']') => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        match (in_string, depth) {
            (true, _) => Self::InString,
            (false, 0) => Self::Closed,
            (false, n) => Self::Open(n),
        }
    }
}

/// Returns true when `input` needs no continuation lines.
#[must_use]
pub fn is_balanced(input: &str) -> bool {
    Nesting::of(input) == Nesting::Closed
}

// =============================================================================
// Completion
// =============================================================================

/// Start of the word under the cursor and the keywords extending it.
///
/// Words are delimited by whitespace and JSON punctuation so that
/// `{"#out` completes to `#output`.
#[must_use]
pub fn complete_keyword(keywords: &[String], line: &str, pos: usize) -> (usize, Vec<String>) {
    let head = &line[..pos];
    let start = head
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace() || matches!(c, '{' | '[' | '"' | ',' | ':'))
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = &head[start..];
    if !word.starts_with('#') {
        return (start, Vec::new());
    }

    let mut found: Vec<String> = keywords
        .iter()
        .filter(|kw| kw.starts_with(word))
        .cloned()
        .collect();
    found.sort();
    found.dedup();
    (start, found)
}

struct ConsoleCompleter {
    paths: FilenameCompleter,
    keywords: Vec<String>,
}

impl Completer for ConsoleCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.trim_start().starts_with("#load ") {
            return self.paths.complete(line, pos, ctx);
        }
        let (start, words) = complete_keyword(&self.keywords, line, pos);
        let pairs = words
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, pairs))
    }
}

struct JsonValidator;

impl Validator for JsonValidator {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        Ok(match Nesting::of(ctx.input()) {
            Nesting::Closed => ValidationResult::Valid(None),
            Nesting::Open(_) | Nesting::InString => ValidationResult::Incomplete,
        })
    }
}

#[derive(Helper, Completer, Hinter, RLValidator)]
struct ConsoleHelper {
    #[rustyline(Completer)]
    completer: ConsoleCompleter,
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Validator)]
    validator: JsonValidator,
    colours: ThoughtsHighlighter,
}

impl Highlighter for ConsoleHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        self.colours.highlight(line, pos)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Owned(format!("\x1b[1;36m{prompt}\x1b[0m"))
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[90m{hint}\x1b[0m"))
    }

    fn highlight_char(&self, line: &str, _pos: usize, _kind: CmdKind) -> bool {
        line.contains(['#', '?', '*', '$', '{', '['])
    }
}

// =============================================================================
// Rustyline
// =============================================================================

/// Terminal editor with history, hints, completion, and multi-line JSON.
pub struct RustylineEditor {
    inner: Editor<ConsoleHelper, DefaultHistory>,
}

impl RustylineEditor {
    /// Opens the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialised.
    pub fn new() -> Result<Self> {
        let config = Config::builder()
            .max_history_size(HISTORY_LIMIT)
            .map_err(|e| Error::internal(format!("editor config: {e}")))?
            .auto_add_history(false)
            .build();

        let mut inner = Editor::with_config(config)
            .map_err(|e| Error::internal(format!("terminal: {e}")))?;
        inner.set_helper(Some(ConsoleHelper {
            completer: ConsoleCompleter {
                paths: FilenameCompleter::new(),
                keywords: META_COMMANDS.iter().map(ToString::to_string).collect(),
            },
            hinter: HistoryHinter::new(),
            validator: JsonValidator,
            colours: ThoughtsHighlighter::new(),
        }));

        Ok(Self { inner })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.inner.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::internal(format!("terminal: {e}"))),
        }
    }

    fn add_history(&mut self, line: &str) {
        if self.inner.add_history_entry(line).is_err() {
            tracing::debug!("history entry dropped");
        }
    }

    fn set_keywords(&mut self, keywords: Vec<String>) {
        if let Some(helper) = self.inner.helper_mut() {
            helper.completer.keywords = keywords;
        }
    }
}

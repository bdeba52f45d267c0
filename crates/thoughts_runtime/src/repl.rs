//! The interactive console.

use std::io::{self, Write};

use thoughts_engine::{Engine, EngineConfig};
use thoughts_foundation::{Error, Result, Term};
use tracing::{debug, info};

use crate::editor::{LineEditor, META_COMMANDS, ReadResult, RustylineEditor, is_balanced};

const HELP: &str = "\
Type text or a JSON directive to assert it.

  #log                 Show the engine trace
  #items               Show stored items
  #clear-arcs          Drop partially matched sequences
  #load PATH [NAME]    Load a rule file
  #help                Show this help
  #exit                Leave the console (or Ctrl+D)";

/// What one line of input produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Turn {
    /// Lines written by `#output` while processing.
    pub output: Vec<String>,
    /// Leaf conclusions.
    pub conclusions: Vec<Term>,
}

/// Response to one line of input.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// The input was asserted.
    Turn(Turn),
    /// A meta-command produced informational lines.
    Info(Vec<String>),
    /// The user asked to leave.
    Exit,
}

/// The interactive console.
pub struct Repl<E: LineEditor = RustylineEditor> {
    editor: E,
    engine: Engine,
    show_banner: bool,
    prompt: String,
    continuation_prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a console on the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialise.
    pub fn new() -> Result<Self> {
        Ok(Self::with_editor(RustylineEditor::new()?))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a console reading from `editor`, with the built-in commands
    /// and arcs kept between turns.
    pub fn with_editor(editor: E) -> Self {
        let mut engine = Engine::with_config(EngineConfig::interactive());
        thoughts_stdlib::register_builtins(&mut engine);
        let mut repl = Self {
            editor,
            engine,
            show_banner: true,
            prompt: ": ".to_string(),
            continuation_prompt: ".. ".to_string(),
        };
        repl.refresh_keywords();
        repl
    }

    /// Replaces the engine.
    #[must_use]
    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self.refresh_keywords();
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// The engine.
    #[must_use]
    pub const fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    fn refresh_keywords(&mut self) {
        let mut keywords: Vec<String> = META_COMMANDS.iter().map(|k| (*k).to_string()).collect();
        keywords.extend(self.engine.commands().names().into_iter().map(String::from));
        self.editor.set_keywords(keywords);
    }

    /// Runs the read-eval-print loop until `#exit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            print_banner();
        }

        loop {
            let Some(input) = self.read_input()? else {
                break;
            };
            if input.trim().is_empty() {
                continue;
            }
            self.editor.add_history(&input);

            match self.eval(&input) {
                Ok(Reply::Exit) => break,
                Ok(reply) => show(&reply),
                Err(e) => print_error(&e),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    fn read_input(&mut self) -> Result<Option<String>> {
        let mut lines: Vec<String> = Vec::new();

        loop {
            let prompt = match lines.len() {
                0 => &self.prompt,
                _ => &self.continuation_prompt,
            };

            match (self.editor.read_line(prompt)?, lines.is_empty()) {
                (ReadResult::Line(line), _) => {
                    lines.push(line);
                    let joined = lines.join("\n");
                    if is_balanced(&joined) {
                        return Ok(Some(joined));
                    }
                }
                (ReadResult::Interrupted, nothing_yet) => {
                    if !nothing_yet {
                        println!("\nInput cancelled.");
                    }
                    return Ok(Some(String::new()));
                }
                (ReadResult::Eof, true) => return Ok(None),
                (ReadResult::Eof, false) => {
                    return Err(Error::internal("end of input inside an unfinished JSON value"));
                }
            }
        }
    }

    /// Evaluates one line: a meta-command or an assertion.
    ///
    /// # Errors
    ///
    /// Returns an error if loading rules or processing the assertion fails.
    pub fn eval(&mut self, input: &str) -> Result<Reply> {
        let trimmed = input.trim();
        let mut words = trimmed.split_whitespace();

        match words.next() {
            Some("#exit") => Ok(Reply::Exit),
            Some("#help") => Ok(Reply::Info(HELP.lines().map(String::from).collect())),
            Some("#log") => Ok(Reply::Info(
                self.engine
                    .knowledge()
                    .trace()
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            )),
            Some("#items") => Ok(Reply::Info(
                self.engine
                    .knowledge()
                    .items()
                    .map(|(name, item)| format!("{name}: {item}"))
                    .collect(),
            )),
            Some("#clear-arcs") => {
                self.engine.clear_arcs();
                Ok(Reply::Info(vec!["arcs cleared".to_string()]))
            }
            Some("#load") => {
                let path = words
                    .next()
                    .ok_or_else(|| Error::invalid_command("#load", "usage: #load PATH [NAME]"))?;
                let name = self.engine.load_rules_from_file(path, words.next())?;
                info!(%path, ruleset = %name, "loaded rules");
                Ok(Reply::Info(vec![format!("loaded ruleset {name}")]))
            }
            _ => self.assert_input(trimmed).map(Reply::Turn),
        }
    }

    /// Asserts text or JSON and collects what it produced.
    ///
    /// Items whose names do not start with `$` are dropped afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is malformed JSON or processing fails.
    pub fn assert_input(&mut self, input: &str) -> Result<Turn> {
        let term = if input.starts_with('[') {
            Term::parse_json(input)?
        } else {
            Term::atom(input)
        };
        debug!(%input, "asserting");

        let result = self.engine.process(&term);
        let output = self.engine.knowledge_mut().drain_output();
        self.engine.clear_items();
        Ok(Turn {
            output,
            conclusions: result?,
        })
    }
}

/// Prints a reply to stdout.
pub fn show(reply: &Reply) {
    match reply {
        Reply::Turn(turn) => {
            for line in &turn.output {
                println!("{line}");
            }
            for conclusion in &turn.conclusions {
                println!("\x1b[1m{conclusion}\x1b[0m");
            }
        }
        Reply::Info(lines) => {
            for line in lines {
                println!("\x1b[2m{line}\x1b[0m");
            }
        }
        Reply::Exit => {}
    }
}

/// Prints an error to stderr.
pub fn print_error(error: &Error) {
    eprintln!("\x1b[31mError: {error}\x1b[0m");
}

fn print_banner() {
    println!("\x1b[1;36mThoughts\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
    println!("Type #help for commands. Use Ctrl+D to exit.\n");
    let _ = io::stdout().flush();
}

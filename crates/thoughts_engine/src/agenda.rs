//! The agenda: drives assertions through commands until every node of the
//! conclusion forest is resolved.
//!
//! Each call to [`Engine::process`]:
//! 1. Wraps the input and numbers its items by position
//! 2. Picks the first unresolved node, depth first
//! 3. Substitutes item references and dispatches the node's command
//! 4. Attaches the results as the node's conclusions and repeats
//!
//! The loop is bounded by [`EngineConfig::max_steps`] and
//! [`EngineConfig::max_depth`]. Walks over the forest use an explicit stack,
//! so a deep chain of conclusions fails with a limit error rather than
//! exhausting the call stack.

use std::path::Path;

use thoughts_foundation::{Error, Result, SemanticLimit, Term, TermList, TermMap};
use tracing::debug;

use crate::assertion::{ASSERT_KEY, Assertion, Span};
use crate::command::{Command, CommandInput, CommandRegistry, Resolution};
use crate::config::EngineConfig;
use crate::knowledge::KnowledgeBase;
use crate::rule::EntryId;
use crate::trace::TraceKind;

// =============================================================================
// Engine
// =============================================================================

/// A rule engine: a knowledge base plus the commands it can dispatch.
#[derive(Debug)]
pub struct Engine {
    kb: KnowledgeBase,
    commands: CommandRegistry,
    config: EngineConfig,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl From<EngineConfig> for Engine {
    fn from(config: EngineConfig) -> Self {
        Self::with_config(config)
    }
}

impl Engine {
    /// Creates an engine with the default configuration and only the core
    /// commands.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with the given configuration.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            kb: KnowledgeBase::new(&config),
            commands: CommandRegistry::with_core(),
            config,
        }
    }

    /// Registers a command.
    pub fn register(&mut self, command: impl Command + 'static) {
        self.commands.register(command);
    }

    /// The command registry.
    #[must_use]
    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// The knowledge base.
    #[must_use]
    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// The knowledge base, mutably.
    pub fn knowledge_mut(&mut self) -> &mut KnowledgeBase {
        &mut self.kb
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // =========================================================================
    // Rules & State
    // =========================================================================

    /// Loads a JSON rule file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_rules_from_file(&mut self, path: impl AsRef<Path>, name: Option<&str>) -> Result<String> {
        self.kb.load_rules_from_file(path.as_ref(), name)
    }

    /// Loads rules from JSON text.
    ///
    /// # Errors
    /// Returns an error if the text cannot be parsed.
    pub fn load_rules_from_str(&mut self, text: &str, name: Option<&str>) -> Result<String> {
        self.kb.load_rules_from_str(text, name)
    }

    /// Adds a ruleset from a list term.
    ///
    /// # Errors
    /// Returns an error if a rule is malformed.
    pub fn add_ruleset(&mut self, rules: &Term, name: Option<&str>) -> Result<String> {
        self.kb.add_ruleset(rules, name, None)
    }

    /// Adds one rule to the default ruleset.
    ///
    /// # Errors
    /// Returns an error if the rule is malformed.
    pub fn add_rule(&mut self, rule: &Term) -> Result<EntryId> {
        self.kb.add_rule(rule)
    }

    /// Re-reads a ruleset from its file.
    ///
    /// # Errors
    /// Returns an error if the ruleset is unknown or fails to load.
    pub fn reload_ruleset(&mut self, name: &str) -> Result<()> {
        self.kb.reload_ruleset(name)
    }

    /// Removes every rule and arc.
    pub fn clear_rules(&mut self) {
        self.kb.clear_rules();
    }

    /// Drops every active arc.
    pub fn clear_arcs(&mut self) {
        self.kb.clear_arcs();
    }

    /// Removes items whose names do not start with `$`.
    pub fn clear_items(&mut self) {
        self.kb.clear_items();
    }

    // =========================================================================
    // Processing
    // =========================================================================

    /// Processes input to saturation and returns the leaf conclusions.
    ///
    /// Arcs left over from earlier calls are dropped first unless
    /// `keep_arcs` is set.
    ///
    /// # Errors
    /// Returns an error if a command fails, JSON input is malformed, or the
    /// step limit is exceeded.
    pub fn process(&mut self, input: &Term) -> Result<Vec<Term>> {
        let forest = self.process_tree(input)?;
        Ok(extract_final_conclusions(&forest, self.config.include_seq))
    }

    /// Processes input to saturation and returns the whole conclusion
    /// forest.
    ///
    /// # Errors
    /// See [`Engine::process`].
    pub fn process_tree(&mut self, input: &Term) -> Result<Vec<Assertion>> {
        if !self.config.keep_arcs {
            self.kb.clear_arcs();
        }
        self.run(input, false)
    }

    /// Processes input until some node yields a conclusion, then stops.
    /// Arcs are kept.
    ///
    /// # Errors
    /// See [`Engine::process`].
    pub fn process_single(&mut self, input: &Term) -> Result<Vec<Assertion>> {
        self.run(input, true)
    }

    fn run(&mut self, input: &Term, stop_early: bool) -> Result<Vec<Assertion>> {
        let mut forest = intake(input)?;
        let mut steps = 0usize;

        while let Some(path) = first_unresolved(&forest) {
            let node = node_at_mut(&mut forest, &path)
                .ok_or_else(|| Error::internal("agenda path left the forest"))?;
            if path.len() > self.config.max_depth {
                return Err(Error::limit_exceeded(SemanticLimit::MaxDepth {
                    limit: self.config.max_depth,
                    context: Some(node.to_string()),
                }));
            }
            if steps >= self.config.max_steps {
                return Err(Error::limit_exceeded(SemanticLimit::MaxSteps {
                    limit: self.config.max_steps,
                    context: Some(node.to_string()),
                }));
            }
            steps += 1;

            let conclusions = self.dispatch(node)?;
            let found = !conclusions.is_empty();
            node.conclusions = Some(conclusions);
            if stop_early && found {
                break;
            }
        }

        debug!(steps, roots = forest.len(), "agenda settled");
        Ok(forest)
    }

    fn dispatch(&mut self, node: &Assertion) -> Result<Vec<Assertion>> {
        self.kb.record(TraceKind::Assert, node.to_string());

        let term = self.kb.apply_values(&node.term);
        let directive = term.as_map().cloned().unwrap_or_default();
        let (name, directive) = match self.commands.resolve(&directive) {
            Resolution::Assert => (ASSERT_KEY.to_string(), directive),
            Resolution::Registered(name) => {
                let directive = self
                    .evaluate_arguments(&directive)
                    .map_err(|err| in_command(err, &name))?;
                (name, directive)
            }
            Resolution::Conflict(names) => {
                let (first, others) = names.split_first().map_or(("", &[][..]), |(f, o)| (f.as_str(), o));
                return Err(Error::invalid_command(
                    first,
                    format!("directive also names {}", others.join(", ")),
                ));
            }
            Resolution::Unknown(name) => {
                debug!(command = %name, "no handler registered");
                self.kb
                    .record(TraceKind::Command, format!("{name} (unknown, skipped)"));
                return Ok(Vec::new());
            }
        };

        let processed = Assertion {
            term: Term::Map(directive),
            span: node.span,
            seq: node.seq.clone(),
            conclusions: None,
        };
        let command = self
            .commands
            .get(&name)
            .ok_or_else(|| Error::internal(format!("command {name} vanished from the registry")))?;

        self.kb.record(TraceKind::Command, format!("{name} {processed}"));
        let output = command
            .execute(&CommandInput::new(&name, &processed), &mut self.kb)
            .map_err(|err| in_command(err, &name))?;
        Ok(lift(output))
    }

    /// Evaluates inline commands nested in a directive's arguments.
    fn evaluate_arguments(&mut self, directive: &TermMap) -> Result<TermMap> {
        directive
            .iter()
            .map(|(key, value)| Ok::<_, Error>((key.clone(), self.evaluate_inline(value)?)))
            .collect()
    }

    fn evaluate_inline(&mut self, term: &Term) -> Result<Term> {
        match term {
            Term::List(items) => items
                .iter()
                .map(|item| self.evaluate_inline(item))
                .collect::<Result<TermList>>()
                .map(Term::List),
            Term::Map(map) => {
                let evaluated = self.evaluate_arguments(map)?;
                let Some(command) = self.commands.resolve_inline(&evaluated) else {
                    return Ok(Term::Map(evaluated));
                };
                let node = Assertion::new(Term::Map(evaluated));
                let name = command.name().to_string();
                self.kb.record(TraceKind::Command, format!("{name} {node} (inline)"));
                command
                    .execute(&CommandInput::new(&name, &node), &mut self.kb)
                    .map_err(|err| in_command(err, &name))
            }
            other => Ok(other.clone()),
        }
    }
}

/// Wraps input into positioned root nodes.
fn intake(input: &Term) -> Result<Vec<Assertion>> {
    let items: Vec<&Term> = match input {
        Term::List(items) => items.iter().collect(),
        single => vec![single],
    };
    items
        .into_iter()
        .enumerate()
        .map(|(pos, item)| Ok(Assertion::from_input(item)?.with_span(Some(Span::at(pos)))))
        .collect()
}

/// Index path to the first unresolved node in depth-first order. The
/// path's length is the node's depth, roots being depth 1.
fn first_unresolved(forest: &[Assertion]) -> Option<Vec<usize>> {
    let mut path = Vec::new();
    let mut levels = vec![forest.iter().enumerate()];

    while let Some(level) = levels.last_mut() {
        let Some((index, node)) = level.next() else {
            levels.pop();
            path.pop();
            continue;
        };
        path.push(index);
        match &node.conclusions {
            None => return Some(path),
            Some(children) => levels.push(children.iter().enumerate()),
        }
    }
    None
}

fn node_at_mut<'a>(forest: &'a mut [Assertion], path: &[usize]) -> Option<&'a mut Assertion> {
    let (first, rest) = path.split_first()?;
    let mut node = forest.get_mut(*first)?;
    for &index in rest {
        node = node.conclusions.as_mut()?.get_mut(index)?;
    }
    Some(node)
}

/// Turns a command result into conclusion nodes.
fn lift(output: Term) -> Vec<Assertion> {
    match output {
        Term::Nil => Vec::new(),
        Term::List(items) => items.into_iter().map(Assertion::new).collect(),
        single => vec![Assertion::new(single)],
    }
}

fn in_command(mut err: Error, name: &str) -> Error {
    let context = err.context.take().unwrap_or_default().with_frame(name);
    err.with_context(context)
}

// =============================================================================
// Extraction
// =============================================================================

/// Collects the leaves of a conclusion forest: resolved nodes below the
/// roots that drew no conclusions.
///
/// Without `include_seq`, literal assertions are unwrapped to the bare
/// term and positional bookkeeping is dropped. The forest is not modified.
#[must_use]
pub fn extract_final_conclusions(forest: &[Assertion], include_seq: bool) -> Vec<Term> {
    let mut leaves = Vec::new();
    let mut pending: Vec<(&Assertion, bool)> = forest.iter().rev().map(|root| (root, true)).collect();

    while let Some((node, is_root)) = pending.pop() {
        let children = node.conclusions.as_deref().unwrap_or_default();
        if children.is_empty() {
            if !is_root {
                leaves.push(leaf_term(node, include_seq));
            }
            continue;
        }
        pending.extend(children.iter().rev().map(|child| (child, false)));
    }
    leaves
}

fn leaf_term(node: &Assertion, include_seq: bool) -> Term {
    if include_seq {
        let leaf = Assertion {
            conclusions: None,
            ..node.clone()
        };
        return leaf.to_term();
    }
    node.literal()
        .cloned()
        .unwrap_or_else(|| node.term.clone())
}

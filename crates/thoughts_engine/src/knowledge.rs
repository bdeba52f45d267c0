//! The knowledge base: rulesets, the token index, active arcs, and the item
//! store.
//!
//! Entries live in an arena addressed by [`EntryId`]. Rulesets list the
//! top-level entries they own. The token index maps each lowercased literal
//! token to the rules whose pattern contains it; rules that can match
//! without sharing a literal token are kept on an always-candidate list.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thoughts_foundation::{Error, Result, Term, TermMap};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::rule::{CompiledEntry, Entry, EntryId, Rule, RuleCompiler, Ruleset};
use crate::sequence::ActiveArc;
use crate::substitute::{Resolver, apply_values};
use crate::text::{has_slots, is_item_ref, is_variable, literal_tokens, split_trailing_punctuation};
use crate::trace::{TraceBuffer, TraceKind};
use crate::unify::unify;

/// Name of the ruleset that always exists.
pub const DEFAULT_RULESET: &str = "default";

/// Key naming the item a fact describes.
pub const ITEM_KEY: &str = "#item";

/// Working memory for an engine.
#[derive(Debug)]
pub struct KnowledgeBase {
    entries: Vec<Entry>,
    rulesets: Vec<Ruleset>,
    index: HashMap<String, Vec<EntryId>>,
    unindexed: Vec<EntryId>,
    rank: HashMap<EntryId, usize>,
    arcs: Vec<ActiveArc>,
    next_arc_id: u64,
    max_arcs: usize,
    items: BTreeMap<String, Term>,
    outbox: Vec<String>,
    rng: ChaCha8Rng,
    trace: TraceBuffer,
    anonymous: usize,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl KnowledgeBase {
    /// Creates an empty knowledge base holding only the default ruleset.
    #[must_use]
    pub fn new(config: &EngineConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        let trace = if config.trace_enabled {
            TraceBuffer::new(config.trace_buffer_size)
        } else {
            TraceBuffer::disabled()
        };

        Self {
            entries: Vec::new(),
            rulesets: vec![Ruleset::new(DEFAULT_RULESET)],
            index: HashMap::new(),
            unindexed: Vec::new(),
            rank: HashMap::new(),
            arcs: Vec::new(),
            next_arc_id: 0,
            max_arcs: config.max_arcs,
            items: BTreeMap::new(),
            outbox: Vec::new(),
            rng,
            trace,
            anonymous: 0,
        }
    }

    // =========================================================================
    // Rules
    // =========================================================================

    /// Adds a ruleset from a list of rule definitions.
    ///
    /// A ruleset with the same name is replaced. Without a name one is
    /// generated. Returns the ruleset name.
    ///
    /// # Errors
    /// Returns an error if any entry fails to compile; nothing is added.
    pub fn add_ruleset(
        &mut self,
        rules: &Term,
        name: Option<&str>,
        path: Option<PathBuf>,
    ) -> Result<String> {
        let name = name.map_or_else(
            || {
                self.anonymous += 1;
                format!("ruleset-{}", self.anonymous)
            },
            str::to_string,
        );
        let compiled = RuleCompiler::compile_all(rules, &name)?;
        let count = compiled.len();
        let entries = compiled
            .into_iter()
            .map(|entry| self.insert_entry(entry))
            .collect();

        let ruleset = Ruleset {
            name: name.clone(),
            entries,
            path,
        };
        match self.rulesets.iter_mut().find(|r| r.name == name) {
            Some(existing) => *existing = ruleset,
            None => self.rulesets.push(ruleset),
        }

        self.rebuild_index();
        info!(ruleset = %name, rules = count, "loaded rules");
        self.trace
            .push(TraceKind::Load, format!("{count} entries into {name}"));
        Ok(name)
    }

    /// Adds one rule definition to the default ruleset.
    ///
    /// # Errors
    /// Returns an error if the rule fails to compile.
    pub fn add_rule(&mut self, rule: &Term) -> Result<EntryId> {
        let compiled = RuleCompiler::compile(rule)?;
        let id = self.insert_entry(compiled);
        if let Some(default) = self.rulesets.iter_mut().find(|r| r.name == DEFAULT_RULESET) {
            default.entries.push(id);
        } else {
            let mut default = Ruleset::new(DEFAULT_RULESET);
            default.entries.push(id);
            self.rulesets.insert(0, default);
        }
        self.rebuild_index();
        Ok(id)
    }

    /// Loads a JSON rule file. The ruleset is named after the file stem
    /// unless a name is given.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// contains a malformed rule.
    pub fn load_rules_from_file(&mut self, path: &Path, name: Option<&str>) -> Result<String> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::rule_load(path.display().to_string(), e.to_string()))?;
        let rules = parse_rules(&text, &path.display().to_string())?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned());
        let name = name.map(str::to_string).or(stem);
        self.add_ruleset(&rules, name.as_deref(), Some(path.to_path_buf()))
    }

    /// Loads rules from JSON text.
    ///
    /// # Errors
    /// Returns an error if the text is not valid JSON or contains a
    /// malformed rule.
    pub fn load_rules_from_str(&mut self, text: &str, name: Option<&str>) -> Result<String> {
        let rules = parse_rules(text, name.unwrap_or("<inline>"))?;
        self.add_ruleset(&rules, name, None)
    }

    /// Re-reads a ruleset from the file it was loaded from. Arcs of rules
    /// that no longer exist are dropped.
    ///
    /// # Errors
    /// Returns an error if the ruleset does not exist, was not loaded from a
    /// file, or the file fails to load.
    pub fn reload_ruleset(&mut self, name: &str) -> Result<()> {
        let ruleset = self
            .rulesets
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| Error::unknown_ruleset(name))?;
        let path = ruleset
            .path
            .clone()
            .ok_or_else(|| Error::rule_load(name, "ruleset was not loaded from a file"))?;

        self.load_rules_from_file(&path, Some(name))?;

        let live: HashSet<EntryId> = self.live_entries();
        self.arcs.retain(|arc| live.contains(&arc.rule));
        Ok(())
    }

    /// Removes every rule and arc, leaving an empty default ruleset.
    pub fn clear_rules(&mut self) {
        self.entries.clear();
        self.rulesets = vec![Ruleset::new(DEFAULT_RULESET)];
        self.arcs.clear();
        self.rebuild_index();
    }

    /// Returns a ruleset by name.
    #[must_use]
    pub fn ruleset(&self, name: &str) -> Option<&Ruleset> {
        self.rulesets.iter().find(|r| r.name == name)
    }

    /// Iterates rulesets in load order.
    pub fn rulesets(&self) -> impl Iterator<Item = &Ruleset> {
        self.rulesets.iter()
    }

    /// Returns an entry by id.
    #[must_use]
    pub fn entry(&self, id: EntryId) -> Option<&Entry> {
        self.entries.get(id.0)
    }

    /// Returns the rule stored under `id`.
    ///
    /// # Errors
    /// Returns an internal error if `id` does not name a rule.
    pub fn rule(&self, id: EntryId) -> Result<&Rule> {
        match self.entries.get(id.0) {
            Some(Entry::Rule(rule)) => Ok(rule),
            _ => Err(Error::internal(format!("entry {id} is not a rule"))),
        }
    }

    /// Plain facts from every ruleset, in load order.
    pub fn facts(&self) -> impl Iterator<Item = &Term> {
        self.rulesets
            .iter()
            .flat_map(|r| r.entries.iter())
            .filter_map(|id| match self.entries.get(id.0) {
                Some(Entry::Fact(term)) => Some(term),
                _ => None,
            })
    }

    /// Returns the entries that could match `term`, using the token index.
    ///
    /// Returns `None` when the index cannot decide: structured terms, or text
    /// with variables or wildcards. Otherwise returns the rules sharing a
    /// literal token with the text plus the always-candidate entries, in
    /// load order.
    #[must_use]
    pub fn search_index(&self, term: &Term) -> Option<Vec<EntryId>> {
        let Term::Atom(text) = term else {
            return None;
        };
        if has_slots(text) {
            return None;
        }

        let mut hits: HashSet<EntryId> = self.unindexed.iter().copied().collect();
        for token in literal_tokens(text) {
            if let Some(ids) = self.index.get(&token) {
                hits.extend(ids.iter().copied());
            }
        }

        let mut hits: Vec<EntryId> = hits.into_iter().collect();
        hits.sort_by_key(|id| self.rank.get(id).copied().unwrap_or(usize::MAX));
        Some(hits)
    }

    /// Entries to try against `term`: the index result, or every top-level
    /// entry when the index cannot decide.
    #[must_use]
    pub fn candidates(&self, term: &Term) -> Vec<EntryId> {
        self.search_index(term)
            .unwrap_or_else(|| self.rulesets.iter().flat_map(|r| r.entries.iter().copied()).collect())
    }

    fn insert_entry(&mut self, compiled: CompiledEntry) -> EntryId {
        let entry = match compiled {
            CompiledEntry::Rule(rule) => Entry::Rule(rule),
            CompiledEntry::Fact(term) => Entry::Fact(term),
            CompiledEntry::Block { guard, rules } => {
                let rules = rules
                    .into_iter()
                    .map(|nested| self.insert_entry(nested))
                    .collect();
                Entry::Block { guard, rules }
            }
        };
        self.entries.push(entry);
        EntryId(self.entries.len() - 1)
    }

    fn live_entries(&self) -> HashSet<EntryId> {
        let mut live = HashSet::new();
        let mut stack: Vec<EntryId> = self
            .rulesets
            .iter()
            .flat_map(|r| r.entries.iter().copied())
            .collect();
        while let Some(id) = stack.pop() {
            if live.insert(id) {
                if let Some(Entry::Block { rules, .. }) = self.entries.get(id.0) {
                    stack.extend(rules.iter().copied());
                }
            }
        }
        live
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        self.unindexed.clear();
        self.rank.clear();

        let top_level: Vec<EntryId> = self
            .rulesets
            .iter()
            .flat_map(|r| r.entries.iter().copied())
            .collect();

        for (rank, id) in top_level.into_iter().enumerate() {
            self.rank.insert(id, rank);
            match self.entries.get(id.0) {
                Some(Entry::Rule(rule)) => match rule.index_tokens() {
                    Some(tokens) => {
                        let unique: HashSet<String> = tokens.into_iter().collect();
                        for token in unique {
                            self.index.entry(token).or_default().push(id);
                        }
                    }
                    None => self.unindexed.push(id),
                },
                Some(Entry::Block { .. }) => self.unindexed.push(id),
                Some(Entry::Fact(_)) | None => {}
            }
        }
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Stores `value` as directed by the `#into`, `#append` or `#push` key of
    /// `directive`. Returns false if the directive has none of them.
    ///
    /// `#into` overwrites. `#append` and `#push` add to the end or front of a
    /// list, turning an existing scalar into a two-element list.
    pub fn store_item(&mut self, directive: &TermMap, value: Term) -> bool {
        if let Some(name) = directive.get("#into") {
            let name = name.to_string();
            self.trace.push(TraceKind::Store, format!("{name} = {value}"));
            self.items.insert(name, value);
            return true;
        }

        for (key, at_front) in [("#append", false), ("#push", true)] {
            let Some(name) = directive.get(key) else {
                continue;
            };
            let name = name.to_string();
            self.trace
                .push(TraceKind::Store, format!("{key} {value} to {name}"));
            let updated = match self.items.remove(&name) {
                None | Some(Term::Nil) => value,
                Some(Term::List(mut list)) => {
                    if at_front {
                        list.push_front(value);
                    } else {
                        list.push_back(value);
                    }
                    Term::List(list)
                }
                Some(current) if at_front => Term::list([value, current]),
                Some(current) => Term::list([current, value]),
            };
            self.items.insert(name, updated);
            return true;
        }

        false
    }

    /// Returns a stored item.
    #[must_use]
    pub fn item(&self, name: &str) -> Option<&Term> {
        self.items.get(name)
    }

    /// Stores an item directly.
    pub fn set_item(&mut self, name: impl Into<String>, value: Term) {
        self.items.insert(name.into(), value);
    }

    /// Iterates stored items in name order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Removes every item whose name does not start with `$`.
    pub fn clear_items(&mut self) {
        self.items.retain(|name, _| name.starts_with('$'));
    }

    /// Resolves `$path` and `?name` references in text.
    ///
    /// `$a.b.c` looks `$a` up among stored items and `#item` facts, then
    /// walks map keys; over a list of maps each step collects the key from
    /// every element. `name[i]` indexes a list, an empty step means `#`,
    /// and a single-element result is unwrapped. `?name` looks only at
    /// stored items. Unresolved references are left as written.
    ///
    /// When the text is a single reference to a non-text value, that value
    /// is returned as is; otherwise the resolved words are joined with
    /// single spaces.
    #[must_use]
    pub fn retrieve(&self, text: &str) -> Term {
        self.resolve_references(text)
            .unwrap_or_else(|| Term::from_text(text))
    }

    /// Substitutes item references throughout a term.
    #[must_use]
    pub fn apply_values(&self, term: &Term) -> Term {
        apply_values(term, self)
    }

    fn resolve_references(&self, text: &str) -> Option<Term> {
        if !text.contains('$') && !text.contains('?') {
            return None;
        }

        let tokens: Vec<&str> = text.split(' ').collect();
        let mut words: Vec<String> = Vec::with_capacity(tokens.len());
        let mut changed = false;

        for token in &tokens {
            let resolved = if is_item_ref(token) {
                self.resolve_item_token(token)
            } else {
                let (name, suffix) = split_trailing_punctuation(token);
                if is_variable(name) {
                    self.items
                        .get(name)
                        .map(|value| (value.clone(), suffix.to_string()))
                } else {
                    None
                }
            };

            match resolved {
                None => words.push((*token).to_string()),
                Some((value, suffix)) => {
                    changed = true;
                    let structured = value.as_text().is_none() && !matches!(value, Term::List(_));
                    if tokens.len() == 1 && suffix.is_empty() && structured {
                        return Some(value);
                    }
                    match value {
                        Term::List(items) => {
                            words.extend(items.iter().map(ToString::to_string));
                            if let Some(last) = words.last_mut() {
                                last.push_str(&suffix);
                            }
                        }
                        other => words.push(format!("{other}{suffix}")),
                    }
                }
            }
        }

        changed.then(|| Term::from_text(words.join(" ")))
    }

    fn resolve_item_token(&self, token: &str) -> Option<(Term, String)> {
        if let Some(value) = self.resolve_path(token) {
            return Some((value, String::new()));
        }
        let (path, suffix) = split_trailing_punctuation(token);
        if suffix.is_empty() {
            return None;
        }
        self.resolve_path(path)
            .map(|value| (value, suffix.to_string()))
    }

    fn resolve_path(&self, token: &str) -> Option<Term> {
        let mut current: Option<Term> = None;
        for part in token.split('.') {
            let part = if part.is_empty() { "#" } else { part };
            let (name, index) = split_index(part);

            let next = if name.starts_with('$') {
                self.find_by_name(name)?
            } else {
                descend(self, current.as_ref()?, name)?
            };
            let next = match (index, next) {
                (Some(i), Term::List(list)) => list.get(i).cloned()?,
                (_, other) => other,
            };
            current = Some(unwrap_single(next));
        }
        current
    }

    /// Every stored item or fact registered under `name`.
    fn find_by_name(&self, name: &str) -> Option<Term> {
        let query = Term::map([(ITEM_KEY, Term::from_text(name))]);
        let mut found: Vec<Term> = self
            .items
            .get(name)
            .filter(|t| !t.is_nil())
            .cloned()
            .into_iter()
            .collect();
        found.extend(
            self.facts()
                .filter(|fact| fact.get(ITEM_KEY).is_some() && unify(fact, &query).is_some())
                .cloned(),
        );
        (!found.is_empty()).then(|| Term::list(found))
    }

    // =========================================================================
    // Arcs
    // =========================================================================

    /// Active arcs, oldest first.
    #[must_use]
    pub fn arcs(&self) -> &[ActiveArc] {
        &self.arcs
    }

    /// Adds an arc, evicting the oldest arcs beyond the configured limit.
    /// Returns the id assigned to the arc.
    pub fn push_arc(&mut self, mut arc: ActiveArc) -> u64 {
        let id = self.next_arc_id;
        self.next_arc_id += 1;
        arc.id = id;
        self.trace.push(TraceKind::ArcExtend, arc.to_string());
        self.arcs.push(arc);

        while self.arcs.len() > self.max_arcs {
            let evicted = self.arcs.remove(0);
            warn!(arc = evicted.id, limit = self.max_arcs, "arc limit reached, evicting oldest arc");
            self.trace.push(TraceKind::ArcEvict, evicted.to_string());
        }
        id
    }

    /// Removes an arc by id. Returns true if it was present.
    pub fn remove_arc(&mut self, id: u64) -> bool {
        let before = self.arcs.len();
        self.arcs.retain(|arc| arc.id != id);
        self.arcs.len() != before
    }

    /// Drops every active arc.
    pub fn clear_arcs(&mut self) {
        self.arcs.clear();
    }

    // =========================================================================
    // Output, Randomness & Trace
    // =========================================================================

    /// Appends a line to the output transcript.
    pub fn emit(&mut self, line: impl Into<String>) {
        self.outbox.push(line.into());
    }

    /// Lines emitted since the last drain.
    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.outbox
    }

    /// Takes the output transcript, leaving it empty.
    pub fn drain_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }

    /// The random number generator used by `#random`.
    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// The trace buffer.
    #[must_use]
    pub fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    /// Records a trace event.
    pub fn record(&mut self, kind: TraceKind, message: impl Into<String>) {
        self.trace.push(kind, message);
    }
}

impl Resolver for KnowledgeBase {
    fn resolve_text(&self, text: &str) -> Option<Term> {
        self.resolve_references(text)
    }
}

fn parse_rules(text: &str, source: &str) -> Result<Term> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| Error::rule_load(source, e.to_string()))?;
    Ok(Term::from(value))
}

fn split_index(part: &str) -> (&str, Option<usize>) {
    match (part.find('['), part.find(']')) {
        (Some(open), Some(close)) if close > open => {
            (&part[..open], part[open + 1..close].trim().parse().ok())
        }
        _ => (part, None),
    }
}

fn descend(kb: &KnowledgeBase, current: &Term, key: &str) -> Option<Term> {
    match current {
        Term::Map(map) => map.get(key).filter(|t| !t.is_nil()).cloned(),
        Term::List(items) => {
            let collected: Vec<Term> = items
                .iter()
                .filter_map(|item| item.get(key).filter(|t| !t.is_nil()).cloned())
                .collect();
            (!collected.is_empty()).then(|| Term::list(collected))
        }
        other => {
            let name = other.as_text()?;
            let found = kb.find_by_name(name)?;
            descend(kb, &found, key)
        }
    }
}

fn unwrap_single(term: Term) -> Term {
    match term {
        Term::List(list) if list.len() == 1 => list.head().cloned().unwrap_or(Term::Nil),
        other => other,
    }
}

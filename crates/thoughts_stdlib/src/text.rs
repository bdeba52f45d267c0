//! Text commands: `#tokenize`, `#replace`, `#format`.

use thoughts_engine::substitute::{Resolver, apply_values};
use thoughts_engine::unify::{SEQ_END, SEQ_START};
use thoughts_engine::{Command, CommandInput, KnowledgeBase};
use thoughts_foundation::{Result, Term, TermMap};

/// Placeholder for the current token in a `#tokenize` template.
pub const TOKEN_SLOT: &str = "#";

// =============================================================================
// #tokenize
// =============================================================================

/// `#tokenize`: splits text on whitespace into positioned facts.
///
/// Each token becomes `{"#": token}` at positions `i..i+1`, or the `assert`
/// template with `#` replaced by the token.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenizeCommand;

struct TokenSlot<'a>(&'a str);

impl Resolver for TokenSlot<'_> {
    fn resolve_text(&self, text: &str) -> Option<Term> {
        if text == TOKEN_SLOT {
            return Some(Term::from_text(self.0));
        }
        if !text.split(' ').any(|word| word == TOKEN_SLOT) {
            return None;
        }
        let words: Vec<&str> = text
            .split(' ')
            .map(|word| if word == TOKEN_SLOT { self.0 } else { word })
            .collect();
        Some(Term::from_text(words.join(" ")))
    }
}

impl Command for TokenizeCommand {
    fn name(&self) -> &str {
        "#tokenize"
    }

    fn execute(&self, input: &CommandInput<'_>, _kb: &mut KnowledgeBase) -> Result<Term> {
        let text = input.require_text(input.name())?;
        let template = input.arg("assert");

        let facts: Vec<Term> = text
            .split_whitespace()
            .enumerate()
            .map(|(pos, token)| {
                let fact = match template {
                    Some(template) => apply_values(template, &TokenSlot(token)),
                    None => Term::map([(TOKEN_SLOT, Term::from_text(token))]),
                };
                match fact {
                    Term::Map(map) => Term::Map(
                        map.update(SEQ_START.into(), Term::from(pos))
                            .update(SEQ_END.into(), Term::from(pos + 1)),
                    ),
                    other => other,
                }
            })
            .collect();

        if facts.is_empty() {
            return Ok(Term::Nil);
        }
        Ok(Term::list(facts))
    }
}

// =============================================================================
// #replace
// =============================================================================

/// `#replace`: looks the target up in the `with` map.
///
/// Tries the text as is, upper-cased, then lower-cased, then the same
/// three padded with a space on each side. The result is trimmed.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReplaceCommand;

fn search_in(table: &TermMap, key: &str) -> Option<Term> {
    [key.to_string(), key.to_uppercase(), key.to_lowercase()]
        .iter()
        .find_map(|candidate| table.get(candidate.as_str()).cloned())
}

impl Command for ReplaceCommand {
    fn name(&self) -> &str {
        "#replace"
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        let target = input.require_target()?.to_string();
        let table = input
            .require_arg("with")?
            .as_map()
            .ok_or_else(|| input.error("with must be a map"))?;

        let Some(found) =
            search_in(table, &target).or_else(|| search_in(table, &format!(" {target} ")))
        else {
            return Ok(Term::Nil);
        };

        let value = match found.as_text() {
            Some(text) => Term::from_text(text.trim()),
            None => found,
        };
        input.store(kb, &value);
        Ok(value)
    }

    fn inline(&self) -> bool {
        true
    }
}

// =============================================================================
// #format
// =============================================================================

/// `#format`: changes letter case or spacing according to `#as`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatCommand;

impl Command for FormatCommand {
    fn name(&self) -> &str {
        "#format"
    }

    fn execute(&self, input: &CommandInput<'_>, kb: &mut KnowledgeBase) -> Result<Term> {
        let style = input.require_text("#as")?;
        let Some(text) = input.target().and_then(Term::as_text) else {
            return Ok(Term::Nil);
        };

        let formatted = match style {
            "lower" => text.to_lowercase(),
            "upper" => text.to_uppercase(),
            "chartokens" => char_tokens(text),
            "proper" => title_case(text),
            "sentence" => sentence_case(text),
            other => return Err(input.error(format!("unknown format {other:?}"))),
        };

        let value = Term::from_text(formatted);
        input.store(kb, &value);
        Ok(value)
    }

    fn inline(&self) -> bool {
        true
    }
}

fn char_tokens(text: &str) -> String {
    let chars: Vec<String> = text.chars().map(String::from).collect();
    chars.join(" ").trim_end().to_string()
}

/// Upper-cases the first letter of every run of letters, lower-cases the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

//! Word-level tokenization for textual patterns.
//!
//! Text is split on whitespace. A trailing `.` or `?` on a word becomes its
//! own token, so `"is it?"` tokenizes as `["is", "it", "?"]`.

/// Splits text into word tokens, separating trailing `.` and `?`.
#[must_use]
pub fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        match word.char_indices().last() {
            Some((idx, '.' | '?')) if idx > 0 => {
                tokens.push(&word[..idx]);
                tokens.push(&word[idx..]);
            }
            _ => tokens.push(word),
        }
    }
    tokens
}

/// Strips a class qualifier from a variable token (`?x:person` becomes `?x`).
#[must_use]
pub fn strip_class(token: &str) -> &str {
    if token.starts_with('?') {
        if let Some(idx) = token.find(':') {
            return &token[..idx];
        }
    }
    token
}

/// Returns true for a single-slot variable token such as `?name`.
#[must_use]
pub fn is_variable(token: &str) -> bool {
    token.len() > 1 && token.starts_with('?')
}

/// Returns true for a wildcard token such as `*` or `*rest`.
#[must_use]
pub fn is_wildcard(token: &str) -> bool {
    token.starts_with('*')
}

/// Returns true for an item reference token such as `$user.name`.
#[must_use]
pub fn is_item_ref(token: &str) -> bool {
    token.len() > 1 && token.starts_with('$')
}

/// Returns true if the text is one token naming a variable.
#[must_use]
pub fn is_bare_variable(text: &str) -> bool {
    is_variable(text) && !text.contains(char::is_whitespace)
}

/// Returns true if any token could bind or absorb other tokens.
#[must_use]
pub fn has_slots(text: &str) -> bool {
    tokenize(text)
        .into_iter()
        .any(|t| is_variable(t) || is_wildcard(t))
}

/// Returns the lowercased literal tokens of a pattern, skipping variables,
/// wildcards, and item references.
#[must_use]
pub fn literal_tokens(text: &str) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_variable(t) && !is_wildcard(t) && !is_item_ref(t))
        .map(str::to_lowercase)
        .collect()
}

/// Splits a reference token into its name and any trailing punctuation.
///
/// `"?name."` becomes `("?name", ".")`.
#[must_use]
pub fn split_trailing_punctuation(token: &str) -> (&str, &str) {
    let end = token
        .trim_end_matches(['.', ',', '!', '?', ';', ':'])
        .len();
    if end <= 1 {
        return (token, "");
    }
    token.split_at(end)
}

/// Replaces the variable references inside `text` that `lookup` knows.
///
/// A reference is `?` followed by name characters, optionally qualified as
/// `?name:class`. It ends at the first other character, so `?name's`,
/// `(?name)` and `?name-like` all refer to `?name`. `lookup` receives the
/// name without its class. Returns `None` when nothing was replaced.
pub fn replace_variables(text: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut changed = false;

    while let Some(at) = rest.find('?') {
        let (before, from) = rest.split_at(at);
        out.push_str(before);

        let name_end = 1 + name_length(&from[1..]);
        if name_end == 1 {
            out.push('?');
            rest = &from[1..];
            continue;
        }
        let mut end = name_end;
        if let Some(class) = from[name_end..].strip_prefix(':') {
            let class_len = name_length(class);
            if class_len > 0 {
                end += 1 + class_len;
            }
        }

        match lookup(&from[..name_end]) {
            Some(value) => {
                out.push_str(&value);
                changed = true;
            }
            None => out.push_str(&from[..end]),
        }
        rest = &from[end..];
    }

    out.push_str(rest);
    changed.then_some(out)
}

fn name_length(text: &str) -> usize {
    text.find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '#'))
        .unwrap_or(text.len())
}

//! Input highlighting for the REPL.

use std::borrow::Cow;

const RESET: &str = "\x1b[0m";
const DIRECTIVE: &str = "\x1b[36m";
const VARIABLE: &str = "\x1b[35m";
const ITEM: &str = "\x1b[32m";
const PUNCTUATION: &str = "\x1b[2m";

/// Colours directives, variables, and item references in input.
///
/// Works on both free text and JSON: `#name` is a directive, `?name` and
/// `*name` are variables, `$name` is an item reference.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThoughtsHighlighter;

impl ThoughtsHighlighter {
    /// Creates a new highlighter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Highlights a line of input.
    #[must_use]
    pub fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !line.contains(['#', '?', '*', '$', '{', '[']) {
            return Cow::Borrowed(line);
        }

        let mut out = String::with_capacity(line.len() * 2);
        let mut chars = line.char_indices().peekable();

        while let Some((start, c)) = chars.next() {
            let colour = match c {
                '#' => Some(DIRECTIVE),
                '?' | '*' => Some(VARIABLE),
                '$' => Some(ITEM),
                '{' | '}' | '[' | ']' | ':' | ',' => {
                    out.push_str(PUNCTUATION);
                    out.push(c);
                    out.push_str(RESET);
                    continue;
                }
                _ => None,
            };

            let Some(colour) = colour else {
                out.push(c);
                continue;
            };

            let mut end = start + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_name_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            out.push_str(colour);
            out.push_str(&line[start..end]);
            out.push_str(RESET);
        }

        Cow::Owned(out)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '#' | '\\')
}

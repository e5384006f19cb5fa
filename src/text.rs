//! Small text helpers the evaluator leans on: quote stripping, the secret
//! flag and locating `[...]` dice blocks inside a chat message.

use once_cell::sync::Lazy;
use regex::Regex;

static SECRET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsecret\b").expect("secret pattern is valid"));

/// Opening and closing characters of every quote style we strip.
const QUOTE_PAIRS: [(char, char); 7] = [
    ('"', '"'),
    ('\'', '\''),
    ('“', '”'),
    ('„', '“'),
    ('„', '”'),
    ('‘', '’'),
    ('«', '»'),
];

/// Quote styles that can protect a dice description. Single quotes are left
/// out so apostrophes in words don't open a quote.
const PROTECTING_QUOTES: [(char, char); 4] = [('"', '"'), ('“', '”'), ('„', '“'), ('«', '»')];

/// Removes one matching pair of surrounding quotes, including typographic
/// variants. Text without a matching pair is returned trimmed but otherwise
/// untouched.
pub fn unquote(text: &str) -> &str {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();

    if let (Some(first), Some(last)) = (chars.next(), chars.next_back()) {
        if QUOTE_PAIRS.contains(&(first, last)) {
            return &trimmed[first.len_utf8()..trimmed.len() - last.len_utf8()];
        }
    }
    trimmed
}

/// Whole-word, case-insensitive check for the `secret` flag.
pub fn is_secret(text: &str) -> bool {
    SECRET.is_match(text)
}

/// Drops one pair of brackets wrapping the whole expression: `[1d20]` -> `1d20`.
pub fn strip_brackets(text: &str) -> &str {
    let trimmed = text.trim();
    match trimmed.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

/// Contents of every top-level `[...]` block in `message`, in order.
///
/// A `]` inside quoted text does not close its block, so descriptions like
/// `[1d20 "the [red] door"]` stay whole. Unclosed blocks are ignored.
pub fn bracketed_segments(message: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    let mut closing_quote: Option<char> = None;

    for (i, c) in message.char_indices() {
        if let Some(close) = closing_quote {
            if c == close {
                closing_quote = None;
            }
            continue;
        }

        match c {
            '[' => {
                if depth == 0 {
                    start = i + c.len_utf8();
                }
                depth += 1;
            }
            ']' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    segments.push(&message[start..i]);
                }
            }
            _ if depth > 0 => {
                closing_quote = PROTECTING_QUOTES
                    .iter()
                    .find(|(open, _)| *open == c)
                    .map(|(_, close)| *close);
            }
            _ => {}
        }
    }

    segments
}

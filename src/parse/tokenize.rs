use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::{config::UnmatchedPolicy, error::DiceError};

/// Name of the matcher that produced a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `"…"`, `'…'`, `“…”`, `„…“`, `‘…’` or `«…»`, kept whole so its contents never split.
    Quotes,
    /// `{count}d{sides}{modifiers}`
    Dice,
    /// `vs 15`, `gteq 10`, `>= dc 12`, ...
    Test,
    /// `min(`, `max(`, `floor(`, `ceil(`, `round(`, `abs(`
    Function,
    Number,
    Operator,
    OpenParen,
    CloseParen,
    Comma,
    Whitespace,
    /// A free-text word.
    Description,
    /// Characters no matcher accepted, kept when the policy is
    /// [`UnmatchedPolicy::Literal`].
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub key: TokenKind,
    /// The exact substring that matched.
    pub token: String,
    /// Capture groups of the matcher, empty strings for groups that did not participate.
    pub matches: Vec<String>,
    /// Byte offset of the token in the tokenized input.
    pub position: usize,
}

// Apostrophes inside words never start a token, the description matcher
// consumes them, so single quotes only open a quote after a separator.
const QUOTES: &str = r#""[^"]*"|“[^”]*”|„[^“”]*[“”]|«[^»]*»|'[^']*'|‘[^’]*’"#;
// Takes the whole word after the sides so a bad modifier reaches the dice
// parser instead of splitting off as description text.
const DICE: &str = r"(?i)(\d*)d(\d+)(\w*)";
const TEST: &str = r"(?i)(vs|gteq|gte|gt|lteq|lte|lt|eq|>=|<=|=|>|<)\s*(?:dc\s*)?(-?\d+)";
const FUNCTION: &str = r"(?i)(min|max|floor|ceil|round|abs)\s*\(";
const NUMBER: &str = r"(\d+(?:\.\d+)?)";
const OPERATOR: &str = r"([-+*/×÷])";
const OPEN_PAREN: &str = r"\(";
const CLOSE_PAREN: &str = r"\)";
const COMMA: &str = ",";
const WHITESPACE: &str = r"\s+";
const DESCRIPTION: &str = r"[\p{L}_][\p{L}\p{N}_'’.!?:;#]*";

static DICE_PARSERS: Lazy<TokenParsers> = Lazy::new(|| {
    TokenParsers::from_patterns(&[
        (TokenKind::Quotes, QUOTES),
        (TokenKind::Dice, DICE),
        (TokenKind::Test, TEST),
        (TokenKind::Function, FUNCTION),
        (TokenKind::Number, NUMBER),
        (TokenKind::Operator, OPERATOR),
        (TokenKind::OpenParen, OPEN_PAREN),
        (TokenKind::CloseParen, CLOSE_PAREN),
        (TokenKind::Comma, COMMA),
        (TokenKind::Whitespace, WHITESPACE),
        (TokenKind::Description, DESCRIPTION),
    ])
    .expect("dice token patterns are valid")
});

static MATH_PARSERS: Lazy<TokenParsers> = Lazy::new(|| {
    TokenParsers::from_patterns(&[
        (TokenKind::Function, FUNCTION),
        (TokenKind::Number, NUMBER),
        (TokenKind::Operator, OPERATOR),
        (TokenKind::OpenParen, OPEN_PAREN),
        (TokenKind::CloseParen, CLOSE_PAREN),
        (TokenKind::Comma, COMMA),
        (TokenKind::Whitespace, WHITESPACE),
    ])
    .expect("math token patterns are valid")
});

/// Ordered list of named matchers. At every position the first matcher that
/// accepts the input wins, even when a later one would match more text.
#[derive(Debug, Clone)]
pub struct TokenParsers {
    parsers: Vec<(TokenKind, Regex)>,
}

impl TokenParsers {
    /// Builds the matchers, anchoring every pattern at the scan position.
    pub fn from_patterns(patterns: &[(TokenKind, &str)]) -> Result<Self, regex::Error> {
        let parsers = patterns
            .iter()
            .map(|(kind, pattern)| Ok((*kind, Regex::new(&format!("^(?:{pattern})"))?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self { parsers })
    }

    /// Matchers for full dice expressions.
    pub fn dice() -> &'static TokenParsers {
        &DICE_PARSERS
    }

    /// Matchers for plain arithmetic: numbers, operators, parentheses and functions.
    pub fn math() -> &'static TokenParsers {
        &MATH_PARSERS
    }

    #[cfg(test)]
    pub(crate) fn kinds(&self) -> impl Iterator<Item = TokenKind> + '_ {
        self.parsers.iter().map(|(kind, _)| *kind)
    }

    /// Splits `input` into tokens, left to right.
    pub fn tokenize(&self, input: &str, unmatched: UnmatchedPolicy) -> Result<Vec<Token>, DiceError> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut position = 0;

        while let Some(rest) = input.get(position..).filter(|rest| !rest.is_empty()) {
            if let Some(token) = self.match_at(rest, position) {
                position += token.token.len();
                tokens.push(token);
                continue;
            }

            let Some(c) = rest.chars().next() else {
                break;
            };
            match unmatched {
                UnmatchedPolicy::Error => {
                    return Err(DiceError::LexicalError {
                        position,
                        text: c.to_string(),
                    })
                }
                UnmatchedPolicy::Literal => {
                    match tokens.last_mut() {
                        Some(last) if last.key == TokenKind::Unknown => last.token.push(c),
                        _ => tokens.push(Token {
                            key: TokenKind::Unknown,
                            token: c.to_string(),
                            matches: Vec::new(),
                            position,
                        }),
                    }
                    position += c.len_utf8();
                }
            }
        }

        trace!(input, count = tokens.len(), "tokenized");
        Ok(tokens)
    }

    fn match_at(&self, rest: &str, position: usize) -> Option<Token> {
        self.parsers.iter().find_map(|(kind, regex)| {
            let captures = regex.captures(rest)?;
            let whole = captures.get(0)?;
            if whole.is_empty() {
                return None;
            }

            let matches = captures
                .iter()
                .skip(1)
                .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect();

            Some(Token {
                key: *kind,
                token: whole.as_str().to_string(),
                matches,
                position,
            })
        })
    }
}

/// Tokenizes a dice expression with the default matchers, failing on
/// characters none of them accept.
pub fn tokenize(input: &str) -> Result<Vec<Token>, DiceError> {
    TokenParsers::dice().tokenize(input, UnmatchedPolicy::Error)
}

//! Folding of arithmetic token streams into a single number.
//!
//! Parenthesized groups are resolved innermost first, a math function taking
//! its group as comma separated arguments. What is left is reduced by
//! precedence, `*` and `/` before `+` and `-`, each left to right.

use tracing::trace;

use crate::config::UnmatchedPolicy;
use crate::error::DiceError;
use crate::parse::{MathFn, Operator, Token, TokenKind, TokenParsers};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MathToken {
    Number(f64),
    Operator(Operator),
    OpenParen,
    /// A function name together with its opening parenthesis, e.g. `floor(`.
    Function(MathFn),
    CloseParen,
    Comma,
}

impl MathToken {
    /// Converts an arithmetic token, `None` for tokens without arithmetic meaning.
    pub fn from_token(token: &Token) -> Option<Self> {
        match token.key {
            TokenKind::Number => token.token.parse().ok().map(MathToken::Number),
            TokenKind::Operator => Operator::from_symbol(&token.token).map(MathToken::Operator),
            TokenKind::OpenParen => Some(MathToken::OpenParen),
            TokenKind::CloseParen => Some(MathToken::CloseParen),
            TokenKind::Comma => Some(MathToken::Comma),
            TokenKind::Function => token
                .matches
                .first()
                .and_then(|name| MathFn::from_name(name))
                .map(MathToken::Function),
            _ => None,
        }
    }

    fn opens_group(self) -> bool {
        matches!(self, MathToken::OpenParen | MathToken::Function(_))
    }
}

impl Operator {
    pub fn apply(self, lhs: f64, rhs: f64) -> Result<f64, String> {
        match self {
            Operator::Add => Ok(lhs + rhs),
            Operator::Sub => Ok(lhs - rhs),
            Operator::Mul => Ok(lhs * rhs),
            Operator::Div if rhs == 0.0 => Err("division by zero".to_string()),
            Operator::Div => Ok(lhs / rhs),
        }
    }

    fn is_additive(self) -> bool {
        !self.is_multiplicative()
    }
}

impl MathFn {
    pub fn apply(self, args: &[f64]) -> Result<f64, String> {
        match (self, args) {
            (MathFn::Abs, [value]) => Ok(value.abs()),
            (MathFn::Floor, [value]) => Ok(value.floor()),
            (MathFn::Ceil, [value]) => Ok(value.ceil()),
            (MathFn::Round, [value]) => Ok(value.round()),
            (MathFn::Abs | MathFn::Floor | MathFn::Ceil | MathFn::Round, _) => {
                Err(format!("{self} takes exactly 1 argument, got {}", args.len()))
            }
            (MathFn::Min, [first, rest @ ..]) => Ok(rest.iter().fold(*first, |a, b| a.min(*b))),
            (MathFn::Max, [first, rest @ ..]) => Ok(rest.iter().fold(*first, |a, b| a.max(*b))),
            (MathFn::Min | MathFn::Max, []) => Err(format!("{self} needs at least 1 argument")),
        }
    }
}

/// Reduces `tokens` to one finite number.
///
/// Malformed input (unbalanced parentheses, misplaced operators or commas,
/// wrong function arity, division by zero) is a `MathError`. Well formed
/// pieces that simply cannot be combined, like two numbers side by side, are
/// an `UnresolvedExpression`.
pub fn fold(mut tokens: Vec<MathToken>) -> Result<f64, DiceError> {
    while let Some(close) = tokens.iter().position(|t| *t == MathToken::CloseParen) {
        let open = tokens[..close]
            .iter()
            .rposition(|t| t.opens_group())
            .ok_or_else(|| DiceError::math(render(&tokens), "unbalanced ')'"))?;

        let inner = &tokens[open + 1..close];
        let value = match tokens[open] {
            MathToken::Function(function) => {
                let args = inner
                    .split(|t| *t == MathToken::Comma)
                    .map(reduce_flat)
                    .collect::<Result<Vec<_>, _>>()?;
                function
                    .apply(&args)
                    .map_err(|reason| DiceError::math(render(&tokens[open..=close]), reason))?
            }
            _ => reduce_flat(inner)?,
        };
        trace!(group = %render(&tokens[open..=close]), value, "folded group");

        tokens[open] = MathToken::Number(value);
        tokens.drain(open + 1..=close);
    }

    if tokens.iter().any(|t| t.opens_group()) {
        return Err(DiceError::math(render(&tokens), "unbalanced '('"));
    }
    reduce_flat(&tokens)
}

/// Tokenizes `input` with the arithmetic parsers and folds it.
pub fn process_math(input: &str) -> Result<f64, DiceError> {
    let tokens = TokenParsers::math().tokenize(input, UnmatchedPolicy::Error)?;
    let math = tokens.iter().filter_map(MathToken::from_token).collect();
    fold(math)
}

/// Whether `input` is made only of arithmetic and holds at least one number
/// combined by an operator or function.
pub fn has_math(input: &str) -> bool {
    let Ok(tokens) = TokenParsers::math().tokenize(input, UnmatchedPolicy::Error) else {
        return false;
    };
    let has = |kinds: &[TokenKind]| tokens.iter().any(|t| kinds.contains(&t.key));

    has(&[TokenKind::Number]) && has(&[TokenKind::Operator, TokenKind::Function])
}

/// Reduces a group without parentheses.
fn reduce_flat(tokens: &[MathToken]) -> Result<f64, DiceError> {
    let expression = render(tokens);
    let mut items = normalize_signs(tokens, &expression)?;

    loop {
        match items.as_slice() {
            [] => return Err(DiceError::math(expression, "nothing to evaluate")),
            [MathToken::Number(value)] if value.is_finite() => return Ok(*value),
            [MathToken::Number(_)] => {
                return Err(DiceError::math(expression, "result is not a finite number"))
            }
            _ => {}
        }

        let next = find_binary(&items, true).or_else(|| find_binary(&items, false));
        let Some((i, lhs, op, rhs)) = next else {
            return Err(DiceError::UnresolvedExpression {
                remaining: render(&items),
            });
        };
        let value = op
            .apply(lhs, rhs)
            .map_err(|reason| DiceError::math(expression.as_str(), reason))?;

        items[i] = MathToken::Number(value);
        items.drain(i + 1..=i + 2);
    }
}

/// The leftmost `number op number` whose operator has the given precedence.
fn find_binary(items: &[MathToken], multiplicative: bool) -> Option<(usize, f64, Operator, f64)> {
    items.windows(3).enumerate().find_map(|(i, window)| match *window {
        [MathToken::Number(lhs), MathToken::Operator(op), MathToken::Number(rhs)]
            if op.is_multiplicative() == multiplicative =>
        {
            Some((i, lhs, op, rhs))
        }
        _ => None,
    })
}

/// Collapses runs of `+`/`-` into one sign, folds unary signs into the number
/// that follows them, then rejects operators and commas left out of place.
fn normalize_signs(tokens: &[MathToken], expression: &str) -> Result<Vec<MathToken>, DiceError> {
    let mut collapsed: Vec<MathToken> = Vec::with_capacity(tokens.len());
    for &token in tokens {
        let merged = match (collapsed.last(), token) {
            (Some(MathToken::Operator(last)), MathToken::Operator(op))
                if last.is_additive() && op.is_additive() =>
            {
                let negative = (*last == Operator::Sub) != (op == Operator::Sub);
                Some(if negative { Operator::Sub } else { Operator::Add })
            }
            _ => None,
        };

        match (merged, collapsed.last_mut()) {
            (Some(op), Some(last)) => *last = MathToken::Operator(op),
            _ => collapsed.push(token),
        }
    }

    let mut normalized: Vec<MathToken> = Vec::with_capacity(collapsed.len());
    let mut sign: Option<Operator> = None;
    for token in collapsed {
        let after_operator = matches!(normalized.last(), None | Some(MathToken::Operator(_)));

        match token {
            MathToken::Operator(op) if op.is_additive() && after_operator && sign.is_none() => {
                sign = Some(op);
            }
            MathToken::Number(value) => {
                let value = if sign.take() == Some(Operator::Sub) {
                    -value
                } else {
                    value
                };
                normalized.push(MathToken::Number(value));
            }
            MathToken::Operator(op) => {
                if sign.is_some() || after_operator {
                    return Err(DiceError::math(expression, format!("unexpected '{op}'")));
                }
                normalized.push(token);
            }
            MathToken::Comma => {
                return Err(DiceError::math(expression, "',' outside of a function call"))
            }
            MathToken::OpenParen | MathToken::Function(_) | MathToken::CloseParen => {
                return Err(DiceError::math(expression, "unbalanced parentheses"))
            }
        }
    }

    if sign.is_some() || matches!(normalized.last(), Some(MathToken::Operator(_))) {
        return Err(DiceError::math(expression, "expression ends with an operator"));
    }
    Ok(normalized)
}

fn render(tokens: &[MathToken]) -> String {
    let mut rendered = String::new();
    for (i, token) in tokens.iter().enumerate() {
        let tight = i == 0
            || tokens[i - 1].opens_group()
            || matches!(token, MathToken::CloseParen | MathToken::Comma);
        if !tight {
            rendered.push(' ');
        }
        rendered.push_str(&token.to_string());
    }
    rendered
}

impl std::fmt::Display for MathToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathToken::Number(value) => write!(f, "{value}"),
            MathToken::Operator(op) => write!(f, "{op}"),
            MathToken::OpenParen => write!(f, "("),
            MathToken::Function(function) => write!(f, "{function}("),
            MathToken::CloseParen => write!(f, ")"),
            MathToken::Comma => write!(f, ","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn math_error(input: &str) -> String {
        match process_math(input).unwrap_err() {
            DiceError::MathError { reason, .. } => reason,
            other => panic!("{input}: unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_precedence() {
        #[rustfmt::skip]
        let inputs = [
            ("1+2", 3.0),
            ("2+3*4", 14.0),
            ("2*3+4", 10.0),
            ("10-2-3", 5.0),
            ("8/2/2", 2.0),
            ("2 - 3 + 4", 3.0),
            ("7/2", 3.5),
            ("1.5*2", 3.0),
            ("6×2÷4", 3.0),
            ("42", 42.0),
        ];

        for (input, expected) in inputs {
            assert_eq!(process_math(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_parentheses_first() {
        assert_eq!(process_math("(2+3)*4").unwrap(), 20.0);
        assert_eq!(process_math("2*(3+(4-1))").unwrap(), 12.0);
        assert_eq!(process_math("((5))").unwrap(), 5.0);
        assert_eq!(process_math("-(2+3)*2").unwrap(), -10.0);
    }

    #[test]
    fn test_signs() {
        #[rustfmt::skip]
        let inputs = [
            ("--3", 3.0),
            ("-3", -3.0),
            ("+-+3", -3.0),
            ("2*-3", -6.0),
            ("2--3", 5.0),
            ("2+-3", -1.0),
            ("2 - - - 3", -1.0),
            ("-2*-2", 4.0),
            ("6/-2", -3.0),
        ];

        for (input, expected) in inputs {
            assert_eq!(process_math(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_functions() {
        #[rustfmt::skip]
        let inputs = [
            ("floor(7/2)", 3.0),
            ("ceil(7/2)", 4.0),
            ("round(2.5)", 3.0),
            ("abs(-4)", 4.0),
            ("min(3, 1, 2)", 1.0),
            ("max(3,1+4,2)", 5.0),
            ("MAX(1)", 1.0),
            ("2*floor(9/2)+1", 9.0),
            ("max(min(4,9),2)", 4.0),
        ];

        for (input, expected) in inputs {
            assert_eq!(process_math(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_math_errors() {
        assert_eq!(math_error("10/0"), "division by zero");
        assert_eq!(math_error("(1+2"), "unbalanced '('");
        assert_eq!(math_error("1+2)"), "unbalanced ')'");
        assert_eq!(math_error("2*"), "expression ends with an operator");
        assert_eq!(math_error("*2"), "unexpected '*'");
        assert_eq!(math_error("2*/3"), "unexpected '/'");
        assert_eq!(math_error("()"), "nothing to evaluate");
        assert_eq!(math_error("abs(1,2)"), "abs takes exactly 1 argument, got 2");
        assert_eq!(math_error("max()"), "nothing to evaluate");
        assert_eq!(math_error("(1,2)"), "',' outside of a function call");
    }

    #[test]
    fn test_unresolved() {
        assert_eq!(
            process_math("2 3").unwrap_err(),
            DiceError::UnresolvedExpression {
                remaining: "2 3".to_string()
            }
        );
        assert!(matches!(
            process_math("1 2+3"),
            Err(DiceError::UnresolvedExpression { .. })
        ));
    }

    #[test]
    fn test_process_math_rejects_non_math() {
        assert!(matches!(
            process_math("1d20+3"),
            Err(DiceError::LexicalError { position: 1, .. })
        ));
    }

    #[test]
    fn test_has_math() {
        assert!(has_math("1+2"));
        assert!(has_math("floor(3.5)"));
        assert!(!has_math("42"));
        assert!(!has_math("+"));
        assert!(!has_math("1d6+2"));
        assert!(!has_math("fire"));
    }

    #[test]
    fn test_fold_tokens() {
        let tokens = vec![
            MathToken::Function(MathFn::Max),
            MathToken::Number(2.0),
            MathToken::Comma,
            MathToken::Number(8.0),
            MathToken::CloseParen,
            MathToken::Operator(Operator::Div),
            MathToken::Number(4.0),
        ];
        assert_eq!(fold(tokens).unwrap(), 2.0);
    }
}

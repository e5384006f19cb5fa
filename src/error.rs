use thiserror::Error;

/// Everything that can go wrong while turning a notation string into a roll.
///
/// Each variant carries the offending text so the chat layer can point the
/// user at the part of the expression it could not handle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiceError {
    /// No token matcher accepted the input at `position`.
    #[error("unexpected {text:?} at position {position}")]
    LexicalError { position: usize, text: String },

    /// A dice term was recognised but its count, sides or modifiers are unusable.
    #[error("invalid dice expression {expression:?}: {reason}")]
    InvalidDiceExpression { expression: String, reason: String },

    /// Arithmetic failed: division by zero, a malformed operator sequence,
    /// unbalanced parentheses and the like.
    #[error("math error in {expression:?}: {reason}")]
    MathError { expression: String, reason: String },

    /// A reduction pass made no progress and left more than one term behind.
    #[error("could not resolve {remaining:?} to a single value")]
    UnresolvedExpression { remaining: String },
}

impl DiceError {
    pub(crate) fn invalid_dice(expression: &str, reason: impl Into<String>) -> Self {
        Self::InvalidDiceExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn math(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MathError {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    IoError(#[from] std::io::Error),

    #[error("toml parsing error: {0}")]
    TomlParsingError(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = DiceError::LexicalError {
            position: 4,
            text: "$".to_string(),
        };
        assert_eq!(err.to_string(), "unexpected \"$\" at position 4");

        let err = DiceError::invalid_dice("0d6", "count must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid dice expression \"0d6\": count must be at least 1"
        );

        let err = DiceError::math("10 / 0", "division by zero");
        assert_eq!(err.to_string(), "math error in \"10 / 0\": division by zero");
    }
}

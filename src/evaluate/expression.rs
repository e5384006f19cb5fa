use tracing::debug;

use super::math::{self, MathToken};
use super::roll::DicePartRoll;
use crate::config::RollConfig;
use crate::error::DiceError;
use crate::parse::{ComparePoint, DicePart, TokenKind, TokenParsers};
use crate::random::RandomSource;
use crate::text::{bracketed_segments, is_secret, strip_brackets, unquote};

/// One term of an evaluated expression, in the order it was written.
#[derive(Debug, Clone, PartialEq)]
pub enum RolledTerm {
    Dice(DicePartRoll),
    Math(MathToken),
}

impl RolledTerm {
    /// The term as arithmetic, dice terms become their total.
    pub fn math_token(&self) -> MathToken {
        match self {
            RolledTerm::Dice(rolled) => MathToken::Number(rolled.total() as f64),
            RolledTerm::Math(token) => *token,
        }
    }
}

/// Outcome of the comparison written after an expression, e.g. `vs 15`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiceTestData {
    pub(crate) compare: ComparePoint,
    pub(crate) success: bool,
}

impl DiceTestData {
    pub fn compare(&self) -> ComparePoint {
        self.compare
    }
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// A fully evaluated dice expression such as `[4d6dl1 + 2 vs 12 "Strength"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DiceRoll {
    pub(crate) input: String,
    pub(crate) terms: Vec<RolledTerm>,
    pub(crate) total: f64,
    pub(crate) test: Option<DiceTestData>,
    pub(crate) description: String,
    pub(crate) secret: bool,
}

impl DiceRoll {
    /// Tokenizes, rolls and folds one expression. Surrounding brackets are
    /// optional. Quoted text and free words become the description, which
    /// also decides whether the roll is secret.
    pub fn evaluate(
        input: &str,
        source: &mut impl RandomSource,
        config: &RollConfig,
    ) -> Result<Self, DiceError> {
        let expression = strip_brackets(input);
        let tokens = TokenParsers::dice().tokenize(expression, config.unmatched)?;

        let mut terms = Vec::new();
        let mut words: Vec<&str> = Vec::new();
        let mut compare: Option<ComparePoint> = None;

        for token in &tokens {
            match token.key {
                TokenKind::Dice => {
                    let dice = DicePart::parse(&token.token)?;
                    terms.push(RolledTerm::Dice(dice.roll_with(source, config.explode_cap)));
                }
                TokenKind::Test => {
                    let parsed = ComparePoint::parse(&token.token).ok_or_else(|| {
                        DiceError::invalid_dice(&token.token, "unreadable comparison")
                    })?;
                    if compare.replace(parsed).is_some() {
                        return Err(DiceError::invalid_dice(
                            expression,
                            "only one comparison is allowed",
                        ));
                    }
                }
                TokenKind::Quotes => words.push(unquote(&token.token)),
                TokenKind::Description | TokenKind::Unknown => words.push(&token.token),
                TokenKind::Whitespace => {}
                _ => match MathToken::from_token(token) {
                    Some(math) => terms.push(RolledTerm::Math(math)),
                    None => {
                        return Err(DiceError::LexicalError {
                            position: token.position,
                            text: token.token.clone(),
                        })
                    }
                },
            }
        }

        let has_value = terms.iter().any(|term| {
            matches!(
                term,
                RolledTerm::Dice(_) | RolledTerm::Math(MathToken::Number(_))
            )
        });
        if !has_value {
            return Err(DiceError::UnresolvedExpression {
                remaining: expression.to_string(),
            });
        }

        // Adding 0.0 turns a -0 total into 0
        let total = math::fold(terms.iter().map(RolledTerm::math_token).collect())? + 0.0;
        let test = compare.map(|compare| DiceTestData {
            compare,
            success: compare.passes(total),
        });
        let description = words.join(" ");
        let secret = is_secret(&description);

        debug!(input = expression, total, secret, "evaluated dice expression");
        Ok(Self {
            input: expression.to_string(),
            terms,
            total,
            test,
            description,
            secret,
        })
    }

    /// The expression as evaluated, without surrounding brackets.
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn terms(&self) -> &[RolledTerm] {
        &self.terms
    }

    /// Every dice term, in the order written.
    pub fn parts(&self) -> impl Iterator<Item = &DicePartRoll> {
        self.terms.iter().filter_map(|term| match term {
            RolledTerm::Dice(rolled) => Some(rolled),
            RolledTerm::Math(_) => None,
        })
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn test(&self) -> Option<&DiceTestData> {
        self.test.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }
}

/// Evaluates every `[...]` block of a chat message, or the whole message when
/// it has none.
pub fn roll_message(
    message: &str,
    source: &mut impl RandomSource,
    config: &RollConfig,
) -> Result<Vec<DiceRoll>, DiceError> {
    let segments = bracketed_segments(message);
    if segments.is_empty() {
        return Ok(vec![DiceRoll::evaluate(message, source, config)?]);
    }

    segments
        .into_iter()
        .map(|segment| DiceRoll::evaluate(segment, source, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnmatchedPolicy;
    use crate::random::ScriptedRolls;

    fn evaluate(input: &str, scripted: &[i64]) -> Result<DiceRoll, DiceError> {
        DiceRoll::evaluate(
            input,
            &mut ScriptedRolls::new(scripted.to_vec()),
            &RollConfig::default(),
        )
    }

    #[test]
    fn test_dice_and_math() {
        let rolled = evaluate("4d6dl1 + 2", &[2, 5, 6, 3]).unwrap();
        assert_eq!(rolled.total(), 16.0);
        assert_eq!(rolled.parts().count(), 1);
        assert_eq!(rolled.terms().len(), 3);
        assert!(rolled.test().is_none());
        assert_eq!(rolled.description(), "");
    }

    #[test]
    fn test_precedence_with_dice() {
        let rolled = evaluate("2 + 1d6 * 3", &[4]).unwrap();
        assert_eq!(rolled.total(), 14.0);

        let rolled = evaluate("(2 + 1d6) * 3", &[4]).unwrap();
        assert_eq!(rolled.total(), 18.0);
    }

    #[test]
    fn test_brackets_are_optional() {
        let bracketed = evaluate("[1d20 + 3]", &[10]).unwrap();
        let bare = evaluate("1d20 + 3", &[10]).unwrap();
        assert_eq!(bracketed, bare);
        assert_eq!(bracketed.input(), "1d20 + 3");
    }

    #[test]
    fn test_comparison() {
        let rolled = evaluate("1d20+5 vs 15", &[10]).unwrap();
        let test = rolled.test().unwrap();
        assert_eq!(test.compare(), ComparePoint::Versus(15.0));
        assert!(test.is_success());

        let rolled = evaluate("1d20+5 vs 15", &[9]).unwrap();
        assert!(!rolled.test().unwrap().is_success());

        let rolled = evaluate("1d20 lt 5", &[4]).unwrap();
        assert!(rolled.test().unwrap().is_success());
    }

    #[test]
    fn test_second_comparison_is_rejected() {
        assert!(matches!(
            evaluate("1d20 vs 10 vs 12", &[10]),
            Err(DiceError::InvalidDiceExpression { .. })
        ));
    }

    #[test]
    fn test_description_and_quotes() {
        let rolled = evaluate("1d8+2 slashing \"longsword, +1\"", &[3]).unwrap();
        assert_eq!(rolled.total(), 5.0);
        assert_eq!(rolled.description(), "slashing longsword, +1");
        assert!(!rolled.is_secret());
    }

    #[test]
    fn test_secret_flag() {
        assert!(evaluate("1d20 Secret stealth", &[5]).unwrap().is_secret());
        assert!(evaluate("1d20 \"a secret check\"", &[5]).unwrap().is_secret());
        assert!(!evaluate("1d20 secretive", &[5]).unwrap().is_secret());
    }

    #[test]
    fn test_malformed_modifiers_are_rejected() {
        for input in ["4d6kh", "4d6q", "4d6dl1kh", "2d6x3y", "1d20 + 4d6kh vs 10"] {
            assert!(
                matches!(
                    evaluate(input, &[2, 5, 6, 3]),
                    Err(DiceError::InvalidDiceExpression { .. })
                ),
                "{input}"
            );
        }
    }

    #[test]
    fn test_single_quoted_description() {
        let rolled = evaluate("1d20 'Stealth'", &[7]).unwrap();
        assert_eq!(rolled.description(), "Stealth");

        let rolled = evaluate("1d20 ‘Stealth check’", &[7]).unwrap();
        assert_eq!(rolled.description(), "Stealth check");
    }

    #[test]
    fn test_negative_zero_total() {
        let rolled = evaluate("0 * -1", &[]).unwrap();
        assert!(rolled.total().is_sign_positive());
    }

    #[test]
    fn test_invalid_dice_propagates() {
        assert!(matches!(
            evaluate("4d6dl4", &[]),
            Err(DiceError::InvalidDiceExpression { .. })
        ));
    }

    #[test]
    fn test_no_value_is_unresolved() {
        assert!(matches!(
            evaluate("fireball", &[]),
            Err(DiceError::UnresolvedExpression { .. })
        ));
        assert!(matches!(
            evaluate("1d6 1d6", &[1, 2]),
            Err(DiceError::UnresolvedExpression { .. })
        ));
    }

    #[test]
    fn test_unmatched_policy() {
        assert!(matches!(
            evaluate("1d6 $", &[3]),
            Err(DiceError::LexicalError { position: 4, .. })
        ));

        let config = RollConfig {
            unmatched: UnmatchedPolicy::Literal,
            ..RollConfig::default()
        };
        let rolled =
            DiceRoll::evaluate("1d6 $$ gold", &mut ScriptedRolls::new([3]), &config).unwrap();
        assert_eq!(rolled.total(), 3.0);
        assert_eq!(rolled.description(), "$$ gold");
    }

    #[test]
    fn test_math_errors_propagate() {
        assert!(matches!(
            evaluate("1d6 / 0", &[3]),
            Err(DiceError::MathError { .. })
        ));
        assert!(matches!(
            evaluate("(1d6 + 2", &[3]),
            Err(DiceError::MathError { .. })
        ));
    }

    #[test]
    fn test_roll_message_segments() {
        let mut source = ScriptedRolls::new([4, 6]);
        let rolls = roll_message(
            "I attack [1d20+2 \"hit\"] and then [1d6 damage]",
            &mut source,
            &RollConfig::default(),
        )
        .unwrap();

        assert_eq!(rolls.len(), 2);
        assert_eq!(rolls[0].total(), 6.0);
        assert_eq!(rolls[0].description(), "hit");
        assert_eq!(rolls[1].total(), 6.0);
        assert_eq!(rolls[1].description(), "damage");
    }

    #[test]
    fn test_roll_message_without_brackets() {
        let rolls = roll_message("2d4", &mut ScriptedRolls::new([1, 4]), &RollConfig::default())
            .unwrap();
        assert_eq!(rolls.len(), 1);
        assert_eq!(rolls[0].total(), 5.0);
    }
}

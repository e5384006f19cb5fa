//! Evaluate chat dice expressions: dice terms with drop, keep, explode and
//! threshold modifiers, combined with arithmetic, an optional comparison and
//! a free-text description.
//!
//! ```rust
//! # use rpg_sage_dice::{roll, roll_with, Channel, DicePart, Modifier, KeepKind, ScriptedRolls};
//! # use rand::rngs::StdRng;
//! # use rand::SeedableRng;
//! #
//! # fn main() -> Result<(), rpg_sage_dice::DiceError> {
//! // Roll 4 d6 dropping the lowest, add 2 and test against 12.
//! let rolled = roll("[4d6dl1 + 2 vs 12 Strength]")?;
//! println!("{}", rolled.output(Channel::Public)); // `15` ⟵ [~~2~~, 5, 4, 4] 4d6dl1 + 2 vs 12 **Success** Strength
//!
//! // Use a custom Rng that implements the rand::Rng trait
//! let mut rng = StdRng::seed_from_u64(1);
//! let rolled = roll_with("3d200", &mut rng)?;
//! println!("{}", rolled.total());
//!
//! // Replay known values
//! let rolled = roll_with("2d6x", &mut ScriptedRolls::new([6, 3, 2]))?;
//! assert_eq!(rolled.total(), 11.0);
//!
//! // Create dice terms directly without parsing
//! let dice = DicePart::new(4, 6, &[Modifier::Drop(KeepKind::Lowest, 1)])?;
//! let rolled = dice.roll();
//! println!("{rolled} = {}", rolled.total()); // [~~1~~, 3, 6, 5] 4d6dl1 = 14
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
mod evaluate;
mod parse;
pub mod random;
pub mod text;

pub use config::{RollConfig, UnmatchedPolicy, DEFAULT_EXPLODE_CAP};
pub use error::{ConfigError, DiceError};
pub use evaluate::expression::{DiceRoll, DiceTestData, RolledTerm};
pub use evaluate::math::{fold, has_math, process_math, MathToken};
pub use evaluate::output::Channel;
pub use evaluate::roll::{DicePartRoll, RollData, RollFlag};
pub use parse::{
    ComparePoint, DicePart, DropKeep, KeepKind, MathFn, Modifier, Operator, Token,
    TokenKind, TokenParsers,
};
pub use random::{random_int, RandomSource, ScriptedRolls};

/// Splits a dice expression into tokens, failing on characters no matcher accepts.
pub fn tokenize(input: &str) -> Result<Vec<Token>, DiceError> {
    parse::tokenize(input)
}

/// Evaluates one expression with `rand::thread_rng()` and the default configuration.
pub fn roll(input: &str) -> Result<DiceRoll, DiceError> {
    DiceRoll::evaluate(input, &mut rand::thread_rng(), &RollConfig::default())
}

/// Same as `roll()` but allows you to choose the random source.
pub fn roll_with(input: &str, source: &mut impl RandomSource) -> Result<DiceRoll, DiceError> {
    DiceRoll::evaluate(input, source, &RollConfig::default())
}

/// Same as `roll_with()` with an explicit configuration.
pub fn roll_with_config(
    input: &str,
    source: &mut impl RandomSource,
    config: &RollConfig,
) -> Result<DiceRoll, DiceError> {
    DiceRoll::evaluate(input, source, config)
}

/// Evaluates every `[...]` dice block of a chat message, or the whole
/// message when it has none.
pub fn roll_message(
    message: &str,
    source: &mut impl RandomSource,
    config: &RollConfig,
) -> Result<Vec<DiceRoll>, DiceError> {
    evaluate::expression::roll_message(message, source, config)
}

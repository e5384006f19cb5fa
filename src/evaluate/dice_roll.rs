use rand::thread_rng;
use tracing::{debug, warn};

use super::roll::{DicePartRoll, RollData, RollFlag};
use crate::config::DEFAULT_EXPLODE_CAP;
use crate::parse::{DicePart, KeepKind};
use crate::random::{random_int, RandomSource};

impl DicePart {
    /// Rolls the term with `rand::thread_rng()` and the default explosion cap.
    /// Use `roll_with()` to pick the random source and cap yourself.
    pub fn roll(&self) -> DicePartRoll {
        self.roll_with(&mut thread_rng(), DEFAULT_EXPLODE_CAP)
    }

    /// Rolls every die then applies, in order: drop and keep rules, explosions
    /// (at most `explode_cap` bonus dice) and threshold marks.
    pub fn roll_with(&self, source: &mut impl RandomSource, explode_cap: usize) -> DicePartRoll {
        let mut rolls: Vec<RollData> = (0..self.count as usize)
            .map(|index| self.roll_die(index, source))
            .collect();

        if let Some((kind, amount)) = self.drop_keep.drop {
            apply_drop(&mut rolls, kind, amount);
        }
        if let Some((kind, amount)) = self.drop_keep.keep {
            apply_keep(&mut rolls, kind, amount);
        }
        if let Some(value) = self.drop_keep.explode {
            apply_explode(self, &mut rolls, source, value, explode_cap);
        }
        if let Some(value) = self.drop_keep.threshold {
            apply_threshold(&mut rolls, value);
        }

        let rolled = DicePartRoll::new(self.clone(), rolls);
        debug!(dice = %self, total = rolled.total(), dice_rolled = rolled.rolls.len(), "rolled dice term");
        rolled
    }

    fn roll_die(&self, index: usize, source: &mut impl RandomSource) -> RollData {
        let sides = i64::from(self.sides);
        let mut die = RollData::new(index, random_int(source, 1, sides));

        if sides == 1 {
            die.set_flag(RollFlag::Fixed);
        } else if die.roll == 1 {
            die.set_flag(RollFlag::Min);
        } else if die.roll == sides {
            die.set_flag(RollFlag::Max);
        }
        die
    }
}

/// Indices of the dice still in play, lowest first (ties by roll order) or the
/// exact reverse for highest. Keeping both orders mirror images makes
/// drop-lowest(k) and keep-highest(n - k) pick the same dice.
fn ranked(rolls: &[RollData], kind: KeepKind) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..rolls.len())
        .filter(|&i| !rolls[i].is_dropped())
        .collect();
    indices.sort_by_key(|&i| (rolls[i].roll, rolls[i].index));

    if kind == KeepKind::Highest {
        indices.reverse();
    }
    indices
}

fn apply_drop(rolls: &mut [RollData], kind: KeepKind, amount: u32) {
    for i in ranked(rolls, kind).into_iter().take(amount as usize) {
        rolls[i].set_flag(RollFlag::Dropped);
    }
}

fn apply_keep(rolls: &mut [RollData], kind: KeepKind, amount: u32) {
    for i in ranked(rolls, kind).into_iter().skip(amount as usize) {
        rolls[i].set_flag(RollFlag::Dropped);
    }
}

fn apply_explode(
    dice: &DicePart,
    rolls: &mut Vec<RollData>,
    source: &mut impl RandomSource,
    value: u32,
    explode_cap: usize,
) {
    let value = i64::from(value);
    let mut bonus_dice = 0;
    let mut i = 0;

    // Bonus dice are appended, so they get checked (and can explode) in turn.
    while i < rolls.len() {
        if !rolls[i].is_dropped() && rolls[i].roll == value {
            if bonus_dice >= explode_cap {
                warn!(dice = %dice, explode_cap, "explosion cap reached, keeping dice rolled so far");
                break;
            }

            let mut bonus = dice.roll_die(rolls.len(), source);
            bonus.set_flag(RollFlag::Exploded);
            rolls.push(bonus);
            bonus_dice += 1;
        }
        i += 1;
    }
}

fn apply_threshold(rolls: &mut [RollData], value: u32) {
    let value = i64::from(value);

    for roll in rolls.iter_mut().filter(|r| !r.is_dropped()) {
        if roll.roll > value {
            roll.set_flag(RollFlag::AboveThreshold);
        } else if roll.roll < value {
            roll.set_flag(RollFlag::BelowThreshold);
        }
    }
}

use std::collections::VecDeque;

use rand::Rng;

/// Uniform integer generator the dice evaluator draws from.
///
/// Implementors only ever see non-degenerate ranges (`min < max`); use
/// [`random_int`] to draw, it handles the degenerate case itself.
pub trait RandomSource {
    fn gen_range_inclusive(&mut self, min: i64, max: i64) -> i64;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn gen_range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        self.gen_range(min..=max)
    }
}

/// Draws a uniformly distributed integer from `[min, max]`.
/// Returns `min` without touching the source when the range holds a single value.
pub fn random_int(source: &mut (impl RandomSource + ?Sized), min: i64, max: i64) -> i64 {
    let (min, max) = if min > max { (max, min) } else { (min, max) };
    if min == max {
        return min;
    }
    source.gen_range_inclusive(min, max)
}

/// Replays a fixed list of values, useful for tests and for replaying a roll.
///
/// Values outside the requested range are clamped into it. Once the list runs
/// out every draw returns the range minimum.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    values: VecDeque<i64>,
    calls: usize,
}

impl ScriptedRolls {
    pub fn new(values: impl IntoIterator<Item = i64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            calls: 0,
        }
    }

    /// How many times the evaluator asked for a value.
    pub fn calls(&self) -> usize {
        self.calls
    }

    #[cfg(test)]
    pub(crate) fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedRolls {
    fn gen_range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        self.calls += 1;
        self.values
            .pop_front()
            .map_or(min, |value| value.clamp(min, max))
    }
}

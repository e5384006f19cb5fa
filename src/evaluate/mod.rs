mod dice_roll;
pub mod expression;
pub mod math;
pub mod output;
pub mod roll;

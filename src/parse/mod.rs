mod dice;
mod expression;
mod tokenize;

pub use tokenize::*;

/// Static configuration of one dice term, e.g. `10d6dl3x6kh5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DicePart {
    pub(crate) count: u32,
    pub(crate) sides: u32,
    pub(crate) drop_keep: DropKeep,
}

/// Manipulation rules of a dice term.
///
/// At most one drop rule and one keep rule can be active; when both are the
/// drop rule runs first and the keep rule picks among the survivors.
/// Explosion and threshold are independent of both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropKeep {
    pub drop: Option<(KeepKind, u32)>,
    pub keep: Option<(KeepKind, u32)>,
    /// Face value that adds a bonus die.
    pub explode: Option<u32>,
    /// Boundary used to mark rolls above or below it.
    pub threshold: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepKind {
    Highest,
    Lowest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Modifiers are special optional notations placed after a die.
///
/// Repeating a drop or keep rule is an error, for explode and threshold the
/// last one written is the one that applies.
pub enum Modifier {
    /// `d{amount}`, `dh{amount}` or `dl{amount}`\
    /// Drops `{amount}` of lowest or highest rolls.
    /// (Defaults to drop lowest).
    Drop(KeepKind, u32),
    /// `k{amount}`, `kh{amount}` or `kl{amount}`\
    /// Drops every roll except the highest or lowest `{amount}`.
    /// (Defaults to keep highest).
    Keep(KeepKind, u32),
    /// `x` or `x{value}`\
    /// Every roll showing `{value}` (the highest face if not specified) adds another die.
    /// Bonus dice can explode again.
    Explode(Option<u32>),
    /// `t{value}`\
    /// Purely cosmetic, marks rolls above `{value}` with `⁺` and below it with `⁻`.
    Threshold(u32),
}

/// Comparison of a whole roll's total against a target, e.g. `vs 15`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComparePoint {
    /// vs, succeeds on meeting or beating the target
    Versus(f64),
    /// = or eq
    Equal(f64),
    /// \> or gt
    GreaterThan(f64),
    /// \>= or gteq
    GreaterThanOrEqual(f64),
    /// < or lt
    LessThan(f64),
    /// <= or lteq
    LessThanOrEqual(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathFn {
    Abs,
    Floor,
    Ceil,
    Round,
    Min,
    Max,
}

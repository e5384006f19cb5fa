use winnow::{
    ascii::{dec_int, multispace0},
    combinator::{alt, cut_err, opt, preceded},
    PResult, Parser,
};

use super::{ComparePoint, MathFn, Operator};

impl ComparePoint {
    /// Parses the text of a test token such as `vs 15`, `gteq DC 12` or `<=3`.
    pub fn parse(input: &str) -> Option<Self> {
        let lowered = input.trim().to_ascii_lowercase();
        compare_point.parse(lowered.as_str()).ok()
    }

    pub fn target(self) -> f64 {
        match self {
            ComparePoint::Versus(n)
            | ComparePoint::Equal(n)
            | ComparePoint::GreaterThan(n)
            | ComparePoint::GreaterThanOrEqual(n)
            | ComparePoint::LessThan(n)
            | ComparePoint::LessThanOrEqual(n) => n,
        }
    }

    /// Whether `value` satisfies the comparison.
    pub fn passes(self, value: f64) -> bool {
        match self {
            ComparePoint::Versus(n) | ComparePoint::GreaterThanOrEqual(n) => value >= n,
            ComparePoint::Equal(n) => value == n,
            ComparePoint::GreaterThan(n) => value > n,
            ComparePoint::LessThan(n) => value < n,
            ComparePoint::LessThanOrEqual(n) => value <= n,
        }
    }
}

type Comparison = fn(f64) -> ComparePoint;

fn compare_point(input: &mut &str) -> PResult<ComparePoint> {
    let kind = alt((
        "vs".value(ComparePoint::Versus as Comparison),
        "gteq".value(ComparePoint::GreaterThanOrEqual as Comparison),
        "gte".value(ComparePoint::GreaterThanOrEqual as Comparison),
        "gt".value(ComparePoint::GreaterThan as Comparison),
        "lteq".value(ComparePoint::LessThanOrEqual as Comparison),
        "lte".value(ComparePoint::LessThanOrEqual as Comparison),
        "lt".value(ComparePoint::LessThan as Comparison),
        "eq".value(ComparePoint::Equal as Comparison),
        ">=".value(ComparePoint::GreaterThanOrEqual as Comparison),
        "<=".value(ComparePoint::LessThanOrEqual as Comparison),
        '='.value(ComparePoint::Equal as Comparison),
        '>'.value(ComparePoint::GreaterThan as Comparison),
        '<'.value(ComparePoint::LessThan as Comparison),
    ))
    .parse_next(input)?;

    let target: i32 = preceded(
        (multispace0, opt(("dc", multispace0))),
        cut_err(dec_int),
    )
    .parse_next(input)?;

    Ok(kind(f64::from(target)))
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Sub),
            "*" | "×" => Some(Operator::Mul),
            "/" | "÷" => Some(Operator::Div),
            _ => None,
        }
    }

    /// `*` and `/` bind tighter than `+` and `-`.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, Operator::Mul | Operator::Div)
    }
}

impl MathFn {
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        math_fn_name.parse(lowered.as_str()).ok()
    }
}

fn math_fn_name(input: &mut &str) -> PResult<MathFn> {
    alt((
        "abs".value(MathFn::Abs),
        "floor".value(MathFn::Floor),
        "ceil".value(MathFn::Ceil),
        "round".value(MathFn::Round),
        "min".value(MathFn::Min),
        "max".value(MathFn::Max),
    ))
    .parse_next(input)
}

impl std::fmt::Display for ComparePoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComparePoint::Versus(val) => write!(f, "vs {val}"),
            ComparePoint::Equal(val) => write!(f, "= {val}"),
            ComparePoint::GreaterThan(val) => write!(f, "> {val}"),
            ComparePoint::GreaterThanOrEqual(val) => write!(f, ">= {val}"),
            ComparePoint::LessThan(val) => write!(f, "< {val}"),
            ComparePoint::LessThanOrEqual(val) => write!(f, "<= {val}"),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
        };
        write!(f, "{str}")
    }
}

impl std::fmt::Display for MathFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            MathFn::Abs => "abs",
            MathFn::Floor => "floor",
            MathFn::Ceil => "ceil",
            MathFn::Round => "round",
            MathFn::Min => "min",
            MathFn::Max => "max",
        };
        write!(f, "{str}")
    }
}

use winnow::{
    ascii::dec_uint,
    combinator::{alt, cut_err, opt, preceded, repeat},
    error::{
        StrContext::{Expected, Label},
        StrContextValue::{CharLiteral, Description},
    },
    PResult, Parser,
};

use super::{DicePart, DropKeep, KeepKind, Modifier};
use crate::error::DiceError;

impl Modifier {
    pub fn join_all(modifiers: &[Modifier]) -> String {
        modifiers
            .iter()
            .map(|m| m.to_string())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl DicePart {
    /// Creates a dice term, rejecting counts or sides of zero and drop/keep
    /// rules that conflict or cannot be satisfied.
    pub fn new(count: u32, sides: u32, modifiers: &[Modifier]) -> Result<Self, DiceError> {
        let notation = format!("{count}d{sides}{}", Modifier::join_all(modifiers));
        let invalid = |reason: String| DiceError::invalid_dice(&notation, reason);

        if count == 0 {
            return Err(invalid("dice count must be at least 1".to_string()));
        }
        if sides == 0 {
            return Err(invalid("dice must have at least 1 side".to_string()));
        }

        let mut drop_keep = DropKeep::default();
        for modifier in modifiers {
            match *modifier {
                Modifier::Drop(kind, amount) => {
                    if drop_keep.drop.replace((kind, amount)).is_some() {
                        return Err(invalid("only one drop rule is allowed".to_string()));
                    }
                }
                Modifier::Keep(kind, amount) => {
                    if drop_keep.keep.replace((kind, amount)).is_some() {
                        return Err(invalid("only one keep rule is allowed".to_string()));
                    }
                }
                Modifier::Explode(value) => drop_keep.explode = Some(value.unwrap_or(sides)),
                Modifier::Threshold(value) => drop_keep.threshold = Some(value),
            }
        }

        let mut remaining = count;
        if let Some((_, amount)) = drop_keep.drop {
            if amount == 0 || amount >= count {
                return Err(invalid(format!("cannot drop {amount} of {count} dice")));
            }
            remaining -= amount;
        }
        if let Some((_, amount)) = drop_keep.keep {
            if amount == 0 || amount > remaining {
                return Err(invalid(format!("cannot keep {amount} of {remaining} dice")));
            }
        }
        if let Some(value) = drop_keep.explode {
            if value == 0 || value > sides {
                return Err(invalid(format!("a d{sides} can never explode on {value}")));
            }
        }

        Ok(Self {
            count,
            sides,
            drop_keep,
        })
    }

    /// Parses dice notation such as `4d6dl1` or `d20x`. Case-insensitive.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let lowered = notation.trim().to_ascii_lowercase();
        let (count, sides, modifiers) = dice
            .parse(lowered.as_str())
            .map_err(|e| DiceError::invalid_dice(notation, e.to_string()))?;

        Self::new(count.unwrap_or(1), sides, &modifiers)
    }

    pub fn count(&self) -> u32 {
        self.count
    }
    pub fn sides(&self) -> u32 {
        self.sides
    }
    pub fn drop_keep(&self) -> DropKeep {
        self.drop_keep
    }
}

fn dice(input: &mut &str) -> PResult<(Option<u32>, u32, Vec<Modifier>)> {
    (
        opt(dec_uint).context(Label("dice count")),
        preceded(
            'd'.context(Expected(CharLiteral('d'))),
            cut_err(dec_uint)
                .context(Label("dice sides"))
                .context(Expected(Description("number of sides"))),
        ),
        repeat(0.., modifier),
    )
        .context(Label("Dice"))
        .parse_next(input)
}

fn modifier(input: &mut &str) -> PResult<Modifier> {
    alt((
        preceded("dl", cut_err(dec_uint)).map(|n| Modifier::Drop(KeepKind::Lowest, n)),
        preceded("dh", cut_err(dec_uint)).map(|n| Modifier::Drop(KeepKind::Highest, n)),
        preceded('d', cut_err(dec_uint)).map(|n| Modifier::Drop(KeepKind::Lowest, n)),
        preceded("kl", cut_err(dec_uint)).map(|n| Modifier::Keep(KeepKind::Lowest, n)),
        preceded("kh", cut_err(dec_uint)).map(|n| Modifier::Keep(KeepKind::Highest, n)),
        preceded('k', cut_err(dec_uint)).map(|n| Modifier::Keep(KeepKind::Highest, n)),
        preceded('x', opt(dec_uint)).map(Modifier::Explode),
        preceded('t', cut_err(dec_uint)).map(Modifier::Threshold),
    ))
    .context(Label("modifier"))
    .parse_next(input)
}

impl std::fmt::Display for DicePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d{}", self.count, self.sides)?;

        let DropKeep {
            drop,
            keep,
            explode,
            threshold,
        } = self.drop_keep;
        if let Some((kind, amount)) = drop {
            write!(f, "{}", Modifier::Drop(kind, amount))?;
        }
        if let Some((kind, amount)) = keep {
            write!(f, "{}", Modifier::Keep(kind, amount))?;
        }
        if let Some(value) = explode {
            write!(f, "{}", Modifier::Explode(Some(value)))?;
        }
        if let Some(value) = threshold {
            write!(f, "{}", Modifier::Threshold(value))?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::Drop(kind, amount) => write!(f, "d{kind}{amount}"),
            Modifier::Keep(kind, amount) => write!(f, "k{kind}{amount}"),
            Modifier::Explode(Some(value)) => write!(f, "x{value}"),
            Modifier::Explode(None) => write!(f, "x"),
            Modifier::Threshold(value) => write!(f, "t{value}"),
        }
    }
}

impl std::fmt::Display for KeepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Always show the letter because it changes which one can be omitted
        // depending on if it's Drop or Keep
        let str = match self {
            KeepKind::Highest => "h",
            KeepKind::Lowest => "l",
        };

        write!(f, "{str}")
    }
}

#[cfg(test)]
mod tests {
    use winnow::Parser;

    use super::*;

    fn drop_keep(notation: &str) -> DropKeep {
        DicePart::parse(notation).unwrap().drop_keep()
    }

    fn reason(notation: &str) -> String {
        match DicePart::parse(notation).unwrap_err() {
            DiceError::InvalidDiceExpression { reason, .. } => reason,
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_one_standard_d6() {
        let dice = DicePart::parse("1d6").unwrap();
        assert_eq!(dice.count(), 1);
        assert_eq!(dice.sides(), 6);
        assert_eq!(dice.drop_keep(), DropKeep::default());
    }

    #[test]
    fn test_one_standard_d6_without_count() {
        let dice = DicePart::parse("d6").unwrap();
        assert_eq!(dice.count(), 1);
        assert_eq!(dice.sides(), 6);
    }

    #[test]
    fn test_uppercase_notation() {
        let dice = DicePart::parse("4D6DL1").unwrap();
        assert_eq!(dice.count(), 4);
        assert_eq!(dice.drop_keep().drop, Some((KeepKind::Lowest, 1)));
    }

    #[test]
    fn test_drop_and_keep_together() {
        let dk = drop_keep("10d6dl3x6kh5");
        assert_eq!(dk.drop, Some((KeepKind::Lowest, 3)));
        assert_eq!(dk.keep, Some((KeepKind::Highest, 5)));
        assert_eq!(dk.explode, Some(6));
        assert_eq!(dk.threshold, None);
    }

    #[test]
    fn test_default_kinds() {
        assert_eq!(drop_keep("4d6d1").drop, Some((KeepKind::Lowest, 1)));
        assert_eq!(drop_keep("4d6k3").keep, Some((KeepKind::Highest, 3)));
        assert_eq!(drop_keep("4d6dh1").drop, Some((KeepKind::Highest, 1)));
        assert_eq!(drop_keep("4d6kl1").keep, Some((KeepKind::Lowest, 1)));
    }

    #[test]
    fn test_explode_defaults_to_max_face() {
        assert_eq!(drop_keep("3d8x").explode, Some(8));
        assert_eq!(drop_keep("3d8x1").explode, Some(1));
    }

    #[test]
    fn test_last_explode_and_threshold_apply() {
        let dk = drop_keep("3d8x7x8t2t5");
        assert_eq!(dk.explode, Some(8));
        assert_eq!(dk.threshold, Some(5));
    }

    #[test]
    fn test_zero_count_and_sides() {
        assert_eq!(reason("0d6"), "dice count must be at least 1");
        assert_eq!(reason("2d0"), "dice must have at least 1 side");
    }

    #[test]
    fn test_conflicting_rules() {
        assert_eq!(reason("4d6dl1dh1"), "only one drop rule is allowed");
        assert_eq!(reason("4d6kh3k2"), "only one keep rule is allowed");
    }

    #[test]
    fn test_impossible_amounts() {
        assert_eq!(reason("4d6dl4"), "cannot drop 4 of 4 dice");
        assert_eq!(reason("4d6dl0"), "cannot drop 0 of 4 dice");
        assert_eq!(reason("4d6kh5"), "cannot keep 5 of 4 dice");
        assert_eq!(reason("4d6dl2kh3"), "cannot keep 3 of 2 dice");
        assert_eq!(reason("4d6x7"), "a d6 can never explode on 7");
    }

    #[test]
    fn test_malformed_notation() {
        assert!(DicePart::parse("4d").is_err());
        assert!(DicePart::parse("4x6").is_err());
        assert!(DicePart::parse("4d6kh").is_err());
        assert!(DicePart::parse("4d6q").is_err());
    }

    #[test]
    fn test_display_normalizes() {
        assert_eq!(DicePart::parse("d6").unwrap().to_string(), "1d6");
        assert_eq!(
            DicePart::parse("10d6kh5x6dl3t4").unwrap().to_string(),
            "10d6dl3kh5x6t4"
        );
        assert_eq!(DicePart::parse("2d10x").unwrap().to_string(), "2d10x10");
    }

    #[test]
    fn test_modifier_parsing() {
        #[rustfmt::skip]
        let inputs = [
            ("dl2", Modifier::Drop(KeepKind::Lowest, 2)),
            ("dh3", Modifier::Drop(KeepKind::Highest, 3)),
            ("d4", Modifier::Drop(KeepKind::Lowest, 4)),
            ("kl1", Modifier::Keep(KeepKind::Lowest, 1)),
            ("kh2", Modifier::Keep(KeepKind::Highest, 2)),
            ("k3", Modifier::Keep(KeepKind::Highest, 3)),
            ("x", Modifier::Explode(None)),
            ("x5", Modifier::Explode(Some(5))),
            ("t4", Modifier::Threshold(4)),
        ];

        for (input, expected) in inputs {
            assert_eq!(modifier.parse(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_modifier_missing_amount() {
        for input in ["dl", "dh", "d", "kl", "kh", "k", "t"] {
            assert!(modifier.parse(input).is_err(), "{input}");
        }
    }
}

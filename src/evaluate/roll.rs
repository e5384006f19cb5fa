use crate::parse::DicePart;

/// One die as rolled, plus what the manipulators did to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollData {
    pub(crate) index: usize,
    pub(crate) roll: i64,
    pub(crate) modifier_flags: u32,
}

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum RollFlag {
    /// Excluded from the total by a drop or keep rule.
    Dropped,
    /// Rolled on a one-sided die, no generator involved.
    Fixed,
    /// Natural lowest face.
    Min,
    /// Natural highest face.
    Max,
    /// Bonus die added by an explosion.
    Exploded,
    AboveThreshold,
    BelowThreshold,
}

impl RollData {
    pub fn new(index: usize, roll: i64) -> Self {
        Self {
            index,
            roll,
            modifier_flags: 0,
        }
    }

    pub fn set_flag(&mut self, flag: RollFlag) {
        self.modifier_flags |= 1 << flag as u8;
    }

    pub fn has_flag(&self, flag: RollFlag) -> bool {
        (self.modifier_flags & (1 << flag as u8)) != 0
    }

    /// Position in roll order, bonus dice come after the originals.
    pub fn index(&self) -> usize {
        self.index
    }
    pub fn roll(&self) -> i64 {
        self.roll
    }
    pub fn is_dropped(&self) -> bool {
        self.has_flag(RollFlag::Dropped)
    }
    pub fn is_fixed(&self) -> bool {
        self.has_flag(RollFlag::Fixed)
    }
    pub fn is_min(&self) -> bool {
        self.has_flag(RollFlag::Min)
    }
    pub fn is_max(&self) -> bool {
        self.has_flag(RollFlag::Max)
    }
    pub fn is_exploded(&self) -> bool {
        self.has_flag(RollFlag::Exploded)
    }

    /// The die's value with its markup, as shown in chat.
    pub fn output(&self) -> String {
        self.to_string()
    }
}

/// A dice term together with every die it produced, in roll order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DicePartRoll {
    pub(crate) part: DicePart,
    pub(crate) rolls: Vec<RollData>,
}

impl DicePartRoll {
    pub fn new(part: DicePart, rolls: Vec<RollData>) -> Self {
        Self { part, rolls }
    }

    pub fn part(&self) -> &DicePart {
        &self.part
    }

    pub fn rolls(&self) -> &[RollData] {
        &self.rolls
    }

    /// Sum of every die that was not dropped, bonus dice included.
    pub fn total(&self) -> i64 {
        self.kept().map(|r| r.roll).sum()
    }

    pub fn kept(&self) -> impl Iterator<Item = &RollData> {
        self.rolls.iter().filter(|r| !r.is_dropped())
    }

    pub fn dropped(&self) -> impl Iterator<Item = &RollData> {
        self.rolls.iter().filter(|r| r.is_dropped())
    }
}

impl std::fmt::Display for RollData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Dropped dice only get the strikethrough
        if self.is_dropped() {
            return write!(f, "~~{}~~", self.roll);
        }

        if self.is_fixed() {
            write!(f, "{}", self.roll)?;
        } else if self.is_max() {
            write!(f, "**{}**", self.roll)?;
        } else if self.is_min() {
            write!(f, "__{}__", self.roll)?;
        } else {
            write!(f, "{}", self.roll)?;
        }

        if self.is_exploded() {
            write!(f, "ˣ")?;
        }
        if self.has_flag(RollFlag::AboveThreshold) {
            write!(f, "⁺")?;
        } else if self.has_flag(RollFlag::BelowThreshold) {
            write!(f, "⁻")?;
        }
        Ok(())
    }
}

pub fn to_notations(rolls: &[RollData]) -> String {
    format!(
        "[{}]",
        rolls
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )
}

impl std::fmt::Display for DicePartRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", to_notations(&self.rolls), self.part)
    }
}

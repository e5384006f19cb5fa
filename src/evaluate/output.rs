use super::expression::{DiceRoll, RolledTerm};
use super::math::MathToken;

/// Where a roll is being posted. Secret rolls only show their values privately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    #[default]
    Public,
    /// Seen only by the roller or the game master.
    Private,
}

impl DiceRoll {
    /// Chat rendering of the roll, e.g.
    /// `` `14` ⟵ [~~2~~, 5, **6**, 3] 4d6dl1 + 2 vs 12 **Success** Strength ``.
    pub fn output(&self, channel: Channel) -> String {
        if self.secret && channel == Channel::Public {
            return redacted(&self.description);
        }
        self.to_string()
    }
}

fn redacted(description: &str) -> String {
    if description.is_empty() {
        "`??` ⟵ *secret roll*".to_string()
    } else {
        format!("`??` ⟵ *secret roll* {description}")
    }
}

fn render_terms(terms: &[RolledTerm]) -> String {
    let mut rendered = String::new();
    for (i, term) in terms.iter().enumerate() {
        let follows_open = i > 0
            && matches!(
                terms[i - 1],
                RolledTerm::Math(MathToken::OpenParen | MathToken::Function(_))
            );
        let closes = matches!(
            term,
            RolledTerm::Math(MathToken::CloseParen | MathToken::Comma)
        );
        if i > 0 && !follows_open && !closes {
            rendered.push(' ');
        }

        match term {
            RolledTerm::Dice(rolled) => rendered.push_str(&rolled.to_string()),
            RolledTerm::Math(token) => rendered.push_str(&token.to_string()),
        }
    }
    rendered
}

impl std::fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` ⟵ {}", self.total, render_terms(&self.terms))?;

        if let Some(test) = &self.test {
            let verdict = if test.success {
                "**Success**"
            } else {
                "**Failure**"
            };
            write!(f, " {} {verdict}", test.compare)?;
        }
        if !self.description.is_empty() {
            write!(f, " {}", self.description)?;
        }
        Ok(())
    }
}

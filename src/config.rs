use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default upper bound on bonus dice a single term may add through explosions.
pub const DEFAULT_EXPLODE_CAP: usize = 1000;

/// What the tokenizer does with characters no matcher accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Fail with a lexical error pointing at the first unmatched character.
    #[default]
    Error,
    /// Keep runs of unmatched characters as literal text in the description.
    Literal,
}

/// Settings for one evaluation. Built in code or loaded from TOML and passed
/// explicitly to every call that needs it.
///
/// ```toml
/// explode_cap = 50
/// unmatched = "literal"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RollConfig {
    /// Maximum number of bonus dice explosions may add to one term.
    pub explode_cap: usize,
    pub unmatched: UnmatchedPolicy,
}

impl Default for RollConfig {
    fn default() -> Self {
        Self {
            explode_cap: DEFAULT_EXPLODE_CAP,
            unmatched: UnmatchedPolicy::default(),
        }
    }
}

impl RollConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TierError {
    #[error("tier must be 1, 2 or 3, got {0}")]
    OutOfRange(i64),
    #[error("invalid tier value: {0:?}")]
    Invalid(String),
}

/// One of the three fixed difficulty levels of the word catalog.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    #[default]
    One,
    Two,
    Three,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::One, Tier::Two, Tier::Three];

    /// Numeric level (1..=3) as stored and exchanged over HTTP.
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Tier::One => 1,
            Tier::Two => 2,
            Tier::Three => 3,
        }
    }

    /// Converts a numeric level to a `Tier`.
    ///
    /// # Errors
    ///
    /// Returns `TierError::OutOfRange` if the value is not 1, 2 or 3.
    pub fn from_level(value: i64) -> Result<Self, TierError> {
        match value {
            1 => Ok(Tier::One),
            2 => Ok(Tier::Two),
            3 => Ok(Tier::Three),
            other => Err(TierError::OutOfRange(other)),
        }
    }

    /// Directory-safe name, used for audio paths and catalog keys.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Tier::One => "one_bee",
            Tier::Two => "two_bee",
            Tier::Three => "three_bee",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Tier::One => "One Bee",
            Tier::Two => "Two Bee",
            Tier::Three => "Three Bee",
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> Self {
        tier.level()
    }
}

impl TryFrom<u8> for Tier {
    type Error = TierError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Tier::from_level(i64::from(value))
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.level())
    }
}

impl FromStr for Tier {
    type Err = TierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(level) = trimmed.parse::<i64>() {
            return Tier::from_level(level);
        }
        Tier::ALL
            .into_iter()
            .find(|tier| tier.slug() == trimmed)
            .ok_or_else(|| TierError::Invalid(trimmed.to_owned()))
    }
}

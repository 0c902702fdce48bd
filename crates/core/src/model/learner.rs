use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ids::{LearnerId, ParseIdError};

/// A named learner whose progress is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Learner {
    pub id: LearnerId,
    pub username: String,
    pub is_guest: bool,
    pub created_at: DateTime<Utc>,
}

/// Identifies whoever is drilling: the anonymous guest or a named learner.
///
/// Parsed from the `user_id` request value, where `"guest"` selects the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LearnerKey {
    Guest,
    Named(LearnerId),
}

impl LearnerKey {
    /// The persisted learner id, or `None` for the guest.
    #[must_use]
    pub fn learner_id(self) -> Option<LearnerId> {
        match self {
            LearnerKey::Guest => None,
            LearnerKey::Named(id) => Some(id),
        }
    }
}

impl From<Option<LearnerId>> for LearnerKey {
    fn from(value: Option<LearnerId>) -> Self {
        value.map_or(LearnerKey::Guest, LearnerKey::Named)
    }
}

impl fmt::Display for LearnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LearnerKey::Guest => f.write_str("guest"),
            LearnerKey::Named(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for LearnerKey {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("guest") {
            return Ok(LearnerKey::Guest);
        }
        s.parse::<LearnerId>().map(LearnerKey::Named)
    }
}

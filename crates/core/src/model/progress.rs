use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{LearnerId, WordId};
use crate::scheduler::review_interval;

//
// ─── MASTERY LEVEL ─────────────────────────────────────────────────────────────
//

/// Bounded proficiency counter in `0..=5`.
///
/// Correct answers raise it by one, incorrect answers lower it by one; the
/// bounds saturate, so the level can oscillate forever but never leave the range.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "u8", into = "u8")]
pub struct MasteryLevel(u8);

impl MasteryLevel {
    pub const MIN: MasteryLevel = MasteryLevel(0);
    pub const MAX: MasteryLevel = MasteryLevel(5);

    /// Builds a level, clamping out-of-range values into `0..=5`.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.min(Self::MAX.0))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn raised(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    #[must_use]
    pub fn lowered(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    #[must_use]
    pub fn is_mastered(self) -> bool {
        self >= Self::MAX
    }

    /// Weight of a due word in next-word selection; less mastered words weigh more.
    #[must_use]
    pub fn selection_weight(self) -> u32 {
        10 - u32::from(self.0)
    }
}

impl From<u8> for MasteryLevel {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

impl From<MasteryLevel> for u8 {
    fn from(level: MasteryLevel) -> Self {
        level.0
    }
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// A learner's history with one primary word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub learner_id: LearnerId,
    pub word_id: WordId,
    pub times_attempted: u32,
    pub times_correct: u32,
    pub times_incorrect: u32,
    pub first_attempted_at: DateTime<Utc>,
    pub last_attempted_at: DateTime<Utc>,
    pub next_review_at: DateTime<Utc>,
    pub current_streak: u32,
    pub mastery_level: MasteryLevel,
}

impl ProgressRecord {
    /// Fresh record for a first attempt; nothing counted yet.
    #[must_use]
    pub fn new(learner_id: LearnerId, word_id: WordId, now: DateTime<Utc>) -> Self {
        Self {
            learner_id,
            word_id,
            times_attempted: 0,
            times_correct: 0,
            times_incorrect: 0,
            first_attempted_at: now,
            last_attempted_at: now,
            next_review_at: now,
            current_streak: 0,
            mastery_level: MasteryLevel::MIN,
        }
    }

    /// Apply one answer and reschedule the next review from the interval table.
    pub fn record_answer(&mut self, correct: bool, now: DateTime<Utc>) {
        self.times_attempted = self.times_attempted.saturating_add(1);

        if correct {
            self.times_correct = self.times_correct.saturating_add(1);
            self.current_streak = self.current_streak.saturating_add(1);
            self.mastery_level = self.mastery_level.raised();
        } else {
            self.times_incorrect = self.times_incorrect.saturating_add(1);
            self.current_streak = 0;
            self.mastery_level = self.mastery_level.lowered();
        }

        self.last_attempted_at = now;
        self.next_review_at = now + review_interval(self.mastery_level);
    }

    /// True once `next_review_at` has passed.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

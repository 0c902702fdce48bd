use serde::{Deserialize, Serialize};

use crate::model::progress::MasteryLevel;

/// Mastery breakdown of one tier's primary words for one learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierStats {
    pub total: u32,
    pub mastered: u32,
    pub in_progress: u32,
    pub not_started: u32,
    pub mastery_pct: u32,
    pub progress_pct: u32,
}

impl TierStats {
    /// Derive the remaining counts and truncated percentages.
    ///
    /// Percentages are 0 for an empty tier.
    #[must_use]
    pub fn from_counts(total: u32, mastered: u32, in_progress: u32) -> Self {
        let started = mastered.saturating_add(in_progress).min(total);
        Self {
            total,
            mastered,
            in_progress,
            not_started: total - started,
            mastery_pct: percent(mastered, total),
            progress_pct: percent(started, total),
        }
    }

    /// Count each word's level: `None` means no record (not started).
    #[must_use]
    pub fn tally<I>(levels: I) -> Self
    where
        I: IntoIterator<Item = Option<MasteryLevel>>,
    {
        let (mut total, mut mastered, mut in_progress) = (0_u32, 0_u32, 0_u32);
        for level in levels {
            total += 1;
            match level {
                Some(l) if l.is_mastered() => mastered += 1,
                Some(l) if l > MasteryLevel::MIN => in_progress += 1,
                _ => {}
            }
        }
        Self::from_counts(total, mastered, in_progress)
    }
}

fn percent(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = u64::from(part) * 100 / u64::from(total);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

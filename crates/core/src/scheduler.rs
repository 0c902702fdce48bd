use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use thiserror::Error;

use crate::model::{LearnerId, MasteryLevel, ProgressRecord, Tier, WordEntry, WordId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("tier {tier} has no primary words")]
    EmptyCatalog { tier: Tier },
    #[error("due preference must be in [0, 1], got {provided}")]
    InvalidDuePreference { provided: f64 },
}

//
// ─── INTERVAL TABLE ────────────────────────────────────────────────────────────
//

/// Probability of drawing from the due pool when it is non-empty.
pub const DEFAULT_DUE_PREFERENCE: f64 = 0.7;

/// Review delay for a raw mastery value; unmapped values wait two weeks.
#[must_use]
pub fn interval_for_level(level: u8) -> Duration {
    match level {
        0 => Duration::minutes(5),
        1 => Duration::hours(1),
        2 => Duration::hours(6),
        3 => Duration::days(1),
        4 => Duration::days(3),
        5 => Duration::weeks(1),
        _ => Duration::weeks(2),
    }
}

/// Review delay after reaching `level`.
#[must_use]
pub fn review_interval(level: MasteryLevel) -> Duration {
    interval_for_level(level.value())
}

//
// ─── SELECTION ─────────────────────────────────────────────────────────────────
//

/// Which pool a selected word came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Weighted draw from the due pool.
    Due,
    /// Uniform draw from words never attempted.
    New,
    /// Due pool used after the new pool turned out empty.
    DueFallback,
    /// Nothing due or new: uniform draw over the whole tier.
    AnyWord,
    /// Guest learner: uniform draw, progress ignored.
    Guest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub word: &'a WordEntry,
    pub source: SelectionSource,
}

/// Fixed-table spaced-repetition policy.
///
/// Picks the next word for a learner from due, new and mastered words, and
/// turns answers into updated progress records.
///
/// # Examples
///
/// ```
/// # use std::collections::HashMap;
/// # use bee_core::model::{NewWord, Tier, WordId, WordRole};
/// # use bee_core::scheduler::{Scheduler, SelectionSource};
/// # use rand::{SeedableRng, rngs::StdRng};
/// let words = vec![NewWord::new("cat", Tier::One, WordRole::Primary).assign_id(WordId::new(1))];
/// let mut rng = StdRng::seed_from_u64(7);
/// let picked = Scheduler::new()
///     .select_next(Tier::One, &words, &HashMap::new(), chrono::Utc::now(), &mut rng)?;
/// assert_eq!(picked.word.spelling, "cat");
/// assert_eq!(picked.source, SelectionSource::New);
/// # Ok::<(), bee_core::scheduler::SchedulerError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduler {
    due_preference: f64,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            due_preference: DEFAULT_DUE_PREFERENCE,
        }
    }

    /// Scheduler with a custom probability of preferring due words.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDuePreference` if `due_preference` is not a finite value in `[0, 1]`.
    pub fn try_with_due_preference(due_preference: f64) -> Result<Self, SchedulerError> {
        if !due_preference.is_finite() || !(0.0..=1.0).contains(&due_preference) {
            return Err(SchedulerError::InvalidDuePreference {
                provided: due_preference,
            });
        }
        Ok(Self { due_preference })
    }

    #[must_use]
    pub fn due_preference(&self) -> f64 {
        self.due_preference
    }

    /// Choose the next word of `tier` for a learner with the given progress.
    ///
    /// Only primary words of `tier` are candidates; `progress` is keyed by word id.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::EmptyCatalog` if `tier` has no primary words.
    pub fn select_next<'a, R>(
        &self,
        tier: Tier,
        words: &'a [WordEntry],
        progress: &HashMap<WordId, ProgressRecord>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<Selection<'a>, SchedulerError>
    where
        R: Rng + ?Sized,
    {
        let candidates = primaries(tier, words)?;

        let mut new_pool: Vec<&WordEntry> = Vec::new();
        let mut due_pool: Vec<(&WordEntry, u32)> = Vec::new();
        for &word in &candidates {
            match progress.get(&word.id) {
                None => new_pool.push(word),
                Some(record) if record.is_due(now) => {
                    due_pool.push((word, record.mastery_level.selection_weight()));
                }
                Some(_) => {}
            }
        }

        if !due_pool.is_empty() && rng.random::<f64>() < self.due_preference {
            if let Some(word) = pick_weighted(&due_pool, rng) {
                return Ok(Selection {
                    word,
                    source: SelectionSource::Due,
                });
            }
        }

        if let Some(word) = new_pool.choose(rng).copied() {
            return Ok(Selection {
                word,
                source: SelectionSource::New,
            });
        }

        if let Some(word) = pick_weighted(&due_pool, rng) {
            return Ok(Selection {
                word,
                source: SelectionSource::DueFallback,
            });
        }

        pick_uniform(tier, &candidates, rng, SelectionSource::AnyWord)
    }

    /// Uniform draw over the tier's primary words, for guests.
    ///
    /// # Errors
    ///
    /// Returns `SchedulerError::EmptyCatalog` if `tier` has no primary words.
    pub fn select_for_guest<'a, R>(
        &self,
        tier: Tier,
        words: &'a [WordEntry],
        rng: &mut R,
    ) -> Result<Selection<'a>, SchedulerError>
    where
        R: Rng + ?Sized,
    {
        let candidates = primaries(tier, words)?;
        pick_uniform(tier, &candidates, rng, SelectionSource::Guest)
    }

    /// Apply an answer to the learner's record, creating it on first attempt.
    #[must_use]
    pub fn apply_answer(
        &self,
        previous: Option<ProgressRecord>,
        learner_id: LearnerId,
        word_id: WordId,
        correct: bool,
        now: DateTime<Utc>,
    ) -> ProgressRecord {
        let mut record =
            previous.unwrap_or_else(|| ProgressRecord::new(learner_id, word_id, now));
        record.record_answer(correct, now);
        record
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn primaries(tier: Tier, words: &[WordEntry]) -> Result<Vec<&WordEntry>, SchedulerError> {
    let candidates: Vec<&WordEntry> = words
        .iter()
        .filter(|w| w.tier == tier && w.is_primary())
        .collect();
    if candidates.is_empty() {
        return Err(SchedulerError::EmptyCatalog { tier });
    }
    Ok(candidates)
}

fn pick_uniform<'a, R>(
    tier: Tier,
    candidates: &[&'a WordEntry],
    rng: &mut R,
    source: SelectionSource,
) -> Result<Selection<'a>, SchedulerError>
where
    R: Rng + ?Sized,
{
    candidates
        .choose(rng)
        .copied()
        .map(|word| Selection { word, source })
        .ok_or(SchedulerError::EmptyCatalog { tier })
}

/// Cumulative-weight sampling: one draw in `[0, total)`, walk until it falls inside a bucket.
fn pick_weighted<'a, R>(pool: &[(&'a WordEntry, u32)], rng: &mut R) -> Option<&'a WordEntry>
where
    R: Rng + ?Sized,
{
    let total: u64 = pool.iter().map(|(_, weight)| u64::from(*weight)).sum();
    if total == 0 {
        return None;
    }

    let mut target = rng.random_range(0..total);
    for (word, weight) in pool {
        let weight = u64::from(*weight);
        if target < weight {
            return Some(word);
        }
        target -= weight;
    }
    None
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

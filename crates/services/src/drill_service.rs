use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use bee_core::answer::is_correct;
use bee_core::model::{LearnerId, LearnerKey, ProgressRecord, Tier, TierStats, WordEntry, WordId};
use bee_core::scheduler::Scheduler;
use bee_core::scramble::scramble;
use storage::repository::{ProgressRepository, WordRepository};

use crate::Clock;
use crate::error::DrillError;

/// Picks words, checks answers and records progress for one store.
pub struct DrillService {
    clock: Clock,
    scheduler: Scheduler,
    rng: Mutex<StdRng>,
    words: Arc<dyn WordRepository>,
    progress: Arc<dyn ProgressRepository>,
}

impl DrillService {
    #[must_use]
    pub fn new(
        clock: Clock,
        words: Arc<dyn WordRepository>,
        progress: Arc<dyn ProgressRepository>,
    ) -> Self {
        Self {
            clock,
            scheduler: Scheduler::new(),
            rng: Mutex::new(StdRng::from_os_rng()),
            words,
            progress,
        }
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Scheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Seed the random source so selection and scrambling repeat across runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    fn rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Next word to drill in `tier`.
    ///
    /// Guests draw uniformly; named learners go through the spaced-repetition
    /// policy using their stored progress.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::Scheduler` when the tier has no primary words, or
    /// `DrillError::Storage` on repository failures.
    pub async fn next_word(&self, learner: LearnerKey, tier: Tier) -> Result<WordEntry, DrillError> {
        let words = self.words.primary_words(tier).await?;

        let Some(learner_id) = learner.learner_id() else {
            let selection = self
                .scheduler
                .select_for_guest(tier, &words, &mut *self.rng())?;
            return Ok(selection.word.clone());
        };

        let progress: HashMap<WordId, ProgressRecord> = self
            .progress
            .progress_for_learner(learner_id)
            .await?
            .into_iter()
            .map(|record| (record.word_id, record))
            .collect();

        let now = self.clock.now();
        let selection = self
            .scheduler
            .select_next(tier, &words, &progress, now, &mut *self.rng())?;

        debug!(
            learner = %learner,
            tier = %tier,
            word_id = %selection.word.id,
            source = ?selection.source,
            "selected next word"
        );
        Ok(selection.word.clone())
    }

    /// Letters of `word` in a new random order.
    #[must_use]
    pub fn scramble(&self, word: &str) -> String {
        scramble(word, &mut *self.rng())
    }

    /// Whether `submitted` spells the word `word_id` or one of its accepted variants.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::WordNotFound` for unknown ids and
    /// `DrillError::Storage` on repository failures.
    pub async fn check_answer(&self, submitted: &str, word_id: WordId) -> Result<bool, DrillError> {
        let word = self
            .words
            .get_word(word_id)
            .await?
            .ok_or(DrillError::WordNotFound(word_id))?;

        let alternates = if word.is_primary() {
            self.words.alternates_of(word.tier, &word.spelling).await?
        } else {
            Vec::new()
        };

        Ok(is_correct(submitted, &word, &alternates))
    }

    /// Record one answer against the learner's progress for `word_id`.
    ///
    /// Answers given for an alternate count toward its primary.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::WordNotFound` if the word (or its primary) is
    /// missing, or `DrillError::Storage` on repository failures.
    pub async fn update_progress(
        &self,
        learner_id: LearnerId,
        word_id: WordId,
        correct: bool,
    ) -> Result<ProgressRecord, DrillError> {
        let word_id = self.resolve_primary(word_id).await?;
        let previous = self.progress.get_progress(learner_id, word_id).await?;
        let now = self.clock.now();

        let record = self
            .scheduler
            .apply_answer(previous, learner_id, word_id, correct, now);
        self.progress.upsert_progress(&record).await?;

        info!(
            learner = %learner_id,
            word_id = %word_id,
            correct,
            mastery = record.mastery_level.value(),
            next_review_at = %record.next_review_at,
            "recorded answer"
        );
        Ok(record)
    }

    /// Mastery breakdown of `tier` for a named learner.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::Storage` on repository failures.
    pub async fn user_stats(&self, learner_id: LearnerId, tier: Tier) -> Result<TierStats, DrillError> {
        let words = self.words.primary_words(tier).await?;
        let levels: HashMap<WordId, _> = self
            .progress
            .progress_for_learner(learner_id)
            .await?
            .into_iter()
            .map(|record| (record.word_id, record.mastery_level))
            .collect();

        Ok(TierStats::tally(
            words.iter().map(|word| levels.get(&word.id).copied()),
        ))
    }

    async fn resolve_primary(&self, word_id: WordId) -> Result<WordId, DrillError> {
        let word = self
            .words
            .get_word(word_id)
            .await?
            .ok_or(DrillError::WordNotFound(word_id))?;

        let Some(primary) = word.primary_word() else {
            return Ok(word.id);
        };

        self.words
            .primary_words(word.tier)
            .await?
            .into_iter()
            .find(|w| w.spelling == primary)
            .map(|w| w.id)
            .ok_or(DrillError::WordNotFound(word_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bee_core::model::{MasteryLevel, NewWord, WordRole};
    use bee_core::time::fixed_now;
    use chrono::Duration;
    use storage::repository::{InMemoryRepository, WordRepository};

    async fn seeded() -> (InMemoryRepository, WordId, WordId, WordId) {
        let repo = InMemoryRepository::new();
        let cat = repo
            .insert_word(NewWord::new("cat", Tier::One, WordRole::Primary))
            .await
            .unwrap();
        let color = repo
            .insert_word(NewWord::new("color", Tier::One, WordRole::Primary))
            .await
            .unwrap();
        let colour = repo
            .insert_word(NewWord::new(
                "colour",
                Tier::One,
                WordRole::Alternate {
                    primary: "color".into(),
                },
            ))
            .await
            .unwrap();
        (repo, cat, color, colour)
    }

    fn service(repo: &InMemoryRepository, clock: Clock) -> DrillService {
        DrillService::new(clock, Arc::new(repo.clone()), Arc::new(repo.clone())).with_seed(11)
    }

    #[tokio::test]
    async fn answers_match_spelling_and_alternates() {
        let (repo, cat, color, colour) = seeded().await;
        let svc = service(&repo, Clock::fixed(fixed_now()));

        assert!(svc.check_answer("cat", cat).await.unwrap());
        assert!(svc.check_answer("CAT", cat).await.unwrap());
        assert!(!svc.check_answer("kat", cat).await.unwrap());
        assert!(svc.check_answer("colour", color).await.unwrap());
        assert!(svc.check_answer("color", colour).await.unwrap());
        assert!(matches!(
            svc.check_answer("cat", WordId::new(99)).await,
            Err(DrillError::WordNotFound(_))
        ));
    }

    #[tokio::test]
    async fn alternate_answers_count_toward_primary() {
        let (repo, _cat, color, colour) = seeded().await;
        let svc = service(&repo, Clock::fixed(fixed_now()));
        let learner = LearnerId::new(1);

        let record = svc.update_progress(learner, colour, true).await.unwrap();
        assert_eq!(record.word_id, color);
        assert!(repo.get_progress(learner, colour).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn new_learner_gets_a_new_word_first() {
        let (repo, ..) = seeded().await;
        let svc = service(&repo, Clock::fixed(fixed_now()));

        let word = svc
            .next_word(LearnerKey::Named(LearnerId::new(1)), Tier::One)
            .await
            .unwrap();
        assert!(word.is_primary());
    }

    #[tokio::test]
    async fn unattempted_word_is_preferred_while_others_wait() {
        let (repo, cat, color, _) = seeded().await;
        let now = fixed_now();
        let svc = service(&repo, Clock::fixed(now));
        let learner = LearnerId::new(1);
        svc.update_progress(learner, cat, true).await.unwrap();

        for _ in 0..20 {
            let word = svc
                .next_word(LearnerKey::Named(learner), Tier::One)
                .await
                .unwrap();
            assert_eq!(word.id, color);
        }
    }

    #[tokio::test]
    async fn due_words_win_when_the_scheduler_always_prefers_them() {
        let (repo, cat, ..) = seeded().await;
        let now = fixed_now();
        let learner = LearnerId::new(1);
        service(&repo, Clock::fixed(now))
            .update_progress(learner, cat, true)
            .await
            .unwrap();

        let later = Clock::fixed(now).advanced_by(Duration::days(30));
        let svc = service(&repo, later)
            .with_scheduler(Scheduler::try_with_due_preference(1.0).unwrap());
        for _ in 0..20 {
            let word = svc
                .next_word(LearnerKey::Named(learner), Tier::One)
                .await
                .unwrap();
            assert_eq!(word.id, cat);
        }
    }

    #[tokio::test]
    async fn empty_tier_is_an_error() {
        let (repo, ..) = seeded().await;
        let svc = service(&repo, Clock::fixed(fixed_now()));

        assert!(matches!(
            svc.next_word(LearnerKey::Guest, Tier::Three).await,
            Err(DrillError::Scheduler(_))
        ));
    }

    #[tokio::test]
    async fn stats_follow_recorded_progress() {
        let (repo, cat, color, _) = seeded().await;
        let now = fixed_now();
        let svc = service(&repo, Clock::fixed(now));
        let learner = LearnerId::new(3);

        for _ in 0..5 {
            svc.update_progress(learner, cat, true).await.unwrap();
        }
        svc.update_progress(learner, color, false).await.unwrap();

        let stats = svc.user_stats(learner, Tier::One).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.mastered, 1);
        assert_eq!(stats.in_progress, 0);
        assert_eq!(stats.not_started, 1);
        assert_eq!(stats.mastery_pct, 50);

        let record = repo.get_progress(learner, cat).await.unwrap().unwrap();
        assert_eq!(record.mastery_level, MasteryLevel::MAX);
        assert_eq!(record.next_review_at, now + Duration::weeks(1));
    }

    #[tokio::test]
    async fn scramble_changes_multi_letter_words() {
        let (repo, ..) = seeded().await;
        let svc = service(&repo, Clock::fixed(fixed_now()));
        assert_ne!(svc.scramble("spelling"), "spelling");
        assert_eq!(svc.scramble("a"), "a");
    }
}

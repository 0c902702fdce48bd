use std::sync::Arc;

use tracing::debug;

use bee_core::model::{LearnerKey, Tier, WordId};

use super::store::SessionStore;
use super::view::{AnswerOutcome, CardView, TierProgress};
use crate::drill_service::DrillService;
use crate::error::DrillError;

/// Drill actions a learner takes, applied to their session and progress.
#[derive(Clone)]
pub struct SessionWorkflow {
    drill: Arc<DrillService>,
    store: Arc<SessionStore>,
}

impl SessionWorkflow {
    #[must_use]
    pub fn new(drill: Arc<DrillService>, store: Arc<SessionStore>) -> Self {
        Self { drill, store }
    }

    /// The learner's current card, drawing and scrambling a word if none is showing.
    ///
    /// # Errors
    ///
    /// Returns `DrillError` if the tier is empty or storage fails.
    pub async fn current_card(&self, key: LearnerKey) -> Result<CardView, DrillError> {
        let state = self.store.get_or_create(key);

        let (word, scrambled) = match (state.current_word, state.scrambled) {
            (Some(word), Some(scrambled)) => (word, scrambled),
            _ => {
                let word = self.drill.next_word(key, state.tier).await?;
                let scrambled = self.drill.scramble(&word.spelling);
                self.store
                    .with_session(key, |s| s.present(word.clone(), scrambled.clone()));
                debug!(learner = %key, word_id = %word.id, "presented new word");
                (word, scrambled)
            }
        };

        let stats = self.tier_progress(key).await?;
        let state = self.store.get_or_create(key);
        Ok(CardView::build(key, &state, &word, scrambled, stats))
    }

    /// Switch tier; the next card is drawn from the new tier.
    ///
    /// # Errors
    ///
    /// Returns `DrillError` if the new tier is empty or storage fails.
    pub async fn set_tier(&self, key: LearnerKey, tier: Tier) -> Result<CardView, DrillError> {
        self.store.with_session(key, |s| s.set_tier(tier));
        self.current_card(key).await
    }

    /// Show or hide the hint, keeping whatever the learner has typed so far.
    ///
    /// # Errors
    ///
    /// Returns `DrillError` if a card has to be drawn and that fails.
    pub async fn toggle_hint(
        &self,
        key: LearnerKey,
        answer: Option<String>,
    ) -> Result<CardView, DrillError> {
        self.store.with_session(key, |s| {
            s.toggle_hint();
            if let Some(answer) = answer {
                s.current_answer = answer;
            }
        });
        self.current_card(key).await
    }

    /// Check `answer` for `word_id`, record it for named learners, and advance on success.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::WordNotFound` for unknown ids, or other `DrillError`s
    /// from storage and selection.
    pub async fn submit_answer(
        &self,
        key: LearnerKey,
        word_id: WordId,
        answer: &str,
    ) -> Result<AnswerOutcome, DrillError> {
        let correct = self.drill.check_answer(answer, word_id).await?;

        if let Some(learner_id) = key.learner_id() {
            self.drill.update_progress(learner_id, word_id, correct).await?;
        }

        if correct {
            self.store.with_session(key, |s| s.clear_word());
        }

        let card = self.current_card(key).await?;
        Ok(AnswerOutcome { correct, card })
    }

    async fn tier_progress(&self, key: LearnerKey) -> Result<Vec<TierProgress>, DrillError> {
        let Some(learner_id) = key.learner_id() else {
            return Ok(Vec::new());
        };

        let mut out = Vec::with_capacity(Tier::ALL.len());
        for tier in Tier::ALL {
            out.push(TierProgress {
                tier,
                label: tier.label(),
                stats: self.drill.user_stats(learner_id, tier).await?,
            });
        }
        Ok(out)
    }
}

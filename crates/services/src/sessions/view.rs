use serde::Serialize;

use bee_core::model::{LearnerKey, SessionState, Tier, TierStats, WordEntry, WordId};

/// What the learner sees before answering; never includes the spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordPrompt {
    pub id: WordId,
    pub letters: usize,
    pub definition: String,
    pub functional_label: String,
}

/// Revealed when the hint is toggled on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordHint {
    pub pronunciation: String,
    pub has_audio: bool,
    pub audio_file_local: String,
    pub audio_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierProgress {
    pub tier: Tier,
    pub label: &'static str,
    pub stats: TierStats,
}

/// Presentation-agnostic snapshot of a learner's current card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub user_id: String,
    pub tier: Tier,
    pub word: WordPrompt,
    pub scrambled: String,
    pub show_hint: bool,
    pub hint: Option<WordHint>,
    pub current_answer: String,
    /// Empty for the guest.
    pub stats: Vec<TierProgress>,
}

impl CardView {
    pub(crate) fn build(
        key: LearnerKey,
        state: &SessionState,
        word: &WordEntry,
        scrambled: String,
        stats: Vec<TierProgress>,
    ) -> Self {
        let hint = state.show_hint.then(|| WordHint {
            pronunciation: word.pronunciation.clone(),
            has_audio: word.has_audio,
            audio_file_local: word.audio_file_local.clone(),
            audio_url: word.audio_url.clone(),
        });

        Self {
            user_id: key.to_string(),
            tier: state.tier,
            word: WordPrompt {
                id: word.id,
                letters: word.spelling.chars().count(),
                definition: word.definition.clone(),
                functional_label: word.functional_label.clone(),
            },
            scrambled,
            show_hint: state.show_hint,
            hint,
            current_answer: state.current_answer.clone(),
            stats,
        }
    }
}

/// Result of submitting an answer, with the card to show next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub card: CardView,
}

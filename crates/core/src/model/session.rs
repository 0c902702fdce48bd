use crate::model::{tier::Tier, word::WordEntry};

/// Per-learner drill state held only for the lifetime of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub tier: Tier,
    pub current_word: Option<WordEntry>,
    pub scrambled: Option<String>,
    pub show_hint: bool,
    /// Typed answer kept across hint toggles.
    pub current_answer: String,
}

impl SessionState {
    /// Forget the current word so the next render draws a fresh one.
    pub fn clear_word(&mut self) {
        self.current_word = None;
        self.scrambled = None;
        self.show_hint = false;
        self.current_answer.clear();
    }

    pub fn set_tier(&mut self, tier: Tier) {
        self.tier = tier;
        self.clear_word();
    }

    /// Show the word with its scrambled letters, hint hidden.
    pub fn present(&mut self, word: WordEntry, scrambled: String) {
        self.current_word = Some(word);
        self.scrambled = Some(scrambled);
        self.show_hint = false;
    }

    pub fn toggle_hint(&mut self) {
        self.show_hint = !self.show_hint;
    }
}

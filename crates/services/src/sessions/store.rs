use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bee_core::model::{LearnerKey, SessionState};

/// Process-lifetime drill state per learner (guest included).
///
/// The lock is only held for in-memory edits; callers never await while
/// holding it.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<LearnerKey, SessionState>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<LearnerKey, SessionState>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the learner's state, created with defaults on first use.
    #[must_use]
    pub fn get_or_create(&self, key: LearnerKey) -> SessionState {
        self.guard().entry(key).or_default().clone()
    }

    /// Edit the learner's state in place.
    pub fn with_session<T>(&self, key: LearnerKey, edit: impl FnOnce(&mut SessionState) -> T) -> T {
        edit(self.guard().entry(key).or_default())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bee_core::model::{LearnerId, Tier};

    #[test]
    fn sessions_start_on_tier_one_with_hint_hidden() {
        let store = SessionStore::new();
        let state = store.get_or_create(LearnerKey::Guest);

        assert_eq!(state.tier, Tier::One);
        assert!(state.current_word.is_none());
        assert!(!state.show_hint);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn learners_do_not_share_state() {
        let store = SessionStore::new();
        let named = LearnerKey::Named(LearnerId::new(4));
        store.with_session(named, |s| s.set_tier(Tier::Three));

        assert_eq!(store.get_or_create(named).tier, Tier::Three);
        assert_eq!(store.get_or_create(LearnerKey::Guest).tier, Tier::One);
        assert_eq!(store.len(), 2);
    }
}

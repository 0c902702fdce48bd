use std::sync::Arc;

use tracing::info;

use bee_core::model::{Learner, LearnerId};
use storage::repository::{LearnerRepository, StorageError};

use crate::Clock;

/// Named learners shown on the picker.
#[derive(Clone)]
pub struct LearnerService {
    clock: Clock,
    learners: Arc<dyn LearnerRepository>,
}

impl LearnerService {
    #[must_use]
    pub fn new(clock: Clock, learners: Arc<dyn LearnerRepository>) -> Self {
        Self { clock, learners }
    }

    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    pub async fn list(&self) -> Result<Vec<Learner>, StorageError> {
        self.learners.list_learners().await
    }

    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    pub async fn get(&self, id: LearnerId) -> Result<Option<Learner>, StorageError> {
        self.learners.get_learner(id).await
    }

    /// Create the configured learners when none exist yet; returns how many were added.
    ///
    /// Blank and repeated names are skipped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on repository failures.
    pub async fn seed_if_empty(&self, names: &[String]) -> Result<usize, StorageError> {
        if !self.learners.list_learners().await?.is_empty() {
            return Ok(0);
        }

        let now = self.clock.now();
        let mut added = 0;
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            match self.learners.insert_learner(name, false, now).await {
                Ok(id) => {
                    info!(learner = %id, username = name, "seeded learner");
                    added += 1;
                }
                Err(StorageError::Conflict) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(added)
    }
}

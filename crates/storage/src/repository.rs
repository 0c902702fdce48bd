use async_trait::async_trait;
use bee_core::model::{
    Learner, LearnerId, NewWord, ProgressRecord, Tier, WordEnrichment, WordEntry, WordId,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Catalog words, primaries and alternates alike.
#[async_trait]
pub trait WordRepository: Send + Sync {
    /// Insert a word and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the word cannot be stored.
    async fn insert_word(&self, word: NewWord) -> Result<WordId, StorageError>;

    /// Insert a batch of words atomically: either all are stored or none are.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any word cannot be stored; nothing is kept then.
    async fn insert_words(&self, words: Vec<NewWord>) -> Result<Vec<WordId>, StorageError>;

    /// Total number of stored words.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_words(&self) -> Result<u64, StorageError>;

    /// Fetch a word by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a missing word is `Ok(None)`.
    async fn get_word(&self, id: WordId) -> Result<Option<WordEntry>, StorageError>;

    /// Primary words of a tier, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn primary_words(&self, tier: Tier) -> Result<Vec<WordEntry>, StorageError>;

    /// Alternates registered against `primary` within `tier`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn alternates_of(
        &self,
        tier: Tier,
        primary: &str,
    ) -> Result<Vec<WordEntry>, StorageError>;

    /// Replace the dictionary fields of a stored word.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the word does not exist.
    async fn update_enrichment(
        &self,
        id: WordId,
        data: &WordEnrichment,
    ) -> Result<(), StorageError>;
}

/// Per-learner progress, one record per (learner, primary word).
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; no record is `Ok(None)`.
    async fn get_progress(
        &self,
        learner: LearnerId,
        word: WordId,
    ) -> Result<Option<ProgressRecord>, StorageError>;

    /// Every record of a learner, across tiers.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn progress_for_learner(
        &self,
        learner: LearnerId,
    ) -> Result<Vec<ProgressRecord>, StorageError>;

    /// Insert or update the record for `(record.learner_id, record.word_id)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;
}

#[async_trait]
pub trait LearnerRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    async fn insert_learner(
        &self,
        username: &str,
        is_guest: bool,
        created_at: DateTime<Utc>,
    ) -> Result<LearnerId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_learners(&self) -> Result<Vec<Learner>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a missing learner is `Ok(None)`.
    async fn get_learner(&self, id: LearnerId) -> Result<Option<Learner>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    words: Vec<WordEntry>,
    progress: HashMap<(LearnerId, WordId), ProgressRecord>,
    learners: Vec<Learner>,
}

/// Process-local repository, used for tests and `BEE_STORAGE=memory`.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

fn next_id(len: usize) -> u64 {
    u64::try_from(len).map_or(u64::MAX, |n| n + 1)
}

#[async_trait]
impl WordRepository for InMemoryRepository {
    async fn insert_word(&self, word: NewWord) -> Result<WordId, StorageError> {
        let mut guard = self.lock()?;
        let id = WordId::new(next_id(guard.words.len()));
        guard.words.push(word.assign_id(id));
        Ok(id)
    }

    async fn insert_words(&self, words: Vec<NewWord>) -> Result<Vec<WordId>, StorageError> {
        let mut guard = self.lock()?;
        let mut ids = Vec::with_capacity(words.len());
        for word in words {
            let id = WordId::new(next_id(guard.words.len()));
            guard.words.push(word.assign_id(id));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn count_words(&self) -> Result<u64, StorageError> {
        let guard = self.lock()?;
        Ok(u64::try_from(guard.words.len()).unwrap_or(u64::MAX))
    }

    async fn get_word(&self, id: WordId) -> Result<Option<WordEntry>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.words.iter().find(|w| w.id == id).cloned())
    }

    async fn primary_words(&self, tier: Tier) -> Result<Vec<WordEntry>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .words
            .iter()
            .filter(|w| w.tier == tier && w.is_primary())
            .cloned()
            .collect())
    }

    async fn alternates_of(
        &self,
        tier: Tier,
        primary: &str,
    ) -> Result<Vec<WordEntry>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .words
            .iter()
            .filter(|w| w.tier == tier && w.primary_word() == Some(primary))
            .cloned()
            .collect())
    }

    async fn update_enrichment(
        &self,
        id: WordId,
        data: &WordEnrichment,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let entry = guard
            .words
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(StorageError::NotFound)?;

        let enriched = NewWord::new(entry.spelling.clone(), entry.tier, entry.role.clone())
            .with_enrichment(data)
            .assign_id(id);
        *entry = WordEntry {
            audio_file_local: entry.audio_file_local.clone(),
            ..enriched
        };
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(
        &self,
        learner: LearnerId,
        word: WordId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.progress.get(&(learner, word)).cloned())
    }

    async fn progress_for_learner(
        &self,
        learner: LearnerId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.lock()?;
        let mut records: Vec<ProgressRecord> = guard
            .progress
            .values()
            .filter(|r| r.learner_id == learner)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.word_id);
        Ok(records)
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .progress
            .insert((record.learner_id, record.word_id), record.clone());
        Ok(())
    }
}

#[async_trait]
impl LearnerRepository for InMemoryRepository {
    async fn insert_learner(
        &self,
        username: &str,
        is_guest: bool,
        created_at: DateTime<Utc>,
    ) -> Result<LearnerId, StorageError> {
        let mut guard = self.lock()?;
        if guard.learners.iter().any(|l| l.username == username) {
            return Err(StorageError::Conflict);
        }
        let id = LearnerId::new(next_id(guard.learners.len()));
        guard.learners.push(Learner {
            id,
            username: username.to_owned(),
            is_guest,
            created_at,
        });
        Ok(id)
    }

    async fn list_learners(&self) -> Result<Vec<Learner>, StorageError> {
        Ok(self.lock()?.learners.clone())
    }

    async fn get_learner(&self, id: LearnerId) -> Result<Option<Learner>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.learners.iter().find(|l| l.id == id).cloned())
    }
}

//
// ─── STORAGE BUNDLE ────────────────────────────────────────────────────────────
//

/// Which backend to open at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Nothing persisted beyond the process.
    Memory,
    /// A `SQLite` database: a local file, or a locally synced replica of a remote one.
    Sqlite { url: String },
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub words: Arc<dyn WordRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub learners: Arc<dyn LearnerRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let words: Arc<dyn WordRepository> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let learners: Arc<dyn LearnerRepository> = Arc::new(repo);
        Self {
            words,
            progress,
            learners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bee_core::model::WordRole;
    use bee_core::time::fixed_now;

    fn color() -> NewWord {
        NewWord::new("color", Tier::Two, WordRole::Primary)
    }

    fn colour() -> NewWord {
        NewWord::new(
            "colour",
            Tier::Two,
            WordRole::Alternate {
                primary: "color".into(),
            },
        )
    }

    #[tokio::test]
    async fn words_are_assigned_sequential_ids() {
        let repo = InMemoryRepository::new();
        let a = repo.insert_word(color()).await.unwrap();
        let b = repo.insert_word(colour()).await.unwrap();

        assert_eq!(a, WordId::new(1));
        assert_eq!(b, WordId::new(2));
        assert_eq!(repo.count_words().await.unwrap(), 2);
        assert_eq!(repo.get_word(b).await.unwrap().unwrap().spelling, "colour");
        assert!(repo.get_word(WordId::new(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn batch_insert_continues_the_id_sequence() {
        let repo = InMemoryRepository::new();
        repo.insert_word(NewWord::new("cat", Tier::One, WordRole::Primary))
            .await
            .unwrap();

        let ids = repo.insert_words(vec![color(), colour()]).await.unwrap();
        assert_eq!(ids, vec![WordId::new(2), WordId::new(3)]);
        assert_eq!(repo.count_words().await.unwrap(), 3);
        assert!(repo.insert_words(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn primary_and_alternate_queries_are_separated() {
        let repo = InMemoryRepository::new();
        repo.insert_word(color()).await.unwrap();
        repo.insert_word(colour()).await.unwrap();
        repo.insert_word(NewWord::new("cat", Tier::One, WordRole::Primary))
            .await
            .unwrap();

        let primaries = repo.primary_words(Tier::Two).await.unwrap();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].spelling, "color");

        let alts = repo.alternates_of(Tier::Two, "color").await.unwrap();
        assert_eq!(alts.len(), 1);
        assert_eq!(alts[0].spelling, "colour");
        assert!(repo.alternates_of(Tier::One, "color").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn enrichment_update_keeps_identity() {
        let repo = InMemoryRepository::new();
        let id = repo.insert_word(color()).await.unwrap();
        let data = WordEnrichment {
            shortdef: vec!["a hue".into()],
            has_audio: true,
            ..WordEnrichment::default()
        };
        repo.update_enrichment(id, &data).await.unwrap();

        let word = repo.get_word(id).await.unwrap().unwrap();
        assert_eq!(word.definition, "a hue");
        assert!(word.has_audio);
        assert_eq!(word.audio_file_local, "audio/two_bee/color.mp3");
        assert!(matches!(
            repo.update_enrichment(WordId::new(42), &data).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn progress_upsert_replaces_record() {
        let repo = InMemoryRepository::new();
        let learner = LearnerId::new(1);
        let mut record = ProgressRecord::new(learner, WordId::new(1), fixed_now());
        record.record_answer(true, fixed_now());
        repo.upsert_progress(&record).await.unwrap();

        record.record_answer(true, fixed_now());
        repo.upsert_progress(&record).await.unwrap();

        let stored = repo
            .get_progress(learner, WordId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.times_correct, 2);
        assert_eq!(repo.progress_for_learner(learner).await.unwrap().len(), 1);
        assert!(
            repo.progress_for_learner(LearnerId::new(2))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let repo = InMemoryRepository::new();
        let id = repo.insert_learner("Kira", false, fixed_now()).await.unwrap();
        assert_eq!(repo.get_learner(id).await.unwrap().unwrap().username, "Kira");
        assert!(matches!(
            repo.insert_learner("Kira", false, fixed_now()).await,
            Err(StorageError::Conflict)
        ));
    }
}

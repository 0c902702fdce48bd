use bee_core::model::{LearnerId, ProgressRecord, WordId};

use super::SqliteRepository;
use super::mapping::{conn, learner_id_to_i64, map_progress_row, word_id_to_i64};
use crate::repository::{ProgressRepository, StorageError};

const PROGRESS_COLUMNS: &str = "learner_id, word_id, times_attempted, times_correct, \
     times_incorrect, first_attempted_at, last_attempted_at, next_review_at, current_streak, \
     mastery_level";

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(
        &self,
        learner: LearnerId,
        word: WordId,
    ) -> Result<Option<ProgressRecord>, StorageError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM word_progress WHERE learner_id = ?1 AND word_id = ?2"
        );
        let row = sqlx::query(&sql)
            .bind(learner_id_to_i64(learner)?)
            .bind(word_id_to_i64(word)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn progress_for_learner(
        &self,
        learner: LearnerId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM word_progress WHERE learner_id = ?1 ORDER BY word_id"
        );
        let rows = sqlx::query(&sql)
            .bind(learner_id_to_i64(learner)?)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_progress_row).collect()
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO word_progress (
                learner_id, word_id, times_attempted, times_correct, times_incorrect,
                first_attempted_at, last_attempted_at, next_review_at, current_streak,
                mastery_level
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(learner_id, word_id) DO UPDATE SET
                -- first_attempted_at stays from the original insert
                times_attempted = excluded.times_attempted,
                times_correct = excluded.times_correct,
                times_incorrect = excluded.times_incorrect,
                last_attempted_at = excluded.last_attempted_at,
                next_review_at = excluded.next_review_at,
                current_streak = excluded.current_streak,
                mastery_level = excluded.mastery_level
            ",
        )
        .bind(learner_id_to_i64(record.learner_id)?)
        .bind(word_id_to_i64(record.word_id)?)
        .bind(i64::from(record.times_attempted))
        .bind(i64::from(record.times_correct))
        .bind(i64::from(record.times_incorrect))
        .bind(record.first_attempted_at)
        .bind(record.last_attempted_at)
        .bind(record.next_review_at)
        .bind(i64::from(record.current_streak))
        .bind(i64::from(record.mastery_level.value()))
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}

use bee_core::model::{Learner, LearnerId};
use chrono::{DateTime, Utc};

use super::SqliteRepository;
use super::mapping::{conn, learner_id_from_i64, learner_id_to_i64, map_learner_row};
use crate::repository::{LearnerRepository, StorageError};

#[async_trait::async_trait]
impl LearnerRepository for SqliteRepository {
    async fn insert_learner(
        &self,
        username: &str,
        is_guest: bool,
        created_at: DateTime<Utc>,
    ) -> Result<LearnerId, StorageError> {
        let result = sqlx::query(
            r"
            INSERT INTO learners (username, is_guest, created_at)
            VALUES (?1, ?2, ?3)
            ",
        )
        .bind(username)
        .bind(is_guest)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            other => conn(other),
        })?;

        learner_id_from_i64(result.last_insert_rowid())
    }

    async fn list_learners(&self) -> Result<Vec<Learner>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, username, is_guest, created_at
            FROM learners
            ORDER BY id
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_learner_row).collect()
    }

    async fn get_learner(&self, id: LearnerId) -> Result<Option<Learner>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, username, is_guest, created_at
            FROM learners
            WHERE id = ?1
            ",
        )
        .bind(learner_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_learner_row).transpose()
    }
}

use bee_core::model::{NewWord, Tier, WordEnrichment, WordEntry, WordId};
use sqlx::{Executor, Sqlite};

use super::SqliteRepository;
use super::mapping::{WORD_COLUMNS, conn, map_word_row, ser, word_id_from_i64, word_id_to_i64};
use crate::repository::{StorageError, WordRepository};

const INSERT_WORD: &str = r"
    INSERT INTO words (
        word, difficulty_level, definition, functional_label, pronunciation,
        has_audio, audio_url, audio_file_local, is_inflection, base_word,
        is_primary, primary_word
    )
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
";

async fn insert_one<'e, E>(executor: E, word: &NewWord) -> Result<WordId, StorageError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(INSERT_WORD)
        .bind(&word.spelling)
        .bind(i64::from(word.tier.level()))
        .bind(&word.definition)
        .bind(&word.functional_label)
        .bind(&word.pronunciation)
        .bind(word.has_audio)
        .bind(&word.audio_url)
        .bind(&word.audio_file_local)
        .bind(word.is_inflection)
        .bind(&word.base_word)
        .bind(word.role.is_primary())
        .bind(word.role.primary_word())
        .execute(executor)
        .await
        .map_err(conn)?;

    word_id_from_i64(result.last_insert_rowid())
}

#[async_trait::async_trait]
impl WordRepository for SqliteRepository {
    async fn insert_word(&self, word: NewWord) -> Result<WordId, StorageError> {
        insert_one(&self.pool, &word).await
    }

    async fn insert_words(&self, words: Vec<NewWord>) -> Result<Vec<WordId>, StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        let mut ids = Vec::with_capacity(words.len());
        for word in &words {
            ids.push(insert_one(&mut *tx, word).await?);
        }
        tx.commit().await.map_err(conn)?;
        Ok(ids)
    }

    async fn count_words(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        u64::try_from(count).map_err(ser)
    }

    async fn get_word(&self, id: WordId) -> Result<Option<WordEntry>, StorageError> {
        let sql = format!("SELECT {WORD_COLUMNS} FROM words WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(word_id_to_i64(id)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_word_row).transpose()
    }

    async fn primary_words(&self, tier: Tier) -> Result<Vec<WordEntry>, StorageError> {
        let sql = format!(
            "SELECT {WORD_COLUMNS} FROM words \
             WHERE difficulty_level = ?1 AND is_primary = 1 ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(tier.level()))
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_word_row).collect()
    }

    async fn alternates_of(
        &self,
        tier: Tier,
        primary: &str,
    ) -> Result<Vec<WordEntry>, StorageError> {
        let sql = format!(
            "SELECT {WORD_COLUMNS} FROM words \
             WHERE difficulty_level = ?1 AND is_primary = 0 AND primary_word = ?2 ORDER BY id"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(tier.level()))
            .bind(primary)
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter().map(map_word_row).collect()
    }

    async fn update_enrichment(
        &self,
        id: WordId,
        data: &WordEnrichment,
    ) -> Result<(), StorageError> {
        let result = sqlx::query(
            r"
            UPDATE words SET
                definition = ?2,
                functional_label = ?3,
                pronunciation = ?4,
                has_audio = ?5,
                audio_url = ?6,
                is_inflection = ?7,
                base_word = ?8
            WHERE id = ?1
            ",
        )
        .bind(word_id_to_i64(id)?)
        .bind(data.definition_text())
        .bind(data.functional_label.clone().unwrap_or_default())
        .bind(data.pronunciation.clone().unwrap_or_default())
        .bind(data.has_audio)
        .bind(data.audio_url.clone().unwrap_or_default())
        .bind(data.is_inflection)
        .bind(data.base_word.clone().unwrap_or_default())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}

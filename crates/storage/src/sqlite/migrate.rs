use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Applies the versioned schema: learners, words and per-learner word progress.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS learners (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    username TEXT NOT NULL UNIQUE,
                    is_guest INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS words (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    word TEXT NOT NULL,
                    difficulty_level INTEGER NOT NULL CHECK (difficulty_level BETWEEN 1 AND 3),
                    definition TEXT NOT NULL DEFAULT '',
                    functional_label TEXT NOT NULL DEFAULT '',
                    pronunciation TEXT NOT NULL DEFAULT '',
                    has_audio INTEGER NOT NULL DEFAULT 0,
                    audio_url TEXT NOT NULL DEFAULT '',
                    audio_file_local TEXT NOT NULL DEFAULT '',
                    is_inflection INTEGER NOT NULL DEFAULT 0,
                    base_word TEXT NOT NULL DEFAULT '',
                    is_primary INTEGER NOT NULL DEFAULT 1,
                    primary_word TEXT,
                    CHECK ((is_primary = 1) = (primary_word IS NULL))
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS word_progress (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    learner_id INTEGER NOT NULL,
                    word_id INTEGER NOT NULL,
                    times_attempted INTEGER NOT NULL CHECK (times_attempted >= 0),
                    times_correct INTEGER NOT NULL CHECK (times_correct >= 0),
                    times_incorrect INTEGER NOT NULL CHECK (times_incorrect >= 0),
                    first_attempted_at TEXT NOT NULL,
                    last_attempted_at TEXT NOT NULL,
                    next_review_at TEXT NOT NULL,
                    current_streak INTEGER NOT NULL CHECK (current_streak >= 0),
                    mastery_level INTEGER NOT NULL CHECK (mastery_level BETWEEN 0 AND 5),
                    UNIQUE (learner_id, word_id),
                    FOREIGN KEY (learner_id) REFERENCES learners(id) ON DELETE CASCADE,
                    FOREIGN KEY (word_id) REFERENCES words(id) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_words_level_primary
                    ON words(difficulty_level, is_primary);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_words_level_primary_word
                    ON words(difficulty_level, primary_word);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_progress_learner_next_review
                    ON word_progress(learner_id, next_review_at);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}

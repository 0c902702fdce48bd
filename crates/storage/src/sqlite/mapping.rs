use bee_core::model::{
    Learner, LearnerId, MasteryLevel, ProgressRecord, Tier, WordEntry, WordId, WordRole,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn word_id_to_i64(id: WordId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("word_id overflow".into()))
}

pub(crate) fn learner_id_to_i64(id: LearnerId) -> Result<i64, StorageError> {
    i64::try_from(id.value())
        .map_err(|_| StorageError::Serialization("learner_id overflow".into()))
}

pub(crate) fn word_id_from_i64(v: i64) -> Result<WordId, StorageError> {
    Ok(WordId::new(i64_to_u64("word_id", v)?))
}

pub(crate) fn learner_id_from_i64(v: i64) -> Result<LearnerId, StorageError> {
    Ok(LearnerId::new(i64_to_u64("learner_id", v)?))
}

pub(crate) const WORD_COLUMNS: &str = "id, word, difficulty_level, definition, functional_label, \
     pronunciation, has_audio, audio_url, audio_file_local, is_inflection, base_word, \
     is_primary, primary_word";

pub(crate) fn map_word_row(row: &SqliteRow) -> Result<WordEntry, StorageError> {
    let tier = Tier::from_level(row.try_get::<i64, _>("difficulty_level").map_err(ser)?)
        .map_err(ser)?;

    let is_primary: bool = row.try_get("is_primary").map_err(ser)?;
    let role = if is_primary {
        WordRole::Primary
    } else {
        let primary: Option<String> = row.try_get("primary_word").map_err(ser)?;
        WordRole::Alternate {
            primary: primary
                .ok_or_else(|| StorageError::Serialization("alternate without primary".into()))?,
        }
    };

    Ok(WordEntry {
        id: word_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        spelling: row.try_get("word").map_err(ser)?,
        tier,
        role,
        definition: row.try_get("definition").map_err(ser)?,
        functional_label: row.try_get("functional_label").map_err(ser)?,
        pronunciation: row.try_get("pronunciation").map_err(ser)?,
        has_audio: row.try_get("has_audio").map_err(ser)?,
        audio_url: row.try_get("audio_url").map_err(ser)?,
        audio_file_local: row.try_get("audio_file_local").map_err(ser)?,
        is_inflection: row.try_get("is_inflection").map_err(ser)?,
        base_word: row.try_get("base_word").map_err(ser)?,
    })
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let mastery: i64 = row.try_get("mastery_level").map_err(ser)?;
    let mastery = u8::try_from(mastery)
        .ok()
        .filter(|m| *m <= MasteryLevel::MAX.value())
        .ok_or_else(|| StorageError::Serialization(format!("invalid mastery_level: {mastery}")))?;

    Ok(ProgressRecord {
        learner_id: learner_id_from_i64(row.try_get::<i64, _>("learner_id").map_err(ser)?)?,
        word_id: word_id_from_i64(row.try_get::<i64, _>("word_id").map_err(ser)?)?,
        times_attempted: i64_to_u32(
            "times_attempted",
            row.try_get("times_attempted").map_err(ser)?,
        )?,
        times_correct: i64_to_u32("times_correct", row.try_get("times_correct").map_err(ser)?)?,
        times_incorrect: i64_to_u32(
            "times_incorrect",
            row.try_get("times_incorrect").map_err(ser)?,
        )?,
        first_attempted_at: row.try_get("first_attempted_at").map_err(ser)?,
        last_attempted_at: row.try_get("last_attempted_at").map_err(ser)?,
        next_review_at: row.try_get("next_review_at").map_err(ser)?,
        current_streak: i64_to_u32("current_streak", row.try_get("current_streak").map_err(ser)?)?,
        mastery_level: MasteryLevel::new(mastery),
    })
}

pub(crate) fn map_learner_row(row: &SqliteRow) -> Result<Learner, StorageError> {
    Ok(Learner {
        id: learner_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        username: row.try_get("username").map_err(ser)?,
        is_guest: row.try_get("is_guest").map_err(ser)?,
        created_at: row.try_get("created_at").map_err(ser)?,
    })
}

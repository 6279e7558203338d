use quiz_core::model::{AnswerOption, OptionId, Question, QuestionId, Topic, TopicId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn topic_id_from_i64(v: i64) -> Result<TopicId, StorageError> {
    Ok(TopicId::new(i64_to_u64("topic_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn option_id_from_i64(v: i64) -> Result<OptionId, StorageError> {
    Ok(OptionId::new(i64_to_u64("option_id", v)?))
}

pub(crate) fn map_topic_row(row: &SqliteRow) -> Result<Topic, StorageError> {
    let id = topic_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    let name: String = row.try_get("name").map_err(ser)?;
    Topic::new(id, name).map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    // `topicId` is nullable in the schema; every row this crate writes sets it.
    let topic_id = row
        .try_get::<Option<i64>, _>("topicId")
        .map_err(ser)?
        .ok_or_else(|| StorageError::Serialization("question without topicId".into()))?;
    Ok(Question {
        id: question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        topic_id: topic_id_from_i64(topic_id)?,
        text: row.try_get("text").map_err(ser)?,
    })
}

pub(crate) fn map_option_row(row: &SqliteRow) -> Result<AnswerOption, StorageError> {
    let question_id = row
        .try_get::<Option<i64>, _>("questionId")
        .map_err(ser)?
        .ok_or_else(|| StorageError::Serialization("option without questionId".into()))?;
    let is_correct = row
        .try_get::<Option<i64>, _>("isCorrect")
        .map_err(ser)?
        .is_some_and(|v| v != 0);
    Ok(AnswerOption {
        id: option_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        question_id: question_id_from_i64(question_id)?,
        text: row.try_get("text").map_err(ser)?,
        is_correct,
    })
}

pub(crate) fn count_from_row(row: &SqliteRow) -> Result<u64, StorageError> {
    i64_to_u64("count", row.try_get::<i64, _>(0).map_err(ser)?)
}

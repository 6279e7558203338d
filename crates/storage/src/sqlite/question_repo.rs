use quiz_core::model::{
    AnswerOption, Question, QuestionDetail, QuestionId, TopicId, ValidatedEdit, ValidatedQuestion,
};

use super::SqliteRepository;
use super::gateway::{SqlParam, db_error, execute_on};
use super::mapping::{
    count_from_row, id_i64, map_option_row, map_question_row, option_id_from_i64,
    question_id_from_i64,
};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(
        &self,
        question: &ValidatedQuestion,
    ) -> Result<QuestionDetail, StorageError> {
        let topic = id_i64("topic_id", question.topic_id.value())?;

        // Dropping `tx` on any early return rolls the whole insert back.
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let res = execute_on(
            &mut *tx,
            "INSERT INTO Question (topicId, text) VALUES (?1, ?2)",
            &[SqlParam::Int(topic), question.text.as_str().into()],
        )
        .await?;
        let question_id = question_id_from_i64(res.last_insert_id)?;
        let question_param = SqlParam::Int(res.last_insert_id);

        let mut options = Vec::with_capacity(question.options.len());
        for draft in &question.options {
            let res = execute_on(
                &mut *tx,
                r#"INSERT INTO "Option" (questionId, text, isCorrect) VALUES (?1, ?2, ?3)"#,
                &[
                    question_param.clone(),
                    draft.text.as_str().into(),
                    draft.is_correct.into(),
                ],
            )
            .await?;
            options.push(AnswerOption {
                id: option_id_from_i64(res.last_insert_id)?,
                question_id,
                text: draft.text.clone(),
                is_correct: draft.is_correct,
            });
        }

        tx.commit().await.map_err(db_error)?;

        Ok(QuestionDetail {
            question: Question {
                id: question_id,
                topic_id: question.topic_id,
                text: question.text.clone(),
            },
            options,
        })
    }

    async fn update_question(&self, edit: &ValidatedEdit) -> Result<(), StorageError> {
        let question = SqlParam::Int(id_i64("question_id", edit.id.value())?);
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let res = execute_on(
            &mut *tx,
            "UPDATE Question SET text = ?1 WHERE id = ?2",
            &[edit.text.as_str().into(), question.clone()],
        )
        .await?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound);
        }

        for option in &edit.options {
            let res = execute_on(
                &mut *tx,
                r#"UPDATE "Option" SET text = ?1, isCorrect = ?2 WHERE id = ?3 AND questionId = ?4"#,
                &[
                    option.text.as_str().into(),
                    option.is_correct.into(),
                    SqlParam::Int(id_i64("option_id", option.id.value())?),
                    question.clone(),
                ],
            )
            .await?;
            if res.rows_affected == 0 {
                return Err(StorageError::NotFound);
            }
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let question = [SqlParam::Int(id_i64("question_id", id.value())?)];
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let removed = execute_on(
            &mut *tx,
            r#"DELETE FROM "Option" WHERE questionId = ?1"#,
            &question,
        )
        .await?;
        let res = execute_on(&mut *tx, "DELETE FROM Question WHERE id = ?1", &question).await?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound);
        }

        tx.commit().await.map_err(db_error)?;
        tracing::debug!(question = %id, options = removed.rows_affected, "question deleted");
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuestionDetail>, StorageError> {
        let param = [SqlParam::Int(id_i64("question_id", id.value())?)];
        let Some(row) = self
            .fetch_first("SELECT id, topicId, text FROM Question WHERE id = ?1", &param)
            .await?
        else {
            return Ok(None);
        };
        let question = map_question_row(&row)?;

        let rows = self
            .fetch_all(
                r#"
                SELECT id, questionId, text, isCorrect
                FROM "Option"
                WHERE questionId = ?1
                ORDER BY id ASC
                "#,
                &param,
            )
            .await?;
        let mut options = Vec::with_capacity(rows.len());
        for row in rows {
            options.push(map_option_row(&row)?);
        }

        Ok(Some(QuestionDetail { question, options }))
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = self
            .fetch_all("SELECT id, topicId, text FROM Question ORDER BY id ASC", &[])
            .await?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn question_ids_for_topic(
        &self,
        topic_id: TopicId,
    ) -> Result<Vec<QuestionId>, StorageError> {
        let rows = self
            .fetch_all(
                "SELECT id FROM Question WHERE topicId = ?1 ORDER BY id ASC",
                &[SqlParam::Int(id_i64("topic_id", topic_id.value())?)],
            )
            .await?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(question_id_from_i64(
                sqlx::Row::try_get::<i64, _>(&row, "id")
                    .map_err(|e| StorageError::Serialization(e.to_string()))?,
            )?);
        }
        Ok(ids)
    }

    async fn count_questions_for_topic(&self, topic_id: TopicId) -> Result<u64, StorageError> {
        let row = self
            .fetch_first(
                "SELECT COUNT(*) FROM Question WHERE topicId = ?1",
                &[SqlParam::Int(id_i64("topic_id", topic_id.value())?)],
            )
            .await?
            .ok_or(StorageError::NotFound)?;
        count_from_row(&row)
    }
}

use std::sync::Arc;

use quiz_core::model::{
    OptionDraft, OptionEdit, Question, QuestionDetail, QuestionDraft, QuestionEdit, QuestionId,
    Topic, TopicId, normalize_topic_name,
};
use quiz_core::text::preview;
use storage::repository::{QuestionRepository, StorageError, TopicRepository};

use crate::error::CatalogError;

/// List row for a question: the stored fields plus a short preview for
/// narrow list layouts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct QuestionListItem {
    pub id: QuestionId,
    pub topic_id: TopicId,
    pub text: String,
    pub preview: String,
}

impl QuestionListItem {
    #[must_use]
    pub fn from_question(question: Question) -> Self {
        let preview = preview(&question.text);
        Self {
            id: question.id,
            topic_id: question.topic_id,
            text: question.text,
            preview,
        }
    }
}

/// Authoring operations over topics, questions and their options.
///
/// Every input is validated before the first write. Multi-row writes are
/// delegated to the repository, which applies them atomically.
#[derive(Clone)]
pub struct CatalogService {
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(topics: Arc<dyn TopicRepository>, questions: Arc<dyn QuestionRepository>) -> Self {
        Self { topics, questions }
    }

    //
    // ─── TOPICS ────────────────────────────────────────────────────────────────
    //

    /// Create a topic. The name is trimmed before it is stored.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Topic` for a blank name.
    /// Returns `CatalogError::DuplicateTopic` if the name is taken.
    /// Returns `CatalogError::Storage` if persistence fails.
    pub async fn create_topic(&self, name: &str) -> Result<Topic, CatalogError> {
        let name = normalize_topic_name(name)?;
        let topic = self
            .topics
            .insert_topic(&name)
            .await
            .map_err(|err| match err {
                StorageError::Conflict => CatalogError::DuplicateTopic { name: name.clone() },
                other => other.into(),
            })?;
        tracing::info!(topic = %topic.id(), name = topic.name(), "topic created");
        Ok(topic)
    }

    /// Rename a topic.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Topic` for a blank name,
    /// `CatalogError::TopicNotFound` if `id` is absent and
    /// `CatalogError::DuplicateTopic` if another topic has the name.
    pub async fn update_topic(&self, id: TopicId, name: &str) -> Result<Topic, CatalogError> {
        let name = normalize_topic_name(name)?;
        self.topics
            .rename_topic(id, &name)
            .await
            .map_err(|err| match err {
                StorageError::NotFound => CatalogError::TopicNotFound(id),
                StorageError::Conflict => CatalogError::DuplicateTopic { name: name.clone() },
                other => other.into(),
            })?;
        tracing::info!(topic = %id, name = %name, "topic renamed");
        Ok(Topic::new(id, name)?)
    }

    /// Delete a topic that no question references.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::TopicInUse` while questions reference the topic
    /// and `CatalogError::TopicNotFound` if `id` is absent.
    pub async fn delete_topic(&self, id: TopicId) -> Result<(), CatalogError> {
        if self.topics.get_topic(id).await?.is_none() {
            return Err(CatalogError::TopicNotFound(id));
        }

        let questions = self.questions.count_questions_for_topic(id).await?;
        if questions > 0 {
            tracing::warn!(topic = %id, questions, "refusing to delete topic in use");
            return Err(CatalogError::TopicInUse { id, questions });
        }

        self.topics.delete_topic(id).await.map_err(|err| match err {
            StorageError::NotFound => CatalogError::TopicNotFound(id),
            // A question was added between the count and the delete.
            StorageError::Conflict => CatalogError::TopicInUse { id, questions: 1 },
            other => other.into(),
        })?;
        tracing::info!(topic = %id, "topic deleted");
        Ok(())
    }

    /// Fetch a topic by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, CatalogError> {
        Ok(self.topics.get_topic(id).await?)
    }

    /// Look a topic up by name, ignoring surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn find_topic_by_name(&self, name: &str) -> Result<Option<Topic>, CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        Ok(self.topics.find_topic_by_name(name).await?)
    }

    /// All topics ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn list_topics(&self) -> Result<Vec<Topic>, CatalogError> {
        Ok(self.topics.list_topics().await?)
    }

    //
    // ─── QUESTIONS ─────────────────────────────────────────────────────────────
    //

    /// Create a question and its options under `topic_id`.
    ///
    /// Exactly one option must be marked correct. Options keep the order
    /// they are given in.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Question` for invalid drafts,
    /// `CatalogError::TopicNotFound` if the topic is absent and
    /// `CatalogError::Storage` if the insert fails (nothing is persisted then).
    pub async fn create_question(
        &self,
        topic_id: TopicId,
        text: &str,
        options: Vec<OptionDraft>,
    ) -> Result<QuestionDetail, CatalogError> {
        let draft = QuestionDraft::new(topic_id, text, options).validate()?;
        if self.topics.get_topic(topic_id).await?.is_none() {
            return Err(CatalogError::TopicNotFound(topic_id));
        }

        let detail = self
            .questions
            .insert_question(&draft)
            .await
            .map_err(|err| match err {
                StorageError::Conflict => CatalogError::TopicNotFound(topic_id),
                other => other.into(),
            })?;
        tracing::info!(
            question = %detail.id(),
            topic = %topic_id,
            options = detail.options.len(),
            "question created"
        );
        Ok(detail)
    }

    /// Rewrite a question's text and its existing options in place.
    ///
    /// `options` must name every stored option exactly once; options cannot
    /// be added or removed here. The stored order is kept.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::QuestionNotFound` if `id` is absent,
    /// `CatalogError::Question` if the edit is invalid and
    /// `CatalogError::Storage` if the update fails (nothing is changed then).
    pub async fn update_question(
        &self,
        id: QuestionId,
        text: &str,
        options: Vec<OptionEdit>,
    ) -> Result<QuestionDetail, CatalogError> {
        let current = self
            .questions
            .get_question(id)
            .await?
            .ok_or(CatalogError::QuestionNotFound(id))?;
        let edit = QuestionEdit::new(id, text, options).validate_against(&current.options)?;

        self.questions
            .update_question(&edit)
            .await
            .map_err(|err| match err {
                StorageError::NotFound => CatalogError::QuestionNotFound(id),
                other => other.into(),
            })?;
        tracing::info!(question = %id, "question updated");

        let mut updated = current;
        updated.question.text = edit.text;
        for (stored, edited) in updated.options.iter_mut().zip(edit.options) {
            stored.text = edited.text;
            stored.is_correct = edited.is_correct;
        }
        Ok(updated)
    }

    /// Delete a question together with its options.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::QuestionNotFound` if `id` is absent and
    /// `CatalogError::Storage` if the delete fails (nothing is removed then).
    pub async fn delete_question(&self, id: QuestionId) -> Result<(), CatalogError> {
        self.questions
            .delete_question(id)
            .await
            .map_err(|err| match err {
                StorageError::NotFound => CatalogError::QuestionNotFound(id),
                other => other.into(),
            })?;
        tracing::info!(question = %id, "question deleted");
        Ok(())
    }

    /// Fetch a question with its options in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn get_question(
        &self,
        id: QuestionId,
    ) -> Result<Option<QuestionDetail>, CatalogError> {
        Ok(self.questions.get_question(id).await?)
    }

    /// All questions ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if repository access fails.
    pub async fn list_questions(&self) -> Result<Vec<QuestionListItem>, CatalogError> {
        let questions = self.questions.list_questions().await?;
        Ok(questions
            .into_iter()
            .map(QuestionListItem::from_question)
            .collect())
    }
}

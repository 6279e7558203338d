use async_trait::async_trait;
use quiz_core::model::{
    AnswerOption, OptionId, Question, QuestionDetail, QuestionId, Topic, TopicId, ValidatedEdit,
    ValidatedQuestion,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    /// A uniqueness or referential constraint rejected the write.
    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for topics.
#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Insert a topic with an already-normalized name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the name is taken.
    async fn insert_topic(&self, name: &str) -> Result<Topic, StorageError>;

    /// Rename a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is absent and
    /// `StorageError::Conflict` if another topic already has the name.
    async fn rename_topic(&self, id: TopicId, name: &str) -> Result<(), StorageError>;

    /// Delete a topic row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is absent and
    /// `StorageError::Conflict` if questions still reference it.
    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError>;

    /// Fetch a topic by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError>;

    /// Fetch a topic by exact name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn find_topic_by_name(&self, name: &str) -> Result<Option<Topic>, StorageError>;

    /// All topics ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError>;
}

/// Repository contract for questions and their options.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert a question and all of its options as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any statement fails; nothing is persisted then.
    async fn insert_question(
        &self,
        question: &ValidatedQuestion,
    ) -> Result<QuestionDetail, StorageError>;

    /// Rewrite question text and each option in place, atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question or an option row is
    /// absent; other failures leave the stored rows untouched.
    async fn update_question(&self, edit: &ValidatedEdit) -> Result<(), StorageError>;

    /// Delete a question's options and then the question, atomically.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the question is absent.
    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError>;

    /// Fetch a question with its options in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<QuestionDetail>, StorageError>;

    /// All questions ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_questions(&self) -> Result<Vec<Question>, StorageError>;

    /// Ids of every question under a topic, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn question_ids_for_topic(
        &self,
        topic_id: TopicId,
    ) -> Result<Vec<QuestionId>, StorageError>;

    /// Number of questions referencing a topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn count_questions_for_topic(&self, topic_id: TopicId) -> Result<u64, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    topics: BTreeMap<TopicId, Topic>,
    questions: BTreeMap<QuestionId, Question>,
    options: BTreeMap<OptionId, AnswerOption>,
    next_topic: u64,
    next_question: u64,
    next_option: u64,
}

impl MemoryState {
    fn options_for(&self, id: QuestionId) -> Vec<AnswerOption> {
        self.options
            .values()
            .filter(|o| o.question_id == id)
            .cloned()
            .collect()
    }
}

/// In-memory repository for tests and prototyping.
///
/// Mirrors the `SQLite` constraints: unique topic names, and no topic or
/// question removal while rows still reference it.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

fn to_serialization<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[async_trait]
impl TopicRepository for InMemoryRepository {
    async fn insert_topic(&self, name: &str) -> Result<Topic, StorageError> {
        let mut guard = self.lock()?;
        if guard.topics.values().any(|t| t.name() == name) {
            return Err(StorageError::Conflict);
        }
        guard.next_topic += 1;
        let topic = Topic::new(TopicId::new(guard.next_topic), name).map_err(to_serialization)?;
        guard.topics.insert(topic.id(), topic.clone());
        Ok(topic)
    }

    async fn rename_topic(&self, id: TopicId, name: &str) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.topics.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        if guard.topics.values().any(|t| t.id() != id && t.name() == name) {
            return Err(StorageError::Conflict);
        }
        let renamed = Topic::new(id, name).map_err(to_serialization)?;
        guard.topics.insert(id, renamed);
        Ok(())
    }

    async fn delete_topic(&self, id: TopicId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.topics.contains_key(&id) {
            return Err(StorageError::NotFound);
        }
        if guard.questions.values().any(|q| q.topic_id == id) {
            return Err(StorageError::Conflict);
        }
        guard.topics.remove(&id);
        Ok(())
    }

    async fn get_topic(&self, id: TopicId) -> Result<Option<Topic>, StorageError> {
        Ok(self.lock()?.topics.get(&id).cloned())
    }

    async fn find_topic_by_name(&self, name: &str) -> Result<Option<Topic>, StorageError> {
        Ok(self
            .lock()?
            .topics
            .values()
            .find(|t| t.name() == name)
            .cloned())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, StorageError> {
        Ok(self.lock()?.topics.values().cloned().collect())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(
        &self,
        question: &ValidatedQuestion,
    ) -> Result<QuestionDetail, StorageError> {
        let mut guard = self.lock()?;
        if !guard.topics.contains_key(&question.topic_id) {
            return Err(StorageError::Conflict);
        }

        guard.next_question += 1;
        let row = Question {
            id: QuestionId::new(guard.next_question),
            topic_id: question.topic_id,
            text: question.text.clone(),
        };

        let mut options = Vec::with_capacity(question.options.len());
        for draft in &question.options {
            guard.next_option += 1;
            options.push(AnswerOption {
                id: OptionId::new(guard.next_option),
                question_id: row.id,
                text: draft.text.clone(),
                is_correct: draft.is_correct,
            });
        }

        guard.questions.insert(row.id, row.clone());
        for option in &options {
            guard.options.insert(option.id, option.clone());
        }
        Ok(QuestionDetail {
            question: row,
            options,
        })
    }

    async fn update_question(&self, edit: &ValidatedEdit) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if !guard.questions.contains_key(&edit.id) {
            return Err(StorageError::NotFound);
        }
        // Check every option before touching anything so a bad edit writes nothing.
        for option in &edit.options {
            match guard.options.get(&option.id) {
                Some(stored) if stored.question_id == edit.id => {}
                _ => return Err(StorageError::NotFound),
            }
        }

        if let Some(question) = guard.questions.get_mut(&edit.id) {
            question.text.clone_from(&edit.text);
        }
        for option in &edit.options {
            if let Some(stored) = guard.options.get_mut(&option.id) {
                stored.text.clone_from(&option.text);
                stored.is_correct = option.is_correct;
            }
        }
        Ok(())
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        if guard.questions.remove(&id).is_none() {
            return Err(StorageError::NotFound);
        }
        guard.options.retain(|_, o| o.question_id != id);
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuestionDetail>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.questions.get(&id).map(|q| QuestionDetail {
            question: q.clone(),
            options: guard.options_for(id),
        }))
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        Ok(self.lock()?.questions.values().cloned().collect())
    }

    async fn question_ids_for_topic(
        &self,
        topic_id: TopicId,
    ) -> Result<Vec<QuestionId>, StorageError> {
        Ok(self
            .lock()?
            .questions
            .values()
            .filter(|q| q.topic_id == topic_id)
            .map(|q| q.id)
            .collect())
    }

    async fn count_questions_for_topic(&self, topic_id: TopicId) -> Result<u64, StorageError> {
        let count = self
            .lock()?
            .questions
            .values()
            .filter(|q| q.topic_id == topic_id)
            .count();
        u64::try_from(count).map_err(to_serialization)
    }
}

/// Bundles the repositories behind trait objects so backends can be swapped.
#[derive(Clone)]
pub struct Storage {
    pub topics: Arc<dyn TopicRepository>,
    pub questions: Arc<dyn QuestionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let topics: Arc<dyn TopicRepository> = Arc::new(repo.clone());
        let questions: Arc<dyn QuestionRepository> = Arc::new(repo);
        Self { topics, questions }
    }
}

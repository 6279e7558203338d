use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

use quiz_core::model::{QuestionDetail, TopicId};
use storage::repository::{QuestionRepository, StorageError, TopicRepository};

use super::sampling::sample;
use super::session::QuizSession;
use crate::Clock;
use crate::error::QuizError;

/// Quiz lengths offered by the menu.
pub const QUIZ_LENGTH_PRESETS: [usize; 3] = [5, 10, 15];

/// Quiz length used when the caller does not choose one.
pub const DEFAULT_QUIZ_LENGTH: usize = QUIZ_LENGTH_PRESETS[0];

#[derive(Clone)]
enum QuestionOrder {
    Random,
    Seeded(Arc<Mutex<StdRng>>),
}

/// Loads quiz sessions from storage.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    topics: Arc<dyn TopicRepository>,
    questions: Arc<dyn QuestionRepository>,
    order: QuestionOrder,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        topics: Arc<dyn TopicRepository>,
        questions: Arc<dyn QuestionRepository>,
    ) -> Self {
        Self {
            clock,
            topics,
            questions,
            order: QuestionOrder::Random,
        }
    }

    /// Draw questions from a seeded generator so selections are repeatable.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.order = QuestionOrder::Seeded(Arc::new(Mutex::new(StdRng::seed_from_u64(seed))));
        self
    }

    /// Start a quiz of up to `count` questions on the topic named
    /// `topic_name`.
    ///
    /// Questions are drawn uniformly without replacement; a topic with fewer
    /// than `count` questions yields all of them. Each question comes with
    /// its options in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidCount` if `count` is zero,
    /// `QuizError::TopicNotFound` if no topic has that name,
    /// `QuizError::Empty` if the topic has no questions and
    /// `QuizError::Storage` if loading fails.
    pub async fn start_session(
        &self,
        topic_name: &str,
        count: usize,
    ) -> Result<QuizSession, QuizError> {
        if count == 0 {
            return Err(QuizError::InvalidCount);
        }

        let name = topic_name.trim();
        let topic = match name {
            "" => None,
            _ => self.topics.find_topic_by_name(name).await?,
        }
        .ok_or_else(|| QuizError::TopicNotFound(name.to_owned()))?;

        let topic_id = topic.id();
        let mut session = QuizSession::idle();
        session.begin_loading(topic)?;

        let questions = match self.load_questions(topic_id, count).await {
            Ok(questions) => questions,
            Err(err) => {
                session.fail_loading()?;
                return Err(err);
            }
        };
        let selected = questions.len();
        session.finish_loading(questions, self.clock.now())?;

        tracing::info!(topic = %topic_id, requested = count, selected, "quiz started");
        Ok(session)
    }

    async fn load_questions(
        &self,
        topic_id: TopicId,
        count: usize,
    ) -> Result<Vec<QuestionDetail>, QuizError> {
        let ids = self.questions.question_ids_for_topic(topic_id).await?;
        let available = ids.len();
        let picked = self.pick(ids, count);
        tracing::debug!(topic = %topic_id, available, picked = picked.len(), "sampled questions");

        let mut questions = Vec::with_capacity(picked.len());
        for id in picked {
            let detail = self
                .questions
                .get_question(id)
                .await?
                .ok_or(StorageError::NotFound)?;
            questions.push(detail);
        }
        Ok(questions)
    }

    fn pick<T>(&self, items: Vec<T>, count: usize) -> Vec<T> {
        match &self.order {
            QuestionOrder::Random => sample(items, count, &mut rand::rng()),
            QuestionOrder::Seeded(rng) => {
                let mut guard = rng.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                sample(items, count, &mut *guard)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ErrorKind;
    use crate::quiz::QuizState;
    use quiz_core::model::{OptionDraft, QuestionDraft, QuestionId};
    use quiz_core::time::fixed_now;
    use std::collections::HashSet;
    use storage::repository::InMemoryRepository;

    async fn repo_with_questions(topic: &str, count: usize) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let topic = repo.insert_topic(topic).await.unwrap();
        for i in 0..count {
            let draft = QuestionDraft::new(
                topic.id(),
                format!("Question {i}"),
                vec![OptionDraft::new("yes", true), OptionDraft::new("no", false)],
            )
            .validate()
            .unwrap();
            repo.insert_question(&draft).await.unwrap();
        }
        repo
    }

    fn service(repo: InMemoryRepository) -> QuizService {
        QuizService::new(Clock::Fixed(fixed_now()), Arc::new(repo.clone()), Arc::new(repo))
    }

    #[tokio::test]
    async fn under_supplied_topic_returns_all_questions() {
        let quiz = service(repo_with_questions("Geography", 3).await);
        let session = quiz.start_session("Geography", 5).await.unwrap();

        assert_eq!(session.state(), QuizState::InProgress);
        assert_eq!(session.questions().len(), 3);
        assert_eq!(session.started_at(), Some(fixed_now()));
        let ids: HashSet<_> = session.questions().iter().map(QuestionDetail::id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn empty_topic_is_an_empty_error() {
        let quiz = service(repo_with_questions("Geography", 0).await);
        let err = quiz.start_session("Geography", 5).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Empty);
    }

    #[tokio::test]
    async fn unknown_topic_is_not_found() {
        let quiz = service(repo_with_questions("Geography", 2).await);
        let err = quiz.start_session("Astronomy", 5).await.unwrap_err();
        assert!(matches!(err, QuizError::TopicNotFound(ref name) if name == "Astronomy"));

        let err = quiz.start_session("   ", 5).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn zero_count_is_rejected() {
        let quiz = service(repo_with_questions("Geography", 2).await);
        let err = quiz.start_session("Geography", 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn selection_is_capped_and_distinct() {
        let quiz = service(repo_with_questions("Geography", 12).await).with_seed(9);
        let session = quiz.start_session("Geography", 5).await.unwrap();

        let ids: HashSet<QuestionId> =
            session.questions().iter().map(QuestionDetail::id).collect();
        assert_eq!(ids.len(), 5);
        assert!(session.questions().iter().all(|q| q.options.len() == 2));
    }

    #[tokio::test]
    async fn seeded_services_repeat_their_selection() {
        let repo = repo_with_questions("Geography", 15).await;
        let a = service(repo.clone()).with_seed(1234);
        let b = service(repo).with_seed(1234);

        let pick = |s: &QuizSession| {
            s.questions()
                .iter()
                .map(QuestionDetail::id)
                .collect::<Vec<_>>()
        };
        let first = a.start_session("Geography", 10).await.unwrap();
        let second = b.start_session("Geography", 10).await.unwrap();
        assert_eq!(pick(&first), pick(&second));
    }

    /// Lists ids fine, then fails every load.
    struct BrokenLoads(InMemoryRepository);

    #[async_trait::async_trait]
    impl QuestionRepository for BrokenLoads {
        async fn insert_question(
            &self,
            question: &quiz_core::model::ValidatedQuestion,
        ) -> Result<QuestionDetail, StorageError> {
            self.0.insert_question(question).await
        }

        async fn update_question(
            &self,
            edit: &quiz_core::model::ValidatedEdit,
        ) -> Result<(), StorageError> {
            self.0.update_question(edit).await
        }

        async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
            self.0.delete_question(id).await
        }

        async fn get_question(
            &self,
            _id: QuestionId,
        ) -> Result<Option<QuestionDetail>, StorageError> {
            Err(StorageError::Connection("disk I/O error".into()))
        }

        async fn list_questions(&self) -> Result<Vec<quiz_core::model::Question>, StorageError> {
            self.0.list_questions().await
        }

        async fn question_ids_for_topic(
            &self,
            topic_id: TopicId,
        ) -> Result<Vec<QuestionId>, StorageError> {
            self.0.question_ids_for_topic(topic_id).await
        }

        async fn count_questions_for_topic(&self, topic_id: TopicId) -> Result<u64, StorageError> {
            self.0.count_questions_for_topic(topic_id).await
        }
    }

    #[tokio::test]
    async fn load_failures_surface_as_persistence_errors() {
        let repo = repo_with_questions("Geography", 3).await;
        let quiz = QuizService::new(
            Clock::Fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(BrokenLoads(repo)),
        );

        let err = quiz.start_session("Geography", 5).await.unwrap_err();
        assert!(matches!(err, QuizError::Storage(StorageError::Connection(_))));
        assert_eq!(err.kind(), ErrorKind::Persistence);
    }

    #[test]
    fn presets_match_menu() {
        assert_eq!(QUIZ_LENGTH_PRESETS, [5, 10, 15]);
        assert_eq!(DEFAULT_QUIZ_LENGTH, 5);
    }
}

use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{OptionId, QuestionDetail, QuestionId, Tally, Topic};

use super::progress::QuizProgress;
use crate::error::QuizError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub enum QuizState {
    #[default]
    Idle,
    Loading,
    InProgress,
    Finished,
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::InProgress => "in progress",
            Self::Finished => "finished",
        };
        f.write_str(label)
    }
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// One answered question, recorded in answer order.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AnsweredQuestion {
    pub question_id: QuestionId,
    pub question: String,
    pub chosen: OptionId,
    pub is_correct: bool,
}

/// What `QuizSession::answer` reports back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
    /// The option that was marked correct, if the question had one.
    pub correct_option: Option<OptionId>,
    pub is_complete: bool,
}

/// Terminal tally of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct QuizResult {
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub total: u32,
    pub percentage: f64,
}

impl From<Tally> for QuizResult {
    fn from(tally: Tally) -> Self {
        Self {
            correct_count: tally.correct,
            incorrect_count: tally.incorrect,
            total: tally.total(),
            percentage: tally.percentage(),
        }
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory run through a sampled sequence of questions.
///
/// The question list is fixed once loading finishes; answering steps through
/// it in order. Nothing here touches storage, so every transition can be
/// driven directly.
#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    state: QuizState,
    topic: Option<Topic>,
    questions: Vec<QuestionDetail>,
    current: usize,
    tally: Tally,
    history: Vec<AnsweredQuestion>,
    started_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> QuizState {
        self.state
    }

    #[must_use]
    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionDetail] {
        &self.questions
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn tally(&self) -> Tally {
        self.tally
    }

    #[must_use]
    pub fn history(&self) -> &[AnsweredQuestion] {
        &self.history
    }

    fn expect_state(&self, expected: QuizState, operation: &'static str) -> Result<(), QuizError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(QuizError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// `Idle → Loading` for the resolved topic.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless the session is idle.
    pub fn begin_loading(&mut self, topic: Topic) -> Result<(), QuizError> {
        self.expect_state(QuizState::Idle, "start loading")?;
        self.topic = Some(topic);
        self.state = QuizState::Loading;
        Ok(())
    }

    /// `Loading → InProgress` with the sampled questions.
    ///
    /// An empty selection sends the session back to `Idle`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless the session is loading and
    /// `QuizError::Empty` if `questions` is empty.
    pub fn finish_loading(
        &mut self,
        questions: Vec<QuestionDetail>,
        started_at: DateTime<Utc>,
    ) -> Result<(), QuizError> {
        self.expect_state(QuizState::Loading, "finish loading")?;
        if questions.is_empty() {
            let topic = self
                .topic
                .take()
                .map(|t| t.name().to_owned())
                .unwrap_or_default();
            self.reset();
            return Err(QuizError::Empty { topic });
        }

        self.questions = questions;
        self.current = 0;
        self.tally = Tally::default();
        self.history.clear();
        self.started_at = Some(started_at);
        self.state = QuizState::InProgress;
        Ok(())
    }

    /// `Loading → Idle` after a failed load.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless the session is loading.
    pub fn fail_loading(&mut self) -> Result<(), QuizError> {
        self.expect_state(QuizState::Loading, "fail loading")?;
        self.reset();
        Ok(())
    }

    /// The question awaiting an answer.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless the quiz is in progress.
    pub fn current_question(&self) -> Result<&QuestionDetail, QuizError> {
        self.expect_state(QuizState::InProgress, "show a question")?;
        self.questions
            .get(self.current)
            .ok_or(QuizError::InvalidState {
                operation: "show a question",
                state: self.state,
            })
    }

    /// Score `option_id` against the current question and advance.
    ///
    /// Answering the last question moves the session to `Finished`. A
    /// rejected answer leaves the session unchanged.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless the quiz is in progress and
    /// `QuizError::UnknownOption` if the option does not belong to the
    /// current question.
    pub fn answer(&mut self, option_id: OptionId) -> Result<AnswerOutcome, QuizError> {
        let question = self.current_question()?;
        let chosen = question
            .option(option_id)
            .ok_or(QuizError::UnknownOption(option_id))?;

        let is_correct = chosen.is_correct;
        let correct_option = question.correct_option().map(|o| o.id);
        let record = AnsweredQuestion {
            question_id: question.id(),
            question: question.text().to_owned(),
            chosen: option_id,
            is_correct,
        };

        self.tally.record(is_correct);
        self.history.push(record);
        self.current += 1;
        if self.current >= self.questions.len() {
            self.state = QuizState::Finished;
        }

        Ok(AnswerOutcome {
            is_correct,
            correct_option,
            is_complete: self.state == QuizState::Finished,
        })
    }

    /// Final counts and percentage.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidState` unless the quiz is finished.
    pub fn result(&self) -> Result<QuizResult, QuizError> {
        self.expect_state(QuizState::Finished, "read the result")?;
        Ok(self.tally.into())
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        let answered = self.history.len();
        QuizProgress {
            total,
            answered,
            remaining: total.saturating_sub(answered),
            is_complete: self.state == QuizState::Finished,
        }
    }

    /// Discard the session from any state and return to `Idle`.
    pub fn abandon(&mut self) {
        if self.state == QuizState::InProgress {
            tracing::info!(answered = self.history.len(), "quiz abandoned");
        }
        self.reset();
    }

    fn reset(&mut self) {
        *self = Self::idle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use quiz_core::model::{AnswerOption, Question, TopicId};
    use quiz_core::time::fixed_now;

    fn topic() -> Topic {
        Topic::new(TopicId::new(1), "Geography").unwrap()
    }

    fn question(id: u64, correct: u64, wrong: u64) -> QuestionDetail {
        let qid = QuestionId::new(id);
        QuestionDetail {
            question: Question {
                id: qid,
                topic_id: TopicId::new(1),
                text: format!("Question {id}"),
            },
            options: vec![
                AnswerOption {
                    id: OptionId::new(correct),
                    question_id: qid,
                    text: "right".into(),
                    is_correct: true,
                },
                AnswerOption {
                    id: OptionId::new(wrong),
                    question_id: qid,
                    text: "wrong".into(),
                    is_correct: false,
                },
            ],
        }
    }

    fn started(questions: Vec<QuestionDetail>) -> QuizSession {
        let mut session = QuizSession::idle();
        session.begin_loading(topic()).unwrap();
        session.finish_loading(questions, fixed_now()).unwrap();
        session
    }

    #[test]
    fn walks_through_every_state() {
        let mut session = QuizSession::idle();
        assert_eq!(session.state(), QuizState::Idle);

        session.begin_loading(topic()).unwrap();
        assert_eq!(session.state(), QuizState::Loading);

        session
            .finish_loading(vec![question(1, 10, 11)], fixed_now())
            .unwrap();
        assert_eq!(session.state(), QuizState::InProgress);
        assert_eq!(session.started_at(), Some(fixed_now()));

        let outcome = session.answer(OptionId::new(10)).unwrap();
        assert!(outcome.is_correct);
        assert!(outcome.is_complete);
        assert_eq!(session.state(), QuizState::Finished);
    }

    #[test]
    fn correct_answers_score_full_marks() {
        let mut session = started(vec![question(1, 10, 11), question(2, 20, 21)]);
        let first = session.current_question().unwrap().id();
        let right = if first == QuestionId::new(1) { 10 } else { 20 };
        session.answer(OptionId::new(right)).unwrap();

        let right = session.current_question().unwrap().correct_option().unwrap().id;
        session.answer(right).unwrap();

        let result = session.result().unwrap();
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.incorrect_count, 0);
        assert_eq!(result.total, 2);
        assert!((result.percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unknown_option_changes_nothing() {
        let mut session = started(vec![question(1, 10, 11), question(2, 20, 21)]);

        // Option 20 exists, but on the second question.
        let err = session.answer(OptionId::new(20)).unwrap_err();
        assert!(matches!(err, QuizError::UnknownOption(id) if id == OptionId::new(20)));

        assert_eq!(session.tally(), Tally::default());
        assert_eq!(session.progress().answered, 0);
        assert_eq!(session.current_question().unwrap().id(), QuestionId::new(1));
        assert_eq!(session.state(), QuizState::InProgress);
    }

    #[test]
    fn wrong_answers_are_counted_and_recorded() {
        let mut session = started(vec![question(1, 10, 11), question(2, 20, 21)]);
        let outcome = session.answer(OptionId::new(11)).unwrap();
        assert!(!outcome.is_correct);
        assert_eq!(outcome.correct_option, Some(OptionId::new(10)));
        assert!(!outcome.is_complete);
        session.answer(OptionId::new(20)).unwrap();

        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].question, "Question 1");
        assert_eq!(history[0].chosen, OptionId::new(11));
        assert!(!history[0].is_correct);
        assert!(history[1].is_correct);

        let result = session.result().unwrap();
        assert_eq!((result.correct_count, result.incorrect_count), (1, 1));
        assert!((result.percentage - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn current_question_after_finish_is_a_state_error() {
        let mut session = started(vec![question(1, 10, 11)]);
        session.answer(OptionId::new(10)).unwrap();

        let err = session.current_question().unwrap_err();
        assert!(matches!(
            err,
            QuizError::InvalidState {
                state: QuizState::Finished,
                ..
            }
        ));
        assert!(session.answer(OptionId::new(10)).is_err());
    }

    #[test]
    fn result_before_finish_is_a_state_error() {
        let session = started(vec![question(1, 10, 11)]);
        assert!(matches!(
            session.result(),
            Err(QuizError::InvalidState {
                state: QuizState::InProgress,
                ..
            })
        ));
        assert!(QuizSession::idle().result().is_err());
    }

    #[test]
    fn empty_selection_returns_to_idle() {
        let mut session = QuizSession::idle();
        session.begin_loading(topic()).unwrap();

        let err = session.finish_loading(Vec::new(), fixed_now()).unwrap_err();
        assert!(matches!(err, QuizError::Empty { ref topic } if topic == "Geography"));
        assert_eq!(session.state(), QuizState::Idle);
        assert!(session.topic().is_none());
    }

    #[test]
    fn loading_transitions_are_guarded() {
        let mut session = QuizSession::idle();
        assert!(session.finish_loading(vec![question(1, 10, 11)], fixed_now()).is_err());
        assert!(session.fail_loading().is_err());

        session.begin_loading(topic()).unwrap();
        assert!(session.begin_loading(topic()).is_err());
        session.fail_loading().unwrap();
        assert_eq!(session.state(), QuizState::Idle);
    }

    #[test]
    fn progress_tracks_answers() {
        let mut session = started(vec![question(1, 10, 11), question(2, 20, 21)]);
        assert_eq!(
            session.progress(),
            QuizProgress {
                total: 2,
                answered: 0,
                remaining: 2,
                is_complete: false,
            }
        );

        session.answer(OptionId::new(10)).unwrap();
        let progress = session.progress();
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining, 1);
        assert!((progress.ratio() - 0.5).abs() < f64::EPSILON);

        session.answer(OptionId::new(21)).unwrap();
        assert!(session.progress().is_complete);
    }

    #[test]
    fn abandon_discards_everything() {
        let mut session = started(vec![question(1, 10, 11), question(2, 20, 21)]);
        session.answer(OptionId::new(10)).unwrap();

        session.abandon();
        assert_eq!(session.state(), QuizState::Idle);
        assert!(session.questions().is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.progress(), QuizProgress::default());

        // The same value can be reused for a new run.
        session.begin_loading(topic()).unwrap();
        assert_eq!(session.state(), QuizState::Loading);
    }
}

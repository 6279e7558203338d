//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{OptionId, QuestionError, QuestionId, TopicError, TopicId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::quiz::QuizState;

/// Coarse classification every service error maps onto.
///
/// Callers that only need to pick a message or a status code match on this
/// instead of the concrete enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input, rejected before any write.
    Validation,
    /// Uniqueness or referential-integrity violation.
    Conflict,
    /// A referenced id or name does not exist.
    NotFound,
    /// The operation has no eligible data to work on.
    Empty,
    /// The operation is invalid in the current session state.
    State,
    /// The store failed; multi-statement writes were rolled back.
    Persistence,
}

fn storage_kind(err: &StorageError) -> ErrorKind {
    match err {
        StorageError::NotFound => ErrorKind::NotFound,
        StorageError::Conflict => ErrorKind::Conflict,
        _ => ErrorKind::Persistence,
    }
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error("a topic named {name:?} already exists")]
    DuplicateTopic { name: String },
    #[error("topic {id} still has {questions} question(s)")]
    TopicInUse { id: TopicId, questions: u64 },
    #[error("topic {0} not found")]
    TopicNotFound(TopicId),
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CatalogError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Topic(_) | Self::Question(_) => ErrorKind::Validation,
            Self::DuplicateTopic { .. } | Self::TopicInUse { .. } => ErrorKind::Conflict,
            Self::TopicNotFound(_) | Self::QuestionNotFound(_) => ErrorKind::NotFound,
            Self::Storage(err) => storage_kind(err),
        }
    }
}

/// Errors emitted by the quiz session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a quiz needs at least one question")]
    InvalidCount,
    #[error("no topic named {0:?}")]
    TopicNotFound(String),
    #[error("topic {topic:?} has no questions")]
    Empty { topic: String },
    #[error("option {0} is not an option of the current question")]
    UnknownOption(OptionId),
    #[error("cannot {operation} while the quiz is {state}")]
    InvalidState {
        operation: &'static str,
        state: QuizState,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuizError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCount => ErrorKind::Validation,
            Self::TopicNotFound(_) | Self::UnknownOption(_) => ErrorKind::NotFound,
            Self::Empty { .. } => ErrorKind::Empty,
            Self::InvalidState { .. } => ErrorKind::State,
            Self::Storage(err) => storage_kind(err),
        }
    }
}

/// Errors emitted by `ResultReporter`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportError {
    #[error("{field} cannot be negative (got {value})")]
    NegativeCount { field: &'static str, value: i64 },
    #[error("{field} is too large (got {value})")]
    CountOverflow { field: &'static str, value: i64 },
    #[error("history has {found} {what} but the tally says {expected}")]
    HistoryMismatch {
        what: &'static str,
        expected: u32,
        found: usize,
    },
    #[error("quiz is {0}, results are only available once it is finished")]
    NotFinished(QuizState),
}

impl ReportError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFinished(_) => ErrorKind::State,
            _ => ErrorKind::Validation,
        }
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

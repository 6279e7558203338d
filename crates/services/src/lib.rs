#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod quiz;
pub mod report;
pub mod sample;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog::{CatalogService, QuestionListItem};
pub use error::{AppServicesError, CatalogError, ErrorKind, QuizError, ReportError};
pub use quiz::{
    AnswerOutcome, AnsweredQuestion, QuizProgress, QuizResult, QuizService, QuizSession,
    QuizState,
};
pub use report::{QuizReport, ReportItem, ResultReporter, Verdict};

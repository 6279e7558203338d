mod progress;
mod sampling;
mod service;
mod session;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use progress::QuizProgress;
pub use service::{DEFAULT_QUIZ_LENGTH, QUIZ_LENGTH_PRESETS, QuizService};
pub use session::{AnswerOutcome, AnsweredQuestion, QuizResult, QuizSession, QuizState};

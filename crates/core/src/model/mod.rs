mod ids;
mod question;
mod tally;
mod topic;

pub use ids::{OptionId, ParseIdError, QuestionId, TopicId};
pub use question::{
    AnswerOption, OptionDraft, OptionEdit, Question, QuestionDetail, QuestionDraft, QuestionEdit,
    QuestionError, ValidatedEdit, ValidatedQuestion,
};
pub use tally::Tally;
pub use topic::{Topic, TopicError, normalize_topic_name};

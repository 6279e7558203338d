use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId, TopicId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least one option")]
    NoOptions,

    #[error("option {index} text cannot be empty")]
    EmptyOptionText { index: usize },

    #[error("exactly one option must be marked correct, none were")]
    NoCorrectOption,

    #[error("exactly one option must be marked correct, {count} were")]
    MultipleCorrectOptions { count: usize },

    #[error("option {0} does not belong to this question")]
    UnknownOption(OptionId),

    #[error("option {0} appears more than once")]
    DuplicateOption(OptionId),

    #[error("option {0} is missing from the edit")]
    MissingOption(OptionId),
}

//
// ─── PERSISTED ROWS ────────────────────────────────────────────────────────────
//

/// A quiz prompt belonging to one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub topic_id: TopicId,
    pub text: String,
}

/// One selectable answer for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: OptionId,
    pub question_id: QuestionId,
    pub text: String,
    pub is_correct: bool,
}

/// A question together with its options in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDetail {
    pub question: Question,
    pub options: Vec<AnswerOption>,
}

impl QuestionDetail {
    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.question.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.question.text
    }

    #[must_use]
    pub fn option(&self, id: OptionId) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == id)
    }

    /// First option flagged correct, if any.
    #[must_use]
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}

//
// ─── AUTHORING ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDraft {
    pub text: String,
    pub is_correct: bool,
}

impl OptionDraft {
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// Unvalidated input for a new question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub topic_id: TopicId,
    pub text: String,
    pub options: Vec<OptionDraft>,
}

/// A question whose text and options passed authoring validation.
///
/// Texts are trimmed and option order is the input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuestion {
    pub topic_id: TopicId,
    pub text: String,
    pub options: Vec<OptionDraft>,
}

impl QuestionDraft {
    #[must_use]
    pub fn new(topic_id: TopicId, text: impl Into<String>, options: Vec<OptionDraft>) -> Self {
        Self {
            topic_id,
            text: text.into(),
            options,
        }
    }

    /// Validate the draft.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or any option text is blank, or
    /// if the number of correct options is not exactly one.
    pub fn validate(self) -> Result<ValidatedQuestion, QuestionError> {
        let text = non_blank(&self.text).ok_or(QuestionError::EmptyText)?;
        let options = self
            .options
            .iter()
            .enumerate()
            .map(|(index, o)| {
                non_blank(&o.text)
                    .map(|text| OptionDraft::new(text, o.is_correct))
                    .ok_or(QuestionError::EmptyOptionText { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        check_single_correct(options.iter().map(|o| o.is_correct))?;

        Ok(ValidatedQuestion {
            topic_id: self.topic_id,
            text,
            options,
        })
    }
}

/// Replacement text/correctness for one existing option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEdit {
    pub id: OptionId,
    pub text: String,
    pub is_correct: bool,
}

impl OptionEdit {
    #[must_use]
    pub fn new(id: OptionId, text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            id,
            text: text.into(),
            is_correct,
        }
    }
}

/// Unvalidated edit of an existing question. Options are matched by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionEdit {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<OptionEdit>,
}

/// An edit checked against the stored options, ordered like the stored rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEdit {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<OptionEdit>,
}

impl QuestionEdit {
    #[must_use]
    pub fn new(id: QuestionId, text: impl Into<String>, options: Vec<OptionEdit>) -> Self {
        Self {
            id,
            text: text.into(),
            options,
        }
    }

    /// Validate the edit against the options currently stored for the question.
    ///
    /// The edit must name every existing option exactly once; options are
    /// rewritten in place, never added or removed.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for blank texts, an unknown, duplicated or
    /// missing option id, or a correct-count other than one.
    pub fn validate_against(
        self,
        existing: &[AnswerOption],
    ) -> Result<ValidatedEdit, QuestionError> {
        let text = non_blank(&self.text).ok_or(QuestionError::EmptyText)?;

        let known: HashSet<OptionId> = existing.iter().map(|o| o.id).collect();
        let mut seen = HashSet::with_capacity(self.options.len());
        for edit in &self.options {
            if !known.contains(&edit.id) {
                return Err(QuestionError::UnknownOption(edit.id));
            }
            if !seen.insert(edit.id) {
                return Err(QuestionError::DuplicateOption(edit.id));
            }
        }
        if let Some(missing) = existing.iter().find(|o| !seen.contains(&o.id)) {
            return Err(QuestionError::MissingOption(missing.id));
        }

        let mut ordered = Vec::with_capacity(existing.len());
        for (index, stored) in existing.iter().enumerate() {
            let Some(edit) = self.options.iter().find(|e| e.id == stored.id) else {
                return Err(QuestionError::MissingOption(stored.id));
            };
            let text = non_blank(&edit.text).ok_or(QuestionError::EmptyOptionText { index })?;
            ordered.push(OptionEdit::new(edit.id, text, edit.is_correct));
        }
        check_single_correct(ordered.iter().map(|o| o.is_correct))?;

        Ok(ValidatedEdit {
            id: self.id,
            text,
            options: ordered,
        })
    }
}

fn non_blank(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn check_single_correct(flags: impl Iterator<Item = bool>) -> Result<(), QuestionError> {
    let mut total = 0_usize;
    let mut correct = 0_usize;
    for flag in flags {
        total += 1;
        if flag {
            correct += 1;
        }
    }
    match (total, correct) {
        (0, _) => Err(QuestionError::NoOptions),
        (_, 0) => Err(QuestionError::NoCorrectOption),
        (_, 1) => Ok(()),
        (_, count) => Err(QuestionError::MultipleCorrectOptions { count }),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

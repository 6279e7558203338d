//! Turns a finished quiz into a summary ready for display.
//!
//! Everything here is pure: no storage, no clock.

use std::fmt;

use chrono::{DateTime, Utc};
use quiz_core::model::{OptionId, QuestionId};
use serde::Serialize;

use crate::error::ReportError;
use crate::quiz::{AnsweredQuestion, QuizSession, QuizState};

/// Whether an answered question was scored as right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl From<bool> for Verdict {
    fn from(is_correct: bool) -> Self {
        if is_correct {
            Self::Correct
        } else {
            Self::Incorrect
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correct => f.write_str("correct"),
            Self::Incorrect => f.write_str("incorrect"),
        }
    }
}

/// One row of the per-question list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportItem {
    /// 1-based position in answer order.
    pub position: usize,
    pub question_id: QuestionId,
    pub question: String,
    pub chosen: OptionId,
    pub verdict: Verdict,
}

/// Display-ready summary of a quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizReport {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    /// Percentage of correct answers, rounded to one decimal.
    pub percentage: f64,
    /// When the session left loading; `None` for bare tallies.
    pub started_at: Option<DateTime<Utc>>,
    /// Empty when the caller did not track answers.
    pub items: Vec<ReportItem>,
}

impl QuizReport {
    /// `percentage` formatted the way the result screen shows it, e.g. `66.7%`.
    #[must_use]
    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}

/// Builds [`QuizReport`]s.
pub struct ResultReporter;

impl ResultReporter {
    /// Summarize a terminal tally and, optionally, the answer history.
    ///
    /// When a history is given it must agree with the counts.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::NegativeCount` for negative counts and
    /// `ReportError::HistoryMismatch` if the history disagrees with them.
    pub fn summarize(
        correct: i64,
        incorrect: i64,
        history: Option<&[AnsweredQuestion]>,
    ) -> Result<QuizReport, ReportError> {
        let correct = count("correct", correct)?;
        let incorrect = count("incorrect", incorrect)?;
        let total = correct
            .checked_add(incorrect)
            .ok_or(ReportError::CountOverflow {
                field: "total",
                value: i64::from(correct) + i64::from(incorrect),
            })?;

        let items = match history {
            Some(history) => items_for(history, correct, total)?,
            None => Vec::new(),
        };

        Ok(QuizReport {
            correct,
            incorrect,
            total,
            percentage: rounded_percentage(correct, total),
            started_at: None,
            items,
        })
    }

    /// Summarize a finished session, history included.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::NotFinished` unless the session is finished.
    pub fn from_session(session: &QuizSession) -> Result<QuizReport, ReportError> {
        if session.state() != QuizState::Finished {
            return Err(ReportError::NotFinished(session.state()));
        }
        let tally = session.tally();
        let report = Self::summarize(
            i64::from(tally.correct),
            i64::from(tally.incorrect),
            Some(session.history()),
        )?;
        Ok(QuizReport {
            started_at: session.started_at(),
            ..report
        })
    }
}

fn count(field: &'static str, value: i64) -> Result<u32, ReportError> {
    if value < 0 {
        return Err(ReportError::NegativeCount { field, value });
    }
    u32::try_from(value).map_err(|_| ReportError::CountOverflow { field, value })
}

fn items_for(
    history: &[AnsweredQuestion],
    correct: u32,
    total: u32,
) -> Result<Vec<ReportItem>, ReportError> {
    if u32::try_from(history.len()).ok() != Some(total) {
        return Err(ReportError::HistoryMismatch {
            what: "answers",
            expected: total,
            found: history.len(),
        });
    }
    let right = history.iter().filter(|a| a.is_correct).count();
    if u32::try_from(right).ok() != Some(correct) {
        return Err(ReportError::HistoryMismatch {
            what: "correct answers",
            expected: correct,
            found: right,
        });
    }

    Ok(history
        .iter()
        .enumerate()
        .map(|(i, answer)| ReportItem {
            position: i + 1,
            question_id: answer.question_id,
            question: answer.question.clone(),
            chosen: answer.chosen,
            verdict: answer.is_correct.into(),
        })
        .collect())
}

fn rounded_percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let raw = f64::from(correct) / f64::from(total) * 100.0;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::ErrorKind;

    fn answered(id: u64, is_correct: bool) -> AnsweredQuestion {
        AnsweredQuestion {
            question_id: QuestionId::new(id),
            question: format!("Question {id}"),
            chosen: OptionId::new(id * 10),
            is_correct,
        }
    }

    #[test]
    fn rounds_to_one_decimal() {
        let report = ResultReporter::summarize(2, 1, None).unwrap();
        assert_eq!(report.total, 3);
        assert!((report.percentage - 66.7).abs() < 1e-9);
        assert_eq!(report.percentage_label(), "66.7%");
        assert!(report.items.is_empty());
        assert_eq!(report.started_at, None);
    }

    #[test]
    fn nothing_answered_is_zero_percent() {
        let report = ResultReporter::summarize(0, 0, Some(&[])).unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.percentage_label(), "0.0%");
    }

    #[test]
    fn negative_counts_are_rejected() {
        let err = ResultReporter::summarize(-1, 2, None).unwrap_err();
        assert_eq!(
            err,
            ReportError::NegativeCount {
                field: "correct",
                value: -1
            }
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(ResultReporter::summarize(1, -3, None).is_err());
    }

    #[test]
    fn history_is_tagged_in_order() {
        let history = [answered(3, true), answered(1, false), answered(2, true)];
        let report = ResultReporter::summarize(2, 1, Some(&history)).unwrap();

        let rows: Vec<_> = report
            .items
            .iter()
            .map(|i| (i.position, i.question_id.value(), i.verdict))
            .collect();
        assert_eq!(
            rows,
            [
                (1, 3, Verdict::Correct),
                (2, 1, Verdict::Incorrect),
                (3, 2, Verdict::Correct),
            ]
        );
        assert_eq!(report.items[1].verdict.to_string(), "incorrect");
    }

    #[test]
    fn history_must_match_the_tally() {
        let history = [answered(1, true), answered(2, true)];
        let err = ResultReporter::summarize(1, 1, Some(&history)).unwrap_err();
        assert!(matches!(err, ReportError::HistoryMismatch { found: 2, expected: 1, .. }));

        let err = ResultReporter::summarize(3, 0, Some(&history)).unwrap_err();
        assert!(matches!(err, ReportError::HistoryMismatch { found: 2, expected: 3, .. }));
    }

    #[test]
    fn unfinished_session_has_no_report() {
        let err = ResultReporter::from_session(&QuizSession::idle()).unwrap_err();
        assert_eq!(err, ReportError::NotFinished(QuizState::Idle));
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn report_serializes_for_json_output() {
        let history = [answered(1, true)];
        let report = ResultReporter::summarize(1, 0, Some(&history)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["percentage"], 100.0);
        assert_eq!(json["items"][0]["verdict"], "correct");
        assert!(json["started_at"].is_null());
    }
}

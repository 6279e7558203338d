//! Interactive quiz loop over any line-based input and output.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use quiz_core::model::OptionId;
use quiz_core::text::{option_index, option_label};
use services::{QuizReport, QuizSession, QuizState, ResultReporter};

/// Ask every question in `session`, reading one answer per line.
///
/// Answers are option letters. `q` abandons the quiz, in which case `None`
/// is returned. End of input also abandons.
pub fn play<R: BufRead, W: Write>(
    session: &mut QuizSession,
    mut input: R,
    out: &mut W,
) -> Result<Option<QuizReport>> {
    let mut line = String::new();

    while session.state() == QuizState::InProgress {
        let progress = session.progress();
        let question = session.current_question()?;
        writeln!(
            out,
            "\n{} Question {} of {}: {}",
            progress_bar(progress.ratio()),
            progress.answered + 1,
            progress.total,
            question.text()
        )?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}. {}", option_label(i), option.text)?;
        }

        let chosen = loop {
            write!(out, "> ")?;
            out.flush()?;
            line.clear();
            if input.read_line(&mut line).context("reading answer")? == 0 {
                session.abandon();
                return Ok(None);
            }
            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") {
                session.abandon();
                writeln!(out, "Quiz abandoned.")?;
                return Ok(None);
            }
            match option_index(answer).and_then(|i| question.options.get(i)) {
                Some(option) => break option.id,
                None => writeln!(
                    out,
                    "Pick a letter between A and {}, or q to quit.",
                    option_label(question.options.len().saturating_sub(1))
                )?,
            }
        };
        let option_ids: Vec<OptionId> = question.options.iter().map(|o| o.id).collect();

        let outcome = session.answer(chosen)?;
        let correct_label = outcome
            .correct_option
            .and_then(|id| option_ids.iter().position(|o| *o == id))
            .map(option_label);
        match (outcome.is_correct, correct_label) {
            (true, _) => writeln!(out, "Correct!")?,
            (false, Some(label)) => writeln!(out, "Wrong, the answer was {label}.")?,
            (false, None) => writeln!(out, "Wrong.")?,
        }
    }

    Ok(Some(ResultReporter::from_session(session)?))
}

const BAR_WIDTH: usize = 10;

/// `[###-------]` for a completion ratio in `0.0..=1.0`.
fn progress_bar(ratio: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = ((ratio.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

/// Text rendering of a finished quiz.
pub fn render_report<W: Write>(report: &QuizReport, out: &mut W) -> Result<()> {
    writeln!(out, "\nFinal result")?;
    writeln!(out, "  Correct:   {}", report.correct)?;
    writeln!(out, "  Incorrect: {}", report.incorrect)?;
    writeln!(out, "  Score:     {}", report.percentage_label())?;
    if let Some(at) = report.started_at {
        writeln!(out, "  Started:   {}", at.format("%Y-%m-%d %H:%M UTC"))?;
    }
    if !report.items.is_empty() {
        writeln!(out, "\nAnswers")?;
        for item in &report.items {
            writeln!(out, "  {}. {} ({})", item.position, item.question, item.verdict)?;
        }
    }
    Ok(())
}

use serde::{Deserialize, Serialize};

/// Correct/incorrect counts produced when a quiz session finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: u32,
    pub incorrect: u32,
}

impl Tally {
    #[must_use]
    pub fn new(correct: u32, incorrect: u32) -> Self {
        Self { correct, incorrect }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.correct.saturating_add(self.incorrect)
    }

    /// Share of correct answers in `0.0..=100.0`; zero when nothing was answered.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(total) * 100.0
    }

    /// Counts one answer.
    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct = self.correct.saturating_add(1);
        } else {
            self.incorrect = self.incorrect.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tally_is_zero_percent() {
        let tally = Tally::default();
        assert_eq!(tally.total(), 0);
        assert!(tally.percentage().abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_uses_total() {
        let tally = Tally::new(1, 2);
        assert_eq!(tally.total(), 3);
        assert!((tally.percentage() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn record_counts_both_kinds() {
        let mut tally = Tally::default();
        for correct in [true, false, true] {
            tally.record(correct);
        }
        assert_eq!(tally, Tally::new(2, 1));
    }
}

/// Aggregated view of quiz progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct QuizProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl QuizProgress {
    /// Fraction answered in `0.0..=1.0`, for progress bars.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.answered as f64 / self.total as f64;
        ratio.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_empty_and_partial() {
        assert!(QuizProgress::default().ratio().abs() < f64::EPSILON);

        let halfway = QuizProgress {
            total: 4,
            answered: 2,
            remaining: 2,
            is_complete: false,
        };
        assert!((halfway.ratio() - 0.5).abs() < f64::EPSILON);
    }
}

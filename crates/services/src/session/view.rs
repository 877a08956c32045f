/// Recap numbers shown on the understand screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeSummary {
    correct: u32,
    total: u32,
    accuracy_percent: u32,
    time_spent_secs: u32,
    avg_secs_per_question: u32,
    points_earned: u32,
}

impl PracticeSummary {
    #[must_use]
    pub fn new(correct: u32, total: u32, time_spent_secs: u32, points_earned: u32) -> Self {
        let accuracy_percent = if total == 0 { 0 } else { correct * 100 / total };
        let avg_secs_per_question = if total == 0 { 0 } else { time_spent_secs / total };
        Self {
            correct,
            total,
            accuracy_percent,
            time_spent_secs,
            avg_secs_per_question,
            points_earned,
        }
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Whole-percent accuracy, truncated.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        self.accuracy_percent
    }

    #[must_use]
    pub fn time_spent_secs(&self) -> u32 {
        self.time_spent_secs
    }

    #[must_use]
    pub fn avg_secs_per_question(&self) -> u32 {
        self.avg_secs_per_question
    }

    /// Points from correct answers only; the completion reward is separate.
    #[must_use]
    pub fn points_earned(&self) -> u32 {
        self.points_earned
    }
}

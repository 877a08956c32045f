use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;

/// Number of answer choices shown for every question.
pub const OPTION_COUNT: usize = 4;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("expected exactly {OPTION_COUNT} options, got {got}")]
    WrongOptionCount { got: usize },

    #[error("duplicate option: {0}")]
    DuplicateOption(String),

    #[error("correct answer {0} is not among the options")]
    MissingCorrectAnswer(String),

    #[error("option {0} is not a non-negative integer")]
    InvalidOption(String),

    #[error("points must be > 0")]
    InvalidPoints,
}

/// A single practice question with four answer choices.
///
/// Immutable once generated; owned by the active session and discarded when
/// the session ends or the practice count is re-chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
    points: u32,
}

impl Question {
    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the options are not exactly four distinct
    /// non-negative integers including the correct answer, or if points are
    /// zero.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
        points: u32,
    ) -> Result<Self, QuestionError> {
        let correct_answer = correct_answer.into();

        if options.len() != OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount { got: options.len() });
        }
        for (i, option) in options.iter().enumerate() {
            if option.parse::<u64>().is_err() {
                return Err(QuestionError::InvalidOption(option.clone()));
            }
            if options[..i].contains(option) {
                return Err(QuestionError::DuplicateOption(option.clone()));
            }
        }
        if !options.contains(&correct_answer) {
            return Err(QuestionError::MissingCorrectAnswer(correct_answer));
        }
        if points == 0 {
            return Err(QuestionError::InvalidPoints);
        }

        Ok(Self {
            id,
            prompt: prompt.into(),
            options,
            correct_answer,
            explanation: explanation.into(),
            points,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The four answer choices in display order.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Points awarded for a correct answer.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Returns true when `choice` matches the correct answer exactly.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_answer == choice
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_owned()).collect()
    }

    fn build(options: Vec<String>, correct: &str) -> Result<Question, QuestionError> {
        Question::new(
            QuestionId::sequenced("sub", 1),
            "100 - 34 = ?",
            options,
            correct,
            "complement digit-wise",
            20,
        )
    }

    #[test]
    fn question_happy_path() {
        let q = build(opts(&["66", "65", "76", "56"]), "66").unwrap();
        assert_eq!(q.options().len(), 4);
        assert!(q.is_correct("66"));
        assert!(!q.is_correct("65"));
        assert_eq!(q.points(), 20);
    }

    #[test]
    fn question_rejects_wrong_option_count() {
        let err = build(opts(&["66", "65", "76"]), "66").unwrap_err();
        assert_eq!(err, QuestionError::WrongOptionCount { got: 3 });
    }

    #[test]
    fn question_rejects_duplicates() {
        let err = build(opts(&["66", "66", "76", "56"]), "66").unwrap_err();
        assert_eq!(err, QuestionError::DuplicateOption("66".into()));
    }

    #[test]
    fn question_rejects_missing_correct_answer() {
        let err = build(opts(&["65", "67", "76", "56"]), "66").unwrap_err();
        assert_eq!(err, QuestionError::MissingCorrectAnswer("66".into()));
    }

    #[test]
    fn question_rejects_negative_option() {
        let err = build(opts(&["66", "-1", "76", "56"]), "66").unwrap_err();
        assert_eq!(err, QuestionError::InvalidOption("-1".into()));
    }
}

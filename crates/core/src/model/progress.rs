use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::ModuleId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("correct answers ({correct}) exceed questions answered ({answered})")]
    CountMismatch { correct: u32, answered: u32 },

    #[error("unknown phase: {0}")]
    UnknownPhase(String),
}

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// The four stages of a module visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Learn,
    Practice,
    Understand,
    Completed,
}

impl Phase {
    /// The forward edge of the lifecycle. `Completed` is terminal.
    #[must_use]
    pub fn next(self) -> Phase {
        match self {
            Phase::Learn => Phase::Practice,
            Phase::Practice => Phase::Understand,
            Phase::Understand | Phase::Completed => Phase::Completed,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Learn => "learn",
            Phase::Practice => "practice",
            Phase::Understand => "understand",
            Phase::Completed => "completed",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Phase {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "learn" => Ok(Phase::Learn),
            "practice" => Ok(Phase::Practice),
            "understand" => Ok(Phase::Understand),
            "completed" => Ok(Phase::Completed),
            other => Err(ProgressError::UnknownPhase(other.to_owned())),
        }
    }
}

//
// ─── MODULE PROGRESS ───────────────────────────────────────────────────────────
//

/// Durable projection of a session, written to the progress store at phase
/// boundaries and read once at mount to resume mid-module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleProgress {
    module_id: ModuleId,
    phase: Phase,
    questions_answered: u32,
    correct_answers: u32,
    time_spent: u32,
}

impl ModuleProgress {
    /// Creates a progress record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::CountMismatch` if more answers are correct
    /// than were given.
    pub fn new(
        module_id: ModuleId,
        phase: Phase,
        questions_answered: u32,
        correct_answers: u32,
        time_spent: u32,
    ) -> Result<Self, ProgressError> {
        if correct_answers > questions_answered {
            return Err(ProgressError::CountMismatch {
                correct: correct_answers,
                answered: questions_answered,
            });
        }

        Ok(Self {
            module_id,
            phase,
            questions_answered,
            correct_answers,
            time_spent,
        })
    }

    /// A fresh record for a module that has never been visited.
    #[must_use]
    pub fn fresh(module_id: ModuleId) -> Self {
        Self {
            module_id,
            phase: Phase::Learn,
            questions_answered: 0,
            correct_answers: 0,
            time_spent: 0,
        }
    }

    // Accessors
    #[must_use]
    pub fn module_id(&self) -> &ModuleId {
        &self.module_id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn questions_answered(&self) -> u32 {
        self.questions_answered
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    /// Cumulative seconds spent answering, summed over per-question ticks.
    #[must_use]
    pub fn time_spent(&self) -> u32 {
        self.time_spent
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

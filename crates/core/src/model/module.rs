use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::ModuleId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModuleError {
    #[error("module title cannot be empty")]
    EmptyTitle,

    #[error("points reward must be > 0")]
    InvalidPointsReward,
}

//
// ─── OPERATION & DIFFICULTY ────────────────────────────────────────────────────
//

/// Arithmetic operation family a module teaches a shortcut for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Addition => "addition",
            Operation::Subtraction => "subtraction",
            Operation::Multiplication => "multiplication",
            Operation::Division => "division",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

//
// ─── COURSE MODULE ─────────────────────────────────────────────────────────────
//

/// A tutoring module: one arithmetic shortcut taught through the
/// learn → practice → understand cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseModule {
    id: ModuleId,
    title: String,
    description: String,
    operation: Operation,
    difficulty: Difficulty,
    points_reward: u32,
    is_premium: bool,
}

impl CourseModule {
    /// Creates a new module.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::EmptyTitle` if the title is empty or
    /// whitespace-only, `ModuleError::InvalidPointsReward` if the completion
    /// reward is zero.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        description: impl Into<String>,
        operation: Operation,
        difficulty: Difficulty,
        points_reward: u32,
        is_premium: bool,
    ) -> Result<Self, ModuleError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ModuleError::EmptyTitle);
        }
        if points_reward == 0 {
            return Err(ModuleError::InvalidPointsReward);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description: description.into(),
            operation,
            difficulty,
            points_reward,
            is_premium,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Points awarded once on module completion.
    #[must_use]
    pub fn points_reward(&self) -> u32 {
        self.points_reward
    }

    #[must_use]
    pub fn is_premium(&self) -> bool {
        self.is_premium
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

/// The built-in module catalog.
///
/// # Panics
///
/// Panics only if the hardcoded catalog data is invalid, which is a
/// programming defect caught by tests.
#[must_use]
pub fn catalog() -> Vec<CourseModule> {
    let build = |id: &str,
                 title: &str,
                 description: &str,
                 operation: Operation,
                 difficulty: Difficulty,
                 points_reward: u32,
                 is_premium: bool| {
        CourseModule::new(
            ModuleId::new(id).expect("catalog id is valid"),
            title,
            description,
            operation,
            difficulty,
            points_reward,
            is_premium,
        )
        .expect("catalog module is valid")
    };

    vec![
        build(
            "subtraction-nikhilam",
            "Magic Subtraction",
            "Learn the \"All from 9, last from 10\" trick for super-fast subtraction!",
            Operation::Subtraction,
            Difficulty::Beginner,
            100,
            false,
        ),
        build(
            "addition-vertically",
            "Vertical Addition",
            "Master the art of adding numbers vertically and crosswise!",
            Operation::Addition,
            Difficulty::Beginner,
            100,
            false,
        ),
        build(
            "multiplication-urdhva",
            "Cross Multiplication",
            "Discover the Urdhva-Tiryagbhyam method for quick multiplication!",
            Operation::Multiplication,
            Difficulty::Intermediate,
            150,
            true,
        ),
        build(
            "division-paravartya",
            "Magic Division",
            "Master the Paravartya Yojayet method for effortless division!",
            Operation::Division,
            Difficulty::Advanced,
            200,
            true,
        ),
    ]
}

/// Look up a catalog module by id.
#[must_use]
pub fn find_in_catalog(id: &ModuleId) -> Option<CourseModule> {
    catalog().into_iter().find(|m| m.id() == id)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_new_rejects_empty_title() {
        let err = CourseModule::new(
            ModuleId::new("x").unwrap(),
            "   ",
            "d",
            Operation::Addition,
            Difficulty::Beginner,
            100,
            false,
        )
        .unwrap_err();
        assert_eq!(err, ModuleError::EmptyTitle);
    }

    #[test]
    fn module_new_rejects_zero_reward() {
        let err = CourseModule::new(
            ModuleId::new("x").unwrap(),
            "T",
            "d",
            Operation::Addition,
            Difficulty::Beginner,
            0,
            false,
        )
        .unwrap_err();
        assert_eq!(err, ModuleError::InvalidPointsReward);
    }

    #[test]
    fn catalog_has_four_modules_with_unique_ids() {
        let modules = catalog();
        assert_eq!(modules.len(), 4);
        let mut ids: Vec<_> = modules.iter().map(|m| m.id().as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn catalog_rewards_match_difficulty() {
        let modules = catalog();
        let division = modules
            .iter()
            .find(|m| m.operation() == Operation::Division)
            .unwrap();
        assert_eq!(division.points_reward(), 200);
        assert_eq!(division.difficulty(), Difficulty::Advanced);
        assert!(division.is_premium());
    }

    #[test]
    fn find_in_catalog_by_id() {
        let id = ModuleId::new("subtraction-nikhilam").unwrap();
        let module = find_in_catalog(&id).unwrap();
        assert_eq!(module.operation(), Operation::Subtraction);
        assert!(find_in_catalog(&ModuleId::new("missing").unwrap()).is_none());
    }
}

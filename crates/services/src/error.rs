//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use tutor_core::generate::GenerateError;

/// Errors emitted by the session engine and workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("action not allowed in phase {phase}")]
    WrongPhase { phase: tutor_core::model::Phase },

    #[error("a worked-example detour is pending; return to practice instead")]
    DetourPending,

    #[error("practice count already chosen")]
    CountAlreadyChosen,

    #[error("no practice count selected yet")]
    NoCountSelected,

    #[error("{0} is not one of the selectable practice counts")]
    UnknownCount(u32),

    #[error("choice {0:?} is not among the current options")]
    UnknownChoice(String),

    #[error("no answer selected")]
    NoSelection,

    #[error("module already completed")]
    Completed,

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Progress(#[from] tutor_core::model::ProgressError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

use std::str::FromStr;

use tutor_core::model::{ModuleId, ModuleProgress, Phase};

use crate::repository::StorageError;

pub(super) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(super) fn module_id_from_str(raw: &str) -> Result<ModuleId, StorageError> {
    ModuleId::new(raw).map_err(ser)
}

pub(super) fn phase_from_str(raw: &str) -> Result<Phase, StorageError> {
    Phase::from_str(raw).map_err(ser)
}

pub(super) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(super) fn progress_from_columns(
    module_id: &str,
    phase: &str,
    questions_answered: i64,
    correct_answers: i64,
    time_spent: i64,
) -> Result<ModuleProgress, StorageError> {
    ModuleProgress::new(
        module_id_from_str(module_id)?,
        phase_from_str(phase)?,
        u32_from_i64("questions_answered", questions_answered)?,
        u32_from_i64("correct_answers", correct_answers)?,
        u32_from_i64("time_spent", time_spent)?,
    )
    .map_err(ser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_from_columns_maps_valid_row() {
        let progress = progress_from_columns("m1", "practice", 5, 3, 42).unwrap();
        assert_eq!(progress.phase(), Phase::Practice);
        assert_eq!(progress.questions_answered(), 5);
        assert_eq!(progress.correct_answers(), 3);
        assert_eq!(progress.time_spent(), 42);
    }

    #[test]
    fn progress_from_columns_rejects_unknown_phase() {
        let err = progress_from_columns("m1", "paused", 5, 3, 42).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }

    #[test]
    fn progress_from_columns_rejects_negative_counts() {
        let err = progress_from_columns("m1", "practice", -1, 0, 0).unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}

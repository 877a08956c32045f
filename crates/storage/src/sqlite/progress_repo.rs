use chrono::{DateTime, Utc};
use sqlx::Row;

use tutor_core::model::{ModuleId, ModuleProgress};

use super::SqliteRepository;
use super::mapping::{progress_from_columns, ser};
use crate::repository::{ProgressRepository, StorageError};

fn map_progress_row(row: &sqlx::sqlite::SqliteRow) -> Result<ModuleProgress, StorageError> {
    let module_id: String = row.try_get("module_id").map_err(ser)?;
    let phase: String = row.try_get("phase").map_err(ser)?;
    let questions_answered: i64 = row.try_get("questions_answered").map_err(ser)?;
    let correct_answers: i64 = row.try_get("correct_answers").map_err(ser)?;
    let time_spent: i64 = row.try_get("time_spent").map_err(ser)?;

    progress_from_columns(
        &module_id,
        &phase,
        questions_answered,
        correct_answers,
        time_spent,
    )
}

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_progress(&self, id: &ModuleId) -> Result<Option<ModuleProgress>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT module_id, phase, questions_answered, correct_answers, time_spent
                FROM module_progress
                WHERE module_id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn save_progress(
        &self,
        progress: &ModuleProgress,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO module_progress (
                    module_id, phase, questions_answered, correct_answers,
                    time_spent, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(module_id) DO UPDATE SET
                    phase = excluded.phase,
                    questions_answered = excluded.questions_answered,
                    correct_answers = excluded.correct_answers,
                    time_spent = excluded.time_spent,
                    updated_at = excluded.updated_at
            ",
        )
        .bind(progress.module_id().as_str())
        .bind(progress.phase().to_string())
        .bind(i64::from(progress.questions_answered()))
        .bind(i64::from(progress.correct_answers()))
        .bind(i64::from(progress.time_spent()))
        .bind(saved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }
}

use chrono::{DateTime, Utc};
use sqlx::Row;

use tutor_core::model::ModuleId;

use super::SqliteRepository;
use super::mapping::{module_id_from_str, ser};
use crate::repository::{ProfileRepository, StorageError};

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait::async_trait]
impl ProfileRepository for SqliteRepository {
    async fn award_points(&self, amount: u32) -> Result<i64, StorageError> {
        let row = sqlx::query(
            r"
                UPDATE profile SET points = points + ?1 WHERE id = 1
                RETURNING points
            ",
        )
        .bind(i64::from(amount))
        .fetch_one(&self.pool)
        .await
        .map_err(conn)?;

        row.try_get::<i64, _>("points").map_err(ser)
    }

    async fn total_points(&self) -> Result<i64, StorageError> {
        let row = sqlx::query("SELECT points FROM profile WHERE id = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;

        row.try_get::<i64, _>("points").map_err(ser)
    }

    async fn mark_module_complete(
        &self,
        id: &ModuleId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO completed_modules (module_id, completed_at)
                VALUES (?1, ?2)
                ON CONFLICT(module_id) DO NOTHING
            ",
        )
        .bind(id.as_str())
        .bind(completed_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn completed_modules(&self) -> Result<Vec<ModuleId>, StorageError> {
        let rows = sqlx::query("SELECT module_id FROM completed_modules ORDER BY module_id")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        rows.iter()
            .map(|row| {
                let raw: String = row.try_get("module_id").map_err(ser)?;
                module_id_from_str(&raw)
            })
            .collect()
    }
}

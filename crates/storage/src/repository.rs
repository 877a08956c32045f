use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use tutor_core::model::{ModuleId, ModuleProgress};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for per-module progress checkpoints.
///
/// Progress is written synchronously at phase boundaries, never on every
/// tick, so a single writer per checkpoint is assumed.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Fetch the persisted progress for a module, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read. An absent record
    /// is `Ok(None)`, not an error.
    async fn load_progress(&self, id: &ModuleId) -> Result<Option<ModuleProgress>, StorageError>;

    /// Persist or replace the progress checkpoint for a module.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the checkpoint cannot be stored.
    async fn save_progress(
        &self,
        progress: &ModuleProgress,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}

/// Repository contract for the learner profile: points and completions.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Add points to the profile and return the new total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the award cannot be stored.
    async fn award_points(&self, amount: u32) -> Result<i64, StorageError>;

    /// Current point total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn total_points(&self) -> Result<i64, StorageError>;

    /// Record a module as completed. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the completion cannot be stored.
    async fn mark_module_complete(
        &self,
        id: &ModuleId,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Ids of all completed modules.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read.
    async fn completed_modules(&self) -> Result<Vec<ModuleId>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Mutex<InMemoryState>>,
}

#[derive(Default)]
struct InMemoryState {
    progress: HashMap<ModuleId, ModuleProgress>,
    points: i64,
    completed: HashSet<ModuleId>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_progress(&self, id: &ModuleId) -> Result<Option<ModuleProgress>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.progress.get(id).cloned())
    }

    async fn save_progress(
        &self,
        progress: &ModuleProgress,
        _saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .progress
            .insert(progress.module_id().clone(), progress.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn award_points(&self, amount: u32) -> Result<i64, StorageError> {
        let mut guard = self.lock()?;
        guard.points += i64::from(amount);
        Ok(guard.points)
    }

    async fn total_points(&self) -> Result<i64, StorageError> {
        let guard = self.lock()?;
        Ok(guard.points)
    }

    async fn mark_module_complete(
        &self,
        id: &ModuleId,
        _completed_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.completed.insert(id.clone());
        Ok(())
    }

    async fn completed_modules(&self) -> Result<Vec<ModuleId>, StorageError> {
        let guard = self.lock()?;
        let mut ids: Vec<ModuleId> = guard.completed.iter().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// Aggregates the progress and profile repositories behind trait objects
/// for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub progress: Arc<dyn ProgressRepository>,
    pub profile: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let profile: Arc<dyn ProfileRepository> = Arc::new(repo);
        Self { progress, profile }
    }

    /// Opens a SQLite-backed store and applies migrations.
    ///
    /// # Errors
    ///
    /// Returns `SqliteInitError` on connection or migration failure.
    pub async fn sqlite(database_url: &str) -> Result<Self, crate::sqlite::SqliteInitError> {
        let repo = crate::sqlite::SqliteRepository::connect_and_migrate(database_url).await?;
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo.clone());
        let profile: Arc<dyn ProfileRepository> = Arc::new(repo);
        Ok(Self { progress, profile })
    }
}

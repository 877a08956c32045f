use std::sync::Arc;

use storage::repository::{ProfileRepository, ProgressRepository, Storage, StorageError};
use tutor_core::Clock;
use tutor_core::model::{CourseModule, ModuleProgress};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::session::engine::{AnswerOutcome, Effect, ModuleSession, QuestionTick};

/// What happened on the storage side of a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionReport {
    checkpoint_failed: bool,
    points_total: Option<i64>,
    completed: bool,
}

impl TransitionReport {
    /// True when a checkpoint could not be written and is being retained.
    #[must_use]
    pub fn checkpoint_failed(&self) -> bool {
        self.checkpoint_failed
    }

    /// New point total after an award, when one happened and succeeded.
    #[must_use]
    pub fn points_total(&self) -> Option<i64> {
        self.points_total
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }
}

/// An evaluated answer together with its storage report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answered {
    outcome: AnswerOutcome,
    report: TransitionReport,
}

impl Answered {
    #[must_use]
    pub fn outcome(&self) -> &AnswerOutcome {
        &self.outcome
    }

    #[must_use]
    pub fn report(&self) -> &TransitionReport {
        &self.report
    }
}

/// Drives `ModuleSession` transitions against the progress and profile
/// stores, applying the effects each transition emits.
///
/// Storage failures never discard in-memory session state: a failed
/// checkpoint is retained and can be retried, a failed award is logged and
/// dropped. The session itself is always the source of truth.
pub struct ModuleLoopService {
    progress: Arc<dyn ProgressRepository>,
    profile: Arc<dyn ProfileRepository>,
    clock: Clock,
    pending_checkpoint: Option<ModuleProgress>,
}

impl ModuleLoopService {
    #[must_use]
    pub fn new(
        progress: Arc<dyn ProgressRepository>,
        profile: Arc<dyn ProfileRepository>,
        clock: Clock,
    ) -> Self {
        Self {
            progress,
            profile,
            clock,
            pending_checkpoint: None,
        }
    }

    #[must_use]
    pub fn with_storage(storage: &Storage, clock: Clock) -> Self {
        Self::new(storage.progress.clone(), storage.profile.clone(), clock)
    }

    /// Loads persisted progress and mounts the session on it. A load
    /// failure starts fresh rather than blocking the visit.
    pub async fn mount(&self, module: CourseModule, config: SessionConfig) -> ModuleSession {
        let progress = match self.progress.load_progress(module.id()).await {
            Ok(Some(progress)) => progress,
            Ok(None) => ModuleProgress::fresh(module.id().clone()),
            Err(err) => {
                log::warn!("progress load failed for {}, starting fresh: {err}", module.id());
                ModuleProgress::fresh(module.id().clone())
            }
        };
        ModuleSession::resume(module, config, &progress)
    }

    /// Learn → practice, persisting the phase-boundary checkpoint.
    ///
    /// # Errors
    ///
    /// Propagates the engine's transition errors; storage failures are
    /// reported, not raised.
    pub async fn start_practice(
        &mut self,
        session: &mut ModuleSession,
    ) -> Result<TransitionReport, SessionError> {
        let effects = session.advance_from_learn()?;
        Ok(self.apply(&effects).await)
    }

    /// Submits the current selection and applies the resulting effects.
    ///
    /// # Errors
    ///
    /// Propagates the engine's transition errors.
    pub async fn submit_answer(
        &mut self,
        session: &mut ModuleSession,
    ) -> Result<Answered, SessionError> {
        let outcome = session.submit_answer()?;
        let report = self.apply(outcome.effects()).await;
        Ok(Answered { outcome, report })
    }

    /// Feeds one question tick through the engine. Returns the evaluated
    /// answer when the tick crossed zero and timed the question out.
    ///
    /// # Errors
    ///
    /// Propagates the engine's transition errors.
    pub async fn question_tick(
        &mut self,
        session: &mut ModuleSession,
    ) -> Result<Option<Answered>, SessionError> {
        match session.question_tick()? {
            QuestionTick::TimedOut(outcome) => {
                let report = self.apply(outcome.effects()).await;
                Ok(Some(Answered { outcome, report }))
            }
            QuestionTick::Counted | QuestionTick::Ignored => Ok(None),
        }
    }

    /// Understand → completed: final checkpoint, completion mark and the
    /// module reward.
    ///
    /// # Errors
    ///
    /// Propagates the engine's transition errors.
    pub async fn complete_module(
        &mut self,
        session: &mut ModuleSession,
    ) -> Result<TransitionReport, SessionError> {
        let effects = session.complete_module()?;
        Ok(self.apply(&effects).await)
    }

    /// The checkpoint retained after a failed save, if any.
    #[must_use]
    pub fn pending_checkpoint(&self) -> Option<&ModuleProgress> {
        self.pending_checkpoint.as_ref()
    }

    /// Re-attempts the retained checkpoint. Returns true once nothing is
    /// pending anymore.
    pub async fn retry_checkpoint(&mut self) -> bool {
        let Some(pending) = self.pending_checkpoint.clone() else {
            return true;
        };
        match self.progress.save_progress(&pending, self.clock.now()).await {
            Ok(()) => {
                log::info!("retried checkpoint saved: {}", pending.module_id());
                self.pending_checkpoint = None;
                true
            }
            Err(err) => {
                log::warn!("checkpoint retry failed: {err}");
                false
            }
        }
    }

    /// Current profile point total.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` when the profile store cannot be read.
    pub async fn total_points(&self) -> Result<i64, StorageError> {
        self.profile.total_points().await
    }

    async fn apply(&mut self, effects: &[Effect]) -> TransitionReport {
        let mut report = TransitionReport::default();
        for effect in effects {
            match effect {
                Effect::SaveProgress(progress) => {
                    match self.progress.save_progress(progress, self.clock.now()).await {
                        Ok(()) => {
                            log::info!(
                                "checkpoint: {} -> {}",
                                progress.module_id(),
                                progress.phase()
                            );
                            self.pending_checkpoint = None;
                        }
                        Err(err) => {
                            log::warn!("checkpoint failed, retaining for retry: {err}");
                            self.pending_checkpoint = Some(progress.clone());
                            report.checkpoint_failed = true;
                        }
                    }
                }
                Effect::AwardPoints(amount) => {
                    match self.profile.award_points(*amount).await {
                        Ok(total) => report.points_total = Some(total),
                        Err(err) => log::warn!("award of {amount} points failed: {err}"),
                    }
                }
                Effect::CompleteModule(id) => {
                    match self.profile.mark_module_complete(id, self.clock.now()).await {
                        Ok(()) => report.completed = true,
                        Err(err) => log::warn!("completion mark failed for {id}: {err}"),
                    }
                }
            }
        }
        report
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::atomic::{AtomicBool, Ordering};
    use storage::repository::InMemoryRepository;
    use tutor_core::model::{Difficulty, ModuleId, Operation, Phase};
    use tutor_core::time::fixed_clock;

    fn module() -> CourseModule {
        CourseModule::new(
            ModuleId::new("addition-vertically").unwrap(),
            "Lightning Addition",
            "Add large numbers column by column.",
            Operation::Addition,
            Difficulty::Beginner,
            100,
            false,
        )
        .unwrap()
    }

    fn service(repo: &InMemoryRepository) -> ModuleLoopService {
        ModuleLoopService::new(
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            fixed_clock(),
        )
    }

    /// Progress store that fails every write until `healed` is flipped.
    struct FlakyProgress {
        inner: InMemoryRepository,
        healed: AtomicBool,
    }

    #[async_trait]
    impl ProgressRepository for FlakyProgress {
        async fn load_progress(
            &self,
            id: &ModuleId,
        ) -> Result<Option<ModuleProgress>, StorageError> {
            self.inner.load_progress(id).await
        }

        async fn save_progress(
            &self,
            progress: &ModuleProgress,
            saved_at: DateTime<Utc>,
        ) -> Result<(), StorageError> {
            if self.healed.load(Ordering::SeqCst) {
                self.inner.save_progress(progress, saved_at).await
            } else {
                Err(StorageError::Connection("store down".into()))
            }
        }
    }

    struct FailingLoad;

    #[async_trait]
    impl ProgressRepository for FailingLoad {
        async fn load_progress(
            &self,
            _id: &ModuleId,
        ) -> Result<Option<ModuleProgress>, StorageError> {
            Err(StorageError::Connection("store down".into()))
        }

        async fn save_progress(
            &self,
            _progress: &ModuleProgress,
            _saved_at: DateTime<Utc>,
        ) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn mount_resumes_persisted_progress() {
        let repo = InMemoryRepository::new();
        let saved =
            ModuleProgress::new(module().id().clone(), Phase::Understand, 10, 9, 90).unwrap();
        repo.save_progress(&saved, fixed_clock().now()).await.unwrap();

        let service = service(&repo);
        let session = service.mount(module(), SessionConfig::default()).await;
        assert_eq!(session.phase(), Phase::Understand);
        assert_eq!(session.practice_summary().unwrap().correct(), 9);
    }

    #[tokio::test]
    async fn mount_starts_fresh_when_the_load_fails() {
        let service = ModuleLoopService::new(
            Arc::new(FailingLoad),
            Arc::new(InMemoryRepository::new()),
            fixed_clock(),
        );
        let session = service.mount(module(), SessionConfig::default()).await;
        assert_eq!(session.phase(), Phase::Learn);
        assert_eq!(session.state().answered_count(), 0);
    }

    #[tokio::test]
    async fn answers_award_points_and_checkpoint_at_the_boundary() {
        let repo = InMemoryRepository::new();
        let mut service = service(&repo);
        let mut session = service.mount(module(), SessionConfig::default()).await;

        service.start_practice(&mut session).await.unwrap();
        session
            .select_practice_count(10, &mut StdRng::seed_from_u64(5))
            .unwrap();

        let mut last_total = 0;
        for _ in 0..10 {
            let correct = session
                .current_question()
                .unwrap()
                .correct_answer()
                .to_owned();
            session.select_answer(&correct).unwrap();
            let answered = service.submit_answer(&mut session).await.unwrap();
            assert!(answered.outcome().correct());
            last_total = answered.report().points_total().unwrap();
        }
        assert_eq!(last_total, 200);

        let stored = repo.load_progress(module().id()).await.unwrap().unwrap();
        assert_eq!(stored.phase(), Phase::Understand);
        assert_eq!(stored.correct_answers(), 10);

        let report = service.complete_module(&mut session).await.unwrap();
        assert!(report.completed());
        assert_eq!(report.points_total(), Some(300));
        assert_eq!(
            repo.completed_modules().await.unwrap(),
            vec![module().id().clone()]
        );
    }

    #[tokio::test]
    async fn failed_checkpoint_is_retained_and_retried() {
        let flaky = Arc::new(FlakyProgress {
            inner: InMemoryRepository::new(),
            healed: AtomicBool::new(false),
        });
        let mut service = ModuleLoopService::new(
            flaky.clone(),
            Arc::new(InMemoryRepository::new()),
            fixed_clock(),
        );
        let mut session = service.mount(module(), SessionConfig::default()).await;

        let report = service.start_practice(&mut session).await.unwrap();
        assert!(report.checkpoint_failed());
        assert_eq!(
            service.pending_checkpoint().map(ModuleProgress::phase),
            Some(Phase::Practice)
        );
        // The session advanced regardless of the failed write.
        assert_eq!(session.phase(), Phase::Practice);

        assert!(!service.retry_checkpoint().await);

        flaky.healed.store(true, Ordering::SeqCst);
        assert!(service.retry_checkpoint().await);
        assert!(service.pending_checkpoint().is_none());
        let stored = flaky.load_progress(module().id()).await.unwrap().unwrap();
        assert_eq!(stored.phase(), Phase::Practice);
    }

    #[tokio::test]
    async fn timeout_through_the_service_reports_the_outcome() {
        let repo = InMemoryRepository::new();
        let mut service = service(&repo);
        let config = SessionConfig::new(2, true, vec![10, 20, 30, 40]);
        let mut session = service.mount(module(), config).await;

        service.start_practice(&mut session).await.unwrap();
        session
            .select_practice_count(10, &mut StdRng::seed_from_u64(5))
            .unwrap();

        assert!(service.question_tick(&mut session).await.unwrap().is_none());
        let answered = service
            .question_tick(&mut session)
            .await
            .unwrap()
            .expect("second tick should time the question out");
        assert!(answered.outcome().timed_out());
        assert_eq!(session.state().question_index(), 1);
    }
}

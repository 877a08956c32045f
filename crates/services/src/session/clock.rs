use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tutor_core::model::Phase;

use crate::session::state::SessionState;

/// A one-second pulse from one of the two session clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// Feed into `ModuleSession::question_tick`.
    Question,
    /// Feed into `ModuleSession::session_tick`.
    Session,
}

/// The two concurrent countdowns of an active practice batch, as abortable
/// interval tasks feeding a single channel.
///
/// The pair holds no session state of its own: after every transition the
/// driver calls [`ClockPair::sync`] with a fresh snapshot and each clock is
/// armed or torn down from its governing condition. Tearing a clock down
/// aborts its task and drops its queued events, so a tick can never arrive
/// after the state that produced it is gone.
pub struct ClockPair {
    tx: mpsc::Sender<ClockEvent>,
    rx: mpsc::Receiver<ClockEvent>,
    question: Option<JoinHandle<()>>,
    session: Option<JoinHandle<()>>,
}

impl ClockPair {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(16);
        Self {
            tx,
            rx,
            question: None,
            session: None,
        }
    }

    /// Re-arms or tears down each clock from the snapshot. A clock that is
    /// already in the right state is left alone, so its cadence is not
    /// disturbed.
    pub fn sync(&mut self, state: &SessionState) {
        let practicing = state.phase() == Phase::Practice
            && state.practice_count().is_some()
            && !state.paused();
        let question_should_run = practicing && state.timer_enabled();
        let session_should_run = practicing;

        Self::set(&mut self.question, question_should_run, || {
            Self::arm(self.tx.clone(), ClockEvent::Question)
        });
        Self::set(&mut self.session, session_should_run, || {
            Self::arm(self.tx.clone(), ClockEvent::Session)
        });

        self.drain_dead();
    }

    /// Tears down both clocks and drops everything queued. Used while the
    /// driver holds a result on screen.
    pub fn teardown(&mut self) {
        if let Some(task) = self.question.take() {
            task.abort();
        }
        if let Some(task) = self.session.take() {
            task.abort();
        }
        while self.rx.try_recv().is_ok() {}
    }

    /// Waits for the next tick from whichever clock fires first.
    pub async fn next(&mut self) -> Option<ClockEvent> {
        self.rx.recv().await
    }

    fn set(slot: &mut Option<JoinHandle<()>>, should_run: bool, arm: impl FnOnce() -> JoinHandle<()>) {
        match (should_run, slot.as_ref()) {
            (true, None) => *slot = Some(arm()),
            (false, Some(_)) => {
                if let Some(task) = slot.take() {
                    task.abort();
                }
            }
            _ => {}
        }
    }

    fn arm(tx: mpsc::Sender<ClockEvent>, event: ClockEvent) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick completes immediately; the clock
            // starts counting from the next one.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        })
    }

    /// Discards queued events whose clock has been torn down, keeping the
    /// live clock's ticks in order.
    fn drain_dead(&mut self) {
        if self.question.is_some() && self.session.is_some() {
            return;
        }
        let mut keep = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            let alive = match event {
                ClockEvent::Question => self.question.is_some(),
                ClockEvent::Session => self.session.is_some(),
            };
            if alive {
                keep.push(event);
            }
        }
        for event in keep {
            // Capacity was just freed by the drain.
            let _ = self.tx.try_send(event);
        }
    }
}

impl Default for ClockPair {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ClockPair {
    fn drop(&mut self) {
        if let Some(task) = self.question.take() {
            task.abort();
        }
        if let Some(task) = self.session.take() {
            task.abort();
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

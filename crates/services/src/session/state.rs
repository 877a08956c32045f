use tutor_core::model::Phase;

/// Read-only snapshot of the session, taken after every transition.
///
/// The presentation layer and the clock pair both consume this instead of
/// reaching into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) phase: Phase,
    pub(crate) question_index: usize,
    pub(crate) practice_count: Option<u32>,
    pub(crate) answered_count: u32,
    pub(crate) correct_count: u32,
    pub(crate) selected_answer: Option<String>,
    pub(crate) answered: bool,
    pub(crate) time_left: u32,
    pub(crate) time_spent: u32,
    pub(crate) session_elapsed: u32,
    pub(crate) session_time_left: u32,
    pub(crate) session_overtime: u32,
    pub(crate) paused: bool,
    pub(crate) return_to_practice: bool,
    pub(crate) timer_enabled: bool,
}

impl SessionState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Zero-based index of the question currently shown.
    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    /// The chosen batch size, once the count gate has been passed.
    #[must_use]
    pub fn practice_count(&self) -> Option<u32> {
        self.practice_count
    }

    #[must_use]
    pub fn answered_count(&self) -> u32 {
        self.answered_count
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn selected_answer(&self) -> Option<&str> {
        self.selected_answer.as_deref()
    }

    /// True only when the final question has been answered and the session
    /// has moved to the recap.
    #[must_use]
    pub fn answered(&self) -> bool {
        self.answered
    }

    /// Seconds remaining on the current question.
    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Cumulative seconds spent answering across the whole visit.
    #[must_use]
    pub fn time_spent(&self) -> u32 {
        self.time_spent
    }

    #[must_use]
    pub fn session_elapsed(&self) -> u32 {
        self.session_elapsed
    }

    /// Seconds left before the advisory session cap. Display state only.
    #[must_use]
    pub fn session_time_left(&self) -> u32 {
        self.session_time_left
    }

    /// Seconds past the advisory session cap, zero until the cap is crossed.
    #[must_use]
    pub fn session_overtime(&self) -> u32 {
        self.session_overtime
    }

    #[must_use]
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Set while a worked-example detour from practice is open.
    #[must_use]
    pub fn return_to_practice(&self) -> bool {
        self.return_to_practice
    }

    #[must_use]
    pub fn timer_enabled(&self) -> bool {
        self.timer_enabled
    }
}

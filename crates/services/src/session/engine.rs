use rand::Rng;

use tutor_core::generate::generate_questions;
use tutor_core::model::{CourseModule, ModuleId, ModuleProgress, Phase, Question};

use crate::config::{SUBMIT_REVEAL_MS, SessionConfig, TIMEOUT_REVEAL_MS};
use crate::error::SessionError;
use crate::session::state::SessionState;
use crate::session::view::PracticeSummary;

//
// ─── EFFECTS ───────────────────────────────────────────────────────────────────
//

/// Side effects a transition asks the caller to perform.
///
/// The engine never talks to storage itself; every externally visible
/// consequence of a transition comes back as one of these values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist a progress checkpoint.
    SaveProgress(ModuleProgress),
    /// Add points to the learner profile.
    AwardPoints(u32),
    /// Record the module as completed.
    CompleteModule(ModuleId),
}

/// Result of evaluating an answer, whether submitted or timed out.
///
/// `reveal_ms` is how long the driver should hold the result on screen with
/// the clocks torn down; the engine itself has already advanced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    correct: bool,
    timed_out: bool,
    correct_answer: String,
    explanation: String,
    reveal_ms: u64,
    effects: Vec<Effect>,
}

impl AnswerOutcome {
    #[must_use]
    pub fn correct(&self) -> bool {
        self.correct
    }

    #[must_use]
    pub fn timed_out(&self) -> bool {
        self.timed_out
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    /// Duration the driver should display the result before moving on.
    #[must_use]
    pub fn reveal_ms(&self) -> u64 {
        self.reveal_ms
    }

    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }
}

/// What a one-second question tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionTick {
    /// The tick did not apply (wrong phase, paused, timer disabled).
    Ignored,
    /// The countdown decremented without reaching zero.
    Counted,
    /// The countdown crossed zero and the question was evaluated as a
    /// timeout within this same tick.
    TimedOut(AnswerOutcome),
}

//
// ─── SESSION ENGINE ────────────────────────────────────────────────────────────
//

/// The per-module session state machine.
///
/// State is mutated only through the named transition functions below; each
/// returns the effects the caller must apply. Illegal transitions fail with
/// `SessionError` and leave the state untouched.
#[derive(Debug, Clone)]
pub struct ModuleSession {
    module: CourseModule,
    config: SessionConfig,
    phase: Phase,
    questions: Vec<Question>,
    question_index: usize,
    selected_answer: Option<String>,
    answered: bool,
    answered_count: u32,
    correct_count: u32,
    practice_count: Option<u32>,
    return_to_practice: bool,
    time_left: u32,
    time_spent: u32,
    session_elapsed: u32,
    paused: bool,
    points_earned: u32,
}

impl ModuleSession {
    /// Mounts a session for `module`, resuming from persisted progress.
    ///
    /// Checkpoints are only written at phase boundaries, so a record in the
    /// practice phase always carries freshly reset counters; questions are
    /// regenerated when the learner re-picks a practice count.
    #[must_use]
    pub fn resume(module: CourseModule, config: SessionConfig, progress: &ModuleProgress) -> Self {
        let time_left = config.time_limit_secs();
        Self {
            module,
            phase: progress.phase(),
            questions: Vec::new(),
            question_index: 0,
            selected_answer: None,
            answered: false,
            answered_count: progress.questions_answered(),
            correct_count: progress.correct_answers(),
            practice_count: None,
            return_to_practice: false,
            time_left,
            time_spent: progress.time_spent(),
            session_elapsed: 0,
            paused: false,
            points_earned: 0,
            config,
        }
    }

    // ─── Phase transitions ──────────────────────────────────────────────────

    /// Learn → practice. Resets every practice counter and clears the count
    /// so the learner re-enters the count gate.
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside learn; `DetourPending` while a worked-example
    /// detour from practice is open (use `return_to_practice` instead, which
    /// preserves the batch).
    pub fn advance_from_learn(&mut self) -> Result<Vec<Effect>, SessionError> {
        if self.phase != Phase::Learn {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        if self.return_to_practice {
            return Err(SessionError::DetourPending);
        }

        self.answered_count = 0;
        self.correct_count = 0;
        self.time_spent = 0;
        self.session_elapsed = 0;
        self.points_earned = 0;
        self.practice_count = None;
        self.questions.clear();
        self.question_index = 0;
        self.selected_answer = None;
        self.answered = false;
        self.paused = false;
        self.time_left = self.config.time_limit_secs();
        self.phase = Phase::Practice;

        Ok(vec![Effect::SaveProgress(self.checkpoint(Phase::Practice)?)])
    }

    /// Opens the worked-example screen. From practice this is a detour and
    /// sets the return flag; from the recap it is a plain revisit.
    ///
    /// # Errors
    ///
    /// `WrongPhase` outside practice or understand.
    pub fn view_example(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Practice => {
                self.return_to_practice = true;
                self.phase = Phase::Learn;
                Ok(())
            }
            Phase::Understand => {
                self.phase = Phase::Learn;
                Ok(())
            }
            phase => Err(SessionError::WrongPhase { phase }),
        }
    }

    /// Closes a worked-example detour, restoring practice exactly where it
    /// left off: question index, counters, selection and remaining time are
    /// all untouched.
    ///
    /// # Errors
    ///
    /// `WrongPhase` unless in learn with the return flag set.
    pub fn return_to_practice(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Learn || !self.return_to_practice {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        self.return_to_practice = false;
        self.phase = Phase::Practice;
        Ok(())
    }

    /// Fixes the batch size and generates the questions. Arms the session
    /// clock by resetting `session_elapsed`.
    ///
    /// # Errors
    ///
    /// `CountAlreadyChosen` once a batch exists, `UnknownCount` for a size
    /// not on the configured menu; a generation failure aborts the selection
    /// with no state change.
    pub fn select_practice_count(
        &mut self,
        count: u32,
        rng: &mut impl Rng,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Practice {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        if self.practice_count.is_some() {
            return Err(SessionError::CountAlreadyChosen);
        }
        if !self.config.practice_counts().contains(&count) {
            return Err(SessionError::UnknownCount(count));
        }

        let questions = generate_questions(self.module.operation(), count, rng)?;

        self.questions = questions;
        self.practice_count = Some(count);
        self.question_index = 0;
        self.selected_answer = None;
        self.answered = false;
        self.paused = false;
        self.time_left = self.config.time_limit_secs();
        self.session_elapsed = 0;
        Ok(())
    }

    /// Records the learner's current pick among the four options.
    ///
    /// # Errors
    ///
    /// `UnknownChoice` if the string is not one of the displayed options.
    pub fn select_answer(&mut self, choice: &str) -> Result<(), SessionError> {
        if self.phase != Phase::Practice {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        let question = self.current_question().ok_or(SessionError::NoCountSelected)?;
        if !question.options().iter().any(|o| o == choice) {
            return Err(SessionError::UnknownChoice(choice.to_owned()));
        }
        self.selected_answer = Some(choice.to_owned());
        Ok(())
    }

    /// Evaluates the current selection and advances atomically: next question
    /// with a fresh timer, or practice → understand on the final one.
    ///
    /// # Errors
    ///
    /// `NoSelection` when nothing is picked; phase and count guards as usual.
    pub fn submit_answer(&mut self) -> Result<AnswerOutcome, SessionError> {
        if self.phase != Phase::Practice {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        let question = self
            .current_question()
            .ok_or(SessionError::NoCountSelected)?;
        let choice = self
            .selected_answer
            .as_deref()
            .ok_or(SessionError::NoSelection)?;
        let correct = question.is_correct(choice);
        self.evaluate_and_advance(correct, false)
    }

    /// Pauses or resumes the practice clocks. Advancing to the next question
    /// always unpauses.
    ///
    /// # Errors
    ///
    /// `NoCountSelected` before the count gate; `WrongPhase` outside practice.
    pub fn toggle_pause(&mut self) -> Result<bool, SessionError> {
        if self.phase != Phase::Practice {
            return Err(SessionError::WrongPhase { phase: self.phase });
        }
        if self.practice_count.is_none() {
            return Err(SessionError::NoCountSelected);
        }
        self.paused = !self.paused;
        Ok(self.paused)
    }

    /// Understand → completed. Terminal.
    ///
    /// # Errors
    ///
    /// `Completed` if already done; `WrongPhase` outside understand.
    pub fn complete_module(&mut self) -> Result<Vec<Effect>, SessionError> {
        match self.phase {
            Phase::Understand => {}
            Phase::Completed => return Err(SessionError::Completed),
            phase => return Err(SessionError::WrongPhase { phase }),
        }

        self.phase = Phase::Completed;
        Ok(vec![
            Effect::SaveProgress(self.checkpoint(Phase::Completed)?),
            Effect::CompleteModule(self.module.id().clone()),
            Effect::AwardPoints(self.module.points_reward()),
        ])
    }

    // ─── Clock input ────────────────────────────────────────────────────────

    /// Applies one second of question time. Ignored outside active,
    /// unpaused, timer-enabled practice. The zero-crossing tick evaluates
    /// the question as a timeout within this same call.
    ///
    /// # Errors
    ///
    /// Only the timeout branch can fail, and only on a checkpoint that
    /// violates its own counter invariant, which the engine upholds.
    pub fn question_tick(&mut self) -> Result<QuestionTick, SessionError> {
        let active = self.phase == Phase::Practice
            && self.practice_count.is_some()
            && !self.paused
            && self.config.timer_enabled();
        if !active {
            return Ok(QuestionTick::Ignored);
        }

        self.time_left = self.time_left.saturating_sub(1);
        self.time_spent += 1;

        if self.time_left == 0 {
            // Timeout is always incorrect, selection or not.
            let outcome = self.evaluate_and_advance(false, true)?;
            return Ok(QuestionTick::TimedOut(outcome));
        }
        Ok(QuestionTick::Counted)
    }

    /// Applies one second of session time. The 600 s cap is advisory: the
    /// elapsed counter keeps climbing past it and only the display changes.
    pub fn session_tick(&mut self) {
        if self.phase == Phase::Practice && self.practice_count.is_some() && !self.paused {
            self.session_elapsed += 1;
        }
    }

    // ─── Read access ────────────────────────────────────────────────────────

    #[must_use]
    pub fn module(&self) -> &CourseModule {
        &self.module
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.question_index)
    }

    /// Points earned from correct answers in this visit, excluding the
    /// module completion reward.
    #[must_use]
    pub fn points_earned(&self) -> u32 {
        self.points_earned
    }

    /// Recap numbers, available once practice has finished.
    #[must_use]
    pub fn practice_summary(&self) -> Option<PracticeSummary> {
        match self.phase {
            Phase::Understand | Phase::Completed => Some(PracticeSummary::new(
                self.correct_count,
                self.answered_count,
                self.time_spent,
                self.points_earned,
            )),
            Phase::Learn | Phase::Practice => None,
        }
    }

    /// Snapshot for the presentation layer and the clock pair.
    #[must_use]
    pub fn state(&self) -> SessionState {
        let cap = self.config.session_cap_secs();
        SessionState {
            phase: self.phase,
            question_index: self.question_index,
            practice_count: self.practice_count,
            answered_count: self.answered_count,
            correct_count: self.correct_count,
            selected_answer: self.selected_answer.clone(),
            answered: self.answered,
            time_left: self.time_left,
            time_spent: self.time_spent,
            session_elapsed: self.session_elapsed,
            session_time_left: cap.saturating_sub(self.session_elapsed),
            session_overtime: self.session_elapsed.saturating_sub(cap),
            paused: self.paused,
            return_to_practice: self.return_to_practice,
            timer_enabled: self.config.timer_enabled(),
        }
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    /// Shared evaluation for submit and timeout: bump the counters, award
    /// points on a correct answer, then advance in the same step.
    fn evaluate_and_advance(
        &mut self,
        correct: bool,
        timed_out: bool,
    ) -> Result<AnswerOutcome, SessionError> {
        let question = self
            .current_question()
            .cloned()
            .ok_or(SessionError::NoCountSelected)?;

        self.answered = true;
        self.answered_count += 1;

        let mut effects = Vec::new();
        if correct {
            self.correct_count += 1;
            self.points_earned += question.points();
            effects.push(Effect::AwardPoints(question.points()));
        }

        let count = self.practice_count.unwrap_or(0) as usize;
        if self.question_index + 1 < count {
            self.question_index += 1;
            self.selected_answer = None;
            self.answered = false;
            self.paused = false;
            self.time_left = self.config.time_limit_secs();
        } else {
            self.phase = Phase::Understand;
            effects.push(Effect::SaveProgress(self.checkpoint(Phase::Understand)?));
        }

        log::debug!(
            "answered {}/{} ({}), correct={correct}, timed_out={timed_out}",
            self.answered_count,
            count,
            question.id(),
        );

        Ok(AnswerOutcome {
            correct,
            timed_out,
            correct_answer: question.correct_answer().to_owned(),
            explanation: question.explanation().to_owned(),
            reveal_ms: if timed_out {
                TIMEOUT_REVEAL_MS
            } else {
                SUBMIT_REVEAL_MS
            },
            effects,
        })
    }

    fn checkpoint(&self, phase: Phase) -> Result<ModuleProgress, SessionError> {
        Ok(ModuleProgress::new(
            self.module.id().clone(),
            phase,
            self.answered_count,
            self.correct_count,
            self.time_spent,
        )?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tutor_core::model::{Difficulty, Operation};

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn module() -> CourseModule {
        CourseModule::new(
            ModuleId::new("subtraction-nikhilam").unwrap(),
            "Magic Subtraction",
            "Subtract from powers of ten without borrowing.",
            Operation::Subtraction,
            Difficulty::Beginner,
            100,
            false,
        )
        .unwrap()
    }

    fn fresh() -> ModuleSession {
        let m = module();
        let progress = ModuleProgress::fresh(m.id().clone());
        ModuleSession::resume(m, SessionConfig::default(), &progress)
    }

    /// A session already past the count gate with `count` questions.
    fn practicing(count: u32) -> ModuleSession {
        let m = module();
        let progress = ModuleProgress::fresh(m.id().clone());
        let config = SessionConfig::new(30, true, vec![10, 20, 30, 40, count]);
        let mut s = ModuleSession::resume(m, config, &progress);
        s.advance_from_learn().unwrap();
        s.select_practice_count(count, &mut rng(1)).unwrap();
        s
    }

    fn answer_correctly(s: &mut ModuleSession) -> AnswerOutcome {
        let correct = s.current_question().unwrap().correct_answer().to_owned();
        s.select_answer(&correct).unwrap();
        s.submit_answer().unwrap()
    }

    #[test]
    fn advance_from_learn_resets_and_checkpoints_next_phase() {
        let m = module();
        let progress = ModuleProgress::new(m.id().clone(), Phase::Learn, 0, 0, 0).unwrap();
        let mut s = ModuleSession::resume(m, SessionConfig::default(), &progress);

        let effects = s.advance_from_learn().unwrap();
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::SaveProgress(p) => {
                assert_eq!(p.phase(), Phase::Practice);
                assert_eq!(p.questions_answered(), 0);
                assert_eq!(p.correct_answers(), 0);
                assert_eq!(p.time_spent(), 0);
            }
            other => panic!("unexpected effect: {other:?}"),
        }

        let state = s.state();
        assert_eq!(state.phase(), Phase::Practice);
        assert_eq!(state.practice_count(), None);
        assert_eq!(state.time_left(), 30);
    }

    #[test]
    fn count_gate_validates_the_menu() {
        let mut s = fresh();
        s.advance_from_learn().unwrap();

        assert!(matches!(
            s.select_practice_count(15, &mut rng(1)),
            Err(SessionError::UnknownCount(15))
        ));

        s.select_practice_count(10, &mut rng(1)).unwrap();
        assert_eq!(s.state().practice_count(), Some(10));
        assert_eq!(s.state().session_elapsed(), 0);

        assert!(matches!(
            s.select_practice_count(20, &mut rng(1)),
            Err(SessionError::CountAlreadyChosen)
        ));
    }

    #[test]
    fn submit_requires_a_selection_among_the_options() {
        let mut s = practicing(10);

        assert!(matches!(s.submit_answer(), Err(SessionError::NoSelection)));
        assert!(matches!(
            s.select_answer("not-an-option"),
            Err(SessionError::UnknownChoice(_))
        ));

        let outcome = answer_correctly(&mut s);
        assert!(outcome.correct());
        assert!(!outcome.timed_out());
        assert_eq!(outcome.reveal_ms(), 1_200);
        assert_eq!(outcome.effects(), &[Effect::AwardPoints(20)]);

        let state = s.state();
        assert_eq!(state.question_index(), 1);
        assert_eq!(state.answered_count(), 1);
        assert_eq!(state.correct_count(), 1);
        assert_eq!(state.selected_answer(), None);
        assert_eq!(state.time_left(), 30);
    }

    #[test]
    fn thirty_ticks_time_out_the_first_question() {
        let mut s = practicing(10);

        for _ in 0..29 {
            assert_eq!(s.question_tick().unwrap(), QuestionTick::Counted);
        }
        let tick = s.question_tick().unwrap();
        let QuestionTick::TimedOut(outcome) = tick else {
            panic!("expected a timeout, got {tick:?}");
        };
        assert!(!outcome.correct());
        assert!(outcome.timed_out());
        assert_eq!(outcome.reveal_ms(), 400);
        assert!(outcome.effects().is_empty());

        let state = s.state();
        assert_eq!(state.answered_count(), 1);
        assert_eq!(state.correct_count(), 0);
        assert_eq!(state.time_spent(), 30);
        assert_eq!(state.question_index(), 1);
        assert_eq!(state.time_left(), 30);
    }

    #[test]
    fn timeout_discards_a_pending_selection() {
        let mut s = practicing(10);
        let correct = s.current_question().unwrap().correct_answer().to_owned();
        s.select_answer(&correct).unwrap();

        for _ in 0..29 {
            s.question_tick().unwrap();
        }
        let QuestionTick::TimedOut(outcome) = s.question_tick().unwrap() else {
            panic!("expected a timeout");
        };
        assert!(!outcome.correct());
        assert_eq!(s.state().correct_count(), 0);
    }

    #[test]
    fn all_correct_run_ends_in_understand_at_full_accuracy() {
        let mut s = practicing(10);

        for i in 0..10 {
            let outcome = answer_correctly(&mut s);
            assert!(outcome.correct());
            if i == 9 {
                // The final answer carries the practice → understand
                // checkpoint alongside its points award.
                assert!(outcome.effects().iter().any(|e| matches!(
                    e,
                    Effect::SaveProgress(p) if p.phase() == Phase::Understand
                )));
            }
        }

        assert_eq!(s.phase(), Phase::Understand);
        assert!(s.state().answered());

        let summary = s.practice_summary().unwrap();
        assert_eq!(summary.correct(), 10);
        assert_eq!(summary.total(), 10);
        assert_eq!(summary.accuracy_percent(), 100);
        assert_eq!(summary.points_earned(), 200);
    }

    #[test]
    fn pause_freezes_both_counters_exactly() {
        let mut s = practicing(10);

        for _ in 0..5 {
            s.question_tick().unwrap();
            s.session_tick();
        }
        assert_eq!(s.state().time_left(), 25);
        assert_eq!(s.state().session_elapsed(), 5);

        assert!(s.toggle_pause().unwrap());
        for _ in 0..7 {
            assert_eq!(s.question_tick().unwrap(), QuestionTick::Ignored);
            s.session_tick();
        }
        assert_eq!(s.state().time_left(), 25);
        assert_eq!(s.state().time_spent(), 5);
        assert_eq!(s.state().session_elapsed(), 5);

        assert!(!s.toggle_pause().unwrap());
        s.question_tick().unwrap();
        s.session_tick();
        assert_eq!(s.state().time_left(), 24);
        assert_eq!(s.state().session_elapsed(), 6);
    }

    #[test]
    fn detour_preserves_practice_exactly() {
        let mut s = practicing(10);
        answer_correctly(&mut s);
        answer_correctly(&mut s);

        for _ in 0..4 {
            s.question_tick().unwrap();
        }
        let pick = s.current_question().unwrap().options()[0].clone();
        s.select_answer(&pick).unwrap();

        s.view_example().unwrap();
        assert_eq!(s.phase(), Phase::Learn);
        assert!(s.state().return_to_practice());

        // Clocks are governed by phase, so ticks during the detour are inert.
        assert_eq!(s.question_tick().unwrap(), QuestionTick::Ignored);
        assert!(matches!(
            s.advance_from_learn(),
            Err(SessionError::DetourPending)
        ));

        s.return_to_practice().unwrap();
        let state = s.state();
        assert_eq!(state.phase(), Phase::Practice);
        assert!(!state.return_to_practice());
        assert_eq!(state.question_index(), 2);
        assert_eq!(state.answered_count(), 2);
        assert_eq!(state.correct_count(), 2);
        assert_eq!(state.selected_answer(), Some(pick.as_str()));
        assert_eq!(state.time_left(), 26);
    }

    #[test]
    fn revisiting_learn_from_understand_restarts_practice_fresh() {
        let mut s = practicing(4);
        for _ in 0..4 {
            answer_correctly(&mut s);
        }
        assert_eq!(s.phase(), Phase::Understand);

        s.view_example().unwrap();
        assert!(!s.state().return_to_practice());
        assert!(matches!(
            s.return_to_practice(),
            Err(SessionError::WrongPhase { .. })
        ));

        s.advance_from_learn().unwrap();
        let state = s.state();
        assert_eq!(state.answered_count(), 0);
        assert_eq!(state.correct_count(), 0);
        assert_eq!(state.time_spent(), 0);
        assert_eq!(state.practice_count(), None);
    }

    #[test]
    fn completion_is_terminal_and_awards_the_module_reward() {
        let mut s = practicing(4);
        for _ in 0..4 {
            answer_correctly(&mut s);
        }

        let effects = s.complete_module().unwrap();
        assert_eq!(effects.len(), 3);
        assert!(matches!(
            &effects[0],
            Effect::SaveProgress(p) if p.phase() == Phase::Completed
        ));
        assert_eq!(
            effects[1],
            Effect::CompleteModule(ModuleId::new("subtraction-nikhilam").unwrap())
        );
        assert_eq!(effects[2], Effect::AwardPoints(100));

        assert!(matches!(s.complete_module(), Err(SessionError::Completed)));
        assert!(matches!(
            s.submit_answer(),
            Err(SessionError::WrongPhase { .. })
        ));
    }

    #[test]
    fn disabled_timer_ignores_question_ticks() {
        let m = module();
        let progress = ModuleProgress::fresh(m.id().clone());
        let config = SessionConfig::new(0, true, vec![10, 20, 30, 40]);
        let mut s = ModuleSession::resume(m, config, &progress);
        s.advance_from_learn().unwrap();
        s.select_practice_count(10, &mut rng(1)).unwrap();

        assert_eq!(s.question_tick().unwrap(), QuestionTick::Ignored);
        // The session clock still runs.
        s.session_tick();
        assert_eq!(s.state().session_elapsed(), 1);
    }

    #[test]
    fn session_cap_is_advisory_only() {
        let mut s = practicing(10);
        for _ in 0..605 {
            s.session_tick();
        }
        let state = s.state();
        assert_eq!(state.session_elapsed(), 605);
        assert_eq!(state.session_time_left(), 0);
        assert_eq!(state.session_overtime(), 5);
        assert_eq!(s.phase(), Phase::Practice);
    }

    #[test]
    fn resume_mid_understand_restores_the_recap() {
        let m = module();
        let progress =
            ModuleProgress::new(m.id().clone(), Phase::Understand, 10, 8, 120).unwrap();
        let s = ModuleSession::resume(m, SessionConfig::default(), &progress);

        assert_eq!(s.phase(), Phase::Understand);
        let summary = s.practice_summary().unwrap();
        assert_eq!(summary.correct(), 8);
        assert_eq!(summary.total(), 10);
        assert_eq!(summary.accuracy_percent(), 80);
        assert_eq!(summary.time_spent_secs(), 120);
    }

    #[test]
    fn practice_resume_re_enters_the_count_gate() {
        let m = module();
        let progress = ModuleProgress::new(m.id().clone(), Phase::Practice, 0, 0, 0).unwrap();
        let mut s = ModuleSession::resume(m, SessionConfig::default(), &progress);

        assert_eq!(s.phase(), Phase::Practice);
        assert_eq!(s.state().practice_count(), None);
        assert!(matches!(
            s.submit_answer(),
            Err(SessionError::NoCountSelected)
        ));
        s.select_practice_count(20, &mut rng(2)).unwrap();
        assert!(s.current_question().is_some());
    }
}

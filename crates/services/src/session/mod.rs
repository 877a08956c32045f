//! The module session: phase state machine, clock pair and the persisted
//! workflow that drives them against storage.

mod clock;
mod engine;
mod state;
mod view;
mod workflow;

pub use clock::{ClockEvent, ClockPair};
pub use engine::{AnswerOutcome, Effect, ModuleSession, QuestionTick};
pub use state::SessionState;
pub use view::PracticeSummary;
pub use workflow::{Answered, ModuleLoopService, TransitionReport};

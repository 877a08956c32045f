#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod session;

pub use tutor_core::Clock;

pub use config::SessionConfig;
pub use error::SessionError;

pub use session::{
    AnswerOutcome, Answered, ClockEvent, ClockPair, Effect, ModuleLoopService, ModuleSession,
    PracticeSummary, QuestionTick, SessionState, TransitionReport,
};

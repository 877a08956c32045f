mod ids;
mod module;
mod progress;
mod question;

pub use ids::{ModuleId, ParseIdError, QuestionId};
pub use module::{CourseModule, Difficulty, ModuleError, Operation, catalog, find_in_catalog};
pub use progress::{ModuleProgress, Phase, ProgressError};
pub use question::{OPTION_COUNT, Question, QuestionError};

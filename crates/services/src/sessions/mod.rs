mod confirm;
mod engine;
mod host;
mod progress;
mod shuffle;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use confirm::{CANCEL_PROMPT, Confirm};
pub use engine::{
    AnswerOutcome, CommandOutcome, IgnoredCommand, QuizSession, SessionParams, SessionStatus,
};
pub use host::SessionHost;
pub use progress::SessionProgress;
pub use shuffle::shuffle;
pub use view::{
    AnswerMark, AnswerView, NavCell, NavState, QuestionView, SessionView, SummaryView,
};
pub use workflow::{SessionLoopService, ShuffleSource};

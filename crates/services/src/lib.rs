#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;
pub use sessions as session;

pub use error::SessionError;
pub use sessions::{
    AnswerMark, AnswerOutcome, AnswerView, CommandOutcome, Confirm, IgnoredCommand, NavCell,
    NavState, QuestionView, QuizSession, SessionHost, SessionLoopService, SessionParams,
    SessionProgress, SessionStatus, SessionView, ShuffleSource, SummaryView, shuffle,
};

mod answer;
mod bank;
mod ids;
mod question;
mod summary;

pub use ids::{QuestionId, SessionId};

pub use answer::AnsweredRecord;
pub use bank::{ALL_TOPICS, BankError, QuestionBank, Subject, Topic, TopicSelector};
pub use question::{Question, QuestionError};
pub use summary::{ReviewItem, SessionOutcome, SessionSummary, SummaryError};

#![forbid(unsafe_code)]

pub mod json;
pub mod records;
pub mod repository;

pub use json::{JsonFileRepository, parse_bank};
pub use repository::{InMemoryRepository, QuestionBankRepository, Storage, StorageError};

use async_trait::async_trait;
use quiz_core::model::{BankError, QuestionBank, QuestionError, Subject};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::json::JsonFileRepository;

/// Errors surfaced by question bank sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("question bank not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid question {position} in {subject}/{topic}: {source}")]
    InvalidQuestion {
        subject: String,
        topic: String,
        position: usize,
        #[source]
        source: QuestionError,
    },

    #[error(transparent)]
    InvalidBank(#[from] BankError),

    #[error("connection error: {0}")]
    Connection(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Source of the static question bank.
///
/// The returned `Arc` doubles as the bank's identity: a session host only
/// re-initializes when it receives a different `Arc`.
#[async_trait]
pub trait QuestionBankRepository: Send + Sync {
    /// Load the current bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bank cannot be read or fails validation.
    async fn load_bank(&self) -> Result<Arc<QuestionBank>, StorageError>;
}

/// In-memory bank for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    bank: Arc<Mutex<Arc<QuestionBank>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::with_bank(QuestionBank::new())
    }

    #[must_use]
    pub fn with_bank(bank: QuestionBank) -> Self {
        Self {
            bank: Arc::new(Mutex::new(Arc::new(bank))),
        }
    }

    /// Insert or replace a subject. Later loads observe a new bank identity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidBank` for an empty key.
    pub async fn upsert_subject(
        &self,
        key: impl Into<String> + Send,
        subject: Subject,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .bank
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut next = QuestionBank::clone(&guard);
        next.upsert_subject(key, subject)?;
        *guard = Arc::new(next);
        Ok(())
    }
}

#[async_trait]
impl QuestionBankRepository for InMemoryRepository {
    async fn load_bank(&self) -> Result<Arc<QuestionBank>, StorageError> {
        let guard = self
            .bank
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(Arc::clone(&guard))
    }
}

/// Bank source behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub banks: Arc<dyn QuestionBankRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory(bank: QuestionBank) -> Self {
        Self {
            banks: Arc::new(InMemoryRepository::with_bank(bank)),
        }
    }

    #[must_use]
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            banks: Arc::new(JsonFileRepository::new(path)),
        }
    }
}

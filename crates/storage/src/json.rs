use async_trait::async_trait;
use quiz_core::model::QuestionBank;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use crate::records::BankRecord;
use crate::repository::{QuestionBankRepository, StorageError};

/// Parse and validate a bank from its JSON text.
///
/// # Errors
///
/// Returns `StorageError::Serialization` for malformed JSON, or a validation
/// error for the first bad record.
pub fn parse_bank(json: &str) -> Result<QuestionBank, StorageError> {
    let record: BankRecord = serde_json::from_str(json)?;
    record.into_bank()
}

/// Reads the bank from a JSON file on every load.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionBankRepository for JsonFileRepository {
    async fn load_bank(&self) -> Result<Arc<QuestionBank>, StorageError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        parse_bank(&text).map(Arc::new)
    }
}

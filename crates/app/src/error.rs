use services::SessionError;
use storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("subject not found: {0}")]
    SubjectNotFound(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::SummaryError;
use storage::StorageError;

use crate::sessions::SessionStatus;

/// Errors emitted by session services.
///
/// User commands on a session never produce these; they are reported as
/// ignored outcomes instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is not finished (status: {0:?})")]
    NotFinished(SessionStatus),
    #[error(transparent)]
    Summary(#[from] SummaryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

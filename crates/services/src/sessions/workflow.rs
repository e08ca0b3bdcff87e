use std::sync::Arc;

use quiz_core::model::QuestionBank;
use rand::SeedableRng;
use rand::rngs::StdRng;
use storage::QuestionBankRepository;
use tracing::instrument;

use super::engine::{QuizSession, SessionParams};
use crate::Clock;
use crate::error::SessionError;

/// Where shuffles draw their randomness from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShuffleSource {
    #[default]
    Thread,
    /// Every session started with this source gets the same order for the
    /// same selection.
    Seeded(u64),
}

/// Loads the bank and starts sessions from it.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    banks: Arc<dyn QuestionBankRepository>,
    shuffle: ShuffleSource,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, banks: Arc<dyn QuestionBankRepository>) -> Self {
        Self {
            clock,
            banks,
            shuffle: ShuffleSource::Thread,
        }
    }

    #[must_use]
    pub fn with_shuffle(mut self, shuffle: ShuffleSource) -> Self {
        self.shuffle = shuffle;
        self
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Fetch the current bank from the repository.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the bank cannot be loaded.
    pub async fn load_bank(&self) -> Result<Arc<QuestionBank>, SessionError> {
        Ok(self.banks.load_bank().await?)
    }

    /// Build a session from an already loaded bank.
    #[must_use]
    pub fn start_with_bank(&self, bank: &QuestionBank, params: SessionParams) -> QuizSession {
        match self.shuffle {
            ShuffleSource::Thread => {
                QuizSession::start(bank, params, self.clock, &mut rand::rng())
            }
            ShuffleSource::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                QuizSession::start(bank, params, self.clock, &mut rng)
            }
        }
    }

    /// Load the bank and start a session for `params`.
    ///
    /// An empty selection is not an error: the session comes back with
    /// `SessionStatus::Empty`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the bank cannot be loaded.
    #[instrument(skip(self), fields(subject = %params.subject, topic = %params.topic))]
    pub async fn start_session(&self, params: SessionParams) -> Result<QuizSession, SessionError> {
        let bank = self.load_bank().await?;
        Ok(self.start_with_bank(&bank, params))
    }
}

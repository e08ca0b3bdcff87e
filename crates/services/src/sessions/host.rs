use std::sync::Arc;

use quiz_core::model::QuestionBank;
use tracing::{debug, info};

use super::engine::{QuizSession, SessionParams, SessionStatus};
use super::view::SessionView;
use super::workflow::SessionLoopService;
use crate::error::SessionError;

/// Owns the live session and swaps it out when the routing parameters or the
/// bank identity change.
///
/// A replacement session is fully built before it is installed, so readers
/// never observe a half-initialized session.
#[derive(Debug, Default)]
pub struct SessionHost {
    bank: Option<Arc<QuestionBank>>,
    session: Option<QuizSession>,
}

impl SessionHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut QuizSession> {
        self.session.as_mut()
    }

    /// The bank the live session was built from.
    #[must_use]
    pub fn bank(&self) -> Option<&Arc<QuestionBank>> {
        self.bank.as_ref()
    }

    /// Render-boundary view of the live session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if a finished session cannot be scored.
    pub fn view(&self) -> Result<Option<SessionView>, SessionError> {
        self.session.as_ref().map(SessionView::from_session).transpose()
    }

    /// Show a loading placeholder for `params` unless they are already live.
    pub fn begin_loading(&mut self, params: &SessionParams, loop_svc: &SessionLoopService) -> bool {
        if self.session.as_ref().is_some_and(|s| s.params() == params) {
            return false;
        }
        self.bank = None;
        self.session = Some(QuizSession::loading(params.clone(), loop_svc.clock()));
        true
    }

    /// Re-initialize when `params` or `bank` differ from the live session.
    ///
    /// Returns `true` if a new session was installed.
    pub fn sync(
        &mut self,
        loop_svc: &SessionLoopService,
        bank: Arc<QuestionBank>,
        params: SessionParams,
    ) -> bool {
        let same_bank = self.bank.as_ref().is_some_and(|b| Arc::ptr_eq(b, &bank));
        let same_params = self
            .session
            .as_ref()
            .is_some_and(|s| s.params() == &params && s.status() != SessionStatus::Loading);
        if same_bank && same_params {
            debug!(subject = %params.subject, topic = %params.topic, "session unchanged");
            return false;
        }

        let session = loop_svc.start_with_bank(&bank, params);
        info!(session = %session.id(), status = ?session.status(), "session replaced");
        self.bank = Some(bank);
        self.session = Some(session);
        true
    }

    /// Load the bank for `params` and sync to it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the bank cannot be loaded; the
    /// loading placeholder stays in place.
    pub async fn open(
        &mut self,
        loop_svc: &SessionLoopService,
        params: SessionParams,
    ) -> Result<bool, SessionError> {
        self.begin_loading(&params, loop_svc);
        let bank = loop_svc.load_bank().await?;
        Ok(self.sync(loop_svc, bank, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::workflow::ShuffleSource;
    use quiz_core::model::{Question, QuestionId, Subject, Topic};
    use quiz_core::time::fixed_clock;
    use storage::InMemoryRepository;

    fn build_bank(topics: &[(&str, u32)]) -> QuestionBank {
        let topics = topics
            .iter()
            .map(|(name, count)| {
                let questions = (0..*count)
                    .map(|i| {
                        Question::new(
                            QuestionId::new(i),
                            format!("{name}-{i}"),
                            vec!["a".into(), "b".into()],
                            0,
                            None,
                        )
                        .unwrap()
                    })
                    .collect();
                Topic::new(*name, questions).unwrap()
            })
            .collect();
        let subject = Subject::new("Biology", topics).unwrap();
        QuestionBank::from_subjects([("bio".to_owned(), subject)]).unwrap()
    }

    fn loop_svc() -> SessionLoopService {
        SessionLoopService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
            .with_shuffle(ShuffleSource::Seeded(3))
    }

    #[test]
    fn same_params_and_bank_keep_session() {
        let svc = loop_svc();
        let bank = Arc::new(build_bank(&[("cells", 3)]));
        let mut host = SessionHost::new();

        assert!(host.sync(&svc, Arc::clone(&bank), SessionParams::new("bio", "cells")));
        let id = host.session().unwrap().id();
        host.session_mut().unwrap().answer(0);

        assert!(!host.sync(&svc, Arc::clone(&bank), SessionParams::new("bio", "cells")));
        let session = host.session().unwrap();
        assert_eq!(session.id(), id);
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn param_change_replaces_session() {
        let svc = loop_svc();
        let bank = Arc::new(build_bank(&[("cells", 3), ("genes", 2)]));
        let mut host = SessionHost::new();

        host.sync(&svc, Arc::clone(&bank), SessionParams::new("bio", "cells"));
        let first = host.session().unwrap().id();

        assert!(host.sync(&svc, Arc::clone(&bank), SessionParams::new("bio", "all")));
        let session = host.session().unwrap();
        assert_ne!(session.id(), first);
        assert_eq!(session.total_questions(), 5);
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn new_bank_identity_replaces_session() {
        let svc = loop_svc();
        let mut host = SessionHost::new();
        let params = SessionParams::new("bio", "cells");

        host.sync(&svc, Arc::new(build_bank(&[("cells", 2)])), params.clone());
        let first = host.session().unwrap().id();

        assert!(host.sync(&svc, Arc::new(build_bank(&[("cells", 2)])), params));
        assert_ne!(host.session().unwrap().id(), first);
    }

    #[test]
    fn begin_loading_shows_placeholder_for_new_params_only() {
        let svc = loop_svc();
        let mut host = SessionHost::new();
        let params = SessionParams::new("bio", "cells");

        assert!(host.begin_loading(&params, &svc));
        assert_eq!(host.session().unwrap().status(), SessionStatus::Loading);

        host.sync(&svc, Arc::new(build_bank(&[("cells", 2)])), params.clone());
        assert_eq!(host.session().unwrap().status(), SessionStatus::InProgress);
        assert!(!host.begin_loading(&params, &svc));
        assert_eq!(host.session().unwrap().status(), SessionStatus::InProgress);
    }

    #[tokio::test]
    async fn open_loads_from_repository() {
        let repo = InMemoryRepository::new();
        let bank = build_bank(&[("cells", 2)]);
        let (key, subject) = bank.subjects().next().map(|(k, s)| (k.to_owned(), s.clone())).unwrap();
        repo.upsert_subject(key, subject).await.unwrap();
        let svc = SessionLoopService::new(fixed_clock(), Arc::new(repo.clone()));
        let mut host = SessionHost::new();
        let params = SessionParams::new("bio", "cells");

        assert!(host.open(&svc, params.clone()).await.unwrap());
        let id = host.session().unwrap().id();
        assert!(!host.open(&svc, params).await.unwrap());
        assert_eq!(host.session().unwrap().id(), id);

        assert!(host.open(&svc, SessionParams::new("bio", "missing")).await.unwrap());
        assert_eq!(host.session().unwrap().status(), SessionStatus::Empty);
    }
}

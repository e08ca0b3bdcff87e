use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;

use quiz_core::Clock;
use quiz_core::model::{
    AnsweredRecord, Question, QuestionBank, SessionId, SessionOutcome, SessionSummary,
    TopicSelector,
};
use rand::Rng;
use tracing::{debug, info};

use super::confirm::{CANCEL_PROMPT, Confirm};
use super::progress::SessionProgress;
use super::shuffle::shuffle;
use crate::error::SessionError;

//
// ─── PARAMETERS / STATUS ───────────────────────────────────────────────────────
//

/// Routing parameters a session is built from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionParams {
    pub subject: String,
    pub topic: TopicSelector,
}

impl SessionParams {
    #[must_use]
    pub fn new(subject: impl Into<String>, topic: impl Into<TopicSelector>) -> Self {
        Self {
            subject: subject.into(),
            topic: topic.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Loading,
    /// Selection produced no questions. Terminal until re-initialized.
    Empty,
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    #[must_use]
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Why a command left the session unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredCommand {
    NotInProgress,
    NotFinished,
    AlreadyAnswered,
    AnswerOutOfRange,
    IndexOutOfRange,
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Ignored(IgnoredCommand),
}

impl CommandOutcome {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Recorded and auto-advanced (possibly completing the session).
    Correct,
    /// Recorded; the session stays on the question with its explanation shown.
    Incorrect,
    Ignored(IgnoredCommand),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session over a shuffled question sequence.
///
/// The shuffled order is fixed for the life of the session, including across
/// `restart`. A fresh order requires a new session.
pub struct QuizSession {
    id: SessionId,
    params: SessionParams,
    clock: Clock,
    questions: Vec<Question>,
    current: usize,
    answers: BTreeMap<usize, AnsweredRecord>,
    status: SessionStatus,
    explanation_visible: bool,
    attempt: u32,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// A placeholder session while the bank is being fetched.
    #[must_use]
    pub fn loading(params: SessionParams, clock: Clock) -> Self {
        Self {
            id: SessionId::generate(),
            params,
            clock,
            questions: Vec::new(),
            current: 0,
            answers: BTreeMap::new(),
            status: SessionStatus::Loading,
            explanation_visible: false,
            attempt: 0,
            started_at: clock.now(),
            finished_at: None,
        }
    }

    /// Select and shuffle questions for `params`, yielding an `InProgress`
    /// session or an `Empty` one when nothing matched.
    pub fn start<R: Rng + ?Sized>(
        bank: &QuestionBank,
        params: SessionParams,
        clock: Clock,
        rng: &mut R,
    ) -> Self {
        let mut session = Self::loading(params, clock);
        session.initialize(bank, rng);
        session
    }

    fn initialize<R: Rng + ?Sized>(&mut self, bank: &QuestionBank, rng: &mut R) {
        self.status = SessionStatus::Loading;
        let selected = bank.select(&self.params.subject, &self.params.topic);
        if selected.is_empty() {
            info!(
                session = %self.id,
                subject = %self.params.subject,
                topic = %self.params.topic,
                "no questions found"
            );
            self.status = SessionStatus::Empty;
            return;
        }

        self.questions = shuffle(&selected, rng);
        self.current = 0;
        self.answers.clear();
        self.explanation_visible = false;
        self.attempt = 1;
        self.started_at = self.clock.now();
        self.finished_at = None;
        self.status = SessionStatus::InProgress;
        info!(
            session = %self.id,
            questions = self.questions.len(),
            "session started"
        );
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// The session's questions in shuffled order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question on screen; `None` unless the session is in progress.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.status == SessionStatus::InProgress {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&AnsweredRecord> {
        self.current_question()?;
        self.answers.get(&self.current)
    }

    #[must_use]
    pub fn record(&self, index: usize) -> Option<&AnsweredRecord> {
        self.answers.get(&index)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.values().filter(|r| r.is_correct).count()
    }

    #[must_use]
    pub fn explanation_visible(&self) -> bool {
        self.explanation_visible
    }

    /// 1 for the first run-through, incremented by each `restart`.
    #[must_use]
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total_questions(),
            answered: self.answered_count(),
            correct: self.correct_count(),
            remaining: self.total_questions().saturating_sub(self.answered_count()),
            is_finished: self.is_finished(),
        }
    }

    //
    // ─── COMMANDS ──────────────────────────────────────────────────────────────
    //

    /// Record an answer for the current question.
    ///
    /// A correct answer advances immediately; a wrong one keeps the question
    /// on screen with its explanation. Each question accepts one answer.
    pub fn answer(&mut self, selected: usize) -> AnswerOutcome {
        if self.status != SessionStatus::InProgress {
            return self.ignore_answer(IgnoredCommand::NotInProgress);
        }
        let Some(question) = self.questions.get(self.current) else {
            return self.ignore_answer(IgnoredCommand::NotInProgress);
        };
        if self.answers.contains_key(&self.current) {
            return self.ignore_answer(IgnoredCommand::AlreadyAnswered);
        }
        if question.answer(selected).is_none() {
            return self.ignore_answer(IgnoredCommand::AnswerOutOfRange);
        }

        let is_correct = question.is_correct(selected);
        self.answers.insert(
            self.current,
            AnsweredRecord::new(self.current, selected, is_correct),
        );
        debug!(
            session = %self.id,
            index = self.current,
            selected,
            is_correct,
            "answer recorded"
        );

        if is_correct {
            self.next();
            AnswerOutcome::Correct
        } else {
            self.explanation_visible = true;
            AnswerOutcome::Incorrect
        }
    }

    /// Move to the following question, completing the session after the last.
    pub fn next(&mut self) -> CommandOutcome {
        if self.status != SessionStatus::InProgress {
            return self.ignore("next", IgnoredCommand::NotInProgress);
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.sync_explanation();
        } else {
            self.finish(SessionOutcome::Completed);
        }
        CommandOutcome::Applied
    }

    /// Show any question by position, answered or not.
    pub fn jump(&mut self, target: usize) -> CommandOutcome {
        if self.status != SessionStatus::InProgress {
            return self.ignore("jump", IgnoredCommand::NotInProgress);
        }
        if target >= self.questions.len() {
            return self.ignore("jump", IgnoredCommand::IndexOutOfRange);
        }
        self.current = target;
        self.sync_explanation();
        CommandOutcome::Applied
    }

    /// End the session early if `confirm` agrees.
    pub fn cancel<C: Confirm + ?Sized>(&mut self, confirm: &mut C) -> CommandOutcome {
        if self.status != SessionStatus::InProgress {
            return self.ignore("cancel", IgnoredCommand::NotInProgress);
        }
        if !confirm.confirm(CANCEL_PROMPT) {
            return self.ignore("cancel", IgnoredCommand::Declined);
        }
        self.finish(SessionOutcome::Cancelled);
        CommandOutcome::Applied
    }

    /// Start over with the same question order.
    pub fn restart(&mut self) -> CommandOutcome {
        if !self.status.is_finished() {
            return self.ignore("restart", IgnoredCommand::NotFinished);
        }
        self.answers.clear();
        self.current = 0;
        self.explanation_visible = false;
        self.attempt = self.attempt.saturating_add(1);
        self.started_at = self.clock.now();
        self.finished_at = None;
        self.status = SessionStatus::InProgress;
        info!(session = %self.id, attempt = self.attempt, "session restarted");
        CommandOutcome::Applied
    }

    /// Score and review for a finished session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` unless the session is completed or
    /// cancelled.
    pub fn summary(&self) -> Result<SessionSummary, SessionError> {
        let outcome = match self.status {
            SessionStatus::Completed => SessionOutcome::Completed,
            SessionStatus::Cancelled => SessionOutcome::Cancelled,
            other => return Err(SessionError::NotFinished(other)),
        };
        let finished_at = self.finished_at.unwrap_or(self.started_at);
        Ok(SessionSummary::from_records(
            outcome,
            self.started_at,
            finished_at,
            &self.questions,
            self.answers.values(),
        )?)
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        self.status = match outcome {
            SessionOutcome::Completed => SessionStatus::Completed,
            SessionOutcome::Cancelled => SessionStatus::Cancelled,
        };
        self.explanation_visible = false;
        self.finished_at = Some(self.clock.now());
        info!(
            session = %self.id,
            ?outcome,
            answered = self.answered_count(),
            correct = self.correct_count(),
            "session finished"
        );
    }

    fn sync_explanation(&mut self) {
        self.explanation_visible = self.answers.contains_key(&self.current);
    }

    fn ignore(&self, command: &'static str, reason: IgnoredCommand) -> CommandOutcome {
        debug!(session = %self.id, command, ?reason, status = ?self.status, "command ignored");
        CommandOutcome::Ignored(reason)
    }

    fn ignore_answer(&self, reason: IgnoredCommand) -> AnswerOutcome {
        self.ignore("answer", reason);
        AnswerOutcome::Ignored(reason)
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("status", &self.status)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("attempt", &self.attempt)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionId, Subject, Topic};
    use quiz_core::time::{fixed_clock, fixed_now};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn build_question(id: u32) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            vec!["A".into(), "B".into(), "C".into()],
            usize::try_from(id % 3).unwrap(),
            Some(format!("Because {id}")),
        )
        .unwrap()
    }

    fn build_bank(questions: u32) -> QuestionBank {
        let cells = Topic::new("cells", (0..questions).map(build_question).collect()).unwrap();
        let subject = Subject::new("Biology", vec![cells]).unwrap();
        QuestionBank::from_subjects([("bio".to_owned(), subject)]).unwrap()
    }

    fn start(questions: u32) -> QuizSession {
        let bank = build_bank(questions);
        let mut rng = StdRng::seed_from_u64(5);
        QuizSession::start(&bank, SessionParams::new("bio", "cells"), fixed_clock(), &mut rng)
    }

    fn correct(session: &QuizSession) -> usize {
        session.current_question().unwrap().correct_index()
    }

    fn wrong(session: &QuizSession) -> usize {
        (correct(session) + 1) % 3
    }

    fn texts(session: &QuizSession) -> Vec<String> {
        session.questions().iter().map(|q| q.text().to_owned()).collect()
    }

    #[test]
    fn selects_the_topic_questions_in_some_order() {
        let session = start(2);
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.attempt(), 1);

        let mut got = texts(&session);
        got.sort();
        assert_eq!(got, ["Q0", "Q1"]);
    }

    #[test]
    fn missing_topic_yields_empty_session() {
        let bank = build_bank(2);
        let mut rng = StdRng::seed_from_u64(1);
        let mut session =
            QuizSession::start(&bank, SessionParams::new("bio", "genes"), fixed_clock(), &mut rng);

        assert_eq!(session.status(), SessionStatus::Empty);
        assert!(session.current_question().is_none());
        assert_eq!(
            session.answer(0),
            AnswerOutcome::Ignored(IgnoredCommand::NotInProgress)
        );
        assert!(matches!(
            session.summary(),
            Err(SessionError::NotFinished(SessionStatus::Empty))
        ));
    }

    #[test]
    fn correct_answer_auto_advances() {
        let mut session = start(2);
        let pick = correct(&session);

        assert_eq!(session.answer(pick), AnswerOutcome::Correct);
        assert_eq!(session.current_index(), 1);
        assert!(!session.explanation_visible());
        assert_eq!(session.record(0).unwrap().selected_answer_index, pick);
    }

    #[test]
    fn wrong_answer_waits_for_next() {
        let mut session = start(2);
        let pick = wrong(&session);

        assert_eq!(session.answer(pick), AnswerOutcome::Incorrect);
        assert!(session.explanation_visible());
        assert_eq!(session.current_index(), 0);
        assert!(!session.current_answer().unwrap().is_correct);

        // second answer to the same question is ignored
        assert_eq!(
            session.answer(correct(&session)),
            AnswerOutcome::Ignored(IgnoredCommand::AlreadyAnswered)
        );
        assert_eq!(session.answered_count(), 1);

        assert!(session.next().is_applied());
        assert_eq!(session.current_index(), 1);
        assert!(!session.explanation_visible());
    }

    #[test]
    fn progress_counts_answers_until_completion() {
        let mut session = start(3);
        session.answer(wrong(&session));
        session.next();
        session.answer(correct(&session));

        let progress = session.progress();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.answered, 2);
        assert_eq!(progress.correct, 1);
        assert_eq!(progress.remaining, 1);
        assert!(!progress.is_finished);

        session.answer(correct(&session));
        let progress = session.progress();
        assert_eq!((progress.answered, progress.remaining), (3, 0));
        assert!(progress.is_finished);
    }

    #[test]
    fn answering_last_question_completes() {
        let mut session = start(3);
        session.answer(wrong(&session));
        session.next();
        session.answer(correct(&session));
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.status(), SessionStatus::InProgress);

        session.answer(correct(&session));
        assert_eq!(session.status(), SessionStatus::Completed);
        assert_eq!(session.finished_at(), Some(fixed_now()));

        let summary = session.summary().unwrap();
        assert_eq!(summary.total_answered(), 3);
        assert_eq!(summary.correct_count(), 2);
        assert!(summary.correct_count() <= summary.total_answered());
        assert_eq!(summary.percentage(), Some(66.67));
    }

    #[test]
    fn next_on_last_index_completes_exactly_then() {
        let mut session = start(3);
        session.next();
        assert_eq!(session.status(), SessionStatus::InProgress);
        session.next();
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.current_index(), 2);
        session.next();
        assert_eq!(session.status(), SessionStatus::Completed);

        let summary = session.summary().unwrap();
        assert_eq!(summary.total_answered(), 0);
        assert_eq!(summary.percentage(), None);
    }

    #[test]
    fn declined_cancel_keeps_session_running() {
        let mut session = start(2);
        let mut asked = Vec::new();
        let outcome = session.cancel(&mut |prompt: &str| {
            asked.push(prompt.to_owned());
            false
        });

        assert_eq!(outcome, CommandOutcome::Ignored(IgnoredCommand::Declined));
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(asked, [CANCEL_PROMPT]);
    }

    #[test]
    fn confirmed_cancel_scores_answered_only() {
        let mut session = start(4);
        session.answer(correct(&session));
        session.answer(wrong(&session));

        assert!(session.cancel(&mut |_: &str| true).is_applied());
        assert_eq!(session.status(), SessionStatus::Cancelled);

        let summary = session.summary().unwrap();
        assert_eq!(summary.outcome(), SessionOutcome::Cancelled);
        assert_eq!(summary.total_questions(), 4);
        assert_eq!(summary.total_answered(), 2);
        assert_eq!(summary.correct_count(), 1);
        assert_eq!(summary.percentage(), Some(50.0));
    }

    #[test]
    fn cancel_before_answering_has_no_percentage() {
        let mut session = start(2);
        session.cancel(&mut |_: &str| true);
        let summary = session.summary().unwrap();
        assert_eq!(summary.total_answered(), 0);
        assert_eq!(summary.percentage(), None);
    }

    #[test]
    fn restart_keeps_order_and_clears_answers() {
        let mut session = start(3);
        let order = texts(&session);
        let id = session.id();
        while !session.is_finished() {
            session.answer(correct(&session));
        }
        assert_eq!(session.status(), SessionStatus::Completed);

        assert!(session.restart().is_applied());
        assert_eq!(session.status(), SessionStatus::InProgress);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.answered_count(), 0);
        assert!(!session.explanation_visible());
        assert_eq!(session.finished_at(), None);
        assert_eq!(session.attempt(), 2);
        assert_eq!(session.id(), id);
        assert_eq!(texts(&session), order);
    }

    #[test]
    fn restart_is_ignored_while_in_progress() {
        let mut session = start(2);
        session.answer(correct(&session));
        assert_eq!(
            session.restart(),
            CommandOutcome::Ignored(IgnoredCommand::NotFinished)
        );
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn jump_previews_unanswered_and_restores_answered() {
        let mut session = start(4);
        session.answer(wrong(&session));
        assert!(session.explanation_visible());

        assert!(session.jump(3).is_applied());
        assert_eq!(session.current_index(), 3);
        assert!(!session.explanation_visible());
        assert!(session.current_answer().is_none());

        assert_eq!(session.answer(wrong(&session)), AnswerOutcome::Incorrect);

        assert!(session.jump(0).is_applied());
        assert!(session.explanation_visible());
        assert!(!session.current_answer().unwrap().is_correct);

        assert_eq!(
            session.jump(4),
            CommandOutcome::Ignored(IgnoredCommand::IndexOutOfRange)
        );
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn jump_back_to_correct_answer_shows_explanation() {
        let mut session = start(3);
        assert_eq!(session.answer(correct(&session)), AnswerOutcome::Correct);
        assert!(!session.explanation_visible());

        assert!(session.jump(0).is_applied());
        assert!(session.current_answer().unwrap().is_correct);
        assert!(session.explanation_visible());
    }

    #[test]
    fn out_of_range_answer_is_ignored() {
        let mut session = start(2);
        assert_eq!(
            session.answer(3),
            AnswerOutcome::Ignored(IgnoredCommand::AnswerOutOfRange)
        );
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn finished_session_is_read_only() {
        let mut session = start(2);
        session.answer(wrong(&session));
        session.cancel(&mut |_: &str| true);

        assert_eq!(
            session.answer(0),
            AnswerOutcome::Ignored(IgnoredCommand::NotInProgress)
        );
        assert_eq!(
            session.next(),
            CommandOutcome::Ignored(IgnoredCommand::NotInProgress)
        );
        assert_eq!(
            session.jump(1),
            CommandOutcome::Ignored(IgnoredCommand::NotInProgress)
        );
        assert_eq!(
            session.cancel(&mut |_: &str| true),
            CommandOutcome::Ignored(IgnoredCommand::NotInProgress)
        );
        assert_eq!(session.answered_count(), 1);
        assert!(session.current_question().is_none());
    }

    #[test]
    fn records_stay_unique_under_random_commands() {
        let mut session = start(6);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..500 {
            match rng.random_range(0..4) {
                0 => {
                    session.answer(rng.random_range(0..4));
                }
                1 => {
                    session.next();
                }
                2 => {
                    session.jump(rng.random_range(0..7));
                }
                _ => {
                    if session.is_finished() {
                        session.restart();
                    }
                }
            }

            assert!(session.answered_count() <= session.total_questions());
            for (key, record) in &session.answers {
                assert_eq!(*key, record.question_index);
                assert!(*key < session.total_questions());
                let question = &session.questions()[*key];
                assert!(question.answer(record.selected_answer_index).is_some());
                assert_eq!(record.is_correct, question.is_correct(record.selected_answer_index));
            }
            if session.status() == SessionStatus::InProgress {
                assert!(session.current_index() < session.total_questions());
            }
        }
    }
}

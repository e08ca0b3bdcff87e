//! Render-boundary snapshots of a session.
//!
//! Presentation-agnostic: no pre-formatted strings, no locale assumptions.
//! The front-end decides how a mark or a missing percentage looks.

use chrono::Duration;
use quiz_core::model::{ReviewItem, SessionOutcome};

use super::engine::{QuizSession, SessionParams, SessionStatus};
use super::progress::SessionProgress;
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMark {
    Plain,
    /// The right answer, revealed once the question is answered.
    Correct,
    /// The user's wrong pick.
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerView {
    pub index: usize,
    pub text: String,
    pub enabled: bool,
    pub selected: bool,
    pub mark: AnswerMark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavState {
    Unanswered,
    Correct,
    Incorrect,
}

/// One button of the navigation strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavCell {
    pub index: usize,
    pub state: NavState,
    pub is_current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub params: SessionParams,
    pub index: usize,
    pub total: usize,
    pub text: String,
    pub answers: Vec<AnswerView>,
    pub answered: bool,
    pub explanation: Option<String>,
    /// Text of the user's answer, shown alongside the explanation after a miss.
    pub selected_answer: Option<String>,
    pub nav: Vec<NavCell>,
    pub progress: SessionProgress,
}

impl QuestionView {
    /// 1-based position for display.
    #[must_use]
    pub fn position(&self) -> usize {
        self.index + 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub params: SessionParams,
    pub outcome: SessionOutcome,
    pub attempt: u32,
    pub correct: usize,
    pub answered: usize,
    pub total_questions: usize,
    /// `None` when nothing was answered.
    pub percentage: Option<f64>,
    pub duration: Duration,
    pub review: Vec<ReviewItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionView {
    Loading(SessionParams),
    Empty(SessionParams),
    Question(QuestionView),
    Summary(SummaryView),
}

impl SessionView {
    /// Snapshot the session for rendering.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if a finished session cannot be scored.
    pub fn from_session(session: &QuizSession) -> Result<Self, SessionError> {
        let params = session.params().clone();
        let view = match session.status() {
            SessionStatus::Loading => Self::Loading(params),
            SessionStatus::Empty => Self::Empty(params),
            SessionStatus::InProgress => match question_view(session) {
                Some(view) => Self::Question(view),
                None => Self::Empty(params),
            },
            SessionStatus::Completed | SessionStatus::Cancelled => {
                let summary = session.summary()?;
                Self::Summary(SummaryView {
                    params,
                    outcome: summary.outcome(),
                    attempt: session.attempt(),
                    correct: summary.correct_count(),
                    answered: summary.total_answered(),
                    total_questions: summary.total_questions(),
                    percentage: summary.percentage(),
                    duration: summary.duration(),
                    review: summary.review().to_vec(),
                })
            }
        };
        Ok(view)
    }
}

fn question_view(session: &QuizSession) -> Option<QuestionView> {
    let question = session.current_question()?;
    let record = session.current_answer();
    let answered = record.is_some();

    let answers = question
        .answers()
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let selected = record.is_some_and(|r| r.selected_answer_index == index);
            let mark = match record {
                Some(_) if question.is_correct(index) => AnswerMark::Correct,
                Some(_) if selected => AnswerMark::Incorrect,
                _ => AnswerMark::Plain,
            };
            AnswerView {
                index,
                text: text.clone(),
                enabled: !answered,
                selected,
                mark,
            }
        })
        .collect();

    let explanation = session
        .explanation_visible()
        .then(|| question.explanation().map(str::to_owned))
        .flatten();
    let selected_answer = record
        .filter(|r| session.explanation_visible() && !r.is_correct)
        .and_then(|r| question.answer(r.selected_answer_index))
        .map(str::to_owned);

    let nav = (0..session.total_questions())
        .map(|index| NavCell {
            index,
            state: match session.record(index) {
                None => NavState::Unanswered,
                Some(r) if r.is_correct => NavState::Correct,
                Some(_) => NavState::Incorrect,
            },
            is_current: index == session.current_index(),
        })
        .collect();

    Some(QuestionView {
        params: session.params().clone(),
        index: session.current_index(),
        total: session.total_questions(),
        text: question.text().to_owned(),
        answers,
        answered,
        explanation,
        selected_answer,
        nav,
        progress: session.progress(),
    })
}

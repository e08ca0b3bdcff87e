use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::model::{AnsweredRecord, Question};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("finished_at is before started_at")]
    InvalidTimeRange,

    #[error("record for question {index} is outside a session of {len} questions")]
    RecordOutOfRange { index: usize, len: usize },

    #[error("record for question {index} selects missing answer {selected}")]
    SelectionOutOfRange { index: usize, selected: usize },

    #[error("more than one record for question {index}")]
    DuplicateRecord { index: usize },
}

/// How a session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    Cancelled,
}

/// One line of the post-session review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub question_index: usize,
    pub question: String,
    pub correct_answer: String,
    pub selected_answer: String,
    pub is_correct: bool,
}

/// Score and review for a finished session.
///
/// Scores only cover answered questions: a session cancelled after three
/// answers is scored out of three.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    outcome: SessionOutcome,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    total_questions: usize,
    correct_count: usize,
    review: Vec<ReviewItem>,
}

impl SessionSummary {
    /// Build a summary from the session's questions and answer records.
    ///
    /// The review is ordered by `question_index` regardless of input order.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if timestamps are inverted or a record does not
    /// point at a question/answer of this session, or two records share an index.
    pub fn from_records<'a>(
        outcome: SessionOutcome,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        questions: &[Question],
        records: impl IntoIterator<Item = &'a AnsweredRecord>,
    ) -> Result<Self, SummaryError> {
        if finished_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }

        let mut records: Vec<&AnsweredRecord> = records.into_iter().collect();
        records.sort_by_key(|r| r.question_index);

        let mut review = Vec::with_capacity(records.len());
        let mut correct_count = 0_usize;
        let mut last_index = None;

        for record in records {
            let index = record.question_index;
            if last_index == Some(index) {
                return Err(SummaryError::DuplicateRecord { index });
            }
            last_index = Some(index);

            let question = questions.get(index).ok_or(SummaryError::RecordOutOfRange {
                index,
                len: questions.len(),
            })?;
            let selected = question.answer(record.selected_answer_index).ok_or(
                SummaryError::SelectionOutOfRange {
                    index,
                    selected: record.selected_answer_index,
                },
            )?;

            if record.is_correct {
                correct_count += 1;
            }
            review.push(ReviewItem {
                question_index: index,
                question: question.text().to_owned(),
                correct_answer: question.correct_answer().to_owned(),
                selected_answer: selected.to_owned(),
                is_correct: record.is_correct,
            });
        }

        Ok(Self {
            outcome,
            started_at,
            finished_at,
            total_questions: questions.len(),
            correct_count,
            review,
        })
    }

    #[must_use]
    pub fn outcome(&self) -> SessionOutcome {
        self.outcome
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total_answered(&self) -> usize {
        self.review.len()
    }

    /// Percentage of answered questions that were correct, rounded to two
    /// decimals. `None` when nothing was answered.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        let answered = self.total_answered();
        if answered == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let raw = self.correct_count as f64 / answered as f64 * 100.0;
        Some((raw * 100.0).round() / 100.0)
    }

    #[must_use]
    pub fn review(&self) -> &[ReviewItem] {
        &self.review
    }
}

use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs at least two answers, got {len}")]
    TooFewAnswers { len: usize },

    #[error("answer {index} is empty")]
    EmptyAnswer { index: usize },

    #[error("correct answer index {index} is out of range for {len} answers")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// An immutable multiple-choice question.
///
/// Construction guarantees at least two non-empty answers and a valid
/// `correct_index`, so every accessor below is infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    text: String,
    answers: Vec<String>,
    correct_index: usize,
    explanation: Option<String>,
}

impl Question {
    /// Builds a validated question. A blank explanation is stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or any answer is blank, fewer than
    /// two answers are given, or `correct_index` does not point at an answer.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        answers: Vec<String>,
        correct_index: usize,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if answers.len() < 2 {
            return Err(QuestionError::TooFewAnswers { len: answers.len() });
        }
        if let Some(index) = answers.iter().position(|a| a.trim().is_empty()) {
            return Err(QuestionError::EmptyAnswer { index });
        }
        if correct_index >= answers.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                len: answers.len(),
            });
        }

        let explanation = explanation.filter(|e| !e.trim().is_empty());

        Ok(Self {
            id,
            text,
            answers,
            correct_index,
            explanation,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.answers[self.correct_index]
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn builds_valid_question() {
        let q = Question::new(
            QuestionId::new(0),
            "Which organelle makes ATP?",
            answers(&["Nucleus", "Mitochondrion", "Ribosome"]),
            1,
            Some("Oxidative phosphorylation happens there.".into()),
        )
        .unwrap();

        assert_eq!(q.correct_answer(), "Mitochondrion");
        assert!(q.is_correct(1));
        assert!(!q.is_correct(0));
        assert_eq!(q.answer(2), Some("Ribosome"));
        assert_eq!(q.answer(3), None);
        assert!(q.explanation().is_some());
    }

    #[test]
    fn rejects_single_answer() {
        let err = Question::new(QuestionId::new(0), "Q", answers(&["A"]), 0, None).unwrap_err();
        assert_eq!(err, QuestionError::TooFewAnswers { len: 1 });
    }

    #[test]
    fn rejects_correct_index_out_of_range() {
        let err =
            Question::new(QuestionId::new(0), "Q", answers(&["A", "B"]), 2, None).unwrap_err();
        assert_eq!(err, QuestionError::CorrectIndexOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn rejects_blank_text_and_answers() {
        let err = Question::new(QuestionId::new(0), "  ", answers(&["A", "B"]), 0, None)
            .unwrap_err();
        assert_eq!(err, QuestionError::EmptyText);

        let err =
            Question::new(QuestionId::new(0), "Q", answers(&["A", " "]), 0, None).unwrap_err();
        assert_eq!(err, QuestionError::EmptyAnswer { index: 1 });
    }

    #[test]
    fn blank_explanation_is_dropped() {
        let q = Question::new(
            QuestionId::new(0),
            "Q",
            answers(&["A", "B"]),
            0,
            Some("   ".into()),
        )
        .unwrap();
        assert_eq!(q.explanation(), None);
    }
}

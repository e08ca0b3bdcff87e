/// A user's answer to one question of a session.
///
/// `question_index` is the position in the session's shuffled order, not in
/// the source topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnsweredRecord {
    pub question_index: usize,
    pub selected_answer_index: usize,
    pub is_correct: bool,
}

impl AnsweredRecord {
    #[must_use]
    pub fn new(question_index: usize, selected_answer_index: usize, is_correct: bool) -> Self {
        Self {
            question_index,
            selected_answer_index,
            is_correct,
        }
    }
}

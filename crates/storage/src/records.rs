//! Serialized shape of the question bank.
//!
//! These mirror the domain types so the interchange format can evolve
//! without leaking serde concerns into `quiz-core`.

use std::collections::BTreeMap;

use quiz_core::model::{Question, QuestionBank, QuestionId, Subject, Topic};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub question: String,
    pub answers: Vec<String>,
    pub correct: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub name: String,
    #[serde(default)]
    pub questions: Vec<QuestionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub name: String,
    #[serde(default)]
    pub topics: Vec<TopicRecord>,
}

/// Top-level document: subject key → subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankRecord {
    pub subjects: BTreeMap<String, SubjectRecord>,
}

impl QuestionRecord {
    /// Convert into a domain `Question`. A missing `id` becomes `position`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidQuestion` naming the subject, topic and
    /// position of the record that failed validation.
    fn into_question(
        self,
        subject: &str,
        topic: &str,
        position: usize,
    ) -> Result<Question, StorageError> {
        let fallback = u32::try_from(position).unwrap_or(u32::MAX);
        let id = QuestionId::new(self.id.unwrap_or(fallback));
        Question::new(id, self.question, self.answers, self.correct, self.explanation).map_err(
            |source| StorageError::InvalidQuestion {
                subject: subject.to_owned(),
                topic: topic.to_owned(),
                position,
                source,
            },
        )
    }
}

impl BankRecord {
    /// Validate every record and build the domain bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidQuestion` or `StorageError::InvalidBank`
    /// for the first record that fails validation.
    pub fn into_bank(self) -> Result<QuestionBank, StorageError> {
        let mut subjects = Vec::with_capacity(self.subjects.len());
        for (key, subject) in self.subjects {
            let mut topics = Vec::with_capacity(subject.topics.len());
            for topic in subject.topics {
                let questions = topic
                    .questions
                    .into_iter()
                    .enumerate()
                    .map(|(pos, q)| q.into_question(&key, &topic.name, pos))
                    .collect::<Result<Vec<_>, _>>()?;
                topics.push(Topic::new(topic.name, questions)?);
            }
            subjects.push((key, Subject::new(subject.name, topics)?));
        }
        Ok(QuestionBank::from_subjects(subjects)?)
    }
}

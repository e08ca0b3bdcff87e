use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::question::Question;

/// Reserved topic key meaning "every question in the subject".
pub const ALL_TOPICS: &str = "all";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("subject key cannot be empty")]
    EmptySubjectKey,

    #[error("subject name cannot be empty")]
    EmptySubjectName,

    #[error("topic name cannot be empty")]
    EmptyTopicName,

    #[error("topic name \"all\" is reserved")]
    ReservedTopicName,

    #[error("duplicate topic \"{name}\"")]
    DuplicateTopic { name: String },

    #[error("duplicate subject key \"{key}\"")]
    DuplicateSubject { key: String },
}

//
// ─── TOPIC SELECTOR ────────────────────────────────────────────────────────────
//

/// Which topic(s) of a subject to draw questions from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicSelector {
    All,
    Named(String),
}

impl TopicSelector {
    /// Parses a routing parameter, mapping the `"all"` sentinel to [`TopicSelector::All`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw == ALL_TOPICS {
            Self::All
        } else {
            Self::Named(raw.to_owned())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_TOPICS,
            Self::Named(name) => name,
        }
    }
}

impl FromStr for TopicSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for TopicSelector {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for TopicSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── TOPIC / SUBJECT ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    name: String,
    questions: Vec<Question>,
}

impl Topic {
    /// # Errors
    ///
    /// Returns `BankError::EmptyTopicName` for a blank name and
    /// `BankError::ReservedTopicName` for a topic named like the `"all"` sentinel.
    pub fn new(name: impl Into<String>, questions: Vec<Question>) -> Result<Self, BankError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BankError::EmptyTopicName);
        }
        if name == ALL_TOPICS {
            return Err(BankError::ReservedTopicName);
        }
        Ok(Self { name, questions })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    name: String,
    topics: Vec<Topic>,
}

impl Subject {
    /// # Errors
    ///
    /// Returns `BankError::EmptySubjectName` for a blank name and
    /// `BankError::DuplicateTopic` if two topics share a name.
    pub fn new(name: impl Into<String>, topics: Vec<Topic>) -> Result<Self, BankError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BankError::EmptySubjectName);
        }
        for (i, topic) in topics.iter().enumerate() {
            if topics[..i].iter().any(|t| t.name == topic.name) {
                return Err(BankError::DuplicateTopic {
                    name: topic.name.clone(),
                });
            }
        }
        Ok(Self { name, topics })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    #[must_use]
    pub fn topic(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.topics.iter().map(|t| t.questions.len()).sum()
    }
}

//
// ─── BANK ──────────────────────────────────────────────────────────────────────
//

/// Static mapping from case-sensitive subject key to [`Subject`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    subjects: BTreeMap<String, Subject>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a bank, rejecting duplicate or empty keys.
    ///
    /// # Errors
    ///
    /// Returns `BankError::DuplicateSubject` or `BankError::EmptySubjectKey`.
    pub fn from_subjects(
        subjects: impl IntoIterator<Item = (String, Subject)>,
    ) -> Result<Self, BankError> {
        let mut bank = Self::new();
        for (key, subject) in subjects {
            if key.is_empty() {
                return Err(BankError::EmptySubjectKey);
            }
            match bank.subjects.entry(key) {
                Entry::Occupied(e) => {
                    return Err(BankError::DuplicateSubject {
                        key: e.key().clone(),
                    });
                }
                Entry::Vacant(e) => {
                    e.insert(subject);
                }
            }
        }
        Ok(bank)
    }

    /// Inserts or replaces a subject, returning the previous one.
    ///
    /// # Errors
    ///
    /// Returns `BankError::EmptySubjectKey` for an empty key.
    pub fn upsert_subject(
        &mut self,
        key: impl Into<String>,
        subject: Subject,
    ) -> Result<Option<Subject>, BankError> {
        let key = key.into();
        if key.is_empty() {
            return Err(BankError::EmptySubjectKey);
        }
        Ok(self.subjects.insert(key, subject))
    }

    #[must_use]
    pub fn subject(&self, key: &str) -> Option<&Subject> {
        self.subjects.get(key)
    }

    /// Subjects in key order.
    pub fn subjects(&self) -> impl Iterator<Item = (&str, &Subject)> {
        self.subjects.iter().map(|(k, s)| (k.as_str(), s))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    /// Returns the flat question list for a subject/topic pair.
    ///
    /// - unknown subject → empty
    /// - [`TopicSelector::All`] → every topic's questions, in declaration order
    /// - named topic → that topic's questions, or empty if it does not exist
    #[must_use]
    pub fn select(&self, subject_key: &str, topic: &TopicSelector) -> Vec<Question> {
        let Some(subject) = self.subjects.get(subject_key) else {
            return Vec::new();
        };
        match topic {
            TopicSelector::All => subject
                .topics
                .iter()
                .flat_map(|t| t.questions.iter().cloned())
                .collect(),
            TopicSelector::Named(name) => subject
                .topic(name)
                .map(|t| t.questions.clone())
                .unwrap_or_default(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Identifier wrapper for a screening session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub String);

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl SessionId {
    /// Next process-unique id, formatted as `session-000001`.
    pub fn generate() -> Self {
        let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("session-{id:06}"))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Candidate profile fields gathered one stage at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    FullName,
    Email,
    Phone,
    Experience,
    Position,
    Location,
    TechStack,
}

impl FieldKind {
    pub const ALL: [FieldKind; 7] = [
        FieldKind::FullName,
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Experience,
        FieldKind::Position,
        FieldKind::Location,
        FieldKind::TechStack,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            FieldKind::FullName => "full name",
            FieldKind::Email => "email address",
            FieldKind::Phone => "phone number",
            FieldKind::Experience => "years of experience",
            FieldKind::Position => "desired position",
            FieldKind::Location => "current location",
            FieldKind::TechStack => "tech stack",
        }
    }

    /// Human-readable description of what a valid answer looks like.
    pub const fn expected_format(self) -> &'static str {
        match self {
            FieldKind::FullName => "your first and last name, e.g. Jane Doe",
            FieldKind::Email => "an address like jane.doe@example.com",
            FieldKind::Phone => "7 to 15 digits, optionally starting with +, e.g. +1 (555) 123-4567",
            FieldKind::Experience => "a whole number of years, e.g. 4",
            FieldKind::Position => "the role you are applying for, e.g. Backend Engineer",
            FieldKind::Location => "a city and country, or Remote",
            FieldKind::TechStack => "a comma-separated list, e.g. Rust, PostgreSQL, Docker",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One asked question and the candidate's reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// Answers for a single technology, kept in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyAnswers {
    pub technology: String,
    pub responses: Vec<QuestionAnswer>,
}

/// Everything gathered during one session.
///
/// Owned by exactly one conversation; fields are filled in stage order and only
/// cleared together through a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience_years: Option<u32>,
    pub desired_position: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub answers: Vec<TechnologyAnswers>,
    #[serde(default)]
    pub completed: bool,
}

impl CandidateRecord {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Required profile fields that have not been captured yet.
    pub fn missing_fields(&self) -> Vec<FieldKind> {
        FieldKind::ALL
            .into_iter()
            .filter(|field| !self.has(*field))
            .collect()
    }

    pub fn has(&self, field: FieldKind) -> bool {
        match field {
            FieldKind::FullName => self.full_name.is_some(),
            FieldKind::Email => self.email.is_some(),
            FieldKind::Phone => self.phone.is_some(),
            FieldKind::Experience => self.experience_years.is_some(),
            FieldKind::Position => self.desired_position.is_some(),
            FieldKind::Location => self.location.is_some(),
            FieldKind::TechStack => !self.tech_stack.is_empty(),
        }
    }

    pub fn answers_for(&self, technology: &str) -> Option<&[QuestionAnswer]> {
        self.answers
            .iter()
            .find(|entry| entry.technology == technology)
            .map(|entry| entry.responses.as_slice())
    }

    /// Append an answer under `technology`, creating its entry on first use.
    pub fn record_answer(
        &mut self,
        technology: &str,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) {
        let response = QuestionAnswer {
            question: question.into(),
            answer: answer.into(),
        };

        match self
            .answers
            .iter_mut()
            .find(|entry| entry.technology == technology)
        {
            Some(entry) => entry.responses.push(response),
            None => self.answers.push(TechnologyAnswers {
                technology: technology.to_string(),
                responses: vec![response],
            }),
        }
    }

    pub fn answer_count(&self) -> usize {
        self.answers.iter().map(|entry| entry.responses.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_answer_groups_by_technology_in_arrival_order() {
        let mut record = CandidateRecord::default();
        record.record_answer("Rust", "What is ownership?", "Single owner");
        record.record_answer("Go", "What is a goroutine?", "Green thread");
        record.record_answer("Rust", "What is a lifetime?", "Scope of a borrow");

        assert_eq!(record.answers.len(), 2);
        assert_eq!(record.answers[0].technology, "Rust");
        let rust = record.answers_for("Rust").expect("rust answers");
        assert_eq!(rust.len(), 2);
        assert_eq!(rust[1].answer, "Scope of a borrow");
        assert_eq!(record.answer_count(), 3);
    }

    #[test]
    fn generated_session_ids_are_unique_and_padded() {
        let first = SessionId::generate();
        let second = SessionId::generate();

        assert_ne!(first, second);
        assert!(first.0.starts_with("session-"));
        assert_eq!(first.0.len(), "session-000001".len());
    }

    #[test]
    fn missing_fields_tracks_profile_progress() {
        let mut record = CandidateRecord::default();
        assert!(record.is_empty());
        assert_eq!(record.missing_fields().len(), 7);

        record.full_name = Some("Jane Doe".to_string());
        record.tech_stack = vec!["Rust".to_string()];
        let missing = record.missing_fields();
        assert!(!missing.contains(&FieldKind::FullName));
        assert!(!missing.contains(&FieldKind::TechStack));
        assert!(missing.contains(&FieldKind::Email));
        assert!(!record.is_empty());
    }
}

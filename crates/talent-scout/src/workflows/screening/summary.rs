use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{CandidateRecord, FieldKind, SessionId};

const NOT_PROVIDED: &str = "N/A";

/// Flattened view of a session's record used by the recap, the API and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub session_id: SessionId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub experience_years: Option<u32>,
    pub desired_position: Option<String>,
    pub location: Option<String>,
    pub tech_stack: Vec<String>,
    pub answered_questions: usize,
    pub missing_fields: Vec<FieldKind>,
    pub completed: bool,
}

impl CandidateSummary {
    pub fn from_record(session_id: &SessionId, record: &CandidateRecord) -> Self {
        Self {
            session_id: session_id.clone(),
            full_name: record.full_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            experience_years: record.experience_years,
            desired_position: record.desired_position.clone(),
            location: record.location.clone(),
            tech_stack: record.tech_stack.clone(),
            answered_questions: record.answer_count(),
            missing_fields: record.missing_fields(),
            completed: record.completed,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }

    /// Plain-text recap shown before the session is finalized.
    pub fn render_text(&self) -> String {
        let lines = [
            "Candidate summary".to_string(),
            "-----------------".to_string(),
            format!("Full name: {}", display(&self.full_name)),
            format!("Email: {}", display(&self.email)),
            format!("Phone: {}", display(&self.phone)),
            format!("Experience: {}", years(self.experience_years)),
            format!("Desired position: {}", display(&self.desired_position)),
            format!("Location: {}", display(&self.location)),
            format!("Tech stack: {}", stack(&self.tech_stack)),
            format!("Technical questions answered: {}", self.answered_questions),
        ];
        lines.join("\n")
    }
}

/// Markdown assessment report with every question and answer in the order asked.
pub fn markdown_report(
    session_id: &SessionId,
    record: &CandidateRecord,
    generated_at: DateTime<Utc>,
) -> String {
    let summary = CandidateSummary::from_record(session_id, record);
    let mut out = String::from("# Candidate Assessment Report\n");
    out.push_str(&format!("Session: {session_id}\n"));
    out.push_str(&format!(
        "Generated on: {}\n\n",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    out.push_str("## Personal Information\n");
    out.push_str(&format!("- **Name**: {}\n", display(&summary.full_name)));
    out.push_str(&format!("- **Email**: {}\n", display(&summary.email)));
    out.push_str(&format!("- **Phone**: {}\n", display(&summary.phone)));
    out.push_str(&format!("- **Location**: {}\n\n", display(&summary.location)));

    out.push_str("## Professional Information\n");
    out.push_str(&format!(
        "- **Experience**: {}\n",
        years(summary.experience_years)
    ));
    out.push_str(&format!(
        "- **Desired Position**: {}\n",
        display(&summary.desired_position)
    ));
    out.push_str(&format!(
        "- **Technical Skills**: {}\n\n",
        stack(&summary.tech_stack)
    ));

    out.push_str("## Technical Assessment\n");
    if record.answers.is_empty() {
        out.push_str("No responses provided.\n");
    }
    for entry in &record.answers {
        out.push_str(&format!("### {}\n", entry.technology));
        for (index, response) in entry.responses.iter().enumerate() {
            out.push_str(&format!(
                "{}. {}\n   > {}\n",
                index + 1,
                response.question,
                response.answer
            ));
        }
        out.push('\n');
    }

    if !summary.is_complete() {
        let missing: Vec<&str> = summary
            .missing_fields
            .iter()
            .map(|field| field.label())
            .collect();
        out.push_str("\n## Missing Information\n");
        out.push_str(&format!(
            "The following fields are incomplete: {}\n",
            missing.join(", ")
        ));
    }

    out.push_str("\n## Next Steps\n");
    out.push_str("- Review technical responses\n");
    out.push_str("- Schedule follow-up interview if qualified\n");
    out.push_str("- Contact candidate with decision\n");
    out
}

fn display(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_PROVIDED)
}

fn years(value: Option<u32>) -> String {
    match value {
        Some(1) => "1 year".to_string(),
        Some(years) => format!("{years} years"),
        None => NOT_PROVIDED.to_string(),
    }
}

fn stack(technologies: &[String]) -> String {
    if technologies.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        technologies.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> SessionId {
        SessionId("session-000001".to_string())
    }

    #[test]
    fn recap_marks_missing_values() {
        let record = CandidateRecord {
            full_name: Some("Jane Doe".to_string()),
            experience_years: Some(1),
            ..CandidateRecord::default()
        };
        let summary = CandidateSummary::from_record(&session(), &record);

        assert!(!summary.is_complete());
        assert_eq!(summary.missing_fields.len(), 5);
        let text = summary.render_text();
        assert!(text.contains("Full name: Jane Doe"));
        assert!(text.contains("Email: N/A"));
        assert!(text.contains("Experience: 1 year\n"));
    }

    #[test]
    fn report_lists_answers_in_order() {
        let mut record = CandidateRecord {
            full_name: Some("Jane Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            phone: Some("5551234567".to_string()),
            experience_years: Some(3),
            desired_position: Some("Engineer".to_string()),
            location: Some("Remote".to_string()),
            tech_stack: vec!["Go".to_string(), "Rust".to_string()],
            ..CandidateRecord::default()
        };
        record.record_answer("Go", "What is a goroutine?", "A green thread.");
        record.record_answer("Rust", "What is a trait?", "A shared interface.");

        let generated = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().expect("valid");
        let report = markdown_report(&session(), &record, generated);

        assert!(report.contains("Generated on: 2026-01-02 03:04:05 UTC"));
        assert!(report.contains("- **Technical Skills**: Go, Rust"));
        let go = report.find("### Go").expect("go section");
        let rust = report.find("### Rust").expect("rust section");
        assert!(go < rust);
        assert!(report.contains("1. What is a trait?\n   > A shared interface."));
        assert!(!report.contains("Missing Information"));
    }

    #[test]
    fn report_flags_missing_fields() {
        let report = markdown_report(&session(), &CandidateRecord::default(), Utc::now());
        assert!(report.contains("No responses provided."));
        assert!(report.contains("The following fields are incomplete: full name, email address"));
    }
}

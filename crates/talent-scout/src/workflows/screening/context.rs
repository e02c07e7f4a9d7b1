//! Keeps profile answers on the application: flags off-topic chatter and inappropriate
//! language before a field is validated.

use serde::Serialize;

use super::domain::FieldKind;

const OFF_TOPIC: [&str; 11] = [
    "weather",
    "sports",
    "politics",
    "food",
    "movie",
    "music",
    "game",
    "celebrity",
    "news",
    "joke",
    "story",
];

const INAPPROPRIATE: [&str; 4] = ["hate", "violence", "illegal", "drugs"];

/// Strikes after which the re-prompt also asks the candidate to refocus.
pub const OFF_TOPIC_STRIKES: u32 = 3;

pub const REFOCUS_NOTICE: &str =
    "I notice we're having some difficulty staying on topic. Let's focus on completing your application.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextViolation {
    OffTopic,
    Inappropriate,
}

impl ContextViolation {
    pub const fn message(self) -> &'static str {
        match self {
            ContextViolation::OffTopic => {
                "I'm here to help with your job application. Let's focus on gathering your professional information."
            }
            ContextViolation::Inappropriate => {
                "Please keep our conversation professional and appropriate."
            }
        }
    }
}

/// Positions, technologies and email addresses legitimately contain words like
/// "game" or "news", so only inappropriate language is checked for those fields.
pub fn check_context(input: &str, field: FieldKind) -> Option<ContextViolation> {
    let tokens: Vec<String> = input
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect();

    if contains_keyword(&tokens, &INAPPROPRIATE) {
        return Some(ContextViolation::Inappropriate);
    }
    if matches!(
        field,
        FieldKind::Email | FieldKind::Position | FieldKind::TechStack
    ) {
        return None;
    }
    contains_keyword(&tokens, &OFF_TOPIC).then_some(ContextViolation::OffTopic)
}

fn contains_keyword(tokens: &[String], keywords: &[&str]) -> bool {
    tokens.iter().any(|token| {
        let singular = token.strip_suffix('s').unwrap_or(token);
        keywords.contains(&token.as_str()) || keywords.contains(&singular)
    })
}

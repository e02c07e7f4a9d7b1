use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::domain::FieldKind;

const MAX_TECHNOLOGIES: usize = 10;
const EXPERIENCE_UNITS: [&str; 3] = ["years", "year", "yrs"];

/// Why a raw answer was rejected. Always recoverable by asking again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field} is not in a recognised format")]
    InvalidFormat { field: FieldKind },
    #[error("{field} cannot be empty")]
    Empty { field: FieldKind },
    #[error("{field} must be between 0 and {max}")]
    OutOfRange { field: FieldKind, max: u32 },
}

impl ValidationError {
    pub fn field(&self) -> FieldKind {
        match self {
            ValidationError::InvalidFormat { field }
            | ValidationError::Empty { field }
            | ValidationError::OutOfRange { field, .. } => *field,
        }
    }

    pub const fn kind_label(&self) -> &'static str {
        match self {
            ValidationError::InvalidFormat { .. } => "invalid_format",
            ValidationError::Empty { .. } => "empty",
            ValidationError::OutOfRange { .. } => "out_of_range",
        }
    }
}

/// Normalized value produced by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Years(u32),
    Technologies(Vec<String>),
}

/// Stateless per-field validator bound to the static screening limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldValidator {
    max_experience_years: u32,
}

impl FieldValidator {
    pub fn new(max_experience_years: u32) -> Self {
        Self {
            max_experience_years,
        }
    }

    pub fn validate(&self, field: FieldKind, raw: &str) -> Result<FieldValue, ValidationError> {
        match field {
            FieldKind::FullName | FieldKind::Position | FieldKind::Location => {
                validate_text(field, raw).map(FieldValue::Text)
            }
            FieldKind::Email => validate_email(raw).map(FieldValue::Text),
            FieldKind::Phone => validate_phone(raw).map(FieldValue::Text),
            FieldKind::Experience => {
                validate_experience(raw, self.max_experience_years).map(FieldValue::Years)
            }
            FieldKind::TechStack => parse_tech_stack(raw).map(FieldValue::Technologies),
        }
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(60)
    }
}

fn email_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

fn phone_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\+?[0-9]{7,15}$").ok())
        .as_ref()
}

/// Trim free text, rejecting blank input.
pub fn validate_text(field: FieldKind, raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(trimmed.to_string())
}

pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let field = FieldKind::Email;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let valid = email_pattern().is_some_and(|pattern| pattern.is_match(trimmed))
        && !trimmed.ends_with('.');
    if !valid {
        return Err(ValidationError::InvalidFormat { field });
    }
    Ok(trimmed.to_string())
}

/// Strip spaces, dashes and parentheses, then require 7-15 digits with an optional `+`.
pub fn validate_phone(raw: &str) -> Result<String, ValidationError> {
    let field = FieldKind::Phone;
    if raw.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let stripped: String = raw
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '(' | ')'))
        .collect();

    if phone_pattern().is_some_and(|pattern| pattern.is_match(&stripped)) {
        Ok(stripped)
    } else {
        Err(ValidationError::InvalidFormat { field })
    }
}

pub fn validate_experience(raw: &str, max_years: u32) -> Result<u32, ValidationError> {
    let field = FieldKind::Experience;
    let lowered = raw.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return Err(ValidationError::Empty { field });
    }

    let number = EXPERIENCE_UNITS
        .iter()
        .find_map(|unit| lowered.strip_suffix(*unit))
        .unwrap_or(lowered.as_str())
        .trim();

    if number.is_empty() || !number.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat { field });
    }

    // Digits only, so the one remaining failure is overflow.
    let years = number
        .parse::<u32>()
        .map_err(|_| ValidationError::OutOfRange {
            field,
            max: max_years,
        })?;

    if years > max_years {
        return Err(ValidationError::OutOfRange {
            field,
            max: max_years,
        });
    }
    Ok(years)
}

/// Split on `,` `;` `|` or newlines, keeping the first spelling of each technology.
pub fn parse_tech_stack(raw: &str) -> Result<Vec<String>, ValidationError> {
    let mut seen = HashSet::new();
    let technologies: Vec<String> = raw
        .split([',', ';', '|', '\n'])
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter(|entry| seen.insert(entry.to_lowercase()))
        .take(MAX_TECHNOLOGIES)
        .map(str::to_string)
        .collect();

    if technologies.is_empty() {
        return Err(ValidationError::Empty {
            field: FieldKind::TechStack,
        });
    }
    Ok(technologies)
}

use serde::{Deserialize, Serialize};

use super::sentiment::{Emotion, SentimentAnnotation};

const REASSURANCE_THRESHOLD: f32 = -0.3;
const ENCOURAGEMENT_THRESHOLD: f32 = 0.3;

/// Register used for the assistant's canned phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    Casual,
    Professional,
    Formal,
}

impl CommunicationStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "casual" => Some(Self::Casual),
            "professional" => Some(Self::Professional),
            "formal" => Some(Self::Formal),
            _ => None,
        }
    }

    pub const fn greeting(self) -> &'static str {
        match self {
            CommunicationStyle::Casual => "Hey there!",
            CommunicationStyle::Professional => "Good day!",
            CommunicationStyle::Formal => "Good day, and welcome to TalentScout.",
        }
    }

    pub const fn encouragement(self) -> &'static str {
        match self {
            CommunicationStyle::Casual => "You're doing great!",
            CommunicationStyle::Professional => "Excellent response!",
            CommunicationStyle::Formal => "Your response demonstrates strong competency.",
        }
    }

    pub const fn reassurance(self) -> &'static str {
        match self {
            CommunicationStyle::Casual => "No worries at all, you're doing fine.",
            CommunicationStyle::Professional => {
                "That's perfectly fine. Take your time with your response."
            }
            CommunicationStyle::Formal => {
                "Please proceed with confidence. Your responses are valued."
            }
        }
    }

    pub const fn transition(self) -> &'static str {
        match self {
            CommunicationStyle::Casual => "Alright, let's move on to",
            CommunicationStyle::Professional => "Now, let's proceed to",
            CommunicationStyle::Formal => "We shall now proceed to",
        }
    }

    pub const fn closing(self) -> &'static str {
        match self {
            CommunicationStyle::Casual => "Thanks a bunch! Talk soon!",
            CommunicationStyle::Professional => {
                "Thank you for your time. We'll be in touch soon."
            }
            CommunicationStyle::Formal => "We appreciate your participation in this assessment.",
        }
    }
}

/// Requested question difficulty; `Adaptive` defers to the candidate's experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionDifficulty {
    Easy,
    Medium,
    Hard,
    Adaptive,
}

impl QuestionDifficulty {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            "adaptive" => Some(Self::Adaptive),
            _ => None,
        }
    }

    pub fn resolve(self, experience_years: u32) -> DifficultyLevel {
        match self {
            QuestionDifficulty::Easy => DifficultyLevel::Easy,
            QuestionDifficulty::Medium => DifficultyLevel::Medium,
            QuestionDifficulty::Hard => DifficultyLevel::Hard,
            QuestionDifficulty::Adaptive => match experience_years {
                0..=1 => DifficultyLevel::Easy,
                2..=4 => DifficultyLevel::Medium,
                _ => DifficultyLevel::Hard,
            },
        }
    }
}

/// Concrete difficulty handed to question sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub const fn label(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => "easy",
            DifficultyLevel::Medium => "medium",
            DifficultyLevel::Hard => "hard",
        }
    }

    pub const fn descriptor(self) -> &'static str {
        match self {
            DifficultyLevel::Easy => {
                "beginner-friendly questions that focus on basic concepts"
            }
            DifficultyLevel::Medium => {
                "intermediate-level questions that test practical knowledge"
            }
            DifficultyLevel::Hard => {
                "advanced questions that test deep understanding and complex scenarios"
            }
        }
    }
}

/// Pick the line to prepend to the next prompt, if any.
pub fn response_prefix(
    style: CommunicationStyle,
    annotation: &SentimentAnnotation,
) -> Option<&'static str> {
    match annotation.emotion {
        Emotion::Nervous | Emotion::Frustrated | Emotion::Negative
            if annotation.polarity <= REASSURANCE_THRESHOLD =>
        {
            Some(style.reassurance())
        }
        Emotion::Excited | Emotion::Confident | Emotion::Positive
            if annotation.polarity >= ENCOURAGEMENT_THRESHOLD =>
        {
            Some(style.encouragement())
        }
        _ => None,
    }
}

//! Keyword-lexicon mood tagging for inbound messages.
//!
//! Annotations only influence the phrasing of the next reply; they are recomputed for
//! every message and never stored on the candidate record.

use serde::{Deserialize, Serialize};

const POLARITY_WEIGHT: f32 = 0.3;
const CONFIDENCE_SCALE: f32 = 3.0;
const BASELINE_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Excited,
    Confident,
    Nervous,
    Frustrated,
    Positive,
    Negative,
    Neutral,
}

impl Emotion {
    pub const fn label(self) -> &'static str {
        match self {
            Emotion::Excited => "excited",
            Emotion::Confident => "confident",
            Emotion::Nervous => "nervous",
            Emotion::Frustrated => "frustrated",
            Emotion::Positive => "positive",
            Emotion::Negative => "negative",
            Emotion::Neutral => "neutral",
        }
    }

    /// Sign applied when folding this emotion into the polarity score.
    const fn direction(self) -> f32 {
        match self {
            Emotion::Excited | Emotion::Confident | Emotion::Positive => 1.0,
            Emotion::Nervous | Emotion::Frustrated | Emotion::Negative => -1.0,
            Emotion::Neutral => 0.0,
        }
    }
}

const LEXICON: [(Emotion, &[&str]); 7] = [
    (
        Emotion::Excited,
        &["excited", "thrilled", "amazing", "fantastic", "love", "passionate", "enthusiastic"],
    ),
    (
        Emotion::Confident,
        &["confident", "sure", "certain", "definitely", "absolutely", "skilled", "experienced"],
    ),
    (
        Emotion::Nervous,
        &["nervous", "worried", "anxious", "unsure", "maybe", "think so", "hope"],
    ),
    (
        Emotion::Frustrated,
        &["frustrated", "difficult", "hard", "struggle", "challenging", "annoying"],
    ),
    (
        Emotion::Positive,
        &["good", "great", "excellent", "wonderful", "perfect", "happy", "pleased"],
    ),
    (
        Emotion::Negative,
        &["bad", "terrible", "awful", "hate", "dislike", "disappointed", "sad"],
    ),
    (
        Emotion::Neutral,
        &["okay", "fine", "alright", "normal", "average", "standard"],
    ),
];

const INTENSIFIERS: [(&str, f32); 6] = [
    ("extremely", 2.0),
    ("very", 1.5),
    ("really", 1.3),
    ("quite", 1.2),
    ("somewhat", 0.8),
    ("slightly", 0.6),
];

/// Ephemeral mood reading for a single message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnnotation {
    pub emotion: Emotion,
    pub polarity: f32,
    pub confidence: f32,
    pub keywords: Vec<String>,
}

impl SentimentAnnotation {
    pub fn neutral() -> Self {
        Self {
            emotion: Emotion::Neutral,
            polarity: 0.0,
            confidence: BASELINE_CONFIDENCE,
            keywords: Vec::new(),
        }
    }
}

/// Score `raw` against the fixed lexicon.
///
/// Keywords match whole words (or whole phrases); an intensifier directly before a
/// keyword scales that hit. The top-scoring emotion wins, ties fall back to neutral.
pub fn annotate(raw: &str) -> SentimentAnnotation {
    let words: Vec<String> = raw
        .split(|ch: char| !ch.is_alphanumeric() && ch != '\'')
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect();

    if words.is_empty() {
        return SentimentAnnotation::neutral();
    }

    let mut scores: Vec<(Emotion, f32)> = Vec::new();
    let mut keywords = Vec::new();

    for (emotion, lexicon) in LEXICON {
        let mut score = 0.0;
        for keyword in lexicon {
            for position in phrase_positions(&words, keyword) {
                score += intensity_before(&words, position);
                keywords.push((*keyword).to_string());
            }
        }
        if score > 0.0 {
            scores.push((emotion, score));
        }
    }

    if scores.is_empty() {
        return SentimentAnnotation::neutral();
    }

    let top = scores
        .iter()
        .map(|(_, score)| *score)
        .fold(f32::MIN, f32::max);
    let leaders: Vec<Emotion> = scores
        .iter()
        .filter(|(_, score)| (*score - top).abs() < f32::EPSILON)
        .map(|(emotion, _)| *emotion)
        .collect();

    let emotion = match leaders.as_slice() {
        [single] => *single,
        _ => Emotion::Neutral,
    };

    let polarity = scores
        .iter()
        .map(|(emotion, score)| emotion.direction() * score * POLARITY_WEIGHT)
        .sum::<f32>()
        .clamp(-1.0, 1.0);

    SentimentAnnotation {
        emotion,
        polarity,
        confidence: (top / CONFIDENCE_SCALE).min(1.0),
        keywords,
    }
}

fn phrase_positions(words: &[String], phrase: &str) -> Vec<usize> {
    let parts: Vec<&str> = phrase.split(' ').collect();
    if parts.len() > words.len() {
        return Vec::new();
    }

    (0..=words.len() - parts.len())
        .filter(|start| {
            parts
                .iter()
                .enumerate()
                .all(|(offset, part)| words[start + offset] == *part)
        })
        .collect()
}

fn intensity_before(words: &[String], position: usize) -> f32 {
    position
        .checked_sub(1)
        .and_then(|previous| {
            INTENSIFIERS
                .iter()
                .find(|(modifier, _)| words[previous] == *modifier)
                .map(|(_, multiplier)| *multiplier)
        })
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_or_unmatched_input_is_neutral() {
        assert_eq!(annotate("   "), SentimentAnnotation::neutral());
        let annotation = annotate("My name is Jane Doe");
        assert_eq!(annotation.emotion, Emotion::Neutral);
        assert_eq!(annotation.polarity, 0.0);
        assert!(annotation.keywords.is_empty());
    }

    #[test]
    fn single_category_wins_with_positive_polarity() {
        let annotation = annotate("I'm really excited and passionate about Rust!");
        assert_eq!(annotation.emotion, Emotion::Excited);
        assert!(annotation.polarity > 0.0);
        assert!(annotation.keywords.contains(&"excited".to_string()));
        assert!(annotation.keywords.contains(&"passionate".to_string()));
    }

    #[test]
    fn intensifier_scales_the_following_keyword() {
        let plain = annotate("I am nervous");
        let strong = annotate("I am extremely nervous");
        assert_eq!(strong.emotion, Emotion::Nervous);
        assert!(strong.polarity < plain.polarity);
        assert!(strong.confidence > plain.confidence);
    }

    #[test]
    fn ties_fall_back_to_neutral() {
        let annotation = annotate("good but difficult");
        assert_eq!(annotation.emotion, Emotion::Neutral);
        assert_eq!(annotation.keywords.len(), 2);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let annotation = annotate("I build hardware drivers");
        assert_eq!(annotation.emotion, Emotion::Neutral);
        assert!(annotation.keywords.is_empty());
    }

    #[test]
    fn phrases_match_across_words() {
        let annotation = annotate("I think so, yes");
        assert_eq!(annotation.emotion, Emotion::Nervous);
        assert_eq!(annotation.keywords, vec!["think so".to_string()]);
    }

    #[test]
    fn polarity_is_clamped() {
        let annotation =
            annotate("amazing fantastic love thrilled excited passionate enthusiastic great");
        assert!(annotation.polarity <= 1.0);
        assert_eq!(annotation.confidence, 1.0);
    }
}

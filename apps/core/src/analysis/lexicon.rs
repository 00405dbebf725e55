//! Offline lexicon classifiers.
//!
//! Word-list scoring used when no model endpoint is configured. Deterministic
//! and dependency-free, so they also serve as test doubles with real behaviour.

use async_trait::async_trait;
use std::collections::HashSet;

use super::classifier::{ClassificationResult, Classifier, NEGATIVE, NEUTRAL, POSITIVE};
use crate::error::ClassifierError;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "love", "loved", "amazing", "awesome", "excellent", "fantastic",
    "wonderful", "perfect", "best", "happy", "nice", "beautiful", "brilliant", "like",
    "enjoy", "enjoyed", "thanks", "thank", "helpful", "cool", "glad", "impressive",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "hate", "hated", "worst", "horrible", "disgusting",
    "stupid", "poor", "sad", "angry", "broken", "useless", "annoying", "disappointing",
    "disappointed", "wrong", "ugly", "boring", "fail", "failed", "sucks", "waste",
];

/// Weight of the neutral class; keeps single weak hits from reading as certain.
const NEUTRAL_MASS: f32 = 0.5;

/// `(emotion, words)`, checked in this order.
const EMOTION_WORDS: &[(&str, &[&str])] = &[
    ("joy", &["happy", "glad", "joy", "love", "great", "amazing", "awesome", "fun", "lol", "haha"]),
    ("anger", &["angry", "hate", "furious", "mad", "annoying", "outrageous", "stupid"]),
    ("sadness", &["sad", "cry", "unfortunately", "miss", "lost", "depressing", "sorry"]),
    ("fear", &["scared", "afraid", "fear", "worried", "terrifying", "anxious", "risk"]),
    ("surprise", &["wow", "unexpected", "surprised", "shocked", "unbelievable", "whoa"]),
    ("disgust", &["disgusting", "gross", "awful", "terrible", "horrible", "nasty"]),
];

fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}

/// Positive/negative word counting sentiment classifier.
pub struct LexiconSentimentClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl Default for LexiconSentimentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconSentimentClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
        }
    }

    fn distribution(&self, text: &str) -> ClassificationResult {
        let words = tokens(text);
        let pos = words.iter().filter(|w| self.positive.contains(w.as_str())).count() as f32;
        let neg = words.iter().filter(|w| self.negative.contains(w.as_str())).count() as f32;

        if pos == 0.0 && neg == 0.0 {
            return ClassificationResult {
                label: NEUTRAL.to_string(),
                confidence: 1.0,
                scores: [(NEUTRAL.to_string(), 1.0), (POSITIVE.to_string(), 0.0), (NEGATIVE.to_string(), 0.0)]
                    .into_iter()
                    .collect(),
            };
        }

        let total = pos + neg + NEUTRAL_MASS;
        ClassificationResult::from_scores([
            (POSITIVE, pos / total),
            (NEGATIVE, neg / total),
            (NEUTRAL, NEUTRAL_MASS / total),
        ])
        .unwrap_or_else(ClassificationResult::neutral_sentiment)
    }
}

#[async_trait]
impl Classifier for LexiconSentimentClassifier {
    fn name(&self) -> &str {
        "lexicon-sentiment"
    }

    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        Ok(self.distribution(text))
    }

    fn neutral_default(&self) -> ClassificationResult {
        ClassificationResult::neutral_sentiment()
    }
}

/// Keyword-table emotion classifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct LexiconEmotionClassifier;

impl LexiconEmotionClassifier {
    pub fn new() -> Self {
        Self
    }

    fn distribution(&self, text: &str) -> ClassificationResult {
        let words = tokens(text);
        let counts: Vec<(&str, f32)> = EMOTION_WORDS
            .iter()
            .map(|(emotion, lexicon)| {
                let hits = words.iter().filter(|w| lexicon.contains(&w.as_str())).count();
                (*emotion, hits as f32)
            })
            .filter(|(_, hits)| *hits > 0.0)
            .collect();

        let total: f32 = counts.iter().map(|(_, c)| c).sum();
        if total == 0.0 {
            return ClassificationResult {
                confidence: 1.0,
                ..ClassificationResult::neutral_emotion()
            };
        }

        ClassificationResult::from_scores(counts.into_iter().map(|(e, c)| (e, c / total)))
            .unwrap_or_else(ClassificationResult::neutral_emotion)
    }
}

#[async_trait]
impl Classifier for LexiconEmotionClassifier {
    fn name(&self) -> &str {
        "lexicon-emotion"
    }

    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        Ok(self.distribution(text))
    }

    fn neutral_default(&self) -> ClassificationResult {
        ClassificationResult::neutral_emotion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sentiment_polarity() {
        let classifier = LexiconSentimentClassifier::new();

        let positive = classifier.classify("This is great, I love it").await.unwrap();
        assert_eq!(positive.label, POSITIVE);

        let negative = classifier.classify("Terrible and awful update").await.unwrap();
        assert_eq!(negative.label, NEGATIVE);

        let neutral = classifier.classify("The meeting is on Tuesday").await.unwrap();
        assert_eq!(neutral.label, NEUTRAL);
        assert_eq!(neutral.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_sentiment_scores_sum_to_one() {
        let result = LexiconSentimentClassifier::new()
            .classify("good bad good")
            .await
            .unwrap();
        let sum: f32 = result.scores.values().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_emotion_detection() {
        let classifier = LexiconEmotionClassifier::new();

        let result = classifier.classify("wow that was unexpected").await.unwrap();
        assert_eq!(result.label, "surprise");

        let result = classifier.classify("the bus leaves at noon").await.unwrap();
        assert_eq!(result.label, "neutral");
    }
}

//! Classifier boundary.
//!
//! Sentiment and emotion models live outside this crate. The pipeline only sees
//! the [`Classifier`] trait and the label distribution it returns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::helpers::round_to;
use crate::error::ClassifierError;

pub const POSITIVE: &str = "POSITIVE";
pub const NEGATIVE: &str = "NEGATIVE";
pub const NEUTRAL: &str = "NEUTRAL";

/// Label, confidence and full label→score distribution for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    /// Score of `label`, in [0, 1]
    pub confidence: f32,
    pub scores: BTreeMap<String, f32>,
}

impl ClassificationResult {
    /// Build from raw `(label, score)` pairs; the highest score becomes the label.
    /// Returns `None` for an empty distribution.
    pub fn from_scores<I, S>(pairs: I) -> Option<Self>
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let scores: BTreeMap<String, f32> = pairs
            .into_iter()
            .map(|(label, score)| (label.into(), score.clamp(0.0, 1.0)))
            .collect();

        let (label, confidence) = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(l, s)| (l.clone(), *s))?;

        Some(Self {
            label,
            confidence,
            scores,
        })
    }

    /// Neutral default for a sentiment classifier.
    pub fn neutral_sentiment() -> Self {
        Self {
            label: NEUTRAL.to_string(),
            confidence: 0.0,
            scores: BTreeMap::new(),
        }
    }

    /// Neutral default for an emotion classifier.
    pub fn neutral_emotion() -> Self {
        Self {
            label: "neutral".to_string(),
            confidence: 0.0,
            scores: BTreeMap::from([("neutral".to_string(), 1.0)]),
        }
    }

    pub fn score(&self, label: &str) -> f32 {
        self.scores.get(label).copied().unwrap_or(0.0)
    }

    /// Labels sorted by descending score.
    pub fn ranked(&self) -> Vec<(&str, f32)> {
        let mut ranked: Vec<(&str, f32)> =
            self.scores.iter().map(|(l, s)| (l.as_str(), *s)).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// A text classifier returning a label distribution.
///
/// Implementations report an unloaded model as [`ClassifierError::Unavailable`];
/// the pipeline then uses [`Classifier::neutral_default`].
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError>;

    /// Result used for blank input and for recoverable failures.
    fn neutral_default(&self) -> ClassificationResult;
}

/// Classify `text`, substituting the neutral default for blank input and for
/// recoverable backend failures. Transport failures are returned.
pub async fn classify_or_default(
    classifier: &dyn Classifier,
    text: &str,
) -> Result<ClassificationResult, ClassifierError> {
    if text.trim().is_empty() {
        debug!(classifier = classifier.name(), "Blank input, using neutral default");
        return Ok(classifier.neutral_default());
    }

    match classifier.classify(text).await {
        Ok(result) => Ok(result),
        Err(e) if e.is_recoverable() => {
            warn!(classifier = classifier.name(), error = %e, "Falling back to neutral default");
            Ok(classifier.neutral_default())
        }
        Err(e) => Err(e),
    }
}

pub fn sentiment_emoji(label: &str) -> &'static str {
    match label {
        POSITIVE => "🟢",
        NEGATIVE => "🔴",
        NEUTRAL => "🟡",
        _ => "😐",
    }
}

pub fn emotion_emoji(emotion: &str) -> &'static str {
    match emotion {
        "joy" => "😊",
        "happiness" => "😄",
        "love" => "😍",
        "admiration" => "🤩",
        "excitement" => "🤗",
        "gratitude" => "🙏",
        "optimism" => "😌",
        "pride" => "😎",
        "relief" => "😮‍💨",
        "approval" => "👍",
        "anger" => "😠",
        "annoyance" => "😤",
        "disappointment" => "😞",
        "disapproval" => "👎",
        "disgust" => "🤢",
        "embarrassment" => "😳",
        "fear" => "😰",
        "grief" => "😢",
        "nervousness" => "😬",
        "sadness" => "😭",
        "surprise" => "😲",
        "curiosity" => "🤔",
        "confusion" => "😕",
        "realization" => "💡",
        "desire" => "🤤",
        "caring" => "🥰",
        "remorse" => "😔",
        _ => "😐",
    }
}

/// Sentiment classification with derived display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentView {
    /// Upper-cased label, e.g. `POSITIVE`
    pub sentiment: String,
    pub confidence: f64,
    /// `P(POSITIVE) - P(NEGATIVE)`
    pub polarity: f64,
    pub emoji: String,
    pub all_scores: BTreeMap<String, f32>,
}

/// Upper-cased sentiment label. Index-style labels from three-class models
/// (`LABEL_0` negative, `LABEL_1` neutral, `LABEL_2` positive) are named.
pub fn canonical_sentiment_label(label: &str) -> String {
    match label.to_uppercase().as_str() {
        "LABEL_0" => NEGATIVE.to_string(),
        "LABEL_1" => NEUTRAL.to_string(),
        "LABEL_2" => POSITIVE.to_string(),
        other => other.to_string(),
    }
}

impl From<&ClassificationResult> for SentimentView {
    fn from(result: &ClassificationResult) -> Self {
        let all_scores: BTreeMap<String, f32> = result
            .scores
            .iter()
            .map(|(l, s)| (canonical_sentiment_label(l), *s))
            .collect();
        let sentiment = canonical_sentiment_label(&result.label);
        let polarity = all_scores.get(POSITIVE).copied().unwrap_or(0.0) as f64
            - all_scores.get(NEGATIVE).copied().unwrap_or(0.0) as f64;

        Self {
            emoji: sentiment_emoji(&sentiment).to_string(),
            confidence: round_to(result.confidence as f64, 3),
            polarity: round_to(polarity, 3),
            sentiment,
            all_scores,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub emotion: String,
    pub score: f32,
    pub emoji: String,
}

/// Emotion classification with derived display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionView {
    pub dominant_emotion: String,
    pub confidence: f32,
    pub emoji: String,
    pub all_emotions: BTreeMap<String, f32>,
    /// Up to three strongest emotions
    pub top_emotions: Vec<EmotionScore>,
}

impl From<&ClassificationResult> for EmotionView {
    fn from(result: &ClassificationResult) -> Self {
        let dominant_emotion = result.label.to_lowercase();
        let top_emotions = result
            .ranked()
            .into_iter()
            .take(3)
            .map(|(label, score)| {
                let emotion = label.to_lowercase();
                EmotionScore {
                    emoji: emotion_emoji(&emotion).to_string(),
                    emotion,
                    score,
                }
            })
            .collect();

        Self {
            emoji: emotion_emoji(&dominant_emotion).to_string(),
            confidence: result.confidence,
            all_emotions: result
                .scores
                .iter()
                .map(|(l, s)| (l.to_lowercase(), *s))
                .collect(),
            dominant_emotion,
            top_emotions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FailingClassifier {
        error: ClassifierError,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Classifier for FailingClassifier {
        fn name(&self) -> &str {
            "failing"
        }

        async fn classify(&self, _text: &str) -> Result<ClassificationResult, ClassifierError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(self.error.clone())
        }

        fn neutral_default(&self) -> ClassificationResult {
            ClassificationResult::neutral_sentiment()
        }
    }

    #[test]
    fn test_from_scores_picks_highest() {
        let result =
            ClassificationResult::from_scores([("NEGATIVE", 0.1), ("POSITIVE", 0.7), ("NEUTRAL", 0.2)])
                .unwrap();
        assert_eq!(result.label, "POSITIVE");
        assert_eq!(result.confidence, 0.7);
        assert_eq!(result.ranked()[0].0, "POSITIVE");
        assert!(ClassificationResult::from_scores(Vec::<(String, f32)>::new()).is_none());
    }

    #[test]
    fn test_sentiment_view_polarity() {
        let result =
            ClassificationResult::from_scores([("negative", 0.25), ("positive", 0.75)]).unwrap();
        let view = SentimentView::from(&result);
        assert_eq!(view.sentiment, "POSITIVE");
        assert_eq!(view.polarity, 0.5);
        assert_eq!(view.emoji, "🟢");
    }

    #[test]
    fn test_sentiment_view_names_index_labels() {
        let result =
            ClassificationResult::from_scores([("LABEL_0", 0.1), ("LABEL_1", 0.1), ("LABEL_2", 0.8)])
                .unwrap();
        let view = SentimentView::from(&result);
        assert_eq!(view.sentiment, POSITIVE);
        assert_eq!(view.polarity, 0.7);
        assert_eq!(view.emoji, "🟢");
        assert!(view.all_scores.contains_key(NEGATIVE));
        assert!(view.all_scores.contains_key(NEUTRAL));
        assert!(!view.all_scores.contains_key("LABEL_2"));
        assert_eq!(canonical_sentiment_label("mixed"), "MIXED");
    }

    #[test]
    fn test_emotion_view_top_three() {
        let result = ClassificationResult::from_scores([
            ("Joy", 0.5),
            ("anger", 0.1),
            ("fear", 0.15),
            ("surprise", 0.25),
        ])
        .unwrap();
        let view = EmotionView::from(&result);
        assert_eq!(view.dominant_emotion, "joy");
        assert_eq!(view.emoji, "😊");
        let top: Vec<&str> = view.top_emotions.iter().map(|e| e.emotion.as_str()).collect();
        assert_eq!(top, vec!["joy", "surprise", "fear"]);
    }

    #[test]
    fn test_neutral_emotion_default() {
        let view = EmotionView::from(&ClassificationResult::neutral_emotion());
        assert_eq!(view.dominant_emotion, "neutral");
        assert_eq!(view.top_emotions.len(), 1);
        assert_eq!(view.top_emotions[0].score, 1.0);
    }

    #[tokio::test]
    async fn test_blank_input_skips_backend() {
        let classifier = FailingClassifier {
            error: ClassifierError::Transport("down".into()),
            calls: AtomicUsize::new(0),
        };
        let result = classify_or_default(&classifier, "   ").await.unwrap();
        assert_eq!(result, ClassificationResult::neutral_sentiment());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unavailable_degrades_transport_propagates() {
        let unavailable = FailingClassifier {
            error: ClassifierError::Unavailable("no model".into()),
            calls: AtomicUsize::new(0),
        };
        let result = classify_or_default(&unavailable, "some text").await.unwrap();
        assert_eq!(result.label, NEUTRAL);

        let broken = FailingClassifier {
            error: ClassifierError::Transport("refused".into()),
            calls: AtomicUsize::new(0),
        };
        assert!(classify_or_default(&broken, "some text").await.is_err());
    }
}

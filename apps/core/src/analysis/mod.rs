//! # Analysis Module
//!
//! Turns one social post and its comments into structured analytics.
//!
//! ## Components
//! - `normalizer`: URL stripping and whitespace collapsing
//! - `entities`: hashtags, mentions, URLs, emails, phone numbers
//! - `metrics`: readability, engagement, location
//! - `classifier`: the external classifier boundary and display views
//! - `lexicon`: offline word-list classifiers
//! - `remote`: HTTP inference endpoint adapter
//! - `vectorizer`: TF-IDF term weighting
//! - `kmeans`: seeded k-means
//! - `themes`: keyword partition plus cluster overlay
//! - `record`: output structures
//! - `pipeline`: main orchestrator

pub mod classifier;
pub mod entities;
pub mod helpers;
pub mod kmeans;
pub mod lexicon;
pub mod metrics;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod remote;
pub mod themes;
pub mod vectorizer;

pub use classifier::{ClassificationResult, Classifier, EmotionView, SentimentView};
pub use entities::{Entities, EntityExtractor};
pub use lexicon::{LexiconEmotionClassifier, LexiconSentimentClassifier};
pub use metrics::{Engagement, LocationInfo, MetricsCalculator, Readability};
pub use pipeline::ContentAnalysisPipeline;
pub use record::{
    AggregateResult, AnalysisRecord, BucketSource, ClusterTag, CommentAnalysis, SentimentTally,
    ThemeBucket, ThemeReport,
};
pub use remote::{ClassifierKind, HttpClassifier};
pub use themes::{ThemeCategory, ThemeClusteringEngine, GENERAL_DISCUSSION};

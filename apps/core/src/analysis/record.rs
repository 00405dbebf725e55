//! Output structures of the analysis pipeline.
//!
//! Plain serializable data; nothing here knows about rendering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::classifier::{ClassificationResult, EmotionView, SentimentView};
use super::entities::Entities;
use super::metrics::{Engagement, LocationInfo, Readability};
use super::themes::ThemeCategory;
use crate::models::{Comment, Platform, Post};

/// Everything derived from one unit of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub cleaned_text: String,
    /// Raw sentiment classifier output
    pub sentiment_result: ClassificationResult,
    /// Raw emotion classifier output
    pub emotion_result: ClassificationResult,
    pub sentiment: SentimentView,
    pub emotion: EmotionView,
    /// Computed on the normalized text
    pub readability: Readability,
    /// Extracted from the raw text
    pub entities: Entities,
}

impl AnalysisRecord {
    pub fn new(
        cleaned_text: String,
        sentiment_result: ClassificationResult,
        emotion_result: ClassificationResult,
        readability: Readability,
        entities: Entities,
    ) -> Self {
        Self {
            sentiment: SentimentView::from(&sentiment_result),
            emotion: EmotionView::from(&emotion_result),
            cleaned_text,
            sentiment_result,
            emotion_result,
            readability,
            entities,
        }
    }
}

/// A classified comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentAnalysis {
    /// Position in the caller's comment list
    pub index: usize,
    pub id: String,
    pub text: String,
    pub author: String,
    pub score: i64,
    pub created_utc: i64,
    pub time_ago: String,
    pub analysis: AnalysisRecord,
}

/// Keyword-derived per-bucket sentiment counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTally {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

impl SentimentTally {
    pub fn total(&self) -> usize {
        self.positive + self.negative + self.neutral
    }
}

/// Where a theme bucket came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BucketSource {
    /// Part of the keyword partition
    Keyword { category: ThemeCategory },
    /// Supplementary cluster overlay; members also sit in a keyword bucket
    Cluster { theme: usize },
    /// Degenerate input, single bucket
    Fallback,
}

/// A named group of comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeBucket {
    pub name: String,
    pub source: BucketSource,
    pub comments: Vec<Comment>,
    pub keywords: Vec<String>,
    pub sentiment_summary: SentimentTally,
    pub avg_score: f64,
}

impl ThemeBucket {
    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn is_overlay(&self) -> bool {
        matches!(self.source, BucketSource::Cluster { .. })
    }
}

/// Cluster membership of one themed comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTag {
    pub comment_id: String,
    /// 1-based theme number, `None` when clustering produced nothing
    pub theme: Option<usize>,
}

/// Result of theme analysis: the keyword partition followed by any cluster
/// overlay buckets, in insertion order, plus per-comment cluster tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeReport {
    pub buckets: Vec<ThemeBucket>,
    pub cluster_tags: Vec<ClusterTag>,
}

impl ThemeReport {
    pub fn get(&self, name: &str) -> Option<&ThemeBucket> {
        self.buckets.iter().find(|b| b.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.buckets.iter().map(|b| b.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets where every themed comment appears exactly once.
    pub fn partition(&self) -> impl Iterator<Item = &ThemeBucket> {
        self.buckets.iter().filter(|b| !b.is_overlay())
    }

    pub fn overlays(&self) -> impl Iterator<Item = &ThemeBucket> {
        self.buckets.iter().filter(|b| b.is_overlay())
    }

    pub fn is_fallback(&self) -> bool {
        self.buckets.len() == 1 && self.buckets[0].source == BucketSource::Fallback
    }
}

/// One aggregated analysis per post. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub platform: Platform,
    pub post: Post,
    pub post_analysis: AnalysisRecord,
    pub engagement: Engagement,
    pub location: Option<LocationInfo>,
    pub comments: Vec<CommentAnalysis>,
    pub themes: ThemeReport,
    /// Top-level sentiment label → comment count
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub processed_at: DateTime<Utc>,
}

impl AggregateResult {
    pub fn total_processed(&self) -> usize {
        self.comments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(name: &str, source: BucketSource) -> ThemeBucket {
        ThemeBucket {
            name: name.to_string(),
            source,
            comments: vec![Comment::new("c1", "text", 1)],
            keywords: vec![],
            sentiment_summary: SentimentTally::default(),
            avg_score: 1.0,
        }
    }

    #[test]
    fn test_report_partition_and_overlay() {
        let report = ThemeReport {
            buckets: vec![
                bucket("👎 Critical Comments", BucketSource::Keyword { category: ThemeCategory::Criticism }),
                bucket("📊 Theme 1", BucketSource::Cluster { theme: 1 }),
            ],
            cluster_tags: vec![],
        };

        assert_eq!(report.partition().count(), 1);
        assert_eq!(report.overlays().count(), 1);
        assert!(report.contains("📊 Theme 1"));
        assert!(!report.is_fallback());
        assert_eq!(report.names(), vec!["👎 Critical Comments", "📊 Theme 1"]);
    }

    #[test]
    fn test_tally_total() {
        let tally = SentimentTally {
            positive: 2,
            negative: 1,
            neutral: 4,
        };
        assert_eq!(tally.total(), 7);
    }
}

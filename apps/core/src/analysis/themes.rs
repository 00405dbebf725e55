//! Theme clustering engine.
//!
//! Two independent strategies over the same comments:
//! 1. keyword heuristics: an ordered category table, every comment lands in
//!    exactly one category (this is the partition)
//! 2. TF-IDF + seeded k-means: supplementary "📊 Theme N" buckets that overlay
//!    the partition
//!
//! Clustering failures contribute nothing; the keyword pass always runs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, error, info, warn};

use super::kmeans::KMeans;
use super::normalizer::{normalize, token_count};
use super::record::{BucketSource, ClusterTag, SentimentTally, ThemeBucket, ThemeReport};
use super::vectorizer::TfIdfVectorizer;
use crate::config::ThemeConfig;
use crate::error::ClusterError;
use crate::models::Comment;

/// Name of the single bucket produced for degenerate input.
pub const GENERAL_DISCUSSION: &str = "💬 General Discussion";

const FALLBACK_KEYWORDS: &[&str] = &["discussion", "comments"];

const POSITIVE_WORDS: &[&str] = &["good", "great", "love", "amazing", "perfect", "excellent"];
const NEGATIVE_WORDS: &[&str] = &["bad", "hate", "terrible", "awful", "worst", "horrible"];

/// Keyword category for a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeCategory {
    Support,
    Criticism,
    Question,
    Technical,
    Personal,
    Humor,
    News,
    Debate,
    Suggestion,
    /// Catch-all when no category keyword matches
    General,
}

/// Categories in scoring order. Among equal non-zero scores the earlier one wins.
pub const CATEGORY_TABLE: &[ThemeCategory] = &[
    ThemeCategory::Support,
    ThemeCategory::Criticism,
    ThemeCategory::Question,
    ThemeCategory::Technical,
    ThemeCategory::Personal,
    ThemeCategory::Humor,
    ThemeCategory::News,
    ThemeCategory::Debate,
    ThemeCategory::Suggestion,
];

impl ThemeCategory {
    pub fn key(&self) -> &'static str {
        match self {
            ThemeCategory::Support => "support",
            ThemeCategory::Criticism => "criticism",
            ThemeCategory::Question => "question",
            ThemeCategory::Technical => "technical",
            ThemeCategory::Personal => "personal",
            ThemeCategory::Humor => "humor",
            ThemeCategory::News => "news",
            ThemeCategory::Debate => "debate",
            ThemeCategory::Suggestion => "suggestion",
            ThemeCategory::General => "general",
        }
    }

    /// Lower-case keywords and phrases matched as substrings.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ThemeCategory::Support => &[
                "great", "amazing", "awesome", "love", "perfect", "excellent", "fantastic", "wonderful",
            ],
            ThemeCategory::Criticism => &[
                "bad", "terrible", "awful", "hate", "worst", "horrible", "disgusting", "stupid",
            ],
            ThemeCategory::Question => &[
                "how", "what", "why", "when", "where", "which", "can", "could", "would",
            ],
            ThemeCategory::Technical => &[
                "code", "api", "bug", "feature", "update", "version", "system", "error",
            ],
            ThemeCategory::Personal => &[
                "i", "me", "my", "myself", "experience", "story", "happened", "feel",
            ],
            ThemeCategory::Humor => &["lol", "haha", "funny", "joke", "hilarious", "😂", "🤣", "laugh"],
            ThemeCategory::News => &[
                "breaking", "report", "announced", "update", "news", "official", "confirmed",
            ],
            ThemeCategory::Debate => &[
                "disagree", "wrong", "argue", "debate", "opinion", "think", "believe",
            ],
            ThemeCategory::Suggestion => &[
                "should", "could", "suggest", "recommend", "idea", "proposal", "maybe",
            ],
            ThemeCategory::General => &[],
        }
    }

    pub fn emoji(&self) -> Option<&'static str> {
        match self {
            ThemeCategory::Support => Some("👍"),
            ThemeCategory::Criticism => Some("👎"),
            ThemeCategory::Question => Some("❓"),
            ThemeCategory::Technical => Some("⚙️"),
            ThemeCategory::Personal => Some("👤"),
            ThemeCategory::Humor => Some("😂"),
            ThemeCategory::News => Some("📰"),
            ThemeCategory::Debate => Some("⚔️"),
            ThemeCategory::Suggestion => Some("💡"),
            ThemeCategory::General => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThemeCategory::Support => "Positive Feedback",
            ThemeCategory::Criticism => "Critical Comments",
            ThemeCategory::Question => "Questions & Inquiries",
            ThemeCategory::Technical => "Technical Discussion",
            ThemeCategory::Personal => "Personal Experiences",
            ThemeCategory::Humor => "Humor & Jokes",
            ThemeCategory::News => "News & Updates",
            ThemeCategory::Debate => "Debates & Arguments",
            ThemeCategory::Suggestion => "Suggestions & Ideas",
            ThemeCategory::General => "General Discussion",
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.emoji().unwrap_or("💬"), self.label())
    }

    pub fn from_key(key: &str) -> Option<Self> {
        CATEGORY_TABLE
            .iter()
            .chain(std::iter::once(&ThemeCategory::General))
            .find(|c| c.key() == key)
            .copied()
    }
}

impl fmt::Display for ThemeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Display name for a category key; unknown keys become `💬 {Title}`.
pub fn display_name_for(key: &str) -> String {
    match ThemeCategory::from_key(key) {
        Some(category) => category.display_name(),
        None => format!("💬 {}", title_case(key)),
    }
}

fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn count_present(text_lower: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| text_lower.contains(*w)).count()
}

/// Assign one comment text to a category: strictly highest keyword score,
/// first in table order among equals, `General` when nothing matches.
pub fn classify_by_keywords(text: &str) -> ThemeCategory {
    let lower = text.to_lowercase();
    let mut best = ThemeCategory::General;
    let mut best_score = 0;

    for category in CATEGORY_TABLE {
        let score = count_present(&lower, category.keywords());
        if score > best_score {
            best_score = score;
            best = *category;
        }
    }

    best
}

/// Positive/negative/neutral by comparing keyword hit counts; ties are neutral.
pub fn keyword_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let pos = count_present(&lower, POSITIVE_WORDS);
    let neg = count_present(&lower, NEGATIVE_WORDS);

    if pos > neg {
        Sentiment::Positive
    } else if neg > pos {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// One k-means cluster, numbered from 1.
#[derive(Debug, Clone)]
struct ClusterTheme {
    number: usize,
    members: Vec<usize>,
    keywords: Vec<String>,
}

/// Groups comments into named themes.
#[derive(Debug, Clone)]
pub struct ThemeClusteringEngine {
    config: ThemeConfig,
}

impl Default for ThemeClusteringEngine {
    fn default() -> Self {
        Self::new(ThemeConfig::default())
    }
}

impl ThemeClusteringEngine {
    pub fn new(config: ThemeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    /// Theme a comment set. Never fails: degenerate input and internal
    /// inconsistencies both collapse to the single general-discussion bucket.
    pub fn analyze(&self, comments: &[Comment]) -> ThemeReport {
        if comments.len() < 2 {
            return self.single_theme(comments);
        }

        let (texts, valid): (Vec<String>, Vec<&Comment>) = comments
            .iter()
            .map(|c| (normalize(&c.body), c))
            .filter(|(text, _)| token_count(text) >= self.config.min_comment_tokens)
            .unzip();

        if texts.len() < 2 {
            debug!(
                input = comments.len(),
                surviving = texts.len(),
                "Too few substantial comments for theming"
            );
            if valid.is_empty() {
                return self.single_theme(comments);
            }
            let survivors: Vec<Comment> = valid.into_iter().cloned().collect();
            return self.single_theme(&survivors);
        }

        match self.build_report(&texts, &valid) {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Theme analysis failed, using single theme");
                let survivors: Vec<Comment> = valid.into_iter().cloned().collect();
                self.single_theme(&survivors)
            }
        }
    }

    fn build_report(&self, texts: &[String], comments: &[&Comment]) -> Result<ThemeReport, ClusterError> {
        let clusters = match self.cluster_comments(texts) {
            Ok(clusters) => clusters,
            Err(e) => {
                warn!(error = %e, "Clustering produced no themes");
                Vec::new()
            }
        };
        let partition = self.partition_by_keywords(texts);

        let mut buckets: Vec<ThemeBucket> = Vec::new();
        for (category, members) in &partition {
            if members.is_empty() {
                continue;
            }
            buckets.push(self.enrich(
                display_name_for(category.key()),
                BucketSource::Keyword { category: *category },
                members.iter().map(|&i| comments[i].clone()).collect(),
                category.keywords().iter().map(|k| k.to_string()).collect(),
            ));
        }

        let placed: usize = buckets.iter().map(|b| b.len()).sum();
        let distinct: BTreeSet<usize> = partition.iter().flat_map(|(_, m)| m.iter().copied()).collect();
        if placed != comments.len() || distinct.len() != comments.len() {
            return Err(ClusterError::Degenerate(format!(
                "keyword partition placed {} of {} comments",
                placed,
                comments.len()
            )));
        }

        for cluster in &clusters {
            if cluster.members.len() < self.config.min_cluster_members {
                continue;
            }
            let name = format!("📊 Theme {}", cluster.number);
            if buckets.iter().any(|b| b.name == name) {
                continue;
            }
            buckets.push(self.enrich(
                name,
                BucketSource::Cluster { theme: cluster.number },
                cluster.members.iter().map(|&i| comments[i].clone()).collect(),
                cluster.keywords.clone(),
            ));
        }

        let mut tags: Vec<ClusterTag> = comments
            .iter()
            .map(|c| ClusterTag {
                comment_id: c.id.clone(),
                theme: None,
            })
            .collect();
        for cluster in &clusters {
            for &i in &cluster.members {
                tags[i].theme = Some(cluster.number);
            }
        }

        info!(
            comments = comments.len(),
            keyword_buckets = partition.len(),
            clusters = clusters.len(),
            buckets = buckets.len(),
            "Theme analysis complete"
        );

        Ok(ThemeReport {
            buckets,
            cluster_tags: tags,
        })
    }

    /// Categories in order of first appearance with their member indices.
    fn partition_by_keywords(&self, texts: &[String]) -> Vec<(ThemeCategory, Vec<usize>)> {
        let mut partition: Vec<(ThemeCategory, Vec<usize>)> = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let category = classify_by_keywords(text);
            match partition.iter_mut().find(|(c, _)| *c == category) {
                Some((_, members)) => members.push(i),
                None => partition.push((category, vec![i])),
            }
        }
        partition
    }

    /// TF-IDF + k-means over the surviving texts. The vectorizer and model are
    /// local to this call.
    fn cluster_comments(&self, texts: &[String]) -> Result<Vec<ClusterTheme>, ClusterError> {
        let vectorizer = TfIdfVectorizer::new(self.config.max_features, self.config.max_df);
        let matrix = vectorizer.fit_transform(texts)?;

        // max then min so inverted bounds resolve to max_clusters
        let k = (texts.len() / 3)
            .max(self.config.min_clusters)
            .min(self.config.max_clusters);
        debug!(texts = texts.len(), vocabulary = matrix.vocabulary.len(), k, "Clustering comments");

        let fit = KMeans::new(k, self.config.n_init, self.config.max_iter, self.config.seed)
            .fit(&matrix.rows)?;

        // Themes in order of first appearance, numbered by cluster index.
        let mut themes: Vec<ClusterTheme> = Vec::new();
        for (i, &label) in fit.labels.iter().enumerate() {
            match themes.iter_mut().find(|t| t.number == label + 1) {
                Some(theme) => theme.members.push(i),
                None => themes.push(ClusterTheme {
                    number: label + 1,
                    members: vec![i],
                    keywords: Vec::new(),
                }),
            }
        }

        for theme in &mut themes {
            let centroid = &fit.centroids[theme.number - 1];
            let mut weighted: Vec<(usize, f64)> = centroid
                .iter()
                .copied()
                .enumerate()
                .filter(|(_, w)| *w > 0.0)
                .collect();
            weighted.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.0.cmp(&b.0))
            });
            theme.keywords = weighted
                .into_iter()
                .take(self.config.keywords_per_theme)
                .map(|(j, _)| matrix.vocabulary[j].clone())
                .collect();
        }

        Ok(themes)
    }

    /// Attach the average score and keyword sentiment tally.
    fn enrich(
        &self,
        name: String,
        source: BucketSource,
        comments: Vec<Comment>,
        keywords: Vec<String>,
    ) -> ThemeBucket {
        let avg_score = if comments.is_empty() {
            0.0
        } else {
            comments.iter().map(|c| c.score as f64).sum::<f64>() / comments.len() as f64
        };

        let mut tally = SentimentTally::default();
        for comment in &comments {
            match keyword_sentiment(&comment.body) {
                Sentiment::Positive => tally.positive += 1,
                Sentiment::Negative => tally.negative += 1,
                Sentiment::Neutral => tally.neutral += 1,
            }
        }

        ThemeBucket {
            name,
            source,
            comments,
            keywords,
            sentiment_summary: tally,
            avg_score,
        }
    }

    fn single_theme(&self, comments: &[Comment]) -> ThemeReport {
        ThemeReport {
            buckets: vec![ThemeBucket {
                name: GENERAL_DISCUSSION.to_string(),
                source: BucketSource::Fallback,
                comments: comments.to_vec(),
                keywords: FALLBACK_KEYWORDS.iter().map(|k| k.to_string()).collect(),
                sentiment_summary: SentimentTally {
                    neutral: comments.len(),
                    ..SentimentTally::default()
                },
                avg_score: 0.0,
            }],
            cluster_tags: comments
                .iter()
                .map(|c| ClusterTag {
                    comment_id: c.id.clone(),
                    theme: None,
                })
                .collect(),
        }
    }
}

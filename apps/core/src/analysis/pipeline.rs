//! Content analysis pipeline.
//!
//! Per post: normalize, classify, extract entities, measure readability and
//! engagement. Per comment set: classify the first `max_comments` substantial
//! comments over a bounded pool, restore input order, then theme them.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::classifier::{classify_or_default, Classifier, NEGATIVE, NEUTRAL, POSITIVE};
use super::entities::EntityExtractor;
use super::helpers::time_ago;
use super::lexicon::{LexiconEmotionClassifier, LexiconSentimentClassifier};
use super::metrics::MetricsCalculator;
use super::normalizer::{normalize, token_count};
use super::record::{AggregateResult, AnalysisRecord, CommentAnalysis, ThemeReport};
use super::remote::{ClassifierKind, HttpClassifier};
use super::themes::ThemeClusteringEngine;
use crate::config::AnalyzerConfig;
use crate::error::AnalysisError;
use crate::models::{Comment, Post};

/// Orchestrates one post and its comments into an [`AggregateResult`].
///
/// Holds no per-invocation state; a single instance can serve concurrent calls.
pub struct ContentAnalysisPipeline {
    sentiment: Arc<dyn Classifier>,
    emotion: Arc<dyn Classifier>,
    config: AnalyzerConfig,
    extractor: EntityExtractor,
    metrics: MetricsCalculator,
    themes: ThemeClusteringEngine,
}

impl ContentAnalysisPipeline {
    pub fn new(
        sentiment: Arc<dyn Classifier>,
        emotion: Arc<dyn Classifier>,
        config: AnalyzerConfig,
    ) -> Self {
        let themes = ThemeClusteringEngine::new(config.themes.clone());
        Self {
            sentiment,
            emotion,
            config,
            extractor: EntityExtractor::new(),
            metrics: MetricsCalculator::new(),
            themes,
        }
    }

    /// Build classifiers from configuration: remote endpoints when configured,
    /// the offline lexicons otherwise.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        let timeout = Duration::from_secs(config.classify_timeout_secs);

        let sentiment: Arc<dyn Classifier> = match &config.sentiment_endpoint {
            Some(endpoint) => Arc::new(HttpClassifier::new(
                "sentiment",
                endpoint.clone(),
                config.inference_token.clone(),
                ClassifierKind::Sentiment,
                timeout,
            )?),
            None => Arc::new(LexiconSentimentClassifier::new()),
        };

        let emotion: Arc<dyn Classifier> = match &config.emotion_endpoint {
            Some(endpoint) => Arc::new(HttpClassifier::new(
                "emotion",
                endpoint.clone(),
                config.inference_token.clone(),
                ClassifierKind::Emotion,
                timeout,
            )?),
            None => Arc::new(LexiconEmotionClassifier::new()),
        };

        info!(
            sentiment = sentiment.name(),
            emotion = emotion.name(),
            "Classifiers configured"
        );

        Ok(Self::new(sentiment, emotion, config))
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyse one post and its top-level comments.
    #[instrument(skip_all, fields(platform = %post.platform(), comments = comments.len()))]
    pub async fn analyze(
        &self,
        post: &Post,
        comments: &[Comment],
    ) -> Result<AggregateResult, AnalysisError> {
        let post_analysis = self.analyze_text(&post.text()).await?;
        let engagement = self.metrics.engagement(post);
        let location = match post {
            Post::Twitter(tweet) => self.metrics.location(&tweet.author.location),
            Post::Reddit(_) => None,
        };

        let comment_analyses = self.analyze_comments(comments).await?;

        let themes = if comment_analyses.is_empty() {
            ThemeReport::default()
        } else {
            let retained: Vec<Comment> = comment_analyses
                .iter()
                .map(|a| comments[a.index].clone())
                .collect();
            self.themes.analyze(&retained)
        };

        let sentiment_distribution = sentiment_distribution(&comment_analyses);

        info!(
            processed = comment_analyses.len(),
            themes = themes.len(),
            "Post analysis complete"
        );

        Ok(AggregateResult {
            platform: post.platform(),
            post: post.clone(),
            post_analysis,
            engagement,
            location,
            comments: comment_analyses,
            themes,
            sentiment_distribution,
            processed_at: Utc::now(),
        })
    }

    /// Classify and measure one unit of text. Readability uses the normalized
    /// text, entities the raw text.
    pub async fn analyze_text(&self, raw: &str) -> Result<AnalysisRecord, AnalysisError> {
        let cleaned = normalize(raw);

        let (sentiment, emotion) = tokio::try_join!(
            classify_or_default(self.sentiment.as_ref(), &cleaned),
            classify_or_default(self.emotion.as_ref(), &cleaned),
        )?;

        let readability = self.metrics.readability(&cleaned);
        let entities = self.extractor.extract(raw);

        Ok(AnalysisRecord::new(
            cleaned,
            sentiment,
            emotion,
            readability,
            entities,
        ))
    }

    /// Classify qualifying comments concurrently. Results come back in input
    /// order; comments that time out are dropped.
    #[instrument(skip_all, fields(comments = comments.len()))]
    pub async fn analyze_comments(
        &self,
        comments: &[Comment],
    ) -> Result<Vec<CommentAnalysis>, AnalysisError> {
        let min_tokens = self.config.themes.min_comment_tokens;
        let candidates: Vec<(usize, &Comment)> = comments
            .iter()
            .take(self.config.max_comments)
            .enumerate()
            .filter(|(_, c)| token_count(&normalize(&c.body)) >= min_tokens)
            .collect();

        debug!(
            total = comments.len(),
            candidates = candidates.len(),
            "Classifying comments"
        );

        let budget = Duration::from_secs(self.config.classify_timeout_secs);
        let outcomes: Vec<_> = stream::iter(candidates)
            .map(|(index, comment)| async move {
                let outcome = tokio::time::timeout(budget, self.analyze_text(&comment.body)).await;
                (index, comment, outcome)
            })
            .buffer_unordered(self.config.classify_concurrency)
            .collect()
            .await;

        let mut analyses = Vec::with_capacity(outcomes.len());
        for (index, comment, outcome) in outcomes {
            match outcome {
                Ok(Ok(analysis)) => analyses.push(CommentAnalysis {
                    index,
                    id: comment.id.clone(),
                    text: comment.body.clone(),
                    author: comment.author.clone(),
                    score: comment.score,
                    created_utc: comment.created_utc,
                    time_ago: time_ago(comment.created_utc),
                    analysis,
                }),
                Ok(Err(e)) => return Err(e),
                Err(_) => {
                    warn!(
                        comment_id = %comment.id,
                        timeout_secs = self.config.classify_timeout_secs,
                        "Comment classification timed out, excluding"
                    );
                }
            }
        }

        analyses.sort_by_key(|a| a.index);
        Ok(analyses)
    }
}

/// Count comments per top-level sentiment label. The three standard labels
/// are always present; other labels get an entry on first sight.
pub fn sentiment_distribution(analyses: &[CommentAnalysis]) -> BTreeMap<String, usize> {
    let mut distribution: BTreeMap<String, usize> = [POSITIVE, NEGATIVE, NEUTRAL]
        .iter()
        .map(|l| (l.to_string(), 0))
        .collect();

    for analysis in analyses {
        *distribution
            .entry(analysis.analysis.sentiment.sentiment.clone())
            .or_insert(0) += 1;
    }

    distribution
}

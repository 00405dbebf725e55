//! Runtime configuration.
//!
//! Values come from the environment (optionally seeded from a `.env` file) with
//! defaults matching the production pipeline. Every field is validated before use.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::error::AnalysisError;

const ENV_PREFIX: &str = "SOCIAL_ANALYZER_";

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" | "bunyan" => Ok(LogFormat::Json),
            other => Err(AnalysisError::Config(format!("unknown log format: {}", other))),
        }
    }
}

/// Parameters of the theme clustering engine.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_cluster_bounds"))]
pub struct ThemeConfig {
    /// Seed for centroid initialisation. Pinned so fixtures are reproducible.
    pub seed: u64,
    /// Vocabulary cap for the TF-IDF model.
    #[validate(range(min = 1, max = 10000))]
    pub max_features: usize,
    /// Terms present in a larger fraction of documents than this are dropped.
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_df: f32,
    #[validate(range(min = 1))]
    pub min_clusters: usize,
    #[validate(range(min = 1, max = 50))]
    pub max_clusters: usize,
    #[validate(range(min = 1, max = 50))]
    pub keywords_per_theme: usize,
    /// Clusters smaller than this are not surfaced as overlay buckets.
    #[validate(range(min = 1))]
    pub min_cluster_members: usize,
    /// Number of independent k-means restarts; the lowest inertia wins.
    #[validate(range(min = 1, max = 100))]
    pub n_init: usize,
    #[validate(range(min = 1, max = 10000))]
    pub max_iter: usize,
    /// Minimum normalized token count for a comment to be classified and themed.
    #[validate(range(min = 0, max = 100))]
    pub min_comment_tokens: usize,
}

fn validate_cluster_bounds(config: &ThemeConfig) -> Result<(), ValidationError> {
    if config.min_clusters > config.max_clusters {
        return Err(ValidationError::new("min_clusters_exceeds_max_clusters"));
    }
    Ok(())
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_features: 100,
            max_df: 0.8,
            min_clusters: 2,
            max_clusters: 6,
            keywords_per_theme: 5,
            min_cluster_members: 2,
            n_init: 10,
            max_iter: 300,
            min_comment_tokens: 3,
        }
    }
}

/// Top-level configuration for the content analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnalyzerConfig {
    /// Only the first `max_comments` comments (input order) are analysed.
    #[validate(range(min = 1, max = 1000))]
    pub max_comments: usize,
    /// Upper bound on in-flight classifier calls.
    #[validate(range(min = 1, max = 256))]
    pub classify_concurrency: usize,
    /// Per-comment classification budget; late comments are excluded.
    #[validate(range(min = 1, max = 3600))]
    pub classify_timeout_secs: u64,
    pub log_format: LogFormat,
    #[validate(url)]
    pub sentiment_endpoint: Option<String>,
    #[validate(url)]
    pub emotion_endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub inference_token: Option<String>,
    #[validate(nested)]
    pub themes: ThemeConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_comments: 50,
            classify_concurrency: 8,
            classify_timeout_secs: 30,
            log_format: LogFormat::Pretty,
            sentiment_endpoint: None,
            emotion_endpoint: None,
            inference_token: None,
            themes: ThemeConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, AnalysisError> {
        // A missing .env file is normal outside development.
        let _ = dotenv::dotenv();

        let defaults = Self::default();
        let theme_defaults = ThemeConfig::default();

        let config = Self {
            max_comments: read_var("MAX_COMMENTS", defaults.max_comments)?,
            classify_concurrency: read_var("CLASSIFY_CONCURRENCY", defaults.classify_concurrency)?,
            classify_timeout_secs: read_var("CLASSIFY_TIMEOUT_SECS", defaults.classify_timeout_secs)?,
            log_format: read_var("LOG_FORMAT", defaults.log_format)?,
            sentiment_endpoint: read_optional("SENTIMENT_ENDPOINT"),
            emotion_endpoint: read_optional("EMOTION_ENDPOINT"),
            inference_token: read_optional("INFERENCE_TOKEN"),
            themes: ThemeConfig {
                seed: read_var("CLUSTER_SEED", theme_defaults.seed)?,
                max_features: read_var("MAX_FEATURES", theme_defaults.max_features)?,
                max_df: read_var("MAX_DF", theme_defaults.max_df)?,
                min_clusters: read_var("MIN_CLUSTERS", theme_defaults.min_clusters)?,
                max_clusters: read_var("MAX_CLUSTERS", theme_defaults.max_clusters)?,
                keywords_per_theme: read_var(
                    "KEYWORDS_PER_THEME",
                    theme_defaults.keywords_per_theme,
                )?,
                min_cluster_members: read_var(
                    "MIN_CLUSTER_MEMBERS",
                    theme_defaults.min_cluster_members,
                )?,
                n_init: read_var("CLUSTER_RESTARTS", theme_defaults.n_init)?,
                max_iter: read_var("CLUSTER_MAX_ITER", theme_defaults.max_iter)?,
                min_comment_tokens: read_var(
                    "MIN_COMMENT_TOKENS",
                    theme_defaults.min_comment_tokens,
                )?,
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn read_optional(key: &str) -> Option<String> {
    env::var(format!("{}{}", ENV_PREFIX, key))
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_var<T>(key: &str, default: T) -> Result<T, AnalysisError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match read_optional(key) {
        Some(raw) => raw.parse::<T>().map_err(|e| {
            AnalysisError::Config(format!("{}{}={:?}: {}", ENV_PREFIX, key, raw, e))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalyzerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_comments, 50);
        assert_eq!(config.themes.seed, 42);
        assert_eq!(config.themes.max_features, 100);
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("SOCIAL_ANALYZER_MAX_COMMENTS", Some("20")),
                ("SOCIAL_ANALYZER_CLUSTER_SEED", Some("7")),
                ("SOCIAL_ANALYZER_LOG_FORMAT", Some("json")),
                ("SOCIAL_ANALYZER_MIN_COMMENT_TOKENS", Some("1")),
                ("SOCIAL_ANALYZER_SENTIMENT_ENDPOINT", Some("http://localhost:9000/sentiment")),
            ],
            || {
                let config = AnalyzerConfig::from_env().expect("config should load");
                assert_eq!(config.max_comments, 20);
                assert_eq!(config.themes.seed, 7);
                assert_eq!(config.log_format, LogFormat::Json);
                assert_eq!(config.themes.min_comment_tokens, 1);
                assert_eq!(
                    config.sentiment_endpoint.as_deref(),
                    Some("http://localhost:9000/sentiment")
                );
            },
        );
    }

    #[test]
    fn test_malformed_value_is_config_error() {
        temp_env::with_var("SOCIAL_ANALYZER_MAX_COMMENTS", Some("lots"), || {
            let err = AnalyzerConfig::from_env().unwrap_err();
            assert!(matches!(err, AnalysisError::Config(_)));
        });
    }

    #[test]
    fn test_inverted_cluster_bounds_rejected() {
        let config = ThemeConfig {
            min_clusters: 8,
            max_clusters: 3,
            ..ThemeConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}

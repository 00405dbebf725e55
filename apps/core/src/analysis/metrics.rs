//! Readability and engagement metrics.
//!
//! Both are total functions: empty text and zero audiences have defined
//! results instead of division errors.

use serde::{Deserialize, Serialize};

use super::helpers::round_to;
use crate::models::{Post, RedditPost, TwitterPost};

/// Words read per minute when estimating reading time.
const WORDS_PER_MINUTE: usize = 200;

/// Readability statistics for one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readability {
    /// Whitespace-delimited tokens
    pub word_count: usize,
    /// Count of `.`, `!` and `?`, floored at 1
    pub sentence_count: usize,
    /// Rounded to one decimal
    pub avg_words_per_sentence: f64,
    pub character_count: usize,
    /// Minutes, floored at 1
    pub reading_time: usize,
}

/// Platform-specific interaction statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum Engagement {
    Twitter {
        likes: u64,
        retweets: u64,
        replies: u64,
        quotes: u64,
        total_engagement: u64,
        followers: u64,
        /// Percent of followers, two decimals; 0.0 without followers
        engagement_rate: f64,
    },
    Reddit {
        score: i64,
        upvote_ratio: f64,
        num_comments: u64,
        total_awards: u64,
    },
}

/// Author location details (tweets only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub raw: String,
    pub processed: String,
    pub has_location: bool,
}

/// Derives readability and engagement statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Count sentence terminators, at least one.
    fn count_sentences(&self, text: &str) -> usize {
        text.chars()
            .filter(|c| matches!(c, '.' | '!' | '?'))
            .count()
            .max(1)
    }

    pub fn readability(&self, text: &str) -> Readability {
        let word_count = text.split_whitespace().count();
        let sentence_count = self.count_sentences(text);

        Readability {
            word_count,
            sentence_count,
            avg_words_per_sentence: round_to(word_count as f64 / sentence_count as f64, 1),
            character_count: text.chars().count(),
            reading_time: (word_count / WORDS_PER_MINUTE).max(1),
        }
    }

    /// `(engagement / followers) * 100` rounded to two decimals, 0.0 when nobody follows.
    pub fn engagement_rate(&self, total_engagement: u64, followers: u64) -> f64 {
        if followers == 0 {
            return 0.0;
        }
        round_to((total_engagement as f64 / followers as f64) * 100.0, 2)
    }

    pub fn engagement(&self, post: &Post) -> Engagement {
        match post {
            Post::Twitter(tweet) => self.tweet_engagement(tweet),
            Post::Reddit(submission) => self.reddit_engagement(submission),
        }
    }

    fn tweet_engagement(&self, tweet: &TwitterPost) -> Engagement {
        let m = &tweet.metrics;
        let total_engagement = m.like_count + m.retweet_count + m.reply_count + m.quote_count;
        let followers = tweet.author.followers_count;

        Engagement::Twitter {
            likes: m.like_count,
            retweets: m.retweet_count,
            replies: m.reply_count,
            quotes: m.quote_count,
            total_engagement,
            followers,
            engagement_rate: self.engagement_rate(total_engagement, followers),
        }
    }

    fn reddit_engagement(&self, submission: &RedditPost) -> Engagement {
        Engagement::Reddit {
            score: submission.score,
            upvote_ratio: submission.upvote_ratio,
            num_comments: submission.num_comments,
            total_awards: submission.total_awards_received,
        }
    }

    pub fn location(&self, raw: &str) -> Option<LocationInfo> {
        if raw.is_empty() {
            return None;
        }
        let processed = raw.trim().to_string();
        Some(LocationInfo {
            raw: raw.to_string(),
            has_location: !processed.is_empty(),
            processed,
        })
    }
}

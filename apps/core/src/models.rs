use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::AnalysisError;

/// Author sentinel used when the platform reports a removed account.
pub const DELETED_AUTHOR: &str = "[deleted]";

fn deleted_author() -> String {
    DELETED_AUTHOR.to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

/// Source platform of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Reddit,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Twitter => write!(f, "twitter"),
            Platform::Reddit => write!(f, "reddit"),
        }
    }
}

/// Public interaction counters of a tweet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweetMetrics {
    pub like_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
    pub quote_count: u64,
}

/// Author profile attached to a tweet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterAuthor {
    pub username: String,
    pub name: String,
    pub verified: bool,
    pub followers_count: u64,
    pub location: String,
}

impl Default for TwitterAuthor {
    fn default() -> Self {
        Self {
            username: "Unknown".to_string(),
            name: "Unknown".to_string(),
            verified: false,
            followers_count: 0,
            location: String::new(),
        }
    }
}

/// A tweet as delivered by the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub author: TwitterAuthor,
    #[serde(default)]
    pub metrics: TweetMetrics,
}

/// A Reddit submission as delivered by the content source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPost {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default = "deleted_author")]
    pub author: String,
    #[serde(default)]
    pub is_submitter: bool,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub upvote_ratio: f64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub total_awards_received: u64,
    #[serde(default)]
    pub created_utc: i64,
}

/// One post handed to the pipeline. Read-only for the lifetime of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum Post {
    Twitter(TwitterPost),
    Reddit(RedditPost),
}

impl Post {
    pub fn platform(&self) -> Platform {
        match self {
            Post::Twitter(_) => Platform::Twitter,
            Post::Reddit(_) => Platform::Reddit,
        }
    }

    /// Raw analysable text. Reddit joins title and body with a newline.
    pub fn text(&self) -> String {
        match self {
            Post::Twitter(tweet) => tweet.text.clone(),
            Post::Reddit(submission) => format!("{}\n{}", submission.title, submission.selftext)
                .trim()
                .to_string(),
        }
    }
}

/// A discussion comment. Owned by the caller; the pipeline only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default = "deleted_author")]
    pub author: String,
    #[serde(default)]
    pub created_utc: i64,
    /// Nested replies are carried through but never analysed.
    #[serde(default)]
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn new(id: impl Into<String>, body: impl Into<String>, score: i64) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
            score,
            author: deleted_author(),
            created_utc: 0,
            replies: Vec::new(),
        }
    }
}

/// A post with its already-fetched comments, as read from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub post: Post,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl AnalysisInput {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }
}

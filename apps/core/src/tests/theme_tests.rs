//! Theme Clustering Tests
//!
//! Properties of the keyword partition and the cluster overlay.

use crate::analysis::record::BucketSource;
use crate::analysis::themes::{ThemeCategory, ThemeClusteringEngine, GENERAL_DISCUSSION};
use crate::config::ThemeConfig;
use crate::models::Comment;
use std::collections::BTreeSet;

fn comments(bodies: &[&str]) -> Vec<Comment> {
    bodies
        .iter()
        .enumerate()
        .map(|(i, body)| Comment::new(format!("c{}", i), *body, i as i64))
        .collect()
}

fn discussion() -> Vec<Comment> {
    comments(&[
        "This update is amazing and the new layout looks great",
        "The api keeps throwing an error since the last version",
        "How do you enable the dark mode setting on mobile",
        "lol this is the funniest thing posted all week haha",
        "You should add an export button to the settings page",
        "Breaking news, the team announced an official release date",
        "Amazing work on the performance improvements, love it",
        "The bug with the login system is still there after the update",
        "Why does the sync take so long on slower connections",
        "I disagree with the change to pricing, it feels wrong",
        "Maybe consider a cheaper plan for students and hobbyists",
        "terrible support response, waited three days for nothing",
    ])
}

#[test]
fn test_repeated_criticism_lands_in_one_bucket() {
    let input = comments(&[
        "the food was terrible tonight",
        "terrible service at the counter",
        "the delivery was terrible again",
        "terrible packaging and terrible labels",
        "the ending was terrible too",
    ]);

    let report = ThemeClusteringEngine::default().analyze(&input);

    let partition: Vec<_> = report.partition().collect();
    assert_eq!(partition.len(), 1);
    let bucket = partition[0];
    assert_eq!(bucket.name, "👎 Critical Comments");
    assert_eq!(
        bucket.source,
        BucketSource::Keyword {
            category: ThemeCategory::Criticism
        }
    );
    assert_eq!(bucket.len(), 5);
    assert_eq!(bucket.sentiment_summary.negative, 5);
    assert_eq!(bucket.sentiment_summary.positive, 0);
    // Scores are 0..=4
    assert!((bucket.avg_score - 2.0).abs() < 1e-9);
}

#[test]
fn test_single_comment_falls_back() {
    let input = comments(&["just one comment with enough words"]);
    let report = ThemeClusteringEngine::default().analyze(&input);

    assert!(report.is_fallback());
    let bucket = &report.buckets[0];
    assert_eq!(bucket.name, GENERAL_DISCUSSION);
    assert_eq!(bucket.comments, input);
    assert_eq!(bucket.keywords, vec!["discussion", "comments"]);
    assert_eq!(bucket.sentiment_summary.neutral, 1);
    assert_eq!(bucket.avg_score, 0.0);
}

#[test]
fn test_no_survivors_fall_back_to_originals() {
    let input = comments(&["ok", "nice one"]);
    let report = ThemeClusteringEngine::default().analyze(&input);

    assert!(report.is_fallback());
    assert_eq!(report.buckets[0].comments, input);
    assert_eq!(report.buckets[0].sentiment_summary.neutral, 2);
}

#[test]
fn test_single_survivor_falls_back_to_survivor() {
    let input = comments(&["ok", "this one has enough words to count"]);
    let report = ThemeClusteringEngine::default().analyze(&input);

    assert!(report.is_fallback());
    assert_eq!(report.buckets[0].comments, vec![input[1].clone()]);
}

#[test]
fn test_partition_covers_every_comment_once() {
    let input = discussion();
    let report = ThemeClusteringEngine::default().analyze(&input);

    let mut seen: Vec<String> = report
        .partition()
        .flat_map(|b| b.comments.iter().map(|c| c.id.clone()))
        .collect();
    assert_eq!(seen.len(), input.len());

    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), input.len());

    let expected: BTreeSet<String> = input.iter().map(|c| c.id.clone()).collect();
    let actual: BTreeSet<String> = seen.into_iter().collect();
    assert_eq!(actual, expected);
}

#[test]
fn test_keyword_buckets_precede_overlays() {
    let input = discussion();
    let report = ThemeClusteringEngine::default().analyze(&input);

    let first_overlay = report.buckets.iter().position(|b| b.is_overlay());
    if let Some(pos) = first_overlay {
        assert!(report.buckets[pos..].iter().all(|b| b.is_overlay()));
    }

    for bucket in report.overlays() {
        assert!(bucket.name.starts_with("📊 Theme "));
        assert!(bucket.len() >= 2);
        assert!(bucket.keywords.len() <= 5);
    }
}

#[test]
fn test_cluster_tags_follow_input_order() {
    let input = discussion();
    let report = ThemeClusteringEngine::default().analyze(&input);

    let ids: Vec<&str> = report.cluster_tags.iter().map(|t| t.comment_id.as_str()).collect();
    let expected: Vec<&str> = input.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, expected);

    for bucket in report.overlays() {
        if let BucketSource::Cluster { theme } = bucket.source {
            for comment in &bucket.comments {
                let tag = report
                    .cluster_tags
                    .iter()
                    .find(|t| t.comment_id == comment.id)
                    .unwrap();
                assert_eq!(tag.theme, Some(theme));
            }
        }
    }
}

#[test]
fn test_analysis_is_deterministic() {
    let input = discussion();
    let engine = ThemeClusteringEngine::default();
    assert_eq!(engine.analyze(&input), engine.analyze(&input));
}

#[test]
fn test_unmatched_comments_go_to_general() {
    let input = comments(&["zzz qqq xxx", "zzz yyy xxx"]);
    let report = ThemeClusteringEngine::default().analyze(&input);

    let partition: Vec<_> = report.partition().collect();
    assert_eq!(partition.len(), 1);
    assert_eq!(partition[0].name, "💬 General Discussion");
    assert_eq!(
        partition[0].source,
        BucketSource::Keyword {
            category: ThemeCategory::General
        }
    );
    assert_eq!(partition[0].len(), 2);
}

#[test]
fn test_custom_token_threshold() {
    let config = ThemeConfig {
        min_comment_tokens: 1,
        ..ThemeConfig::default()
    };
    let input = comments(&["great", "awful"]);
    let report = ThemeClusteringEngine::new(config).analyze(&input);

    assert!(!report.is_fallback());
    assert!(report.contains("👍 Positive Feedback"));
    assert!(report.contains("👎 Critical Comments"));
}

#[test]
fn test_inverted_cluster_bounds_use_max() {
    let config = ThemeConfig {
        min_clusters: 4,
        max_clusters: 2,
        ..ThemeConfig::default()
    };
    let input = discussion();
    let report = ThemeClusteringEngine::new(config).analyze(&input);

    let placed: usize = report.partition().map(|b| b.len()).sum();
    assert_eq!(placed, input.len());
    assert!(report
        .cluster_tags
        .iter()
        .all(|t| t.theme.map_or(true, |n| n <= 2)));
}

#[test]
fn test_clustering_failure_keeps_keyword_buckets() {
    // Every term occurs in every comment, so pruning leaves no vocabulary.
    let input = comments(&[
        "terrible service at the counter",
        "terrible service at the counter",
        "terrible service at the counter",
    ]);
    let report = ThemeClusteringEngine::default().analyze(&input);

    assert!(!report.is_fallback());
    assert!(report.contains("👎 Critical Comments"));
    assert_eq!(report.overlays().count(), 0);
    assert_eq!(report.cluster_tags.len(), 3);
    assert!(report.cluster_tags.iter().all(|t| t.theme.is_none()));
}

#[test]
fn test_stop_word_comments_keep_keyword_buckets() {
    let input = comments(&["what was it that we did", "it was what they were"]);
    let report = ThemeClusteringEngine::default().analyze(&input);

    assert!(!report.is_fallback());
    let placed: usize = report.partition().map(|b| b.len()).sum();
    assert_eq!(placed, 2);
    assert_eq!(report.overlays().count(), 0);
    assert!(report.cluster_tags.iter().all(|t| t.theme.is_none()));
}

//! TF-IDF vectorization.
//!
//! Fits a bounded unigram + bigram vocabulary on one set of documents and
//! returns L2-normalised TF-IDF rows. The model is a local value: nothing is
//! cached between fits.

use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use crate::error::ClusterError;

/// Word tokens of at least two characters.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid regex: token pattern"));

/// English stopwords removed before n-grams are built.
const STOPWORDS_EN: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "nor", "for", "yet", "so", "i", "you", "he", "she", "it",
    "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our", "their",
    "mine", "yours", "hers", "ours", "theirs", "this", "that", "these", "those", "who", "whom",
    "which", "what", "whose", "is", "am", "are", "was", "were", "be", "been", "being", "have",
    "has", "had", "having", "do", "does", "did", "doing", "will", "would", "shall", "should",
    "can", "could", "may", "might", "must", "in", "on", "at", "to", "from", "by", "with", "about",
    "against", "between", "into", "through", "during", "before", "after", "above", "below", "up",
    "down", "out", "off", "over", "under", "again", "further", "here", "there", "where", "when",
    "why", "how", "all", "each", "every", "both", "few", "more", "most", "other", "some", "any",
    "no", "not", "only", "own", "same", "than", "too", "very", "just", "also", "now", "then",
    "once", "always", "never", "if", "because", "as", "until", "while", "although", "though",
    "yes", "maybe", "of", "ve", "re", "ll", "don", "doesn", "didn", "isn", "aren", "wasn",
    "weren", "won", "wouldn", "shouldn", "couldn", "hasn", "haven", "hadn", "myself",
    "yourself", "itself", "ourselves", "themselves", "such", "get", "got", "really", "even",
];

/// Fitted TF-IDF model plus the transformed document matrix.
#[derive(Debug, Clone)]
pub struct TfIdfMatrix {
    /// Feature names, alphabetical; column `j` of every row is `vocabulary[j]`
    pub vocabulary: Vec<String>,
    /// One L2-normalised row per input document
    pub rows: Vec<Vec<f64>>,
}

/// TF-IDF vectorizer over unigrams and bigrams.
pub struct TfIdfVectorizer {
    stopwords: HashSet<&'static str>,
    max_features: usize,
    max_df: f32,
}

impl TfIdfVectorizer {
    pub fn new(max_features: usize, max_df: f32) -> Self {
        Self {
            stopwords: STOPWORDS_EN.iter().copied().collect(),
            max_features,
            max_df,
        }
    }

    /// Lowercased tokens with stopwords removed, then unigrams followed by bigrams.
    fn analyze(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = TOKEN_PATTERN
            .find_iter(&lower)
            .map(|m| m.as_str())
            .filter(|w| !self.stopwords.contains(w))
            .collect();

        let mut terms: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        terms.extend(words.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
        terms
    }

    /// Fit the vocabulary on `documents` and transform them.
    pub fn fit_transform(&self, documents: &[String]) -> Result<TfIdfMatrix, ClusterError> {
        let n_docs = documents.len();
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| self.analyze(d)).collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let mut seen: HashSet<&str> = HashSet::new();
            for term in terms {
                *corpus_frequency.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        if document_frequency.is_empty() {
            return Err(ClusterError::EmptyVocabulary);
        }

        let max_doc_count = self.max_df as f64 * n_docs as f64;
        let mut candidates: Vec<(&str, usize)> = corpus_frequency
            .iter()
            .filter(|(term, _)| document_frequency[*term] as f64 <= max_doc_count)
            .map(|(term, count)| (*term, *count))
            .collect();

        if candidates.is_empty() {
            return Err(ClusterError::NoTermsAfterPruning);
        }

        // Most frequent first, alphabetical among equals.
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        candidates.truncate(self.max_features);

        let mut vocabulary: Vec<String> = candidates.iter().map(|(t, _)| t.to_string()).collect();
        vocabulary.sort();
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        // Smoothed idf: ln((1 + n) / (1 + df)) + 1
        let idf: Vec<f64> = vocabulary
            .iter()
            .map(|t| {
                let df = document_frequency[t.as_str()] as f64;
                ((1.0 + n_docs as f64) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let rows = analyzed
            .iter()
            .map(|terms| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for term in terms {
                    if let Some(&col) = index.get(term.as_str()) {
                        *counts.entry(col).or_insert(0.0) += 1.0;
                    }
                }

                let mut row = vec![0.0; vocabulary.len()];
                for (col, tf) in counts {
                    row[col] = tf * idf[col];
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(TfIdfMatrix { vocabulary, rows })
    }
}

fn l2_normalize(row: &mut [f64]) {
    let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in row.iter_mut() {
            *v /= norm;
        }
    }
}

use std::io;
use thiserror::Error;

/// Crate-wide error type for the analysis pipeline.
///
/// Degenerate input never produces one of these: short comment sets, blank text
/// and clustering failures all have defined fallbacks. What remains are failures
/// of the external collaborators and of configuration.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A classifier failed at the resource level (network, model backend).
    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    /// Represents configuration-related errors (e.g., malformed environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Represents data validation errors (e.g., malformed JSON input).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents standard input/output errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors reported by a [`Classifier`](crate::analysis::Classifier) backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifierError {
    /// The model is not loaded or the service answered "unavailable".
    /// The pipeline substitutes the neutral default.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something that is not a label distribution.
    /// The pipeline substitutes the neutral default.
    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),

    /// The backend could not be reached. Surfaces to the caller.
    #[error("classifier transport failure: {0}")]
    Transport(String),
}

/// Numerical failures inside the clustering stage. Never leaves the theme engine.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("empty vocabulary; documents contain only stop words or short tokens")]
    EmptyVocabulary,

    #[error("after pruning, no terms remain")]
    NoTermsAfterPruning,

    #[error("{samples} samples cannot form {clusters} clusters")]
    NotEnoughSamples { samples: usize, clusters: usize },

    #[error("degenerate input: {0}")]
    Degenerate(String),
}

impl ClassifierError {
    /// Whether the pipeline should degrade to the neutral default instead of failing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClassifierError::Unavailable(_) | ClassifierError::InvalidResponse(_)
        )
    }
}

impl From<serde_json::Error> for AnalysisError {
    fn from(err: serde_json::Error) -> Self {
        AnalysisError::Validation(format!("JSON error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AnalysisError {
    fn from(err: validator::ValidationErrors) -> Self {
        AnalysisError::Config(format!("Validation errors: {}", err))
    }
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClassifierError::InvalidResponse(err.to_string())
        } else {
            ClassifierError::Transport(err.to_string())
        }
    }
}

//! Social Analyzer core: content analysis pipeline and theme clustering engine.

pub mod analysis;
pub mod config;
pub mod error;
pub mod models;
pub mod telemetry;

pub use analysis::{AggregateResult, ContentAnalysisPipeline, ThemeClusteringEngine, ThemeReport};
pub use config::{AnalyzerConfig, LogFormat, ThemeConfig};
pub use error::{AnalysisError, ClassifierError};
pub use models::{AnalysisInput, Comment, Platform, Post};

#[cfg(test)]
mod tests;

// Social Analyzer entry point
// Reads one post with its comments from a JSON file and prints the analysis.

use anyhow::{bail, Context};
use social_analyzer_core::telemetry::init_tracing;
use social_analyzer_core::{AnalysisInput, AnalyzerConfig, ContentAnalysisPipeline};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AnalyzerConfig::from_env().context("failed to load configuration")?;
    init_tracing("social-analyzer", config.log_format)?;

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: social-analyzer <input.json>");
    };

    let input = AnalysisInput::from_path(&path)
        .with_context(|| format!("failed to read analysis input from {}", path))?;
    info!(path = %path, comments = input.comments.len(), "Loaded input");

    let pipeline = ContentAnalysisPipeline::from_config(config)?;
    let result = match pipeline.analyze(&input.post, &input.comments).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Analysis failed");
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

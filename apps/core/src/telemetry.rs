//! Tracing subscriber setup.

use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use crate::config::LogFormat;
use crate::error::AnalysisError;

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(app_name: &str, format: LogFormat) -> Result<(), AnalysisError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = match format {
        LogFormat::Json => {
            let subscriber = Registry::default()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(BunyanFormattingLayer::new(app_name.to_string(), std::io::stderr));
            set_global_default(subscriber)
        }
        LogFormat::Pretty => {
            let subscriber = Registry::default().with(env_filter).with(
                fmt::layer()
                    .with_target(false)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            );
            set_global_default(subscriber)
        }
    };

    result.map_err(|e| AnalysisError::Config(format!("tracing already initialised: {}", e)))
}

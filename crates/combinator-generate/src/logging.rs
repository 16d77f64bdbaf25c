use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;

use crate::errors::GenerationError;

/// Environment variable that overrides the configured filter directive.
pub const LOG_ENV_VAR: &str = "COMBINATOR_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Logging settings for applications embedding the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    pub format: LogFormat,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `combinator_generate=debug`.
    pub filter: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            format: LogFormat::Plain,
            filter: "info".to_string(),
        }
    }
}

/// Install a global stderr subscriber. Fails if one is already installed.
pub fn init_logging(options: &LoggingOptions) -> Result<(), GenerationError> {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_new(&options.filter))
        .map_err(|err| GenerationError::Logging(err.to_string()))?;

    let layer = tracing_subscriber::fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    match options.format {
        LogFormat::Plain => registry.with(layer).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    }
    .map_err(|err| GenerationError::Logging(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialisation_is_reported() {
        let options = LoggingOptions {
            format: LogFormat::Json,
            filter: "combinator_generate=debug".to_string(),
        };
        let _ = init_logging(&options);
        assert!(matches!(
            init_logging(&options),
            Err(GenerationError::Logging(_))
        ));
    }

    #[test]
    fn options_default_to_plain_info() {
        let options: LoggingOptions = toml::from_str("format = \"json\"").expect("parse options");
        assert_eq!(options.format, LogFormat::Json);
        assert_eq!(options.filter, "info");
    }
}

use aggregator::config::Config as AggregatorConfig;
use explorer::config::Config as ExplorerConfig;
use serde::Deserialize;
use std::fs::File;
use submission::config::Config as SubmissionConfig;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MetricsConfig {
    pub statsd_host: String,
    pub statsd_port: u16,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub sentry_dsn: Option<String>,
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct CommonConfig {
    pub metrics: Option<MetricsConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(flatten)]
    pub common: CommonConfig,
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub explorer: ExplorerConfig,
    /// Enables the write path
    pub submission: Option<SubmissionConfig>,
}

impl Config {
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let data: Config = serde_yaml::from_reader(file)?;
        data.validate()?;

        Ok(data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.aggregator.validate()?;
        self.explorer.validate()?;
        if let Some(submission) = &self.submission {
            submission.validate()?;
        }
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("could not load config from file: {0}")]
    LoadError(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),
    #[error("invalid aggregator config: {0}")]
    Aggregator(#[from] aggregator::config::ValidationError),
    #[error("invalid explorer config: {0}")]
    Explorer(#[from] explorer::config::ValidationError),
    #[error("invalid submission config: {0}")]
    Submission(#[from] submission::config::ValidationError),
}

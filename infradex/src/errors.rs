use crate::config::ConfigError;
use thiserror::Error;

/// Failures surfaced by a CLI command.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("could not read form: {0}")]
    Form(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Aggregator(#[from] aggregator::AggregatorError),

    #[error(transparent)]
    Client(#[from] explorer::client::ClientError),

    #[error(transparent)]
    View(#[from] explorer::view::ViewError),

    #[error(transparent)]
    Validation(#[from] submission::form::ValidationError),

    #[error(transparent)]
    Publish(#[from] submission::PublishError),

    #[error(transparent)]
    Submission(#[from] submission::SubmissionError),

    #[error("environment variable {0} is not set")]
    MissingToken(String),

    #[error("could not install metrics recorder: {0}")]
    Metrics(String),
}

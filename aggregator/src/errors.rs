use thiserror::Error;

/// Errors raised while assembling provider data for a request.
///
/// `Configuration` and `UpstreamFetch` are kept apart so callers can decide
/// whether to retry, skip the network, or abort.
#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("no source configured for network {0}")]
    Configuration(String),

    #[error("failed to fetch providers for network {network}: {reason}")]
    UpstreamFetch { network: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl AggregatorError {
    pub(crate) fn upstream(network: &str, reason: impl ToString) -> Self {
        AggregatorError::UpstreamFetch {
            network: network.to_string(),
            reason: reason.to_string(),
        }
    }
}

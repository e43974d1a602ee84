//! Remote payload retrieval.
//!
//! One JSON document per network, keyed by category. The payload is returned
//! as-is; shape checks happen implicitly downstream.

use crate::errors::AggregatorError;
use crate::metrics_defs::{UPSTREAM_FETCH_DURATION, UPSTREAM_FETCH_FAILURES};
use crate::networks::Networks;
use async_trait::async_trait;
use serde_json::{Map, Value};
use shared::{counter, histogram};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Raw per-network payload: category key to array of records.
pub type Payload = Map<String, Value>;

#[async_trait]
pub trait PayloadSource: Send + Sync {
    /// Fetches the payload for `network`.
    ///
    /// Fails with `Configuration` when no source exists for the network and
    /// with `UpstreamFetch` on transport or parse failures.
    async fn fetch(&self, network: &str) -> Result<Payload, AggregatorError>;
}

/// Fetches payloads over HTTP from the `source_url` of each configured network.
pub struct HttpFetcher {
    client: reqwest::Client,
    networks: Networks,
}

impl HttpFetcher {
    pub fn new(networks: Networks, timeout: Option<Duration>) -> Result<Self, AggregatorError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            networks,
        })
    }

    fn source_url(&self, network: &str) -> Result<&Url, AggregatorError> {
        self.networks
            .resolve(network)
            .map(|(_, config)| &config.source_url)
            .ok_or_else(|| AggregatorError::Configuration(network.to_string()))
    }

    async fn get(&self, network: &str, url: &Url) -> Result<Payload, AggregatorError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AggregatorError::upstream(network, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::upstream(
                network,
                format!("upstream responded with {status}"),
            ));
        }

        match response.json::<Value>().await {
            Ok(Value::Object(payload)) => Ok(payload),
            Ok(_) => Err(AggregatorError::upstream(
                network,
                "payload is not a JSON object",
            )),
            Err(e) => Err(AggregatorError::upstream(network, e)),
        }
    }
}

#[async_trait]
impl PayloadSource for HttpFetcher {
    async fn fetch(&self, network: &str) -> Result<Payload, AggregatorError> {
        let url = self.source_url(network)?;
        let label = network.to_lowercase();

        let started = Instant::now();
        let result = self.get(network, url).await;
        histogram!(UPSTREAM_FETCH_DURATION, "network" => label.clone())
            .record(started.elapsed().as_secs_f64());

        match &result {
            Ok(payload) => {
                tracing::debug!(network, categories = payload.len(), "Fetched provider payload");
            }
            Err(e) => {
                counter!(UPSTREAM_FETCH_FAILURES, "network" => label).increment(1);
                tracing::warn!(network, error = %e, "Provider payload fetch failed");
            }
        }

        result
    }
}

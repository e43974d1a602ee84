use crate::config::{ChainConfig, NetworkConfig};
use crate::errors::AggregatorError;
use crate::fetcher::{Payload, PayloadSource};
use crate::networks::Networks;
use async_trait::async_trait;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// eth (with chains), sol and base, all served from `base_url`.
pub fn test_networks(base_url: &str) -> Networks {
    let network = |name: &str, key: &str, chains: Vec<ChainConfig>| NetworkConfig {
        name: name.to_string(),
        source_url: format!("{base_url}/{key}.json").parse().unwrap(),
        chains,
    };

    Networks::new(IndexMap::from([
        (
            "eth".to_string(),
            network(
                "Ethereum",
                "eth",
                vec![
                    ChainConfig {
                        key: "mainnet".into(),
                        name: "Ethereum Mainnet".into(),
                    },
                    ChainConfig {
                        key: "sepolia".into(),
                        name: "Sepolia".into(),
                    },
                ],
            ),
        ),
        ("sol".to_string(), network("Solana", "sol", vec![])),
        ("base".to_string(), network("Base", "base", vec![])),
    ]))
}

/// In-memory payload source. Networks that were never registered behave like
/// networks without a configured source.
#[derive(Default)]
pub struct StaticSource {
    payloads: HashMap<String, Result<Value, String>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, network: &str, payload: Value) -> Self {
        self.payloads.insert(network.to_string(), Ok(payload));
        self
    }

    pub fn failing(mut self, network: &str) -> Self {
        self.payloads
            .insert(network.to_string(), Err("connection reset".to_string()));
        self
    }
}

#[async_trait]
impl PayloadSource for StaticSource {
    async fn fetch(&self, network: &str) -> Result<Payload, AggregatorError> {
        match self.payloads.get(network) {
            Some(Ok(Value::Object(payload))) => Ok(payload.clone()),
            Some(Ok(_)) => Err(AggregatorError::upstream(network, "not an object")),
            Some(Err(reason)) => Err(AggregatorError::upstream(network, reason)),
            None => Err(AggregatorError::Configuration(network.to_string())),
        }
    }
}

/// Serves `/{network}.json` from `payloads` on an ephemeral port.
pub async fn spawn_upstream(payloads: HashMap<String, Value>) -> SocketAddr {
    async fn payload(
        State(payloads): State<Arc<HashMap<String, Value>>>,
        Path(file): Path<String>,
    ) -> Response {
        let network = file.trim_end_matches(".json");
        match payloads.get(network) {
            Some(value) => axum::Json(value.clone()).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }

    let app = Router::new()
        .route("/{file}", get(payload))
        .with_state(Arc::new(payloads));
    spawn_router(app).await
}

/// Runs `app` on an ephemeral local port.
pub async fn spawn_router(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

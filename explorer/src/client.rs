use crate::entity::Catalog;
use aggregator::api::{ApiErrorResponse, ApiResponse};
use aggregator::{CategoryKey, ProvidersMap, RpcListing};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Catalog API returned {status}: {message}")]
    Api { status: StatusCode, message: String },
    #[error("Invalid catalog URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Client for the catalog read endpoints of a running server.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: Url) -> Self {
        CatalogClient {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Providers of one network, optionally narrowed to a category and a chain.
    pub async fn providers(
        &self,
        network: &str,
        category: Option<CategoryKey>,
        chain: Option<&str>,
    ) -> Result<Catalog, ClientError> {
        let mut query = vec![("network", network)];
        if let Some(category) = category {
            query.push(("category", category.as_str()));
        }
        if let Some(chain) = chain {
            query.push(("chain", chain));
        }

        let providers: ProvidersMap = self.get("api/providers", &query).await?;
        Ok(Catalog::from_providers(providers))
    }

    /// RPC offerings across every configured network.
    pub async fn rpc_listing(&self) -> Result<Vec<RpcListing>, ClientError> {
        self.get("api/rpcs", &[]).await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = self.base_url.join(path)?;
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<ApiResponse<T>>().await?.result);
        }

        let body = response.text().await?;
        let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(error) => error.error_message,
            Err(_) => body,
        };
        Err(ClientError::Api { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Entity;
    use axum::{Json, Router, extract::Query, http::StatusCode as AxumStatus, routing::get};
    use serde_json::{Value, json};
    use std::collections::HashMap;
    use std::net::SocketAddr;

    async fn providers(Query(params): Query<HashMap<String, String>>) -> (AxumStatus, Json<Value>) {
        if params.get("network").map(String::as_str) != Some("eth") {
            return (
                AxumStatus::NOT_FOUND,
                Json(json!({"error_message": "Unknown network"})),
            );
        }

        let chain = params.get("chain").cloned().unwrap_or_default();
        (
            AxumStatus::OK,
            Json(json!({
                "result": {
                    "rpc": [
                        {"provider": "Alchemy", "plan": "Free", "chain": chain, "starred": "yes"},
                        "not an object"
                    ]
                }
            })),
        )
    }

    async fn rpcs() -> Json<Value> {
        Json(json!({
            "result": [
                {"network": "eth", "networkName": "Ethereum", "chain": "Sepolia", "rpc": {"provider": "Ankr"}}
            ]
        }))
    }

    async fn spawn() -> SocketAddr {
        let app = Router::new()
            .route("/api/providers", get(providers))
            .route("/api/rpcs", get(rpcs))
            .route("/broken/api/rpcs", get(|| async { (AxumStatus::BAD_GATEWAY, "upstream down") }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client(addr: SocketAddr, prefix: &str) -> CatalogClient {
        CatalogClient::new(Url::parse(&format!("http://{addr}{prefix}/")).unwrap())
    }

    #[tokio::test]
    async fn test_providers() {
        let addr = spawn().await;
        let catalog = client(addr, "")
            .providers("eth", Some(CategoryKey::Rpc), Some("sepolia"))
            .await
            .unwrap();

        let rpcs = catalog.entities(CategoryKey::Rpc);
        assert_eq!(rpcs.len(), 1);
        let Entity::Rpc(record) = &rpcs[0] else {
            panic!("expected rpc record");
        };
        assert_eq!(record.provider.as_deref(), Some("Alchemy"));
        assert_eq!(record.chain.as_deref(), Some("sepolia"));
        assert!(rpcs[0].is_starred());
        assert!(catalog.entities(CategoryKey::Wallet).is_empty());
    }

    #[tokio::test]
    async fn test_api_error() {
        let addr = spawn().await;
        let error = client(addr, "")
            .providers("nope", None, None)
            .await
            .unwrap_err();

        match error {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Unknown network");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rpc_listing() {
        let addr = spawn().await;
        let listing = client(addr, "").rpc_listing().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].network_name, "Ethereum");
        assert_eq!(listing[0].chain, "Sepolia");

        let error = client(addr, "/broken").rpc_listing().await.unwrap_err();
        match error {
            ClientError::Api { status, message } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

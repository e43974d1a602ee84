//! Read endpoints.
//!
//! `GET /api/providers?network=<key>&category=<key>&chain=<key>`
//!
//! ```json
//! { "result": { "rpc": [ { "provider": "Alchemy", "chain": "mainnet" } ] } }
//! ```
//!
//! `GET /api/rpcs`
//!
//! ```json
//! { "result": [ { "network": "eth", "networkName": "Ethereum", "chain": "Ethereum Mainnet", "rpc": { } } ] }
//! ```

use crate::aggregate::{Aggregator, ProvidersMap, RpcListing};
use crate::errors::AggregatorError;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

/// Envelope shared by every catalog endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: T,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error_message: String,
}

#[derive(Deserialize, Debug)]
struct ProvidersParams {
    network: String,
    category: Option<String>,
    chain: Option<String>,
}

pub fn router(aggregator: Aggregator) -> Router {
    Router::new()
        .route("/api/providers", get(providers_handler))
        .route("/api/rpcs", get(rpcs_handler))
        .with_state(aggregator)
}

async fn providers_handler(
    State(aggregator): State<Aggregator>,
    Query(params): Query<ProvidersParams>,
) -> Result<Json<ApiResponse<ProvidersMap>>, AggregatorError> {
    let result = aggregator
        .providers(
            &params.network,
            params.category.as_deref(),
            params.chain.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse { result }))
}

async fn rpcs_handler(State(aggregator): State<Aggregator>) -> Json<ApiResponse<Vec<RpcListing>>> {
    Json(ApiResponse {
        result: aggregator.rpc_listing().await,
    })
}

impl IntoResponse for AggregatorError {
    fn into_response(self) -> Response {
        let status = match self {
            AggregatorError::Configuration(_) => StatusCode::NOT_FOUND,
            AggregatorError::UpstreamFetch { .. } => StatusCode::BAD_GATEWAY,
            AggregatorError::HttpClient(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });

        (status, body).into_response()
    }
}

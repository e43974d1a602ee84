//! Write endpoint.
//!
//! `POST /api/rpcs` with `{ "network": "eth", "form": { ... } }` answers
//! `201 { "branch", "url", "number" }`.

use crate::change_request::PublishedChangeRequest;
use crate::form::RpcFormData;
use crate::service::{SubmissionError, SubmissionService};
use aggregator::api::ApiErrorResponse;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub network: String,
    pub form: RpcFormData,
}

pub fn router(service: SubmissionService) -> Router {
    Router::new()
        .route("/api/rpcs", post(submit_handler))
        .with_state(service)
}

async fn submit_handler(
    State(service): State<SubmissionService>,
    Json(request): Json<SubmitRequest>,
) -> Result<(StatusCode, Json<PublishedChangeRequest>), SubmissionError> {
    let published = service.submit(&request.network, request.form).await?;
    Ok((StatusCode::CREATED, Json(published)))
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let status = match self {
            SubmissionError::Validation(_) => StatusCode::BAD_REQUEST,
            SubmissionError::UnknownNetwork(_) => StatusCode::NOT_FOUND,
            SubmissionError::Conflict(_) => StatusCode::CONFLICT,
            SubmissionError::Publish(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(ApiErrorResponse {
            error_message: self.to_string(),
        });
        (status, body).into_response()
    }
}

//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::deployment::{DeploymentAccepted, DeploymentRequest};
use crate::server::state::ServerState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Error body returned to API callers
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Synchronous API failure
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthorized".to_string(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// Exact match of the Authorization header against `Bearer <api_key>`
fn is_authorized(headers: &HeaderMap, api_key: &SecretString) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| token == api_key.expose_secret())
}

/// Deploy handler: validates the request, starts the pipeline and
/// acknowledges without waiting for it.
pub async fn deploy_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<DeploymentAccepted>, ApiError> {
    if !is_authorized(&headers, &state.api_key) {
        warn!("Rejected deployment request with invalid credentials");
        return Err(ApiError::unauthorized());
    }

    let request: DeploymentRequest = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request("Invalid request body"))?;
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    info!(
        "Received deployment request {} for: {}",
        request.deployment_id, request.name
    );

    let deployment_id = request.deployment_id;
    // Detached: errors from here on surface through status reports only.
    drop(state.pipeline.spawn(request));

    Ok(Json(DeploymentAccepted {
        message: "Deployment initiated".to_string(),
        deployment_id: deployment_id.to_string(),
    }))
}

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use utils::errors::{API_FETCH_ERROR, INVALID_ADDRESS, INVALID_NETWORK, INVALID_PARAMS};

/// Request-level failures surfaced by the HTTP boundary. Every variant maps
/// to a 400 with an `{"error": ...}` body; upstream failures keep their
/// source chain for diagnostics but serialize as the generic fetch message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{}", INVALID_NETWORK)]
    InvalidNetwork,
    #[error("{}", INVALID_PARAMS)]
    InvalidParams,
    #[error("{}", INVALID_ADDRESS)]
    InvalidAddress,
    #[error("{}", API_FETCH_ERROR)]
    UpstreamFetch(#[source] anyhow::Error),
}

impl ApiError {
    pub fn upstream(source: anyhow::Error) -> Self {
        ApiError::UpstreamFetch(source)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::UpstreamFetch(source) => {
                error!(error = %source, error_chain = ?source, "Upstream fetch failed");
            }
            other => {
                warn!(error = %other, "Request validation failed");
            }
        }

        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

use axum::{
    Json, Router,
    extract::{Query, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    aggregation::{self, ActiveProposals},
    config, delegates,
    error::ApiError,
    store::PostStore,
    subsquid::SubsquidClient,
    summary::SummaryService,
};

#[derive(Clone)]
pub struct AppState {
    pub subsquid: Arc<SubsquidClient>,
    pub posts: Arc<dyn PostStore>,
    pub summaries: Arc<dyn SummaryService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/v1/posts/active-proposals", post(active_proposals))
        .route("/api/v1/delegations/delegates", get(curated_delegates))
        .with_state(state)
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ActiveProposalsBody {
    #[serde(rename = "proposalType")]
    pub proposal_type: Option<String>,
    #[serde(rename = "trackNumber")]
    pub track_number: Option<Value>,
}

fn network_header(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get("x-network")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .ok_or(ApiError::InvalidNetwork)
}

async fn active_proposals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ActiveProposalsBody>,
) -> Result<Json<ActiveProposals>, ApiError> {
    let network = network_header(&headers)?;

    let data = aggregation::get_active_proposals_for_track(
        &state.subsquid,
        state.posts.as_ref(),
        state.summaries.as_ref(),
        &network,
        body.proposal_type.as_deref().unwrap_or_default(),
        body.track_number.as_ref(),
        false,
    )
    .await?;

    Ok(Json(data))
}

#[derive(Debug, Deserialize, Default)]
pub struct DelegatesQuery {
    pub address: Option<String>,
}

async fn curated_delegates(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DelegatesQuery>,
) -> Result<Json<Vec<delegates::Delegate>>, ApiError> {
    let network = network_header(&headers)?;
    if !state.subsquid.supports_network(&network) {
        return Err(ApiError::InvalidNetwork);
    }
    if let Some(address) = query.address.as_deref() {
        if !delegates::is_plausible_address(address) {
            return Err(ApiError::InvalidAddress);
        }
    }

    let registry = &config::get_config().delegates.curated;
    let data = delegates::get_delegates_data(
        &state.subsquid,
        registry,
        &network,
        query.address.as_deref(),
    )
    .await
    .map_err(ApiError::upstream)?;

    Ok(Json(data))
}

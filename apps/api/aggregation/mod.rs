pub mod call_payload;
pub mod decoding;
pub mod status_history;
pub mod topic;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use govhub_db::models::post;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{instrument, warn};

use crate::{
    error::ApiError,
    store::PostStore,
    subsquid::{IndexerProposal, StatusEvent, SubsquidClient},
    summary::SummaryService,
    types::ProposalType,
};
use call_payload::{Beneficiary, interpret_proposed_call};
use status_history::{DECIDING, DECISION_DEPOSIT_PLACED, NormalizedHistory, normalize_status_history};
use topic::{Topic, resolve_topic};

/// A proposal with indexer data, pipeline outputs, and post metadata merged.
/// Indexer fields win for index/type/status; post fields win for
/// title/summary/tags/topic/last-edited.
#[derive(Debug, Serialize)]
pub struct AggregatedPayload {
    pub index: Option<Value>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub proposal_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "statusHistory")]
    pub status_history: Vec<StatusEvent>,
    #[serde(rename = "assetId")]
    pub asset_id: Option<String>,
    pub beneficiaries: Vec<Beneficiary>,
    pub requested: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    pub topic: Option<Topic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_edited_at: Option<DateTime<Utc>>,
    pub track_number: Option<i64>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Either the fully merged payloads, or the raw indexer records when no
/// post metadata matched. Both serialize as a JSON array.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActiveProposals {
    Aggregated(Vec<AggregatedPayload>),
    Raw(Vec<IndexerProposal>),
}

impl ActiveProposals {
    pub fn len(&self) -> usize {
        match self {
            ActiveProposals::Aggregated(items) => items.len(),
            ActiveProposals::Raw(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Merge the active proposals of a track with their post metadata.
///
/// Validation fails fast; an empty indexer result short-circuits before the
/// post store is consulted; indexer rows without post documents degrade to
/// the raw records. Summary side effects for all merged posts are awaited
/// together and individual failures are only logged.
#[instrument(
    name = "get_active_proposals_for_track",
    skip(subsquid, posts, summaries)
)]
pub async fn get_active_proposals_for_track(
    subsquid: &SubsquidClient,
    posts: &dyn PostStore,
    summaries: &dyn SummaryService,
    network: &str,
    proposal_type: &str,
    track_number: Option<&Value>,
    is_external_api_call: bool,
) -> Result<ActiveProposals, ApiError> {
    if network.is_empty() || !subsquid.supports_network(network) {
        return Err(ApiError::InvalidNetwork);
    }

    let proposal_type: ProposalType =
        proposal_type.parse().map_err(|_| ApiError::InvalidParams)?;
    let track_number = match track_number {
        None | Some(Value::Null) => None,
        Some(value) => Some(parse_track_number(value).ok_or(ApiError::InvalidParams)?),
    };

    let indexer_rows = subsquid
        .active_proposals(network, proposal_type.indexer_type(), track_number)
        .await
        .map_err(ApiError::upstream)?;

    if indexer_rows.is_empty() {
        return Ok(ActiveProposals::Aggregated(Vec::new()));
    }

    let ids: Vec<String> = indexer_rows
        .iter()
        .filter_map(IndexerProposal::index_key)
        .collect();

    let docs = posts
        .posts_by_ids(proposal_type.collection(), &ids)
        .await
        .map_err(ApiError::upstream)?;

    if docs.is_empty() {
        return Ok(ActiveProposals::Raw(indexer_rows));
    }

    let mut payloads = Vec::with_capacity(docs.len());
    let mut side_effects = Vec::with_capacity(docs.len());

    for doc in &docs {
        let matched = indexer_rows
            .iter()
            .find(|row| row.index_key().as_deref() == Some(doc.id.as_str()));
        let Some(proposal) = matched else {
            warn!(post_id = %doc.id, "Post has no matching indexer record, skipping");
            continue;
        };

        payloads.push(build_payload(proposal, doc, proposal_type, track_number));
        side_effects.push(async move {
            if let Err(e) = summaries.generate(doc, network, is_external_api_call).await {
                warn!(post_id = %doc.id, error = %e, "Content summary generation failed");
            }
        });
    }

    // Every summary side effect settles before the response goes out; a
    // failed one only loses its own summary.
    join_all(side_effects).await;

    Ok(ActiveProposals::Aggregated(payloads))
}

fn parse_track_number(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn build_payload(
    proposal: &IndexerProposal,
    doc: &post::Model,
    proposal_type: ProposalType,
    track_number: Option<i64>,
) -> AggregatedPayload {
    let NormalizedHistory { history, is_swap } = normalize_status_history(&proposal.status_history);

    let call_summary = proposal
        .preimage
        .as_ref()
        .and_then(|preimage| preimage.proposed_call.as_ref())
        .and_then(|call| call.args.as_ref())
        .map(interpret_proposed_call)
        .unwrap_or_default();

    // A deposit event swapped next to "Deciding" means the proposal is
    // effectively deciding; the reported status follows.
    let status = match &proposal.status {
        Some(s) if is_swap && s.as_str() == DECISION_DEPOSIT_PLACED => Some(DECIDING.to_string()),
        other => other.clone(),
    };

    let mut rest = proposal.extra.clone();
    if let Some(preimage) = &proposal.preimage {
        if let Ok(value) = serde_json::to_value(preimage) {
            rest.insert("preimage".to_string(), value);
        }
    }

    AggregatedPayload {
        index: proposal.index.clone(),
        proposal_type: proposal.proposal_type.clone(),
        status,
        status_history: history,
        asset_id: call_summary.asset_id,
        beneficiaries: call_summary.beneficiaries,
        requested: call_summary.requested.to_string(),
        title: doc.title.clone(),
        summary: doc.summary.clone(),
        tags: doc.tags.clone(),
        topic: resolve_topic(Some(doc), proposal_type),
        last_edited_at: last_edited(doc),
        track_number,
        rest,
    }
}

/// `last_edited_at` wins over `updated_at`, mirroring how the write path
/// stamps post documents.
fn last_edited(doc: &post::Model) -> Option<DateTime<Utc>> {
    doc.last_edited_at.or(doc.updated_at)
}

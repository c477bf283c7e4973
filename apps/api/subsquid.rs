use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::types::ACTIVE_PROPOSAL_STATUSES;

/// Response envelope for the proposals query
#[derive(Deserialize, Debug)]
pub struct ProposalsResponse {
    pub data: Option<ProposalsData>,
}

#[derive(Deserialize, Debug)]
pub struct ProposalsData {
    pub proposals: Vec<IndexerProposal>,
}

/// A governance proposal as returned by the chain indexer. The fields the
/// aggregation pipeline reads are typed; everything else rides along in
/// `extra` so the degraded path can return records byte-for-byte.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IndexerProposal {
    #[serde(default)]
    pub index: Option<Value>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub proposal_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(rename = "statusHistory", default)]
    pub status_history: Vec<StatusEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preimage: Option<Preimage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IndexerProposal {
    /// Canonical string form of the numeric index. Non-numeric indices have
    /// no document-store counterpart and yield `None`.
    pub fn index_key(&self) -> Option<String> {
        match &self.index {
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        }
    }
}

/// One entry of a proposal's status timeline.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StatusEvent {
    pub status: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl StatusEvent {
    pub fn new(status: &str) -> Self {
        Self {
            status: status.to_string(),
            details: Map::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Preimage {
    #[serde(
        rename = "proposedCall",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub proposed_call: Option<ProposedCall>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ProposedCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response envelope for the per-delegate stats query
#[derive(Deserialize, Debug)]
pub struct DelegateStatsResponse {
    pub data: Option<DelegateStats>,
}

#[derive(Deserialize, Debug, Default)]
pub struct DelegateStats {
    #[serde(rename = "votingDelegationsConnection", default)]
    pub voting_delegations: Option<ConnectionTotal>,
    #[serde(rename = "votesConnection", default)]
    pub votes: Option<ConnectionTotal>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
pub struct ConnectionTotal {
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

/// GraphQL client for the per-network chain indexer.
pub struct SubsquidClient {
    client: ClientWithMiddleware,
    endpoints: HashMap<String, String>,
}

impl SubsquidClient {
    pub fn new(endpoints: HashMap<String, String>) -> Self {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(3);
        let client = ClientBuilder::new(Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Self { client, endpoints }
    }

    pub fn supports_network(&self, network: &str) -> bool {
        self.endpoints.contains_key(network)
    }

    fn endpoint_for(&self, network: &str) -> Result<&str> {
        self.endpoints
            .get(network)
            .map(String::as_str)
            .with_context(|| format!("No indexer endpoint configured for network {network}"))
    }

    /// Fetch the proposals currently active on a track.
    #[instrument(name = "fetch_active_proposals", skip(self))]
    pub async fn active_proposals(
        &self,
        network: &str,
        type_eq: &str,
        track_number: Option<i64>,
    ) -> Result<Vec<IndexerProposal>> {
        let status_in = ACTIVE_PROPOSAL_STATUSES
            .iter()
            .map(|status| format!(r#""{status}""#))
            .collect::<Vec<_>>()
            .join(", ");
        let track_filter = track_number
            .map(|track| format!(", trackNumber_eq: {track}"))
            .unwrap_or_default();

        let query = format!(
            r#"
            {{
                proposals(
                    where: {{
                        status_in: [{status_in}],
                        type_eq: {type_eq}{track_filter}
                    }},
                    orderBy: index_DESC
                ) {{
                    index
                    type
                    status
                    createdAt
                    updatedAt
                    proposer
                    trackNumber
                    end
                    statusHistory {{
                        status
                        block
                        timestamp
                    }}
                    preimage {{
                        hash
                        method
                        section
                        proposedCall {{
                            method
                            section
                            args
                        }}
                    }}
                }}
            }}"#
        );

        debug!(
            network = %network,
            type_eq = %type_eq,
            track_number = ?track_number,
            "Fetching active proposals"
        );

        let response: ProposalsResponse = self.fetch_graphql(network, &query).await?;
        Ok(response.data.map(|d| d.proposals).unwrap_or_default())
    }

    /// Fetch delegation and vote counts for one delegate address.
    #[instrument(name = "fetch_delegate_stats", skip(self))]
    pub async fn delegate_stats(
        &self,
        network: &str,
        address: &str,
        created_at_gte: &str,
    ) -> Result<DelegateStats> {
        let query = format!(
            r#"
            {{
                votingDelegationsConnection(orderBy: id_ASC, where: {{ to_eq: "{address}" }}) {{
                    totalCount
                }}
                votesConnection(orderBy: id_ASC, where: {{ voter_eq: "{address}", createdAt_gte: "{created_at_gte}" }}) {{
                    totalCount
                }}
            }}"#
        );

        debug!(network = %network, address = %address, "Fetching delegate stats");

        let response: DelegateStatsResponse = self.fetch_graphql(network, &query).await?;
        Ok(response.data.unwrap_or_default())
    }

    /// Execute a GraphQL query against the network's endpoint
    async fn fetch_graphql<T>(&self, network: &str, query: &str) -> Result<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let endpoint = self.endpoint_for(network)?;
        let response = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "query": query }))
            .header("User-Agent", "govhub.app/1.0")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "HTTP error {}: {}",
                response.status(),
                response.text().await?
            ));
        }

        let result: T = response.json().await?;
        Ok(result)
    }
}

use anyhow::Result;
use chrono::{Duration, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{instrument, warn};

use crate::{config::CuratedDelegate, subsquid::SubsquidClient};

/// A curated delegate with its recent on-chain activity merged in.
#[derive(Debug, Clone, Serialize)]
pub struct Delegate {
    pub address: String,
    pub name: String,
    pub bio: String,
    #[serde(rename = "isCurated")]
    pub is_curated: bool,
    pub active_delegation_count: u64,
    pub voted_proposals_count: u64,
}

/// Cheap shape check before an address reaches the indexer: an EVM-style
/// `0x` address or a base58 account id of plausible length.
pub fn is_plausible_address(address: &str) -> bool {
    if let Some(hex_body) = address.strip_prefix("0x") {
        return hex_body.len() == 40 && hex_body.chars().all(|c| c.is_ascii_hexdigit());
    }

    (32..=64).contains(&address.len())
        && address
            .chars()
            .all(|c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'))
}

/// Fetch 30-day delegation and vote counts for every curated delegate on a
/// network. Unsupported networks and implausible filter addresses yield an
/// empty list; a failed stats fetch only drops its own delegate.
#[instrument(name = "get_delegates_data", skip(subsquid, registry))]
pub async fn get_delegates_data(
    subsquid: &SubsquidClient,
    registry: &[CuratedDelegate],
    network: &str,
    address: Option<&str>,
) -> Result<Vec<Delegate>> {
    if network.is_empty() || !subsquid.supports_network(network) {
        return Ok(Vec::new());
    }
    if let Some(address) = address {
        if !is_plausible_address(address) {
            return Ok(Vec::new());
        }
    }

    let selected: Vec<&CuratedDelegate> = registry
        .iter()
        .filter(|delegate| address.is_none_or(|a| delegate.address == a))
        .collect();

    let since = (Utc::now() - Duration::days(30)).to_rfc3339();
    let fetches = selected.iter().map(|delegate| {
        let since = since.clone();
        async move {
            subsquid
                .delegate_stats(network, &delegate.address, &since)
                .await
                .map(|stats| (*delegate, stats))
        }
    });

    let mut delegates = Vec::with_capacity(selected.len());
    for result in join_all(fetches).await {
        match result {
            Ok((info, stats)) => delegates.push(Delegate {
                address: info.address.clone(),
                name: info.name.clone(),
                bio: info.bio.clone(),
                is_curated: true,
                active_delegation_count: stats
                    .voting_delegations
                    .map(|c| c.total_count)
                    .unwrap_or(0),
                voted_proposals_count: stats.votes.map(|c| c.total_count).unwrap_or(0),
            }),
            Err(e) => warn!(error = %e, "Delegate stats fetch failed, skipping delegate"),
        }
    }

    Ok(delegates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_evm_style_addresses() {
        assert!(is_plausible_address(
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
        ));
        assert!(!is_plausible_address("0x1234"));
        assert!(!is_plausible_address("0xzz0000000000000000000000000000000000000000"));
    }

    #[test]
    fn accepts_base58_account_ids() {
        assert!(is_plausible_address(
            "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        ));
        // '0', 'O', 'I' and 'l' are not base58
        assert!(!is_plausible_address(
            "0GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY"
        ));
        assert!(!is_plausible_address("short"));
    }
}

use govhub_db::models::post;
use serde::{Deserialize, Serialize};

use crate::types::ProposalType;

/// Display topic attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i32,
    pub name: String,
}

impl Topic {
    fn new(id: i32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

pub fn topic_name(topic_id: i32) -> Option<&'static str> {
    match topic_id {
        1 => Some("Democracy"),
        2 => Some("Council"),
        3 => Some("Technical Committee"),
        4 => Some("Treasury"),
        5 => Some("General"),
        6 => Some("Root"),
        7 => Some("Staking Admin"),
        8 => Some("Governance"),
        9 => Some("Fellowship"),
        10 => Some("Whitelist"),
        _ => None,
    }
}

pub fn is_topic_id_valid(topic_id: i32) -> bool {
    topic_name(topic_id).is_some()
}

/// Fallback topic when the post carries no usable topic metadata.
pub fn default_topic(proposal_type: ProposalType) -> Topic {
    match proposal_type {
        ProposalType::DemocracyProposals => Topic::new(1, "Democracy"),
        ProposalType::TreasuryProposals
        | ProposalType::Bounties
        | ProposalType::ChildBounties
        | ProposalType::Tips => Topic::new(4, "Treasury"),
        ProposalType::FellowshipReferendums => Topic::new(9, "Fellowship"),
        ProposalType::ReferendumsV2 => Topic::new(5, "General"),
    }
}

/// Resolve the display topic for a post. An explicit stored topic wins, then
/// a valid `topic_id`, then the proposal-type default. `None` only when the
/// post document itself is absent.
pub fn resolve_topic(post: Option<&post::Model>, proposal_type: ProposalType) -> Option<Topic> {
    let post = post?;

    if let Some(stored) = &post.topic {
        if let Ok(topic) = serde_json::from_value::<Topic>(stored.clone()) {
            return Some(topic);
        }
        // A stored topic that does not parse falls through to topic_id.
    }

    if let Some(topic_id) = post.topic_id {
        if let Some(name) = topic_name(topic_id) {
            return Some(Topic::new(topic_id, name));
        }
    }

    Some(default_topic(proposal_type))
}

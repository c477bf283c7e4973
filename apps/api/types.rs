use std::{fmt, str::FromStr};

/// Statuses a referendum can be in while it still counts as active on its
/// track listing.
pub const ACTIVE_PROPOSAL_STATUSES: &[&str] = &[
    "DecisionDepositPlaced",
    "Submitted",
    "Deciding",
    "ConfirmStarted",
    "ConfirmAborted",
];

/// The proposal-type tags accepted by the API, with their indexer enum
/// names and document-store collection slugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProposalType {
    ReferendumsV2,
    FellowshipReferendums,
    DemocracyProposals,
    TreasuryProposals,
    Bounties,
    ChildBounties,
    Tips,
}

impl ProposalType {
    pub const ALL: &'static [ProposalType] = &[
        ProposalType::ReferendumsV2,
        ProposalType::FellowshipReferendums,
        ProposalType::DemocracyProposals,
        ProposalType::TreasuryProposals,
        ProposalType::Bounties,
        ProposalType::ChildBounties,
        ProposalType::Tips,
    ];

    /// Document-store collection slug, also the request-body tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalType::ReferendumsV2 => "referendums_v2",
            ProposalType::FellowshipReferendums => "fellowship_referendums",
            ProposalType::DemocracyProposals => "democracy_proposals",
            ProposalType::TreasuryProposals => "treasury_proposals",
            ProposalType::Bounties => "bounties",
            ProposalType::ChildBounties => "child_bounties",
            ProposalType::Tips => "tips",
        }
    }

    /// The indexer's enum literal for this proposal type.
    pub fn indexer_type(&self) -> &'static str {
        match self {
            ProposalType::ReferendumsV2 => "ReferendumV2",
            ProposalType::FellowshipReferendums => "FellowshipReferendum",
            ProposalType::DemocracyProposals => "DemocracyProposal",
            ProposalType::TreasuryProposals => "TreasuryProposal",
            ProposalType::Bounties => "Bounty",
            ProposalType::ChildBounties => "ChildBounty",
            ProposalType::Tips => "Tip",
        }
    }

    pub fn collection(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProposalType::ALL
            .iter()
            .copied()
            .find(|proposal_type| proposal_type.as_str() == s)
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        assert_eq!(
            "referendums_v2".parse::<ProposalType>(),
            Ok(ProposalType::ReferendumsV2)
        );
        assert_eq!(
            "child_bounties".parse::<ProposalType>(),
            Ok(ProposalType::ChildBounties)
        );
    }

    #[test]
    fn rejects_unknown_tags() {
        assert!("referendums".parse::<ProposalType>().is_err());
        assert!("".parse::<ProposalType>().is_err());
    }

    #[test]
    fn indexer_type_round_trips_through_display() {
        for proposal_type in ProposalType::ALL {
            assert_eq!(
                proposal_type.as_str().parse::<ProposalType>().as_ref(),
                Ok(proposal_type)
            );
        }
    }
}

//! Diplomatic proposal and response records.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::nation::NationId;
use crate::territory::ResourceKind;
use crate::trace::WeightFactor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Alliance,
    Truce,
    NonAggression,
    TradeAgreement,
    /// The proposer gifts resources to the target.
    ResourceAid,
    /// The proposer asks the target to lift sanctions against it.
    LiftSanctions,
}

impl ProposalKind {
    pub const ALL: &'static [Self] = &[
        Self::Alliance,
        Self::Truce,
        Self::NonAggression,
        Self::TradeAgreement,
        Self::ResourceAid,
        Self::LiftSanctions,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Alliance => "alliance",
            Self::Truce => "truce",
            Self::NonAggression => "non_aggression",
            Self::TradeAgreement => "trade_agreement",
            Self::ResourceAid => "resource_aid",
            Self::LiftSanctions => "lift_sanctions",
        }
    }

    /// DIP spent by the proposer just to table the offer.
    #[must_use]
    pub const fn dip_cost(self) -> i32 {
        match self {
            Self::Alliance => 15,
            Self::Truce => 5,
            Self::NonAggression => 10,
            Self::TradeAgreement => 8,
            Self::ResourceAid => 4,
            Self::LiftSanctions => 12,
        }
    }

    /// Minimum evaluation score the target needs to accept.
    #[must_use]
    pub const fn acceptance_threshold(self) -> f32 {
        match self {
            Self::Alliance => 40.0,
            Self::Truce => 0.0,
            Self::NonAggression => 15.0,
            Self::TradeAgreement => 10.0,
            Self::ResourceAid => -20.0,
            Self::LiftSanctions => 20.0,
        }
    }

    #[must_use]
    pub const fn default_duration(self) -> u32 {
        match self {
            Self::Truce => 5,
            Self::NonAggression => 10,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn is_peace_deal(self) -> bool {
        matches!(self, Self::Truce | Self::NonAggression)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProposalTerms {
    #[serde(default)]
    pub duration_turns: u32,
    /// DIP the proposer pays the target if the deal is accepted.
    #[serde(default)]
    pub dip_offered: i32,
    #[serde(default)]
    pub resource: Option<ResourceKind>,
    #[serde(default)]
    pub amount: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyProposal {
    #[serde(default)]
    pub id: u64,
    pub proposer: NationId,
    pub target: NationId,
    pub kind: ProposalKind,
    #[serde(default)]
    pub terms: ProposalTerms,
    /// Free text shown to the recipient.
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub turn: u32,
}

impl DiplomacyProposal {
    /// Draft a proposal with the kind's default terms.
    #[must_use]
    pub fn new(proposer: impl Into<String>, target: impl Into<String>, kind: ProposalKind) -> Self {
        Self {
            id: 0,
            proposer: NationId::new(proposer),
            target: NationId::new(target),
            kind,
            terms: ProposalTerms {
                duration_turns: kind.default_duration(),
                ..ProposalTerms::default()
            },
            message: String::new(),
            turn: 0,
        }
    }

    #[must_use]
    pub fn with_dip_offered(mut self, dip: i32) -> Self {
        self.terms.dip_offered = dip.max(0);
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: ResourceKind, amount: f32) -> Self {
        self.terms.resource = Some(resource);
        self.terms.amount = amount.max(0.0);
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// DIP the proposer must hold to table this proposal.
    #[must_use]
    pub const fn required_dip(&self) -> i32 {
        self.kind.dip_cost().saturating_add(self.terms.dip_offered)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiplomacyResponse {
    pub proposal_id: u64,
    pub accepted: bool,
    pub score: f32,
    pub threshold: f32,
    pub factors: SmallVec<[WeightFactor; 8]>,
    #[serde(default)]
    pub counter_offer: Option<ProposalTerms>,
    /// i18n key describing the response.
    pub message: String,
}

/// A resolved proposal kept for the diplomacy history panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub proposal: DiplomacyProposal,
    pub response: DiplomacyResponse,
}

#[derive(Debug, Error, PartialEq)]
pub enum DiplomacyError {
    #[error("unknown nation `{0}`")]
    UnknownNation(NationId),
    #[error("a nation cannot negotiate with itself")]
    SelfTarget,
    #[error("nation `{0}` has been eliminated")]
    Eliminated(NationId),
    #[error("insufficient DIP: need {required}, have {available}")]
    InsufficientDip { required: i32, available: i32 },
    #[error("`{imposer}` already sanctions `{target}`")]
    AlreadySanctioned { imposer: NationId, target: NationId },
    #[error("`{imposer}` does not sanction `{target}`")]
    NotSanctioned { imposer: NationId, target: NationId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_default_duration_and_terms() {
        let proposal = DiplomacyProposal::new("usa", "ussr", ProposalKind::Truce)
            .with_dip_offered(-4)
            .with_message("Let us talk");
        assert_eq!(proposal.terms.duration_turns, 5);
        assert_eq!(proposal.terms.dip_offered, 0);
        assert_eq!(proposal.required_dip(), 5);
        assert_eq!(proposal.message, "Let us talk");
    }

    #[test]
    fn every_kind_has_distinct_key() {
        let mut keys: Vec<_> = ProposalKind::ALL.iter().map(|k| k.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ProposalKind::ALL.len());
    }
}

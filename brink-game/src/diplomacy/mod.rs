//! Diplomacy: influence currency, proposals, AI evaluation and sanctions.

pub mod currency;
pub mod evaluation;
pub mod proposal;
pub mod sanctions;

pub use currency::{
    DipTransaction, DiplomaticInfluence, apply_dip_income, calculate_dip_income, can_afford,
    earn_dip, initialize_dip, spend_dip,
};
pub use evaluation::{
    RelationshipScore, calculate_relationship_score, evaluate_proposal, submit_proposal,
};
pub use proposal::{
    DiplomacyError, DiplomacyProposal, DiplomacyResponse, ProposalKind, ProposalRecord,
    ProposalTerms,
};
pub use sanctions::{impose_sanctions, lift_sanctions, sanction_multiplier};

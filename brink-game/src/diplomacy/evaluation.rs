//! AI evaluation of diplomatic proposals.
//!
//! The recipient scores the proposer with [`calculate_relationship_score`],
//! layers proposal-specific modifiers on top, and accepts when the total
//! clears the kind's threshold.
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    ACCEPT_RELATIONSHIP_BONUS, ACCEPT_TRUST_BONUS, BASELINE_TRUST, CHAOTIC_NOISE,
    COUNTER_OFFER_WINDOW, DESPERATION_BONUS, DESPERATION_INSTABILITY, DESPERATION_MORALE,
    DIP_OFFER_WEIGHT, FAVOR_SCORE_CAP, FAVOR_WEIGHT, INTIMIDATION_BONUS, INTIMIDATION_RATIO,
    PROPOSAL_HISTORY_LIMIT, REJECT_RELATIONSHIP_PENALTY, RELATIONSHIP_WEIGHT,
    SANCTION_SCORE_PENALTY, THREAT_WEIGHT, TREATY_ALLIANCE_BONUS, TREATY_MINOR_BONUS,
    TRUST_WEIGHT,
};
use crate::diplomacy::currency::{earn_dip, spend_dip};
use crate::diplomacy::proposal::{
    DiplomacyError, DiplomacyProposal, DiplomacyResponse, ProposalKind, ProposalRecord,
    ProposalTerms,
};
use crate::journal::{Severity, TurnEventKind};
use crate::nation::{AiPersonality, Nation};
use crate::numbers::{i32_to_f32, round_f32_to_i32};
use crate::relations::{adjust_mutual_relationship, adjust_relationship, adjust_trust, grant_favor};
use crate::state::GameState;
use crate::territory::{stockpile_amount, transfer_resources};
use crate::trace::WeightFactor;
use crate::treaties::{establish_truce, is_allied, open_trade, sign_alliance, sign_non_aggression};

/// Weighted opinion one nation holds of another, with its breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipScore {
    pub total: f32,
    pub factors: SmallVec<[WeightFactor; 8]>,
}

/// Score how favorably `evaluator` views `other`, in `-100..=100`.
#[must_use]
pub fn calculate_relationship_score(evaluator: &Nation, other: &Nation) -> RelationshipScore {
    let id = other.id.as_str();
    let mut factors: SmallVec<[WeightFactor; 8]> = SmallVec::new();
    let mut push = |label: &str, value: f32| {
        if value.abs() > f32::EPSILON {
            factors.push(WeightFactor::new(label, value));
        }
    };

    push(
        "relationship",
        i32_to_f32(evaluator.relationship_with(id)) * RELATIONSHIP_WEIGHT,
    );
    push(
        "trust",
        (evaluator.trust_in(id) - BASELINE_TRUST) * TRUST_WEIGHT,
    );
    // A negative balance means the evaluator owes `other`, which makes it more pliable.
    let owed = i32_to_f32(-evaluator.favor_balance(id)) * FAVOR_WEIGHT;
    push("favors", owed.clamp(-FAVOR_SCORE_CAP, FAVOR_SCORE_CAP));

    if let Some(treaty) = evaluator.treaty_with(id) {
        let mut bonus = 0.0;
        if treaty.alliance {
            bonus += TREATY_ALLIANCE_BONUS;
        }
        if treaty.truce_turns > 0 {
            bonus += TREATY_MINOR_BONUS;
        }
        if treaty.non_aggression_turns > 0 {
            bonus += TREATY_MINOR_BONUS;
        }
        if treaty.trade {
            bonus += TREATY_MINOR_BONUS;
        }
        push("treaties", bonus);
    }

    push("threat", -evaluator.threat_from(id) * THREAT_WEIGHT);
    if evaluator.sanctioned_by.contains(id) {
        push("sanctions", -SANCTION_SCORE_PENALTY);
    }

    let total: f32 = factors.iter().map(|f| f.value).sum();
    RelationshipScore {
        total: total.clamp(-100.0, 100.0),
        factors,
    }
}

const fn personality_modifier(personality: AiPersonality, kind: ProposalKind) -> f32 {
    use AiPersonality as P;
    use ProposalKind as K;
    match (personality, kind) {
        (P::Aggressive, K::Alliance | K::NonAggression | K::LiftSanctions) => -10.0,
        (P::Aggressive, K::Truce) => -15.0,
        (P::Aggressive, K::ResourceAid) => 5.0,
        (P::Defensive, K::Alliance | K::NonAggression) => 15.0,
        (P::Defensive, K::Truce) => 10.0,
        (P::Defensive, K::TradeAgreement) => 5.0,
        (P::Isolationist, K::Alliance) => -20.0,
        (P::Isolationist, K::Truce) => 5.0,
        (P::Isolationist, K::NonAggression) => 10.0,
        (P::Isolationist, K::TradeAgreement) => -10.0,
        (P::Isolationist, K::ResourceAid | K::LiftSanctions) => -5.0,
        (P::Trickster, K::LiftSanctions) => 5.0,
        (P::Trickster, _) => 10.0,
        _ => 0.0,
    }
}

/// Reasons a proposal is pointless regardless of opinion.
fn redundancy(proposal: &DiplomacyProposal, proposer: &Nation, target: &Nation) -> bool {
    let target_id = target.id.as_str();
    match proposal.kind {
        ProposalKind::Alliance => is_allied(proposer, target_id),
        ProposalKind::TradeAgreement => proposer.treaty_with(target_id).is_some_and(|t| t.trade),
        ProposalKind::LiftSanctions => !proposer.sanctioned_by.contains(target_id),
        ProposalKind::ResourceAid => match proposal.terms.resource {
            Some(kind) => {
                proposal.terms.amount <= 0.0
                    || stockpile_amount(proposer, kind) < proposal.terms.amount
            }
            None => true,
        },
        ProposalKind::Truce | ProposalKind::NonAggression => false,
    }
}

/// Decide how `target` answers `proposal` from `proposer`.
///
/// The RNG is only drawn for chaotic evaluators.
pub fn evaluate_proposal<R>(
    proposal: &DiplomacyProposal,
    proposer: &Nation,
    target: &Nation,
    rng: &mut R,
) -> DiplomacyResponse
where
    R: Rng + ?Sized,
{
    let kind = proposal.kind;
    let threshold = kind.acceptance_threshold();

    if redundancy(proposal, proposer, target) {
        return DiplomacyResponse {
            proposal_id: proposal.id,
            accepted: false,
            score: 0.0,
            threshold,
            factors: SmallVec::new(),
            counter_offer: None,
            message: format!("diplomacy.response.redundant.{}", kind.key()),
        };
    }

    let relation = calculate_relationship_score(target, proposer);
    let mut factors = relation.factors;
    let mut score = relation.total;
    let mut push = |label: &str, value: f32| {
        if value.abs() > f32::EPSILON {
            score += value;
            factors.push(WeightFactor::new(label, value));
        }
    };

    push("personality", personality_modifier(target.personality, kind));
    push(
        "dip_offered",
        i32_to_f32(proposal.terms.dip_offered) * DIP_OFFER_WEIGHT,
    );
    if kind.is_peace_deal() {
        if target.instability > DESPERATION_INSTABILITY || target.morale < DESPERATION_MORALE {
            push("desperation", DESPERATION_BONUS);
        }
        if proposer.strategic_power() > target.strategic_power() * INTIMIDATION_RATIO {
            push("intimidation", INTIMIDATION_BONUS);
        }
    }
    if target.personality == AiPersonality::Chaotic {
        push("chaos", rng.gen_range(-CHAOTIC_NOISE..=CHAOTIC_NOISE));
    }

    let accepted = score >= threshold;
    let shortfall = threshold - score;
    let counter_offer = if !accepted && shortfall <= COUNTER_OFFER_WINDOW {
        let extra = round_f32_to_i32((shortfall / DIP_OFFER_WEIGHT).ceil()).max(1);
        Some(ProposalTerms {
            dip_offered: proposal.terms.dip_offered.saturating_add(extra),
            ..proposal.terms.clone()
        })
    } else {
        None
    };

    let verdict = if accepted {
        "accept"
    } else if counter_offer.is_some() {
        "counter"
    } else {
        "reject"
    };

    DiplomacyResponse {
        proposal_id: proposal.id,
        accepted,
        score,
        threshold,
        factors,
        counter_offer,
        message: format!("diplomacy.response.{verdict}.{}", kind.key()),
    }
}

/// Table a proposal: validate, charge the DIP fee, let the target decide,
/// and enact the outcome.
///
/// # Errors
///
/// Returns an error when either nation is unknown or eliminated, when the
/// proposer targets itself, or when it cannot afford the fee plus the DIP
/// it offered.
pub fn submit_proposal<R>(
    state: &mut GameState,
    mut proposal: DiplomacyProposal,
    rng: &mut R,
) -> Result<DiplomacyResponse, DiplomacyError>
where
    R: Rng + ?Sized,
{
    if proposal.proposer == proposal.target {
        return Err(DiplomacyError::SelfTarget);
    }
    for id in [&proposal.proposer, &proposal.target] {
        let nation = state
            .nation(id.as_str())
            .ok_or_else(|| DiplomacyError::UnknownNation(id.clone()))?;
        if !nation.is_active() {
            return Err(DiplomacyError::Eliminated(id.clone()));
        }
    }

    proposal.id = state.next_proposal_id();
    proposal.turn = state.turn;
    let turn = state.turn;
    let (proposer, target) = state
        .pair_mut(proposal.proposer.as_str(), proposal.target.as_str())
        .ok_or_else(|| DiplomacyError::UnknownNation(proposal.target.clone()))?;

    let required = proposal.required_dip();
    if proposer.dip_points() < required {
        return Err(DiplomacyError::InsufficientDip {
            required,
            available: proposer.dip_points(),
        });
    }
    spend_dip(
        proposer,
        proposal.kind.dip_cost(),
        &format!("proposal.{}", proposal.kind.key()),
    );

    let response = evaluate_proposal(&proposal, proposer, target, rng);
    if response.accepted {
        enact(&proposal, proposer, target, turn);
    } else {
        adjust_relationship(proposer, &target.id, -REJECT_RELATIONSHIP_PENALTY);
    }
    log::debug!(
        "proposal {} {}->{} {:?} score {:.1}/{:.1} accepted={}",
        proposal.id,
        proposal.proposer,
        proposal.target,
        proposal.kind,
        response.score,
        response.threshold,
        response.accepted
    );

    let severity = if response.accepted {
        Severity::Info
    } else {
        Severity::Warning
    };
    state.emit(
        TurnEventKind::Diplomacy,
        severity,
        response.message.clone(),
        vec![proposal.proposer.clone(), proposal.target.clone()],
    );
    state.proposal_history.push(ProposalRecord {
        proposal,
        response: response.clone(),
    });
    if state.proposal_history.len() > PROPOSAL_HISTORY_LIMIT {
        state.proposal_history.remove(0);
    }
    Ok(response)
}

fn enact(proposal: &DiplomacyProposal, proposer: &mut Nation, target: &mut Nation, turn: u32) {
    let terms = &proposal.terms;
    if terms.dip_offered > 0 && spend_dip(proposer, terms.dip_offered, "proposal.sweetener") {
        earn_dip(target, terms.dip_offered, "proposal.sweetener");
    }
    match proposal.kind {
        ProposalKind::Alliance => sign_alliance(proposer, target, turn),
        ProposalKind::Truce => establish_truce(
            proposer,
            target,
            terms.duration_turns.max(1),
            turn,
        ),
        ProposalKind::NonAggression => sign_non_aggression(
            proposer,
            target,
            terms.duration_turns.max(1),
            turn,
        ),
        ProposalKind::TradeAgreement => open_trade(proposer, target, turn),
        ProposalKind::ResourceAid => {
            if let Some(kind) = terms.resource
                && transfer_resources(proposer, target, kind, terms.amount)
            {
                let favor = round_f32_to_i32((terms.amount / 10.0).ceil()).max(1);
                grant_favor(proposer, target, favor);
                adjust_relationship(target, &proposer.id, ACCEPT_RELATIONSHIP_BONUS);
            }
        }
        ProposalKind::LiftSanctions => {
            proposer.sanctioned_by.remove(&target.id);
        }
    }
    adjust_mutual_relationship(proposer, target, ACCEPT_RELATIONSHIP_BONUS);
    let proposer_id = proposer.id.clone();
    adjust_trust(proposer, &target.id, ACCEPT_TRUST_BONUS);
    adjust_trust(target, &proposer_id, ACCEPT_TRUST_BONUS);
}

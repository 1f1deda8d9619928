//! AI action selection.
//!
//! Each turn an AI nation scores every action it could plausibly take,
//! then draws one from the weighted pool. Scores depend on personality,
//! perceived threats, DEFCON, resources and open research.
use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::biolab::{BioLabError, construction_cost, release_pathogen, start_construction};
use crate::constants::{
    AI_ALLIANCE_SCORE, AI_BRINKMANSHIP_HOSTILITY, AI_ESCALATION_THREAT, AI_GOVERNMENT_REVIEW_TURNS,
    AI_IDLE_WEIGHT, AI_PATHOGEN_RELATIONSHIP, AI_SANCTION_RELATIONSHIP, AI_STRIKE_THREAT,
    AI_TRUCE_THREAT, BIOLAB_MAX_TIER, DEFCON_STRIKE_THRESHOLD, INFRASTRUCTURE_COST_PER_LEVEL,
    INFRASTRUCTURE_MAX, PATHOGEN_MIN_TIER, STANDARD_TEMPLATE_NAME, WARHEAD_PRODUCTION_COST,
};
use crate::cyber::{CyberAttackKind, CyberError, launch_cyber_attack};
use crate::diplomacy::{
    DiplomacyError, DiplomacyProposal, ProposalKind, calculate_relationship_score, can_afford,
    impose_sanctions, submit_proposal,
};
use crate::espionage::{EspionageError, EspionageOp, resolve_operation};
use crate::governance::{GovernmentKind, change_government, select_ai_government};
use crate::military::{
    MilitaryError, MilitaryTemplate, StrategicAsset, UnitKind, build_strategic, build_warhead,
    create_template, raise_formation,
};
use crate::nation::{AiPersonality, Nation, NationId};
use crate::numbers::i32_to_f32;
use crate::research::{ResearchError, ResearchTree, start_research};
use crate::rng::RngBundle;
use crate::state::{GameMode, GameState};
use crate::territory::{TerritoryError, develop_infrastructure};
use crate::trace::{DecisionTrace, WeightedCandidate, pick_weighted_index};
use crate::treaties::{at_peace, is_allied};
use crate::warfare::{
    DeliverySystem, WarfareError, escalate_defcon, interception_chance, launch_nuclear_strike,
};

/// Something an AI nation can do with its turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AiAction {
    Consolidate,
    StartResearch { node: String },
    BuildStrategic { asset: StrategicAsset },
    BuildWarhead { megatons: u16 },
    RaiseFormation,
    DevelopInfrastructure { territory: String },
    UpgradeBioLab { tier: u8 },
    Propose { target: NationId, kind: ProposalKind },
    ImposeSanctions { target: NationId },
    Espionage { target: NationId, op: EspionageOp },
    CyberAttack { target: NationId, kind: CyberAttackKind },
    ReleasePathogen { target: NationId },
    EscalateDefcon,
    NuclearStrike { target: NationId, delivery: DeliverySystem, megatons: u16 },
    ChangeGovernment { kind: GovernmentKind },
}

impl AiAction {
    /// Stable id used in decision traces and logs.
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Consolidate => "consolidate".to_string(),
            Self::StartResearch { node } => format!("research.{node}"),
            Self::BuildStrategic { asset } => format!("build.{}", asset.key()),
            Self::BuildWarhead { megatons } => format!("build.warhead.{megatons}"),
            Self::RaiseFormation => "military.raise_formation".to_string(),
            Self::DevelopInfrastructure { territory } => format!("infrastructure.{territory}"),
            Self::UpgradeBioLab { tier } => format!("biolab.tier.{tier}"),
            Self::Propose { target, kind } => format!("propose.{}.{target}", kind.key()),
            Self::ImposeSanctions { target } => format!("sanction.{target}"),
            Self::Espionage { target, op } => format!("espionage.{}.{target}", op.key()),
            Self::CyberAttack { target, kind } => format!("cyber.{}.{target}", kind.key()),
            Self::ReleasePathogen { target } => format!("pathogen.{target}"),
            Self::EscalateDefcon => "defcon.escalate".to_string(),
            Self::NuclearStrike {
                target,
                delivery,
                megatons,
            } => format!("strike.{}.{megatons}.{target}", delivery.key()),
            Self::ChangeGovernment { kind } => format!("government.{}", kind.key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiDecision {
    pub nation: NationId,
    pub action: AiAction,
    pub trace: DecisionTrace,
}

#[derive(Debug, Error, PartialEq)]
pub enum AiError {
    #[error("unknown nation `{0}`")]
    UnknownNation(NationId),
    #[error(transparent)]
    Diplomacy(#[from] DiplomacyError),
    #[error(transparent)]
    Research(#[from] ResearchError),
    #[error(transparent)]
    Espionage(#[from] EspionageError),
    #[error(transparent)]
    Cyber(#[from] CyberError),
    #[error(transparent)]
    Military(#[from] MilitaryError),
    #[error(transparent)]
    Warfare(#[from] WarfareError),
    #[error(transparent)]
    BioLab(#[from] BioLabError),
    #[error(transparent)]
    Territory(#[from] TerritoryError),
}

/// Appetite multipliers per personality.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Appetite {
    diplomacy: f32,
    economy: f32,
    research: f32,
    military: f32,
    espionage: f32,
    aggression: f32,
}

const fn appetite(personality: AiPersonality) -> Appetite {
    match personality {
        AiPersonality::Balanced => Appetite {
            diplomacy: 1.0,
            economy: 1.0,
            research: 1.0,
            military: 1.0,
            espionage: 1.0,
            aggression: 1.0,
        },
        AiPersonality::Aggressive => Appetite {
            diplomacy: 0.6,
            economy: 0.8,
            research: 0.8,
            military: 1.5,
            espionage: 1.0,
            aggression: 1.8,
        },
        AiPersonality::Defensive => Appetite {
            diplomacy: 1.2,
            economy: 1.0,
            research: 1.0,
            military: 1.3,
            espionage: 0.6,
            aggression: 0.4,
        },
        AiPersonality::Isolationist => Appetite {
            diplomacy: 0.4,
            economy: 1.4,
            research: 1.3,
            military: 0.9,
            espionage: 0.4,
            aggression: 0.5,
        },
        AiPersonality::Trickster => Appetite {
            diplomacy: 1.0,
            economy: 0.8,
            research: 0.9,
            military: 0.8,
            espionage: 1.8,
            aggression: 1.0,
        },
        AiPersonality::Chaotic => Appetite {
            diplomacy: 1.0,
            economy: 1.0,
            research: 1.0,
            military: 1.0,
            espionage: 1.2,
            aggression: 1.5,
        },
    }
}

/// The rival this nation fears or resents most.
fn pick_rival<'a>(state: &'a GameState, nation: &Nation) -> Option<&'a Nation> {
    let mut best: Option<(&Nation, f32)> = None;
    for other in state.nations.values() {
        if other.id == nation.id || !other.is_active() {
            continue;
        }
        let hostility = nation.threat_from(other.id.as_str())
            - i32_to_f32(nation.relationship_with(other.id.as_str())) / 2.0;
        if best.is_none_or(|(_, top)| hostility > top) {
            best = Some((other, hostility));
        }
    }
    best.map(|(other, _)| other)
}

/// The friendliest nation this one is not yet allied with.
fn pick_partner<'a>(state: &'a GameState, nation: &Nation) -> Option<(&'a Nation, f32)> {
    let mut best: Option<(&Nation, f32)> = None;
    for other in state.nations.values() {
        if other.id == nation.id || !other.is_active() || is_allied(nation, other.id.as_str()) {
            continue;
        }
        let score = calculate_relationship_score(nation, other).total;
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((other, score));
        }
    }
    best
}

fn proposal_for(nation: &Nation, partner: &Nation, score: f32) -> Option<ProposalKind> {
    if nation.sanctioned_by.contains(&partner.id)
        && can_afford(nation, ProposalKind::LiftSanctions.dip_cost())
    {
        return Some(ProposalKind::LiftSanctions);
    }
    let partner_id = partner.id.as_str();
    let treaty = nation.treaty_with(partner_id);
    let kind = if score >= AI_ALLIANCE_SCORE {
        ProposalKind::Alliance
    } else if nation.threat_from(partner_id) >= AI_TRUCE_THREAT && !at_peace(nation, partner_id) {
        ProposalKind::Truce
    } else if treaty.is_none_or(|t| !t.trade) {
        ProposalKind::TradeAgreement
    } else if treaty.is_none_or(|t| t.non_aggression_turns == 0) {
        ProposalKind::NonAggression
    } else {
        return None;
    };
    can_afford(nation, kind.dip_cost()).then_some(kind)
}

fn standard_template_cost(nation: &Nation) -> i32 {
    nation.military.templates.get(STANDARD_TEMPLATE_NAME).map_or_else(
        || {
            MilitaryTemplate {
                name: STANDARD_TEMPLATE_NAME.to_string(),
                units: standard_template_units(),
            }
            .production_cost()
        },
        MilitaryTemplate::production_cost,
    )
}

fn standard_template_units() -> BTreeMap<UnitKind, u32> {
    BTreeMap::from([(UnitKind::Infantry, 6), (UnitKind::Armor, 2), (UnitKind::Artillery, 2)])
}

fn best_warhead_yield(nation: &Nation) -> Option<u16> {
    nation
        .unlocked_yields
        .iter()
        .rev()
        .copied()
        .find(|mt| nation.uranium >= i32::from(*mt))
}

fn strike_option(nation: &Nation, target: &Nation) -> Option<(DeliverySystem, u16)> {
    let megatons = nation.warheads.keys().next_back().copied()?;
    // Prefer the vehicle least likely to be shot down.
    let mut options: Vec<DeliverySystem> = DeliverySystem::ALL
        .into_iter()
        .filter(|delivery| match delivery {
            DeliverySystem::Missile => nation.missiles > 0,
            DeliverySystem::Bomber => nation.bombers > 0,
            DeliverySystem::Submarine => nation.submarines > 0,
        })
        .collect();
    options.sort_by(|a, b| {
        interception_chance(*a, target.defense).total_cmp(&interception_chance(*b, target.defense))
    });
    options.first().map(|delivery| (*delivery, megatons))
}

/// Score every action `nation` could take this turn, in a stable order.
#[must_use]
pub fn score_ai_actions(state: &GameState, nation: &str, tree: &ResearchTree) -> Vec<(AiAction, f32)> {
    let Some(me) = state.nation(nation) else {
        return Vec::new();
    };
    if !me.is_active() {
        return Vec::new();
    }
    let want = appetite(me.personality);
    let hostility = if state.mode == GameMode::Brinkmanship {
        AI_BRINKMANSHIP_HOSTILITY
    } else {
        1.0
    };
    let aggression = want.aggression * hostility;
    let max_threat = me.threats.values().copied().fold(0.0_f32, f32::max);
    let danger = 1.0 + max_threat / 50.0;
    let mut actions = vec![(AiAction::Consolidate, AI_IDLE_WEIGHT)];

    if me.research.is_none()
        && let Some(node) = tree
            .available_nodes(me)
            .into_iter()
            .filter(|node| me.production >= node.cost.production && me.intel >= node.cost.intel)
            .min_by_key(|node| node.cost.production + node.cost.intel)
    {
        actions.push((
            AiAction::StartResearch {
                node: node.id.clone(),
            },
            3.0 * want.research,
        ));
    }

    for (asset, base) in [
        (StrategicAsset::Missile, 1.2),
        (StrategicAsset::Defense, 1.0),
        (StrategicAsset::Bomber, 0.6),
        (StrategicAsset::Submarine, 0.5),
    ] {
        if me.production >= asset.production_cost() {
            let weight = match asset {
                StrategicAsset::Defense => base * want.military * (danger + 1.0 - want.aggression.min(1.0)),
                _ => base * want.military * danger,
            };
            actions.push((AiAction::BuildStrategic { asset }, weight));
        }
    }

    if me.production >= WARHEAD_PRODUCTION_COST
        && me.total_warheads() <= me.delivery_systems()
        && let Some(megatons) = best_warhead_yield(me)
    {
        actions.push((AiAction::BuildWarhead { megatons }, 1.2 * want.military * danger));
    }

    if me.production >= standard_template_cost(me) {
        actions.push((AiAction::RaiseFormation, 0.8 * want.military));
    }

    if let Some(territory) = state.territories.values().find(|territory| {
        territory.owner == me.id
            && territory.infrastructure < INFRASTRUCTURE_MAX
            && me.production >= INFRASTRUCTURE_COST_PER_LEVEL * (i32::from(territory.infrastructure) + 1)
    }) {
        actions.push((
            AiAction::DevelopInfrastructure {
                territory: territory.id.clone(),
            },
            1.2 * want.economy,
        ));
    }

    let next_tier = me.bio_lab.tier + 1;
    if me.bio_lab.construction.is_none() && next_tier <= me.bio_lab.max_tier.min(BIOLAB_MAX_TIER) {
        let cost = construction_cost(next_tier);
        if me.production >= cost.production && me.intel >= cost.intel {
            actions.push((AiAction::UpgradeBioLab { tier: next_tier }, 0.6 * want.research));
        }
    }

    if let Some((partner, score)) = pick_partner(state, me)
        && let Some(kind) = proposal_for(me, partner, score)
    {
        actions.push((
            AiAction::Propose {
                target: partner.id.clone(),
                kind,
            },
            2.0 * want.diplomacy,
        ));
    }

    if let Some(rival) = pick_rival(state, me) {
        let rival_id = rival.id.as_str();
        let relationship = me.relationship_with(rival_id);
        let threat = me.threat_from(rival_id);

        if relationship <= AI_SANCTION_RELATIONSHIP
            && !rival.sanctioned_by.contains(&me.id)
            && !is_allied(me, rival_id)
        {
            actions.push((
                AiAction::ImposeSanctions {
                    target: rival.id.clone(),
                },
                1.5 * aggression,
            ));
        }

        let op = if !me.intel_reports.contains_key(rival_id) {
            EspionageOp::Reconnaissance
        } else if rival.research.is_some() {
            EspionageOp::StealResearch
        } else if me.personality == AiPersonality::Trickster {
            EspionageOp::PlantEvidence
        } else if rival.instability >= 50.0 {
            EspionageOp::InciteUnrest
        } else {
            EspionageOp::Sabotage
        };
        if me.intel >= op.intel_cost() {
            actions.push((
                AiAction::Espionage {
                    target: rival.id.clone(),
                    op,
                },
                1.2 * want.espionage,
            ));
        }

        let readiness = me.cyber.as_ref().map_or(0.0, |cyber| cyber.readiness);
        let framed = state
            .nations
            .values()
            .find(|other| other.id != me.id && other.id != rival.id && other.is_active())
            .map(|other| other.id.clone());
        let kind = match framed {
            Some(framed) if me.personality == AiPersonality::Trickster => {
                CyberAttackKind::FalseFlag { framed }
            }
            _ if threat >= AI_ESCALATION_THREAT => CyberAttackKind::GridDisruption,
            _ => CyberAttackKind::Intrusion,
        };
        if readiness >= kind.readiness_cost() && !is_allied(me, rival_id) {
            actions.push((
                AiAction::CyberAttack {
                    target: rival.id.clone(),
                    kind,
                },
                want.espionage * aggression.sqrt(),
            ));
        }

        if me.bio_lab.tier >= PATHOGEN_MIN_TIER && relationship <= AI_PATHOGEN_RELATIONSHIP {
            actions.push((
                AiAction::ReleasePathogen {
                    target: rival.id.clone(),
                },
                0.4 * aggression,
            ));
        }

        if threat >= AI_ESCALATION_THREAT && state.defcon > DEFCON_STRIKE_THRESHOLD {
            actions.push((AiAction::EscalateDefcon, 0.5 * aggression));
        }

        if state.defcon <= DEFCON_STRIKE_THRESHOLD
            && threat >= AI_STRIKE_THREAT
            && !at_peace(me, rival_id)
            && let Some((delivery, megatons)) = strike_option(me, rival)
        {
            actions.push((
                AiAction::NuclearStrike {
                    target: rival.id.clone(),
                    delivery,
                    megatons,
                },
                0.5 * aggression,
            ));
        }
    }

    let preferred = select_ai_government(me);
    let since = me.government_state.as_ref().map_or(0, |gov| gov.since_turn);
    if preferred != me.government_kind()
        && state.turn.saturating_sub(since) >= AI_GOVERNMENT_REVIEW_TURNS
    {
        actions.push((AiAction::ChangeGovernment { kind: preferred }, 0.5));
    }

    actions
}

/// Draw one action from the scored pool.
pub fn choose_ai_action<R>(
    state: &GameState,
    nation: &str,
    tree: &ResearchTree,
    rng: &mut R,
) -> Option<AiDecision>
where
    R: Rng + ?Sized,
{
    let scored = score_ai_actions(state, nation, tree);
    let weights: Vec<f32> = scored.iter().map(|(_, weight)| *weight).collect();
    let (idx, roll) = pick_weighted_index(&weights, rng)?;
    let (action, _) = scored.get(idx)?.clone();
    let trace = DecisionTrace {
        pool_id: format!("ai.actions.{nation}"),
        roll,
        candidates: scored
            .iter()
            .map(|(candidate, weight)| WeightedCandidate::flat(candidate.id(), *weight))
            .collect(),
        chosen_id: action.id(),
    };
    Some(AiDecision {
        nation: NationId::from(nation),
        action,
        trace,
    })
}

fn ensure_standard_template(nation: &mut Nation) -> Result<(), MilitaryError> {
    if nation.military.templates.contains_key(STANDARD_TEMPLATE_NAME) {
        return Ok(());
    }
    create_template(nation, STANDARD_TEMPLATE_NAME, standard_template_units())
}

/// Carry out `action` for `nation`. Random rolls come from the stream that
/// owns the affected system.
///
/// # Errors
///
/// Propagates the failing subsystem's error; the state is left as that
/// subsystem leaves it.
pub fn execute_ai_action(
    state: &mut GameState,
    nation: &str,
    action: &AiAction,
    tree: &ResearchTree,
    rngs: &RngBundle,
) -> Result<(), AiError> {
    let missing = || AiError::UnknownNation(NationId::from(nation));
    log::debug!("{nation} executes {}", action.id());
    match action {
        AiAction::Consolidate => {}
        AiAction::StartResearch { node } => {
            let me = state.nation_mut(nation).ok_or_else(missing)?;
            start_research(me, tree, node)?;
        }
        AiAction::BuildStrategic { asset } => {
            let me = state.nation_mut(nation).ok_or_else(missing)?;
            build_strategic(me, *asset)?;
        }
        AiAction::BuildWarhead { megatons } => {
            let me = state.nation_mut(nation).ok_or_else(missing)?;
            build_warhead(me, *megatons)?;
        }
        AiAction::RaiseFormation => {
            let me = state.nation_mut(nation).ok_or_else(missing)?;
            ensure_standard_template(me)?;
            raise_formation(me, STANDARD_TEMPLATE_NAME)?;
        }
        AiAction::DevelopInfrastructure { territory } => {
            develop_infrastructure(state, nation, territory)?;
        }
        AiAction::UpgradeBioLab { tier } => {
            let me = state.nation_mut(nation).ok_or_else(missing)?;
            start_construction(me, *tier)?;
        }
        AiAction::Propose { target, kind } => {
            let proposal = DiplomacyProposal::new(nation, target.as_str(), *kind);
            submit_proposal(state, proposal, &mut *rngs.diplomacy())?;
        }
        AiAction::ImposeSanctions { target } => {
            impose_sanctions(state, nation, target.as_str())?;
        }
        AiAction::Espionage { target, op } => {
            resolve_operation(state, nation, target.as_str(), *op, &mut *rngs.espionage())?;
        }
        AiAction::CyberAttack { target, kind } => {
            launch_cyber_attack(
                state,
                nation,
                target.as_str(),
                kind.clone(),
                &mut *rngs.espionage(),
            )?;
        }
        AiAction::ReleasePathogen { target } => {
            release_pathogen(state, nation, target.as_str(), &mut *rngs.espionage())?;
        }
        AiAction::EscalateDefcon => {
            escalate_defcon(state, nation);
        }
        AiAction::NuclearStrike {
            target,
            delivery,
            megatons,
        } => {
            launch_nuclear_strike(
                state,
                nation,
                target.as_str(),
                *delivery,
                *megatons,
                &mut *rngs.warfare(),
            )?;
        }
        AiAction::ChangeGovernment { kind } => {
            let turn = state.turn;
            let me = state.nation_mut(nation).ok_or_else(missing)?;
            change_government(me, *kind, turn);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::add_threat;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn world() -> GameState {
        let mut usa = Nation::new("usa", "United States");
        usa.is_player = true;
        let mut ussr = Nation::new("ussr", "Soviet Union");
        ussr.personality = AiPersonality::Aggressive;
        ussr.production = 200;
        ussr.intel = 40;
        let uk = Nation::new("uk", "United Kingdom");
        GameState::from_nations(vec![usa, ussr, uk], NationId::from("usa"))
    }

    fn has(actions: &[(AiAction, f32)], pred: impl Fn(&AiAction) -> bool) -> bool {
        actions.iter().any(|(action, _)| pred(action))
    }

    #[test]
    fn scoring_is_stable_and_positive() {
        let state = world();
        let tree = ResearchTree::default_catalog();
        let first = score_ai_actions(&state, "ussr", tree);
        assert_eq!(first, score_ai_actions(&state, "ussr", tree));
        assert_eq!(first.first().map(|(a, _)| a), Some(&AiAction::Consolidate));
        assert!(first.iter().all(|(_, weight)| *weight > 0.0));
        assert!(has(&first, |a| matches!(a, AiAction::StartResearch { .. })));
        assert!(has(&first, |a| matches!(a, AiAction::Espionage { op: EspionageOp::Reconnaissance, .. })));
    }

    #[test]
    fn strikes_require_low_defcon_and_high_threat() {
        let mut state = world();
        let tree = ResearchTree::default_catalog();
        {
            let ussr = state.nation_mut("ussr").unwrap();
            ussr.missiles = 2;
            ussr.warheads.insert(10, 2);
            add_threat(ussr, &NationId::from("usa"), 90.0);
        }
        state.defcon = 4;
        let calm = score_ai_actions(&state, "ussr", tree);
        assert!(!has(&calm, |a| matches!(a, AiAction::NuclearStrike { .. })));
        assert!(has(&calm, |a| matches!(a, AiAction::EscalateDefcon)));

        state.defcon = 2;
        let hot = score_ai_actions(&state, "ussr", tree);
        assert!(has(&hot, |a| matches!(
            a,
            AiAction::NuclearStrike { target, delivery: DeliverySystem::Missile, megatons: 10 } if target.as_str() == "usa"
        )));
    }

    #[test]
    fn brinkmanship_mode_raises_hostile_weights() {
        let mut state = world();
        let tree = ResearchTree::default_catalog();
        add_threat(state.nation_mut("ussr").unwrap(), &NationId::from("usa"), 60.0);
        let weight_of = |state: &GameState| {
            score_ai_actions(state, "ussr", tree)
                .into_iter()
                .find(|(a, _)| matches!(a, AiAction::EscalateDefcon))
                .map(|(_, w)| w)
                .unwrap()
        };
        let standard = weight_of(&state);
        state.mode = GameMode::Brinkmanship;
        assert!(weight_of(&state) > standard);
    }

    #[test]
    fn eliminated_nations_have_no_actions() {
        let mut state = world();
        state.nation_mut("ussr").unwrap().eliminated = true;
        assert!(score_ai_actions(&state, "ussr", ResearchTree::default_catalog()).is_empty());
        assert!(score_ai_actions(&state, "nowhere", ResearchTree::default_catalog()).is_empty());
    }

    #[test]
    fn decisions_are_traced_and_deterministic() {
        let state = world();
        let tree = ResearchTree::default_catalog();
        let mut a = SmallRng::seed_from_u64(5);
        let mut b = SmallRng::seed_from_u64(5);
        let left = choose_ai_action(&state, "ussr", tree, &mut a).unwrap();
        let right = choose_ai_action(&state, "ussr", tree, &mut b).unwrap();
        assert_eq!(left, right);
        assert_eq!(left.trace.chosen_id, left.action.id());
        assert_eq!(left.trace.pool_id, "ai.actions.ussr");
    }

    #[test]
    fn raising_a_formation_creates_the_standard_template() {
        let mut state = world();
        let tree = ResearchTree::default_catalog();
        let rngs = RngBundle::from_user_seed(3);
        execute_ai_action(&mut state, "ussr", &AiAction::RaiseFormation, tree, &rngs).unwrap();
        let ussr = state.nation("ussr").unwrap();
        assert!(ussr.military.templates.contains_key(STANDARD_TEMPLATE_NAME));
        assert_eq!(ussr.military.formations.len(), 1);
    }

    #[test]
    fn failed_actions_surface_module_errors() {
        let mut state = world();
        let tree = ResearchTree::default_catalog();
        let rngs = RngBundle::from_user_seed(3);
        let err = execute_ai_action(
            &mut state,
            "usa",
            &AiAction::BuildWarhead { megatons: 50 },
            tree,
            &rngs,
        );
        assert_eq!(err, Err(AiError::Military(MilitaryError::YieldLocked(50))));
        let err = execute_ai_action(&mut state, "mars", &AiAction::RaiseFormation, tree, &rngs);
        assert_eq!(err, Err(AiError::UnknownNation(NationId::from("mars"))));
    }
}

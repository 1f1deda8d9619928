//! Covert intelligence operations.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ESPIONAGE_DETECTED_RELATIONSHIP, ESPIONAGE_DETECTED_THREAT, ESPIONAGE_DETECTED_TRUST,
    ESPIONAGE_FAILURE_DETECTION_BONUS, INCITE_OPINION, INCITE_INSTABILITY, MAX_CHANCE,
    MIN_CHANCE, PLANT_EVIDENCE_RELATIONSHIP, PLANT_EVIDENCE_TRUST, SABOTAGE_PRODUCTION,
    STOLEN_DOCUMENTS_INTEL,
};
use crate::governance::GovernmentKind;
use crate::journal::{Severity, TurnEventKind};
use crate::nation::{Nation, NationId};
use crate::relations::{add_threat, adjust_relationship, adjust_trust};
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EspionageOp {
    Reconnaissance,
    StealResearch,
    Sabotage,
    InciteUnrest,
    /// Sour the target on its closest partner.
    PlantEvidence,
}

impl EspionageOp {
    pub const ALL: [Self; 5] = [
        Self::Reconnaissance,
        Self::StealResearch,
        Self::Sabotage,
        Self::InciteUnrest,
        Self::PlantEvidence,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Reconnaissance => "reconnaissance",
            Self::StealResearch => "steal_research",
            Self::Sabotage => "sabotage",
            Self::InciteUnrest => "incite_unrest",
            Self::PlantEvidence => "plant_evidence",
        }
    }

    #[must_use]
    pub const fn intel_cost(self) -> i32 {
        match self {
            Self::Reconnaissance => 5,
            Self::StealResearch => 15,
            Self::Sabotage => 12,
            Self::InciteUnrest => 10,
            Self::PlantEvidence => 8,
        }
    }

    #[must_use]
    pub const fn base_success(self) -> f32 {
        match self {
            Self::Reconnaissance => 0.75,
            Self::StealResearch => 0.4,
            Self::Sabotage => 0.5,
            Self::InciteUnrest => 0.5,
            Self::PlantEvidence => 0.45,
        }
    }

    #[must_use]
    pub const fn base_detection(self) -> f32 {
        match self {
            Self::Reconnaissance => 0.15,
            Self::StealResearch => 0.35,
            Self::Sabotage => 0.3,
            Self::InciteUnrest => 0.25,
            Self::PlantEvidence => 0.3,
        }
    }
}

/// Snapshot of a rival gathered by reconnaissance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntelReport {
    pub turn: u32,
    pub production: i32,
    pub intel: i32,
    pub uranium: i32,
    pub population: f32,
    pub missiles: u32,
    pub bombers: u32,
    pub submarines: u32,
    pub defense: u32,
    pub warheads: u32,
    pub researched: usize,
    #[serde(default)]
    pub current_research: Option<String>,
    pub government: GovernmentKind,
    pub morale: f32,
    pub instability: f32,
}

impl IntelReport {
    #[must_use]
    pub fn snapshot(target: &Nation, turn: u32) -> Self {
        Self {
            turn,
            production: target.production,
            intel: target.intel,
            uranium: target.uranium,
            population: target.population,
            missiles: target.missiles,
            bombers: target.bombers,
            submarines: target.submarines,
            defense: target.defense,
            warheads: target.total_warheads(),
            researched: target.researched.len(),
            current_research: target.research.as_ref().map(|r| r.node_id.clone()),
            government: target.government_kind(),
            morale: target.morale,
            instability: target.instability,
        }
    }

    #[must_use]
    pub const fn age(&self, turn: u32) -> u32 {
        turn.saturating_sub(self.turn)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EspionageReport {
    pub attacker: NationId,
    pub target: NationId,
    pub op: EspionageOp,
    pub success: bool,
    pub detected: bool,
    pub success_chance: f32,
    pub detection_chance: f32,
    /// Node whose progress was lifted by a successful theft.
    #[serde(default)]
    pub stolen_research: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum EspionageError {
    #[error("unknown nation `{0}`")]
    UnknownNation(NationId),
    #[error("a nation cannot spy on itself")]
    SelfTarget,
    #[error("nation `{0}` has been eliminated")]
    Eliminated(NationId),
    #[error("insufficient intel: need {required}, have {available}")]
    InsufficientIntel { required: i32, available: i32 },
}

#[must_use]
pub fn success_chance(op: EspionageOp, attacker: &Nation, target: &Nation) -> f32 {
    (op.base_success() + attacker.bonuses.espionage - target.bonuses.counter_intel)
        .clamp(MIN_CHANCE, MAX_CHANCE)
}

#[must_use]
pub fn detection_chance(op: EspionageOp, attacker: &Nation, target: &Nation, success: bool) -> f32 {
    let mut chance =
        op.base_detection() + target.bonuses.counter_intel - attacker.bonuses.espionage * 0.5;
    if !success {
        chance += ESPIONAGE_FAILURE_DETECTION_BONUS;
    }
    chance.clamp(MIN_CHANCE, MAX_CHANCE)
}

/// Run `op` against `target`. Two rolls are always drawn: success, then
/// detection.
///
/// # Errors
///
/// Fails for unknown, eliminated or identical nations and when the
/// attacker cannot pay the intel cost.
pub fn resolve_operation<R>(
    state: &mut GameState,
    attacker: &str,
    target: &str,
    op: EspionageOp,
    rng: &mut R,
) -> Result<EspionageReport, EspionageError>
where
    R: Rng + ?Sized,
{
    if attacker == target {
        return Err(EspionageError::SelfTarget);
    }
    for id in [attacker, target] {
        let nation = state
            .nation(id)
            .ok_or_else(|| EspionageError::UnknownNation(NationId::from(id)))?;
        if !nation.is_active() {
            return Err(EspionageError::Eliminated(nation.id.clone()));
        }
    }
    let turn = state.turn;
    let (spy, mark) = state
        .pair_mut(attacker, target)
        .ok_or_else(|| EspionageError::UnknownNation(NationId::from(target)))?;
    let cost = op.intel_cost();
    if spy.intel < cost {
        return Err(EspionageError::InsufficientIntel {
            required: cost,
            available: spy.intel,
        });
    }
    spy.intel -= cost;

    let success_chance = success_chance(op, spy, mark);
    let success = rng.r#gen::<f32>() < success_chance;
    let detection_chance = detection_chance(op, spy, mark, success);
    let detected = rng.r#gen::<f32>() < detection_chance;

    let mut stolen_research = None;
    if success {
        match op {
            EspionageOp::Reconnaissance => {
                spy.intel_reports
                    .insert(mark.id.clone(), IntelReport::snapshot(mark, turn));
            }
            EspionageOp::StealResearch => stolen_research = steal_research(spy, mark),
            EspionageOp::Sabotage => {
                mark.production = (mark.production - SABOTAGE_PRODUCTION).max(0);
                mark.defense = mark.defense.saturating_sub(1);
            }
            EspionageOp::InciteUnrest => {
                mark.adjust_instability(INCITE_INSTABILITY);
                mark.adjust_public_opinion(-INCITE_OPINION);
            }
            EspionageOp::PlantEvidence => plant_evidence(mark, &spy.id),
        }
    }
    if detected {
        adjust_relationship(mark, &spy.id, -ESPIONAGE_DETECTED_RELATIONSHIP);
        adjust_trust(mark, &spy.id, -ESPIONAGE_DETECTED_TRUST);
        add_threat(mark, &spy.id, ESPIONAGE_DETECTED_THREAT);
    }

    let report = EspionageReport {
        attacker: spy.id.clone(),
        target: mark.id.clone(),
        op,
        success,
        detected,
        success_chance,
        detection_chance,
        stolen_research,
    };
    log::debug!(
        "espionage {} {} -> {}: success={success} detected={detected}",
        op.key(),
        report.attacker,
        report.target
    );
    if detected {
        state.emit(
            TurnEventKind::Espionage,
            Severity::Warning,
            format!("log.espionage.{}.detected", op.key()),
            vec![report.attacker.clone(), report.target.clone()],
        );
    } else if success && report.attacker == state.player_id {
        state.emit(
            TurnEventKind::Espionage,
            Severity::Info,
            format!("log.espionage.{}.success", op.key()),
            vec![report.attacker.clone(), report.target.clone()],
        );
    }
    Ok(report)
}

/// Lift the spy's current project to completion when the mark already knows
/// it; otherwise the documents are worth raw intel.
fn steal_research(spy: &mut Nation, mark: &Nation) -> Option<String> {
    if let Some(progress) = spy.research.as_mut()
        && mark.researched.contains(&progress.node_id)
    {
        progress.progress = progress.turns_required;
        return Some(progress.node_id.clone());
    }
    spy.intel = spy.intel.saturating_add(STOLEN_DOCUMENTS_INTEL);
    None
}

fn plant_evidence(mark: &mut Nation, spy: &NationId) {
    let partner = mark
        .relationships
        .iter()
        .filter(|(id, _)| *id != spy)
        .max_by_key(|(_, value)| **value)
        .map(|(id, _)| id.clone());
    if let Some(partner) = partner {
        adjust_relationship(mark, &partner, -PLANT_EVIDENCE_RELATIONSHIP);
        adjust_trust(mark, &partner, -PLANT_EVIDENCE_TRUST);
    }
}

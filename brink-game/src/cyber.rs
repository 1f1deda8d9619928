//! Cyber warfare: readiness, intrusions, grid attacks and false flags.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    CYBER_ATTRIBUTION_BASE, CYBER_ATTRIBUTION_FAILURE_BONUS, CYBER_ATTRIBUTION_RELATIONSHIP,
    CYBER_ATTRIBUTION_THREAT, CYBER_READINESS_MAX, CYBER_READINESS_REGEN, CYBER_SKILL_SCALE,
    FALSE_FLAG_RELATIONSHIP, FALSE_FLAG_THREAT, GRID_DISRUPTION_MORALE,
    GRID_DISRUPTION_PRODUCTION, INTRUSION_INTEL_STOLEN, MAX_CHANCE, MIN_CHANCE,
};
use crate::journal::{Severity, TurnEventKind};
use crate::nation::{Nation, NationId};
use crate::numbers::clamp_percent;
use crate::relations::{add_threat, adjust_relationship};
use crate::state::GameState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyberState {
    /// Capacity available for operations this turn, `0..=100`.
    #[serde(default = "default_readiness")]
    pub readiness: f32,
    #[serde(default)]
    pub offense: f32,
    #[serde(default)]
    pub defense: f32,
    #[serde(default)]
    pub attacks_launched: u32,
}

const fn default_readiness() -> f32 {
    50.0
}

impl Default for CyberState {
    fn default() -> Self {
        Self {
            readiness: default_readiness(),
            offense: 0.0,
            defense: 0.0,
            attacks_launched: 0,
        }
    }
}

impl CyberState {
    pub fn regenerate(&mut self) {
        self.readiness = (self.readiness + CYBER_READINESS_REGEN).min(CYBER_READINESS_MAX);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CyberAttackKind {
    /// Exfiltrate intelligence.
    Intrusion,
    /// Knock out power and logistics.
    GridDisruption,
    /// Plant evidence so the target blames `framed`.
    FalseFlag { framed: NationId },
}

impl CyberAttackKind {
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Intrusion => "intrusion",
            Self::GridDisruption => "grid_disruption",
            Self::FalseFlag { .. } => "false_flag",
        }
    }

    #[must_use]
    pub const fn readiness_cost(&self) -> f32 {
        match self {
            Self::Intrusion => 20.0,
            Self::GridDisruption => 35.0,
            Self::FalseFlag { .. } => 30.0,
        }
    }

    #[must_use]
    pub const fn base_success(&self) -> f32 {
        match self {
            Self::Intrusion => 0.6,
            Self::GridDisruption => 0.45,
            Self::FalseFlag { .. } => 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyberOutcome {
    pub attacker: NationId,
    pub target: NationId,
    pub kind: CyberAttackKind,
    pub success: bool,
    /// Whether the target traced the attack back to the attacker.
    pub attributed: bool,
    pub success_chance: f32,
    pub attribution_chance: f32,
}

#[derive(Debug, Error, PartialEq)]
pub enum CyberError {
    #[error("unknown nation `{0}`")]
    UnknownNation(NationId),
    #[error("a nation cannot attack itself")]
    SelfTarget,
    #[error("nation `{0}` has been eliminated")]
    Eliminated(NationId),
    #[error("insufficient cyber readiness: need {required}, have {available}")]
    InsufficientReadiness { required: f32, available: f32 },
    #[error("cannot frame `{0}`")]
    InvalidFrame(NationId),
}

fn cyber_of(nation: &Nation) -> CyberState {
    nation.cyber.clone().unwrap_or_default()
}

/// Run a cyber operation against `target`.
///
/// Two rolls are always drawn: success, then attribution.
///
/// # Errors
///
/// Fails for unknown, eliminated or identical nations, an invalid frame
/// target, or when readiness is too low. Nothing is spent on error.
pub fn launch_cyber_attack<R>(
    state: &mut GameState,
    attacker: &str,
    target: &str,
    kind: CyberAttackKind,
    rng: &mut R,
) -> Result<CyberOutcome, CyberError>
where
    R: Rng + ?Sized,
{
    if attacker == target {
        return Err(CyberError::SelfTarget);
    }
    for id in [attacker, target] {
        let nation = state
            .nation(id)
            .ok_or_else(|| CyberError::UnknownNation(NationId::from(id)))?;
        if !nation.is_active() {
            return Err(CyberError::Eliminated(nation.id.clone()));
        }
    }
    if let CyberAttackKind::FalseFlag { framed } = &kind
        && (framed.as_str() == attacker
            || framed.as_str() == target
            || !state.nation(framed.as_str()).is_some_and(Nation::is_active))
    {
        return Err(CyberError::InvalidFrame(framed.clone()));
    }

    let (attacker_nation, target_nation) = state
        .pair_mut(attacker, target)
        .ok_or_else(|| CyberError::UnknownNation(NationId::from(target)))?;
    let offense = cyber_of(attacker_nation);
    let defense = cyber_of(target_nation);
    let cost = kind.readiness_cost();
    if offense.readiness < cost {
        return Err(CyberError::InsufficientReadiness {
            required: cost,
            available: offense.readiness,
        });
    }

    let success_chance = (kind.base_success()
        + (offense.offense - defense.defense) / CYBER_SKILL_SCALE)
        .clamp(MIN_CHANCE, MAX_CHANCE);
    let success = rng.r#gen::<f32>() < success_chance;
    let mut attribution_chance = CYBER_ATTRIBUTION_BASE
        + (defense.defense - offense.offense) / (2.0 * CYBER_SKILL_SCALE);
    if !success {
        attribution_chance += CYBER_ATTRIBUTION_FAILURE_BONUS;
    }
    let attribution_chance = attribution_chance.clamp(MIN_CHANCE, MAX_CHANCE);
    let attributed = rng.r#gen::<f32>() < attribution_chance;

    let state_ref = attacker_nation.cyber.get_or_insert_with(CyberState::default);
    state_ref.readiness = clamp_percent(state_ref.readiness - cost);
    state_ref.attacks_launched += 1;

    let mut framed_target = None;
    if success {
        match &kind {
            CyberAttackKind::Intrusion => {
                let stolen = INTRUSION_INTEL_STOLEN.min(target_nation.intel);
                target_nation.intel -= stolen;
                attacker_nation.intel = attacker_nation.intel.saturating_add(stolen);
            }
            CyberAttackKind::GridDisruption => {
                target_nation.production =
                    (target_nation.production - GRID_DISRUPTION_PRODUCTION).max(0);
                target_nation.adjust_morale(-GRID_DISRUPTION_MORALE);
            }
            CyberAttackKind::FalseFlag { framed } => {
                adjust_relationship(target_nation, framed, -FALSE_FLAG_RELATIONSHIP);
                add_threat(target_nation, framed, FALSE_FLAG_THREAT);
                framed_target = Some(framed.clone());
            }
        }
    }
    if attributed {
        adjust_relationship(
            target_nation,
            &attacker_nation.id,
            -CYBER_ATTRIBUTION_RELATIONSHIP,
        );
        add_threat(target_nation, &attacker_nation.id, CYBER_ATTRIBUTION_THREAT);
    }

    let outcome = CyberOutcome {
        attacker: attacker_nation.id.clone(),
        target: target_nation.id.clone(),
        kind,
        success,
        attributed,
        success_chance,
        attribution_chance,
    };
    log::debug!(
        "cyber {} {} -> {}: success={success} attributed={attributed}",
        outcome.kind.key(),
        outcome.attacker,
        outcome.target
    );

    let verdict = if success { "success" } else { "failure" };
    let mut involved = vec![outcome.target.clone()];
    if attributed {
        involved.insert(0, outcome.attacker.clone());
    }
    involved.extend(framed_target);
    state.emit(
        TurnEventKind::Cyber,
        if success { Severity::Warning } else { Severity::Info },
        format!("log.cyber.{}.{verdict}", outcome.kind.key()),
        involved,
    );
    Ok(outcome)
}

/// Restore readiness for every nation with a cyber program.
pub fn regenerate_readiness(nation: &mut Nation) {
    if let Some(cyber) = nation.cyber.as_mut() {
        cyber.regenerate();
    }
}

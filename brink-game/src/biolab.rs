//! Biological weapons laboratories.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    BIOLAB_BASE_TURNS, BIOLAB_DEFAULT_TIER_CAP, BIOLAB_INTEL_COST_PER_TIER, BIOLAB_INTEL_YIELD,
    BIOLAB_MAX_TIER, BIOLAB_PRODUCTION_COST_PER_TIER, PATHOGEN_DETECTION_BASE,
    PATHOGEN_DETECTION_STEP, PATHOGEN_DETECTED_RELATIONSHIP, PATHOGEN_DETECTED_THREAT,
    PATHOGEN_MIN_TIER, PATHOGEN_MORALE, PATHOGEN_POPULATION_PER_TIER,
    PATHOGEN_TARGET_RELATIONSHIP, MIN_CHANCE, MAX_CHANCE,
};
use crate::journal::{Severity, TurnEventKind};
use crate::nation::{Nation, NationId};
use crate::relations::{add_threat, adjust_relationship};
use crate::state::GameState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabConstruction {
    pub target_tier: u8,
    pub turns_remaining: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BioLabState {
    #[serde(default)]
    pub tier: u8,
    /// Highest tier current research allows.
    #[serde(default = "default_tier_cap")]
    pub max_tier: u8,
    #[serde(default)]
    pub construction: Option<LabConstruction>,
    #[serde(default)]
    pub pathogens_released: u32,
}

const fn default_tier_cap() -> u8 {
    BIOLAB_DEFAULT_TIER_CAP
}

impl Default for BioLabState {
    fn default() -> Self {
        Self {
            tier: 0,
            max_tier: default_tier_cap(),
            construction: None,
            pathogens_released: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabCost {
    pub production: i32,
    pub intel: i32,
    pub turns: u32,
}

/// Cost of building the lab up to `tier`.
#[must_use]
pub fn construction_cost(tier: u8) -> LabCost {
    let tier_i32 = i32::from(tier);
    LabCost {
        production: BIOLAB_PRODUCTION_COST_PER_TIER * tier_i32,
        intel: BIOLAB_INTEL_COST_PER_TIER * tier_i32,
        turns: BIOLAB_BASE_TURNS + u32::from(tier),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathogenReport {
    pub attacker: NationId,
    pub target: NationId,
    pub casualties: f32,
    pub detected: bool,
    pub detection_chance: f32,
}

#[derive(Debug, Error, PartialEq)]
pub enum BioLabError {
    #[error("a laboratory upgrade is already under construction")]
    AlreadyBuilding,
    #[error("labs are built one tier at a time: requested {requested}, current {current}")]
    InvalidTier { requested: u8, current: u8 },
    #[error("research only permits tier {cap}")]
    TierCapped { cap: u8 },
    #[error("insufficient resources: need {production} production and {intel} intel")]
    Unaffordable { production: i32, intel: i32 },
    #[error("pathogen release needs a tier {required} laboratory, have tier {tier}")]
    TierTooLow { tier: u8, required: u8 },
    #[error("unknown nation `{0}`")]
    UnknownNation(NationId),
    #[error("a nation cannot target itself")]
    SelfTarget,
    #[error("nation `{0}` has been eliminated")]
    Eliminated(NationId),
}

/// Begin upgrading the lab to `target_tier`, paying the full cost now.
///
/// # Errors
///
/// Rejects concurrent construction, skipped tiers, tiers beyond the
/// research cap and unaffordable upgrades.
pub fn start_construction(nation: &mut Nation, target_tier: u8) -> Result<LabCost, BioLabError> {
    let lab = &nation.bio_lab;
    if lab.construction.is_some() {
        return Err(BioLabError::AlreadyBuilding);
    }
    if target_tier != lab.tier + 1 || target_tier > BIOLAB_MAX_TIER {
        return Err(BioLabError::InvalidTier {
            requested: target_tier,
            current: lab.tier,
        });
    }
    if target_tier > lab.max_tier {
        return Err(BioLabError::TierCapped { cap: lab.max_tier });
    }
    let cost = construction_cost(target_tier);
    if nation.production < cost.production || nation.intel < cost.intel {
        return Err(BioLabError::Unaffordable {
            production: cost.production,
            intel: cost.intel,
        });
    }
    nation.production -= cost.production;
    nation.intel -= cost.intel;
    nation.bio_lab.construction = Some(LabConstruction {
        target_tier,
        turns_remaining: cost.turns,
    });
    Ok(cost)
}

/// Tick construction. Returns the new tier when an upgrade finishes.
pub fn advance_construction(nation: &mut Nation) -> Option<u8> {
    let lab = &mut nation.bio_lab;
    let build = lab.construction.as_mut()?;
    build.turns_remaining = build.turns_remaining.saturating_sub(1);
    if build.turns_remaining > 0 {
        return None;
    }
    let tier = build.target_tier;
    lab.tier = tier;
    lab.construction = None;
    Some(tier)
}

/// Intelligence generated by an operating lab each turn.
#[must_use]
pub const fn lab_intel_yield(nation: &Nation) -> i32 {
    if nation.bio_lab.tier >= 1 {
        BIOLAB_INTEL_YIELD
    } else {
        0
    }
}

/// Deploy an engineered pathogen against `target`.
///
/// # Errors
///
/// Needs a tier 3 lab and two distinct, active nations.
pub fn release_pathogen<R>(
    state: &mut GameState,
    attacker: &str,
    target: &str,
    rng: &mut R,
) -> Result<PathogenReport, BioLabError>
where
    R: Rng + ?Sized,
{
    if attacker == target {
        return Err(BioLabError::SelfTarget);
    }
    for id in [attacker, target] {
        let nation = state
            .nation(id)
            .ok_or_else(|| BioLabError::UnknownNation(NationId::from(id)))?;
        if !nation.is_active() {
            return Err(BioLabError::Eliminated(nation.id.clone()));
        }
    }
    let (source, victim) = state
        .pair_mut(attacker, target)
        .ok_or_else(|| BioLabError::UnknownNation(NationId::from(target)))?;
    let tier = source.bio_lab.tier;
    if tier < PATHOGEN_MIN_TIER {
        return Err(BioLabError::TierTooLow {
            tier,
            required: PATHOGEN_MIN_TIER,
        });
    }

    let casualties = victim.population * PATHOGEN_POPULATION_PER_TIER * f32::from(tier);
    victim.population = (victim.population - casualties).max(0.0);
    victim.adjust_morale(-PATHOGEN_MORALE);
    source.bio_lab.pathogens_released += 1;

    // Higher tiers engineer agents that are harder to trace.
    let detection_chance = (PATHOGEN_DETECTION_BASE
        - PATHOGEN_DETECTION_STEP * f32::from(tier - PATHOGEN_MIN_TIER)
        + victim.bonuses.counter_intel)
        .clamp(MIN_CHANCE, MAX_CHANCE);
    let detected = rng.r#gen::<f32>() < detection_chance;

    let report = PathogenReport {
        attacker: source.id.clone(),
        target: victim.id.clone(),
        casualties,
        detected,
        detection_chance,
    };
    if detected {
        adjust_relationship(victim, &report.attacker, -PATHOGEN_TARGET_RELATIONSHIP);
        for nation in state.nations.values_mut() {
            if nation.id == report.attacker || !nation.is_active() {
                continue;
            }
            if nation.id != report.target {
                adjust_relationship(nation, &report.attacker, -PATHOGEN_DETECTED_RELATIONSHIP);
            }
            add_threat(nation, &report.attacker, PATHOGEN_DETECTED_THREAT);
        }
    }
    log::debug!(
        "pathogen {} -> {}: {:.2}M casualties, detected={detected}",
        report.attacker,
        report.target,
        report.casualties
    );
    let mut involved = vec![report.target.clone()];
    if detected {
        involved.insert(0, report.attacker.clone());
    }
    state.emit(
        TurnEventKind::BioWarfare,
        Severity::Critical,
        if detected {
            "log.biolab.pathogen.attributed"
        } else {
            "log.biolab.pathogen.outbreak"
        },
        involved,
    );
    Ok(report)
}

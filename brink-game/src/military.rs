//! Conventional force templates and strategic (nuclear) procurement.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{
    BOMBER_PRODUCTION_COST, DEFENSE_PRODUCTION_COST, MAX_TEMPLATE_UNITS, MISSILE_PRODUCTION_COST,
    OIL_PER_FORMATION, SUBMARINE_PRODUCTION_COST, WARHEAD_PRODUCTION_COST,
};
use crate::nation::Nation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Infantry,
    Armor,
    Artillery,
    Air,
    Naval,
}

impl UnitKind {
    pub const ALL: [Self; 5] = [
        Self::Infantry,
        Self::Armor,
        Self::Artillery,
        Self::Air,
        Self::Naval,
    ];

    #[must_use]
    pub const fn strength(self) -> u32 {
        match self {
            Self::Infantry => 2,
            Self::Armor => 5,
            Self::Artillery => 4,
            Self::Air => 6,
            Self::Naval => 5,
        }
    }

    #[must_use]
    pub const fn production_cost(self) -> i32 {
        match self {
            Self::Infantry => 2,
            Self::Armor => 6,
            Self::Artillery => 4,
            Self::Air => 8,
            Self::Naval => 7,
        }
    }

    /// Extra oil per unit on top of the formation's base upkeep.
    #[must_use]
    pub const fn oil_upkeep(self) -> f32 {
        match self {
            Self::Infantry => 0.0,
            Self::Armor => 0.03,
            Self::Artillery => 0.01,
            Self::Air => 0.05,
            Self::Naval => 0.04,
        }
    }
}

/// A reusable division layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilitaryTemplate {
    pub name: String,
    pub units: BTreeMap<UnitKind, u32>,
}

impl MilitaryTemplate {
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.units.values().sum()
    }

    #[must_use]
    pub fn strength(&self) -> u32 {
        self.units
            .iter()
            .map(|(kind, count)| kind.strength() * count)
            .sum()
    }

    #[must_use]
    pub fn production_cost(&self) -> i32 {
        self.units
            .iter()
            .map(|(kind, count)| {
                kind.production_cost()
                    .saturating_mul(i32::try_from(*count).unwrap_or(i32::MAX))
            })
            .fold(0, i32::saturating_add)
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn oil_upkeep(&self) -> f32 {
        OIL_PER_FORMATION
            + self
                .units
                .iter()
                .map(|(kind, count)| kind.oil_upkeep() * *count as f32)
                .sum::<f32>()
    }
}

/// A raised division built from a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formation {
    pub id: u32,
    pub template: String,
    pub strength: u32,
    pub oil_upkeep: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MilitaryForces {
    #[serde(default)]
    pub templates: BTreeMap<String, MilitaryTemplate>,
    #[serde(default)]
    pub formations: Vec<Formation>,
    #[serde(default)]
    pub next_formation_id: u32,
}

impl MilitaryForces {
    #[must_use]
    pub fn conventional_strength(&self) -> u32 {
        self.formations.iter().map(|f| f.strength).sum()
    }

    #[must_use]
    pub fn oil_upkeep(&self) -> f32 {
        self.formations.iter().map(|f| f.oil_upkeep).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicAsset {
    Missile,
    Bomber,
    Submarine,
    Defense,
}

impl StrategicAsset {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Missile => "missile",
            Self::Bomber => "bomber",
            Self::Submarine => "submarine",
            Self::Defense => "defense",
        }
    }

    #[must_use]
    pub const fn production_cost(self) -> i32 {
        match self {
            Self::Missile => MISSILE_PRODUCTION_COST,
            Self::Bomber => BOMBER_PRODUCTION_COST,
            Self::Submarine => SUBMARINE_PRODUCTION_COST,
            Self::Defense => DEFENSE_PRODUCTION_COST,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MilitaryError {
    #[error("template name cannot be empty")]
    EmptyName,
    #[error("template `{0}` already exists")]
    DuplicateTemplate(String),
    #[error("templates need 1..={max} units, got {count}")]
    InvalidUnitCount { count: u32, max: u32 },
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),
    #[error("template `{0}` is used by active formations")]
    TemplateInUse(String),
    #[error("unknown formation #{0}")]
    UnknownFormation(u32),
    #[error("insufficient production: need {required}, have {available}")]
    InsufficientProduction { required: i32, available: i32 },
    #[error("insufficient uranium: need {required}, have {available}")]
    InsufficientUranium { required: i32, available: i32 },
    #[error("{0} MT warheads have not been researched")]
    YieldLocked(u16),
    #[error("eliminated nations cannot build")]
    Eliminated,
}

fn pay_production(nation: &mut Nation, cost: i32) -> Result<(), MilitaryError> {
    if !nation.is_active() {
        return Err(MilitaryError::Eliminated);
    }
    if nation.production < cost {
        return Err(MilitaryError::InsufficientProduction {
            required: cost,
            available: nation.production,
        });
    }
    nation.production -= cost;
    Ok(())
}

/// # Errors
///
/// Rejects empty or duplicate names and unit totals outside `1..=20`.
pub fn create_template(
    nation: &mut Nation,
    name: &str,
    units: BTreeMap<UnitKind, u32>,
) -> Result<(), MilitaryError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(MilitaryError::EmptyName);
    }
    if nation.military.templates.contains_key(name) {
        return Err(MilitaryError::DuplicateTemplate(name.to_string()));
    }
    let units: BTreeMap<UnitKind, u32> = units.into_iter().filter(|(_, n)| *n > 0).collect();
    let template = MilitaryTemplate {
        name: name.to_string(),
        units,
    };
    let count = template.unit_count();
    if count == 0 || count > MAX_TEMPLATE_UNITS {
        return Err(MilitaryError::InvalidUnitCount {
            count,
            max: MAX_TEMPLATE_UNITS,
        });
    }
    nation
        .military
        .templates
        .insert(template.name.clone(), template);
    Ok(())
}

/// # Errors
///
/// Fails for unknown templates or ones still fielded.
pub fn delete_template(nation: &mut Nation, name: &str) -> Result<MilitaryTemplate, MilitaryError> {
    if nation.military.formations.iter().any(|f| f.template == name) {
        return Err(MilitaryError::TemplateInUse(name.to_string()));
    }
    nation
        .military
        .templates
        .remove(name)
        .ok_or_else(|| MilitaryError::UnknownTemplate(name.to_string()))
}

/// Field a new formation from `template`, returning its id.
///
/// # Errors
///
/// Fails for unknown templates or insufficient production.
pub fn raise_formation(nation: &mut Nation, template: &str) -> Result<u32, MilitaryError> {
    let layout = nation
        .military
        .templates
        .get(template)
        .cloned()
        .ok_or_else(|| MilitaryError::UnknownTemplate(template.to_string()))?;
    pay_production(nation, layout.production_cost())?;
    let forces = &mut nation.military;
    forces.next_formation_id += 1;
    let id = forces.next_formation_id;
    forces.formations.push(Formation {
        id,
        template: layout.name.clone(),
        strength: layout.strength(),
        oil_upkeep: layout.oil_upkeep(),
    });
    Ok(id)
}

/// # Errors
///
/// Fails when no formation has `id`.
pub fn disband_formation(nation: &mut Nation, id: u32) -> Result<Formation, MilitaryError> {
    let index = nation
        .military
        .formations
        .iter()
        .position(|f| f.id == id)
        .ok_or(MilitaryError::UnknownFormation(id))?;
    Ok(nation.military.formations.remove(index))
}

/// Buy one strategic asset.
///
/// # Errors
///
/// Fails on insufficient production.
pub fn build_strategic(nation: &mut Nation, asset: StrategicAsset) -> Result<(), MilitaryError> {
    pay_production(nation, asset.production_cost())?;
    let slot = match asset {
        StrategicAsset::Missile => &mut nation.missiles,
        StrategicAsset::Bomber => &mut nation.bombers,
        StrategicAsset::Submarine => &mut nation.submarines,
        StrategicAsset::Defense => &mut nation.defense,
    };
    *slot = slot.saturating_add(1);
    Ok(())
}

/// # Errors
///
/// See [`build_strategic`].
pub fn build_missile(nation: &mut Nation) -> Result<(), MilitaryError> {
    build_strategic(nation, StrategicAsset::Missile)
}

/// # Errors
///
/// See [`build_strategic`].
pub fn build_bomber(nation: &mut Nation) -> Result<(), MilitaryError> {
    build_strategic(nation, StrategicAsset::Bomber)
}

/// # Errors
///
/// See [`build_strategic`].
pub fn build_submarine(nation: &mut Nation) -> Result<(), MilitaryError> {
    build_strategic(nation, StrategicAsset::Submarine)
}

/// # Errors
///
/// See [`build_strategic`].
pub fn build_defense(nation: &mut Nation) -> Result<(), MilitaryError> {
    build_strategic(nation, StrategicAsset::Defense)
}

/// Assemble a warhead of `megatons`. Uranium cost equals the yield.
///
/// # Errors
///
/// Fails for yields not yet researched or when uranium or production is
/// short. Nothing is spent on error.
pub fn build_warhead(nation: &mut Nation, megatons: u16) -> Result<(), MilitaryError> {
    if !nation.unlocked_yields.contains(&megatons) {
        return Err(MilitaryError::YieldLocked(megatons));
    }
    let uranium = i32::from(megatons);
    if nation.uranium < uranium {
        return Err(MilitaryError::InsufficientUranium {
            required: uranium,
            available: nation.uranium,
        });
    }
    pay_production(nation, WARHEAD_PRODUCTION_COST)?;
    nation.uranium -= uranium;
    *nation.warheads.entry(megatons).or_insert(0) += 1;
    Ok(())
}

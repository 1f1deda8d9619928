//! Territorial resources: per-turn yields, stockpiles, upkeep and shortages.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::constants::{
    DEFAULT_STOCKPILE_CAPACITY, FOOD_PER_MILLION, FOOD_SHORTAGE_INSTABILITY,
    FOOD_SHORTAGE_MORALE, INFRASTRUCTURE_COST_PER_LEVEL, INFRASTRUCTURE_MAX,
    INFRASTRUCTURE_YIELD_STEP, LOG_INFRASTRUCTURE_BUILT, LOG_RESOURCE_SHORTAGE,
    OIL_PER_DELIVERY_SYSTEM, OIL_SHORTAGE_PRODUCTION,
    RARE_EARTH_PRODUCTION_BONUS,
};
use crate::diplomacy::sanction_multiplier;
use crate::journal::{Severity, TurnEventKind};
use crate::nation::{Nation, NationId};
use crate::numbers::{floor_f32_to_u32, round_f32_to_i32, u32_to_f32};
use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Oil,
    Uranium,
    RareEarths,
    Food,
}

impl ResourceKind {
    pub const ALL: [Self; 4] = [Self::Oil, Self::Uranium, Self::RareEarths, Self::Food];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Oil => "oil",
            Self::Uranium => "uranium",
            Self::RareEarths => "rare_earths",
            Self::Food => "food",
        }
    }
}

/// A resource-bearing region and its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryResources {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub owner: NationId,
    /// Base per-turn yield of each deposit.
    #[serde(default)]
    pub deposits: BTreeMap<ResourceKind, f32>,
    /// Development level in `0..=5`.
    #[serde(default)]
    pub infrastructure: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceStockpile {
    #[serde(default)]
    pub amounts: BTreeMap<ResourceKind, f32>,
    /// Per-kind storage limit. Missing kinds use the default capacity.
    #[serde(default)]
    pub capacity: BTreeMap<ResourceKind, f32>,
}

impl ResourceStockpile {
    #[must_use]
    pub fn amount(&self, kind: ResourceKind) -> f32 {
        self.amounts.get(&kind).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn capacity_for(&self, kind: ResourceKind) -> f32 {
        self.capacity
            .get(&kind)
            .copied()
            .unwrap_or(DEFAULT_STOCKPILE_CAPACITY)
    }

    /// Store up to `amount`, returning what fit under the capacity.
    pub fn add(&mut self, kind: ResourceKind, amount: f32) -> f32 {
        if amount <= 0.0 || amount.is_nan() {
            return 0.0;
        }
        let capacity = self.capacity_for(kind);
        let slot = self.amounts.entry(kind).or_insert(0.0);
        let stored = amount.min((capacity - *slot).max(0.0));
        *slot += stored;
        stored
    }

    /// Withdraw up to `amount`, returning what was actually taken.
    pub fn take(&mut self, kind: ResourceKind, amount: f32) -> f32 {
        if amount <= 0.0 || amount.is_nan() {
            return 0.0;
        }
        let slot = self.amounts.entry(kind).or_insert(0.0);
        let taken = amount.min(*slot);
        *slot -= taken;
        taken
    }
}

/// Multipliers applied to every deposit of a territory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldModifiers {
    pub government: f32,
    pub sanctions: f32,
}

impl Default for YieldModifiers {
    fn default() -> Self {
        Self {
            government: 1.0,
            sanctions: 1.0,
        }
    }
}

impl YieldModifiers {
    #[must_use]
    pub fn for_nation(nation: &Nation) -> Self {
        Self {
            government: nation.government_kind().modifiers().production_multiplier,
            sanctions: sanction_multiplier(nation),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceYield {
    pub amounts: BTreeMap<ResourceKind, f32>,
}

impl ResourceYield {
    #[must_use]
    pub fn get(&self, kind: ResourceKind) -> f32 {
        self.amounts.get(&kind).copied().unwrap_or(0.0)
    }
}

/// Unmet upkeep for one nation in one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortageReport {
    pub nation: NationId,
    /// Unmet demand per kind.
    pub deficits: BTreeMap<ResourceKind, f32>,
    /// Fraction of demand left unmet per kind, `0.0..=1.0`.
    pub severity: BTreeMap<ResourceKind, f32>,
}

impl ShortageReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deficits.is_empty()
    }

    #[must_use]
    pub fn severity_of(&self, kind: ResourceKind) -> f32 {
        self.severity.get(&kind).copied().unwrap_or(0.0)
    }

    /// Worst shortage across all kinds.
    #[must_use]
    pub fn worst(&self) -> f32 {
        self.severity.values().copied().fold(0.0, f32::max)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TerritoryError {
    #[error("unknown territory `{0}`")]
    UnknownTerritory(String),
    #[error("unknown nation `{0}`")]
    UnknownNation(NationId),
    #[error("`{nation}` does not own territory `{territory}`")]
    NotOwner { nation: NationId, territory: String },
    #[error("territory `{0}` is fully developed")]
    FullyDeveloped(String),
    #[error("insufficient production: need {required}, have {available}")]
    InsufficientProduction { required: i32, available: i32 },
}

#[must_use]
pub fn generate_resources(territory: &TerritoryResources, modifiers: YieldModifiers) -> ResourceYield {
    let development =
        1.0 + INFRASTRUCTURE_YIELD_STEP * f32::from(territory.infrastructure.min(INFRASTRUCTURE_MAX));
    let factor = development * modifiers.government * modifiers.sanctions;
    let amounts = territory
        .deposits
        .iter()
        .filter(|(_, base)| **base > 0.0)
        .map(|(kind, base)| (*kind, base * factor))
        .collect();
    ResourceYield { amounts }
}

#[must_use]
pub fn stockpile_amount(nation: &Nation, kind: ResourceKind) -> f32 {
    nation
        .resource_stockpile
        .as_ref()
        .map_or(0.0, |stockpile| stockpile.amount(kind))
}

/// Per-turn food and oil demand.
#[must_use]
pub fn upkeep(nation: &Nation) -> BTreeMap<ResourceKind, f32> {
    let oil = u32_to_f32(nation.delivery_systems()) * OIL_PER_DELIVERY_SYSTEM
        + nation.military.oil_upkeep();
    BTreeMap::from([
        (ResourceKind::Food, nation.population.max(0.0) * FOOD_PER_MILLION),
        (ResourceKind::Oil, oil),
    ])
}

/// Draw this turn's upkeep from the stockpile. Unmet demand is reported
/// rather than driving the stockpile negative.
pub fn consume_resources(nation: &mut Nation) -> ShortageReport {
    let demand = upkeep(nation);
    let stockpile = nation.resource_stockpile.get_or_insert_with(ResourceStockpile::default);
    let mut deficits = BTreeMap::new();
    let mut severity = BTreeMap::new();
    for (kind, need) in demand {
        if need <= 0.0 {
            continue;
        }
        let taken = stockpile.take(kind, need);
        let missing = need - taken;
        if missing > f32::EPSILON {
            deficits.insert(kind, missing);
            severity.insert(kind, (missing / need).clamp(0.0, 1.0));
        }
    }
    ShortageReport {
        nation: nation.id.clone(),
        deficits,
        severity,
    }
}

pub fn apply_shortages(nation: &mut Nation, report: &ShortageReport) {
    let food = report.severity_of(ResourceKind::Food);
    if food > 0.0 {
        nation.adjust_morale(-FOOD_SHORTAGE_MORALE * food);
        nation.adjust_instability(FOOD_SHORTAGE_INSTABILITY * food);
    }
    let oil = report.severity_of(ResourceKind::Oil);
    if oil > 0.0 {
        let loss = round_f32_to_i32(OIL_SHORTAGE_PRODUCTION * oil);
        nation.production = nation.production.saturating_sub(loss).max(0);
    }
}

/// Run the territorial economy for one turn: yields into stockpiles,
/// uranium refining, rare-earth production bonus, then upkeep.
///
/// Returns a report for every nation that went short.
pub fn process_territories(state: &mut GameState) -> Vec<ShortageReport> {
    let mut yields: BTreeMap<NationId, ResourceYield> = BTreeMap::new();
    for territory in state.territories.values() {
        let Some(owner) = state.nations.get(&territory.owner) else {
            continue;
        };
        if !owner.is_active() {
            continue;
        }
        let produced = generate_resources(territory, YieldModifiers::for_nation(owner));
        let total = yields.entry(territory.owner.clone()).or_default();
        for (kind, amount) in produced.amounts {
            *total.amounts.entry(kind).or_insert(0.0) += amount;
        }
    }

    let mut reports = Vec::new();
    for nation in state.nations.values_mut().filter(|n| n.is_active()) {
        let stockpile = nation
            .resource_stockpile
            .get_or_insert_with(ResourceStockpile::default);
        if let Some(produced) = yields.get(&nation.id) {
            for (kind, amount) in &produced.amounts {
                stockpile.add(*kind, *amount);
            }
        }
        let refined = floor_f32_to_u32(stockpile.amount(ResourceKind::Uranium));
        if refined > 0 {
            stockpile.take(ResourceKind::Uranium, u32_to_f32(refined));
            nation.uranium = nation
                .uranium
                .saturating_add(i32::try_from(refined).unwrap_or(i32::MAX));
        }
        let rare = stockpile.take(
            ResourceKind::RareEarths,
            stockpile.amount(ResourceKind::RareEarths),
        );
        nation.production = nation
            .production
            .saturating_add(round_f32_to_i32(rare * RARE_EARTH_PRODUCTION_BONUS));

        let report = consume_resources(nation);
        if !report.is_empty() {
            apply_shortages(nation, &report);
            reports.push(report);
        }
    }

    for report in &reports {
        log::debug!("{} short on {:?}", report.nation, report.deficits);
        let severity = if report.worst() >= 0.5 {
            Severity::Critical
        } else {
            Severity::Warning
        };
        state.emit(
            TurnEventKind::Economy,
            severity,
            LOG_RESOURCE_SHORTAGE,
            vec![report.nation.clone()],
        );
    }
    reports
}

/// Move resources between stockpiles. Fails without mutation when the
/// sender lacks the amount.
pub fn transfer_resources(
    from: &mut Nation,
    to: &mut Nation,
    kind: ResourceKind,
    amount: f32,
) -> bool {
    if amount <= 0.0 || amount.is_nan() || stockpile_amount(from, kind) < amount {
        return false;
    }
    let Some(source) = from.resource_stockpile.as_mut() else {
        return false;
    };
    let moved = source.take(kind, amount);
    to.resource_stockpile
        .get_or_insert_with(ResourceStockpile::default)
        .add(kind, moved);
    true
}

/// Raise a territory's infrastructure one level, paying production.
///
/// # Errors
///
/// Fails when the territory or nation is unknown, the nation is not the
/// owner, the territory is maxed out, or production is short.
pub fn develop_infrastructure(
    state: &mut GameState,
    nation: &str,
    territory: &str,
) -> Result<u8, TerritoryError> {
    let region = state
        .territories
        .get(territory)
        .ok_or_else(|| TerritoryError::UnknownTerritory(territory.to_string()))?;
    if region.owner.as_str() != nation {
        return Err(TerritoryError::NotOwner {
            nation: NationId::from(nation),
            territory: territory.to_string(),
        });
    }
    if region.infrastructure >= INFRASTRUCTURE_MAX {
        return Err(TerritoryError::FullyDeveloped(territory.to_string()));
    }
    let required = INFRASTRUCTURE_COST_PER_LEVEL * (i32::from(region.infrastructure) + 1);
    let owner = state
        .nation_mut(nation)
        .ok_or_else(|| TerritoryError::UnknownNation(NationId::from(nation)))?;
    if owner.production < required {
        return Err(TerritoryError::InsufficientProduction {
            required,
            available: owner.production,
        });
    }
    owner.production -= required;

    let level = match state.territories.get_mut(territory) {
        Some(region) => {
            region.infrastructure += 1;
            region.infrastructure
        }
        None => return Err(TerritoryError::UnknownTerritory(territory.to_string())),
    };
    state.emit(
        TurnEventKind::Economy,
        Severity::Info,
        LOG_INFRASTRUCTURE_BUILT,
        vec![NationId::from(nation)],
    );
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::{GovernmentKind, GovernmentState};

    fn territory(infrastructure: u8) -> TerritoryResources {
        TerritoryResources {
            id: "texas".into(),
            name: "Texas".into(),
            owner: NationId::from("usa"),
            deposits: BTreeMap::from([(ResourceKind::Oil, 10.0), (ResourceKind::Food, 5.0)]),
            infrastructure,
        }
    }

    #[test]
    fn yield_scales_with_infrastructure_and_modifiers() {
        let base = generate_resources(&territory(0), YieldModifiers::default());
        assert!((base.get(ResourceKind::Oil) - 10.0).abs() < 1e-4);

        let developed = generate_resources(&territory(5), YieldModifiers::default());
        assert!((developed.get(ResourceKind::Oil) - 20.0).abs() < 1e-4);

        let sanctioned = generate_resources(
            &territory(0),
            YieldModifiers {
                government: 1.0,
                sanctions: 0.5,
            },
        );
        assert!((sanctioned.get(ResourceKind::Food) - 2.5).abs() < 1e-4);
        assert!(sanctioned.get(ResourceKind::Uranium).abs() < f32::EPSILON);
    }

    #[test]
    fn government_multiplier_feeds_yield() {
        let mut nation = Nation::new("usa", "United States");
        nation.government_state = Some(GovernmentState::new(GovernmentKind::Authoritarian, 0));
        let modifiers = YieldModifiers::for_nation(&nation);
        assert!(
            (modifiers.government
                - GovernmentKind::Authoritarian.modifiers().production_multiplier)
                .abs()
                < f32::EPSILON
        );
    }

    #[test]
    fn stockpile_respects_capacity() {
        let mut stockpile = ResourceStockpile::default();
        stockpile.capacity.insert(ResourceKind::Oil, 15.0);
        assert!((stockpile.add(ResourceKind::Oil, 10.0) - 10.0).abs() < f32::EPSILON);
        assert!((stockpile.add(ResourceKind::Oil, 10.0) - 5.0).abs() < f32::EPSILON);
        assert!((stockpile.take(ResourceKind::Oil, 40.0) - 15.0).abs() < f32::EPSILON);
        assert!(stockpile.amount(ResourceKind::Oil).abs() < f32::EPSILON);
    }

    #[test]
    fn consumption_reports_shortage_without_going_negative() {
        let mut nation = Nation::new("usa", "United States");
        nation.population = 100.0;
        let mut stockpile = ResourceStockpile::default();
        stockpile.add(ResourceKind::Food, 2.0);
        nation.resource_stockpile = Some(stockpile);

        let report = consume_resources(&mut nation);
        let need = 100.0 * FOOD_PER_MILLION;
        assert!((report.deficits[&ResourceKind::Food] - (need - 2.0)).abs() < 1e-4);
        assert!(stockpile_amount(&nation, ResourceKind::Food).abs() < f32::EPSILON);

        let morale = nation.morale;
        apply_shortages(&mut nation, &report);
        assert!(nation.morale < morale);
    }

    #[test]
    fn fed_nation_has_no_shortage() {
        let mut nation = Nation::new("usa", "United States");
        let mut stockpile = ResourceStockpile::default();
        stockpile.add(ResourceKind::Food, 500.0);
        nation.resource_stockpile = Some(stockpile);
        assert!(consume_resources(&mut nation).is_empty());
    }

    #[test]
    fn transfer_requires_full_amount() {
        let mut a = Nation::new("usa", "United States");
        let mut b = Nation::new("uk", "United Kingdom");
        assert!(!transfer_resources(&mut a, &mut b, ResourceKind::Oil, 5.0));
        let mut stockpile = ResourceStockpile::default();
        stockpile.add(ResourceKind::Oil, 8.0);
        a.resource_stockpile = Some(stockpile);
        assert!(!transfer_resources(&mut a, &mut b, ResourceKind::Oil, 9.0));
        assert!(transfer_resources(&mut a, &mut b, ResourceKind::Oil, 5.0));
        assert!((stockpile_amount(&a, ResourceKind::Oil) - 3.0).abs() < 1e-4);
        assert!((stockpile_amount(&b, ResourceKind::Oil) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn process_refines_uranium_and_develops() {
        let mut nation = Nation::new("usa", "United States");
        nation.production = 100;
        let start_uranium = nation.uranium;
        let mut state = GameState::from_nations(vec![nation], NationId::from("usa"));
        let mut region = territory(0);
        region.deposits.insert(ResourceKind::Uranium, 2.5);
        region.deposits.insert(ResourceKind::Food, 50.0);
        state.territories.insert(region.id.clone(), region);

        let reports = process_territories(&mut state);
        assert!(reports.is_empty());
        let usa = state.nation("usa").unwrap();
        assert_eq!(usa.uranium, start_uranium + 2);
        assert!((stockpile_amount(usa, ResourceKind::Uranium) - 0.5).abs() < 1e-4);

        assert_eq!(develop_infrastructure(&mut state, "usa", "texas"), Ok(1));
        assert_eq!(
            state.nation("usa").unwrap().production,
            100 - INFRASTRUCTURE_COST_PER_LEVEL
        );
        assert!(matches!(
            develop_infrastructure(&mut state, "uk", "texas"),
            Err(TerritoryError::NotOwner { .. })
        ));
    }
}

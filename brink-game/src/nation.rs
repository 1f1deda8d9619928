//! Nation records: the mutable bag of resources and relationship state every
//! subsystem reads and writes.
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::biolab::BioLabState;
use crate::constants::{
    BASELINE_TRUST, DEFAULT_CITIES, DEFAULT_INSTABILITY, DEFAULT_MORALE, DEFAULT_POPULATION,
    DEFAULT_PRODUCTION, DEFAULT_PUBLIC_OPINION, ELIMINATION_POPULATION,
};
use crate::cyber::CyberState;
use crate::diplomacy::DiplomaticInfluence;
use crate::espionage::IntelReport;
use crate::governance::{GovernmentKind, GovernmentState};
use crate::military::MilitaryForces;
use crate::numbers::clamp_percent;
use crate::research::ResearchProgress;
use crate::territory::ResourceStockpile;
use crate::treaties::Treaty;

/// Stable identifier for a nation (`"usa"`, `"ussr"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct NationId(pub String);

impl NationId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for NationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Behavioral profile driving AI scoring tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AiPersonality {
    #[default]
    Balanced,
    Aggressive,
    Defensive,
    Isolationist,
    Trickster,
    Chaotic,
}

impl AiPersonality {
    pub const ALL: &'static [Self] = &[
        Self::Balanced,
        Self::Aggressive,
        Self::Defensive,
        Self::Isolationist,
        Self::Trickster,
        Self::Chaotic,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
            Self::Defensive => "defensive",
            Self::Isolationist => "isolationist",
            Self::Trickster => "trickster",
            Self::Chaotic => "chaotic",
        }
    }
}

/// Permanent per-turn bonuses accumulated from research and events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NationBonuses {
    #[serde(default)]
    pub production: i32,
    #[serde(default)]
    pub intel: i32,
    #[serde(default)]
    pub dip: i32,
    /// Additive success bonus for espionage operations (0.0 - 1.0).
    #[serde(default)]
    pub espionage: f32,
    /// Additive counter-intelligence bonus against hostile operations.
    #[serde(default)]
    pub counter_intel: f32,
}

/// A player- or AI-controlled country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    #[serde(default)]
    pub leader: String,
    #[serde(default)]
    pub is_player: bool,
    #[serde(default)]
    pub eliminated: bool,
    #[serde(default)]
    pub personality: AiPersonality,
    pub production: i32,
    pub intel: i32,
    pub uranium: i32,
    /// Population in millions.
    pub population: f32,
    pub cities: u32,
    pub morale: f32,
    #[serde(alias = "publicOpinion")]
    pub public_opinion: f32,
    pub instability: f32,
    #[serde(default)]
    pub missiles: u32,
    #[serde(default)]
    pub bombers: u32,
    #[serde(default)]
    pub submarines: u32,
    #[serde(default)]
    pub defense: u32,
    /// Warhead inventory keyed by yield in megatons.
    #[serde(default)]
    pub warheads: BTreeMap<u16, u32>,
    #[serde(default)]
    pub unlocked_yields: BTreeSet<u16>,
    #[serde(default)]
    pub researched: BTreeSet<String>,
    #[serde(default)]
    pub research: Option<ResearchProgress>,
    #[serde(default)]
    pub treaties: BTreeMap<NationId, Treaty>,
    #[serde(default)]
    pub threats: BTreeMap<NationId, f32>,
    #[serde(default)]
    pub relationships: BTreeMap<NationId, i32>,
    #[serde(default)]
    pub trust: BTreeMap<NationId, f32>,
    /// Positive: the other nation owes us. Negative: we owe them.
    #[serde(default)]
    pub favors: BTreeMap<NationId, i32>,
    #[serde(default)]
    pub sanctioned_by: BTreeSet<NationId>,
    #[serde(default)]
    pub intel_reports: BTreeMap<NationId, IntelReport>,
    #[serde(default)]
    pub bonuses: NationBonuses,
    #[serde(default)]
    pub feature_flags: BTreeSet<String>,
    #[serde(default, alias = "governmentState")]
    pub government_state: Option<GovernmentState>,
    #[serde(default, alias = "diplomaticInfluence")]
    pub diplomatic_influence: Option<DiplomaticInfluence>,
    #[serde(default, alias = "resourceStockpile")]
    pub resource_stockpile: Option<ResourceStockpile>,
    #[serde(default)]
    pub cyber: Option<CyberState>,
    #[serde(default)]
    pub bio_lab: BioLabState,
    #[serde(default)]
    pub military: MilitaryForces,
}

impl Nation {
    /// Build a nation with baseline starting values.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: NationId::new(id),
            name: name.into(),
            leader: String::new(),
            is_player: false,
            eliminated: false,
            personality: AiPersonality::default(),
            production: DEFAULT_PRODUCTION,
            intel: 10,
            uranium: 5,
            population: DEFAULT_POPULATION,
            cities: DEFAULT_CITIES,
            morale: DEFAULT_MORALE,
            public_opinion: DEFAULT_PUBLIC_OPINION,
            instability: DEFAULT_INSTABILITY,
            missiles: 0,
            bombers: 0,
            submarines: 0,
            defense: 0,
            warheads: BTreeMap::new(),
            unlocked_yields: BTreeSet::from([10]),
            researched: BTreeSet::new(),
            research: None,
            treaties: BTreeMap::new(),
            threats: BTreeMap::new(),
            relationships: BTreeMap::new(),
            trust: BTreeMap::new(),
            favors: BTreeMap::new(),
            sanctioned_by: BTreeSet::new(),
            intel_reports: BTreeMap::new(),
            bonuses: NationBonuses::default(),
            feature_flags: BTreeSet::new(),
            government_state: None,
            diplomatic_influence: None,
            resource_stockpile: None,
            cyber: None,
            bio_lab: BioLabState::default(),
            military: MilitaryForces::default(),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.eliminated
    }

    #[must_use]
    pub fn relationship_with(&self, other: &str) -> i32 {
        self.relationships.get(other).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn trust_in(&self, other: &str) -> f32 {
        self.trust.get(other).copied().unwrap_or(BASELINE_TRUST)
    }

    #[must_use]
    pub fn threat_from(&self, other: &str) -> f32 {
        self.threats.get(other).copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn favor_balance(&self, other: &str) -> i32 {
        self.favors.get(other).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn treaty_with(&self, other: &str) -> Option<&Treaty> {
        self.treaties.get(other)
    }

    /// Current government, falling back to a constitutional default for
    /// records that predate the governance system.
    #[must_use]
    pub fn government_kind(&self) -> GovernmentKind {
        self.government_state
            .as_ref()
            .map_or(GovernmentKind::Constitutional, |gov| gov.kind)
    }

    #[must_use]
    pub fn dip_points(&self) -> i32 {
        self.diplomatic_influence
            .as_ref()
            .map_or(0, |dip| dip.points)
    }

    #[must_use]
    pub fn total_warheads(&self) -> u32 {
        self.warheads.values().sum()
    }

    #[must_use]
    pub fn delivery_systems(&self) -> u32 {
        self.missiles + self.bombers + self.submarines
    }

    /// Rough military weight used by AI threat and fear calculations.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn strategic_power(&self) -> f32 {
        let nuclear = self.missiles as f32 * 3.0
            + self.bombers as f32 * 2.0
            + self.submarines as f32 * 4.0
            + self.total_warheads() as f32 * 2.0;
        let defensive = self.defense as f32 * 1.5;
        let conventional = self.military.conventional_strength() as f32 / 10.0;
        nuclear + defensive + conventional
    }

    pub fn adjust_morale(&mut self, delta: f32) {
        self.morale = clamp_percent(self.morale + delta);
    }

    pub fn adjust_public_opinion(&mut self, delta: f32) {
        self.public_opinion = clamp_percent(self.public_opinion + delta);
    }

    pub fn adjust_instability(&mut self, delta: f32) {
        self.instability = clamp_percent(self.instability + delta);
    }

    /// Re-clamp every percentage stat after bulk edits.
    pub fn clamp_stats(&mut self) {
        self.morale = clamp_percent(self.morale);
        self.public_opinion = clamp_percent(self.public_opinion);
        self.instability = clamp_percent(self.instability);
        self.production = self.production.max(0);
        self.intel = self.intel.max(0);
        self.uranium = self.uranium.max(0);
        self.population = self.population.max(0.0);
    }

    /// Flag the nation as eliminated once its population collapses.
    /// Returns `true` only on the transition.
    pub fn eliminate_if_depopulated(&mut self) -> bool {
        if self.eliminated || self.population >= ELIMINATION_POPULATION {
            return false;
        }
        self.eliminated = true;
        self.research = None;
        true
    }
}

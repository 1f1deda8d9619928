//! Scenario catalog: starting worlds loaded from `scenario.json`.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::{
    DEFAULT_CITIES, DEFAULT_INSTABILITY, DEFAULT_MAX_TURNS, DEFAULT_MORALE, DEFAULT_POPULATION,
    DEFAULT_PRODUCTION, DEFAULT_PUBLIC_OPINION, DEFCON_MAX,
};
use crate::governance::GovernmentKind;
use crate::nation::{AiPersonality, NationId};
use crate::territory::TerritoryResources;

const DEFAULT_SCENARIO_DATA: &str = include_str!("../assets/data/scenario.json");

const fn default_production() -> i32 {
    DEFAULT_PRODUCTION
}
const fn default_intel() -> i32 {
    10
}
const fn default_uranium() -> i32 {
    5
}
const fn default_population() -> f32 {
    DEFAULT_POPULATION
}
const fn default_cities() -> u32 {
    DEFAULT_CITIES
}
const fn default_morale() -> f32 {
    DEFAULT_MORALE
}
const fn default_opinion() -> f32 {
    DEFAULT_PUBLIC_OPINION
}
const fn default_instability() -> f32 {
    DEFAULT_INSTABILITY
}
const fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}
const fn default_defcon() -> u8 {
    DEFCON_MAX
}

/// Starting values for one nation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NationSetup {
    pub id: NationId,
    pub name: String,
    #[serde(default)]
    pub leader: String,
    #[serde(default)]
    pub personality: AiPersonality,
    #[serde(default)]
    pub government: GovernmentKind,
    #[serde(default = "default_production")]
    pub production: i32,
    #[serde(default = "default_intel")]
    pub intel: i32,
    #[serde(default = "default_uranium")]
    pub uranium: i32,
    #[serde(default = "default_population")]
    pub population: f32,
    #[serde(default = "default_cities")]
    pub cities: u32,
    #[serde(default = "default_morale")]
    pub morale: f32,
    #[serde(default = "default_opinion")]
    pub public_opinion: f32,
    #[serde(default = "default_instability")]
    pub instability: f32,
    #[serde(default)]
    pub missiles: u32,
    #[serde(default)]
    pub bombers: u32,
    #[serde(default)]
    pub submarines: u32,
    #[serde(default)]
    pub defense: u32,
    /// Starting arsenal keyed by yield in megatons.
    #[serde(default)]
    pub warheads: BTreeMap<u16, u32>,
    #[serde(default)]
    pub unlocked_yields: BTreeSet<u16>,
    #[serde(default)]
    pub relationships: BTreeMap<NationId, i32>,
    #[serde(default)]
    pub threats: BTreeMap<NationId, f32>,
    #[serde(default)]
    pub alliances: Vec<NationId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub start_year: u32,
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    #[serde(default = "default_defcon")]
    pub defcon: u8,
    /// Nation the player controls unless overridden.
    pub default_player: NationId,
    pub nations: Vec<NationSetup>,
    #[serde(default)]
    pub territories: Vec<TerritoryResources>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),
    #[error("scenario `{scenario}` has no nation `{nation}`")]
    UnknownNation { scenario: String, nation: NationId },
    #[error("scenario `{scenario}` lists nation `{nation}` twice")]
    DuplicateNation { scenario: String, nation: NationId },
    #[error("territory `{territory}` is owned by unknown nation `{owner}`")]
    UnknownOwner { territory: String, owner: NationId },
    #[error("scenario `{0}` has no nations")]
    Empty(String),
}

impl Scenario {
    #[must_use]
    pub fn nation(&self, id: &str) -> Option<&NationSetup> {
        self.nations.iter().find(|setup| setup.id.as_str() == id)
    }

    /// Check nation ids are unique and every reference points at one.
    ///
    /// # Errors
    ///
    /// Returns the first inconsistency found.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.nations.is_empty() {
            return Err(ScenarioError::Empty(self.id.clone()));
        }
        let mut seen = BTreeSet::new();
        for setup in &self.nations {
            if !seen.insert(setup.id.as_str()) {
                return Err(ScenarioError::DuplicateNation {
                    scenario: self.id.clone(),
                    nation: setup.id.clone(),
                });
            }
        }
        let known = |id: &NationId| seen.contains(id.as_str());
        if !known(&self.default_player) {
            return Err(ScenarioError::UnknownNation {
                scenario: self.id.clone(),
                nation: self.default_player.clone(),
            });
        }
        for setup in &self.nations {
            let referenced = setup
                .relationships
                .keys()
                .chain(setup.threats.keys())
                .chain(setup.alliances.iter());
            for other in referenced {
                if !known(other) {
                    return Err(ScenarioError::UnknownNation {
                        scenario: self.id.clone(),
                        nation: other.clone(),
                    });
                }
            }
        }
        for territory in &self.territories {
            if !known(&territory.owner) {
                return Err(ScenarioError::UnknownOwner {
                    territory: territory.id.clone(),
                    owner: territory.owner.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScenarioCatalog {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_SCENARIO_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<ScenarioCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a scenario catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Fails when no scenario has the id.
    pub fn get(&self, id: &str) -> Result<&Scenario, ScenarioError> {
        self.scenarios
            .iter()
            .find(|scenario| scenario.id == id)
            .ok_or_else(|| ScenarioError::UnknownScenario(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.scenarios.iter().map(|scenario| scenario.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_scenarios_validate() {
        let catalog = ScenarioCatalog::default_catalog();
        assert!(catalog.scenarios.len() >= 2);
        for scenario in &catalog.scenarios {
            scenario.validate().unwrap();
            assert!(scenario.nations.len() >= 4, "{} is too small", scenario.id);
        }
        let cold_war = catalog.get("cold_war_1962").unwrap();
        assert_eq!(cold_war.default_player.as_str(), "usa");
        assert!(cold_war.nation("ussr").unwrap().warheads.values().sum::<u32>() > 0);
    }

    #[test]
    fn unknown_scenario_is_an_error() {
        assert_eq!(
            ScenarioCatalog::default_catalog().get("atlantis").unwrap_err(),
            ScenarioError::UnknownScenario("atlantis".into())
        );
    }

    #[test]
    fn validation_catches_dangling_references() {
        let json = r#"{
            "scenarios": [{
                "id": "broken",
                "name": "Broken",
                "default_player": "usa",
                "nations": [
                    { "id": "usa", "name": "United States", "alliances": ["atlantis"] }
                ]
            }]
        }"#;
        let catalog = ScenarioCatalog::from_json(json).unwrap();
        let scenario = catalog.get("broken").unwrap();
        assert_eq!(scenario.max_turns, DEFAULT_MAX_TURNS);
        assert_eq!(
            scenario.validate(),
            Err(ScenarioError::UnknownNation {
                scenario: "broken".into(),
                nation: NationId::from("atlantis"),
            })
        );
    }

    #[test]
    fn duplicate_nations_are_rejected() {
        let json = r#"{
            "scenarios": [{
                "id": "twins",
                "name": "Twins",
                "default_player": "usa",
                "nations": [
                    { "id": "usa", "name": "United States" },
                    { "id": "usa", "name": "United States" }
                ]
            }]
        }"#;
        let catalog = ScenarioCatalog::from_json(json).unwrap();
        assert!(matches!(
            catalog.get("twins").unwrap().validate(),
            Err(ScenarioError::DuplicateNation { .. })
        ));
    }
}

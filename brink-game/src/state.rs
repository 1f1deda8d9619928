//! World state: nations, territories, the turn clock and the turn log.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::constants::{DEFAULT_MAX_TURNS, DEFCON_MAX};
use crate::cyber::CyberState;
use crate::diplomacy::{ProposalRecord, initialize_dip};
use crate::endgame::Ending;
use crate::events::PendingEvent;
use crate::governance::GovernmentState;
use crate::journal::{Severity, TurnEvent, TurnEventKind};
use crate::nation::{Nation, NationId};
use crate::scenario::{Scenario, ScenarioError};
use crate::territory::{ResourceStockpile, TerritoryResources};
use crate::treaties::{is_allied, sign_alliance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Standard,
    /// Hostile AI tuning: aggression-weighted actions score higher.
    Brinkmanship,
}

impl GameMode {
    #[must_use]
    pub const fn is_brinkmanship(self) -> bool {
        matches!(self, Self::Brinkmanship)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Brinkmanship => "brinkmanship",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    #[serde(default)]
    pub mode: GameMode,
    #[serde(default)]
    pub scenario_id: String,
    /// Turn currently being played, starting at 1.
    pub turn: u32,
    pub max_turns: u32,
    pub defcon: u8,
    pub player_id: NationId,
    pub nations: BTreeMap<NationId, Nation>,
    #[serde(default)]
    pub territories: BTreeMap<String, TerritoryResources>,
    #[serde(default)]
    pub pending_events: Vec<PendingEvent>,
    #[serde(default)]
    pub proposal_history: Vec<ProposalRecord>,
    /// Every log key emitted so far, oldest first.
    #[serde(default)]
    pub logs: Vec<String>,
    /// Structured events for the turn in progress.
    #[serde(default)]
    pub turn_events: Vec<TurnEvent>,
    #[serde(default)]
    pub global_radiation: f32,
    #[serde(default)]
    pub strikes_launched: u32,
    #[serde(default)]
    pub ending: Option<Ending>,
    #[serde(default)]
    pub next_proposal_id: u64,
}

impl GameState {
    /// Assemble a bare world from prebuilt nations. Used by tests and
    /// tools; campaigns start from [`GameState::from_scenario`].
    #[must_use]
    pub fn from_nations(nations: Vec<Nation>, player_id: NationId) -> Self {
        let nations = nations
            .into_iter()
            .map(|mut nation| {
                nation.is_player = nation.id == player_id;
                (nation.id.clone(), nation)
            })
            .collect();
        Self {
            seed: 0,
            mode: GameMode::Standard,
            scenario_id: String::new(),
            turn: 1,
            max_turns: DEFAULT_MAX_TURNS,
            defcon: DEFCON_MAX,
            player_id,
            nations,
            territories: BTreeMap::new(),
            pending_events: Vec::new(),
            proposal_history: Vec::new(),
            logs: Vec::new(),
            turn_events: Vec::new(),
            global_radiation: 0.0,
            strikes_launched: 0,
            ending: None,
            next_proposal_id: 0,
        }
    }

    /// Build the opening position of `scenario`.
    ///
    /// `player` overrides the scenario's default seat.
    ///
    /// # Errors
    ///
    /// Fails when the scenario is inconsistent or `player` is not one of
    /// its nations.
    pub fn from_scenario(
        scenario: &Scenario,
        player: Option<&str>,
        seed: u64,
        mode: GameMode,
    ) -> Result<Self, ScenarioError> {
        scenario.validate()?;
        let player_id = player.map_or_else(|| scenario.default_player.clone(), NationId::from);
        if scenario.nation(player_id.as_str()).is_none() {
            return Err(ScenarioError::UnknownNation {
                scenario: scenario.id.clone(),
                nation: player_id,
            });
        }

        let nations = scenario
            .nations
            .iter()
            .map(|setup| {
                let mut nation = Nation::new(setup.id.as_str(), setup.name.clone());
                nation.leader.clone_from(&setup.leader);
                nation.personality = setup.personality;
                nation.production = setup.production;
                nation.intel = setup.intel;
                nation.uranium = setup.uranium;
                nation.population = setup.population;
                nation.cities = setup.cities;
                nation.morale = setup.morale;
                nation.public_opinion = setup.public_opinion;
                nation.instability = setup.instability;
                nation.missiles = setup.missiles;
                nation.bombers = setup.bombers;
                nation.submarines = setup.submarines;
                nation.defense = setup.defense;
                nation.warheads = setup
                    .warheads
                    .iter()
                    .filter(|(_, count)| **count > 0)
                    .map(|(mt, count)| (*mt, *count))
                    .collect();
                nation.unlocked_yields.extend(setup.unlocked_yields.iter().copied());
                nation.unlocked_yields.extend(setup.warheads.keys().copied());
                nation.relationships = setup.relationships.clone();
                nation.threats = setup.threats.clone();
                nation.government_state = Some(GovernmentState::new(setup.government, 0));
                nation.resource_stockpile = Some(ResourceStockpile::default());
                nation.cyber = Some(CyberState::default());
                initialize_dip(&mut nation);
                nation.clamp_stats();
                nation
            })
            .collect();

        let mut state = Self::from_nations(nations, player_id);
        state.seed = seed;
        state.mode = mode;
        state.scenario_id.clone_from(&scenario.id);
        state.max_turns = scenario.max_turns;
        state.defcon = scenario.defcon.clamp(1, DEFCON_MAX);
        state.territories = scenario
            .territories
            .iter()
            .map(|territory| (territory.id.clone(), territory.clone()))
            .collect();
        for setup in &scenario.nations {
            for ally in &setup.alliances {
                if let Some((a, b)) = state.pair_mut(setup.id.as_str(), ally.as_str())
                    && !is_allied(a, ally.as_str())
                {
                    sign_alliance(a, b, 0);
                }
            }
        }
        log::debug!(
            "scenario {} ready with {} nations, player {}",
            scenario.id,
            state.nations.len(),
            state.player_id
        );
        Ok(state)
    }

    #[must_use]
    pub fn nation(&self, id: &str) -> Option<&Nation> {
        self.nations.get(id)
    }

    pub fn nation_mut(&mut self, id: &str) -> Option<&mut Nation> {
        self.nations.get_mut(id)
    }

    #[must_use]
    pub fn player(&self) -> Option<&Nation> {
        self.nations.get(self.player_id.as_str())
    }

    pub fn player_mut(&mut self) -> Option<&mut Nation> {
        self.nations.get_mut(self.player_id.as_str())
    }

    /// Borrow two distinct nations mutably. `None` if either is missing or
    /// the ids are equal.
    pub fn pair_mut(&mut self, a: &str, b: &str) -> Option<(&mut Nation, &mut Nation)> {
        if a == b {
            return None;
        }
        let mut first = None;
        let mut second = None;
        for (id, nation) in &mut self.nations {
            if id.as_str() == a {
                first = Some(nation);
            } else if id.as_str() == b {
                second = Some(nation);
            }
        }
        first.zip(second)
    }

    /// Ids of nations still in play, in stable order.
    #[must_use]
    pub fn active_ids(&self) -> Vec<NationId> {
        self.nations
            .values()
            .filter(|nation| nation.is_active())
            .map(|nation| nation.id.clone())
            .collect()
    }

    /// Record a structured event and its log key.
    pub fn emit(
        &mut self,
        kind: TurnEventKind,
        severity: Severity,
        key: impl Into<String>,
        nations: Vec<NationId>,
    ) {
        let key = key.into();
        self.logs.push(key.clone());
        self.turn_events.push(TurnEvent {
            turn: self.turn,
            kind,
            severity,
            key,
            nations,
        });
    }

    pub fn log(&mut self, key: impl Into<String>) {
        self.logs.push(key.into());
    }

    pub fn next_proposal_id(&mut self) -> u64 {
        self.next_proposal_id += 1;
        self.next_proposal_id
    }

    /// Highest threat any surviving nation perceives from another survivor.
    #[must_use]
    pub fn max_tension(&self) -> f32 {
        self.nations
            .values()
            .filter(|nation| nation.is_active())
            .flat_map(|nation| {
                nation.threats.iter().filter_map(|(other, threat)| {
                    self.nations
                        .get(other.as_str())
                        .filter(|other| other.is_active())
                        .map(|_| *threat)
                })
            })
            .fold(0.0, f32::max)
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.ending.is_some()
    }

    /// Stable hash of the full serialized state.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&bytes);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioCatalog;
    use crate::treaties::is_allied;

    fn cold_war(player: Option<&str>) -> GameState {
        let scenario = ScenarioCatalog::default_catalog()
            .get("cold_war_1962")
            .unwrap();
        GameState::from_scenario(scenario, player, 1962, GameMode::Standard).unwrap()
    }

    #[test]
    fn scenario_builds_player_and_alliances() {
        let state = cold_war(None);
        assert_eq!(state.player_id.as_str(), "usa");
        assert!(state.player().unwrap().is_player);
        assert_eq!(state.nations.values().filter(|n| n.is_player).count(), 1);
        let usa = state.nation("usa").unwrap();
        let uk = state.nation("uk").unwrap();
        assert!(is_allied(usa, "uk") && is_allied(uk, "usa"));
        assert!(usa.dip_points() > 0);
        assert!(usa.government_state.is_some());
        assert!(usa.unlocked_yields.contains(&20));
        assert_eq!(state.turn, 1);
        assert!(!state.territories.is_empty());
    }

    #[test]
    fn player_override_and_unknown_seat() {
        let state = cold_war(Some("ussr"));
        assert!(state.nation("ussr").unwrap().is_player);
        assert!(!state.nation("usa").unwrap().is_player);

        let scenario = ScenarioCatalog::default_catalog()
            .get("cold_war_1962")
            .unwrap();
        assert_eq!(
            GameState::from_scenario(scenario, Some("mars"), 1, GameMode::Standard),
            Err(ScenarioError::UnknownNation {
                scenario: "cold_war_1962".into(),
                nation: NationId::from("mars"),
            })
        );
    }

    #[test]
    fn pair_mut_rejects_self_and_unknown() {
        let mut state = cold_war(None);
        assert!(state.pair_mut("usa", "usa").is_none());
        assert!(state.pair_mut("usa", "mars").is_none());
        let (a, b) = state.pair_mut("uk", "usa").unwrap();
        assert_eq!((a.id.as_str(), b.id.as_str()), ("uk", "usa"));
    }

    #[test]
    fn emit_records_log_and_event() {
        let mut state = cold_war(None);
        state.emit(
            TurnEventKind::Military,
            Severity::Warning,
            "log.test",
            vec![NationId::from("usa")],
        );
        assert_eq!(state.logs.last().map(String::as_str), Some("log.test"));
        let event = state.turn_events.last().unwrap();
        assert!(event.involves("usa"));
        assert_eq!(event.turn, 1);
    }

    #[test]
    fn tension_ignores_eliminated_nations() {
        let mut state = cold_war(None);
        let tension = state.max_tension();
        assert!(tension >= 50.0);
        for nation in state.nations.values_mut() {
            nation.threats.clear();
        }
        state.nation_mut("ussr").unwrap().threats.insert(NationId::from("chn"), 70.0);
        assert!((state.max_tension() - 70.0).abs() < f32::EPSILON);
        state.nation_mut("chn").unwrap().eliminated = true;
        assert!(state.max_tension().abs() < f32::EPSILON);
    }

    #[test]
    fn fingerprint_tracks_state_changes() {
        let mut a = cold_war(None);
        let b = cold_war(None);
        assert_eq!(a.fingerprint(), b.fingerprint());
        a.log("log.extra");
        assert_ne!(a.fingerprint(), b.fingerprint());
        let roundtrip: GameState = serde_json::from_str(&serde_json::to_string(&b).unwrap()).unwrap();
        assert_eq!(roundtrip.fingerprint(), b.fingerprint());
    }

    #[test]
    fn proposal_ids_start_at_one() {
        let mut state = cold_war(None);
        assert_eq!(state.next_proposal_id(), 1);
        assert_eq!(state.next_proposal_id(), 2);
    }
}

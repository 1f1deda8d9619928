//! A running campaign: world state, data catalogs and RNG streams bound
//! together, with the player's actions as methods.
use std::collections::BTreeMap;

use crate::biolab::{BioLabError, LabCost, PathogenReport, release_pathogen, start_construction};
use crate::cyber::{CyberAttackKind, CyberError, CyberOutcome, launch_cyber_attack};
use crate::diplomacy::{
    DiplomacyError, DiplomacyProposal, DiplomacyResponse, impose_sanctions, lift_sanctions,
    submit_proposal,
};
use crate::endgame::{ResultConfig, ResultSummary, result_summary};
use crate::espionage::{EspionageError, EspionageOp, EspionageReport, resolve_operation};
use crate::events::{EventError, EventOption, PoliticalEventCatalog, resolve_pending_event};
use crate::governance::{GovernmentKind, change_government};
use crate::military::{
    Formation, MilitaryError, MilitaryTemplate, StrategicAsset, UnitKind, build_strategic,
    build_warhead, create_template, delete_template, disband_formation, raise_formation,
};
use crate::nation::NationId;
use crate::research::{ResearchError, ResearchTree, start_research};
use crate::rng::RngBundle;
use crate::scenario::{ScenarioCatalog, ScenarioError};
use crate::state::{GameMode, GameState};
use crate::territory::{TerritoryError, develop_infrastructure};
use crate::turn::{TurnReport, advance_turn};
use crate::warfare::{DeliverySystem, StrikeReport, WarfareError, escalate_defcon, launch_nuclear_strike};

/// Data a campaign reads but never mutates.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalogs {
    pub research: ResearchTree,
    pub events: PoliticalEventCatalog,
    pub scenarios: ScenarioCatalog,
}

impl Default for Catalogs {
    fn default() -> Self {
        Self {
            research: ResearchTree::default_catalog().clone(),
            events: PoliticalEventCatalog::default_catalog().clone(),
            scenarios: ScenarioCatalog::default_catalog().clone(),
        }
    }
}

fn resume_seed(state: &GameState) -> u64 {
    state.seed ^ (u64::from(state.turn) << 32)
}

#[derive(Debug)]
pub struct Campaign {
    state: GameState,
    catalogs: Catalogs,
    rngs: RngBundle,
}

impl Campaign {
    /// Start `scenario_id` with the player seated at `player` (or the
    /// scenario default).
    ///
    /// # Errors
    ///
    /// Fails for unknown scenarios or seats.
    pub fn new(
        catalogs: Catalogs,
        scenario_id: &str,
        player: Option<&str>,
        seed: u64,
        mode: GameMode,
    ) -> Result<Self, ScenarioError> {
        let scenario = catalogs.scenarios.get(scenario_id)?;
        let state = GameState::from_scenario(scenario, player, seed, mode)?;
        Ok(Self {
            state,
            catalogs,
            rngs: RngBundle::from_user_seed(seed),
        })
    }

    /// Resume a saved campaign. Streams are reseeded from the seed and turn
    /// so a reloaded save plays out the same way every time.
    #[must_use]
    pub fn from_state(state: GameState, catalogs: Catalogs) -> Self {
        let rngs = RngBundle::from_user_seed(resume_seed(&state));
        Self {
            state,
            catalogs,
            rngs,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    #[must_use]
    pub const fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    #[must_use]
    pub const fn rngs(&self) -> &RngBundle {
        &self.rngs
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    fn player_id(&self) -> NationId {
        self.state.player_id.clone()
    }

    /// Finish the player's turn and resolve the world's.
    pub fn end_turn(&mut self) -> TurnReport {
        advance_turn(&mut self.state, &self.catalogs, &self.rngs)
    }

    #[must_use]
    pub fn summary(&self, cfg: &ResultConfig) -> ResultSummary {
        result_summary(&self.state, cfg)
    }

    /// # Errors
    ///
    /// See [`submit_proposal`].
    pub fn propose(&mut self, mut proposal: DiplomacyProposal) -> Result<DiplomacyResponse, DiplomacyError> {
        proposal.proposer = self.player_id();
        submit_proposal(&mut self.state, proposal, &mut *self.rngs.diplomacy())
    }

    /// # Errors
    ///
    /// See [`impose_sanctions`].
    pub fn impose_sanctions(&mut self, target: &str) -> Result<(), DiplomacyError> {
        let player = self.player_id();
        impose_sanctions(&mut self.state, player.as_str(), target)
    }

    /// # Errors
    ///
    /// See [`lift_sanctions`].
    pub fn lift_sanctions(&mut self, target: &str) -> Result<(), DiplomacyError> {
        let player = self.player_id();
        lift_sanctions(&mut self.state, player.as_str(), target)
    }

    /// # Errors
    ///
    /// See [`start_research`].
    pub fn start_research(&mut self, node: &str) -> Result<(), ResearchError> {
        let nation = self.state.player_mut().ok_or(ResearchError::Eliminated)?;
        start_research(nation, &self.catalogs.research, node)
    }

    /// # Errors
    ///
    /// See [`resolve_operation`].
    pub fn run_espionage(&mut self, target: &str, op: EspionageOp) -> Result<EspionageReport, EspionageError> {
        let player = self.player_id();
        resolve_operation(&mut self.state, player.as_str(), target, op, &mut *self.rngs.espionage())
    }

    /// # Errors
    ///
    /// See [`launch_cyber_attack`].
    pub fn cyber_attack(&mut self, target: &str, kind: CyberAttackKind) -> Result<CyberOutcome, CyberError> {
        let player = self.player_id();
        launch_cyber_attack(&mut self.state, player.as_str(), target, kind, &mut *self.rngs.espionage())
    }

    /// # Errors
    ///
    /// See [`build_strategic`].
    pub fn build(&mut self, asset: StrategicAsset) -> Result<(), MilitaryError> {
        let nation = self.state.player_mut().ok_or(MilitaryError::Eliminated)?;
        build_strategic(nation, asset)
    }

    /// # Errors
    ///
    /// See [`build_warhead`].
    pub fn build_warhead(&mut self, megatons: u16) -> Result<(), MilitaryError> {
        let nation = self.state.player_mut().ok_or(MilitaryError::Eliminated)?;
        build_warhead(nation, megatons)
    }

    /// # Errors
    ///
    /// See [`create_template`].
    pub fn create_template(&mut self, name: &str, units: BTreeMap<UnitKind, u32>) -> Result<(), MilitaryError> {
        let nation = self.state.player_mut().ok_or(MilitaryError::Eliminated)?;
        create_template(nation, name, units)
    }

    /// # Errors
    ///
    /// See [`delete_template`].
    pub fn delete_template(&mut self, name: &str) -> Result<MilitaryTemplate, MilitaryError> {
        let nation = self.state.player_mut().ok_or(MilitaryError::Eliminated)?;
        delete_template(nation, name)
    }

    /// # Errors
    ///
    /// See [`raise_formation`].
    pub fn raise_formation(&mut self, template: &str) -> Result<u32, MilitaryError> {
        let nation = self.state.player_mut().ok_or(MilitaryError::Eliminated)?;
        raise_formation(nation, template)
    }

    /// # Errors
    ///
    /// See [`disband_formation`].
    pub fn disband_formation(&mut self, id: u32) -> Result<Formation, MilitaryError> {
        let nation = self.state.player_mut().ok_or(MilitaryError::Eliminated)?;
        disband_formation(nation, id)
    }

    /// # Errors
    ///
    /// See [`develop_infrastructure`].
    pub fn develop_infrastructure(&mut self, territory: &str) -> Result<u8, TerritoryError> {
        let player = self.player_id();
        develop_infrastructure(&mut self.state, player.as_str(), territory)
    }

    /// # Errors
    ///
    /// See [`start_construction`].
    pub fn upgrade_bio_lab(&mut self, tier: u8) -> Result<LabCost, BioLabError> {
        let player = self.player_id();
        let nation = self
            .state
            .player_mut()
            .ok_or(BioLabError::UnknownNation(player))?;
        start_construction(nation, tier)
    }

    /// # Errors
    ///
    /// See [`release_pathogen`].
    pub fn release_pathogen(&mut self, target: &str) -> Result<PathogenReport, BioLabError> {
        let player = self.player_id();
        release_pathogen(&mut self.state, player.as_str(), target, &mut *self.rngs.espionage())
    }

    /// # Errors
    ///
    /// See [`launch_nuclear_strike`].
    pub fn nuclear_strike(
        &mut self,
        target: &str,
        delivery: DeliverySystem,
        megatons: u16,
    ) -> Result<StrikeReport, WarfareError> {
        let player = self.player_id();
        launch_nuclear_strike(
            &mut self.state,
            player.as_str(),
            target,
            delivery,
            megatons,
            &mut *self.rngs.warfare(),
        )
    }

    /// Push the world one DEFCON step closer to war. Returns the new level.
    pub fn escalate_defcon(&mut self) -> u8 {
        let player = self.player_id();
        escalate_defcon(&mut self.state, player.as_str())
    }

    /// Returns `false` when the player has been eliminated.
    pub fn change_government(&mut self, kind: GovernmentKind) -> bool {
        let turn = self.state.turn;
        let Some(nation) = self.state.player_mut() else {
            return false;
        };
        change_government(nation, kind, turn);
        true
    }

    /// # Errors
    ///
    /// See [`resolve_pending_event`].
    pub fn resolve_event(&mut self, index: usize, option: &str) -> Result<EventOption, EventError> {
        resolve_pending_event(&mut self.state, index, option)
    }
}

//! Brink Game Engine
//!
//! Platform-agnostic core logic for a turn-based Cold War grand strategy
//! game: diplomacy, espionage, research, territory and nuclear brinkmanship.
//! This crate provides all game mechanics without UI or platform-specific
//! dependencies.

pub mod ai;
pub mod biolab;
pub mod campaign;
pub mod constants;
pub mod cyber;
pub mod diplomacy;
pub mod endgame;
pub mod espionage;
pub mod events;
pub mod governance;
pub mod journal;
pub mod military;
pub mod nation;
pub mod numbers;
pub mod relations;
pub mod research;
pub mod rng;
pub mod scenario;
pub mod seed;
pub mod state;
pub mod territory;
pub mod trace;
pub mod treaties;
pub mod turn;
pub mod warfare;

pub use ai::{AiAction, AiDecision, AiError, choose_ai_action, execute_ai_action, score_ai_actions};
pub use biolab::{BioLabError, BioLabState, PathogenReport, release_pathogen, start_construction};
pub use campaign::{Campaign, Catalogs};
pub use cyber::{CyberAttackKind, CyberError, CyberOutcome, CyberState, launch_cyber_attack};
pub use diplomacy::{
    DiplomacyError, DiplomacyProposal, DiplomacyResponse, DiplomaticInfluence, ProposalKind,
    ProposalTerms, submit_proposal,
};
pub use endgame::{Ending, ResultConfig, ResultSummary, evaluate_ending, result_summary};
pub use espionage::{EspionageError, EspionageOp, EspionageReport, IntelReport, resolve_operation};
pub use events::{EventError, PendingEvent, PoliticalEvent, PoliticalEventCatalog};
pub use governance::{GovernanceEvent, GovernmentKind, GovernmentState};
pub use journal::{Severity, TurnEvent, TurnEventKind};
pub use military::{Formation, MilitaryError, MilitaryTemplate, StrategicAsset, UnitKind};
pub use nation::{AiPersonality, Nation, NationId};
pub use research::{ResearchError, ResearchNode, ResearchTree, start_research};
pub use rng::RngBundle;
pub use scenario::{Scenario, ScenarioCatalog, ScenarioError};
pub use seed::{decode_to_seed, encode_friendly, generate_code_from_entropy, parse_share_code};
pub use state::{GameMode, GameState};
pub use territory::{ResourceKind, TerritoryError, TerritoryResources};
pub use trace::{DecisionTrace, WeightFactor};
pub use treaties::Treaty;
pub use turn::{TurnReport, advance_turn};
pub use warfare::{DeliverySystem, StrikeReport, WarfareError, launch_nuclear_strike};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the scenario, research and political event catalogs
    ///
    /// # Errors
    ///
    /// Returns an error if any catalog cannot be loaded.
    fn load_catalogs(&self) -> Result<Catalogs, Self::Error>;

    /// Load configuration data for a specific system
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_config<T>(&self, config_name: &str) -> Result<T, Self::Error>
    where
        T: serde::de::DeserializeOwned;
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait GameStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), Self::Error>;

    /// Load game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded.
    fn load_game(&self, save_name: &str) -> Result<Option<GameState>, Self::Error>;

    /// Delete saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Main game engine for managing campaigns
pub struct GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> GameEngine<L, S>
where
    L: DataLoader,
    S: GameStorage,
{
    /// Create a new game engine with the provided data loader and storage
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Start a campaign in `scenario_id`, seating the player at `player`
    /// or the scenario's default nation.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogs cannot be loaded or the scenario
    /// or nation is unknown.
    pub fn create_campaign(
        &self,
        scenario_id: &str,
        player: Option<&str>,
        seed: u64,
        mode: GameMode,
    ) -> Result<Campaign, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalogs = self.data_loader.load_catalogs().map_err(Into::into)?;
        let campaign = Campaign::new(catalogs, scenario_id, player, seed, mode)?;
        log::info!(
            "new {} campaign in {scenario_id} as {} (seed {seed})",
            mode.key(),
            campaign.state().player_id
        );
        Ok(campaign)
    }

    /// Result screen weights, falling back to the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the loader fails to parse the configuration.
    pub fn result_config(&self) -> Result<ResultConfig, L::Error> {
        self.data_loader
            .load_config::<Option<ResultConfig>>("result")
            .map(Option::unwrap_or_default)
    }

    /// Save a game state
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be saved.
    pub fn save_game(&self, save_name: &str, game_state: &GameState) -> Result<(), S::Error> {
        self.storage.save_game(save_name, game_state)
    }

    /// Load a saved campaign
    ///
    /// # Errors
    ///
    /// Returns an error if the game state cannot be loaded or its catalogs
    /// cannot be rebuilt.
    pub fn load_game(&self, save_name: &str) -> Result<Option<Campaign>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        let Some(game_state) = self.storage.load_game(save_name).map_err(Into::into)? else {
            return Ok(None);
        };
        let catalogs = self.data_loader.load_catalogs().map_err(Into::into)?;
        catalogs.scenarios.get(&game_state.scenario_id)?;
        Ok(Some(Campaign::from_state(game_state, catalogs)))
    }

    /// Delete a saved game
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_save(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}

use anyhow::{Result, ensure};
use std::sync::Arc;

use brink_game::{
    Campaign, Catalogs, GameMode, ScenarioCatalog, TurnEventKind, decode_to_seed, encode_friendly,
};

use crate::logic::policy::GameplayStrategy;
use crate::logic::simulation::{SimulationConfig, SimulationSession, SimulationSummary};

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Declarative plan for running a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub scenario_id: String,
    pub mode: GameMode,
    pub strategy: GameplayStrategy,
    pub player: Option<String>,
    pub max_turns: Option<u32>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub fn new(scenario_id: impl Into<String>, mode: GameMode, strategy: GameplayStrategy) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            mode,
            strategy,
            player: None,
            max_turns: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }

    /// Session configuration for one seed.
    #[must_use]
    pub fn config(&self, seed: u64) -> SimulationConfig {
        let mut config = SimulationConfig::new(self.scenario_id.clone(), self.mode, self.strategy, seed);
        config.player.clone_from(&self.player);
        config.max_turns = self.max_turns;
        config
    }
}

/// A named logic scenario.
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub plan: SimulationPlan,
}

impl TestScenario {
    fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        plan: SimulationPlan,
    ) -> Self {
        Self {
            key,
            name,
            description,
            plan,
        }
    }
}

const SMOKE_TURNS: u32 = 3;

fn cold_war(strategy: GameplayStrategy) -> SimulationPlan {
    SimulationPlan::new("cold_war_1962", GameMode::Standard, strategy)
}

#[must_use]
pub fn catalog() -> Vec<TestScenario> {
    vec![
        TestScenario::new(
            "smoke",
            "Smoke",
            "Three quick turns of the cold war with the balanced autopilot",
            cold_war(GameplayStrategy::Balanced)
                .with_max_turns(SMOKE_TURNS)
                .with_expectation(smoke_expectation),
        ),
        TestScenario::new(
            "share-code-consistency",
            "Share Code Consistency",
            "Share codes on the result screen decode back to the campaign",
            cold_war(GameplayStrategy::Balanced)
                .with_max_turns(SMOKE_TURNS)
                .with_expectation(share_code_expectation),
        ),
        TestScenario::new(
            "deterministic-replay",
            "Deterministic Replay",
            "Replaying a seed with the same autopilot yields the same world",
            cold_war(GameplayStrategy::Chaotic)
                .with_max_turns(10)
                .with_expectation(deterministic_replay_expectation),
        ),
        TestScenario::new(
            "scenario-catalog",
            "Scenario Catalog",
            "Every bundled scenario validates and every seat can start a campaign",
            cold_war(GameplayStrategy::Balanced)
                .with_max_turns(1)
                .with_expectation(scenario_catalog_expectation),
        ),
        TestScenario::new(
            "cold-war-full",
            "Cold War Full Campaign",
            "Full cold war campaign with the balanced autopilot",
            cold_war(GameplayStrategy::Balanced).with_expectation(full_campaign_expectation),
        ),
        TestScenario::new(
            "multipolar-full",
            "Multipolar Full Campaign",
            "Full 2030 campaign as India with the technocrat autopilot",
            SimulationPlan::new("multipolar_2030", GameMode::Standard, GameplayStrategy::Technocrat)
                .with_player("ind")
                .with_expectation(full_campaign_expectation),
        ),
        TestScenario::new(
            "diplomat-peace",
            "Diplomat Keeps The Peace",
            "A pure diplomat never launches and keeps treaties open",
            cold_war(GameplayStrategy::Diplomat)
                .with_expectation(full_campaign_expectation)
                .with_expectation(peaceful_expectation),
        ),
        TestScenario::new(
            "brinkmanship-hawk",
            "Brinkmanship Hawk",
            "A hawk in brinkmanship mode walks DEFCON down",
            SimulationPlan::new("cold_war_1962", GameMode::Brinkmanship, GameplayStrategy::Hawk)
                .with_expectation(full_campaign_expectation)
                .with_expectation(escalation_expectation),
        ),
    ]
}

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

#[must_use]
pub fn get_scenario(key: &str) -> Option<TestScenario> {
    catalog().into_iter().find(|scenario| scenario.key == key)
}

/// Keys run by `--scenarios all`.
#[must_use]
pub fn all_keys() -> Vec<String> {
    catalog()
        .into_iter()
        .map(|scenario| scenario.key.to_string())
        .collect()
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.game_ended(), "smoke run did not reach an ending");
    ensure!(
        summary.metrics.turns_played <= SMOKE_TURNS,
        "smoke run played {} turns",
        summary.metrics.turns_played
    );
    ensure!(
        summary.metrics.commands_issued > 0,
        "autopilot issued no commands"
    );
    let player = summary
        .final_state
        .player()
        .ok_or_else(|| anyhow::anyhow!("player missing from final state"))?;
    ensure!(
        player.research.is_some() || !player.researched.is_empty(),
        "no research was started"
    );
    Ok(())
}

fn share_code_expectation(summary: &SimulationSummary) -> Result<()> {
    let code = &summary.result.share_code;
    let (mode, seed) =
        decode_to_seed(code).ok_or_else(|| anyhow::anyhow!("share code {code} does not decode"))?;
    ensure!(mode == summary.mode, "share code {code} decoded to {mode:?}");
    ensure!(
        encode_friendly(mode, seed) == *code,
        "share code {code} does not re-encode"
    );
    Ok(())
}

fn deterministic_replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let config = SimulationConfig::new(
        summary.scenario_id.clone(),
        summary.mode,
        summary.strategy,
        summary.seed,
    )
    .with_player(summary.final_state.player_id.as_str())
    .with_max_turns(summary.final_state.max_turns);
    let replay = SimulationSession::new(&config, Catalogs::default())?;
    let mut policy = summary.strategy.create_policy(summary.seed);
    let replayed = replay.run(policy.as_mut(), summary.seed, summary.mode);
    ensure!(
        replayed.final_state.fingerprint() == summary.final_state.fingerprint(),
        "replay of seed {} diverged",
        summary.seed
    );
    Ok(())
}

fn scenario_catalog_expectation(_summary: &SimulationSummary) -> Result<()> {
    let catalog = ScenarioCatalog::default_catalog();
    ensure!(!catalog.scenarios.is_empty(), "no bundled scenarios");
    for scenario in &catalog.scenarios {
        scenario.validate()?;
        for setup in &scenario.nations {
            Campaign::new(
                Catalogs::default(),
                &scenario.id,
                Some(setup.id.as_str()),
                1,
                GameMode::Standard,
            )?;
        }
    }
    Ok(())
}

fn full_campaign_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.game_ended(),
        "campaign did not end after {} turns",
        summary.metrics.turns_played
    );
    ensure!(
        summary.final_state.turn <= summary.final_state.max_turns,
        "campaign overran its turn limit"
    );
    ensure!(
        summary
            .final_state
            .turn_events
            .iter()
            .any(|event| event.kind == TurnEventKind::Ending),
        "ending was not journaled"
    );
    ensure!(
        summary.result.turns == summary.final_state.turn,
        "result screen reports {} turns, campaign stopped at {}",
        summary.result.turns,
        summary.final_state.turn
    );
    Ok(())
}

fn peaceful_expectation(summary: &SimulationSummary) -> Result<()> {
    let launched_by_player = summary
        .turns
        .iter()
        .flat_map(|turn| &turn.commands)
        .any(|record| record.command.contains("strike on"));
    ensure!(!launched_by_player, "the diplomat ordered a strike");
    ensure!(
        summary.metrics.proposals_accepted > 0,
        "no proposal was ever accepted"
    );
    Ok(())
}

fn escalation_expectation(summary: &SimulationSummary) -> Result<()> {
    let escalated = summary
        .turns
        .iter()
        .flat_map(|turn| &turn.commands)
        .any(|record| record.command == "escalate DEFCON");
    ensure!(
        !escalated || summary.metrics.min_defcon < 5,
        "escalation orders never moved DEFCON"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_keys_are_unique() {
        let mut keys = all_keys();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert!(get_scenario("smoke").is_some());
        assert!(get_scenario("missing").is_none());
    }

    #[test]
    fn plans_produce_matching_configs() {
        let scenario = get_scenario("multipolar-full").unwrap();
        let config = scenario.plan.config(42);
        assert_eq!(config.scenario_id, "multipolar_2030");
        assert_eq!(config.player.as_deref(), Some("ind"));
        assert_eq!(config.seed, 42);
        assert_eq!(config.strategy, GameplayStrategy::Technocrat);
    }

    #[test]
    fn list_includes_descriptions() {
        let listed = list_scenarios();
        assert!(listed.iter().any(|(key, description)| *key == "smoke" && !description.is_empty()));
    }
}

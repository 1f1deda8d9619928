use brink_game::{
    Campaign, Catalogs, Ending, GameMode, GameState, ResultConfig, ResultSummary, ScenarioError,
    TurnReport,
};

use crate::logic::policy::{GameplayStrategy, PlayerCommand, PlayerPolicy};

/// Configuration for a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: u64,
    pub mode: GameMode,
    pub scenario_id: String,
    pub player: Option<String>,
    pub strategy: GameplayStrategy,
    pub max_turns: Option<u32>,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(scenario_id: impl Into<String>, mode: GameMode, strategy: GameplayStrategy, seed: u64) -> Self {
        Self {
            seed,
            mode,
            scenario_id: scenario_id.into(),
            player: None,
            strategy,
            max_turns: None,
        }
    }

    #[must_use]
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }
}

/// Snapshot of a resolved political event.
#[derive(Debug, Clone)]
pub struct DecisionRecord {
    pub turn: u32,
    pub event_id: String,
    pub option_id: String,
    pub policy_name: String,
    pub rationale: Option<String>,
}

/// A player command and how the engine answered it.
#[derive(Debug, Clone)]
pub struct CommandRecord {
    pub turn: u32,
    pub command: String,
    pub error: Option<String>,
}

/// Result of playing and ending one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn: u32,
    pub commands: Vec<CommandRecord>,
    pub decisions: Vec<DecisionRecord>,
    pub proposals_accepted: usize,
    pub report: TurnReport,
}

impl TurnOutcome {
    #[must_use]
    pub fn failed_commands(&self) -> usize {
        self.commands.iter().filter(|record| record.error.is_some()).count()
    }
}

/// Aggregated measurements for one run.
#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    pub turns_played: u32,
    pub commands_issued: usize,
    pub commands_failed: usize,
    pub proposals_accepted: usize,
    pub events_resolved: usize,
    pub min_defcon: u8,
    pub strikes_launched: u32,
    pub final_population: f32,
    pub allies: usize,
    pub decision_log: Vec<DecisionRecord>,
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub mode: GameMode,
    pub scenario_id: String,
    pub strategy: GameplayStrategy,
    pub turns: Vec<TurnOutcome>,
    pub metrics: RunMetrics,
    pub final_state: GameState,
    pub ending: Option<Ending>,
    pub result: ResultSummary,
}

impl SimulationSummary {
    #[must_use]
    pub const fn game_ended(&self) -> bool {
        self.ending.is_some()
    }

    #[must_use]
    pub fn ending_label(&self) -> &'static str {
        self.ending.map_or("unfinished", Ending::key)
    }
}

fn done<T, E: std::fmt::Display>(result: Result<T, E>) -> Result<bool, String> {
    result.map(|_| false).map_err(|e| e.to_string())
}

/// Core deterministic simulation harness used by the tester.
pub struct SimulationSession {
    campaign: Campaign,
    strategy: GameplayStrategy,
    turns: Vec<TurnOutcome>,
}

impl SimulationSession {
    /// # Errors
    ///
    /// Fails when the scenario or the requested seat does not exist.
    pub fn new(config: &SimulationConfig, catalogs: Catalogs) -> Result<Self, ScenarioError> {
        let mut campaign = Campaign::new(
            catalogs,
            &config.scenario_id,
            config.player.as_deref(),
            config.seed,
            config.mode,
        )?;
        if let Some(max_turns) = config.max_turns {
            campaign.with_state_mut(|state| state.max_turns = max_turns.max(1));
        }
        Ok(Self {
            campaign,
            strategy: config.strategy,
            turns: Vec::new(),
        })
    }

    #[must_use]
    pub const fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        self.campaign.state()
    }

    /// Play one turn: answer pending events, issue the policy's commands,
    /// then end the turn.
    pub fn advance(&mut self, policy: &mut dyn PlayerPolicy) -> TurnOutcome {
        let turn = self.campaign.state().turn;
        let decisions = self.resolve_events(policy, turn);

        let plan = policy.plan_turn(self.campaign.state(), &self.campaign.catalogs().research);
        let mut proposals_accepted = 0;
        let mut commands = Vec::with_capacity(plan.len());
        for command in plan {
            let label = command.label();
            let result = self.execute(command);
            if result == Ok(true) {
                proposals_accepted += 1;
            }
            let error = result.err();
            if let Some(err) = &error {
                log::trace!("turn {turn}: {label} failed: {err}");
            }
            commands.push(CommandRecord {
                turn,
                command: label,
                error,
            });
        }

        let report = self.campaign.end_turn();
        let outcome = TurnOutcome {
            turn,
            commands,
            decisions,
            proposals_accepted,
            report,
        };
        self.turns.push(outcome.clone());
        outcome
    }

    fn resolve_events(&mut self, policy: &mut dyn PlayerPolicy, turn: u32) -> Vec<DecisionRecord> {
        let mut decisions = Vec::new();
        while let Some(pending) = self.campaign.state().pending_events.first().cloned() {
            let decision = policy.pick_option(self.campaign.state(), &pending.event);
            let option_id = match self.campaign.resolve_event(0, &decision.option_id) {
                Ok(option) => option.id,
                Err(err) => {
                    // Fall back to the first option so the queue always drains.
                    log::warn!("{} picked an invalid option: {err}", policy.name());
                    let Some(first) = pending.event.options.first() else {
                        self.campaign.with_state_mut(|state| {
                            state.pending_events.remove(0);
                        });
                        continue;
                    };
                    match self.campaign.resolve_event(0, &first.id) {
                        Ok(option) => option.id,
                        Err(_) => {
                            self.campaign.with_state_mut(|state| {
                                state.pending_events.remove(0);
                            });
                            continue;
                        }
                    }
                }
            };
            decisions.push(DecisionRecord {
                turn,
                event_id: pending.event.id.clone(),
                option_id,
                policy_name: policy.name().to_string(),
                rationale: decision.rationale,
            });
        }
        decisions
    }

    /// Returns `Ok(true)` for accepted proposals.
    fn execute(&mut self, command: PlayerCommand) -> Result<bool, String> {
        let campaign = &mut self.campaign;
        match command {
            PlayerCommand::Research(node) => done(campaign.start_research(&node)),
            PlayerCommand::Propose(proposal) => campaign
                .propose(proposal)
                .map(|response| response.accepted)
                .map_err(|e| e.to_string()),
            PlayerCommand::Sanction(target) => done(campaign.impose_sanctions(target.as_str())),
            PlayerCommand::LiftSanctions(target) => done(campaign.lift_sanctions(target.as_str())),
            PlayerCommand::Build(asset) => done(campaign.build(asset)),
            PlayerCommand::BuildWarhead(megatons) => done(campaign.build_warhead(megatons)),
            PlayerCommand::Espionage { target, op } => {
                done(campaign.run_espionage(target.as_str(), op))
            }
            PlayerCommand::Cyber { target, kind } => {
                done(campaign.cyber_attack(target.as_str(), kind))
            }
            PlayerCommand::Infrastructure(territory) => {
                done(campaign.develop_infrastructure(&territory))
            }
            PlayerCommand::EscalateDefcon => {
                campaign.escalate_defcon();
                Ok(false)
            }
            PlayerCommand::Strike {
                target,
                delivery,
                megatons,
            } => done(campaign.nuclear_strike(target.as_str(), delivery, megatons)),
            PlayerCommand::ChangeGovernment(kind) => {
                if campaign.change_government(kind) {
                    Ok(false)
                } else {
                    Err("player has been eliminated".to_string())
                }
            }
        }
    }

    /// Play until the campaign ends or the turn limit runs out.
    pub fn run(mut self, policy: &mut dyn PlayerPolicy, seed: u64, mode: GameMode) -> SimulationSummary {
        let limit = self.campaign.state().max_turns.saturating_add(1);
        for _ in 0..limit {
            if self.campaign.state().ending.is_some() {
                break;
            }
            self.advance(policy);
        }
        self.summarize(seed, mode)
    }

    fn summarize(self, seed: u64, mode: GameMode) -> SimulationSummary {
        let result = self.campaign.summary(&ResultConfig::default());
        let state = self.campaign.into_state();
        let mut metrics = RunMetrics {
            turns_played: u32::try_from(self.turns.len()).unwrap_or(u32::MAX),
            min_defcon: state.defcon,
            strikes_launched: state.strikes_launched,
            ..RunMetrics::default()
        };
        for outcome in &self.turns {
            metrics.commands_issued += outcome.commands.len();
            metrics.commands_failed += outcome.failed_commands();
            metrics.proposals_accepted += outcome.proposals_accepted;
            metrics.events_resolved += outcome.decisions.len();
            metrics.min_defcon = metrics.min_defcon.min(outcome.report.defcon);
            metrics.decision_log.extend(outcome.decisions.iter().cloned());
        }
        if let Some(player) = state.player() {
            metrics.final_population = player.population;
            metrics.allies = player
                .treaties
                .values()
                .filter(|treaty| treaty.alliance)
                .count();
        }
        SimulationSummary {
            seed,
            mode,
            scenario_id: state.scenario_id.clone(),
            strategy: self.strategy,
            turns: self.turns,
            metrics,
            ending: state.ending,
            final_state: state,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(strategy: GameplayStrategy, seed: u64) -> SimulationSession {
        let config = SimulationConfig::new("cold_war_1962", GameMode::Standard, strategy, seed)
            .with_max_turns(8);
        SimulationSession::new(&config, Catalogs::default()).unwrap()
    }

    #[test]
    fn unknown_scenario_is_rejected() {
        let config = SimulationConfig::new("atlantis", GameMode::Standard, GameplayStrategy::Hawk, 1);
        assert!(SimulationSession::new(&config, Catalogs::default()).is_err());
    }

    #[test]
    fn advance_records_commands_and_moves_the_clock() {
        let mut session = session(GameplayStrategy::Balanced, 9);
        let mut policy = GameplayStrategy::Balanced.create_policy(9);
        let outcome = session.advance(policy.as_mut());
        assert_eq!(outcome.turn, 1);
        assert!(!outcome.commands.is_empty());
        assert_eq!(session.state().turn, 2);
    }

    #[test]
    fn shortened_campaign_ends_in_time() {
        let session = session(GameplayStrategy::Diplomat, 4);
        let mut policy = GameplayStrategy::Diplomat.create_policy(4);
        let summary = session.run(policy.as_mut(), 4, GameMode::Standard);
        assert!(summary.game_ended());
        assert!(summary.metrics.turns_played <= 8);
        assert_eq!(summary.result.turns, summary.final_state.turn);
        assert_eq!(summary.scenario_id, "cold_war_1962");
        assert!(summary.metrics.min_defcon >= 1);
    }

    #[test]
    fn runs_are_deterministic_per_seed() {
        let play = |seed| {
            let mut policy = GameplayStrategy::Chaotic.create_policy(seed);
            session(GameplayStrategy::Chaotic, seed)
                .run(policy.as_mut(), seed, GameMode::Standard)
                .final_state
                .fingerprint()
        };
        assert_eq!(play(21), play(21));
    }
}

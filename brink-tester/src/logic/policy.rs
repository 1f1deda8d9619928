use std::fmt;

use brink_game::events::EventEffects;
use brink_game::numbers::i32_to_f32;
use brink_game::{
    CyberAttackKind, DeliverySystem, DiplomacyProposal, EspionageOp, GameState, GovernmentKind,
    Nation, NationId, PoliticalEvent, ProposalKind, ResearchTree, StrategicAsset,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

/// Threat level at which the hawk starts walking DEFCON down.
const HAWK_ESCALATION_THREAT: f32 = 35.0;
/// Turns of build-up before the hawk will consider a first strike.
const HAWK_STRIKE_MIN_TURN: u32 = 15;
const STRIKE_MEGATONS: u16 = 10;
const ALLIANCE_RELATIONSHIP: i32 = 40;

/// Event option chosen by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub option_id: String,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(option_id: impl Into<String>, rationale: Option<String>) -> Self {
        Self {
            option_id: option_id.into(),
            rationale,
        }
    }
}

/// One player action queued for the current turn.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Research(String),
    Propose(DiplomacyProposal),
    Sanction(NationId),
    LiftSanctions(NationId),
    Build(StrategicAsset),
    BuildWarhead(u16),
    Espionage {
        target: NationId,
        op: EspionageOp,
    },
    Cyber {
        target: NationId,
        kind: CyberAttackKind,
    },
    Infrastructure(String),
    EscalateDefcon,
    Strike {
        target: NationId,
        delivery: DeliverySystem,
        megatons: u16,
    },
    ChangeGovernment(GovernmentKind),
}

impl PlayerCommand {
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Research(node) => format!("research {node}"),
            Self::Propose(proposal) => format!("propose {} to {}", proposal.kind.key(), proposal.target),
            Self::Sanction(target) => format!("sanction {target}"),
            Self::LiftSanctions(target) => format!("lift sanctions on {target}"),
            Self::Build(asset) => format!("build {asset:?}"),
            Self::BuildWarhead(megatons) => format!("build {megatons}MT warhead"),
            Self::Espionage { target, op } => format!("{op:?} against {target}"),
            Self::Cyber { target, kind } => format!("cyber {kind:?} against {target}"),
            Self::Infrastructure(territory) => format!("develop {territory}"),
            Self::EscalateDefcon => "escalate DEFCON".to_string(),
            Self::Strike {
                target,
                delivery,
                megatons,
            } => format!("{megatons}MT {delivery:?} strike on {target}"),
            Self::ChangeGovernment(kind) => format!("change government to {kind:?}"),
        }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Actions to take before ending the turn.
    fn plan_turn(&mut self, state: &GameState, tree: &ResearchTree) -> Vec<PlayerCommand>;

    /// Select an option for a pending political event.
    fn pick_option(&mut self, state: &GameState, event: &PoliticalEvent) -> PolicyDecision;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GameplayStrategy {
    Diplomat,
    Hawk,
    Balanced,
    Technocrat,
    Chaotic,
}

impl GameplayStrategy {
    pub const ALL: [Self; 5] = [
        Self::Diplomat,
        Self::Hawk,
        Self::Balanced,
        Self::Technocrat,
        Self::Chaotic,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Diplomat => "Diplomat",
            Self::Hawk => "Hawk",
            Self::Balanced => "Balanced",
            Self::Technocrat => "Technocrat",
            Self::Chaotic => "Chaotic",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.label().eq_ignore_ascii_case(key.trim()))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Diplomat => Box::new(DiplomatPolicy),
            Self::Hawk => Box::new(HawkPolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Technocrat => Box::new(TechnocratPolicy),
            Self::Chaotic => Box::new(ChaoticPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct DiplomatPolicy;
struct HawkPolicy;
struct BalancedPolicy;
struct TechnocratPolicy;

struct ChaoticPolicy {
    rng: ChaCha20Rng,
}

impl ChaoticPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

fn others<'a>(state: &'a GameState, player: &Nation) -> impl Iterator<Item = &'a Nation> + use<'a> {
    let player = player.id.clone();
    state
        .nations
        .values()
        .filter(move |nation| nation.id != player && nation.is_active())
}

/// The active nation the player considers most dangerous.
fn main_rival<'a>(state: &'a GameState, player: &Nation) -> Option<&'a Nation> {
    let hostility = |nation: &Nation| {
        let id = nation.id.as_str();
        player.threat_from(id) - 0.5 * i32_to_f32(player.relationship_with(id))
    };
    others(state, player).max_by(|a, b| hostility(a).total_cmp(&hostility(b)))
}

/// The friendliest nation the player is not yet allied with.
fn best_partner<'a>(state: &'a GameState, player: &Nation) -> Option<&'a Nation> {
    others(state, player)
        .filter(|nation| {
            !player
                .treaty_with(nation.id.as_str())
                .is_some_and(|treaty| treaty.alliance)
        })
        .max_by_key(|nation| player.relationship_with(nation.id.as_str()))
}

fn next_research(player: &Nation, tree: &ResearchTree, preferred: &[&str]) -> Option<PlayerCommand> {
    if player.research.is_some() {
        return None;
    }
    let available = tree.available_nodes(player);
    let node = preferred
        .iter()
        .find_map(|keyword| available.iter().find(|node| node.id.contains(keyword)))
        .or_else(|| available.first())?;
    Some(PlayerCommand::Research(node.id.clone()))
}

fn undeveloped_territory(state: &GameState, player: &Nation) -> Option<PlayerCommand> {
    state
        .territories
        .values()
        .filter(|territory| territory.owner == player.id)
        .min_by_key(|territory| territory.infrastructure)
        .map(|territory| PlayerCommand::Infrastructure(territory.id.clone()))
}

fn partner_proposal(player: &Nation, partner: &Nation) -> PlayerCommand {
    let treaty = player.treaty_with(partner.id.as_str());
    let kind = if !treaty.is_some_and(|t| t.trade) {
        ProposalKind::TradeAgreement
    } else if player.relationship_with(partner.id.as_str()) >= ALLIANCE_RELATIONSHIP {
        ProposalKind::Alliance
    } else {
        ProposalKind::NonAggression
    };
    PlayerCommand::Propose(DiplomacyProposal::new(
        player.id.as_str(),
        partner.id.as_str(),
        kind,
    ))
}

fn best_option_by<F>(event: &PoliticalEvent, score: F, label: &str) -> PolicyDecision
where
    F: Fn(&EventEffects) -> f32,
{
    let best = event
        .options
        .iter()
        .max_by(|a, b| score(&a.effects).total_cmp(&score(&b.effects)));
    match best {
        Some(option) => PolicyDecision::new(
            option.id.clone(),
            Some(format!("{label} {:.1}", score(&option.effects))),
        ),
        None => PolicyDecision::new(String::new(), None),
    }
}

impl PlayerPolicy for DiplomatPolicy {
    fn name(&self) -> &'static str {
        "Diplomat"
    }

    fn plan_turn(&mut self, state: &GameState, tree: &ResearchTree) -> Vec<PlayerCommand> {
        let Some(player) = state.player() else {
            return Vec::new();
        };
        let mut commands = Vec::new();
        commands.extend(next_research(player, tree, &["signals", "industrial", "covert"]));
        if let Some(partner) = best_partner(state, player) {
            commands.push(partner_proposal(player, partner));
        }
        if let Some(rival) = main_rival(state, player) {
            if !player.treaty_with(rival.id.as_str()).is_some_and(|t| t.at_peace()) {
                commands.push(PlayerCommand::Propose(DiplomacyProposal::new(
                    player.id.as_str(),
                    rival.id.as_str(),
                    ProposalKind::Truce,
                )));
            }
            if rival.sanctioned_by.contains(&player.id) {
                commands.push(PlayerCommand::LiftSanctions(rival.id.clone()));
            }
        }
        commands.push(PlayerCommand::Build(StrategicAsset::Defense));
        commands
    }

    fn pick_option(&mut self, _state: &GameState, event: &PoliticalEvent) -> PolicyDecision {
        best_option_by(
            event,
            |effects| effects.public_opinion + 2.0 * i32_to_f32(effects.dip) - effects.instability,
            "goodwill",
        )
    }
}

impl PlayerPolicy for HawkPolicy {
    fn name(&self) -> &'static str {
        "Hawk"
    }

    fn plan_turn(&mut self, state: &GameState, tree: &ResearchTree) -> Vec<PlayerCommand> {
        let Some(player) = state.player() else {
            return Vec::new();
        };
        let mut commands = Vec::new();
        commands.extend(next_research(
            player,
            tree,
            &["rocketry", "fission", "thermonuclear", "icbm", "megaton"],
        ));
        commands.push(PlayerCommand::Build(StrategicAsset::Missile));
        commands.push(PlayerCommand::BuildWarhead(STRIKE_MEGATONS));

        let Some(rival) = main_rival(state, player) else {
            return commands;
        };
        let target = rival.id.clone();
        if !rival.sanctioned_by.contains(&player.id) {
            commands.push(PlayerCommand::Sanction(target.clone()));
        }
        commands.push(PlayerCommand::Espionage {
            target: target.clone(),
            op: EspionageOp::Sabotage,
        });
        commands.push(PlayerCommand::Cyber {
            target: target.clone(),
            kind: CyberAttackKind::GridDisruption,
        });

        let threatened = player.threat_from(target.as_str()) >= HAWK_ESCALATION_THREAT;
        if threatened && state.defcon > 2 {
            commands.push(PlayerCommand::EscalateDefcon);
        }
        let armed = player.missiles > 0
            && player.warheads.get(&STRIKE_MEGATONS).copied().unwrap_or(0) > 0;
        if state.defcon <= 2 && state.turn >= HAWK_STRIKE_MIN_TURN && armed {
            commands.push(PlayerCommand::Strike {
                target,
                delivery: DeliverySystem::Missile,
                megatons: STRIKE_MEGATONS,
            });
        }
        commands
    }

    fn pick_option(&mut self, _state: &GameState, event: &PoliticalEvent) -> PolicyDecision {
        best_option_by(
            event,
            |effects| i32_to_f32(effects.production + effects.intel) + effects.morale,
            "strength",
        )
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn plan_turn(&mut self, state: &GameState, tree: &ResearchTree) -> Vec<PlayerCommand> {
        let Some(player) = state.player() else {
            return Vec::new();
        };
        let mut commands = Vec::new();
        commands.extend(next_research(player, tree, &[]));
        if state.turn % 3 == 0 {
            commands.extend(undeveloped_territory(state, player));
        }
        if let Some(partner) = best_partner(state, player) {
            commands.push(partner_proposal(player, partner));
        }
        if let Some(rival) = main_rival(state, player) {
            if state.turn % 4 == 0 {
                commands.push(PlayerCommand::Espionage {
                    target: rival.id.clone(),
                    op: EspionageOp::Reconnaissance,
                });
            }
            let asset = if player.defense < rival.missiles {
                StrategicAsset::Defense
            } else {
                StrategicAsset::Missile
            };
            commands.push(PlayerCommand::Build(asset));
        }
        commands
    }

    fn pick_option(&mut self, state: &GameState, event: &PoliticalEvent) -> PolicyDecision {
        match state.player() {
            Some(player) => best_option_by(event, |effects| effects.net_score(player), "net"),
            None => best_option_by(event, |_| 0.0, "net"),
        }
    }
}

impl PlayerPolicy for TechnocratPolicy {
    fn name(&self) -> &'static str {
        "Technocrat"
    }

    fn plan_turn(&mut self, state: &GameState, tree: &ResearchTree) -> Vec<PlayerCommand> {
        let Some(player) = state.player() else {
            return Vec::new();
        };
        let mut commands = Vec::new();
        if player.government_kind() != GovernmentKind::Technocracy
            && player.researched.len() >= 3
            && player.instability < 50.0
        {
            commands.push(PlayerCommand::ChangeGovernment(GovernmentKind::Technocracy));
        }
        commands.extend(next_research(player, tree, &["industrial", "signals"]));
        commands.extend(undeveloped_territory(state, player));
        let leader = others(state, player).max_by_key(|nation| nation.researched.len());
        if let Some(leader) = leader {
            if player.research.is_some() {
                commands.push(PlayerCommand::Espionage {
                    target: leader.id.clone(),
                    op: EspionageOp::StealResearch,
                });
            }
            commands.push(PlayerCommand::Cyber {
                target: leader.id.clone(),
                kind: CyberAttackKind::Intrusion,
            });
        }
        commands
    }

    fn pick_option(&mut self, _state: &GameState, event: &PoliticalEvent) -> PolicyDecision {
        best_option_by(
            event,
            |effects| i32_to_f32(2 * effects.intel + effects.production) - effects.instability,
            "progress",
        )
    }
}

impl PlayerPolicy for ChaoticPolicy {
    fn name(&self) -> &'static str {
        "Chaotic"
    }

    fn plan_turn(&mut self, state: &GameState, tree: &ResearchTree) -> Vec<PlayerCommand> {
        let Some(player) = state.player() else {
            return Vec::new();
        };
        let mut pool: Vec<PlayerCommand> = Vec::new();
        pool.extend(next_research(player, tree, &[]));
        pool.extend(undeveloped_territory(state, player));
        pool.push(PlayerCommand::Build(StrategicAsset::Bomber));
        pool.push(PlayerCommand::Build(StrategicAsset::Submarine));
        let targets: Vec<&Nation> = others(state, player).collect();
        if let Some(target) = targets.choose(&mut self.rng) {
            let kind = ProposalKind::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(ProposalKind::Truce);
            pool.push(PlayerCommand::Propose(DiplomacyProposal::new(
                player.id.as_str(),
                target.id.as_str(),
                kind,
            )));
            let op = EspionageOp::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(EspionageOp::Reconnaissance);
            pool.push(PlayerCommand::Espionage {
                target: target.id.clone(),
                op,
            });
        }

        let picks = self.rng.gen_range(1..=pool.len().max(1));
        pool.shuffle(&mut self.rng);
        pool.truncate(picks);
        pool
    }

    fn pick_option(&mut self, _state: &GameState, event: &PoliticalEvent) -> PolicyDecision {
        match event.options.choose(&mut self.rng) {
            Some(option) => PolicyDecision::new(option.id.clone(), Some("coin flip".to_string())),
            None => PolicyDecision::new(String::new(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brink_game::{Campaign, Catalogs, GameMode};

    fn campaign() -> Campaign {
        Campaign::new(Catalogs::default(), "cold_war_1962", None, 1962, GameMode::Standard)
            .unwrap()
    }

    #[test]
    fn strategies_round_trip_through_labels() {
        for strategy in GameplayStrategy::ALL {
            assert_eq!(GameplayStrategy::from_key(strategy.label()), Some(strategy));
            assert_eq!(strategy.create_policy(1).name(), strategy.label());
        }
        assert_eq!(GameplayStrategy::from_key(" hawk "), Some(GameplayStrategy::Hawk));
        assert!(GameplayStrategy::from_key("pacifist").is_none());
    }

    #[test]
    fn every_policy_starts_research_on_turn_one() {
        let campaign = campaign();
        for strategy in GameplayStrategy::ALL {
            if strategy == GameplayStrategy::Chaotic {
                continue;
            }
            let mut policy = strategy.create_policy(7);
            let commands = policy.plan_turn(campaign.state(), &campaign.catalogs().research);
            assert!(
                commands
                    .iter()
                    .any(|command| matches!(command, PlayerCommand::Research(_))),
                "{strategy} did not research"
            );
        }
    }

    #[test]
    fn hawk_holds_fire_above_strike_threshold() {
        let campaign = campaign();
        let mut policy = GameplayStrategy::Hawk.create_policy(3);
        let commands = policy.plan_turn(campaign.state(), &campaign.catalogs().research);
        assert!(
            !commands
                .iter()
                .any(|command| matches!(command, PlayerCommand::Strike { .. }))
        );
        assert!(commands.contains(&PlayerCommand::Build(StrategicAsset::Missile)));
    }

    #[test]
    fn chaotic_policy_is_reproducible() {
        let campaign = campaign();
        let plan = |seed| {
            let mut policy = GameplayStrategy::Chaotic.create_policy(seed);
            policy.plan_turn(campaign.state(), &campaign.catalogs().research)
        };
        assert_eq!(plan(11), plan(11));
        assert!(!plan(11).is_empty());
    }

    #[test]
    fn policies_pick_listed_event_options() {
        let campaign = campaign();
        let catalog = &campaign.catalogs().events;
        for strategy in GameplayStrategy::ALL {
            let mut policy = strategy.create_policy(5);
            for event in &catalog.events {
                let decision = policy.pick_option(campaign.state(), event);
                assert!(
                    event.options.iter().any(|option| option.id == decision.option_id),
                    "{strategy} picked {} for {}",
                    decision.option_id,
                    event.id
                );
            }
        }
    }

    #[test]
    fn command_labels_are_readable() {
        let strike = PlayerCommand::Strike {
            target: NationId::from("ussr"),
            delivery: DeliverySystem::Missile,
            megatons: 10,
        };
        assert_eq!(strike.label(), "10MT Missile strike on ussr");
        assert_eq!(PlayerCommand::EscalateDefcon.label(), "escalate DEFCON");
    }
}

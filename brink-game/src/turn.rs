//! The turn pipeline.
//!
//! Order: economy, territories, DIP, research, bio-labs and cyber,
//! governance, political events, AI actions, treaty and relation decay,
//! DEFCON, then elimination and the ending check.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ai::{AiDecision, choose_ai_action, execute_ai_action};
use crate::biolab::{advance_construction, lab_intel_yield};
use crate::campaign::Catalogs;
use crate::constants::{BASE_INTEL_INCOME, LOG_NATION_ELIMINATED, LOG_TRUCE_EXPIRED, PRODUCTION_PER_CITY};
use crate::cyber::regenerate_readiness;
use crate::diplomacy::{apply_dip_income, sanction_multiplier};
use crate::endgame::{Ending, evaluate_ending};
use crate::events::{PendingEvent, apply_event_effects, auto_resolve_option, roll_political_event};
use crate::governance::{GovernanceEvent, update_governance};
use crate::journal::{Severity, TurnEvent, TurnEventKind};
use crate::nation::{Nation, NationId};
use crate::numbers::{round_f32_to_i32, u32_to_f32};
use crate::relations::decay_relations;
use crate::research::advance_research;
use crate::rng::RngBundle;
use crate::state::GameState;
use crate::territory::{ShortageReport, process_territories};
use crate::trace::DecisionTrace;
use crate::treaties::tick_treaties;
use crate::warfare::update_defcon;

/// Everything that happened during one call to [`advance_turn`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TurnReport {
    pub turn: u32,
    pub production: BTreeMap<NationId, i32>,
    pub dip_income: BTreeMap<NationId, i32>,
    pub shortages: Vec<ShortageReport>,
    pub research_completed: Vec<(NationId, String)>,
    pub labs_completed: Vec<(NationId, u8)>,
    pub governance: Vec<(NationId, GovernanceEvent)>,
    pub event_traces: Vec<DecisionTrace>,
    pub ai_decisions: Vec<AiDecision>,
    /// AI actions that were chosen but could not be carried out.
    pub ai_failures: Vec<(NationId, String)>,
    pub expired_truces: Vec<(NationId, NationId)>,
    pub defcon: u8,
    pub eliminated: Vec<NationId>,
    pub ending: Option<Ending>,
    pub events: Vec<TurnEvent>,
}

/// Production earned this turn before shortages.
#[must_use]
pub fn production_income(nation: &Nation) -> i32 {
    let base = u32_to_f32(nation.cities) * PRODUCTION_PER_CITY;
    let scaled = base
        * nation.government_kind().modifiers().production_multiplier
        * sanction_multiplier(nation);
    round_f32_to_i32(scaled).saturating_add(nation.bonuses.production).max(0)
}

fn run_economy(state: &mut GameState, report: &mut TurnReport) {
    for nation in state.nations.values_mut().filter(|n| n.is_active()) {
        let income = production_income(nation);
        nation.production = nation.production.saturating_add(income);
        let intel = BASE_INTEL_INCOME
            .saturating_add(nation.bonuses.intel)
            .saturating_add(lab_intel_yield(nation))
            .max(0);
        nation.intel = nation.intel.saturating_add(intel);
        report.production.insert(nation.id.clone(), income);
    }
}

fn run_dip(state: &mut GameState, report: &mut TurnReport) {
    for nation in state.nations.values_mut().filter(|n| n.is_active()) {
        let gained = apply_dip_income(nation);
        report.dip_income.insert(nation.id.clone(), gained);
    }
}

fn run_research(state: &mut GameState, catalogs: &Catalogs, report: &mut TurnReport) {
    let mut completed = Vec::new();
    for nation in state.nations.values_mut().filter(|n| n.is_active()) {
        if let Some(id) = advance_research(nation, &catalogs.research) {
            completed.push((nation.id.clone(), id));
        }
    }
    for (nation, id) in &completed {
        state.emit(
            TurnEventKind::Research,
            Severity::Info,
            format!("log.research.completed.{id}"),
            vec![nation.clone()],
        );
    }
    report.research_completed = completed;
}

fn run_labs_and_cyber(state: &mut GameState, report: &mut TurnReport) {
    let mut finished = Vec::new();
    for nation in state.nations.values_mut().filter(|n| n.is_active()) {
        if let Some(tier) = advance_construction(nation) {
            finished.push((nation.id.clone(), tier));
        }
        regenerate_readiness(nation);
    }
    for (nation, tier) in &finished {
        state.emit(
            TurnEventKind::BioWarfare,
            Severity::Info,
            format!("log.biolab.tier.{tier}"),
            vec![nation.clone()],
        );
    }
    report.labs_completed = finished;
}

fn run_governance(state: &mut GameState, rngs: &RngBundle, report: &mut TurnReport) {
    let turn = state.turn;
    let mut outcomes = Vec::new();
    for nation in state.nations.values_mut().filter(|n| n.is_active()) {
        let sanctions = nation.sanctioned_by.len();
        for event in update_governance(nation, turn, sanctions, &mut *rngs.events()) {
            outcomes.push((nation.id.clone(), event));
        }
    }
    for (nation, event) in &outcomes {
        let severity = match event {
            GovernanceEvent::Coup { .. } => Severity::Critical,
            GovernanceEvent::ElectionLost { .. } | GovernanceEvent::CoupAverted { .. } => {
                Severity::Warning
            }
            GovernanceEvent::ElectionWon { .. } => Severity::Info,
        };
        state.emit(
            TurnEventKind::Governance,
            severity,
            event.log_key(),
            vec![nation.clone()],
        );
    }
    report.governance = outcomes;
}

fn run_political_events(
    state: &mut GameState,
    catalogs: &Catalogs,
    rngs: &RngBundle,
    report: &mut TurnReport,
) {
    let turn = state.turn;
    for id in state.active_ids() {
        let Some(nation) = state.nation(id.as_str()) else {
            continue;
        };
        let Some(roll) = roll_political_event(nation, &catalogs.events, turn, &mut *rngs.events())
        else {
            continue;
        };
        report.event_traces.push(roll.trace.clone());
        if nation.is_player {
            let key = roll.event.title_key();
            state.pending_events.push(PendingEvent {
                nation: id.clone(),
                turn,
                event: roll.event,
            });
            state.emit(TurnEventKind::Political, Severity::Warning, key, vec![id]);
            continue;
        }
        let Some(option) = auto_resolve_option(&roll.event, nation).cloned() else {
            continue;
        };
        if let Some(nation) = state.nation_mut(id.as_str()) {
            apply_event_effects(nation, &option.effects);
        }
        state.emit(
            TurnEventKind::Political,
            Severity::Info,
            format!("event.{}.{}", roll.event.id, option.id),
            vec![id],
        );
    }
}

fn run_ai(state: &mut GameState, catalogs: &Catalogs, rngs: &RngBundle, report: &mut TurnReport) {
    for id in state.active_ids() {
        let still_active = state
            .nation(id.as_str())
            .is_some_and(|nation| nation.is_active() && !nation.is_player);
        if !still_active {
            continue;
        }
        let Some(decision) =
            choose_ai_action(state, id.as_str(), &catalogs.research, &mut *rngs.ai())
        else {
            continue;
        };
        if let Err(err) =
            execute_ai_action(state, id.as_str(), &decision.action, &catalogs.research, rngs)
        {
            log::debug!("{id} could not {}: {err}", decision.action.id());
            report.ai_failures.push((id.clone(), decision.action.id()));
        }
        report.ai_decisions.push(decision);
    }
}

fn run_decay(state: &mut GameState, report: &mut TurnReport) {
    let mut expired = Vec::new();
    for nation in state.nations.values_mut() {
        for other in tick_treaties(nation) {
            expired.push((nation.id.clone(), other));
        }
        decay_relations(nation);
    }
    for (nation, other) in &expired {
        // Each truce lapses on both sides; log it once.
        if nation < other {
            state.emit(
                TurnEventKind::Diplomacy,
                Severity::Info,
                LOG_TRUCE_EXPIRED,
                vec![nation.clone(), other.clone()],
            );
        }
    }
    report.expired_truces = expired;
}

fn run_eliminations(state: &mut GameState, report: &mut TurnReport) {
    let mut fallen = Vec::new();
    for nation in state.nations.values_mut() {
        nation.clamp_stats();
        if nation.eliminate_if_depopulated() {
            fallen.push(nation.id.clone());
        }
    }
    for id in &fallen {
        log::info!("{id} has been eliminated on turn {}", state.turn);
        state.emit(
            TurnEventKind::Elimination,
            Severity::Critical,
            LOG_NATION_ELIMINATED,
            vec![id.clone()],
        );
    }
    report.eliminated = fallen;
}

/// Resolve one full turn. A finished campaign is left untouched.
pub fn advance_turn(state: &mut GameState, catalogs: &Catalogs, rngs: &RngBundle) -> TurnReport {
    let mut report = TurnReport {
        turn: state.turn,
        defcon: state.defcon,
        ending: state.ending,
        ..TurnReport::default()
    };
    if state.ending.is_some() {
        return report;
    }
    state.turn_events.clear();

    run_economy(state, &mut report);
    report.shortages = process_territories(state);
    run_dip(state, &mut report);
    run_research(state, catalogs, &mut report);
    run_labs_and_cyber(state, &mut report);
    run_governance(state, rngs, &mut report);
    run_political_events(state, catalogs, rngs, &mut report);
    run_ai(state, catalogs, rngs, &mut report);
    run_decay(state, &mut report);
    report.defcon = update_defcon(state);
    run_eliminations(state, &mut report);

    if let Some(ending) = evaluate_ending(state) {
        state.ending = Some(ending);
        state.emit(
            TurnEventKind::Ending,
            Severity::Critical,
            format!("log.ending.{ending}"),
            vec![state.player_id.clone()],
        );
        report.ending = Some(ending);
    } else {
        state.turn += 1;
    }
    report.events = state.turn_events.clone();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::{GovernmentKind, GovernmentState};
    use crate::scenario::ScenarioCatalog;
    use crate::state::GameMode;

    fn campaign_state(seed: u64) -> GameState {
        let scenario = ScenarioCatalog::default_catalog()
            .get("cold_war_1962")
            .unwrap();
        GameState::from_scenario(scenario, None, seed, GameMode::Standard).unwrap()
    }

    #[test]
    fn income_scales_with_cities_and_government() {
        let mut nation = Nation::new("usa", "United States");
        nation.cities = 10;
        let constitutional = production_income(&nation);
        assert_eq!(constitutional, round_f32_to_i32(10.0 * PRODUCTION_PER_CITY));
        nation.government_state = Some(GovernmentState::new(GovernmentKind::Authoritarian, 0));
        assert!(production_income(&nation) > constitutional);
        nation.sanctioned_by.insert(NationId::from("uk"));
        nation.sanctioned_by.insert(NationId::from("fra"));
        nation.government_state = None;
        assert!(production_income(&nation) < constitutional);
    }

    #[test]
    fn turn_advances_clock_and_reports() {
        let catalogs = Catalogs::default();
        let rngs = RngBundle::from_user_seed(11);
        let mut state = campaign_state(11);
        let report = advance_turn(&mut state, &catalogs, &rngs);
        assert_eq!(report.turn, 1);
        assert_eq!(state.turn, 2);
        assert_eq!(report.production.len(), state.nations.len());
        assert!(report.production.values().all(|income| *income > 0));
        assert_eq!(report.events, state.turn_events);
        assert_eq!(
            report.ai_decisions.len(),
            state.nations.values().filter(|n| !n.is_player && n.is_active()).count()
        );
    }

    #[test]
    fn same_seed_same_world() {
        let catalogs = Catalogs::default();
        let run = |seed: u64| {
            let rngs = RngBundle::from_user_seed(seed);
            let mut state = campaign_state(seed);
            for _ in 0..8 {
                advance_turn(&mut state, &catalogs, &rngs);
            }
            state.fingerprint()
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn finished_campaigns_do_not_advance() {
        let catalogs = Catalogs::default();
        let rngs = RngBundle::from_user_seed(1);
        let mut state = campaign_state(1);
        state.ending = Some(Ending::Survival);
        let before = state.clone();
        let report = advance_turn(&mut state, &catalogs, &rngs);
        assert_eq!(report.ending, Some(Ending::Survival));
        assert_eq!(state, before);
        assert_eq!(rngs.total_draws(), 0);
    }

    #[test]
    fn turn_limit_ends_in_survival_or_worse() {
        let catalogs = Catalogs::default();
        let rngs = RngBundle::from_user_seed(3);
        let mut state = campaign_state(3);
        state.max_turns = 3;
        let mut last = None;
        for _ in 0..5 {
            last = advance_turn(&mut state, &catalogs, &rngs).ending;
        }
        assert!(last.is_some());
        assert!(state.turn <= 3);
    }
}

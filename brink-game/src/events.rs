//! Political event tables: domestic crises rolled each turn.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

use crate::constants::{EVENT_BASE_CHANCE, EVENT_INSTABILITY_DIVISOR};
use crate::diplomacy::{earn_dip, spend_dip};
use crate::governance::GovernmentKind;
use crate::journal::{Severity, TurnEventKind};
use crate::nation::{Nation, NationId};
use crate::numbers::i32_to_f32;
use crate::state::GameState;
use crate::trace::{DecisionTrace, WeightedCandidate, pick_weighted_index};

const DEFAULT_EVENT_DATA: &str = include_str!("../assets/data/political_events.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventConditions {
    #[serde(default)]
    pub min_instability: Option<f32>,
    #[serde(default)]
    pub max_instability: Option<f32>,
    #[serde(default)]
    pub min_morale: Option<f32>,
    #[serde(default)]
    pub max_morale: Option<f32>,
    #[serde(default)]
    pub min_opinion: Option<f32>,
    #[serde(default)]
    pub max_opinion: Option<f32>,
    /// Empty means any government.
    #[serde(default)]
    pub governments: Vec<GovernmentKind>,
    #[serde(default)]
    pub min_turn: u32,
}

fn within(value: f32, min: Option<f32>, max: Option<f32>) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}

impl EventConditions {
    #[must_use]
    pub fn matches(&self, nation: &Nation, turn: u32) -> bool {
        turn >= self.min_turn
            && within(nation.instability, self.min_instability, self.max_instability)
            && within(nation.morale, self.min_morale, self.max_morale)
            && within(nation.public_opinion, self.min_opinion, self.max_opinion)
            && (self.governments.is_empty() || self.governments.contains(&nation.government_kind()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventEffects {
    #[serde(default)]
    pub morale: f32,
    #[serde(default)]
    pub public_opinion: f32,
    #[serde(default)]
    pub instability: f32,
    #[serde(default)]
    pub production: i32,
    #[serde(default)]
    pub intel: i32,
    #[serde(default)]
    pub dip: i32,
    /// Millions of people gained or lost.
    #[serde(default)]
    pub population: f32,
}

impl EventEffects {
    /// How attractive these effects look to a leadership in `nation`'s
    /// position. Unstable regimes weigh instability more heavily.
    #[must_use]
    pub fn net_score(&self, nation: &Nation) -> f32 {
        let stability_weight = 1.0 + nation.instability / 100.0;
        self.morale + self.public_opinion - self.instability * stability_weight
            + i32_to_f32(self.production) * 0.5
            + i32_to_f32(self.intel) * 0.5
            + i32_to_f32(self.dip)
            + self.population * 5.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOption {
    pub id: String,
    #[serde(default)]
    pub effects: EventEffects,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoliticalEvent {
    pub id: String,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default)]
    pub conditions: EventConditions,
    pub options: Vec<EventOption>,
}

const fn default_weight() -> f32 {
    1.0
}

impl PoliticalEvent {
    #[must_use]
    pub fn option(&self, id: &str) -> Option<&EventOption> {
        self.options.iter().find(|option| option.id == id)
    }

    #[must_use]
    pub fn title_key(&self) -> String {
        format!("event.{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PoliticalEventCatalog {
    #[serde(default)]
    pub events: Vec<PoliticalEvent>,
}

impl PoliticalEventCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_EVENT_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<PoliticalEventCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into an event catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PoliticalEvent> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn eligible<'a>(
        &'a self,
        nation: &'a Nation,
        turn: u32,
    ) -> impl Iterator<Item = &'a PoliticalEvent> + 'a {
        self.events
            .iter()
            .filter(move |event| !event.options.is_empty() && event.conditions.matches(nation, turn))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRoll {
    pub event: PoliticalEvent,
    pub trigger_chance: f32,
    pub trace: DecisionTrace,
}

/// An event awaiting the player's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEvent {
    pub nation: NationId,
    pub turn: u32,
    pub event: PoliticalEvent,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("no pending event at index {0}")]
    NoSuchPending(usize),
    #[error("event `{event}` has no option `{option}`")]
    UnknownOption { event: String, option: String },
    #[error("unknown nation `{0}`")]
    UnknownNation(NationId),
}

#[must_use]
pub fn trigger_chance(nation: &Nation) -> f32 {
    (EVENT_BASE_CHANCE + nation.instability / EVENT_INSTABILITY_DIVISOR).clamp(0.0, 1.0)
}

/// Roll for a domestic event this turn.
///
/// One trigger roll is always drawn; a second roll picks among eligible
/// entries only when the trigger fires.
pub fn roll_political_event<R>(
    nation: &Nation,
    catalog: &PoliticalEventCatalog,
    turn: u32,
    rng: &mut R,
) -> Option<EventRoll>
where
    R: Rng + ?Sized,
{
    let chance = trigger_chance(nation);
    if rng.r#gen::<f32>() >= chance {
        return None;
    }
    let pool: Vec<&PoliticalEvent> = catalog.eligible(nation, turn).collect();
    let weights: Vec<f32> = pool.iter().map(|event| event.weight).collect();
    let (idx, roll) = pick_weighted_index(&weights, rng)?;
    let event = pool.get(idx).copied()?;
    let trace = DecisionTrace {
        pool_id: format!("events.political.{}", nation.id),
        roll,
        candidates: pool
            .iter()
            .map(|candidate| WeightedCandidate::flat(candidate.id.clone(), candidate.weight))
            .collect(),
        chosen_id: event.id.clone(),
    };
    Some(EventRoll {
        event: event.clone(),
        trigger_chance: chance,
        trace,
    })
}

/// Option an AI leadership picks: the best net effect, first listed on ties.
#[must_use]
pub fn auto_resolve_option<'a>(event: &'a PoliticalEvent, nation: &Nation) -> Option<&'a EventOption> {
    let mut best: Option<(&EventOption, f32)> = None;
    for option in &event.options {
        let score = option.effects.net_score(nation);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((option, score));
        }
    }
    best.map(|(option, _)| option)
}

pub fn apply_event_effects(nation: &mut Nation, effects: &EventEffects) {
    nation.adjust_morale(effects.morale);
    nation.adjust_public_opinion(effects.public_opinion);
    nation.adjust_instability(effects.instability);
    nation.production = nation.production.saturating_add(effects.production).max(0);
    nation.intel = nation.intel.saturating_add(effects.intel).max(0);
    nation.population = (nation.population + effects.population).max(0.0);
    if effects.dip > 0 {
        earn_dip(nation, effects.dip, "event");
    } else if effects.dip < 0 {
        let cost = effects.dip.saturating_neg().min(nation.dip_points());
        spend_dip(nation, cost, "event");
    }
}

/// Resolve the player's pending event at `index` with `option_id`.
///
/// # Errors
///
/// Fails for an out-of-range index or an option the event does not offer.
/// The event stays queued on error.
pub fn resolve_pending_event(
    state: &mut GameState,
    index: usize,
    option_id: &str,
) -> Result<EventOption, EventError> {
    let pending = state
        .pending_events
        .get(index)
        .ok_or(EventError::NoSuchPending(index))?;
    let option = pending
        .event
        .option(option_id)
        .cloned()
        .ok_or_else(|| EventError::UnknownOption {
            event: pending.event.id.clone(),
            option: option_id.to_string(),
        })?;
    let nation_id = pending.nation.clone();
    let event_id = pending.event.id.clone();
    let nation = state
        .nation_mut(nation_id.as_str())
        .ok_or_else(|| EventError::UnknownNation(nation_id.clone()))?;
    apply_event_effects(nation, &option.effects);
    state.pending_events.remove(index);
    state.emit(
        TurnEventKind::Political,
        Severity::Info,
        format!("event.{event_id}.{}", option.id),
        vec![nation_id],
    );
    Ok(option)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::GovernmentState;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn effects(morale: f32, instability: f32) -> EventEffects {
        EventEffects {
            morale,
            instability,
            ..EventEffects::default()
        }
    }

    fn event() -> PoliticalEvent {
        PoliticalEvent {
            id: "strike".into(),
            weight: 1.0,
            conditions: EventConditions::default(),
            options: vec![
                EventOption {
                    id: "calm".into(),
                    effects: effects(2.0, -4.0),
                },
                EventOption {
                    id: "harsh".into(),
                    effects: effects(-5.0, 6.0),
                },
            ],
        }
    }

    #[test]
    fn default_catalog_parses() {
        let catalog = PoliticalEventCatalog::default_catalog();
        assert!(catalog.events.len() >= 10);
        assert!(catalog.events.iter().all(|event| !event.options.is_empty()));
    }

    #[test]
    fn conditions_filter_by_government_and_stats() {
        let catalog = PoliticalEventCatalog::default_catalog();
        let mut nation = Nation::new("usa", "United States");
        nation.instability = 10.0;
        let ids: Vec<_> = catalog.eligible(&nation, 1).map(|e| e.id.as_str()).collect();
        assert!(!ids.contains(&"military_parade"));
        assert!(!ids.contains(&"general_strike"));
        assert!(!ids.contains(&"corruption_scandal"));

        nation.government_state = Some(GovernmentState::new(GovernmentKind::MilitaryJunta, 0));
        nation.instability = 75.0;
        let ids: Vec<_> = catalog.eligible(&nation, 6).map(|e| e.id.as_str()).collect();
        assert!(ids.contains(&"military_parade"));
        assert!(ids.contains(&"coup_rumors"));
        assert!(!ids.contains(&"election_scandal"));
    }

    #[test]
    fn trigger_chance_grows_with_instability() {
        let mut nation = Nation::new("usa", "United States");
        nation.instability = 0.0;
        assert!((trigger_chance(&nation) - EVENT_BASE_CHANCE).abs() < 1e-6);
        nation.instability = 100.0;
        assert!((trigger_chance(&nation) - 0.48).abs() < 1e-6);
    }

    #[test]
    fn rolls_are_deterministic_and_traced() {
        let catalog = PoliticalEventCatalog::default_catalog();
        let mut nation = Nation::new("usa", "United States");
        nation.instability = 100.0;
        let mut a = SmallRng::seed_from_u64(21);
        let mut b = SmallRng::seed_from_u64(21);
        let mut fired = 0;
        for turn in 0..40 {
            let left = roll_political_event(&nation, catalog, turn, &mut a);
            let right = roll_political_event(&nation, catalog, turn, &mut b);
            assert_eq!(left, right);
            if let Some(roll) = left {
                fired += 1;
                assert_eq!(roll.trace.chosen_id, roll.event.id);
                assert!(roll.trace.candidates.iter().any(|c| c.id == roll.event.id));
            }
        }
        assert!(fired > 0);
    }

    #[test]
    fn ai_picks_best_option() {
        let nation = Nation::new("usa", "United States");
        let event = event();
        assert_eq!(auto_resolve_option(&event, &nation).unwrap().id, "calm");
    }

    #[test]
    fn pending_events_resolve_for_player() {
        let mut state = GameState::from_nations(
            vec![Nation::new("usa", "United States")],
            NationId::from("usa"),
        );
        state.pending_events.push(PendingEvent {
            nation: NationId::from("usa"),
            turn: 1,
            event: event(),
        });
        assert_eq!(
            resolve_pending_event(&mut state, 0, "bogus"),
            Err(EventError::UnknownOption {
                event: "strike".into(),
                option: "bogus".into()
            })
        );
        assert_eq!(state.pending_events.len(), 1);
        let morale = state.player().unwrap().morale;
        let chosen = resolve_pending_event(&mut state, 0, "harsh").unwrap();
        assert_eq!(chosen.id, "harsh");
        assert!(state.pending_events.is_empty());
        assert!((state.player().unwrap().morale - (morale - 5.0)).abs() < 1e-4);
        assert_eq!(
            resolve_pending_event(&mut state, 0, "harsh"),
            Err(EventError::NoSuchPending(0))
        );
    }

    #[test]
    fn negative_dip_effect_never_overdraws() {
        let mut nation = Nation::new("usa", "United States");
        apply_event_effects(
            &mut nation,
            &EventEffects {
                dip: -5,
                ..EventEffects::default()
            },
        );
        assert_eq!(nation.dip_points(), 0);
    }
}

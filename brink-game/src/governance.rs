//! Government types, legitimacy, elections and coups.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AI_GOV_DEMOCRACY_MAX_INSTABILITY, AI_GOV_DEMOCRACY_MIN_OPINION, AI_GOV_HAWK_INSTABILITY,
    AI_GOV_JUNTA_INSTABILITY, AI_GOV_LOW_MORALE, AI_GOV_TECH_MAX_INSTABILITY,
    AI_GOV_TECH_MIN_RESEARCH, COUP_THRESHOLD, ELECTION_LOSS_INSTABILITY, ELECTION_MIN_OPINION,
    ELECTION_WIN_LEGITIMACY, GOVERNMENT_CHANGE_INSTABILITY, GOVERNMENT_CHANGE_LEGITIMACY,
    LEGITIMACY_DRIFT_RATE, LEGITIMACY_INSTABILITY_WEIGHT, OPINION_DRIFT_RATE,
    SANCTION_INSTABILITY, STARTING_LEGITIMACY, UNREST_FLOOR, UNREST_WEIGHT,
};
use crate::nation::{AiPersonality, Nation};
use crate::numbers::{clamp_percent, u32_to_f32};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum GovernmentKind {
    Democracy,
    #[default]
    Constitutional,
    Authoritarian,
    MilitaryJunta,
    Technocracy,
}

/// Standing effects a government type applies every turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GovernmentModifiers {
    pub production_multiplier: f32,
    /// Extra research progress per turn.
    pub research_bonus: u32,
    pub dip_bonus: i32,
    pub morale_drift: f32,
    pub instability_drift: f32,
    /// Turns between elections; `None` for regimes that do not hold them.
    pub election_interval: Option<u32>,
}

impl GovernmentKind {
    pub const ALL: [Self; 5] = [
        Self::Democracy,
        Self::Constitutional,
        Self::Authoritarian,
        Self::MilitaryJunta,
        Self::Technocracy,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Democracy => "democracy",
            Self::Constitutional => "constitutional",
            Self::Authoritarian => "authoritarian",
            Self::MilitaryJunta => "military_junta",
            Self::Technocracy => "technocracy",
        }
    }

    #[must_use]
    pub const fn modifiers(self) -> GovernmentModifiers {
        match self {
            Self::Democracy => GovernmentModifiers {
                production_multiplier: 1.0,
                research_bonus: 0,
                dip_bonus: 1,
                morale_drift: 1.0,
                instability_drift: -1.0,
                election_interval: Some(8),
            },
            Self::Constitutional => GovernmentModifiers {
                production_multiplier: 1.0,
                research_bonus: 0,
                dip_bonus: 0,
                morale_drift: 0.5,
                instability_drift: -0.5,
                election_interval: Some(10),
            },
            Self::Authoritarian => GovernmentModifiers {
                production_multiplier: 1.15,
                research_bonus: 0,
                dip_bonus: -1,
                morale_drift: -1.0,
                instability_drift: 0.5,
                election_interval: None,
            },
            Self::MilitaryJunta => GovernmentModifiers {
                production_multiplier: 1.1,
                research_bonus: 0,
                dip_bonus: -2,
                morale_drift: -1.5,
                instability_drift: 1.0,
                election_interval: None,
            },
            Self::Technocracy => GovernmentModifiers {
                production_multiplier: 1.05,
                research_bonus: 1,
                dip_bonus: 0,
                morale_drift: 0.0,
                instability_drift: 0.0,
                election_interval: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernmentState {
    pub kind: GovernmentKind,
    /// How accepted the regime is, `0..=100`.
    #[serde(default = "default_legitimacy")]
    pub legitimacy: f32,
    #[serde(default)]
    pub since_turn: u32,
    #[serde(default)]
    pub next_election: Option<u32>,
}

const fn default_legitimacy() -> f32 {
    STARTING_LEGITIMACY
}

impl GovernmentState {
    #[must_use]
    pub fn new(kind: GovernmentKind, turn: u32) -> Self {
        Self {
            kind,
            legitimacy: STARTING_LEGITIMACY,
            since_turn: turn,
            next_election: kind
                .modifiers()
                .election_interval
                .map(|interval| turn + interval),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GovernanceEvent {
    ElectionWon { turn: u32 },
    ElectionLost { turn: u32 },
    Coup { turn: u32, from: GovernmentKind, to: GovernmentKind },
    CoupAverted { turn: u32 },
}

impl GovernanceEvent {
    #[must_use]
    pub const fn log_key(&self) -> &'static str {
        match self {
            Self::ElectionWon { .. } => "log.governance.election.won",
            Self::ElectionLost { .. } => "log.governance.election.lost",
            Self::Coup { .. } => "log.governance.coup",
            Self::CoupAverted { .. } => "log.governance.coup.averted",
        }
    }
}

/// Replace the regime. Transitions are destabilizing.
pub fn change_government(nation: &mut Nation, kind: GovernmentKind, turn: u32) {
    let mut state = GovernmentState::new(kind, turn);
    state.legitimacy = GOVERNMENT_CHANGE_LEGITIMACY;
    nation.government_state = Some(state);
    nation.adjust_instability(GOVERNMENT_CHANGE_INSTABILITY);
    log::debug!("{} changes government to {}", nation.id, kind.key());
}

/// One turn of domestic politics.
///
/// `sanctions` is the number of nations sanctioning this one. The RNG is
/// only drawn when a coup is possible.
pub fn update_governance<R>(
    nation: &mut Nation,
    turn: u32,
    sanctions: usize,
    rng: &mut R,
) -> Vec<GovernanceEvent>
where
    R: Rng + ?Sized,
{
    let mut events = Vec::new();
    let gov = nation
        .government_state
        .get_or_insert_with(|| GovernmentState::new(GovernmentKind::Constitutional, turn))
        .clone();
    let modifiers = gov.kind.modifiers();

    nation.adjust_morale(modifiers.morale_drift);
    let opinion_gap = nation.morale - nation.public_opinion;
    nation.adjust_public_opinion(opinion_gap * OPINION_DRIFT_RATE);

    let unrest = (UNREST_FLOOR - nation.morale).max(0.0) * UNREST_WEIGHT
        + (UNREST_FLOOR - nation.public_opinion).max(0.0) * UNREST_WEIGHT;
    let sanction_pressure =
        u32_to_f32(u32::try_from(sanctions).unwrap_or(u32::MAX)) * SANCTION_INSTABILITY;
    let legitimacy_relief = (gov.legitimacy - 50.0) * LEGITIMACY_INSTABILITY_WEIGHT;
    nation.adjust_instability(
        modifiers.instability_drift + unrest + sanction_pressure - legitimacy_relief,
    );

    let opinion = nation.public_opinion;
    if let Some(state) = nation.government_state.as_mut() {
        state.legitimacy =
            clamp_percent(state.legitimacy + (opinion - state.legitimacy) * LEGITIMACY_DRIFT_RATE);
        if state.next_election.is_some_and(|due| due <= turn) {
            if opinion < ELECTION_MIN_OPINION {
                events.push(GovernanceEvent::ElectionLost { turn });
                state.legitimacy = GOVERNMENT_CHANGE_LEGITIMACY;
            } else {
                events.push(GovernanceEvent::ElectionWon { turn });
                state.legitimacy = clamp_percent(state.legitimacy + ELECTION_WIN_LEGITIMACY);
            }
            state.next_election = modifiers.election_interval.map(|interval| turn + interval);
        }
    }
    if events.contains(&GovernanceEvent::ElectionLost { turn }) {
        nation.adjust_instability(ELECTION_LOSS_INSTABILITY);
        // A new cabinet starts with a short honeymoon.
        nation.public_opinion = clamp_percent(nation.public_opinion.max(ELECTION_MIN_OPINION));
    }

    if nation.instability > COUP_THRESHOLD {
        let chance = (nation.instability - COUP_THRESHOLD) / 100.0;
        if rng.r#gen::<f32>() < chance {
            let from = gov.kind;
            let to = if from == GovernmentKind::MilitaryJunta {
                GovernmentKind::Authoritarian
            } else {
                GovernmentKind::MilitaryJunta
            };
            change_government(nation, to, turn);
            // The new regime spends its first turn consolidating.
            nation.adjust_instability(-2.0 * GOVERNMENT_CHANGE_INSTABILITY);
            events.push(GovernanceEvent::Coup { turn, from, to });
        } else {
            events.push(GovernanceEvent::CoupAverted { turn });
        }
    }
    events
}

/// Government an AI leadership would choose for its current situation.
#[must_use]
pub fn select_ai_government(nation: &Nation) -> GovernmentKind {
    if nation.instability >= AI_GOV_JUNTA_INSTABILITY {
        return GovernmentKind::MilitaryJunta;
    }
    if nation.personality == AiPersonality::Aggressive
        && nation.instability >= AI_GOV_HAWK_INSTABILITY
    {
        return GovernmentKind::Authoritarian;
    }
    if nation.morale < AI_GOV_LOW_MORALE {
        return GovernmentKind::Authoritarian;
    }
    if nation.researched.len() >= AI_GOV_TECH_MIN_RESEARCH
        && nation.instability < AI_GOV_TECH_MAX_INSTABILITY
    {
        return GovernmentKind::Technocracy;
    }
    if nation.public_opinion >= AI_GOV_DEMOCRACY_MIN_OPINION
        && nation.instability < AI_GOV_DEMOCRACY_MAX_INSTABILITY
    {
        return GovernmentKind::Democracy;
    }
    GovernmentKind::Constitutional
}

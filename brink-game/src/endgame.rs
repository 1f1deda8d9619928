//! Campaign endings and the final score sheet.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    COLLAPSE_INSTABILITY, DIPLOMATIC_VICTORY_MIN_TURN, DIPLOMATIC_VICTORY_SHARE,
    NUCLEAR_WINTER_RADIATION,
};
use crate::numbers::{round_f32_to_i32, u32_to_f32};
use crate::seed::encode_friendly;
use crate::state::GameState;
use crate::treaties::{alliance_count, is_allied};

/// How a campaign ended, listed in evaluation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    /// Fallout from the exchanges poisons the planet.
    NuclearWinter,
    /// The player's nation is destroyed.
    Annihilation,
    /// The player's government falls apart.
    Collapse,
    /// Every rival has been eliminated.
    Domination,
    /// The player leads a coalition of most survivors.
    DiplomaticVictory,
    /// The player reaches the turn limit intact.
    Survival,
}

impl Ending {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NuclearWinter => "nuclear_winter",
            Self::Annihilation => "annihilation",
            Self::Collapse => "collapse",
            Self::Domination => "domination",
            Self::DiplomaticVictory => "diplomatic_victory",
            Self::Survival => "survival",
        }
    }

    #[must_use]
    pub const fn is_victory(self) -> bool {
        matches!(self, Self::Domination | Self::DiplomaticVictory | Self::Survival)
    }
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Check whether the campaign is over after the current turn resolved.
#[must_use]
pub fn evaluate_ending(state: &GameState) -> Option<Ending> {
    if state.global_radiation >= NUCLEAR_WINTER_RADIATION {
        return Some(Ending::NuclearWinter);
    }
    let player = state.player()?;
    if !player.is_active() {
        return Some(Ending::Annihilation);
    }
    if player.instability >= COLLAPSE_INSTABILITY {
        return Some(Ending::Collapse);
    }
    let rivals: Vec<_> = state
        .nations
        .values()
        .filter(|nation| nation.id != player.id)
        .collect();
    let survivors: Vec<_> = rivals.iter().filter(|nation| nation.is_active()).collect();
    if !rivals.is_empty() && survivors.is_empty() {
        return Some(Ending::Domination);
    }
    if state.turn >= DIPLOMATIC_VICTORY_MIN_TURN && !survivors.is_empty() {
        let allied = survivors
            .iter()
            .filter(|nation| is_allied(player, nation.id.as_str()))
            .count();
        if u32_to_f32(u32::try_from(allied).unwrap_or(u32::MAX))
            >= u32_to_f32(u32::try_from(survivors.len()).unwrap_or(u32::MAX)) * DIPLOMATIC_VICTORY_SHARE
        {
            return Some(Ending::DiplomaticVictory);
        }
    }
    if state.turn >= state.max_turns {
        return Some(Ending::Survival);
    }
    None
}

/// Scoring weights for the result screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCfg {
    pub per_million_population: f32,
    pub per_city: i32,
    pub per_ally: i32,
    pub per_research: i32,
    pub per_turn: i32,
    pub per_radiation: f32,
    pub final_min: i32,
    pub final_max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndingBonusCfg {
    pub domination: i32,
    pub diplomatic_victory: i32,
    pub survival: i32,
}

impl EndingBonusCfg {
    #[must_use]
    pub const fn bonus(&self, ending: Option<Ending>) -> i32 {
        match ending {
            Some(Ending::Domination) => self.domination,
            Some(Ending::DiplomaticVictory) => self.diplomatic_victory,
            Some(Ending::Survival) => self.survival,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultConfig {
    pub score: ScoreCfg,
    pub endings: EndingBonusCfg,
}

impl Default for ResultConfig {
    fn default() -> Self {
        Self {
            score: ScoreCfg {
                per_million_population: 0.5,
                per_city: 10,
                per_ally: 25,
                per_research: 15,
                per_turn: 5,
                per_radiation: 0.5,
                final_min: 0,
                final_max: 999_999,
            },
            endings: EndingBonusCfg {
                domination: 500,
                diplomatic_victory: 400,
                survival: 200,
            },
        }
    }
}

/// Final summary of a campaign for the result screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub ending: Option<Ending>,
    pub headline_key: String,
    pub share_code: String,
    pub scenario_id: String,
    pub nation: String,
    pub mode: String,
    pub score: i32,
    pub turns: u32,
    pub population: f32,
    pub cities: u32,
    pub allies: u32,
    pub researched: u32,
    pub warheads: u32,
    pub strikes_launched: u32,
    pub global_radiation: f32,
    pub surviving_nations: u32,
}

/// Score the campaign from the player's point of view. A campaign still in
/// progress is scored as it stands.
#[must_use]
pub fn result_summary(state: &GameState, cfg: &ResultConfig) -> ResultSummary {
    let score_cfg = &cfg.score;
    let (nation, population, cities, allies, researched, warheads) =
        state.player().map_or((String::new(), 0.0, 0, 0, 0, 0), |player| {
            (
                player.name.clone(),
                player.population,
                player.cities,
                u32::try_from(alliance_count(player)).unwrap_or(u32::MAX),
                u32::try_from(player.researched.len()).unwrap_or(u32::MAX),
                player.total_warheads(),
            )
        });
    let as_i32 = |value: u32| i32::try_from(value).unwrap_or(i32::MAX);
    let raw = round_f32_to_i32(population * score_cfg.per_million_population)
        .saturating_add(as_i32(cities).saturating_mul(score_cfg.per_city))
        .saturating_add(as_i32(allies).saturating_mul(score_cfg.per_ally))
        .saturating_add(as_i32(researched).saturating_mul(score_cfg.per_research))
        .saturating_add(as_i32(state.turn).saturating_mul(score_cfg.per_turn))
        .saturating_sub(round_f32_to_i32(state.global_radiation * score_cfg.per_radiation))
        .saturating_add(cfg.endings.bonus(state.ending));
    let headline_key = state.ending.map_or_else(
        || "result.headline.in_progress".to_string(),
        |ending| format!("result.headline.{ending}"),
    );
    ResultSummary {
        ending: state.ending,
        headline_key,
        share_code: encode_friendly(state.mode, state.seed),
        scenario_id: state.scenario_id.clone(),
        nation,
        mode: state.mode.key().to_string(),
        score: raw.clamp(score_cfg.final_min, score_cfg.final_max),
        turns: state.turn,
        population,
        cities,
        allies,
        researched,
        warheads,
        strikes_launched: state.strikes_launched,
        global_radiation: state.global_radiation,
        surviving_nations: u32::try_from(state.active_ids().len()).unwrap_or(u32::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nation::{Nation, NationId};
    use crate::treaties::sign_alliance;

    fn world() -> GameState {
        GameState::from_nations(
            vec![
                Nation::new("usa", "United States"),
                Nation::new("ussr", "Soviet Union"),
                Nation::new("uk", "United Kingdom"),
            ],
            NationId::from("usa"),
        )
    }

    #[test]
    fn no_ending_mid_campaign() {
        assert_eq!(evaluate_ending(&world()), None);
    }

    #[test]
    fn radiation_outranks_everything() {
        let mut state = world();
        state.global_radiation = NUCLEAR_WINTER_RADIATION;
        state.nation_mut("usa").unwrap().eliminated = true;
        assert_eq!(evaluate_ending(&state), Some(Ending::NuclearWinter));
    }

    #[test]
    fn annihilation_then_collapse() {
        let mut state = world();
        state.nation_mut("usa").unwrap().instability = 100.0;
        assert_eq!(evaluate_ending(&state), Some(Ending::Collapse));
        state.nation_mut("usa").unwrap().eliminated = true;
        assert_eq!(evaluate_ending(&state), Some(Ending::Annihilation));
    }

    #[test]
    fn domination_when_rivals_are_gone() {
        let mut state = world();
        for id in ["ussr", "uk"] {
            state.nation_mut(id).unwrap().eliminated = true;
        }
        assert_eq!(evaluate_ending(&state), Some(Ending::Domination));
    }

    #[test]
    fn diplomatic_victory_needs_coalition_and_time() {
        let mut state = world();
        {
            let (usa, uk) = state.pair_mut("usa", "uk").unwrap();
            sign_alliance(usa, uk, 1);
        }
        state.nation_mut("ussr").unwrap().eliminated = true;
        state.turn = DIPLOMATIC_VICTORY_MIN_TURN - 1;
        assert_eq!(evaluate_ending(&state), None);
        state.turn = DIPLOMATIC_VICTORY_MIN_TURN;
        assert_eq!(evaluate_ending(&state), Some(Ending::DiplomaticVictory));
    }

    #[test]
    fn survival_at_turn_limit() {
        let mut state = world();
        state.max_turns = 10;
        state.turn = 10;
        assert_eq!(evaluate_ending(&state), Some(Ending::Survival));
    }

    #[test]
    fn summary_rewards_victory() {
        let cfg = ResultConfig::default();
        let mut state = world();
        let ongoing = result_summary(&state, &cfg);
        assert_eq!(ongoing.headline_key, "result.headline.in_progress");
        assert_eq!(ongoing.surviving_nations, 3);

        state.ending = Some(Ending::Survival);
        let won = result_summary(&state, &cfg);
        assert_eq!(won.headline_key, "result.headline.survival");
        assert_eq!(won.score, ongoing.score + cfg.endings.survival);
        assert!(won.share_code.starts_with("ST-"));

        state.global_radiation = 1.0e7;
        state.ending = Some(Ending::NuclearWinter);
        assert_eq!(result_summary(&state, &cfg).score, cfg.score.final_min);
    }
}

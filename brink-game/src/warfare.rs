//! Nuclear strikes, interception and the DEFCON ladder.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFCON_MAX, DEFCON_MIN, DEFCON_STRIKE_THRESHOLD, DEFCON_TENSION_BANDS, ESCALATION_THREAT,
    INTERCEPT_CAP, INTERCEPT_PER_DEFENSE, MAX_CASUALTY_FRACTION, MEGATONS_PER_CITY,
    RADIATION_PER_MEGATON, STRIKE_INSTABILITY, STRIKE_MORALE, STRIKE_TARGET_RELATIONSHIP,
    STRIKE_THREAT, STRIKE_WORLD_RELATIONSHIP, CASUALTIES_PER_MEGATON,
};
use crate::journal::{Severity, TurnEventKind};
use crate::nation::NationId;
use crate::numbers::u32_to_f32;
use crate::relations::{add_threat, adjust_relationship};
use crate::state::GameState;
use crate::treaties::cancel_all;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverySystem {
    Missile,
    Bomber,
    Submarine,
}

impl DeliverySystem {
    pub const ALL: [Self; 3] = [Self::Missile, Self::Bomber, Self::Submarine];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Missile => "missile",
            Self::Bomber => "bomber",
            Self::Submarine => "submarine",
        }
    }

    /// Interception chance against an undefended target.
    #[must_use]
    pub const fn base_intercept(self) -> f32 {
        match self {
            Self::Missile => 0.15,
            Self::Bomber => 0.35,
            Self::Submarine => 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrikeReport {
    pub attacker: NationId,
    pub target: NationId,
    pub delivery: DeliverySystem,
    pub megatons: u16,
    pub intercepted: bool,
    pub interception_chance: f32,
    /// Millions killed.
    pub casualties: f32,
    pub cities_lost: u32,
    pub target_eliminated: bool,
}

#[derive(Debug, Error, PartialEq)]
pub enum WarfareError {
    #[error("unknown nation `{0}`")]
    UnknownNation(NationId),
    #[error("a nation cannot strike itself")]
    SelfTarget,
    #[error("nation `{0}` has been eliminated")]
    Eliminated(NationId),
    #[error("launch requires DEFCON {required} or lower, currently {defcon}")]
    DefconTooHigh { defcon: u8, required: u8 },
    #[error("no {} available", .0.key())]
    NoDeliverySystem(DeliverySystem),
    #[error("no {0} MT warhead in the arsenal")]
    NoWarhead(u16),
}

#[must_use]
pub fn interception_chance(delivery: DeliverySystem, defense: u32) -> f32 {
    (delivery.base_intercept() + u32_to_f32(defense) * INTERCEPT_PER_DEFENSE).min(INTERCEPT_CAP)
}

/// Casualties in millions for a detonation over a population of `population` millions.
#[must_use]
pub fn strike_casualties(population: f32, megatons: u16) -> f32 {
    (population.max(0.0) * MAX_CASUALTY_FRACTION).min(f32::from(megatons) * CASUALTIES_PER_MEGATON)
}

/// Launch a single warhead at `target`.
///
/// The launch itself is an act of war: treaties with the target are torn
/// up and world opinion turns on the attacker whether or not the warhead
/// is intercepted. One interception roll is drawn.
///
/// # Errors
///
/// Requires DEFCON 2 or lower, a delivery vehicle of the chosen type and a
/// warhead of the chosen yield.
pub fn launch_nuclear_strike<R>(
    state: &mut GameState,
    attacker: &str,
    target: &str,
    delivery: DeliverySystem,
    megatons: u16,
    rng: &mut R,
) -> Result<StrikeReport, WarfareError>
where
    R: Rng + ?Sized,
{
    if attacker == target {
        return Err(WarfareError::SelfTarget);
    }
    for id in [attacker, target] {
        let nation = state
            .nation(id)
            .ok_or_else(|| WarfareError::UnknownNation(NationId::from(id)))?;
        if !nation.is_active() {
            return Err(WarfareError::Eliminated(nation.id.clone()));
        }
    }
    if state.defcon > DEFCON_STRIKE_THRESHOLD {
        return Err(WarfareError::DefconTooHigh {
            defcon: state.defcon,
            required: DEFCON_STRIKE_THRESHOLD,
        });
    }

    let (launcher, victim) = state
        .pair_mut(attacker, target)
        .ok_or_else(|| WarfareError::UnknownNation(NationId::from(target)))?;
    let vehicles = match delivery {
        DeliverySystem::Missile => launcher.missiles,
        DeliverySystem::Bomber => launcher.bombers,
        DeliverySystem::Submarine => launcher.submarines,
    };
    if vehicles == 0 {
        return Err(WarfareError::NoDeliverySystem(delivery));
    }
    let Some(stock) = launcher.warheads.get_mut(&megatons).filter(|count| **count > 0) else {
        return Err(WarfareError::NoWarhead(megatons));
    };
    *stock -= 1;
    launcher.warheads.retain(|_, count| *count > 0);

    let interception_chance = interception_chance(delivery, victim.defense);
    let intercepted = rng.r#gen::<f32>() < interception_chance;
    // Missiles are expended; bombers only when shot down; submarines survive.
    match delivery {
        DeliverySystem::Missile => launcher.missiles -= 1,
        DeliverySystem::Bomber if intercepted => launcher.bombers -= 1,
        DeliverySystem::Bomber | DeliverySystem::Submarine => {}
    }

    let (casualties, cities_lost) = if intercepted {
        (0.0, 0)
    } else {
        let casualties = strike_casualties(victim.population, megatons);
        let cities_lost = (u32::from(megatons) / MEGATONS_PER_CITY).min(victim.cities);
        victim.population = (victim.population - casualties).max(0.0);
        victim.cities -= cities_lost;
        victim.adjust_morale(-STRIKE_MORALE);
        victim.adjust_instability(STRIKE_INSTABILITY);
        (casualties, cities_lost)
    };
    cancel_all(launcher, victim);
    let target_eliminated = victim.eliminate_if_depopulated();

    let attacker_id = launcher.id.clone();
    let target_id = victim.id.clone();
    for nation in state.nations.values_mut() {
        if nation.id == attacker_id || (!nation.is_active() && nation.id != target_id) {
            continue;
        }
        let penalty = if nation.id == target_id {
            STRIKE_TARGET_RELATIONSHIP
        } else {
            STRIKE_WORLD_RELATIONSHIP
        };
        adjust_relationship(nation, &attacker_id, -penalty);
        add_threat(nation, &attacker_id, STRIKE_THREAT);
    }
    state.defcon = DEFCON_MIN;
    if !intercepted {
        state.global_radiation += f32::from(megatons) * RADIATION_PER_MEGATON;
    }
    state.strikes_launched += 1;

    let report = StrikeReport {
        attacker: attacker_id,
        target: target_id,
        delivery,
        megatons,
        intercepted,
        interception_chance,
        casualties,
        cities_lost,
        target_eliminated,
    };
    log::warn!(
        "nuclear strike {} -> {} ({} MT by {}): intercepted={intercepted}, {:.1}M casualties",
        report.attacker,
        report.target,
        megatons,
        delivery.key(),
        casualties
    );
    let involved = vec![report.attacker.clone(), report.target.clone()];
    state.emit(
        TurnEventKind::Nuclear,
        Severity::Critical,
        if intercepted {
            "log.nuclear.intercepted"
        } else {
            "log.nuclear.detonation"
        },
        involved,
    );
    if target_eliminated {
        state.emit(
            TurnEventKind::Elimination,
            Severity::Critical,
            "log.nation.eliminated",
            vec![report.target.clone()],
        );
    }
    Ok(report)
}

/// DEFCON level implied by the worst threat any nation perceives.
#[must_use]
pub fn defcon_for_tension(tension: f32) -> u8 {
    DEFCON_TENSION_BANDS
        .iter()
        .find(|(floor, _)| tension >= *floor)
        .map_or(DEFCON_MAX, |(_, level)| *level)
}

/// Move DEFCON one step toward the level world tension implies.
pub fn update_defcon(state: &mut GameState) -> u8 {
    let desired = defcon_for_tension(state.max_tension());
    let before = state.defcon;
    state.defcon = match before.cmp(&desired) {
        std::cmp::Ordering::Less => before + 1,
        std::cmp::Ordering::Greater => before - 1,
        std::cmp::Ordering::Equal => before,
    }
    .clamp(DEFCON_MIN, DEFCON_MAX);
    if state.defcon != before {
        log::debug!("DEFCON {before} -> {}", state.defcon);
        state.emit(
            TurnEventKind::Military,
            if state.defcon < before {
                Severity::Warning
            } else {
                Severity::Info
            },
            format!("log.defcon.{}", state.defcon),
            Vec::new(),
        );
    }
    state.defcon
}

/// `nation` raises its alert posture: DEFCON drops one step and every
/// rival grows warier of it.
pub fn escalate_defcon(state: &mut GameState, nation: &str) -> u8 {
    state.defcon = state.defcon.saturating_sub(1).max(DEFCON_MIN);
    let id = NationId::from(nation);
    for other in state.nations.values_mut() {
        if other.id != id && other.is_active() {
            add_threat(other, &id, ESCALATION_THREAT);
        }
    }
    state.emit(
        TurnEventKind::Military,
        Severity::Warning,
        format!("log.defcon.{}", state.defcon),
        vec![id],
    );
    state.defcon
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nation::Nation;
    use crate::treaties::{establish_truce, has_truce};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn armed_state() -> GameState {
        let mut usa = Nation::new("usa", "United States");
        usa.missiles = 2;
        usa.submarines = 1;
        usa.warheads.insert(10, 3);
        let mut ussr = Nation::new("ussr", "Soviet Union");
        ussr.population = 200.0;
        ussr.cities = 10;
        let uk = Nation::new("uk", "United Kingdom");
        let mut state = GameState::from_nations(vec![usa, ussr, uk], NationId::from("usa"));
        state.defcon = 2;
        state
    }

    #[test]
    fn casualty_formula_is_bounded_by_population() {
        assert!((strike_casualties(200.0, 10) - 20.0).abs() < 1e-4);
        assert!((strike_casualties(10.0, 100) - 3.0).abs() < 1e-4);
    }

    #[test]
    fn interception_improves_with_defense() {
        assert!(interception_chance(DeliverySystem::Missile, 4) > interception_chance(DeliverySystem::Missile, 0));
        assert!((interception_chance(DeliverySystem::Bomber, 100) - INTERCEPT_CAP).abs() < 1e-6);
    }

    #[test]
    fn strike_requires_defcon_two() {
        let mut state = armed_state();
        state.defcon = 3;
        let result = launch_nuclear_strike(
            &mut state,
            "usa",
            "ussr",
            DeliverySystem::Missile,
            10,
            &mut SmallRng::seed_from_u64(1),
        );
        assert_eq!(
            result,
            Err(WarfareError::DefconTooHigh {
                defcon: 3,
                required: 2
            })
        );
    }

    #[test]
    fn strike_needs_vehicle_and_warhead() {
        let mut state = armed_state();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            launch_nuclear_strike(&mut state, "usa", "ussr", DeliverySystem::Bomber, 10, &mut rng),
            Err(WarfareError::NoDeliverySystem(DeliverySystem::Bomber))
        );
        assert_eq!(
            launch_nuclear_strike(&mut state, "usa", "ussr", DeliverySystem::Missile, 50, &mut rng),
            Err(WarfareError::NoWarhead(50))
        );
    }

    #[test]
    fn strike_consequences() {
        let mut state = armed_state();
        {
            let (usa, ussr) = state.pair_mut("usa", "ussr").unwrap();
            establish_truce(usa, ussr, 5, 0);
        }
        let report = launch_nuclear_strike(
            &mut state,
            "usa",
            "ussr",
            DeliverySystem::Submarine,
            10,
            &mut SmallRng::seed_from_u64(9),
        )
        .unwrap();
        assert_eq!(state.defcon, 1);
        assert_eq!(state.strikes_launched, 1);

        let usa = state.nation("usa").unwrap();
        assert_eq!(usa.submarines, 1);
        assert_eq!(usa.warheads.get(&10), Some(&2));
        assert!(!has_truce(usa, "ussr"));

        let ussr = state.nation("ussr").unwrap();
        assert_eq!(ussr.relationship_with("usa"), -STRIKE_TARGET_RELATIONSHIP);
        let uk = state.nation("uk").unwrap();
        assert_eq!(uk.relationship_with("usa"), -STRIKE_WORLD_RELATIONSHIP);
        assert!(uk.threat_from("usa") >= STRIKE_THREAT);

        if report.intercepted {
            assert!(state.global_radiation.abs() < f32::EPSILON);
        } else {
            assert!((report.casualties - 20.0).abs() < 1e-4);
            assert_eq!(report.cities_lost, 1);
            assert!((ussr.population - 180.0).abs() < 1e-3);
            assert!((state.global_radiation - 10.0 * RADIATION_PER_MEGATON).abs() < 1e-4);
        }
    }

    #[test]
    fn defcon_moves_one_step_toward_tension() {
        let mut state = armed_state();
        state.defcon = 5;
        state
            .nation_mut("ussr")
            .unwrap()
            .threats
            .insert(NationId::from("usa"), 95.0);
        assert_eq!(update_defcon(&mut state), 4);
        assert_eq!(update_defcon(&mut state), 3);
        state.nation_mut("ussr").unwrap().threats.clear();
        state.defcon = 2;
        assert_eq!(update_defcon(&mut state), 3);
    }

    #[test]
    fn escalation_lowers_defcon_and_raises_threat() {
        let mut state = armed_state();
        state.defcon = 4;
        assert_eq!(escalate_defcon(&mut state, "usa"), 3);
        assert!(state.nation("uk").unwrap().threat_from("usa") > 0.0);
        assert!(state.nation("usa").unwrap().threats.is_empty());
    }
}

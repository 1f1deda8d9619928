//! Economic sanctions between nations.
use crate::constants::{
    SANCTION_LIFT_RELATIONSHIP, SANCTION_PENALTY_CAP, SANCTION_PENALTY_PER_IMPOSER,
    SANCTION_RELATIONSHIP_PENALTY,
};
use crate::diplomacy::proposal::DiplomacyError;
use crate::journal::{Severity, TurnEventKind};
use crate::nation::{Nation, NationId};
use crate::numbers::u32_to_f32;
use crate::relations::adjust_relationship;
use crate::state::GameState;

fn validate<'a>(
    state: &'a mut GameState,
    imposer: &str,
    target: &str,
) -> Result<(&'a mut Nation, &'a mut Nation), DiplomacyError> {
    if imposer == target {
        return Err(DiplomacyError::SelfTarget);
    }
    for id in [imposer, target] {
        match state.nation(id) {
            None => return Err(DiplomacyError::UnknownNation(NationId::from(id))),
            Some(nation) if !nation.is_active() => {
                return Err(DiplomacyError::Eliminated(nation.id.clone()));
            }
            Some(_) => {}
        }
    }
    state
        .pair_mut(imposer, target)
        .ok_or_else(|| DiplomacyError::UnknownNation(NationId::from(target)))
}

/// `imposer` places sanctions on `target`.
///
/// # Errors
///
/// Fails for unknown or eliminated nations, self-sanctions, and duplicate
/// sanctions.
pub fn impose_sanctions(
    state: &mut GameState,
    imposer: &str,
    target: &str,
) -> Result<(), DiplomacyError> {
    let (imposer_nation, target_nation) = validate(state, imposer, target)?;
    if !target_nation.sanctioned_by.insert(imposer_nation.id.clone()) {
        return Err(DiplomacyError::AlreadySanctioned {
            imposer: imposer_nation.id.clone(),
            target: target_nation.id.clone(),
        });
    }
    adjust_relationship(
        target_nation,
        &imposer_nation.id,
        -SANCTION_RELATIONSHIP_PENALTY,
    );
    log::debug!("{imposer} sanctions {target}");
    state.emit(
        TurnEventKind::Diplomacy,
        Severity::Warning,
        "log.sanctions.imposed",
        vec![NationId::from(imposer), NationId::from(target)],
    );
    Ok(())
}

/// # Errors
///
/// Fails for unknown or eliminated nations and when no sanction exists.
pub fn lift_sanctions(
    state: &mut GameState,
    imposer: &str,
    target: &str,
) -> Result<(), DiplomacyError> {
    let (imposer_nation, target_nation) = validate(state, imposer, target)?;
    if !target_nation.sanctioned_by.remove(imposer) {
        return Err(DiplomacyError::NotSanctioned {
            imposer: imposer_nation.id.clone(),
            target: target_nation.id.clone(),
        });
    }
    adjust_relationship(target_nation, &imposer_nation.id, SANCTION_LIFT_RELATIONSHIP);
    state.emit(
        TurnEventKind::Diplomacy,
        Severity::Info,
        "log.sanctions.lifted",
        vec![NationId::from(imposer), NationId::from(target)],
    );
    Ok(())
}

/// Resource yield multiplier for a sanctioned nation.
#[must_use]
pub fn sanction_multiplier(nation: &Nation) -> f32 {
    let count = u32::try_from(nation.sanctioned_by.len()).unwrap_or(u32::MAX);
    let penalty = (u32_to_f32(count) * SANCTION_PENALTY_PER_IMPOSER).min(SANCTION_PENALTY_CAP);
    1.0 - penalty
}

//! Diplomatic Influence Points (DIP): accrued each turn, spent on actions.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::{
    BASE_DIP_INCOME, DIP_FRIENDLY_RELATIONSHIP, DIP_HISTORY_LIMIT, DIP_PER_FRIENDS,
    MAX_DIP_INCOME, MAX_DIP_POINTS, STARTING_DIP,
};
use crate::nation::Nation;
use crate::treaties::alliance_count;

/// A nation's diplomatic purse.
///
/// Saves written before the purse was restructured stored the balance as
/// `currentDIP`; the alias keeps them loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiplomaticInfluence {
    #[serde(alias = "currentDIP", alias = "current_dip")]
    pub points: i32,
    #[serde(default, alias = "perTurnIncome")]
    pub per_turn_income: i32,
    #[serde(default)]
    pub total_earned: i32,
    #[serde(default)]
    pub total_spent: i32,
    #[serde(default)]
    pub history: VecDeque<DipTransaction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DipTransaction {
    /// Positive for income, negative for spending.
    pub amount: i32,
    pub reason: String,
}

impl DiplomaticInfluence {
    #[must_use]
    pub fn with_points(points: i32) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    fn record(&mut self, amount: i32, reason: &str) {
        self.history.push_back(DipTransaction {
            amount,
            reason: reason.to_string(),
        });
        while self.history.len() > DIP_HISTORY_LIMIT {
            self.history.pop_front();
        }
    }
}

/// Ensure the nation has a purse, seeding it with the starting balance.
pub fn initialize_dip(nation: &mut Nation) -> &mut DiplomaticInfluence {
    nation
        .diplomatic_influence
        .get_or_insert_with(|| DiplomaticInfluence::with_points(STARTING_DIP))
}

/// Per-turn DIP income before the balance cap is applied.
#[must_use]
pub fn calculate_dip_income(nation: &Nation) -> i32 {
    let alliances = i32::try_from(alliance_count(nation)).unwrap_or(i32::MAX);
    let friends = nation
        .relationships
        .values()
        .filter(|value| **value >= DIP_FRIENDLY_RELATIONSHIP)
        .count();
    let friend_bonus = i32::try_from(friends / DIP_PER_FRIENDS).unwrap_or(i32::MAX);
    let government = nation.government_kind().modifiers().dip_bonus;
    BASE_DIP_INCOME
        .saturating_add(alliances)
        .saturating_add(friend_bonus)
        .saturating_add(government)
        .saturating_add(nation.bonuses.dip)
        .clamp(0, MAX_DIP_INCOME)
}

/// Accrue this turn's income. Returns the amount actually credited after
/// the balance cap.
pub fn apply_dip_income(nation: &mut Nation) -> i32 {
    let income = calculate_dip_income(nation);
    let dip = initialize_dip(nation);
    let before = dip.points;
    dip.points = before.saturating_add(income).min(MAX_DIP_POINTS.max(before));
    let gained = dip.points - before;
    dip.per_turn_income = income;
    dip.total_earned = dip.total_earned.saturating_add(gained);
    if gained > 0 {
        dip.record(gained, "income");
    }
    gained
}

#[must_use]
pub fn can_afford(nation: &Nation, cost: i32) -> bool {
    cost <= 0 || nation.dip_points() >= cost
}

/// Deduct `cost`. Returns `false` and leaves the purse untouched when the
/// balance is insufficient.
pub fn spend_dip(nation: &mut Nation, cost: i32, reason: &str) -> bool {
    if cost <= 0 {
        return true;
    }
    if !can_afford(nation, cost) {
        return false;
    }
    let dip = initialize_dip(nation);
    dip.points -= cost;
    dip.total_spent = dip.total_spent.saturating_add(cost);
    dip.record(-cost, reason);
    true
}

/// Credit a one-off DIP grant, respecting the balance cap.
pub fn earn_dip(nation: &mut Nation, amount: i32, reason: &str) -> i32 {
    if amount <= 0 {
        return 0;
    }
    let dip = initialize_dip(nation);
    let before = dip.points;
    dip.points = before.saturating_add(amount).min(MAX_DIP_POINTS.max(before));
    let gained = dip.points - before;
    dip.total_earned = dip.total_earned.saturating_add(gained);
    if gained > 0 {
        dip.record(gained, reason);
    }
    gained
}

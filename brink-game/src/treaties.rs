//! Treaty records between pairs of nations.
//!
//! Every treaty lives twice, once in each party's `treaties` map; all
//! mutations here write both copies.
use serde::{Deserialize, Serialize};

use crate::constants::{BETRAYAL_RELATIONSHIP_PENALTY, BETRAYAL_TRUST_PENALTY};
use crate::nation::{Nation, NationId};
use crate::relations::{adjust_relationship, adjust_trust};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Treaty {
    #[serde(default)]
    pub alliance: bool,
    #[serde(default, alias = "truceTurns")]
    pub truce_turns: u32,
    #[serde(default)]
    pub non_aggression_turns: u32,
    #[serde(default)]
    pub trade: bool,
    #[serde(default)]
    pub signed_turn: Option<u32>,
}

impl Treaty {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !self.alliance && self.truce_turns == 0 && self.non_aggression_turns == 0 && !self.trade
    }

    #[must_use]
    pub const fn at_peace(&self) -> bool {
        self.alliance || self.truce_turns > 0 || self.non_aggression_turns > 0
    }
}

fn apply_symmetric(a: &mut Nation, b: &mut Nation, turn: Option<u32>, f: impl Fn(&mut Treaty)) {
    let a_id = a.id.clone();
    let b_id = b.id.clone();
    for (nation, other) in [(&mut *a, b_id.clone()), (&mut *b, a_id.clone())] {
        let treaty = nation.treaties.entry(other).or_default();
        f(treaty);
        if treaty.signed_turn.is_none() {
            treaty.signed_turn = turn;
        }
    }
    prune(a, &b_id);
    prune(b, &a_id);
}

fn prune(nation: &mut Nation, other: &NationId) {
    if nation.treaties.get(other).is_some_and(Treaty::is_empty) {
        nation.treaties.remove(other);
    }
}

pub fn sign_alliance(a: &mut Nation, b: &mut Nation, turn: u32) {
    apply_symmetric(a, b, Some(turn), |t| t.alliance = true);
}

/// Dissolve an alliance. The betrayed side loses trust in the breaker.
/// Returns `false` when the two were not allied.
pub fn break_alliance(breaker: &mut Nation, betrayed: &mut Nation) -> bool {
    if !is_allied(breaker, betrayed.id.as_str()) {
        return false;
    }
    apply_symmetric(breaker, betrayed, None, |t| t.alliance = false);
    adjust_trust(betrayed, &breaker.id, -BETRAYAL_TRUST_PENALTY);
    adjust_relationship(betrayed, &breaker.id, -BETRAYAL_RELATIONSHIP_PENALTY);
    true
}

/// Start (or extend) a truce. Existing longer truces are kept.
pub fn establish_truce(a: &mut Nation, b: &mut Nation, turns: u32, turn: u32) {
    apply_symmetric(a, b, Some(turn), |t| t.truce_turns = t.truce_turns.max(turns));
}

pub fn sign_non_aggression(a: &mut Nation, b: &mut Nation, turns: u32, turn: u32) {
    apply_symmetric(a, b, Some(turn), |t| {
        t.non_aggression_turns = t.non_aggression_turns.max(turns);
    });
}

pub fn open_trade(a: &mut Nation, b: &mut Nation, turn: u32) {
    apply_symmetric(a, b, Some(turn), |t| t.trade = true);
}

/// Tear up every agreement between the two nations.
pub fn cancel_all(a: &mut Nation, b: &mut Nation) {
    a.treaties.remove(&b.id);
    b.treaties.remove(&a.id);
}

/// Count down timed agreements, returning the partners whose truce lapsed.
pub fn tick_treaties(nation: &mut Nation) -> Vec<NationId> {
    let mut expired = Vec::new();
    for (other, treaty) in &mut nation.treaties {
        if treaty.truce_turns > 0 {
            treaty.truce_turns -= 1;
            if treaty.truce_turns == 0 {
                expired.push(other.clone());
            }
        }
        treaty.non_aggression_turns = treaty.non_aggression_turns.saturating_sub(1);
    }
    nation.treaties.retain(|_, treaty| !treaty.is_empty());
    expired
}

#[must_use]
pub fn is_allied(nation: &Nation, other: &str) -> bool {
    nation.treaty_with(other).is_some_and(|t| t.alliance)
}

#[must_use]
pub fn has_truce(nation: &Nation, other: &str) -> bool {
    nation.treaty_with(other).is_some_and(|t| t.truce_turns > 0)
}

#[must_use]
pub fn at_peace(nation: &Nation, other: &str) -> bool {
    nation.treaty_with(other).is_some_and(Treaty::at_peace)
}

#[must_use]
pub fn alliance_count(nation: &Nation) -> usize {
    nation.treaties.values().filter(|t| t.alliance).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::BASELINE_TRUST;

    fn pair() -> (Nation, Nation) {
        (Nation::new("usa", "United States"), Nation::new("uk", "United Kingdom"))
    }

    #[test]
    fn alliance_is_symmetric() {
        let (mut a, mut b) = pair();
        sign_alliance(&mut a, &mut b, 3);
        assert!(is_allied(&a, "uk"));
        assert!(is_allied(&b, "usa"));
        assert_eq!(a.treaty_with("uk"), b.treaty_with("usa"));
        assert_eq!(a.treaty_with("uk").unwrap().signed_turn, Some(3));
        assert_eq!(alliance_count(&a), 1);
    }

    #[test]
    fn breaking_alliance_penalizes_breaker() {
        let (mut a, mut b) = pair();
        sign_alliance(&mut a, &mut b, 1);
        assert!(break_alliance(&mut a, &mut b));
        assert!(!is_allied(&a, "uk"));
        assert!(!is_allied(&b, "usa"));
        assert!(a.treaties.is_empty());
        assert!(b.trust_in("usa") < BASELINE_TRUST);
        assert!((a.trust_in("uk") - BASELINE_TRUST).abs() < f32::EPSILON);
        assert!(!break_alliance(&mut a, &mut b));
    }

    #[test]
    fn truce_is_symmetric_and_expires() {
        let (mut a, mut b) = pair();
        establish_truce(&mut a, &mut b, 2, 1);
        assert!(has_truce(&a, "uk") && has_truce(&b, "usa"));

        assert!(tick_treaties(&mut a).is_empty());
        tick_treaties(&mut b);
        assert_eq!(a.treaty_with("uk").unwrap().truce_turns, 1);
        assert_eq!(b.treaty_with("usa").unwrap().truce_turns, 1);

        assert_eq!(tick_treaties(&mut a), vec![NationId::from("uk")]);
        tick_treaties(&mut b);
        assert!(!has_truce(&a, "uk") && !has_truce(&b, "usa"));
        assert!(a.treaties.is_empty() && b.treaties.is_empty());
    }

    #[test]
    fn truce_extension_keeps_longer_term() {
        let (mut a, mut b) = pair();
        establish_truce(&mut a, &mut b, 5, 1);
        establish_truce(&mut a, &mut b, 2, 2);
        assert_eq!(a.treaty_with("uk").unwrap().truce_turns, 5);
        assert_eq!(a.treaty_with("uk").unwrap().signed_turn, Some(1));
    }

    #[test]
    fn alliance_survives_truce_expiry() {
        let (mut a, mut b) = pair();
        sign_alliance(&mut a, &mut b, 1);
        establish_truce(&mut a, &mut b, 1, 1);
        tick_treaties(&mut a);
        assert!(is_allied(&a, "uk"));
        assert!(at_peace(&a, "uk"));
    }

    #[test]
    fn cancel_all_clears_both_sides() {
        let (mut a, mut b) = pair();
        open_trade(&mut a, &mut b, 1);
        sign_non_aggression(&mut a, &mut b, 4, 1);
        cancel_all(&mut a, &mut b);
        assert!(a.treaties.is_empty() && b.treaties.is_empty());
    }
}

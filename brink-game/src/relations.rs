//! Relationship, trust, threat and favor bookkeeping between nations.
use crate::constants::{
    BASELINE_TRUST, RELATIONSHIP_MAX, RELATIONSHIP_MIN, THREAT_DECAY_RATE, THREAT_FLOOR,
    TRUST_DRIFT_PER_TURN,
};
use crate::nation::{Nation, NationId};
use crate::numbers::clamp_percent;

/// Shift `nation`'s opinion of `other`, returning the clamped result.
pub fn adjust_relationship(nation: &mut Nation, other: &NationId, delta: i32) -> i32 {
    let entry = nation.relationships.entry(other.clone()).or_insert(0);
    *entry = entry
        .saturating_add(delta)
        .clamp(RELATIONSHIP_MIN, RELATIONSHIP_MAX);
    *entry
}

/// Shift both nations' opinions of each other by the same amount.
pub fn adjust_mutual_relationship(a: &mut Nation, b: &mut Nation, delta: i32) {
    let a_id = a.id.clone();
    adjust_relationship(a, &b.id, delta);
    adjust_relationship(b, &a_id, delta);
}

pub fn adjust_trust(nation: &mut Nation, other: &NationId, delta: f32) -> f32 {
    let entry = nation.trust.entry(other.clone()).or_insert(BASELINE_TRUST);
    *entry = clamp_percent(*entry + delta);
    *entry
}

pub fn add_threat(nation: &mut Nation, other: &NationId, delta: f32) -> f32 {
    let entry = nation.threats.entry(other.clone()).or_insert(0.0);
    *entry = clamp_percent(*entry + delta);
    *entry
}

/// Record that `giver` did `receiver` a favor worth `amount`.
pub fn grant_favor(giver: &mut Nation, receiver: &mut Nation, amount: i32) {
    if amount <= 0 {
        return;
    }
    let giver_id = giver.id.clone();
    *giver.favors.entry(receiver.id.clone()).or_insert(0) += amount;
    *receiver.favors.entry(giver_id).or_insert(0) -= amount;
}

/// Redeem favors owed by `debtor`. Fails without mutation when the debt is
/// smaller than `amount`.
pub fn call_in_favor(caller: &mut Nation, debtor: &mut Nation, amount: i32) -> bool {
    if amount <= 0 || caller.favor_balance(debtor.id.as_str()) < amount {
        return false;
    }
    let caller_id = caller.id.clone();
    *caller.favors.entry(debtor.id.clone()).or_insert(0) -= amount;
    *debtor.favors.entry(caller_id).or_insert(0) += amount;
    caller.favors.retain(|_, balance| *balance != 0);
    debtor.favors.retain(|_, balance| *balance != 0);
    true
}

/// Per-turn drift: trust relaxes toward baseline, threats fade.
pub fn decay_relations(nation: &mut Nation) {
    for trust in nation.trust.values_mut() {
        let gap = BASELINE_TRUST - *trust;
        *trust += gap.clamp(-TRUST_DRIFT_PER_TURN, TRUST_DRIFT_PER_TURN);
    }
    for threat in nation.threats.values_mut() {
        *threat *= 1.0 - THREAT_DECAY_RATE;
    }
    nation.threats.retain(|_, threat| *threat >= THREAT_FLOOR);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> (Nation, Nation) {
        (Nation::new("usa", "United States"), Nation::new("ussr", "Soviet Union"))
    }

    #[test]
    fn relationship_clamps_at_bounds() {
        let (mut a, b) = pair();
        assert_eq!(adjust_relationship(&mut a, &b.id, 250), RELATIONSHIP_MAX);
        assert_eq!(adjust_relationship(&mut a, &b.id, -500), RELATIONSHIP_MIN);
    }

    #[test]
    fn mutual_relationship_moves_both_sides() {
        let (mut a, mut b) = pair();
        adjust_mutual_relationship(&mut a, &mut b, 12);
        assert_eq!(a.relationship_with("ussr"), 12);
        assert_eq!(b.relationship_with("usa"), 12);
    }

    #[test]
    fn favors_are_recorded_on_both_ledgers() {
        let (mut a, mut b) = pair();
        grant_favor(&mut a, &mut b, 3);
        assert_eq!(a.favor_balance("ussr"), 3);
        assert_eq!(b.favor_balance("usa"), -3);

        assert!(!call_in_favor(&mut a, &mut b, 4));
        assert!(call_in_favor(&mut a, &mut b, 3));
        assert_eq!(a.favor_balance("ussr"), 0);
        assert!(a.favors.is_empty());
        assert!(b.favors.is_empty());
    }

    #[test]
    fn debtor_cannot_call_in_favor() {
        let (mut a, mut b) = pair();
        grant_favor(&mut a, &mut b, 2);
        assert!(!call_in_favor(&mut b, &mut a, 1));
    }

    #[test]
    fn decay_pulls_trust_to_baseline_and_fades_threat() {
        let (mut a, b) = pair();
        adjust_trust(&mut a, &b.id, 30.0);
        add_threat(&mut a, &b.id, 40.0);
        decay_relations(&mut a);
        assert!((a.trust_in("ussr") - (BASELINE_TRUST + 29.0)).abs() < 1e-4);
        assert!(a.threat_from("ussr") < 40.0);

        add_threat(&mut a, &b.id, -100.0);
        add_threat(&mut a, &b.id, 0.1);
        decay_relations(&mut a);
        assert!(a.threats.is_empty());
    }
}

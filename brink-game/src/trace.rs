//! Explainability telemetry for weighted random selection.
//!
//! AI decisions and political events are picked from weighted pools; each
//! pick records the pool, the roll, and every candidate weight considered.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Record of a single weighted selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrace {
    /// Identifier for the selection pool (e.g., `ai.actions.ussr`).
    pub pool_id: String,
    /// Random draw used to select from the weighted pool.
    pub roll: f32,
    /// Candidate weights considered during selection.
    pub candidates: Vec<WeightedCandidate>,
    /// Identifier of the selected candidate.
    pub chosen_id: String,
}

/// Candidate weight telemetry captured during selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCandidate {
    pub id: String,
    pub base_weight: f32,
    /// Multipliers applied in order.
    #[serde(default)]
    pub multipliers: Vec<WeightFactor>,
    pub final_weight: f32,
}

impl WeightedCandidate {
    #[must_use]
    pub fn flat(id: impl Into<String>, weight: f32) -> Self {
        Self {
            id: id.into(),
            base_weight: weight,
            multipliers: Vec::new(),
            final_weight: weight,
        }
    }
}

/// Single labelled contribution to a weight or score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightFactor {
    pub label: String,
    pub value: f32,
}

impl WeightFactor {
    #[must_use]
    pub fn new(label: impl Into<String>, value: f32) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Pick an index from `weights` proportionally. Non-positive weights are
/// never chosen; returns `None` when nothing is selectable.
pub fn pick_weighted_index<R>(weights: &[f32], rng: &mut R) -> Option<(usize, f32)>
where
    R: Rng + ?Sized,
{
    let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let roll = rng.gen_range(0.0..total);
    let mut acc = 0.0;
    let mut last_positive = None;
    for (idx, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        acc += *weight;
        last_positive = Some(idx);
        if roll < acc {
            return Some((idx, roll));
        }
    }
    last_positive.map(|idx| (idx, roll))
}

//! Structured per-turn event records.
//!
//! `GameState::logs` keeps the flat list of i18n keys; `TurnEvent`s carry
//! the same keys with the nations involved so a UI can filter and group.
use serde::{Deserialize, Serialize};

use crate::nation::NationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEventKind {
    Economy,
    Diplomacy,
    Research,
    Governance,
    Political,
    Espionage,
    Cyber,
    Military,
    Nuclear,
    BioWarfare,
    Elimination,
    Ending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub turn: u32,
    pub kind: TurnEventKind,
    #[serde(default)]
    pub severity: Severity,
    pub key: String,
    #[serde(default)]
    pub nations: Vec<NationId>,
}

impl TurnEvent {
    #[must_use]
    pub fn involves(&self, nation: &str) -> bool {
        self.nations.iter().any(|id| id.as_str() == nation)
    }
}

//! Technology tree: validation, prerequisites, progress and completion effects.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::OnceLock;
use thiserror::Error;

use crate::cyber::CyberState;
use crate::nation::Nation;

const DEFAULT_RESEARCH_DATA: &str = include_str!("../assets/data/research.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchCategory {
    Warheads,
    Delivery,
    Defense,
    Economy,
    Intelligence,
    Cyber,
    Biology,
    Diplomacy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResearchCost {
    #[serde(default)]
    pub production: i32,
    #[serde(default)]
    pub intel: i32,
}

/// What finishing a node does to the researching nation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEffect {
    UnlockYield { megatons: u16 },
    GrantDefense { amount: u32 },
    GrantMissiles { amount: u32 },
    ProductionBonus { amount: i32 },
    IntelBonus { amount: i32 },
    DipBonus { amount: i32 },
    EspionageBonus { amount: f32 },
    CounterIntelBonus { amount: f32 },
    CyberOffense { amount: f32 },
    CyberDefense { amount: f32 },
    BioLabTierCap { tier: u8 },
    MoraleBoost { amount: f32 },
    FeatureFlag { flag: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchNode {
    pub id: String,
    pub name: String,
    pub category: ResearchCategory,
    #[serde(default)]
    pub cost: ResearchCost,
    /// Turns of progress needed at the base rate.
    pub turns: u32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub effects: Vec<ResearchEffect>,
}

/// The project a nation is currently working on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchProgress {
    pub node_id: String,
    #[serde(default)]
    pub progress: u32,
    pub turns_required: u32,
}

impl ResearchProgress {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.progress >= self.turns_required
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResearchError {
    #[error("duplicate research node `{0}`")]
    DuplicateNode(String),
    #[error("node `{node}` requires unknown node `{prerequisite}`")]
    UnknownPrerequisite { node: String, prerequisite: String },
    #[error("research prerequisites form a cycle through {0:?}")]
    Cycle(Vec<String>),
    #[error("unknown research node `{0}`")]
    UnknownNode(String),
    #[error("`{0}` has already been researched")]
    AlreadyResearched(String),
    #[error("already researching `{0}`")]
    InProgress(String),
    #[error("`{node}` is missing prerequisites {missing:?}")]
    MissingPrerequisites { node: String, missing: Vec<String> },
    #[error("cannot afford `{node}`: needs {required:?}")]
    Unaffordable { node: String, required: ResearchCost },
    #[error("eliminated nations cannot research")]
    Eliminated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResearchCatalogFile {
    nodes: Vec<ResearchNode>,
}

/// A validated, acyclic research tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "ResearchCatalogFile", into = "ResearchCatalogFile")]
pub struct ResearchTree {
    nodes: BTreeMap<String, ResearchNode>,
    /// Node ids in a prerequisite-respecting order.
    order: Vec<String>,
}

impl TryFrom<ResearchCatalogFile> for ResearchTree {
    type Error = ResearchError;

    fn try_from(file: ResearchCatalogFile) -> Result<Self, Self::Error> {
        Self::from_nodes(file.nodes)
    }
}

impl From<ResearchTree> for ResearchCatalogFile {
    fn from(tree: ResearchTree) -> Self {
        let ResearchTree { mut nodes, order } = tree;
        Self {
            nodes: order.iter().filter_map(|id| nodes.remove(id)).collect(),
        }
    }
}

impl ResearchTree {
    /// Build a tree, rejecting duplicate ids, dangling prerequisites and
    /// cycles.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found.
    pub fn from_nodes(nodes: Vec<ResearchNode>) -> Result<Self, ResearchError> {
        let mut by_id = BTreeMap::new();
        let mut declared = Vec::with_capacity(nodes.len());
        for node in nodes {
            if by_id.contains_key(&node.id) {
                return Err(ResearchError::DuplicateNode(node.id));
            }
            declared.push(node.id.clone());
            by_id.insert(node.id.clone(), node);
        }
        for node in by_id.values() {
            if let Some(missing) = node
                .prerequisites
                .iter()
                .find(|prereq| !by_id.contains_key(*prereq))
            {
                return Err(ResearchError::UnknownPrerequisite {
                    node: node.id.clone(),
                    prerequisite: missing.clone(),
                });
            }
        }
        let order = topological_order(&by_id, &declared)?;
        Ok(Self {
            nodes: by_id,
            order,
        })
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_RESEARCH_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<ResearchTree> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or describes an invalid tree.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ResearchNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in prerequisite order.
    pub fn iter(&self) -> impl Iterator<Item = &ResearchNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    #[must_use]
    pub fn prerequisites_met(&self, nation: &Nation, id: &str) -> bool {
        self.nodes.get(id).is_some_and(|node| {
            node.prerequisites
                .iter()
                .all(|prereq| nation.researched.contains(prereq))
        })
    }

    /// Nodes the nation could start right now, ignoring cost.
    #[must_use]
    pub fn available_nodes(&self, nation: &Nation) -> Vec<&ResearchNode> {
        let current = nation.research.as_ref().map(|r| r.node_id.as_str());
        self.iter()
            .filter(|node| !nation.researched.contains(&node.id))
            .filter(|node| current != Some(node.id.as_str()))
            .filter(|node| self.prerequisites_met(nation, &node.id))
            .collect()
    }

    /// Every node needed to reach `id`, ending with `id` itself.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::UnknownNode`] for ids not in the tree.
    pub fn research_path(&self, id: &str) -> Result<Vec<String>, ResearchError> {
        if !self.nodes.contains_key(id) {
            return Err(ResearchError::UnknownNode(id.to_string()));
        }
        let mut needed = BTreeSet::new();
        let mut stack = vec![id.to_string()];
        while let Some(next) = stack.pop() {
            if !needed.insert(next.clone()) {
                continue;
            }
            if let Some(node) = self.nodes.get(&next) {
                stack.extend(node.prerequisites.iter().cloned());
            }
        }
        Ok(self
            .order
            .iter()
            .filter(|node| needed.contains(*node))
            .cloned()
            .collect())
    }
}

fn topological_order(
    nodes: &BTreeMap<String, ResearchNode>,
    declared: &[String],
) -> Result<Vec<String>, ResearchError> {
    let mut indegree: BTreeMap<&str, usize> = nodes
        .values()
        .map(|node| (node.id.as_str(), node.prerequisites.len()))
        .collect();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for node in nodes.values() {
        for prereq in &node.prerequisites {
            dependents
                .entry(prereq.as_str())
                .or_default()
                .push(node.id.as_str());
        }
    }

    // Seed in declaration order so the catalog's own ordering is kept where possible.
    let mut ready: VecDeque<&str> = declared
        .iter()
        .map(String::as_str)
        .filter(|id| indegree.get(id) == Some(&0))
        .collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(id) = ready.pop_front() {
        order.push(id.to_string());
        for dependent in dependents.get(id).into_iter().flatten() {
            if let Some(count) = indegree.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.push_back(*dependent);
                }
            }
        }
    }

    if order.len() == nodes.len() {
        Ok(order)
    } else {
        let stuck = indegree
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(id, _)| id.to_string())
            .collect();
        Err(ResearchError::Cycle(stuck))
    }
}

/// Begin researching `id`, paying its cost up front.
///
/// # Errors
///
/// Rejects unknown or finished nodes, a second concurrent project, missing
/// prerequisites and unaffordable costs. Nothing is charged on error.
pub fn start_research(nation: &mut Nation, tree: &ResearchTree, id: &str) -> Result<(), ResearchError> {
    if !nation.is_active() {
        return Err(ResearchError::Eliminated);
    }
    let node = tree
        .get(id)
        .ok_or_else(|| ResearchError::UnknownNode(id.to_string()))?;
    if nation.researched.contains(id) {
        return Err(ResearchError::AlreadyResearched(id.to_string()));
    }
    if let Some(current) = &nation.research {
        return Err(ResearchError::InProgress(current.node_id.clone()));
    }
    let missing: Vec<String> = node
        .prerequisites
        .iter()
        .filter(|prereq| !nation.researched.contains(*prereq))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ResearchError::MissingPrerequisites {
            node: id.to_string(),
            missing,
        });
    }
    if nation.production < node.cost.production || nation.intel < node.cost.intel {
        return Err(ResearchError::Unaffordable {
            node: id.to_string(),
            required: node.cost,
        });
    }

    nation.production -= node.cost.production;
    nation.intel -= node.cost.intel;
    nation.research = Some(ResearchProgress {
        node_id: node.id.clone(),
        progress: 0,
        turns_required: node.turns.max(1),
    });
    log::debug!("{} starts research on {}", nation.id, node.id);
    Ok(())
}

/// Advance the current project by one turn. Returns the id of a project
/// completed this turn.
pub fn advance_research(nation: &mut Nation, tree: &ResearchTree) -> Option<String> {
    let step = 1 + nation.government_kind().modifiers().research_bonus;
    let progress = nation.research.as_mut()?;
    progress.progress = progress.progress.saturating_add(step);
    if !progress.is_complete() {
        return None;
    }
    let finished = nation.research.take()?;
    let id = finished.node_id;
    if nation.researched.insert(id.clone())
        && let Some(node) = tree.get(&id)
    {
        for effect in &node.effects {
            apply_research_effect(nation, effect);
        }
    }
    log::debug!("{} completes research on {id}", nation.id);
    Some(id)
}

pub fn apply_research_effect(nation: &mut Nation, effect: &ResearchEffect) {
    match effect {
        ResearchEffect::UnlockYield { megatons } => {
            nation.unlocked_yields.insert(*megatons);
        }
        ResearchEffect::GrantDefense { amount } => {
            nation.defense = nation.defense.saturating_add(*amount);
        }
        ResearchEffect::GrantMissiles { amount } => {
            nation.missiles = nation.missiles.saturating_add(*amount);
        }
        ResearchEffect::ProductionBonus { amount } => nation.bonuses.production += amount,
        ResearchEffect::IntelBonus { amount } => nation.bonuses.intel += amount,
        ResearchEffect::DipBonus { amount } => nation.bonuses.dip += amount,
        ResearchEffect::EspionageBonus { amount } => nation.bonuses.espionage += amount,
        ResearchEffect::CounterIntelBonus { amount } => nation.bonuses.counter_intel += amount,
        ResearchEffect::CyberOffense { amount } => {
            nation.cyber.get_or_insert_with(CyberState::default).offense += amount;
        }
        ResearchEffect::CyberDefense { amount } => {
            nation.cyber.get_or_insert_with(CyberState::default).defense += amount;
        }
        ResearchEffect::BioLabTierCap { tier } => {
            nation.bio_lab.max_tier = nation.bio_lab.max_tier.max(*tier);
        }
        ResearchEffect::MoraleBoost { amount } => nation.adjust_morale(*amount),
        ResearchEffect::FeatureFlag { flag } => {
            nation.feature_flags.insert(flag.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::{GovernmentKind, GovernmentState};

    fn node(id: &str, prereqs: &[&str]) -> ResearchNode {
        ResearchNode {
            id: id.to_string(),
            name: id.to_string(),
            category: ResearchCategory::Economy,
            cost: ResearchCost {
                production: 10,
                intel: 2,
            },
            turns: 2,
            prerequisites: prereqs.iter().map(ToString::to_string).collect(),
            effects: vec![ResearchEffect::ProductionBonus { amount: 1 }],
        }
    }

    fn rich_nation() -> Nation {
        let mut nation = Nation::new("usa", "United States");
        nation.production = 1_000;
        nation.intel = 1_000;
        nation
    }

    #[test]
    fn default_catalog_is_valid() {
        let tree = ResearchTree::default_catalog();
        assert!(tree.len() >= 20);
        let path = tree.research_path("mirv_bus").unwrap();
        assert_eq!(path.last().map(String::as_str), Some("mirv_bus"));
        assert!(path.contains(&"fission_refinement".to_string()));
        let fission = path.iter().position(|id| id == "fission_refinement");
        let thermo = path.iter().position(|id| id == "thermonuclear_design");
        assert!(fission < thermo);
    }

    #[test]
    fn rejects_cycles_duplicates_and_dangling_prereqs() {
        let cycle = ResearchTree::from_nodes(vec![node("a", &["b"]), node("b", &["a"]), node("c", &[])]);
        assert!(matches!(cycle, Err(ResearchError::Cycle(ids)) if ids == vec!["a", "b"]));

        let dup = ResearchTree::from_nodes(vec![node("a", &[]), node("a", &[])]);
        assert_eq!(dup, Err(ResearchError::DuplicateNode("a".into())));

        let dangling = ResearchTree::from_nodes(vec![node("a", &["ghost"])]);
        assert!(matches!(dangling, Err(ResearchError::UnknownPrerequisite { .. })));
    }

    #[test]
    fn json_validation_surfaces_as_parse_error() {
        let json = r#"{"nodes":[{"id":"a","name":"A","category":"cyber","turns":1,"prerequisites":["a"]}]}"#;
        assert!(ResearchTree::from_json(json).is_err());
    }

    #[test]
    fn prerequisites_gate_start() {
        let tree = ResearchTree::from_nodes(vec![node("a", &[]), node("b", &["a"])]).unwrap();
        let mut nation = rich_nation();
        let available: Vec<_> = tree.available_nodes(&nation).iter().map(|n| n.id.clone()).collect();
        assert_eq!(available, vec!["a"]);
        assert_eq!(
            start_research(&mut nation, &tree, "b"),
            Err(ResearchError::MissingPrerequisites {
                node: "b".into(),
                missing: vec!["a".into()],
            })
        );
        assert_eq!(nation.production, 1_000);

        start_research(&mut nation, &tree, "a").unwrap();
        assert_eq!(nation.production, 990);
        assert_eq!(nation.intel, 998);
        assert_eq!(
            start_research(&mut nation, &tree, "a"),
            Err(ResearchError::InProgress("a".into()))
        );
        assert!(tree.available_nodes(&nation).is_empty());
    }

    #[test]
    fn completion_applies_effects_once() {
        let tree = ResearchTree::from_nodes(vec![node("a", &[])]).unwrap();
        let mut nation = rich_nation();
        start_research(&mut nation, &tree, "a").unwrap();
        assert_eq!(advance_research(&mut nation, &tree), None);
        assert_eq!(advance_research(&mut nation, &tree), Some("a".into()));
        assert_eq!(nation.bonuses.production, 1);
        assert!(nation.research.is_none());
        assert_eq!(advance_research(&mut nation, &tree), None);
        assert_eq!(nation.bonuses.production, 1);
        assert_eq!(
            start_research(&mut nation, &tree, "a"),
            Err(ResearchError::AlreadyResearched("a".into()))
        );
    }

    #[test]
    fn technocracy_researches_faster() {
        let tree = ResearchTree::from_nodes(vec![node("a", &[])]).unwrap();
        let mut nation = rich_nation();
        nation.government_state = Some(GovernmentState::new(GovernmentKind::Technocracy, 0));
        start_research(&mut nation, &tree, "a").unwrap();
        assert_eq!(advance_research(&mut nation, &tree), Some("a".into()));
    }

    #[test]
    fn unaffordable_research_is_rejected() {
        let tree = ResearchTree::from_nodes(vec![node("a", &[])]).unwrap();
        let mut nation = Nation::new("usa", "United States");
        nation.production = 5;
        assert!(matches!(
            start_research(&mut nation, &tree, "a"),
            Err(ResearchError::Unaffordable { .. })
        ));
        assert_eq!(nation.production, 5);
    }

    #[test]
    fn warhead_research_unlocks_yields() {
        let tree = ResearchTree::default_catalog();
        let mut nation = rich_nation();
        start_research(&mut nation, tree, "fission_refinement").unwrap();
        while advance_research(&mut nation, tree).is_none() {}
        assert!(nation.unlocked_yields.contains(&20));
    }
}

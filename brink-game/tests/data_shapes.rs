use std::collections::BTreeSet;
use std::hash::Hasher;

use brink_game::{
    Campaign, Catalogs, GameMode, GameState, PoliticalEventCatalog, ResearchTree, ScenarioCatalog,
};
use twox_hash::XxHash64;

fn digest(bytes: &[u8]) -> u64 {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    hasher.finish()
}

fn played(seed: u64, turns: u32) -> GameState {
    let mut campaign = Campaign::new(
        Catalogs::default(),
        "cold_war_1962",
        None,
        seed,
        GameMode::Standard,
    )
    .unwrap();
    for _ in 0..turns {
        campaign.end_turn();
    }
    campaign.into_state()
}

#[test]
fn bundled_catalogs_parse_strictly() {
    let research = ResearchTree::from_json(include_str!("../assets/data/research.json")).unwrap();
    assert_eq!(&research, ResearchTree::default_catalog());
    assert!(!research.is_empty());

    let events =
        PoliticalEventCatalog::from_json(include_str!("../assets/data/political_events.json"))
            .unwrap();
    assert_eq!(&events, PoliticalEventCatalog::default_catalog());

    let scenarios = ScenarioCatalog::from_json(include_str!("../assets/data/scenario.json")).unwrap();
    assert_eq!(&scenarios, ScenarioCatalog::default_catalog());
}

#[test]
fn political_events_are_well_formed() {
    let catalog = PoliticalEventCatalog::default_catalog();
    assert!(catalog.events.len() >= 8);
    let mut ids = BTreeSet::new();
    for event in &catalog.events {
        assert!(ids.insert(event.id.as_str()), "duplicate event {}", event.id);
        assert!(event.weight > 0.0, "{} has no weight", event.id);
        assert!(!event.options.is_empty(), "{} has no options", event.id);
        let options: BTreeSet<_> = event.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(options.len(), event.options.len(), "{} repeats an option", event.id);
    }
}

#[test]
fn research_prerequisites_resolve_in_order() {
    let tree = ResearchTree::default_catalog();
    for node in tree.iter() {
        let path = tree.research_path(&node.id).unwrap();
        assert_eq!(path.last(), Some(&node.id));
        for prerequisite in &node.prerequisites {
            assert!(path.contains(prerequisite), "{} skips {prerequisite}", node.id);
        }
    }
}

#[test]
fn every_scenario_seat_is_playable() {
    for scenario in &ScenarioCatalog::default_catalog().scenarios {
        for setup in &scenario.nations {
            let state =
                GameState::from_scenario(scenario, Some(setup.id.as_str()), 1, GameMode::Standard)
                    .unwrap();
            assert!(state.player().unwrap().is_player);
            assert_eq!(state.nations.values().filter(|n| n.is_player).count(), 1);
        }
    }
}

#[test]
fn state_serialization_round_trips_mid_campaign() {
    let state = played(0xFACE_B00C, 4);
    let json = serde_json::to_string(&state).unwrap();
    let restored: GameState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, state);
    assert_eq!(restored.fingerprint(), state.fingerprint());
}

#[test]
fn campaign_digest_is_deterministic() {
    let left = serde_json::to_vec(&played(0x00C0_FFEE, 8)).unwrap();
    let right = serde_json::to_vec(&played(0x00C0_FFEE, 8)).unwrap();
    assert_eq!(digest(&left), digest(&right));

    let other = serde_json::to_vec(&played(0x0BAD_F00D, 8)).unwrap();
    assert_ne!(digest(&left), digest(&other));
}

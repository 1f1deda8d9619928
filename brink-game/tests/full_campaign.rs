use brink_game::{
    Campaign, Catalogs, DiplomacyProposal, Ending, GameMode, ProposalKind, ResultConfig,
    StrategicAsset, TurnEventKind, decode_to_seed, parse_share_code,
};

fn campaign(scenario: &str, player: Option<&str>, seed: u64, mode: GameMode) -> Campaign {
    Campaign::new(Catalogs::default(), scenario, player, seed, mode).unwrap()
}

/// A cautious player: research, answer events, court allies, keep a deterrent.
fn play_cautious_turn(campaign: &mut Campaign) {
    let next = campaign.state().player().and_then(|player| {
        if player.research.is_some() {
            return None;
        }
        campaign
            .catalogs()
            .research
            .available_nodes(player)
            .first()
            .map(|node| node.id.clone())
    });
    if let Some(node) = next {
        let _ = campaign.start_research(&node);
    }

    while let Some(pending) = campaign.state().pending_events.first().cloned() {
        let option = pending.event.options[0].id.clone();
        campaign.resolve_event(0, &option).unwrap();
    }

    let partner = campaign.state().player().and_then(|player| {
        campaign
            .state()
            .nations
            .values()
            .filter(|other| other.id != player.id && other.is_active())
            .find(|other| player.treaty_with(other.id.as_str()).is_none())
            .map(|other| other.id.clone())
    });
    if let Some(partner) = partner {
        let player = campaign.state().player_id.clone();
        let _ = campaign.propose(DiplomacyProposal::new(
            player.as_str(),
            partner.as_str(),
            ProposalKind::TradeAgreement,
        ));
    }

    let _ = campaign.build(StrategicAsset::Defense);
}

fn play_out(campaign: &mut Campaign) -> Ending {
    let max_turns = campaign.state().max_turns;
    for _ in 0..max_turns {
        play_cautious_turn(campaign);
        let report = campaign.end_turn();
        if let Some(ending) = report.ending {
            return ending;
        }
    }
    panic!("campaign did not end within {max_turns} turns");
}

#[test]
fn cold_war_campaign_runs_to_an_ending() {
    let mut campaign = campaign("cold_war_1962", None, 0x1962, GameMode::Standard);
    let ending = play_out(&mut campaign);
    let state = campaign.state();
    assert_eq!(state.ending, Some(ending));
    assert!(state.turn <= state.max_turns);
    assert!(state.logs.iter().any(|key| key.starts_with("log.ending.")));

    let frozen = state.clone();
    let report = campaign.end_turn();
    assert_eq!(report.ending, Some(ending));
    assert_eq!(campaign.state(), &frozen);
}

#[test]
fn multipolar_campaign_runs_in_brinkmanship_mode() {
    let mut campaign = campaign("multipolar_2030", Some("ind"), 77, GameMode::Brinkmanship);
    assert_eq!(campaign.state().player_id.as_str(), "ind");
    play_out(&mut campaign);
    let summary = campaign.summary(&ResultConfig::default());
    assert_eq!(summary.nation, "ind");
    assert_eq!(summary.mode, GameMode::Brinkmanship.key());
    assert_eq!(parse_share_code(&summary.share_code), Some((GameMode::Brinkmanship, 77)));
}

#[test]
fn identical_seeds_replay_identically() {
    let run = |seed| {
        let mut campaign = campaign("cold_war_1962", None, seed, GameMode::Standard);
        let mut fingerprints = Vec::new();
        for _ in 0..12 {
            play_cautious_turn(&mut campaign);
            campaign.end_turn();
            fingerprints.push(campaign.state().fingerprint());
        }
        fingerprints
    };
    assert_eq!(run(99), run(99));
    assert_ne!(run(99), run(100));
}

#[test]
fn ai_nations_act_every_turn() {
    let mut campaign = campaign("cold_war_1962", None, 5, GameMode::Standard);
    let report = campaign.end_turn();
    let ai_count = campaign
        .state()
        .nations
        .values()
        .filter(|nation| !nation.is_player && nation.is_active())
        .count();
    assert_eq!(report.ai_decisions.len(), ai_count);
    assert!(report.ai_failures.len() <= ai_count);
    assert!(report
        .ai_decisions
        .iter()
        .all(|decision| decision.trace.pool_id == format!("ai.actions.{}", decision.nation)));
}

#[test]
fn nuclear_exchange_is_recorded() {
    let mut campaign = campaign("cold_war_1962", None, 3, GameMode::Standard);
    while campaign.state().defcon > 2 {
        campaign.escalate_defcon();
    }
    let report = campaign
        .nuclear_strike("ussr", brink_game::DeliverySystem::Missile, 10)
        .unwrap();
    assert_eq!(campaign.state().strikes_launched, 1);
    assert!(campaign
        .state()
        .turn_events
        .iter()
        .any(|event| event.kind == TurnEventKind::Military));
    if !report.intercepted {
        assert!(campaign.state().global_radiation > 0.0);
    }
    let summary = campaign.summary(&ResultConfig::default());
    assert_eq!(summary.strikes_launched, 1);
}

#[test]
fn share_codes_decode_to_campaign_seed() {
    let campaign = campaign("cold_war_1962", None, 0xDEAD_BEEF, GameMode::Standard);
    let summary = campaign.summary(&ResultConfig::default());
    assert_eq!(summary.ending, None);
    assert_eq!(summary.headline_key, "result.headline.in_progress");
    assert_eq!(
        decode_to_seed(&summary.share_code),
        Some((GameMode::Standard, 0xDEAD_BEEF))
    );
}

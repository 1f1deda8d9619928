use brink_game::diplomacy::{earn_dip, impose_sanctions, lift_sanctions, sanction_multiplier};
use brink_game::{
    AiPersonality, DiplomacyError, DiplomacyProposal, GameState, Nation, NationId, ProposalKind,
    submit_proposal,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn world() -> GameState {
    let mut usa = Nation::new("usa", "United States");
    earn_dip(&mut usa, 60, "test.grant");
    let mut uk = Nation::new("uk", "United Kingdom");
    uk.relationships.insert(NationId::from("usa"), 80);
    uk.trust.insert(NationId::from("usa"), 90.0);
    let mut ussr = Nation::new("ussr", "Soviet Union");
    ussr.personality = AiPersonality::Aggressive;
    ussr.relationships.insert(NationId::from("usa"), -60);
    let fra = Nation::new("fra", "France");
    GameState::from_nations(vec![usa, uk, ussr, fra], NationId::from("usa"))
}

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(1962)
}

#[test]
fn friendly_alliance_is_signed_on_both_sides() {
    let mut state = world();
    let response = submit_proposal(
        &mut state,
        DiplomacyProposal::new("usa", "uk", ProposalKind::Alliance),
        &mut rng(),
    )
    .unwrap();
    assert!(response.accepted, "{response:?}");
    assert_eq!(response.message, "diplomacy.response.accept.alliance");

    let usa = state.nation("usa").unwrap();
    let uk = state.nation("uk").unwrap();
    assert!(usa.treaty_with("uk").is_some_and(|t| t.alliance));
    assert!(uk.treaty_with("usa").is_some_and(|t| t.alliance));
    assert_eq!(usa.dip_points(), 70 - ProposalKind::Alliance.dip_cost());

    let again = submit_proposal(
        &mut state,
        DiplomacyProposal::new("usa", "uk", ProposalKind::Alliance),
        &mut rng(),
    )
    .unwrap();
    assert!(!again.accepted);
    assert_eq!(again.message, "diplomacy.response.redundant.alliance");
}

#[test]
fn hostile_rival_rejects_truce_outright() {
    let mut state = world();
    let response = submit_proposal(
        &mut state,
        DiplomacyProposal::new("usa", "ussr", ProposalKind::Truce),
        &mut rng(),
    )
    .unwrap();
    assert!(!response.accepted);
    assert!(response.counter_offer.is_none());
    assert_eq!(response.message, "diplomacy.response.reject.truce");
    assert!(state.nation("usa").unwrap().relationship_with("ussr") < 0);
    assert!(state.nation("usa").unwrap().treaty_with("ussr").is_none());
}

#[test]
fn near_miss_draws_a_counter_offer_that_then_succeeds() {
    let mut state = world();
    let first = submit_proposal(
        &mut state,
        DiplomacyProposal::new("usa", "fra", ProposalKind::TradeAgreement),
        &mut rng(),
    )
    .unwrap();
    assert!(!first.accepted);
    let counter = first.counter_offer.expect("counter offer");
    assert_eq!(first.message, "diplomacy.response.counter.trade_agreement");
    assert_eq!(counter.dip_offered, 20);

    let fra_before = state.nation("fra").unwrap().dip_points();
    let second = submit_proposal(
        &mut state,
        DiplomacyProposal::new("usa", "fra", ProposalKind::TradeAgreement)
            .with_dip_offered(counter.dip_offered),
        &mut rng(),
    )
    .unwrap();
    assert!(second.accepted, "{second:?}");
    assert!(state.nation("fra").unwrap().treaty_with("usa").is_some_and(|t| t.trade));
    assert!(state.nation("fra").unwrap().dip_points() >= fra_before + 20);
    assert_eq!(state.proposal_history.len(), 2);
    assert!(state.proposal_history[0].proposal.id < state.proposal_history[1].proposal.id);
}

#[test]
fn proposals_are_validated_before_dip_is_spent() {
    let mut state = world();
    assert_eq!(
        submit_proposal(
            &mut state,
            DiplomacyProposal::new("usa", "usa", ProposalKind::Truce),
            &mut rng()
        ),
        Err(DiplomacyError::SelfTarget)
    );
    assert_eq!(
        submit_proposal(
            &mut state,
            DiplomacyProposal::new("usa", "atlantis", ProposalKind::Truce),
            &mut rng()
        ),
        Err(DiplomacyError::UnknownNation(NationId::from("atlantis")))
    );
    state.nation_mut("fra").unwrap().eliminated = true;
    assert_eq!(
        submit_proposal(
            &mut state,
            DiplomacyProposal::new("usa", "fra", ProposalKind::Truce),
            &mut rng()
        ),
        Err(DiplomacyError::Eliminated(NationId::from("fra")))
    );
    assert_eq!(
        submit_proposal(
            &mut state,
            DiplomacyProposal::new("uk", "usa", ProposalKind::Alliance),
            &mut rng()
        ),
        Err(DiplomacyError::InsufficientDip {
            required: ProposalKind::Alliance.dip_cost(),
            available: 0,
        })
    );
    assert_eq!(state.nation("usa").unwrap().dip_points(), 70);
    assert!(state.proposal_history.is_empty());
}

#[test]
fn sanctions_cut_yields_until_lifted() {
    let mut state = world();
    impose_sanctions(&mut state, "usa", "ussr").unwrap();
    impose_sanctions(&mut state, "uk", "ussr").unwrap();
    assert!((sanction_multiplier(state.nation("ussr").unwrap()) - 0.8).abs() < 1e-6);
    assert!(matches!(
        impose_sanctions(&mut state, "usa", "ussr"),
        Err(DiplomacyError::AlreadySanctioned { .. })
    ));

    lift_sanctions(&mut state, "usa", "ussr").unwrap();
    lift_sanctions(&mut state, "uk", "ussr").unwrap();
    assert!((sanction_multiplier(state.nation("ussr").unwrap()) - 1.0).abs() < 1e-6);
    assert!(matches!(
        lift_sanctions(&mut state, "uk", "ussr"),
        Err(DiplomacyError::NotSanctioned { .. })
    ));
    assert!(
        state
            .logs
            .iter()
            .filter(|key| key.starts_with("log.sanctions."))
            .count()
            >= 4
    );
}

#[test]
fn asking_to_lift_absent_sanctions_is_redundant() {
    let mut state = world();
    let response = submit_proposal(
        &mut state,
        DiplomacyProposal::new("usa", "uk", ProposalKind::LiftSanctions),
        &mut rng(),
    )
    .unwrap();
    assert!(!response.accepted);
    assert_eq!(response.message, "diplomacy.response.redundant.lift_sanctions");
}

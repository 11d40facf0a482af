//! End-to-end engine tests.
//!
//! These exercise the full path from placement through triggered
//! dispatch, recomputation, and the play sequence log, using a small
//! catalog in the style of the real card pool.

use std::sync::Arc;

use tcg_engine::{
    ApplyTo, BoostScope, CardCatalog, CardDefinition, CardId, CardType, Destination, EffectAction,
    EffectSpec, EngineError, GameArena, GameSession, PlayerId, SequenceAction, TargetFilter, Zone,
};

const IVANKA: CardId = CardId::new(1);
const ECONOMIST: CardId = CardId::new(2);
const TRUMP: CardId = CardId::new(3);
const SILENCER: CardId = CardId::new(4);
const LEFTIST: CardId = CardId::new(5);
const SCOUT: CardId = CardId::new(6);
const RIGHT_WALL: CardId = CardId::new(7);
const LEFT_WALL: CardId = CardId::new(8);
const RALLY: CardId = CardId::new(9);

const P0: PlayerId = PlayerId::new(0);
const P1: PlayerId = PlayerId::new(1);

fn catalog() -> Arc<CardCatalog> {
    let mut catalog = CardCatalog::new();
    catalog.register(
        CardDefinition::new(IVANKA, "伊万卡", CardType::Character, "右翼")
            .with_power(100)
            .with_trait("特朗普家族"),
    );
    catalog.register(
        CardDefinition::new(ECONOMIST, "經濟學家", CardType::Character, "經濟").with_power(100),
    );
    catalog.register(
        CardDefinition::new(TRUMP, "特朗普", CardType::Leader, "右翼").with_effect(
            EffectSpec::continuous(
                EffectAction::PowerBoost {
                    amount: 45,
                    scope: BoostScope::AllMatching,
                },
                TargetFilter::any().traits(["特朗普家族"]),
            ),
        ),
    );
    catalog.register(
        CardDefinition::new(SILENCER, "封口令", CardType::Sp, "右翼").with_effect(
            EffectSpec::continuous(
                EffectAction::PowerNullify,
                TargetFilter::any().game_types(["左翼"]),
            ),
        ),
    );
    catalog.register(
        CardDefinition::new(LEFTIST, "左翼名人", CardType::Character, "左翼").with_power(90),
    );
    catalog.register(
        CardDefinition::new(SCOUT, "獵頭", CardType::Help, "經濟").with_effect(
            EffectSpec::on_summon(
                EffectAction::Search {
                    depth: 5,
                    select_count: 2,
                    destination: Destination::Hand,
                },
                TargetFilter::any().card_types([CardType::Character]),
            ),
        ),
    );
    catalog.register(
        CardDefinition::new(RIGHT_WALL, "右翼壁壘", CardType::Sp, "右翼").with_effect(
            EffectSpec::continuous(
                EffectAction::ZoneRestrict {
                    zone: Zone::Top,
                    allowed: vec!["右翼".into()],
                    applies: ApplyTo::AllPlayers,
                },
                TargetFilter::any(),
            ),
        ),
    );
    catalog.register(
        CardDefinition::new(LEFT_WALL, "左翼壁壘", CardType::Help, "左翼").with_effect(
            EffectSpec::continuous(
                EffectAction::ZoneRestrict {
                    zone: Zone::Top,
                    allowed: vec!["左翼".into()],
                    applies: ApplyTo::AllPlayers,
                },
                TargetFilter::any(),
            ),
        ),
    );
    catalog.register(
        CardDefinition::new(RALLY, "造勢大會", CardType::Help, "右翼").with_effect(
            EffectSpec::on_summon(EffectAction::Draw { count: 3 }, TargetFilter::any()),
        ),
    );
    Arc::new(catalog)
}

fn session() -> GameSession {
    GameSession::new(catalog(), 2)
}

#[test]
fn test_leader_trait_boost() {
    let mut session = session();
    session.add_to_hand(P0, TRUMP);
    session.add_to_hand(P0, IVANKA);
    session.add_to_hand(P0, ECONOMIST);

    session.apply_placement(P0, TRUMP, Zone::Leader, false).unwrap();
    let family = session.apply_placement(P0, IVANKA, Zone::Top, false).unwrap();
    let other = session.apply_placement(P0, ECONOMIST, Zone::Left, false).unwrap();

    let computed = session.computed();
    // 100 base + 45 leader boost for the family trait
    assert_eq!(computed.power(P0, family.instance).unwrap().final_power, 145);
    // No family trait, no boost
    assert_eq!(computed.power(P0, other.instance).unwrap().final_power, 100);
}

#[test]
fn test_leader_boost_reaches_opponents_too() {
    let mut session = session();
    session.add_to_hand(P0, TRUMP);
    session.add_to_hand(P1, IVANKA);

    session.apply_placement(P0, TRUMP, Zone::Leader, false).unwrap();
    let rival = session.apply_placement(P1, IVANKA, Zone::Top, false).unwrap();

    // The filter is trait-based, not owner-based
    assert_eq!(
        session.computed().power(P1, rival.instance).unwrap().final_power,
        145
    );
}

#[test]
fn test_nullification_dominates_and_is_listed() {
    let mut session = session();
    session.add_to_hand(P1, LEFTIST);
    session.add_to_hand(P0, SILENCER);

    let victim = session.apply_placement(P1, LEFTIST, Zone::Top, false).unwrap();
    session.apply_placement(P0, SILENCER, Zone::Sp, false).unwrap();

    let computed = session.computed();
    let entry = computed.power(P1, victim.instance).unwrap();
    assert_eq!(entry.final_power, 0);
    assert!(entry.nullified);
    assert_eq!(computed.disabled_cards, vec![victim.instance]);

    // Non-leftists are untouched
    session.add_to_hand(P0, ECONOMIST);
    let safe = session.apply_placement(P0, ECONOMIST, Zone::Left, false).unwrap();
    assert_eq!(
        session.computed().power(P0, safe.instance).unwrap().final_power,
        100
    );
}

#[test]
fn test_face_down_card_has_zero_power_but_is_not_disabled() {
    let mut session = session();
    session.add_to_hand(P0, IVANKA);

    let hidden = session.apply_placement(P0, IVANKA, Zone::Right, true).unwrap();

    let computed = session.computed();
    let entry = computed.power(P0, hidden.instance).unwrap();
    assert_eq!(entry.final_power, 0);
    assert!(!entry.nullified);
    assert!(computed.disabled_cards.is_empty());
}

#[test]
fn test_conflicting_restrictions_close_the_zone() {
    let mut session = session();
    session.add_to_hand(P0, RIGHT_WALL);
    session.add_to_hand(P1, LEFT_WALL);
    session.add_to_hand(P0, IVANKA);
    session.add_to_hand(P1, LEFTIST);

    session.apply_placement(P0, RIGHT_WALL, Zone::Sp, false).unwrap();
    session.apply_placement(P1, LEFT_WALL, Zone::Help, false).unwrap();

    // 右翼 ∩ 左翼 is empty: nobody can play anything into Top
    for (player, card) in [(P0, IVANKA), (P1, LEFTIST)] {
        let err = session.apply_placement(player, card, Zone::Top, false).unwrap_err();
        assert!(matches!(err, EngineError::ZoneRestricted { .. }));
    }
    // Other character zones stay open
    session.apply_placement(P0, IVANKA, Zone::Left, false).unwrap();
}

#[test]
fn test_restriction_conflict_logged_once_per_player() {
    let mut session = session();
    session.add_to_hand(P0, RIGHT_WALL);
    session.add_to_hand(P1, LEFT_WALL);
    session.add_to_hand(P0, IVANKA);

    session.apply_placement(P0, RIGHT_WALL, Zone::Sp, false).unwrap();
    assert_eq!(conflict_entries(&session), 0);

    session.apply_placement(P1, LEFT_WALL, Zone::Help, false).unwrap();
    // The conflict binds both players; one entry each
    assert_eq!(conflict_entries(&session), 2);

    // Later mutations do not re-log the same persisting conflict
    session.apply_placement(P0, IVANKA, Zone::Left, false).unwrap();
    assert_eq!(conflict_entries(&session), 2);
}

fn conflict_entries(session: &GameSession) -> usize {
    session
        .log()
        .entries()
        .filter(|e| matches!(e.action, SequenceAction::RestrictionConflict { .. }))
        .count()
}

#[test]
fn test_search_partial_fulfillment_clamps() {
    let mut session = session();
    session.add_to_hand(P0, SCOUT);
    // Only one character in the searched depth; the effect wants two
    session.set_deck(P0, vec![RALLY, IVANKA, RALLY]);

    let outcome = session.apply_placement(P0, SCOUT, Zone::Help, false).unwrap();
    let id = outcome.pending_selections[0];

    let pending = session.pending_selection(id).unwrap();
    assert_eq!(pending.candidates, vec![IVANKA]);
    assert_eq!(pending.select_count, 1);

    session.resolve_selection(id, &[IVANKA]).unwrap();
    assert!(session.board().hand(P0).contains(&IVANKA));
    // Unchosen deck cards keep their order
    assert_eq!(session.board().deck(P0), &[RALLY, RALLY]);
}

#[test]
fn test_invalid_selection_leaves_workflow_open() {
    let mut session = session();
    session.add_to_hand(P0, SCOUT);
    session.set_deck(P0, vec![IVANKA, ECONOMIST]);

    let outcome = session.apply_placement(P0, SCOUT, Zone::Help, false).unwrap();
    let id = outcome.pending_selections[0];

    // RALLY was never a candidate
    let err = session.resolve_selection(id, &[RALLY, IVANKA]).unwrap_err();
    assert!(matches!(err, EngineError::InvalidSelection(_)));

    // The workflow survives and the deck is untouched
    assert!(session.pending_selection(id).is_some());
    assert_eq!(session.board().deck(P0), &[IVANKA, ECONOMIST]);

    // A valid retry succeeds
    session.resolve_selection(id, &[ECONOMIST, IVANKA]).unwrap();
    assert!(session.pending_selections().is_empty());
}

#[test]
fn test_draw_shortfall_recorded_not_errored() {
    let mut session = session();
    session.add_to_hand(P0, RALLY);
    session.set_deck(P0, vec![IVANKA]);

    session.apply_placement(P0, RALLY, Zone::Help, false).unwrap();

    assert!(session.board().hand(P0).contains(&IVANKA));
    assert_eq!(session.board().deck_size(P0), 0);
    assert!(session.log().entries().any(|e| matches!(
        e.action,
        SequenceAction::DrawShortfall {
            requested: 3,
            drawn: 1
        }
    )));
}

#[test]
fn test_play_sequence_ordering_and_stats() {
    let mut session = session();
    session.add_to_hand(P0, TRUMP);
    session.add_to_hand(P0, IVANKA);
    session.add_to_hand(P1, ECONOMIST);

    session.apply_placement(P0, TRUMP, Zone::Leader, false).unwrap();
    session.apply_placement(P1, ECONOMIST, Zone::Top, false).unwrap();
    session.apply_placement(P0, IVANKA, Zone::Top, false).unwrap();

    let entries: Vec<_> = session.log().entries().collect();
    let sequences: Vec<u64> = entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![0, 1, 2]);
    assert!(matches!(entries[0].action, SequenceAction::PlayLeader));
    assert!(matches!(
        entries[1].action,
        SequenceAction::PlayCard { zone: Zone::Top }
    ));
    assert_eq!(entries[1].owner, P1);

    let p0 = session.stats(P0);
    assert_eq!(p0.cards_played, 2);
    assert_eq!(p0.leader_plays, 1);
    assert_eq!(p0.card_plays, 1);

    let p1 = session.stats(P1);
    assert_eq!(p1.cards_played, 1);
    assert_eq!(p1.leader_plays, 0);
    assert_eq!(p1.card_plays, 1);
}

#[test]
fn test_arena_games_share_nothing_but_the_catalog() {
    let arena = GameArena::new(catalog());
    let g1 = arena.create_game(2);
    let g2 = arena.create_game(2);

    arena
        .with_session(g1, |session| {
            session.add_to_hand(P0, TRUMP);
            session.add_to_hand(P0, IVANKA);
            session.apply_placement(P0, TRUMP, Zone::Leader, false)?;
            session.apply_placement(P0, IVANKA, Zone::Top, false)?;
            Ok(())
        })
        .unwrap();

    let s1 = arena.snapshot(g1).unwrap();
    let s2 = arena.snapshot(g2).unwrap();
    assert_eq!(s1.log.len(), 2);
    assert_eq!(s2.log.len(), 0);
    assert!(s2.computed.player_powers[&P0].is_empty());
}

#[test]
fn test_arena_selection_reads_come_from_published_snapshot() {
    let arena = GameArena::new(catalog());
    let g = arena.create_game(2);

    let id = arena
        .with_session(g, |session| {
            session.add_to_hand(P0, SCOUT);
            session.set_deck(P0, vec![IVANKA, ECONOMIST]);
            let outcome = session.apply_placement(P0, SCOUT, Zone::Help, false)?;
            Ok(outcome.pending_selections[0])
        })
        .unwrap();

    let before = arena.snapshot(g).unwrap();
    let pending = arena.pending_selection(g, id).unwrap().unwrap();
    assert_eq!(pending.candidates, vec![IVANKA, ECONOMIST]);

    // The read served the published snapshot and did not republish it
    let after = arena.snapshot(g).unwrap();
    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn test_save_restore_preserves_pending_selection() {
    let mut session = session();
    session.add_to_hand(P0, SCOUT);
    session.set_deck(P0, vec![IVANKA, ECONOMIST]);

    let outcome = session.apply_placement(P0, SCOUT, Zone::Help, false).unwrap();
    let id = outcome.pending_selections[0];

    let saved = session.save();
    let json = serde_json::to_string(&saved).unwrap();
    let mut restored = GameSession::restore(catalog(), serde_json::from_str(&json).unwrap());

    assert!(restored.pending_selection(id).is_some());
    restored.resolve_selection(id, &[IVANKA, ECONOMIST]).unwrap();
    assert!(restored.board().hand(P0).contains(&IVANKA));
}

use crate::battle::engine::resolve_turn;
use crate::battle::state::{
    BattleAction, BattleEvent, BattleOutcome, TurnRng, OPPONENT_SIDE, PLAYER_SIDE,
};
use crate::battle::tests::common::{wild_battle, TestMonsterBuilder};

#[test]
fn test_successful_catch_moves_monster_and_ends_battle() {
    let player = TestMonsterBuilder::new("PLUMETTE", 20).build();
    // Wild monster on its last sliver of health: near-certain catch.
    let wild = TestMonsterBuilder::new("LARVEA", 6).with_health(1).build();
    let mut state = wild_battle(vec![player], wild);

    state.queue_action(PLAYER_SIDE, BattleAction::Catch).unwrap();
    state
        .queue_action(OPPONENT_SIDE, BattleAction::Defend)
        .unwrap();
    // Roll of 1 lands inside any reasonable chance.
    let bus = resolve_turn(&mut state, &mut TurnRng::new_for_test(vec![1]));

    assert!(bus
        .events()
        .iter()
        .any(|e| matches!(e, BattleEvent::CatchSucceeded { .. })));
    assert_eq!(state.outcome(), Some(BattleOutcome::Caught));

    // The wild roster emptied and the player roster gained the monster.
    assert!(state.sides[OPPONENT_SIDE].roster.iter().all(|s| s.is_none()));
    let caught = state.sides[PLAYER_SIDE].roster[1]
        .as_ref()
        .expect("caught monster stored in the first free slot");
    assert_eq!(caught.species, "LARVEA");
}

#[test]
fn test_failed_catch_wastes_the_turn() {
    let player = TestMonsterBuilder::new("PLUMETTE", 20).build();
    let wild = TestMonsterBuilder::new("CLEAF", 10).build();
    let mut state = wild_battle(vec![player], wild);
    let player_health = state.sides[PLAYER_SIDE].active().unwrap().health;

    state.queue_action(PLAYER_SIDE, BattleAction::Catch).unwrap();
    state
        .queue_action(OPPONENT_SIDE, BattleAction::Attack {
            attack: "SCRATCH".to_string(),
        })
        .unwrap();
    // Roll of 100 misses any sub-certain chance.
    let bus = resolve_turn(&mut state, &mut TurnRng::new_for_test(vec![100]));

    assert!(bus
        .events()
        .iter()
        .any(|e| matches!(e, BattleEvent::CatchFailed { .. })));
    assert_eq!(state.outcome(), None);
    // The opponent still got its attack in; only the player's turn burned.
    assert!(state.sides[PLAYER_SIDE].active().unwrap().health < player_health);
    // The wild monster is untouched and still in place.
    assert!(state.sides[OPPONENT_SIDE].active().is_some());
}

#[test]
fn test_catch_chance_reported_higher_at_lower_health() {
    let chance_at = |health: u16| -> f32 {
        let player = TestMonsterBuilder::new("PLUMETTE", 20).build();
        let wild = TestMonsterBuilder::new("CLEAF", 10).with_health(health).build();
        let mut state = wild_battle(vec![player], wild);

        state.queue_action(PLAYER_SIDE, BattleAction::Catch).unwrap();
        state
            .queue_action(OPPONENT_SIDE, BattleAction::Defend)
            .unwrap();
        let bus = resolve_turn(&mut state, &mut TurnRng::new_for_test(vec![100]));

        bus.events()
            .iter()
            .find_map(|e| match e {
                BattleEvent::CatchAttempted { chance, .. } => Some(*chance),
                _ => None,
            })
            .expect("catch attempt reported")
    };

    // CLEAF at level 10 has 120 max health; 10% vs 90%.
    let low = chance_at(12);
    let high = chance_at(108);
    assert!(low > high, "low-health catch should be likelier: {} vs {}", low, high);
}

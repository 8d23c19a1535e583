use crate::attacks::get_attack_data;
use crate::battle::catch::{calculate_catch_chance, roll_catch_success};
use crate::battle::state::{
    ActionFailureReason, BattleAction, BattleEvent, BattleOutcome, BattlePhase, BattleState,
    EventBus, TurnRng, OPPONENT_SIDE, PLAYER_SIDE,
};
use crate::species::{get_species_data, Element};
use tracing::debug;

/// Resolution order for the queued actions: descending active speed, ties
/// broken in favor of the player side. Deterministic by construction.
fn action_order(state: &BattleState) -> [usize; 2] {
    let player_speed = state.sides[PLAYER_SIDE]
        .active()
        .map_or(0, |m| m.stats.speed);
    let opponent_speed = state.sides[OPPONENT_SIDE]
        .active()
        .map_or(0, |m| m.stats.speed);

    if opponent_speed > player_speed {
        [OPPONENT_SIDE, PLAYER_SIDE]
    } else {
        [PLAYER_SIDE, OPPONENT_SIDE]
    }
}

/// Damage dealt by one attack: attack stat scaled by attack power against
/// the defender's defense, times the element multiplier, halved while the
/// defender is defending. Never less than 1.
fn calculate_damage(
    attack_stat: u16,
    power: u16,
    defense_stat: u16,
    multiplier: f32,
    defending: bool,
) -> u16 {
    let base = attack_stat as u32 * power as u32 / defense_stat.max(1) as u32;
    let defend_factor = if defending { 0.5 } else { 1.0 };
    let scaled = (base as f32 * multiplier * defend_factor).round() as u32;
    scaled.clamp(1, u16::MAX as u32) as u16
}

fn finish(state: &mut BattleState, bus: &mut EventBus, outcome: BattleOutcome) {
    state.phase = BattlePhase::Finished(outcome);
    bus.push(BattleEvent::BattleEnded { outcome });
}

/// Main entry point for turn resolution. Consumes both queued actions in
/// speed order and returns every event that occurred. The phase moves back
/// to `ChoosingActions` unless a terminal outcome was reached.
pub fn resolve_turn(state: &mut BattleState, rng: &mut TurnRng) -> EventBus {
    let mut bus = EventBus::new();
    if !state.ready_for_turn_resolution() {
        return bus;
    }

    state.phase = BattlePhase::ResolvingTurn;
    bus.push(BattleEvent::TurnStarted {
        turn_number: state.turn_number,
    });

    for side in action_order(state) {
        if !matches!(state.phase, BattlePhase::ResolvingTurn) {
            break;
        }
        if let Some(action) = state.queued[side].take() {
            debug!(side, ?action, "resolving action");
            execute_action(side, action, state, &mut bus, rng);
        }
    }

    state.queued = [None, None];
    state.sides[PLAYER_SIDE].defending = false;
    state.sides[OPPONENT_SIDE].defending = false;

    if matches!(state.phase, BattlePhase::ResolvingTurn) {
        state.turn_number += 1;
        state.phase = BattlePhase::ChoosingActions;
    }

    bus
}

fn execute_action(
    side: usize,
    action: BattleAction,
    state: &mut BattleState,
    bus: &mut EventBus,
    rng: &mut TurnRng,
) {
    match action {
        BattleAction::Attack { attack } => execute_attack(side, &attack, state, bus),
        BattleAction::Defend => execute_defend(side, state, bus),
        BattleAction::Switch { slot } => execute_switch(side, slot, state, bus),
        BattleAction::Catch => execute_catch(side, state, bus, rng),
        BattleAction::Flee => {
            bus.push(BattleEvent::FledBattle);
            finish(state, bus, BattleOutcome::Fled);
        }
    }
}

fn execute_attack(side: usize, attack: &str, state: &mut BattleState, bus: &mut EventBus) {
    let defender_side = 1 - side;

    // A monster that fainted earlier in the turn loses its action.
    if state.sides[side].active().is_none_or(|m| m.is_fainted()) {
        bus.push(BattleEvent::ActionFailed {
            reason: ActionFailureReason::MonsterFainted,
        });
        return;
    }
    if state.sides[defender_side]
        .active()
        .is_none_or(|m| m.is_fainted())
    {
        bus.push(BattleEvent::ActionFailed {
            reason: ActionFailureReason::NoTarget,
        });
        return;
    }

    let attack_data =
        get_attack_data(attack).expect("Attack data should exist for a queued attack");

    let (attacker_name, attack_stat) = {
        let attacker = state.sides[side]
            .active_mut()
            .expect("Attacker checked above");
        if !attacker.spend_energy(attack_data.cost) {
            bus.push(BattleEvent::ActionFailed {
                reason: ActionFailureReason::NotEnoughEnergy {
                    attack: attack.to_string(),
                },
            });
            return;
        }
        (attacker.name.clone(), attacker.stats.attack)
    };

    bus.push(BattleEvent::AttackUsed {
        side,
        monster: attacker_name,
        attack: attack.to_string(),
    });

    let defending = state.sides[defender_side].defending;
    let defender = state.sides[defender_side]
        .active_mut()
        .expect("Defender checked above");
    let defender_element = get_species_data(&defender.species)
        .map(|s| s.element)
        .unwrap_or(Element::Normal);
    let multiplier = attack_data.element.effectiveness_against(defender_element);

    let damage = calculate_damage(
        attack_stat,
        attack_data.power,
        defender.stats.defense,
        multiplier,
        defending,
    );

    if multiplier != 1.0 {
        bus.push(BattleEvent::AttackEffectiveness { multiplier });
    }

    defender.take_damage(damage);
    bus.push(BattleEvent::DamageDealt {
        target: defender.name.clone(),
        damage,
        remaining_health: defender.health,
    });

    if defender.is_fainted() {
        let fainted_name = defender.name.clone();
        bus.push(BattleEvent::MonsterFainted {
            side: defender_side,
            monster: fainted_name,
        });

        if state.sides[defender_side].is_defeated() {
            bus.push(BattleEvent::SideDefeated {
                side: defender_side,
            });
            let outcome = if defender_side == OPPONENT_SIDE {
                BattleOutcome::Victory
            } else {
                BattleOutcome::Defeat
            };
            finish(state, bus, outcome);
        }
    }
}

fn execute_defend(side: usize, state: &mut BattleState, bus: &mut EventBus) {
    let Some(monster) = state.sides[side].active_mut() else {
        bus.push(BattleEvent::ActionFailed {
            reason: ActionFailureReason::MonsterFainted,
        });
        return;
    };
    if monster.is_fainted() {
        bus.push(BattleEvent::ActionFailed {
            reason: ActionFailureReason::MonsterFainted,
        });
        return;
    }

    let name = monster.name.clone();
    // Bracing also steadies the monster: a quarter of its energy pool comes
    // back, so a battle can never stall with both sides too drained to act.
    let restored = (monster.stats.max_energy / 4).max(1);
    monster.energy = monster
        .energy
        .saturating_add(restored)
        .min(monster.stats.max_energy);

    state.sides[side].defending = true;
    bus.push(BattleEvent::DefendRaised {
        side,
        monster: name,
    });
}

fn execute_switch(side: usize, slot: usize, state: &mut BattleState, bus: &mut EventBus) {
    let battle_side = &state.sides[side];
    let target_ok = battle_side
        .roster
        .get(slot)
        .and_then(|s| s.as_ref())
        .is_some_and(|m| !m.is_fainted());
    if !target_ok {
        bus.push(BattleEvent::ActionFailed {
            reason: ActionFailureReason::MonsterFainted,
        });
        return;
    }

    let old_monster = battle_side
        .active()
        .map(|m| m.name.clone())
        .unwrap_or_default();
    let battle_side = &mut state.sides[side];
    battle_side.active_index = slot;
    battle_side.defending = false;
    let new_monster = battle_side
        .active()
        .map(|m| m.name.clone())
        .unwrap_or_default();

    bus.push(BattleEvent::MonsterSwitched {
        side,
        old_monster,
        new_monster,
    });
}

fn execute_catch(side: usize, state: &mut BattleState, bus: &mut EventBus, rng: &mut TurnRng) {
    // Only the player throws; validation rejects catch in trainer battles.
    if side != PLAYER_SIDE {
        return;
    }

    let Some(target) = state.sides[OPPONENT_SIDE].active() else {
        bus.push(BattleEvent::ActionFailed {
            reason: ActionFailureReason::NoTarget,
        });
        return;
    };
    if target.is_fainted() {
        bus.push(BattleEvent::ActionFailed {
            reason: ActionFailureReason::NoTarget,
        });
        return;
    }

    let catch_rate = get_species_data(&target.species)
        .map(|s| s.catch_rate)
        .expect("Species data must exist for the wild monster");
    let chance = calculate_catch_chance(target, catch_rate);
    let target_name = target.name.clone();

    bus.push(BattleEvent::CatchAttempted {
        target: target_name.clone(),
        chance,
    });

    if roll_catch_success(chance, rng) {
        let active_index = state.sides[OPPONENT_SIDE].active_index;
        let caught = state.sides[OPPONENT_SIDE].roster[active_index]
            .take()
            .expect("Catch target checked above");

        // A full player roster still counts as a catch; the monster is
        // simply not stored (box storage is out of scope).
        if let Some(free_slot) = state.sides[PLAYER_SIDE].first_free_slot() {
            state.sides[PLAYER_SIDE].roster[free_slot] = Some(caught);
        }

        bus.push(BattleEvent::CatchSucceeded {
            target: target_name,
        });
        finish(state, bus, BattleOutcome::Caught);
    } else {
        // A failed throw just wastes the turn.
        bus.push(BattleEvent::CatchFailed {
            target: target_name,
        });
    }
}

use crate::attacks::get_attack_data;
use crate::battle::state::{BattleAction, BattleState, OPPONENT_SIDE};

/// Decide the opponent's action for this turn. Deterministic on purpose so
/// battles replay identically from the same state: the strongest affordable
/// attack wins, first listed breaks ties; with no affordable attack the
/// monster defends; a fainted active monster switches to the first healthy
/// slot.
pub fn choose_opponent_action(state: &BattleState) -> BattleAction {
    let side = &state.sides[OPPONENT_SIDE];

    match side.active() {
        Some(monster) if !monster.is_fainted() => {
            let mut best: Option<(String, u16)> = None;
            for attack in &monster.attacks {
                if let Ok(data) = get_attack_data(attack) {
                    let affordable = monster.energy >= data.cost;
                    let stronger = best.as_ref().is_none_or(|(_, power)| data.power > *power);
                    if affordable && stronger {
                        best = Some((attack.clone(), data.power));
                    }
                }
            }
            match best {
                Some((attack, _)) => BattleAction::Attack { attack },
                None => BattleAction::Defend,
            }
        }
        _ => match side.first_healthy_slot() {
            Some(slot) => BattleAction::Switch { slot },
            // No healthy monster left; the engine has already ended or will
            // end the battle, so the choice is moot.
            None => BattleAction::Defend,
        },
    }
}

use std::path::Path;
use tracing_subscriber::EnvFilter;
use wildgrove::battle::state::PLAYER_SIDE;
use wildgrove::{BattleAction, Game, GameEvent, InputState, SceneMode};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let data_path = Path::new("data");
    let mut game = match Game::new(data_path) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Failed to start game: {}", e);
            std::process::exit(1);
        }
    };

    println!("=== Wildgrove demo ===");
    print_roster(&game);

    // Walk south from the spawn into the tall grass, then stand still and
    // let the encounter timer decide when something jumps out.
    println!("\nWalking into the grass...");
    let walk = InputState {
        down: true,
        ..Default::default()
    };
    let idle = InputState::default();
    let dt = 1.0 / 60.0;
    let mut battle_started = false;

    for _ in 0..3000 {
        let input = if game.world().patch_under_player().is_some() {
            idle
        } else {
            walk
        };
        match game.update(dt, &input) {
            Ok(events) => print_events(&events),
            Err(e) => {
                eprintln!("Game error: {}", e);
                std::process::exit(1);
            }
        }
        if game.mode() == SceneMode::Battle {
            battle_started = true;
            break;
        }
    }

    if !battle_started {
        println!("No encounter fired; check the demo map's Monsters layer.");
        return;
    }

    let opponent = game
        .battle()
        .and_then(|b| b.sides[1].active())
        .map(|m| format!("{} (lv {})", m.name, m.level))
        .unwrap_or_default();
    println!("\nA wild {} appeared!", opponent);

    // Fight with whatever the active monster can afford, one turn per tick.
    let mut finished = false;
    for _ in 0..2000 {
        queue_demo_action(&mut game);
        match game.update(dt, &idle) {
            Ok(events) => {
                for event in &events {
                    if let GameEvent::BattleCompleted { outcome, .. } = event {
                        println!("\nBattle over: {:?}", outcome);
                        finished = true;
                    }
                }
                print_events(&events);
            }
            Err(e) => {
                eprintln!("Game error: {}", e);
                std::process::exit(1);
            }
        }
        if finished {
            break;
        }
    }

    println!("\nBattle log:");
    for event in game.battle_log() {
        println!("  {:?}", event);
    }

    // Let the fade clear before reading the end state.
    for _ in 0..120 {
        let _ = game.update(dt, &idle);
    }

    println!("\nAfter the battle:");
    print_roster(&game);

    match ron::ser::to_string_pretty(&game.save_state(), Default::default()) {
        Ok(save) => println!("\nSave state:\n{}", save),
        Err(e) => eprintln!("Could not serialize save state: {}", e),
    }
}

fn queue_demo_action(game: &mut Game) {
    let Some(battle) = game.battle() else { return };
    if battle.outcome().is_some() || battle.queued[PLAYER_SIDE].is_some() {
        return;
    }

    let action = match battle.sides[PLAYER_SIDE].active() {
        Some(monster) if !monster.is_fainted() => {
            let affordable = monster.attacks.iter().find(|attack| {
                wildgrove::get_attack_data(attack)
                    .map(|data| monster.energy >= data.cost)
                    .unwrap_or(false)
            });
            match affordable {
                Some(attack) => BattleAction::Attack {
                    attack: attack.clone(),
                },
                None => BattleAction::Defend,
            }
        }
        _ => match battle.sides[PLAYER_SIDE].first_healthy_slot() {
            Some(slot) => BattleAction::Switch { slot },
            None => BattleAction::Defend,
        },
    };

    if let Err(e) = game.queue_player_battle_action(action) {
        println!("  (action rejected: {})", e);
    }
}

fn print_events(events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Audio(cue) => println!("  [audio] {:?}", cue),
            other => println!("  {:?}", other),
        }
    }
}

fn print_roster(game: &Game) {
    println!("Roster:");
    for (slot, monster) in game.player_roster().iter().enumerate() {
        match monster {
            Some(m) => println!(
                "  slot {}: {} (lv {}, hp {}/{}, xp {})",
                slot, m.name, m.level, m.health, m.stats.max_health, m.xp
            ),
            None => println!("  slot {}: -", slot),
        }
    }
}

//! Top-level game value: owns the world, the scene director, the overlays,
//! and the player roster, and drives them all through one `update`/`draw`
//! pair per tick. Completion signaling is expressed as `GameEvent` values
//! returned from `update`; the host consumes them however it likes.

use crate::battle::ai::choose_opponent_action;
use crate::battle::engine::resolve_turn;
use crate::battle::rewards::{award_victory_experience, pending_evolutions};
use crate::battle::state::{
    BattleAction, BattleEvent, BattleOutcome, BattleState, BattleSide, TurnRng, OPPONENT_SIDE,
    PLAYER_SIDE, ROSTER_SIZE,
};
use crate::dialog::{DialogOutcome, DialogSession};
use crate::encounter::EncounterTimer;
use crate::errors::{ActionError, GameResult, TransitionError};
use crate::evolution::{EvolutionOutcome, EvolutionOverlay};
use crate::map::MapSource;
use crate::monster::Monster;
use crate::render::{compose_world_frame, Camera, DrawCommand, Frame};
use crate::scene::{BattleKickoff, SceneDirector, SceneMode, TransitionTarget};
use crate::species::get_species_data;
use crate::trainer::{load_trainer_data, TrainerData};
use crate::world::entity::EntityKind;
use crate::world::World;
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Directional/confirm input for one tick. `confirm` is edge-triggered: true
/// only on the tick the key went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub confirm: bool,
}

impl InputState {
    /// Raw input vector. Diagonals are deliberately not normalized.
    pub fn direction(&self) -> Vec2 {
        let mut direction = Vec2::ZERO;
        if self.up {
            direction.y -= 1.0;
        }
        if self.down {
            direction.y += 1.0;
        }
        if self.left {
            direction.x -= 1.0;
        }
        if self.right {
            direction.x += 1.0;
        }
        direction
    }
}

/// Opaque audio handle; the host maps names to actual playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioCue {
    PlayMusic(String),
    StopMusic,
}

/// Everything `update` reports back to the embedding application. Each
/// completion event fires exactly once per corresponding session.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    DialogCompleted {
        trainer_id: String,
    },
    BattleCompleted {
        outcome: BattleOutcome,
        /// Trainer beaten (and marked defeated); None for wild encounters
        trainer_id: Option<String>,
    },
    EvolutionCompleted {
        slot: usize,
        species: String,
    },
    Audio(AudioCue),
}

/// Runtime state the host persists between sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    /// Sparse roster: (slot, monster) pairs, gaps preserved
    pub roster: Vec<(usize, Monster)>,
    pub map_id: String,
    pub spawn: String,
}

pub struct Game {
    maps: HashMap<String, MapSource>,
    trainers: HashMap<String, TrainerData>,
    world: World,
    director: SceneDirector,
    encounter_timer: EncounterTimer,
    player_roster: [Option<Monster>; ROSTER_SIZE],
    battle: Option<BattleState>,
    dialog: Option<DialogSession>,
    evolution: Option<EvolutionOverlay>,
    /// Evolutions queued after a battle, consumed one overlay at a time
    evolution_queue: Vec<(usize, String, String)>,
    current_spawn: String,
    /// Outcomes stashed until the per-tick trigger check consumes them
    pending_dialog_outcome: Option<DialogOutcome>,
    pending_evolution_outcome: Option<EvolutionOutcome>,
    /// Rolling log of battle/progression events from the current session
    battle_log: Vec<BattleEvent>,
}

impl Game {
    /// Load all data tables and maps and spawn into the starting map. Any
    /// missing file, layer, or property fails here, before the first tick.
    pub fn new(data_path: &Path) -> GameResult<Game> {
        crate::species::initialize_species_data(data_path)?;
        crate::attacks::initialize_attack_data(data_path)?;
        let trainers = load_trainer_data(data_path)?;
        let maps = MapSource::load_all(data_path)?;

        let start_map = "world";
        let start_spawn = "house";
        let source = maps
            .get(start_map)
            .ok_or_else(|| TransitionError::UnknownMap(start_map.to_string()))?;
        let world = World::from_map(start_map, source, start_spawn, &trainers)?;

        // Starter roster. Slot 3 is intentionally empty; slots are stable
        // and sparse throughout.
        let mut player_roster = [const { None }; ROSTER_SIZE];
        player_roster[0] = Some(Monster::from_registry("PLUMETTE", 15)?);
        player_roster[1] = Some(Monster::from_registry("SPARCHU", 13)?);
        player_roster[2] = Some(Monster::from_registry("FINSTA", 12)?);
        player_roster[4] = Some(Monster::from_registry("POUCHY", 10)?);

        info!(map = start_map, spawn = start_spawn, "game initialized");

        Ok(Game {
            maps,
            trainers,
            world,
            director: SceneDirector::new(),
            encounter_timer: EncounterTimer::new(),
            player_roster,
            battle: None,
            dialog: None,
            evolution: None,
            evolution_queue: Vec::new(),
            current_spawn: start_spawn.to_string(),
            pending_dialog_outcome: None,
            pending_evolution_outcome: None,
            battle_log: Vec::new(),
        })
    }

    pub fn mode(&self) -> SceneMode {
        self.director.mode()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn battle(&self) -> Option<&BattleState> {
        self.battle.as_ref()
    }

    pub fn dialog(&self) -> Option<&DialogSession> {
        self.dialog.as_ref()
    }

    pub fn player_roster(&self) -> &[Option<Monster>; ROSTER_SIZE] {
        &self.player_roster
    }

    pub fn trainers(&self) -> &HashMap<String, TrainerData> {
        &self.trainers
    }

    /// Battle and progression events accumulated since the last battle
    /// started.
    pub fn battle_log(&self) -> &[BattleEvent] {
        &self.battle_log
    }

    /// Queue the player's action for the current battle turn. Rejections
    /// are normal outcomes (e.g. a fainted active monster must switch).
    pub fn queue_player_battle_action(&mut self, action: BattleAction) -> Result<(), ActionError> {
        match &mut self.battle {
            Some(battle) => battle.queue_action(PLAYER_SIDE, action),
            None => Err(ActionError::BattleOver),
        }
    }

    /// Snapshot of the persistable runtime state.
    pub fn save_state(&self) -> SaveState {
        let roster = self
            .player_roster
            .iter()
            .enumerate()
            .filter_map(|(slot, monster)| monster.clone().map(|m| (slot, m)))
            .collect();
        SaveState {
            roster,
            map_id: self.world.map_id.clone(),
            spawn: self.current_spawn.clone(),
        }
    }

    /// One simulation tick. Order: timer countdown, input, transition
    /// trigger check, world update, encounter arming, overlay updates, tint
    /// update. Exactly one transition trigger may fire per tick.
    pub fn update(&mut self, dt: f32, input: &InputState) -> GameResult<Vec<GameEvent>> {
        let mut events = Vec::new();

        // Timer countdown first so a fire this tick is visible to the
        // trigger check below.
        let encounter_fired = self.encounter_timer.update(dt);

        self.handle_input(input);
        self.check_triggers(encounter_fired, &mut events);

        if self.director.mode() != SceneMode::Battle {
            self.world.update(dt);
        }

        self.update_encounter_arming();
        self.update_battle_overlay();
        self.update_evolution_overlay(dt)?;

        if let Some(target) = self.director.update(dt) {
            self.apply_transition(target, &mut events)?;
        }

        Ok(events)
    }

    /// Assemble this tick's frame. Pure; called once per tick regardless of
    /// mode.
    pub fn draw(&self) -> Frame {
        let mut frame = match self.director.mode() {
            SceneMode::Battle => {
                let mut frame = Frame::default();
                if let Some(battle) = &self.battle {
                    let player = battle.sides[PLAYER_SIDE].active();
                    let opponent = battle.sides[OPPONENT_SIDE].active();
                    frame.push(DrawCommand::BattleView {
                        player_species: player.map(|m| m.species.clone()).unwrap_or_default(),
                        player_health: player.map(|m| m.health_fraction()).unwrap_or(0.0),
                        opponent_species: opponent.map(|m| m.species.clone()).unwrap_or_default(),
                        opponent_health: opponent.map(|m| m.health_fraction()).unwrap_or(0.0),
                    });
                }
                frame
            }
            _ => {
                let camera = Camera::new(self.world.player.center());
                let mut frame = compose_world_frame(&self.world, &camera);
                if let Some(dialog) = &self.dialog {
                    if let Some(line) = dialog.current_line() {
                        frame.push(DrawCommand::DialogBox {
                            line: line.to_string(),
                        });
                    }
                }
                if let Some(overlay) = &self.evolution {
                    frame.push(DrawCommand::EvolutionFlash {
                        species: overlay.from_species.clone(),
                        progress: overlay.progress(),
                    });
                }
                frame
            }
        };

        let alpha = self.director.tint_alpha();
        if alpha > 0 {
            frame.push(DrawCommand::Tint { alpha });
        }
        frame
    }

    // --- Per-tick stages ---

    fn handle_input(&mut self, input: &InputState) {
        if self.director.input_blocked() {
            self.world.player.direction = Vec2::ZERO;

            // The dialog overlay is the only blocked mode that still reads
            // confirm presses.
            if input.confirm && self.director.mode() == SceneMode::Dialog {
                if let Some(dialog) = &mut self.dialog {
                    if let Some(outcome) = dialog.advance() {
                        self.pending_dialog_outcome = Some(outcome);
                    }
                }
            }
            return;
        }

        self.world.player.direction = input.direction();

        if input.confirm {
            self.try_start_dialog();
        }
    }

    fn try_start_dialog(&mut self) {
        let Some(index) = self.world.reachable_character() else {
            return;
        };
        let character = &mut self.world.characters[index];
        let EntityKind::Character {
            trainer_id,
            can_rotate,
            ..
        } = &mut character.kind
        else {
            return;
        };
        let trainer_id = trainer_id.clone();
        let Some(trainer) = self.trainers.get(&trainer_id) else {
            debug!(%trainer_id, "character has no trainer data; staying silent");
            return;
        };

        // Speakers lock facing each other for the conversation.
        *can_rotate = false;
        let player_center = self.world.player.center();
        character.face_point(player_center);
        self.world.player.face_point(character.center());
        self.world.player.block();

        let lines = trainer.dialog_lines().to_vec();
        self.dialog = Some(DialogSession::new(index, &trainer_id, lines));
        self.director.set_mode(SceneMode::Dialog);
        info!(%trainer_id, "dialog started");
    }

    /// Observe transition triggers in priority order; the first match wins
    /// and at most one fires per tick.
    fn check_triggers(&mut self, encounter_fired: bool, events: &mut Vec<GameEvent>) {
        if self.director.is_transitioning() {
            return;
        }

        // 1. Map-edge transition zone while roaming.
        if self.director.mode() == SceneMode::World && !self.world.player.blocked {
            if let Some(zone) = self.world.transition_under_player() {
                let target = TransitionTarget::Map {
                    map_id: zone.target_map.clone(),
                    spawn: zone.target_spawn.clone(),
                };
                self.director.request_transition(target);
                return;
            }
        }

        // 2. Battle outcome.
        if let Some(battle) = &self.battle {
            if battle.outcome().is_some() {
                self.director.request_transition(TransitionTarget::ReturnToWorld);
                return;
            }
        }

        // 3. Dialog outcome.
        if let Some(outcome) = self.pending_dialog_outcome.take() {
            self.finish_dialog(outcome, events);
            return;
        }

        // 4. Evolution outcome.
        if let Some(outcome) = self.pending_evolution_outcome.take() {
            self.finish_evolution(outcome, events);
            return;
        }

        // 5. Encounter timer fire while standing in a monster patch.
        if encounter_fired && self.director.mode() == SceneMode::World && self.player_can_battle() {
            if let Some(patch) = self.world.patch_under_player() {
                if !patch.species.is_empty() {
                    let pick = rand::rng().random_range(0..patch.species.len());
                    let kickoff = BattleKickoff {
                        opponents: vec![(0, patch.species[pick].clone(), patch.level)],
                        trainer_id: None,
                    };
                    info!(biome = %patch.biome, species = %kickoff.opponents[0].1, "wild encounter");
                    self.director
                        .request_transition(TransitionTarget::Battle(kickoff));
                }
            }
        }
    }

    fn finish_dialog(&mut self, outcome: DialogOutcome, events: &mut Vec<GameEvent>) {
        self.dialog = None;
        self.director.set_mode(SceneMode::World);

        // Re-enable idle rotation for the character.
        if let Some(character) = self.world.characters.get_mut(outcome.character_index) {
            if let EntityKind::Character { can_rotate, .. } = &mut character.kind {
                *can_rotate = true;
            }
        }

        events.push(GameEvent::DialogCompleted {
            trainer_id: outcome.trainer_id.clone(),
        });

        // Care-center staff heal the whole roster on the way out.
        if self
            .trainers
            .get(&outcome.trainer_id)
            .is_some_and(|t| t.heals)
        {
            for monster in self.player_roster.iter_mut().flatten() {
                monster.restore();
            }
            info!(trainer_id = %outcome.trainer_id, "roster restored");
        }

        // An undefeated trainer challenges the player as the dialog closes;
        // the player stays blocked through the battle transition. A roster
        // with no healthy monster cannot be challenged.
        let wants_battle = self
            .trainers
            .get(&outcome.trainer_id)
            .is_some_and(|t| t.wants_battle())
            && self.player_can_battle();
        if wants_battle {
            let trainer = &self.trainers[&outcome.trainer_id];
            let mut opponents: Vec<(usize, String, u8)> = trainer
                .monsters
                .iter()
                .map(|(&slot, (species, level))| (slot as usize, species.clone(), *level))
                .collect();
            opponents.sort_by_key(|(slot, _, _)| *slot);
            let kickoff = BattleKickoff {
                opponents,
                trainer_id: Some(outcome.trainer_id.clone()),
            };
            self.director
                .request_transition(TransitionTarget::Battle(kickoff));
        } else {
            self.world.player.unblock();
        }
    }

    fn finish_evolution(&mut self, outcome: EvolutionOutcome, events: &mut Vec<GameEvent>) {
        self.evolution = None;
        events.push(GameEvent::EvolutionCompleted {
            slot: outcome.slot,
            species: outcome.into_species,
        });

        // More monsters may be waiting their turn.
        if let Some((slot, from, into)) = self.evolution_queue.first().cloned() {
            self.evolution_queue.remove(0);
            self.evolution = Some(EvolutionOverlay::new(slot, &from, &into));
        } else {
            self.director.set_mode(SceneMode::World);
            self.world.player.unblock();
        }
    }

    /// A battle can only start while at least one roster monster stands.
    fn player_can_battle(&self) -> bool {
        self.player_roster
            .iter()
            .flatten()
            .any(|monster| !monster.is_fainted())
    }

    /// Arm the encounter timer while the player stands in a patch; leaving
    /// the patch disarms it. Re-arming while armed is a no-op by design.
    fn update_encounter_arming(&mut self) {
        let in_patch = self.director.mode() == SceneMode::World
            && !self.world.player.blocked
            && self.world.patch_under_player().is_some();
        if in_patch {
            self.encounter_timer.activate();
        } else {
            self.encounter_timer.disarm();
        }
    }

    /// Drive the battle session: fill in the opponent's action once the
    /// player has committed, then resolve the turn. At most one turn
    /// resolves per tick.
    fn update_battle_overlay(&mut self) {
        let Some(battle) = &mut self.battle else {
            return;
        };
        if battle.outcome().is_some() {
            return;
        }

        if battle.queued[PLAYER_SIDE].is_some() && battle.queued[OPPONENT_SIDE].is_none() {
            let action = choose_opponent_action(battle);
            // The AI only proposes legal actions; a rejection leaves the
            // opponent idle this turn, which resolves as a no-op.
            let _ = battle.queue_action(OPPONENT_SIDE, action);
        }

        if battle.ready_for_turn_resolution() {
            let mut rng = TurnRng::new_random();
            let bus = resolve_turn(battle, &mut rng);
            for event in bus.events() {
                debug!(?event, "battle event");
            }
            self.battle_log.extend(bus.into_events());
        }
    }

    /// Advance the evolution animation; at completion the species swap is
    /// applied immediately and the outcome stashed for the trigger check.
    fn update_evolution_overlay(&mut self, dt: f32) -> GameResult<()> {
        let Some(overlay) = &mut self.evolution else {
            return Ok(());
        };
        if let Some(outcome) = overlay.update(dt) {
            self.apply_evolution(&outcome)?;
            self.pending_evolution_outcome = Some(outcome);
        }
        Ok(())
    }

    // --- Transition application ---

    /// Apply a transition target at the fade's full-opacity point. The swap
    /// is atomic: by the time the next frame is drawn the new scene is
    /// fully in place.
    fn apply_transition(
        &mut self,
        target: TransitionTarget,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        match target {
            TransitionTarget::Map { map_id, spawn } => {
                let source = self
                    .maps
                    .get(&map_id)
                    .ok_or_else(|| TransitionError::UnknownMap(map_id.clone()))?;
                // Old world (and all its entities) is dropped wholesale.
                self.world = World::from_map(&map_id, source, &spawn, &self.trainers)?;
                self.current_spawn = spawn;
                info!(map = %map_id, "map swapped");
            }
            TransitionTarget::Battle(kickoff) => {
                let mut opponents = Vec::new();
                for (slot, species, level) in &kickoff.opponents {
                    opponents.push((*slot, Monster::from_registry(species, *level)?));
                }
                let player_side = BattleSide::from_slots(
                    self.player_roster
                        .iter()
                        .enumerate()
                        .filter_map(|(slot, m)| m.clone().map(|m| (slot, m)))
                        .collect(),
                    None,
                );
                let opponent_side = BattleSide::from_slots(opponents, kickoff.trainer_id.clone());
                let is_wild = kickoff.trainer_id.is_none();
                self.battle = Some(BattleState::new(player_side, opponent_side, is_wild));
                self.battle_log.clear();
                self.director.set_mode(SceneMode::Battle);
                events.push(GameEvent::Audio(AudioCue::StopMusic));
                events.push(GameEvent::Audio(AudioCue::PlayMusic("battle".to_string())));
                info!(wild = is_wild, "battle started");
            }
            TransitionTarget::ReturnToWorld => {
                if let Some(battle) = self.battle.take() {
                    self.teardown_battle(battle, events)?;
                }
                events.push(GameEvent::Audio(AudioCue::PlayMusic(
                    "overworld".to_string(),
                )));
            }
        }
        Ok(())
    }

    /// Post-battle bookkeeping: persist the roster, award experience, mark
    /// the trainer, and queue evolution overlays. Runs exactly once per
    /// session, at the return transition's swap point.
    fn teardown_battle(
        &mut self,
        battle: BattleState,
        events: &mut Vec<GameEvent>,
    ) -> GameResult<()> {
        let outcome = battle.outcome().unwrap_or(BattleOutcome::Fled);
        let trainer_id = battle.sides[OPPONENT_SIDE].trainer_id.clone();

        // Damage, energy spend, and catches persist on the roster.
        self.player_roster = battle.sides[PLAYER_SIDE].roster.clone();

        if outcome == BattleOutcome::Victory {
            let defeated_levels: Vec<u8> = battle.sides[OPPONENT_SIDE]
                .roster
                .iter()
                .flatten()
                .map(|m| m.level)
                .collect();
            let reward_events =
                award_victory_experience(&mut self.player_roster, &defeated_levels)?;
            for event in &reward_events {
                debug!(?event, "reward event");
            }
            self.battle_log.extend(reward_events);

            if let Some(id) = &trainer_id {
                if let Some(trainer) = self.trainers.get_mut(id) {
                    trainer.defeated = true;
                    info!(trainer_id = %id, "trainer defeated");
                }
            }

            // Evolution eligibility is evaluated once, here, never
            // mid-battle.
            self.evolution_queue = pending_evolutions(&self.player_roster)?;
        }

        events.push(GameEvent::BattleCompleted {
            outcome,
            trainer_id,
        });

        if let Some((slot, from, into)) = self.evolution_queue.first().cloned() {
            self.evolution_queue.remove(0);
            self.evolution = Some(EvolutionOverlay::new(slot, &from, &into));
            self.director.set_mode(SceneMode::Evolution);
            self.world.player.block();
        } else {
            self.director.set_mode(SceneMode::World);
            self.world.player.unblock();
        }
        Ok(())
    }

    /// Apply an evolution outcome to the roster: swap the species in place,
    /// preserving level.
    fn apply_evolution(&mut self, outcome: &EvolutionOutcome) -> GameResult<()> {
        if let Some(monster) = self
            .player_roster
            .get_mut(outcome.slot)
            .and_then(|slot| slot.as_mut())
        {
            let new_species = get_species_data(&outcome.into_species)?;
            monster.evolve_into(&outcome.into_species, &new_species);
            info!(slot = outcome.slot, species = %outcome.into_species, "monster evolved");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const DT: f32 = 1.0 / 60.0;

    fn data_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
    }

    fn new_game() -> Game {
        Game::new(&data_path()).expect("demo data should load")
    }

    #[test]
    fn test_initial_state_has_sparse_roster() {
        let game = new_game();
        assert_eq!(game.mode(), SceneMode::World);
        assert_eq!(game.world().map_id, "world");

        let roster = game.player_roster();
        assert!(roster[0].is_some());
        assert!(roster[3].is_none(), "slot 3 is intentionally empty");
        assert!(roster[4].is_some());
    }

    #[test]
    fn test_save_state_round_trips_through_ron() {
        let game = new_game();
        let save = game.save_state();

        let text = ron::ser::to_string(&save).expect("save state serializes");
        let back: SaveState = ron::from_str(&text).expect("save state parses");
        assert_eq!(save, back);
        assert_eq!(back.map_id, "world");
        assert_eq!(back.spawn, "house");
        // Sparse slots survive the round trip.
        assert!(back.roster.iter().any(|(slot, _)| *slot == 4));
        assert!(!back.roster.iter().any(|(slot, _)| *slot == 3));
    }

    #[test]
    fn test_wild_encounter_fires_and_flee_returns_to_world() {
        let mut game = new_game();
        let walk = InputState {
            down: true,
            ..Default::default()
        };
        let idle = InputState::default();

        // Walk into the patch, then stand still until the timer fires.
        let mut entered_battle = false;
        for _ in 0..2000 {
            let input = if game.world().patch_under_player().is_some() {
                idle
            } else {
                walk
            };
            game.update(DT, &input).expect("update");
            if game.mode() == SceneMode::Battle {
                entered_battle = true;
                break;
            }
        }
        assert!(entered_battle, "encounter should fire within a few seconds");

        let battle = game.battle().expect("battle installed");
        assert!(battle.is_wild);
        assert_eq!(battle.sides[OPPONENT_SIDE].active().expect("wild monster").level, 6);

        // Flee, then ride the fade back to the world.
        game.queue_player_battle_action(BattleAction::Flee)
            .expect("flee accepted in wild battle");
        let mut completed = None;
        for _ in 0..600 {
            let events = game.update(DT, &idle).expect("update");
            for event in events {
                if let GameEvent::BattleCompleted {
                    outcome,
                    trainer_id,
                } = event
                {
                    completed = Some((outcome, trainer_id));
                }
            }
            if completed.is_some() && !game.director.is_transitioning() {
                break;
            }
        }

        let (outcome, trainer_id) = completed.expect("battle completion reported");
        assert_eq!(outcome, BattleOutcome::Fled);
        assert_eq!(trainer_id, None);
        assert_eq!(game.mode(), SceneMode::World);
        assert!(!game.world().player.blocked);
        assert!(!game.director.input_blocked());
    }

    #[test]
    fn test_trainer_dialog_blocks_player_then_starts_battle() {
        let mut game = new_game();
        let left = InputState {
            left: true,
            ..Default::default()
        };
        let confirm = InputState {
            confirm: true,
            ..Default::default()
        };
        let idle = InputState::default();

        // Walk toward the ranger until the proximity check connects.
        let mut reachable = false;
        for _ in 0..600 {
            game.update(DT, &left).expect("update");
            if game.world().reachable_character().is_some() {
                reachable = true;
                break;
            }
        }
        assert!(reachable, "player should get in range of the ranger");

        game.update(DT, &confirm).expect("update");
        assert_eq!(game.mode(), SceneMode::Dialog);
        assert!(game.world().player.blocked);
        assert!(game.dialog().expect("dialog open").current_line().is_some());

        // Confirm through the lines; the undefeated ranger then challenges.
        let mut dialog_done = false;
        let mut saw_battle = false;
        for _ in 0..600 {
            let input = if game.mode() == SceneMode::Dialog {
                confirm
            } else {
                idle
            };
            let events = game.update(DT, &input).expect("update");
            if events
                .iter()
                .any(|e| matches!(e, GameEvent::DialogCompleted { .. }))
            {
                dialog_done = true;
            }
            if game.mode() == SceneMode::Battle {
                saw_battle = true;
                break;
            }
        }
        assert!(dialog_done, "dialog completion event fired");
        assert!(saw_battle, "trainer battle follows the dialog");

        // The ranger may look around again once the conversation is over.
        if let EntityKind::Character { can_rotate, .. } = &game.world().characters[0].kind {
            assert!(can_rotate);
        }

        let battle = game.battle().expect("battle installed");
        assert!(!battle.is_wild);
        // The ranger's sparse roster keeps its gap at slot 2.
        assert!(battle.sides[OPPONENT_SIDE].roster[0].is_some());
        assert!(battle.sides[OPPONENT_SIDE].roster[2].is_none());
        assert!(battle.sides[OPPONENT_SIDE].roster[3].is_some());

        // Catching a trainer's monster is refused outright.
        assert_eq!(
            game.queue_player_battle_action(BattleAction::Catch),
            Err(ActionError::CatchInTrainerBattle)
        );
    }

    fn finished_battle(
        game: &Game,
        opponent_seed: (&str, u8),
        trainer_id: Option<&str>,
        outcome: BattleOutcome,
    ) -> BattleState {
        let player_side = BattleSide::from_slots(
            game.player_roster
                .iter()
                .enumerate()
                .filter_map(|(slot, m)| m.clone().map(|m| (slot, m)))
                .collect(),
            None,
        );
        let mut opponent = Monster::from_registry(opponent_seed.0, opponent_seed.1)
            .expect("opponent species exists");
        opponent.take_damage(opponent.stats.max_health);
        let opponent_side = BattleSide::from_slots(
            vec![(0, opponent)],
            trainer_id.map(|id| id.to_string()),
        );
        let mut battle =
            BattleState::new(player_side, opponent_side, trainer_id.is_none());
        battle.phase = crate::battle::state::BattlePhase::Finished(outcome);
        battle
    }

    #[test]
    fn test_victory_teardown_marks_trainer_defeated() {
        let mut game = new_game();
        let battle = finished_battle(
            &game,
            ("CLEAF", 14),
            Some("ranger_maya"),
            BattleOutcome::Victory,
        );

        let mut events = Vec::new();
        game.teardown_battle(battle, &mut events).expect("teardown");

        assert!(game.trainers()["ranger_maya"].defeated);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::BattleCompleted {
                outcome: BattleOutcome::Victory,
                trainer_id: Some(id)
            } if id == "ranger_maya"
        )));
        assert!(!game.world().player.blocked);
        // Survivors took their experience home.
        assert!(game
            .battle_log()
            .iter()
            .any(|e| matches!(e, BattleEvent::ExperienceGained { .. })));
    }

    #[test]
    fn test_evolution_overlay_runs_after_victory() {
        let mut game = new_game();
        // A monster already at its evolution threshold.
        game.player_roster[0] =
            Some(Monster::from_registry("PLUMETTE", 30).expect("species exists"));
        let battle = finished_battle(&game, ("LARVEA", 4), None, BattleOutcome::Victory);

        let mut events = Vec::new();
        game.teardown_battle(battle, &mut events).expect("teardown");
        assert_eq!(game.mode(), SceneMode::Evolution);
        assert!(game.world().player.blocked);

        // Ride the overlay to completion.
        let idle = InputState::default();
        let mut completed = None;
        for _ in 0..400 {
            for event in game.update(DT, &idle).expect("update") {
                if let GameEvent::EvolutionCompleted { slot, species } = event {
                    completed = Some((slot, species));
                }
            }
            if completed.is_some() && game.mode() == SceneMode::World {
                break;
            }
        }

        let (slot, species) = completed.expect("evolution completion reported");
        assert_eq!(slot, 0);
        assert_eq!(species, "IVIERON");

        // Species swapped in place, level preserved, control returned.
        let evolved = game.player_roster()[0].as_ref().expect("slot occupied");
        assert_eq!(evolved.species, "IVIERON");
        assert_eq!(evolved.level, 30);
        assert!(!game.world().player.blocked);
        assert!(!game.director.input_blocked());
    }

    #[test]
    fn test_walking_through_gate_swaps_map() {
        let mut game = new_game();
        let up = InputState {
            up: true,
            ..Default::default()
        };
        let right = InputState {
            right: true,
            ..Default::default()
        };
        let idle = InputState::default();

        // Clear the collidable scenery row, then head for the east gate.
        for _ in 0..300 {
            game.update(DT, &up).expect("update");
            if game.world().player.center().y <= 256.0 {
                break;
            }
        }
        let mut swapped = false;
        for _ in 0..1000 {
            game.update(DT, &right).expect("update");
            if game.world().map_id == "hospital" {
                swapped = true;
                break;
            }
        }
        assert!(swapped, "transition zone should swap the map");
        assert_eq!(game.save_state().spawn, "entrance");

        // Let the untint finish; control returns to the world.
        for _ in 0..120 {
            game.update(DT, &idle).expect("update");
        }
        assert_eq!(game.mode(), SceneMode::World);
        assert!(!game.director.input_blocked());
    }
}

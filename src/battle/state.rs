use crate::attacks::get_attack_data;
use crate::errors::ActionError;
use crate::monster::Monster;
use serde::{Deserialize, Serialize};

pub const ROSTER_SIZE: usize = 6;
pub const PLAYER_SIDE: usize = 0;
pub const OPPONENT_SIDE: usize = 1;

/// Battle session state machine. `ChoosingActions` collects one action per
/// side; `ResolvingTurn` lives only inside `resolve_turn`; a terminal
/// outcome parks the session until the scene director tears it down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattlePhase {
    ChoosingActions,
    ResolvingTurn,
    Finished(BattleOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Fled,
    Caught,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleAction {
    /// Use the named attack against the opposing active monster
    Attack { attack: String },
    /// Halve incoming damage for the rest of this turn
    Defend,
    /// Swap the active monster; consumes the turn
    Switch { slot: usize },
    /// Throw a catch attempt at the wild monster
    Catch,
    /// Leave a wild battle
    Flee,
}

/// One side of a battle: a sparse roster plus per-turn flags. Slot indices
/// are stable; gaps stay gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSide {
    pub roster: [Option<Monster>; ROSTER_SIZE],
    pub active_index: usize,
    /// Set by a Defend action, cleared at end of turn
    pub defending: bool,
    /// Trainer id for trainer battles; None for the wild side
    pub trainer_id: Option<String>,
}

impl BattleSide {
    /// Build a side from (slot, monster) pairs, preserving slot gaps. The
    /// first occupied healthy slot becomes active.
    pub fn from_slots(slots: Vec<(usize, Monster)>, trainer_id: Option<String>) -> Self {
        let mut roster = [const { None }; ROSTER_SIZE];
        for (slot, monster) in slots {
            if slot < ROSTER_SIZE {
                roster[slot] = Some(monster);
            }
        }
        let active_index = roster
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|m| !m.is_fainted()))
            .unwrap_or(0);
        BattleSide {
            roster,
            active_index,
            defending: false,
            trainer_id,
        }
    }

    /// Build a side from a dense list starting at slot 0.
    pub fn from_monsters(monsters: Vec<Monster>, trainer_id: Option<String>) -> Self {
        let slots = monsters.into_iter().enumerate().collect();
        BattleSide::from_slots(slots, trainer_id)
    }

    pub fn active(&self) -> Option<&Monster> {
        self.roster
            .get(self.active_index)
            .and_then(|slot| slot.as_ref())
    }

    pub fn active_mut(&mut self) -> Option<&mut Monster> {
        self.roster
            .get_mut(self.active_index)
            .and_then(|slot| slot.as_mut())
    }

    /// Defeated when every occupied slot holds a fainted monster (or the
    /// roster is empty, e.g. after a successful catch).
    pub fn is_defeated(&self) -> bool {
        self.roster
            .iter()
            .flatten()
            .all(|monster| monster.is_fainted())
    }

    /// First slot holding a healthy monster other than the active one.
    pub fn first_healthy_slot(&self) -> Option<usize> {
        self.roster
            .iter()
            .enumerate()
            .position(|(i, slot)| {
                i != self.active_index && slot.as_ref().is_some_and(|m| !m.is_fainted())
            })
    }

    /// First empty slot, for storing a caught monster.
    pub fn first_free_slot(&self) -> Option<usize> {
        self.roster.iter().position(|slot| slot.is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleState {
    pub sides: [BattleSide; 2],
    /// One queued action per side for the current turn
    pub queued: [Option<BattleAction>; 2],
    pub turn_number: u32,
    pub phase: BattlePhase,
    /// Wild encounters allow catch and flee; trainer battles reject both
    pub is_wild: bool,
}

impl BattleState {
    pub fn new(player: BattleSide, opponent: BattleSide, is_wild: bool) -> Self {
        BattleState {
            sides: [player, opponent],
            queued: [None, None],
            turn_number: 1,
            phase: BattlePhase::ChoosingActions,
            is_wild,
        }
    }

    /// Validate and queue an action for one side. Rejections never mutate
    /// anything; they are normal outcomes, not errors in the battle state.
    pub fn queue_action(&mut self, side: usize, action: BattleAction) -> Result<(), ActionError> {
        if !matches!(self.phase, BattlePhase::ChoosingActions) {
            return Err(ActionError::BattleOver);
        }

        let battle_side = &self.sides[side];
        let active_fainted = battle_side.active().is_none_or(|m| m.is_fainted());
        if active_fainted && !matches!(action, BattleAction::Switch { .. }) {
            return Err(ActionError::MustSwitch);
        }

        match &action {
            BattleAction::Attack { attack } => {
                let active = battle_side.active().ok_or(ActionError::MustSwitch)?;
                if !active.attacks.contains(attack) {
                    return Err(ActionError::UnknownAttack(attack.clone()));
                }
                let data = get_attack_data(attack)
                    .map_err(|_| ActionError::UnknownAttack(attack.clone()))?;
                if active.energy < data.cost {
                    return Err(ActionError::NotEnoughEnergy {
                        attack: attack.clone(),
                        cost: data.cost,
                    });
                }
            }
            BattleAction::Switch { slot } => {
                if *slot == battle_side.active_index && !active_fainted {
                    return Err(ActionError::AlreadyActive(*slot));
                }
                match battle_side.roster.get(*slot).and_then(|s| s.as_ref()) {
                    None => return Err(ActionError::EmptySlot(*slot)),
                    Some(monster) if monster.is_fainted() => {
                        return Err(ActionError::FaintedSlot(*slot))
                    }
                    Some(_) => {}
                }
            }
            BattleAction::Catch => {
                if !self.is_wild {
                    return Err(ActionError::CatchInTrainerBattle);
                }
            }
            BattleAction::Flee => {
                if !self.is_wild {
                    return Err(ActionError::FleeInTrainerBattle);
                }
            }
            BattleAction::Defend => {}
        }

        self.queued[side] = Some(action);
        Ok(())
    }

    /// Both sides have committed an action for this turn.
    pub fn ready_for_turn_resolution(&self) -> bool {
        matches!(self.phase, BattlePhase::ChoosingActions)
            && self.queued.iter().all(|slot| slot.is_some())
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match &self.phase {
            BattlePhase::Finished(outcome) => Some(*outcome),
            _ => None,
        }
    }
}

/// Reasons an already-queued action can still fizzle during resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionFailureReason {
    /// The acting monster fainted earlier in the turn
    MonsterFainted,
    /// Energy ran out between queueing and resolution
    NotEnoughEnergy { attack: String },
    /// The opposing roster emptied before the action resolved
    NoTarget,
}

/// Everything observable that happens during battle resolution, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    TurnStarted {
        turn_number: u32,
    },
    AttackUsed {
        side: usize,
        monster: String,
        attack: String,
    },
    /// Element multiplier applied to the hit; only pushed when not neutral
    AttackEffectiveness {
        multiplier: f32,
    },
    DamageDealt {
        target: String,
        damage: u16,
        remaining_health: u16,
    },
    MonsterFainted {
        side: usize,
        monster: String,
    },
    MonsterSwitched {
        side: usize,
        old_monster: String,
        new_monster: String,
    },
    DefendRaised {
        side: usize,
        monster: String,
    },
    ActionFailed {
        reason: ActionFailureReason,
    },
    CatchAttempted {
        target: String,
        chance: f32,
    },
    CatchSucceeded {
        target: String,
    },
    CatchFailed {
        target: String,
    },
    FledBattle,
    SideDefeated {
        side: usize,
    },
    ExperienceGained {
        monster: String,
        amount: u32,
    },
    LeveledUp {
        monster: String,
        new_level: u8,
    },
    BattleEnded {
        outcome: BattleOutcome,
    },
}

/// Event bus for collecting battle events during resolution.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

/// RNG oracle for turn resolution. Tests hand it an explicit outcome list;
/// production pre-rolls from the thread RNG. Values are 1-100 inclusive.
#[derive(Debug, Clone)]
pub struct TurnRng {
    outcomes: Vec<u8>,
    index: usize,
}

impl TurnRng {
    pub fn new_for_test(outcomes: Vec<u8>) -> Self {
        Self { outcomes, index: 0 }
    }

    pub fn new_random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let outcomes: Vec<u8> = (0..100).map(|_| rng.random_range(1..=100)).collect();
        Self { outcomes, index: 0 }
    }

    pub fn next_outcome(&mut self, reason: &str) -> u8 {
        if self.index >= self.outcomes.len() {
            panic!(
                "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                reason
            );
        }
        let outcome = self.outcomes[self.index];
        self.index += 1;
        outcome
    }
}

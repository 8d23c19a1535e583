//! Wildgrove
//!
//! Core of a top-down tile-based adventure game with creature-collection
//! battles: scene/transition state machine, layered rendering with a
//! follow camera, entity movement and collision, a turn-based battle
//! engine, and grass-patch random encounters. Asset decoding, map-file
//! parsing, and the window/input bootstrap stay outside; the host drives
//! `Game::update`/`Game::draw` and consumes the returned events.

// --- MODULE DECLARATIONS ---
pub mod attacks;
pub mod battle;
pub mod dialog;
pub mod encounter;
pub mod errors;
pub mod evolution;
pub mod game;
pub mod geometry;
pub mod map;
pub mod monster;
pub mod render;
pub mod scene;
pub mod settings;
pub mod species;
pub mod trainer;
pub mod world;

// --- PUBLIC API RE-EXPORTS ---

// Top-level game value and its host-facing types.
pub use game::{AudioCue, Game, GameEvent, InputState, SaveState};

// Scene direction and transitions.
pub use scene::{BattleKickoff, Fade, SceneDirector, SceneMode, TransitionTarget};

// Battle engine entry points and state.
pub use battle::engine::resolve_turn;
pub use battle::state::{
    BattleAction, BattleEvent, BattleOutcome, BattlePhase, BattleSide, BattleState, EventBus,
    TurnRng,
};

// Core runtime types.
pub use monster::{Monster, MonsterStats};
pub use render::{Camera, DrawCommand, Frame, WorldLayer};
pub use world::entity::{check_connection, Entity, EntityKind, Facing};
pub use world::World;

// Primary data access functions.
pub use attacks::{get_attack_data, initialize_attack_data};
pub use species::{get_species_data, initialize_species_data};

// Crate-specific error and result types.
pub use errors::{
    ActionError, AttackDataError, GameError, GameResult, MapDataError, SpeciesDataError,
    TrainerDataError, TransitionError,
};

use std::fmt;

/// Main error type for the adventure core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Error related to species data lookup or processing
    SpeciesData(SpeciesDataError),
    /// Error related to attack data lookup or processing
    AttackData(AttackDataError),
    /// Error related to trainer data lookup or processing
    TrainerData(TrainerDataError),
    /// Error related to map layers, objects, or properties
    MapData(MapDataError),
    /// Error related to scene transitions
    Transition(TransitionError),
    /// Error related to invalid battle actions
    Action(ActionError),
}

/// Errors related to species data operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeciesDataError {
    /// The specified species was not found in the registry
    SpeciesNotFound(String),
    /// Species data file could not be read or parsed
    MalformedData(String),
}

/// Errors related to attack data operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttackDataError {
    /// The specified attack was not found in the registry
    AttackNotFound(String),
    /// Attack data file could not be read or parsed
    MalformedData(String),
}

/// Errors related to trainer data operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrainerDataError {
    /// The specified trainer id was not found
    TrainerNotFound(String),
    /// Trainer data file could not be read or parsed
    MalformedData(String),
}

/// Errors related to map content. An incomplete map cannot be rendered, so
/// these are fatal at setup time and carry the names needed to diagnose the
/// map file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapDataError {
    /// A required tile layer is absent from the map
    MissingTileLayer { map: String, layer: String },
    /// A required object layer is absent from the map
    MissingObjectLayer { map: String, layer: String },
    /// An object lacks a required property
    MissingProperty {
        layer: String,
        object: String,
        property: String,
    },
    /// A property exists but holds the wrong kind of value
    PropertyType {
        layer: String,
        object: String,
        property: String,
        expected: &'static str,
    },
    /// No player spawn matching the requested name
    MissingSpawn { map: String, spawn: String },
    /// Map file could not be read or parsed
    MalformedData(String),
}

/// Errors related to scene transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A transition target references a map id that was never loaded
    UnknownMap(String),
}

/// Errors related to battle actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The active monster has fainted; only a switch is accepted
    MustSwitch,
    /// Switch target slot is empty
    EmptySlot(usize),
    /// Switch target slot holds a fainted monster
    FaintedSlot(usize),
    /// Switch target is already the active monster
    AlreadyActive(usize),
    /// The active monster does not know the requested attack
    UnknownAttack(String),
    /// Not enough energy to use the requested attack
    NotEnoughEnergy { attack: String, cost: u16 },
    /// Catch attempts are only valid against wild monsters
    CatchInTrainerBattle,
    /// Fleeing a trainer battle is not allowed
    FleeInTrainerBattle,
    /// The battle has already finished
    BattleOver,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::SpeciesData(err) => write!(f, "Species data error: {}", err),
            GameError::AttackData(err) => write!(f, "Attack data error: {}", err),
            GameError::TrainerData(err) => write!(f, "Trainer data error: {}", err),
            GameError::MapData(err) => write!(f, "Map data error: {}", err),
            GameError::Transition(err) => write!(f, "Transition error: {}", err),
            GameError::Action(err) => write!(f, "Action error: {}", err),
        }
    }
}

impl fmt::Display for SpeciesDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeciesDataError::SpeciesNotFound(key) => write!(f, "Species not found: {}", key),
            SpeciesDataError::MalformedData(details) => {
                write!(f, "Malformed species data: {}", details)
            }
        }
    }
}

impl fmt::Display for AttackDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttackDataError::AttackNotFound(key) => write!(f, "Attack not found: {}", key),
            AttackDataError::MalformedData(details) => {
                write!(f, "Malformed attack data: {}", details)
            }
        }
    }
}

impl fmt::Display for TrainerDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainerDataError::TrainerNotFound(id) => write!(f, "Trainer not found: {}", id),
            TrainerDataError::MalformedData(details) => {
                write!(f, "Malformed trainer data: {}", details)
            }
        }
    }
}

impl fmt::Display for MapDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapDataError::MissingTileLayer { map, layer } => {
                write!(f, "Map '{}' is missing tile layer '{}'", map, layer)
            }
            MapDataError::MissingObjectLayer { map, layer } => {
                write!(f, "Map '{}' is missing object layer '{}'", map, layer)
            }
            MapDataError::MissingProperty {
                layer,
                object,
                property,
            } => write!(
                f,
                "Object '{}' in layer '{}' is missing property '{}'",
                object, layer, property
            ),
            MapDataError::PropertyType {
                layer,
                object,
                property,
                expected,
            } => write!(
                f,
                "Property '{}' on object '{}' in layer '{}' is not a {}",
                property, object, layer, expected
            ),
            MapDataError::MissingSpawn { map, spawn } => {
                write!(f, "Map '{}' has no player spawn named '{}'", map, spawn)
            }
            MapDataError::MalformedData(details) => write!(f, "Malformed map data: {}", details),
        }
    }
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::UnknownMap(id) => {
                write!(f, "Transition target references unknown map '{}'", id)
            }
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::MustSwitch => {
                write!(f, "Active monster has fainted; a switch is required")
            }
            ActionError::EmptySlot(slot) => write!(f, "Roster slot {} is empty", slot),
            ActionError::FaintedSlot(slot) => {
                write!(f, "Monster in slot {} has fainted", slot)
            }
            ActionError::AlreadyActive(slot) => {
                write!(f, "Monster in slot {} is already active", slot)
            }
            ActionError::UnknownAttack(attack) => {
                write!(f, "Active monster does not know '{}'", attack)
            }
            ActionError::NotEnoughEnergy { attack, cost } => {
                write!(f, "Not enough energy for '{}' (costs {})", attack, cost)
            }
            ActionError::CatchInTrainerBattle => {
                write!(f, "Cannot catch a trainer's monster")
            }
            ActionError::FleeInTrainerBattle => {
                write!(f, "Cannot flee from a trainer battle")
            }
            ActionError::BattleOver => write!(f, "The battle has already finished"),
        }
    }
}

impl std::error::Error for GameError {}
impl std::error::Error for SpeciesDataError {}
impl std::error::Error for AttackDataError {}
impl std::error::Error for TrainerDataError {}
impl std::error::Error for MapDataError {}
impl std::error::Error for TransitionError {}
impl std::error::Error for ActionError {}

impl From<SpeciesDataError> for GameError {
    fn from(err: SpeciesDataError) -> Self {
        GameError::SpeciesData(err)
    }
}

impl From<AttackDataError> for GameError {
    fn from(err: AttackDataError) -> Self {
        GameError::AttackData(err)
    }
}

impl From<TrainerDataError> for GameError {
    fn from(err: TrainerDataError) -> Self {
        GameError::TrainerData(err)
    }
}

impl From<MapDataError> for GameError {
    fn from(err: MapDataError) -> Self {
        GameError::MapData(err)
    }
}

impl From<TransitionError> for GameError {
    fn from(err: TransitionError) -> Self {
        GameError::Transition(err)
    }
}

impl From<ActionError> for GameError {
    fn from(err: ActionError) -> Self {
        GameError::Action(err)
    }
}

/// Type alias for Results using GameError
pub type GameResult<T> = Result<T, GameError>;

/// Type alias for Results using SpeciesDataError
pub type SpeciesDataResult<T> = Result<T, SpeciesDataError>;

/// Type alias for Results using AttackDataError
pub type AttackDataResult<T> = Result<T, AttackDataError>;

/// Type alias for Results using MapDataError
pub type MapDataResult<T> = Result<T, MapDataError>;

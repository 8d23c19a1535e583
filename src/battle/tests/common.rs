use crate::attacks::initialize_attack_data;
use crate::battle::state::{BattleSide, BattleState};
use crate::monster::Monster;
use crate::species::get_species_data;
use std::path::Path;
use std::sync::Once;

static INIT: Once = Once::new();

/// Load the RON data tables once for the whole test binary. Tests lean on
/// the shipped demo data, which doubles as a parse check for it.
pub fn setup_data() {
    INIT.call_once(|| {
        let data_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        crate::species::initialize_species_data(&data_path).expect("species data should load");
        initialize_attack_data(&data_path).expect("attack data should load");
    });
}

/// A builder for test monsters with common defaults.
///
/// # Example
/// ```rust,ignore
/// let monster = TestMonsterBuilder::new("SPARCHU", 25)
///     .with_speed(50)
///     .with_health(10)
///     .build();
/// ```
pub struct TestMonsterBuilder {
    species: String,
    level: u8,
    health: Option<u16>,
    speed: Option<u16>,
    attacks: Option<Vec<String>>,
}

impl TestMonsterBuilder {
    pub fn new(species: &str, level: u8) -> Self {
        Self {
            species: species.to_string(),
            level,
            health: None,
            speed: None,
            attacks: None,
        }
    }

    /// Override current health (max stays level-derived).
    pub fn with_health(mut self, health: u16) -> Self {
        self.health = Some(health);
        self
    }

    /// Override the speed stat, for turn-order tests.
    pub fn with_speed(mut self, speed: u16) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_attacks(mut self, attacks: Vec<&str>) -> Self {
        self.attacks = Some(attacks.into_iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn build(self) -> Monster {
        setup_data();
        let species_data = get_species_data(&self.species)
            .unwrap_or_else(|e| panic!("Failed to load species data for {}: {}", self.species, e));
        let mut monster = Monster::new(&self.species, &species_data, self.level);

        if let Some(speed) = self.speed {
            monster.stats.speed = speed;
        }
        if let Some(health) = self.health {
            monster.health = health.min(monster.stats.max_health);
        }
        if let Some(attacks) = self.attacks {
            monster.attacks = attacks;
        }

        monster
    }
}

/// Wild battle: `player_monsters` against a single wild opponent.
pub fn wild_battle(player_monsters: Vec<Monster>, wild: Monster) -> BattleState {
    setup_data();
    let player = BattleSide::from_monsters(player_monsters, None);
    let opponent = BattleSide::from_monsters(vec![wild], None);
    BattleState::new(player, opponent, true)
}

/// Trainer battle against the named trainer's monsters.
pub fn trainer_battle(
    player_monsters: Vec<Monster>,
    trainer_id: &str,
    opponent_monsters: Vec<Monster>,
) -> BattleState {
    setup_data();
    let player = BattleSide::from_monsters(player_monsters, None);
    let opponent = BattleSide::from_monsters(opponent_monsters, Some(trainer_id.to_string()));
    BattleState::new(player, opponent, false)
}

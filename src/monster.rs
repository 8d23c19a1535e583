use crate::errors::SpeciesDataResult;
use crate::species::{get_species_data, BaseStats, SpeciesData};
use serde::{Deserialize, Serialize};

/// Experience needed to go from `level` to `level + 1`.
pub fn xp_to_next_level(level: u8) -> u32 {
    level as u32 * 150
}

/// Working stats at the monster's current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterStats {
    pub max_health: u16,
    pub max_energy: u16,
    pub attack: u16,
    pub defense: u16,
    pub speed: u16,
}

impl MonsterStats {
    /// Scale per-level base stats by level. Growth is linear and
    /// deterministic; two monsters of the same species and level always
    /// have identical stats.
    pub fn at_level(base: &BaseStats, level: u8) -> Self {
        let level = level.max(1) as u16;
        MonsterStats {
            max_health: base.health * level,
            max_energy: base.energy * level,
            attack: base.attack * level,
            defense: base.defense * level,
            speed: base.speed * level,
        }
    }
}

/// A monster instance owned by a roster. Species-level data stays in the
/// global registry; this carries only per-instance state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    /// Key into the species registry (e.g. "SPARCHU")
    pub species: String,
    pub level: u8,
    pub xp: u32,
    pub health: u16,
    pub energy: u16,
    pub stats: MonsterStats,
    /// Attack keys, most recently learned last. At most four.
    pub attacks: Vec<String>,
}

impl Monster {
    /// Create a new monster instance from species data, fully healed, with
    /// attacks derived from the learnset.
    pub fn new(species_key: &str, species_data: &SpeciesData, level: u8) -> Self {
        let level = level.max(1);
        let stats = MonsterStats::at_level(&species_data.base_stats, level);
        let attacks = species_data.attacks_at_level(level);

        Monster {
            name: species_data.name.clone(),
            species: species_key.to_string(),
            level,
            xp: 0,
            health: stats.max_health,
            energy: stats.max_energy,
            stats,
            attacks,
        }
    }

    /// Convenience constructor that pulls species data from the registry.
    pub fn from_registry(species_key: &str, level: u8) -> SpeciesDataResult<Self> {
        let species_data = get_species_data(species_key)?;
        Ok(Monster::new(species_key, &species_data, level))
    }

    pub fn is_fainted(&self) -> bool {
        self.health == 0
    }

    /// Fraction of health remaining, in [0, 1].
    pub fn health_fraction(&self) -> f32 {
        if self.stats.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.stats.max_health as f32
        }
    }

    /// Apply damage, clamping at zero.
    pub fn take_damage(&mut self, amount: u16) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Restore health, clamping at the level maximum.
    pub fn heal(&mut self, amount: u16) {
        self.health = self.health.saturating_add(amount).min(self.stats.max_health);
    }

    /// Spend energy for an attack. Returns false (and spends nothing) if the
    /// monster cannot afford the cost.
    pub fn spend_energy(&mut self, cost: u16) -> bool {
        if self.energy >= cost {
            self.energy -= cost;
            true
        } else {
            false
        }
    }

    /// Refill health and energy to the level maximums.
    pub fn restore(&mut self) {
        self.health = self.stats.max_health;
        self.energy = self.stats.max_energy;
    }

    /// Grant experience and apply any level-ups it pays for. Max stats are
    /// recomputed per level gained; current health/energy keep their values
    /// (the new maximums only raise the ceiling). Newly learned attacks are
    /// appended, keeping the most recent four. Returns the number of levels
    /// gained.
    pub fn gain_xp(&mut self, amount: u32, species_data: &SpeciesData) -> u8 {
        self.xp += amount;
        let mut levels_gained = 0;

        while self.xp >= xp_to_next_level(self.level) && self.level < u8::MAX {
            self.xp -= xp_to_next_level(self.level);
            self.level += 1;
            levels_gained += 1;
            self.stats = MonsterStats::at_level(&species_data.base_stats, self.level);

            if let Some(attack) = species_data.learnset.get(&self.level) {
                if !self.attacks.contains(attack) {
                    self.attacks.push(attack.clone());
                    if self.attacks.len() > 4 {
                        self.attacks.remove(0);
                    }
                }
            }
        }

        levels_gained
    }

    /// Species key this monster is ready to evolve into, if its level has
    /// reached the threshold. Checked after battles only, never mid-battle.
    pub fn pending_evolution(&self, species_data: &SpeciesData) -> Option<String> {
        species_data.evolution.as_ref().and_then(|evo| {
            if self.level >= evo.level {
                Some(evo.evolves_into.clone())
            } else {
                None
            }
        })
    }

    /// Swap this monster's species in place, preserving level and health
    /// fraction. Used by the evolution overlay once its animation finishes.
    pub fn evolve_into(&mut self, new_key: &str, new_species: &SpeciesData) {
        let health_fraction = self.health_fraction();
        let energy_fraction = if self.stats.max_energy == 0 {
            0.0
        } else {
            self.energy as f32 / self.stats.max_energy as f32
        };

        self.species = new_key.to_string();
        self.name = new_species.name.clone();
        self.stats = MonsterStats::at_level(&new_species.base_stats, self.level);
        self.attacks = new_species.attacks_at_level(self.level);
        self.health = (self.stats.max_health as f32 * health_fraction).round() as u16;
        self.energy = (self.stats.max_energy as f32 * energy_fraction).round() as u16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{Element, EvolutionData};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn plumette_species() -> SpeciesData {
        let mut learnset = HashMap::new();
        learnset.insert(1, "SCRATCH".to_string());
        learnset.insert(15, "LEAF_SLASH".to_string());

        SpeciesData {
            name: "Plumette".to_string(),
            element: Element::Plant,
            base_stats: BaseStats {
                health: 15,
                energy: 6,
                attack: 4,
                defense: 8,
                speed: 2,
            },
            learnset,
            catch_rate: 180,
            evolution: Some(EvolutionData {
                evolves_into: "IVIERON".to_string(),
                level: 30,
            }),
        }
    }

    #[test]
    fn test_stats_scale_monotonically_with_level() {
        let species = plumette_species();
        for level in 1..60 {
            let lower = MonsterStats::at_level(&species.base_stats, level);
            let higher = MonsterStats::at_level(&species.base_stats, level + 1);
            assert!(higher.max_health > lower.max_health);
            assert!(higher.attack > lower.attack);
            assert!(higher.speed > lower.speed);
        }
    }

    #[test]
    fn test_damage_and_heal_clamp() {
        let species = plumette_species();
        let mut monster = Monster::new("PLUMETTE", &species, 10);
        let max_health = monster.stats.max_health;

        monster.take_damage(max_health + 500);
        assert_eq!(monster.health, 0);
        assert!(monster.is_fainted());

        monster.heal(u16::MAX);
        assert_eq!(monster.health, max_health);
    }

    #[test]
    fn test_gain_xp_levels_up_at_thresholds() {
        let species = plumette_species();
        let mut monster = Monster::new("PLUMETTE", &species, 5);

        // Level 5 needs 750 xp; one short must not level.
        assert_eq!(monster.gain_xp(749, &species), 0);
        assert_eq!(monster.level, 5);

        // One more crosses the threshold and carries the remainder.
        assert_eq!(monster.gain_xp(1, &species), 1);
        assert_eq!(monster.level, 6);
        assert_eq!(monster.xp, 0);
        assert_eq!(
            monster.stats,
            MonsterStats::at_level(&species.base_stats, 6)
        );
    }

    #[test]
    fn test_level_up_learns_new_attack() {
        let species = plumette_species();
        let mut monster = Monster::new("PLUMETTE", &species, 14);
        assert_eq!(monster.attacks, vec!["SCRATCH"]);

        monster.gain_xp(xp_to_next_level(14), &species);
        assert_eq!(monster.level, 15);
        assert_eq!(monster.attacks, vec!["SCRATCH", "LEAF_SLASH"]);
    }

    #[test]
    fn test_evolution_eligibility_threshold() {
        let species = plumette_species();
        let young = Monster::new("PLUMETTE", &species, 29);
        assert_eq!(young.pending_evolution(&species), None);

        let grown = Monster::new("PLUMETTE", &species, 30);
        assert_eq!(
            grown.pending_evolution(&species),
            Some("IVIERON".to_string())
        );
    }

    #[test]
    fn test_evolve_preserves_level_and_health_fraction() {
        let species = plumette_species();
        let mut evolved_species = plumette_species();
        evolved_species.name = "Ivieron".to_string();
        evolved_species.base_stats.health = 18;
        evolved_species.evolution = None;

        let mut monster = Monster::new("PLUMETTE", &species, 30);
        let half = monster.stats.max_health / 2;
        monster.take_damage(half);

        monster.evolve_into("IVIERON", &evolved_species);
        assert_eq!(monster.level, 30);
        assert_eq!(monster.species, "IVIERON");
        assert_eq!(monster.stats.max_health, 18 * 30);
        // Health fraction carried over: half of the new maximum.
        assert_eq!(monster.health, 18 * 30 / 2);
    }
}

use crate::errors::{SpeciesDataError, SpeciesDataResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

// Global species data storage - loaded once at startup
static SPECIES_DATA: LazyLock<RwLock<HashMap<String, SpeciesData>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Initialize the global species data by loading from disk
pub fn initialize_species_data(data_path: &Path) -> SpeciesDataResult<()> {
    let species_map = SpeciesData::load_all(data_path)?;
    let mut global_data = SPECIES_DATA.write().unwrap();
    *global_data = species_map;
    Ok(())
}

/// Get species data for a specific key from the global store
pub fn get_species_data(key: &str) -> SpeciesDataResult<SpeciesData> {
    let global_data = SPECIES_DATA.read().unwrap();
    global_data
        .get(key)
        .cloned()
        .ok_or_else(|| SpeciesDataError::SpeciesNotFound(key.to_string()))
}

/// Elemental affinity of a species or attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Plant,
    Fire,
    Water,
    Normal,
}

impl Element {
    /// Damage multiplier when an attack of `self` hits a defender of `other`.
    /// Fire beats plant, plant beats water, water beats fire; everything else
    /// is neutral.
    pub fn effectiveness_against(self, other: Element) -> f32 {
        match (self, other) {
            (Element::Fire, Element::Plant)
            | (Element::Plant, Element::Water)
            | (Element::Water, Element::Fire) => 2.0,
            (Element::Plant, Element::Fire)
            | (Element::Water, Element::Plant)
            | (Element::Fire, Element::Water) => 0.5,
            _ => 1.0,
        }
    }
}

/// Per-level stat gains. A monster's working stats are these values scaled
/// by its level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub health: u16,
    pub energy: u16,
    pub attack: u16,
    pub defense: u16,
    pub speed: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionData {
    /// Species key this monster evolves into
    pub evolves_into: String,
    /// Level at which the evolution becomes eligible
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub name: String,
    pub element: Element,
    pub base_stats: BaseStats,
    /// level -> attack key learned on reaching that level
    pub learnset: HashMap<u8, String>,
    /// Base catch rate, 0-255. Higher is easier to catch.
    pub catch_rate: u8,
    pub evolution: Option<EvolutionData>,
}

impl SpeciesData {
    /// Load the full species table from `data/species.ron`
    pub fn load_all(data_path: &Path) -> SpeciesDataResult<HashMap<String, SpeciesData>> {
        let file_path = data_path.join("species.ron");
        let content = fs::read_to_string(&file_path).map_err(|e| {
            SpeciesDataError::MalformedData(format!("{}: {}", file_path.display(), e))
        })?;
        let table: HashMap<String, SpeciesData> = ron::from_str(&content)
            .map_err(|e| SpeciesDataError::MalformedData(e.to_string()))?;
        Ok(table)
    }

    /// Attacks a monster of this species would know at `level`: everything
    /// learned at or below that level, most recent four kept.
    pub fn attacks_at_level(&self, level: u8) -> Vec<String> {
        let mut learned = Vec::new();
        for learn_level in 1..=level {
            if let Some(attack) = self.learnset.get(&learn_level) {
                learned.push(attack.clone());
            }
        }

        if learned.len() > 4 {
            let skip = learned.len() - 4;
            learned.into_iter().skip(skip).collect()
        } else {
            learned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_species() -> SpeciesData {
        let mut learnset = HashMap::new();
        learnset.insert(1, "SCRATCH".to_string());
        learnset.insert(5, "SPARK".to_string());
        learnset.insert(12, "FLAME".to_string());
        learnset.insert(20, "HEADBUTT".to_string());
        learnset.insert(26, "ANNIHILATE".to_string());

        SpeciesData {
            name: "Sparchu".to_string(),
            element: Element::Fire,
            base_stats: BaseStats {
                health: 15,
                energy: 7,
                attack: 3,
                defense: 8,
                speed: 1,
            },
            learnset,
            catch_rate: 150,
            evolution: Some(EvolutionData {
                evolves_into: "CINDRILL".to_string(),
                level: 30,
            }),
        }
    }

    #[test]
    fn test_attacks_at_level_keeps_most_recent_four() {
        let species = test_species();

        assert_eq!(species.attacks_at_level(1), vec!["SCRATCH"]);
        assert_eq!(species.attacks_at_level(6), vec!["SCRATCH", "SPARK"]);

        let at_30 = species.attacks_at_level(30);
        assert_eq!(at_30, vec!["SPARK", "FLAME", "HEADBUTT", "ANNIHILATE"]);
    }

    #[test]
    fn test_element_effectiveness() {
        assert_eq!(Element::Fire.effectiveness_against(Element::Plant), 2.0);
        assert_eq!(Element::Plant.effectiveness_against(Element::Fire), 0.5);
        assert_eq!(Element::Water.effectiveness_against(Element::Fire), 2.0);
        assert_eq!(Element::Normal.effectiveness_against(Element::Fire), 1.0);
        assert_eq!(Element::Fire.effectiveness_against(Element::Fire), 1.0);
    }
}

use crate::errors::TrainerDataError;
use crate::world::entity::Facing;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerDialog {
    /// Lines spoken before the trainer has been beaten
    pub default: Vec<String>,
    /// Lines spoken once `defeated` is set
    pub defeated: Vec<String>,
}

/// Static data for one NPC character, keyed by the `character_id` map
/// property. The roster is sparse on purpose: slots keep their indices even
/// when earlier ones are missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerData {
    /// slot index -> (species key, level). May skip slots.
    pub monsters: HashMap<u8, (String, u8)>,
    pub dialog: TrainerDialog,
    /// Facing cycle used while idling, first entry is the spawn facing
    pub directions: Vec<Facing>,
    /// Whether the character rotates through `directions` while idle
    pub look_around: bool,
    /// Care-center staff: talking to them restores the player's roster
    #[serde(default)]
    pub heals: bool,
    /// Set once the player wins a battle against this trainer
    #[serde(default)]
    pub defeated: bool,
}

impl TrainerData {
    /// Dialog-only characters simply leave `monsters` empty; a defeated
    /// trainer talks instead of rematching.
    pub fn wants_battle(&self) -> bool {
        !self.defeated && !self.monsters.is_empty()
    }

    pub fn dialog_lines(&self) -> &[String] {
        if self.defeated {
            &self.dialog.defeated
        } else {
            &self.dialog.default
        }
    }
}

/// Load the trainer table from `data/trainers.ron`
pub fn load_trainer_data(
    data_path: &Path,
) -> Result<HashMap<String, TrainerData>, TrainerDataError> {
    let file_path = data_path.join("trainers.ron");
    let content = fs::read_to_string(&file_path)
        .map_err(|e| TrainerDataError::MalformedData(format!("{}: {}", file_path.display(), e)))?;
    let table: HashMap<String, TrainerData> =
        ron::from_str(&content).map_err(|e| TrainerDataError::MalformedData(e.to_string()))?;
    Ok(table)
}

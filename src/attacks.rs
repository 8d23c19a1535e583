use crate::errors::{AttackDataError, AttackDataResult};
use crate::species::Element;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, RwLock};

// Global attack data storage - loaded once at startup
static ATTACK_DATA: LazyLock<RwLock<HashMap<String, AttackData>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Initialize the global attack data by loading from disk
pub fn initialize_attack_data(data_path: &Path) -> AttackDataResult<()> {
    let attack_map = AttackData::load_all(data_path)?;
    let mut global_data = ATTACK_DATA.write().unwrap();
    *global_data = attack_map;
    Ok(())
}

/// Get attack data for a specific key from the global store
pub fn get_attack_data(key: &str) -> AttackDataResult<AttackData> {
    let global_data = ATTACK_DATA.read().unwrap();
    global_data
        .get(key)
        .cloned()
        .ok_or_else(|| AttackDataError::AttackNotFound(key.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackData {
    pub name: String,
    /// Damage multiplier applied to the attacker's attack stat
    pub power: u16,
    /// Energy deducted from the attacker when the attack resolves
    pub cost: u16,
    pub element: Element,
    /// Animation key the presentation layer plays on hit
    pub animation: String,
}

impl AttackData {
    /// Load the full attack table from `data/attacks.ron`
    pub fn load_all(data_path: &Path) -> AttackDataResult<HashMap<String, AttackData>> {
        let file_path = data_path.join("attacks.ron");
        let content = fs::read_to_string(&file_path).map_err(|e| {
            AttackDataError::MalformedData(format!("{}: {}", file_path.display(), e))
        })?;
        let table: HashMap<String, AttackData> = ron::from_str(&content)
            .map_err(|e| AttackDataError::MalformedData(e.to_string()))?;
        Ok(table)
    }
}

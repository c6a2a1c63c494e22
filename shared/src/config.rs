//! The live, admin-tunable ruleset.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Global game rules. Every rule reads this live, so changes apply to the next
/// command processed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub base_income: u64,
    /// Milliseconds between income credits.
    pub income_interval: u64,
    pub base_voxel_cost: f64,
    pub height_cost_multiplier: f64,
    pub attack_cost: u64,
    pub attack_damage: u32,
    pub fortification_hp_bonus: u32,
    /// Cost of going from tier `i` to tier `i + 1`.
    pub fortification_costs: [u64; 3],
    pub loot_percentage: f64,
    pub storage_cap_base: u64,
    pub storage_cap_per_level: u64,
    pub max_height: i32,
    pub world_size: f64,
    pub build_buffer: i32,
    /// Present in the ruleset but not applied by DESTROY_VOXEL.
    pub destroy_refund: f64,
    pub repair_cost_percentage: f64,
    pub is_paused: bool,
    /// Keys without a typed field, kept so they round-trip to clients.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            base_income: 10,
            income_interval: 10_000,
            base_voxel_cost: 10.0,
            height_cost_multiplier: 0.1,
            attack_cost: 5,
            attack_damage: 30,
            fortification_hp_bonus: 60,
            fortification_costs: [20, 40, 80],
            loot_percentage: 0.3,
            storage_cap_base: 500,
            storage_cap_per_level: 250,
            max_height: 32,
            world_size: 100.0,
            build_buffer: 2,
            destroy_refund: 0.5,
            repair_cost_percentage: 0.5,
            is_paused: false,
            extra: Map::new(),
        }
    }
}

/// Which keys of a partial update took effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatchOutcome {
    pub applied: Vec<String>,
    /// Keys whose value did not fit the field's type.
    pub skipped: Vec<String>,
}

impl GameConfig {
    /// Merges a partial update key by key. A key whose value has the wrong
    /// type is skipped; the rest still apply. Unknown keys land in `extra`.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> ConfigPatchOutcome {
        let mut outcome = ConfigPatchOutcome::default();

        for (key, value) in patch {
            let mut candidate = match serde_json::to_value(&*self) {
                Ok(Value::Object(map)) => map,
                _ => {
                    outcome.skipped.push(key.clone());
                    continue;
                }
            };
            candidate.insert(key.clone(), value.clone());

            match serde_json::from_value::<GameConfig>(Value::Object(candidate)) {
                Ok(updated) => {
                    *self = updated;
                    outcome.applied.push(key.clone());
                }
                Err(_) => outcome.skipped.push(key.clone()),
            }
        }

        outcome
    }
}

//! Economy and progression rules.
//!
//! Pure functions over a [`Player`] record, the live [`GameConfig`] and an
//! explicit `now` in milliseconds.

use shared::{GameConfig, Player, Voxel, NEW_PLAYER_DISCOUNT, NEW_PLAYER_WINDOW_MS};

/// Income bonus stops growing past this fraction.
const MAX_INCOME_BONUS: f64 = 0.2;
const INCOME_BONUS_PER_LEVEL: f64 = 0.01;

/// Whether the player is still inside their new-player window.
pub fn has_discount(player: &Player, now: u64) -> bool {
    player.is_new_player && now.saturating_sub(player.joined_at) < NEW_PLAYER_WINDOW_MS
}

/// Cost of placing a voxel at height `y`. The new-player discount takes 25%
/// off the rounded base cost, rounding down.
pub fn placement_cost(config: &GameConfig, y: i32, discounted: bool) -> u64 {
    let base = (config.base_voxel_cost * (1.0 + y.max(0) as f64 * config.height_cost_multiplier))
        .round()
        .max(0.0);
    if discounted {
        (base * (1.0 - NEW_PLAYER_DISCOUNT)).floor() as u64
    } else {
        base as u64
    }
}

pub fn storage_cap(config: &GameConfig, level: u32) -> u64 {
    config.storage_cap_base + level as u64 * config.storage_cap_per_level
}

pub fn income_amount(config: &GameConfig, level: u32) -> u64 {
    let bonus = (level.saturating_sub(1) as f64 * INCOME_BONUS_PER_LEVEL).min(MAX_INCOME_BONUS);
    (config.base_income as f64 * (1.0 + bonus)).floor() as u64
}

/// Credits one round of income if the interval has elapsed and the player has
/// storage room. Returns the new balance when something was credited.
///
/// The accrual timer only resets on an actual credit, so a player sitting at
/// the cap is paid as soon as they spend below it.
pub fn accrue_income(config: &GameConfig, player: &mut Player, now: u64) -> Option<u64> {
    if now.saturating_sub(player.last_income_at) < config.income_interval {
        return None;
    }

    let cap = storage_cap(config, player.level);
    if player.bucks >= cap {
        return None;
    }

    let credited = (player.bucks + income_amount(config, player.level)).min(cap);
    if credited == player.bucks {
        return None;
    }
    player.bucks = credited;
    player.last_income_at = now;
    Some(credited)
}

/// What an attacker takes when a voxel falls.
pub fn loot(config: &GameConfig, voxel: &Voxel) -> u64 {
    (voxel.invested_value as f64 * config.loot_percentage).floor() as u64
}

/// Cost of restoring one voxel to full health.
pub fn repair_cost(config: &GameConfig, voxel: &Voxel) -> u64 {
    if voxel.max_hp == 0 {
        return 0;
    }
    let missing = 1.0 - voxel.hp as f64 / voxel.max_hp as f64;
    (voxel.invested_value as f64 * config.repair_cost_percentage * missing).round() as u64
}

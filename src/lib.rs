//! Wildhold - entity simulation and combat engine for a top-down survival game
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (collision, AI, combat, projectiles, world clock)
//! - `tuning`: Data-driven world configuration
//! - `error`: Error types surfaced by fallible entry points
//!
//! The library never draws, plays sound or touches the platform. A host feeds
//! `sim::TickInput` and a delta time into `sim::advance` and reads back a
//! `sim::Snapshot` plus the events recorded during the tick.

pub mod error;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use tuning::Tuning;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
///
/// Speeds are in world units per nominal frame (see `FRAME_MS`); durations
/// and cooldowns are in milliseconds.
pub mod consts {
    use std::f32::consts::PI;

    /// Nominal frame time that speeds are expressed against
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    // === Player ===
    pub const PLAYER_SPEED: f32 = 4.0;
    pub const PLAYER_RADIUS: f32 = 15.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const FLASH_DURATION_MS: f64 = 100.0;
    pub const HEAL_AMOUNT: f32 = 25.0;
    pub const ITEM_PICKUP_RANGE: f32 = 25.0;
    pub const INTERACT_RANGE: f32 = 65.0;
    pub const PLACE_RANGE: f32 = 75.0;
    pub const PLACE_GRID_SIZE: f32 = 20.0;

    // === Player combat ===
    pub const MELEE_ATTACK_COOLDOWN_MS: f64 = 250.0;
    pub const ATTACK_RANGE: f32 = 60.0;
    pub const ATTACK_SWING_ARC: f32 = PI / 2.0;
    /// Extra angular slack on either side of the swing arc
    pub const ATTACK_SWING_TOLERANCE: f32 = 0.5;
    pub const BASE_ATTACK_POWER: f32 = 5.0;
    pub const BASE_GATHER_POWER: f32 = 3.0;
    pub const BOW_COOLDOWN_MS: f64 = 1600.0;
    pub const ARROW_SPEED: f32 = 8.0;
    pub const ARROW_RADIUS: f32 = 3.0;

    // === XP ===
    pub const BASE_XP_FOR_LEVEL_2: u32 = 100;
    pub const XP_LEVEL_EXPONENT: f32 = 1.5;
    pub const MONSTER_XP_REWARD: u32 = 10;
    pub const PLAINS_BOSS_XP_REWARD: u32 = 250;
    /// Share of XP granted when a minion or pet lands the killing blow
    pub const ALLY_KILL_XP_MULT: f32 = 0.5;
    pub const PERK_LEVEL: u32 = 3;
    pub const PET_LEVEL: u32 = 5;

    // === Hostiles ===
    pub const MONSTER_SPEED: f32 = 1.8;
    pub const MONSTER_DETECT_RANGE: f32 = 250.0;
    /// Reach beyond the target's radius at which a hostile stops to attack
    pub const MONSTER_ATTACK_RANGE: f32 = PLAYER_RADIUS + 5.0;
    /// Extra slack allowed when the blow actually lands
    pub const MONSTER_HIT_BUFFER: f32 = 5.0;
    pub const MONSTER_ATTACK_COOLDOWN_MS: f64 = 1000.0;
    pub const MONSTER_DAMAGE: f32 = 10.0;
    pub const MONSTER_HEALTH: f32 = 100.0;
    pub const MONSTER_MIN_RADIUS: f32 = 10.0;
    pub const MONSTER_MAX_RADIUS: f32 = 15.0;
    pub const GOLD_COIN_DROP_CHANCE: f64 = 1.0 / 50.0;

    // === Plains boss ===
    pub const PLAINS_BOSS_RADIUS: f32 = 40.0;
    pub const PLAINS_BOSS_HEALTH: f32 = 1000.0;
    pub const PLAINS_BOSS_SPEED: f32 = 1.0;
    pub const PLAINS_BOSS_DETECT_RANGE: f32 = 400.0;
    pub const PLAINS_BOSS_ATTACK_COOLDOWN_MS: f64 = 1500.0;
    pub const PLAINS_BOSS_ATTACK_CHOICE_COOLDOWN_MS: f64 = 3000.0;
    pub const BOSS_HIT_RANGE: f32 = PLAINS_BOSS_RADIUS + PLAYER_RADIUS + 10.0;
    pub const BOSS_HIT_DAMAGE: f32 = 25.0;
    pub const BOSS_HIT_DURATION_MS: f64 = 500.0;
    pub const BOSS_HIT_LAND_MS: f64 = 250.0;
    pub const BOSS_SMASH_RANGE: f32 = 100.0;
    pub const BOSS_SMASH_DAMAGE: f32 = 35.0;
    pub const BOSS_SMASH_WINDUP_MS: f64 = 800.0;
    pub const BOSS_SMASH_EFFECT_MS: f64 = 300.0;
    pub const BOSS_SPIN_RANGE: f32 = 60.0;
    pub const BOSS_SPIN_DAMAGE: f32 = 15.0;
    pub const BOSS_SPIN_DURATION_MS: f64 = 1200.0;
    pub const BOSS_SPIN_INTERVAL_MS: f64 = 300.0;
    /// Distance to a patrol waypoint that counts as arrival
    pub const BOSS_WAYPOINT_REACHED: f32 = 20.0;

    // === Forest wolf ===
    pub const FOREST_WOLF_RADIUS: f32 = 50.0;
    pub const FOREST_WOLF_HEALTH: f32 = 200.0;
    pub const FOREST_WOLF_SPEED_MULT: f32 = 1.25;
    pub const FOREST_WOLF_CONTACT_DAMAGE: f32 = 90.0;
    pub const FOREST_WOLF_CONTACT_COOLDOWN_MS: f64 = 1000.0;
    pub const FOREST_WOLF_CORNER_THRESHOLD: f32 = 100.0;
    pub const FOREST_WOLF_CORNER_TIMEOUT_MS: f64 = 15_000.0;
    pub const FOREST_WOLF_TREE_DESTROY_RADIUS: f32 = 60.0;

    // === Jungle boss ===
    pub const JUNGLE_BOSS_RADIUS: f32 = 50.0;
    pub const JUNGLE_BOSS_HEALTH: f32 = 2000.0;
    pub const JUNGLE_BOSS_SPEED: f32 = 1.0;
    pub const JUNGLE_BOSS_ATTACK_COOLDOWN_MS: f64 = 2000.0;
    pub const JUNGLE_BOSS_PROJECTILE_SPEED: f32 = 6.0;
    pub const JUNGLE_BOSS_PROJECTILE_RANGE: f32 = 100_000.0;
    pub const JUNGLE_BOSS_PROJECTILE_RADIUS: f32 = 8.0;
    pub const JUNGLE_BOSS_PROJECTILE_DAMAGE: f32 = 50.0;

    // === Minions ===
    pub const NECROMANCER_KILLS_TO_SUMMON: u32 = 5;
    pub const MAX_UNDEAD_MINIONS: usize = 10;
    pub const UNDEAD_RADIUS: f32 = 8.0;
    pub const UNDEAD_HEALTH_MULT: f32 = 0.8;
    pub const UNDEAD_SPEED: f32 = 1.5;
    pub const UNDEAD_ATTACK_COOLDOWN_MS: f64 = 1200.0;
    pub const UNDEAD_DAMAGE: f32 = 6.0;
    pub const MAX_SUMMONED_SLIMES: usize = 2;
    pub const SUMMONED_SLIME_RADIUS: f32 = 9.0;
    pub const SUMMONED_SLIME_SPEED: f32 = 1.6;
    pub const SUMMONED_SLIME_DAMAGE: f32 = 8.0;
    pub const SUMMONED_SLIME_ATTACK_COOLDOWN_MS: f64 = 1100.0;
    pub const SUMMONED_SLIME_DETECT_RANGE: f32 = MONSTER_DETECT_RANGE * 0.9;
    pub const SUMMONED_SLIME_AGGRO_RANGE: f32 = MONSTER_DETECT_RANGE * 1.2;
    pub const SUMMONED_SLIME_FOLLOW_DISTANCE: f32 = PLAYER_RADIUS + SUMMONED_SLIME_RADIUS + 25.0;
    /// Base health both minion kinds scale from
    pub const MINION_BASE_HEALTH: f32 = 100.0;

    // === Pets ===
    pub const PET_FOLLOW_DISTANCE: f32 = 30.0;
    pub const PET_SPEED: f32 = 3.5;
    pub const PET_DETECT_RANGE: f32 = MONSTER_DETECT_RANGE;
    pub const PET_FROG_HEAL_AMOUNT: f32 = 10.0;
    pub const PET_FROG_HEAL_INTERVAL_MS: f64 = 30_000.0;
    pub const PET_CAT_ATTACK_COOLDOWN_MS: f64 = 1500.0;
    pub const PET_CAT_PROJECTILE_SPEED: f32 = 7.0;
    pub const PET_CAT_PROJECTILE_RANGE: f32 = 300.0;
    pub const PET_CAT_PROJECTILE_RADIUS: f32 = 4.0;
    pub const PET_CAT_PROJECTILE_DAMAGE: f32 = 5.0;
    pub const PET_CAT_MIN_DISTANCE: f32 = 100.0;
    pub const PET_CAT_MAX_DISTANCE: f32 = 200.0;
    pub const PET_BEETLE_BLOCK_COOLDOWN_MS: f64 = 10_000.0;
    pub const PET_DOG_ATTACK_RANGE: f32 = PLAYER_RADIUS + 10.0 + 10.0;
    pub const PET_DOG_ATTACK_COOLDOWN_MS: f64 = 800.0;
    pub const PET_DOG_DAMAGE: f32 = 7.0;
    pub const PET_BIRD_PICKUP_RANGE: f32 = PLAYER_RADIUS + 10.0 + 30.0;

    // === World ===
    pub const WALL_THICKNESS: f32 = 15.0;
    pub const LAVA_POOL_COUNT: usize = 5;
    pub const DROPPED_ITEM_RADIUS: f32 = 5.0;
    pub const DROP_SCATTER: f32 = 7.5;
    /// Minimum distance from the player for hostile spawns
    pub const SPAWN_CLEARANCE: f32 = 200.0;
    pub const MAX_NIGHT_OPACITY: f32 = 0.75;

    // === Inventory ===
    pub const INVENTORY_COLS: usize = 8;
    pub const INVENTORY_ROWS: usize = 4;
    pub const INVENTORY_SIZE: usize = INVENTORY_COLS * INVENTORY_ROWS;
    pub const HOTBAR_SIZE: usize = 5;
    pub const MAX_STACK_SIZE: u32 = 64;
}

/// Stable identifier for any simulated entity
///
/// Allocated monotonically by `GameState::next_entity_id`, so a lower id is
/// always an older entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Normalized angle to [-π, π]; non-finite input maps to zero
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    (angle + PI).rem_euclid(TAU) - PI
}

/// Unit vector for an angle in radians
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a direction vector
#[inline]
pub fn angle_of(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}

/// Scale factor converting a per-frame speed into a displacement for `dt_ms`
#[inline]
pub fn frame_scale(dt_ms: f64) -> f32 {
    (dt_ms / consts::FRAME_MS) as f32
}

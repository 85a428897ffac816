//! Data-driven world configuration
//!
//! Everything a host may reasonably want to change without touching balance
//! constants: world size, starting populations, clock length and the delta
//! time clamp. Loaded from JSON; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Border strip kept free of spawns
    pub island_padding: f32,

    // === Population ===
    pub initial_monsters: usize,
    pub nightly_monster_spawn: usize,
    /// Global hostile cap; nightly spawns never exceed it
    pub max_monsters: usize,
    pub forest_trees: usize,
    pub rocky_rocks: usize,
    pub bone_trees: usize,
    pub scattered_resources: usize,
    /// Whether world generation places the two starting bosses
    pub spawn_bosses: bool,

    // === Clock ===
    pub day_length_ms: f64,
    /// Cycle fraction where night begins
    pub night_start: f64,
    /// Cycle fraction each sunset/sunrise transition lasts
    pub transition: f64,

    // === Timing ===
    /// Largest delta a single tick will integrate
    pub max_dt_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: 20_000.0,
            world_height: 15_000.0,
            island_padding: 450.0,

            initial_monsters: 1000,
            nightly_monster_spawn: 100,
            max_monsters: 5000,
            forest_trees: 1200,
            rocky_rocks: 1500,
            bone_trees: 300,
            scattered_resources: 2000,
            spawn_bosses: true,

            day_length_ms: 120_000.0,
            night_start: 0.65,
            transition: 0.08,

            max_dt_ms: 100.0,
        }
    }
}

impl Tuning {
    /// A world with no generated content, for hosts that place entities themselves
    pub fn empty() -> Self {
        Self {
            initial_monsters: 0,
            forest_trees: 0,
            rocky_rocks: 0,
            bone_trees: 0,
            scattered_resources: 0,
            spawn_bosses: false,
            ..Self::default()
        }
    }

    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!(
            "Loaded tuning: {}x{} world, {} monsters",
            tuning.world_width,
            tuning.world_height,
            tuning.initial_monsters
        );
        Ok(tuning)
    }

    /// Read tuning from a JSON file
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |field: &'static str, reason: &str| {
            Err(SimError::InvalidTuning {
                field,
                reason: reason.to_string(),
            })
        };

        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return invalid("world_width", "world dimensions must be positive");
        }
        if self.island_padding * 2.0 >= self.world_width.min(self.world_height) {
            return invalid("island_padding", "padding leaves no playable area");
        }
        if !(self.day_length_ms > 0.0) {
            return invalid("day_length_ms", "must be positive");
        }
        if !(self.transition > 0.0 && self.transition < self.night_start) {
            return invalid("transition", "must be positive and shorter than the day");
        }
        if !(self.night_start + self.transition < 1.0) {
            return invalid("night_start", "night must end before sunrise");
        }
        if !(self.max_dt_ms > 0.0) {
            return invalid("max_dt_ms", "must be positive");
        }
        if self.initial_monsters > self.max_monsters {
            return invalid("initial_monsters", "exceeds max_monsters");
        }
        Ok(())
    }

    /// Cycle fraction where the sunset transition starts
    pub fn sunset_start(&self) -> f64 {
        self.night_start - self.transition
    }

    /// Cycle fraction where the sunrise transition starts
    pub fn sunrise_start(&self) -> f64 {
        1.0 - self.transition
    }
}

//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable pool order (insertion order, compacted at tick end)
//! - No rendering or platform dependencies

pub mod actions;
pub mod ai;
pub mod clock;
pub mod collision;
pub mod combat;
pub mod crafting;
pub mod entity;
pub mod geometry;
pub mod inventory;
pub mod items;
pub mod player;
pub mod projectile;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use clock::{DayPhase, WorldClock};
pub use combat::KillCredit;
pub use entity::{EntityKind, EntityRef};
pub use player::{PerkChoice, PlayerClass, WeaponId};
pub use state::{GameEvent, GamePhase, GameState, Snapshot};
pub use tick::{TickInput, advance};

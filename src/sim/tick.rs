//! Simulation tick
//!
//! One call to `advance` runs every subsystem in a fixed order: clock, player
//! input, player movement, item pickup, AI, projectiles, then compaction.
//! Nothing is removed from a pool before the final step.

use glam::Vec2;

use super::actions;
use super::ai;
use super::clock::ClockEvent;
use super::collision::{ObstacleMask, ObstacleSet};
use super::projectile;
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;
use crate::{angle_of, frame_scale};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction; any length, zero to stand still
    pub move_dir: Vec2,
    /// World point under the cursor; the player faces it
    pub aim: Option<Vec2>,
    /// Primary action held (attack or shoot)
    pub primary: bool,
    /// Secondary action pressed (use, interact or place)
    pub secondary: bool,
    /// Hotbar slot to select
    pub hotbar: Option<usize>,
    /// Class ability pressed (raise undead or summon slime)
    pub class_ability: bool,
}

/// Sanitize a host delta: bad values become one frame, long stalls are capped
pub fn clamp_dt(dt_ms: f64, max_dt_ms: f64) -> f64 {
    if !dt_ms.is_finite() || dt_ms <= 0.0 {
        FRAME_MS
    } else {
        dt_ms.min(max_dt_ms)
    }
}

/// Advance the game state by `dt_ms` milliseconds of host time
pub fn advance(state: &mut GameState, input: &TickInput, dt_ms: f64) {
    let dt = clamp_dt(dt_ms, state.tuning.max_dt_ms);
    state.events.clear();

    // The world waits on the game-over screen until a respawn
    if state.phase == GamePhase::GameOver {
        return;
    }

    state.time_ms += dt;
    update_clock(state, dt);
    apply_input(state, input);
    move_player(state, input.move_dir, dt);
    collect_drops(state);

    ai::update(state, dt);
    projectile::update_projectiles(state, dt);

    state.compact();
    state.tick_count += 1;
}

fn update_clock(state: &mut GameState, dt: f64) {
    for event in state.clock.advance(dt) {
        match event {
            ClockEvent::NightFell => {
                let spawned = spawn::nightly_spawn(state);
                state.push_event(GameEvent::NightFell { spawned });
            }
            ClockEvent::NewDay { day } => {
                log::info!("Day {} begins", day);
                state.push_event(GameEvent::NewDay { day });
            }
        }
    }
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    if let Some(index) = input.hotbar {
        actions::select_hotbar(state, index);
    }

    let pos = state.player.actor.pos;
    let look = match input.aim {
        Some(aim) => aim - pos,
        None => input.move_dir,
    };
    if look.length_squared() > f32::EPSILON {
        state.player.facing = angle_of(look);
    }

    if input.class_ability {
        actions::try_class_ability(state);
    }
    if input.secondary {
        actions::try_interact(state, input.aim);
    }
    if input.primary {
        actions::try_attack(state);
    }
}

fn move_player(state: &mut GameState, move_dir: Vec2, dt: f64) {
    let dir = move_dir.normalize_or_zero();
    if dir == Vec2::ZERO || !state.player.actor.is_alive() {
        return;
    }

    let speed = state.player.move_speed(state.is_night());
    let delta = dir * speed * frame_scale(dt);
    let radius = state.player.actor.radius;
    let from = state.player.actor.pos;

    let obstacles = ObstacleSet::gather(state, ObstacleMask::ALL);
    let slide = obstacles.slide(from, delta, radius, Some(state.player.id));
    state.player.actor.pos = state.world.bounds().clamp_circle(slide.pos, radius);

    // Walking into the wolf hurts, even when a wall stopped the step first
    let player = state.player_ref();
    for wolf in obstacles.hazards_touching(from + delta, radius) {
        super::combat::wolf_contact(state, wolf, player);
    }
}

fn collect_drops(state: &mut GameState) {
    if !state.player.actor.is_alive() {
        return;
    }
    let pos = state.player.actor.pos;
    let mut collected = Vec::new();
    for drop in state
        .drops
        .iter_mut()
        .filter(|d| !d.picked_up && d.pos.distance(pos) < ITEM_PICKUP_RANGE)
    {
        if !state.player.inventory.has_room_for(drop.item, 1) {
            continue;
        }
        state.player.inventory.add(drop.item, 1);
        drop.picked_up = true;
        collected.push(drop.item);
    }
    for item in collected {
        state.push_event(GameEvent::ItemCollected { item });
    }
}

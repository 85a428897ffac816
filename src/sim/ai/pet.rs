//! Pet behaviors
//!
//! The pet is never attacked and never blocked. Every kind drifts back toward
//! the player when it has nothing else to do.

use glam::Vec2;

use super::{nearest_visible, step_away, step_toward};
use crate::consts::*;
use crate::frame_scale;
use crate::sim::combat::{self, KillCredit};
use crate::sim::entity::{EntityKind, Pet, PetKind, Projectile, ProjectileOwner};
use crate::sim::state::{GameEvent, GamePhase, GameState, Resolved};

pub fn update_pet(state: &mut GameState, dt_ms: f64) {
    let Some(kind) = state.pet.as_ref().map(|p| p.kind) else {
        return;
    };
    if state.phase != GamePhase::Playing {
        return;
    }
    let scale = frame_scale(dt_ms);

    match kind {
        PetKind::Frog => update_frog(state),
        PetKind::Beetle => update_beetle(state),
        PetKind::Bird => update_bird(state),
        PetKind::Cat => update_cat(state, scale),
        PetKind::Dog => update_dog(state, scale),
    }

    // Anything that did not move with purpose drifts home
    let owner = state.player.actor.pos;
    if let Some(pet) = state.pet.as_mut()
        && pet.target.is_none()
    {
        follow_owner(pet, owner, scale);
    }
}

fn follow_owner(pet: &mut Pet, owner: Vec2, scale: f32) {
    if pet.pos.distance(owner) > PET_FOLLOW_DISTANCE {
        pet.pos += step_toward(pet.pos, owner, PET_SPEED, scale);
    }
}

/// Nearest living hostile the pet can see
fn nearest_hostile(state: &GameState, from: Vec2) -> Option<Resolved> {
    let hostiles: Vec<Resolved> = state
        .enemy_targets()
        .into_iter()
        .filter(|t| t.target.kind == EntityKind::Hostile)
        .collect();
    nearest_visible(from, Some(PET_DETECT_RANGE), &hostiles, &state.walls)
}

fn update_frog(state: &mut GameState) {
    let now = state.time_ms;
    let Some(pet) = state.pet.as_mut() else { return };
    if now - pet.last_action_ms < PET_FROG_HEAL_INTERVAL_MS {
        return;
    }
    pet.last_action_ms = now;
    let healed = state.player.actor.heal(PET_FROG_HEAL_AMOUNT);
    if healed > 0.0 {
        log::debug!("Frog healed the player for {:.1}", healed);
    }
}

fn update_beetle(state: &mut GameState) {
    let now = state.time_ms;
    let Some(pet) = state.pet.as_mut() else { return };
    if !pet.guard_ready && now - pet.last_action_ms >= PET_BEETLE_BLOCK_COOLDOWN_MS {
        pet.guard_ready = true;
    }
}

fn update_bird(state: &mut GameState) {
    let Some(pet_pos) = state.pet.as_ref().map(|p| p.pos) else {
        return;
    };
    let mut collected = Vec::new();
    for drop in state
        .drops
        .iter_mut()
        .filter(|d| !d.picked_up && d.pos.distance(pet_pos) <= PET_BIRD_PICKUP_RANGE)
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

fn update_cat(state: &mut GameState, scale: f32) {
    let now = state.time_ms;
    let Some(pet_pos) = state.pet.as_ref().map(|p| p.pos) else {
        return;
    };
    let target = nearest_hostile(state, pet_pos);

    let Some(pet) = state.pet.as_mut() else { return };
    pet.target = target.map(|t| t.target);
    let Some(target) = target else { return };

    // Kite: keep between the minimum and maximum distance
    let dist = pet.pos.distance(target.pos);
    if dist < PET_CAT_MIN_DISTANCE {
        pet.pos += step_away(pet.pos, target.pos, PET_SPEED, scale);
    } else if dist > PET_CAT_MAX_DISTANCE {
        pet.pos += step_toward(pet.pos, target.pos, PET_SPEED, scale);
    }

    if now - pet.last_action_ms < PET_CAT_ATTACK_COOLDOWN_MS || dist > PET_CAT_PROJECTILE_RANGE {
        return;
    }
    let dir = (target.pos - pet.pos).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    pet.last_action_ms = now;
    let origin = pet.pos + dir * (pet.radius + PET_CAT_PROJECTILE_RADIUS);

    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        owner: ProjectileOwner::Pet,
        pos: origin,
        vel: dir * PET_CAT_PROJECTILE_SPEED,
        radius: PET_CAT_PROJECTILE_RADIUS,
        damage: PET_CAT_PROJECTILE_DAMAGE,
        range: PET_CAT_PROJECTILE_RANGE,
        traveled: 0.0,
        live: true,
    });
}

fn update_dog(state: &mut GameState, scale: f32) {
    let now = state.time_ms;
    let Some(pet_pos) = state.pet.as_ref().map(|p| p.pos) else {
        return;
    };
    let target = nearest_hostile(state, pet_pos);

    let Some(pet) = state.pet.as_mut() else { return };
    pet.target = target.map(|t| t.target);
    let Some(target) = target else { return };

    let dist = pet.pos.distance(target.pos);
    if dist > PET_DOG_ATTACK_RANGE + target.radius {
        pet.pos += step_toward(pet.pos, target.pos, PET_SPEED, scale);
        return;
    }
    if now - pet.last_action_ms < PET_DOG_ATTACK_COOLDOWN_MS {
        return;
    }
    pet.last_action_ms = now;
    combat::deal_damage(state, target.target, PET_DOG_DAMAGE, KillCredit::Pet);
}

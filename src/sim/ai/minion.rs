//! Undead and summoned minion AI
//!
//! Minions fight hostiles and bosses, never the player. Summons stay close to
//! their owner: they only engage enemies within aggro range of the player and
//! walk back when nothing is worth fighting.

use glam::Vec2;

use super::{nearest_visible, step_toward};
use crate::consts::*;
use crate::frame_scale;
use crate::sim::collision::{ObstacleMask, ObstacleSet};
use crate::sim::combat::{self, KillCredit};
use crate::sim::entity::{EntityRef, MinionKind, MinionState};
use crate::sim::state::{GameState, Resolved};
use crate::EntityId;

pub fn update_minions(state: &mut GameState, dt_ms: f64) {
    let scale = frame_scale(dt_ms);
    let now = state.time_ms;
    let enemies = state.enemy_targets();
    let obstacles = ObstacleSet::gather(
        state,
        ObstacleMask {
            player: false,
            ..ObstacleMask::ALL
        },
    );
    let owner = state.player.actor.pos;

    let mut strikes: Vec<(EntityRef, f32)> = Vec::new();
    let mut wolf_contacts: Vec<(EntityId, EntityRef)> = Vec::new();

    let walls = &state.walls;
    for pool in [&mut state.undead, &mut state.summons] {
        for minion in pool.iter_mut().filter(|m| m.actor.is_alive()) {
            let pos = minion.actor.pos;
            let target = match minion.kind {
                MinionKind::Undead => nearest_visible(pos, minion.detect_range, &enemies, walls),
                MinionKind::Summon => {
                    let near_owner: Vec<Resolved> = enemies
                        .iter()
                        .filter(|e| e.pos.distance(owner) <= SUMMONED_SLIME_AGGRO_RANGE)
                        .copied()
                        .collect();
                    nearest_visible(pos, minion.detect_range, &near_owner, walls)
                }
            };
            minion.target = target.map(|t| t.target);

            let destination = match target {
                Some(t) => {
                    let dist = pos.distance(t.pos);
                    let mut reach = MONSTER_ATTACK_RANGE + t.radius;
                    if minion.state == MinionState::Attacking {
                        reach += MONSTER_HIT_BUFFER;
                    }
                    if dist <= reach {
                        minion.state = MinionState::Attacking;
                        if now - minion.last_attack_ms >= minion.attack_cooldown_ms {
                            minion.last_attack_ms = now;
                            strikes.push((t.target, minion.damage));
                        }
                        None
                    } else {
                        minion.state = MinionState::Chasing;
                        Some(t.pos)
                    }
                }
                None if minion.kind == MinionKind::Summon
                    && pos.distance(owner) > SUMMONED_SLIME_FOLLOW_DISTANCE =>
                {
                    minion.state = MinionState::Following;
                    Some(owner)
                }
                None => {
                    minion.state = MinionState::Idle;
                    None
                }
            };

            let Some(dest) = destination else { continue };
            let delta = step_toward(pos, dest, minion.speed, scale);
            if delta == Vec2::ZERO {
                continue;
            }
            let radius = minion.actor.radius;
            minion.actor.pos = obstacles.slide(pos, delta, radius, Some(minion.id)).pos;
            let me = minion.entity_ref();
            wolf_contacts.extend(
                obstacles
                    .hazards_touching(pos + delta, radius)
                    .into_iter()
                    .map(|wolf| (wolf, me)),
            );
        }
    }

    for (victim, damage) in strikes {
        combat::deal_damage(state, victim, damage, KillCredit::Minion);
    }
    for (wolf, victim) in wolf_contacts {
        combat::wolf_contact(state, wolf, victim);
    }
}

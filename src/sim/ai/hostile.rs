//! Regular monster AI: idle, chasing, attacking
//!
//! Hostiles pick the nearest visible target among the player and both minion
//! pools. They never fight each other.

use super::{nearest_visible, step_toward};
use crate::consts::*;
use crate::frame_scale;
use crate::sim::collision::{ObstacleMask, ObstacleSet};
use crate::sim::combat::{self, KillCredit};
use crate::sim::entity::{EntityKind, EntityRef, HostileState};
use crate::sim::state::GameState;
use crate::EntityId;

pub fn update_hostiles(state: &mut GameState, dt_ms: f64) {
    let scale = frame_scale(dt_ms);
    let now = state.time_ms;
    let targets = state.hostile_targets();
    let obstacles = ObstacleSet::gather(state, ObstacleMask::ALL);

    let mut strikes: Vec<EntityRef> = Vec::new();
    let mut wolf_contacts: Vec<(EntityId, EntityRef)> = Vec::new();

    let walls = &state.walls;
    for hostile in state.hostiles.iter_mut().filter(|h| h.actor.is_alive()) {
        let pos = hostile.actor.pos;
        let target = nearest_visible(pos, Some(MONSTER_DETECT_RANGE), &targets, walls);
        hostile.target = target.map(|t| t.target);

        let Some(target) = target else {
            hostile.state = HostileState::Idle;
            continue;
        };

        let dist = pos.distance(target.pos);
        let mut reach = MONSTER_ATTACK_RANGE + target.radius;
        // An attack already underway keeps landing until the target is clear of the buffer
        if hostile.state == HostileState::Attacking {
            reach += MONSTER_HIT_BUFFER;
        }
        if dist <= reach {
            hostile.state = HostileState::Attacking;
            if now - hostile.last_attack_ms >= MONSTER_ATTACK_COOLDOWN_MS {
                hostile.last_attack_ms = now;
                strikes.push(target.target);
            }
        } else {
            hostile.state = HostileState::Chasing;
            let radius = hostile.actor.radius;
            let delta = step_toward(pos, target.pos, MONSTER_SPEED, scale);
            hostile.actor.pos = obstacles.slide(pos, delta, radius, Some(hostile.id)).pos;
            let me = EntityRef::new(EntityKind::Hostile, hostile.id);
            wolf_contacts.extend(
                obstacles
                    .hazards_touching(pos + delta, radius)
                    .into_iter()
                    .map(|wolf| (wolf, me)),
            );
        }
    }

    for victim in strikes {
        combat::deal_damage(state, victim, MONSTER_DAMAGE, KillCredit::Hostile);
    }
    for (wolf, victim) in wolf_contacts {
        combat::wolf_contact(state, wolf, victim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::MinionKind;
    use crate::sim::geometry::{Rect, Wall};
    use crate::sim::state::test_support::*;
    use glam::Vec2;

    const FRAME: f64 = FRAME_MS;

    #[test]
    fn test_idle_when_nothing_in_range() {
        let mut s = state();
        let pos = s.player.actor.pos + Vec2::new(400.0, 0.0);
        add_hostile(&mut s, pos);
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Idle);
        assert_eq!(s.hostiles[0].actor.pos, pos);
    }

    #[test]
    fn test_chases_then_attacks_on_cooldown() {
        let mut s = state();
        let player = s.player.actor.pos;
        add_hostile(&mut s, player + Vec2::new(100.0, 0.0));

        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Chasing);
        assert!(s.hostiles[0].actor.pos.x < player.x + 100.0);

        s.hostiles[0].actor.pos = player + Vec2::new(30.0, 0.0);
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Attacking);
        let after_first = s.player.actor.health;
        assert_eq!(after_first, s.player.actor.max_health - MONSTER_DAMAGE);

        // Intent held, damage waits on cooldown
        s.time_ms += 500.0;
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.player.actor.health, after_first);

        s.time_ms += 500.0;
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.player.actor.health, after_first - MONSTER_DAMAGE);
    }

    #[test]
    fn test_attack_lands_inside_hit_buffer() {
        let mut s = state();
        let player = s.player.actor.pos;
        let reach = MONSTER_ATTACK_RANGE + s.player.actor.radius;
        add_hostile(&mut s, player + Vec2::new(reach - 1.0, 0.0));
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Attacking);
        let after_first = s.player.actor.health;

        // Backed off past reach but still inside the buffer
        s.hostiles[0].actor.pos = player + Vec2::new(reach + MONSTER_HIT_BUFFER * 0.5, 0.0);
        s.time_ms += MONSTER_ATTACK_COOLDOWN_MS;
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Attacking);
        assert_eq!(s.player.actor.health, after_first - MONSTER_DAMAGE);

        // Clear of the buffer: back to chasing
        s.hostiles[0].actor.pos = player + Vec2::new(reach + MONSTER_HIT_BUFFER + 2.0, 0.0);
        s.time_ms += MONSTER_ATTACK_COOLDOWN_MS;
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Chasing);
        assert_eq!(s.player.actor.health, after_first - MONSTER_DAMAGE);
    }

    #[test]
    fn test_fresh_chaser_does_not_strike_from_buffer() {
        let mut s = state();
        let player = s.player.actor.pos;
        let reach = MONSTER_ATTACK_RANGE + s.player.actor.radius;
        add_hostile(&mut s, player + Vec2::new(reach + MONSTER_HIT_BUFFER * 0.5 + 3.0, 0.0));
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Chasing);
        assert_eq!(s.player.actor.health, s.player.actor.max_health);
    }

    #[test]
    fn test_wolf_bites_hostile_pressed_against_wall() {
        let mut s = state();
        let player = s.player.actor.pos;
        let start = player + Vec2::new(150.0, 0.0);
        // Corner of a wall just ahead of the hostile, below its line of sight
        s.walls.push(Wall {
            id: EntityId(900),
            rect: Rect::new(start.x - 60.0, start.y + 9.0, 51.0, 40.0),
            tier: 1,
        });
        let h = add_hostile(&mut s, start);
        add_wolf(&mut s, start - Vec2::new(12.0 + FOREST_WOLF_RADIUS + 0.5, 0.0));

        update_hostiles(&mut s, FRAME);
        let hostile = &s.hostiles[0];
        assert_eq!(hostile.id, h);
        assert_eq!(hostile.state, HostileState::Chasing);
        assert_eq!(hostile.actor.health, MONSTER_HEALTH - FOREST_WOLF_CONTACT_DAMAGE);
    }

    #[test]
    fn test_wall_hides_player() {
        let mut s = state();
        let player = s.player.actor.pos;
        s.walls.push(Wall {
            id: EntityId(900),
            rect: Rect::new(player.x + 40.0, player.y - 200.0, 15.0, 400.0),
            tier: 1,
        });
        add_hostile(&mut s, player + Vec2::new(100.0, 0.0));
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Idle);

        s.walls.clear();
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].state, HostileState::Chasing);
    }

    #[test]
    fn test_prefers_nearest_minion() {
        let mut s = state();
        let player = s.player.actor.pos;
        let minion = add_minion(&mut s, MinionKind::Undead, player + Vec2::new(150.0, 0.0));
        add_hostile(&mut s, player + Vec2::new(200.0, 0.0));
        update_hostiles(&mut s, FRAME);
        assert_eq!(s.hostiles[0].target.map(|t| t.id), Some(minion));
    }
}

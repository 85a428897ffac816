//! Projectile advance and hit resolution
//!
//! A projectile damages at most one thing, then dies. Walls stop it cold,
//! solid world objects take a fraction of its damage, and creatures take the
//! full amount: player-side shots hit hostiles and bosses, boss shots hit the
//! player.

use glam::Vec2;

use crate::frame_scale;
use crate::sim::combat::{self, KillCredit};
use crate::sim::entity::{EntityKind, EntityRef, ProjectileOwner};
use crate::sim::state::{GamePhase, GameState};

/// Share of a projectile's damage dealt to a world object
pub const OBJECT_DAMAGE_MULT: f32 = 0.5;

/// What a projectile ran into this step
#[derive(Debug, Clone, Copy, PartialEq)]
enum Impact {
    Wall,
    Object(EntityRef),
    Creature(EntityRef),
}

pub fn update_projectiles(state: &mut GameState, dt_ms: f64) {
    let scale = frame_scale(dt_ms);
    let bounds = state.world.bounds();

    // Index loop: each hit is applied before the next projectile looks for a
    // victim, so nothing is hit after it died this tick
    for idx in 0..state.projectiles.len() {
        let (pos, radius, owner, damage) = {
            let p = &mut state.projectiles[idx];
            if !p.live {
                continue;
            }
            let step = p.vel * scale;
            p.pos += step;
            p.traveled += step.length();
            if p.traveled > p.range || !bounds.contains(p.pos) {
                p.live = false;
                continue;
            }
            (p.pos, p.radius, p.owner, p.damage)
        };

        let Some(impact) = find_impact(state, pos, radius, owner) else {
            continue;
        };
        state.projectiles[idx].live = false;

        match impact {
            Impact::Wall => {}
            Impact::Object(victim) => {
                combat::deal_damage(state, victim, damage * OBJECT_DAMAGE_MULT, credit_for(owner));
            }
            Impact::Creature(victim) => match owner {
                ProjectileOwner::Player => {
                    combat::player_strike(state, victim, damage);
                }
                _ => {
                    combat::deal_damage(state, victim, damage, credit_for(owner));
                }
            },
        }
    }
}

fn credit_for(owner: ProjectileOwner) -> KillCredit {
    match owner {
        ProjectileOwner::Player => KillCredit::Player,
        ProjectileOwner::Pet => KillCredit::Pet,
        ProjectileOwner::Boss(_) => KillCredit::Boss,
    }
}

fn find_impact(state: &GameState, pos: Vec2, radius: f32, owner: ProjectileOwner) -> Option<Impact> {
    if state.walls.iter().any(|w| w.rect.overlaps_circle(pos, radius)) {
        return Some(Impact::Wall);
    }

    let touches = |center: Vec2, r: f32| center.distance(pos) < r + radius;

    if let Some(o) = state
        .objects
        .iter()
        .find(|o| o.actor.solid && o.actor.is_alive() && touches(o.actor.pos, o.actor.radius))
    {
        return Some(Impact::Object(EntityRef::new(EntityKind::Object, o.id)));
    }

    if owner.is_friendly() {
        let hostile = state
            .hostiles
            .iter()
            .filter(|h| h.actor.is_alive() && touches(h.actor.pos, h.actor.radius))
            .map(|h| EntityRef::new(EntityKind::Hostile, h.id));
        let boss = state
            .bosses
            .iter()
            .filter(|b| b.actor.is_alive() && touches(b.actor.pos, b.actor.radius))
            .map(|b| EntityRef::new(EntityKind::Boss, b.id));
        hostile.chain(boss).next().map(Impact::Creature)
    } else {
        let player = &state.player.actor;
        (state.phase == GamePhase::Playing
            && player.is_alive()
            && touches(player.pos, player.radius))
        .then(|| Impact::Creature(state.player_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityId;
    use crate::consts::*;
    use crate::sim::entity::Projectile;
    use crate::sim::geometry::{Rect, Wall};
    use crate::sim::items::ObjectKind;
    use crate::sim::player::PlayerClass;
    use crate::sim::state::test_support::*;

    fn fire(state: &mut GameState, owner: ProjectileOwner, pos: Vec2, dir: Vec2, damage: f32) {
        let id = state.next_entity_id();
        state.projectiles.push(Projectile {
            id,
            owner,
            pos,
            vel: dir * 8.0,
            radius: ARROW_RADIUS,
            damage,
            range: 400.0,
            traveled: 0.0,
            live: true,
        });
    }

    fn run(state: &mut GameState, frames: usize) {
        for _ in 0..frames {
            update_projectiles(state, FRAME_MS);
        }
    }

    #[test]
    fn test_expires_after_range() {
        let mut s = state();
        let origin = s.player.actor.pos + Vec2::new(0.0, 100.0);
        fire(&mut s, ProjectileOwner::Player, origin, Vec2::X, 10.0);
        run(&mut s, 50);
        assert!(s.projectiles[0].live);
        run(&mut s, 1);
        assert!(!s.projectiles[0].live);
    }

    #[test]
    fn test_single_target_no_piercing() {
        let mut s = state();
        let origin = s.player.actor.pos + Vec2::new(0.0, 100.0);
        let a = add_hostile(&mut s, origin + Vec2::new(40.0, 0.0));
        let b = add_hostile(&mut s, origin + Vec2::new(45.0, 0.0));
        fire(&mut s, ProjectileOwner::Player, origin, Vec2::X, 10.0);
        run(&mut s, 10);

        let health = |s: &GameState, id| {
            s.actor(EntityRef::new(EntityKind::Hostile, id)).map(|a| a.health)
        };
        let total_lost = 2.0 * MONSTER_HEALTH - health(&s, a).unwrap() - health(&s, b).unwrap();
        assert_eq!(total_lost, 10.0);
        assert!(!s.projectiles[0].live);
    }

    #[test]
    fn test_wall_stops_projectile() {
        let mut s = state();
        let origin = s.player.actor.pos + Vec2::new(0.0, 100.0);
        s.walls.push(Wall {
            id: EntityId(900),
            rect: Rect::new(origin.x + 20.0, origin.y - 50.0, 15.0, 100.0),
            tier: 1,
        });
        let h = add_hostile(&mut s, origin + Vec2::new(60.0, 0.0));
        fire(&mut s, ProjectileOwner::Player, origin, Vec2::X, 10.0);
        run(&mut s, 20);
        assert!(!s.projectiles[0].live);
        assert_eq!(s.actor(EntityRef::new(EntityKind::Hostile, h)).unwrap().health, MONSTER_HEALTH);
    }

    #[test]
    fn test_object_takes_partial_damage() {
        let mut s = state();
        let origin = s.player.actor.pos + Vec2::new(0.0, 100.0);
        let tree = add_object(&mut s, ObjectKind::Tree, origin + Vec2::new(40.0, 0.0));
        fire(&mut s, ProjectileOwner::Pet, origin, Vec2::X, 10.0);
        run(&mut s, 10);
        let (_, full) = ObjectKind::Tree.base_stats();
        let hp = s.actor(EntityRef::new(EntityKind::Object, tree)).unwrap().health;
        assert_eq!(hp, full - 10.0 * OBJECT_DAMAGE_MULT);
    }

    #[test]
    fn test_boss_shot_hits_player_only() {
        let mut s = state();
        let player = s.player.actor.pos;
        add_hostile(&mut s, player + Vec2::new(-40.0, 0.0));
        fire(
            &mut s,
            ProjectileOwner::Boss(EntityId(77)),
            player + Vec2::new(-80.0, 0.0),
            Vec2::X,
            JUNGLE_BOSS_PROJECTILE_DAMAGE,
        );
        run(&mut s, 10);
        assert_eq!(s.hostiles[0].actor.health, MONSTER_HEALTH);
        assert_eq!(
            s.player.actor.health,
            s.player.actor.max_health - JUNGLE_BOSS_PROJECTILE_DAMAGE
        );
    }

    #[test]
    fn test_arrow_lifesteal_applies() {
        let mut s = state_with(PlayerClass::Vampire);
        s.player.actor.health = 20.0;
        let origin = s.player.actor.pos + Vec2::new(0.0, 100.0);
        add_hostile(&mut s, origin + Vec2::new(40.0, 0.0));
        fire(&mut s, ProjectileOwner::Player, origin, Vec2::X, 10.0);
        run(&mut s, 10);
        assert_eq!(s.player.actor.health, 22.5);
    }
}

//! Boss scripts, selected by the boss's brain
//!
//! - Patrol: wanders an arena, commits to one of three melee attacks
//! - Territorial: runs between forest corners trampling whatever it touches
//! - Ranged: stays inside the lake and shoots at the nearest visible target

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::{nearest_visible, step_toward};
use crate::consts::*;
use crate::sim::collision::{ObstacleMask, ObstacleSet};
use crate::sim::combat::{self, KillCredit};
use crate::sim::entity::{
    ActiveAttack, BossAttack, BossBrain, EntityKind, EntityRef, PatrolMode, Projectile,
    ProjectileOwner, TerritorialBrain,
};
use crate::sim::geometry::Rect;
use crate::sim::state::{GameState, Resolved};
use crate::{EntityId, angle_of, frame_scale};

/// Extra reach a committed hit keeps when it lands
const HIT_LEEWAY: f32 = 10.0;
/// Random offset applied to each corner destination
const CORNER_JITTER: f32 = 22.5;

pub fn update_bosses(state: &mut GameState, dt_ms: f64) {
    let scale = frame_scale(dt_ms);
    let targets = state.hostile_targets();
    let obstacles = ObstacleSet::gather(
        state,
        ObstacleMask {
            bosses: false,
            ..ObstacleMask::ALL
        },
    );
    let walls_only = ObstacleSet::gather(state, ObstacleMask::WALLS);

    // Bosses spawned during this pass wait for the next tick
    let count = state.bosses.len();
    for idx in 0..count {
        if !state.bosses[idx].actor.is_alive() {
            continue;
        }
        match state.bosses[idx].brain {
            BossBrain::Patrol(_) => update_patrol(state, idx, scale, &obstacles, &targets),
            BossBrain::Territorial(_) => update_territorial(state, idx, scale, &walls_only),
            BossBrain::Ranged(_) => update_ranged(state, idx, scale, &targets),
        }
    }
}

/// Attacks whose reach covers a target at `dist`
pub fn eligible_attacks(dist: f32, target_radius: f32) -> Vec<BossAttack> {
    let mut eligible = Vec::with_capacity(3);
    if dist <= BOSS_HIT_RANGE {
        eligible.push(BossAttack::Hit);
    }
    if dist <= BOSS_SMASH_RANGE {
        eligible.push(BossAttack::Smash);
    }
    if dist <= BOSS_SPIN_RANGE + target_radius {
        eligible.push(BossAttack::Spin);
    }
    eligible
}

/// Uniform pick among the eligible attacks
pub fn choose_attack(eligible: &[BossAttack], rng: &mut impl Rng) -> Option<BossAttack> {
    eligible.choose(rng).copied()
}

fn attack_duration(kind: BossAttack) -> f64 {
    match kind {
        BossAttack::Hit => BOSS_HIT_DURATION_MS,
        BossAttack::Smash => BOSS_SMASH_WINDUP_MS + BOSS_SMASH_EFFECT_MS,
        BossAttack::Spin => BOSS_SPIN_DURATION_MS,
    }
}

fn update_patrol(
    state: &mut GameState,
    idx: usize,
    scale: f32,
    obstacles: &ObstacleSet,
    targets: &[Resolved],
) {
    let now = state.time_ms;
    let mut hits: Vec<(EntityRef, f32)> = Vec::new();

    {
        let walls = &state.walls;
        let rng = &mut state.rng;
        let boss = &mut state.bosses[idx];
        let BossBrain::Patrol(brain) = &mut boss.brain else {
            return;
        };
        let pos = boss.actor.pos;

        // Committed attack: movement is suspended until it finishes
        if let Some(attack) = brain.attack.as_mut() {
            let elapsed = now - attack.started_ms;
            match attack.kind {
                BossAttack::Hit => {
                    if !attack.landed && elapsed >= BOSS_HIT_LAND_MS {
                        attack.landed = true;
                        let victim = attack
                            .target
                            .and_then(|r| targets.iter().find(|t| t.target == r));
                        if let Some(t) = victim
                            && pos.distance(t.pos) <= BOSS_HIT_RANGE + HIT_LEEWAY
                        {
                            hits.push((t.target, BOSS_HIT_DAMAGE));
                        }
                    }
                }
                BossAttack::Smash => {
                    if !attack.landed && elapsed >= BOSS_SMASH_WINDUP_MS {
                        attack.landed = true;
                        hits.extend(
                            targets
                                .iter()
                                .filter(|t| pos.distance(t.pos) <= BOSS_SMASH_RANGE)
                                .map(|t| (t.target, BOSS_SMASH_DAMAGE)),
                        );
                    }
                }
                BossAttack::Spin => {
                    if elapsed < BOSS_SPIN_DURATION_MS
                        && now - attack.last_pulse_ms >= BOSS_SPIN_INTERVAL_MS
                    {
                        attack.last_pulse_ms = now;
                        hits.extend(
                            targets
                                .iter()
                                .filter(|t| pos.distance(t.pos) <= BOSS_SPIN_RANGE + t.radius)
                                .map(|t| (t.target, BOSS_SPIN_DAMAGE)),
                        );
                    }
                }
            }

            if elapsed >= attack_duration(attack.kind) {
                brain.attack = None;
                brain.mode = PatrolMode::Chasing;
                brain.last_attack_ms = now;
            }
        } else {
            let target = nearest_visible(pos, Some(PLAINS_BOSS_DETECT_RANGE), targets, walls);
            brain.target = target.map(|t| t.target);

            let destination = match target {
                Some(t) => {
                    brain.mode = PatrolMode::Chasing;
                    brain.waypoint = None;
                    let dist = pos.distance(t.pos);
                    let ready = now - brain.last_attack_ms >= PLAINS_BOSS_ATTACK_COOLDOWN_MS
                        && now - brain.last_choice_ms >= PLAINS_BOSS_ATTACK_CHOICE_COOLDOWN_MS;
                    let choice = if ready {
                        choose_attack(&eligible_attacks(dist, t.radius), rng)
                    } else {
                        None
                    };

                    match choice {
                        Some(kind) => {
                            log::debug!("{} commits to {:?}", boss.kind.name(), kind);
                            brain.mode = PatrolMode::Attacking;
                            brain.last_choice_ms = now;
                            brain.attack = Some(ActiveAttack {
                                kind,
                                started_ms: now,
                                target: Some(t.target),
                                landed: false,
                                last_pulse_ms: f64::NEG_INFINITY,
                            });
                            None
                        }
                        // Close enough to swing; hold position
                        None if dist <= BOSS_HIT_RANGE * 0.9 => None,
                        None => Some(t.pos),
                    }
                }
                None => {
                    brain.mode = PatrolMode::Patrolling;
                    let reached = brain
                        .waypoint
                        .is_none_or(|w| pos.distance(w) <= BOSS_WAYPOINT_REACHED);
                    if reached {
                        brain.waypoint = Some(random_point(&brain.arena, boss.actor.radius, rng));
                    }
                    brain.waypoint
                }
            };

            if let Some(dest) = destination {
                let delta = step_toward(pos, dest, boss.speed, scale);
                if delta != Vec2::ZERO {
                    boss.facing = angle_of(delta);
                    let slide = obstacles.slide(pos, delta, boss.actor.radius, Some(boss.id));
                    boss.actor.pos = slide.pos;
                    // A wall between the boss and its waypoint: pick another one
                    if slide.pos == pos && target.is_none() {
                        brain.waypoint = None;
                    }
                }
            }
        }
    }

    for (victim, damage) in hits {
        combat::deal_damage(state, victim, damage, KillCredit::Boss);
    }
}

fn random_point(area: &Rect, radius: f32, rng: &mut impl Rng) -> Vec2 {
    let p = Vec2::new(
        area.x + rng.random::<f32>() * area.width,
        area.y + rng.random::<f32>() * area.height,
    );
    area.clamp_circle(p, radius)
}

/// Corners of the territory, inset so the boss fits
fn corners(territory: &Rect, radius: f32) -> [Vec2; 4] {
    let min = territory.min();
    let max = territory.max();
    [
        Vec2::new(min.x, min.y),
        Vec2::new(max.x, min.y),
        Vec2::new(max.x, max.y),
        Vec2::new(min.x, max.y),
    ]
    .map(|c| territory.clamp_circle(c, radius))
}

/// Pick a new corner, never the current one, with a little jitter
pub fn pick_corner(brain: &mut TerritorialBrain, radius: f32, now: f64, rng: &mut impl Rng) {
    let choices: Vec<usize> = (0..4).filter(|&i| Some(i) != brain.corner).collect();
    let Some(&corner) = choices.choose(rng) else {
        return;
    };
    let jitter = Vec2::new(
        rng.random_range(-CORNER_JITTER..CORNER_JITTER),
        rng.random_range(-CORNER_JITTER..CORNER_JITTER),
    );
    let base = corners(&brain.territory, radius)[corner];
    brain.corner = Some(corner);
    brain.destination = brain.territory.clamp_circle(base + jitter, radius);
    brain.last_corner_change_ms = now;
}

fn update_territorial(state: &mut GameState, idx: usize, scale: f32, walls_only: &ObstacleSet) {
    let now = state.time_ms;
    let (wolf_id, pos, radius) = {
        let rng = &mut state.rng;
        let boss = &mut state.bosses[idx];
        let BossBrain::Territorial(brain) = &mut boss.brain else {
            return;
        };
        let radius = boss.actor.radius;
        let pos = boss.actor.pos;

        let arrived = pos.distance(brain.destination) <= FOREST_WOLF_CORNER_THRESHOLD;
        let timed_out = now - brain.last_corner_change_ms >= FOREST_WOLF_CORNER_TIMEOUT_MS;
        if brain.corner.is_none() || arrived || timed_out {
            pick_corner(brain, radius, now, rng);
        }

        let delta = step_toward(pos, brain.destination, boss.speed, scale);
        if delta != Vec2::ZERO {
            boss.facing = angle_of(delta);
        }
        let slide = walls_only.slide(pos, delta, radius, Some(boss.id));
        boss.actor.pos = brain.territory.clamp_circle(slide.pos, radius);
        (boss.id, boss.actor.pos, radius)
    };

    // Trample terrain; placed structures survive
    let trampled: Vec<EntityRef> = state
        .objects
        .iter()
        .filter(|o| o.actor.is_alive() && !o.kind.is_placed())
        .filter(|o| o.actor.pos.distance(pos) < FOREST_WOLF_TREE_DESTROY_RADIUS + o.actor.radius)
        .map(|o| EntityRef::new(EntityKind::Object, o.id))
        .collect();
    for victim in trampled {
        if let Some(health) = state.actor(victim).map(|a| a.health) {
            combat::deal_damage(state, victim, health, KillCredit::Environment);
        }
    }

    let touching: Vec<EntityRef> = state
        .hostile_targets()
        .into_iter()
        .chain(
            state
                .hostiles
                .iter()
                .filter(|h| h.actor.is_alive())
                .map(|h| Resolved {
                    target: EntityRef::new(EntityKind::Hostile, h.id),
                    pos: h.actor.pos,
                    radius: h.actor.radius,
                }),
        )
        .filter(|t| t.pos.distance(pos) < radius + t.radius)
        .map(|t| t.target)
        .collect();
    for victim in touching {
        combat::wolf_contact(state, wolf_id, victim);
    }
}

fn update_ranged(state: &mut GameState, idx: usize, scale: f32, targets: &[Resolved]) {
    let now = state.time_ms;
    let shot = {
        let walls = &state.walls;
        let boss = &mut state.bosses[idx];
        let BossBrain::Ranged(brain) = &mut boss.brain else {
            return;
        };
        let pos = boss.actor.pos;
        let radius = boss.actor.radius;

        let target = nearest_visible(pos, None, targets, walls);
        brain.target = target.map(|t| t.target);
        let Some(target) = target else {
            return;
        };

        // Out-of-bounds steps are pulled back inside rather than blocked
        let delta = step_toward(pos, target.pos, boss.speed, scale);
        boss.actor.pos = brain.lake.clamp_circle(pos + delta, radius);
        if delta != Vec2::ZERO {
            boss.facing = angle_of(delta);
        }

        if now - brain.last_shot_ms < JUNGLE_BOSS_ATTACK_COOLDOWN_MS {
            return;
        }
        let dir = (target.pos - boss.actor.pos).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        brain.last_shot_ms = now;
        (boss.id, boss.actor.pos + dir * (radius + JUNGLE_BOSS_PROJECTILE_RADIUS), dir)
    };

    let (owner, origin, dir): (EntityId, Vec2, Vec2) = shot;
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        owner: ProjectileOwner::Boss(owner),
        pos: origin,
        vel: dir * JUNGLE_BOSS_PROJECTILE_SPEED,
        radius: JUNGLE_BOSS_PROJECTILE_RADIUS,
        damage: JUNGLE_BOSS_PROJECTILE_DAMAGE,
        range: JUNGLE_BOSS_PROJECTILE_RANGE,
        traveled: 0.0,
        live: true,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{
        Actor, Boss, BossKind, MinionKind, PatrolBrain, RangedBrain,
    };
    use crate::sim::items::ObjectKind;
    use crate::sim::state::test_support::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn push_boss(state: &mut GameState, kind: BossKind, pos: Vec2, brain: BossBrain) -> EntityId {
        let id = state.next_entity_id();
        let (radius, health, speed) = match kind {
            BossKind::Plains => (PLAINS_BOSS_RADIUS, PLAINS_BOSS_HEALTH, PLAINS_BOSS_SPEED),
            BossKind::ForestWolf => (
                FOREST_WOLF_RADIUS,
                FOREST_WOLF_HEALTH,
                MONSTER_SPEED * FOREST_WOLF_SPEED_MULT,
            ),
            BossKind::Jungle => (JUNGLE_BOSS_RADIUS, JUNGLE_BOSS_HEALTH, JUNGLE_BOSS_SPEED),
        };
        state.bosses.push(Boss {
            id,
            kind,
            actor: Actor::new(pos, radius, health).solid(),
            speed,
            facing: 0.0,
            brain,
            loot_dropped: false,
        });
        id
    }

    fn patrol_brain(arena: Rect) -> BossBrain {
        BossBrain::Patrol(PatrolBrain {
            mode: PatrolMode::Patrolling,
            arena,
            waypoint: None,
            target: None,
            last_attack_ms: f64::NEG_INFINITY,
            last_choice_ms: f64::NEG_INFINITY,
            attack: None,
        })
    }

    fn territorial_brain(territory: Rect) -> BossBrain {
        BossBrain::Territorial(TerritorialBrain {
            territory,
            corner: None,
            destination: territory.center(),
            last_corner_change_ms: 0.0,
            contact_log: Vec::new(),
        })
    }

    #[test]
    fn test_attack_selection_is_uniform() {
        let mut rng = Pcg32::seed_from_u64(42);
        // 80 units: out of hit and spin reach, inside smash
        assert_eq!(eligible_attacks(80.0, 15.0), vec![BossAttack::Smash]);

        let eligible = eligible_attacks(62.0, 15.0);
        assert_eq!(
            eligible,
            vec![BossAttack::Hit, BossAttack::Smash, BossAttack::Spin]
        );

        let mut counts = [0usize; 3];
        let trials = 3000;
        for _ in 0..trials {
            match choose_attack(&eligible, &mut rng) {
                Some(BossAttack::Hit) => counts[0] += 1,
                Some(BossAttack::Smash) => counts[1] += 1,
                Some(BossAttack::Spin) => counts[2] += 1,
                None => panic!("no attack chosen"),
            }
        }
        for count in counts {
            assert!(count > 850 && count < 1150, "counts {:?}", counts);
        }
        assert!(choose_attack(&[], &mut rng).is_none());
    }

    #[test]
    fn test_patrol_boss_commits_and_hit_lands_once() {
        let mut s = state();
        let player = s.player.actor.pos;
        let arena = Rect::new(player.x - 500.0, player.y - 500.0, 1000.0, 1000.0);
        push_boss(&mut s, BossKind::Plains, player + Vec2::new(50.0, 0.0), patrol_brain(arena));

        update_bosses(&mut s, FRAME_MS);
        let kind = match &s.bosses[0].brain {
            BossBrain::Patrol(b) => {
                assert_eq!(b.mode, PatrolMode::Attacking);
                b.attack.as_ref().map(|a| a.kind)
            }
            _ => None,
        };
        let kind = kind.unwrap();
        let start = s.bosses[0].actor.pos;

        let mut elapsed = 0.0;
        while elapsed <= attack_duration(kind) {
            s.time_ms += FRAME_MS;
            elapsed += FRAME_MS;
            update_bosses(&mut s, FRAME_MS);
            if elapsed < attack_duration(kind) {
                // Movement suspended while committed
                assert_eq!(s.bosses[0].actor.pos, start);
            }
        }

        let lost = s.player.actor.max_health - s.player.actor.health;
        let expected = match kind {
            BossAttack::Hit => BOSS_HIT_DAMAGE,
            BossAttack::Smash => BOSS_SMASH_DAMAGE,
            BossAttack::Spin => BOSS_SPIN_DAMAGE * 4.0,
        };
        assert!((lost - expected).abs() < 1e-3, "{:?} dealt {}", kind, lost);
        match &s.bosses[0].brain {
            BossBrain::Patrol(b) => assert!(b.attack.is_none()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_patrol_boss_wanders_without_target() {
        let mut s = state();
        let far = s.player.actor.pos + Vec2::new(3000.0, 0.0);
        let arena = Rect::new(far.x - 300.0, far.y - 300.0, 600.0, 600.0);
        push_boss(&mut s, BossKind::Plains, far, patrol_brain(arena));
        for _ in 0..30 {
            s.time_ms += FRAME_MS;
            update_bosses(&mut s, FRAME_MS);
        }
        match &s.bosses[0].brain {
            BossBrain::Patrol(b) => {
                assert_eq!(b.mode, PatrolMode::Patrolling);
                assert!(b.waypoint.is_some_and(|w| arena.contains(w)));
            }
            _ => unreachable!(),
        }
        assert_ne!(s.bosses[0].actor.pos, far);
    }

    #[test]
    fn test_corner_never_repeats() {
        let territory = Rect::new(0.0, 0.0, 1000.0, 800.0);
        let mut brain = match territorial_brain(territory) {
            BossBrain::Territorial(b) => b,
            _ => unreachable!(),
        };
        let mut rng = Pcg32::seed_from_u64(3);
        let mut last = None;
        for i in 0..50 {
            pick_corner(&mut brain, FOREST_WOLF_RADIUS, i as f64, &mut rng);
            assert_ne!(brain.corner, last);
            assert!(territory.contains(brain.destination));
            last = brain.corner;
        }
    }

    #[test]
    fn test_wolf_tramples_terrain_and_hits_bystanders() {
        let mut s = state();
        let center = s.player.actor.pos + Vec2::new(1000.0, 0.0);
        let territory = Rect::new(center.x - 500.0, center.y - 500.0, 1000.0, 1000.0);
        let wolf = push_boss(&mut s, BossKind::ForestWolf, center, territorial_brain(territory));
        let tree = add_object(&mut s, ObjectKind::Tree, center + Vec2::new(30.0, 0.0));
        let bed = add_object(
            &mut s,
            ObjectKind::Placed(crate::sim::items::ItemKind::IckyBed),
            center + Vec2::new(-30.0, 0.0),
        );
        let hostile = add_hostile(&mut s, center + Vec2::new(0.0, 40.0));
        let minion = add_minion(&mut s, MinionKind::Summon, center + Vec2::new(0.0, -40.0));

        update_bosses(&mut s, FRAME_MS);

        let alive = |s: &GameState, r| s.resolve(r).is_some();
        assert!(!alive(&s, EntityRef::new(EntityKind::Object, tree)));
        assert!(alive(&s, EntityRef::new(EntityKind::Object, bed)));
        assert!(s.drops.is_empty());
        // 100 health hostile, 90 contact
        let h = s.hostiles.iter().find(|h| h.id == hostile).unwrap();
        assert_eq!(h.actor.health, MONSTER_HEALTH - FOREST_WOLF_CONTACT_DAMAGE);
        assert!(!alive(&s, EntityRef::new(EntityKind::Summon, minion)));

        // Still overlapping next frame, but inside the per-victim cooldown
        s.bosses[0].actor.pos = center;
        s.hostiles[0].actor.pos = center + Vec2::new(0.0, 40.0);
        s.time_ms += FRAME_MS;
        update_bosses(&mut s, FRAME_MS);
        let h = s.hostiles.iter().find(|h| h.id == hostile).unwrap();
        assert!(h.actor.is_alive());
        assert!(s.bosses.iter().any(|b| b.id == wolf));
    }

    #[test]
    fn test_lake_boss_clamped_and_fires() {
        let mut s = state();
        let player = s.player.actor.pos;
        let lake = Rect::new(player.x + 300.0, player.y - 200.0, 400.0, 400.0);
        let start = lake.center();
        let id = push_boss(
            &mut s,
            BossKind::Jungle,
            start,
            BossBrain::Ranged(RangedBrain {
                lake,
                target: None,
                last_shot_ms: f64::NEG_INFINITY,
            }),
        );

        update_bosses(&mut s, FRAME_MS);
        assert_eq!(s.projectiles.len(), 1);
        let shot = &s.projectiles[0];
        assert_eq!(shot.owner, ProjectileOwner::Boss(id));
        assert!(shot.vel.x < 0.0);

        // Walk it toward the player for a long while; it never leaves the lake
        for _ in 0..590 {
            s.time_ms += FRAME_MS;
            update_bosses(&mut s, FRAME_MS);
        }
        let pos = s.bosses[0].actor.pos;
        assert!((pos.x - (lake.x + JUNGLE_BOSS_RADIUS)).abs() < 1e-3);
        // One shot per 2000 ms over ~9.8 s
        assert_eq!(s.projectiles.len(), 5);
    }
}

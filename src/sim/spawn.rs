//! Spawning: world population, the nightly horde, bosses and minions
//!
//! Placement is rejection sampling against a static obstacle snapshot. Every
//! loop is bounded by an attempt budget; running out logs a warning and keeps
//! whatever was placed.

use glam::Vec2;
use rand::Rng;

use super::collision::{Obstacle, ObstacleKind, ObstacleMask, ObstacleSet, Shape};
use super::entity::{
    Actor, Boss, BossBrain, BossKind, Hostile, HostileState, Minion, MinionKind, MinionState,
    PatrolBrain, PatrolMode, RangedBrain, TerritorialBrain, WorldObject,
};
use super::geometry::{Rect, Wall};
use super::items::{ItemKind, ObjectKind};
use super::state::{GameEvent, GameState};
use super::world::Biome;
use crate::consts::*;
use crate::{EntityId, heading};

/// Attempts per boss placement before falling back to a fixed point
const BOSS_SPAWN_ATTEMPTS: usize = 50;
const PLAINS_BOSS_EDGE_BUFFER: f32 = 50.0;
const FOREST_WOLF_EDGE_BUFFER: f32 = 80.0;
/// Base per-attempt chance of a scattered resource, scaled by biome
const SCATTER_CHANCE: f32 = 0.05;
/// Gap between the player's edge and a new minion's edge
const SUMMON_GAP: f32 = 5.0;
/// Undead rise with a little positional noise
const UNDEAD_JITTER: f32 = 5.0;

/// Generate walls, resources, hostiles and (optionally) bosses
pub fn populate_world(state: &mut GameState) {
    log::info!(
        "Generating {}x{} world (seed {})",
        state.world.width,
        state.world.height,
        state.seed
    );

    for spec in state.world.wall_specs() {
        let id = state.next_entity_id();
        state.walls.push(Wall {
            id,
            rect: spec.rect,
            tier: spec.tier,
        });
    }

    let mut obstacles = ObstacleSet::gather(state, ObstacleMask::STATIC);
    let tuning = state.tuning.clone();

    let trees = place_biome_objects(
        state,
        &mut obstacles,
        ObjectKind::Tree,
        Biome::Forest,
        tuning.forest_trees,
        tuning.forest_trees * 25,
    );
    let rocks = place_biome_objects(
        state,
        &mut obstacles,
        ObjectKind::Rock,
        Biome::Rocky,
        tuning.rocky_rocks,
        tuning.rocky_rocks * 15,
    );
    let bones = place_biome_objects(
        state,
        &mut obstacles,
        ObjectKind::BoneTree,
        Biome::Badlands,
        tuning.bone_trees,
        tuning.bone_trees * 50,
    );
    let scattered = scatter_resources(state, &mut obstacles, tuning.scattered_resources);
    log::info!(
        "Placed {} forest trees, {} rocks, {} bone trees, {} scattered resources",
        trees,
        rocks,
        bones,
        scattered
    );

    let monsters = spawn_hostiles(state, &obstacles, tuning.initial_monsters);
    log::info!("Spawned {} monsters", monsters);

    if tuning.spawn_bosses {
        spawn_plains_boss(state);
        spawn_forest_wolf(state);
    }

    // Starting kit
    state.player.inventory.set_hotbar(0, ItemKind::WoodSword, 1);
    state.player.inventory.set_hotbar(1, ItemKind::WoodPickaxe, 1);
}

fn random_point(area: Rect, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        area.x + rng.random::<f32>() * area.width,
        area.y + rng.random::<f32>() * area.height,
    )
}

fn push_object(state: &mut GameState, obstacles: &mut ObstacleSet, kind: ObjectKind, pos: Vec2) {
    let id = state.next_entity_id();
    let object = WorldObject::new(id, kind, pos);
    obstacles.obstacles.push(Obstacle {
        id,
        kind: ObstacleKind::Object,
        shape: Shape::Circle {
            center: pos,
            radius: object.actor.radius,
        },
        hazard: false,
    });
    state.objects.push(object);
}

/// Fill one biome cell with a single object kind
fn place_biome_objects(
    state: &mut GameState,
    obstacles: &mut ObstacleSet,
    kind: ObjectKind,
    biome: Biome,
    target: usize,
    max_attempts: usize,
) -> usize {
    let area = state.world.biome_rect(biome);
    let (radius, _) = kind.base_stats();
    let mut placed = 0;
    let mut attempts = 0;
    while placed < target && attempts < max_attempts {
        attempts += 1;
        let p = random_point(area, &mut state.rng);
        if state.world.biome_at(p) != biome || obstacles.check(p, radius, None).is_some() {
            continue;
        }
        push_object(state, obstacles, kind, p);
        placed += 1;
    }
    if placed < target {
        log::warn!("Ran out of attempts placing {:?}: {}/{}", kind, placed, target);
    }
    placed
}

/// Biome-weighted trees, rocks and cacti outside the dedicated biomes
fn scatter_resources(state: &mut GameState, obstacles: &mut ObstacleSet, target: usize) -> usize {
    let bounds = state.world.bounds();
    let max_attempts = target * 15;
    let mut placed = 0;
    let mut attempts = 0;
    while placed < target && attempts < max_attempts {
        attempts += 1;
        let p = random_point(bounds, &mut state.rng);
        let biome = state.world.biome_at(p);
        if matches!(biome, Biome::Rocky | Biome::Badlands | Biome::Forest)
            || state.world.is_hazard(p)
        {
            continue;
        }
        let density = biome.density();
        if state.rng.random::<f32>() > SCATTER_CHANCE * density.spawn_multiplier {
            continue;
        }

        let total = density.tree + density.rock + density.cactus;
        if total <= 0.0 {
            continue;
        }
        let roll = state.rng.random::<f32>() * total;
        let kind = if roll < density.tree {
            ObjectKind::Tree
        } else if roll < density.tree + density.rock {
            ObjectKind::Rock
        } else if biome == Biome::Desert {
            ObjectKind::Cactus
        } else {
            continue;
        };

        let (radius, _) = kind.base_stats();
        if obstacles.check(p, radius, None).is_some() {
            continue;
        }
        push_object(state, obstacles, kind, p);
        placed += 1;
    }
    if placed < target {
        log::warn!("Ran out of attempts scattering resources: {}/{}", placed, target);
    }
    placed
}

/// Append one hostile at `pos` with a random size
pub fn spawn_hostile(state: &mut GameState, pos: Vec2) -> EntityId {
    let id = state.next_entity_id();
    let radius = state.rng.random_range(MONSTER_MIN_RADIUS..MONSTER_MAX_RADIUS);
    state.hostiles.push(Hostile {
        id,
        actor: Actor::new(pos, radius, MONSTER_HEALTH),
        state: HostileState::Idle,
        target: None,
        last_attack_ms: f64::NEG_INFINITY,
    });
    log::debug!("Spawned hostile {:?} at ({:.0}, {:.0})", id, pos.x, pos.y);
    id
}

/// Up to `count` hostiles anywhere safe and away from the player
fn spawn_hostiles(state: &mut GameState, obstacles: &ObstacleSet, count: usize) -> usize {
    let bounds = state.world.bounds();
    let max_attempts = count * 5;
    let mut spawned = 0;
    let mut attempts = 0;
    while spawned < count && attempts < max_attempts {
        attempts += 1;
        let p = random_point(bounds, &mut state.rng);
        if state.world.is_hazard(p)
            || p.distance(state.player.actor.pos) < SPAWN_CLEARANCE
            || obstacles.check(p, MONSTER_MIN_RADIUS, None).is_some()
        {
            continue;
        }
        spawn_hostile(state, p);
        spawned += 1;
    }
    if spawned < count {
        log::warn!("Ran out of attempts spawning hostiles: {}/{}", spawned, count);
    }
    spawned
}

/// The once-per-night horde, bounded by the global hostile cap
pub fn nightly_spawn(state: &mut GameState) -> usize {
    let alive = state.hostiles.iter().filter(|h| h.actor.is_alive()).count();
    let room = state.tuning.max_monsters.saturating_sub(alive);
    let count = state.tuning.nightly_monster_spawn.min(room);
    if count == 0 {
        return 0;
    }
    let obstacles = ObstacleSet::gather(state, ObstacleMask::STATIC);
    let spawned = spawn_hostiles(state, &obstacles, count);
    log::info!("Night falls: {} monsters spawned ({} alive)", spawned, alive + spawned);
    spawned
}

/// Try random points inside `area`; fall back when every one is blocked
fn boss_spawn_point(state: &mut GameState, area: Rect, radius: f32, fallback: Vec2) -> Vec2 {
    let obstacles = ObstacleSet::gather(state, ObstacleMask::ALL);
    for _ in 0..BOSS_SPAWN_ATTEMPTS {
        let p = random_point(area, &mut state.rng);
        if obstacles.check(p, radius, None).is_none() {
            return p;
        }
    }
    log::warn!("No free boss spawn point found, using ({:.0}, {:.0})", fallback.x, fallback.y);
    fallback
}

fn push_boss(
    state: &mut GameState,
    kind: BossKind,
    actor: Actor,
    speed: f32,
    brain: BossBrain,
) -> EntityId {
    let id = state.next_entity_id();
    log::info!("Spawned {} at ({:.0}, {:.0})", kind.name(), actor.pos.x, actor.pos.y);
    state.bosses.push(Boss {
        id,
        kind,
        actor,
        speed,
        facing: 0.0,
        brain,
        loot_dropped: false,
    });
    state.push_event(GameEvent::BossSpawned { kind });
    id
}

fn inset(rect: Rect, by: f32) -> Rect {
    Rect::new(
        rect.x + by,
        rect.y + by,
        (rect.width - 2.0 * by).max(0.0),
        (rect.height - 2.0 * by).max(0.0),
    )
}

pub fn spawn_plains_boss(state: &mut GameState) -> EntityId {
    let arena = state.world.biome_rect(Biome::Plains);
    let fallback = state.world.center();
    let pos = boss_spawn_point(
        state,
        inset(arena, PLAINS_BOSS_EDGE_BUFFER),
        PLAINS_BOSS_RADIUS,
        fallback,
    );
    let brain = BossBrain::Patrol(PatrolBrain {
        mode: PatrolMode::Patrolling,
        arena,
        waypoint: None,
        target: None,
        last_attack_ms: f64::NEG_INFINITY,
        last_choice_ms: f64::NEG_INFINITY,
        attack: None,
    });
    let actor = Actor::new(pos, PLAINS_BOSS_RADIUS, PLAINS_BOSS_HEALTH).solid();
    push_boss(state, BossKind::Plains, actor, PLAINS_BOSS_SPEED, brain)
}

pub fn spawn_forest_wolf(state: &mut GameState) -> EntityId {
    let territory = state.world.biome_rect(Biome::Forest);
    let pos = boss_spawn_point(
        state,
        inset(territory, FOREST_WOLF_EDGE_BUFFER),
        FOREST_WOLF_RADIUS,
        territory.center(),
    );
    let brain = BossBrain::Territorial(TerritorialBrain {
        territory,
        corner: None,
        destination: pos,
        last_corner_change_ms: 0.0,
        contact_log: Vec::new(),
    });
    let actor = Actor::new(pos, FOREST_WOLF_RADIUS, FOREST_WOLF_HEALTH).solid();
    let speed = MONSTER_SPEED * FOREST_WOLF_SPEED_MULT;
    push_boss(state, BossKind::ForestWolf, actor, speed, brain)
}

/// Lake boss; only after the wolf falls, and never twice
pub fn spawn_jungle_boss(state: &mut GameState) -> Option<EntityId> {
    if !state.forest_wolf_defeated
        || state
            .bosses
            .iter()
            .any(|b| b.kind == BossKind::Jungle && b.actor.is_alive())
    {
        return None;
    }
    let lake = state.world.lake;
    let brain = BossBrain::Ranged(RangedBrain {
        lake,
        target: None,
        last_shot_ms: f64::NEG_INFINITY,
    });
    let actor = Actor::new(lake.center(), JUNGLE_BOSS_RADIUS, JUNGLE_BOSS_HEALTH).solid();
    Some(push_boss(state, BossKind::Jungle, actor, JUNGLE_BOSS_SPEED, brain))
}

/// Summon a minion in front of the player, evicting the oldest at the cap
pub fn summon_minion(state: &mut GameState, kind: MinionKind) -> Option<EntityId> {
    if !state.player.actor.is_alive() {
        return None;
    }
    let cap = match kind {
        MinionKind::Undead => state.player.max_undead(),
        MinionKind::Summon => state.player.max_summons(),
    };
    if cap == 0 {
        return None;
    }

    // Only the living count; the oldest are marked dead and compacted with the rest
    let pool = state.minion_pool_mut(kind);
    let mut living = pool.iter().filter(|m| m.actor.is_alive()).count();
    let mut evicted = Vec::new();
    for minion in pool.iter_mut().filter(|m| m.actor.is_alive()) {
        if living < cap {
            break;
        }
        minion.actor.destroy();
        evicted.push(minion.id);
        living -= 1;
    }
    for id in evicted {
        log::debug!("Evicted oldest {:?} minion {:?}", kind, id);
        state.push_event(GameEvent::MinionEvicted { id });
    }

    let player = &state.player;
    let (radius, health, speed, damage, cooldown, detect_range) = match kind {
        MinionKind::Undead => (
            UNDEAD_RADIUS,
            player.undead_health(),
            UNDEAD_SPEED,
            UNDEAD_DAMAGE,
            UNDEAD_ATTACK_COOLDOWN_MS,
            None,
        ),
        MinionKind::Summon => (
            SUMMONED_SLIME_RADIUS,
            player.summon_health(),
            SUMMONED_SLIME_SPEED,
            player.summon_damage(),
            SUMMONED_SLIME_ATTACK_COOLDOWN_MS,
            Some(SUMMONED_SLIME_DETECT_RANGE),
        ),
    };
    let mut pos =
        player.actor.pos + heading(player.facing) * (player.actor.radius + radius + SUMMON_GAP);
    if kind == MinionKind::Undead {
        pos += Vec2::new(
            state.rng.random_range(-UNDEAD_JITTER..UNDEAD_JITTER),
            state.rng.random_range(-UNDEAD_JITTER..UNDEAD_JITTER),
        );
    }

    let id = state.next_entity_id();
    let initial = match kind {
        MinionKind::Undead => MinionState::Idle,
        MinionKind::Summon => MinionState::Following,
    };
    state.minion_pool_mut(kind).push(Minion {
        id,
        kind,
        actor: Actor::new(pos, radius, health),
        state: initial,
        target: None,
        speed,
        damage,
        attack_cooldown_ms: cooldown,
        last_attack_ms: f64::NEG_INFINITY,
        detect_range,
    });
    log::debug!("Summoned {:?} {:?} (hp {:.0}, dmg {:.1})", kind, id, health, damage);
    state.push_event(GameEvent::Summoned { kind });
    Some(id)
}

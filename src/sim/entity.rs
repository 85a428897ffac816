//! Simulated entity types
//!
//! Every pool member carries an `EntityId`. Cross-entity references are
//! stored as `EntityRef` (kind + id) and re-resolved against the live pools
//! each time they are used, so a stale reference simply fails to resolve.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::items::{ItemKind, ObjectKind};
use crate::EntityId;

/// Pool an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Hostile,
    Boss,
    Undead,
    Summon,
    Object,
}

/// Weak reference to an entity in one of the pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: EntityId,
}

impl EntityRef {
    pub const fn new(kind: EntityKind, id: EntityId) -> Self {
        Self { kind, id }
    }
}

/// Result of applying damage to an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Victim was missing, already dead or the hit was negated
    Ignored,
    Wounded,
    /// This hit took the victim from alive to dead
    Killed,
}

/// Shared physical and health state for anything that can be hurt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    /// Hit-flash expiry (simulation ms)
    pub flash_until: f64,
    /// Participates in physical blocking
    pub solid: bool,
    pub attackable: bool,
}

impl Actor {
    pub fn new(pos: Vec2, radius: f32, max_health: f32) -> Self {
        Self {
            pos,
            radius,
            health: max_health,
            max_health,
            flash_until: 0.0,
            solid: false,
            attackable: true,
        }
    }

    pub fn solid(mut self) -> Self {
        self.solid = true;
        self
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    /// Heal up to max health; returns the amount actually restored
    pub fn heal(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let before = self.health;
        self.health = (self.health + amount).min(self.max_health);
        self.health - before
    }

    /// Subtract health; a no-op on an already dead actor
    pub fn apply_damage(&mut self, amount: f32, now_ms: f64, flash_ms: f64) -> DamageOutcome {
        if !self.is_alive() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }
        self.health -= amount;
        self.flash_until = now_ms + flash_ms;
        if self.health <= 0.0 {
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Force the actor dead without going through the damage path
    pub fn destroy(&mut self) {
        self.health = 0.0;
    }
}

// --- Hostiles ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostileState {
    Idle,
    Chasing,
    Attacking,
}

/// A regular monster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostile {
    pub id: EntityId,
    pub actor: Actor,
    pub state: HostileState,
    pub target: Option<EntityRef>,
    pub last_attack_ms: f64,
}

// --- Bosses ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    /// Plains boss, patrol archetype
    Plains,
    /// Forest wolf, territorial archetype
    ForestWolf,
    /// Jungle lake boss, ranged archetype
    Jungle,
}

impl BossKind {
    pub fn name(self) -> &'static str {
        match self {
            BossKind::Plains => "Plains Boss",
            BossKind::ForestWolf => "Forest Wolf",
            BossKind::Jungle => "Jungle Boss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossAttack {
    Hit,
    Smash,
    Spin,
}

/// A committed patrol-boss attack in progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveAttack {
    pub kind: BossAttack,
    pub started_ms: f64,
    /// Target at commit time; the hit re-validates it before landing
    pub target: Option<EntityRef>,
    pub landed: bool,
    /// Last spin damage pulse
    pub last_pulse_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatrolMode {
    Patrolling,
    Chasing,
    Attacking,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatrolBrain {
    pub mode: PatrolMode,
    pub arena: Rect,
    pub waypoint: Option<Vec2>,
    pub target: Option<EntityRef>,
    pub last_attack_ms: f64,
    pub last_choice_ms: f64,
    pub attack: Option<ActiveAttack>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritorialBrain {
    pub territory: Rect,
    /// Index into the territory's corners of the current destination
    pub corner: Option<usize>,
    pub destination: Vec2,
    pub last_corner_change_ms: f64,
    /// Per-victim time of the last contact hit
    pub contact_log: Vec<(EntityRef, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangedBrain {
    pub lake: Rect,
    pub target: Option<EntityRef>,
    pub last_shot_ms: f64,
}

/// Archetype-specific boss state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BossBrain {
    Patrol(PatrolBrain),
    Territorial(TerritorialBrain),
    Ranged(RangedBrain),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: EntityId,
    pub kind: BossKind,
    pub actor: Actor,
    pub speed: f32,
    pub facing: f32,
    pub brain: BossBrain,
    /// Set by the death handler; guarantees a single payout
    pub loot_dropped: bool,
}

// --- Minions ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinionKind {
    Undead,
    Summon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinionState {
    Idle,
    Following,
    Chasing,
    Attacking,
}

/// Player-owned combat ally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minion {
    pub id: EntityId,
    pub kind: MinionKind,
    pub actor: Actor,
    pub state: MinionState,
    pub target: Option<EntityRef>,
    pub speed: f32,
    pub damage: f32,
    pub attack_cooldown_ms: f64,
    pub last_attack_ms: f64,
    /// None means unlimited
    pub detect_range: Option<f32>,
}

impl Minion {
    pub fn entity_ref(&self) -> EntityRef {
        let kind = match self.kind {
            MinionKind::Undead => EntityKind::Undead,
            MinionKind::Summon => EntityKind::Summon,
        };
        EntityRef::new(kind, self.id)
    }
}

// --- Pets ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetKind {
    Frog,
    Cat,
    Beetle,
    Bird,
    Dog,
}

impl PetKind {
    pub fn radius(self) -> f32 {
        match self {
            PetKind::Frog => 8.0,
            PetKind::Cat => 9.0,
            PetKind::Beetle => 10.0,
            PetKind::Bird => 7.0,
            PetKind::Dog => 11.0,
        }
    }
}

/// Singleton non-attackable companion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub kind: PetKind,
    pub pos: Vec2,
    pub radius: f32,
    pub target: Option<EntityRef>,
    /// Last heal, shot, bite or guard use
    pub last_action_ms: f64,
    /// Beetle guard charge
    pub guard_ready: bool,
}

impl Pet {
    pub fn new(kind: PetKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            radius: kind.radius(),
            target: None,
            last_action_ms: f64::NEG_INFINITY,
            guard_ready: kind == PetKind::Beetle,
        }
    }
}

// --- World objects, projectiles, drops ---

/// Resource node or placed structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldObject {
    pub id: EntityId,
    pub kind: ObjectKind,
    pub actor: Actor,
}

impl WorldObject {
    pub fn new(id: EntityId, kind: ObjectKind, pos: Vec2) -> Self {
        let (radius, health) = kind.base_stats();
        Self {
            id,
            kind,
            actor: Actor::new(pos, radius, health).solid(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileOwner {
    Player,
    Pet,
    Boss(EntityId),
}

impl ProjectileOwner {
    /// Player-side projectiles hurt hostiles and bosses; the rest hurt the player
    pub fn is_friendly(self) -> bool {
        matches!(self, ProjectileOwner::Player | ProjectileOwner::Pet)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: ProjectileOwner,
    pub pos: Vec2,
    /// Units per nominal frame
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub range: f32,
    pub traveled: f32,
    /// Cleared when the projectile hits something or expires
    pub live: bool,
}

/// Loose item lying in the world
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedItem {
    pub id: EntityId,
    pub item: ItemKind,
    pub pos: Vec2,
    pub picked_up: bool,
}

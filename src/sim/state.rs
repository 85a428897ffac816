//! Game state and entity pools
//!
//! Every pool is a plain `Vec` owned here. Entities are marked dead during a
//! tick and compacted out at its end, so references taken mid-tick stay
//! valid until then. Cross-pool references go through `resolve`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::clock::WorldClock;
use super::combat::KillCredit;
use super::entity::{
    Actor, Boss, BossKind, DroppedItem, EntityKind, EntityRef, Hostile, Minion, MinionKind, Pet,
    Projectile, WorldObject,
};
use super::geometry::Wall;
use super::items::ItemKind;
use super::player::{Player, PlayerClass};
use super::world::WorldLayout;
use crate::EntityId;
use crate::tuning::Tuning;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    Playing,
    /// Player died; waiting for a respawn request
    GameOver,
}

/// Notable things that happened during a tick, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Killed { victim: EntityRef, credit: KillCredit },
    BossSpawned { kind: BossKind },
    BossDefeated { kind: BossKind },
    WallTierRemoved { tier: u8, count: usize },
    LevelUp { level: u32 },
    PerkAvailable,
    PetAvailable,
    WeaponChoiceOpened,
    NightFell { spawned: usize },
    NewDay { day: u32 },
    PlayerHit { damage: f32 },
    GuardBlocked,
    PlayerDied,
    Respawned,
    ItemCollected { item: ItemKind },
    ItemUsed { item: ItemKind },
    Placed { item: ItemKind },
    RespawnPointSet,
    Crafted { item: ItemKind, count: u32 },
    Summoned { kind: MinionKind },
    MinionEvicted { id: EntityId },
}

/// Position and size of a live entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub target: EntityRef,
    pub pos: Vec2,
    pub radius: f32,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Simulation clock in milliseconds (sum of clamped deltas)
    pub time_ms: f64,
    pub tick_count: u64,
    next_id: u32,

    pub world: WorldLayout,
    pub clock: WorldClock,

    pub player: Player,
    pub walls: Vec<Wall>,
    pub objects: Vec<WorldObject>,
    pub hostiles: Vec<Hostile>,
    pub bosses: Vec<Boss>,
    pub undead: Vec<Minion>,
    pub summons: Vec<Minion>,
    pub pet: Option<Pet>,
    pub projectiles: Vec<Projectile>,
    pub drops: Vec<DroppedItem>,

    pub forest_wolf_defeated: bool,
    /// Events recorded during the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Generate a fully populated world
    pub fn new(seed: u64, class: PlayerClass, tuning: Tuning) -> Self {
        let mut state = Self::bare(seed, class, tuning);
        super::spawn::populate_world(&mut state);
        state
    }

    /// World layout and player only: no walls, objects or creatures
    pub fn bare(seed: u64, class: PlayerClass, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let world = WorldLayout::new(&tuning, &mut rng);
        let clock = WorldClock::new(&tuning);
        let player = Player::new(EntityId(0), class, world.center());

        Self {
            seed,
            rng,
            tuning,
            phase: GamePhase::Playing,
            time_ms: 0.0,
            tick_count: 0,
            next_id: 1,
            world,
            clock,
            player,
            walls: Vec::new(),
            objects: Vec::new(),
            hostiles: Vec::new(),
            bosses: Vec::new(),
            undead: Vec::new(),
            summons: Vec::new(),
            pet: None,
            projectiles: Vec::new(),
            drops: Vec::new(),
            forest_wolf_defeated: false,
            events: Vec::new(),
        }
    }

    /// Allocate a new unique entity id
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn is_night(&self) -> bool {
        self.clock.is_night()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn player_ref(&self) -> EntityRef {
        EntityRef::new(EntityKind::Player, self.player.id)
    }

    pub fn minion_pool(&self, kind: MinionKind) -> &Vec<Minion> {
        match kind {
            MinionKind::Undead => &self.undead,
            MinionKind::Summon => &self.summons,
        }
    }

    pub fn minion_pool_mut(&mut self, kind: MinionKind) -> &mut Vec<Minion> {
        match kind {
            MinionKind::Undead => &mut self.undead,
            MinionKind::Summon => &mut self.summons,
        }
    }

    /// Actor behind a reference, dead or alive
    pub fn actor(&self, r: EntityRef) -> Option<&Actor> {
        match r.kind {
            EntityKind::Player => (r.id == self.player.id).then_some(&self.player.actor),
            EntityKind::Hostile => self.hostiles.iter().find(|h| h.id == r.id).map(|h| &h.actor),
            EntityKind::Boss => self.bosses.iter().find(|b| b.id == r.id).map(|b| &b.actor),
            EntityKind::Undead => self.undead.iter().find(|m| m.id == r.id).map(|m| &m.actor),
            EntityKind::Summon => self.summons.iter().find(|m| m.id == r.id).map(|m| &m.actor),
            EntityKind::Object => self.objects.iter().find(|o| o.id == r.id).map(|o| &o.actor),
        }
    }

    pub fn actor_mut(&mut self, r: EntityRef) -> Option<&mut Actor> {
        match r.kind {
            EntityKind::Player => (r.id == self.player.id).then_some(&mut self.player.actor),
            EntityKind::Hostile => self
                .hostiles
                .iter_mut()
                .find(|h| h.id == r.id)
                .map(|h| &mut h.actor),
            EntityKind::Boss => self
                .bosses
                .iter_mut()
                .find(|b| b.id == r.id)
                .map(|b| &mut b.actor),
            EntityKind::Undead => self
                .undead
                .iter_mut()
                .find(|m| m.id == r.id)
                .map(|m| &mut m.actor),
            EntityKind::Summon => self
                .summons
                .iter_mut()
                .find(|m| m.id == r.id)
                .map(|m| &mut m.actor),
            EntityKind::Object => self
                .objects
                .iter_mut()
                .find(|o| o.id == r.id)
                .map(|o| &mut o.actor),
        }
    }

    /// Re-validate a reference: present in its pool and still alive
    pub fn resolve(&self, r: EntityRef) -> Option<Resolved> {
        self.actor(r).filter(|a| a.is_alive()).map(|a| Resolved {
            target: r,
            pos: a.pos,
            radius: a.radius,
        })
    }

    /// Living targets hostiles may pick: the player and both minion pools
    pub fn hostile_targets(&self) -> Vec<Resolved> {
        let mut targets = Vec::new();
        if self.phase == GamePhase::Playing {
            targets.extend(self.resolve(self.player_ref()));
        }
        targets.extend(
            self.undead
                .iter()
                .chain(self.summons.iter())
                .filter(|m| m.actor.is_alive())
                .map(|m| Resolved {
                    target: m.entity_ref(),
                    pos: m.actor.pos,
                    radius: m.actor.radius,
                }),
        );
        targets
    }

    /// Living hostiles and bosses, for the player's allies
    pub fn enemy_targets(&self) -> Vec<Resolved> {
        let hostiles = self
            .hostiles
            .iter()
            .filter(|h| h.actor.is_alive())
            .map(|h| Resolved {
                target: EntityRef::new(EntityKind::Hostile, h.id),
                pos: h.actor.pos,
                radius: h.actor.radius,
            });
        let bosses = self
            .bosses
            .iter()
            .filter(|b| b.actor.is_alive())
            .map(|b| Resolved {
                target: EntityRef::new(EntityKind::Boss, b.id),
                pos: b.actor.pos,
                radius: b.actor.radius,
            });
        hostiles.chain(bosses).collect()
    }

    /// Remove everything marked dead during the tick
    pub fn compact(&mut self) {
        self.objects.retain(|o| o.actor.is_alive());
        self.hostiles.retain(|h| h.actor.is_alive());
        self.bosses.retain(|b| b.actor.is_alive());
        self.undead.retain(|m| m.actor.is_alive());
        self.summons.retain(|m| m.actor.is_alive());
        self.projectiles.retain(|p| p.live);
        self.drops.retain(|d| !d.picked_up);
    }

    /// Read-only view for the presentation layer
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            time_ms: self.time_ms,
            phase: self.phase,
            day: self.clock.day,
            day_phase: self.clock.phase(),
            night_intensity: self.clock.night_intensity,
            player: &self.player,
            pet: self.pet.as_ref(),
            walls: &self.walls,
            objects: &self.objects,
            hostiles: &self.hostiles,
            bosses: &self.bosses,
            undead: &self.undead,
            summons: &self.summons,
            projectiles: &self.projectiles,
            drops: &self.drops,
            events: &self.events,
        }
    }
}

/// Borrowed view of every pool plus clock state
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub time_ms: f64,
    pub phase: GamePhase,
    pub day: u32,
    pub day_phase: super::clock::DayPhase,
    pub night_intensity: f32,
    pub player: &'a Player,
    pub pet: Option<&'a Pet>,
    pub walls: &'a [Wall],
    pub objects: &'a [WorldObject],
    pub hostiles: &'a [Hostile],
    pub bosses: &'a [Boss],
    pub undead: &'a [Minion],
    pub summons: &'a [Minion],
    pub projectiles: &'a [Projectile],
    pub drops: &'a [DroppedItem],
    pub events: &'a [GameEvent],
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let mut s = state();
        let a = s.next_entity_id();
        let b = s.next_entity_id();
        assert!(b > a);
        assert_ne!(a, s.player.id);
    }

    #[test]
    fn test_resolve_rejects_dead_and_missing() {
        let mut s = state();
        let id = add_hostile(&mut s, Vec2::new(100.0, 100.0));
        let r = EntityRef::new(EntityKind::Hostile, id);
        assert!(s.resolve(r).is_some());

        s.hostiles[0].actor.destroy();
        assert!(s.resolve(r).is_none());

        s.compact();
        assert!(s.hostiles.is_empty());
        assert!(s.resolve(r).is_none());
    }

    #[test]
    fn test_hostile_targets_include_minions() {
        let mut s = state();
        add_minion(&mut s, MinionKind::Undead, Vec2::new(10.0, 0.0));
        add_minion(&mut s, MinionKind::Summon, Vec2::new(20.0, 0.0));
        let kinds: Vec<EntityKind> = s.hostile_targets().iter().map(|t| t.target.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Player, EntityKind::Undead, EntityKind::Summon]);
    }

    #[test]
    fn test_snapshot_serializes() {
        let s = state();
        let json = serde_json::to_string(&s.snapshot()).unwrap();
        assert!(json.contains("\"phase\":\"Playing\""));
    }
}

//! Damage, kill resolution and rewards
//!
//! All damage goes through `deal_damage`, which is a no-op on a missing or
//! already dead victim. The alive-to-dead transition happens exactly once per
//! entity and is the only place kills are resolved, so two lethal sources in
//! the same tick can never pay out twice. Bosses are additionally guarded by
//! their `loot_dropped` flag.

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::entity::{
    BossBrain, BossKind, DamageOutcome, DroppedItem, EntityKind, EntityRef, PetKind,
};
use super::items::{self, FOREST_WOLF_LOOT, HOSTILE_LOOT, ItemKind, PLAINS_BOSS_LOOT, Tool};
use super::player::{ClassAbility, Player};
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState};
use crate::EntityId;
use crate::consts::*;

/// Who landed a killing blow; decides loot and XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KillCredit {
    Player,
    Minion,
    Pet,
    Hostile,
    Boss,
    /// Trampled, or destroyed by something with no owner
    Environment,
}

impl KillCredit {
    pub fn grants_loot(self) -> bool {
        matches!(self, KillCredit::Player | KillCredit::Minion | KillCredit::Pet)
    }

    /// XP granted to the player for a kill worth `base`
    pub fn xp_for(self, base: f32) -> u32 {
        match self {
            KillCredit::Player => base as u32,
            KillCredit::Minion | KillCredit::Pet => (base * ALLY_KILL_XP_MULT) as u32,
            _ => 0,
        }
    }
}

/// What a player strike is aimed at, for tool matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeClass {
    /// Hostiles, bosses and minions
    Living,
    /// Trees, bone trees and cacti
    Woody,
    Rock,
    Placed,
}

impl StrikeClass {
    pub fn of(state: &GameState, victim: EntityRef) -> Self {
        match victim.kind {
            EntityKind::Object => state
                .objects
                .iter()
                .find(|o| o.id == victim.id)
                .map(|o| match o.kind {
                    items::ObjectKind::Rock => StrikeClass::Rock,
                    k if k.is_placed() => StrikeClass::Placed,
                    _ => StrikeClass::Woody,
                })
                .unwrap_or(StrikeClass::Woody),
            _ => StrikeClass::Living,
        }
    }
}

/// Melee damage for the player's equipped item against a target class
pub fn strike_damage(player: &Player, equipped: Option<ItemKind>, class: StrikeClass) -> f32 {
    let living = class == StrikeClass::Living;
    let weapon_mult = player.weapon_fx.damage_mult;
    match equipped.and_then(ItemKind::tool) {
        Some(Tool::Sword { damage_mult }) if living => {
            (BASE_ATTACK_POWER * damage_mult * player.template().sword_boost
                + player.perk_bonus.sword_damage
                + player.melee_bonus())
                * weapon_mult
        }
        Some(Tool::Axe { gather_mult }) if class == StrikeClass::Woody => {
            BASE_GATHER_POWER * gather_mult
        }
        Some(Tool::Pickaxe { gather_mult, .. }) if class == StrikeClass::Rock => {
            BASE_GATHER_POWER * gather_mult
        }
        Some(Tool::Axe { .. } | Tool::Pickaxe { .. }) if class == StrikeClass::Placed => {
            BASE_GATHER_POWER * 2.0
        }
        Some(_) => BASE_ATTACK_POWER / 2.0,
        None if living => (BASE_ATTACK_POWER + player.melee_bonus()) * weapon_mult,
        None => BASE_GATHER_POWER / 3.0,
    }
}

/// Arrow damage for an equipped bow
pub fn bow_damage(player: &Player, bow_damage: f32) -> f32 {
    bow_damage * player.template().bow_boost * player.weapon_fx.damage_mult
}

/// Apply damage to any entity and resolve the kill if this hit was lethal
pub fn deal_damage(
    state: &mut GameState,
    victim: EntityRef,
    amount: f32,
    credit: KillCredit,
) -> DamageOutcome {
    if victim.kind == EntityKind::Player {
        return damage_player(state, amount);
    }

    let now = state.time_ms;
    let Some(actor) = state.actor_mut(victim) else {
        return DamageOutcome::Ignored;
    };
    let outcome = actor.apply_damage(amount, now, FLASH_DURATION_MS);
    let pos = actor.pos;
    if outcome == DamageOutcome::Killed {
        resolve_kill(state, victim, pos, credit);
    }
    outcome
}

/// Player-side hit: lifesteal on any enemy hit, on-kill heal on the lethal one
pub fn player_strike(state: &mut GameState, victim: EntityRef, amount: f32) -> DamageOutcome {
    if state.resolve(victim).is_none() {
        return DamageOutcome::Ignored;
    }
    let is_enemy = matches!(victim.kind, EntityKind::Hostile | EntityKind::Boss);

    if is_enemy {
        let lifesteal = state.player.lifesteal();
        if lifesteal > 0.0 {
            state.player.actor.heal(lifesteal);
        }
    }

    let outcome = deal_damage(state, victim, amount, KillCredit::Player);

    if is_enemy && outcome == DamageOutcome::Killed {
        let on_kill = state.player.weapon_fx.on_kill_heal;
        if on_kill > 0.0 {
            state.player.actor.heal(on_kill);
        }
    }
    outcome
}

fn damage_player(state: &mut GameState, amount: f32) -> DamageOutcome {
    if state.phase == GamePhase::GameOver || !state.player.actor.is_alive() {
        return DamageOutcome::Ignored;
    }

    let now = state.time_ms;
    if let Some(pet) = state.pet.as_mut()
        && pet.kind == PetKind::Beetle
        && pet.guard_ready
    {
        pet.guard_ready = false;
        pet.last_action_ms = now;
        state.push_event(GameEvent::GuardBlocked);
        return DamageOutcome::Ignored;
    }

    let outcome = state
        .player
        .actor
        .apply_damage(amount, now, FLASH_DURATION_MS);
    state.push_event(GameEvent::PlayerHit { damage: amount });

    if outcome == DamageOutcome::Killed {
        log::info!("Player died on day {}", state.clock.day);
        state.phase = GamePhase::GameOver;
        state.projectiles.iter_mut().for_each(|p| p.live = false);
        state.push_event(GameEvent::PlayerDied);
    }
    outcome
}

/// Consequences of an alive-to-dead transition
fn resolve_kill(state: &mut GameState, victim: EntityRef, pos: Vec2, credit: KillCredit) {
    state.push_event(GameEvent::Killed { victim, credit });

    match victim.kind {
        EntityKind::Hostile => {
            if credit.grants_loot() {
                let drops = items::roll_loot(HOSTILE_LOOT, &mut state.rng);
                spawn_drops(state, pos, &drops);
            }
            award_xp(state, MONSTER_XP_REWARD as f32, credit);
            if credit == KillCredit::Player
                && state.player.class.ability() == Some(ClassAbility::RaiseUndead)
            {
                state.player.monster_kills += 1;
            }
        }
        EntityKind::Boss => {
            on_boss_defeated(state, victim.id, credit);
        }
        EntityKind::Object => {
            let kind = state
                .objects
                .iter()
                .find(|o| o.id == victim.id)
                .map(|o| o.kind);
            if let Some(kind) = kind
                && credit.grants_loot()
            {
                let drops = items::object_loot(kind, &mut state.rng);
                spawn_drops(state, pos, &drops);
            }
        }
        EntityKind::Undead | EntityKind::Summon => {
            log::debug!("Minion {:?} fell", victim.id);
        }
        EntityKind::Player => {}
    }
}

/// Wall tier unlocked by defeating a boss
pub fn boss_wall_tier(kind: BossKind) -> Option<u8> {
    match kind {
        BossKind::Plains => Some(1),
        BossKind::ForestWolf | BossKind::Jungle => None,
    }
}

/// One-shot boss death handler
///
/// Returns false if the boss is unknown or has already paid out.
pub fn on_boss_defeated(state: &mut GameState, boss_id: EntityId, credit: KillCredit) -> bool {
    let Some(boss) = state.bosses.iter_mut().find(|b| b.id == boss_id) else {
        return false;
    };
    if boss.loot_dropped {
        return false;
    }
    boss.loot_dropped = true;
    boss.actor.destroy();
    let kind = boss.kind;
    let pos = boss.actor.pos;

    log::info!("{} defeated", kind.name());
    state.push_event(GameEvent::BossDefeated { kind });

    let base_xp = PLAINS_BOSS_XP_REWARD as f32;
    match kind {
        BossKind::Plains => {
            let drops = items::roll_loot(PLAINS_BOSS_LOOT, &mut state.rng);
            spawn_drops(state, pos, &drops);
            award_xp(state, base_xp, credit);
        }
        BossKind::ForestWolf => {
            let drops = items::roll_loot(FOREST_WOLF_LOOT, &mut state.rng);
            spawn_drops(state, pos, &drops);
            award_xp(state, base_xp * 0.75, credit);
            if !state.forest_wolf_defeated {
                state.forest_wolf_defeated = true;
                spawn::spawn_jungle_boss(state);
            }
        }
        BossKind::Jungle => {
            award_xp(state, base_xp * 1.5, credit);
        }
    }

    if let Some(tier) = boss_wall_tier(kind) {
        remove_wall_tier(state, tier);
    }
    true
}

/// Remove every wall of a tier; occlusion and collision see the change at once
pub fn remove_wall_tier(state: &mut GameState, tier: u8) -> usize {
    let before = state.walls.len();
    state.walls.retain(|w| w.tier != tier);
    let count = before - state.walls.len();
    if count > 0 {
        log::info!("Tier {} walls ({}) removed", tier, count);
        state.push_event(GameEvent::WallTierRemoved { tier, count });
    }
    count
}

/// Grant kill XP and announce level milestones
pub fn award_xp(state: &mut GameState, base: f32, credit: KillCredit) {
    let amount = credit.xp_for(base);
    if amount == 0 {
        return;
    }
    for level in state.player.gain_xp(amount) {
        log::info!("Level up: {}", level);
        state.push_event(GameEvent::LevelUp { level });
        if level == PERK_LEVEL && state.player.perk.is_none() {
            state.push_event(GameEvent::PerkAvailable);
        }
        if level == PET_LEVEL && state.pet.is_none() {
            state.push_event(GameEvent::PetAvailable);
        }
    }
}

/// Scatter one dropped item per unit around `pos`
pub fn spawn_drops(state: &mut GameState, pos: Vec2, drops: &[(ItemKind, u32)]) {
    for &(item, count) in drops {
        for _ in 0..count {
            let offset = Vec2::new(
                state.rng.random_range(-DROP_SCATTER..DROP_SCATTER),
                state.rng.random_range(-DROP_SCATTER..DROP_SCATTER),
            );
            let id = state.next_entity_id();
            state.drops.push(DroppedItem {
                id,
                item,
                pos: pos + offset,
                picked_up: false,
            });
        }
    }
}

/// Forest wolf contact hit, rate-limited per victim
pub fn wolf_contact(state: &mut GameState, wolf_id: EntityId, victim: EntityRef) -> DamageOutcome {
    let now = state.time_ms;
    let Some(wolf) = state
        .bosses
        .iter_mut()
        .find(|b| b.id == wolf_id && b.actor.is_alive())
    else {
        return DamageOutcome::Ignored;
    };
    let BossBrain::Territorial(brain) = &mut wolf.brain else {
        return DamageOutcome::Ignored;
    };

    match brain.contact_log.iter_mut().find(|(r, _)| *r == victim) {
        Some((_, last)) if now - *last < FOREST_WOLF_CONTACT_COOLDOWN_MS => {
            return DamageOutcome::Ignored;
        }
        Some((_, last)) => *last = now,
        None => brain.contact_log.push((victim, now)),
    }
    brain
        .contact_log
        .retain(|(_, t)| now - *t < FOREST_WOLF_CONTACT_COOLDOWN_MS);

    deal_damage(state, victim, FOREST_WOLF_CONTACT_DAMAGE, KillCredit::Boss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{
        ActiveAttack, Actor, Boss, PatrolBrain, PatrolMode, Pet, TerritorialBrain,
    };
    use crate::sim::geometry::{Rect, Wall};
    use crate::sim::items::ObjectKind;
    use crate::sim::player::{PlayerClass, WeaponId};
    use crate::sim::state::test_support::*;

    fn plains_boss(state: &mut GameState, pos: Vec2) -> EntityId {
        let id = state.next_entity_id();
        state.bosses.push(Boss {
            id,
            kind: BossKind::Plains,
            actor: Actor::new(pos, PLAINS_BOSS_RADIUS, PLAINS_BOSS_HEALTH).solid(),
            speed: PLAINS_BOSS_SPEED,
            facing: 0.0,
            brain: BossBrain::Patrol(PatrolBrain {
                mode: PatrolMode::Patrolling,
                arena: Rect::new(0.0, 0.0, 1000.0, 1000.0),
                waypoint: None,
                target: None,
                last_attack_ms: 0.0,
                last_choice_ms: 0.0,
                attack: None::<ActiveAttack>,
            }),
            loot_dropped: false,
        });
        id
    }

    #[test]
    fn test_matched_tool_beats_bare_and_mismatched() {
        let p = Player::new(EntityId(0), PlayerClass::Scout, Vec2::ZERO);

        let sword_vs_living = strike_damage(&p, Some(ItemKind::WoodSword), StrikeClass::Living);
        let bare_vs_living = strike_damage(&p, None, StrikeClass::Living);
        let pick_vs_living = strike_damage(&p, Some(ItemKind::WoodPickaxe), StrikeClass::Living);
        assert!(sword_vs_living > bare_vs_living);
        assert!(sword_vs_living > pick_vs_living);

        let pick_vs_rock = strike_damage(&p, Some(ItemKind::WoodPickaxe), StrikeClass::Rock);
        let bare_vs_rock = strike_damage(&p, None, StrikeClass::Rock);
        let axe_vs_rock = strike_damage(&p, Some(ItemKind::WoodAxe), StrikeClass::Rock);
        assert!(pick_vs_rock > bare_vs_rock);
        assert!(pick_vs_rock > axe_vs_rock);

        let axe_vs_tree = strike_damage(&p, Some(ItemKind::WoodAxe), StrikeClass::Woody);
        assert_eq!(axe_vs_tree, 9.0);
        assert_eq!(bare_vs_rock, 1.0);
    }

    #[test]
    fn test_knight_sword_formula() {
        let mut p = Player::new(EntityId(0), PlayerClass::Knight, Vec2::ZERO);
        // 5 * 2 * 3
        assert_eq!(strike_damage(&p, Some(ItemKind::WoodSword), StrikeClass::Living), 30.0);
        p.choose_weapon(WeaponId::KnightGreatsword);
        assert_eq!(strike_damage(&p, Some(ItemKind::WoodSword), StrikeClass::Living), 37.5);
    }

    #[test]
    fn test_damage_on_dead_is_noop() {
        let mut s = state();
        let id = add_hostile(&mut s, Vec2::new(50.0, 0.0));
        let r = EntityRef::new(EntityKind::Hostile, id);
        assert_eq!(deal_damage(&mut s, r, 500.0, KillCredit::Player), DamageOutcome::Killed);
        assert_eq!(deal_damage(&mut s, r, 500.0, KillCredit::Player), DamageOutcome::Ignored);
        let kills = s
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Killed { .. }))
            .count();
        assert_eq!(kills, 1);
        assert_eq!(s.player.xp, MONSTER_XP_REWARD);
    }

    #[test]
    fn test_boss_payout_once_under_two_lethal_sources() {
        let mut s = state();
        s.walls.push(Wall {
            id: EntityId(500),
            rect: Rect::new(0.0, 0.0, 15.0, 100.0),
            tier: 1,
        });
        let id = plains_boss(&mut s, Vec2::new(100.0, 100.0));
        let r = EntityRef::new(EntityKind::Boss, id);

        // Player arrow and an undead bite in the same tick
        deal_damage(&mut s, r, 5000.0, KillCredit::Player);
        deal_damage(&mut s, r, 5000.0, KillCredit::Minion);
        // And a direct second call to the handler
        assert!(!on_boss_defeated(&mut s, id, KillCredit::Player));

        let defeated = s
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BossDefeated { .. }))
            .count();
        assert_eq!(defeated, 1);
        let iron: usize = s.drops.iter().filter(|d| d.item == ItemKind::IronOre).count();
        assert_eq!(iron, 15);
        assert_eq!(s.player.level, 2);
        assert!(s.walls.is_empty());
    }

    #[test]
    fn test_wolf_defeat_spawns_jungle_boss() {
        let mut s = state();
        let id = s.next_entity_id();
        s.bosses.push(Boss {
            id,
            kind: BossKind::ForestWolf,
            actor: Actor::new(Vec2::new(500.0, 500.0), FOREST_WOLF_RADIUS, 10.0).solid(),
            speed: MONSTER_SPEED * FOREST_WOLF_SPEED_MULT,
            facing: 0.0,
            brain: BossBrain::Territorial(TerritorialBrain {
                territory: Rect::new(0.0, 0.0, 1000.0, 1000.0),
                corner: None,
                destination: Vec2::ZERO,
                last_corner_change_ms: 0.0,
                contact_log: Vec::new(),
            }),
            loot_dropped: false,
        });
        deal_damage(&mut s, EntityRef::new(EntityKind::Boss, id), 50.0, KillCredit::Player);

        assert!(s.forest_wolf_defeated);
        assert!(s.bosses.iter().any(|b| b.kind == BossKind::Jungle && b.actor.is_alive()));
        assert!(s.drops.iter().any(|d| d.item == ItemKind::MysticalOrb));
    }

    #[test]
    fn test_lifesteal_before_death_and_on_kill_heal() {
        let mut s = state_with(PlayerClass::Vampire);
        s.player.actor.health = 40.0;
        let id = add_hostile(&mut s, Vec2::new(30.0, 0.0));
        let r = EntityRef::new(EntityKind::Hostile, id);

        assert_eq!(player_strike(&mut s, r, 500.0), DamageOutcome::Killed);
        assert!((s.player.actor.health - 42.5).abs() < 1e-4);
        // A dead target yields nothing
        assert_eq!(player_strike(&mut s, r, 500.0), DamageOutcome::Ignored);
        assert!((s.player.actor.health - 42.5).abs() < 1e-4);
    }

    #[test]
    fn test_necromancer_counts_player_kills_only() {
        let mut s = state_with(PlayerClass::Necromancer);
        let a = add_hostile(&mut s, Vec2::new(30.0, 0.0));
        let b = add_hostile(&mut s, Vec2::new(60.0, 0.0));
        deal_damage(&mut s, EntityRef::new(EntityKind::Hostile, a), 500.0, KillCredit::Player);
        deal_damage(&mut s, EntityRef::new(EntityKind::Hostile, b), 500.0, KillCredit::Minion);
        assert_eq!(s.player.monster_kills, 1);
        assert_eq!(s.player.xp, MONSTER_XP_REWARD + MONSTER_XP_REWARD / 2);
    }

    #[test]
    fn test_environment_kill_drops_nothing() {
        let mut s = state();
        let id = add_object(&mut s, ObjectKind::Tree, Vec2::new(200.0, 0.0));
        deal_damage(&mut s, EntityRef::new(EntityKind::Object, id), 1000.0, KillCredit::Environment);
        assert!(s.drops.is_empty());

        let id = add_object(&mut s, ObjectKind::Rock, Vec2::new(300.0, 0.0));
        deal_damage(&mut s, EntityRef::new(EntityKind::Object, id), 1000.0, KillCredit::Player);
        assert!(s.drops.iter().all(|d| d.item == ItemKind::Stone));
        assert!(!s.drops.is_empty());
    }

    #[test]
    fn test_player_death_ends_run() {
        let mut s = state();
        let r = s.player_ref();
        deal_damage(&mut s, r, 1000.0, KillCredit::Hostile);
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(s.events.contains(&GameEvent::PlayerDied));
        assert_eq!(deal_damage(&mut s, r, 10.0, KillCredit::Hostile), DamageOutcome::Ignored);
    }

    #[test]
    fn test_beetle_guard_negates_one_hit() {
        let mut s = state();
        s.pet = Some(Pet::new(PetKind::Beetle, Vec2::ZERO));
        let r = s.player_ref();
        assert_eq!(deal_damage(&mut s, r, 10.0, KillCredit::Hostile), DamageOutcome::Ignored);
        assert_eq!(s.player.actor.health, s.player.actor.max_health);
        assert_eq!(deal_damage(&mut s, r, 10.0, KillCredit::Hostile), DamageOutcome::Wounded);
    }

    #[test]
    fn test_wolf_contact_rate_limited() {
        let mut s = state();
        let id = s.next_entity_id();
        s.bosses.push(Boss {
            id,
            kind: BossKind::ForestWolf,
            actor: Actor::new(Vec2::new(500.0, 500.0), FOREST_WOLF_RADIUS, FOREST_WOLF_HEALTH).solid(),
            speed: 2.0,
            facing: 0.0,
            brain: BossBrain::Territorial(TerritorialBrain {
                territory: Rect::new(0.0, 0.0, 1000.0, 1000.0),
                corner: None,
                destination: Vec2::ZERO,
                last_corner_change_ms: 0.0,
                contact_log: Vec::new(),
            }),
            loot_dropped: false,
        });
        let m = add_hostile(&mut s, Vec2::new(540.0, 500.0));
        s.hostiles[0].actor.max_health = 1000.0;
        s.hostiles[0].actor.health = 1000.0;
        let r = EntityRef::new(EntityKind::Hostile, m);

        assert_eq!(wolf_contact(&mut s, id, r), DamageOutcome::Wounded);
        assert_eq!(wolf_contact(&mut s, id, r), DamageOutcome::Ignored);
        s.time_ms += FOREST_WOLF_CONTACT_COOLDOWN_MS;
        assert_eq!(wolf_contact(&mut s, id, r), DamageOutcome::Wounded);
        assert_eq!(s.hostiles[0].actor.health, 1000.0 - 2.0 * FOREST_WOLF_CONTACT_DAMAGE);
    }

    #[test]
    fn test_perk_available_event_at_level_three() {
        let mut s = state();
        award_xp(&mut s, 400.0, KillCredit::Player);
        assert!(s.events.contains(&GameEvent::PerkAvailable));
    }
}

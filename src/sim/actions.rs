//! Player-facing entry points
//!
//! Everything the presentation layer may ask the player to do outside of
//! movement: attack, interact, pick a hotbar slot, use the class ability and
//! the one-off class, perk, weapon and pet choices. Each call validates first
//! and reports whether it did anything.

use glam::Vec2;

use super::collision::{ObstacleMask, ObstacleSet};
use super::combat::{self, StrikeClass};
use super::entity::{EntityKind, EntityRef, MinionKind, Pet, PetKind, Projectile, ProjectileOwner, WorldObject};
use super::items::{ItemKind, ObjectKind, Tool};
use super::player::{ClassAbility, PerkChoice, Player, PlayerClass, WeaponId};
use super::spawn;
use super::state::{GameEvent, GamePhase, GameState, Resolved};
use crate::consts::*;
use crate::{EntityId, angle_of, heading, normalize_angle};

fn can_act(state: &GameState) -> bool {
    state.phase == GamePhase::Playing && state.player.actor.is_alive()
}

/// Primary action with whatever is equipped: a bow shot or a melee swing
///
/// Returns true when a shot or swing happened (a swing may still miss).
pub fn try_attack(state: &mut GameState) -> bool {
    if !can_act(state) {
        return false;
    }
    match state.player.inventory.equipped().and_then(ItemKind::tool) {
        Some(Tool::Bow { range, damage }) => fire_bow(state, range, damage),
        _ => swing(state),
    }
}

fn fire_bow(state: &mut GameState, range: f32, base_damage: f32) -> bool {
    let now = state.time_ms;
    let player = &state.player;
    if now - player.last_bow_ms < player.bow_cooldown_ms() {
        return false;
    }
    let dir = heading(player.facing);
    let pos = player.actor.pos + dir * (player.actor.radius + 5.0);
    let damage = combat::bow_damage(player, base_damage);
    let range = range * player.weapon_fx.range_mult;

    state.player.last_bow_ms = now;
    let id = state.next_entity_id();
    state.projectiles.push(Projectile {
        id,
        owner: ProjectileOwner::Player,
        pos,
        vel: dir * ARROW_SPEED,
        radius: ARROW_RADIUS,
        damage,
        range,
        traveled: 0.0,
        live: true,
    });
    log::debug!("Arrow fired for {:.1}", damage);
    true
}

/// Everything a swing can connect with
fn melee_candidates(state: &GameState) -> Vec<Resolved> {
    let resolved = |target, actor: &super::entity::Actor| Resolved {
        target,
        pos: actor.pos,
        radius: actor.radius,
    };
    let mut out: Vec<Resolved> = state.enemy_targets();
    out.extend(
        state
            .objects
            .iter()
            .filter(|o| o.actor.attackable && o.actor.is_alive())
            .map(|o| resolved(EntityRef::new(EntityKind::Object, o.id), &o.actor)),
    );
    out.extend(
        state
            .undead
            .iter()
            .chain(state.summons.iter())
            .filter(|m| m.actor.is_alive())
            .map(|m| resolved(m.entity_ref(), &m.actor)),
    );
    out
}

fn swing(state: &mut GameState) -> bool {
    let now = state.time_ms;
    let player = &state.player;
    if now - player.last_melee_ms < player.melee_cooldown_ms() {
        return false;
    }
    let origin = player.actor.pos;
    let facing = player.facing;
    let strike_point = origin + heading(facing) * player.actor.radius;
    let max_reach = ATTACK_RANGE + player.actor.radius;
    let half_arc = ATTACK_SWING_ARC / 2.0 + ATTACK_SWING_TOLERANCE;

    state.player.last_melee_ms = now;

    let target = melee_candidates(state)
        .into_iter()
        .filter(|c| {
            let d = c.pos.distance(strike_point);
            let off_angle = normalize_angle(facing - angle_of(c.pos - origin)).abs();
            d < c.radius + ATTACK_RANGE && d < max_reach && off_angle < half_arc
        })
        .min_by(|a, b| {
            a.pos
                .distance_squared(strike_point)
                .partial_cmp(&b.pos.distance_squared(strike_point))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(target) = target {
        let class = StrikeClass::of(state, target.target);
        let amount = combat::strike_damage(&state.player, state.player.inventory.equipped(), class);
        combat::player_strike(state, target.target, amount);
    }
    true
}

/// Secondary action: use an item, interact with a structure or place one
///
/// `aim` is the world point a placeable should go to; without one the cell
/// just in front of the player is used.
pub fn try_interact(state: &mut GameState, aim: Option<Vec2>) -> bool {
    if !can_act(state) {
        return false;
    }
    let equipped = state.player.inventory.equipped();

    match equipped {
        Some(ItemKind::HealingSalve) => return use_salve(state),
        Some(ItemKind::MysticalOrb) => return use_orb(state),
        _ => {}
    }

    if let Some(structure) = nearest_interactable(state) {
        if structure.kind == ObjectKind::Placed(ItemKind::IckyBed) {
            state.player.respawn_point = structure.actor.pos;
            log::info!(
                "Respawn point set to ({:.0}, {:.0})",
                structure.actor.pos.x,
                structure.actor.pos.y
            );
            state.push_event(GameEvent::RespawnPointSet);
        }
        return true;
    }

    match equipped {
        Some(item) if item.placeable().is_some() => place(state, item, aim),
        _ => false,
    }
}

fn use_salve(state: &mut GameState) -> bool {
    let actor = &state.player.actor;
    if actor.health >= actor.max_health {
        return false;
    }
    state.player.actor.heal(HEAL_AMOUNT);
    state.player.inventory.consume_equipped();
    state.push_event(GameEvent::ItemUsed {
        item: ItemKind::HealingSalve,
    });
    true
}

/// Opens the weapon choice; the orb is spent when a weapon is picked
fn use_orb(state: &mut GameState) -> bool {
    if state.player.weapon.is_some() {
        return false;
    }
    state.player.weapon_choice_open = true;
    state.push_event(GameEvent::WeaponChoiceOpened);
    true
}

fn nearest_interactable(state: &GameState) -> Option<WorldObject> {
    let pos = state.player.actor.pos;
    state
        .objects
        .iter()
        .filter(|o| o.actor.is_alive())
        .filter(|o| match o.kind {
            ObjectKind::Placed(item) => item.placeable().is_some_and(|p| p.interactable),
            _ => false,
        })
        .filter(|o| o.actor.pos.distance(pos) < INTERACT_RANGE)
        .min_by(|a, b| {
            a.actor
                .pos
                .distance_squared(pos)
                .partial_cmp(&b.actor.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .cloned()
}

/// Snap a world point to the placement grid
pub fn snap_to_grid(p: Vec2) -> Vec2 {
    (p / PLACE_GRID_SIZE).round() * PLACE_GRID_SIZE
}

fn place(state: &mut GameState, item: ItemKind, aim: Option<Vec2>) -> bool {
    let Some(placeable) = item.placeable() else {
        return false;
    };
    let player = &state.player;
    let target = aim.unwrap_or_else(|| {
        player.actor.pos + heading(player.facing) * (player.actor.radius + PLACE_GRID_SIZE)
    });
    let cell = snap_to_grid(target);
    if cell.distance(player.actor.pos) > PLACE_RANGE || !state.world.bounds().contains(cell) {
        return false;
    }
    let obstacles = ObstacleSet::gather(state, ObstacleMask::ALL);
    if obstacles.check(cell, placeable.solid_radius - 0.1, None).is_some() {
        log::debug!("Placement of {} blocked", item.name());
        return false;
    }

    let id = state.next_entity_id();
    state
        .objects
        .push(WorldObject::new(id, ObjectKind::Placed(item), cell));
    state.player.inventory.consume_equipped();
    state.push_event(GameEvent::Placed { item });
    true
}

pub fn select_hotbar(state: &mut GameState, index: usize) -> bool {
    state.player.inventory.select(index)
}

/// Raise an undead (spending banked kills) or summon a slime
pub fn try_class_ability(state: &mut GameState) -> Option<EntityId> {
    if !can_act(state) {
        return None;
    }
    match state.player.class.ability()? {
        ClassAbility::RaiseUndead => {
            let cost = state.player.kills_to_summon();
            if state.player.monster_kills < cost {
                log::debug!(
                    "Need {} more kills to raise undead",
                    cost - state.player.monster_kills
                );
                return None;
            }
            let id = spawn::summon_minion(state, MinionKind::Undead)?;
            state.player.monster_kills -= cost;
            Some(id)
        }
        ClassAbility::SummonSlime => spawn::summon_minion(state, MinionKind::Summon),
    }
}

/// Pick the class; only before the first tick
pub fn choose_class(state: &mut GameState, class: PlayerClass) -> bool {
    if state.tick_count > 0 {
        return false;
    }
    let old = &state.player;
    let mut player = Player::new(old.id, class, old.actor.pos);
    player.inventory = old.inventory.clone();
    player.respawn_point = old.respawn_point;
    state.player = player;
    log::info!("Class chosen: {:?}", class);
    true
}

pub fn choose_perk(state: &mut GameState, choice: PerkChoice) -> bool {
    let applied = state.player.choose_perk(choice);
    if applied {
        log::info!("Perk chosen: {:?}", choice);
    }
    applied
}

/// Spend a mystical orb on one of the class weapons
pub fn choose_weapon(state: &mut GameState, weapon: WeaponId) -> bool {
    let player = &state.player;
    if !player.weapon_choice_open
        || player.weapon.is_some()
        || !player.class.weapon_choices().contains(&weapon)
        || player.inventory.total_count(ItemKind::MysticalOrb) == 0
    {
        return false;
    }
    if state.player.inventory.remove(ItemKind::MysticalOrb, 1).is_err() {
        return false;
    }
    let applied = state.player.choose_weapon(weapon);
    if applied {
        log::info!("Weapon chosen: {}", weapon.name());
    }
    applied
}

/// Adopt a pet once the player is high enough level; one per run
pub fn choose_pet(state: &mut GameState, kind: PetKind) -> bool {
    if state.pet.is_some() || state.player.level < PET_LEVEL {
        return false;
    }
    state.pet = Some(Pet::new(kind, state.player.actor.pos));
    log::info!("Pet chosen: {:?}", kind);
    true
}

/// Leave the game-over screen at the last respawn point
pub fn respawn(state: &mut GameState) -> bool {
    if state.phase != GamePhase::GameOver {
        return false;
    }
    let player = &mut state.player;
    player.actor.health = player.actor.max_health;
    player.actor.pos = player.respawn_point;
    player.actor.flash_until = 0.0;
    state.phase = GamePhase::Playing;
    log::info!("Player respawned");
    state.push_event(GameEvent::Respawned);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::test_support::*;

    fn hostile_health(s: &GameState, id: EntityId) -> f32 {
        s.actor(EntityRef::new(EntityKind::Hostile, id)).unwrap().health
    }

    #[test]
    fn test_swing_hits_nearest_in_arc_only() {
        let mut s = state();
        let pos = s.player.actor.pos;
        s.player.facing = 0.0;
        let behind = add_hostile(&mut s, pos + Vec2::new(-30.0, 0.0));
        let near = add_hostile(&mut s, pos + Vec2::new(30.0, 0.0));
        let far = add_hostile(&mut s, pos + Vec2::new(50.0, 5.0));

        assert!(try_attack(&mut s));
        assert_eq!(hostile_health(&s, behind), MONSTER_HEALTH);
        assert_eq!(hostile_health(&s, near), MONSTER_HEALTH - BASE_ATTACK_POWER);
        assert_eq!(hostile_health(&s, far), MONSTER_HEALTH);
    }

    #[test]
    fn test_swing_respects_cooldown() {
        let mut s = state();
        let pos = s.player.actor.pos;
        let h = add_hostile(&mut s, pos + Vec2::new(30.0, 0.0));
        assert!(try_attack(&mut s));
        assert!(!try_attack(&mut s));
        s.time_ms += MELEE_ATTACK_COOLDOWN_MS;
        assert!(try_attack(&mut s));
        assert_eq!(hostile_health(&s, h), MONSTER_HEALTH - 2.0 * BASE_ATTACK_POWER);
    }

    #[test]
    fn test_bow_spawns_arrow() {
        let mut s = state_with(PlayerClass::Archer);
        s.player.inventory.set_hotbar(0, ItemKind::WoodenBow, 1);
        s.player.facing = std::f32::consts::FRAC_PI_2;
        assert!(try_attack(&mut s));
        assert!(!try_attack(&mut s));

        let arrow = &s.projectiles[0];
        assert_eq!(arrow.owner, ProjectileOwner::Player);
        assert_eq!(arrow.damage, 45.0 * 5.0);
        assert_eq!(arrow.range, 400.0);
        assert!(arrow.vel.y > 0.0 && arrow.vel.x.abs() < 1e-4);
    }

    #[test]
    fn test_salve_heals_and_is_consumed() {
        let mut s = state();
        s.player.inventory.set_hotbar(0, ItemKind::HealingSalve, 2);
        assert!(!try_interact(&mut s, None), "full health");

        s.player.actor.health = 50.0;
        assert!(try_interact(&mut s, None));
        assert_eq!(s.player.actor.health, 50.0 + HEAL_AMOUNT);
        assert_eq!(s.player.inventory.total_count(ItemKind::HealingSalve), 1);
    }

    #[test]
    fn test_orb_then_weapon_choice_spends_orb() {
        let mut s = state();
        s.player.inventory.set_hotbar(0, ItemKind::MysticalOrb, 1);
        assert!(!choose_weapon(&mut s, WeaponId::KnightGreatsword), "choice not open");

        assert!(try_interact(&mut s, None));
        assert!(s.events.contains(&GameEvent::WeaponChoiceOpened));
        assert!(!choose_weapon(&mut s, WeaponId::ArcherLongbow), "other class");
        assert!(choose_weapon(&mut s, WeaponId::KnightGreatsword));
        assert_eq!(s.player.inventory.total_count(ItemKind::MysticalOrb), 0);
        assert_eq!(s.player.weapon, Some(WeaponId::KnightGreatsword));
    }

    #[test]
    fn test_place_on_grid_and_blocked_cell() {
        let mut s = state();
        s.player.inventory.set_hotbar(0, ItemKind::Workbench, 2);
        let aim = s.player.actor.pos + Vec2::new(52.0, 3.0);
        assert!(try_interact(&mut s, Some(aim)));
        let placed = s.objects.last().unwrap();
        assert_eq!(placed.kind, ObjectKind::Placed(ItemKind::Workbench));
        assert_eq!(placed.actor.pos, snap_to_grid(aim));

        // A workbench is interactable, so the second press talks to it
        assert!(try_interact(&mut s, Some(aim)));
        assert_eq!(s.objects.len(), 1);
        assert_eq!(s.player.inventory.total_count(ItemKind::Workbench), 1);
    }

    #[test]
    fn test_place_out_of_range_fails() {
        let mut s = state();
        s.player.inventory.set_hotbar(0, ItemKind::StoneBlock, 1);
        let aim = s.player.actor.pos + Vec2::new(200.0, 0.0);
        assert!(!try_interact(&mut s, Some(aim)));
        assert!(s.objects.is_empty());
    }

    #[test]
    fn test_bed_sets_respawn_point() {
        let mut s = state();
        let bed = s.player.actor.pos + Vec2::new(40.0, 0.0);
        add_object(&mut s, ObjectKind::Placed(ItemKind::IckyBed), bed);
        assert!(try_interact(&mut s, None));
        assert_eq!(s.player.respawn_point, bed);
    }

    #[test]
    fn test_raise_undead_spends_kills() {
        let mut s = state_with(PlayerClass::Necromancer);
        s.player.monster_kills = NECROMANCER_KILLS_TO_SUMMON - 1;
        assert!(try_class_ability(&mut s).is_none());

        s.player.monster_kills = NECROMANCER_KILLS_TO_SUMMON + 2;
        assert!(try_class_ability(&mut s).is_some());
        assert_eq!(s.player.monster_kills, 2);
        assert_eq!(s.undead.len(), 1);
    }

    #[test]
    fn test_knight_has_no_ability() {
        let mut s = state();
        assert!(try_class_ability(&mut s).is_none());
    }

    #[test]
    fn test_pet_needs_level_and_is_permanent() {
        let mut s = state();
        assert!(!choose_pet(&mut s, PetKind::Dog));
        s.player.level = PET_LEVEL;
        assert!(choose_pet(&mut s, PetKind::Dog));
        assert!(!choose_pet(&mut s, PetKind::Cat));
        assert_eq!(s.pet.as_ref().map(|p| p.kind), Some(PetKind::Dog));
    }

    #[test]
    fn test_class_locked_after_first_tick() {
        let mut s = state();
        assert!(choose_class(&mut s, PlayerClass::Tank));
        assert_eq!(s.player.actor.max_health, PLAYER_MAX_HEALTH * 3.0);
        s.tick_count = 1;
        assert!(!choose_class(&mut s, PlayerClass::Scout));
    }

    #[test]
    fn test_respawn_after_death() {
        let mut s = state();
        let home = s.player.actor.pos;
        s.player.actor.pos += Vec2::new(300.0, 0.0);
        let r = s.player_ref();
        combat::deal_damage(&mut s, r, 1000.0, combat::KillCredit::Hostile);
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(!try_attack(&mut s));

        assert!(respawn(&mut s));
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.player.actor.pos, home);
        assert_eq!(s.player.actor.health, s.player.actor.max_health);
        assert!(!respawn(&mut s));
    }
}

//! Player character: class templates, level-3 perks, weapon choices and the
//! derived stats combat and movement read from them
//!
//! Class templates are immutable tables. Anything a perk or weapon changes is
//! stored on the player instance, never written back into a template.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Actor;
use super::inventory::Inventory;
use crate::EntityId;
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    Knight,
    Archer,
    Scout,
    Tank,
    Vampire,
    Necromancer,
    Summoner,
}

/// Fixed per-class multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassTemplate {
    pub health_mult: f32,
    pub speed_mult: f32,
    pub sword_boost: f32,
    pub bow_boost: f32,
    pub lifesteal: f32,
    /// Daytime speed multiplier (1.0 = no penalty)
    pub day_speed_penalty: f32,
    /// Kills needed per undead summon; 0 when the class cannot raise undead
    pub kills_to_summon: u32,
}

/// Active ability bound to the class-ability input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassAbility {
    RaiseUndead,
    SummonSlime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerkChoice {
    First,
    Second,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponId {
    KnightGreatsword,
    KnightBastion,
    ArcherLongbow,
    ArcherShortbow,
    ScoutDaggers,
    ScoutCloak,
    TankHammer,
    TankShield,
    VampireRapier,
    VampireCharm,
    NecroStaff,
    NecroTome,
    SummonCatalyst,
    SummonFocus,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 7] = [
        PlayerClass::Knight,
        PlayerClass::Archer,
        PlayerClass::Scout,
        PlayerClass::Tank,
        PlayerClass::Vampire,
        PlayerClass::Necromancer,
        PlayerClass::Summoner,
    ];

    pub fn template(self) -> ClassTemplate {
        let t = |health_mult, speed_mult, sword_boost, bow_boost, lifesteal, day_speed_penalty, kills_to_summon| {
            ClassTemplate {
                health_mult,
                speed_mult,
                sword_boost,
                bow_boost,
                lifesteal,
                day_speed_penalty,
                kills_to_summon,
            }
        };
        match self {
            PlayerClass::Knight => t(1.0, 1.0, 3.0, 1.0, 0.0, 1.0, 0),
            PlayerClass::Archer => t(1.0, 1.0, 1.0, 5.0, 0.0, 1.0, 0),
            PlayerClass::Scout => t(0.8, 1.75, 1.0, 1.0, 0.0, 1.0, 0),
            PlayerClass::Tank => t(3.0, 0.8, 1.0, 1.0, 0.0, 1.0, 0),
            PlayerClass::Vampire => t(0.8, 1.0, 1.0, 1.0, 2.5, 0.5, 0),
            PlayerClass::Necromancer => t(0.5, 0.8, 1.0, 1.0, 0.0, 1.0, NECROMANCER_KILLS_TO_SUMMON),
            PlayerClass::Summoner => t(0.9, 0.9, 1.0, 1.0, 0.0, 1.0, 0),
        }
    }

    pub fn ability(self) -> Option<ClassAbility> {
        match self {
            PlayerClass::Necromancer => Some(ClassAbility::RaiseUndead),
            PlayerClass::Summoner => Some(ClassAbility::SummonSlime),
            _ => None,
        }
    }

    pub fn weapon_choices(self) -> [WeaponId; 2] {
        match self {
            PlayerClass::Knight => [WeaponId::KnightGreatsword, WeaponId::KnightBastion],
            PlayerClass::Archer => [WeaponId::ArcherLongbow, WeaponId::ArcherShortbow],
            PlayerClass::Scout => [WeaponId::ScoutDaggers, WeaponId::ScoutCloak],
            PlayerClass::Tank => [WeaponId::TankHammer, WeaponId::TankShield],
            PlayerClass::Vampire => [WeaponId::VampireRapier, WeaponId::VampireCharm],
            PlayerClass::Necromancer => [WeaponId::NecroStaff, WeaponId::NecroTome],
            PlayerClass::Summoner => [WeaponId::SummonCatalyst, WeaponId::SummonFocus],
        }
    }

    /// Bonus granted by a level-3 perk pick
    pub fn perk(self, choice: PerkChoice) -> PerkBonus {
        let base = PerkBonus::default();
        match (self, choice) {
            (PlayerClass::Knight, PerkChoice::First) => PerkBonus { max_health: 20.0, ..base },
            (PlayerClass::Knight, PerkChoice::Second) => PerkBonus { sword_damage: 15.0, ..base },
            (PlayerClass::Archer, PerkChoice::First) => PerkBonus { speed_mult: 1.10, ..base },
            (PlayerClass::Archer, PerkChoice::Second) => PerkBonus {
                bow_attack_speed_mult: 0.90,
                ..base
            },
            (PlayerClass::Scout, PerkChoice::First) => PerkBonus { max_health: 10.0, ..base },
            (PlayerClass::Scout, PerkChoice::Second) => PerkBonus { melee_damage: 15.0, ..base },
            (PlayerClass::Tank, PerkChoice::First) => PerkBonus { max_health: 50.0, ..base },
            (PlayerClass::Tank, PerkChoice::Second) => PerkBonus {
                melee_damage: 20.0,
                speed_mult: 0.85,
                ..base
            },
            (PlayerClass::Vampire, PerkChoice::First) => PerkBonus { lifesteal: 2.5, ..base },
            (PlayerClass::Vampire, PerkChoice::Second) => PerkBonus { speed_mult: 1.15, ..base },
            (PlayerClass::Necromancer, PerkChoice::First) => PerkBonus {
                kills_to_summon_reduction: 1,
                ..base
            },
            (PlayerClass::Necromancer, PerkChoice::Second) => PerkBonus {
                undead_health_mult: 1.2,
                ..base
            },
            (PlayerClass::Summoner, PerkChoice::First) => PerkBonus { max_summons: 1, ..base },
            (PlayerClass::Summoner, PerkChoice::Second) => PerkBonus {
                summon_health_mult: 1.25,
                ..base
            },
        }
    }
}

/// Additive and multiplicative bonuses from the level-3 perk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerkBonus {
    pub max_health: f32,
    pub sword_damage: f32,
    pub melee_damage: f32,
    pub lifesteal: f32,
    pub speed_mult: f32,
    pub bow_attack_speed_mult: f32,
    pub kills_to_summon_reduction: u32,
    pub max_summons: usize,
    pub undead_health_mult: f32,
    pub summon_health_mult: f32,
}

impl Default for PerkBonus {
    fn default() -> Self {
        Self {
            max_health: 0.0,
            sword_damage: 0.0,
            melee_damage: 0.0,
            lifesteal: 0.0,
            speed_mult: 1.0,
            bow_attack_speed_mult: 1.0,
            kills_to_summon_reduction: 0,
            max_summons: 0,
            undead_health_mult: 1.0,
            summon_health_mult: 1.0,
        }
    }
}

/// Effect bundle of a chosen weapon
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponEffects {
    pub damage_mult: f32,
    pub move_speed_mult: f32,
    pub attack_speed_mult: f32,
    pub range_mult: f32,
    pub bonus_max_health: f32,
    pub bonus_melee_damage: f32,
    pub bonus_lifesteal: f32,
    pub night_speed_mult: f32,
    pub day_penalty_mult: f32,
    pub on_kill_heal: f32,
    pub bonus_max_summons: usize,
    pub undead_health_mult: f32,
    pub summon_health_mult: f32,
    pub summon_damage_mult: f32,
}

impl Default for WeaponEffects {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            move_speed_mult: 1.0,
            attack_speed_mult: 1.0,
            range_mult: 1.0,
            bonus_max_health: 0.0,
            bonus_melee_damage: 0.0,
            bonus_lifesteal: 0.0,
            night_speed_mult: 1.0,
            day_penalty_mult: 1.0,
            on_kill_heal: 0.0,
            bonus_max_summons: 0,
            undead_health_mult: 1.0,
            summon_health_mult: 1.0,
            summon_damage_mult: 1.0,
        }
    }
}

impl WeaponId {
    pub fn name(self) -> &'static str {
        match self {
            WeaponId::KnightGreatsword => "Guardian's Greatsword",
            WeaponId::KnightBastion => "Bastion Blade",
            WeaponId::ArcherLongbow => "Swiftwood Longbow",
            WeaponId::ArcherShortbow => "Hunter's Shortbow",
            WeaponId::ScoutDaggers => "Twin Daggers",
            WeaponId::ScoutCloak => "Shadow Cloak",
            WeaponId::TankHammer => "Earthshaker Maul",
            WeaponId::TankShield => "Aegis Wall",
            WeaponId::VampireRapier => "Blood drinker Rapier",
            WeaponId::VampireCharm => "Nocturnal Charm",
            WeaponId::NecroStaff => "Soul Siphon Staff",
            WeaponId::NecroTome => "Tome of Binding",
            WeaponId::SummonCatalyst => "Growth Catalyst",
            WeaponId::SummonFocus => "Swarm Focus",
        }
    }

    pub fn effects(self) -> WeaponEffects {
        let base = WeaponEffects::default();
        match self {
            WeaponId::KnightGreatsword => WeaponEffects {
                damage_mult: 1.25,
                move_speed_mult: 0.9,
                ..base
            },
            WeaponId::KnightBastion => WeaponEffects {
                bonus_max_health: 30.0,
                damage_mult: 1.05,
                ..base
            },
            WeaponId::ArcherLongbow => WeaponEffects {
                damage_mult: 1.2,
                range_mult: 1.1,
                move_speed_mult: 0.95,
                ..base
            },
            WeaponId::ArcherShortbow => WeaponEffects {
                attack_speed_mult: 0.8,
                damage_mult: 0.9,
                ..base
            },
            WeaponId::ScoutDaggers => WeaponEffects {
                attack_speed_mult: 0.85,
                damage_mult: 0.9,
                ..base
            },
            WeaponId::ScoutCloak => WeaponEffects {
                move_speed_mult: 1.1,
                bonus_max_health: 5.0,
                ..base
            },
            WeaponId::TankHammer => WeaponEffects {
                bonus_melee_damage: 40.0,
                attack_speed_mult: 1.25,
                ..base
            },
            WeaponId::TankShield => WeaponEffects {
                bonus_max_health: 75.0,
                move_speed_mult: 0.9,
                ..base
            },
            WeaponId::VampireRapier => WeaponEffects {
                bonus_lifesteal: 0.05,
                attack_speed_mult: 0.9,
                ..base
            },
            WeaponId::VampireCharm => WeaponEffects {
                night_speed_mult: 1.15,
                day_penalty_mult: 0.9,
                ..base
            },
            WeaponId::NecroStaff => WeaponEffects {
                on_kill_heal: 1.0,
                damage_mult: 0.95,
                ..base
            },
            WeaponId::NecroTome => WeaponEffects {
                bonus_max_summons: 1,
                undead_health_mult: 0.9,
                ..base
            },
            WeaponId::SummonCatalyst => WeaponEffects {
                summon_health_mult: 1.4,
                summon_damage_mult: 1.1,
                ..base
            },
            WeaponId::SummonFocus => WeaponEffects {
                bonus_max_summons: 1,
                summon_health_mult: 0.85,
                ..base
            },
        }
    }
}

/// XP needed to advance from `level` to the next
pub fn xp_for_next_level(level: u32) -> u32 {
    if level < 1 {
        return BASE_XP_FOR_LEVEL_2;
    }
    let required = (BASE_XP_FOR_LEVEL_2 as f32 * (level as f32).powf(XP_LEVEL_EXPONENT)).floor() as u32;
    required.max(BASE_XP_FOR_LEVEL_2)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub actor: Actor,
    pub class: PlayerClass,
    /// Facing angle in radians
    pub facing: f32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub perk: Option<PerkChoice>,
    pub perk_bonus: PerkBonus,
    pub weapon: Option<WeaponId>,
    pub weapon_fx: WeaponEffects,
    /// Set by using a mystical orb, cleared by picking a weapon
    pub weapon_choice_open: bool,
    /// Hostile kills banked toward the next undead summon
    pub monster_kills: u32,
    pub respawn_point: Vec2,
    pub last_melee_ms: f64,
    pub last_bow_ms: f64,
    pub inventory: Inventory,
}

impl Player {
    pub fn new(id: EntityId, class: PlayerClass, pos: Vec2) -> Self {
        let template = class.template();
        let max_health = PLAYER_MAX_HEALTH * template.health_mult;
        Self {
            id,
            actor: Actor::new(pos, PLAYER_RADIUS, max_health),
            class,
            facing: 0.0,
            level: 1,
            xp: 0,
            xp_to_next: xp_for_next_level(1),
            perk: None,
            perk_bonus: PerkBonus::default(),
            weapon: None,
            weapon_fx: WeaponEffects::default(),
            weapon_choice_open: false,
            monster_kills: 0,
            respawn_point: pos,
            last_melee_ms: f64::NEG_INFINITY,
            last_bow_ms: f64::NEG_INFINITY,
            inventory: Inventory::default(),
        }
    }

    pub fn template(&self) -> ClassTemplate {
        self.class.template()
    }

    /// Base, class, perk and weapon contributions to max health
    pub fn derived_max_health(&self) -> f32 {
        PLAYER_MAX_HEALTH * self.template().health_mult
            + self.perk_bonus.max_health
            + self.weapon_fx.bonus_max_health
    }

    /// Re-derive max health, keeping the current health fraction
    pub fn recompute_max_health(&mut self) {
        let new_max = self.derived_max_health();
        let old_max = self.actor.max_health;
        if old_max > 0.0 && self.actor.is_alive() {
            self.actor.health = (self.actor.health * new_max / old_max).min(new_max);
        }
        self.actor.max_health = new_max;
    }

    pub fn move_speed(&self, is_night: bool) -> f32 {
        let template = self.template();
        let mut speed = PLAYER_SPEED
            * template.speed_mult
            * self.perk_bonus.speed_mult
            * self.weapon_fx.move_speed_mult;
        if is_night {
            speed *= self.weapon_fx.night_speed_mult;
        } else if template.day_speed_penalty < 1.0 {
            let penalty = (template.day_speed_penalty * self.weapon_fx.day_penalty_mult).min(1.0);
            speed *= penalty;
        }
        speed
    }

    pub fn lifesteal(&self) -> f32 {
        self.template().lifesteal + self.perk_bonus.lifesteal + self.weapon_fx.bonus_lifesteal
    }

    pub fn melee_bonus(&self) -> f32 {
        self.perk_bonus.melee_damage + self.weapon_fx.bonus_melee_damage
    }

    pub fn melee_cooldown_ms(&self) -> f64 {
        MELEE_ATTACK_COOLDOWN_MS * self.weapon_fx.attack_speed_mult as f64
    }

    pub fn bow_cooldown_ms(&self) -> f64 {
        BOW_COOLDOWN_MS
            * self.perk_bonus.bow_attack_speed_mult as f64
            * self.weapon_fx.attack_speed_mult as f64
    }

    /// Kills per undead summon after perk reductions (never below one)
    pub fn kills_to_summon(&self) -> u32 {
        self.template()
            .kills_to_summon
            .saturating_sub(self.perk_bonus.kills_to_summon_reduction)
            .max(1)
    }

    pub fn bonus_max_summons(&self) -> usize {
        self.perk_bonus.max_summons + self.weapon_fx.bonus_max_summons
    }

    pub fn max_undead(&self) -> usize {
        MAX_UNDEAD_MINIONS + self.bonus_max_summons()
    }

    pub fn max_summons(&self) -> usize {
        MAX_SUMMONED_SLIMES + self.bonus_max_summons()
    }

    pub fn undead_health(&self) -> f32 {
        MINION_BASE_HEALTH
            * UNDEAD_HEALTH_MULT
            * self.perk_bonus.undead_health_mult
            * self.weapon_fx.undead_health_mult
    }

    pub fn summon_health(&self) -> f32 {
        MINION_BASE_HEALTH * self.perk_bonus.summon_health_mult * self.weapon_fx.summon_health_mult
    }

    pub fn summon_damage(&self) -> f32 {
        SUMMONED_SLIME_DAMAGE * self.weapon_fx.summon_damage_mult
    }

    /// Add XP; returns every level reached by this grant
    pub fn gain_xp(&mut self, amount: u32) -> Vec<u32> {
        let mut reached = Vec::new();
        if amount == 0 {
            return reached;
        }
        self.xp += amount;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            self.xp_to_next = xp_for_next_level(self.level);
            reached.push(self.level);
        }
        reached
    }

    pub fn perk_available(&self) -> bool {
        self.level >= PERK_LEVEL && self.perk.is_none()
    }

    /// Apply the level-3 perk once
    pub fn choose_perk(&mut self, choice: PerkChoice) -> bool {
        if !self.perk_available() {
            return false;
        }
        self.perk = Some(choice);
        self.perk_bonus = self.class.perk(choice);
        self.recompute_max_health();
        true
    }

    /// Apply a weapon's effect bundle once; the weapon must belong to the class
    pub fn choose_weapon(&mut self, weapon: WeaponId) -> bool {
        if self.weapon.is_some() || !self.class.weapon_choices().contains(&weapon) {
            return false;
        }
        self.weapon = Some(weapon);
        self.weapon_fx = weapon.effects();
        self.weapon_choice_open = false;
        self.recompute_max_health();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(class: PlayerClass) -> Player {
        Player::new(EntityId(1), class, Vec2::ZERO)
    }

    #[test]
    fn test_xp_curve() {
        assert_eq!(xp_for_next_level(0), 100);
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(2), 282);
        assert_eq!(xp_for_next_level(3), 519);
    }

    #[test]
    fn test_gain_xp_multi_level() {
        let mut p = player(PlayerClass::Knight);
        let reached = p.gain_xp(400);
        assert_eq!(reached, vec![2, 3]);
        assert_eq!(p.level, 3);
        assert_eq!(p.xp, 18);
        assert!(p.perk_available());
    }

    #[test]
    fn test_class_health() {
        assert_eq!(player(PlayerClass::Tank).actor.max_health, 300.0);
        assert_eq!(player(PlayerClass::Necromancer).actor.max_health, 50.0);
    }

    #[test]
    fn test_perk_rescales_health_proportionally() {
        let mut p = player(PlayerClass::Knight);
        p.actor.health = 50.0;
        p.level = 3;
        assert!(p.choose_perk(PerkChoice::First));
        assert_eq!(p.actor.max_health, 120.0);
        assert!((p.actor.health - 60.0).abs() < 1e-4);
        // Only once
        assert!(!p.choose_perk(PerkChoice::Second));
    }

    #[test]
    fn test_perk_requires_level() {
        let mut p = player(PlayerClass::Scout);
        assert!(!p.choose_perk(PerkChoice::First));
    }

    #[test]
    fn test_weapon_must_match_class() {
        let mut p = player(PlayerClass::Archer);
        assert!(!p.choose_weapon(WeaponId::TankShield));
        assert!(p.choose_weapon(WeaponId::ArcherShortbow));
        assert!((p.bow_cooldown_ms() - 1280.0).abs() < 1e-3);
        assert!(!p.choose_weapon(WeaponId::ArcherLongbow));
    }

    #[test]
    fn test_necromancer_kills_perk_does_not_touch_template() {
        let mut p = player(PlayerClass::Necromancer);
        p.level = 3;
        p.choose_perk(PerkChoice::First);
        assert_eq!(p.kills_to_summon(), 4);
        assert_eq!(PlayerClass::Necromancer.template().kills_to_summon, 5);
    }

    #[test]
    fn test_vampire_day_penalty() {
        let p = player(PlayerClass::Vampire);
        assert!((p.move_speed(false) - 2.0).abs() < 1e-6);
        assert!((p.move_speed(true) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_nocturnal_charm_deepens_day_penalty() {
        let mut p = player(PlayerClass::Vampire);
        assert!(p.choose_weapon(WeaponId::VampireCharm));
        assert!((p.move_speed(false) - 1.8).abs() < 1e-5);
        assert!((p.move_speed(true) - 4.6).abs() < 1e-5);
    }

    #[test]
    fn test_twin_daggers_trade_damage_for_speed() {
        let fx = WeaponId::ScoutDaggers.effects();
        assert_eq!(fx.attack_speed_mult, 0.85);
        assert_eq!(fx.damage_mult, 0.9);

        let mut p = player(PlayerClass::Scout);
        let before = p.melee_cooldown_ms();
        assert!(p.choose_weapon(WeaponId::ScoutDaggers));
        assert!((p.melee_cooldown_ms() - before * 0.85).abs() < 1e-3);
    }

    #[test]
    fn test_weapon_names() {
        assert_eq!(WeaponId::VampireCharm.name(), "Nocturnal Charm");
        assert_eq!(WeaponId::KnightGreatsword.name(), "Guardian's Greatsword");
        assert_eq!(WeaponId::TankHammer.name(), "Earthshaker Maul");
        assert_eq!(WeaponId::SummonFocus.name(), "Swarm Focus");
    }
}

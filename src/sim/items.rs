//! Item catalogue, world-object kinds and loot tables
//!
//! Item behavior is looked up by matching on `ItemKind`; there is no runtime
//! item registry.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::PLACE_GRID_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    // Materials
    Wood,
    Stone,
    PlantFiber,
    MonsterGoop,
    GoldCoin,
    Dust,
    Stick,
    IronOre,
    CobaltOre,
    MithrilOre,
    AdamantiteOre,
    // Placeables
    WoodPlank,
    StoneBlock,
    Workbench,
    IckyBed,
    Torch,
    ItemUpgraderT1,
    // Usables
    HealingSalve,
    MysticalOrb,
    // Tools
    WoodSword,
    WoodAxe,
    WoodPickaxe,
    StoneSword,
    StoneAxe,
    StonePickaxe,
    IronPickaxe,
    CobaltPickaxe,
    MithrilPickaxe,
    AdamantitePickaxe,
    WoodenBow,
    StoneReinforcedBow,
    BoneScythe,
    FishingRod,
}

/// Tool category with its per-tool multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tool {
    Sword { damage_mult: f32 },
    Axe { gather_mult: f32 },
    Pickaxe { gather_mult: f32, tier: u8 },
    Bow { range: f32, damage: f32 },
    FishingRod,
}

/// How an item behaves once placed in the world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placeable {
    pub solid_radius: f32,
    pub health: f32,
    pub interactable: bool,
}

const SWORD_MULTIPLIER: f32 = 2.0;
const AXE_MULTIPLIER: f32 = 3.0;
const PICKAXE_MULTIPLIER: f32 = 4.0;

impl ItemKind {
    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Wood => "Wood",
            ItemKind::Stone => "Stone",
            ItemKind::PlantFiber => "Plant Fiber",
            ItemKind::MonsterGoop => "Monster Goop",
            ItemKind::GoldCoin => "Gold Coin",
            ItemKind::Dust => "Dust",
            ItemKind::Stick => "Stick",
            ItemKind::IronOre => "Iron Ore",
            ItemKind::CobaltOre => "Cobalt Ore",
            ItemKind::MithrilOre => "Mithril Ore",
            ItemKind::AdamantiteOre => "Adamantite Ore",
            ItemKind::WoodPlank => "Wooden Plank",
            ItemKind::StoneBlock => "Stone Block",
            ItemKind::Workbench => "Workbench",
            ItemKind::IckyBed => "Icky Bed",
            ItemKind::Torch => "Torch",
            ItemKind::ItemUpgraderT1 => "Item Upgrader T1",
            ItemKind::HealingSalve => "Healing Salve",
            ItemKind::MysticalOrb => "Mystical Orb",
            ItemKind::WoodSword => "Wooden Sword",
            ItemKind::WoodAxe => "Wooden Axe",
            ItemKind::WoodPickaxe => "Wooden Pickaxe",
            ItemKind::StoneSword => "Stone Sword",
            ItemKind::StoneAxe => "Stone Axe",
            ItemKind::StonePickaxe => "Stone Pickaxe",
            ItemKind::IronPickaxe => "Iron Pickaxe",
            ItemKind::CobaltPickaxe => "Cobalt Pickaxe",
            ItemKind::MithrilPickaxe => "Mithril Pickaxe",
            ItemKind::AdamantitePickaxe => "Adamantite Pickaxe",
            ItemKind::WoodenBow => "Wooden Bow",
            ItemKind::StoneReinforcedBow => "Stone-Reinforced Bow",
            ItemKind::BoneScythe => "Bone Scythe",
            ItemKind::FishingRod => "Fishing Rod",
        }
    }

    pub fn tool(self) -> Option<Tool> {
        let pickaxe = |scale: f32, tier: u8| Tool::Pickaxe {
            gather_mult: PICKAXE_MULTIPLIER * scale,
            tier,
        };
        Some(match self {
            ItemKind::WoodSword => Tool::Sword {
                damage_mult: SWORD_MULTIPLIER,
            },
            ItemKind::StoneSword => Tool::Sword {
                damage_mult: SWORD_MULTIPLIER * 1.5,
            },
            ItemKind::BoneScythe => Tool::Sword {
                damage_mult: SWORD_MULTIPLIER * 2.0,
            },
            ItemKind::WoodAxe => Tool::Axe {
                gather_mult: AXE_MULTIPLIER,
            },
            ItemKind::StoneAxe => Tool::Axe {
                gather_mult: AXE_MULTIPLIER * 1.5,
            },
            ItemKind::WoodPickaxe => pickaxe(1.0, 0),
            ItemKind::StonePickaxe => pickaxe(1.5, 1),
            ItemKind::IronPickaxe => pickaxe(2.0, 2),
            ItemKind::CobaltPickaxe => pickaxe(2.7, 3),
            ItemKind::MithrilPickaxe => pickaxe(3.5, 4),
            ItemKind::AdamantitePickaxe => pickaxe(4.5, 5),
            ItemKind::WoodenBow => Tool::Bow {
                range: 400.0,
                damage: 45.0,
            },
            ItemKind::StoneReinforcedBow => Tool::Bow {
                range: 450.0,
                damage: 66.0,
            },
            ItemKind::FishingRod => Tool::FishingRod,
            _ => return None,
        })
    }

    pub fn placeable(self) -> Option<Placeable> {
        let half = PLACE_GRID_SIZE / 2.0;
        let (solid_radius, health, interactable) = match self {
            ItemKind::WoodPlank => (half, 50.0, false),
            ItemKind::StoneBlock => (half, 150.0, false),
            ItemKind::Workbench => (PLACE_GRID_SIZE, 100.0, true),
            ItemKind::IckyBed => (PLACE_GRID_SIZE, 80.0, true),
            ItemKind::Torch => (5.0, 10.0, false),
            ItemKind::ItemUpgraderT1 => (PLACE_GRID_SIZE, 200.0, true),
            _ => return None,
        };
        Some(Placeable {
            solid_radius,
            health,
            interactable,
        })
    }

    pub fn is_usable(self) -> bool {
        matches!(self, ItemKind::HealingSalve | ItemKind::MysticalOrb)
    }
}

/// Kind of a static world object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Tree,
    Rock,
    Cactus,
    BoneTree,
    /// Player-built structure
    Placed(ItemKind),
}

impl ObjectKind {
    /// Natural resources spawn with double their listed health
    pub fn base_stats(self) -> (f32, f32) {
        match self {
            ObjectKind::Tree => (15.0, 100.0),
            ObjectKind::Rock => (12.0, 300.0),
            ObjectKind::Cactus => (10.0, 200.0),
            ObjectKind::BoneTree => (13.0, 320.0),
            ObjectKind::Placed(item) => item
                .placeable()
                .map(|p| (p.solid_radius, p.health))
                .unwrap_or((PLACE_GRID_SIZE / 2.0, 100.0)),
        }
    }

    pub fn is_placed(self) -> bool {
        matches!(self, ObjectKind::Placed(_))
    }

    /// Whether an axe is the matching gathering tool
    pub fn is_woody(self) -> bool {
        matches!(self, ObjectKind::Tree | ObjectKind::BoneTree | ObjectKind::Cactus)
    }
}

/// One line of a loot table
#[derive(Debug, Clone, Copy)]
pub struct LootEntry {
    pub item: ItemKind,
    pub min: u32,
    pub max: u32,
    /// Probability that this line drops at all
    pub chance: f64,
}

impl LootEntry {
    const fn always(item: ItemKind, min: u32, max: u32) -> Self {
        Self {
            item,
            min,
            max,
            chance: 1.0,
        }
    }

    const fn sometimes(item: ItemKind, count: u32, chance: f64) -> Self {
        Self {
            item,
            min: count,
            max: count,
            chance,
        }
    }
}

pub const HOSTILE_LOOT: &[LootEntry] = &[
    LootEntry::always(ItemKind::MonsterGoop, 1, 4),
    LootEntry::sometimes(ItemKind::GoldCoin, 1, crate::consts::GOLD_COIN_DROP_CHANCE),
    LootEntry::sometimes(ItemKind::HealingSalve, 1, 0.02),
];

pub const PLAINS_BOSS_LOOT: &[LootEntry] = &[
    LootEntry::always(ItemKind::GoldCoin, 10, 25),
    LootEntry::always(ItemKind::Stone, 5, 15),
    LootEntry::always(ItemKind::IronOre, 15, 15),
    LootEntry::sometimes(ItemKind::HealingSalve, 2, 0.1),
];

pub const FOREST_WOLF_LOOT: &[LootEntry] = &[LootEntry::always(ItemKind::MysticalOrb, 1, 1)];

const TREE_LOOT: &[LootEntry] = &[
    LootEntry::always(ItemKind::Wood, 1, 3),
    LootEntry::sometimes(ItemKind::PlantFiber, 1, 0.2),
];
const ROCK_LOOT: &[LootEntry] = &[LootEntry::always(ItemKind::Stone, 1, 2)];
const CACTUS_LOOT: &[LootEntry] = &[LootEntry::always(ItemKind::PlantFiber, 1, 2)];
const BONE_TREE_LOOT: &[LootEntry] = &[
    LootEntry::always(ItemKind::Dust, 1, 3),
    LootEntry::sometimes(ItemKind::BoneScythe, 1, 0.02),
];

/// Roll a table into concrete (item, count) drops
pub fn roll_loot(table: &[LootEntry], rng: &mut impl Rng) -> Vec<(ItemKind, u32)> {
    let mut drops = Vec::new();
    for entry in table {
        if entry.chance < 1.0 && !rng.random_bool(entry.chance) {
            continue;
        }
        let count = if entry.max > entry.min {
            rng.random_range(entry.min..=entry.max)
        } else {
            entry.min
        };
        drops.push((entry.item, count));
    }
    drops
}

/// Drops for a destroyed world object
pub fn object_loot(kind: ObjectKind, rng: &mut impl Rng) -> Vec<(ItemKind, u32)> {
    match kind {
        ObjectKind::Tree => roll_loot(TREE_LOOT, rng),
        ObjectKind::Rock => roll_loot(ROCK_LOOT, rng),
        ObjectKind::Cactus => roll_loot(CACTUS_LOOT, rng),
        ObjectKind::BoneTree => roll_loot(BONE_TREE_LOOT, rng),
        ObjectKind::Placed(item) => vec![(item, 1)],
    }
}

//! Crafting recipes and tool upgrades
//!
//! Both paths check every requirement before touching the inventory, so a
//! failed craft never leaves ingredients half removed.

use thiserror::Error;

use super::combat;
use super::inventory::InventoryError;
use super::items::{ItemKind, ObjectKind};
use super::state::{GameEvent, GameState};
use crate::consts::INTERACT_RANGE;

use ItemKind::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CraftError {
    #[error("no recipe produces {0:?}")]
    UnknownRecipe(ItemKind),

    #[error("{0:?} cannot be upgraded")]
    NotUpgradable(ItemKind),

    #[error("requires a nearby {0:?}")]
    StationRequired(ItemKind),

    #[error("need {need} {item:?}, have {have}")]
    Missing { item: ItemKind, need: u32, have: u32 },

    #[error("player is dead")]
    PlayerDead,

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

#[derive(Debug, Clone, Copy)]
pub struct Recipe {
    pub output: ItemKind,
    pub count: u32,
    pub inputs: &'static [(ItemKind, u32)],
    /// Placed structure that must be within reach
    pub station: Option<ItemKind>,
}

const fn hand(output: ItemKind, count: u32, inputs: &'static [(ItemKind, u32)]) -> Recipe {
    Recipe {
        output,
        count,
        inputs,
        station: None,
    }
}

const fn bench(output: ItemKind, inputs: &'static [(ItemKind, u32)]) -> Recipe {
    Recipe {
        output,
        count: 1,
        inputs,
        station: Some(ItemKind::Workbench),
    }
}

pub const RECIPES: &[Recipe] = &[
    hand(Stick, 2, &[(Wood, 1)]),
    hand(WoodPlank, 4, &[(Wood, 1)]),
    hand(StoneBlock, 4, &[(Stone, 1)]),
    hand(WoodSword, 1, &[(WoodPlank, 2), (Stick, 1)]),
    hand(WoodAxe, 1, &[(WoodPlank, 3), (Stick, 2)]),
    hand(WoodPickaxe, 1, &[(WoodPlank, 3), (Stick, 2)]),
    hand(WoodenBow, 1, &[(Stick, 3), (PlantFiber, 3)]),
    hand(Workbench, 1, &[(Wood, 10)]),
    hand(IckyBed, 1, &[(MonsterGoop, 10), (WoodPlank, 5), (PlantFiber, 5)]),
    hand(HealingSalve, 1, &[(PlantFiber, 3), (MonsterGoop, 1)]),
    hand(Torch, 3, &[(Stick, 1), (PlantFiber, 1)]),
    bench(StoneSword, &[(StoneBlock, 2), (Stick, 1)]),
    bench(StoneAxe, &[(StoneBlock, 3), (Stick, 2)]),
    bench(StonePickaxe, &[(StoneBlock, 3), (Stick, 2)]),
    bench(StoneReinforcedBow, &[(WoodenBow, 1), (Stone, 10), (PlantFiber, 5)]),
    bench(ItemUpgraderT1, &[(WoodPlank, 15), (StoneBlock, 10), (IronOre, 5)]),
];

/// One step along a tool upgrade chain
#[derive(Debug, Clone, Copy)]
pub struct Upgrade {
    pub input: ItemKind,
    pub output: ItemKind,
    pub material: ItemKind,
    pub count: u32,
}

pub const UPGRADES: &[Upgrade] = &[
    Upgrade { input: WoodPickaxe, output: StonePickaxe, material: Stone, count: 15 },
    Upgrade { input: StonePickaxe, output: IronPickaxe, material: IronOre, count: 10 },
    Upgrade { input: IronPickaxe, output: CobaltPickaxe, material: CobaltOre, count: 12 },
    Upgrade { input: CobaltPickaxe, output: MithrilPickaxe, material: MithrilOre, count: 15 },
    Upgrade { input: MithrilPickaxe, output: AdamantitePickaxe, material: AdamantiteOre, count: 18 },
];

pub fn recipe_for(output: ItemKind) -> Option<&'static Recipe> {
    RECIPES.iter().find(|r| r.output == output)
}

pub fn upgrade_for(input: ItemKind) -> Option<&'static Upgrade> {
    UPGRADES.iter().find(|u| u.input == input)
}

/// A living placed `station` within interact range of the player
pub fn station_nearby(state: &GameState, station: ItemKind) -> bool {
    let player = state.player.actor.pos;
    state.objects.iter().any(|o| {
        o.kind == ObjectKind::Placed(station)
            && o.actor.is_alive()
            && o.actor.pos.distance(player) < INTERACT_RANGE
    })
}

fn check_inputs(state: &GameState, inputs: &[(ItemKind, u32)]) -> Result<(), CraftError> {
    for &(item, need) in inputs {
        let have = state.player.inventory.total_count(item);
        if have < need {
            return Err(CraftError::Missing { item, need, have });
        }
    }
    Ok(())
}

/// Whether `recipe` could be crafted right now
pub fn can_craft(state: &GameState, recipe: &Recipe) -> Result<(), CraftError> {
    if !state.player.actor.is_alive() {
        return Err(CraftError::PlayerDead);
    }
    if let Some(station) = recipe.station
        && !station_nearby(state, station)
    {
        return Err(CraftError::StationRequired(station));
    }
    check_inputs(state, recipe.inputs)
}

/// Hand over whatever did not fit as drops at the player's feet
fn give(state: &mut GameState, item: ItemKind, count: u32) {
    let leftover = state.player.inventory.add(item, count);
    if leftover > 0 {
        let pos = state.player.actor.pos;
        combat::spawn_drops(state, pos, &[(item, leftover)]);
    }
}

pub fn craft(state: &mut GameState, output: ItemKind) -> Result<(), CraftError> {
    let recipe = recipe_for(output).ok_or(CraftError::UnknownRecipe(output))?;
    can_craft(state, recipe)?;

    for &(item, need) in recipe.inputs {
        state.player.inventory.remove(item, need)?;
    }
    give(state, recipe.output, recipe.count);
    log::debug!("Crafted {}x {}", recipe.count, recipe.output.name());
    state.push_event(GameEvent::Crafted {
        item: recipe.output,
        count: recipe.count,
    });
    Ok(())
}

/// Upgrade a held tool at a nearby upgrader; returns the new tool
pub fn upgrade(state: &mut GameState, tool: ItemKind) -> Result<ItemKind, CraftError> {
    let step = upgrade_for(tool).ok_or(CraftError::NotUpgradable(tool))?;
    if !state.player.actor.is_alive() {
        return Err(CraftError::PlayerDead);
    }
    if !station_nearby(state, ItemKind::ItemUpgraderT1) {
        return Err(CraftError::StationRequired(ItemKind::ItemUpgraderT1));
    }
    check_inputs(state, &[(step.input, 1), (step.material, step.count)])?;

    state.player.inventory.remove(step.input, 1)?;
    state.player.inventory.remove(step.material, step.count)?;
    give(state, step.output, 1);
    log::info!("Upgraded {} to {}", step.input.name(), step.output.name());
    state.push_event(GameEvent::Crafted {
        item: step.output,
        count: 1,
    });
    Ok(step.output)
}

//! Slot inventory with a hotbar
//!
//! Query contract used by combat and crafting: `total_count`, `remove`
//! (reports partial failure, never rolls back) and `add` (fills existing
//! stacks first, returns what did not fit).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::items::ItemKind;
use crate::consts::{HOTBAR_SIZE, INVENTORY_SIZE, MAX_STACK_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub item: ItemKind,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("wanted {requested} {item:?} but only {removed} were available")]
    Insufficient {
        item: ItemKind,
        requested: u32,
        removed: u32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    pub slots: Vec<Option<Stack>>,
    pub hotbar: Vec<Option<Stack>>,
    pub selected: usize,
}

impl Default for Inventory {
    fn default() -> Self {
        Self {
            slots: vec![None; INVENTORY_SIZE],
            hotbar: vec![None; HOTBAR_SIZE],
            selected: 0,
        }
    }
}

impl Inventory {
    /// Count of `item` across inventory and hotbar
    pub fn total_count(&self, item: ItemKind) -> u32 {
        self.slots
            .iter()
            .chain(self.hotbar.iter())
            .flatten()
            .filter(|s| s.item == item)
            .map(|s| s.count)
            .sum()
    }

    /// Remove up to `count`, newest slots first, inventory before hotbar
    ///
    /// Whatever could be removed stays removed even when the call fails.
    pub fn remove(&mut self, item: ItemKind, count: u32) -> Result<(), InventoryError> {
        let mut remaining = count;
        for slot in self.slots.iter_mut().rev().chain(self.hotbar.iter_mut().rev()) {
            if remaining == 0 {
                break;
            }
            let Some(stack) = slot else { continue };
            if stack.item != item {
                continue;
            }
            let take = stack.count.min(remaining);
            stack.count -= take;
            remaining -= take;
            if stack.count == 0 {
                *slot = None;
            }
        }

        if remaining == 0 {
            Ok(())
        } else {
            Err(InventoryError::Insufficient {
                item,
                requested: count,
                removed: count - remaining,
            })
        }
    }

    /// Add items to the main inventory; returns the count that did not fit
    pub fn add(&mut self, item: ItemKind, count: u32) -> u32 {
        let mut remaining = count;

        for stack in self.slots.iter_mut().flatten() {
            if remaining == 0 {
                break;
            }
            if stack.item == item && stack.count < MAX_STACK_SIZE {
                let take = (MAX_STACK_SIZE - stack.count).min(remaining);
                stack.count += take;
                remaining -= take;
            }
        }

        for slot in self.slots.iter_mut().filter(|s| s.is_none()) {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(MAX_STACK_SIZE);
            *slot = Some(Stack { item, count: take });
            remaining -= take;
        }

        if remaining > 0 {
            log::warn!("Inventory full: {} {} left over", remaining, item.name());
        }
        remaining
    }

    /// Whether `add(item, count)` would fit entirely
    pub fn has_room_for(&self, item: ItemKind, count: u32) -> bool {
        let room: u32 = self
            .slots
            .iter()
            .map(|slot| match slot {
                None => MAX_STACK_SIZE,
                Some(s) if s.item == item => MAX_STACK_SIZE.saturating_sub(s.count),
                Some(_) => 0,
            })
            .sum();
        room >= count
    }

    /// Item in the selected hotbar slot
    pub fn equipped(&self) -> Option<ItemKind> {
        self.hotbar.get(self.selected).copied().flatten().map(|s| s.item)
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.hotbar.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Consume one of the equipped item
    pub fn consume_equipped(&mut self) -> bool {
        let Some(slot) = self.hotbar.get_mut(self.selected) else {
            return false;
        };
        let Some(stack) = slot else { return false };
        stack.count -= 1;
        if stack.count == 0 {
            *slot = None;
        }
        true
    }

    /// Put a stack straight into a hotbar slot, replacing what was there
    pub fn set_hotbar(&mut self, index: usize, item: ItemKind, count: u32) {
        if let Some(slot) = self.hotbar.get_mut(index) {
            *slot = Some(Stack { item, count });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_fills_existing_stack_first() {
        let mut inv = Inventory::default();
        inv.slots[3] = Some(Stack {
            item: ItemKind::Wood,
            count: 60,
        });
        assert_eq!(inv.add(ItemKind::Wood, 10), 0);
        assert_eq!(inv.slots[3].map(|s| s.count), Some(64));
        assert_eq!(inv.slots[0].map(|s| s.count), Some(6));
        assert_eq!(inv.total_count(ItemKind::Wood), 70);
    }

    #[test]
    fn test_add_reports_overflow() {
        let mut inv = Inventory::default();
        let capacity = INVENTORY_SIZE as u32 * MAX_STACK_SIZE;
        assert_eq!(inv.add(ItemKind::Stone, capacity + 5), 5);
        assert!(!inv.has_room_for(ItemKind::Stone, 1));
    }

    #[test]
    fn test_total_counts_hotbar() {
        let mut inv = Inventory::default();
        inv.set_hotbar(0, ItemKind::Stick, 3);
        inv.add(ItemKind::Stick, 2);
        assert_eq!(inv.total_count(ItemKind::Stick), 5);
    }

    #[test]
    fn test_remove_partial_reports_failure() {
        let mut inv = Inventory::default();
        inv.add(ItemKind::PlantFiber, 3);
        let err = inv.remove(ItemKind::PlantFiber, 5).unwrap_err();
        assert_eq!(
            err,
            InventoryError::Insufficient {
                item: ItemKind::PlantFiber,
                requested: 5,
                removed: 3
            }
        );
        // No rollback
        assert_eq!(inv.total_count(ItemKind::PlantFiber), 0);
    }

    #[test]
    fn test_remove_drains_inventory_before_hotbar() {
        let mut inv = Inventory::default();
        inv.set_hotbar(1, ItemKind::Wood, 4);
        inv.add(ItemKind::Wood, 4);
        inv.remove(ItemKind::Wood, 5).unwrap();
        assert_eq!(inv.hotbar[1].map(|s| s.count), Some(3));
        assert!(inv.slots[0].is_none());
    }

    #[test]
    fn test_consume_equipped_clears_slot() {
        let mut inv = Inventory::default();
        inv.set_hotbar(2, ItemKind::HealingSalve, 1);
        assert!(inv.select(2));
        assert_eq!(inv.equipped(), Some(ItemKind::HealingSalve));
        assert!(inv.consume_equipped());
        assert_eq!(inv.equipped(), None);
        assert!(!inv.select(HOTBAR_SIZE));
    }
}

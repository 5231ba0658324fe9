//! Item quick-slots.
//!
//! Shortcuts remember catalog ids, not container indices, so a bound item
//! keeps working after it moves inside the inventory.

use serde::{Deserialize, Serialize};

use crate::{constants::SHORTCUT_ITEMS, types::Container};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ItemShortcuts {
    items: [Option<i32>; SHORTCUT_ITEMS],
}

impl ItemShortcuts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds shortcut `n` to `type_id`. Out-of-range `n` or a non-positive
    /// id is ignored.
    pub fn set(&mut self, n: usize, type_id: i32) -> bool {
        match self.items.get_mut(n) {
            Some(slot) if type_id > 0 => {
                *slot = Some(type_id);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self, n: usize) -> Option<i32> {
        self.items.get_mut(n).and_then(Option::take)
    }

    pub fn get(&self, n: usize) -> Option<i32> {
        self.items.get(n).copied().flatten()
    }

    /// Finds where the item bound to shortcut `n` currently lives.
    pub fn resolve(&self, n: usize, items: &Container) -> Option<usize> {
        self.get(n).and_then(|type_id| items.find_by_type_id(type_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(n, id)| id.map(|id| (n, id)))
    }
}

//! The player's personal inventory: item container plus the equipment table
//! that points into it.

use log::warn;

use crate::{
    constants::INVENTORY_SIZE,
    equip_slot::{ContainerKind, EquipSlot},
};

use super::{
    container::{Container, SlotChange},
    equipment::EquipmentMap,
    error::ModelError,
    item::ItemRecord,
};

/// Inventory container and equipment table, mutated together so that an
/// `equipped` flag never disagrees with the table.
#[derive(Debug, Clone)]
pub struct PersonalInventory {
    items: Container,
    equipment: EquipmentMap,
}

impl Default for PersonalInventory {
    fn default() -> Self {
        Self::new(INVENTORY_SIZE)
    }
}

impl PersonalInventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Container::new(ContainerKind::Inventory, capacity),
            equipment: EquipmentMap::new(),
        }
    }

    pub fn items(&self) -> &Container {
        &self.items
    }

    pub fn equipment(&self) -> &EquipmentMap {
        &self.equipment
    }

    pub fn get_item(&self, index: usize) -> Option<&ItemRecord> {
        self.items.get_item(index)
    }

    /// Record bound to `slot`, if any.
    pub fn equipped_item(&self, slot: EquipSlot) -> Option<&ItemRecord> {
        self.equipment
            .resolve(slot)
            .and_then(|index| self.items.get_item(index))
    }

    /// Wipes records and bindings ahead of a full refresh.
    pub fn reset(&mut self) {
        self.equipment.clear();
        self.items.clear();
    }

    pub fn set_slot(
        &mut self,
        index: usize,
        type_id: i32,
        quantity: i32,
        equipment_capable: bool,
    ) -> Result<SlotChange, ModelError> {
        let change = self
            .items
            .set_slot(index, type_id, quantity, equipment_capable)?;
        self.after_change(index, change);
        Ok(change)
    }

    pub fn adjust_quantity(&mut self, index: usize, delta: i32) -> Result<SlotChange, ModelError> {
        let change = self.items.adjust_quantity(index, delta)?;
        self.after_change(index, change);
        Ok(change)
    }

    pub fn set_quantity(&mut self, index: usize, quantity: i32) -> Result<SlotChange, ModelError> {
        let change = self.items.set_quantity(index, quantity)?;
        self.after_change(index, change);
        Ok(change)
    }

    pub fn merge_add(
        &mut self,
        index: usize,
        type_id: i32,
        amount: i32,
        equipment_capable: bool,
    ) -> Result<SlotChange, ModelError> {
        let change = self
            .items
            .merge_add(index, type_id, amount, equipment_capable)?;
        self.after_change(index, change);
        Ok(change)
    }

    /// Destroys the record at `index` along with any binding to it.
    pub fn remove(&mut self, index: usize) -> Option<ItemRecord> {
        let removed = self.items.remove(index)?;
        self.equipment.forget(index);
        Some(removed)
    }

    /// Binds `slot` to the record at `index`. See [`EquipmentMap::bind`].
    pub fn equip(&mut self, slot: EquipSlot, index: usize) -> Result<(), ModelError> {
        self.equipment.bind(&mut self.items, slot, index)
    }

    /// Handles an unequip confirmation for `index` in `slot`.
    ///
    /// When `slot` does not hold `index` the server and client disagree on
    /// where the item sat; the index is released from wherever it is and
    /// the mismatch is logged.
    ///
    /// # Returns
    /// * The slot actually released, if any.
    pub fn unequip(&mut self, slot: EquipSlot, index: usize) -> Option<EquipSlot> {
        if slot != EquipSlot::None && self.equipment.resolve(slot) == Some(index) {
            self.equipment.unbind(&mut self.items, slot);
            return Some(slot);
        }

        let released = self.equipment.release(&mut self.items, index);
        if let Some(actual) = released {
            warn!(
                "Unequip of index {} named slot {:?}, but it was bound to {:?}",
                index, slot, actual
            );
        }
        released
    }

    pub fn unequip_slot(&mut self, slot: EquipSlot) -> Option<usize> {
        self.equipment.unbind(&mut self.items, slot)
    }

    fn after_change(&mut self, index: usize, change: SlotChange) {
        if !change.removed_previous() {
            return;
        }
        match change {
            // The slot now holds a different item; un-flag it too.
            SlotChange::Replaced => {
                self.equipment.release(&mut self.items, index);
            }
            _ => {
                self.equipment.forget(index);
            }
        }
    }
}

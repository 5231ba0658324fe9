use serde::{Deserialize, Serialize};

use crate::equip_slot::EquipSlot;

use super::{container::Container, error::ModelError};

/// Logical slot → inventory index table.
///
/// Only stores indices; the records themselves stay in the inventory and
/// their `equipped` flags are kept in step by [`EquipmentMap::bind`] and
/// friends. An index appears in at most one slot.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentMap {
    slots: [Option<usize>; EquipSlot::COUNT],
}

impl EquipmentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inventory index bound to `slot`, if any.
    pub fn resolve(&self, slot: EquipSlot) -> Option<usize> {
        slot.table_index().and_then(|i| self.slots[i])
    }

    /// Slot currently holding `index`.
    pub fn slot_of(&self, index: usize) -> Option<EquipSlot> {
        EquipSlot::ALL
            .iter()
            .copied()
            .find(|slot| self.resolve(*slot) == Some(index))
    }

    /// Bound `(slot, index)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, usize)> + '_ {
        EquipSlot::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(slot, index)| index.map(|index| (*slot, index)))
    }

    /// Points `slot` at the record at `index`.
    ///
    /// The previous occupant of `slot` is un-flagged, and any other slot
    /// that already pointed at `index` is released, so the one-slot-per-item
    /// rule survives a server that moves an item between slots without
    /// unequipping it first.
    ///
    /// # Arguments
    /// * `items` - the inventory that owns `index`
    /// * `slot` - any slot except [`EquipSlot::None`]
    /// * `index` - a currently occupied inventory slot
    pub fn bind(
        &mut self,
        items: &mut Container,
        slot: EquipSlot,
        index: usize,
    ) -> Result<(), ModelError> {
        let Some(table_index) = slot.table_index() else {
            return Err(ModelError::UnbindableSlot(slot));
        };
        if items.get_item(index).is_none() {
            return Err(if index < items.capacity() {
                ModelError::empty(items.kind(), index)
            } else {
                ModelError::out_of_range(items.kind(), index as i64, items.capacity())
            });
        }

        if let Some(previous) = self.slots[table_index].take() {
            items.set_equipped(previous, false);
        }
        self.release(items, index);

        self.slots[table_index] = Some(index);
        items.set_equipped(index, true);
        Ok(())
    }

    /// Empties `slot`, returning the index it held.
    pub fn unbind(&mut self, items: &mut Container, slot: EquipSlot) -> Option<usize> {
        let table_index = slot.table_index()?;
        let index = self.slots[table_index].take()?;
        items.set_equipped(index, false);
        Some(index)
    }

    /// Removes `index` from whichever slot holds it.
    ///
    /// # Returns
    /// * The slot that was released, if `index` was bound at all.
    pub fn release(&mut self, items: &mut Container, index: usize) -> Option<EquipSlot> {
        let slot = self.slot_of(index)?;
        self.unbind(items, slot);
        Some(slot)
    }

    /// Drops every binding without touching the records. Used when the
    /// records themselves are about to be rebuilt.
    pub fn clear(&mut self) {
        self.slots = [None; EquipSlot::COUNT];
    }

    /// Drops every binding and un-flags the bound records.
    pub fn unequip_all(&mut self, items: &mut Container) {
        for index in self.slots.iter_mut().filter_map(Option::take) {
            items.set_equipped(index, false);
        }
    }

    /// Forgets a binding whose record was destroyed or replaced, without
    /// touching the container.
    pub(crate) fn forget(&mut self, index: usize) -> Option<EquipSlot> {
        let slot = self.slot_of(index)?;
        if let Some(table_index) = slot.table_index() {
            self.slots[table_index] = None;
        }
        Some(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equip_slot::ContainerKind;

    fn stocked() -> Container {
        let mut items = Container::new(ContainerKind::Inventory, 8);
        for index in 0..6 {
            items.set_slot(index, 1000 + index as i32, 1, true).unwrap();
        }
        items
    }

    #[test]
    fn bind_sets_slot_and_flag() {
        let mut items = stocked();
        let mut map = EquipmentMap::new();

        map.bind(&mut items, EquipSlot::Torso, 2).unwrap();
        assert_eq!(map.resolve(EquipSlot::Torso), Some(2));
        assert_eq!(map.slot_of(2), Some(EquipSlot::Torso));
        assert!(items.get_item(2).unwrap().is_equipped());
    }

    #[test]
    fn rebinding_a_slot_unflags_previous_item() {
        let mut items = stocked();
        let mut map = EquipmentMap::new();

        map.bind(&mut items, EquipSlot::Head, 1).unwrap();
        map.bind(&mut items, EquipSlot::Head, 3).unwrap();

        assert_eq!(map.resolve(EquipSlot::Head), Some(3));
        assert!(!items.get_item(1).unwrap().is_equipped());
        assert!(items.get_item(3).unwrap().is_equipped());
    }

    #[test]
    fn moving_an_item_between_slots_keeps_it_in_one() {
        let mut items = stocked();
        let mut map = EquipmentMap::new();

        map.bind(&mut items, EquipSlot::Ring1, 4).unwrap();
        map.bind(&mut items, EquipSlot::Ring2, 4).unwrap();

        assert_eq!(map.resolve(EquipSlot::Ring1), None);
        assert_eq!(map.resolve(EquipSlot::Ring2), Some(4));
        assert!(items.get_item(4).unwrap().is_equipped());
    }

    #[test]
    fn bind_rejects_none_slot_and_empty_index() {
        let mut items = stocked();
        let mut map = EquipmentMap::new();

        assert_eq!(
            map.bind(&mut items, EquipSlot::None, 0),
            Err(ModelError::UnbindableSlot(EquipSlot::None))
        );
        assert!(matches!(
            map.bind(&mut items, EquipSlot::Feet, 7),
            Err(ModelError::EmptySlot { index: 7, .. })
        ));
        assert!(matches!(
            map.bind(&mut items, EquipSlot::Feet, 99),
            Err(ModelError::IndexOutOfRange { .. })
        ));
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn unbind_and_release() {
        let mut items = stocked();
        let mut map = EquipmentMap::new();
        map.bind(&mut items, EquipSlot::Fight1, 0).unwrap();
        map.bind(&mut items, EquipSlot::Projectile, 5).unwrap();

        assert_eq!(map.unbind(&mut items, EquipSlot::Fight1), Some(0));
        assert!(!items.get_item(0).unwrap().is_equipped());
        assert_eq!(map.unbind(&mut items, EquipSlot::Fight1), None);
        assert_eq!(map.unbind(&mut items, EquipSlot::None), None);

        assert_eq!(map.release(&mut items, 5), Some(EquipSlot::Projectile));
        assert!(!items.get_item(5).unwrap().is_equipped());
        assert_eq!(map.release(&mut items, 5), None);
    }

    #[test]
    fn unequip_all_clears_flags() {
        let mut items = stocked();
        let mut map = EquipmentMap::new();
        map.bind(&mut items, EquipSlot::Legs, 1).unwrap();
        map.bind(&mut items, EquipSlot::Arms, 2).unwrap();

        map.unequip_all(&mut items);
        assert_eq!(map, EquipmentMap::new());
        assert!(items.iter().all(|item| !item.is_equipped()));
    }
}

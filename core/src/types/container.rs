//! Fixed-capacity indexed item storage shared by the personal inventory and
//! bank storage.

use crate::equip_slot::ContainerKind;

use super::{error::ModelError, item::ItemRecord};

/// What a slot mutation did, so owners of derived state (equipment
/// bindings, listeners) can react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotChange {
    /// An empty slot now holds a record.
    Created,
    /// The record kept its type; quantity or flags changed in place.
    Updated,
    /// The record now describes a different item type.
    Replaced,
    /// The record was destroyed.
    Cleared,
    /// The slot was empty and stays empty.
    Unchanged,
}

impl SlotChange {
    /// True when whatever was in the slot before is gone.
    pub fn removed_previous(self) -> bool {
        matches!(self, SlotChange::Replaced | SlotChange::Cleared)
    }
}

#[derive(Debug, Clone)]
pub struct Container {
    kind: ContainerKind,
    slots: Vec<Option<ItemRecord>>,
}

impl Container {
    pub fn new(kind: ContainerKind, capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { kind, slots }
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Validates a (possibly negative) translated wire index.
    ///
    /// # Returns
    /// * `Ok(index)` when `0 <= index < capacity`.
    pub fn local_index(&self, index: i32) -> Result<usize, ModelError> {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < self.capacity())
            .ok_or_else(|| ModelError::out_of_range(self.kind, i64::from(index), self.capacity()))
    }

    /// Returns the record at `index`, or `None` for an empty or out-of-range
    /// slot. A record whose quantity is not positive is reported as absent.
    pub fn get_item(&self, index: usize) -> Option<&ItemRecord> {
        self.slots
            .get(index)
            .and_then(|slot| slot.as_ref())
            .filter(|item| item.quantity() > 0)
    }

    /// Occupied records in index order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> + '_ {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref())
            .filter(|item| item.quantity() > 0)
    }

    /// Creates, updates or clears the slot at `index`.
    ///
    /// `type_id <= 0` or `quantity <= 0` clears the slot. Updating an
    /// existing record keeps its container index and equipped flag.
    pub fn set_slot(
        &mut self,
        index: usize,
        type_id: i32,
        quantity: i32,
        equipment_capable: bool,
    ) -> Result<SlotChange, ModelError> {
        let slot = self.slot_mut(index)?;

        if type_id <= 0 || quantity <= 0 {
            return Ok(match slot.take() {
                Some(_) => SlotChange::Cleared,
                None => SlotChange::Unchanged,
            });
        }

        match slot {
            Some(item) => {
                let replaced = item.type_id() != type_id;
                item.set_type_id(type_id);
                item.set_quantity(quantity);
                item.set_equipment_capable(equipment_capable);
                Ok(if replaced {
                    SlotChange::Replaced
                } else {
                    SlotChange::Updated
                })
            }
            None => {
                *slot = Some(ItemRecord::new(index, type_id, quantity, equipment_capable));
                Ok(SlotChange::Created)
            }
        }
    }

    /// Applies `delta` to an existing record, clearing the slot when the
    /// result is not positive.
    ///
    /// An empty slot is rejected rather than turned into a negative-quantity
    /// record.
    pub fn adjust_quantity(&mut self, index: usize, delta: i32) -> Result<SlotChange, ModelError> {
        let kind = self.kind;
        let slot = self.slot_mut(index)?;
        let Some(item) = slot.as_mut() else {
            return Err(ModelError::empty(kind, index));
        };

        let quantity = item.quantity().saturating_add(delta);
        if quantity <= 0 {
            *slot = None;
            return Ok(SlotChange::Cleared);
        }
        item.set_quantity(quantity);
        Ok(SlotChange::Updated)
    }

    /// Sets the absolute quantity of an existing record; `0` clears it.
    pub fn set_quantity(&mut self, index: usize, quantity: i32) -> Result<SlotChange, ModelError> {
        let current = self
            .get_item(index)
            .map(|item| item.quantity())
            .ok_or_else(|| self.missing(index))?;
        self.adjust_quantity(index, quantity.saturating_sub(current))
    }

    /// Adds `amount` of `type_id` to the slot: stacks onto a record of the
    /// same type, replaces anything else.
    pub fn merge_add(
        &mut self,
        index: usize,
        type_id: i32,
        amount: i32,
        equipment_capable: bool,
    ) -> Result<SlotChange, ModelError> {
        if amount <= 0 {
            return Err(ModelError::InvalidAmount(amount));
        }
        let stacked = self
            .get_item(index)
            .filter(|item| item.type_id() == type_id)
            .map(|item| item.quantity());

        match stacked {
            Some(current) => {
                self.set_slot(index, type_id, current.saturating_add(amount), equipment_capable)
            }
            None => self.set_slot(index, type_id, amount, equipment_capable),
        }
    }

    /// Destroys the record at `index`, returning it.
    pub fn remove(&mut self, index: usize) -> Option<ItemRecord> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Empties every slot; capacity is unchanged.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
    }

    /// First slot holding `type_id`.
    pub fn find_by_type_id(&self, type_id: i32) -> Option<usize> {
        self.iter()
            .find(|item| item.type_id() == type_id)
            .map(|item| item.container_index())
    }

    /// First slot with nothing in it.
    pub fn free_slot(&self) -> Option<usize> {
        (0..self.capacity()).find(|index| self.get_item(*index).is_none())
    }

    /// Number of slots whose quantity is positive.
    pub fn slots_used(&self) -> usize {
        self.iter().count()
    }

    /// Highest index whose quantity is positive.
    pub fn last_used_index(&self) -> Option<usize> {
        (0..self.capacity())
            .rev()
            .find(|index| self.get_item(*index).is_some())
    }

    /// Moves every record into a container of `capacity`, returning the
    /// ones that no longer fit.
    pub fn resized(self, capacity: usize) -> (Container, Vec<ItemRecord>) {
        let mut target = Container::new(self.kind, capacity);
        let mut dropped = Vec::new();
        for item in self.slots.into_iter().flatten() {
            let index = item.container_index();
            match target.slots.get_mut(index) {
                Some(slot) => *slot = Some(item),
                None => dropped.push(item),
            }
        }
        (target, dropped)
    }

    /// Extends the container to at least `capacity` empty-tailed slots.
    pub(crate) fn grow(&mut self, capacity: usize) {
        if capacity > self.slots.len() {
            self.slots.resize_with(capacity, || None);
        }
    }

    pub(crate) fn set_equipped(&mut self, index: usize, equipped: bool) {
        if let Some(Some(item)) = self.slots.get_mut(index) {
            item.set_equipped(equipped);
        }
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Option<ItemRecord>, ModelError> {
        let kind = self.kind;
        let capacity = self.capacity();
        self.slots
            .get_mut(index)
            .ok_or_else(|| ModelError::out_of_range(kind, index as i64, capacity))
    }

    fn missing(&self, index: usize) -> ModelError {
        if index < self.capacity() {
            ModelError::empty(self.kind, index)
        } else {
            ModelError::out_of_range(self.kind, index as i64, self.capacity())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn inventory() -> Container {
        Container::new(ContainerKind::Inventory, 10)
    }

    #[test]
    fn set_slot_creates_record_with_index() {
        let mut c = inventory();
        assert_eq!(c.set_slot(3, 501, 5, false), Ok(SlotChange::Created));

        let item = c.get_item(3).unwrap();
        assert_eq!(item.type_id(), 501);
        assert_eq!(item.quantity(), 5);
        assert_eq!(item.container_index(), 3);
        assert!(!item.is_equipped());
    }

    #[test]
    fn set_slot_updates_in_place() {
        let mut c = inventory();
        c.set_slot(3, 501, 5, false).unwrap();
        c.set_equipped(3, true);

        assert_eq!(c.set_slot(3, 501, 9, true), Ok(SlotChange::Updated));
        let item = c.get_item(3).unwrap();
        assert_eq!(item.quantity(), 9);
        assert!(item.is_equipment_capable());
        assert!(item.is_equipped());
        assert_eq!(item.container_index(), 3);

        assert_eq!(c.set_slot(3, 777, 1, false), Ok(SlotChange::Replaced));
        assert_eq!(c.get_item(3).unwrap().type_id(), 777);
    }

    #[test]
    fn set_slot_with_empty_values_clears() {
        let mut c = inventory();
        c.set_slot(1, 501, 5, false).unwrap();
        assert_eq!(c.set_slot(1, 501, 0, false), Ok(SlotChange::Cleared));
        assert!(c.get_item(1).is_none());

        c.set_slot(1, 501, 5, false).unwrap();
        assert_eq!(c.set_slot(1, -1, 5, false), Ok(SlotChange::Cleared));
        assert_eq!(c.set_slot(1, 0, 5, false), Ok(SlotChange::Unchanged));
    }

    #[test]
    fn set_slot_rejects_out_of_range() {
        let mut c = inventory();
        let err = c.set_slot(10, 501, 1, false).unwrap_err();
        assert!(matches!(err, ModelError::IndexOutOfRange { index: 10, capacity: 10, .. }));
        assert_eq!(c.slots_used(), 0);
    }

    #[test]
    fn local_index_checks_both_ends() {
        let c = inventory();
        assert_eq!(c.local_index(0), Ok(0));
        assert_eq!(c.local_index(9), Ok(9));
        assert!(c.local_index(-1).is_err());
        assert!(c.local_index(10).is_err());
    }

    #[test]
    fn adjust_quantity_clears_at_zero_or_below() {
        let mut c = inventory();
        c.set_slot(2, 501, 5, false).unwrap();
        assert_eq!(c.adjust_quantity(2, -2), Ok(SlotChange::Updated));
        assert_eq!(c.get_item(2).unwrap().quantity(), 3);
        assert_eq!(c.adjust_quantity(2, -7), Ok(SlotChange::Cleared));
        assert!(c.get_item(2).is_none());
    }

    #[test]
    fn adjust_quantity_on_empty_slot_is_rejected() {
        let mut c = inventory();
        assert!(matches!(
            c.adjust_quantity(4, -1),
            Err(ModelError::EmptySlot { index: 4, .. })
        ));
        assert!(matches!(c.adjust_quantity(4, 3), Err(ModelError::EmptySlot { .. })));
        assert!(c.get_item(4).is_none());
    }

    #[test]
    fn set_quantity_zero_removes_record() {
        let mut c = inventory();
        c.set_slot(0, 42, 3, false).unwrap();
        assert_eq!(c.set_quantity(0, 1), Ok(SlotChange::Updated));
        assert_eq!(c.get_item(0).unwrap().quantity(), 1);
        assert_eq!(c.set_quantity(0, 0), Ok(SlotChange::Cleared));
        assert!(matches!(c.set_quantity(0, 1), Err(ModelError::EmptySlot { .. })));
    }

    #[test]
    fn merge_add_stacks_same_type_and_replaces_others() {
        let mut c = inventory();
        assert_eq!(c.merge_add(5, 700, 2, false), Ok(SlotChange::Created));
        assert_eq!(c.merge_add(5, 700, 3, false), Ok(SlotChange::Updated));
        assert_eq!(c.get_item(5).unwrap().quantity(), 5);
        assert_eq!(c.merge_add(5, 701, 1, true), Ok(SlotChange::Replaced));
        assert_eq!(c.get_item(5).unwrap().quantity(), 1);
        assert_eq!(c.merge_add(5, 701, 0, true), Err(ModelError::InvalidAmount(0)));
    }

    #[test]
    fn queries_are_quantity_based() {
        let mut c = inventory();
        assert_eq!(c.slots_used(), 0);
        assert_eq!(c.last_used_index(), None);
        assert_eq!(c.free_slot(), Some(0));

        c.set_slot(0, 10, 1, false).unwrap();
        c.set_slot(7, 11, 4, false).unwrap();
        c.set_slot(4, 10, 2, false).unwrap();

        assert_eq!(c.slots_used(), 3);
        assert_eq!(c.last_used_index(), Some(7));
        assert_eq!(c.find_by_type_id(10), Some(0));
        assert_eq!(c.find_by_type_id(11), Some(7));
        assert_eq!(c.find_by_type_id(12), None);
        assert_eq!(c.free_slot(), Some(1));

        c.clear();
        assert_eq!(c.slots_used(), 0);
        assert_eq!(c.capacity(), 10);
    }

    #[test]
    fn resized_drops_records_beyond_capacity() {
        let mut c = Container::new(ContainerKind::Storage, 5);
        c.set_slot(0, 1, 1, false).unwrap();
        c.set_slot(1, 2, 1, false).unwrap();
        c.set_slot(4, 3, 1, false).unwrap();

        let (resized, dropped) = c.resized(2);
        assert_eq!(resized.capacity(), 2);
        assert_eq!(resized.slots_used(), 2);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].container_index(), 4);
        assert_eq!(resized.kind(), ContainerKind::Storage);
    }

    #[test]
    fn grow_only_extends() {
        let mut c = Container::new(ContainerKind::Storage, 4);
        c.set_slot(3, 9, 1, false).unwrap();
        c.grow(401);
        assert_eq!(c.capacity(), 401);
        assert_eq!(c.set_slot(400, 10, 2, false), Ok(SlotChange::Created));
        c.grow(8);
        assert_eq!(c.capacity(), 401);
        assert_eq!(c.get_item(3).unwrap().type_id(), 9);
    }

    #[test]
    fn no_sequence_exposes_non_positive_quantity() {
        let mut rng = StdRng::seed_from_u64(0x6b69_7462);
        let mut c = inventory();

        for _ in 0..5_000 {
            let index = rng.gen_range(0..12);
            if rng.gen_bool(0.5) {
                let type_id = rng.gen_range(-2..6);
                let quantity = rng.gen_range(-3..8);
                let _ = c.set_slot(index, type_id, quantity, false);
            } else {
                let delta = rng.gen_range(-6..6);
                let _ = c.adjust_quantity(index, delta);
            }

            for i in 0..c.capacity() {
                if let Some(item) = c.get_item(i) {
                    assert!(item.quantity() > 0);
                    assert!(item.type_id() > 0);
                    assert_eq!(item.container_index(), i);
                }
                assert!(c.slots[i].as_ref().is_none_or(|item| item.quantity() > 0));
            }
        }
    }
}

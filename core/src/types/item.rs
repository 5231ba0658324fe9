//! Item structure

use serde::{Deserialize, Serialize};

/// One occupied container slot.
///
/// A record only exists while its quantity is positive; containers remove
/// it instead of keeping a zero-quantity placeholder.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    type_id: i32,
    quantity: i32,
    equipment_capable: bool,
    equipped: bool,
    container_index: usize,
}

impl ItemRecord {
    pub(crate) fn new(
        container_index: usize,
        type_id: i32,
        quantity: i32,
        equipment_capable: bool,
    ) -> Self {
        Self {
            type_id,
            quantity,
            equipment_capable,
            equipped: false,
            container_index,
        }
    }

    /// Catalog id of the item definition.
    pub fn type_id(&self) -> i32 {
        self.type_id
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// Whether this item type may ever occupy an equipment slot.
    pub fn is_equipment_capable(&self) -> bool {
        self.equipment_capable
    }

    /// True iff an equipment slot currently points at this record.
    pub fn is_equipped(&self) -> bool {
        self.equipped
    }

    /// Position of this record inside its owning container.
    pub fn container_index(&self) -> usize {
        self.container_index
    }

    pub(crate) fn set_type_id(&mut self, type_id: i32) {
        self.type_id = type_id;
    }

    pub(crate) fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_equipment_capable(&mut self, equipment_capable: bool) {
        self.equipment_capable = equipment_capable;
    }

    pub(crate) fn set_equipped(&mut self, equipped: bool) {
        self.equipped = equipped;
    }
}

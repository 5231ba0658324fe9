/// Inbound message ids handled by the item sync layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ServerCommandType {
    PlayerInventory = 0x01ee,
    PlayerEquipment = 0x00a4,
    InventoryAdd = 0x00a0,
    InventoryRemove = 0x00af,
    InventoryUse = 0x01c8,
    ItemUseResponse = 0x00a8,
    Equip = 0x00aa,
    Unequip = 0x00ac,
    ArrowEquip = 0x013c,
    StorageItems = 0x01f0,
    StorageEquip = 0x00a6,
    StorageStatus = 0x00f2,
    StorageAdd = 0x00f4,
    StorageRemove = 0x00f6,
    StorageClose = 0x00f8,
}

impl ServerCommandType {
    pub fn from_u16(id: u16) -> Option<Self> {
        let kind = match id {
            0x01ee => Self::PlayerInventory,
            0x00a4 => Self::PlayerEquipment,
            0x00a0 => Self::InventoryAdd,
            0x00af => Self::InventoryRemove,
            0x01c8 => Self::InventoryUse,
            0x00a8 => Self::ItemUseResponse,
            0x00aa => Self::Equip,
            0x00ac => Self::Unequip,
            0x013c => Self::ArrowEquip,
            0x01f0 => Self::StorageItems,
            0x00a6 => Self::StorageEquip,
            0x00f2 => Self::StorageStatus,
            0x00f4 => Self::StorageAdd,
            0x00f6 => Self::StorageRemove,
            0x00f8 => Self::StorageClose,
            _ => return None,
        };
        Some(kind)
    }

    pub fn id(self) -> u16 {
        self as u16
    }
}

/// One record out of an inventory, equipment or storage list.
///
/// `index` is already translated to a local container index but not yet
/// range-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemEntry {
    pub index: i32,
    pub type_id: i32,
    pub quantity: i32,
    pub equipment_capable: bool,
    /// Equip mask the item is currently worn on; `0` when not worn.
    pub equip_point: u16,
}

/// Dialect-independent result of decoding one inbound message.
///
/// Every index is a local container index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Full inventory refresh. Clears records and equipment first.
    InventoryRefresh { entries: Vec<ItemEntry> },
    /// Worn and wearable items; binds those with a non-zero equip point.
    EquipmentList { entries: Vec<ItemEntry> },
    ItemAdded {
        index: i32,
        type_id: i32,
        amount: i32,
        equipment_capable: bool,
    },
    PickupFailed { type_id: i32, reason: u8 },
    ItemRemoved { index: i32, amount: i32 },
    /// Absolute quantity after a use; `0` removes the record.
    QuantitySet { index: i32, quantity: i32 },
    UseFailed { index: i32 },
    Equipped { index: i32, equip_point: u16 },
    EquipFailed { index: i32 },
    Unequipped { index: i32, equip_point: u16 },
    UnequipFailed { index: i32 },
    /// `None` when the server reports no usable ammunition.
    ArrowsEquipped { index: Option<i32> },
    /// Population records for the storage session. `fresh` marks the list
    /// that starts a new population pass.
    StoragePopulate { entries: Vec<ItemEntry>, fresh: bool },
    StorageStatus { used: i32, capacity: i32 },
    StorageAdded {
        index: i32,
        type_id: i32,
        amount: i32,
    },
    StorageRemoved { index: i32, amount: i32 },
    StorageClosed,
}

impl SyncEvent {
    /// Short name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::InventoryRefresh { .. } => "inventory-refresh",
            SyncEvent::EquipmentList { .. } => "equipment-list",
            SyncEvent::ItemAdded { .. } => "item-added",
            SyncEvent::PickupFailed { .. } => "pickup-failed",
            SyncEvent::ItemRemoved { .. } => "item-removed",
            SyncEvent::QuantitySet { .. } => "quantity-set",
            SyncEvent::UseFailed { .. } => "use-failed",
            SyncEvent::Equipped { .. } => "equipped",
            SyncEvent::EquipFailed { .. } => "equip-failed",
            SyncEvent::Unequipped { .. } => "unequipped",
            SyncEvent::UnequipFailed { .. } => "unequip-failed",
            SyncEvent::ArrowsEquipped { .. } => "arrows-equipped",
            SyncEvent::StoragePopulate { .. } => "storage-populate",
            SyncEvent::StorageStatus { .. } => "storage-status",
            SyncEvent::StorageAdded { .. } => "storage-added",
            SyncEvent::StorageRemoved { .. } => "storage-removed",
            SyncEvent::StorageClosed => "storage-closed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_round_trips_through_its_id() {
        let kinds = [
            ServerCommandType::PlayerInventory,
            ServerCommandType::PlayerEquipment,
            ServerCommandType::InventoryAdd,
            ServerCommandType::InventoryRemove,
            ServerCommandType::InventoryUse,
            ServerCommandType::ItemUseResponse,
            ServerCommandType::Equip,
            ServerCommandType::Unequip,
            ServerCommandType::ArrowEquip,
            ServerCommandType::StorageItems,
            ServerCommandType::StorageEquip,
            ServerCommandType::StorageStatus,
            ServerCommandType::StorageAdd,
            ServerCommandType::StorageRemove,
            ServerCommandType::StorageClose,
        ];
        for kind in kinds {
            assert_eq!(ServerCommandType::from_u16(kind.id()), Some(kind));
        }
    }

    #[test]
    fn unrelated_ids_are_unknown() {
        assert_eq!(ServerCommandType::from_u16(0x0000), None);
        assert_eq!(ServerCommandType::from_u16(0x0087), None);
        assert_eq!(ServerCommandType::from_u16(0xffff), None);
    }
}

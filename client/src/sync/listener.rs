//! Change notifications from the sync layer to whatever presents it.

use kitbag_core::types::{EquipmentMap, PersonalInventory, StorageState};

/// Why the server refused a pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupFailure {
    BadItem,
    TooHeavy,
    TooFar,
    InventoryFull,
    StackFull,
    DropSteal,
    Other(u8),
}

impl PickupFailure {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => PickupFailure::BadItem,
            2 => PickupFailure::TooHeavy,
            3 => PickupFailure::TooFar,
            4 => PickupFailure::InventoryFull,
            5 => PickupFailure::StackFull,
            6 => PickupFailure::DropSteal,
            other => PickupFailure::Other(other),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            PickupFailure::BadItem => "Tried to pick up nonexistent item.",
            PickupFailure::TooHeavy => "Item is too heavy.",
            PickupFailure::TooFar => "Item is too far away.",
            PickupFailure::InventoryFull => "Inventory is full.",
            PickupFailure::StackFull => "Stack is too big.",
            PickupFailure::DropSteal => "Item belongs to someone else.",
            PickupFailure::Other(_) => "Unknown problem picking up item.",
        }
    }
}

/// A server refusal the player should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserNotice {
    PickupFailed { type_id: i32, reason: PickupFailure },
    UseFailed { index: i32 },
    EquipFailed { index: i32 },
    UnequipFailed { index: i32 },
}

impl UserNotice {
    pub fn message(&self) -> &'static str {
        match self {
            UserNotice::PickupFailed { reason, .. } => reason.message(),
            UserNotice::UseFailed { .. } => "Failed to use item.",
            UserNotice::EquipFailed { .. } => "Unable to equip.",
            UserNotice::UnequipFailed { .. } => "Unable to unequip.",
        }
    }
}

/// Subscriber interface. Every method defaults to doing nothing.
pub trait ChangeListener {
    fn on_inventory_changed(&mut self, _inventory: &PersonalInventory) {}

    fn on_equipment_changed(&mut self, _equipment: &EquipmentMap) {}

    /// Storage contents or lifecycle state changed.
    fn on_storage_state_changed(&mut self, _state: StorageState) {}

    fn on_notice(&mut self, _notice: &UserNotice) {}
}

/// Writes notices and storage transitions to the log.
#[derive(Debug, Default)]
pub struct LoggingListener;

impl ChangeListener for LoggingListener {
    fn on_storage_state_changed(&mut self, state: StorageState) {
        log::debug!("Storage is {}", state);
    }

    fn on_notice(&mut self, notice: &UserNotice) {
        log::info!("{} ({:?})", notice.message(), notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_codes_map_to_reasons() {
        assert_eq!(PickupFailure::from_code(2), PickupFailure::TooHeavy);
        assert_eq!(PickupFailure::from_code(4), PickupFailure::InventoryFull);
        assert_eq!(PickupFailure::from_code(42), PickupFailure::Other(42));
    }

    #[test]
    fn notices_have_messages() {
        let notice = UserNotice::PickupFailed {
            type_id: 501,
            reason: PickupFailure::TooFar,
        };
        assert_eq!(notice.message(), "Item is too far away.");
        assert_eq!(UserNotice::EquipFailed { index: 0 }.message(), "Unable to equip.");
    }
}

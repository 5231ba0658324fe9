use thiserror::Error;

use crate::equip_slot::{ContainerKind, EquipSlot};

/// Model-invariant violations.
///
/// Each one is rejected without mutating anything; the caller logs it and
/// carries on with the next message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("{kind} index {index} is outside capacity {capacity}")]
    IndexOutOfRange {
        kind: &'static str,
        index: i64,
        capacity: usize,
    },

    #[error("{kind} slot {index} is empty")]
    EmptySlot { kind: &'static str, index: usize },

    #[error("equipment slot {0:?} cannot hold an item")]
    UnbindableSlot(EquipSlot),

    #[error("storage is not available (session closed)")]
    StorageUnavailable,

    #[error("invalid amount {0}")]
    InvalidAmount(i32),
}

impl ModelError {
    pub(crate) fn out_of_range(kind: ContainerKind, index: i64, capacity: usize) -> Self {
        ModelError::IndexOutOfRange {
            kind: kind.label(),
            index,
            capacity,
        }
    }

    pub(crate) fn empty(kind: ContainerKind, index: usize) -> Self {
        ModelError::EmptySlot {
            kind: kind.label(),
            index,
        }
    }
}

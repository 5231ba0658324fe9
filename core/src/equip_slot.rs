//! Translation between wire encodings and the client-side model:
//! equip bitmasks to logical equipment slots, and wire slot numbers to
//! zero-based container indices.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::constants::{AMMO_MARKER, INVENTORY_OFFSET, STORAGE_OFFSET};

/// Logical equipment positions, independent of any wire encoding.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EquipSlot {
    Torso,
    Arms,
    Head,
    Legs,
    Feet,
    Ring1,
    Ring2,
    Necklace,
    Fight1,
    Fight2,
    Projectile,
    /// Terminal sentinel: "no slot". Never bindable.
    None,
}

impl EquipSlot {
    /// Number of bindable slots (everything except [`EquipSlot::None`]).
    pub const COUNT: usize = 11;

    /// Every bindable slot, in table order.
    pub const ALL: [EquipSlot; EquipSlot::COUNT] = [
        EquipSlot::Torso,
        EquipSlot::Arms,
        EquipSlot::Head,
        EquipSlot::Legs,
        EquipSlot::Feet,
        EquipSlot::Ring1,
        EquipSlot::Ring2,
        EquipSlot::Necklace,
        EquipSlot::Fight1,
        EquipSlot::Fight2,
        EquipSlot::Projectile,
    ];

    /// Position of this slot inside an equipment table, or `None` for the
    /// sentinel.
    pub fn table_index(self) -> Option<usize> {
        match self {
            EquipSlot::None => None,
            slot => Some(slot as usize),
        }
    }

    /// Returns the human-readable slot name shown next to equipment boxes.
    pub fn label(&self) -> &'static str {
        match self {
            EquipSlot::Torso => "Torso",
            EquipSlot::Arms => "Arms",
            EquipSlot::Head => "Head",
            EquipSlot::Legs => "Legs",
            EquipSlot::Feet => "Feet",
            EquipSlot::Ring1 => "Ring 1/2",
            EquipSlot::Ring2 => "Ring 2/2",
            EquipSlot::Necklace => "Necklace",
            EquipSlot::Fight1 => "Hand 1/2",
            EquipSlot::Fight2 => "Hand 2/2",
            EquipSlot::Projectile => "Ammo",
            EquipSlot::None => "",
        }
    }
}

bitflags! {
    /// Equip-point bits as they appear in the 16-bit wire field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EquipPoints: u16 {
        const LEGS = 1 << 0;
        const FIGHT1 = 1 << 1;
        const ARMS = 1 << 2;
        const RING2 = 1 << 3;
        const RING1 = 1 << 4;
        const FIGHT2 = 1 << 5;
        const FEET = 1 << 6;
        const NECKLACE = 1 << 7;
        const HEAD = 1 << 8;
        const TORSO = 1 << 9;
        const PROJECTILE = 1 << 10;
        /// Ammunition marker; wins over every other bit.
        const AMMO = AMMO_MARKER;
    }
}

/// Lowest-set-bit position → logical slot.
const EQUIP_POINTS: [EquipSlot; EquipSlot::COUNT] = [
    EquipSlot::Legs,
    EquipSlot::Fight1,
    EquipSlot::Arms,
    EquipSlot::Ring2,
    EquipSlot::Ring1,
    EquipSlot::Fight2,
    EquipSlot::Feet,
    EquipSlot::Necklace,
    EquipSlot::Head,
    EquipSlot::Torso,
    EquipSlot::Projectile,
];

/// Decodes a wire equip mask into a logical slot.
///
/// * `0` decodes to [`EquipSlot::None`].
/// * Bit 15 decodes to [`EquipSlot::Projectile`] whatever else is set.
/// * Otherwise the lowest set bit selects the slot. Items that cover more
///   than one position (two-handed weapons) are reported on their first one.
/// * A mask whose lowest bit lies outside the table (bits 11..=14) decodes
///   to [`EquipSlot::None`].
///
/// Runs in constant time for every input; there is no bit-scanning loop.
pub fn to_logical_slot(mask: u16) -> EquipSlot {
    let points = EquipPoints::from_bits_retain(mask);
    if points.is_empty() {
        return EquipSlot::None;
    }
    if points.contains(EquipPoints::AMMO) {
        return EquipSlot::Projectile;
    }

    let position = mask.trailing_zeros() as usize;
    EQUIP_POINTS
        .get(position)
        .copied()
        .unwrap_or(EquipSlot::None)
}

/// Encodes a logical slot as the canonical single-bit wire mask.
///
/// [`EquipSlot::Projectile`] is encoded with the ammunition marker and
/// [`EquipSlot::None`] as `0`.
pub fn bitmask_for(slot: EquipSlot) -> u16 {
    match slot {
        EquipSlot::None => 0,
        EquipSlot::Projectile => EquipPoints::AMMO.bits(),
        slot => EQUIP_POINTS
            .iter()
            .position(|candidate| *candidate == slot)
            .map(|position| 1u16 << position)
            .unwrap_or(0),
    }
}

/// Which container a wire index refers to.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Inventory,
    Storage,
}

impl ContainerKind {
    pub fn label(&self) -> &'static str {
        match self {
            ContainerKind::Inventory => "inventory",
            ContainerKind::Storage => "storage",
        }
    }
}

/// Per-container additive offsets applied to every slot-bearing field of a
/// dialect's messages.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetTable {
    pub inventory: i32,
    pub storage: i32,
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self {
            inventory: INVENTORY_OFFSET,
            storage: STORAGE_OFFSET,
        }
    }
}

impl OffsetTable {
    pub fn offset(&self, kind: ContainerKind) -> i32 {
        match kind {
            ContainerKind::Inventory => self.inventory,
            ContainerKind::Storage => self.storage,
        }
    }

    /// Local zero-based index → wire slot number.
    pub fn to_wire_index(&self, local: usize, kind: ContainerKind) -> i32 {
        // Saturates instead of wrapping.
        i32::try_from(local)
            .unwrap_or(i32::MAX)
            .saturating_add(self.offset(kind))
    }

    /// Wire slot number → local index.
    ///
    /// The result may be negative or beyond the container's capacity when
    /// the server sends garbage; range checks belong to the container.
    pub fn from_wire_index(&self, wire: i32, kind: ContainerKind) -> i32 {
        wire.saturating_sub(self.offset(kind))
    }
}

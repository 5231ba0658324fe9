//! Message layouts shared by both dialects.

use kitbag_core::{
    constants::AMMO_MARKER,
    equip_slot::{ContainerKind, OffsetTable},
    wire_cursor::{WireCursor, WireError},
};

use crate::network::{
    server_commands::{ItemEntry, ServerCommandType, SyncEvent},
    InboundFrame,
};

use super::{DecodeError, IntentError};

const INVENTORY_ENTRY_SIZE: usize = 18;
const EQUIPMENT_ENTRY_SIZE: usize = 20;

/// Field order of the storage status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StatusOrder {
    CapacityFirst,
    UsedFirst,
}

/// The few places where the dialects lay out or interpret fields
/// differently.
#[derive(Debug, Clone, Copy)]
pub(super) struct Layout {
    pub status_order: StatusOrder,
    /// Inventory list: bit 15 of the arrow field marks equipment.
    pub arrow_marks_equipment: bool,
    /// Pickup: a non-zero equip type marks equipment.
    pub pickup_marks_equipment: bool,
}

/// Cursor that tags every failure with the message kind.
struct MessageReader<'a> {
    kind: u16,
    body_len: usize,
    cursor: WireCursor<'a>,
}

impl<'a> MessageReader<'a> {
    fn new(frame: &'a InboundFrame) -> Self {
        Self {
            kind: frame.kind,
            body_len: frame.body.len(),
            cursor: WireCursor::new(&frame.body),
        }
    }

    fn wire(&self, source: WireError) -> DecodeError {
        DecodeError::Wire {
            kind: self.kind,
            source,
        }
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        self.cursor.read_u8().map_err(|e| self.wire(e))
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        self.cursor.read_u16().map_err(|e| self.wire(e))
    }

    fn i16(&mut self) -> Result<i16, DecodeError> {
        self.cursor.read_i16().map_err(|e| self.wire(e))
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        self.cursor.read_i32().map_err(|e| self.wire(e))
    }

    fn skip(&mut self, count: usize) -> Result<(), DecodeError> {
        self.cursor.skip(count).map_err(|e| self.wire(e))
    }

    /// Reads the length prefix and returns the number of entries that
    /// follow it.
    fn list_header(&mut self, entry_size: usize) -> Result<usize, DecodeError> {
        let declared = self.u16()?;
        if usize::from(declared) != self.body_len + 2 {
            return Err(DecodeError::LengthMismatch {
                kind: self.kind,
                declared,
                actual: self.body_len,
            });
        }
        let payload = self.cursor.bytes_remaining();
        if payload % entry_size != 0 {
            return Err(DecodeError::RaggedList {
                kind: self.kind,
                payload,
                entry_size,
            });
        }
        Ok(payload / entry_size)
    }

    fn finish(self) -> Result<(), DecodeError> {
        if self.cursor.is_empty() {
            return Ok(());
        }
        Err(DecodeError::TrailingBytes {
            kind: self.kind,
            position: self.cursor.position(),
            remaining: self.cursor.bytes_remaining(),
        })
    }
}

/// Decodes every message kind both dialects share.
pub(super) fn decode_frame(
    frame: &InboundFrame,
    offsets: &OffsetTable,
    layout: &Layout,
) -> Result<Option<SyncEvent>, DecodeError> {
    let Some(kind) = ServerCommandType::from_u16(frame.kind) else {
        return Ok(None);
    };

    let mut reader = MessageReader::new(frame);
    let inventory = |wire: i16| offsets.from_wire_index(i32::from(wire), ContainerKind::Inventory);
    let storage = |wire: i16| offsets.from_wire_index(i32::from(wire), ContainerKind::Storage);

    let event = match kind {
        ServerCommandType::PlayerInventory => SyncEvent::InventoryRefresh {
            entries: read_item_list(&mut reader, layout, &inventory)?,
        },
        ServerCommandType::StorageItems => SyncEvent::StoragePopulate {
            entries: read_item_list(&mut reader, layout, &storage)?,
            fresh: true,
        },
        ServerCommandType::PlayerEquipment => SyncEvent::EquipmentList {
            entries: read_equipment_list(&mut reader, &inventory, true)?,
        },
        ServerCommandType::StorageEquip => SyncEvent::StoragePopulate {
            entries: read_equipment_list(&mut reader, &storage, false)?,
            fresh: false,
        },
        ServerCommandType::InventoryAdd => {
            let index = inventory(reader.i16()?);
            let amount = i32::from(reader.i16()?);
            let type_id = i32::from(reader.i16()?);
            reader.skip(3)?; // identified, attribute, refine
            reader.skip(8)?; // cards
            let equip_type = reader.u16()?;
            reader.u8()?; // item type
            let fail = reader.u8()?;

            if fail != 0 {
                SyncEvent::PickupFailed {
                    type_id,
                    reason: fail,
                }
            } else {
                SyncEvent::ItemAdded {
                    index,
                    type_id,
                    amount,
                    equipment_capable: layout.pickup_marks_equipment && equip_type != 0,
                }
            }
        }
        ServerCommandType::InventoryRemove => SyncEvent::ItemRemoved {
            index: inventory(reader.i16()?),
            amount: i32::from(reader.i16()?),
        },
        ServerCommandType::InventoryUse => {
            let index = inventory(reader.i16()?);
            reader.i16()?; // item id
            reader.i32()?; // user id
            let quantity = i32::from(reader.i16()?);
            reader.u8()?; // effect type
            SyncEvent::QuantitySet { index, quantity }
        }
        ServerCommandType::ItemUseResponse => {
            let index = inventory(reader.i16()?);
            let quantity = i32::from(reader.i16()?);
            if reader.u8()? == 0 {
                SyncEvent::UseFailed { index }
            } else {
                SyncEvent::QuantitySet { index, quantity }
            }
        }
        ServerCommandType::Equip => {
            let index = inventory(reader.i16()?);
            let equip_point = reader.u16()?;
            if reader.u8()? == 0 {
                SyncEvent::EquipFailed { index }
            } else {
                SyncEvent::Equipped { index, equip_point }
            }
        }
        ServerCommandType::Unequip => {
            let index = inventory(reader.i16()?);
            let equip_point = reader.u16()?;
            if reader.u8()? == 0 {
                SyncEvent::UnequipFailed { index }
            } else {
                SyncEvent::Unequipped { index, equip_point }
            }
        }
        ServerCommandType::ArrowEquip => {
            let wire = reader.i16()?;
            SyncEvent::ArrowsEquipped {
                index: (wire > 1).then(|| inventory(wire)),
            }
        }
        ServerCommandType::StorageStatus => {
            let first = i32::from(reader.i16()?);
            let second = i32::from(reader.i16()?);
            let (capacity, used) = match layout.status_order {
                StatusOrder::CapacityFirst => (first, second),
                StatusOrder::UsedFirst => (second, first),
            };
            SyncEvent::StorageStatus { used, capacity }
        }
        ServerCommandType::StorageAdd => {
            let index = storage(reader.i16()?);
            let amount = reader.i32()?;
            let type_id = i32::from(reader.i16()?);
            reader.skip(3)?; // identified, attribute, refine
            reader.skip(8)?; // cards
            SyncEvent::StorageAdded {
                index,
                type_id,
                amount,
            }
        }
        ServerCommandType::StorageRemove => SyncEvent::StorageRemoved {
            index: storage(reader.i16()?),
            amount: i32::from(reader.i16()?),
        },
        ServerCommandType::StorageClose => SyncEvent::StorageClosed,
    };

    reader.finish()?;
    Ok(Some(event))
}

fn read_item_list(
    reader: &mut MessageReader<'_>,
    layout: &Layout,
    to_local: &dyn Fn(i16) -> i32,
) -> Result<Vec<ItemEntry>, DecodeError> {
    let count = reader.list_header(INVENTORY_ENTRY_SIZE)?;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let index = to_local(reader.i16()?);
        let type_id = i32::from(reader.i16()?);
        reader.u8()?; // item type
        reader.u8()?; // identified
        let quantity = i32::from(reader.i16()?);
        let arrow = reader.u16()?;
        reader.skip(8)?; // cards

        entries.push(ItemEntry {
            index,
            type_id,
            quantity,
            equipment_capable: layout.arrow_marks_equipment && arrow & AMMO_MARKER != 0,
            equip_point: 0,
        });
    }
    Ok(entries)
}

fn read_equipment_list(
    reader: &mut MessageReader<'_>,
    to_local: &dyn Fn(i16) -> i32,
    keep_equip_point: bool,
) -> Result<Vec<ItemEntry>, DecodeError> {
    let count = reader.list_header(EQUIPMENT_ENTRY_SIZE)?;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let index = to_local(reader.i16()?);
        let type_id = i32::from(reader.i16()?);
        reader.u8()?; // item type
        reader.u8()?; // identified
        reader.u16()?; // equip type
        let equip_point = reader.u16()?;
        reader.u8()?; // attribute
        reader.u8()?; // refine
        reader.skip(8)?; // cards

        entries.push(ItemEntry {
            index,
            type_id,
            quantity: 1,
            equipment_capable: true,
            equip_point: if keep_equip_point { equip_point } else { 0 },
        });
    }
    Ok(entries)
}

/// Local index → i16 wire index.
pub(super) fn wire_index(
    offsets: &OffsetTable,
    index: usize,
    kind: ContainerKind,
) -> Result<i16, IntentError> {
    i16::try_from(offsets.to_wire_index(index, kind)).map_err(|_| IntentError::IndexOutOfRange {
        kind: kind.label(),
        index,
    })
}

pub(super) fn positive_i16(amount: i32) -> Result<i16, IntentError> {
    i16::try_from(amount)
        .ok()
        .filter(|a| *a > 0)
        .ok_or(IntentError::InvalidAmount(amount))
}

pub(super) fn positive_i32(amount: i32) -> Result<i32, IntentError> {
    if amount > 0 {
        Ok(amount)
    } else {
        Err(IntentError::InvalidAmount(amount))
    }
}

/// Frame builders for dialect tests.
#[cfg(test)]
pub(super) mod fixtures {
    use crate::network::InboundFrame;

    pub fn list(kind: u16, entries: &[Vec<u8>]) -> InboundFrame {
        let payload: Vec<u8> = entries.concat();
        let mut body = Vec::with_capacity(payload.len() + 2);
        body.extend_from_slice(&((payload.len() + 4) as u16).to_le_bytes());
        body.extend_from_slice(&payload);
        InboundFrame::new(kind, body)
    }

    pub fn inventory_entry(wire: i16, item: i16, amount: i16, arrow: u16) -> Vec<u8> {
        let mut e = Vec::with_capacity(18);
        e.extend_from_slice(&wire.to_le_bytes());
        e.extend_from_slice(&item.to_le_bytes());
        e.push(4); // type
        e.push(1); // identified
        e.extend_from_slice(&amount.to_le_bytes());
        e.extend_from_slice(&arrow.to_le_bytes());
        e.extend_from_slice(&[0u8; 8]);
        e
    }

    pub fn equipment_entry(wire: i16, item: i16, equip_point: u16) -> Vec<u8> {
        let mut e = Vec::with_capacity(20);
        e.extend_from_slice(&wire.to_le_bytes());
        e.extend_from_slice(&item.to_le_bytes());
        e.push(5); // type
        e.push(1); // identified
        e.extend_from_slice(&0x0200u16.to_le_bytes()); // equip type
        e.extend_from_slice(&equip_point.to_le_bytes());
        e.push(0); // attribute
        e.push(0); // refine
        e.extend_from_slice(&[0u8; 8]);
        e
    }

    pub fn status(first: i16, second: i16) -> InboundFrame {
        let mut body = Vec::new();
        body.extend_from_slice(&first.to_le_bytes());
        body.extend_from_slice(&second.to_le_bytes());
        InboundFrame::new(0x00f2, body)
    }

    pub fn pickup(wire: i16, amount: i16, item: i16, equip_type: u16, fail: u8) -> InboundFrame {
        let mut body = Vec::new();
        body.extend_from_slice(&wire.to_le_bytes());
        body.extend_from_slice(&amount.to_le_bytes());
        body.extend_from_slice(&item.to_le_bytes());
        body.extend_from_slice(&[1, 0, 0]);
        body.extend_from_slice(&[0u8; 8]);
        body.extend_from_slice(&equip_type.to_le_bytes());
        body.push(0);
        body.push(fail);
        InboundFrame::new(0x00a0, body)
    }

    pub fn index_point_flag(kind: u16, wire: i16, point: u16, flag: u8) -> InboundFrame {
        let mut body = Vec::new();
        body.extend_from_slice(&wire.to_le_bytes());
        body.extend_from_slice(&point.to_le_bytes());
        body.push(flag);
        InboundFrame::new(kind, body)
    }
}

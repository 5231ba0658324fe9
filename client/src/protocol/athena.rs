//! The newer server line: adds in-inventory moves and explicit storage open.

use kitbag_core::equip_slot::{ContainerKind, OffsetTable};

use crate::network::{client_commands::ClientCommand, server_commands::SyncEvent, InboundFrame};

use super::{
    common::{self, Layout, StatusOrder},
    DecodeError, Dialect, Intent, IntentError, ProtocolCodec,
};

const LAYOUT: Layout = Layout {
    status_order: StatusOrder::UsedFirst,
    arrow_marks_equipment: false,
    pickup_marks_equipment: false,
};

#[derive(Debug, Clone)]
pub struct AthenaCodec {
    offsets: OffsetTable,
}

impl AthenaCodec {
    pub fn new(offsets: OffsetTable) -> Self {
        Self { offsets }
    }
}

impl Default for AthenaCodec {
    fn default() -> Self {
        Self::new(OffsetTable::default())
    }
}

impl ProtocolCodec for AthenaCodec {
    fn dialect(&self) -> Dialect {
        Dialect::Athena
    }

    fn offsets(&self) -> &OffsetTable {
        &self.offsets
    }

    fn decode(&self, frame: &InboundFrame) -> Result<Option<SyncEvent>, DecodeError> {
        common::decode_frame(frame, &self.offsets, &LAYOUT)
    }

    fn encode(&self, intent: &Intent) -> Result<ClientCommand, IntentError> {
        let inventory = |index| common::wire_index(&self.offsets, index, ContainerKind::Inventory);
        let storage = |index| common::wire_index(&self.offsets, index, ContainerKind::Storage);

        let command = match *intent {
            Intent::Equip { index } => ClientCommand::new_equip(inventory(index)?),
            Intent::Unequip { index } => ClientCommand::new_unequip(inventory(index)?),
            Intent::Use { index, type_id } => ClientCommand::new_use(inventory(index)?, type_id),
            Intent::Drop { index, amount } => {
                ClientCommand::new_drop(inventory(index)?, common::positive_i16(amount)?)
            }
            Intent::Split {
                index,
                amount,
                target,
            } => ClientCommand::new_move_item(
                inventory(index)?,
                inventory(target)?,
                common::positive_i16(amount)?,
            ),
            Intent::Reorder { from, to, amount } => ClientCommand::new_move_item(
                inventory(from)?,
                inventory(to)?,
                common::positive_i16(amount)?,
            ),
            Intent::MoveToStorage { index, amount } => {
                ClientCommand::new_move_to_storage(inventory(index)?, common::positive_i32(amount)?)
            }
            Intent::MoveFromStorage { index, amount } => {
                ClientCommand::new_move_from_storage(storage(index)?, common::positive_i32(amount)?)
            }
            Intent::OpenStorage => ClientCommand::new_open_storage(),
            Intent::CloseStorage => ClientCommand::new_close_storage(),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::super::common::fixtures::*;
    use super::*;
    use crate::network::client_commands::ClientCommandType;

    #[test]
    fn status_reads_used_first() {
        let codec = AthenaCodec::default();
        assert_eq!(
            codec.decode(&status(12, 300)),
            Ok(Some(SyncEvent::StorageStatus {
                used: 12,
                capacity: 300,
            }))
        );
    }

    #[test]
    fn arrow_field_is_ignored() {
        let codec = AthenaCodec::default();
        let frame = list(0x01ee, &[inventory_entry(3, 1750, 200, 0x8000)]);
        let Some(SyncEvent::InventoryRefresh { entries }) = codec.decode(&frame).unwrap() else {
            panic!("expected refresh");
        };
        assert!(!entries[0].equipment_capable);
    }

    #[test]
    fn split_and_reorder_become_move_item() {
        let codec = AthenaCodec::default();
        let split = codec
            .encode(&Intent::Split {
                index: 0,
                amount: 2,
                target: 5,
            })
            .unwrap();
        assert_eq!(split.header(), ClientCommandType::MoveItem);
        assert_eq!(split.payload(), &[2, 0, 7, 0, 2, 0]);

        let reorder = codec
            .encode(&Intent::Reorder {
                from: 3,
                to: 1,
                amount: 9,
            })
            .unwrap();
        assert_eq!(reorder.payload(), &[5, 0, 3, 0, 9, 0]);
    }

    #[test]
    fn open_and_close_storage() {
        let codec = AthenaCodec::default();
        assert_eq!(
            codec.encode(&Intent::OpenStorage).unwrap().header(),
            ClientCommandType::OpenStorage
        );
        assert_eq!(
            codec.encode(&Intent::CloseStorage).unwrap().header(),
            ClientCommandType::CloseStorage
        );
    }

    #[test]
    fn use_carries_wire_index_and_item() {
        let codec = AthenaCodec::default();
        let cmd = codec
            .encode(&Intent::Use {
                index: 0,
                type_id: 501,
            })
            .unwrap();
        assert_eq!(cmd.to_bytes(), vec![0xa7, 0x00, 2, 0, 0xf5, 0x01, 0, 0]);
    }
}

//! The older server line.
//!
//! No item moves inside the inventory and no explicit storage open: the
//! server opens storage on its own (NPC interaction) and cannot split or
//! reorder stacks.

use kitbag_core::equip_slot::{ContainerKind, OffsetTable};

use crate::network::{client_commands::ClientCommand, server_commands::SyncEvent, InboundFrame};

use super::{
    common::{self, Layout, StatusOrder},
    DecodeError, Dialect, Intent, IntentError, ProtocolCodec,
};

const LAYOUT: Layout = Layout {
    status_order: StatusOrder::CapacityFirst,
    arrow_marks_equipment: true,
    pickup_marks_equipment: true,
};

#[derive(Debug, Clone)]
pub struct ClassicCodec {
    offsets: OffsetTable,
}

impl ClassicCodec {
    pub fn new(offsets: OffsetTable) -> Self {
        Self { offsets }
    }
}

impl Default for ClassicCodec {
    fn default() -> Self {
        Self::new(OffsetTable::default())
    }
}

impl ProtocolCodec for ClassicCodec {
    fn dialect(&self) -> Dialect {
        Dialect::Classic
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
            Intent::MoveToStorage { index, amount } => {
                ClientCommand::new_move_to_storage(inventory(index)?, common::positive_i32(amount)?)
            }
            Intent::MoveFromStorage { index, amount } => {
                ClientCommand::new_move_from_storage(storage(index)?, common::positive_i32(amount)?)
            }
            Intent::CloseStorage => ClientCommand::new_close_storage(),
            Intent::Split { .. } | Intent::Reorder { .. } | Intent::OpenStorage => {
                return Err(IntentError::Unsupported {
                    intent: intent.name(),
                    dialect: Dialect::Classic,
                });
            }
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
    fn status_reads_capacity_first() {
        let codec = ClassicCodec::default();
        assert_eq!(
            codec.decode(&status(300, 12)),
            Ok(Some(SyncEvent::StorageStatus {
                used: 12,
                capacity: 300,
            }))
        );
    }

    #[test]
    fn arrow_bit_marks_equipment() {
        let codec = ClassicCodec::default();
        let frame = list(0x01ee, &[inventory_entry(3, 1750, 200, 0x8000)]);
        let Some(SyncEvent::InventoryRefresh { entries }) = codec.decode(&frame).unwrap() else {
            panic!("expected refresh");
        };
        assert!(entries[0].equipment_capable);
    }

    #[test]
    fn server_side_moves_are_unsupported() {
        let codec = ClassicCodec::default();
        for intent in [
            Intent::Split {
                index: 0,
                amount: 1,
                target: 1,
            },
            Intent::Reorder {
                from: 0,
                to: 1,
                amount: 2,
            },
            Intent::OpenStorage,
        ] {
            assert!(matches!(
                codec.encode(&intent),
                Err(IntentError::Unsupported {
                    dialect: Dialect::Classic,
                    ..
                })
            ));
        }
    }

    #[test]
    fn encodes_with_wire_indices() {
        let codec = ClassicCodec::new(OffsetTable {
            inventory: 24,
            storage: 1,
        });
        let equip = codec.encode(&Intent::Equip { index: 2 }).unwrap();
        assert_eq!(equip.header(), ClientCommandType::Equip);
        assert_eq!(equip.payload(), &[26, 0, 0, 0]);

        let from_storage = codec
            .encode(&Intent::MoveFromStorage {
                index: 0,
                amount: 4,
            })
            .unwrap();
        assert_eq!(from_storage.payload(), &[1, 0, 4, 0, 0, 0]);

        assert_eq!(
            codec.encode(&Intent::Drop {
                index: 0,
                amount: 0,
            }),
            Err(IntentError::InvalidAmount(0))
        );
    }
}

//! Applies decoded server messages to the item model and sends user intents.

use bitflags::bitflags;
use log::{debug, info, trace, warn};

use kitbag_core::{
    constants::{INVENTORY_SIZE, STORAGE_PLACEHOLDER_SIZE},
    equip_slot::{to_logical_slot, ContainerKind, EquipSlot},
    shortcuts::ItemShortcuts,
    types::{Container, ItemRecord, ModelError, PersonalInventory, StorageSession, StorageState},
};

use crate::{
    network::{
        server_commands::{ItemEntry, SyncEvent},
        FrameReceiver, InboundFrame, Transport,
    },
    protocol::{codec_for, Dialect, Intent, IntentError, ProtocolCodec},
    settings::SyncSettings,
};

use super::listener::{ChangeListener, PickupFailure, UserNotice};

bitflags! {
    /// Which listener callbacks a mutation calls for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Changes: u8 {
        const INVENTORY = 1 << 0;
        const EQUIPMENT = 1 << 1;
        const STORAGE = 1 << 2;
    }
}

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Decoded and applied (model corrections may still have been logged).
    Applied,
    /// Not a message kind this layer handles.
    Ignored,
    /// Malformed; nothing was applied.
    Discarded,
}

/// Item moves the player can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRequest {
    ToStorage { index: usize, amount: i32 },
    FromStorage { index: usize, amount: i32 },
    /// Moves a whole inventory stack to another slot.
    Reorder { from: usize, to: usize },
}

/// Single owner of the personal inventory, the equipment table and the
/// storage session.
///
/// Inbound frames mutate the model; outbound requests never do. A request
/// is only encoded and handed to the transport, and the model changes once
/// the server's confirmation comes back in.
pub struct SyncHandler {
    codec: Box<dyn ProtocolCodec>,
    inventory: PersonalInventory,
    storage: StorageSession,
    shortcuts: ItemShortcuts,
    transport: Box<dyn Transport>,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl SyncHandler {
    pub fn new(codec: Box<dyn ProtocolCodec>, transport: Box<dyn Transport>) -> Self {
        Self::with_capacities(codec, transport, INVENTORY_SIZE, STORAGE_PLACEHOLDER_SIZE)
    }

    pub fn with_capacities(
        codec: Box<dyn ProtocolCodec>,
        transport: Box<dyn Transport>,
        inventory_capacity: usize,
        storage_placeholder_capacity: usize,
    ) -> Self {
        info!(
            "Item sync using {} dialect (inventory offset {}, storage offset {})",
            codec.dialect(),
            codec.offsets().inventory,
            codec.offsets().storage
        );
        Self {
            codec,
            inventory: PersonalInventory::new(inventory_capacity),
            storage: StorageSession::new(storage_placeholder_capacity),
            shortcuts: ItemShortcuts::default(),
            transport,
            listeners: Vec::new(),
        }
    }

    pub fn from_settings(settings: &SyncSettings, transport: Box<dyn Transport>) -> Self {
        let codec = codec_for(settings.dialect, settings.offsets_for(settings.dialect));
        let mut handler = Self::with_capacities(
            codec,
            transport,
            settings.inventory_capacity,
            settings.storage_placeholder_capacity,
        );
        handler.shortcuts = settings.shortcuts.clone();
        handler
    }

    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn dialect(&self) -> Dialect {
        self.codec.dialect()
    }

    pub fn inventory(&self) -> &PersonalInventory {
        &self.inventory
    }

    pub fn storage(&self) -> &StorageSession {
        &self.storage
    }

    pub fn storage_state(&self) -> StorageState {
        self.storage.state()
    }

    pub fn item(&self, index: usize) -> Option<&ItemRecord> {
        self.inventory.get_item(index)
    }

    /// Inventory index bound to `slot`.
    pub fn resolve(&self, slot: EquipSlot) -> Option<usize> {
        self.inventory.equipment().resolve(slot)
    }

    pub fn shortcuts(&self) -> &ItemShortcuts {
        &self.shortcuts
    }

    pub fn shortcuts_mut(&mut self) -> &mut ItemShortcuts {
        &mut self.shortcuts
    }

    /// Drains every queued frame in arrival order, without blocking.
    ///
    /// # Returns
    /// * The number of frames taken off the queue.
    pub fn pump(&mut self, frames: &FrameReceiver) -> usize {
        let mut count = 0;
        while let Some(frame) = frames.try_next() {
            self.handle_frame(&frame);
            count += 1;
        }
        count
    }

    /// Decodes and applies one frame. Never fails: malformed frames are
    /// logged and dropped whole.
    pub fn handle_frame(&mut self, frame: &InboundFrame) -> FrameOutcome {
        match self.codec.decode(frame) {
            Ok(Some(event)) => {
                self.apply(event);
                FrameOutcome::Applied
            }
            Ok(None) => {
                trace!("Ignoring message {:#06x}", frame.kind);
                FrameOutcome::Ignored
            }
            Err(e) => {
                warn!("Discarding malformed message: {e}");
                FrameOutcome::Discarded
            }
        }
    }

    /// Applies one decoded event and notifies listeners.
    pub fn apply(&mut self, event: SyncEvent) {
        let name = event.name();
        let equipment_before = self.inventory.equipment().clone();
        let storage_before = self.storage.state();

        let mut changes = match self.apply_event(event) {
            Ok(changes) => changes,
            Err(e) => {
                warn!("Ignoring {name}: {e}");
                Changes::empty()
            }
        };

        if *self.inventory.equipment() != equipment_before {
            changes |= Changes::EQUIPMENT;
        }
        if self.storage.state() != storage_before {
            changes |= Changes::STORAGE;
        }
        self.notify(changes);
    }

    fn apply_event(&mut self, event: SyncEvent) -> Result<Changes, ModelError> {
        let changes = match event {
            SyncEvent::InventoryRefresh { entries } => {
                self.inventory.reset();
                for entry in &entries {
                    self.store_inventory_entry(entry);
                }
                Changes::INVENTORY | Changes::EQUIPMENT
            }
            SyncEvent::EquipmentList { entries } => {
                for entry in &entries {
                    if let Some(index) = self.store_inventory_entry(entry) {
                        self.bind_from_list(index, entry.equip_point);
                    }
                }
                Changes::INVENTORY | Changes::EQUIPMENT
            }
            SyncEvent::ItemAdded {
                index,
                type_id,
                amount,
                equipment_capable,
            } => {
                let index = self.inventory_index(index)?;
                self.inventory
                    .merge_add(index, type_id, amount, equipment_capable)?;
                Changes::INVENTORY
            }
            SyncEvent::PickupFailed { type_id, reason } => {
                self.notice(UserNotice::PickupFailed {
                    type_id,
                    reason: PickupFailure::from_code(reason),
                });
                Changes::empty()
            }
            SyncEvent::ItemRemoved { index, amount } => {
                if amount <= 0 {
                    return Err(ModelError::InvalidAmount(amount));
                }
                let index = self.inventory_index(index)?;
                self.inventory.adjust_quantity(index, -amount)?;
                Changes::INVENTORY
            }
            SyncEvent::QuantitySet { index, quantity } => {
                let index = self.inventory_index(index)?;
                self.inventory.set_quantity(index, quantity.max(0))?;
                Changes::INVENTORY
            }
            SyncEvent::UseFailed { index } => {
                self.notice(UserNotice::UseFailed { index });
                Changes::empty()
            }
            SyncEvent::Equipped { index, equip_point } => {
                let index = self.inventory_index(index)?;
                match to_logical_slot(equip_point) {
                    EquipSlot::None => {
                        warn!(
                            "Equip confirmation for index {} carries unusable equip point {:#06x}",
                            index, equip_point
                        );
                        Changes::empty()
                    }
                    slot => {
                        self.inventory.equip(slot, index)?;
                        Changes::INVENTORY | Changes::EQUIPMENT
                    }
                }
            }
            SyncEvent::EquipFailed { index } => {
                self.notice(UserNotice::EquipFailed { index });
                Changes::empty()
            }
            SyncEvent::Unequipped { index, equip_point } => {
                let index = self.inventory_index(index)?;
                let slot = to_logical_slot(equip_point);
                if self.inventory.unequip(slot, index).is_none() {
                    debug!("Unequip of index {} ({:?}) matched no binding", index, slot);
                    return Ok(Changes::empty());
                }
                Changes::INVENTORY | Changes::EQUIPMENT
            }
            SyncEvent::UnequipFailed { index } => {
                self.notice(UserNotice::UnequipFailed { index });
                Changes::empty()
            }
            SyncEvent::ArrowsEquipped { index: None } => {
                debug!("Server reports no ammunition equipped");
                Changes::empty()
            }
            SyncEvent::ArrowsEquipped { index: Some(index) } => {
                let index = self.inventory_index(index)?;
                self.inventory.equip(EquipSlot::Projectile, index)?;
                Changes::INVENTORY | Changes::EQUIPMENT
            }
            SyncEvent::StoragePopulate { entries, fresh } => {
                self.storage.begin_population(fresh);
                for entry in &entries {
                    let stored = self.storage_index(entry.index).and_then(|index| {
                        self.storage.populate(
                            index,
                            entry.type_id,
                            entry.quantity,
                            entry.equipment_capable,
                        )
                    });
                    if let Err(e) = stored {
                        warn!("Skipping storage record: {e}");
                    }
                }
                Changes::STORAGE
            }
            SyncEvent::StorageStatus { used, capacity } => {
                let capacity =
                    usize::try_from(capacity).map_err(|_| ModelError::InvalidAmount(capacity))?;
                let used = usize::try_from(used).map_err(|_| ModelError::InvalidAmount(used))?;
                self.storage.open(capacity, used);
                Changes::STORAGE
            }
            SyncEvent::StorageAdded {
                index,
                type_id,
                amount,
            } => {
                let index = self.storage_index(index)?;
                self.storage.add(index, type_id, amount, false)?;
                Changes::STORAGE
            }
            SyncEvent::StorageRemoved { index, amount } => {
                let index = self.storage_index(index)?;
                self.storage.remove(index, amount)?;
                Changes::STORAGE
            }
            SyncEvent::StorageClosed => {
                self.storage.close();
                Changes::STORAGE
            }
        };
        Ok(changes)
    }

    /// Writes one list record into the inventory, logging instead of
    /// failing.
    fn store_inventory_entry(&mut self, entry: &ItemEntry) -> Option<usize> {
        let stored = self.inventory_index(entry.index).and_then(|index| {
            self.inventory
                .set_slot(
                    index,
                    entry.type_id,
                    entry.quantity,
                    entry.equipment_capable,
                )
                .map(|_| index)
        });
        match stored {
            Ok(index) => Some(index),
            Err(e) => {
                warn!("Skipping inventory record: {e}");
                None
            }
        }
    }

    fn bind_from_list(&mut self, index: usize, equip_point: u16) {
        if equip_point == 0 {
            return;
        }
        let slot = to_logical_slot(equip_point);
        if slot == EquipSlot::None {
            warn!(
                "Equipment record at index {} has unusable equip point {:#06x}",
                index, equip_point
            );
            return;
        }
        if let Err(e) = self.inventory.equip(slot, index) {
            warn!("Cannot bind {:?} to index {}: {e}", slot, index);
        }
    }

    fn inventory_index(&self, index: i32) -> Result<usize, ModelError> {
        self.inventory.items().local_index(index)
    }

    fn storage_index(&self, index: i32) -> Result<usize, ModelError> {
        self.storage.local_index(index)
    }

    fn notice(&mut self, notice: UserNotice) {
        info!("Server refused: {}", notice.message());
        for listener in self.listeners.iter_mut() {
            listener.on_notice(&notice);
        }
    }

    fn notify(&mut self, changes: Changes) {
        if changes.is_empty() {
            return;
        }
        let state = self.storage.state();
        for listener in self.listeners.iter_mut() {
            if changes.contains(Changes::INVENTORY) {
                listener.on_inventory_changed(&self.inventory);
            }
            if changes.contains(Changes::EQUIPMENT) {
                listener.on_equipment_changed(self.inventory.equipment());
            }
            if changes.contains(Changes::STORAGE) {
                listener.on_storage_state_changed(state);
            }
        }
    }

    pub fn request_equip(&mut self, index: usize) -> Result<(), IntentError> {
        let intent = self.carried(index).map(|_| Intent::Equip { index });
        self.submit("equip", intent)
    }

    pub fn request_unequip(&mut self, index: usize) -> Result<(), IntentError> {
        let intent = self.carried(index).and_then(|item| {
            if item.is_equipped() {
                Ok(Intent::Unequip { index })
            } else {
                Err(IntentError::NotEquipped(index))
            }
        });
        self.submit("unequip", intent)
    }

    pub fn request_use(&mut self, index: usize) -> Result<(), IntentError> {
        let intent = self.carried(index).map(|item| Intent::Use {
            index,
            type_id: item.type_id(),
        });
        self.submit("use", intent)
    }

    pub fn request_drop(&mut self, index: usize, amount: i32) -> Result<(), IntentError> {
        let intent = self.carried(index).and_then(|item| {
            if amount <= 0 || amount > item.quantity() {
                return Err(IntentError::InvalidAmount(amount));
            }
            Ok(Intent::Drop { index, amount })
        });
        self.submit("drop", intent)
    }

    /// Splits `amount` off the stack at `index` into the first free slot.
    pub fn request_split(&mut self, index: usize, amount: i32) -> Result<(), IntentError> {
        let intent = self.carried(index).and_then(|item| {
            if item.quantity() <= 1 || amount <= 0 || amount >= item.quantity() {
                return Err(IntentError::InvalidAmount(amount));
            }
            let target = self
                .inventory
                .items()
                .free_slot()
                .ok_or(IntentError::NoFreeSlot)?;
            Ok(Intent::Split {
                index,
                amount,
                target,
            })
        });
        self.submit("split", intent)
    }

    pub fn request_move(&mut self, request: MoveRequest) -> Result<(), IntentError> {
        let intent = match request {
            MoveRequest::ToStorage { index, amount } => {
                self.open_storage().and_then(|_| self.carried(index)).and_then(|item| {
                    if amount <= 0 || amount > item.quantity() {
                        return Err(IntentError::InvalidAmount(amount));
                    }
                    Ok(Intent::MoveToStorage { index, amount })
                })
            }
            MoveRequest::FromStorage { index, amount } => {
                self.open_storage().and_then(|storage| {
                    let item = storage.get_item(index).ok_or(IntentError::NoItem {
                        kind: ContainerKind::Storage.label(),
                        index,
                    })?;
                    if amount <= 0 || amount > item.quantity() {
                        return Err(IntentError::InvalidAmount(amount));
                    }
                    Ok(Intent::MoveFromStorage { index, amount })
                })
            }
            MoveRequest::Reorder { from, to } => {
                if from == to {
                    debug!("Ignoring move of index {} onto itself", from);
                    return Ok(());
                }
                let capacity = self.inventory.items().capacity();
                self.carried(from).and_then(|item| {
                    if to >= capacity {
                        return Err(IntentError::IndexOutOfRange {
                            kind: ContainerKind::Inventory.label(),
                            index: to,
                        });
                    }
                    Ok(Intent::Reorder {
                        from,
                        to,
                        amount: item.quantity(),
                    })
                })
            }
        };
        self.submit("move", intent)
    }

    /// Asks the server to open storage. The session only changes once the
    /// server starts sending its contents.
    pub fn request_open_storage(&mut self) -> Result<(), IntentError> {
        self.submit("open-storage", Ok(Intent::OpenStorage))
    }

    /// Asks the server to close storage. The session stays as it is until
    /// the close confirmation arrives.
    pub fn request_close_storage(&mut self) -> Result<(), IntentError> {
        let intent = match self.storage.state() {
            StorageState::Closed => Err(IntentError::StorageNotOpen),
            _ => Ok(Intent::CloseStorage),
        };
        self.submit("close-storage", intent)
    }

    /// Uses whatever item shortcut `n` is bound to, wherever it now sits.
    pub fn use_shortcut(&mut self, n: usize) -> Result<(), IntentError> {
        let type_id = self.shortcuts.get(n).ok_or(IntentError::EmptyShortcut(n))?;
        match self.shortcuts.resolve(n, self.inventory.items()) {
            Some(index) => self.request_use(index),
            None => {
                info!("Shortcut {} item {} is not carried", n, type_id);
                Err(IntentError::NotCarried(type_id))
            }
        }
    }

    fn carried(&self, index: usize) -> Result<&ItemRecord, IntentError> {
        self.inventory.get_item(index).ok_or(IntentError::NoItem {
            kind: ContainerKind::Inventory.label(),
            index,
        })
    }

    fn open_storage(&self) -> Result<&Container, IntentError> {
        self.storage.container().ok_or(IntentError::StorageNotOpen)
    }

    fn submit(
        &mut self,
        request: &'static str,
        intent: Result<Intent, IntentError>,
    ) -> Result<(), IntentError> {
        let result = intent.and_then(|intent| {
            let command = self.codec.encode(&intent)?;
            debug!("Sending {} request: {:?}", intent.name(), intent);
            self.transport.send(command);
            Ok(())
        });
        if let Err(e) = &result {
            info!("Not sending {request} request: {e}");
        }
        result
    }
}

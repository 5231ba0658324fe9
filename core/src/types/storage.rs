//! Bank storage: a container with an open/populate/close lifecycle.

use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{constants::STORAGE_PLACEHOLDER_SIZE, equip_slot::ContainerKind};

use super::{
    container::{Container, SlotChange},
    error::ModelError,
    item::ItemRecord,
};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageState {
    #[default]
    Closed,
    /// Records are arriving; capacity is still a placeholder.
    Opening,
    Open,
}

impl fmt::Display for StorageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageState::Closed => "closed",
            StorageState::Opening => "opening",
            StorageState::Open => "open",
        };
        f.write_str(name)
    }
}

/// Remote bank container.
///
/// The container only exists between the first population message and the
/// close message. It is reallocated on every open since capacity is
/// re-learned from the server each time.
///
/// While `Opening` the buffer starts at the placeholder capacity and grows
/// to fit whatever index the server sends; only [`StorageSession::open`]
/// applies the announced capacity.
#[derive(Debug, Clone)]
pub struct StorageSession {
    state: StorageState,
    container: Option<Container>,
    placeholder_capacity: usize,
    used_reported: Option<usize>,
}

impl Default for StorageSession {
    fn default() -> Self {
        Self::new(STORAGE_PLACEHOLDER_SIZE)
    }
}

impl StorageSession {
    pub fn new(placeholder_capacity: usize) -> Self {
        Self {
            state: StorageState::Closed,
            container: None,
            placeholder_capacity,
            used_reported: None,
        }
    }

    pub fn state(&self) -> StorageState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == StorageState::Open
    }

    /// The container, visible only once the session is `Open`.
    pub fn container(&self) -> Option<&Container> {
        match self.state {
            StorageState::Open => self.container.as_ref(),
            _ => None,
        }
    }

    /// Records buffered so far, whatever the state.
    pub fn buffered(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    pub fn get_item(&self, index: usize) -> Option<&ItemRecord> {
        self.container().and_then(|c| c.get_item(index))
    }

    pub fn slots_used(&self) -> usize {
        self.container().map_or(0, Container::slots_used)
    }

    /// Used-slot count as last reported by the server status message.
    pub fn used_reported(&self) -> Option<usize> {
        self.used_reported
    }

    /// Translates a (possibly negative) storage index.
    ///
    /// While `Opening` any non-negative index is accepted, since the real
    /// capacity is not known yet. While `Open` the container's capacity
    /// applies.
    pub fn local_index(&self, index: i32) -> Result<usize, ModelError> {
        let container = self
            .container
            .as_ref()
            .ok_or(ModelError::StorageUnavailable)?;
        match self.state {
            StorageState::Opening => usize::try_from(index).map_err(|_| {
                ModelError::out_of_range(ContainerKind::Storage, i64::from(index), container.capacity())
            }),
            _ => container.local_index(index),
        }
    }

    /// Enters `Opening` with a fresh placeholder container.
    ///
    /// While already `Opening`, a non-fresh call keeps the buffered records
    /// (the equipment list and the item list arrive as separate messages).
    /// A `fresh` call while `Open` starts a new population pass.
    pub fn begin_population(&mut self, fresh: bool) {
        let restart = match self.state {
            StorageState::Closed => true,
            StorageState::Opening => false,
            StorageState::Open => fresh,
        };
        if !restart {
            return;
        }
        self.container = Some(Container::new(
            ContainerKind::Storage,
            self.placeholder_capacity,
        ));
        self.used_reported = None;
        self.transition(StorageState::Opening);
    }

    /// Stores one population record, entering `Opening` first when closed.
    pub fn populate(
        &mut self,
        index: usize,
        type_id: i32,
        quantity: i32,
        equipment_capable: bool,
    ) -> Result<SlotChange, ModelError> {
        if self.state == StorageState::Closed {
            self.begin_population(true);
        }
        self.buffer_for(index)?
            .set_slot(index, type_id, quantity, equipment_capable)
    }

    /// Applies the status message: rebuilds the container at the
    /// authoritative capacity and enters `Open`.
    ///
    /// # Returns
    /// * The buffered records that did not fit and were dropped.
    pub fn open(&mut self, capacity: usize, used: usize) -> Vec<ItemRecord> {
        let buffered = self
            .container
            .take()
            .unwrap_or_else(|| Container::new(ContainerKind::Storage, 0));
        let (container, dropped) = buffered.resized(capacity);
        for item in &dropped {
            warn!(
                "Dropping storage record at index {} (type {}): beyond capacity {}",
                item.container_index(),
                item.type_id(),
                capacity
            );
        }
        if container.slots_used() != used {
            warn!(
                "Storage reports {} used slots, {} records are present",
                used,
                container.slots_used()
            );
        }
        self.container = Some(container);
        self.used_reported = Some(used);
        self.transition(StorageState::Open);
        dropped
    }

    /// Incremental add while the session exists.
    ///
    /// `amount` is added onto whatever the slot already holds, and the
    /// record takes the incoming type id. An occupied slot keeps its
    /// equipment flag.
    pub fn add(
        &mut self,
        index: usize,
        type_id: i32,
        amount: i32,
        equipment_capable: bool,
    ) -> Result<SlotChange, ModelError> {
        if amount <= 0 {
            return Err(ModelError::InvalidAmount(amount));
        }
        let container = self.buffer_for(index)?;
        let (quantity, equipment_capable) = container
            .get_item(index)
            .map(|item| (item.quantity(), item.is_equipment_capable()))
            .unwrap_or((0, equipment_capable));
        container.set_slot(index, type_id, quantity.saturating_add(amount), equipment_capable)
    }

    /// Removes `amount` from the record at `index`.
    pub fn remove(&mut self, index: usize, amount: i32) -> Result<SlotChange, ModelError> {
        if amount <= 0 {
            return Err(ModelError::InvalidAmount(amount));
        }
        self.container_mut()?.adjust_quantity(index, -amount)
    }

    /// Discards the container and returns to `Closed`.
    pub fn close(&mut self) {
        self.container = None;
        self.used_reported = None;
        self.transition(StorageState::Closed);
    }

    fn container_mut(&mut self) -> Result<&mut Container, ModelError> {
        self.container.as_mut().ok_or(ModelError::StorageUnavailable)
    }

    /// The container, grown to hold `index` while still `Opening`.
    fn buffer_for(&mut self, index: usize) -> Result<&mut Container, ModelError> {
        let opening = self.state == StorageState::Opening;
        let container = self.container_mut()?;
        if opening {
            container.grow(index.saturating_add(1));
        }
        Ok(container)
    }

    fn transition(&mut self, next: StorageState) {
        if self.state != next {
            info!("Storage session {} -> {}", self.state, next);
        }
        self.state = next;
    }
}

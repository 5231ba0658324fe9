//! Client-side item model: records, containers, equipment and storage.

mod container;
mod equipment;
mod error;
mod inventory;
mod item;
mod storage;

pub use container::{Container, SlotChange};
pub use equipment::EquipmentMap;
pub use error::ModelError;
pub use inventory::PersonalInventory;
pub use item::ItemRecord;
pub use storage::{StorageSession, StorageState};

//! Protocol dialects.
//!
//! Both dialects decode into the same [`SyncEvent`]s and encode the same
//! [`Intent`]s; they differ only in field layout details, the offset table
//! and which intents the server understands.

mod athena;
mod classic;
mod common;

use std::fmt;

use bincode::{Decode, Encode};
use kitbag_core::{equip_slot::OffsetTable, wire_cursor::WireError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::{client_commands::ClientCommand, server_commands::SyncEvent, InboundFrame};

pub use athena::AthenaCodec;
pub use classic::ClassicCodec;

#[derive(
    Serialize, Deserialize, Encode, Decode, Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Older server line.
    Classic,
    /// Newer server line.
    #[default]
    Athena,
}

impl Dialect {
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Classic => "classic",
            Dialect::Athena => "athena",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why an inbound message was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("message {kind:#06x}: {source}")]
    Wire {
        kind: u16,
        #[source]
        source: WireError,
    },

    #[error("message {kind:#06x}: length prefix {declared} does not match {actual} body bytes")]
    LengthMismatch {
        kind: u16,
        declared: u16,
        actual: usize,
    },

    #[error("message {kind:#06x}: {payload} list bytes are not a whole number of {entry_size}-byte entries")]
    RaggedList {
        kind: u16,
        payload: usize,
        entry_size: usize,
    },

    #[error("message {kind:#06x}: {remaining} unread bytes at offset {position}")]
    TrailingBytes {
        kind: u16,
        position: usize,
        remaining: usize,
    },
}

impl DecodeError {
    pub fn kind(&self) -> u16 {
        match self {
            DecodeError::Wire { kind, .. }
            | DecodeError::LengthMismatch { kind, .. }
            | DecodeError::RaggedList { kind, .. }
            | DecodeError::TrailingBytes { kind, .. } => *kind,
        }
    }
}

/// Why a user intent was not sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("{intent} is not supported by the {dialect} server")]
    Unsupported {
        intent: &'static str,
        dialect: Dialect,
    },

    #[error("no item at {kind} index {index}")]
    NoItem { kind: &'static str, index: usize },

    #[error("{kind} index {index} cannot be sent on the wire")]
    IndexOutOfRange { kind: &'static str, index: usize },

    #[error("storage is not open")]
    StorageNotOpen,

    #[error("no free inventory slot")]
    NoFreeSlot,

    #[error("invalid amount {0}")]
    InvalidAmount(i32),

    #[error("inventory index {0} is not equipped")]
    NotEquipped(usize),

    #[error("no item bound to shortcut {0}")]
    EmptyShortcut(usize),

    #[error("item {0} is not in the inventory")]
    NotCarried(i32),
}

/// A user action, expressed with local indices. Dialects turn these into
/// outgoing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Equip { index: usize },
    Unequip { index: usize },
    Use { index: usize, type_id: i32 },
    Drop { index: usize, amount: i32 },
    /// Moves part of a stack into the empty slot `target`.
    Split {
        index: usize,
        amount: i32,
        target: usize,
    },
    /// Moves a whole stack inside the inventory.
    Reorder { from: usize, to: usize, amount: i32 },
    MoveToStorage { index: usize, amount: i32 },
    MoveFromStorage { index: usize, amount: i32 },
    OpenStorage,
    CloseStorage,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Equip { .. } => "equip",
            Intent::Unequip { .. } => "unequip",
            Intent::Use { .. } => "use",
            Intent::Drop { .. } => "drop",
            Intent::Split { .. } => "split",
            Intent::Reorder { .. } => "move",
            Intent::MoveToStorage { .. } => "move-to-storage",
            Intent::MoveFromStorage { .. } => "move-from-storage",
            Intent::OpenStorage => "open-storage",
            Intent::CloseStorage => "close-storage",
        }
    }
}

/// One protocol dialect.
pub trait ProtocolCodec {
    fn dialect(&self) -> Dialect;

    fn offsets(&self) -> &OffsetTable;

    /// Decodes one frame.
    ///
    /// # Returns
    /// * `Ok(None)` for message kinds this layer does not handle.
    /// * `Err` when the frame is malformed; nothing should be applied.
    fn decode(&self, frame: &InboundFrame) -> Result<Option<SyncEvent>, DecodeError>;

    /// Encodes an intent, translating local indices to wire indices.
    fn encode(&self, intent: &Intent) -> Result<ClientCommand, IntentError>;
}

/// Builds the codec for `dialect`, using `offsets` when given and the
/// dialect defaults otherwise.
pub fn codec_for(dialect: Dialect, offsets: Option<OffsetTable>) -> Box<dyn ProtocolCodec> {
    let offsets = offsets.unwrap_or_default();
    match dialect {
        Dialect::Classic => Box::new(ClassicCodec::new(offsets)),
        Dialect::Athena => Box::new(AthenaCodec::new(offsets)),
    }
}

//! Sizes shared by the model and the protocol dialects.

/// Personal inventory capacity; fixed for the lifetime of the client.
pub const INVENTORY_SIZE: usize = 100;

/// Capacity used for a storage container while its real size is still unknown.
///
/// Records buffered during population are checked again against the
/// authoritative capacity once the server announces it.
pub const STORAGE_PLACEHOLDER_SIZE: usize = 300;

/// Number of item quick-slots.
pub const SHORTCUT_ITEMS: usize = 12;

/// Wire offset of personal inventory indices (both dialects).
pub const INVENTORY_OFFSET: i32 = 2;

/// Wire offset of storage indices (both dialects).
pub const STORAGE_OFFSET: i32 = 1;

/// Bit 15 of an equip mask marks ammunition regardless of the other bits.
pub const AMMO_MARKER: u16 = 0x8000;

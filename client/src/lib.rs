//! Client-side item synchronization: decodes server inventory, equipment and
//! storage messages into the `kitbag_core` model and encodes player intents.

pub mod capture;
pub mod network;
pub mod protocol;
pub mod settings;
pub mod sync;

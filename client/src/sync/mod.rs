mod handler;
mod listener;

pub use handler::{FrameOutcome, MoveRequest, SyncHandler};
pub use listener::{ChangeListener, LoggingListener, PickupFailure, UserNotice};

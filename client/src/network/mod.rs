//! Hand-off between the transport thread and the logic thread.
//!
//! The transport only ever sees opaque frames and serialized commands; the
//! item model lives on the logic side of these channels.

pub mod client_commands;
pub mod server_commands;

use std::sync::{
    mpsc::{self, TryRecvError},
    Arc, Mutex,
};

use bincode::{Decode, Encode};

use client_commands::ClientCommand;

/// One already-framed inbound message: its id and every byte after it.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct InboundFrame {
    pub kind: u16,
    pub body: Vec<u8>,
}

impl InboundFrame {
    pub fn new(kind: u16, body: Vec<u8>) -> Self {
        Self { kind, body }
    }

    /// Splits a raw message into id and body.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let id = bytes.get(0..2)?;
        Some(Self {
            kind: u16::from_le_bytes([id[0], id[1]]),
            body: bytes[2..].to_vec(),
        })
    }
}

/// Producer/consumer pair for inbound frames.
pub struct FrameQueue;

impl FrameQueue {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (FrameSender, FrameReceiver) {
        let (tx, rx) = mpsc::channel();
        (FrameSender { tx }, FrameReceiver { rx })
    }
}

/// Transport-side end. Cheap to clone, safe to move to another thread.
#[derive(Clone, Debug)]
pub struct FrameSender {
    tx: mpsc::Sender<InboundFrame>,
}

impl FrameSender {
    /// Queues a frame. Returns `false` once the logic side has gone away.
    pub fn push(&self, frame: InboundFrame) -> bool {
        self.tx.send(frame).is_ok()
    }
}

/// Logic-side end.
#[derive(Debug)]
pub struct FrameReceiver {
    rx: mpsc::Receiver<InboundFrame>,
}

impl FrameReceiver {
    /// Next queued frame without blocking.
    pub fn try_next(&self) -> Option<InboundFrame> {
        match self.rx.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                log::trace!("Frame queue producer disconnected");
                None
            }
        }
    }
}

/// Destination for encoded outgoing commands.
pub trait Transport {
    fn send(&mut self, command: ClientCommand);
}

/// Forwards serialized commands to the transport thread.
pub struct ChannelTransport {
    tx: mpsc::Sender<Vec<u8>>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self { tx }
    }
}

impl Transport for ChannelTransport {
    fn send(&mut self, command: ClientCommand) {
        if self.tx.send(command.to_bytes()).is_err() {
            log::warn!(
                "Transport channel closed, dropping {:?} command",
                command.header()
            );
        }
    }
}

/// Keeps every command in memory. The log is shared so a caller can keep a
/// handle after giving the transport to a handler.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<Mutex<Vec<ClientCommand>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands sent so far, in order.
    pub fn sent(&self) -> Vec<ClientCommand> {
        match self.sent.lock() {
            Ok(sent) => sent.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<ClientCommand> {
        match self.sent.lock() {
            Ok(mut sent) => std::mem::take(&mut *sent),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl Transport for RecordingTransport {
    fn send(&mut self, command: ClientCommand) {
        match self.sent.lock() {
            Ok(mut sent) => sent.push(command),
            Err(poisoned) => poisoned.into_inner().push(command),
        }
    }
}

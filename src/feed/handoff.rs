//! Single-slot hand-off between the broker session and the render loop
//!
//! The slot holds at most one pending frame. The producer never blocks: a
//! push against an occupied slot drops the new frame, so the oldest
//! unconsumed frame wins until the consumer takes it. The consumer side
//! blocks, which is the render loop's sole suspension point.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, TrySendError};
use std::sync::Arc;
use std::time::Duration;

use super::frame::ScatterFrame;

/// Create the hand-off slot, empty.
pub fn frame_slot() -> (SlotSender, SlotReceiver) {
    let (tx, rx) = std::sync::mpsc::sync_channel(1);
    (SlotSender { tx }, SlotReceiver { rx })
}

/// Outcome of a non-blocking push into the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushResult {
    /// Slot was empty; the frame is now pending.
    Stored,
    /// Slot still held an unconsumed frame; the new frame was dropped.
    Dropped,
    /// Consumer end is gone.
    Closed,
}

/// Producer end, owned by the broker session.
pub struct SlotSender {
    tx: SyncSender<ScatterFrame>,
}

impl SlotSender {
    pub fn push(&self, frame: ScatterFrame) -> PushResult {
        match self.tx.try_send(frame) {
            Ok(()) => PushResult::Stored,
            Err(TrySendError::Full(_)) => PushResult::Dropped,
            Err(TrySendError::Disconnected(_)) => PushResult::Closed,
        }
    }
}

/// Consumer end, owned by the render loop.
pub struct SlotReceiver {
    rx: Receiver<ScatterFrame>,
}

impl SlotReceiver {
    /// Block until a frame is pending. `None` means the producer is gone.
    pub fn recv(&self) -> Option<ScatterFrame> {
        self.rx.recv().ok()
    }

    /// Bounded wait, for callers that cannot block forever.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ScatterFrame> {
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => Some(frame),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

/// Shared close signal, set by the GUI on window close and checked at the
/// top of each render loop iteration.
#[derive(Clone)]
pub struct CloseFlag(Arc<AtomicBool>);

impl CloseFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for CloseFlag {
    fn default() -> Self {
        Self::new()
    }
}

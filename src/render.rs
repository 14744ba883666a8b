//! Render-side state and the frame consumption loop.
//!
//! The loop owns the receive end of the hand-off slot and runs on its own
//! thread (or the main thread in headless mode). Each received frame is
//! folded into [`ScatterState`], which the GUI reads under a short lock.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::feed::{CloseFlag, ScatterFrame, SlotReceiver};

/// Pause after each applied frame so the GUI thread gets a turn.
const REDRAW_YIELD: Duration = Duration::from_millis(10);

/// Last-applied scatter data, shared between the render loop and the GUI.
///
/// Positions are replaced on every frame. Sizes and colors are replaced
/// only when the incoming frame carries them, so sparse feeds keep their
/// last appearance instead of flashing back to defaults.
#[derive(Debug, Default)]
pub struct ScatterState {
    pub coords: [Vec<f64>; 3],
    pub sizes: Vec<f64>,
    pub colors: Vec<[f64; 3]>,
    pub frames_applied: u64,
}

impl ScatterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of particles in the current frame.
    pub fn len(&self) -> usize {
        self.coords[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords[0].is_empty()
    }

    /// Fold one frame in: coordinates unconditionally, decorations only
    /// when present.
    pub fn apply(&mut self, frame: ScatterFrame) {
        self.coords = frame.coords;
        if let Some(sizes) = frame.sizes {
            self.sizes = sizes;
        }
        if let Some(colors) = frame.colors {
            self.colors = colors;
        }
        self.frames_applied += 1;
    }
}

/// Consume frames until the close flag is set or the producer goes away.
///
/// The close flag is checked at the top of each pass; the blocking wait on
/// the slot is the only other suspension point. A close request that
/// arrives mid-wait takes effect once the wait resolves, and the frame
/// that resolved it is still applied.
pub fn run_render_loop(
    frames: SlotReceiver,
    close: CloseFlag,
    scatter: Arc<Mutex<ScatterState>>,
    mut redraw: impl FnMut(),
) {
    info!("Render loop started");
    loop {
        if close.is_set() {
            break;
        }
        let Some(frame) = frames.recv() else {
            info!("Frame producer gone, render loop exiting");
            break;
        };
        {
            let mut scatter = scatter.lock();
            scatter.apply(frame);
            debug!(points = scatter.len(), frame = scatter.frames_applied, "Applied frame");
        }
        redraw();
        std::thread::sleep(REDRAW_YIELD);
    }
    info!("Render loop stopped");
}

/// Late-bound handle to the egui context, so the render thread can request
/// repaints once the GUI exists.
#[derive(Clone, Default)]
pub struct RepaintHandle(Arc<Mutex<Option<egui::Context>>>);

impl RepaintHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, ctx: egui::Context) {
        *self.0.lock() = Some(ctx);
    }

    pub fn request(&self) {
        if let Some(ctx) = self.0.lock().as_ref() {
            ctx.request_repaint();
        }
    }
}

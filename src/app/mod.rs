//! Live 3D scatter viewer
//!
//! The egui app that displays the particle feed. It holds read-side
//! handles only: the scatter state the render loop maintains, the broker
//! session state for the header, and the shared close flag it raises when
//! the window is going away.

mod header;
mod scatter;

use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use parking_lot::Mutex;
use tracing::info;

use crate::broker::SessionState;
use crate::feed::CloseFlag;
use crate::render::ScatterState;
use crate::theme::{colors, minimal_visuals};

/// Default camera: matplotlib's 3D view, azimuth -60 and elevation 30.
const DEFAULT_YAW: f32 = -std::f32::consts::FRAC_PI_3;
const DEFAULT_PITCH: f32 = std::f32::consts::FRAC_PI_6;

pub struct ViewerApp {
    /// Scatter data maintained by the render loop
    scatter: Arc<Mutex<ScatterState>>,
    /// Broker connection state (for the header)
    session: Arc<Mutex<SessionState>>,
    /// Close signal shared with the render loop and broker session
    close: CloseFlag,
    /// FPS counter
    pub(crate) fps_counter: header::FpsCounter,
    /// Camera yaw in radians
    pub(crate) yaw: f32,
    /// Camera pitch in radians
    pub(crate) pitch: f32,
    /// Spin the camera slowly when idle
    pub(crate) auto_rotate: bool,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        scatter: Arc<Mutex<ScatterState>>,
        session: Arc<Mutex<SessionState>>,
        close: CloseFlag,
    ) -> Self {
        cc.egui_ctx.set_visuals(minimal_visuals());

        Self {
            scatter,
            session,
            close,
            fps_counter: header::FpsCounter::new(),
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            auto_rotate: false,
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            info!("Viewer window closing");
            self.close.set();
        }

        // Repaint on a timer as well as on demand, so the header stays
        // live even when no frames arrive.
        ctx.request_repaint_after(Duration::from_millis(100));

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY).inner_margin(4.0))
            .show(ctx, |ui| {
                self.render_header(ui);
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(colors::BG_PRIMARY))
            .show(ctx, |ui| {
                self.render_scatter(ui);
            });
    }
}

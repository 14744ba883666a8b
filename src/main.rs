//! Native entry point for the particle feed viewer
//!
//! Run with: cargo run -- [--addr=HOST:PORT] [--headless]

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use particle_vis::app::ViewerApp;
use particle_vis::broker::BrokerClient;
use particle_vis::config::{Config, PARTICLE_TOPIC};
use particle_vis::feed::{frame_slot, CloseFlag};
use particle_vis::render::{run_render_loop, RepaintHandle, ScatterState};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,particle_vis=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let config = Config::from_env();
    info!(addr = %config.broker_addr, topic = PARTICLE_TOPIC, "Starting particle feed viewer");

    let (slot_tx, slot_rx) = frame_slot();
    let close = CloseFlag::new();
    let scatter = Arc::new(Mutex::new(ScatterState::new()));

    let broker = BrokerClient::connect(&config.broker_addr, slot_tx, close.clone());
    let session = broker.state();

    if config.headless {
        // No window: consume frames on the main thread until the feed ends.
        run_render_loop(slot_rx, close.clone(), scatter, || {});
        info!("Shutting down");
        broker.shutdown();
        return Ok(());
    }

    let repaint = RepaintHandle::new();
    let render = {
        let close = close.clone();
        let scatter = scatter.clone();
        let repaint = repaint.clone();
        std::thread::spawn(move || {
            run_render_loop(slot_rx, close, scatter, move || repaint.request())
        })
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_title("Particle Feed"),
        ..Default::default()
    };

    let app_close = close.clone();
    let result = eframe::run_native(
        "particle-vis",
        options,
        Box::new(move |cc| {
            repaint.install(cc.egui_ctx.clone());
            Ok(Box::new(ViewerApp::new(cc, scatter, session, app_close)))
        }),
    );

    info!("Shutting down");
    close.set();
    // Ending the broker session drops the slot sender, which releases a
    // render loop still blocked on its final wait.
    broker.shutdown();
    let _ = render.join();

    result?;
    Ok(())
}

// src/main.rs
use anyhow::{Context, Result};
use eframe::egui;
use hand_trails::app::HandTrailsApp;
use hand_trails::config::TrackerConfig;
use hand_trails::detector::{HandDetector, ReplayDetector, SimulatedDetector};
use tracing::info;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = TrackerConfig::load_or_default().context("Failed to load tracker config")?;

    let detector: Box<dyn HandDetector> = match &config.replay_path {
        Some(path) => {
            Box::new(ReplayDetector::open(path).context("Failed to open replay detections")?)
        }
        None => {
            info!("No replay file configured, using simulated hands");
            Box::new(SimulatedDetector::new())
        }
    };

    // Set up GUI options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        centered: true,
        ..Default::default()
    };

    eframe::run_native(
        "Hand Trails",
        options,
        Box::new(move |cc| Box::new(HandTrailsApp::new(cc, config, detector))),
    )
    .map_err(|e| anyhow::anyhow!("Error running application: {e}"))
}

// src/app.rs
use crate::config::TrackerConfig;
use crate::detector::HandDetector;
use crate::render::render_frame;
use crate::tracking::HandTracker;
use crate::ui::EguiSurface;

use eframe::egui;
use tracing::debug;

pub struct HandTrailsApp {
    tracker: HandTracker,
    detector: Box<dyn HandDetector>,
}

impl HandTrailsApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: TrackerConfig, detector: Box<dyn HandDetector>) -> Self {
        Self {
            tracker: HandTracker::new(config),
            detector,
        }
    }
}

impl eframe::App for HandTrailsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One detector frame per repaint
        let detections = self.detector.detect();
        let result = self.tracker.process_frame(&detections);

        if result.frame % 300 == 0 {
            debug!(
                "Frame {}: {} trail segments playing, opacity L={} R={}",
                result.frame,
                result.trail_frames.len(),
                result.opacity.left,
                result.opacity.right
            );
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let mut surface = EguiSurface::new(ui.painter(), rect);
                render_frame(&mut surface, &result, self.tracker.config());
            });

        // Request repaint for continuous updates
        ctx.request_repaint();
    }
}

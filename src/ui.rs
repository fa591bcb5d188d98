// src/ui.rs - egui painter as a render surface
use crate::render::{DrawCall, DrawStyle, RenderSurface};
use eframe::egui::{self, Color32, Pos2, Rect, Shape, Stroke};

pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    rect: Rect,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a egui::Painter, rect: Rect) -> Self {
        Self { painter, rect }
    }

    fn to_screen(&self, call: &DrawCall) -> Vec<Pos2> {
        let origin = self.rect.min + egui::vec2(call.offset[0], call.offset[1]);
        call.points
            .iter()
            .map(|&[x, y]| origin + egui::vec2(x, y))
            .collect()
    }
}

fn gray(level: u8, opacity: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(level, level, level, opacity.round().clamp(0.0, 255.0) as u8)
}

impl RenderSurface for EguiSurface<'_> {
    fn size(&self) -> [f32; 2] {
        [self.rect.width(), self.rect.height()]
    }

    fn clear(&mut self, rgb: [u8; 3]) {
        self.painter
            .rect_filled(self.rect, 0.0, Color32::from_rgb(rgb[0], rgb[1], rgb[2]));
    }

    fn draw_polygon(&mut self, call: &DrawCall) {
        let points = self.to_screen(call);
        let shape = match call.style {
            // Hull outlines are convex by construction
            DrawStyle::Filled { gray: level } => {
                Shape::convex_polygon(points, gray(level, call.opacity), Stroke::NONE)
            }
            DrawStyle::Outlined { gray: level, width } => {
                Shape::closed_line(points, Stroke::new(width, gray(level, call.opacity)))
            }
        };
        self.painter.add(shape);
    }
}

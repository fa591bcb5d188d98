// src/render.rs - Turns a tracking result into polygon draw calls
use crate::config::TrackerConfig;
use crate::geometry::giftwrap;
use crate::landmarks::{Keypoint, Side, WRIST};
use crate::tracking::TrackingResult;

pub const BACKGROUND_RGB: [u8; 3] = [1, 25, 96];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawStyle {
    Filled { gray: u8 },
    Outlined { gray: u8, width: f32 },
}

/// One closed polygon. The surface translates by `offset` before drawing `points`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub points: Vec<[f32; 2]>,
    pub offset: [f32; 2],
    pub opacity: f32,
    pub style: DrawStyle,
}

/// Anything that can draw closed polygons, e.g. an egui painter.
pub trait RenderSurface {
    fn size(&self) -> [f32; 2];
    fn clear(&mut self, rgb: [u8; 3]);
    fn draw_polygon(&mut self, call: &DrawCall);
}

/// Hull outline of `pose` relative to its wrist, anchored at the wrist
/// scaled from detector space to the canvas.
pub fn hull_call(
    pose: &[Keypoint],
    canvas: [f32; 2],
    config: &TrackerConfig,
    opacity: f32,
    style: DrawStyle,
) -> Option<DrawCall> {
    let wrist = pose.get(WRIST)?;
    let points = giftwrap(pose)
        .into_iter()
        .map(|i| [(pose[i].x - wrist.x) as f32, (pose[i].y - wrist.y) as f32])
        .collect();

    Some(DrawCall {
        points,
        offset: [
            wrist.x as f32 * canvas[0] / config.source_width,
            wrist.y as f32 * canvas[1] / config.source_height,
        ],
        opacity,
        style,
    })
}

/// Left hand, right hand, then every playing trail segment.
pub fn compose_frame(result: &TrackingResult, canvas: [f32; 2], config: &TrackerConfig) -> Vec<DrawCall> {
    let mut calls = Vec::with_capacity(2 + result.trail_frames.len());

    for side in Side::BOTH {
        let opacity = result.opacity[side];
        if opacity <= 0.0 {
            continue;
        }

        let style = if side != config.trail_side {
            DrawStyle::Filled { gray: 255 }
        } else if result.front[side] {
            DrawStyle::Filled { gray: 100 }
        } else {
            DrawStyle::Outlined { gray: 255, width: 1.0 }
        };

        calls.extend(hull_call(&result.displayed[side], canvas, config, opacity, style));
    }

    for pose in &result.trail_frames {
        calls.extend(hull_call(pose, canvas, config, 255.0, DrawStyle::Filled { gray: 255 }));
    }

    calls
}

pub fn render_frame(surface: &mut impl RenderSurface, result: &TrackingResult, config: &TrackerConfig) {
    surface.clear(BACKGROUND_RGB);
    for call in compose_frame(result, surface.size(), config) {
        surface.draw_polygon(&call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{Handpose, PerSide};

    #[derive(Default)]
    struct RecordingSurface {
        cleared: Option<[u8; 3]>,
        calls: Vec<DrawCall>,
    }

    impl RenderSurface for RecordingSurface {
        fn size(&self) -> [f32; 2] {
            [1200.0, 800.0]
        }

        fn clear(&mut self, rgb: [u8; 3]) {
            self.cleared = Some(rgb);
        }

        fn draw_polygon(&mut self, call: &DrawCall) {
            self.calls.push(call.clone());
        }
    }

    fn triangle(x: f64) -> Handpose {
        vec![Keypoint::new(x, 100.0), Keypoint::new(x + 10.0, 0.0), Keypoint::new(x - 10.0, 0.0)]
    }

    #[test]
    fn test_offset_scales_wrist_to_canvas() {
        let config = TrackerConfig::default();
        let call = hull_call(&triangle(300.0), [1200.0, 800.0], &config, 255.0, DrawStyle::Filled { gray: 255 })
            .unwrap();
        assert_eq!(call.offset, [600.0, 200.0]);
        assert_eq!(call.points.len(), 3);
        assert!(call.points.contains(&[0.0, 0.0]));
        assert!(call.points.contains(&[10.0, -100.0]));
    }

    #[test]
    fn test_empty_pose_draws_nothing() {
        let config = TrackerConfig::default();
        assert!(hull_call(&[], [10.0, 10.0], &config, 255.0, DrawStyle::Filled { gray: 255 }).is_none());
    }

    #[test]
    fn test_compose_order_and_styles() {
        let config = TrackerConfig::default();
        let result = TrackingResult {
            displayed: PerSide::new(triangle(50.0), triangle(200.0)),
            front: PerSide::new(false, false),
            opacity: PerSide::new(127.5, 51.0),
            trail_frames: vec![triangle(10.0), triangle(20.0)],
            ..TrackingResult::default()
        };

        let mut surface = RecordingSurface::default();
        render_frame(&mut surface, &result, &config);

        assert_eq!(surface.cleared, Some(BACKGROUND_RGB));
        assert_eq!(surface.calls.len(), 4);
        assert_eq!(surface.calls[0].style, DrawStyle::Filled { gray: 255 });
        assert_eq!(surface.calls[0].opacity, 127.5);
        assert_eq!(surface.calls[1].style, DrawStyle::Outlined { gray: 255, width: 1.0 });
        assert_eq!(surface.calls[2].opacity, 255.0);
    }

    #[test]
    fn test_faded_out_hand_is_skipped() {
        let config = TrackerConfig::default();
        let result = TrackingResult {
            displayed: PerSide::new(triangle(50.0), Vec::new()),
            opacity: PerSide::new(0.0, 0.0),
            ..TrackingResult::default()
        };
        assert!(compose_frame(&result, [100.0, 100.0], &config).is_empty());
    }
}

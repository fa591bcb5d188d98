// src/tracking.rs - Per-frame hand stabilisation: normalize, smooth, fade, record
use crate::config::{TrackerConfig, Weighting};
use crate::geometry::is_front;
use crate::landmarks::{HandDetection, Handpose, Keypoint, PerSide, Side};
use crate::trails::{TrailEvent, TrailRecorder};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Picks at most one pose per side from the raw detector output.
///
/// Non-finite detections and those scoring below `confidence_threshold` are
/// dropped. Among the rest the highest score wins, first seen on ties.
pub fn normalize_hands(detections: &[HandDetection], confidence_threshold: f64) -> PerSide<Handpose> {
    let mut best: PerSide<Option<&HandDetection>> = PerSide::default();

    for (i, detection) in detections.iter().enumerate() {
        if !detection.is_finite() {
            warn!("Dropping detection {} ({:?}): non-finite values", i, detection.handedness);
            continue;
        }
        if detection.score < confidence_threshold {
            continue;
        }

        let side = detection.handedness;
        if best[side].map_or(true, |current| detection.score > current.score) {
            best[side] = Some(detection);
        }
    }

    PerSide::from_fn(|side| best[side].map(|d| d.keypoints.clone()).unwrap_or_default())
}

/// Bounded window of the most recent poses for one side, oldest first.
#[derive(Debug, Clone)]
pub struct HandHistory {
    capacity: usize,
    entries: VecDeque<Handpose>,
}

impl HandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Appends a pose (empty for "no hand") and evicts the oldest on overflow.
    pub fn push(&mut self, pose: Handpose) {
        self.entries.push_back(pose);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&Handpose> {
        self.entries.back()
    }

    /// Recency-weighted average of the window, index by index.
    ///
    /// Empty when the newest entry is empty. Each index is averaged over the
    /// entries that have it, accumulated as offsets from the newest sample
    /// so a constant window reproduces its input exactly.
    pub fn smooth(&self, weighting: Weighting) -> Handpose {
        let Some(latest) = self.entries.back().filter(|pose| !pose.is_empty()) else {
            return Vec::new();
        };

        let len = self.entries.len();
        let weights: Vec<f64> = (0..len)
            .map(|pos| recency_weight(weighting, len - 1 - pos, len))
            .collect();

        latest
            .iter()
            .enumerate()
            .map(|(k, reference)| {
                let mut dx = 0.0;
                let mut dy = 0.0;
                let mut dz = 0.0;
                let mut weight_sum = 0.0;
                let mut z_weight_sum = 0.0;

                for (pose, &weight) in self.entries.iter().zip(&weights) {
                    let Some(point) = pose.get(k) else {
                        continue;
                    };
                    dx += weight * (point.x - reference.x);
                    dy += weight * (point.y - reference.y);
                    weight_sum += weight;

                    if let (Some(z), Some(ref_z)) = (point.z, reference.z) {
                        dz += weight * (z - ref_z);
                        z_weight_sum += weight;
                    }
                }

                // The newest entry always contributes, so weight_sum > 0
                Keypoint {
                    x: reference.x + dx / weight_sum,
                    y: reference.y + dy / weight_sum,
                    z: reference.z.map(|z| z + dz / z_weight_sum),
                }
            })
            .collect()
    }
}

fn recency_weight(weighting: Weighting, age: usize, len: usize) -> f64 {
    match weighting {
        Weighting::Linear => (len - age) as f64,
        Weighting::Exponential { decay } => decay.powi(age as i32),
    }
}

/// Opacity that eases toward 255 while present and toward 0 while absent.
#[derive(Debug, Clone, Copy)]
pub struct PresenceFader {
    opacity: f32,
    step: f32,
}

impl PresenceFader {
    pub fn new(step: f32) -> Self {
        Self { opacity: 0.0, step }
    }

    pub fn with_opacity(step: f32, opacity: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 255.0),
            step,
        }
    }

    pub fn step(&mut self, present: bool) -> f32 {
        self.opacity = if present {
            (self.opacity + self.step).min(255.0)
        } else {
            (self.opacity - self.step).max(0.0)
        };
        self.opacity
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct TrackingResult {
    pub frame: u64,
    /// Smoothed pose per side, empty when the hand is absent this frame.
    pub hands: PerSide<Handpose>,
    /// Last pose seen per side, kept so a vanished hand can fade out.
    pub displayed: PerSide<Handpose>,
    pub front: PerSide<bool>,
    pub opacity: PerSide<f32>,
    /// One pose per playing trail segment, oldest segment first.
    pub trail_frames: Vec<Handpose>,
    pub trail_event: TrailEvent,
}

/// Session state for the whole visualisation, advanced once per frame.
pub struct HandTracker {
    config: TrackerConfig,
    history: PerSide<HandHistory>,
    faders: PerSide<PresenceFader>,
    last_seen: PerSide<Handpose>,
    trails: TrailRecorder,
    frame_counter: u64,
}

impl HandTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let step = config.fade_step();
        Self {
            history: PerSide::from_fn(|_| HandHistory::new(config.history_size)),
            faders: PerSide::from_fn(|_| PresenceFader::new(step)),
            last_seen: PerSide::default(),
            trails: TrailRecorder::new(config.min_segment_frames, config.max_closed_segments),
            frame_counter: 0,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn history(&self, side: Side) -> &HandHistory {
        &self.history[side]
    }

    pub fn trails(&self) -> &TrailRecorder {
        &self.trails
    }

    pub fn process_frame(&mut self, detections: &[HandDetection]) -> TrackingResult {
        self.frame_counter += 1;
        let raw = normalize_hands(detections, self.config.confidence_threshold);

        let mut result = TrackingResult {
            frame: self.frame_counter,
            ..TrackingResult::default()
        };

        for side in Side::BOTH {
            let history = &mut self.history[side];
            history.push(raw[side].clone());
            let smoothed = history.smooth(self.config.weighting);

            let present = !smoothed.is_empty();
            result.opacity[side] = self.faders[side].step(present);

            if present {
                self.last_seen[side] = smoothed.clone();
            }
            result.front[side] = is_front(&self.last_seen[side], side);
            result.displayed[side] = self.last_seen[side].clone();
            result.hands[side] = smoothed;
        }

        let side = self.config.trail_side;
        let front = !result.hands[side].is_empty() && result.front[side];
        result.trail_event = self.trails.record(&result.hands[side], front);
        if result.trail_event == TrailEvent::Closed {
            debug!(
                "Frame {}: closed trail segment ({} playable)",
                self.frame_counter,
                self.trails.closed_len()
            );
        }

        result.trail_frames = self.trails.play();
        result
    }
}

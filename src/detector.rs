// src/detector.rs - Upstream hand detector sources (simulated or replayed from disk)
use crate::error::DetectorError;
use crate::landmarks::{
    HandDetection, Keypoint, Side, HAND_LANDMARK_COUNT, INDEX_MCP, MIDDLE_MCP, PINKY_MCP, RING_MCP, THUMB_CMC,
};
use std::path::Path;
use tracing::{info, warn};

/// Produces the raw detections for one frame.
pub trait HandDetector {
    fn detect(&mut self) -> Vec<HandDetection>;
}

/// Offsets from the wrist for a right palm facing the camera, fingers up,
/// in 600x400 detector pixels. Fingers are four joints each, base first.
fn right_palm_template() -> [(f64, f64); HAND_LANDMARK_COUNT] {
    let mut template = [(0.0, 0.0); HAND_LANDMARK_COUNT];
    let fingers: [(usize, f64, f64, f64); 5] = [
        // (base index, base x, base y, direction x per joint)
        (THUMB_CMC, 18.0, -12.0, 10.0),
        (INDEX_MCP, 22.0, -55.0, 2.0),
        (MIDDLE_MCP, 6.0, -60.0, 0.0),
        (RING_MCP, -10.0, -57.0, -2.0),
        (PINKY_MCP, -24.0, -50.0, -4.0),
    ];

    for (base, x, y, dx) in fingers {
        let joint_length = if base == THUMB_CMC { 12.0 } else { 16.0 };
        for joint in 0..4 {
            let j = joint as f64;
            template[base + joint] = (x + dx * j, y - joint_length * j);
        }
    }
    template
}

/// Deterministic stand-in for a camera detector. The right hand sweeps
/// across the frame and slowly turns over; the left hand comes and goes.
pub struct SimulatedDetector {
    sim_time: f64,
    template: [(f64, f64); HAND_LANDMARK_COUNT],
}

impl Default for SimulatedDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDetector {
    pub fn new() -> Self {
        Self {
            sim_time: 0.0,
            template: right_palm_template(),
        }
    }

    fn hand(&self, side: Side, wrist: (f64, f64), turn: f64, jitter: f64) -> HandDetection {
        // A left palm is the right palm mirrored around the wrist
        let mirror = match side {
            Side::Right => 1.0,
            Side::Left => -1.0,
        };
        let keypoints = self
            .template
            .iter()
            .enumerate()
            .map(|(i, &(dx, dy))| {
                let noise = jitter * ((i as f64 * 12.9898 + self.sim_time * 78.233).sin());
                Keypoint {
                    x: wrist.0 + mirror * turn * dx + noise,
                    y: wrist.1 + dy - noise,
                    z: Some(0.0),
                }
            })
            .collect();

        HandDetection {
            handedness: side,
            score: 0.9,
            keypoints,
        }
    }
}

impl HandDetector for SimulatedDetector {
    fn detect(&mut self) -> Vec<HandDetection> {
        let t = self.sim_time;
        self.sim_time += 0.033;

        let mut detections = Vec::with_capacity(2);

        // Palm turns away and back every ~12 seconds
        let turn = (t * 0.5).cos();
        detections.push(self.hand(
            Side::Right,
            (380.0 + 120.0 * (t * 0.7).sin(), 260.0 + 60.0 * (t * 1.1).cos()),
            turn,
            1.5,
        ));

        if (t * 0.2).sin() > -0.3 {
            detections.push(self.hand(
                Side::Left,
                (180.0 + 40.0 * (t * 0.4).cos(), 280.0 + 30.0 * t.sin()),
                1.0,
                1.5,
            ));
        }

        detections
    }
}

/// Replays detector output recorded as JSON Lines, one array of detections
/// per line, looping at the end. Blank or unparsable lines are empty frames.
pub struct ReplayDetector {
    frames: Vec<Vec<HandDetection>>,
    next: usize,
}

impl ReplayDetector {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DetectorError> {
        let path = path.as_ref().to_path_buf();
        let contents = std::fs::read_to_string(&path).map_err(|source| DetectorError::Read {
            path: path.clone(),
            source,
        })?;
        let frames = Self::parse_frames(&path, &contents);
        if frames.is_empty() {
            return Err(DetectorError::Empty(path));
        }

        info!("Loaded {} replay frames from {}", frames.len(), path.display());
        Ok(Self { frames, next: 0 })
    }

    pub fn parse_frames(path: &Path, contents: &str) -> Vec<Vec<HandDetection>> {
        contents
            .lines()
            .enumerate()
            .map(|(line_no, line)| {
                let line = line.trim();
                if line.is_empty() {
                    return Vec::new();
                }
                serde_json::from_str(line).unwrap_or_else(|e| {
                    warn!("{}:{}: skipping unparsable frame: {}", path.display(), line_no + 1, e);
                    Vec::new()
                })
            })
            .collect()
    }
}

impl HandDetector for ReplayDetector {
    fn detect(&mut self) -> Vec<HandDetection> {
        let frame = self.frames[self.next].clone();
        self.next = (self.next + 1) % self.frames.len();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::is_front;

    #[test]
    fn test_simulated_right_hand_starts_front_facing() {
        let mut detector = SimulatedDetector::new();
        let frame = detector.detect();
        let right = frame.iter().find(|d| d.handedness == Side::Right).unwrap();
        assert_eq!(right.keypoints.len(), HAND_LANDMARK_COUNT);
        assert!(is_front(&right.keypoints, Side::Right));

        let left = frame.iter().find(|d| d.handedness == Side::Left).unwrap();
        assert!(is_front(&left.keypoints, Side::Left));
    }

    #[test]
    fn test_simulated_right_hand_turns_over() {
        let mut detector = SimulatedDetector::new();
        // cos(t / 2) < 0 once t passes pi
        let frames: Vec<_> = (0..200).map(|_| detector.detect()).collect();
        let last = frames.last().unwrap();
        let right = last.iter().find(|d| d.handedness == Side::Right).unwrap();
        assert!(!is_front(&right.keypoints, Side::Right));
    }

    #[test]
    fn test_replay_parses_and_loops() {
        let contents = concat!(
            r#"[{"handedness": "Left", "score": 0.8, "keypoints": [{"x": 1, "y": 2}]}]"#,
            "\n\nnot json\n",
            r#"[]"#,
        );
        let frames = ReplayDetector::parse_frames(Path::new("inline.jsonl"), contents);
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0][0].handedness, Side::Left);
        assert!(frames[1].is_empty());
        assert!(frames[2].is_empty());

        let mut detector = ReplayDetector { frames, next: 0 };
        assert_eq!(detector.detect().len(), 1);
        for _ in 0..3 {
            detector.detect();
        }
        assert_eq!(detector.detect().len(), 1);
    }

    #[test]
    fn test_replay_missing_file() {
        let err = ReplayDetector::open("/nonexistent/hand_trails/replay.jsonl").err().unwrap();
        assert!(matches!(err, DetectorError::Read { .. }));
    }
}

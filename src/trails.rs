// src/trails.rs - Records palm-forward motion into segments and loops them
use crate::landmarks::{Handpose, Keypoint};
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailEvent {
    #[default]
    None,
    Appended,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailState {
    Idle,
    Recording,
}

/// A completed run of front-facing poses with its own playback cursor.
#[derive(Debug, Clone)]
pub struct TrailSegment {
    frames: Vec<Handpose>,
    cursor: usize,
}

impl TrailSegment {
    pub fn frames(&self) -> &[Handpose] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn advance(&mut self) -> &Handpose {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.frames.len();
        &self.frames[index]
    }
}

/// Open segment plus the closed segments available for playback.
///
/// The hand disappearing closes the open segment just like turning the palm
/// away does, so a recorded gesture starts looping as soon as it ends.
#[derive(Debug, Clone)]
pub struct TrailRecorder {
    open: Vec<Handpose>,
    closed: VecDeque<TrailSegment>,
    min_segment_frames: usize,
    max_closed_segments: usize,
}

impl TrailRecorder {
    pub fn new(min_segment_frames: usize, max_closed_segments: usize) -> Self {
        Self {
            open: Vec::new(),
            closed: VecDeque::new(),
            min_segment_frames,
            max_closed_segments: max_closed_segments.max(1),
        }
    }

    pub fn state(&self) -> TrailState {
        if self.open.is_empty() {
            TrailState::Idle
        } else {
            TrailState::Recording
        }
    }

    pub fn open_len(&self) -> usize {
        self.open.len()
    }

    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    pub fn closed_segments(&self) -> impl Iterator<Item = &TrailSegment> {
        self.closed.iter()
    }

    /// Feeds one frame. An empty `pose` means the hand is absent.
    pub fn record(&mut self, pose: &[Keypoint], front: bool) -> TrailEvent {
        if !pose.is_empty() && front {
            self.open.push(pose.to_vec());
            return TrailEvent::Appended;
        }

        if self.open.is_empty() {
            return TrailEvent::None;
        }

        self.close_open_segment();
        TrailEvent::Closed
    }

    fn close_open_segment(&mut self) {
        let frames = std::mem::take(&mut self.open);
        debug!("Closing trail segment with {} frames", frames.len());
        self.closed.push_back(TrailSegment { frames, cursor: 0 });

        while self.closed.len() > self.max_closed_segments {
            if let Some(evicted) = self.closed.pop_front() {
                debug!("Evicting oldest trail segment ({} frames)", evicted.len());
            }
        }
    }

    /// Returns the current pose of every playable segment and advances each
    /// segment's cursor by one. The open segment is never played.
    pub fn play(&mut self) -> Vec<Handpose> {
        let min_frames = self.min_segment_frames;
        self.closed
            .iter_mut()
            .filter(|segment| segment.len() > min_frames)
            .map(|segment| segment.advance().clone())
            .collect()
    }
}

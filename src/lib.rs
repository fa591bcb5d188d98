// src/lib.rs
//! Turns noisy per-frame hand-landmark detections into smoothed hull
//! outlines and loops recorded palm-forward motion as ghost trails.

pub mod app;
pub mod config;
pub mod detector;
pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod render;
pub mod tracking;
pub mod trails;
pub mod ui;

pub use config::{TrackerConfig, Weighting};
pub use landmarks::{HandDetection, Handpose, Keypoint, PerSide, Side};
pub use tracking::{HandTracker, TrackingResult};

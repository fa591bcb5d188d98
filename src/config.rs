// src/config.rs - Tracker settings, loadable from JSON
use crate::error::ConfigError;
use crate::landmarks::Side;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const CONFIG_ENV_VAR: &str = "HAND_TRAILS_CONFIG";

/// How the smoothing filter weights history entries by recency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Weighting {
    /// The entry at window position i (oldest first) gets weight i + 1.
    /// Empty entries keep their position but contribute nothing.
    Linear,
    /// The newest entry gets weight 1, each older one is multiplied by `decay`.
    Exponential { decay: f64 },
}

impl Default for Weighting {
    fn default() -> Self {
        Weighting::Linear
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub history_size: usize,
    pub weighting: Weighting,
    pub confidence_threshold: f64,
    pub fade_frames: u32,
    pub min_segment_frames: usize,
    pub max_closed_segments: usize,
    pub trail_side: Side,
    pub source_width: f32,
    pub source_height: f32,
    pub replay_path: Option<PathBuf>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_size: 5,
            weighting: Weighting::Linear,
            confidence_threshold: 0.0,
            fade_frames: 10,
            min_segment_frames: 0,
            max_closed_segments: 64,
            trail_side: Side::Right,
            source_width: 600.0,
            source_height: 400.0,
            replay_path: None,
        }
    }
}

impl TrackerConfig {
    pub fn from_json(path: &Path, json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(path, &json)
    }

    /// Loads from `$HAND_TRAILS_CONFIG`, then the per-user config dir, falling
    /// back to defaults when neither file exists.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            info!("Loading config from {}", Path::new(&path).display());
            return Self::load(path);
        }

        if let Some(path) = default_config_path().filter(|p| p.exists()) {
            info!("Loading config from {}", path.display());
            return Self::load(path);
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fade_frames == 0 {
            return Err(ConfigError::Invalid {
                field: "fade_frames",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_closed_segments == 0 {
            return Err(ConfigError::Invalid {
                field: "max_closed_segments",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(self.source_width > 0.0 && self.source_height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "source_width/source_height",
                reason: format!("must be positive, got {}x{}", self.source_width, self.source_height),
            });
        }
        if let Weighting::Exponential { decay } = self.weighting {
            if !(decay > 0.0 && decay <= 1.0) {
                return Err(ConfigError::Invalid {
                    field: "weighting.decay",
                    reason: format!("must be in (0, 1], got {decay}"),
                });
            }
        }
        if !self.confidence_threshold.is_finite() {
            return Err(ConfigError::Invalid {
                field: "confidence_threshold",
                reason: "must be finite".to_string(),
            });
        }
        Ok(())
    }

    /// Opacity change per frame, 255 / fade_frames.
    pub fn fade_step(&self) -> f32 {
        255.0 / self.fade_frames as f32
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "handtrails", "HandTrails")
        .map(|dirs| dirs.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TrackerConfig::from_json(
            Path::new("inline.json"),
            r#"{"history_size": 8, "weighting": {"kind": "exponential", "decay": 0.5}}"#,
        )
        .unwrap();
        assert_eq!(config.history_size, 8);
        assert_eq!(config.weighting, Weighting::Exponential { decay: 0.5 });
        assert_eq!(config.fade_frames, 10);
        assert_eq!(config.trail_side, Side::Right);
    }

    #[test]
    fn test_rejects_zero_fade_frames() {
        let err = TrackerConfig::from_json(Path::new("inline.json"), r#"{"fade_frames": 0}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fade_frames", .. }));
    }

    #[test]
    fn test_rejects_bad_decay() {
        let config = TrackerConfig {
            weighting: Weighting::Exponential { decay: 1.5 },
            ..TrackerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_carries_path() {
        let err = TrackerConfig::from_json(Path::new("broken.json"), "{").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_default_fade_step() {
        assert_eq!(TrackerConfig::default().fade_step(), 25.5);
    }
}

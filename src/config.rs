use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Knobs for the map loaders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Fail with [`MapError::MultipleLayers`](crate::MapError::MultipleLayers)
    /// when the map has more than one tile layer.
    pub single_layer: bool,
}

/// Timing and speed of the tile-walk controller.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct WalkConfig {
    /// Seconds between input samples while waiting.
    pub poll_interval: f32,
    /// Seconds between interpolation steps while walking.
    pub step_interval: f32,
    /// Pixels moved per interpolation step.
    pub step_pixels: i32,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            poll_interval: 0.1,
            step_interval: 1.0 / 60.0,
            step_pixels: 4,
        }
    }
}

impl WalkConfig {
    /// Reject non-positive intervals and steps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.poll_interval > 0.0) || !(self.step_interval > 0.0) {
            return Err(ConfigError::Invalid("walk intervals must be positive".into()));
        }
        if self.step_pixels <= 0 {
            return Err(ConfigError::Invalid("step_pixels must be positive".into()));
        }
        Ok(())
    }
}

/// Demo-level configuration, usually read from a JSON file next to the assets.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Map loader options.
    pub load: LoadOptions,
    /// Entity walk timing.
    pub walk: WalkConfig,
    /// Seconds per pixel of camera scroll.
    pub scroll_interval: f32,
    /// Integer camera scale factor.
    pub scale: u32,
    /// Resampling used when `scale > 1`.
    pub scale_algorithm: crate::ScaleAlgorithm,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            walk: WalkConfig::default(),
            scroll_interval: 1.0 / 120.0,
            scale: 1,
            scale_algorithm: crate::ScaleAlgorithm::Nearest,
        }
    }
}

impl Config {
    /// Parse and validate a JSON document; missing keys take their defaults.
    pub fn from_json_str(txt: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_json::from_str(txt)?;
        cfg.walk.validate()?;
        if !(cfg.scroll_interval > 0.0) {
            return Err(ConfigError::Invalid("scroll_interval must be positive".into()));
        }
        if cfg.scale == 0 {
            return Err(ConfigError::Invalid("scale must be at least 1".into()));
        }
        Ok(cfg)
    }

    /// Read and validate a JSON config file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let txt = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&txt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg = Config::from_json_str(r#"{ "walk": { "step_pixels": 2 } }"#).expect("parse");
        assert_eq!(cfg.walk.step_pixels, 2);
        assert_eq!(cfg.walk.poll_interval, 0.1);
        assert!(!cfg.load.single_layer);
        assert_eq!(cfg.scale, 1);
    }

    #[test]
    fn parses_scale_algorithm_names() {
        let cfg = Config::from_json_str(r#"{ "scale": 2, "scale_algorithm": "scale2x" }"#)
            .expect("parse");
        assert_eq!(cfg.scale_algorithm, crate::ScaleAlgorithm::Scale2x);
    }

    #[test]
    fn rejects_non_positive_timings() {
        let err = Config::from_json_str(r#"{ "walk": { "step_interval": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = Config::from_json_str(r#"{ "scale": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::domain::transform_parameters::ParameterRanges;
use crate::shared::constants::{
    DEFAULT_CHUNK_MS, DEFAULT_FADE_MS, DEFAULT_GAIN_RANGE, DEFAULT_ORIGINAL_GAIN_DB,
    DEFAULT_PITCH_RANGE, DEFAULT_REVERB_RANGE, DEFAULT_SPEED_RANGE,
};
use crate::shared::error::WarpError;

/// Run configuration for one warp invocation.
///
/// Every field has a default so a JSON file only needs to name the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpConfig {
    pub chunk_ms: u64,
    pub pitch_range: (f64, f64),
    pub speed_range: (f64, f64),
    pub speed_clamp: Option<(f64, f64)>,
    pub reverb_range: (i32, i32),
    pub gain_range: (i32, i32),
    pub original_gain_db: f64,
    pub fade_ms: u64,
    pub seed: Option<u64>,
    pub threads: usize,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            chunk_ms: DEFAULT_CHUNK_MS,
            pitch_range: DEFAULT_PITCH_RANGE,
            speed_range: DEFAULT_SPEED_RANGE,
            speed_clamp: None,
            reverb_range: DEFAULT_REVERB_RANGE,
            gain_range: DEFAULT_GAIN_RANGE,
            original_gain_db: DEFAULT_ORIGINAL_GAIN_DB,
            fade_ms: DEFAULT_FADE_MS,
            seed: None,
            threads: 1,
        }
    }
}

impl WarpConfig {
    pub fn load(path: &Path) -> Result<Self, WarpError> {
        let json = fs::read_to_string(path).map_err(|e| WarpError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json)
            .map_err(|e| WarpError::Config(format!("{}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> Result<(), WarpError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| WarpError::Config(e.to_string()))?;
        fs::write(path, json).map_err(|e| WarpError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(&self) -> Result<(), WarpError> {
        if self.chunk_ms == 0 {
            return Err(WarpError::invalid("chunk duration must be positive"));
        }
        self.parameter_ranges().validate()?;
        if !self.original_gain_db.is_finite() {
            return Err(WarpError::invalid("original gain must be finite"));
        }
        if self.threads == 0 {
            return Err(WarpError::invalid("thread count must be at least 1"));
        }
        Ok(())
    }

    pub fn parameter_ranges(&self) -> ParameterRanges {
        ParameterRanges {
            pitch: self.pitch_range,
            speed: self.speed_range,
            speed_clamp: self.speed_clamp,
            reverb: self.reverb_range,
            gain: self.gain_range,
        }
    }
}

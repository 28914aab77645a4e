//! Engine configuration.

use crate::error::{ConfigError, ConfigResult};
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::scheduler::DEFAULT_TARGET_FPS;
use crate::snap::{GRID_SIZE, SNAP_THRESHOLD};
use crate::transform::MIN_ELEMENT_SIZE;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Width of the virtual slide surface in canvas pixels.
pub const CANVAS_WIDTH: f64 = 960.0;
/// Height of the virtual slide surface in canvas pixels.
pub const CANVAS_HEIGHT: f64 = 540.0;

/// Constructor-time settings for [`DragEngine`](crate::DragEngine).
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid pitch used by the grid snap family.
    pub grid_size: f64,
    /// Base snap distance, scaled per candidate by its strength.
    pub snap_threshold: f64,
    /// Maximum number of provisional renders per second.
    pub target_fps: u32,
    /// Number of slide snapshots kept for undo.
    pub history_capacity: usize,
    /// Size of the fixed virtual canvas, centered inside its container.
    pub canvas_size: Size,
    /// Smallest width/height a resize may produce.
    pub min_size: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            snap_threshold: SNAP_THRESHOLD,
            target_fps: DEFAULT_TARGET_FPS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            canvas_size: Size::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            min_size: MIN_ELEMENT_SIZE,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to pretty-printed JSON.
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every numeric setting is usable.
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("grid_size", self.grid_size)?;
        check_positive("snap_threshold", self.snap_threshold)?;
        check_positive("target_fps", f64::from(self.target_fps))?;
        check_positive("history_capacity", self.history_capacity as f64)?;
        check_positive("canvas_size.width", self.canvas_size.width)?;
        check_positive("canvas_size.height", self.canvas_size.height)?;
        check_positive("min_size", self.min_size)?;
        Ok(())
    }

    /// Length of one render window at the target frame rate.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.target_fps.max(1)))
    }
}

fn check_positive(field: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        log::warn!("Rejected config value {} = {}", field, value);
        Err(ConfigError::InvalidValue { field, value })
    }
}

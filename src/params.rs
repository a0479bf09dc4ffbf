//! Gait parameter defaults — reads an optional JSON file for per-task tuning.
//!
//! The planner hands the task a flat parameter vector ordered by the model's
//! named parameter table; this module provides the default values for that
//! vector and a loader with missing-file fallback.

use serde::Deserialize;
use std::path::Path;

use crate::error::{Result, TaskError};
use crate::model::TaskModel;

/// Canonical scalar parameter names, in the order the fixture and the task
/// XML declare them.
pub const PARAM_NAMES: [&str; 10] = [
    "Amplitude_y",
    "Amplitude_z",
    "Frequency_y",
    "Frequency_z",
    "Phase_y",
    "Phase_z",
    "Offset_y",
    "Offset_z",
    "Tilt_ratio",
    "Velocity",
];

/// Gait/sway parameter defaults, loadable from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct GaitDefaults {
    /// Lateral gait amplitude in meters.
    #[serde(default = "default_amplitude_y")]
    pub amplitude_y: f64,
    /// Vertical gait amplitude in meters.
    #[serde(default = "default_amplitude_z")]
    pub amplitude_z: f64,
    /// Lateral gait frequency in Hz.
    #[serde(default = "default_frequency")]
    pub frequency_y: f64,
    /// Vertical gait frequency in Hz.
    #[serde(default = "default_frequency")]
    pub frequency_z: f64,
    /// Lateral gait phase in radians.
    #[serde(default)]
    pub phase_y: f64,
    /// Vertical gait phase in radians.
    #[serde(default)]
    pub phase_z: f64,
    /// Constant lateral gait offset in meters.
    #[serde(default)]
    pub offset_y: f64,
    /// Constant vertical gait offset in meters.
    #[serde(default)]
    pub offset_z: f64,
    /// Scale on the steering-error-derived pose tilt.
    #[serde(default = "default_tilt_ratio")]
    pub tilt_ratio: f64,
    /// Target longitudinal board speed in m/s.
    #[serde(default = "default_velocity")]
    pub velocity: f64,
}

fn default_amplitude_y() -> f64 {
    0.05
}

fn default_amplitude_z() -> f64 {
    0.08
}

fn default_frequency() -> f64 {
    1.0
}

fn default_tilt_ratio() -> f64 {
    1.0
}

fn default_velocity() -> f64 {
    1.5
}

impl Default for GaitDefaults {
    fn default() -> Self {
        Self {
            amplitude_y: default_amplitude_y(),
            amplitude_z: default_amplitude_z(),
            frequency_y: default_frequency(),
            frequency_z: default_frequency(),
            phase_y: 0.0,
            phase_z: 0.0,
            offset_y: 0.0,
            offset_z: 0.0,
            tilt_ratio: default_tilt_ratio(),
            velocity: default_velocity(),
        }
    }
}

impl GaitDefaults {
    /// Load defaults from a JSON file. Falls back to built-in defaults if
    /// the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Gait config not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| TaskError::InvalidConfig {
            reason: format!("failed to read {}: {e}", path.display()),
        })?;

        serde_json::from_str(&contents).map_err(|e| TaskError::InvalidConfig {
            reason: format!("failed to parse {}: {e}", path.display()),
        })
    }

    /// Build the flat parameter vector ordered by the model's parameter
    /// table.
    pub fn values(&self, model: &TaskModel) -> Result<Vec<f64>> {
        model
            .param_names
            .iter()
            .map(|name| match name.as_str() {
                "Amplitude_y" => Ok(self.amplitude_y),
                "Amplitude_z" => Ok(self.amplitude_z),
                "Frequency_y" => Ok(self.frequency_y),
                "Frequency_z" => Ok(self.frequency_z),
                "Phase_y" => Ok(self.phase_y),
                "Phase_z" => Ok(self.phase_z),
                "Offset_y" => Ok(self.offset_y),
                "Offset_z" => Ok(self.offset_z),
                "Tilt_ratio" => Ok(self.tilt_ratio),
                "Velocity" => Ok(self.velocity),
                other => Err(TaskError::ParameterNotFound(other.to_string())),
            })
            .collect()
    }
}

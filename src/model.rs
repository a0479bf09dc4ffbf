//! Immutable per-episode task model.
//!
//! Holds the name tables, keyframe tables and scalar parameter table the
//! physics collaborator provides at episode load. Everything in here is
//! read-only and shared by all rollouts; per-rollout state lives in
//! [`crate::state::SimState`].

use nalgebra::Vector3;

use crate::error::{Result, TaskError};

/// A contiguous range of keyframes representing one labeled motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionClip {
    /// Clip id (also the motion-mode number requested by the host).
    pub id: usize,
    /// First keyframe row occupied by this clip.
    pub start_index: usize,
    /// Number of keyframe rows in this clip (at least 1).
    pub length: usize,
}

impl MotionClip {
    /// Last valid keyframe row of this clip.
    pub fn last_index(&self) -> usize {
        self.start_index + self.length - 1
    }
}

/// Immutable model tables shared by every rollout.
///
/// Marker convention: [`Self::marker_names`] lists the kinematic markers in
/// the order they appear in `SimState::marker_pos`, with the goal marker
/// last. The keyframe marker table covers the pose markers only (it has
/// `pose_marker_count()` columns).
#[derive(Debug, Clone)]
pub struct TaskModel {
    /// Simulated body names, indexed by body id.
    pub body_names: Vec<String>,
    /// Kinematic marker names, goal marker last.
    pub marker_names: Vec<String>,
    /// Named-sensor table, indexed by sensor id.
    pub sensor_names: Vec<String>,
    /// Geometry names, indexed by geom id.
    pub geom_names: Vec<String>,
    /// Named scalar parameter table.
    pub param_names: Vec<String>,
    /// Motion clips; clip `i` occupies keyframe rows
    /// `[start_i, start_i + length_i)`.
    pub clips: Vec<MotionClip>,
    /// Captured marker positions, one row per keyframe, one column per pose
    /// marker.
    pub key_marker_pos: Vec<Vec<Vector3<f64>>>,
    /// Captured configuration vectors, one row per keyframe.
    pub key_qpos: Vec<Vec<f64>>,
    /// Captured velocity vectors, one row per keyframe.
    pub key_qvel: Vec<Vec<f64>>,
    /// Configuration dimension.
    pub nq: usize,
    /// Velocity dimension.
    pub nv: usize,
    /// Actuator count.
    pub nu: usize,
    /// Residual dimension declared by the external sensor/cost
    /// configuration. Checked against the emitted length, never computed
    /// here.
    pub residual_dim: usize,
}

fn index_of(table: &[String], name: &str) -> Option<usize> {
    table.iter().position(|n| n == name)
}

impl TaskModel {
    /// Number of pose markers (all markers except the goal).
    pub fn pose_marker_count(&self) -> usize {
        self.marker_names.len().saturating_sub(1)
    }

    /// Resolve a body name to its id.
    pub fn body_index(&self, name: &str) -> Result<usize> {
        index_of(&self.body_names, name)
            .ok_or_else(|| TaskError::BodyNotFound(name.to_string()))
    }

    /// Resolve a marker name to its slot in the marker array.
    pub fn marker_index(&self, name: &str) -> Result<usize> {
        index_of(&self.marker_names, name)
            .ok_or_else(|| TaskError::MarkerNotFound(name.to_string()))
    }

    /// Resolve a sensor name to its id.
    pub fn sensor_index(&self, name: &str) -> Result<usize> {
        index_of(&self.sensor_names, name)
            .ok_or_else(|| TaskError::SensorNotFound(name.to_string()))
    }

    /// Resolve a geometry name to its id.
    pub fn geom_index(&self, name: &str) -> Result<usize> {
        index_of(&self.geom_names, name)
            .ok_or_else(|| TaskError::GeomNotFound(name.to_string()))
    }

    /// Resolve a scalar parameter name to its slot in the parameter vector.
    pub fn param_index(&self, name: &str) -> Result<usize> {
        index_of(&self.param_names, name)
            .ok_or_else(|| TaskError::ParameterNotFound(name.to_string()))
    }

    /// Look up a motion clip by id.
    pub fn clip(&self, id: usize) -> Result<&MotionClip> {
        self.clips.get(id).ok_or(TaskError::ClipOutOfRange(id))
    }

    /// Check the keyframe-table invariants: every table has one row per
    /// keyframe, and the rows exactly cover the clip table.
    pub fn validate(&self) -> Result<()> {
        let expected: usize = self.clips.iter().map(|c| c.length).sum();
        for rows in [
            self.key_marker_pos.len(),
            self.key_qpos.len(),
            self.key_qvel.len(),
        ] {
            if rows != expected {
                return Err(TaskError::KeyframeTableMismatch { rows, expected });
            }
        }
        Ok(())
    }
}

//! Mutable simulation state, one instance per rollout.
//!
//! The canonical copy is owned by the stepping loop and mutated only by the
//! transition controller; the planner hands cloned copies to parallel
//! rollouts, each of which owns its clone exclusively.

use nalgebra::{Matrix3, Vector3};

/// One active contact between two geometries, with its resolved force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// First geometry id.
    pub geom_a: usize,
    /// Second geometry id.
    pub geom_b: usize,
    /// Resolved contact force in world coordinates.
    pub force: Vector3<f64>,
}

/// Mutable per-rollout simulation state, as provided by the physics
/// collaborator after each accepted step.
#[derive(Debug, Clone, Default)]
pub struct SimState {
    /// Current simulation time in seconds.
    pub time: f64,
    /// Full configuration vector.
    pub qpos: Vec<f64>,
    /// Full velocity vector.
    pub qvel: Vec<f64>,
    /// Actuator command vector.
    pub ctrl: Vec<f64>,
    /// Per-body world position, indexed by body id.
    pub xpos: Vec<Vector3<f64>>,
    /// Per-body world orientation matrix, indexed by body id.
    pub xmat: Vec<Matrix3<f64>>,
    /// Kinematic marker positions, goal marker last. Written only by the
    /// transition controller and the goal relocation check.
    pub marker_pos: Vec<Vector3<f64>>,
    /// Active contact list for this step.
    pub contacts: Vec<Contact>,
    /// Sensor outputs, indexed by resolved sensor id.
    pub sensors: Vec<Vec<f64>>,
}

impl SimState {
    /// Read the raw output of a sensor.
    pub fn sensor(&self, id: usize) -> &[f64] {
        &self.sensors[id]
    }

    /// Read the first three components of a sensor as a vector.
    pub fn sensor3(&self, id: usize) -> Vector3<f64> {
        let s = &self.sensors[id];
        Vector3::new(s[0], s[1], s[2])
    }

    /// Overwrite a sensor reading (test and host use).
    pub fn set_sensor3(&mut self, id: usize, value: Vector3<f64>) {
        self.sensors[id] = vec![value.x, value.y, value.z];
    }
}

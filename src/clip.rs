//! Keyframe playback cursor and linear interpolation.
//!
//! Playback runs at a fixed 30 frames per simulated second regardless of
//! the planner's step size; the cursor pins to the clip's last keyframe
//! instead of extrapolating past the capture.

use nalgebra::Vector3;

use crate::model::{MotionClip, TaskModel};

/// Keyframe playback rate in frames per simulated second. Matches the
/// capture rate of the CMU mocap keyframes.
pub const KEYFRAME_FPS: f64 = 30.0;

/// A blended pair of keyframe rows for linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackCursor {
    /// Earlier keyframe row.
    pub index0: usize,
    /// Later keyframe row (equal to `index0` at the clip boundary).
    pub index1: usize,
    /// Blend weight of `index0`.
    pub weight0: f64,
    /// Blend weight of `index1`.
    pub weight1: f64,
}

impl PlaybackCursor {
    /// Compute the cursor for `clip` at `elapsed` seconds since the clip
    /// began playing.
    pub fn at(clip: &MotionClip, elapsed: f64) -> Self {
        let last = clip.last_index() as f64;
        let fractional =
            (elapsed * KEYFRAME_FPS + clip.start_index as f64).clamp(0.0, last);

        let index0 = fractional.floor() as usize;
        let index1 = (index0 + 1).min(clip.last_index());
        let weight1 = fractional - index0 as f64;
        let weight0 = 1.0 - weight1;

        Self {
            index0,
            index1,
            weight0,
            weight1,
        }
    }

    /// Blend the raw captured marker set at this cursor.
    pub fn blend_markers(&self, model: &TaskModel) -> Vec<Vector3<f64>> {
        let frame0 = &model.key_marker_pos[self.index0];
        let frame1 = &model.key_marker_pos[self.index1];
        frame0
            .iter()
            .zip(frame1.iter())
            .map(|(a, b)| a * self.weight0 + b * self.weight1)
            .collect()
    }

    /// Finite-difference marker velocity between the two raw keyframes of
    /// this cursor, scaled by the playback rate.
    pub fn marker_velocity(&self, model: &TaskModel, marker: usize) -> Vector3<f64> {
        let p0 = model.key_marker_pos[self.index0][marker];
        let p1 = model.key_marker_pos[self.index1][marker];
        (p1 - p0) * KEYFRAME_FPS
    }
}

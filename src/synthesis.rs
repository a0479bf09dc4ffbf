//! Reference pose synthesis.
//!
//! Re-expresses the blended capture markers in the moving board's frame:
//! re-centers the set on the board, overlays the procedural gait and sway
//! signals, then banks and yaws the whole pose to follow the board's
//! current heading. A single short capture clip therefore yields a
//! continuous, dynamically retargeted reference.
//!
//! This is a pure function of its arguments; rollout threads call it
//! concurrently on cloned states.

use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::{Matrix3, Rotation3, Vector2, Vector3};

use crate::handles::Handles;

/// Fixed downward bias applied when re-centering onto the board deck.
pub const STANCE_DROP: f64 = 0.1;
/// Fixed backward bias applied when re-centering onto the board deck.
pub const STANCE_SETBACK: f64 = 0.1;
/// Lateral gap forced between the trail and lead foot markers.
pub const TRAIL_FOOT_GAP: f64 = 0.2;
/// Clamp on the steering error before it is scaled into a tilt angle.
pub const HEADING_ERROR_LIMIT: f64 = 0.5;

/// Torso/hip/shoulder markers that receive the sway overlay.
pub const SWAY_MARKER_NAMES: [&str; 7] = [
    "pelvis",
    "lhip",
    "rhip",
    "lknee",
    "head",
    "lshoulder",
    "rshoulder",
];

// Per-marker sway scales, paired with SWAY_MARKER_NAMES. The lateral
// formula negates the scale, so negative entries sway with the gait signal
// and positive entries against it.
const SWAY_SCALE_Y: [f64; 7] = [-0.25, -0.5, -0.5, -1.0, 1.3, 1.3, 1.3];
const SWAY_SCALE_Z: [f64; 7] = [-0.05, 0.05, 0.05, -0.1, -0.15, -0.15, -0.15];

/// Unit heading of a body projected to the ground plane (the world-frame
/// direction of its local forward axis). Falls back to +X for a degenerate
/// orientation.
pub fn heading_xy(xmat: &Matrix3<f64>) -> Vector2<f64> {
    let heading = Vector2::new(xmat[(0, 0)], xmat[(1, 0)]);
    let norm = heading.norm();
    if norm < 1e-12 {
        Vector2::x()
    } else {
        heading / norm
    }
}

/// Signed steering error between the board's heading and the direction to
/// the goal, clamped to `[-HEADING_ERROR_LIMIT, HEADING_ERROR_LIMIT]`.
pub fn steering_error(
    anchor_pos: &Vector3<f64>,
    anchor_mat: &Matrix3<f64>,
    goal_pos: &Vector3<f64>,
) -> f64 {
    let heading = heading_xy(anchor_mat);
    let anchor_yaw = heading.y.atan2(heading.x);
    let desired_yaw = (goal_pos.y - anchor_pos.y).atan2(goal_pos.x - anchor_pos.x);
    ((desired_yaw - anchor_yaw).sin() / 3.0).clamp(-HEADING_ERROR_LIMIT, HEADING_ERROR_LIMIT)
}

/// Synthesize the reference marker set for the current board pose.
///
/// `raw_markers` is the blended capture frame, one entry per pose marker
/// (goal excluded). The returned array uses the same marker indexing and is
/// expressed in world coordinates, ready for residual comparison.
pub fn synthesize_reference(
    handles: &Handles,
    params: &[f64],
    anchor_pos: &Vector3<f64>,
    anchor_mat: &Matrix3<f64>,
    goal_pos: &Vector3<f64>,
    raw_markers: &[Vector3<f64>],
    time: f64,
) -> Vec<Vector3<f64>> {
    let mut markers = raw_markers.to_vec();
    let count = markers.len().max(1) as f64;

    // 1. Re-center on the board: the capture set keeps its shape but loses
    //    its authored location, plus the fixed stance bias.
    let mean: Vector2<f64> = raw_markers
        .iter()
        .map(|p| Vector2::new(p.x, p.y))
        .sum::<Vector2<f64>>()
        / count;
    for p in &mut markers {
        p.x += anchor_pos.x - mean.x - STANCE_SETBACK;
        p.y += anchor_pos.y - mean.y;
        p.z += anchor_pos.z - STANCE_DROP;
    }

    let amplitude_y = params[handles.p_amplitude_y];
    let amplitude_z = params[handles.p_amplitude_z];
    let phase_y = TAU * params[handles.p_frequency_y] * time + params[handles.p_phase_y];
    let phase_z = TAU * params[handles.p_frequency_z] * time + params[handles.p_phase_z];

    // 2. Gait overlay on the pushing foot: lateral swing is additive, the
    //    vertical signal replaces z outright so the foot lifts and plants
    //    regardless of where the capture put it.
    let lateral = amplitude_y * phase_y.sin() + params[handles.p_offset_y];
    let vertical = amplitude_z * phase_z.sin() - params[handles.p_offset_z];

    let lead = handles.lead_foot_marker;
    let trail = handles.trail_foot_marker;
    markers[lead].y += lateral;
    markers[trail].y = markers[lead].y - TRAIL_FOOT_GAP;
    markers[lead].z = vertical + raw_markers[lead].z;
    markers[trail].z = vertical + raw_markers[trail].z;

    // 3. Upper-body sway, counter-phased against the foot swing.
    for (i, &marker) in handles.sway_markers.iter().enumerate() {
        markers[marker].y += -SWAY_SCALE_Y[i] * amplitude_y * 0.5 * phase_y.sin();
        markers[marker].z += -SWAY_SCALE_Z[i] * phase_y.sin();
    }

    // 4. Bank and yaw the whole set with the board.
    let heading = heading_xy(anchor_mat);
    let yaw = heading.y.atan2(heading.x);
    let tilt = steering_error(anchor_pos, anchor_mat, goal_pos)
        * FRAC_PI_2
        * params[handles.p_tilt_ratio];

    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), yaw)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), tilt);

    for p in &mut markers {
        let rel = *p - anchor_pos;
        *p = anchor_pos + rotation * rel;
    }

    markers
}

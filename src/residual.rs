//! Residual assembly.
//!
//! Concatenates the independent cost blocks into one fixed-order vector for
//! the planner. Pure in `(model, state, params)`; rollout threads evaluate
//! it concurrently on cloned states. The emitted length must match the
//! dimension declared by the external residual/sensor configuration —
//! a mismatch is fatal.

use nalgebra::{Vector2, Vector3};

use crate::clip::PlaybackCursor;
use crate::error::{Result, TaskError};
use crate::handles::Handles;
use crate::model::TaskModel;
use crate::state::{Contact, SimState};
use crate::synthesis::heading_xy;

/// Degrees of freedom of the humanoid root free joint.
const ROOT_DOFS: usize = 6;
/// Degrees of freedom of the board free joint.
const BOARD_DOFS: usize = 6;
/// Degrees of freedom of the board trucks and wheels.
const BOARD_WHEEL_DOFS: usize = 7;

/// Fixed tolerance subtracted from the longitudinal speed error.
const LONGITUDINAL_TOLERANCE: f64 = 0.03;

/// Center of the contact-force logistic, in summed newtons.
const FORCE_SHAPING_CENTER: f64 = 500.0;
/// Slope of the contact-force logistic.
const FORCE_SHAPING_SLOPE: f64 = 80.0;
/// Reference lead-foot height at or below which stance shaping is active.
const STANCE_GATE_HEIGHT: f64 = 0.05;

fn push3(out: &mut Vec<f64>, v: Vector3<f64>) {
    out.extend_from_slice(&[v.x, v.y, v.z]);
}

/// Assemble the full residual vector.
///
/// `reference` is the synthesized marker set for this state; `cursor` is
/// the playback cursor it was blended at (needed for the finite-difference
/// velocity terms, which read the raw keyframes).
pub fn assemble(
    model: &TaskModel,
    handles: &Handles,
    params: &[f64],
    cursor: &PlaybackCursor,
    reference: &[Vector3<f64>],
    state: &SimState,
) -> Result<Vec<f64>> {
    let mut residual = Vec::with_capacity(model.residual_dim);

    // 1. Joint-rate regularization: humanoid joints only, skipping the two
    //    free joints and the board's wheel/truck DOFs.
    let joint_rates = model
        .nv
        .saturating_sub(ROOT_DOFS + BOARD_DOFS + BOARD_WHEEL_DOFS);
    residual.extend_from_slice(&state.qvel[ROOT_DOFS..ROOT_DOFS + joint_rates]);

    // 2. Control regularization.
    residual.extend_from_slice(&state.ctrl);

    // 3. Pose and velocity tracking.
    tracking(&mut residual, model, handles, cursor, reference, state);

    // 4. Foot placement on the board.
    push3(
        &mut residual,
        state.sensor3(handles.front_foot_sensor) - state.sensor3(handles.front_plate_sensor),
    );
    push3(
        &mut residual,
        state.sensor3(handles.rear_foot_sensor) - state.sensor3(handles.tail_sensor),
    );

    // 5. Board heading toward the goal.
    let heading = heading_residual(state, handles);
    residual.extend_from_slice(&heading);

    // 6. Board velocity in its local frame.
    let velocity = board_velocity_residual(state, handles, params);
    residual.extend_from_slice(&velocity);

    // 7. Stance-force shaping on the pushing foot.
    residual.push(foot_contact_force_residual(state, handles, reference));

    // 8. Board / torso COM velocity consistency.
    let board_vel = state.sensor3(handles.board_linvel_sensor);
    let torso_vel = state.sensor3(handles.torso_linvel_sensor);
    residual.push(board_vel.x - torso_vel.x);
    residual.push(board_vel.y - torso_vel.y);

    if residual.len() != model.residual_dim {
        return Err(TaskError::ResidualDimMismatch {
            expected: model.residual_dim,
            actual: residual.len(),
        });
    }
    Ok(residual)
}

/// Tracking block: one global-offset 3-vector over the full body list, then
/// per tracked body the centroid-relative position error and the
/// finite-difference keyframe velocity error.
fn tracking(
    out: &mut Vec<f64>,
    model: &TaskModel,
    handles: &Handles,
    cursor: &PlaybackCursor,
    reference: &[Vector3<f64>],
    state: &SimState,
) {
    let count = handles.body_markers.len().max(1) as f64;
    let mut avg_ref = Vector3::zeros();
    let mut avg_sensor = Vector3::zeros();
    for (&marker, &sensor) in handles.body_markers.iter().zip(&handles.body_pos_sensors) {
        avg_ref += reference[marker];
        avg_sensor += state.sensor3(sensor);
    }
    avg_ref /= count;
    avg_sensor /= count;

    // Global offset: how far the whole pose drifted from the reference.
    push3(out, avg_ref - avg_sensor);

    // Centroid-relative shape error, decoupled from the global drift.
    for (&marker, &sensor) in handles.track_markers.iter().zip(&handles.track_pos_sensors) {
        let shape_error = (reference[marker] - avg_ref) - (state.sensor3(sensor) - avg_sensor);
        push3(out, shape_error);
    }

    // Velocity tracking against the raw keyframe finite difference.
    for (&marker, &sensor) in handles.track_markers.iter().zip(&handles.track_vel_sensors) {
        let fd_velocity = cursor.marker_velocity(model, marker);
        push3(out, fd_velocity - state.sensor3(sensor));
    }
}

fn heading_residual(state: &SimState, handles: &Handles) -> [f64; 2] {
    let heading = heading_xy(&state.xmat[handles.board_body]);
    let anchor = state.xpos[handles.board_body];
    let goal = state.marker_pos[handles.goal_marker];

    let mut to_goal = Vector2::new(goal.x - anchor.x, goal.y - anchor.y);
    let norm = to_goal.norm();
    if norm > 1e-12 {
        to_goal /= norm;
    }

    [heading.x - to_goal.x, heading.y - to_goal.y]
}

fn board_velocity_residual(state: &SimState, handles: &Handles, params: &[f64]) -> [f64; 3] {
    let target = params[handles.p_velocity];
    let global = state.sensor3(handles.board_linvel_sensor);
    let local = state.xmat[handles.board_body].transpose() * global;

    // Lateral and vertical targets are zero; the vertical term compares the
    // global z speed. The longitudinal term carries a small tolerance.
    [
        target - local.x - LONGITUDINAL_TOLERANCE,
        -local.y,
        -global.z,
    ]
}

/// Stance-force shaping: a logistic of the summed absolute contact force of
/// the pushing foot's two ground contacts, active only while the reference
/// says the foot is planted. A missing contact pair contributes zero force;
/// it never reads an unresolved contact handle.
fn foot_contact_force_residual(
    state: &SimState,
    handles: &Handles,
    reference: &[Vector3<f64>],
) -> f64 {
    if reference[handles.lead_foot_marker].z > STANCE_GATE_HEIGHT {
        return 0.0;
    }

    let mut force_abs_sum = 0.0;
    let mut found = 0;
    for &foot in &handles.foot_geoms {
        if let Some(contact) = find_contact(state, foot, handles.floor_geom) {
            force_abs_sum +=
                contact.force.x.abs() + contact.force.y.abs() + contact.force.z.abs();
            found += 1;
        }
    }
    if found == 0 {
        tracing::debug!("stance gate active but no foot-floor contact present");
    }

    1.0 / (1.0 + ((force_abs_sum - FORCE_SHAPING_CENTER) / FORCE_SHAPING_SLOPE).exp())
}

fn find_contact(state: &SimState, geom_a: usize, geom_b: usize) -> Option<&Contact> {
    state.contacts.iter().find(|c| {
        (c.geom_a == geom_a && c.geom_b == geom_b) || (c.geom_a == geom_b && c.geom_b == geom_a)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use nalgebra::Vector3;

    fn setup() -> (TaskModel, Handles, Vec<f64>, PlaybackCursor) {
        let model = fixture::model();
        let handles = fixture::handles(&model);
        let params = crate::params::GaitDefaults::default()
            .values(&model)
            .unwrap();
        let cursor = PlaybackCursor::at(model.clip(0).unwrap(), 0.0);
        (model, handles, params, cursor)
    }

    #[test]
    fn assembled_length_matches_declared_dimension() {
        let (model, handles, params, cursor) = setup();
        let state = fixture::state(&model);
        let reference = fixture::raw_markers(&model);

        let residual = assemble(&model, &handles, &params, &cursor, &reference, &state).unwrap();
        assert_eq!(residual.len(), model.residual_dim);
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let (mut model, handles, params, cursor) = setup();
        model.residual_dim += 1;
        let state = fixture::state(&model);
        let reference = fixture::raw_markers(&model);

        assert!(matches!(
            assemble(&model, &handles, &params, &cursor, &reference, &state),
            Err(TaskError::ResidualDimMismatch { .. })
        ));
    }

    #[test]
    fn board_velocity_at_target_leaves_only_the_tolerance() {
        let (model, handles, mut params, _) = setup();
        let mut state = fixture::state(&model);

        // Identity orientation: local == global. Match the target exactly.
        state.set_sensor3(handles.board_linvel_sensor, Vector3::new(1.5, 0.0, 0.0));
        params[handles.p_velocity] = 1.5;

        let r = board_velocity_residual(&state, &handles, &params);
        assert!((r[0] - (-LONGITUDINAL_TOLERANCE)).abs() < 1e-12);
        assert!(r[1].abs() < 1e-12);
        assert!(r[2].abs() < 1e-12);
    }

    #[test]
    fn board_velocity_is_compared_in_the_local_frame() {
        let (model, handles, mut params, _) = setup();
        let mut state = fixture::state(&model);

        // Board yawed 90 degrees, moving along world +Y at the target
        // speed: the local longitudinal speed matches the target.
        let yaw = nalgebra::Rotation3::from_axis_angle(
            &Vector3::z_axis(),
            std::f64::consts::FRAC_PI_2,
        );
        state.xmat[handles.board_body] = *yaw.matrix();
        state.set_sensor3(handles.board_linvel_sensor, Vector3::new(0.0, 2.0, 0.0));
        params[handles.p_velocity] = 2.0;

        let r = board_velocity_residual(&state, &handles, &params);
        assert!((r[0] - (-LONGITUDINAL_TOLERANCE)).abs() < 1e-9);
        assert!(r[1].abs() < 1e-9);
    }

    #[test]
    fn heading_residual_vanishes_when_aligned() {
        let (model, handles, _, _) = setup();
        let mut state = fixture::state(&model);
        state.marker_pos[handles.goal_marker] = Vector3::new(10.0, 0.0, 0.0);

        let r = heading_residual(&state, &handles);
        assert!(r[0].abs() < 1e-12);
        assert!(r[1].abs() < 1e-12);
    }

    #[test]
    fn contact_shaping_is_gated_by_reference_foot_height() {
        let (model, handles, _, _) = setup();
        let mut state = fixture::state(&model);
        state.contacts.push(crate::state::Contact {
            geom_a: handles.foot_geoms[0],
            geom_b: handles.floor_geom,
            force: Vector3::new(1e4, 1e4, 1e4),
        });

        let mut reference = fixture::raw_markers(&model);
        reference[handles.lead_foot_marker].z = STANCE_GATE_HEIGHT + 0.01;
        assert_eq!(
            foot_contact_force_residual(&state, &handles, &reference),
            0.0
        );
    }

    #[test]
    fn contact_shaping_limits() {
        let (model, handles, _, _) = setup();
        let mut reference = fixture::raw_markers(&model);
        reference[handles.lead_foot_marker].z = 0.0;

        // Gated on with no contact force: approaches 1.
        let state = fixture::state(&model);
        assert!(foot_contact_force_residual(&state, &handles, &reference) > 0.99);

        // Gated on with enormous force: approaches 0.
        let mut loaded = fixture::state(&model);
        for &foot in &handles.foot_geoms {
            loaded.contacts.push(crate::state::Contact {
                geom_a: handles.floor_geom,
                geom_b: foot,
                force: Vector3::new(0.0, 0.0, 5e4),
            });
        }
        assert!(foot_contact_force_residual(&loaded, &handles, &reference) < 0.01);
    }

    #[test]
    fn centroid_terms_are_translation_invariant() {
        let (model, handles, _, cursor) = setup();
        let reference = fixture::raw_markers(&model);

        let mut state = fixture::state(&model);
        for (i, &sensor) in handles.body_pos_sensors.iter().enumerate() {
            state.set_sensor3(sensor, Vector3::new(i as f64 * 0.1, 0.2, 0.3));
        }

        let mut base = Vec::new();
        tracking(&mut base, &model, &handles, &cursor, &reference, &state);

        // Translate every tracked-body sensor by the same vector.
        let shift = Vector3::new(0.7, -1.3, 0.4);
        let mut moved_state = state.clone();
        for &sensor in &handles.body_pos_sensors {
            let v = moved_state.sensor3(sensor);
            moved_state.set_sensor3(sensor, v + shift);
        }
        let mut moved = Vec::new();
        tracking(&mut moved, &model, &handles, &cursor, &reference, &moved_state);

        // Global offset changes by exactly -shift.
        assert!((moved[0] - (base[0] - shift.x)).abs() < 1e-9);
        assert!((moved[1] - (base[1] - shift.y)).abs() < 1e-9);
        assert!((moved[2] - (base[2] - shift.z)).abs() < 1e-9);

        // Centroid-relative position terms are unchanged.
        let relative = 3..3 + 3 * handles.track_markers.len();
        for i in relative {
            assert!((moved[i] - base[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn single_keyframe_clip_has_zero_reference_velocity() {
        let (model, handles, _, cursor) = setup();
        let mut state = fixture::state(&model);
        let vel = Vector3::new(0.4, -0.2, 0.1);
        for &sensor in &handles.track_vel_sensors {
            state.set_sensor3(sensor, vel);
        }

        let reference = fixture::raw_markers(&model);
        let mut out = Vec::new();
        tracking(&mut out, &model, &handles, &cursor, &reference, &state);

        // Velocity block: fd velocity is zero, so the residual is -sensor.
        let vel_block = 3 + 3 * handles.track_markers.len();
        assert!((out[vel_block] - (-vel.x)).abs() < 1e-12);
        assert!((out[vel_block + 1] - (-vel.y)).abs() < 1e-12);
        assert!((out[vel_block + 2] - (-vel.z)).abs() < 1e-12);
    }
}

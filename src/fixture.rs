//! Deterministic model/state builders shared by the unit tests.

use nalgebra::{Matrix3, Vector3};

use crate::handles::{Handles, BODY_NAMES, TRACK_BODY_NAMES};
use crate::model::{MotionClip, TaskModel};
use crate::params::PARAM_NAMES;
use crate::state::SimState;

fn marker_height(name: &str) -> f64 {
    match name {
        "ltoe" => 0.02,
        "rtoe" => 0.02,
        "lheel" => 0.01,
        "rheel" => 0.01,
        "lknee" | "rknee" => 0.45,
        "lhand" | "rhand" => 0.8,
        "lelbow" | "relbow" => 1.0,
        "lshoulder" | "rshoulder" => 1.4,
        "lhip" | "rhip" => 0.85,
        "head" => 1.6,
        _ => 0.9, // pelvis
    }
}

/// Single-clip pushing model with one captured keyframe.
pub fn model() -> TaskModel {
    let marker_names: Vec<String> = BODY_NAMES
        .iter()
        .map(|n| n.to_string())
        .chain(std::iter::once("goal".to_string()))
        .collect();

    let mut sensor_names: Vec<String> = BODY_NAMES
        .iter()
        .map(|n| format!("tracking_pos[{n}]"))
        .collect();
    sensor_names.extend(TRACK_BODY_NAMES.iter().map(|n| format!("tracking_linvel[{n}]")));
    sensor_names.extend(
        [
            "track-front-plate",
            "track-tail",
            "board_framelinvel",
            "torso_subtreelinvel",
        ]
        .map(String::from),
    );

    let key_markers: Vec<Vector3<f64>> = BODY_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            Vector3::new(0.02 * i as f64 - 0.1, 0.1 * side, marker_height(name))
        })
        .collect();

    let nq = 21;
    let nv = 21;
    let nu = 3;

    // Declared residual layout: joint rates + ctrl + tracking + foot
    // placement + heading + board velocity + contact shaping + COM.
    let residual_dim =
        (nv - 19) + nu + (3 + 6 * TRACK_BODY_NAMES.len()) + 6 + 2 + 3 + 1 + 2;

    TaskModel {
        body_names: ["world", "torso", "board"].map(String::from).to_vec(),
        marker_names,
        sensor_names,
        geom_names: ["floor", "foot1_left", "foot2_left"]
            .map(String::from)
            .to_vec(),
        param_names: PARAM_NAMES.map(String::from).to_vec(),
        clips: vec![MotionClip {
            id: 0,
            start_index: 0,
            length: 1,
        }],
        key_marker_pos: vec![key_markers],
        key_qpos: vec![(0..nq).map(|i| 0.5 + 0.01 * i as f64).collect()],
        key_qvel: vec![(0..nv).map(|i| -0.1 + 0.005 * i as f64).collect()],
        nq,
        nv,
        nu,
        residual_dim,
    }
}

/// Resolved handle table for the fixture model.
pub fn handles(model: &TaskModel) -> Handles {
    Handles::resolve(model).expect("fixture model resolves")
}

/// Fresh state at `time == 0`: board at the origin facing +X, goal 10 m
/// ahead, all sensors zeroed.
pub fn state(model: &TaskModel) -> SimState {
    let mut marker_pos = model.key_marker_pos[0].clone();
    marker_pos.push(Vector3::new(10.0, 0.0, 0.3));

    SimState {
        time: 0.0,
        qpos: vec![0.0; model.nq],
        qvel: vec![0.0; model.nv],
        ctrl: vec![0.0; model.nu],
        xpos: vec![Vector3::zeros(); model.body_names.len()],
        xmat: vec![Matrix3::identity(); model.body_names.len()],
        marker_pos,
        contacts: Vec::new(),
        sensors: vec![vec![0.0; 3]; model.sensor_names.len()],
    }
}

/// The raw captured marker frame (key row 0), as the synthesizer receives
/// it.
pub fn raw_markers(model: &TaskModel) -> Vec<Vector3<f64>> {
    model.key_marker_pos[0].clone()
}

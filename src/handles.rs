//! One-time name resolution: strings to integer handles.
//!
//! Every body, marker, sensor, geom and parameter the hot path touches is
//! resolved here once per episode, so the residual and synthesis paths never
//! hash a name string. Any missing name is a fatal configuration error.

use crate::error::Result;
use crate::model::TaskModel;

/// Full list of humanoid bodies averaged for the global tracking offset.
pub const BODY_NAMES: [&str; 16] = [
    "pelvis",
    "head",
    "ltoe",
    "rtoe",
    "lheel",
    "rheel",
    "lknee",
    "rknee",
    "lhand",
    "rhand",
    "lelbow",
    "relbow",
    "lshoulder",
    "rshoulder",
    "lhip",
    "rhip",
];

/// Subset of bodies with centroid-relative position and velocity tracking.
pub const TRACK_BODY_NAMES: [&str; 11] = [
    "pelvis",
    "ltoe",
    "rtoe",
    "lheel",
    "rheel",
    "lhand",
    "rhand",
    "lshoulder",
    "rshoulder",
    "lhip",
    "rhip",
];

/// Integer handle table for the pushing task, resolved once per episode.
#[derive(Debug, Clone)]
pub struct Handles {
    /// Board (anchor) body id.
    pub board_body: usize,
    /// Goal marker slot.
    pub goal_marker: usize,

    /// Marker slots for [`BODY_NAMES`].
    pub body_markers: Vec<usize>,
    /// `tracking_pos[..]` sensor ids for [`BODY_NAMES`].
    pub body_pos_sensors: Vec<usize>,
    /// Marker slots for [`TRACK_BODY_NAMES`].
    pub track_markers: Vec<usize>,
    /// `tracking_pos[..]` sensor ids for [`TRACK_BODY_NAMES`].
    pub track_pos_sensors: Vec<usize>,
    /// `tracking_linvel[..]` sensor ids for [`TRACK_BODY_NAMES`].
    pub track_vel_sensors: Vec<usize>,

    /// Marker slots for [`crate::synthesis::SWAY_MARKER_NAMES`].
    pub sway_markers: Vec<usize>,

    /// Lead foot marker (toe of the pushing foot).
    pub lead_foot_marker: usize,
    /// Trail foot marker (heel of the pushing foot).
    pub trail_foot_marker: usize,

    /// Front foot position sensor.
    pub front_foot_sensor: usize,
    /// Board front plate target sensor.
    pub front_plate_sensor: usize,
    /// Rear (pushing) foot position sensor.
    pub rear_foot_sensor: usize,
    /// Board tail target sensor.
    pub tail_sensor: usize,

    /// Board frame linear velocity sensor.
    pub board_linvel_sensor: usize,
    /// Torso subtree linear velocity sensor.
    pub torso_linvel_sensor: usize,

    /// The pushing foot's two ground-contact geoms.
    pub foot_geoms: [usize; 2],
    /// Floor geom.
    pub floor_geom: usize,

    /// Parameter slot: lateral gait amplitude.
    pub p_amplitude_y: usize,
    /// Parameter slot: vertical gait amplitude.
    pub p_amplitude_z: usize,
    /// Parameter slot: lateral gait frequency.
    pub p_frequency_y: usize,
    /// Parameter slot: vertical gait frequency.
    pub p_frequency_z: usize,
    /// Parameter slot: lateral gait phase.
    pub p_phase_y: usize,
    /// Parameter slot: vertical gait phase.
    pub p_phase_z: usize,
    /// Parameter slot: lateral gait offset.
    pub p_offset_y: usize,
    /// Parameter slot: vertical gait offset.
    pub p_offset_z: usize,
    /// Parameter slot: pose tilt ratio.
    pub p_tilt_ratio: usize,
    /// Parameter slot: target board speed.
    pub p_velocity: usize,
}

impl Handles {
    /// Resolve every required name against the model. Fails fast on the
    /// first missing name.
    pub fn resolve(model: &TaskModel) -> Result<Self> {
        let resolve_markers = |names: &[&str]| -> Result<Vec<usize>> {
            names.iter().map(|n| model.marker_index(n)).collect()
        };
        let resolve_sensors = |names: &[&str], prefix: &str| -> Result<Vec<usize>> {
            names
                .iter()
                .map(|n| model.sensor_index(&format!("{prefix}[{n}]")))
                .collect()
        };

        let handles = Self {
            board_body: model.body_index("board")?,
            goal_marker: model.marker_index("goal")?,

            body_markers: resolve_markers(&BODY_NAMES)?,
            body_pos_sensors: resolve_sensors(&BODY_NAMES, "tracking_pos")?,
            track_markers: resolve_markers(&TRACK_BODY_NAMES)?,
            track_pos_sensors: resolve_sensors(&TRACK_BODY_NAMES, "tracking_pos")?,
            track_vel_sensors: resolve_sensors(&TRACK_BODY_NAMES, "tracking_linvel")?,

            sway_markers: resolve_markers(&crate::synthesis::SWAY_MARKER_NAMES)?,

            lead_foot_marker: model.marker_index("ltoe")?,
            trail_foot_marker: model.marker_index("lheel")?,

            front_foot_sensor: model.sensor_index("tracking_pos[rtoe]")?,
            front_plate_sensor: model.sensor_index("track-front-plate")?,
            rear_foot_sensor: model.sensor_index("tracking_pos[ltoe]")?,
            tail_sensor: model.sensor_index("track-tail")?,

            board_linvel_sensor: model.sensor_index("board_framelinvel")?,
            torso_linvel_sensor: model.sensor_index("torso_subtreelinvel")?,

            foot_geoms: [
                model.geom_index("foot1_left")?,
                model.geom_index("foot2_left")?,
            ],
            floor_geom: model.geom_index("floor")?,

            p_amplitude_y: model.param_index("Amplitude_y")?,
            p_amplitude_z: model.param_index("Amplitude_z")?,
            p_frequency_y: model.param_index("Frequency_y")?,
            p_frequency_z: model.param_index("Frequency_z")?,
            p_phase_y: model.param_index("Phase_y")?,
            p_phase_z: model.param_index("Phase_z")?,
            p_offset_y: model.param_index("Offset_y")?,
            p_offset_z: model.param_index("Offset_z")?,
            p_tilt_ratio: model.param_index("Tilt_ratio")?,
            p_velocity: model.param_index("Velocity")?,
        };

        tracing::debug!(
            board = handles.board_body,
            goal = handles.goal_marker,
            "resolved task handles"
        );

        Ok(handles)
    }
}

//! Mode/episode transition control.
//!
//! Runs once per accepted step on the canonical state, serialized by the
//! host. A motion-mode change (or episode restart at `time == 0`) reseeds
//! the configuration from the clip's first keyframe exactly once; every
//! call then refreshes the synthesized reference markers and the goal.
//! Reseeding happens before synthesis so the reference and the goal check
//! see the post-reset board pose.

use crate::clip::PlaybackCursor;
use crate::error::Result;
use crate::goal::{relocate_goal_if_reached, CoinFlip};
use crate::handles::Handles;
use crate::model::TaskModel;
use crate::state::SimState;
use crate::synthesis::synthesize_reference;

/// Playback bookkeeping: which clip is active and when it started.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModeState {
    /// Active motion-clip id.
    pub current_mode: usize,
    /// Simulation time at which the active clip began playing.
    pub reference_time: f64,
}

/// Advance the transition controller by one accepted step.
pub fn run(
    model: &TaskModel,
    handles: &Handles,
    params: &[f64],
    mode: &mut ModeState,
    state: &mut SimState,
    requested_mode: usize,
    coin: &mut dyn CoinFlip,
) -> Result<()> {
    let clip = *model.clip(requested_mode)?;

    if mode.current_mode != requested_mode || state.time == 0.0 {
        mode.current_mode = requested_mode;
        mode.reference_time = state.time;
        state.qpos.clone_from(&model.key_qpos[clip.start_index]);
        state.qvel.clone_from(&model.key_qvel[clip.start_index]);
        tracing::info!(
            mode = requested_mode,
            time = state.time,
            "motion mode reset from clip start keyframe"
        );
    }

    let cursor = PlaybackCursor::at(&clip, state.time - mode.reference_time);
    let raw = cursor.blend_markers(model);

    let anchor_pos = state.xpos[handles.board_body];
    let anchor_mat = state.xmat[handles.board_body];
    let goal = state.marker_pos[handles.goal_marker];
    let reference = synthesize_reference(
        handles, params, &anchor_pos, &anchor_mat, &goal, &raw, state.time,
    );
    state.marker_pos[..reference.len()].copy_from_slice(&reference);

    relocate_goal_if_reached(state, handles, coin);
    Ok(())
}

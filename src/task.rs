//! The board-pushing task facade exposed to the planner and the stepping
//! loop.
//!
//! `residual` is pure and safe to call on cloned states from parallel
//! rollouts; `transition` mutates the canonical state and must be
//! serialized by the host.

use crate::clip::PlaybackCursor;
use crate::error::{Result, TaskError};
use crate::goal::{CoinFlip, ThreadCoin};
use crate::handles::Handles;
use crate::model::TaskModel;
use crate::params::GaitDefaults;
use crate::residual;
use crate::state::SimState;
use crate::synthesis::synthesize_reference;
use crate::transition::{self, ModeState};

/// Residual-producing task for pushing a wheeled board toward a moving
/// goal.
pub struct PushingTask {
    handles: Handles,
    params: Vec<f64>,
    mode: ModeState,
    coin: Box<dyn CoinFlip + Send + Sync>,
}

impl PushingTask {
    /// Build the task against a model, using the default gait parameters.
    pub fn new(model: &TaskModel) -> Result<Self> {
        let params = GaitDefaults::default().values(model)?;
        Self::with_params(model, params)
    }

    /// Build the task with an explicit parameter vector, ordered by the
    /// model's parameter table.
    pub fn with_params(model: &TaskModel, params: Vec<f64>) -> Result<Self> {
        model.validate()?;
        if params.len() != model.param_names.len() {
            return Err(TaskError::InvalidConfig {
                reason: format!(
                    "parameter vector has {} entries, model declares {}",
                    params.len(),
                    model.param_names.len()
                ),
            });
        }
        let handles = Handles::resolve(model)?;
        Ok(Self {
            handles,
            params,
            mode: ModeState::default(),
            coin: Box::new(ThreadCoin),
        })
    }

    /// Replace the randomness source used for goal relocation.
    pub fn with_coin(mut self, coin: Box<dyn CoinFlip + Send + Sync>) -> Self {
        self.coin = coin;
        self
    }

    /// Overwrite a parameter value by its resolved slot.
    pub fn set_param(&mut self, slot: usize, value: f64) {
        self.params[slot] = value;
    }

    /// Resolved handle table.
    pub fn handles(&self) -> &Handles {
        &self.handles
    }

    /// Active motion-clip id.
    pub fn mode(&self) -> usize {
        self.mode.current_mode
    }

    /// Simulation time at which the active clip began playing.
    pub fn reference_time(&self) -> f64 {
        self.mode.reference_time
    }

    /// Compute the fixed-layout residual vector for a (possibly cloned)
    /// rollout state.
    pub fn residual(&self, model: &TaskModel, state: &SimState) -> Result<Vec<f64>> {
        let clip = *model.clip(self.mode.current_mode)?;
        let cursor = PlaybackCursor::at(&clip, state.time - self.mode.reference_time);
        let raw = cursor.blend_markers(model);

        let anchor_pos = state.xpos[self.handles.board_body];
        let anchor_mat = state.xmat[self.handles.board_body];
        let goal = state.marker_pos[self.handles.goal_marker];
        let reference = synthesize_reference(
            &self.handles,
            &self.params,
            &anchor_pos,
            &anchor_mat,
            &goal,
            &raw,
            state.time,
        );

        residual::assemble(model, &self.handles, &self.params, &cursor, &reference, state)
    }

    /// Run the once-per-step transition on the canonical state.
    pub fn transition(
        &mut self,
        model: &TaskModel,
        state: &mut SimState,
        requested_mode: usize,
    ) -> Result<()> {
        transition::run(
            model,
            &self.handles,
            &self.params,
            &mut self.mode,
            state,
            requested_mode,
            self.coin.as_mut(),
        )
    }

    /// Visualization hook; intentionally a no-op in this core.
    pub fn modify_scene(&self) {}
}

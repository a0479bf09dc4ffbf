//! Goal relocation.
//!
//! When the board gets within reach of the goal, the goal jumps ahead of
//! and to one random side of the board, in the board's heading frame at the
//! instant of arrival. The goal marker is the only state this module
//! touches, and it moves at most once per step.

use nalgebra::{Vector2, Vector3};
use rand::Rng;

use crate::handles::Handles;
use crate::state::SimState;
use crate::synthesis::heading_xy;

/// Planar board-to-goal distance below which the goal relocates.
pub const GOAL_REACH_THRESHOLD: f64 = 0.5;
/// Forward offset of the relocated goal along the board heading.
pub const GOAL_FORWARD_DISTANCE: f64 = 8.0;
/// Lateral offset of the relocated goal, side chosen at random.
pub const GOAL_SIDE_DISTANCE: f64 = 2.0;

/// Uniform-boolean randomness source for the side choice. Injectable so
/// tests can substitute a deterministic generator.
pub trait CoinFlip {
    /// Draw one uniformly random boolean.
    fn flip(&mut self) -> bool;
}

/// Default randomness source: fresh OS-seeded entropy on every draw.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadCoin;

impl CoinFlip for ThreadCoin {
    fn flip(&mut self) -> bool {
        rand::thread_rng().gen_bool(0.5)
    }
}

/// Adapter making any [`rand::Rng`] a coin-flip source.
#[derive(Debug, Clone)]
pub struct RngCoin<R>(pub R);

impl<R: Rng> CoinFlip for RngCoin<R> {
    fn flip(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }
}

/// Relocate the goal if the board has reached it. Returns whether the goal
/// moved.
///
/// The new goal is `8.0 * heading ± 2.0 * perp(heading)` from the board,
/// using the board heading at this instant; the goal keeps its vertical
/// coordinate.
pub fn relocate_goal_if_reached(
    state: &mut SimState,
    handles: &Handles,
    coin: &mut dyn CoinFlip,
) -> bool {
    let anchor = state.xpos[handles.board_body];
    let goal = state.marker_pos[handles.goal_marker];

    let planar = Vector2::new(goal.x - anchor.x, goal.y - anchor.y).norm();
    if planar >= GOAL_REACH_THRESHOLD {
        return false;
    }

    let heading = heading_xy(&state.xmat[handles.board_body]);
    let perpendicular = if coin.flip() {
        Vector2::new(-heading.y, heading.x)
    } else {
        Vector2::new(heading.y, -heading.x)
    };

    let offset = heading * GOAL_FORWARD_DISTANCE + perpendicular * GOAL_SIDE_DISTANCE;
    let new_goal = Vector3::new(anchor.x + offset.x, anchor.y + offset.y, goal.z);

    tracing::info!(
        x = new_goal.x,
        y = new_goal.y,
        "goal reached, relocating ahead of the board"
    );
    state.marker_pos[handles.goal_marker] = new_goal;
    true
}

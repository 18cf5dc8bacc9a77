use auv_core::{ObstacleSet, Position};

use crate::PlanningResult;

/// A route planner over a fixed grid.
///
/// Implementations own any scratch state they need (node arenas, random
/// generators, learned weights), hence `&mut self`. Start and goal are
/// assumed to be in bounds and not obstacles.
pub trait PathFinder {
    /// Plan a route from `start` to `goal` avoiding `obstacles`.
    fn find_path(
        &mut self,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> PlanningResult;

    /// Short human-readable name.
    fn name(&self) -> &'static str;

    /// One-line description of the planner's trade-offs.
    fn description(&self) -> &'static str;
}

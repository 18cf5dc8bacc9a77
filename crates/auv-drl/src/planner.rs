use std::time::Instant;

use auv_core::{GridSize, ObstacleSet, Position};
use auv_paths::{AStarPlanner, PathFinder, PlanningResult, smooth};

use crate::config::DrlConfig;
use crate::episode::{Agent, Episode, StepOutcome};

/// Deep Q-learning planner with A* fallback.
///
/// Each [`find_path`](PathFinder::find_path) call runs one episode from
/// start toward goal, learning online. The visited trace is shortcut the
/// same way RRT paths are. Paths are not guaranteed shortest and may
/// differ between calls as the model keeps learning.
pub struct DrlPlanner {
    size: GridSize,
    config: DrlConfig,
    agent: Option<Agent>,
    astar: AStarPlanner,
}

impl DrlPlanner {
    /// Build the model. A failure is logged and leaves the planner
    /// permanently delegating to A*.
    pub fn new(size: GridSize, config: DrlConfig) -> Self {
        let agent = match Agent::new(&config) {
            Ok(agent) => Some(agent),
            Err(e) => {
                log::warn!("DRL model initialization failed ({e}); using A* for all queries");
                None
            }
        };
        Self {
            size,
            config,
            agent,
            astar: AStarPlanner::new(size),
        }
    }

    /// The planner's tunables.
    pub fn config(&self) -> &DrlConfig {
        &self.config
    }

    /// Whether the model failed to initialize.
    pub fn is_degraded(&self) -> bool {
        self.agent.is_none()
    }

    /// Transitions currently held in the replay buffer.
    pub fn experience_len(&self) -> usize {
        self.agent.as_ref().map_or(0, Agent::replay_len)
    }
}

impl PathFinder for DrlPlanner {
    fn find_path(
        &mut self,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> PlanningResult {
        let started = Instant::now();
        let Some(agent) = self.agent.as_mut() else {
            return self.astar.find_path(start, goal, obstacles);
        };

        let mut episode = Episode::new(self.size, start, goal, obstacles, &self.config);
        let outcome = loop {
            match episode.step(agent) {
                Ok(StepOutcome::Continue) => {}
                other => break other,
            }
        };

        match outcome {
            Ok(StepOutcome::GaveUp) => {
                log::warn!(
                    "DRL {start} -> {goal}: {} consecutive blocked moves, falling back to A*",
                    self.config.max_failed_attempts
                );
                self.astar.find_path(start, goal, obstacles)
            }
            Err(e) => {
                log::warn!("DRL {start} -> {goal}: {e}, falling back to A*");
                self.astar.find_path(start, goal, obstacles)
            }
            Ok(reached) => {
                if reached == StepOutcome::OutOfSteps {
                    log::debug!(
                        "DRL {start} -> {goal}: step budget of {} exhausted, returning partial trace",
                        self.config.max_steps
                    );
                }
                let size = self.size;
                let check = self.config.check;
                let path = smooth::optimize(episode.trace(), None, |a, b| {
                    check.is_clear(size, obstacles, a, b)
                });
                let result = PlanningResult::new(path, episode.steps(), started);
                log::debug!(
                    "DRL {} -> {}: {} waypoints, {} decisions, {:.3} ms",
                    start,
                    goal,
                    result.path.len(),
                    result.nodes_explored,
                    result.execution_time_ms
                );
                result
            }
        }
    }

    fn name(&self) -> &'static str {
        "Deep Q-Learning"
    }

    fn description(&self) -> &'static str {
        "Uses neural networks to learn optimal paths through experience. Adapts to complex environments."
    }
}

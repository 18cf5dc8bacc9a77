//! Rapidly-exploring random tree planner over the integer grid.

use std::collections::HashSet;
use std::time::Instant;

use auv_core::{GridSize, ObstacleSet, Position};
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};

use crate::astar::AStarPlanner;
use crate::result::PlanningResult;
use crate::segment::SegmentCheck;
use crate::smooth;
use crate::traits::PathFinder;

/// Tunables for [`RrtPlanner`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RrtConfig {
    /// Sampling iterations before giving up.
    pub max_iterations: usize,
    /// Maximum tree extension per iteration, in cells.
    pub step_size: f64,
    /// Base probability of sampling the goal itself.
    pub goal_bias: f64,
    /// Upper bound the goal bias may rise to while progress stalls.
    pub max_goal_bias: f64,
    /// Bias increase applied after each stalled window.
    pub goal_bias_step: f64,
    /// Iterations without a closer node before the bias rises.
    pub stall_window: usize,
    /// A new node closer than this to the goal tries to connect to it.
    pub near_goal_threshold: f64,
    /// Queries shorter than this (and with few obstacles) go to A*.
    pub direct_distance: f64,
    /// Obstacle count below which short queries go to A*.
    pub direct_max_obstacles: usize,
    /// Segments longer than this get a validated midpoint when smoothing.
    pub split_length: f64,
    /// Collision test used for every tree edge and smoothing shortcut.
    pub check: SegmentCheck,
    /// Fixed seed for reproducible runs; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            step_size: 2.0,
            goal_bias: 0.2,
            max_goal_bias: 0.4,
            goal_bias_step: 0.05,
            stall_window: 100,
            near_goal_threshold: 2.5,
            direct_distance: 10.0,
            direct_max_obstacles: 5,
            split_length: 8.0,
            check: SegmentCheck::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TreeNode {
    pos: Position,
    parent: Option<usize>,
}

/// Sampling-based planner for cluttered grids.
///
/// Paths are collision-free by [`SegmentCheck`] but generally not
/// shortest, and successive calls on the same inputs may differ.
pub struct RrtPlanner {
    size: GridSize,
    config: RrtConfig,
    rng: SmallRng,
    astar: AStarPlanner,
}

impl RrtPlanner {
    /// Create a planner with the given tunables.
    pub fn new(size: GridSize, config: RrtConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        Self {
            size,
            rng: SmallRng::seed_from_u64(seed),
            astar: AStarPlanner::new(size),
            config,
        }
    }

    /// The planner's tunables.
    pub fn config(&self) -> &RrtConfig {
        &self.config
    }

    fn random_cell(&mut self) -> Position {
        Position::new(
            self.rng.random_range(0..self.size.width),
            self.rng.random_range(0..self.size.height),
        )
    }

    /// Move from `from` toward `to` by at most `step_size` cells.
    fn steer(&self, from: Position, to: Position) -> Position {
        let dist = from.distance(to);
        if dist <= self.config.step_size {
            return to;
        }
        let ratio = self.config.step_size / dist;
        Position::new(
            (f64::from(from.x) + f64::from(to.x - from.x) * ratio).round() as i32,
            (f64::from(from.y) + f64::from(to.y - from.y) * ratio).round() as i32,
        )
    }

    fn nearest(tree: &[TreeNode], target: Position) -> usize {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (i, node) in tree.iter().enumerate() {
            let d = node.pos.distance(target);
            if d < best_d {
                best_d = d;
                best = i;
            }
        }
        best
    }

    fn trace(tree: &[TreeNode], mut idx: usize) -> Vec<Position> {
        let mut path = vec![tree[idx].pos];
        while let Some(parent) = tree[idx].parent {
            path.push(tree[parent].pos);
            idx = parent;
        }
        path.reverse();
        path
    }

    fn optimize(&self, raw: &[Position], obstacles: &ObstacleSet) -> Vec<Position> {
        let size = self.size;
        let check = self.config.check;
        smooth::optimize(raw, Some(self.config.split_length), |a, b| {
            check.is_clear(size, obstacles, a, b)
        })
    }

    /// The sampling loop. Returns the path and the iteration count.
    fn grow(
        &mut self,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> (Vec<Position>, usize) {
        let cfg = self.config.clone();
        let mut tree = vec![TreeNode {
            pos: start,
            parent: None,
        }];
        let mut seen: HashSet<Position> = HashSet::from([start]);

        let mut best = 0;
        let mut best_dist = start.distance(goal);
        let mut bias = cfg.goal_bias;
        let mut stalled = 0usize;
        let mut iterations = 0usize;

        while iterations < cfg.max_iterations {
            iterations += 1;

            let target = if self.rng.random::<f64>() < bias {
                goal
            } else {
                self.random_cell()
            };
            let near = Self::nearest(&tree, target);
            let from = tree[near].pos;
            let new = self.steer(from, target);

            let mut improved = false;
            if !seen.contains(&new) && cfg.check.is_clear(self.size, obstacles, from, new) {
                seen.insert(new);
                tree.push(TreeNode {
                    pos: new,
                    parent: Some(near),
                });
                let idx = tree.len() - 1;

                let d = new.distance(goal);
                if d < best_dist {
                    best_dist = d;
                    best = idx;
                    improved = true;
                }

                if d < cfg.near_goal_threshold && cfg.check.is_clear(self.size, obstacles, new, goal) {
                    let mut raw = Self::trace(&tree, idx);
                    if new != goal {
                        raw.push(goal);
                    }
                    return (self.optimize(&raw, obstacles), iterations);
                }
            }

            if improved {
                stalled = 0;
                bias = cfg.goal_bias;
            } else {
                stalled += 1;
                if stalled >= cfg.stall_window {
                    stalled = 0;
                    bias = (bias + cfg.goal_bias_step).min(cfg.max_goal_bias);
                }
            }
        }

        log::warn!(
            "RRT {} -> {}: no connection after {} iterations, returning partial path ({:.1} cells short)",
            start,
            goal,
            iterations,
            best_dist
        );
        let mut path = self.optimize(&Self::trace(&tree, best), obstacles);
        if path.last() != Some(&goal) {
            path.push(goal);
        }
        (path, iterations)
    }
}

impl PathFinder for RrtPlanner {
    fn find_path(
        &mut self,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> PlanningResult {
        let started = Instant::now();

        if start == goal {
            return PlanningResult::new(vec![start], 1, started);
        }
        if self.config.check.is_clear(self.size, obstacles, start, goal) {
            log::debug!("RRT {start} -> {goal}: direct line is clear");
            return PlanningResult::new(vec![start, goal], 1, started);
        }
        if start.distance(goal) < self.config.direct_distance
            && obstacles.len() < self.config.direct_max_obstacles
        {
            log::debug!("RRT {start} -> {goal}: short query, delegating to A*");
            return self.astar.find_path(start, goal, obstacles);
        }

        let (path, iterations) = self.grow(start, goal, obstacles);
        let result = PlanningResult::new(path, iterations, started);
        log::debug!(
            "RRT {} -> {}: {} waypoints, {} iterations, {:.3} ms",
            start,
            goal,
            result.path.len(),
            result.nodes_explored,
            result.execution_time_ms
        );
        result
    }

    fn name(&self) -> &'static str {
        "RRT (Rapidly-exploring Random Tree)"
    }

    fn description(&self) -> &'static str {
        "Efficient for complex environments, uses random sampling to explore space quickly."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner(seed: u64) -> RrtPlanner {
        RrtPlanner::new(
            GridSize::default(),
            RrtConfig {
                seed: Some(seed),
                ..RrtConfig::default()
            },
        )
    }

    fn assert_segments_clear(path: &[Position], obstacles: &ObstacleSet) {
        let check = SegmentCheck::default();
        for w in path.windows(2) {
            assert!(
                check.is_clear(GridSize::default(), obstacles, w[0], w[1]),
                "segment {} -> {} collides",
                w[0],
                w[1]
            );
        }
    }

    #[test]
    fn clear_line_returns_two_waypoints() {
        let mut rrt = planner(1);
        let r = rrt.find_path(Position::new(4, 10), Position::new(25, 10), &ObstacleSet::new());
        assert_eq!(r.path, vec![Position::new(4, 10), Position::new(25, 10)]);
    }

    #[test]
    fn short_query_delegates_to_astar() {
        let mut rrt = planner(2);
        let obstacles: ObstacleSet = [Position::new(3, 3)].into_iter().collect();
        let start = Position::new(1, 3);
        let goal = Position::new(5, 3);
        let r = rrt.find_path(start, goal, &obstacles);
        let expected = AStarPlanner::new(GridSize::default()).find_path(start, goal, &obstacles);
        assert_eq!(r.path, expected.path);
    }

    #[test]
    fn routes_around_wall_with_clear_segments() {
        // Vertical wall x = 15, y = 3..=16; open above and below.
        let obstacles: ObstacleSet = (3..=16).map(|y| Position::new(15, y)).collect();
        for seed in [3, 11, 42] {
            let mut rrt = planner(seed);
            let r = rrt.find_path(Position::new(5, 10), Position::new(25, 10), &obstacles);
            assert_eq!(r.path.first(), Some(&Position::new(5, 10)));
            assert_eq!(r.path.last(), Some(&Position::new(25, 10)));
            assert!(r.nodes_explored > 0);
            assert_segments_clear(&r.path, &obstacles);
            for p in &r.path {
                assert!(!obstacles.contains(*p));
            }
        }
    }

    #[test]
    fn steer_clamps_to_step_size() {
        let rrt = planner(4);
        let from = Position::new(0, 0);
        assert_eq!(rrt.steer(from, Position::new(1, 1)), Position::new(1, 1));
        assert_eq!(rrt.steer(from, Position::new(10, 0)), Position::new(2, 0));
        let p = rrt.steer(from, Position::new(10, 10));
        assert!(from.distance(p) <= 2.0 + 0.5);
    }

    #[test]
    fn unreachable_goal_returns_partial_path_ending_at_goal() {
        let goal = Position::new(25, 10);
        let mut obstacles: ObstacleSet = goal.neighbors_8().into_iter().collect();
        obstacles.insert(Position::new(20, 10));
        let mut rrt = RrtPlanner::new(
            GridSize::default(),
            RrtConfig {
                seed: Some(5),
                max_iterations: 300,
                ..RrtConfig::default()
            },
        );
        let r = rrt.find_path(Position::new(4, 10), goal, &obstacles);
        assert_eq!(r.nodes_explored, 300);
        assert_eq!(r.path.first(), Some(&Position::new(4, 10)));
        assert_eq!(r.path.last(), Some(&goal));
        // Everything but the appended last leg is collision-free.
        assert_segments_clear(&r.path[..r.path.len() - 1], &obstacles);
    }
}

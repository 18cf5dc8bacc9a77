//! Headless simulation loop: one planner poll and one move per tick.

use std::time::Instant;

use auv_core::{FieldError, GridSize, ObstacleSet, Position, random_obstacles};
use auv_paths::manhattan;
use rand::Rng;

use crate::algorithm::Algorithm;
use crate::config::NavConfig;
use crate::session::{NextMove, PathProvider, PlannerSession, PlannerSet};

/// Result of one [`Simulation::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The vehicle advanced to this cell.
    Moved(Position),
    /// The vehicle is on the goal.
    Arrived,
    /// No path exists from the vehicle's cell.
    Blocked,
    /// The planned move left the grid or hit an obstacle; the vehicle
    /// stayed put and the next tick re-plans.
    Collided,
}

impl TickOutcome {
    /// Whether further ticks can change anything.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Arrived | Self::Blocked)
    }
}

/// Summary of a run so far.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationStats {
    /// Cells visited, start included.
    pub path_length: usize,
    pub total_moves: usize,
    pub collision_count: usize,
    pub obstacle_count: usize,
    /// Summed over every planner invocation of the run.
    pub nodes_explored: usize,
    /// Summed over every planner invocation of the run.
    pub planning_time_ms: f64,
    /// Wall time since the run (re)started, frozen on arrival.
    pub elapsed_ms: f64,
    pub average_time_per_move_ms: f64,
    /// Manhattan distance over moves taken; 1.0 is a perfect run.
    pub path_efficiency: f64,
    pub path_history: Vec<Position>,
}

/// A single vehicle driven toward a goal by a [`PlannerSession`].
pub struct Simulation<P = PlannerSet> {
    session: PlannerSession<P>,
    size: GridSize,
    start: Position,
    goal: Position,
    position: Position,
    obstacles: ObstacleSet,
    algorithm: Algorithm,
    history: Vec<Position>,
    moves: usize,
    collisions: usize,
    started: Instant,
    finished_ms: Option<f64>,
}

impl Simulation<PlannerSet> {
    /// A run from `config.start` to `config.goal` over the given obstacles.
    pub fn new(config: NavConfig, obstacles: ObstacleSet, algorithm: Algorithm) -> Self {
        let (size, start, goal) = (config.grid, config.start, config.goal);
        Self::with_session(PlannerSession::new(config), size, start, goal, obstacles, algorithm)
    }

    /// Like [`Simulation::new`] over `config.obstacle_count` random
    /// obstacles placed away from the start and goal.
    pub fn random(
        config: NavConfig,
        algorithm: Algorithm,
        rng: &mut impl Rng,
    ) -> Result<Self, FieldError> {
        let obstacles = random_obstacles(
            config.grid,
            config.obstacle_count,
            config.start,
            config.goal,
            rng,
        )?;
        Ok(Self::new(config, obstacles, algorithm))
    }
}

impl<P: PathProvider> Simulation<P> {
    pub fn with_session(
        session: PlannerSession<P>,
        size: GridSize,
        start: Position,
        goal: Position,
        obstacles: ObstacleSet,
        algorithm: Algorithm,
    ) -> Self {
        Self {
            session,
            size,
            start,
            goal,
            position: start,
            obstacles,
            algorithm,
            history: vec![start],
            moves: 0,
            collisions: 0,
            started: Instant::now(),
            finished_ms: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn session(&self) -> &PlannerSession<P> {
        &self.session
    }

    /// Poll the planner once and apply its move.
    pub fn tick(&mut self) -> TickOutcome {
        let next = self
            .session
            .next_move(self.position, self.goal, &self.obstacles, self.algorithm);
        match next {
            NextMove::Arrived => {
                if self.finished_ms.is_none() {
                    let elapsed = self.elapsed_ms();
                    self.finished_ms = Some(elapsed);
                    log::info!(
                        "arrived at {} after {} moves ({} collisions, {:.1} ms)",
                        self.goal,
                        self.moves,
                        self.collisions,
                        elapsed
                    );
                }
                TickOutcome::Arrived
            }
            NextMove::Blocked => {
                log::warn!("no path from {} to {}", self.position, self.goal);
                TickOutcome::Blocked
            }
            NextMove::Move(dir) => {
                let target = dir.apply(self.position);
                if !self.obstacles.is_free(self.size, target) {
                    self.collisions += 1;
                    self.session.discard_path();
                    log::warn!("move {dir} from {} collides at {target}", self.position);
                    return TickOutcome::Collided;
                }
                self.position = target;
                self.history.push(target);
                self.moves += 1;
                log::debug!("tick {}: {dir} -> {target}", self.moves);
                TickOutcome::Moved(target)
            }
        }
    }

    /// Tick until arrival, a dead end, or `max_ticks` ticks. Returns the
    /// last outcome, `None` when no tick ran.
    pub fn run(&mut self, max_ticks: usize) -> Option<TickOutcome> {
        let mut last = None;
        for _ in 0..max_ticks {
            let outcome = self.tick();
            last = Some(outcome);
            if outcome.is_terminal() {
                break;
            }
        }
        last
    }

    /// Move the goal. The path cache is cleared.
    pub fn set_goal(&mut self, goal: Position) {
        self.goal = goal;
        self.finished_ms = None;
        self.edited();
    }

    /// Replace the obstacle field. The path cache is cleared.
    pub fn set_obstacles(&mut self, obstacles: ObstacleSet) {
        self.obstacles = obstacles;
        self.edited();
    }

    /// Switch planners. The path cache is cleared.
    pub fn set_algorithm(&mut self, algorithm: Algorithm) {
        self.algorithm = algorithm;
        self.edited();
    }

    /// Put the vehicle back on the start and zero all counters.
    pub fn reset(&mut self) {
        self.position = self.start;
        self.history = vec![self.start];
        self.moves = 0;
        self.collisions = 0;
        self.started = Instant::now();
        self.finished_ms = None;
        self.session.reset_stats();
        self.edited();
    }

    fn edited(&mut self) {
        self.session.clear_path_cache();
        self.session.discard_path();
    }

    fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    pub fn stats(&self) -> SimulationStats {
        let planning = self.session.stats();
        let elapsed_ms = self.finished_ms.unwrap_or_else(|| self.elapsed_ms());
        let (average_time_per_move_ms, path_efficiency) = if self.moves == 0 {
            (0.0, 1.0)
        } else {
            let moves = self.moves as f64;
            (
                elapsed_ms / moves,
                f64::from(manhattan(self.start, self.goal)) / moves,
            )
        };
        SimulationStats {
            path_length: self.history.len(),
            total_moves: self.moves,
            collision_count: self.collisions,
            obstacle_count: self.obstacles.len(),
            nodes_explored: planning.nodes_explored,
            planning_time_ms: planning.planning_time_ms,
            elapsed_ms,
            average_time_per_move_ms,
            path_efficiency,
            path_history: self.history.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn open_sim(algorithm: Algorithm) -> Simulation {
        Simulation::new(NavConfig::default(), ObstacleSet::new(), algorithm)
    }

    #[test]
    fn astar_run_is_perfectly_efficient() {
        let mut sim = open_sim(Algorithm::AStar);
        assert_eq!(sim.run(100), Some(TickOutcome::Arrived));
        let stats = sim.stats();
        assert_eq!(sim.position(), Position::new(25, 10));
        assert_eq!(stats.total_moves, 21);
        assert_eq!(stats.path_length, 22);
        assert_eq!(stats.collision_count, 0);
        assert_eq!(stats.path_efficiency, 1.0);
        assert_eq!(stats.path_history.first(), Some(&Position::new(4, 10)));
        assert!(stats.nodes_explored >= 22);
    }

    #[test]
    fn run_respects_tick_budget() {
        let mut sim = open_sim(Algorithm::AStar);
        assert_eq!(sim.run(0), None);
        assert_eq!(sim.run(5), Some(TickOutcome::Moved(Position::new(9, 10))));
        assert_eq!(sim.stats().total_moves, 5);
    }

    #[test]
    fn rrt_clear_line_is_followed_cell_by_cell() {
        let mut sim = open_sim(Algorithm::Rrt);
        assert_eq!(sim.run(100), Some(TickOutcome::Arrived));
        assert_eq!(sim.stats().total_moves, 21);
    }

    #[test]
    fn enclosed_goal_blocks() {
        let cfg = NavConfig::default();
        let obstacles: ObstacleSet = cfg.goal.neighbors_4().into_iter().collect();
        let mut sim = Simulation::new(cfg, obstacles, Algorithm::AStar);
        assert_eq!(sim.run(10), Some(TickOutcome::Blocked));
        assert_eq!(sim.stats().total_moves, 0);
        assert_eq!(sim.stats().path_efficiency, 1.0);
    }

    #[test]
    fn edits_clear_cache_and_reset_restarts() {
        let mut sim = open_sim(Algorithm::AStar);
        sim.run(3);
        assert_eq!(sim.session().cache_len(), 1);

        sim.set_goal(Position::new(7, 15));
        assert_eq!(sim.session().cache_len(), 0);
        assert_eq!(sim.run(100), Some(TickOutcome::Arrived));
        assert_eq!(sim.position(), Position::new(7, 15));

        sim.set_algorithm(Algorithm::Rrt);
        assert_eq!(sim.algorithm(), Algorithm::Rrt);
        sim.reset();
        assert_eq!(sim.position(), sim.start());
        let stats = sim.stats();
        assert_eq!(stats.total_moves, 0);
        assert_eq!(stats.nodes_explored, 0);
        assert_eq!(stats.path_history, vec![sim.start()]);
    }

    #[test]
    fn random_field_keeps_endpoints_clear() {
        let mut rng = SmallRng::seed_from_u64(21);
        let sim = Simulation::random(NavConfig::default(), Algorithm::AStar, &mut rng).unwrap();
        assert_eq!(sim.obstacles().len(), 5);
        assert!(!sim.obstacles().contains(sim.start()));
        assert!(!sim.obstacles().contains(sim.goal()));
    }

    #[test]
    fn too_many_obstacles_is_an_error() {
        let mut rng = SmallRng::seed_from_u64(1);
        let cfg = NavConfig {
            obstacle_count: 10_000,
            ..NavConfig::default()
        };
        assert!(Simulation::random(cfg, Algorithm::AStar, &mut rng).is_err());
    }
}

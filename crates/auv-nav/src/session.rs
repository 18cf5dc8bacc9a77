//! Turning planned paths into one discrete move per tick.
//!
//! A [`PlannerSession`] remembers the path it is currently following and
//! the inputs it was planned for. Each [`PlannerSession::next_move`] call
//! decides whether those inputs still hold; if not, it asks its
//! [`PathProvider`] for a fresh path. Found paths may also be memoized per
//! [`PlanKey`] according to the [`CachePolicy`].

use std::collections::HashMap;
use std::fmt;

use auv_core::{Direction, ObstacleSet, Position};
use auv_paths::{PathFinder, PlanningResult, smooth};

use crate::algorithm::{Algorithm, Planner};
use crate::config::{CachePolicy, NavConfig};

/// Source of fresh paths for a session.
pub trait PathProvider {
    fn plan(
        &mut self,
        algorithm: Algorithm,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> PlanningResult;
}

/// One persistent planner per algorithm, built on first use.
///
/// Keeping planners alive lets the DRL planner carry its learned weights
/// and replay buffer from one query to the next.
pub struct PlannerSet {
    config: NavConfig,
    planners: [Option<Planner>; 3],
}

impl PlannerSet {
    pub fn new(config: NavConfig) -> Self {
        Self {
            config,
            planners: [None, None, None],
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// The planner for `algorithm`, creating it if needed.
    pub fn planner(&mut self, algorithm: Algorithm) -> &mut Planner {
        let config = &self.config;
        self.planners[algorithm.slot()].get_or_insert_with(|| {
            log::debug!("creating {algorithm} planner");
            Planner::new(algorithm, config)
        })
    }
}

impl PathProvider for PlannerSet {
    fn plan(
        &mut self,
        algorithm: Algorithm,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> PlanningResult {
        self.planner(algorithm).find_path(start, goal, obstacles)
    }
}

/// What the vehicle should do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextMove {
    /// The vehicle stands on the goal.
    Arrived,
    /// No usable path exists from the current cell.
    Blocked,
    /// Take one step.
    Move(Direction),
}

impl NextMove {
    /// Integer form: the direction code, or `-1` for both
    /// [`Arrived`](NextMove::Arrived) and [`Blocked`](NextMove::Blocked).
    pub fn code(self) -> i32 {
        match self {
            Self::Move(d) => d.code(),
            Self::Arrived | Self::Blocked => -1,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Move(d) => Some(d),
            _ => None,
        }
    }
}

/// Cache key: algorithm, start, goal and the obstacle cells in row-major
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlanKey {
    pub algorithm: Algorithm,
    pub start: Position,
    pub goal: Position,
    pub obstacles: Vec<Position>,
}

impl PlanKey {
    pub fn new(
        algorithm: Algorithm,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> Self {
        Self {
            algorithm,
            start,
            goal,
            obstacles: obstacles.sorted(),
        }
    }

    /// Same goal, obstacles and algorithm; the start may differ.
    fn same_target(&self, other: &PlanKey) -> bool {
        self.algorithm == other.algorithm
            && self.goal == other.goal
            && self.obstacles == other.obstacles
    }
}

impl fmt::Display for PlanKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{},{}-{},{}-",
            self.algorithm, self.start.x, self.start.y, self.goal.x, self.goal.y
        )?;
        for (i, p) in self.obstacles.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{},{}", p.x, p.y)?;
        }
        Ok(())
    }
}

/// Planner diagnostics accumulated by a session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    /// Planner invocations.
    pub plans: usize,
    /// Calls answered from the cache.
    pub cache_hits: usize,
    pub nodes_explored: usize,
    pub planning_time_ms: f64,
}

/// Per-vehicle planning state: the followed path, the inputs it was
/// planned for and the path cache.
///
/// Calls must be serialized by the caller; `&mut self` makes at most one
/// plan in flight.
pub struct PlannerSession<P = PlannerSet> {
    provider: P,
    policy: CachePolicy,
    cache: HashMap<PlanKey, Vec<Position>>,
    path: Vec<Position>,
    last: Option<PlanKey>,
    stats: SessionStats,
}

impl PlannerSession<PlannerSet> {
    /// A session backed by the built-in planners.
    pub fn new(config: NavConfig) -> Self {
        let policy = config.cache_policy;
        Self::with_provider(PlannerSet::new(config), policy)
    }
}

impl<P: PathProvider> PlannerSession<P> {
    pub fn with_provider(provider: P, policy: CachePolicy) -> Self {
        Self {
            provider,
            policy,
            cache: HashMap::new(),
            path: Vec::new(),
            last: None,
            stats: SessionStats::default(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.policy
    }

    /// The 4-connected path currently being followed.
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    /// Drop every memoized path.
    pub fn clear_path_cache(&mut self) {
        log::debug!("clearing path cache ({} entries)", self.cache.len());
        self.cache.clear();
    }

    /// Forget the followed path so the next call re-plans.
    pub fn discard_path(&mut self) {
        self.path.clear();
    }

    /// Integer form of [`next_move`](Self::next_move) keyed by algorithm
    /// id: `0..=3` is a move, `-1` means arrived or blocked. Unknown ids
    /// select A*.
    pub fn predict_next_move(
        &mut self,
        current: Position,
        goal: Position,
        obstacles: &ObstacleSet,
        algorithm_id: &str,
    ) -> i32 {
        self.next_move(current, goal, obstacles, Algorithm::from_id(algorithm_id))
            .code()
    }

    /// The move to make from `current` toward `goal`.
    pub fn next_move(
        &mut self,
        current: Position,
        goal: Position,
        obstacles: &ObstacleSet,
        algorithm: Algorithm,
    ) -> NextMove {
        let key = PlanKey::new(algorithm, current, goal, obstacles);

        let fresh = self.needs_replan(&key);
        if fresh {
            self.replan(key.clone(), obstacles);
        } else if let Some(cached) = self.cache.get(&key) {
            log::debug!("path cache hit for {key}");
            self.stats.cache_hits += 1;
            self.path.clone_from(cached);
        }

        let mut step = self.step_from(current);
        if step.is_none() && !fresh && current != goal && self.path.last() == Some(&current) {
            // Standing at the end of a partial path.
            log::debug!("partial path ends at {current}, re-planning toward {goal}");
            self.replan(key, obstacles);
            step = self.step_from(current);
        }

        match step {
            Some(next) => Direction::between(current, next).map_or(NextMove::Blocked, NextMove::Move),
            None if current == goal && self.path.last() == Some(&goal) => NextMove::Arrived,
            None => NextMove::Blocked,
        }
    }

    fn needs_replan(&self, key: &PlanKey) -> bool {
        self.path.is_empty()
            || !self.path.contains(&key.start)
            || self.last.as_ref().is_none_or(|last| !last.same_target(key))
    }

    /// The cell after the last visit of `current` on the followed path.
    fn step_from(&self, current: Position) -> Option<Position> {
        let idx = self.path.iter().rposition(|&p| p == current)?;
        self.path.get(idx + 1).copied()
    }

    fn replan(&mut self, key: PlanKey, obstacles: &ObstacleSet) {
        let result = self
            .provider
            .plan(key.algorithm, key.start, key.goal, obstacles);
        self.stats.plans += 1;
        self.stats.nodes_explored += result.nodes_explored;
        self.stats.planning_time_ms += result.execution_time_ms;

        let path = smooth::densify(&result.path);
        if path.is_empty() {
            log::warn!("no path found: {} -> {} ({})", key.start, key.goal, key.algorithm);
        } else if self.policy == CachePolicy::All || key.algorithm.is_deterministic() {
            self.cache.insert(key.clone(), path.clone());
        }
        self.path = path;
        self.last = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out prepared paths in order, then empty ones.
    struct Scripted {
        paths: Vec<Vec<Position>>,
        calls: usize,
    }

    impl Scripted {
        fn new(paths: Vec<Vec<Position>>) -> Self {
            Self { paths, calls: 0 }
        }
    }

    impl PathProvider for Scripted {
        fn plan(
            &mut self,
            _algorithm: Algorithm,
            _start: Position,
            _goal: Position,
            _obstacles: &ObstacleSet,
        ) -> PlanningResult {
            let path = self.paths.get(self.calls).cloned().unwrap_or_default();
            self.calls += 1;
            PlanningResult {
                path,
                nodes_explored: 3,
                execution_time_ms: 0.5,
            }
        }
    }

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn next_move_codes() {
        assert_eq!(NextMove::Arrived.code(), -1);
        assert_eq!(NextMove::Blocked.code(), -1);
        assert_eq!(NextMove::Move(Direction::Left).code(), 0);
        assert_eq!(NextMove::Move(Direction::Down).code(), 3);
        assert_eq!(NextMove::Move(Direction::Up).direction(), Some(Direction::Up));
        assert_eq!(NextMove::Blocked.direction(), None);
    }

    #[test]
    fn plan_key_is_order_independent() {
        let a: ObstacleSet = [p(3, 1), p(1, 2), p(0, 1)].into_iter().collect();
        let b: ObstacleSet = [p(1, 2), p(0, 1), p(3, 1)].into_iter().collect();
        let ka = PlanKey::new(Algorithm::Rrt, p(4, 10), p(25, 10), &a);
        let kb = PlanKey::new(Algorithm::Rrt, p(4, 10), p(25, 10), &b);
        assert_eq!(ka, kb);
        assert_eq!(ka.to_string(), "rrt-4,10-25,10-0,1|3,1|1,2");
    }

    #[test]
    fn waypoints_are_densified() {
        let provider = Scripted::new(vec![vec![p(0, 0), p(3, 0), p(3, 2)]]);
        let mut s = PlannerSession::with_provider(provider, CachePolicy::All);
        let obstacles = ObstacleSet::new();
        let m = s.next_move(p(0, 0), p(3, 2), &obstacles, Algorithm::Rrt);
        assert_eq!(m, NextMove::Move(Direction::Right));
        assert_eq!(s.path().len(), 6);
        assert_eq!(s.stats().nodes_explored, 3);
    }

    #[test]
    fn partial_path_replans_then_blocks() {
        let goal = p(5, 0);
        let provider = Scripted::new(vec![vec![p(0, 0), p(1, 0)], vec![p(1, 0)]]);
        let mut s = PlannerSession::with_provider(provider, CachePolicy::All);
        let obstacles = ObstacleSet::new();

        assert_eq!(
            s.next_move(p(0, 0), goal, &obstacles, Algorithm::AStar),
            NextMove::Move(Direction::Right)
        );
        // At the end of the partial path: one re-plan that makes no progress.
        assert_eq!(s.next_move(p(1, 0), goal, &obstacles, Algorithm::AStar), NextMove::Blocked);
        assert_eq!(s.provider().calls, 2);
    }

    #[test]
    fn partial_path_replan_can_continue() {
        let goal = p(3, 0);
        let provider = Scripted::new(vec![vec![p(0, 0), p(1, 0)], vec![p(1, 0), p(3, 0)]]);
        let mut s = PlannerSession::with_provider(provider, CachePolicy::All);
        let obstacles = ObstacleSet::new();
        s.next_move(p(0, 0), goal, &obstacles, Algorithm::AStar);
        assert_eq!(
            s.next_move(p(1, 0), goal, &obstacles, Algorithm::AStar),
            NextMove::Move(Direction::Right)
        );
        assert_eq!(s.path(), &[p(1, 0), p(2, 0), p(3, 0)]);
    }

    #[test]
    fn empty_plan_is_blocked_and_not_cached() {
        let mut s = PlannerSession::with_provider(Scripted::new(vec![]), CachePolicy::All);
        let m = s.next_move(p(0, 0), p(4, 4), &ObstacleSet::new(), Algorithm::AStar);
        assert_eq!(m, NextMove::Blocked);
        assert_eq!(s.cache_len(), 0);
        // Still empty, so every call re-plans.
        s.next_move(p(0, 0), p(4, 4), &ObstacleSet::new(), Algorithm::AStar);
        assert_eq!(s.provider().calls, 2);
    }

    #[test]
    fn deterministic_only_policy_skips_randomized_planners() {
        let path = vec![p(0, 0), p(1, 0)];
        let provider = Scripted::new(vec![path.clone(), path.clone()]);
        let mut s = PlannerSession::with_provider(provider, CachePolicy::DeterministicOnly);
        let obstacles = ObstacleSet::new();
        s.next_move(p(0, 0), p(1, 0), &obstacles, Algorithm::Rrt);
        assert_eq!(s.cache_len(), 0);
        s.next_move(p(0, 0), p(1, 0), &obstacles, Algorithm::AStar);
        assert_eq!(s.cache_len(), 1);
    }

    #[test]
    fn discard_path_forces_replan() {
        let path = vec![p(0, 0), p(1, 0), p(2, 0)];
        let provider = Scripted::new(vec![path.clone(), path]);
        let mut s = PlannerSession::with_provider(provider, CachePolicy::All);
        let obstacles = ObstacleSet::new();
        s.next_move(p(0, 0), p(2, 0), &obstacles, Algorithm::AStar);
        s.next_move(p(0, 0), p(2, 0), &obstacles, Algorithm::AStar);
        assert_eq!(s.provider().calls, 1);
        s.discard_path();
        s.next_move(p(0, 0), p(2, 0), &obstacles, Algorithm::AStar);
        assert_eq!(s.provider().calls, 2);
    }
}

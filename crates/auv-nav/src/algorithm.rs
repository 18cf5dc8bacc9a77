//! Algorithm identifiers and the planner dispatch enum.

use std::fmt;
use std::str::FromStr;

use auv_core::{ObstacleSet, Position};
use auv_drl::DrlPlanner;
use auv_paths::{AStarPlanner, PathFinder, PlanningResult, RrtPlanner};

use crate::config::NavConfig;

/// The closed set of planning strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    #[default]
    AStar,
    Rrt,
    Drl,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::AStar, Algorithm::Rrt, Algorithm::Drl];

    /// Lenient lookup: unknown identifiers select A*.
    pub fn from_id(id: &str) -> Self {
        id.parse().unwrap_or_else(|e: UnknownAlgorithm| {
            log::debug!("{e}, defaulting to astar");
            Self::AStar
        })
    }

    /// The identifier accepted by [`Algorithm::from_id`].
    pub const fn id(self) -> &'static str {
        match self {
            Self::AStar => "astar",
            Self::Rrt => "rrt",
            Self::Drl => "drl",
        }
    }

    /// Whether two calls with the same inputs always produce the same path.
    pub const fn is_deterministic(self) -> bool {
        matches!(self, Self::AStar)
    }

    pub(crate) const fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returned by the strict [`FromStr`] parse of an [`Algorithm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown algorithm {:?} (expected astar, rrt or drl)", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "astar" | "a*" => Ok(Self::AStar),
            "rrt" => Ok(Self::Rrt),
            "drl" => Ok(Self::Drl),
            _ => Err(UnknownAlgorithm(s.to_owned())),
        }
    }
}

/// A concrete planner, resolved from an [`Algorithm`].
pub enum Planner {
    AStar(AStarPlanner),
    Rrt(RrtPlanner),
    Drl(Box<DrlPlanner>),
}

impl Planner {
    /// Build the planner for `algorithm` from the session tunables.
    pub fn new(algorithm: Algorithm, config: &NavConfig) -> Self {
        match algorithm {
            Algorithm::AStar => {
                Self::AStar(AStarPlanner::new(config.grid).with_diagonals(config.diagonals))
            }
            Algorithm::Rrt => Self::Rrt(RrtPlanner::new(config.grid, config.rrt.clone())),
            Algorithm::Drl => Self::Drl(Box::new(DrlPlanner::new(config.grid, config.drl.clone()))),
        }
    }

    /// The algorithm this planner implements.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::AStar(_) => Algorithm::AStar,
            Self::Rrt(_) => Algorithm::Rrt,
            Self::Drl(_) => Algorithm::Drl,
        }
    }
}

impl PathFinder for Planner {
    fn find_path(
        &mut self,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> PlanningResult {
        match self {
            Self::AStar(p) => p.find_path(start, goal, obstacles),
            Self::Rrt(p) => p.find_path(start, goal, obstacles),
            Self::Drl(p) => p.find_path(start, goal, obstacles),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::AStar(p) => p.name(),
            Self::Rrt(p) => p.name(),
            Self::Drl(p) => p.name(),
        }
    }

    fn description(&self) -> &'static str {
        match self {
            Self::AStar(p) => p.description(),
            Self::Rrt(p) => p.description(),
            Self::Drl(p) => p.description(),
        }
    }
}

/// Pure factory over the closed identifier set; unknown ids give A*.
pub fn select_planner(id: &str, config: &NavConfig) -> Planner {
    Planner::new(Algorithm::from_id(id), config)
}

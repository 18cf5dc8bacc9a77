use auv_core::{GridSize, Position};
use auv_drl::DrlConfig;
use auv_paths::RrtConfig;

/// Which planner results the session may memoize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CachePolicy {
    /// Cache every planner, including the randomized ones. A later hit
    /// replays a path from an earlier random run.
    All,
    /// Cache only planners whose output is a pure function of the inputs.
    #[default]
    DeterministicOnly,
}

/// Everything a navigation session and its simulation need.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Grid extents shared by every planner.
    pub grid: GridSize,
    /// Allow 8-connected moves in A*. The session still densifies to
    /// 4-connected moves before following a path.
    pub diagonals: bool,
    pub rrt: RrtConfig,
    pub drl: DrlConfig,
    pub cache_policy: CachePolicy,
    /// Default vehicle start.
    pub start: Position,
    /// Default goal.
    pub goal: Position,
    /// Number of random obstacles for a generated field.
    pub obstacle_count: usize,
    /// Seed for the generated field; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::default(),
            diagonals: false,
            rrt: RrtConfig::default(),
            drl: DrlConfig::default(),
            cache_policy: CachePolicy::default(),
            start: Position::new(4, 10),
            goal: Position::new(25, 10),
            obstacle_count: 5,
            seed: None,
        }
    }
}

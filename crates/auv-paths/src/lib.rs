//! Path planners for a 2D grid with static obstacles.
//!
//! This crate provides the deterministic and sampling-based planners of
//! the AUV engine, plus the geometric post-processing they share:
//!
//! - **A\*** shortest-path search ([`AStarPlanner`]), 4- or 8-connected
//! - **RRT** sampling-based search ([`RrtPlanner`]) with A* delegation for
//!   easy queries
//! - **Segment checks** at sub-cell resolution with a safety margin
//!   ([`SegmentCheck`])
//! - **Path post-processing**: shortcutting, straight-run collapse and
//!   4-connected densification ([`smooth`])
//!
//! Every planner implements [`PathFinder`] and reports a
//! [`PlanningResult`]. Planners never fail loudly: an unreachable goal
//! yields an empty path (or a best-effort partial path for RRT).

mod astar;
mod distance;
mod neighbors;
mod result;
mod rrt;
mod segment;
pub mod smooth;
mod traits;

pub use astar::{AStarPlanner, DIAGONAL_COST, STRAIGHT_COST};
pub use distance::manhattan;
pub use neighbors::Neighbors;
pub use result::PlanningResult;
pub use rrt::{RrtConfig, RrtPlanner};
pub use segment::SegmentCheck;
pub use traits::PathFinder;

//! **auv-core**: grid primitives shared by every AUV planner.
//!
//! The vehicle lives on a fixed `width × height` grid of integer cells.
//! This crate provides the value types the planners agree on: cell
//! coordinates ([`Position`]), grid extents ([`GridSize`]), the four
//! discrete moves ([`Direction`]) and the static obstacle set
//! ([`ObstacleSet`]).

pub mod direction;
pub mod field;
pub mod geom;
pub mod obstacles;

pub use direction::Direction;
pub use field::{FieldError, random_obstacles};
pub use geom::{GridIter, GridSize, Position};
pub use obstacles::ObstacleSet;

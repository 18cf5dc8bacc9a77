//! Random obstacle field generation.

use std::fmt;

use rand::{Rng, RngExt};

use crate::geom::{GridSize, Position};
use crate::obstacles::ObstacleSet;

/// Errors that can occur when generating an obstacle field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Fewer free cells exist than obstacles were requested.
    TooManyObstacles { requested: usize, available: usize },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyObstacles {
                requested,
                available,
            } => write!(
                f,
                "obstacle field: requested {requested} obstacles but only {available} cells are free"
            ),
        }
    }
}

impl std::error::Error for FieldError {}

/// Whether `p` lies on or next to (8-neighbourhood) `anchor`.
fn in_buffer(p: Position, anchor: Position) -> bool {
    (p.x - anchor.x).abs() <= 1 && (p.y - anchor.y).abs() <= 1
}

/// Place `count` distinct obstacles uniformly at random.
///
/// Cells on or adjacent to `start` and `goal` are never used, so the
/// vehicle always has room to leave the start and enter the goal.
pub fn random_obstacles(
    size: GridSize,
    count: usize,
    start: Position,
    goal: Position,
    rng: &mut impl Rng,
) -> Result<ObstacleSet, FieldError> {
    let available = size
        .iter()
        .filter(|&p| !in_buffer(p, start) && !in_buffer(p, goal))
        .count();
    if count > available {
        return Err(FieldError::TooManyObstacles {
            requested: count,
            available,
        });
    }

    let mut obstacles = ObstacleSet::new();
    while obstacles.len() < count {
        let p = Position::new(
            rng.random_range(0..size.width),
            rng.random_range(0..size.height),
        );
        if in_buffer(p, start) || in_buffer(p, goal) {
            continue;
        }
        obstacles.insert(p);
    }
    Ok(obstacles)
}

//! The static obstacle set the vehicle must avoid.

use std::collections::HashSet;

use crate::geom::{GridSize, Position};

/// A set of unique blocked cells. Order is irrelevant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleSet {
    cells: HashSet<Position>,
}

impl ObstacleSet {
    /// Create an empty obstacle set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an obstacle. Returns `false` if it was already present.
    pub fn insert(&mut self, p: Position) -> bool {
        self.cells.insert(p)
    }

    /// Remove an obstacle. Returns `false` if it was not present.
    pub fn remove(&mut self, p: Position) -> bool {
        self.cells.remove(&p)
    }

    /// Whether `p` is an obstacle.
    #[inline]
    pub fn contains(&self, p: Position) -> bool {
        self.cells.contains(&p)
    }

    /// Whether the vehicle may occupy `p` on a grid of the given size.
    #[inline]
    pub fn is_free(&self, size: GridSize, p: Position) -> bool {
        size.contains(p) && !self.cells.contains(&p)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over the obstacles in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().copied()
    }

    /// The obstacles in row-major order. Two equal sets always produce
    /// the same sequence, which makes this usable as a cache key.
    pub fn sorted(&self) -> Vec<Position> {
        let mut v: Vec<Position> = self.cells.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// The obstacle closest to `p` (Euclidean), ties broken row-major.
    pub fn nearest_to(&self, p: Position) -> Option<Position> {
        self.cells.iter().copied().min_by(|a, b| {
            let da = (a.x - p.x).pow(2) + (a.y - p.y).pow(2);
            let db = (b.x - p.x).pow(2) + (b.y - p.y).pow(2);
            da.cmp(&db).then(a.cmp(b))
        })
    }
}

impl FromIterator<Position> for ObstacleSet {
    fn from_iter<I: IntoIterator<Item = Position>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

impl Extend<Position> for ObstacleSet {
    fn extend<I: IntoIterator<Item = Position>>(&mut self, iter: I) {
        self.cells.extend(iter);
    }
}

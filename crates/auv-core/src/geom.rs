//! Geometry primitives: [`Position`] and [`GridSize`].

use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A cell of the survey grid: where the vehicle is, where it is headed,
/// or where an obstacle sits. X grows right, Y grows down.
///
/// Valid cells satisfy `0 <= x < width` and `0 <= y < height` for the
/// configured [`GridSize`]. The type itself is signed: a planned move
/// off the edge of the grid is still representable, so it can be
/// rejected by [`GridSize::contains`] (the DRL planner relies on this to
/// learn from blocked moves, and the simulation counts them as
/// collisions).
///
/// Equality is structural. `Ord` is row-major, which gives obstacle sets
/// a canonical order for path-cache keys.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Top-left cell of the grid.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell `(dx, dy)` away. No bounds check.
    #[inline]
    pub const fn shift(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The four cells one vehicle move away (up, right, down, left),
    /// possibly off the grid.
    #[inline]
    pub fn neighbors_4(self) -> [Position; 4] {
        [
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y + 1),
            Self::new(self.x - 1, self.y),
        ]
    }

    /// All eight surrounding cells, clockwise from up. Walling these off
    /// makes a cell unreachable even for diagonal planners.
    #[inline]
    pub fn neighbors_8(self) -> [Position; 8] {
        [
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y - 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x + 1, self.y + 1),
            Self::new(self.x, self.y + 1),
            Self::new(self.x - 1, self.y + 1),
            Self::new(self.x - 1, self.y),
            Self::new(self.x - 1, self.y - 1),
        ]
    }

    /// Whether the vehicle can get from `self` to `other` in one move.
    #[inline]
    pub fn is_adjacent_4(self, other: Position) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }

    /// Straight-line distance to `other`, in cells. RRT steering and the
    /// DRL step penalty are measured with it.
    #[inline]
    pub fn distance(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Row-major order: by `y`, then by `x`.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Position {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

// ---------------------------------------------------------------------------
// GridSize
// ---------------------------------------------------------------------------

/// Extents of the simulation grid. Cells span `[0, width) × [0, height)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSize {
    pub width: i32,
    pub height: i32,
}

impl Default for GridSize {
    /// The 30×20 grid the simulator ships with.
    fn default() -> Self {
        Self::new(30, 20)
    }
}

impl GridSize {
    /// Create a new grid size. Negative extents are clamped to zero.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// Total number of cells.
    #[inline]
    pub fn len(self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Whether the grid has no cells.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `p` lies inside the grid.
    #[inline]
    pub fn contains(self, p: Position) -> bool {
        p.x >= 0 && p.x < self.width && p.y >= 0 && p.y < self.height
    }

    /// Whether the fractional point `(x, y)` rounds to a cell inside the grid.
    #[inline]
    pub fn contains_f(self, x: f64, y: f64) -> bool {
        self.contains(Position::new(x.round() as i32, y.round() as i32))
    }

    /// Flat row-major index of `p`, or `None` outside the grid.
    #[inline]
    pub fn index(self, p: Position) -> Option<usize> {
        if !self.contains(p) {
            return None;
        }
        Some(p.y as usize * self.width as usize + p.x as usize)
    }

    /// Inverse of [`GridSize::index`].
    #[inline]
    pub fn position(self, idx: usize) -> Position {
        let w = self.width.max(1) as usize;
        Position::new((idx % w) as i32, (idx / w) as i32)
    }

    /// Scale `p` by the grid dimensions: cells map into `[0, 1)` on both
    /// axes.
    pub fn normalize(self, p: Position) -> (f32, f32) {
        let w = self.width.max(1) as f32;
        let h = self.height.max(1) as f32;
        (p.x as f32 / w, p.y as f32 / h)
    }

    /// Row-major iterator over every cell of the grid.
    #[inline]
    pub fn iter(self) -> GridIter {
        GridIter {
            size: self,
            cur: Position::ZERO,
        }
    }
}

impl IntoIterator for GridSize {
    type Item = Position;
    type IntoIter = GridIter;
    #[inline]
    fn into_iter(self) -> GridIter {
        self.iter()
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Row-major iterator over the cells of a [`GridSize`].
#[derive(Clone, Debug)]
pub struct GridIter {
    size: GridSize,
    cur: Position,
}

impl Iterator for GridIter {
    type Item = Position;

    #[inline]
    fn next(&mut self) -> Option<Position> {
        if self.cur.y >= self.size.height || self.size.is_empty() {
            return None;
        }
        let p = self.cur;
        self.cur.x += 1;
        if self.cur.x >= self.size.width {
            self.cur.x = 0;
            self.cur.y += 1;
        }
        Some(p)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.size.is_empty() || self.cur.y >= self.size.height {
            return (0, Some(0));
        }
        let w = self.size.width as usize;
        let remaining_in_row = (self.size.width - self.cur.x) as usize;
        let remaining_rows = (self.size.height - self.cur.y - 1) as usize;
        let total = remaining_in_row + remaining_rows * w;
        (total, Some(total))
    }
}

impl ExactSizeIterator for GridIter {}

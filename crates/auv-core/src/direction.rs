//! The four discrete moves the vehicle can make per tick.

use std::fmt;

use crate::geom::Position;

/// A single-cell move. The numeric codes are the action indices the
/// planners and the simulation loop exchange.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
}

impl Direction {
    /// All moves, in code order.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    /// Numeric action code in `0..4`.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Action index usable for array lookups.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`Direction::code`].
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            2 => Some(Self::Up),
            3 => Some(Self::Down),
            _ => None,
        }
    }

    /// Unit offset of the move (Y grows down).
    #[inline]
    pub const fn delta(self) -> Position {
        match self {
            Self::Left => Position::new(-1, 0),
            Self::Right => Position::new(1, 0),
            Self::Up => Position::new(0, -1),
            Self::Down => Position::new(0, 1),
        }
    }

    /// The cell reached from `p` by this move.
    #[inline]
    pub fn apply(self, p: Position) -> Position {
        p + self.delta()
    }

    /// The move leading from `from` to `to`.
    ///
    /// Defined only when exactly one axis differs by exactly one cell.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        match (to.x - from.x, to.y - from.y) {
            (-1, 0) => Some(Self::Left),
            (1, 0) => Some(Self::Right),
            (0, -1) => Some(Self::Up),
            (0, 1) => Some(Self::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_action_indices() {
        for (i, d) in Direction::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
            assert_eq!(Direction::from_code(d.code()), Some(*d));
        }
        assert_eq!(Direction::from_code(-1), None);
        assert_eq!(Direction::from_code(4), None);
    }

    #[test]
    fn between_unit_steps() {
        let p = Position::new(5, 5);
        for d in Direction::ALL {
            assert_eq!(Direction::between(p, d.apply(p)), Some(d));
        }
    }

    #[test]
    fn between_rejects_non_unit_steps() {
        let p = Position::new(5, 5);
        assert_eq!(Direction::between(p, p), None);
        assert_eq!(Direction::between(p, Position::new(6, 6)), None);
        assert_eq!(Direction::between(p, Position::new(7, 5)), None);
    }
}

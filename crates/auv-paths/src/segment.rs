use auv_core::{GridSize, ObstacleSet, Position};

/// Straight-line collision test between two cells.
///
/// The segment is sampled at `resolution` points per cell of travel. A
/// sample fails if it rounds to a cell outside the grid, or if an obstacle
/// cell's centre lies strictly within `margin` cells of it. With the
/// default margin of one cell, a segment may run along a wall but never
/// squeeze diagonally between two obstacles.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SegmentCheck {
    pub resolution: u32,
    pub margin: f64,
}

impl Default for SegmentCheck {
    fn default() -> Self {
        Self {
            resolution: 4,
            margin: 1.0,
        }
    }
}

// Keeps samples sitting exactly one cell from an obstacle centre clear.
const EPS: f64 = 1e-9;

impl SegmentCheck {
    /// Whether the segment `from -> to` is collision-free.
    pub fn is_clear(
        &self,
        size: GridSize,
        obstacles: &ObstacleSet,
        from: Position,
        to: Position,
    ) -> bool {
        let dx = f64::from(to.x - from.x);
        let dy = f64::from(to.y - from.y);
        let span = dx.abs().max(dy.abs());
        let steps = ((span * f64::from(self.resolution.max(1))).ceil() as usize).max(1);

        (0..=steps).all(|i| {
            let t = i as f64 / steps as f64;
            let px = f64::from(from.x) + dx * t;
            let py = f64::from(from.y) + dy * t;
            size.contains_f(px, py) && !self.blocked_near(obstacles, px, py)
        })
    }

    /// Whether any obstacle lies within the margin of the point `(px, py)`.
    fn blocked_near(&self, obstacles: &ObstacleSet, px: f64, py: f64) -> bool {
        let nearest = Position::new(px.round() as i32, py.round() as i32);
        if obstacles.contains(nearest) {
            return true;
        }
        let r = self.margin;
        if r <= 0.0 || obstacles.is_empty() {
            return false;
        }
        let r2 = r * r - EPS;
        let (x0, x1) = ((px - r).floor() as i32, (px + r).ceil() as i32);
        let (y0, y1) = ((py - r).floor() as i32, (py + r).ceil() as i32);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let ddx = f64::from(x) - px;
                let ddy = f64::from(y) - py;
                if ddx * ddx + ddy * ddy < r2 && obstacles.contains(Position::new(x, y)) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(cells: &[(i32, i32)]) -> ObstacleSet {
        cells.iter().map(|&c| Position::from(c)).collect()
    }

    #[test]
    fn open_line_is_clear() {
        let check = SegmentCheck::default();
        let size = GridSize::default();
        assert!(check.is_clear(size, &ObstacleSet::new(), Position::new(0, 0), Position::new(29, 19)));
    }

    #[test]
    fn obstacle_on_line_blocks() {
        let check = SegmentCheck::default();
        let size = GridSize::default();
        let obs = set(&[(10, 10)]);
        assert!(!check.is_clear(size, &obs, Position::new(4, 10), Position::new(25, 10)));
    }

    #[test]
    fn running_alongside_a_wall_is_allowed() {
        let check = SegmentCheck::default();
        let size = GridSize::default();
        let wall = set(&[(5, 9), (6, 9), (7, 9), (8, 9)]);
        assert!(check.is_clear(size, &wall, Position::new(4, 10), Position::new(12, 10)));
    }

    #[test]
    fn diagonal_squeeze_is_blocked() {
        let check = SegmentCheck::default();
        let size = GridSize::default();
        let corner = set(&[(1, 0), (0, 1)]);
        assert!(!check.is_clear(size, &corner, Position::new(0, 0), Position::new(1, 1)));
        assert!(SegmentCheck { margin: 0.0, ..check }.is_clear(
            size,
            &corner,
            Position::new(0, 0),
            Position::new(1, 1)
        ));
    }

    #[test]
    fn leaving_the_grid_fails() {
        let check = SegmentCheck::default();
        let size = GridSize::new(5, 5);
        assert!(!check.is_clear(size, &ObstacleSet::new(), Position::new(0, 0), Position::new(6, 0)));
    }

    #[test]
    fn unit_steps_next_to_obstacles_stay_clear() {
        let check = SegmentCheck::default();
        let size = GridSize::default();
        let obs = set(&[(5, 4), (5, 6), (4, 5)]);
        assert!(check.is_clear(size, &obs, Position::new(5, 5), Position::new(6, 5)));
        assert!(check.is_clear(size, &obs, Position::new(6, 5), Position::new(6, 6)));
    }
}

use auv_core::Position;

/// Cached neighbor computation helper.
///
/// Enumerates cardinal (4-way) or all (8-way) neighbours of a cell,
/// filtered by a passability predicate.
pub struct Neighbors {
    buf: Vec<Position>,
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::new()
    }
}

impl Neighbors {
    /// Create a new `Neighbors` helper.
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(8),
        }
    }

    /// Return the 4-directional neighbours of `p` for which `passable`
    /// returns `true`, in up, right, down, left order.
    pub fn cardinal(&mut self, p: Position, passable: impl Fn(Position) -> bool) -> &[Position] {
        self.buf.clear();
        for n in p.neighbors_4() {
            if passable(n) {
                self.buf.push(n);
            }
        }
        &self.buf
    }

    /// Return the 8-directional neighbours of `p` for which `passable`
    /// returns `true`.
    ///
    /// A diagonal step is rejected when either orthogonal cell it cuts
    /// across is impassable, so the vehicle never squeezes between two
    /// obstacles touching at a corner.
    pub fn all(&mut self, p: Position, passable: impl Fn(Position) -> bool) -> &[Position] {
        self.buf.clear();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let n = p.shift(dx, dy);
                if !passable(n) {
                    continue;
                }
                if dx != 0 && dy != 0 && (!passable(p.shift(dx, 0)) || !passable(p.shift(0, dy))) {
                    continue;
                }
                self.buf.push(n);
            }
        }
        &self.buf
    }
}

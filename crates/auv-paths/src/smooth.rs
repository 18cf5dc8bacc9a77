//! Path post-processing shared by the sampling and learning planners.
//!
//! Raw RRT tree paths and DRL visit traces zig-zag and revisit cells.
//! [`shortcut`] replaces runs of waypoints by direct collision-free
//! segments, [`collapse_straight_runs`] drops waypoints in the middle of
//! straight runs, and [`densify`] turns any waypoint list back into a
//! 4-connected sequence of cells the vehicle can follow one move at a time.

use auv_core::Position;

/// Greedy path shortcutting.
///
/// From each waypoint, jump to the furthest later waypoint reachable by a
/// segment `clear` accepts; intermediate waypoints are dropped. Falls back
/// to the next waypoint when nothing further is reachable, so the result
/// never contains a segment the input did not already have or `clear`
/// did not accept. A waypoint visited again later is treated as a loop
/// and everything in between is dropped.
///
/// With `split_length`, a kept segment longer than that many cells gets its
/// rounded midpoint inserted when both halves are clear.
pub fn shortcut(
    path: &[Position],
    split_length: Option<f64>,
    clear: impl Fn(Position, Position) -> bool,
) -> Vec<Position> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut out = vec![path[0]];
    let mut i = 0;
    while i < path.len() - 1 {
        let from = path[i];
        // Loop: resume from the last visit of this cell.
        if let Some(k) = path[i + 1..].iter().rposition(|&p| p == from) {
            i += 1 + k;
            continue;
        }
        let next = (i + 2..path.len())
            .rev()
            .find(|&j| path[j] != from && clear(from, path[j]))
            .unwrap_or(i + 1);
        let to = path[next];

        if let Some(limit) = split_length {
            if from.distance(to) > limit {
                let mid = Position::new((from.x + to.x).div_euclid(2), (from.y + to.y).div_euclid(2));
                if mid != from && mid != to && clear(from, mid) && clear(mid, to) {
                    out.push(mid);
                }
            }
        }
        if to != from {
            out.push(to);
        }
        i = next;
    }
    out
}

/// Drop waypoints in the middle of straight runs.
///
/// A waypoint is removed when it lies exactly on the line between its
/// kept predecessor and its successor, heading the same way, and `clear`
/// accepts the merged segment. Consecutive duplicates are removed too.
/// Start and end are always kept.
pub fn collapse_straight_runs(
    path: &[Position],
    clear: impl Fn(Position, Position) -> bool,
) -> Vec<Position> {
    let mut out: Vec<Position> = Vec::with_capacity(path.len());
    for &p in path {
        if out.last() == Some(&p) {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let ab = b - a;
            let bp = p - b;
            let cross = ab.x * bp.y - ab.y * bp.x;
            let dot = ab.x * bp.x + ab.y * bp.y;
            if cross == 0 && dot > 0 && clear(a, p) {
                out.pop();
            }
        }
        out.push(p);
    }
    out
}

/// Shortcut then collapse, the standard post-process for sampled paths.
pub fn optimize(
    path: &[Position],
    split_length: Option<f64>,
    clear: impl Fn(Position, Position) -> bool,
) -> Vec<Position> {
    let shortened = shortcut(path, split_length, &clear);
    collapse_straight_runs(&shortened, &clear)
}

/// Expand waypoints into a 4-connected cell sequence.
///
/// Each segment is walked one cell at a time, stepping along whichever
/// axis keeps the walk closest to the ideal line (the longer remaining
/// axis on ties). The output starts at the first waypoint, passes through
/// every waypoint and contains no consecutive duplicates.
pub fn densify(path: &[Position]) -> Vec<Position> {
    let Some(&first) = path.first() else {
        return Vec::new();
    };
    let mut out = vec![first];
    for w in path.windows(2) {
        let (a, b) = (w[0], w[1]);
        let line = b - a;
        let mut cur = a;
        while cur != b {
            let rem = b - cur;
            let step_x = cur.shift(rem.x.signum(), 0);
            let step_y = cur.shift(0, rem.y.signum());
            let next = if rem.x == 0 {
                step_y
            } else if rem.y == 0 {
                step_x
            } else {
                let off = |c: Position| {
                    let d = c - a;
                    (line.x * d.y - line.y * d.x).abs()
                };
                match off(step_x).cmp(&off(step_y)) {
                    std::cmp::Ordering::Less => step_x,
                    std::cmp::Ordering::Greater => step_y,
                    std::cmp::Ordering::Equal if rem.x.abs() >= rem.y.abs() => step_x,
                    std::cmp::Ordering::Equal => step_y,
                }
            };
            out.push(next);
            cur = next;
        }
    }
    out
}

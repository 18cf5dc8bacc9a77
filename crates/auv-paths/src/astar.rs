use std::collections::BinaryHeap;
use std::time::Instant;

use auv_core::{GridSize, ObstacleSet, Position};

use crate::distance::manhattan;
use crate::neighbors::Neighbors;
use crate::result::PlanningResult;
use crate::traits::PathFinder;

/// Cost of a straight (cardinal) step, in tenths of a cell.
pub const STRAIGHT_COST: i32 = 10;
/// Cost of a diagonal step (≈ 1.4 cells), in tenths of a cell.
pub const DIAGONAL_COST: i32 = 14;

const NO_PARENT: usize = usize::MAX;

// ---------------------------------------------------------------------------
// Search nodes
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, PartialEq, Eq)]
enum NodeState {
    Open,
    Closed,
}

/// Per-cell search record. Only meaningful when `generation` matches the
/// planner's current generation; older records are stale leftovers.
#[derive(Clone)]
struct Node {
    g: i32,
    h: i32,
    parent: usize,
    generation: u32,
    state: NodeState,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0,
            h: 0,
            parent: NO_PARENT,
            generation: 0,
            state: NodeState::Open,
        }
    }
}

/// Open-list entry, ordered by ascending `f`, then ascending `h`, then
/// insertion order.
#[derive(Clone, Copy, Eq, PartialEq)]
struct NodeRef {
    idx: usize,
    f: i32,
    h: i32,
    seq: u32,
}

impl Ord for NodeRef {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Reverse so BinaryHeap (max-heap) pops smallest f first.
        other
            .f
            .cmp(&self.f)
            .then(other.h.cmp(&self.h))
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// AStarPlanner
// ---------------------------------------------------------------------------

/// Deterministic shortest-path search over the grid.
///
/// The heuristic is Manhattan distance. On a 4-connected grid with unit
/// moves it is admissible and the returned path is optimal. With
/// diagonals enabled, diagonal steps cost 1.4 and the Manhattan estimate
/// may overshoot, trading strict optimality for fewer expansions.
///
/// The planner owns its node arena and reuses it across calls; a
/// generation counter invalidates the previous search lazily.
pub struct AStarPlanner {
    size: GridSize,
    diagonals: bool,
    nodes: Vec<Node>,
    generation: u32,
    neighbors: Neighbors,
}

impl AStarPlanner {
    /// Create a 4-connected planner for the given grid.
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            diagonals: false,
            nodes: vec![Node::default(); size.len()],
            generation: 0,
            neighbors: Neighbors::new(),
        }
    }

    /// Enable or disable 8-connected movement.
    pub fn with_diagonals(mut self, diagonals: bool) -> Self {
        self.diagonals = diagonals;
        self
    }

    /// The grid this planner searches.
    #[inline]
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Whether diagonal moves are allowed.
    #[inline]
    pub fn diagonals(&self) -> bool {
        self.diagonals
    }

    fn heuristic(from: Position, to: Position) -> i32 {
        manhattan(from, to) * STRAIGHT_COST
    }

    fn step_cost(from: Position, to: Position) -> i32 {
        if from.x != to.x && from.y != to.y {
            DIAGONAL_COST
        } else {
            STRAIGHT_COST
        }
    }

    /// Run the search, returning the path (empty when unreachable) and
    /// the number of open-list pops.
    fn search(
        &mut self,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> (Vec<Position>, usize) {
        let (Some(start_idx), Some(goal_idx)) = (self.size.index(start), self.size.index(goal))
        else {
            return (Vec::new(), 0);
        };

        // Bump generation to lazily invalidate all nodes.
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: stale records could alias generation 0.
            self.nodes.fill(Node::default());
            self.generation = 1;
        }
        let cur_gen = self.generation;

        let h0 = Self::heuristic(start, goal);
        self.nodes[start_idx] = Node {
            g: 0,
            h: h0,
            parent: NO_PARENT,
            generation: cur_gen,
            state: NodeState::Open,
        };

        let mut seq = 0u32;
        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
        open.push(NodeRef {
            idx: start_idx,
            f: h0,
            h: h0,
            seq,
        });

        let size = self.size;
        let passable = |p: Position| obstacles.is_free(size, p);
        let mut neighbors = std::mem::take(&mut self.neighbors);
        let mut pops = 0usize;

        let found = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search false;
            };
            pops += 1;

            let ci = current.idx;
            {
                let node = &self.nodes[ci];
                // Skip entries superseded by a cheaper push, or already expanded.
                if node.state == NodeState::Closed || node.g + node.h != current.f {
                    continue;
                }
            }

            if ci == goal_idx {
                break 'search true;
            }

            self.nodes[ci].state = NodeState::Closed;
            let current_g = self.nodes[ci].g;
            let cp = size.position(ci);

            let ns = if self.diagonals {
                neighbors.all(cp, passable)
            } else {
                neighbors.cardinal(cp, passable)
            };

            for &np in ns {
                let Some(ni) = size.index(np) else {
                    continue;
                };
                let tentative_g = current_g + Self::step_cost(cp, np);

                let n = &mut self.nodes[ni];
                if n.generation == cur_gen {
                    if n.state == NodeState::Closed || tentative_g >= n.g {
                        continue;
                    }
                } else {
                    n.generation = cur_gen;
                    n.h = Self::heuristic(np, goal);
                }

                n.g = tentative_g;
                n.parent = ci;
                n.state = NodeState::Open;

                seq = seq.wrapping_add(1);
                open.push(NodeRef {
                    idx: ni,
                    f: n.g + n.h,
                    h: n.h,
                    seq,
                });
            }
        };

        self.neighbors = neighbors;

        if !found {
            return (Vec::new(), pops);
        }

        // Walk parent links from the goal, then reverse.
        let mut path = Vec::new();
        let mut ci = goal_idx;
        while ci != NO_PARENT {
            path.push(size.position(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        (path, pops)
    }
}

impl PathFinder for AStarPlanner {
    fn find_path(
        &mut self,
        start: Position,
        goal: Position,
        obstacles: &ObstacleSet,
    ) -> PlanningResult {
        let started = Instant::now();
        let (path, pops) = self.search(start, goal, obstacles);
        let result = PlanningResult::new(path, pops, started);
        log::debug!(
            "A* {} -> {}: {} waypoints, {} nodes explored, {:.3} ms",
            start,
            goal,
            result.path.len(),
            result.nodes_explored,
            result.execution_time_ms
        );
        result
    }

    fn name(&self) -> &'static str {
        "A* Search"
    }

    fn description(&self) -> &'static str {
        "Optimal pathfinding using heuristic-based search. Guarantees shortest path."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridSize {
        GridSize::new(30, 20)
    }

    fn assert_valid_4_path(path: &[Position], obstacles: &ObstacleSet) {
        for w in path.windows(2) {
            assert!(w[0].is_adjacent_4(w[1]), "{} -> {} is not a unit step", w[0], w[1]);
        }
        for p in path {
            assert!(!obstacles.contains(*p), "path crosses obstacle {p}");
            assert!(grid().contains(*p));
        }
    }

    #[test]
    fn open_grid_is_manhattan_optimal() {
        let mut astar = AStarPlanner::new(grid());
        let empty = ObstacleSet::new();
        let cases = [
            (Position::new(0, 0), Position::new(29, 19)),
            (Position::new(4, 10), Position::new(25, 10)),
            (Position::new(17, 3), Position::new(2, 15)),
            (Position::new(5, 5), Position::new(5, 6)),
        ];
        for (s, g) in cases {
            let r = astar.find_path(s, g, &empty);
            assert_eq!(r.path.first(), Some(&s));
            assert_eq!(r.path.last(), Some(&g));
            assert_eq!(r.moves() as i32, manhattan(s, g));
            assert_valid_4_path(&r.path, &empty);
        }
    }

    #[test]
    fn start_equals_goal() {
        let mut astar = AStarPlanner::new(grid());
        let p = Position::new(3, 3);
        let r = astar.find_path(p, p, &ObstacleSet::new());
        assert_eq!(r.path, vec![p]);
        assert_eq!(r.nodes_explored, 1);
    }

    #[test]
    fn routes_around_wall() {
        let mut astar = AStarPlanner::new(grid());
        // Vertical wall at x = 10 with a single gap at y = 2.
        let obstacles: ObstacleSet = (0..20)
            .filter(|&y| y != 2)
            .map(|y| Position::new(10, y))
            .collect();
        let r = astar.find_path(Position::new(5, 10), Position::new(15, 10), &obstacles);
        assert!(r.is_found());
        assert!(r.path.contains(&Position::new(10, 2)));
        assert_valid_4_path(&r.path, &obstacles);
        // 10 across plus 8 up and 8 back down.
        assert_eq!(r.moves(), 26);
    }

    #[test]
    fn enclosed_goal_has_no_path() {
        let mut astar = AStarPlanner::new(grid());
        let goal = Position::new(20, 10);
        let obstacles: ObstacleSet = goal.neighbors_8().into_iter().collect();
        let r = astar.find_path(Position::new(2, 2), goal, &obstacles);
        assert!(r.path.is_empty());
        assert!(r.nodes_explored > 0);
    }

    #[test]
    fn reuse_across_calls() {
        let mut astar = AStarPlanner::new(grid());
        let empty = ObstacleSet::new();
        let walled: ObstacleSet = (0..19).map(|y| Position::new(7, y)).collect();
        let a = astar.find_path(Position::new(0, 0), Position::new(14, 0), &walled);
        let b = astar.find_path(Position::new(0, 0), Position::new(14, 0), &empty);
        let c = astar.find_path(Position::new(0, 0), Position::new(14, 0), &walled);
        assert_eq!(b.moves(), 14);
        assert_eq!(a.path, c.path);
        assert_eq!(a.moves(), 14 + 19 * 2);
    }

    #[test]
    fn out_of_bounds_endpoints_yield_empty_path() {
        let mut astar = AStarPlanner::new(grid());
        let r = astar.find_path(Position::new(-1, 0), Position::new(3, 3), &ObstacleSet::new());
        assert!(r.path.is_empty());
        assert_eq!(r.nodes_explored, 0);
    }

    #[test]
    fn diagonal_moves_shorten_path() {
        let mut astar = AStarPlanner::new(grid()).with_diagonals(true);
        let r = astar.find_path(Position::new(0, 0), Position::new(5, 5), &ObstacleSet::new());
        assert!(r.is_found());
        assert!(r.moves() < 10);
        for w in r.path.windows(2) {
            assert!((w[0].x - w[1].x).abs() <= 1 && (w[0].y - w[1].y).abs() <= 1);
        }
    }

    #[test]
    fn diagonal_never_cuts_corners() {
        let mut astar = AStarPlanner::new(GridSize::new(3, 3)).with_diagonals(true);
        // (1,0) and (0,1) block; (1,1) is reachable only through a corner.
        let obstacles: ObstacleSet = [Position::new(1, 0), Position::new(0, 1)]
            .into_iter()
            .collect();
        let r = astar.find_path(Position::new(0, 0), Position::new(2, 2), &obstacles);
        assert!(r.path.is_empty());
    }
}

use std::time::Instant;

use auv_core::Position;

/// Outcome of a single planning call.
///
/// `path` runs from start to goal inclusive and is empty when no route
/// was found. The counters are diagnostics only.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanningResult {
    pub path: Vec<Position>,
    pub nodes_explored: usize,
    pub execution_time_ms: f64,
}

impl PlanningResult {
    /// Build a result, stamping the time elapsed since `started`.
    pub fn new(path: Vec<Position>, nodes_explored: usize, started: Instant) -> Self {
        Self {
            path,
            nodes_explored,
            execution_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        }
    }

    /// An empty (no route) result.
    pub fn not_found(nodes_explored: usize, started: Instant) -> Self {
        Self::new(Vec::new(), nodes_explored, started)
    }

    /// Whether a route was produced.
    #[inline]
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of moves along the path (waypoints minus one).
    pub fn moves(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

use auv_core::{GridSize, ObstacleSet, Position};

/// Length of the encoded state vector.
pub const STATE_SIZE: usize = 6;

/// Encode the vehicle's situation for the Q-network.
///
/// Layout: current position, goal, nearest obstacle to the current
/// position; each as a normalized `(x, y)` pair. Without obstacles the
/// last pair is the normalized off-grid cell `(-1, -1)`.
pub fn encode_state(
    size: GridSize,
    pos: Position,
    goal: Position,
    obstacles: &ObstacleSet,
) -> [f32; STATE_SIZE] {
    let (px, py) = size.normalize(pos);
    let (gx, gy) = size.normalize(goal);
    let nearest = obstacles.nearest_to(pos).unwrap_or(Position::new(-1, -1));
    let (ox, oy) = size.normalize(nearest);
    [px, py, gx, gy, ox, oy]
}

//! Online deep Q-learning planner.
//!
//! [`DrlPlanner`] drives a small Q-network ([`QNetwork`]) across the grid
//! one move at a time, storing every transition in a bounded
//! [`ReplayBuffer`] and training on random mini-batches as it goes. The
//! learned weights persist for the lifetime of the planner, so later
//! queries benefit from earlier ones.
//!
//! The planner is best-effort: when the model cannot be built, when a
//! numeric failure occurs mid-episode, or when it keeps choosing blocked
//! moves, it answers with the A* route instead. No error ever leaves
//! [`PathFinder::find_path`](auv_paths::PathFinder::find_path).

mod config;
mod episode;
mod error;
mod network;
mod planner;
mod replay;
mod state;

pub use config::DrlConfig;
pub use error::DrlError;
pub use network::QNetwork;
pub use planner::DrlPlanner;
pub use replay::{Experience, ReplayBuffer};
pub use state::{STATE_SIZE, encode_state};

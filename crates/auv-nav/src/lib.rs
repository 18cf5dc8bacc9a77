//! Planner selection, path following and the headless simulation loop.
//!
//! The entry point for a driving loop is [`PlannerSession`]: poll it once
//! per tick with the vehicle's cell, the goal, the obstacles and an
//! [`Algorithm`], and it answers with a single [`NextMove`]. The session
//! plans through a [`PathProvider`] (by default the built-in
//! [`PlannerSet`]), re-plans when its inputs change, and memoizes found
//! paths according to its [`CachePolicy`].
//!
//! [`Simulation`] wraps a session with vehicle state, collision handling
//! and run statistics.

mod algorithm;
mod config;
mod session;
mod sim;

pub use algorithm::{Algorithm, Planner, UnknownAlgorithm, select_planner};
pub use config::{CachePolicy, NavConfig};
pub use session::{NextMove, PathProvider, PlanKey, PlannerSession, PlannerSet, SessionStats};
pub use sim::{Simulation, SimulationStats, TickOutcome};

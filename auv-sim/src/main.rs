//! auv-sim: run one headless AUV navigation from the command line.
//!
//! Usage: `auv-sim [ALGORITHM] [CONFIG.yaml]`
//!
//! `ALGORITHM` is `astar` (default), `rrt` or `drl`. The optional YAML file
//! overrides any subset of the navigation settings. Set `RUST_LOG=debug`
//! to trace every tick.

use std::error::Error;
use std::fs::File;

use auv_nav::{Algorithm, NavConfig, Simulation};
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};

const MAX_TICKS: usize = 2000;

fn load_config(path: Option<&str>) -> Result<NavConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(NavConfig::default());
    };
    let file = File::open(path)?;
    let config: NavConfig = serde_yaml::from_reader(file)?;
    log::info!("loaded configuration from {path}");
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let algorithm = match args.first() {
        Some(id) => id.parse::<Algorithm>()?,
        None => Algorithm::default(),
    };
    let config = load_config(args.get(1).map(String::as_str))?;

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut sim = Simulation::random(config, algorithm, &mut rng)?;
    log::info!(
        "{algorithm}: {} -> {} over {} obstacles (field seed {seed})",
        sim.start(),
        sim.goal(),
        sim.obstacles().len()
    );

    let outcome = sim.run(MAX_TICKS);
    let stats = sim.stats();

    println!("algorithm        {algorithm}");
    println!("outcome          {outcome:?}");
    println!("moves            {}", stats.total_moves);
    println!("path length      {}", stats.path_length);
    println!("collisions       {}", stats.collision_count);
    println!("obstacles        {}", stats.obstacle_count);
    println!("nodes explored   {}", stats.nodes_explored);
    println!("planning time    {:.3} ms", stats.planning_time_ms);
    println!("elapsed          {:.3} ms", stats.elapsed_ms);
    println!("time per move    {:.3} ms", stats.average_time_per_move_ms);
    println!("path efficiency  {:.1}%", stats.path_efficiency * 100.0);
    Ok(())
}

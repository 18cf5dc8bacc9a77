//! The learning agent and the per-query episode state machine.
//!
//! An episode advances one decision per [`Episode::step`]. The only
//! model interactions are [`Agent::act`] (predict) and [`Agent::learn`]
//! (train on a batch), so a caller could interleave other work between
//! steps without holding any model state across them.

use auv_core::{Direction, GridSize, ObstacleSet, Position};
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};

use crate::config::DrlConfig;
use crate::error::DrlError;
use crate::network::QNetwork;
use crate::replay::{Experience, ReplayBuffer};
use crate::state::{STATE_SIZE, encode_state};

/// Q-network, replay memory and exploration randomness.
pub(crate) struct Agent {
    network: QNetwork,
    replay: ReplayBuffer,
    rng: SmallRng,
    epsilon: f64,
    gamma: f32,
    batch_size: usize,
}

impl Agent {
    pub(crate) fn new(config: &DrlConfig) -> Result<Self, DrlError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut sizes = Vec::with_capacity(config.hidden_layers.len() + 2);
        sizes.push(STATE_SIZE);
        sizes.extend_from_slice(&config.hidden_layers);
        sizes.push(Direction::ALL.len());
        let network = QNetwork::new(&sizes, config.learning_rate, config.gradient_clip, &mut rng)?;

        Ok(Self {
            network,
            replay: ReplayBuffer::new(config.replay_capacity),
            rng,
            epsilon: config.epsilon,
            gamma: config.gamma,
            batch_size: config.batch_size,
        })
    }

    pub(crate) fn replay_len(&self) -> usize {
        self.replay.len()
    }

    /// Epsilon-greedy action selection.
    pub(crate) fn act(&mut self, state: &[f32; STATE_SIZE]) -> Result<Direction, DrlError> {
        if self.rng.random::<f64>() < self.epsilon {
            return Ok(Direction::ALL[self.rng.random_range(0..Direction::ALL.len())]);
        }
        self.greedy(state)
    }

    /// The action with the highest predicted value.
    pub(crate) fn greedy(&self, state: &[f32; STATE_SIZE]) -> Result<Direction, DrlError> {
        let q = self.network.predict(state)?;
        let best = q
            .iter()
            .enumerate()
            .fold((0, f32::NEG_INFINITY), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc })
            .0;
        Ok(Direction::ALL[best])
    }

    pub(crate) fn remember(&mut self, exp: Experience) {
        self.replay.push(exp);
    }

    /// Train on one random batch once enough transitions are stored.
    /// Returns the batch loss, or `None` while the buffer is still filling.
    pub(crate) fn learn(&mut self) -> Result<Option<f32>, DrlError> {
        if self.replay.len() < self.batch_size {
            return Ok(None);
        }

        let batch = self.replay.sample(self.batch_size, &mut self.rng);
        let mut states = Vec::with_capacity(batch.len());
        let mut actions = Vec::with_capacity(batch.len());
        let mut targets = Vec::with_capacity(batch.len());
        for exp in batch {
            let target = if exp.done {
                exp.reward
            } else {
                let next = self.network.predict(&exp.next_state)?;
                let best = next.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                exp.reward + self.gamma * best
            };
            states.push(exp.state.to_vec());
            actions.push(exp.action);
            targets.push(target);
        }

        self.network
            .train_on_batch(&states, &actions, &targets)
            .map(Some)
    }
}

/// Result of a single episode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// The vehicle moved (or bumped) and the episode goes on.
    Continue,
    /// The goal was reached.
    Reached,
    /// The step budget ran out.
    OutOfSteps,
    /// Too many consecutive blocked decisions.
    GaveUp,
}

/// One simulated run from start toward goal.
pub(crate) struct Episode<'a> {
    size: GridSize,
    goal: Position,
    obstacles: &'a ObstacleSet,
    config: &'a DrlConfig,
    pos: Position,
    trace: Vec<Position>,
    steps: usize,
    failed: usize,
}

impl<'a> Episode<'a> {
    pub(crate) fn new(
        size: GridSize,
        start: Position,
        goal: Position,
        obstacles: &'a ObstacleSet,
        config: &'a DrlConfig,
    ) -> Self {
        Self {
            size,
            goal,
            obstacles,
            config,
            pos: start,
            trace: vec![start],
            steps: 0,
            failed: 0,
        }
    }

    /// Decisions taken so far, blocked ones included.
    pub(crate) fn steps(&self) -> usize {
        self.steps
    }

    /// Cells visited so far, start first.
    pub(crate) fn trace(&self) -> &[Position] {
        &self.trace
    }

    pub(crate) fn step(&mut self, agent: &mut Agent) -> Result<StepOutcome, DrlError> {
        if self.pos == self.goal {
            return Ok(StepOutcome::Reached);
        }
        if self.steps >= self.config.max_steps {
            return Ok(StepOutcome::OutOfSteps);
        }
        self.steps += 1;

        let state = encode_state(self.size, self.pos, self.goal, self.obstacles);
        let action = agent.act(&state)?;
        let next = action.apply(self.pos);

        if !self.obstacles.is_free(self.size, next) {
            agent.remember(Experience {
                state,
                action: action.index(),
                reward: finite_reward(self.config.collision_reward)?,
                next_state: state,
                done: true,
            });
            agent.learn()?;
            self.failed += 1;
            if self.failed >= self.config.max_failed_attempts {
                return Ok(StepOutcome::GaveUp);
            }
            return Ok(StepOutcome::Continue);
        }
        self.failed = 0;

        let reached = next == self.goal;
        let reward = finite_reward(if reached {
            self.config.goal_reward
        } else {
            -self.config.distance_penalty * next.distance(self.goal) as f32
        })?;
        agent.remember(Experience {
            state,
            action: action.index(),
            reward,
            next_state: encode_state(self.size, next, self.goal, self.obstacles),
            done: reached,
        });
        agent.learn()?;

        self.pos = next;
        self.trace.push(next);
        Ok(if reached {
            StepOutcome::Reached
        } else {
            StepOutcome::Continue
        })
    }
}

/// Non-finite rewards would poison every batch they are sampled into.
fn finite_reward(reward: f32) -> Result<f32, DrlError> {
    if reward.is_finite() {
        Ok(reward)
    } else {
        Err(DrlError::NumericFailure {
            stage: "reward",
            value: reward,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DrlConfig {
        DrlConfig {
            seed: Some(17),
            batch_size: 8,
            ..DrlConfig::default()
        }
    }

    #[test]
    fn boxed_in_start_gives_up_after_max_failed_attempts() {
        let cfg = config();
        let mut agent = Agent::new(&cfg).unwrap();
        let start = Position::new(5, 5);
        let obstacles: ObstacleSet = start.neighbors_4().into_iter().collect();
        let mut ep = Episode::new(GridSize::default(), start, Position::new(20, 5), &obstacles, &cfg);
        let mut outcome = StepOutcome::Continue;
        while outcome == StepOutcome::Continue {
            outcome = ep.step(&mut agent).unwrap();
        }
        assert_eq!(outcome, StepOutcome::GaveUp);
        assert_eq!(ep.steps(), cfg.max_failed_attempts);
        assert_eq!(ep.trace(), &[start]);
        assert_eq!(agent.replay_len(), cfg.max_failed_attempts);
    }

    #[test]
    fn step_budget_is_respected() {
        let cfg = DrlConfig {
            max_steps: 10,
            ..config()
        };
        let mut agent = Agent::new(&cfg).unwrap();
        let obstacles = ObstacleSet::new();
        let mut ep = Episode::new(
            GridSize::default(),
            Position::new(0, 0),
            Position::new(29, 19),
            &obstacles,
            &cfg,
        );
        let mut outcome = StepOutcome::Continue;
        while outcome == StepOutcome::Continue {
            outcome = ep.step(&mut agent).unwrap();
        }
        // 48 moves are needed at minimum, so the budget must run out first.
        assert_eq!(outcome, StepOutcome::OutOfSteps);
        assert_eq!(ep.steps(), 10);
        for w in ep.trace().windows(2) {
            assert!(w[0].is_adjacent_4(w[1]));
        }
    }

    #[test]
    fn start_on_goal_is_reached_immediately() {
        let cfg = config();
        let mut agent = Agent::new(&cfg).unwrap();
        let obstacles = ObstacleSet::new();
        let p = Position::new(3, 3);
        let mut ep = Episode::new(GridSize::default(), p, p, &obstacles, &cfg);
        assert_eq!(ep.step(&mut agent).unwrap(), StepOutcome::Reached);
        assert_eq!(ep.steps(), 0);
    }

    #[test]
    fn non_finite_reward_is_not_stored() {
        let cfg = DrlConfig {
            distance_penalty: f32::INFINITY,
            ..config()
        };
        let mut agent = Agent::new(&cfg).unwrap();
        let obstacles = ObstacleSet::new();
        let mut ep = Episode::new(
            GridSize::default(),
            Position::new(4, 10),
            Position::new(25, 10),
            &obstacles,
            &cfg,
        );
        assert!(matches!(
            ep.step(&mut agent),
            Err(DrlError::NumericFailure { stage: "reward", .. })
        ));
        assert_eq!(agent.replay_len(), 0);
        assert_eq!(ep.trace(), &[Position::new(4, 10)]);
    }

    #[test]
    fn invalid_config_fails_agent_init() {
        let cfg = DrlConfig {
            hidden_layers: vec![0],
            ..DrlConfig::default()
        };
        assert!(Agent::new(&cfg).is_err());
    }
}

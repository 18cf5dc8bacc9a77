use auv_paths::SegmentCheck;

use crate::error::DrlError;

/// Tunables for [`DrlPlanner`](crate::DrlPlanner).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DrlConfig {
    /// Probability of a uniformly random action.
    pub epsilon: f64,
    /// Discount factor of the one-step Q target.
    pub gamma: f32,
    /// SGD step size.
    pub learning_rate: f32,
    /// Hidden layer widths of the Q-network.
    pub hidden_layers: Vec<usize>,
    /// Per-sample TD error is clipped to `±gradient_clip`.
    pub gradient_clip: f32,
    /// Replay buffer capacity; the oldest transitions are evicted first.
    pub replay_capacity: usize,
    /// Mini-batch size; training starts once the buffer holds this many.
    pub batch_size: usize,
    /// Decisions per episode before giving up.
    pub max_steps: usize,
    /// Consecutive blocked decisions before falling back to A*.
    pub max_failed_attempts: usize,
    /// Reward for reaching the goal (terminal).
    pub goal_reward: f32,
    /// Reward for a blocked move (terminal).
    pub collision_reward: f32,
    /// Per-step penalty factor applied to the remaining distance.
    pub distance_penalty: f32,
    /// Collision test used when shortcutting the visited trace.
    pub check: SegmentCheck,
    /// Fixed seed for reproducible runs; `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for DrlConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.05,
            gamma: 0.95,
            learning_rate: 0.005,
            hidden_layers: vec![32, 32],
            gradient_clip: 1.0,
            replay_capacity: 10_000,
            batch_size: 64,
            max_steps: 1000,
            max_failed_attempts: 50,
            goal_reward: 100.0,
            collision_reward: -100.0,
            distance_penalty: 0.1,
            check: SegmentCheck::default(),
            seed: None,
        }
    }
}

impl DrlConfig {
    /// Reject settings the model or the episode loop cannot work with.
    pub fn validate(&self) -> Result<(), DrlError> {
        let invalid = |msg: String| Err(DrlError::InvalidConfig(msg));
        if !(0.0..=1.0).contains(&self.epsilon) {
            return invalid(format!("epsilon {} outside [0, 1]", self.epsilon));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid(format!("gamma {} outside [0, 1]", self.gamma));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return invalid(format!("learning rate {} must be positive", self.learning_rate));
        }
        if self.hidden_layers.contains(&0) {
            return invalid("hidden layers must have at least one unit".into());
        }
        if self.batch_size == 0 || self.batch_size > self.replay_capacity {
            return invalid(format!(
                "batch size {} must be in 1..={}",
                self.batch_size, self.replay_capacity
            ));
        }
        if self.max_failed_attempts == 0 {
            return invalid("max failed attempts must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(DrlConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_settings() {
        let bad = [
            DrlConfig {
                hidden_layers: vec![16, 0],
                ..DrlConfig::default()
            },
            DrlConfig {
                batch_size: 20_000,
                ..DrlConfig::default()
            },
            DrlConfig {
                learning_rate: f32::NAN,
                ..DrlConfig::default()
            },
            DrlConfig {
                epsilon: 1.5,
                ..DrlConfig::default()
            },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(DrlError::InvalidConfig(_))));
        }
    }
}

//! A small fully-connected Q-network trained with plain SGD.

use nalgebra::{DMatrix, DVector};
use rand::{Rng, RngExt};

use crate::error::DrlError;

struct Layer {
    weights: DMatrix<f32>,
    bias: DVector<f32>,
}

/// Multi-layer perceptron mapping a state vector to one value per action.
///
/// Hidden layers use ReLU; the output layer is linear. Weights are drawn
/// with He-uniform scaling.
pub struct QNetwork {
    layers: Vec<Layer>,
    learning_rate: f32,
    gradient_clip: f32,
}

impl QNetwork {
    /// Build a network with the given layer widths, input first and
    /// output last.
    pub fn new(
        sizes: &[usize],
        learning_rate: f32,
        gradient_clip: f32,
        rng: &mut impl Rng,
    ) -> Result<Self, DrlError> {
        if sizes.len() < 2 {
            return Err(DrlError::InvalidConfig(
                "network needs at least an input and an output layer".into(),
            ));
        }
        if sizes.contains(&0) {
            return Err(DrlError::InvalidConfig(format!("zero-width layer in {sizes:?}")));
        }
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(DrlError::InvalidConfig(format!(
                "learning rate {learning_rate} must be positive"
            )));
        }

        let layers = sizes
            .windows(2)
            .map(|w| {
                let (fan_in, fan_out) = (w[0], w[1]);
                let limit = (6.0 / fan_in as f32).sqrt();
                Layer {
                    weights: DMatrix::from_fn(fan_out, fan_in, |_, _| {
                        rng.random_range(-limit..limit)
                    }),
                    bias: DVector::zeros(fan_out),
                }
            })
            .collect();

        Ok(Self {
            layers,
            learning_rate,
            gradient_clip,
        })
    }

    /// Width of the input layer.
    pub fn input_size(&self) -> usize {
        self.layers[0].weights.ncols()
    }

    /// Width of the output layer.
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].weights.nrows()
    }

    /// Activations of every layer, input first.
    fn forward(&self, input: &[f32]) -> Vec<DVector<f32>> {
        let mut acts = Vec::with_capacity(self.layers.len() + 1);
        acts.push(DVector::from_column_slice(input));
        let last = self.layers.len() - 1;
        for (i, layer) in self.layers.iter().enumerate() {
            let z = &layer.weights * &acts[i] + &layer.bias;
            acts.push(if i == last { z } else { z.map(|v| v.max(0.0)) });
        }
        acts
    }

    /// Predicted action values for a single state.
    pub fn predict(&self, state: &[f32]) -> Result<Vec<f32>, DrlError> {
        let mut acts = self.forward(state);
        let out = acts.pop().unwrap_or_else(|| DVector::zeros(0));
        if let Some(&bad) = out.iter().find(|v| !v.is_finite()) {
            return Err(DrlError::NumericFailure {
                stage: "predict",
                value: bad,
            });
        }
        Ok(out.iter().copied().collect())
    }

    /// One SGD step toward `targets`, updating only the chosen action's
    /// output for each sample. Returns the mean squared TD error.
    pub fn train_on_batch(
        &mut self,
        states: &[Vec<f32>],
        actions: &[usize],
        targets: &[f32],
    ) -> Result<f32, DrlError> {
        if states.is_empty() {
            return Err(DrlError::EmptyBatch);
        }

        let mut grad_w: Vec<DMatrix<f32>> = self
            .layers
            .iter()
            .map(|l| DMatrix::zeros(l.weights.nrows(), l.weights.ncols()))
            .collect();
        let mut grad_b: Vec<DVector<f32>> = self
            .layers
            .iter()
            .map(|l| DVector::zeros(l.bias.len()))
            .collect();

        let mut loss = 0.0f32;
        for ((state, &action), &target) in states.iter().zip(actions).zip(targets) {
            let acts = self.forward(state);
            let q = &acts[acts.len() - 1];
            let err = q[action] - target;
            loss += err * err;

            let mut delta: DVector<f32> = DVector::zeros(q.len());
            delta[action] = err.clamp(-self.gradient_clip, self.gradient_clip);

            for l in (0..self.layers.len()).rev() {
                grad_w[l] += &delta * acts[l].transpose();
                grad_b[l] += &delta;
                if l > 0 {
                    let mask = acts[l].map(|v| if v > 0.0 { 1.0f32 } else { 0.0f32 });
                    delta = self.layers[l].weights.tr_mul(&delta).component_mul(&mask);
                }
            }
        }

        let n = states.len() as f32;
        let loss = loss / n;
        if !loss.is_finite() {
            return Err(DrlError::NumericFailure {
                stage: "train",
                value: loss,
            });
        }

        // Candidate layers are committed only when every value is finite.
        let step = self.learning_rate / n;
        let updated: Vec<Layer> = self
            .layers
            .iter()
            .zip(grad_w.iter().zip(&grad_b))
            .map(|(layer, (gw, gb))| Layer {
                weights: &layer.weights - gw * step,
                bias: &layer.bias - gb * step,
            })
            .collect();
        if let Some(&bad) = updated
            .iter()
            .flat_map(|l| l.weights.iter().chain(l.bias.iter()))
            .find(|v| !v.is_finite())
        {
            return Err(DrlError::NumericFailure {
                stage: "update",
                value: bad,
            });
        }
        self.layers = updated;
        Ok(loss)
    }
}

//! Character-Level LSTM Model
//!
//! This module ties the LSTM cell and the output projection together into a
//! trainable next-character model, and implements backpropagation through
//! time over one window of the corpus.
//!
//! ## Architecture
//!
//! ```text
//! one-hot input [features, 1]
//!       │
//!   LSTM cell  ──────  (h, c) carried to the next step
//!       │ h
//!   projection + softmax
//!       │
//! distribution over the alphabet [features, 1]
//! ```
//!
//! ## Training Over a Window
//!
//! [`CharLstm::backward_window`] runs the whole unrolled loop for one
//! fixed-length window:
//!
//! 1. Forward sweep in strictly increasing time order, caching every step's
//!    state and gate outputs (the derivative formulas consume forward
//!    *outputs*, so nothing can be recomputed from pre-activations).
//! 2. Cross-entropy loss `-ln(y[target])` summed over the window.
//! 3. Backward sweep in strictly decreasing time order, accumulating every
//!    step's contribution into one freshly zeroed set of gradient buffers
//!    and threading the `(dh, dc)` pair from each step to the one before it.
//!
//! The update itself lives in [`crate::optimizer`]; keeping it separate
//! means tests can check the analytic gradients against finite differences
//! without mutating the model.

use crate::layers::lstm_cell::{
    LstmCache, LstmGradients, LstmState, StateGradient, TrainableLstmCell,
};
use crate::layers::projection::{ProjectionGradients, TrainableProjection};
use crate::tensor::Matrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Model and training hyperparameters
///
/// # Fields
///
/// - `num_cells`: Hidden width of the LSTM
/// - `features`: Alphabet size (one-hot width), taken from the vocabulary
/// - `seq_len`: Window length the training loop unrolls over
/// - `learning_rate`: Step size for the gradient-descent update
/// - `clip_limit`: Elementwise gradient clip bound (applied as ±limit)
/// - `iterations`: Total number of windows to train on
/// - `sample_every`: Emit a text sample and a log line every N iterations
/// - `sample_len`: Length of each generated sample
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub num_cells: usize,
    pub features: usize,
    pub seq_len: usize,
    pub learning_rate: f32,
    pub clip_limit: f32,
    pub iterations: usize,
    pub sample_every: usize,
    pub sample_len: usize,
}

impl Config {
    /// Standard configuration for a given alphabet size
    ///
    /// A 100-cell hidden state over 10-step windows at learning rate 0.1 is
    /// enough to memorize short repetitive corpora in a few thousand
    /// iterations.
    pub fn new(features: usize) -> Self {
        Self {
            num_cells: 100,
            features,
            seq_len: 10,
            learning_rate: 0.1,
            clip_limit: 1.0,
            iterations: 20_000,
            sample_every: 500,
            sample_len: 20,
        }
    }

    /// Tiny configuration for quick experiments and tests
    pub fn tiny(features: usize) -> Self {
        Self {
            num_cells: 16,
            features,
            seq_len: 4,
            learning_rate: 0.1,
            clip_limit: 1.0,
            iterations: 1_000,
            sample_every: 250,
            sample_len: 12,
        }
    }
}

/// Gradient buffers for every parameter in the model
///
/// Shapes mirror the parameters exactly. One instance lives for one BPTT
/// window: zeroed on creation, accumulated into during the backward sweep,
/// consumed by the update, then dropped.
pub struct ModelGradients {
    pub cell: LstmGradients,
    pub projection: ProjectionGradients,
}

impl ModelGradients {
    /// All-zero buffers for a model of the given dimensions
    pub fn zeros(num_cells: usize, features: usize) -> Self {
        Self {
            cell: LstmGradients::zeros(num_cells, features),
            projection: ProjectionGradients::zeros(features, num_cells),
        }
    }

    /// Every buffer, in a fixed order matching [`CharLstm::params_mut`]
    ///
    /// The pairing between this order and the parameter order is what lets
    /// clipping and the update run uniformly over the whole aggregate.
    pub fn fields(&self) -> [&Matrix; 14] {
        [
            &self.cell.w_f,
            &self.cell.r_f,
            &self.cell.b_f,
            &self.cell.w_i,
            &self.cell.r_i,
            &self.cell.b_i,
            &self.cell.w_z,
            &self.cell.r_z,
            &self.cell.b_z,
            &self.cell.w_o,
            &self.cell.r_o,
            &self.cell.b_o,
            &self.projection.weight,
            &self.projection.bias,
        ]
    }

    /// Mutable variant of [`ModelGradients::fields`], same order
    pub fn fields_mut(&mut self) -> [&mut Matrix; 14] {
        [
            &mut self.cell.w_f,
            &mut self.cell.r_f,
            &mut self.cell.b_f,
            &mut self.cell.w_i,
            &mut self.cell.r_i,
            &mut self.cell.b_i,
            &mut self.cell.w_z,
            &mut self.cell.r_z,
            &mut self.cell.b_z,
            &mut self.cell.w_o,
            &mut self.cell.r_o,
            &mut self.cell.b_o,
            &mut self.projection.weight,
            &mut self.projection.bias,
        ]
    }
}

/// The complete trainable model: LSTM cell plus output projection
#[derive(Clone, Serialize, Deserialize)]
pub struct CharLstm {
    pub config: Config,
    pub cell: TrainableLstmCell,
    pub projection: TrainableProjection,
}

/// Forward-sweep results for one window, cached for the backward sweep
struct WindowForward {
    /// `states[0]` is the carried-in state; `states[t + 1]` is step t's output
    states: Vec<LstmState>,
    caches: Vec<LstmCache>,
    outputs: Vec<Matrix>,
    loss: f32,
}

impl CharLstm {
    /// Create a model with randomly initialized parameters
    ///
    /// # Panics
    ///
    /// Panics if the configuration has a zero dimension.
    pub fn new<R: Rng>(config: &Config, rng: &mut R) -> Self {
        assert!(
            config.num_cells > 0 && config.features > 0,
            "model dimensions must be nonzero (num_cells={}, features={})",
            config.num_cells,
            config.features
        );
        Self {
            config: config.clone(),
            cell: TrainableLstmCell::new(config.num_cells, config.features, rng),
            projection: TrainableProjection::new(config.features, config.num_cells, rng),
        }
    }

    /// Every parameter, in a fixed order matching [`ModelGradients::fields`]
    pub fn params_mut(&mut self) -> [&mut Matrix; 14] {
        [
            &mut self.cell.w_f,
            &mut self.cell.r_f,
            &mut self.cell.b_f,
            &mut self.cell.w_i,
            &mut self.cell.r_i,
            &mut self.cell.b_i,
            &mut self.cell.w_z,
            &mut self.cell.r_z,
            &mut self.cell.b_z,
            &mut self.cell.w_o,
            &mut self.cell.r_o,
            &mut self.cell.b_o,
            &mut self.projection.weight,
            &mut self.projection.bias,
        ]
    }

    fn forward_window(
        &self,
        inputs: &[Matrix],
        targets: &[Matrix],
        carried: &LstmState,
    ) -> WindowForward {
        assert_eq!(
            inputs.len(),
            targets.len(),
            "window has {} inputs but {} targets",
            inputs.len(),
            targets.len()
        );
        assert!(!inputs.is_empty(), "window must contain at least one step");

        let steps = inputs.len();
        let mut states = Vec::with_capacity(steps + 1);
        let mut caches = Vec::with_capacity(steps);
        let mut outputs = Vec::with_capacity(steps);
        let mut loss = 0.0f32;

        states.push(carried.clone());
        for t in 0..steps {
            let (state, cache) = self.cell.forward(&inputs[t], &states[t]);
            let y = self.projection.forward(&state.h);
            loss += -y.data[targets[t].argmax()].ln();
            states.push(state);
            caches.push(cache);
            outputs.push(y);
        }

        WindowForward {
            states,
            caches,
            outputs,
            loss,
        }
    }

    /// Cross-entropy loss over one window, without touching gradients
    ///
    /// Returns the summed loss and the final state the window produced.
    pub fn loss_window(
        &self,
        inputs: &[Matrix],
        targets: &[Matrix],
        carried: &LstmState,
    ) -> (f32, LstmState) {
        let fwd = self.forward_window(inputs, targets, carried);
        let final_state = fwd.states[inputs.len()].clone();
        (fwd.loss, final_state)
    }

    /// Full BPTT over one window
    ///
    /// Runs the forward sweep (t = 0..steps, increasing), then the backward
    /// sweep (t = steps-1..0, decreasing) into freshly zeroed gradient
    /// buffers. The `(dh, dc)` pair starts at zero behind the final step and
    /// is rethreaded through every earlier step.
    ///
    /// # Returns
    ///
    /// `(loss, gradients, final_state)` — the caller clips the gradients,
    /// applies the update, and carries the state into the next window.
    pub fn backward_window(
        &self,
        inputs: &[Matrix],
        targets: &[Matrix],
        carried: &LstmState,
    ) -> (f32, ModelGradients, LstmState) {
        let fwd = self.forward_window(inputs, targets, carried);
        let steps = inputs.len();

        let mut grads = ModelGradients::zeros(self.config.num_cells, self.config.features);
        let mut passing = StateGradient::zeros(self.config.num_cells);

        for t in (0..steps).rev() {
            let dv = self.projection.backward(
                &fwd.outputs[t],
                &targets[t],
                &fwd.states[t + 1].h,
                &mut grads.projection,
            );
            let dh_from_output = self.projection.hidden_grad(&dv);
            passing = self.cell.backward(
                &dh_from_output,
                &passing,
                &inputs[t],
                &fwd.states[t],
                &fwd.states[t + 1],
                &fwd.caches[t],
                &mut grads.cell,
            );
        }

        let final_state = fwd.states[steps].clone();
        (fwd.loss, grads, final_state)
    }

    /// Serialize the model (parameters + config) to a JSON file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        std::fs::write(path, serde_json::to_string(self)?)
    }

    /// Load a model previously written by [`CharLstm::save`]
    pub fn load(path: &str) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

//! Output Projection
//!
//! A dense layer mapping the LSTM's hidden state to a probability
//! distribution over the alphabet.
//!
//! ## Forward Pass
//!
//! ```text
//! v = Wv·h + bv          logits          [features, 1]
//! y = softmax(v)         probabilities   [features, 1]
//! ```
//!
//! ## Backward Pass
//!
//! For softmax combined with cross-entropy loss against a one-hot target,
//! the gradient with respect to the logits collapses to:
//!
//! ```text
//! dv = y          then  dv[argmax(target)] -= 1
//! ```
//!
//! which is exact, not an approximation. From there:
//!
//! ```text
//! grad_Wv += dv · hᵗ
//! grad_bv += dv
//! ```
//!
//! The gradient flowing back into the hidden state is `Wvᵗ·dv`, computed by
//! [`TrainableProjection::hidden_grad`]; the BPTT driver feeds it to the
//! LSTM cell's backward pass for the same time step.

use crate::layers::activation::stable_softmax;
use crate::tensor::Matrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Dense projection from hidden state to alphabet distribution
///
/// - `weight`: [features, num_cells]
/// - `bias`: [features, 1]
#[derive(Clone, Serialize, Deserialize)]
pub struct TrainableProjection {
    pub weight: Matrix,
    pub bias: Matrix,
}

/// Gradient buffers for the projection, same shapes as the parameters
pub struct ProjectionGradients {
    pub weight: Matrix,
    pub bias: Matrix,
}

impl ProjectionGradients {
    /// All-zero buffers for a projection of the given dimensions
    pub fn zeros(features: usize, num_cells: usize) -> Self {
        Self {
            weight: Matrix::zeros(features, num_cells),
            bias: Matrix::zeros(features, 1),
        }
    }
}

impl TrainableProjection {
    /// Create a projection with uniformly initialized parameters in [0, 0.1)
    pub fn new<R: Rng>(features: usize, num_cells: usize, rng: &mut R) -> Self {
        let uniform = |rows: usize, cols: usize, rng: &mut R| {
            Matrix::new(
                (0..rows * cols).map(|_| rng.random::<f32>() * 0.1).collect(),
                rows,
                cols,
            )
        };
        Self {
            weight: uniform(features, num_cells, rng),
            bias: uniform(features, 1, rng),
        }
    }

    /// Alphabet size this projection emits
    pub fn features(&self) -> usize {
        self.weight.rows
    }

    /// Forward pass: hidden state to probability distribution
    ///
    /// # Panics
    ///
    /// Panics if `h` is not a [num_cells, 1] column vector.
    pub fn forward(&self, h: &Matrix) -> Matrix {
        assert_eq!(
            (h.rows, h.cols),
            (self.weight.cols, 1),
            "hidden state must be [num_cells={}, 1], got {}x{}",
            self.weight.cols,
            h.rows,
            h.cols
        );
        stable_softmax(&self.weight.matmul(h).add(&self.bias))
    }

    /// Backward pass from a one-hot target
    ///
    /// Accumulates this step's contributions into `grads` and returns `dv`,
    /// the loss gradient with respect to the pre-softmax logits.
    ///
    /// # Arguments
    ///
    /// * `y` - Forward output for this step
    /// * `target` - One-hot target vector
    /// * `h` - The hidden state the forward pass consumed
    /// * `grads` - Buffers to accumulate into
    pub fn backward(
        &self,
        y: &Matrix,
        target: &Matrix,
        h: &Matrix,
        grads: &mut ProjectionGradients,
    ) -> Matrix {
        let mut dv = y.clone();
        dv.data[target.argmax()] -= 1.0;

        grads.weight.add_assign(&dv.outer(h));
        grads.bias.add_assign(&dv);
        dv
    }

    /// Map a logit gradient back into hidden-state space: `Wvᵗ·dv`
    pub fn hidden_grad(&self, dv: &Matrix) -> Matrix {
        self.weight.transpose().matmul(dv)
    }
}

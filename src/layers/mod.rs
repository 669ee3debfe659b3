//! Network Layers
//!
//! The two layers of the model, each providing explicit forward and backward
//! passes, plus the activation functions they share.
//!
//! ## Layers
//!
//! - **activation**: sigmoid/tanh with derivatives-from-output, stable softmax
//! - **lstm_cell**: one time step of the recurrent cell
//! - **projection**: hidden state → alphabet probability distribution
//!
//! ## Design Pattern
//!
//! Each trainable layer follows a consistent pattern:
//!
//! ```rust,ignore
//! pub struct TrainableLayer {
//!     // Parameters (fixed-shape matrices)
//! }
//!
//! impl TrainableLayer {
//!     pub fn new(..., rng) -> Self { }
//!     pub fn forward(&self, x, ...) -> (Output, Cache) { }
//!     pub fn backward(&self, ..., cache, grads: &mut Gradients) -> PassedGrad { }
//! }
//! ```
//!
//! Backward passes accumulate into caller-owned gradient buffers because
//! BPTT sums contributions from every time step of a window into the same
//! buffers before a single update is applied.

pub mod activation;
pub mod lstm_cell;
pub mod projection;

// Re-export main types for convenience
pub use activation::{dsigmoid, dtanh, sigmoid, stable_softmax, tanh};
pub use lstm_cell::{LstmCache, LstmGradients, LstmState, StateGradient, TrainableLstmCell};
pub use projection::{ProjectionGradients, TrainableProjection};

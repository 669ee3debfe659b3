//! Gradient-Descent Update
//!
//! The update rule for this model is vanilla gradient descent:
//!
//! ```text
//! θ -= learning_rate · g     for every parameter θ with gradient g
//! ```
//!
//! There is deliberately no momentum, no adaptive per-parameter learning
//! rate, no weight decay, and no schedule. The gradients are expected to
//! arrive already clipped (see [`crate::gradients::clip_gradients`]); the
//! clip bound plus the fixed learning rate are the only things limiting a
//! step.
//!
//! ## Performance
//!
//! Large parameter tensors update in parallel via Rayon; tensors below the
//! threshold update sequentially to avoid parallelization overhead.

use crate::model::{CharLstm, ModelGradients};
use rayon::prelude::*;

/// Element count above which a tensor's update goes parallel.
const PAR_UPDATE_THRESHOLD: usize = 1000;

/// Apply one gradient-descent step to every parameter in the model
///
/// Parameters and gradient buffers are paired by the fixed field order
/// shared between [`CharLstm::params_mut`] and [`ModelGradients::fields`].
///
/// # Arguments
///
/// * `model` - Model to update in place
/// * `grads` - Accumulated (and clipped) gradients for one window
/// * `learning_rate` - Step size
pub fn sgd_update(model: &mut CharLstm, grads: &ModelGradients, learning_rate: f32) {
    for (param, grad) in model.params_mut().into_iter().zip(grads.fields()) {
        assert_eq!(
            (param.rows, param.cols),
            (grad.rows, grad.cols),
            "parameter/gradient shape mismatch: {}x{} vs {}x{}",
            param.rows,
            param.cols,
            grad.rows,
            grad.cols
        );
        if param.data.len() > PAR_UPDATE_THRESHOLD {
            param
                .data
                .par_iter_mut()
                .zip(grad.data.par_iter())
                .for_each(|(p, &g)| *p -= learning_rate * g);
        } else {
            for (p, &g) in param.data.iter_mut().zip(grad.data.iter()) {
                *p -= learning_rate * g;
            }
        }
    }
}

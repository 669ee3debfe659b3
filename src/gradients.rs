//! Gradient Utilities
//!
//! Clipping and monitoring for the per-window gradient buffers.
//!
//! ## Why Clip?
//!
//! Backpropagating through every step of a window multiplies many Jacobians
//! together, and a run of large ones can blow a single window's gradients up
//! enough to throw the parameters into a region they never recover from:
//!
//! ```text
//! Iteration 1500: loss = 9.8
//! Iteration 1501: loss = 241.3   (gradient explosion)
//! Iteration 1502: loss = NaN     (training failed)
//! ```
//!
//! The countermeasure here is elementwise: every gradient entry is clamped
//! to `[-limit, +limit]` before the update. This bounds the worst-case step
//! size per parameter. It is the model's only stability mechanism besides
//! the max subtraction inside softmax — there is no norm rescaling, weight
//! decay, or learning-rate schedule.
//!
//! Clamping is idempotent: clipping an already-clipped buffer changes
//! nothing.
//!
//! The L2 norm is computed for monitoring only; it plays no part in the
//! update.

use crate::model::ModelGradients;
use rayon::prelude::*;

/// Clamp every gradient entry to `[-limit, +limit]` in place
pub fn clip_gradients(grads: &mut ModelGradients, limit: f32) {
    for field in grads.fields_mut() {
        field.clamp_assign(-limit, limit);
    }
}

/// L2 norm over all gradient buffers: `√(Σ g²)`
///
/// A single scalar summarizing the magnitude of the pending update, useful
/// for spotting instability in logs before it shows up as NaN loss.
pub fn compute_grad_norm(grads: &ModelGradients) -> f32 {
    grads
        .fields()
        .iter()
        .map(|field| field.data.par_iter().map(|&v| v * v).sum::<f32>())
        .sum::<f32>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Matrix;

    fn filled_grads(value: f32) -> ModelGradients {
        let mut grads = ModelGradients::zeros(3, 2);
        for field in grads.fields_mut() {
            for x in field.data.iter_mut() {
                *x = value;
            }
        }
        grads
    }

    #[test]
    fn test_clip_bounds_all_fields() {
        let mut grads = filled_grads(5.0);
        clip_gradients(&mut grads, 1.0);
        for field in grads.fields() {
            assert!(field.data.iter().all(|&v| v == 1.0));
        }
    }

    #[test]
    fn test_clip_preserves_in_range_values() {
        let mut grads = ModelGradients::zeros(3, 2);
        grads.cell.w_f = Matrix::new(vec![0.5, -0.5, 2.0, -2.0, 0.0, 1.0], 3, 2);
        clip_gradients(&mut grads, 1.0);
        assert_eq!(grads.cell.w_f.data, vec![0.5, -0.5, 1.0, -1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_clip_is_idempotent() {
        let mut once = filled_grads(-7.0);
        clip_gradients(&mut once, 1.0);
        let snapshot: Vec<Vec<f32>> = once.fields().iter().map(|f| f.data.clone()).collect();

        clip_gradients(&mut once, 1.0);
        for (field, expected) in once.fields().iter().zip(snapshot.iter()) {
            assert_eq!(&field.data, expected);
        }
    }

    #[test]
    fn test_grad_norm() {
        let mut grads = ModelGradients::zeros(3, 2);
        grads.projection.bias = Matrix::new(vec![3.0, 4.0], 2, 1);
        assert!((compute_grad_norm(&grads) - 5.0).abs() < 1e-6);
    }
}

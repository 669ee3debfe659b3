//! Activation Functions
//!
//! This module provides the elementwise nonlinearities used by the LSTM cell
//! and the output projection, together with their derivatives for
//! backpropagation.
//!
//! ## Derivatives Take Forward Outputs
//!
//! Both derivative functions are expressed in terms of the forward pass's
//! *output*, not its input:
//!
//! ```text
//! dsigmoid(y) = y · (1 - y)     where y = sigmoid(x)
//! dtanh(y)    = 1 - y²          where y = tanh(x)
//! ```
//!
//! This is a contract, not a convenience: callers must cache the activation
//! outputs from the forward pass and feed those back in. Passing raw
//! pre-activations produces wrong gradients with no error. The LSTM cell's
//! per-step cache exists precisely to satisfy this contract.
//!
//! ## Stable Softmax
//!
//! ```text
//! softmax(v) = exp(v - max(v)) / Σ exp(v - max(v))
//! ```
//!
//! Subtracting the maximum before exponentiating bounds every exponent at
//! zero, so the computation cannot overflow for finite inputs. The result is
//! shift-invariant: adding a constant to every logit leaves it unchanged.

use crate::tensor::Matrix;

/// Elementwise logistic sigmoid: `1 / (1 + e^-x)`
pub fn sigmoid(x: &Matrix) -> Matrix {
    map(x, |v| 1.0 / (1.0 + (-v).exp()))
}

/// Sigmoid derivative from the *output* of [`sigmoid`]: `y · (1 - y)`
///
/// The argument must be a cached forward output, never a pre-activation.
pub fn dsigmoid(y: &Matrix) -> Matrix {
    map(y, |v| v * (1.0 - v))
}

/// Elementwise hyperbolic tangent
pub fn tanh(x: &Matrix) -> Matrix {
    map(x, |v| v.tanh())
}

/// Tanh derivative from the *output* of [`tanh`]: `1 - y²`
///
/// The argument must be a cached forward output, never a pre-activation.
pub fn dtanh(y: &Matrix) -> Matrix {
    map(y, |v| 1.0 - v * v)
}

/// Numerically stable softmax over a column vector of logits
///
/// Returns a valid probability distribution: every entry is in (0, 1] and
/// the entries sum to 1 up to floating-point error.
pub fn stable_softmax(v: &Matrix) -> Matrix {
    let max = v.data.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = v.data.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    Matrix::new(exps.iter().map(|&e| e / sum).collect(), v.rows, v.cols)
}

fn map(m: &Matrix, f: impl Fn(f32) -> f32) -> Matrix {
    Matrix::new(m.data.iter().map(|&x| f(x)).collect(), m.rows, m.cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_midpoint_and_saturation() {
        let x = Matrix::new(vec![0.0, 10.0, -10.0], 3, 1);
        let y = sigmoid(&x);
        assert!((y.data[0] - 0.5).abs() < 1e-6);
        assert!(y.data[1] > 0.999);
        assert!(y.data[2] < 0.001);
    }

    #[test]
    fn test_dsigmoid_matches_formula_and_range() {
        // For any sigmoid output y, dsigmoid(y) = y(1-y) and lies in [0, 0.25]
        let x = Matrix::new(vec![-4.0, -1.0, 0.0, 1.0, 4.0], 5, 1);
        let y = sigmoid(&x);
        let d = dsigmoid(&y);
        for (&yv, &dv) in y.data.iter().zip(d.data.iter()) {
            assert!((dv - yv * (1.0 - yv)).abs() < 1e-7);
            assert!((0.0..=0.25).contains(&dv));
        }
        // Maximum slope at the midpoint
        assert!((d.data[2] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_dtanh_matches_formula() {
        let x = Matrix::new(vec![-2.0, 0.0, 0.5], 3, 1);
        let y = tanh(&x);
        let d = dtanh(&y);
        for (&yv, &dv) in y.data.iter().zip(d.data.iter()) {
            assert!((dv - (1.0 - yv * yv)).abs() < 1e-7);
        }
        assert!((d.data[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let v = Matrix::new(vec![1.0, 2.0, 3.0, 4.0], 4, 1);
        let y = stable_softmax(&v);
        let sum: f32 = y.data.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(y.data.iter().all(|&p| p > 0.0));
    }

    #[test]
    fn test_softmax_shift_invariance() {
        let v = Matrix::new(vec![0.5, -1.0, 2.0], 3, 1);
        let shifted = Matrix::new(v.data.iter().map(|&x| x + 100.0).collect(), 3, 1);
        let a = stable_softmax(&v);
        let b = stable_softmax(&shifted);
        for (&pa, &pb) in a.data.iter().zip(b.data.iter()) {
            assert!((pa - pb).abs() < 1e-6);
        }
    }

    #[test]
    fn test_softmax_survives_large_logits() {
        // Without max subtraction exp(1000) would overflow to infinity
        let v = Matrix::new(vec![1000.0, 999.0], 2, 1);
        let y = stable_softmax(&v);
        assert!(y.data.iter().all(|p| p.is_finite()));
        assert!(y.data[0] > y.data[1]);
    }
}

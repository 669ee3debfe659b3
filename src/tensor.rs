//! Matrix Operations for the LSTM
//!
//! This module provides a minimal dense matrix type sized for a single-layer
//! recurrent network. Everything the model touches is either a weight matrix
//! or a column vector, so the type is deliberately 2-D only.
//!
//! ## Core Concepts
//!
//! - **Data**: Flat `Vec<f32>` storing all elements in row-major order
//! - **Shape**: `rows` × `cols`, fixed at construction
//! - **Column vectors**: represented as matrices with `cols == 1`
//!
//! ## Example
//!
//! ```rust
//! use puck::Matrix;
//!
//! // A 2x3 matrix times a 3x1 column vector
//! let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
//! let v = Matrix::new(vec![1.0, 0.0, 1.0], 3, 1);
//! let result = m.matmul(&v);
//! assert_eq!(result.data, vec![4.0, 10.0]);
//! ```
//!
//! ## Performance
//!
//! Matrix multiplication parallelizes over output rows via Rayon once the
//! work exceeds a threshold; small products stay sequential to avoid
//! parallelization overhead. At the hidden widths this model usually trains
//! at most products are small, but the threshold keeps wide configurations
//! from serializing on one core.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Work size (rows × inner × cols) above which matmul goes parallel.
const PAR_MATMUL_THRESHOLD: usize = 64 * 1024;

/// A dense row-major matrix of `f32` values
///
/// # Fields
///
/// - `data`: Flat array of values, length `rows * cols`
/// - `rows`, `cols`: Fixed dimensions
///
/// # Memory Layout
///
/// For a 2x3 matrix, data is stored as:
/// `[r0c0, r0c1, r0c2, r1c0, r1c1, r1c2]`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Matrix {
    /// Flat storage of all elements
    pub data: Vec<f32>,
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

impl Matrix {
    /// Create a new matrix from flat data
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != rows * cols`. Shape mismatches are
    /// precondition violations, not recoverable errors.
    pub fn new(data: Vec<f32>, rows: usize, cols: usize) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "Data length ({}) doesn't match shape {}x{}",
            data.len(),
            rows,
            cols
        );
        Self { data, rows, cols }
    }

    /// Create a matrix filled with zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::new(vec![0.0; rows * cols], rows, cols)
    }

    /// Create a zero matrix with the same shape as another
    pub fn zeros_like(other: &Matrix) -> Self {
        Self::zeros(other.rows, other.cols)
    }

    /// Element at `(row, col)`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.cols + col]
    }

    /// Matrix multiplication: `self` [m, k] × `other` [k, n] → [m, n]
    ///
    /// # Panics
    ///
    /// Panics if the inner dimensions disagree.
    pub fn matmul(&self, other: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, other.rows,
            "matmul shape mismatch: {}x{} @ {}x{}",
            self.rows, self.cols, other.rows, other.cols
        );

        let (m, k, n) = (self.rows, self.cols, other.cols);
        let mut out = vec![0.0f32; m * n];

        let row_product = |row: usize, out_row: &mut [f32]| {
            let a_row = &self.data[row * k..(row + 1) * k];
            for (i, &a_val) in a_row.iter().enumerate() {
                if a_val == 0.0 {
                    continue;
                }
                let b_row = &other.data[i * n..(i + 1) * n];
                for (o, &b_val) in out_row.iter_mut().zip(b_row.iter()) {
                    *o += a_val * b_val;
                }
            }
        };

        if m * k * n > PAR_MATMUL_THRESHOLD {
            out.par_chunks_mut(n)
                .enumerate()
                .for_each(|(row, out_row)| row_product(row, out_row));
        } else {
            for (row, out_row) in out.chunks_mut(n).enumerate() {
                row_product(row, out_row);
            }
        }

        Matrix::new(out, m, n)
    }

    /// Transposed copy: [m, n] → [n, m]
    pub fn transpose(&self) -> Matrix {
        let mut out = vec![0.0f32; self.rows * self.cols];
        for r in 0..self.rows {
            for c in 0..self.cols {
                out[c * self.rows + r] = self.data[r * self.cols + c];
            }
        }
        Matrix::new(out, self.cols, self.rows)
    }

    /// Outer product of two column vectors: `self` [m, 1] ⊗ `other` [n, 1] → [m, n]
    ///
    /// This is how per-step gradient contributions for weight matrices are
    /// formed: a gate derivative times the transposed input or hidden state.
    ///
    /// # Panics
    ///
    /// Panics if either operand is not a column vector.
    pub fn outer(&self, other: &Matrix) -> Matrix {
        assert_eq!(self.cols, 1, "outer: left operand must be a column vector");
        assert_eq!(other.cols, 1, "outer: right operand must be a column vector");
        let mut out = vec![0.0f32; self.rows * other.rows];
        for (r, &a) in self.data.iter().enumerate() {
            for (c, &b) in other.data.iter().enumerate() {
                out[r * other.rows + c] = a * b;
            }
        }
        Matrix::new(out, self.rows, other.rows)
    }

    /// Elementwise sum
    pub fn add(&self, other: &Matrix) -> Matrix {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference
    pub fn sub(&self, other: &Matrix) -> Matrix {
        self.zip_with(other, |a, b| a - b)
    }

    /// Elementwise (Hadamard) product
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        self.zip_with(other, |a, b| a * b)
    }

    /// Scale every element by a constant
    pub fn scale(&self, s: f32) -> Matrix {
        Matrix::new(
            self.data.iter().map(|&x| x * s).collect(),
            self.rows,
            self.cols,
        )
    }

    /// Accumulate another matrix into this one in place
    ///
    /// # Panics
    ///
    /// Panics if the shapes disagree.
    pub fn add_assign(&mut self, other: &Matrix) {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "add_assign shape mismatch: {}x{} += {}x{}",
            self.rows,
            self.cols,
            other.rows,
            other.cols
        );
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += b;
        }
    }

    /// Clamp every element to `[lo, hi]` in place
    pub fn clamp_assign(&mut self, lo: f32, hi: f32) {
        for x in self.data.iter_mut() {
            *x = x.clamp(lo, hi);
        }
    }

    /// Index of the largest element (first occurrence on ties)
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, &x) in self.data.iter().enumerate() {
            if x > self.data[best] {
                best = i;
            }
        }
        best
    }

    fn zip_with(&self, other: &Matrix, f: impl Fn(f32, f32) -> f32) -> Matrix {
        assert_eq!(
            (self.rows, self.cols),
            (other.rows, other.cols),
            "elementwise shape mismatch: {}x{} vs {}x{}",
            self.rows,
            self.cols,
            other.rows,
            other.cols
        );
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Matrix::new(data, self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matmul_matrix_vector() {
        let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0], 2, 2);
        let v = Matrix::new(vec![1.0, 1.0], 2, 1);
        let result = m.matmul(&v);
        assert_eq!(result.rows, 2);
        assert_eq!(result.cols, 1);
        assert_eq!(result.data, vec![3.0, 7.0]);
    }

    #[test]
    fn test_matmul_matrix_matrix() {
        let a = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let b = Matrix::new(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0], 3, 2);
        let result = a.matmul(&b);
        assert_eq!((result.rows, result.cols), (2, 2));
        assert_eq!(result.data, vec![4.0, 5.0, 10.0, 11.0]);
    }

    #[test]
    fn test_transpose_roundtrip() {
        let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3);
        let t = m.transpose();
        assert_eq!(t.rows, 3);
        assert_eq!(t.cols, 2);
        assert_eq!(t.get(0, 1), 4.0);
        assert_eq!(t.transpose().data, m.data);
    }

    #[test]
    fn test_outer_product() {
        let a = Matrix::new(vec![1.0, 2.0], 2, 1);
        let b = Matrix::new(vec![3.0, 4.0, 5.0], 3, 1);
        let result = a.outer(&b);
        assert_eq!((result.rows, result.cols), (2, 3));
        assert_eq!(result.data, vec![3.0, 4.0, 5.0, 6.0, 8.0, 10.0]);
    }

    #[test]
    fn test_clamp_assign() {
        let mut m = Matrix::new(vec![-3.0, -0.5, 0.5, 3.0], 2, 2);
        m.clamp_assign(-1.0, 1.0);
        assert_eq!(m.data, vec![-1.0, -0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_argmax_first_on_ties() {
        let m = Matrix::new(vec![0.1, 0.7, 0.7, 0.2], 4, 1);
        assert_eq!(m.argmax(), 1);
    }

    #[test]
    #[should_panic(expected = "matmul shape mismatch")]
    fn test_matmul_shape_mismatch_panics() {
        let m = Matrix::zeros(2, 3);
        let v = Matrix::zeros(2, 1);
        m.matmul(&v);
    }
}

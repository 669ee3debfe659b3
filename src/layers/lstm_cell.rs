//! LSTM Cell
//!
//! A single time step of a single-layer LSTM: four gates, a cell state, and
//! a hidden state, with both the forward transition and its reverse-mode
//! gradient derived by hand.
//!
//! ## Forward Pass
//!
//! Every gate pre-activation is `input weight · x + recurrent weight · h_prev + bias`:
//!
//! ```text
//! f = sigmoid(Wf·x + Rf·h_prev + bf)     forget gate
//! i = sigmoid(Wi·x + Ri·h_prev + bi)     input gate
//! z = tanh(Wz·x + Rz·h_prev + bz)        candidate
//! o = sigmoid(Wo·x + Ro·h_prev + bo)     output gate
//! c = f ⊙ c_prev + i ⊙ z                 cell state
//! h = o ⊙ tanh(c)                        hidden state
//! ```
//!
//! The forward pass is a pure function of its inputs. It returns the new
//! state together with an [`LstmCache`] of gate outputs: the derivative
//! formulas in this crate take activation *outputs* (see
//! [`crate::layers::activation`]), so the backward pass needs exactly these
//! cached values.
//!
//! ## Backward Pass
//!
//! Given the loss gradient flowing into `h` at this step — the projection's
//! contribution plus the gradient arriving from the *next* time step — and
//! the gradient of the next step's cell state, the backward pass accumulates
//! into every weight/bias gradient buffer and emits the pair to propagate to
//! the *previous* step. Each quantity feeds the next, so the derivation
//! order below is load-bearing:
//!
//! ```text
//! dh = dh_from_output + dh_next
//! do = dsigmoid(o) ⊙ dh ⊙ tanh(c)           → Wo, Ro, bo
//! dc = dc_next + dh ⊙ o ⊙ dtanh(tanh(c))
//! dz = dtanh(z) ⊙ dc ⊙ i                    → Wz, Rz, bz
//! di = dsigmoid(i) ⊙ dc ⊙ z                 → Wi, Ri, bi
//! df = dsigmoid(f) ⊙ dc ⊙ c_prev            → Wf, Rf, bf
//! dh_prev = Rfᵗ·df + Riᵗ·di + Rzᵗ·dz + Roᵗ·do
//! dc_prev = f ⊙ dc
//! ```
//!
//! The gradient with respect to `x` is never computed: this is a
//! single-layer design with nothing below the cell to backpropagate into.

use crate::layers::activation::{dsigmoid, dtanh, sigmoid, tanh};
use crate::tensor::Matrix;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// LSTM cell parameters
///
/// Input weights map the one-hot input (`features` wide) to each gate;
/// recurrent weights map the previous hidden state; biases are per-cell.
/// Shapes are fixed for the lifetime of a training run:
///
/// - `w_*`: [num_cells, features]
/// - `r_*`: [num_cells, num_cells]
/// - `b_*`: [num_cells, 1]
#[derive(Clone, Serialize, Deserialize)]
pub struct TrainableLstmCell {
    pub w_f: Matrix,
    pub r_f: Matrix,
    pub b_f: Matrix,
    pub w_i: Matrix,
    pub r_i: Matrix,
    pub b_i: Matrix,
    pub w_z: Matrix,
    pub r_z: Matrix,
    pub b_z: Matrix,
    pub w_o: Matrix,
    pub r_o: Matrix,
    pub b_o: Matrix,
}

/// Recurrent state carried between time steps
///
/// Both vectors are [num_cells, 1]. Zeroed at the start of each sweep
/// through the data, otherwise carried forward across window boundaries.
#[derive(Clone)]
pub struct LstmState {
    pub h: Matrix,
    pub c: Matrix,
}

impl LstmState {
    /// Fresh all-zero state, used at sweep starts
    pub fn zeros(num_cells: usize) -> Self {
        Self {
            h: Matrix::zeros(num_cells, 1),
            c: Matrix::zeros(num_cells, 1),
        }
    }
}

/// Gate outputs cached by the forward pass for one time step
///
/// The backward pass expresses every derivative in terms of these outputs,
/// so they must be the values the forward pass actually produced.
#[derive(Clone)]
pub struct LstmCache {
    pub f: Matrix,
    pub i: Matrix,
    pub z: Matrix,
    pub o: Matrix,
}

/// Gradient of the loss with respect to a recurrent state pair
///
/// Flows backward through time: initialized to zero at the last step of a
/// window, then each step's backward pass produces the pair consumed by the
/// step before it.
pub struct StateGradient {
    pub dh: Matrix,
    pub dc: Matrix,
}

impl StateGradient {
    /// Zero pair, seeding the backward sweep at the final time step
    pub fn zeros(num_cells: usize) -> Self {
        Self {
            dh: Matrix::zeros(num_cells, 1),
            dc: Matrix::zeros(num_cells, 1),
        }
    }
}

/// Gradient buffers for every cell parameter, same shapes as the parameters
///
/// One buffer per weight/bias; holds the sum of per-time-step contributions
/// within a single BPTT window. Zeroed at the start of every window and
/// never persisted across windows.
pub struct LstmGradients {
    pub w_f: Matrix,
    pub r_f: Matrix,
    pub b_f: Matrix,
    pub w_i: Matrix,
    pub r_i: Matrix,
    pub b_i: Matrix,
    pub w_z: Matrix,
    pub r_z: Matrix,
    pub b_z: Matrix,
    pub w_o: Matrix,
    pub r_o: Matrix,
    pub b_o: Matrix,
}

impl LstmGradients {
    /// All-zero buffers for a cell of the given dimensions
    pub fn zeros(num_cells: usize, features: usize) -> Self {
        Self {
            w_f: Matrix::zeros(num_cells, features),
            r_f: Matrix::zeros(num_cells, num_cells),
            b_f: Matrix::zeros(num_cells, 1),
            w_i: Matrix::zeros(num_cells, features),
            r_i: Matrix::zeros(num_cells, num_cells),
            b_i: Matrix::zeros(num_cells, 1),
            w_z: Matrix::zeros(num_cells, features),
            r_z: Matrix::zeros(num_cells, num_cells),
            b_z: Matrix::zeros(num_cells, 1),
            w_o: Matrix::zeros(num_cells, features),
            r_o: Matrix::zeros(num_cells, num_cells),
            b_o: Matrix::zeros(num_cells, 1),
        }
    }
}

/// Random matrix with normally distributed entries
///
/// # Panics
///
/// Panics if `std` is not finite and positive, which cannot happen for the
/// constants used at initialization.
pub fn normal_init<R: Rng>(rows: usize, cols: usize, mean: f32, std: f32, rng: &mut R) -> Matrix {
    let normal = Normal::new(mean, std).unwrap();
    Matrix::new(
        (0..rows * cols).map(|_| normal.sample(rng)).collect(),
        rows,
        cols,
    )
}

impl TrainableLstmCell {
    /// Create a cell with randomly initialized parameters
    ///
    /// Gate input/recurrent weights start at N(0.5, 0.1) so the gates begin
    /// mostly open; candidate weights and all biases start at N(0, 0.1).
    ///
    /// # Arguments
    ///
    /// * `num_cells` - Hidden width (number of LSTM units)
    /// * `features` - Input width (alphabet size)
    /// * `rng` - Source of randomness, injected so runs can be seeded
    pub fn new<R: Rng>(num_cells: usize, features: usize, rng: &mut R) -> Self {
        Self {
            w_f: normal_init(num_cells, features, 0.5, 0.1, rng),
            r_f: normal_init(num_cells, num_cells, 0.5, 0.1, rng),
            b_f: normal_init(num_cells, 1, 0.0, 0.1, rng),
            w_i: normal_init(num_cells, features, 0.5, 0.1, rng),
            r_i: normal_init(num_cells, num_cells, 0.5, 0.1, rng),
            b_i: normal_init(num_cells, 1, 0.0, 0.1, rng),
            w_z: normal_init(num_cells, features, 0.0, 0.1, rng),
            r_z: normal_init(num_cells, num_cells, 0.0, 0.1, rng),
            b_z: normal_init(num_cells, 1, 0.0, 0.1, rng),
            w_o: normal_init(num_cells, features, 0.5, 0.1, rng),
            r_o: normal_init(num_cells, num_cells, 0.5, 0.1, rng),
            b_o: normal_init(num_cells, 1, 0.0, 0.1, rng),
        }
    }

    /// Hidden width of this cell
    pub fn num_cells(&self) -> usize {
        self.w_f.rows
    }

    /// Input width this cell accepts
    pub fn features(&self) -> usize {
        self.w_f.cols
    }

    /// One time step forward
    ///
    /// # Arguments
    ///
    /// * `x` - Input vector [features, 1]
    /// * `state` - Previous step's `(h, c)`
    ///
    /// # Returns
    ///
    /// The new state and the gate-output cache for the backward pass.
    ///
    /// # Panics
    ///
    /// Panics if `x` or the state vectors have the wrong height.
    pub fn forward(&self, x: &Matrix, state: &LstmState) -> (LstmState, LstmCache) {
        assert_eq!(
            (x.rows, x.cols),
            (self.features(), 1),
            "input must be [features={}, 1], got {}x{}",
            self.features(),
            x.rows,
            x.cols
        );
        assert_eq!(
            state.h.rows,
            self.num_cells(),
            "hidden state height {} != num_cells {}",
            state.h.rows,
            self.num_cells()
        );

        let gate = |w: &Matrix, r: &Matrix, b: &Matrix| {
            w.matmul(x).add(&r.matmul(&state.h)).add(b)
        };

        let f = sigmoid(&gate(&self.w_f, &self.r_f, &self.b_f));
        let i = sigmoid(&gate(&self.w_i, &self.r_i, &self.b_i));
        let z = tanh(&gate(&self.w_z, &self.r_z, &self.b_z));
        let o = sigmoid(&gate(&self.w_o, &self.r_o, &self.b_o));

        let c = f.hadamard(&state.c).add(&i.hadamard(&z));
        let h = o.hadamard(&tanh(&c));

        (LstmState { h, c }, LstmCache { f, i, z, o })
    }

    /// One time step backward
    ///
    /// Accumulates this step's contributions into `grads` and returns the
    /// state gradient for the previous (earlier) time step.
    ///
    /// # Arguments
    ///
    /// * `dh_from_output` - Loss gradient w.r.t. `h` from the projection,
    ///   already mapped through `Wvᵗ` by the caller
    /// * `passing` - `(dh_next, dc_next)` from the step after this one,
    ///   zero at the final step of the window
    /// * `x` - This step's input
    /// * `state_prev` - State entering this step
    /// * `state` - State this step produced
    /// * `cache` - Gate outputs this step produced
    /// * `grads` - Buffers to accumulate into
    #[allow(clippy::too_many_arguments)]
    pub fn backward(
        &self,
        dh_from_output: &Matrix,
        passing: &StateGradient,
        x: &Matrix,
        state_prev: &LstmState,
        state: &LstmState,
        cache: &LstmCache,
        grads: &mut LstmGradients,
    ) -> StateGradient {
        let dh = dh_from_output.add(&passing.dh);
        let tanh_c = tanh(&state.c);

        // Output gate
        let d_o = dsigmoid(&cache.o).hadamard(&dh).hadamard(&tanh_c);
        grads.w_o.add_assign(&d_o.outer(x));
        grads.r_o.add_assign(&d_o.outer(&state_prev.h));
        grads.b_o.add_assign(&d_o);

        // Cell state
        let dc = passing
            .dc
            .add(&dh.hadamard(&cache.o).hadamard(&dtanh(&tanh_c)));

        // Candidate
        let dz = dtanh(&cache.z).hadamard(&dc).hadamard(&cache.i);
        grads.w_z.add_assign(&dz.outer(x));
        grads.r_z.add_assign(&dz.outer(&state_prev.h));
        grads.b_z.add_assign(&dz);

        // Input gate
        let di = dsigmoid(&cache.i).hadamard(&dc).hadamard(&cache.z);
        grads.w_i.add_assign(&di.outer(x));
        grads.r_i.add_assign(&di.outer(&state_prev.h));
        grads.b_i.add_assign(&di);

        // Forget gate
        let df = dsigmoid(&cache.f).hadamard(&dc).hadamard(&state_prev.c);
        grads.w_f.add_assign(&df.outer(x));
        grads.r_f.add_assign(&df.outer(&state_prev.h));
        grads.b_f.add_assign(&df);

        let dh_prev = self
            .r_f
            .transpose()
            .matmul(&df)
            .add(&self.r_i.transpose().matmul(&di))
            .add(&self.r_z.transpose().matmul(&dz))
            .add(&self.r_o.transpose().matmul(&d_o));
        let dc_prev = cache.f.hadamard(&dc);

        StateGradient {
            dh: dh_prev,
            dc: dc_prev,
        }
    }
}

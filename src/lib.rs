//! Puck: Educational Character-Level LSTM
//!
//! A single-layer LSTM language model implemented from scratch in Rust,
//! trained character-by-character with hand-derived backpropagation through
//! time. Named after Shakespeare's mischievous sprite from *A Midsummer
//! Night's Dream*.
//!
//! Every gradient in this crate is written out by hand — there is no
//! autodiff graph. The cell caches its gate outputs on the forward pass,
//! the backward pass consumes those cached outputs, and one clipped
//! gradient-descent step is applied per window.
//!
//! # Modules
//!
//! - [`tensor`] - Dense matrix type the whole model is built on
//! - [`layers`] - LSTM cell, output projection, activation functions
//! - [`model`] - Configuration, the assembled model, BPTT over a window
//! - [`gradients`] - Elementwise clipping and gradient-norm monitoring
//! - [`optimizer`] - Vanilla gradient-descent update
//! - [`vocab`] - Sorted one-hot character alphabet
//! - [`data`] - Window loader with sweep-reset signaling
//! - [`trainer`] - The outer training loop
//! - [`sampler`] - Stochastic text generation
//! - [`training_logger`] - CSV + console metrics
//!
//! # Example
//!
//! ```rust,no_run
//! use puck::{train, CharLstm, CharVocab, Config, WindowLoader};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let text = std::fs::read_to_string("corpus.txt").unwrap();
//! let vocab = CharVocab::build(&text);
//!
//! let config = Config::new(vocab.len());
//! let mut rng = StdRng::seed_from_u64(0);
//! let mut model = CharLstm::new(&config, &mut rng);
//! let mut loader = WindowLoader::new(vocab.encode(&text), config.seq_len);
//!
//! let losses = train(&mut model, &mut loader, &vocab, None, &mut rng).unwrap();
//! println!("final loss: {}", losses.last().unwrap());
//! ```

pub mod data;
pub mod gradients;
pub mod layers;
pub mod model;
pub mod optimizer;
pub mod sampler;
pub mod tensor;
pub mod trainer;
pub mod training_logger;
pub mod vocab;

// Re-export main types for convenience
pub use data::{Window, WindowLoader};
pub use gradients::{clip_gradients, compute_grad_norm};
pub use layers::lstm_cell::{LstmCache, LstmGradients, LstmState, TrainableLstmCell};
pub use layers::projection::{ProjectionGradients, TrainableProjection};
pub use model::{CharLstm, Config, ModelGradients};
pub use optimizer::sgd_update;
pub use sampler::{draw_index, sample};
pub use tensor::Matrix;
pub use trainer::{train, train_window};
pub use training_logger::TrainingLogger;
pub use vocab::CharVocab;

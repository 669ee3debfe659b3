//! Text Sampling
//!
//! Generates text from a trained (or training) model for qualitative
//! inspection. Starting from a copy of the current recurrent state and a
//! seed symbol, each step runs the cell and projection forward, draws the
//! next character stochastically from the output distribution, and feeds
//! the drawn character back in as the next input.
//!
//! Sampling never mutates the model or the trainer's state — it works on
//! clones, so a mid-training sample leaves the training loop untouched.
//!
//! The RNG is caller-supplied: pass a seeded `StdRng` for reproducible
//! output, or `rand::rng()` when reproducibility doesn't matter.

use crate::layers::lstm_cell::LstmState;
use crate::model::CharLstm;
use crate::tensor::Matrix;
use crate::vocab::CharVocab;
use rand::Rng;

/// Draw an index from a probability distribution
///
/// Walks the cumulative sum until it passes a uniform draw. Floating-point
/// rounding can leave the distribution summing to slightly less than one;
/// if the walk falls off the end, the last index is returned rather than
/// panicking.
pub fn draw_index<R: Rng>(probs: &Matrix, rng: &mut R) -> usize {
    let r = rng.random::<f32>();
    let mut cumulative = 0.0f32;
    for (i, &p) in probs.data.iter().enumerate() {
        cumulative += p;
        if r < cumulative {
            return i;
        }
    }
    probs.data.len() - 1
}

/// Generate `length` characters from the model
///
/// # Arguments
///
/// * `model` - Model to sample from
/// * `state` - Recurrent state to start from (cloned, not mutated)
/// * `seed` - One-hot vector for the first input symbol
/// * `length` - Number of characters to generate
/// * `vocab` - Alphabet for index → character decoding
/// * `rng` - Source of randomness for the draws
///
/// # Panics
///
/// Panics if the vocabulary size disagrees with the model's `features`
/// dimension.
pub fn sample<R: Rng>(
    model: &CharLstm,
    state: &LstmState,
    seed: &Matrix,
    length: usize,
    vocab: &CharVocab,
    rng: &mut R,
) -> String {
    assert_eq!(
        vocab.len(),
        model.config.features,
        "alphabet of {} doesn't match model features {}",
        vocab.len(),
        model.config.features
    );

    let mut state = state.clone();
    let mut x = seed.clone();
    let mut out = String::with_capacity(length);

    for _ in 0..length {
        let (next_state, _) = model.cell.forward(&x, &state);
        state = next_state;
        let y = model.projection.forward(&state.h);
        let idx = draw_index(&y, rng);
        out.push(vocab.char_at(idx));
        x = vocab.one_hot(idx);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::lstm_cell::TrainableLstmCell;
    use crate::layers::projection::TrainableProjection;
    use crate::model::Config;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draw_index_respects_point_mass() {
        let mut rng = StdRng::seed_from_u64(0);
        let probs = Matrix::new(vec![0.0, 1.0, 0.0], 3, 1);
        for _ in 0..50 {
            assert_eq!(draw_index(&probs, &mut rng), 1);
        }
    }

    #[test]
    fn test_draw_index_tolerates_underflowing_distribution() {
        // A distribution that sums short of 1 must still yield an index.
        let mut rng = StdRng::seed_from_u64(1);
        let probs = Matrix::new(vec![0.0, 0.0, 0.0], 3, 1);
        assert_eq!(draw_index(&probs, &mut rng), 2);
    }

    #[test]
    fn test_degenerate_model_repeats_one_symbol() {
        // Zero cell parameters keep h at zero; a projection bias spiked at
        // one position makes softmax a near-point-mass there, so the
        // sampler must emit that symbol for the whole requested length.
        let vocab = CharVocab::build("abc");
        let mut rng = StdRng::seed_from_u64(2);
        let config = Config {
            num_cells: 4,
            features: 3,
            seq_len: 3,
            learning_rate: 0.1,
            clip_limit: 1.0,
            iterations: 1,
            sample_every: 1,
            sample_len: 1,
        };
        let mut model = CharLstm::new(&config, &mut rng);
        model.cell = TrainableLstmCell {
            w_f: Matrix::zeros(4, 3),
            r_f: Matrix::zeros(4, 4),
            b_f: Matrix::zeros(4, 1),
            w_i: Matrix::zeros(4, 3),
            r_i: Matrix::zeros(4, 4),
            b_i: Matrix::zeros(4, 1),
            w_z: Matrix::zeros(4, 3),
            r_z: Matrix::zeros(4, 4),
            b_z: Matrix::zeros(4, 1),
            w_o: Matrix::zeros(4, 3),
            r_o: Matrix::zeros(4, 4),
            b_o: Matrix::zeros(4, 1),
        };
        model.projection = TrainableProjection {
            weight: Matrix::zeros(3, 4),
            bias: Matrix::new(vec![0.0, 50.0, 0.0], 3, 1),
        };

        let text = sample(
            &model,
            &LstmState::zeros(4),
            &vocab.one_hot(0),
            10,
            &vocab,
            &mut rng,
        );
        assert_eq!(text, "bbbbbbbbbb");
    }

    #[test]
    fn test_sample_is_reproducible_under_a_seed() {
        let vocab = CharVocab::build("abcd");
        let mut init_rng = StdRng::seed_from_u64(3);
        let model = CharLstm::new(&Config::tiny(4), &mut init_rng);
        let state = LstmState::zeros(model.config.num_cells);
        let seed = vocab.one_hot(0);

        let a = sample(&model, &state, &seed, 16, &vocab, &mut StdRng::seed_from_u64(4));
        let b = sample(&model, &state, &seed, 16, &vocab, &mut StdRng::seed_from_u64(4));
        assert_eq!(a, b);
    }
}

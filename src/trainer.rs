//! Training Loop
//!
//! Drives truncated BPTT over the corpus for a fixed number of iterations.
//! Each iteration is one window:
//!
//! 1. Take the next window from the loader. If it starts a fresh sweep,
//!    discard the carried recurrent state and start from zeros — the
//!    loader's flag is the only reset trigger.
//! 2. Run the full forward + backward pass over the window.
//! 3. Clip the accumulated gradients elementwise, then apply the
//!    gradient-descent update. The parameters change exactly once per
//!    window, here.
//! 4. Carry the window's final `(h, c)` into the next iteration, so state
//!    flows across window boundaries even though gradient propagation is
//!    truncated at the window edge.
//!
//! Every `sample_every` iterations the loop generates a short text sample
//! from the current model and reports it with the loss metrics. Sampling
//! works on clones of the model state, so it never perturbs training.

use crate::data::{Window, WindowLoader};
use crate::gradients::clip_gradients;
use crate::layers::lstm_cell::LstmState;
use crate::model::CharLstm;
use crate::optimizer::sgd_update;
use crate::sampler::sample;
use crate::training_logger::TrainingLogger;
use crate::vocab::CharVocab;
use rand::Rng;

/// Smoothing factor for the running average loss shown in logs.
const AVG_LOSS_DECAY: f32 = 0.99;

/// Train on a single window: reset-or-carry, backward, clip, update
///
/// Returns the window loss and the final state to carry into the next
/// window.
pub fn train_window(model: &mut CharLstm, window: &Window, carried: LstmState) -> (f32, LstmState) {
    let state = if window.fresh_sweep {
        LstmState::zeros(model.config.num_cells)
    } else {
        carried
    };

    let (loss, mut grads, final_state) =
        model.backward_window(&window.inputs, &window.targets, &state);
    clip_gradients(&mut grads, model.config.clip_limit);
    sgd_update(model, &grads, model.config.learning_rate);

    (loss, final_state)
}

/// Run the full training loop for `config.iterations` windows
///
/// # Arguments
///
/// * `model` - Model to train in place
/// * `loader` - Window source over the encoded corpus
/// * `vocab` - Alphabet, used to decode generated samples
/// * `logger` - Optional metrics sink; when absent the loop runs silently
/// * `rng` - Randomness for the periodic text samples
///
/// # Returns
///
/// The per-window loss history, one entry per iteration.
pub fn train<R: Rng>(
    model: &mut CharLstm,
    loader: &mut WindowLoader,
    vocab: &CharVocab,
    mut logger: Option<&mut TrainingLogger>,
    rng: &mut R,
) -> std::io::Result<Vec<f32>> {
    let iterations = model.config.iterations;
    let sample_every = model.config.sample_every;
    let steps = model.config.seq_len as f32;

    let mut state = LstmState::zeros(model.config.num_cells);
    let mut losses = Vec::with_capacity(iterations);
    let mut avg_loss = f32::NAN;

    for iteration in 0..iterations {
        let window = loader.next_window();
        let (loss, next_state) = train_window(model, &window, state);
        state = next_state;

        avg_loss = if avg_loss.is_nan() {
            loss
        } else {
            AVG_LOSS_DECAY * avg_loss + (1.0 - AVG_LOSS_DECAY) * loss
        };
        losses.push(loss);

        if sample_every > 0 && iteration % sample_every == 0 {
            if let Some(logger) = logger.as_deref_mut() {
                let text = sample(
                    model,
                    &state,
                    &window.inputs[0],
                    model.config.sample_len,
                    vocab,
                    rng,
                );
                let perplexity = (loss / steps).exp();
                logger.log(iteration, loss, avg_loss, perplexity, Some(&text))?;
            }
        }
    }

    Ok(losses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Config;
    use crate::tensor::Matrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cycle_setup(seed: u64, iterations: usize) -> (CharLstm, WindowLoader, CharVocab) {
        let text = "abc".repeat(10);
        let vocab = CharVocab::build(&text);
        let config = Config {
            num_cells: 8,
            features: vocab.len(),
            seq_len: 3,
            learning_rate: 0.1,
            clip_limit: 1.0,
            iterations,
            sample_every: 0,
            sample_len: 0,
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let model = CharLstm::new(&config, &mut rng);
        let loader = WindowLoader::new(vocab.encode(&text), config.seq_len);
        (model, loader, vocab)
    }

    #[test]
    fn test_loss_trends_downward_on_cyclic_corpus() {
        let (mut model, mut loader, vocab) = cycle_setup(0, 300);
        let mut rng = StdRng::seed_from_u64(1);
        let losses = train(&mut model, &mut loader, &vocab, None, &mut rng).unwrap();

        assert_eq!(losses.len(), 300);
        let early: f32 = losses[..20].iter().sum::<f32>() / 20.0;
        let late: f32 = losses[losses.len() - 20..].iter().sum::<f32>() / 20.0;
        assert!(
            late < early * 0.75,
            "moving-average loss did not fall: early {} late {}",
            early,
            late
        );
    }

    #[test]
    fn test_fresh_sweep_discards_carried_state() {
        // A window flagged fresh must behave identically whether the caller
        // passes a garbage carried state or an all-zero one.
        let (model_a, _, vocab) = cycle_setup(7, 1);
        let mut model_b = model_a.clone();
        let mut model_a = model_a;

        let encoded = vocab.encode(&"abc".repeat(4));
        let window = Window {
            inputs: encoded[..3].to_vec(),
            targets: encoded[1..4].to_vec(),
            fresh_sweep: true,
        };

        let garbage = LstmState {
            h: Matrix::new(vec![9.0; 8], 8, 1),
            c: Matrix::new(vec![-9.0; 8], 8, 1),
        };
        let (loss_garbage, state_a) = train_window(&mut model_a, &window, garbage);
        let (loss_zero, state_b) = train_window(&mut model_b, &window, LstmState::zeros(8));

        assert_eq!(loss_garbage, loss_zero);
        assert_eq!(state_a.h.data, state_b.h.data);
        assert_eq!(state_a.c.data, state_b.c.data);
        assert_eq!(model_a.cell.w_f.data, model_b.cell.w_f.data);
    }

    #[test]
    fn test_carried_state_matters_when_not_fresh() {
        let (model_a, _, vocab) = cycle_setup(8, 1);
        let mut model_b = model_a.clone();
        let mut model_a = model_a;

        let encoded = vocab.encode(&"abc".repeat(4));
        let window = Window {
            inputs: encoded[..3].to_vec(),
            targets: encoded[1..4].to_vec(),
            fresh_sweep: false,
        };

        let carried = LstmState {
            h: Matrix::new(vec![0.5; 8], 8, 1),
            c: Matrix::new(vec![0.5; 8], 8, 1),
        };
        let (loss_carried, _) = train_window(&mut model_a, &window, carried);
        let (loss_zero, _) = train_window(&mut model_b, &window, LstmState::zeros(8));
        assert_ne!(loss_carried, loss_zero);
    }

    #[test]
    fn test_training_with_logger_writes_samples() {
        let path = std::env::temp_dir().join("puck_trainer_log_test.csv");
        let path = path.to_str().unwrap().to_string();

        let (mut model, mut loader, vocab) = cycle_setup(9, 20);
        model.config.sample_every = 10;
        model.config.sample_len = 5;
        let mut logger = TrainingLogger::new(&path).unwrap();
        let mut rng = StdRng::seed_from_u64(10);
        train(&mut model, &mut loader, &vocab, Some(&mut logger), &mut rng).unwrap();
        drop(logger);

        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        // Header plus a row at iterations 0 and 10
        assert_eq!(contents.lines().count(), 3);
    }
}

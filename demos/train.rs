//! Train the Character-Level LSTM
//!
//! Trains on a text file (or a built-in fallback corpus), printing a
//! generated sample alongside the loss as training progresses.
//!
//! ## Usage
//!
//! ```bash
//! # Train on a text file
//! cargo run --release --example train -- --data corpus.txt
//!
//! # Quick run on the built-in corpus with a fixed seed
//! cargo run --release --example train -- --iterations 5000 --seed 0
//!
//! # Wider model, longer windows
//! cargo run --release --example train -- --hidden 256 --window 25
//!
//! # Save the trained parameters
//! cargo run --release --example train -- --save model.json
//! ```
//!
//! Metrics are appended to a CSV (default `training_log.csv`) for later
//! inspection.

use clap::Parser;
use puck::{train, CharLstm, CharVocab, Config, TrainingLogger, WindowLoader};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;

/// Fallback corpus when no data file is given: small, cyclic, and
/// learnable in a few thousand iterations.
const FALLBACK_TEXT: &str = "the rain in spain stays mainly in the plain. ";

#[derive(Parser)]
#[command(name = "train", about = "Train a character-level LSTM on a text corpus")]
struct Args {
    /// Path to training text file (falls back to a built-in corpus)
    #[arg(long)]
    data: Option<String>,

    /// Hidden width of the LSTM
    #[arg(long, default_value = "100")]
    hidden: usize,

    /// BPTT window length
    #[arg(long, default_value = "10")]
    window: usize,

    /// Learning rate
    #[arg(long, default_value = "0.1")]
    lr: f32,

    /// Total training iterations (one window each)
    #[arg(long, default_value = "20000")]
    iterations: usize,

    /// Log and sample every N iterations
    #[arg(long, default_value = "500")]
    sample_every: usize,

    /// Length of each generated sample
    #[arg(long, default_value = "40")]
    sample_len: usize,

    /// RNG seed for reproducible runs (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// CSV metrics output path
    #[arg(long, default_value = "training_log.csv")]
    log_csv: String,

    /// Save the trained model as JSON when done
    #[arg(long)]
    save: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let text = match &args.data {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path, e))?,
        None => FALLBACK_TEXT.repeat(40),
    };

    let vocab = CharVocab::build(&text);
    println!("{}", "=".repeat(70));
    println!("  Training a character-level LSTM");
    println!("{}", "=".repeat(70));
    println!(
        "Corpus: {} characters, alphabet of {}",
        text.chars().count(),
        vocab.len()
    );

    let config = Config {
        num_cells: args.hidden,
        features: vocab.len(),
        seq_len: args.window,
        learning_rate: args.lr,
        clip_limit: 1.0,
        iterations: args.iterations,
        sample_every: args.sample_every,
        sample_len: args.sample_len,
    };
    println!(
        "Model: {} cells, {}-step windows, lr {}\n",
        config.num_cells, config.seq_len, config.learning_rate
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut model = CharLstm::new(&config, &mut rng);
    let mut loader = WindowLoader::new(vocab.encode(&text), config.seq_len);
    let mut logger = TrainingLogger::new(&args.log_csv)?;

    let losses = train(&mut model, &mut loader, &vocab, Some(&mut logger), &mut rng)?;

    println!("\n{}", "=".repeat(70));
    if let (Some(first), Some(last)) = (losses.first(), losses.last()) {
        println!("Loss: {:.4} -> {:.4} over {} windows", first, last, losses.len());
    }

    if let Some(path) = &args.save {
        model.save(path)?;
        println!("Model saved to {}", path);
    }

    Ok(())
}

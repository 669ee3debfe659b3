//! Training Logger
//!
//! Tracks training metrics to both a CSV file and the console. The CSV can
//! be analyzed later for visualization or run comparison; the console line
//! is the live view.
//!
//! ## CSV Format
//!
//! - `iteration`: Window number
//! - `elapsed_seconds`: Time since training started
//! - `loss`: Cross-entropy loss summed over the window
//! - `avg_loss`: Exponential moving average of the window loss
//! - `perplexity`: exp(loss / steps) — per-character, interpretable
//! - `sample`: Generated text at this point in training
//!
//! ## Perplexity
//!
//! A perfect model sits at 1.0; a model guessing uniformly over an alphabet
//! of N characters sits at N. Watching it fall from N toward 1 is the most
//! readable signal that the model is learning the corpus.

use std::fs::File;
use std::io::Write;
use std::time::Instant;

/// Logger writing one CSV row and one console line per report
pub struct TrainingLogger {
    log_file: File,
    start_time: Instant,
    last_log_time: Instant,
}

impl TrainingLogger {
    /// Create a logger, writing the CSV header immediately
    pub fn new(log_path: &str) -> std::io::Result<Self> {
        let mut log_file = File::create(log_path)?;
        writeln!(
            log_file,
            "iteration,elapsed_seconds,loss,avg_loss,perplexity,sample"
        )?;

        let now = Instant::now();
        Ok(Self {
            log_file,
            start_time: now,
            last_log_time: now,
        })
    }

    /// Report one training iteration
    ///
    /// # Arguments
    ///
    /// * `iteration` - Window number
    /// * `loss` - This window's summed cross-entropy loss
    /// * `avg_loss` - Smoothed loss
    /// * `perplexity` - Per-character perplexity
    /// * `sample` - Optional generated text
    pub fn log(
        &mut self,
        iteration: usize,
        loss: f32,
        avg_loss: f32,
        perplexity: f32,
        sample: Option<&str>,
    ) -> std::io::Result<()> {
        let elapsed = self.start_time.elapsed().as_secs_f32();

        // Escape quotes so generated text can't break the CSV
        let sample_escaped = sample.map(|s| s.replace('"', "\"\"")).unwrap_or_default();
        writeln!(
            self.log_file,
            "{},{:.2},{:.4},{:.4},{:.2},\"{}\"",
            iteration, elapsed, loss, avg_loss, perplexity, sample_escaped
        )?;
        // Flush per row so a crashed run still leaves usable data
        self.log_file.flush()?;

        let since_last = self.last_log_time.elapsed().as_secs_f32();
        println!(
            "Iter {:6} | Time: {:7.1}s (+{:.1}s) | Loss: {:8.4} | Avg: {:8.4} | Perplexity: {:6.2}",
            iteration, elapsed, since_last, loss, avg_loss, perplexity
        );
        if let Some(text) = sample {
            println!("  Sample: {:?}", text);
        }

        self.last_log_time = Instant::now();
        Ok(())
    }
}

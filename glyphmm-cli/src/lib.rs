//! Training and generation drivers behind the `glyphmm` binary.
//!
//! These wrap the model's single-string operations with the corpus-level
//! policy: epochs, shuffling, skipping bad lines, and batches of generated
//! words.

use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use glyphmm_core::Result;
use glyphmm_hmm::{GenerateConfig, HmmModel, TrainConfig};

/// Corpus-level training options.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    /// Passes over the corpus.
    pub epochs: usize,
    /// Per-string training configuration.
    pub config: TrainConfig,
    /// Warn and continue on a string the model rejects instead of aborting.
    pub skip_invalid: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        TrainOptions {
            epochs: 10,
            config: TrainConfig::with_rate(0.0005),
            skip_invalid: false,
        }
    }
}

/// Counts from a [`train_epochs`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainSummary {
    pub trained: usize,
    pub skipped: usize,
}

/// Train `model` for `opts.epochs` passes, shuffling `corpus` before each.
pub fn train_epochs<R: Rng + ?Sized>(
    model: &mut HmmModel,
    corpus: &mut [String],
    opts: &TrainOptions,
    rng: &mut R,
) -> Result<TrainSummary> {
    let mut summary = TrainSummary::default();
    for epoch in 1..=opts.epochs {
        let started = Instant::now();
        info!(epoch, epochs = opts.epochs, "training");
        corpus.shuffle(rng);

        for word in corpus.iter() {
            debug!(epoch, word = %word, "training");
            match model.train_with(word, &opts.config) {
                Ok(()) => summary.trained += 1,
                Err(e) if opts.skip_invalid => {
                    warn!(word = %word, error = %e, "skipping");
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }
        info!(
            epoch,
            elapsed_ms = started.elapsed().as_millis() as u64,
            drift = model.max_row_drift(),
            "epoch done"
        );
    }
    Ok(summary)
}

/// Word generation options.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub count: usize,
    pub stop: char,
    /// Fixed part of the minimum length.
    pub min_len: usize,
    /// Each word's minimum length is `min_len` plus a uniform draw from
    /// `0..len_jitter`.
    pub len_jitter: usize,
    pub quality: f64,
    pub max_attempts: Option<usize>,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            count: 100,
            stop: '$',
            min_len: 4,
            len_jitter: 4,
            quality: 0.09,
            max_attempts: None,
        }
    }
}

/// Generate `opts.count` words with the stop symbol stripped.
pub fn generate_words<R: Rng + ?Sized>(
    model: &HmmModel,
    opts: &GenerateOptions,
    rng: &mut R,
) -> Result<Vec<String>> {
    let mut words = Vec::with_capacity(opts.count);
    for _ in 0..opts.count {
        let jitter = if opts.len_jitter > 0 {
            rng.gen_range(0..opts.len_jitter)
        } else {
            0
        };
        let config = GenerateConfig {
            stop: opts.stop,
            min_len: opts.min_len + jitter,
            quality: opts.quality,
            max_attempts: opts.max_attempts,
        };
        let mut word = model.generate(&config, rng)?;
        word.pop();
        words.push(word);
    }
    Ok(words)
}

/// Rejected samples allowed per preview word before giving up.
pub const PREVIEW_MAX_ATTEMPTS: usize = 10_000;

/// A handful of words sampled with the default generation settings, for a
/// quick look at a freshly trained model.
pub fn preview_words<R: Rng + ?Sized>(
    model: &HmmModel,
    count: usize,
    stop: char,
    rng: &mut R,
) -> Result<Vec<String>> {
    let opts = GenerateOptions {
        count,
        stop,
        max_attempts: Some(PREVIEW_MAX_ATTEMPTS),
        ..GenerateOptions::default()
    };
    generate_words(model, &opts, rng)
}

//! Incremental Baum-Welch training.
//!
//! Each call runs one EM sweep over a single sequence and then moves every
//! parameter a fraction `rate` of the way toward its M-step estimate:
//! `v <- v + rate * (v* - v)`. This is a relaxation, not the textbook
//! Baum-Welch replacement `v <- v*`: repeated calls over a shuffled corpus
//! behave like small mini-batch steps. With `rate = 1.0` a call is exactly one
//! classic Baum-Welch iteration on that sequence.

use glyphmm_core::prob::{self, relax};
use glyphmm_core::{GlyphError, Result};

use crate::model::HmmModel;

/// Learning rate used when none is given.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Configuration for a training step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    /// Fraction of the distance to the EM target covered per step, in `(0, 1]`.
    pub rate: f64,
    /// Rescale all rows to sum to 1 after each update.
    pub renormalize: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            rate: DEFAULT_LEARNING_RATE,
            renormalize: false,
        }
    }
}

impl TrainConfig {
    /// Default configuration with a different learning rate.
    pub fn with_rate(rate: f64) -> Self {
        TrainConfig {
            rate,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if !(self.rate > 0.0 && self.rate <= 1.0) {
            return Err(GlyphError::InvalidInput(format!(
                "learning rate {} is outside (0, 1]",
                self.rate
            )));
        }
        Ok(())
    }
}

/// M-step estimates for one sequence.
///
/// A row is `None` when its denominator is zero, i.e. the state has no
/// expected departures (always true for transitions on a length-1 sequence).
#[derive(Debug)]
struct EmTargets {
    initial: Vec<f64>,
    transition: Vec<Option<Vec<f64>>>,
    emission: Vec<Option<Vec<f64>>>,
}

impl HmmModel {
    /// Train on one sequence with the given learning rate.
    ///
    /// # Errors
    ///
    /// Returns an error if `rate` is outside `(0, 1]`, if `seq` is empty or
    /// contains a symbol outside the alphabet, or if `seq` has zero likelihood
    /// under the current parameters. The model is untouched on error.
    pub fn train(&mut self, seq: &str, rate: f64) -> Result<()> {
        self.train_with(seq, &TrainConfig::with_rate(rate))
    }

    /// Train on one sequence with an explicit [`TrainConfig`].
    ///
    /// # Errors
    ///
    /// See [`train`](Self::train).
    pub fn train_with(&mut self, seq: &str, config: &TrainConfig) -> Result<()> {
        config.validate()?;
        let obs = self.alphabet.encode(seq)?;
        let targets = self.em_targets(&obs)?;
        self.apply_targets(&targets, config.rate);
        if config.renormalize {
            self.renormalize();
        }
        Ok(())
    }

    /// Train on each sequence in order, all with the same rate.
    ///
    /// Stops at the first failing sequence and returns its error; updates
    /// from the sequences before it are kept.
    pub fn train_batch<I, S>(&mut self, seqs: I, rate: f64) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let config = TrainConfig::with_rate(rate);
        for (i, seq) in seqs.into_iter().enumerate() {
            let seq = seq.as_ref();
            tracing::debug!(index = i, seq, "training");
            self.train_with(seq, &config)?;
        }
        Ok(())
    }

    /// E-step plus M-step estimates. Reads the model, never writes it.
    fn em_targets(&self, obs: &[usize]) -> Result<EmTargets> {
        let n = self.n_states;
        let m = self.n_symbols();
        let t_len = obs.len();

        let alpha = self.forward_codes(obs);
        let beta = self.backward_codes(obs);

        let likelihood: f64 = alpha[t_len - 1].iter().sum();
        tracing::trace!(likelihood, len = t_len, "E-step");

        // gamma[t][j] = P(state j at t | obs)
        let mut gamma = vec![vec![0.0f64; n]; t_len];
        for t in 0..t_len {
            let sum: f64 = (0..n).map(|k| alpha[t][k] * beta[t][k]).sum();
            if !(sum > 0.0 && sum.is_finite()) {
                return Err(GlyphError::ZeroLikelihood);
            }
            for j in 0..n {
                gamma[t][j] = alpha[t][j] * beta[t][j] / sum;
            }
        }

        // kappa[t][j][k] = P(state j at t, state k at t+1 | obs), summed over t
        // as it is only ever used through that sum. Stored row-major.
        let mut kappa_sum = vec![0.0f64; n * n];
        let mut kappa_t = vec![0.0f64; n * n];
        for t in 0..t_len.saturating_sub(1) {
            let ot1 = obs[t + 1];
            let mut sum = 0.0;
            for j in 0..n {
                for k in 0..n {
                    let v = alpha[t][j] * self.a(j, k) * self.b(k, ot1) * beta[t + 1][k];
                    kappa_t[j * n + k] = v;
                    sum += v;
                }
            }
            if !(sum > 0.0 && sum.is_finite()) {
                return Err(GlyphError::ZeroLikelihood);
            }
            for (acc, v) in kappa_sum.iter_mut().zip(&kappa_t) {
                *acc += v / sum;
            }
        }

        let mut transition: Vec<Option<Vec<f64>>> = Vec::with_capacity(n);
        let mut emission: Vec<Option<Vec<f64>>> = Vec::with_capacity(n);
        for i in 0..n {
            // Expected departures from i: every position except the last.
            let departures: f64 = gamma[..t_len - 1].iter().map(|g| g[i]).sum();
            transition.push((departures > 0.0).then(|| {
                kappa_sum[i * n..(i + 1) * n]
                    .iter()
                    .map(|k| k / departures)
                    .collect()
            }));

            let visits = departures + gamma[t_len - 1][i];
            emission.push((visits > 0.0).then(|| {
                let mut row = vec![0.0f64; m];
                for (t, &o) in obs.iter().enumerate() {
                    row[o] += gamma[t][i];
                }
                for v in row.iter_mut() {
                    *v /= visits;
                }
                row
            }));
        }

        Ok(EmTargets {
            initial: gamma[0].clone(),
            transition,
            emission,
        })
    }

    fn apply_targets(&mut self, targets: &EmTargets, rate: f64) {
        let n = self.n_states;
        let m = self.n_symbols();
        for i in 0..n {
            if let Some(row) = &targets.transition[i] {
                for (v, &target) in self.transition[i * n..(i + 1) * n].iter_mut().zip(row) {
                    *v = relax(*v, target, rate);
                }
            }
            if let Some(row) = &targets.emission[i] {
                for (v, &target) in self.emission[i * m..(i + 1) * m].iter_mut().zip(row) {
                    *v = relax(*v, target, rate);
                }
            }
            self.initial[i] = relax(self.initial[i], targets.initial[i], rate);
        }
    }

    /// Largest deviation of any row (or `initial`) from summing to 1.
    ///
    /// Useful for deciding when to call [`renormalize`](Self::renormalize).
    pub fn max_row_drift(&self) -> f64 {
        let n = self.n_states;
        let m = self.n_symbols();
        std::iter::once(self.initial.as_slice())
            .chain(self.transition.chunks(n))
            .chain(self.emission.chunks(m))
            .map(|row| (prob::row_sum(row) - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

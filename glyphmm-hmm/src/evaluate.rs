//! Sequence likelihood.

use glyphmm_core::Result;

use crate::model::HmmModel;

impl HmmModel {
    /// Probability that the model emits exactly `seq`, ending in any state.
    ///
    /// This is `sum_j alpha[T-1][j]` from the forward recursion, unscaled, so
    /// it underflows toward zero for long sequences.
    ///
    /// # Errors
    ///
    /// Returns an unknown-symbol error if `seq` contains a char outside the
    /// alphabet, or an invalid-input error if it is empty.
    pub fn evaluate(&self, seq: &str) -> Result<f64> {
        let obs = self.alphabet.encode(seq)?;
        Ok(self.evaluate_codes(&obs))
    }

    /// Geometric-mean per-symbol likelihood: `evaluate(seq)^(1/T)`.
    ///
    /// This is the score the generator's quality gate compares against.
    pub fn quality(&self, seq: &str) -> Result<f64> {
        let obs = self.alphabet.encode(seq)?;
        Ok(self.evaluate_codes(&obs).powf(1.0 / obs.len() as f64))
    }

    /// Natural log of [`evaluate`](Self::evaluate). `-inf` for impossible sequences.
    pub fn log_likelihood(&self, seq: &str) -> Result<f64> {
        Ok(self.evaluate(seq)?.ln())
    }

    pub(crate) fn evaluate_codes(&self, obs: &[usize]) -> f64 {
        let alpha = self.forward_codes(obs);
        alpha[obs.len() - 1].iter().sum()
    }
}

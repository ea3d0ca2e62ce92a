//! Forward and backward recursions.
//!
//! The tables are computed in plain probability space with no per-step
//! scaling. Values shrink geometrically with sequence length, so long
//! sequences or large state counts underflow to zero; the model is meant for
//! short word-like strings where this does not happen.

use glyphmm_core::Result;

use crate::model::HmmModel;

/// Forward (`alpha`) and backward (`beta`) tables for one observation sequence.
///
/// Both are indexed `[t][state]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardBackward {
    /// `alpha[t][j]`: joint probability of `x[0..=t]` and being in state `j` at `t`.
    pub alpha: Vec<Vec<f64>>,
    /// `beta[t][j]`: probability of `x[t+1..]` given state `j` at `t`.
    pub beta: Vec<Vec<f64>>,
}

impl ForwardBackward {
    /// Sequence length `T`.
    pub fn len(&self) -> usize {
        self.alpha.len()
    }

    /// Whether the tables are empty (never the case for tables built by the model).
    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty()
    }

    /// `sum_j alpha[t][j] * beta[t][j]`.
    ///
    /// This equals the sequence likelihood for every `t`; the E-step relies
    /// on that identity to normalize the posteriors.
    pub fn likelihood_at(&self, t: usize) -> f64 {
        self.alpha[t]
            .iter()
            .zip(&self.beta[t])
            .map(|(a, b)| a * b)
            .sum()
    }
}

impl HmmModel {
    /// Run the forward recursion over `seq`.
    ///
    /// # Errors
    ///
    /// Returns an unknown-symbol error if `seq` contains a char outside the
    /// alphabet, or an invalid-input error if it is empty.
    pub fn forward(&self, seq: &str) -> Result<Vec<Vec<f64>>> {
        let obs = self.alphabet.encode(seq)?;
        Ok(self.forward_codes(&obs))
    }

    /// Run the backward recursion over `seq`.
    ///
    /// # Errors
    ///
    /// Same as [`forward`](Self::forward).
    pub fn backward(&self, seq: &str) -> Result<Vec<Vec<f64>>> {
        let obs = self.alphabet.encode(seq)?;
        Ok(self.backward_codes(&obs))
    }

    /// Run both recursions over `seq`.
    ///
    /// # Errors
    ///
    /// Same as [`forward`](Self::forward).
    pub fn forward_backward(&self, seq: &str) -> Result<ForwardBackward> {
        let obs = self.alphabet.encode(seq)?;
        Ok(ForwardBackward {
            alpha: self.forward_codes(&obs),
            beta: self.backward_codes(&obs),
        })
    }

    /// Forward table for already-encoded, non-empty observations.
    pub(crate) fn forward_codes(&self, obs: &[usize]) -> Vec<Vec<f64>> {
        let n = self.n_states;
        let mut alpha = vec![vec![0.0f64; n]; obs.len()];

        let o0 = obs[0];
        for j in 0..n {
            alpha[0][j] = self.initial[j] * self.b(j, o0);
        }

        for t in 1..obs.len() {
            let ot = obs[t];
            for j in 0..n {
                let mut acc = 0.0;
                for k in 0..n {
                    acc += alpha[t - 1][k] * self.a(k, j);
                }
                alpha[t][j] = acc * self.b(j, ot);
            }
        }

        alpha
    }

    /// Backward table for already-encoded, non-empty observations.
    pub(crate) fn backward_codes(&self, obs: &[usize]) -> Vec<Vec<f64>> {
        let n = self.n_states;
        let t_len = obs.len();
        let mut beta = vec![vec![0.0f64; n]; t_len];

        for j in 0..n {
            beta[t_len - 1][j] = 1.0;
        }

        for t in (0..t_len - 1).rev() {
            let ot1 = obs[t + 1];
            for j in 0..n {
                let mut acc = 0.0;
                for k in 0..n {
                    acc += self.a(j, k) * self.b(k, ot1) * beta[t + 1][k];
                }
                beta[t][j] = acc;
            }
        }

        beta
    }
}

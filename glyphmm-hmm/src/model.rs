//! The HMM parameter set and its initializer.

use rand::Rng;

use glyphmm_core::prob;
use glyphmm_core::{GlyphError, Result};

use crate::alphabet::Alphabet;

/// Mass cap for a pair of initial-state entries during random initialization.
const INIT_PAIR_CAP: f64 = 0.9;

/// A discrete Hidden Markov Model over an [`Alphabet`].
///
/// Parameters are stored in probability space. Rows start out summing to 1;
/// training relaxes them toward their EM targets without renormalizing, so
/// sums drift slightly over many updates (see [`HmmModel::renormalize`]).
#[derive(Debug, Clone, PartialEq)]
pub struct HmmModel {
    /// Number of hidden states.
    pub(crate) n_states: usize,
    /// Observable symbols; `alphabet.len()` is the emission row width.
    pub(crate) alphabet: Alphabet,
    /// Initial state probabilities pi[i] (length `n_states`).
    pub(crate) initial: Vec<f64>,
    /// Transition matrix A[i][j] = P(state_j | state_i), stored row-major
    /// as `Vec<f64>` of size `n_states * n_states`.
    pub(crate) transition: Vec<f64>,
    /// Emission matrix B[i][k] = P(symbol_k | state_i), stored row-major
    /// as `Vec<f64>` of size `n_states * n_symbols`.
    pub(crate) emission: Vec<f64>,
}

impl HmmModel {
    /// Create a model with `n_states` states over `alphabet`, seeded from the
    /// thread-local RNG. See [`HmmModel::random`].
    pub fn new(n_states: usize, alphabet: Alphabet) -> Result<Self> {
        Self::random(n_states, alphabet, &mut rand::thread_rng())
    }

    /// Create a near-uniform model with a perturbed initial distribution.
    ///
    /// Transition and emission rows are exactly uniform. The initial
    /// distribution starts uniform and then undergoes `3 * n_states` random
    /// pairwise transfers: two distinct states are drawn, and unless their
    /// combined mass already exceeds 0.9, a random fraction of the first's
    /// mass moves to the second. Transfers preserve the total, so `initial`
    /// still sums to 1.
    ///
    /// # Errors
    ///
    /// Returns an error if `n_states` is zero.
    pub fn random<R: Rng + ?Sized>(
        n_states: usize,
        alphabet: Alphabet,
        rng: &mut R,
    ) -> Result<Self> {
        if n_states == 0 {
            return Err(GlyphError::InvalidInput("n_states must be > 0".into()));
        }
        let n = n_states;
        let m = alphabet.len();

        let mut initial = vec![1.0 / n as f64; n];
        for _ in 0..3 * n {
            let i = rng.gen_range(0..n);
            let j = rng.gen_range(0..n);
            if i == j || initial[i] + initial[j] > INIT_PAIR_CAP {
                continue;
            }
            let moved = initial[i] * rng.gen::<f64>();
            initial[i] -= moved;
            initial[j] += moved;
        }

        Ok(Self {
            n_states: n,
            alphabet,
            initial,
            transition: vec![1.0 / n as f64; n * n],
            emission: vec![1.0 / m as f64; n * m],
        })
    }

    /// Build a model from explicit parameters.
    ///
    /// `transition` and `emission` are row-major. The state count is taken
    /// from `initial.len()`. Rows are not required to sum to 1, since trained
    /// models drift, but every value must be finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns an error on dimension mismatches or invalid values.
    pub fn from_parts(
        alphabet: Alphabet,
        initial: Vec<f64>,
        transition: Vec<f64>,
        emission: Vec<f64>,
    ) -> Result<Self> {
        let n = initial.len();
        let m = alphabet.len();
        if n == 0 {
            return Err(GlyphError::InvalidInput("n_states must be > 0".into()));
        }
        if transition.len() != n * n {
            return Err(GlyphError::InvalidInput(format!(
                "transition length {} != n_states*n_states {}",
                transition.len(),
                n * n
            )));
        }
        if emission.len() != n * m {
            return Err(GlyphError::InvalidInput(format!(
                "emission length {} != n_states*n_symbols {}",
                emission.len(),
                n * m
            )));
        }
        let all = initial.iter().chain(&transition).chain(&emission);
        if let Some(bad) = all.copied().find(|v| !v.is_finite() || *v < 0.0) {
            return Err(GlyphError::InvalidInput(format!(
                "probability {bad} is not a finite non-negative number"
            )));
        }
        Ok(Self {
            n_states: n,
            alphabet,
            initial,
            transition,
            emission,
        })
    }

    /// Number of hidden states.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Number of observable symbols.
    pub fn n_symbols(&self) -> usize {
        self.alphabet.len()
    }

    /// The observation alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Initial state distribution.
    pub fn initial(&self) -> &[f64] {
        &self.initial
    }

    /// Transition probabilities out of `state`.
    ///
    /// # Panics
    ///
    /// Panics if `state >= n_states`.
    pub fn transition_row(&self, state: usize) -> &[f64] {
        let n = self.n_states;
        &self.transition[state * n..(state + 1) * n]
    }

    /// Emission probabilities of `state`, indexed by symbol code.
    ///
    /// # Panics
    ///
    /// Panics if `state >= n_states`.
    pub fn emission_row(&self, state: usize) -> &[f64] {
        let m = self.n_symbols();
        &self.emission[state * m..(state + 1) * m]
    }

    /// Rescale `initial` and every transition and emission row to sum to 1.
    ///
    /// Training never calls this on its own unless asked to through
    /// `TrainConfig::renormalize`; it undoes the row-sum drift that
    /// accumulates from partial updates.
    pub fn renormalize(&mut self) {
        let n = self.n_states;
        let m = self.n_symbols();
        prob::normalize(&mut self.initial);
        for row in self.transition.chunks_mut(n) {
            prob::normalize(row);
        }
        for row in self.emission.chunks_mut(m) {
            prob::normalize(row);
        }
    }

    #[inline]
    pub(crate) fn a(&self, from: usize, to: usize) -> f64 {
        self.transition[from * self.n_states + to]
    }

    #[inline]
    pub(crate) fn b(&self, state: usize, symbol: usize) -> f64 {
        self.emission[state * self.alphabet.len() + symbol]
    }
}

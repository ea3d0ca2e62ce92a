//! Sampling strings from a model.
//!
//! Generation walks the Markov chain from a state drawn from the initial
//! distribution, emitting one symbol per step until the stop symbol comes up.
//! Two constraints shape the output:
//!
//! - **Minimum length**: while fewer than `min_len` symbols have been emitted,
//!   a sampled stop symbol is thrown away and the same state is sampled again.
//! - **Quality**: a finished string whose geometric-mean per-symbol likelihood
//!   is below `quality` is discarded and the walk restarts from scratch.

use rand::Rng;

use glyphmm_core::prob::sample_index;
use glyphmm_core::{GlyphError, Result};

use crate::model::HmmModel;

/// Parameters for [`HmmModel::generate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateConfig {
    /// Symbol that terminates a generated string. Must be in the alphabet.
    pub stop: char,
    /// Minimum number of symbols before the stop symbol.
    pub min_len: usize,
    /// Minimum geometric-mean per-symbol likelihood, in `[0, 1)`. 0 accepts
    /// the first sample.
    pub quality: f64,
    /// Upper bound on rejection-sampling attempts. `None` retries forever.
    ///
    /// This bounds whole samples, not the length of a single walk. Walks that
    /// can never reach the stop symbol are rejected up front instead.
    pub max_attempts: Option<usize>,
}

impl GenerateConfig {
    /// Configuration with no length or quality constraint.
    pub fn new(stop: char) -> Self {
        GenerateConfig {
            stop,
            min_len: 0,
            quality: 0.0,
            max_attempts: None,
        }
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    pub fn with_quality(mut self, quality: f64) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

impl HmmModel {
    /// Generate one string ending in `config.stop`.
    ///
    /// The returned string includes the trailing stop symbol.
    ///
    /// # Errors
    ///
    /// Returns an invalid-input error if the stop symbol is not in the
    /// alphabet, `quality` is outside `[0, 1)`, `max_attempts` is zero, a
    /// state reached before `min_len` can emit nothing but the stop symbol,
    /// or the walk enters a state from which the stop symbol can never be
    /// emitted.
    /// Returns [`GlyphError::GenerationExhausted`] when `max_attempts` samples
    /// in a row fall below the quality threshold.
    ///
    /// Without `max_attempts`, a threshold the model cannot reach makes this
    /// loop forever.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        config: &GenerateConfig,
        rng: &mut R,
    ) -> Result<String> {
        let stop = self.alphabet.index_of(config.stop).ok_or_else(|| {
            GlyphError::InvalidInput(format!(
                "stop symbol {:?} is not in the alphabet",
                config.stop
            ))
        })?;
        if !(0.0..1.0).contains(&config.quality) {
            return Err(GlyphError::InvalidInput(format!(
                "quality threshold {} is outside [0, 1)",
                config.quality
            )));
        }
        if config.max_attempts == Some(0) {
            return Err(GlyphError::InvalidInput("max_attempts must be > 0".into()));
        }

        let reaches_stop = self.states_reaching(stop);
        let mut attempts = 0usize;
        loop {
            attempts += 1;
            let codes = self.walk(stop, &reaches_stop, config.min_len, rng)?;

            if config.quality <= 0.0 {
                return Ok(self.decode(&codes));
            }
            let score = self
                .evaluate_codes(&codes)
                .powf(1.0 / codes.len() as f64);
            if score >= config.quality {
                tracing::trace!(attempts, score, "sample accepted");
                return Ok(self.decode(&codes));
            }
            tracing::trace!(attempts, score, "sample below quality threshold");

            if let Some(max) = config.max_attempts {
                if attempts >= max {
                    return Err(GlyphError::GenerationExhausted { attempts });
                }
            }
        }
    }

    /// States with a positive-probability path to emitting `stop`.
    fn states_reaching(&self, stop: usize) -> Vec<bool> {
        let n = self.n_states;
        let mut reaches: Vec<bool> = (0..n).map(|i| self.b(i, stop) > 0.0).collect();
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..n {
                if !reaches[i] && (0..n).any(|j| reaches[j] && self.a(i, j) > 0.0) {
                    reaches[i] = true;
                    changed = true;
                }
            }
        }
        reaches
    }

    /// One Markov walk, returned as symbol codes ending in `stop`.
    fn walk<R: Rng + ?Sized>(
        &self,
        stop: usize,
        reaches_stop: &[bool],
        min_len: usize,
        rng: &mut R,
    ) -> Result<Vec<usize>> {
        let mut state = sample_index(&self.initial, rng)?;
        let mut codes = Vec::new();
        loop {
            if !reaches_stop[state] {
                return Err(GlyphError::InvalidInput(format!(
                    "state {state} can never lead to the stop symbol"
                )));
            }
            let row = self.emission_row(state);
            let too_short = codes.len() < min_len;
            if too_short && row.iter().enumerate().all(|(k, &p)| k == stop || p <= 0.0) {
                return Err(GlyphError::InvalidInput(format!(
                    "state {state} can only emit the stop symbol before the minimum length \
                     is reached"
                )));
            }

            let symbol = sample_index(row, rng)?;
            if symbol == stop && too_short {
                continue;
            }
            codes.push(symbol);
            if symbol == stop {
                return Ok(codes);
            }
            state = sample_index(self.transition_row(state), rng)?;
        }
    }

    fn decode(&self, codes: &[usize]) -> String {
        codes
            .iter()
            .filter_map(|&c| self.alphabet.symbol(c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Helper: near-uniform 2-state model over a 3-symbol alphabet.
    fn uniform_hmm(rng: &mut StdRng) -> HmmModel {
        let alphabet = Alphabet::from_chars("ab$").unwrap();
        HmmModel::random(2, alphabet, rng).unwrap()
    }

    /// Helper: deterministic chain that always spells `ab$`.
    fn spelling_hmm() -> HmmModel {
        let alphabet = Alphabet::from_chars("ab$").unwrap();
        HmmModel::from_parts(
            alphabet,
            vec![1.0, 0.0, 0.0],
            vec![
                0.0, 1.0, 0.0, // 0 -> 1
                0.0, 0.0, 1.0, // 1 -> 2
                0.0, 0.0, 1.0, // 2 -> 2
            ],
            vec![
                1.0, 0.0, 0.0, // emits a
                0.0, 1.0, 0.0, // emits b
                0.0, 0.0, 1.0, // emits $
            ],
        )
        .unwrap()
    }

    /// Helper: one state with a skewed emission row, so per-string quality
    /// varies from sample to sample.
    fn skewed_single_state() -> HmmModel {
        let alphabet = Alphabet::from_chars("ab$").unwrap();
        HmmModel::from_parts(alphabet, vec![1.0], vec![1.0], vec![0.6, 0.3, 0.1]).unwrap()
    }

    #[test]
    fn deterministic_chain_spells_its_word() {
        let model = spelling_hmm();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let s = model.generate(&GenerateConfig::new('$'), &mut rng).unwrap();
            assert_eq!(s, "ab$");
        }
    }

    #[test]
    fn output_ends_with_single_stop() {
        let mut rng = StdRng::seed_from_u64(8);
        let model = uniform_hmm(&mut rng);
        for _ in 0..200 {
            let s = model.generate(&GenerateConfig::new('$'), &mut rng).unwrap();
            assert!(s.ends_with('$'));
            assert_eq!(s.matches('$').count(), 1, "{s}");
        }
    }

    #[test]
    fn minimum_length_is_respected() {
        let mut rng = StdRng::seed_from_u64(4);
        let model = uniform_hmm(&mut rng);
        let config = GenerateConfig::new('$').with_min_len(4);
        for _ in 0..500 {
            let s = model.generate(&config, &mut rng).unwrap();
            let body = s.strip_suffix('$').unwrap();
            assert!(body.chars().count() >= 4, "{s}");
            assert!(!body.contains('$'));
        }
    }

    #[test]
    fn same_seed_same_output() {
        let mut rng = StdRng::seed_from_u64(99);
        let model = uniform_hmm(&mut rng);
        let config = GenerateConfig::new('$').with_min_len(2);
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| model.generate(&config, &mut rng).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn unreachable_quality_exhausts_attempts() {
        let mut rng = StdRng::seed_from_u64(12);
        let model = uniform_hmm(&mut rng);
        // Every string scores exactly 1/3 per symbol under uniform rows.
        let config = GenerateConfig::new('$').with_quality(0.5).with_max_attempts(50);
        match model.generate(&config, &mut rng) {
            Err(GlyphError::GenerationExhausted { attempts }) => assert_eq!(attempts, 50),
            other => panic!("expected GenerationExhausted, got {other:?}"),
        }
    }

    #[test]
    fn accepted_samples_meet_quality_threshold() {
        let model = skewed_single_state();
        let mut rng = StdRng::seed_from_u64(31);
        let config = GenerateConfig::new('$')
            .with_quality(0.4)
            .with_max_attempts(10_000);
        for _ in 0..20 {
            let s = model.generate(&config, &mut rng).unwrap();
            let q = model.quality(&s).unwrap();
            assert!(q >= 0.4, "{s} scored {q}");
        }
    }

    #[test]
    fn zero_quality_accepts_low_scoring_samples() {
        let model = skewed_single_state();
        let mut rng = StdRng::seed_from_u64(6);
        let scores: Vec<f64> = (0..200)
            .map(|_| {
                let s = model.generate(&GenerateConfig::new('$'), &mut rng).unwrap();
                model.quality(&s).unwrap()
            })
            .collect();
        assert!(scores.iter().any(|&q| q < 0.4));
    }

    #[test]
    fn stop_must_be_in_alphabet() {
        let model = spelling_hmm();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            model.generate(&GenerateConfig::new('#'), &mut rng),
            Err(GlyphError::InvalidInput(_))
        ));
    }

    #[test]
    fn quality_out_of_range_rejected() {
        let model = spelling_hmm();
        let mut rng = StdRng::seed_from_u64(0);
        for q in [-0.1, 1.0, 2.0, f64::NAN] {
            let config = GenerateConfig::new('$').with_quality(q);
            assert!(matches!(
                model.generate(&config, &mut rng),
                Err(GlyphError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn zero_attempts_rejected() {
        let model = spelling_hmm();
        let mut rng = StdRng::seed_from_u64(0);
        let config = GenerateConfig::new('$').with_max_attempts(0);
        assert!(model.generate(&config, &mut rng).is_err());
    }

    #[test]
    fn state_that_never_stops_is_an_error() {
        let alphabet = Alphabet::from_chars("ab$").unwrap();
        let model =
            HmmModel::from_parts(alphabet, vec![1.0], vec![1.0], vec![0.5, 0.5, 0.0]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let config = GenerateConfig::new('$').with_max_attempts(1);
        assert!(matches!(
            model.generate(&config, &mut rng),
            Err(GlyphError::InvalidInput(_))
        ));
    }

    #[test]
    fn stop_reachable_through_later_state_is_fine() {
        // State 0 never emits `$` but always hands over to state 1, which does.
        let alphabet = Alphabet::from_chars("ab$").unwrap();
        let model = HmmModel::from_parts(
            alphabet,
            vec![1.0, 0.0],
            vec![
                0.0, 1.0, // 0 -> 1
                0.5, 0.5, // 1 -> either
            ],
            vec![
                0.5, 0.5, 0.0, // no stop
                0.3, 0.3, 0.4, // can stop
            ],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let s = model.generate(&GenerateConfig::new('$'), &mut rng).unwrap();
            assert!(s.ends_with('$'));
        }
    }

    #[test]
    fn stop_only_state_before_min_len_is_an_error() {
        // The chain reaches the `$`-only state after two symbols.
        let model = spelling_hmm();
        let mut rng = StdRng::seed_from_u64(0);
        let config = GenerateConfig::new('$').with_min_len(3);
        assert!(matches!(
            model.generate(&config, &mut rng),
            Err(GlyphError::InvalidInput(_))
        ));
    }
}

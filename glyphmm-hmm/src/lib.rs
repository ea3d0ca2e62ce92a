//! Discrete Hidden Markov Models over symbol strings.
//!
//! An [`HmmModel`] is trained one string at a time with an incremental
//! Baum-Welch step, scores strings by their exact (unscaled) likelihood, and
//! samples new strings that end in a designated stop symbol.
//!
//! Probabilities are kept in plain probability space throughout. This is
//! exact for the short word-like strings the model is built for, but the
//! forward and backward tables underflow for long sequences or large state
//! counts.
//!
//! # Quick start
//!
//! ```
//! use glyphmm_hmm::{Alphabet, GenerateConfig, HmmModel};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let alphabet = Alphabet::from_chars("abc$").unwrap();
//! let mut model = HmmModel::random(4, alphabet, &mut rng).unwrap();
//!
//! let before = model.evaluate("abc$").unwrap();
//! for _ in 0..100 {
//!     model.train("abc$", 0.1).unwrap();
//! }
//! assert!(model.evaluate("abc$").unwrap() > before);
//!
//! let config = GenerateConfig::new('$').with_min_len(2);
//! let word = model.generate(&config, &mut rng).unwrap();
//! assert!(word.ends_with('$'));
//! ```
//!
//! # Training rule
//!
//! [`HmmModel::train`] does not replace the parameters with their M-step
//! estimates as textbook Baum-Welch does. It moves each parameter a fraction
//! `rate` of the way there, which lets repeated passes over a shuffled corpus
//! act like mini-batch updates.

pub mod alphabet;
pub mod evaluate;
pub mod forward_backward;
pub mod generate;
pub mod model;
pub mod record;
pub mod train;

pub use alphabet::Alphabet;
pub use forward_backward::ForwardBackward;
pub use generate::GenerateConfig;
pub use model::HmmModel;
pub use record::{ModelRecord, NodeRecord};
pub use train::{TrainConfig, DEFAULT_LEARNING_RATE};

pub use glyphmm_core::{GlyphError, Result};

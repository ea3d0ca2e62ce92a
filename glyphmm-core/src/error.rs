//! Structured error types for the glyphmm workspace.

use thiserror::Error;

/// Unified error type for all glyphmm operations.
#[derive(Debug, Error)]
pub enum GlyphError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed JSON, undecodable corpus line)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration or arguments (zero states, rate out of range, ...)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An observation contains a symbol that is not part of the model alphabet.
    #[error("unknown symbol {symbol:?} at position {position}")]
    UnknownSymbol { symbol: char, position: usize },

    /// A persisted model record has an inconsistent shape.
    #[error("malformed model: {0}")]
    MalformedModel(String),

    /// The sequence has zero (or underflowed) probability under the model,
    /// so no posterior can be computed.
    #[error("sequence has zero likelihood under the model")]
    ZeroLikelihood,

    /// The generator hit its attempt limit without an acceptable sample.
    #[error("no sample met the quality threshold after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
}

/// Convenience alias used throughout the glyphmm workspace.
pub type Result<T> = std::result::Result<T, GlyphError>;

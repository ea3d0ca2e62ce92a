//! Shared primitives for the glyphmm workspace.
//!
//! `glyphmm-core` provides the foundation the model, I/O and CLI crates build on:
//!
//! - **Error types**: [`GlyphError`] and [`Result`] for structured error handling
//! - **Probability helpers**: categorical sampling and row arithmetic in [`prob`]

pub mod error;
pub mod prob;

pub use error::{GlyphError, Result};

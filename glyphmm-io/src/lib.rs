//! File I/O for the glyphmm workspace.
//!
//! - **Corpus**: word lists, one training sequence per line ([`corpus`])
//! - **Models**: JSON model files ([`model_file`])

pub mod corpus;
pub mod model_file;

pub use corpus::{parse_corpus, read_corpus};
pub use model_file::{load_model, save_model};

//! Loading and saving models as JSON files.

use std::fs;
use std::path::Path;

use glyphmm_core::{GlyphError, Result};
use glyphmm_hmm::HmmModel;

fn with_path(path: &Path, e: std::io::Error) -> GlyphError {
    GlyphError::Io(std::io::Error::new(
        e.kind(),
        format!("{}: {}", path.display(), e),
    ))
}

/// Read a model from a JSON file.
pub fn load_model(path: impl AsRef<Path>) -> Result<HmmModel> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|e| with_path(path, e))?;
    let model = HmmModel::from_json(&json)?;
    tracing::debug!(
        path = %path.display(),
        states = model.n_states(),
        symbols = model.n_symbols(),
        "loaded model"
    );
    Ok(model)
}

/// Write `model` to `path` as indented JSON.
///
/// The file is written next to its destination first and then renamed into
/// place, so an interrupted save never leaves a truncated model behind.
pub fn save_model(path: impl AsRef<Path>, model: &HmmModel) -> Result<()> {
    let path = path.as_ref();
    let mut json = model.to_json_pretty()?;
    json.push('\n');

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, json).map_err(|e| with_path(path, e))?;
    fs::rename(&tmp, path).map_err(|e| with_path(path, e))?;
    tracing::debug!(path = %path.display(), "saved model");
    Ok(())
}

//! Word-list corpus reader.
//!
//! One training sequence per line. Blank lines and lines starting with `#`
//! are skipped, trailing whitespace is trimmed, and the stop symbol is
//! appended to every kept line so the model learns where words end.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glyphmm_core::{GlyphError, Result};

/// Comment marker for corpus lines.
pub const COMMENT: char = '#';

/// Read a corpus file, appending `stop` to every sequence.
pub fn read_corpus(path: impl AsRef<Path>, stop: char) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        GlyphError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let words = parse_corpus(BufReader::new(file), stop).map_err(|e| match e {
        GlyphError::Io(io) => GlyphError::Io(std::io::Error::new(
            io.kind(),
            format!("{}: {}", path.display(), io),
        )),
        other => other,
    })?;
    tracing::debug!(path = %path.display(), words = words.len(), "read corpus");
    Ok(words)
}

/// Parse corpus lines from any buffered reader, appending `stop` to each.
///
/// # Errors
///
/// Returns an I/O error naming the line number if a line cannot be read
/// (including invalid UTF-8).
pub fn parse_corpus<R: BufRead>(reader: R, stop: char) -> Result<Vec<String>> {
    let mut words = Vec::new();
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| {
            GlyphError::Io(std::io::Error::new(
                e.kind(),
                format!("line {}: {}", line_num + 1, e),
            ))
        })?;
        let word = line.trim_end();
        if word.is_empty() || word.starts_with(COMMENT) {
            continue;
        }
        let mut seq = String::with_capacity(word.len() + stop.len_utf8());
        seq.push_str(word);
        seq.push(stop);
        words.push(seq);
    }
    Ok(words)
}

//! Ordered observation alphabet.
//!
//! A symbol's position in the alphabet is its integer code; every emission
//! row and every encoded observation is indexed by that code.

use glyphmm_core::{GlyphError, Result};

/// An ordered set of distinct observable symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from an ordered list of symbols.
    ///
    /// # Errors
    ///
    /// Returns an error if `symbols` is empty or contains a duplicate.
    pub fn new(symbols: Vec<char>) -> Result<Self> {
        if symbols.is_empty() {
            return Err(GlyphError::InvalidInput("alphabet must not be empty".into()));
        }
        for (i, c) in symbols.iter().enumerate() {
            if symbols[..i].contains(c) {
                return Err(GlyphError::InvalidInput(format!(
                    "alphabet contains duplicate symbol {c:?}"
                )));
            }
        }
        Ok(Self { symbols })
    }

    /// Build an alphabet from the chars of a string, in order.
    pub fn from_chars(s: &str) -> Result<Self> {
        Self::new(s.chars().collect())
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed alphabet; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbols in code order.
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Code of `symbol`, if it belongs to the alphabet.
    pub fn index_of(&self, symbol: char) -> Option<usize> {
        self.symbols.iter().position(|&s| s == symbol)
    }

    /// Symbol with code `index`.
    pub fn symbol(&self, index: usize) -> Option<char> {
        self.symbols.get(index).copied()
    }

    /// Whether `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.index_of(symbol).is_some()
    }

    /// Resolve every char of `seq` to its code.
    ///
    /// # Errors
    ///
    /// Returns [`GlyphError::UnknownSymbol`] for the first char that is not in
    /// the alphabet, and an invalid-input error for an empty sequence.
    pub fn encode(&self, seq: &str) -> Result<Vec<usize>> {
        if seq.is_empty() {
            return Err(GlyphError::InvalidInput(
                "observation sequence is empty".into(),
            ));
        }
        seq.chars()
            .enumerate()
            .map(|(position, symbol)| {
                self.index_of(symbol)
                    .ok_or(GlyphError::UnknownSymbol { symbol, position })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_insertion_order() {
        let a = Alphabet::from_chars("ab$").unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(a.index_of('a'), Some(0));
        assert_eq!(a.index_of('$'), Some(2));
        assert_eq!(a.symbol(1), Some('b'));
        assert_eq!(a.symbol(3), None);
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(matches!(
            Alphabet::new(vec![]),
            Err(GlyphError::InvalidInput(_))
        ));
        assert!(matches!(
            Alphabet::from_chars("abca"),
            Err(GlyphError::InvalidInput(_))
        ));
    }

    #[test]
    fn encode_resolves_codes() {
        let a = Alphabet::from_chars("ab$").unwrap();
        assert_eq!(a.encode("bab$").unwrap(), vec![1, 0, 1, 2]);
    }

    #[test]
    fn encode_reports_first_unknown_symbol() {
        let a = Alphabet::from_chars("ab$").unwrap();
        match a.encode("abxz") {
            Err(GlyphError::UnknownSymbol { symbol, position }) => {
                assert_eq!(symbol, 'x');
                assert_eq!(position, 2);
            }
            other => panic!("expected UnknownSymbol, got {other:?}"),
        }
    }

    #[test]
    fn encode_rejects_empty_sequence() {
        let a = Alphabet::from_chars("ab").unwrap();
        assert!(matches!(a.encode(""), Err(GlyphError::InvalidInput(_))));
    }

    #[test]
    fn non_ascii_symbols_are_single_codes() {
        let a = Alphabet::from_chars("äöü$").unwrap();
        assert_eq!(a.encode("öü$").unwrap(), vec![1, 2, 3]);
    }
}

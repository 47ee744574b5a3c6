//! Word frequency vocabulary.
//!
//! This is the training input: each distinct word token mapped to the
//! number of times it occurs in the corpus.

use crate::core::symbol::{initial_symbols, Symbol};
use crate::error::{Result, SubwordError};
use ahash::AHashMap;
use compact_str::CompactString;
use log::debug;
use std::collections::BTreeSet;

/// Mapping from word token to corpus frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    /// Token -> frequency
    words: AHashMap<CompactString, u64>,
}

impl Vocabulary {
    /// Create a new empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new vocabulary with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            words: AHashMap::with_capacity(capacity),
        }
    }

    /// Add `count` occurrences of a token.
    ///
    /// Returns the token's new frequency. A frequency that would overflow
    /// `u64` is rejected and leaves the entry unchanged.
    pub fn add_word(&mut self, token: &str, count: u64) -> Result<u64> {
        if token.is_empty() {
            return Err(SubwordError::Configuration(
                "Vocabulary tokens must not be empty".to_string(),
            ));
        }
        if count == 0 {
            return Err(SubwordError::Configuration(format!(
                "Frequency of '{}' must be positive",
                token
            )));
        }

        let frequency = self.words.entry(CompactString::new(token)).or_insert(0);
        *frequency = frequency.checked_add(count).ok_or_else(|| {
            SubwordError::Configuration(format!("Frequency of '{}' overflows u64", token))
        })?;
        Ok(*frequency)
    }

    /// Get the frequency of a token, 0 if absent.
    #[inline]
    pub fn frequency(&self, token: &str) -> u64 {
        self.words.get(token).copied().unwrap_or(0)
    }

    /// Check if a token is present.
    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains_key(token)
    }

    /// Number of distinct tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Total number of token occurrences, saturating at `u64::MAX`.
    pub fn total_occurrences(&self) -> u64 {
        self.words
            .values()
            .fold(0u64, |total, &frequency| total.saturating_add(frequency))
    }

    /// Iterate over (token, frequency) in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.words.iter().map(|(token, &frequency)| (token.as_str(), frequency))
    }

    /// Entries sorted by descending frequency, then ascending token.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The initial symbol alphabet: every grapheme of every token plus the
    /// boundary marker.
    pub fn alphabet(&self) -> BTreeSet<Symbol> {
        self.words
            .keys()
            .flat_map(|token| initial_symbols(token))
            .collect()
    }

    /// Merge another vocabulary into this one.
    pub fn extend(&mut self, other: &Vocabulary) -> Result<()> {
        for (token, frequency) in other.iter() {
            self.add_word(token, frequency)?;
        }
        Ok(())
    }
}

impl<'a> FromIterator<(&'a str, u64)> for Vocabulary {
    /// Collect (token, count) pairs, skipping entries `add_word` rejects.
    fn from_iter<I: IntoIterator<Item = (&'a str, u64)>>(iter: I) -> Self {
        let mut vocab = Self::new();
        for (token, count) in iter {
            if let Err(err) = vocab.add_word(token, count) {
                debug!("skipping vocabulary entry '{}': {}", token, err);
            }
        }
        vocab
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::symbol::BOUNDARY;

    fn sample() -> Vocabulary {
        [("LOW", 5), ("LOWER", 2), ("NEWEST", 6), ("WIDEST", 3)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_add_word() {
        let mut vocab = Vocabulary::new();
        assert_eq!(vocab.add_word("HELLO", 1).unwrap(), 1);
        assert_eq!(vocab.add_word("HELLO", 2).unwrap(), 3);
        assert_eq!(vocab.add_word("WORLD", 1).unwrap(), 1);

        assert_eq!(vocab.frequency("HELLO"), 3);
        assert_eq!(vocab.frequency("MISSING"), 0);
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.total_occurrences(), 4);
    }

    #[test]
    fn test_rejects_empty_and_zero() {
        let mut vocab = Vocabulary::new();
        assert!(matches!(
            vocab.add_word("", 1),
            Err(SubwordError::Configuration(_))
        ));
        assert!(matches!(
            vocab.add_word("A", 0),
            Err(SubwordError::Configuration(_))
        ));
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_sorted() {
        let vocab = sample();
        let sorted = vocab.sorted();
        assert_eq!(
            sorted,
            vec![("NEWEST", 6), ("LOW", 5), ("WIDEST", 3), ("LOWER", 2)]
        );
    }

    #[test]
    fn test_sorted_ties_by_token() {
        let vocab: Vocabulary = [("B", 1), ("A", 1), ("C", 2)].into_iter().collect();
        assert_eq!(vocab.sorted(), vec![("C", 2), ("A", 1), ("B", 1)]);
    }

    #[test]
    fn test_alphabet() {
        let vocab = sample();
        let alphabet = vocab.alphabet();
        // L O W E R N S T I D plus the boundary marker
        assert_eq!(alphabet.len(), 11);
        assert!(alphabet.contains(BOUNDARY));
    }

    #[test]
    fn test_extend() {
        let mut a: Vocabulary = [("A", 1)].into_iter().collect();
        let b: Vocabulary = [("A", 2), ("B", 1)].into_iter().collect();
        a.extend(&b).unwrap();
        assert_eq!(a.frequency("A"), 3);
        assert_eq!(a.frequency("B"), 1);

        let full: Vocabulary = [("A", u64::MAX)].into_iter().collect();
        assert!(matches!(
            a.extend(&full),
            Err(SubwordError::Configuration(_))
        ));
    }

    #[test]
    fn test_frequency_overflow_rejected() {
        let mut vocab = Vocabulary::new();
        vocab.add_word("LOW", u64::MAX).unwrap();

        let err = vocab.add_word("LOW", 1).unwrap_err();
        assert!(matches!(err, SubwordError::Configuration(_)));
        assert_eq!(vocab.frequency("LOW"), u64::MAX);
    }

    #[test]
    fn test_total_occurrences_saturates() {
        let vocab: Vocabulary = [("A", u64::MAX), ("B", 5)].into_iter().collect();
        assert_eq!(vocab.total_occurrences(), u64::MAX);
    }

    #[test]
    fn test_from_iter_skips_rejected_entries() {
        let vocab: Vocabulary = [("A", 0), ("", 3), ("B", u64::MAX), ("B", 1), ("C", 2)]
            .into_iter()
            .collect();
        assert_eq!(vocab.len(), 2);
        assert!(!vocab.contains("A"));
        assert_eq!(vocab.frequency("B"), u64::MAX);
        assert_eq!(vocab.frequency("C"), 2);
    }
}

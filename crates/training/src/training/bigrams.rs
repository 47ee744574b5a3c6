//! Bigram index for BPE training.
//!
//! For every adjacent symbol pair currently present in some word, the
//! index keeps the pair's weighted corpus frequency and which words contain
//! it. After the initial scan it is only ever updated through occurrence
//! deltas, never recounted.

use super::words::{Word, WordId, WordTable};
use ahash::AHashMap;
use log::trace;
use subword_core::Pair;

/// Statistics for one adjacent symbol pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bigram {
    /// Sum over containing words of word frequency times occurrences
    pub frequency: u64,
    /// Containing words and the number of occurrences in each
    pub words: AHashMap<WordId, u32>,
}

impl Bigram {
    fn new() -> Self {
        Self {
            frequency: 0,
            words: AHashMap::new(),
        }
    }
}

/// Incrementally maintained pair statistics over a [`WordTable`].
#[derive(Debug, Clone, Default)]
pub struct BigramIndex {
    bigrams: AHashMap<Pair, Bigram>,
    /// Sum of all bigram frequencies
    total: u64,
}

impl BigramIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index with one scan over every word.
    pub fn from_words(words: &WordTable) -> Self {
        let mut index = Self::new();
        for word in words.iter() {
            for pair in word.pairs() {
                index.add_occurrence(&pair, word, 1);
            }
        }
        index
    }

    /// Record `count` more occurrences of `pair` in `word`.
    pub fn add_occurrence(&mut self, pair: &Pair, word: &Word, count: u32) {
        if count == 0 {
            return;
        }
        let weight = word.frequency * u64::from(count);
        let bigram = self
            .bigrams
            .entry(pair.clone())
            .or_insert_with(Bigram::new);

        bigram.frequency += weight;
        *bigram.words.entry(word.id).or_insert(0) += count;
        self.total += weight;

        trace!("+{} ({} {}) in '{}'", weight, pair.0, pair.1, word.token);
    }

    /// Record `count` fewer occurrences of `pair` in `word`.
    ///
    /// Drops the word from the pair's containing set when its contribution
    /// reaches zero, and drops the pair when its frequency reaches zero.
    /// Returns the pair's remaining frequency.
    pub fn remove_occurrence(&mut self, pair: &Pair, word: &Word, count: u32) -> u64 {
        let Some(bigram) = self.bigrams.get_mut(pair) else {
            debug_assert!(false, "removing absent pair ({} {})", pair.0, pair.1);
            return 0;
        };

        let held = bigram.words.get(&word.id).copied().unwrap_or(0);
        debug_assert!(
            held >= count,
            "word '{}' holds {} of ({} {}), removing {}",
            word.token,
            held,
            pair.0,
            pair.1,
            count
        );
        let count = count.min(held);
        if count == held {
            bigram.words.remove(&word.id);
        } else {
            bigram.words.insert(word.id, held - count);
        }

        let weight = (word.frequency * u64::from(count)).min(bigram.frequency);
        bigram.frequency -= weight;
        self.total -= weight;

        trace!("-{} ({} {}) in '{}'", weight, pair.0, pair.1, word.token);

        let remaining = bigram.frequency;
        if remaining == 0 {
            self.bigrams.remove(pair);
        }
        remaining
    }

    /// Frequency of a pair, 0 if absent.
    #[inline]
    pub fn frequency_of(&self, pair: &Pair) -> u64 {
        self.bigrams.get(pair).map_or(0, |b| b.frequency)
    }

    /// Ids of the words currently containing a pair, in ascending order.
    pub fn words_containing(&self, pair: &Pair) -> Vec<WordId> {
        let mut ids: Vec<WordId> = self
            .bigrams
            .get(pair)
            .map(|b| b.words.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    /// Get the full statistics for a pair.
    #[inline]
    pub fn get(&self, pair: &Pair) -> Option<&Bigram> {
        self.bigrams.get(pair)
    }

    /// Remove a pair outright, returning its statistics if it was present.
    pub fn remove(&mut self, pair: &Pair) -> Option<Bigram> {
        let bigram = self.bigrams.remove(pair)?;
        self.total -= bigram.frequency;
        Some(bigram)
    }

    /// Iterate over (pair, frequency) in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pair, u64)> + '_ {
        self.bigrams.iter().map(|(pair, b)| (pair, b.frequency))
    }

    /// Highest frequency of any pair, 0 if the index is empty.
    pub fn max_frequency(&self) -> u64 {
        self.bigrams.values().map(|b| b.frequency).max().unwrap_or(0)
    }

    /// Sum of all pair frequencies.
    #[inline]
    pub fn total_frequency(&self) -> u64 {
        self.total
    }

    /// Number of distinct pairs.
    #[inline]
    pub fn len(&self) -> usize {
        self.bigrams.len()
    }

    /// Check if no pairs remain.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bigrams.is_empty()
    }

    /// Pair frequencies as a plain map, for comparison with a recount.
    pub fn frequencies(&self) -> AHashMap<Pair, u64> {
        self.bigrams
            .iter()
            .map(|(pair, b)| (pair.clone(), b.frequency))
            .collect()
    }
}

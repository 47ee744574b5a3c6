//! Word table for BPE training.
//!
//! Every distinct word of the vocabulary is stored once, together with its
//! corpus frequency and its current segmentation. The table is the sole
//! owner of word entries; everything else refers to words by [`WordId`].

use ahash::AHashMap;
use std::collections::BTreeSet;
use subword_core::{
    initial_symbols, merge_symbols, Pair, Result, SubwordError, Symbol, Vocabulary, BOUNDARY,
};

/// Index of a word in a [`WordTable`].
pub type WordId = usize;

/// A distinct corpus word and its current segmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Position in the owning table
    pub id: WordId,
    /// The original token
    pub token: Symbol,
    /// Number of occurrences in the corpus
    pub frequency: u64,
    /// Current segmentation, always ending with the boundary marker
    pub symbols: Vec<Symbol>,
}

impl Word {
    /// Iterate over the adjacent pairs of the current segmentation.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.symbols
            .windows(2)
            .map(|window| (window[0].clone(), window[1].clone()))
    }

    /// Find the first occurrence of `pair` at or after `from`.
    pub fn find(&self, pair: &Pair, from: usize) -> Option<usize> {
        let (left, right) = pair;
        (from..self.symbols.len().saturating_sub(1))
            .find(|&i| self.symbols[i] == *left && self.symbols[i + 1] == *right)
    }

    /// The current segmentation as space-separated subwords.
    pub fn segmentation(&self) -> String {
        let parts: Vec<&str> = self.symbols.iter().map(|s| s.as_str()).collect();
        parts.join(" ")
    }
}

/// Pairs created and destroyed by a single rewrite.
///
/// `removed` holds the consumed pair plus up to two pairs that straddled
/// its edges; `added` holds up to two pairs around the new symbol. The two
/// lists never share a pair, since every added pair contains the new symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairDelta {
    /// Pairs that now occur once more in the word
    pub added: Vec<Pair>,
    /// Pairs that now occur once less in the word
    pub removed: Vec<Pair>,
}

impl PairDelta {
    /// Check if the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The set of training words.
#[derive(Debug, Clone)]
pub struct WordTable {
    /// Words, indexed by id
    words: Vec<Word>,
    /// Token -> id
    lookup: AHashMap<Symbol, WordId>,
    /// Distinct initial symbols, boundary marker included
    alphabet: BTreeSet<Symbol>,
}

impl WordTable {
    /// Build the table from a vocabulary.
    ///
    /// Words get ids in ascending token order so repeated runs see the
    /// same layout. The frequency-weighted pair total must fit in `u64`,
    /// which bounds every pair count the trainer keeps.
    pub fn from_vocabulary(vocab: &Vocabulary) -> Result<Self> {
        if vocab.is_empty() {
            return Err(SubwordError::Configuration(
                "Cannot train on an empty vocabulary".to_string(),
            ));
        }

        let mut entries: Vec<(&str, u64)> = vocab.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut words = Vec::with_capacity(entries.len());
        let mut lookup = AHashMap::with_capacity(entries.len());
        let mut alphabet = BTreeSet::new();
        let mut pair_total: u64 = 0;

        for (id, (token, frequency)) in entries.into_iter().enumerate() {
            if token.contains(BOUNDARY) {
                return Err(SubwordError::Configuration(format!(
                    "Token '{}' contains the boundary marker '{}'",
                    token, BOUNDARY
                )));
            }
            if token.chars().any(char::is_whitespace) {
                return Err(SubwordError::Configuration(format!(
                    "Token '{}' contains whitespace",
                    token
                )));
            }

            let symbols = initial_symbols(token);
            pair_total = (symbols.len() as u64 - 1)
                .checked_mul(frequency)
                .and_then(|weight| pair_total.checked_add(weight))
                .ok_or_else(|| {
                    SubwordError::Configuration(format!(
                        "Pair counts overflow u64 at token '{}' (frequency {})",
                        token, frequency
                    ))
                })?;
            alphabet.extend(symbols.iter().cloned());
            lookup.insert(Symbol::new(token), id);
            words.push(Word {
                id,
                token: Symbol::new(token),
                frequency,
                symbols,
            });
        }

        Ok(Self {
            words,
            lookup,
            alphabet,
        })
    }

    /// Merge the two symbols at `position` and `position + 1` of a word.
    ///
    /// Returns the pairs created and destroyed by the splice, or `None` if
    /// `position` does not address two adjacent symbols.
    pub fn rewrite(&mut self, word: WordId, position: usize) -> Option<PairDelta> {
        let symbols = &mut self.words.get_mut(word)?.symbols;
        if position + 1 >= symbols.len() {
            return None;
        }

        let left = symbols[position].clone();
        let right = symbols[position + 1].clone();
        let merged = merge_symbols(&left, &right);

        let mut delta = PairDelta::default();

        if position > 0 {
            let prev = symbols[position - 1].clone();
            delta.removed.push((prev.clone(), left.clone()));
            delta.added.push((prev, merged.clone()));
        }
        if position + 2 < symbols.len() {
            let next = symbols[position + 2].clone();
            delta.removed.push((right.clone(), next.clone()));
            delta.added.push((merged.clone(), next));
        }
        delta.removed.push((left, right));

        symbols[position] = merged;
        symbols.remove(position + 1);

        Some(delta)
    }

    /// Get a word by id.
    #[inline]
    pub fn get(&self, word: WordId) -> Option<&Word> {
        self.words.get(word)
    }

    /// Look up a word by its token.
    pub fn find(&self, token: &str) -> Option<&Word> {
        self.lookup.get(token).map(|&id| &self.words[id])
    }

    /// Iterate over all words in id order.
    pub fn iter(&self) -> std::slice::Iter<'_, Word> {
        self.words.iter()
    }

    /// Number of distinct words.
    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Check if the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The initial symbol alphabet.
    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    /// Total number of token occurrences.
    pub fn total_occurrences(&self) -> u64 {
        self.words.iter().map(|w| w.frequency).sum()
    }

    /// Count every adjacent pair from scratch, weighted by word frequency.
    ///
    /// This is the brute-force reference for the incremental index.
    pub fn count_pairs(&self) -> AHashMap<Pair, u64> {
        let mut counts: AHashMap<Pair, u64> = AHashMap::new();
        for word in &self.words {
            for pair in word.pairs() {
                *counts.entry(pair).or_insert(0) += word.frequency;
            }
        }
        counts
    }
}

//! Replaying a trained model on individual words.
//!
//! Encoding a word applies every operation in training order wherever its
//! pair is adjacent, left to right and without overlap. Rather than walk the
//! whole operation list for every word, the encoder repeatedly applies the
//! lowest-ranked operation present in the word whose rank is above the last
//! one applied. A merge only ever creates pairs involving the new symbol, so
//! this visits operations in exactly the order a literal replay would.

use crate::core::merges::BpeModel;
use crate::core::symbol::{initial_symbols, merge_symbols, Symbol};
use std::sync::Arc;

/// Word-level subword encoder.
#[derive(Debug, Clone)]
pub struct SubwordEncoder {
    /// The model whose operations are replayed
    model: Arc<BpeModel>,
}

impl SubwordEncoder {
    /// Create a new encoder for a model.
    pub fn new(model: Arc<BpeModel>) -> Self {
        Self { model }
    }

    /// The model this encoder replays.
    pub fn model(&self) -> &BpeModel {
        &self.model
    }

    /// Segment a single word token into subwords.
    ///
    /// The result always ends with a symbol carrying the boundary marker.
    pub fn encode_word(&self, token: &str) -> Vec<Symbol> {
        let mut symbols = initial_symbols(token);
        self.apply(&mut symbols);
        symbols
    }

    /// Apply the model's operations to an existing symbol sequence.
    pub fn apply(&self, symbols: &mut Vec<Symbol>) {
        if self.model.is_empty() {
            return;
        }

        let mut last_rank: Option<usize> = None;

        while let Some((rank, first)) = self.next_operation(symbols, last_rank) {
            let (left, right) = {
                let pair = &self.model.operations()[rank];
                (pair.left.clone(), pair.right.clone())
            };
            let merged = merge_symbols(&left, &right);

            let mut i = first;
            while i + 1 < symbols.len() {
                if symbols[i] == left && symbols[i + 1] == right {
                    symbols[i] = merged.clone();
                    symbols.remove(i + 1);
                }
                i += 1;
            }

            last_rank = Some(rank);
        }
    }

    /// Segment a sequence of word tokens, concatenating their subwords.
    pub fn encode_words<'t>(&self, tokens: impl IntoIterator<Item = &'t str>) -> Vec<Symbol> {
        tokens
            .into_iter()
            .flat_map(|token| self.encode_word(token))
            .collect()
    }

    /// Find the lowest-ranked applicable operation after `last_rank`,
    /// returning its rank and the first position it matches.
    fn next_operation(
        &self,
        symbols: &[Symbol],
        last_rank: Option<usize>,
    ) -> Option<(usize, usize)> {
        symbols
            .windows(2)
            .enumerate()
            .filter_map(|(i, window)| {
                self.model
                    .rank(&window[0], &window[1])
                    .filter(|&rank| last_rank.map_or(true, |last| rank > last))
                    .map(|rank| (rank, i))
            })
            .min()
    }
}

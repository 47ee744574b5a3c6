//! Pre-tokenization pipeline.
//!
//! Raw text is normalized and then split into word tokens, which are what
//! vocabularies count and what the encoder segments.

pub mod normalize;
pub mod split;

pub use normalize::{NormalizationForm, Normalizer, DEFAULT_STRIP_PATTERN};
pub use split::{SplitPattern, Splitter};

use subword_core::{Result, Vocabulary};

/// Normalizer and splitter applied together.
#[derive(Debug, Clone, Default)]
pub struct PreTokenizer {
    normalizer: Normalizer,
    splitter: Splitter,
}

impl PreTokenizer {
    /// Create a pre-tokenizer from its two stages.
    pub fn new(normalizer: Normalizer, splitter: Splitter) -> Self {
        Self {
            normalizer,
            splitter,
        }
    }

    /// The normalization stage.
    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// The splitting stage.
    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    /// Normalize text and split it into word tokens.
    pub fn words(&self, text: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(text);
        self.splitter
            .split(&normalized)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Count every word of `text` into a vocabulary.
    ///
    /// Returns the number of word occurrences added.
    pub fn count_into(&self, text: &str, vocab: &mut Vocabulary) -> Result<usize> {
        let normalized = self.normalizer.normalize(text);
        let words = self.splitter.split(&normalized);
        for word in &words {
            vocab.add_word(word, 1)?;
        }
        Ok(words.len())
    }
}

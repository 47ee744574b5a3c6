//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties the
//! pre-tokenizer, the trained model and the encoder/decoder together.

use crate::io::{ModelFormat, ModelLoader, ModelSaver};
use crate::pre_tokenizer::{
    NormalizationForm, Normalizer, PreTokenizer, Splitter, DEFAULT_STRIP_PATTERN,
};
use crate::utils::{EncodingCache, DEFAULT_CACHE_CAPACITY};
use log::{debug, info};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use subword_core::{
    BpeModel, Result, SubwordDecoder, SubwordEncoder, SubwordError, Symbol, Vocabulary,
};
use subword_training::{BpeTrainer, TrainingConfig, TrainingStats, TrainingTarget};

/// Configuration for building a tokenizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Training parameters
    pub training: TrainingConfig,
    /// Unicode normalization form
    pub normalization: NormalizationForm,
    /// Fold text to upper case
    pub uppercase: bool,
    /// Characters replaced by a space before splitting, `None` to keep all
    pub strip_pattern: Option<String>,
    /// Extra word separator besides whitespace
    pub split_pattern: Option<String>,
    /// Capacity for the per-stream encoding cache
    pub cache_capacity: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            training: TrainingConfig::default(),
            normalization: NormalizationForm::NFC,
            uppercase: true,
            strip_pattern: Some(DEFAULT_STRIP_PATTERN.to_string()),
            split_pattern: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl TokenizerConfig {
    /// Build the pre-tokenizer this configuration describes.
    pub fn pre_tokenizer(&self) -> Result<PreTokenizer> {
        let mut normalizer = Normalizer::new(self.normalization).with_uppercase(self.uppercase);
        if let Some(pattern) = &self.strip_pattern {
            normalizer = normalizer.with_strip_pattern(pattern)?;
        }
        let splitter = match &self.split_pattern {
            Some(pattern) => Splitter::regex(pattern)?,
            None => Splitter::whitespace(),
        };
        Ok(PreTokenizer::new(normalizer, splitter))
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    config: TokenizerConfig,
    model: Option<BpeModel>,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Train up to `n` distinct subwords.
    pub fn max_subwords(mut self, n: usize) -> Self {
        self.config.training.target = TrainingTarget::Subwords(n);
        self
    }

    /// Train exactly `n` merge operations.
    pub fn operations(mut self, n: usize) -> Self {
        self.config.training.target = TrainingTarget::Operations(n);
        self
    }

    /// Set the minimum frequency for merges.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.training.min_frequency = freq;
        self
    }

    /// Set the search set target size.
    pub fn search_set_size(mut self, size: usize) -> Self {
        self.config.training.search_set_size = size;
        self
    }

    /// Set the Unicode normalization form.
    pub fn normalization(mut self, form: NormalizationForm) -> Self {
        self.config.normalization = form;
        self
    }

    /// Enable or disable upper-case folding.
    pub fn uppercase(mut self, uppercase: bool) -> Self {
        self.config.uppercase = uppercase;
        self
    }

    /// Set the pattern of characters replaced by a space, or `None`.
    pub fn strip_pattern(mut self, pattern: Option<&str>) -> Self {
        self.config.strip_pattern = pattern.map(str::to_string);
        self
    }

    /// Split words on a regex in addition to whitespace.
    pub fn split_pattern(mut self, pattern: &str) -> Self {
        self.config.split_pattern = Some(pattern.to_string());
        self
    }

    /// Set the encoding cache capacity.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.config.cache_capacity = capacity;
        self
    }

    /// Start from an already trained model.
    pub fn model(mut self, model: BpeModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Build the tokenizer.
    pub fn build(self) -> Result<Tokenizer> {
        let tokenizer = Tokenizer::new(self.config)?;
        Ok(match self.model {
            Some(model) => tokenizer.with_model(model),
            None => tokenizer,
        })
    }
}

/// Main tokenizer struct.
///
/// Holds one model; training replaces it.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    /// Configuration
    config: TokenizerConfig,
    /// Normalizer and splitter
    pre_tokenizer: PreTokenizer,
    /// Learned operations, shared with encoder and decoder
    model: Arc<BpeModel>,
    encoder: SubwordEncoder,
    decoder: SubwordDecoder,
}

impl Tokenizer {
    /// Create an untrained tokenizer with the given configuration.
    pub fn new(config: TokenizerConfig) -> Result<Self> {
        config.training.validate()?;
        let pre_tokenizer = config.pre_tokenizer()?;
        let model = Arc::new(BpeModel::new());

        Ok(Self {
            config,
            pre_tokenizer,
            encoder: SubwordEncoder::new(model.clone()),
            decoder: SubwordDecoder::new(model.clone()),
            model,
        })
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Replace the model.
    pub fn with_model(mut self, model: BpeModel) -> Self {
        self.set_model(model);
        self
    }

    fn set_model(&mut self, model: BpeModel) {
        let model = Arc::new(model);
        self.encoder = SubwordEncoder::new(model.clone());
        self.decoder = SubwordDecoder::new(model.clone());
        self.model = model;
    }

    /// The current model.
    pub fn model(&self) -> &BpeModel {
        &self.model
    }

    /// The configuration.
    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// The pre-tokenizer.
    pub fn pre_tokenizer(&self) -> &PreTokenizer {
        &self.pre_tokenizer
    }

    /// Count the words of a text into a new vocabulary.
    pub fn vocabulary_from_text(&self, text: &str) -> Result<Vocabulary> {
        let mut vocab = Vocabulary::new();
        self.pre_tokenizer.count_into(text, &mut vocab)?;
        Ok(vocab)
    }

    /// Count the words of every line of a reader into a new vocabulary.
    pub fn vocabulary_from_reader(&self, reader: impl BufRead) -> Result<Vocabulary> {
        let mut vocab = Vocabulary::new();
        for line in reader.lines() {
            let line = line.map_err(|e| SubwordError::io("<text>", e))?;
            self.pre_tokenizer.count_into(&line, &mut vocab)?;
        }
        Ok(vocab)
    }

    /// Train on a vocabulary, replacing the current model.
    pub fn train(&mut self, vocab: &Vocabulary) -> Result<TrainingStats> {
        let trainer = BpeTrainer::new(self.config.training.clone());
        let output = trainer.train(vocab)?;
        self.set_model(output.model);
        Ok(output.stats)
    }

    /// Train on raw text, replacing the current model.
    pub fn train_from_text(&mut self, text: &str) -> Result<TrainingStats> {
        let vocab = self.vocabulary_from_text(text)?;
        self.train(&vocab)
    }

    /// Segment a single, already normalized word.
    pub fn encode_word(&self, word: &str) -> Vec<Symbol> {
        self.encoder.encode_word(word)
    }

    /// Encode text into subwords.
    pub fn encode(&self, text: &str) -> Encoding {
        let words = self.pre_tokenizer.words(text);
        let subwords = self.encoder.encode_words(words.iter().map(String::as_str));
        Encoding {
            subwords,
            words: words.len(),
        }
    }

    /// Encode text, serving repeated words from a cache.
    pub fn encode_with_cache(&self, text: &str, cache: &mut EncodingCache) -> Encoding {
        let words = self.pre_tokenizer.words(text);
        let mut subwords = Vec::new();
        for word in &words {
            subwords.extend(cache.get_or_encode(word, |w| self.encoder.encode_word(w)));
        }
        Encoding {
            subwords,
            words: words.len(),
        }
    }

    /// Encode a batch of texts (parallelized).
    pub fn encode_batch(&self, texts: &[String]) -> Vec<Encoding> {
        use rayon::prelude::*;

        texts.par_iter().map(|text| self.encode(text)).collect()
    }

    /// Encode a text stream line by line.
    ///
    /// Every input line produces one output line of space-separated
    /// subwords. Returns the number of lines written.
    pub fn encode_lines(&self, reader: impl BufRead, writer: &mut impl Write) -> Result<usize> {
        let mut cache = EncodingCache::with_capacity(self.config.cache_capacity);
        let mut lines = 0;

        for line in reader.lines() {
            let line = line.map_err(|e| SubwordError::io("<text>", e))?;
            let encoding = self.encode_with_cache(&line, &mut cache);
            writeln!(writer, "{}", encoding).map_err(|e| SubwordError::io("<subwords>", e))?;
            lines += 1;
        }

        let stats = cache.stats();
        debug!(
            "encoded {} lines, {} cache hits, {} misses",
            lines, stats.hits, stats.misses
        );
        Ok(lines)
    }

    /// Decode a space-separated subword string back to text.
    ///
    /// Every subword must be a single character or a symbol this
    /// tokenizer's model created.
    pub fn decode(&self, subwords: &str) -> Result<String> {
        self.decoder.decode(subwords)
    }

    /// Decode a subword stream line by line against this tokenizer's model.
    pub fn decode_lines(&self, reader: impl BufRead, writer: &mut impl Write) -> Result<usize> {
        decode_lines(&self.decoder, reader, writer)
    }

    /// Save the model.
    pub fn save(&self, path: &Path, format: ModelFormat) -> Result<()> {
        ModelSaver::new(&self.model, format).save(path)
    }

    /// Load a model with the default configuration.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_config(path, TokenizerConfig::default())
    }

    /// Load a model, picking the format from the file extension.
    pub fn load_with_config(path: &Path, config: TokenizerConfig) -> Result<Self> {
        let model = ModelLoader::load(path)?;
        info!("Tokenizer ready with {} operations", model.len());
        Ok(Self::new(config)?.with_model(model))
    }
}

/// Decode a subword stream line by line.
///
/// Every input line produces one output line. Returns the number of lines
/// written.
pub fn decode_lines(
    decoder: &SubwordDecoder,
    reader: impl BufRead,
    writer: &mut impl Write,
) -> Result<usize> {
    let mut lines = 0;
    for line in reader.lines() {
        let line = line.map_err(|e| SubwordError::io("<subwords>", e))?;
        let text = decoder.decode(&line)?;
        writeln!(writer, "{}", text).map_err(|e| SubwordError::io("<text>", e))?;
        lines += 1;
    }
    Ok(lines)
}

/// Result of encoding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Subwords in order; each word's last subword ends with the boundary marker
    pub subwords: Vec<Symbol>,
    /// Number of words encoded
    pub words: usize,
}

impl Encoding {
    /// Get the number of subwords.
    pub fn len(&self) -> usize {
        self.subwords.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.subwords.is_empty()
    }

    /// Get the subwords as string slices.
    pub fn tokens(&self) -> Vec<&str> {
        self.subwords.iter().map(|s| s.as_str()).collect()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().join(" "))
    }
}

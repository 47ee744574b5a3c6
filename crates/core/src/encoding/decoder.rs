//! Reassembling text from subwords.

use crate::core::merges::BpeModel;
use crate::core::symbol::{is_atomic, BOUNDARY};
use crate::error::{Result, SubwordError};
use std::sync::Arc;

/// Subword decoder.
///
/// With a model, every merged subword is expanded into the two symbols it
/// was created from, recursively, down to single graphemes; a merged
/// subword the model never created is an error. Without a model, subwords
/// are trusted and simply concatenated.
#[derive(Debug, Clone, Default)]
pub struct SubwordDecoder {
    model: Option<Arc<BpeModel>>,
}

impl SubwordDecoder {
    /// Create a decoder that validates subwords against a model.
    pub fn new(model: Arc<BpeModel>) -> Self {
        Self { model: Some(model) }
    }

    /// Create a decoder that concatenates subwords without validation.
    pub fn unchecked() -> Self {
        Self { model: None }
    }

    /// Check whether this decoder validates against a model.
    pub fn is_strict(&self) -> bool {
        self.model.is_some()
    }

    /// Expand one subword into its atomic symbols, appending them to `out`.
    pub fn expand(&self, subword: &str, out: &mut Vec<String>) -> Result<()> {
        let model = match &self.model {
            Some(model) => model,
            None => {
                out.push(subword.to_string());
                return Ok(());
            }
        };

        // Explicit stack: merge chains can be as deep as the model is long.
        let mut stack = vec![subword];
        while let Some(symbol) = stack.pop() {
            if is_atomic(symbol) {
                out.push(symbol.to_string());
                continue;
            }
            let (left, right) = model
                .constituents(symbol)
                .ok_or_else(|| SubwordError::UnknownSymbol(symbol.to_string()))?;
            stack.push(right.as_str());
            stack.push(left.as_str());
        }

        Ok(())
    }

    /// Decode a whitespace-separated subword string into text.
    ///
    /// Boundary markers become word breaks; words are joined by single
    /// spaces and the result carries no leading or trailing whitespace.
    pub fn decode(&self, subwords: &str) -> Result<String> {
        let words = self.decode_words(subwords.split_whitespace())?;
        Ok(words.join(" "))
    }

    /// Decode a sequence of subwords into the words they spell.
    pub fn decode_words<'s>(
        &self,
        subwords: impl IntoIterator<Item = &'s str>,
    ) -> Result<Vec<String>> {
        let mut pieces = Vec::new();
        for subword in subwords {
            self.expand(subword, &mut pieces)?;
        }

        let mut words = Vec::new();
        let mut current = String::new();
        for piece in &pieces {
            let mut parts = piece.split(BOUNDARY);
            if let Some(first) = parts.next() {
                current.push_str(first);
            }
            for part in parts {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                current.push_str(part);
            }
        }
        if !current.is_empty() {
            words.push(current);
        }

        Ok(words)
    }
}

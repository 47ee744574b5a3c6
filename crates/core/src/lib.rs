//! Subword-core - shared types for byte-pair-encoding subword models
//!
//! This crate provides the data model used by both the trainer and the
//! tokenizer: symbols and symbol pairs, the ordered list of merge
//! operations that makes up a trained model, the word-frequency vocabulary
//! used as training input, and the replay of a model on new text.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use subword_core::{BpeModel, Operation, SubwordDecoder, SubwordEncoder};
//!
//! let (model, _) = BpeModel::from_operations(vec![
//!     Operation::new("E", "S"),
//!     Operation::new("ES", "T"),
//! ]);
//! let model = Arc::new(model);
//!
//! let subwords = SubwordEncoder::new(model.clone()).encode_word("BEST");
//! assert_eq!(subwords, vec!["B", "EST", "_"]);
//!
//! let text = SubwordDecoder::new(model).decode("B EST _")?;
//! assert_eq!(text, "BEST");
//! # Ok::<(), subword_core::SubwordError>(())
//! ```

pub mod error;
pub use error::{Result, SubwordError};

// Core data model
pub mod core;
pub use core::{
    initial_symbols, merge_symbols, BpeModel, MergeCandidate, Operation, Pair, PairPriorityQueue,
    Symbol, Vocabulary, BOUNDARY,
};

// Model replay
pub mod encoding;
pub use encoding::{SubwordDecoder, SubwordEncoder};

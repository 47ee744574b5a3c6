//! Subword-training - incremental BPE training
//!
//! This crate learns BPE merge operations from a word-frequency
//! vocabulary. Pair frequencies are counted once; after that every merge
//! updates them through local deltas.
//!
//! # Features
//!
//! - Word table with per-word segmentations and splice deltas
//! - Bigram index with weighted frequencies and containing words
//! - Threshold-bounded search set with adaptive threshold lowering
//! - Step-wise merge engine with explicit stop reasons
//!
//! # Example
//!
//! ```rust
//! use subword_core::Vocabulary;
//! use subword_training::{BpeTrainer, TrainingConfig};
//!
//! let vocab: Vocabulary = [("LOW", 5), ("LOWER", 2), ("NEWEST", 6), ("WIDEST", 3)]
//!     .into_iter()
//!     .collect();
//!
//! let config = TrainingConfig::builder().operations(3).build()?;
//! let output = BpeTrainer::new(config).train(&vocab)?;
//!
//! let learned: Vec<String> = output.model.iter().map(|op| op.to_string()).collect();
//! assert_eq!(learned, ["E S", "ES T", "EST _"]);
//! # Ok::<(), subword_core::SubwordError>(())
//! ```

pub use subword_core::{Result, SubwordError};

pub mod training;
pub use training::{
    BigramIndex, BpeTrainer, MergeEngine, SearchSet, StopReason, TrainingConfig,
    TrainingConfigBuilder, TrainingOutput, TrainingState, TrainingStats, TrainingTarget,
    WordTable, DEFAULT_MAX_SUBWORDS, DEFAULT_SEARCH_SET_SIZE,
};

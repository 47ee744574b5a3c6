//! Subword-tokenizer - high-level subword tokenizer API
//!
//! This crate wraps training and model replay behind a single
//! [`Tokenizer`] type and adds what is needed around them: text
//! normalization and splitting, model and vocabulary files, and a cache
//! for repeated words.
//!
//! # Features
//!
//! - Builder for tokenizer configuration
//! - Pre-tokenization pipeline (Unicode normalization, case folding,
//!   character stripping, splitting)
//! - Model files in plain text or JSON, vocabulary files in plain text
//! - Line-oriented stream encoding and decoding
//! - Parallel batch encoding
//!
//! # Example
//!
//! ```rust
//! use subword_tokenizer::Tokenizer;
//!
//! let mut tokenizer = Tokenizer::builder().operations(3).build()?;
//! tokenizer.train_from_text("low lower newest newest widest")?;
//!
//! let encoding = tokenizer.encode("Slowest!");
//! let text = tokenizer.decode(&encoding.to_string())?;
//! assert_eq!(text, "SLOWEST");
//! # Ok::<(), subword_tokenizer::SubwordError>(())
//! ```

// Re-export core types
pub use subword_core::{BpeModel, Operation, Result, SubwordError, Vocabulary};
pub use subword_training::{StopReason, TrainingConfig, TrainingStats, TrainingTarget};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{decode_lines, Encoding, Tokenizer, TokenizerBuilder, TokenizerConfig};

// IO/Serialization
pub mod io;
pub use io::{ModelFormat, ModelLoader, ModelSaver, VocabularyLoader, VocabularySaver};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{NormalizationForm, Normalizer, PreTokenizer, Splitter};

// Utilities
pub mod utils;
pub use utils::EncodingCache;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

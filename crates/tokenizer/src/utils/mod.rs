//! Utility modules for the subword tokenizer.

pub mod cache;

pub use cache::{CacheStats, EncodingCache, DEFAULT_CACHE_CAPACITY};

//! Core data model for byte-pair encoding.
//!
//! This module contains the types shared by training and replay: symbols,
//! merge operations, the trained model, the word-frequency vocabulary and
//! the pair priority queue.

pub mod merges;
pub mod priority;
pub mod symbol;
pub mod vocab;

pub use merges::{BpeModel, Operation};
pub use priority::{MergeCandidate, PairPriorityQueue};
pub use symbol::{initial_symbols, merge_symbols, Pair, Symbol, BOUNDARY};
pub use vocab::Vocabulary;

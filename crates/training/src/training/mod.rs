//! Incremental BPE training.
//!
//! Training keeps three structures in step: the [`WordTable`] holds every
//! distinct word and its current segmentation, the [`BigramIndex`] tracks
//! how often each adjacent pair occurs and where, and the [`SearchSet`]
//! answers "which pair is most frequent" without scanning the whole index.
//! The [`MergeEngine`] drives them one merge at a time.

pub mod bigrams;
pub mod selector;
pub mod trainer;
pub mod words;

pub use bigrams::{Bigram, BigramIndex};
pub use selector::{SearchSet, DEFAULT_SEARCH_SET_SIZE};
pub use trainer::{
    BpeTrainer, MergeEngine, StopReason, TrainingConfig, TrainingConfigBuilder, TrainingOutput,
    TrainingState, TrainingStats, TrainingTarget, DEFAULT_MAX_SUBWORDS,
};
pub use words::{PairDelta, Word, WordId, WordTable};

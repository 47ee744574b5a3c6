//! BPE merge engine and trainer.
//!
//! The engine repeatedly asks the [`SearchSet`] for the most frequent
//! pair, rewrites every occurrence of it in the [`WordTable`], and feeds the
//! resulting pair deltas back into the [`BigramIndex`] and the search set.
//! No pair frequency is ever recounted after the initial scan.

use super::bigrams::BigramIndex;
use super::selector::{SearchSet, DEFAULT_SEARCH_SET_SIZE};
use super::words::WordTable;
use ahash::AHashSet;
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use subword_core::{BpeModel, Operation, Pair, Result, SubwordError, Vocabulary};

/// Default maximum number of distinct subwords.
pub const DEFAULT_MAX_SUBWORDS: usize = 1000;

/// How many merge operations a run should aim for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingTarget {
    /// Maximum number of distinct subwords: the initial alphabet plus one
    /// per merge
    Subwords(usize),
    /// Exact number of merge operations
    Operations(usize),
}

impl TrainingTarget {
    /// Number of merge operations this target allows over an alphabet.
    pub fn operations(&self, alphabet_size: usize) -> usize {
        match *self {
            TrainingTarget::Subwords(n) => n.saturating_sub(alphabet_size),
            TrainingTarget::Operations(n) => n,
        }
    }

    fn is_zero(&self) -> bool {
        matches!(
            self,
            TrainingTarget::Subwords(0) | TrainingTarget::Operations(0)
        )
    }
}

impl Default for TrainingTarget {
    fn default() -> Self {
        TrainingTarget::Subwords(DEFAULT_MAX_SUBWORDS)
    }
}

/// Configuration for BPE training.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingConfig {
    /// When to stop merging
    pub target: TrainingTarget,
    /// Pairs less frequent than this are never merged
    pub min_frequency: u64,
    /// Size the search set is steered toward on every rebuild
    pub search_set_size: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target: TrainingTarget::default(),
            min_frequency: 1,
            search_set_size: DEFAULT_SEARCH_SET_SIZE,
        }
    }
}

impl TrainingConfig {
    /// Create a configuration builder.
    pub fn builder() -> TrainingConfigBuilder {
        TrainingConfigBuilder::default()
    }

    /// Check the configuration for values training cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.target.is_zero() {
            return Err(SubwordError::Configuration(
                "Training target must be greater than 0".to_string(),
            ));
        }
        if self.min_frequency == 0 {
            return Err(SubwordError::Configuration(
                "Minimum frequency must be greater than 0".to_string(),
            ));
        }
        if self.search_set_size == 0 {
            return Err(SubwordError::Configuration(
                "Search set size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`TrainingConfig`].
#[derive(Debug, Clone, Default)]
pub struct TrainingConfigBuilder {
    config: TrainingConfig,
}

impl TrainingConfigBuilder {
    /// Stop once the subword inventory reaches `n` entries.
    pub fn max_subwords(mut self, n: usize) -> Self {
        self.config.target = TrainingTarget::Subwords(n);
        self
    }

    /// Stop after exactly `n` merge operations.
    pub fn operations(mut self, n: usize) -> Self {
        self.config.target = TrainingTarget::Operations(n);
        self
    }

    /// Set the training target directly.
    pub fn target(mut self, target: TrainingTarget) -> Self {
        self.config.target = target;
        self
    }

    /// Set the minimum merge frequency.
    pub fn min_frequency(mut self, freq: u64) -> Self {
        self.config.min_frequency = freq;
        self
    }

    /// Set the search set target size.
    pub fn search_set_size(mut self, size: usize) -> Self {
        self.config.search_set_size = size;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<TrainingConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The requested number of operations was performed
    TargetReached,
    /// No adjacent pairs remain in any word
    Exhausted,
    /// The most frequent pair fell below the minimum frequency
    BelowMinFrequency,
}

/// Engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingState {
    /// More merges may follow
    Running,
    /// Terminal
    Done(StopReason),
}

/// The incremental merge loop.
///
/// Owns the word table, the bigram index and the search set, and records
/// every merge it performs as an [`Operation`].
#[derive(Debug)]
pub struct MergeEngine {
    words: WordTable,
    index: BigramIndex,
    selector: SearchSet,
    model: BpeModel,
    /// Merge operations the run may perform
    target: usize,
    min_frequency: u64,
    /// Merges performed, duplicates included
    performed: usize,
    state: TrainingState,
}

impl MergeEngine {
    /// Set up the word table, index and search set for a vocabulary.
    pub fn new(vocab: &Vocabulary, config: &TrainingConfig) -> Result<Self> {
        config.validate()?;

        let words = WordTable::from_vocabulary(vocab)?;
        let index = BigramIndex::from_words(&words);
        let selector = SearchSet::from_index(&index, config.search_set_size);
        let target = config.target.operations(words.alphabet().len());

        let mut engine = Self {
            words,
            index,
            selector,
            model: BpeModel::with_capacity(target.min(1 << 16)),
            target,
            min_frequency: config.min_frequency,
            performed: 0,
            state: TrainingState::Running,
        };
        engine.refresh_state();
        Ok(engine)
    }

    /// Perform one merge.
    ///
    /// Returns the recorded operation, or `None` once the engine is done.
    pub fn step(&mut self) -> Option<Operation> {
        if self.state != TrainingState::Running {
            return None;
        }

        let candidate = match self.selector.best(&self.index) {
            Some(candidate) => candidate,
            None => {
                self.state = TrainingState::Done(StopReason::Exhausted);
                return None;
            }
        };
        if candidate.frequency < self.min_frequency {
            debug!(
                "best pair ({} {}) at {} is below minimum frequency {}",
                candidate.pair.0, candidate.pair.1, candidate.frequency, self.min_frequency
            );
            self.state = TrainingState::Done(StopReason::BelowMinFrequency);
            return None;
        }

        self.merge(&candidate.pair);

        let operation = Operation::from(candidate.pair);
        match self.model.add_operation(operation.clone()) {
            Some(rank) => debug!(
                "merge {}: {} (frequency {})",
                rank, operation, candidate.frequency
            ),
            // A merged pair has no occurrences left and its symbols are
            // never recreated, so the model rejects no pair here.
            None => warn!("pair ({}) merged again, keeping first rank", operation),
        }
        self.performed += 1;
        self.refresh_state();

        Some(operation)
    }

    /// Run until done, returning the stop reason.
    pub fn run(&mut self) -> StopReason {
        while self.step().is_some() {}
        match self.state {
            TrainingState::Done(reason) => reason,
            // step only yields None once done
            TrainingState::Running => StopReason::Exhausted,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> TrainingState {
        self.state
    }

    /// Number of merges performed so far.
    #[inline]
    pub fn performed(&self) -> usize {
        self.performed
    }

    /// Merge operations this run may perform in total.
    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    /// Operations recorded so far, in training order.
    pub fn operations(&self) -> &[Operation] {
        self.model.operations()
    }

    /// The word table in its current segmentation.
    pub fn words(&self) -> &WordTable {
        &self.words
    }

    /// The bigram index.
    pub fn index(&self) -> &BigramIndex {
        &self.index
    }

    /// The search set.
    pub fn selector(&self) -> &SearchSet {
        &self.selector
    }

    /// Take the recorded model, dropping the training state.
    pub fn into_model(self) -> BpeModel {
        self.model
    }

    /// Take the recorded model and the final word table.
    pub fn into_parts(self) -> (BpeModel, WordTable) {
        (self.model, self.words)
    }

    fn refresh_state(&mut self) {
        if self.performed >= self.target {
            self.state = TrainingState::Done(StopReason::TargetReached);
        } else if self.index.is_empty() {
            self.state = TrainingState::Done(StopReason::Exhausted);
        }
    }

    /// Rewrite every occurrence of `pair` and propagate the deltas.
    fn merge(&mut self, pair: &Pair) {
        let mut touched: AHashSet<Pair> = AHashSet::new();

        // Snapshot: rewriting mutates the containing-word sets.
        for id in self.index.words_containing(pair) {
            let mut from = 0;
            loop {
                let position = match self.words.get(id).and_then(|w| w.find(pair, from)) {
                    Some(position) => position,
                    None => break,
                };
                let delta = match self.words.rewrite(id, position) {
                    Some(delta) => delta,
                    None => break,
                };
                let word = match self.words.get(id) {
                    Some(word) => word,
                    None => break,
                };

                for removed in delta.removed {
                    self.index.remove_occurrence(&removed, word, 1);
                    touched.insert(removed);
                }
                for added in delta.added {
                    self.index.add_occurrence(&added, word, 1);
                    touched.insert(added);
                }

                from = position + 1;
            }
        }

        touched.remove(pair);
        for changed in &touched {
            self.selector.update(changed, self.index.frequency_of(changed));
        }

        if self.index.remove(pair).is_some() {
            warn!("pair ({} {}) left behind after merge", pair.0, pair.1);
        }
        self.selector.remove(pair);
    }
}

/// Summary of a finished training run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingStats {
    /// Merges performed
    pub operations: usize,
    /// Why the run stopped
    pub stop_reason: StopReason,
    /// Search set threshold at the end of the run
    pub final_threshold: u64,
    /// Search set rebuilds, the initial build included
    pub rebuilds: usize,
    /// Size of the initial alphabet, boundary marker included
    pub alphabet_size: usize,
    /// Wall time spent training
    pub elapsed: Duration,
}

/// Output of [`BpeTrainer::train`].
#[derive(Debug, Clone)]
pub struct TrainingOutput {
    /// The learned operations
    pub model: BpeModel,
    /// Run statistics
    pub stats: TrainingStats,
    /// Words in their final segmentation
    pub words: WordTable,
}

/// BPE trainer.
///
/// Learns merge operations from a word-frequency vocabulary by merging the
/// most frequent adjacent pair until the target is met.
#[derive(Debug, Clone, Default)]
pub struct BpeTrainer {
    config: TrainingConfig,
}

impl BpeTrainer {
    /// Create a new trainer with the given configuration.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Create a trainer that stops at `max_subwords` distinct subwords.
    pub fn with_max_subwords(max_subwords: usize) -> Self {
        Self::new(TrainingConfig {
            target: TrainingTarget::Subwords(max_subwords),
            ..Default::default()
        })
    }

    /// The trainer's configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on a vocabulary.
    pub fn train(&self, vocab: &Vocabulary) -> Result<TrainingOutput> {
        let start = Instant::now();
        let mut engine = MergeEngine::new(vocab, &self.config)?;

        let alphabet_size = engine.words().alphabet().len();
        info!(
            "training on {} words ({} occurrences), alphabet {}, {} distinct pairs, up to {} operations",
            engine.words().len(),
            engine.words().total_occurrences(),
            alphabet_size,
            engine.index().len(),
            engine.target()
        );

        let stop_reason = engine.run();

        let stats = TrainingStats {
            operations: engine.performed(),
            stop_reason,
            final_threshold: engine.selector().threshold(),
            rebuilds: engine.selector().rebuilds(),
            alphabet_size,
            elapsed: start.elapsed(),
        };
        info!(
            "learned {} operations in {:.2?} ({:?}, {} search set rebuilds)",
            stats.operations, stats.elapsed, stats.stop_reason, stats.rebuilds
        );

        let (model, words) = engine.into_parts();
        Ok(TrainingOutput {
            model,
            stats,
            words,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;
    use subword_core::core::symbol::pair;
    use subword_core::{initial_symbols, merge_symbols, Symbol};

    fn vocab(entries: &[(&str, u64)]) -> Vocabulary {
        entries.iter().copied().collect()
    }

    fn scenario() -> Vocabulary {
        vocab(&[("LOW", 5), ("LOWER", 2), ("NEWEST", 6), ("WIDEST", 3)])
    }

    fn operations(n: usize) -> TrainingConfig {
        TrainingConfig::builder().operations(n).build().unwrap()
    }

    /// Small deterministic generator for test vocabularies.
    struct XorShift(u64);

    impl XorShift {
        fn next(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        fn below(&mut self, n: u64) -> u64 {
            self.next() % n
        }
    }

    fn random_vocab(seed: u64, words: usize, letters: &[&str]) -> Vocabulary {
        let mut rng = XorShift(seed);
        let mut vocab = Vocabulary::new();
        for _ in 0..words {
            let len = 1 + rng.below(7) as usize;
            let token: String = (0..len)
                .map(|_| letters[rng.below(letters.len() as u64) as usize])
                .collect();
            vocab.add_word(&token, 1 + rng.below(20)).unwrap();
        }
        vocab
    }

    /// Recount everything from scratch on every iteration.
    fn reference_train(vocab: &Vocabulary, ops: usize, min_frequency: u64) -> Vec<Operation> {
        let mut words: Vec<(Vec<Symbol>, u64)> = vocab
            .iter()
            .map(|(token, freq)| (initial_symbols(token), freq))
            .collect();
        let mut learned = Vec::new();

        while learned.len() < ops {
            let mut counts: AHashMap<Pair, u64> = AHashMap::new();
            for (symbols, freq) in &words {
                for window in symbols.windows(2) {
                    *counts
                        .entry((window[0].clone(), window[1].clone()))
                        .or_insert(0) += freq;
                }
            }
            let best = counts
                .into_iter()
                .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
            let (best, freq) = match best {
                Some(best) => best,
                None => break,
            };
            if freq < min_frequency {
                break;
            }

            let merged = merge_symbols(&best.0, &best.1);
            for (symbols, _) in &mut words {
                let mut i = 0;
                while i + 1 < symbols.len() {
                    if symbols[i] == best.0 && symbols[i + 1] == best.1 {
                        symbols[i] = merged.clone();
                        symbols.remove(i + 1);
                    }
                    i += 1;
                }
            }
            learned.push(Operation::from(best));
        }

        learned
    }

    fn assert_consistent(engine: &MergeEngine) {
        let words = engine.words();
        let index = engine.index();
        assert_eq!(index.frequencies(), words.count_pairs());

        for word in words.iter() {
            let mut held: AHashMap<Pair, u32> = AHashMap::new();
            for p in word.pairs() {
                *held.entry(p).or_insert(0) += 1;
            }
            for (p, count) in held {
                let bigram = index.get(&p).unwrap();
                assert_eq!(bigram.words.get(&word.id), Some(&count));
            }
        }

        let threshold = engine.selector().threshold();
        let eligible = index.iter().filter(|&(_, f)| f >= threshold).count();
        assert_eq!(engine.selector().len(), eligible);
        for (p, f) in index.iter() {
            assert_eq!(engine.selector().contains(p), f >= threshold);
        }
    }

    #[test]
    fn test_scenario() {
        let mut engine = MergeEngine::new(&scenario(), &operations(3)).unwrap();
        assert_eq!(engine.state(), TrainingState::Running);

        assert_eq!(engine.step(), Some(Operation::new("E", "S")));
        assert_eq!(engine.step(), Some(Operation::new("ES", "T")));
        assert_eq!(engine.step(), Some(Operation::new("EST", "_")));
        assert_eq!(
            engine.state(),
            TrainingState::Done(StopReason::TargetReached)
        );
        assert_eq!(engine.step(), None);

        let words = engine.words();
        assert_eq!(words.find("WIDEST").unwrap().segmentation(), "W I D EST_");
        assert_eq!(words.find("LOWER").unwrap().segmentation(), "L O W E R _");
    }

    #[test]
    fn test_first_merge_frequencies() {
        let mut engine = MergeEngine::new(&scenario(), &operations(3)).unwrap();
        engine.step();

        let index = engine.index();
        assert_eq!(index.frequency_of(&pair("E", "S")), 0);
        assert_eq!(index.frequency_of(&pair("S", "T")), 0);
        assert_eq!(index.frequency_of(&pair("ES", "T")), 9);
        assert_eq!(index.frequency_of(&pair("W", "ES")), 6);
        assert_eq!(index.frequency_of(&pair("D", "ES")), 3);
        assert_eq!(index.frequency_of(&pair("W", "E")), 2);
        assert_eq!(index.frequency_of(&pair("T", "_")), 9);
        assert_consistent(&engine);
    }

    #[test]
    fn test_subword_target() {
        let trainer = BpeTrainer::with_max_subwords(14);
        let output = trainer.train(&scenario()).unwrap();

        // L O W E R N S T I D _
        assert_eq!(output.stats.alphabet_size, 11);
        assert_eq!(output.model.len(), 3);
        assert_eq!(output.stats.stop_reason, StopReason::TargetReached);
    }

    #[test]
    fn test_target_within_alphabet() {
        let trainer = BpeTrainer::with_max_subwords(5);
        let output = trainer.train(&scenario()).unwrap();
        assert!(output.model.is_empty());
        assert_eq!(output.stats.stop_reason, StopReason::TargetReached);

        let engine = MergeEngine::new(&scenario(), &TrainingConfig {
            target: TrainingTarget::Subwords(11),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            engine.state(),
            TrainingState::Done(StopReason::TargetReached)
        );
    }

    #[test]
    fn test_exhausted() {
        let mut engine = MergeEngine::new(&vocab(&[("AB", 3)]), &operations(100)).unwrap();
        assert_eq!(engine.run(), StopReason::Exhausted);
        assert_eq!(
            engine.operations(),
            &[Operation::new("A", "B"), Operation::new("AB", "_")]
        );
        assert!(engine.index().is_empty());
        assert_eq!(engine.words().find("AB").unwrap().symbols, vec!["AB_"]);
    }

    #[test]
    fn test_single_character_words() {
        let mut engine = MergeEngine::new(&vocab(&[("A", 4), ("B", 1)]), &operations(10)).unwrap();
        assert_eq!(engine.step(), Some(Operation::new("A", "_")));
        assert_eq!(engine.step(), Some(Operation::new("B", "_")));
        assert_eq!(engine.step(), None);
        assert_eq!(engine.state(), TrainingState::Done(StopReason::Exhausted));
    }

    #[test]
    fn test_min_frequency_stop() {
        let config = TrainingConfig::builder()
            .operations(10)
            .min_frequency(4)
            .build()
            .unwrap();
        let mut engine = MergeEngine::new(&vocab(&[("AB", 5), ("CD", 2)]), &config).unwrap();

        assert_eq!(engine.run(), StopReason::BelowMinFrequency);
        assert_eq!(
            engine.operations(),
            &[Operation::new("A", "B"), Operation::new("AB", "_")]
        );
    }

    #[test]
    fn test_overlapping_pair() {
        let mut engine = MergeEngine::new(&vocab(&[("AAAA", 1), ("AAA", 2)]), &operations(1))
            .unwrap();
        assert_eq!(engine.step(), Some(Operation::new("A", "A")));

        let words = engine.words();
        assert_eq!(words.find("AAAA").unwrap().symbols, vec!["AA", "AA", "_"]);
        assert_eq!(words.find("AAA").unwrap().symbols, vec!["AA", "A", "_"]);
        assert_consistent(&engine);
    }

    #[test]
    fn test_invalid_config() {
        for config in [
            TrainingConfig {
                target: TrainingTarget::Operations(0),
                ..Default::default()
            },
            TrainingConfig {
                target: TrainingTarget::Subwords(0),
                ..Default::default()
            },
            TrainingConfig {
                min_frequency: 0,
                ..Default::default()
            },
            TrainingConfig {
                search_set_size: 0,
                ..Default::default()
            },
        ] {
            let err = MergeEngine::new(&scenario(), &config).unwrap_err();
            assert!(matches!(err, SubwordError::Configuration(_)));
        }

        assert!(TrainingConfig::builder().max_subwords(0).build().is_err());
    }

    #[test]
    fn test_empty_vocabulary() {
        let err = BpeTrainer::default().train(&Vocabulary::new()).unwrap_err();
        assert!(matches!(err, SubwordError::Configuration(_)));
    }

    #[test]
    fn test_deterministic() {
        let vocab = random_vocab(7, 60, &["A", "B", "C", "D", "E"]);
        let trainer = BpeTrainer::new(operations(40));

        let first = trainer.train(&vocab).unwrap();
        let second = trainer.train(&vocab).unwrap();
        assert_eq!(first.model, second.model);
        assert_eq!(first.stats.rebuilds, second.stats.rebuilds);
    }

    #[test]
    fn test_index_consistent_every_step() {
        for seed in [1, 42, 1234, 99_991] {
            let vocab = random_vocab(seed, 40, &["A", "B", "C", "D"]);
            let config = TrainingConfig::builder()
                .operations(30)
                .search_set_size(4)
                .build()
                .unwrap();
            let mut engine = MergeEngine::new(&vocab, &config).unwrap();

            assert_consistent(&engine);
            while engine.step().is_some() {
                assert_consistent(&engine);
            }
        }
    }

    #[test]
    fn test_matches_reference_trainer() {
        let fixed = scenario();
        let reference = reference_train(&fixed, 20, 1);
        let mut engine = MergeEngine::new(&fixed, &operations(20)).unwrap();
        let mut learned = Vec::new();
        while let Some(op) = engine.step() {
            learned.push(op);
        }
        assert_eq!(learned, reference);

        for (seed, size) in [(3, 2), (17, 10), (2024, 100)] {
            let vocab = random_vocab(seed, 50, &["A", "B", "C", "D", "E", "F"]);
            let config = TrainingConfig::builder()
                .operations(60)
                .min_frequency(2)
                .search_set_size(size)
                .build()
                .unwrap();

            let mut engine = MergeEngine::new(&vocab, &config).unwrap();
            let mut learned = Vec::new();
            while let Some(op) = engine.step() {
                learned.push(op);
            }
            assert_eq!(learned, reference_train(&vocab, 60, 2), "seed {}", seed);
        }
    }

    #[test]
    fn test_merged_pairs_never_return() {
        for seed in 1..=150u64 {
            for letters in [&["A", "B"][..], &["A", "B", "C", "D"][..]] {
                let vocab = random_vocab(seed, 30, letters);
                let mut engine = MergeEngine::new(&vocab, &operations(1000)).unwrap();
                assert_eq!(engine.run(), StopReason::Exhausted, "seed {}", seed);

                assert_eq!(engine.performed(), engine.operations().len(), "seed {}", seed);
                let (model, _) = engine.into_parts();
                for op in model.operations() {
                    let constituents = model.constituents(&op.merged());
                    assert_eq!(constituents, Some(&op.pair()), "seed {}", seed);
                }
            }
        }

        // after a step, the merged pair is gone from every word
        let vocab = random_vocab(7, 40, &["A", "B"]);
        let mut engine = MergeEngine::new(&vocab, &operations(1000)).unwrap();
        while let Some(op) = engine.step() {
            let pair = op.pair();
            assert!(engine.words().iter().all(|w| w.find(&pair, 0).is_none()), "{}", op);
        }
    }

    #[test]
    fn test_into_model_after_partial_run() {
        let mut engine = MergeEngine::new(&scenario(), &operations(10)).unwrap();
        engine.step();
        engine.step();
        assert_eq!(engine.state(), TrainingState::Running);

        let model = engine.into_model();
        assert_eq!(model.len(), 2);
        assert_eq!(model.rank("ES", "T"), Some(1));
    }
}

//! Maximum-frequency pair selection.
//!
//! Only pairs at or above a frequency threshold are kept ordered, in the
//! "search set". As merges consume the most frequent pairs the set drains;
//! once it is empty while the index still has pairs, the threshold is
//! lowered and the set is rebuilt with one scan of the index. The
//! adaptation parameter steers how far the threshold drops per rebuild so
//! that rebuilt sets land near a target size.

use super::bigrams::BigramIndex;
use log::debug;
use subword_core::{MergeCandidate, Pair, PairPriorityQueue};

/// Default number of pairs a rebuilt search set aims for.
pub const DEFAULT_SEARCH_SET_SIZE: usize = 100;

/// Threshold-bounded priority structure over a [`BigramIndex`].
#[derive(Debug)]
pub struct SearchSet {
    /// Pairs with frequency >= threshold
    queue: PairPriorityQueue,
    /// Minimum frequency for membership, never below 1
    threshold: u64,
    /// Exponent of the threshold reduction factor `1 + 2^a`
    adaptation: i32,
    /// Size rebuilt sets are steered toward
    target_size: usize,
    /// Number of rebuilds so far
    rebuilds: usize,
}

impl SearchSet {
    /// Create an empty search set aiming for `target_size` pairs.
    pub fn new(target_size: usize) -> Self {
        Self {
            queue: PairPriorityQueue::new(),
            threshold: 1,
            adaptation: 0,
            target_size: target_size.max(1),
            rebuilds: 0,
        }
    }

    /// Build the initial set from a freshly scanned index.
    pub fn from_index(index: &BigramIndex, target_size: usize) -> Self {
        let mut set = Self::new(target_size);
        set.threshold = set.next_threshold(index.max_frequency());
        set.rebuild(index);
        set
    }

    /// Current membership threshold.
    #[inline]
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Current adaptation parameter.
    #[inline]
    pub fn adaptation(&self) -> i32 {
        self.adaptation
    }

    /// Number of rebuilds performed, the initial build included.
    #[inline]
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }

    /// Number of pairs currently in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if a pair is a member of the set.
    #[inline]
    pub fn contains(&self, pair: &Pair) -> bool {
        self.queue.contains(pair)
    }

    /// Reflect a pair's new frequency.
    ///
    /// Must be called for every pair whose frequency changed before the
    /// next call to [`SearchSet::best`].
    pub fn update(&mut self, pair: &Pair, frequency: u64) {
        if frequency >= self.threshold {
            self.queue.update(pair.clone(), frequency);
        } else {
            self.queue.remove(pair);
        }
    }

    /// Drop a pair from the set.
    pub fn remove(&mut self, pair: &Pair) {
        self.queue.remove(pair);
    }

    /// The pair with maximum frequency, ties going to the lexicographically
    /// smallest pair. `None` only when the index is empty.
    pub fn best(&mut self, index: &BigramIndex) -> Option<MergeCandidate> {
        if index.is_empty() {
            return None;
        }

        loop {
            if let Some(candidate) = self.queue.peek() {
                return Some(candidate.clone());
            }
            // Every remaining pair is below the threshold.
            self.threshold = self.next_threshold(self.threshold);
            self.rebuild(index);
        }
    }

    /// `min(ceil(previous / (1 + 2^a)), previous - 1)`, floored at 1.
    fn next_threshold(&self, previous: u64) -> u64 {
        let factor = 1.0 + 2f64.powi(self.adaptation);
        let reduced = (previous as f64 / factor).ceil() as u64;
        reduced.min(previous.saturating_sub(1)).max(1)
    }

    /// Refill the set from the index and retune the adaptation parameter.
    fn rebuild(&mut self, index: &BigramIndex) {
        self.queue.clear();
        for (pair, frequency) in index.iter() {
            if frequency >= self.threshold {
                self.queue.update(pair.clone(), frequency);
            }
        }

        let size = self.queue.len();
        if size < self.target_size {
            self.adaptation += 1;
        } else if size > self.target_size {
            self.adaptation -= 2;
        }
        self.rebuilds += 1;

        debug!(
            "search set rebuilt: threshold {} size {} adaptation {}",
            self.threshold, size, self.adaptation
        );
    }
}

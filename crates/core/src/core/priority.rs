//! Priority queue for merge candidates.
//!
//! The queue never re-heapifies on a frequency change. Updating a pair
//! pushes a fresh entry and records the live frequency in a side map; any
//! heap entry whose frequency no longer matches the side map is stale and
//! is discarded lazily when it reaches the top.

use crate::core::symbol::Pair;
use ahash::AHashMap;
use dary_heap::OctonaryHeap;
use log::trace;
use std::cmp::Ordering;

/// Stale entries tolerated before the heap is rebuilt from live entries.
const COMPACT_SLACK: usize = 64;

/// A merge candidate: a pair and its frequency at the time it was queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCandidate {
    /// The pair of symbols to merge
    pub pair: Pair,
    /// Weighted corpus frequency of the pair
    pub frequency: u64,
}

impl MergeCandidate {
    /// Create a new merge candidate.
    pub fn new(pair: Pair, frequency: u64) -> Self {
        Self { pair, frequency }
    }
}

// Higher frequency first; among equals the lexicographically smallest pair.
impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.frequency
            .cmp(&other.frequency)
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Max-priority queue over pairs with lazy invalidation.
///
/// Uses an 8-ary heap for better cache locality than a binary heap.
#[derive(Debug, Default)]
pub struct PairPriorityQueue {
    /// The heap storing merge candidates (possibly stale)
    heap: OctonaryHeap<MergeCandidate>,
    /// Live frequency of every pair currently in the queue
    live: AHashMap<Pair, u64>,
}

impl PairPriorityQueue {
    /// Create a new empty priority queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new priority queue with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: OctonaryHeap::with_capacity(capacity),
            live: AHashMap::with_capacity(capacity),
        }
    }

    /// Insert a pair or change its frequency.
    ///
    /// Any existing entry for the pair becomes stale.
    pub fn update(&mut self, pair: Pair, frequency: u64) {
        if self.live.get(&pair) == Some(&frequency) {
            return;
        }
        self.live.insert(pair.clone(), frequency);
        self.heap.push(MergeCandidate::new(pair, frequency));
        self.maybe_compact();
    }

    /// Remove a pair from the queue. Returns true if it was present.
    pub fn remove(&mut self, pair: &Pair) -> bool {
        let removed = self.live.remove(pair).is_some();
        if removed {
            self.maybe_compact();
        }
        removed
    }

    /// Check if a pair is currently queued.
    #[inline]
    pub fn contains(&self, pair: &Pair) -> bool {
        self.live.contains_key(pair)
    }

    /// Get the live frequency recorded for a pair.
    #[inline]
    pub fn frequency(&self, pair: &Pair) -> Option<u64> {
        self.live.get(pair).copied()
    }

    /// Peek at the highest priority live candidate.
    ///
    /// Stale entries found on top are discarded.
    pub fn peek(&mut self) -> Option<&MergeCandidate> {
        while let Some(top) = self.heap.peek() {
            if self.is_live(top) {
                break;
            }
            self.heap.pop();
        }
        self.heap.peek()
    }

    /// Pop the highest priority live candidate.
    pub fn pop(&mut self) -> Option<MergeCandidate> {
        while let Some(candidate) = self.heap.pop() {
            if self.is_live(&candidate) {
                self.live.remove(&candidate.pair);
                return Some(candidate);
            }
        }
        None
    }

    /// Number of live pairs in the queue.
    #[inline]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Check if no live pairs are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Number of heap entries, stale ones included.
    #[inline]
    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    /// Clear all entries from the queue.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.live.clear();
    }

    #[inline]
    fn is_live(&self, candidate: &MergeCandidate) -> bool {
        self.live.get(&candidate.pair) == Some(&candidate.frequency)
    }

    /// Rebuild the heap from live entries once stale ones dominate.
    fn maybe_compact(&mut self) {
        if self.heap.len() <= 2 * self.live.len() + COMPACT_SLACK {
            return;
        }
        trace!(
            "compacting heap: {} entries, {} live",
            self.heap.len(),
            self.live.len()
        );
        let candidates: Vec<MergeCandidate> = self
            .live
            .iter()
            .map(|(pair, &frequency)| MergeCandidate::new(pair.clone(), frequency))
            .collect();
        self.heap = OctonaryHeap::from(candidates);
    }
}

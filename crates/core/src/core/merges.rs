//! Merge operations and the trained model.
//!
//! A trained model is nothing more than the ordered list of merge
//! operations. Alongside the list we keep two lookups: pair -> rank for
//! encoding, and merged symbol -> constituents for decoding.

use crate::core::symbol::{merge_symbols, Pair, Symbol};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One recorded merge decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Operation {
    /// Left symbol of the merged pair
    pub left: Symbol,
    /// Right symbol of the merged pair
    pub right: Symbol,
}

impl Operation {
    /// Create a new operation.
    pub fn new(left: impl Into<Symbol>, right: impl Into<Symbol>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// The symbol this operation creates.
    pub fn merged(&self) -> Symbol {
        merge_symbols(&self.left, &self.right)
    }

    /// The pair this operation merges.
    pub fn pair(&self) -> Pair {
        (self.left.clone(), self.right.clone())
    }
}

impl From<Pair> for Operation {
    fn from((left, right): Pair) -> Self {
        Self { left, right }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.left, self.right)
    }
}

/// A trained byte-pair-encoding model: merge operations in training order.
#[derive(Debug, Clone, Default)]
pub struct BpeModel {
    /// Operations in the order they were performed
    operations: Vec<Operation>,
    /// Pair -> rank (index into `operations`)
    ranks: AHashMap<Pair, usize>,
    /// Merged symbol -> the two symbols it was first created from
    constituents: AHashMap<Symbol, Pair>,
}

impl BpeModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty model with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            operations: Vec::with_capacity(capacity),
            ranks: AHashMap::with_capacity(capacity),
            constituents: AHashMap::with_capacity(capacity),
        }
    }

    /// Append an operation.
    ///
    /// Returns the rank assigned to it, or `None` if the pair is already
    /// part of the model (the model is left unchanged in that case).
    pub fn add_operation(&mut self, operation: Operation) -> Option<usize> {
        let pair = operation.pair();
        if self.ranks.contains_key(&pair) {
            return None;
        }

        let rank = self.operations.len();
        self.ranks.insert(pair.clone(), rank);
        self.constituents.entry(operation.merged()).or_insert(pair);
        self.operations.push(operation);

        Some(rank)
    }

    /// Get the rank of a pair (lower = applied earlier).
    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<usize> {
        // Tuple keys of CompactString cannot be borrowed as (&str, &str),
        // so build the key on the stack. Short symbols stay inline.
        self.ranks.get(&(Symbol::new(left), Symbol::new(right))).copied()
    }

    /// Get the rank of an owned pair.
    #[inline]
    pub fn rank_of(&self, pair: &Pair) -> Option<usize> {
        self.ranks.get(pair).copied()
    }

    /// Get the two symbols a merged symbol was created from.
    #[inline]
    pub fn constituents(&self, symbol: &str) -> Option<&Pair> {
        self.constituents.get(symbol)
    }

    /// Operations in training order.
    #[inline]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if there are no operations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Iterate over operations in training order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Keep only the first `len` operations.
    ///
    /// Any prefix of a trained model is itself a usable model.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.operations.len() {
            return;
        }
        let kept: Vec<Operation> = self.operations.drain(..len).collect();
        *self = Self::from_operations(kept).0;
    }

    /// Build a model from operations, skipping duplicates.
    ///
    /// Returns the model and the indices of any skipped duplicates.
    pub fn from_operations(operations: impl IntoIterator<Item = Operation>) -> (Self, Vec<usize>) {
        let mut model = Self::new();
        let mut duplicates = Vec::new();

        for (index, operation) in operations.into_iter().enumerate() {
            if model.add_operation(operation).is_none() {
                duplicates.push(index);
            }
        }

        (model, duplicates)
    }
}

impl PartialEq for BpeModel {
    fn eq(&self, other: &Self) -> bool {
        self.operations == other.operations
    }
}

impl Eq for BpeModel {}

impl<'a> IntoIterator for &'a BpeModel {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

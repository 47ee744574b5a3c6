//! Symbols and symbol pairs.
//!
//! A symbol is an immutable string atom: a single grapheme cluster, the
//! word boundary marker, or the concatenation produced by a merge.

use compact_str::CompactString;
use unicode_segmentation::UnicodeSegmentation;

/// An atom of a word's current segmentation.
pub type Symbol = CompactString;

/// An ordered pair of adjacent symbols.
///
/// Tuple ordering compares `left` first, then `right`, which gives the
/// lexicographic tie-break used when several pairs share a frequency.
pub type Pair = (Symbol, Symbol);

/// Marker appended to every word so subwords can tell "ends a word" from
/// "continues a word".
pub const BOUNDARY: &str = "_";

/// Split a token into its initial symbol sequence: one symbol per grapheme
/// cluster followed by the boundary marker.
pub fn initial_symbols(token: &str) -> Vec<Symbol> {
    let mut symbols: Vec<Symbol> = token.graphemes(true).map(Symbol::new).collect();
    symbols.push(Symbol::new(BOUNDARY));
    symbols
}

/// Concatenate two symbols into the symbol a merge creates.
#[inline]
pub fn merge_symbols(left: &str, right: &str) -> Symbol {
    let mut merged = Symbol::with_capacity(left.len() + right.len());
    merged.push_str(left);
    merged.push_str(right);
    merged
}

/// Whether a symbol is a single grapheme cluster, i.e. cannot be the
/// product of a merge.
pub fn is_atomic(symbol: &str) -> bool {
    let mut graphemes = symbol.graphemes(true);
    graphemes.next().is_some() && graphemes.next().is_none()
}

/// Build a pair from two string slices.
#[inline]
pub fn pair(left: &str, right: &str) -> Pair {
    (Symbol::new(left), Symbol::new(right))
}

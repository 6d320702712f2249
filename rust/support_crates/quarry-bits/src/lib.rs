//! Fixed-capacity bit sets.

mod bit_set;

pub use bit_set::{BitSet, BitSetIter};

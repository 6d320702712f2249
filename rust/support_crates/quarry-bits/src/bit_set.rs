//! A fixed-capacity set of bits with `[u64]` storage.

use std::ops::Range;

/// A fixed-capacity set of bits backed by a `Vec<u64>`.
///
/// The capacity is chosen at construction time and never changes. Bits are
/// stored in little-endian order within each word: bit `i` lives in word
/// `i / 64` at position `i % 64`. Any bits beyond `len()` in the final word
/// are kept at 0, so [`count_ones`](BitSet::count_ones) never exceeds `len()`.
#[derive(Clone, PartialEq, Eq)]
pub struct BitSet {
    len: usize,
    words: Vec<u64>,
}

impl BitSet {
    /// Creates a new bit set holding `len` bits, all unset.
    pub fn new(len: usize) -> BitSet {
        BitSet {
            len,
            words: vec![0u64; len.div_ceil(64)],
        }
    }

    /// Returns the capacity of the bit set, in bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks whether the bit set has zero capacity.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if the bit at `index` is set.
    ///
    /// Indices at or beyond `len()` are reported as unset.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.len {
            return false;
        }
        let (word, bit) = Self::bit_position(index);
        self.words[word] & (1u64 << bit) != 0
    }

    /// Sets the bit at `index` and returns its previous state.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn set(&mut self, index: usize) -> bool {
        assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word, bit) = Self::bit_position(index);
        let mask = 1u64 << bit;
        let prev = self.words[word] & mask;
        self.words[word] |= mask;
        prev != 0
    }

    /// Resets the bit at `index` to 0.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word, bit) = Self::bit_position(index);
        self.words[word] &= !(1u64 << bit);
    }

    /// Resets all bits in `range` to 0.
    ///
    /// The range end is clamped to `len()`, so clearing "up to capacity" never
    /// touches storage beyond the set.
    pub fn reset_range(&mut self, range: Range<usize>) {
        let start = range.start;
        let end = range.end.min(self.len);
        if start >= end {
            return;
        }

        let (start_word, start_bit) = Self::bit_position(start);
        let (end_word, end_bit) = Self::bit_position(end);

        if start_word == end_word {
            let mask = ((1u64 << end_bit) - 1) & !((1u64 << start_bit) - 1);
            self.words[start_word] &= !mask;
            return;
        }

        self.words[start_word] &= (1u64 << start_bit) - 1;
        for word in self.words.iter_mut().take(end_word).skip(start_word + 1) {
            *word = 0;
        }
        if end_bit > 0 {
            self.words[end_word] &= !((1u64 << end_bit) - 1);
        }
    }

    /// Resets every bit to 0.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    /// Counts the number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns an iterator over the indices of set bits, in ascending order.
    pub fn iter(&self) -> BitSetIter<'_> {
        BitSetIter {
            words: &self.words,
            word_index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }

    #[inline]
    fn bit_position(index: usize) -> (usize, usize) {
        (index / 64, index % 64)
    }
}

impl std::fmt::Debug for BitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitSet")
            .field("len", &self.len)
            .field("count_ones", &self.count_ones())
            .finish()
    }
}

/// Iterator over the set bits of a [`BitSet`].
pub struct BitSetIter<'a> {
    words: &'a [u64],
    word_index: usize,
    current: u64,
}

impl Iterator for BitSetIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * 64 + bit);
            }
            self.word_index += 1;
            if self.word_index >= self.words.len() {
                return None;
            }
            self.current = self.words[self.word_index];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BitSet;

    #[test]
    fn test_set_and_contains() {
        let mut bits = BitSet::new(130);
        assert!(!bits.set(0));
        assert!(!bits.set(64));
        assert!(!bits.set(129));
        assert!(bits.set(64));

        assert!(bits.contains(0));
        assert!(bits.contains(64));
        assert!(bits.contains(129));
        assert!(!bits.contains(1));
        assert!(!bits.contains(130));
        assert_eq!(bits.count_ones(), 3);
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![0, 64, 129]);

        bits.reset(64);
        assert!(!bits.contains(64));
        assert_eq!(bits.count_ones(), 2);
    }

    #[test]
    #[should_panic]
    fn test_set_out_of_bounds() {
        let mut bits = BitSet::new(10);
        bits.set(10);
    }

    #[test]
    fn test_reset_range_within_word() {
        let mut bits = BitSet::new(64);
        for i in 0..64 {
            bits.set(i);
        }
        bits.reset_range(4..10);
        assert_eq!(bits.count_ones(), 58);
        assert!(bits.contains(3));
        assert!(!bits.contains(4));
        assert!(!bits.contains(9));
        assert!(bits.contains(10));
    }

    #[test]
    fn test_reset_range_across_words_is_clamped() {
        let mut bits = BitSet::new(200);
        for i in [0, 63, 64, 127, 128, 199] {
            bits.set(i);
        }
        bits.reset_range(63..10_000);
        assert_eq!(bits.iter().collect::<Vec<_>>(), vec![0]);

        bits.reset_range(0..bits.len());
        assert_eq!(bits.count_ones(), 0);
    }

    #[test]
    fn test_empty_bit_set() {
        let mut bits = BitSet::new(0);
        assert!(bits.is_empty());
        assert_eq!(bits.count_ones(), 0);
        assert_eq!(bits.iter().next(), None);
        bits.reset_range(0..100);
        bits.clear();
    }
}

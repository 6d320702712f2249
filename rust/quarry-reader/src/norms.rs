//! Per-field normalization factors.
//!
//! While a field's postings are scanned, each posting contributes the norm
//! byte of one document. The [`NormAccumulator`] writes those bytes into a
//! per-field [`NormArray`] indexed by ordinal, growing the array by doubling
//! up to the capacity bound, and marks every ordinal it sees in the
//! worker's observed-ordinal bit set.

use quarry_common::{Result, error::Error, verify_data};

use crate::cache::WorkerCacheSet;

/// Single-byte encoding of a norm of `1.0` (3-bit mantissa, 5-bit exponent,
/// zero exponent at 15).
pub const DEFAULT_NORM: u8 = 124;

/// Computes the length an array of `current` bytes grows to so that it can
/// hold at least `min_len` bytes: doubling repeatedly, but never past
/// `ceiling`.
///
/// The result is smaller than `min_len` only when `min_len > ceiling`.
pub fn grown_len(current: usize, min_len: usize, ceiling: usize) -> usize {
    let mut len = current.max(1);
    while len < min_len && len < ceiling {
        len = len.saturating_mul(2).min(ceiling);
    }
    len
}

/// Norm bytes of one field, indexed by ordinal.
///
/// Unwritten slots hold [`DEFAULT_NORM`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormArray {
    bytes: Vec<u8>,
}

impl NormArray {
    pub fn new(len: usize) -> NormArray {
        NormArray {
            bytes: vec![DEFAULT_NORM; len],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn get(&self, ordinal: u32) -> Option<u8> {
        self.bytes.get(ordinal as usize).copied()
    }

    /// Grows the array (see [`grown_len`]) until it holds `min_len` bytes or
    /// reaches `ceiling`. Existing bytes are preserved; new slots are set to
    /// [`DEFAULT_NORM`]. Never shrinks.
    ///
    /// Returns `true` if the array was reallocated.
    pub fn grow_to(&mut self, min_len: usize, ceiling: usize) -> bool {
        if self.bytes.len() >= min_len {
            return false;
        }
        let new_len = grown_len(self.bytes.len(), min_len, ceiling);
        if new_len <= self.bytes.len() {
            return false;
        }
        self.bytes.resize(new_len, DEFAULT_NORM);
        true
    }

    fn set(&mut self, ordinal: u32, norm: u8) {
        self.bytes[ordinal as usize] = norm;
    }
}

/// A `(ordinal, optional norm)` pair produced while scanning a field's
/// postings metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    pub ordinal: u32,
    pub norm: Option<Vec<u8>>,
}

impl Posting {
    pub fn new(ordinal: u32, norm: Option<Vec<u8>>) -> Posting {
        Posting { ordinal, norm }
    }

    pub fn with_norm(ordinal: u32, norm: u8) -> Posting {
        Posting::new(ordinal, Some(vec![norm]))
    }

    /// Builds a posting from a stored postings column: the column name is the
    /// ordinal as a variable-length integer, `norm` the optional norm
    /// sub-column value.
    pub fn from_column(name: &[u8], norm: Option<&[u8]>) -> Result<Posting> {
        Ok(Posting::new(read_vint(name)?, norm.map(<[u8]>::to_vec)))
    }

    /// Resolves the norm byte for this posting.
    fn resolve_norm(&self, field: &str) -> Result<u8> {
        match self.norm.as_deref() {
            None => Ok(DEFAULT_NORM),
            Some([norm]) => Ok(*norm),
            Some(other) => Err(Error::invalid_norm(field, other.len())),
        }
    }
}

/// Decodes a variable-length integer: seven bits per byte, low-order group
/// first, high bit set on every byte but the last. The whole input must be
/// consumed.
pub fn read_vint(bytes: &[u8]) -> Result<u32> {
    verify_data!(vint, !bytes.is_empty() && bytes.len() <= 5);
    let (&last, groups) = match bytes.split_last() {
        Some(split) => split,
        None => return Err(Error::invalid_format("vint", "empty")),
    };
    verify_data!(vint, groups.iter().all(|b| b & 0x80 != 0));
    verify_data!(vint, last & 0x80 == 0);

    let value = bytes
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (u64::from(b & 0x7F) << (7 * i)));
    verify_data!(vint, value <= u64::from(u32::MAX));
    Ok(value as u32)
}

/// Encodes `value` as a variable-length integer (see [`read_vint`]).
pub fn write_vint(mut value: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(5);
    while value >= 0x80 {
        bytes.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    bytes.push(value as u8);
    bytes
}

/// Builds per-field norm arrays from scanned postings.
#[derive(Debug, Clone, Copy)]
pub struct NormAccumulator {
    capacity_bound: usize,
    initial_len: usize,
}

impl NormAccumulator {
    /// `capacity_bound` is the number of addressable ordinals (`N + 1`);
    /// `initial_len` the starting length of a new norm array.
    pub fn new(capacity_bound: usize, initial_len: usize) -> NormAccumulator {
        NormAccumulator {
            capacity_bound,
            initial_len: initial_len.clamp(1, capacity_bound.max(1)),
        }
    }

    pub fn capacity_bound(&self) -> usize {
        self.capacity_bound
    }

    /// Records the norms of `postings` for `field` in `caches`.
    ///
    /// Every posting is validated before anything is written, so a failing
    /// call leaves the norm cache and the observed bits untouched.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `caches` was sized for a different capacity
    ///   bound than this accumulator.
    /// - `CapacityExceeded` if an ordinal is beyond the configured capacity.
    /// - `InvalidNorm` if a norm payload is not exactly one byte.
    pub fn accumulate<C>(
        &self,
        caches: &mut WorkerCacheSet<C>,
        field: &str,
        postings: &[Posting],
    ) -> Result<()> {
        if caches.capacity_bound() != self.capacity_bound {
            return Err(Error::invalid_arg(
                "caches",
                format!(
                    "capacity bound {} does not match the accumulator's {}",
                    caches.capacity_bound(),
                    self.capacity_bound
                ),
            ));
        }

        let mut resolved = Vec::with_capacity(postings.len());
        let mut max_ordinal = None;
        for posting in postings {
            if posting.ordinal as usize >= self.capacity_bound {
                return Err(Error::capacity_exceeded(
                    posting.ordinal,
                    self.capacity_bound.saturating_sub(1),
                ));
            }
            resolved.push((posting.ordinal, posting.resolve_norm(field)?));
            max_ordinal = max_ordinal.max(Some(posting.ordinal));
        }
        let Some(max_ordinal) = max_ordinal else {
            return Ok(());
        };

        let observed = caches.observed_mut();
        for &(ordinal, _) in &resolved {
            observed.set(ordinal as usize);
        }

        let initial_len = self.initial_len;
        let mut norms = caches
            .field_norms_mut()
            .remove(field)
            .unwrap_or_else(|| NormArray::new(initial_len));
        if norms.grow_to(max_ordinal as usize + 1, self.capacity_bound) {
            log::debug!("norms for '{field}' grown to {}", norms.len());
        }
        for (ordinal, norm) in resolved {
            norms.set(ordinal, norm);
        }
        caches.field_norms_mut().insert(field.to_string(), norms);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_common::error::ErrorKind;

    #[test]
    fn test_grown_len_doubles_up_to_ceiling() {
        assert_eq!(grown_len(4, 3, 100), 4);
        assert_eq!(grown_len(4, 5, 100), 8);
        assert_eq!(grown_len(4, 33, 100), 64);
        assert_eq!(grown_len(4, 65, 100), 100);
        assert_eq!(grown_len(4, 101, 100), 100);
        assert_eq!(grown_len(0, 1, 100), 1);
        assert_eq!(grown_len(64, 65, 65), 65);
    }

    #[test]
    fn test_grow_to_preserves_contents() {
        let mut norms = NormArray::new(2);
        norms.set(0, 7);
        norms.set(1, 9);
        assert!(norms.grow_to(5, 100));
        assert_eq!(norms.len(), 8);
        assert_eq!(&norms.as_bytes()[..2], &[7, 9]);
        assert!(norms.as_bytes()[2..].iter().all(|&b| b == DEFAULT_NORM));
        assert!(!norms.grow_to(3, 100));
    }

    #[test]
    fn test_vint_round_trip_and_errors() {
        for value in [0u32, 1, 127, 128, 300, 16_383, 16_384, u32::MAX] {
            assert_eq!(read_vint(&write_vint(value)).unwrap(), value);
        }
        assert_eq!(write_vint(300), vec![0xAC, 0x02]);

        let truncated = read_vint(&[0x80]).unwrap_err();
        assert!(matches!(truncated.kind(), ErrorKind::InvalidFormat { .. }));
        assert!(read_vint(&[]).is_err());
        assert!(read_vint(&[0x01, 0x02]).is_err());
        assert!(read_vint(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]).is_err());
        assert!(read_vint(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x01]).is_err());
    }

    #[test]
    fn test_posting_from_column() {
        let posting = Posting::from_column(&write_vint(1000), Some(&[42])).unwrap();
        assert_eq!(posting, Posting::with_norm(1000, 42));
        assert_eq!(posting.resolve_norm("f").unwrap(), 42);

        let posting = Posting::from_column(&[5], None).unwrap();
        assert_eq!(posting.resolve_norm("f").unwrap(), DEFAULT_NORM);
    }

    #[test]
    fn test_accumulate_defaults_and_explicit_norms() {
        let accumulator = NormAccumulator::new(11, 4);
        let mut caches = WorkerCacheSet::<()>::new(11);
        accumulator
            .accumulate(
                &mut caches,
                "title",
                &[Posting::with_norm(0, 10), Posting::new(2, None)],
            )
            .unwrap();

        let norms = caches.norms("title").unwrap();
        assert_eq!(norms.len(), 4);
        assert_eq!(norms.get(0), Some(10));
        assert_eq!(norms.get(1), Some(DEFAULT_NORM));
        assert_eq!(norms.get(2), Some(DEFAULT_NORM));
        assert!(caches.is_observed(0));
        assert!(!caches.is_observed(1));
        assert!(caches.is_observed(2));
    }

    #[test]
    fn test_accumulate_rejects_mismatched_caches() {
        let accumulator = NormAccumulator::new(11, 4);
        let mut caches = WorkerCacheSet::<()>::new(5);
        let err = accumulator
            .accumulate(&mut caches, "title", &[Posting::with_norm(7, 1)])
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::InvalidArgument { name, .. } if name == "caches"
        ));
        assert!(caches.norms("title").is_none());
        assert_eq!(caches.observed_count(), 0);
    }

    #[test]
    fn test_zero_capacity_rejects_every_ordinal() {
        let accumulator = NormAccumulator::new(0, 4);
        let mut caches = WorkerCacheSet::<()>::new(0);
        let err = accumulator
            .accumulate(&mut caches, "title", &[Posting::new(0, None)])
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::CapacityExceeded {
                ordinal: 0,
                capacity: 0
            }
        ));
        accumulator.accumulate(&mut caches, "title", &[]).unwrap();
    }

    #[test]
    fn test_accumulate_empty_postings_is_a_no_op() {
        let accumulator = NormAccumulator::new(11, 4);
        let mut caches = WorkerCacheSet::<()>::new(11);
        accumulator.accumulate(&mut caches, "title", &[]).unwrap();
        assert!(caches.norms("title").is_none());
    }

    #[test]
    fn test_failed_accumulation_changes_nothing() {
        let accumulator = NormAccumulator::new(11, 4);
        let mut caches = WorkerCacheSet::<()>::new(11);
        accumulator
            .accumulate(&mut caches, "title", &[Posting::with_norm(1, 3)])
            .unwrap();

        let err = accumulator
            .accumulate(
                &mut caches,
                "title",
                &[Posting::with_norm(2, 5), Posting::new(3, Some(vec![1, 2]))],
            )
            .unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidNorm { len: 2, .. }));

        let err = accumulator
            .accumulate(
                &mut caches,
                "title",
                &[Posting::with_norm(2, 5), Posting::new(11, None)],
            )
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::CapacityExceeded {
                ordinal: 11,
                capacity: 10
            }
        ));

        assert_eq!(caches.norms("title").unwrap().get(2), Some(DEFAULT_NORM));
        assert_eq!(caches.observed_count(), 1);
    }
}

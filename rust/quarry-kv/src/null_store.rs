//! "null" key/value store: a no-op implementation of the `KvStore` trait.

use crate::{ColumnFilter, Consistency, KvStore, RawRow};

/// A null implementation of the `KvStore` trait.
///
/// `batch_read` always succeeds with no rows, so every lookup against it
/// resolves to "no such document".
pub struct NullKvStore;

impl KvStore for NullKvStore {
    fn batch_read(
        &self,
        _keys: &[Vec<u8>],
        _filter: &ColumnFilter,
        _consistency: Consistency,
    ) -> quarry_common::Result<Vec<RawRow>> {
        Ok(Vec::new())
    }
}

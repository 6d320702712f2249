//! In-memory key/value store, useful for tests and local inspection of row
//! snapshots.

use std::{
    collections::BTreeMap,
    sync::{
        RwLock,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use quarry_common::{Result, error::Error};

use crate::{Column, ColumnFilter, Consistency, KvStore, RawRow};

type Row = BTreeMap<Vec<u8>, Vec<u8>>;

/// A `KvStore` holding all rows in memory.
///
/// Columns within a row are kept in byte-wise name order, mirroring a
/// sorted column family. The store counts every batched read it serves and
/// can be switched into an "unavailable" state where every read fails with
/// `StorageUnavailable`.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    rows: RwLock<BTreeMap<Vec<u8>, Row>>,
    reads: AtomicUsize,
    unavailable: AtomicBool,
    last_consistency: RwLock<Option<Consistency>>,
}

impl MemoryKvStore {
    pub fn new() -> MemoryKvStore {
        Default::default()
    }

    /// Inserts (or replaces) a whole row.
    pub fn insert_row(&self, row: RawRow) {
        let columns = row
            .columns
            .into_iter()
            .map(|c| (c.name, c.value))
            .collect::<Row>();
        self.write_rows().insert(row.key, columns);
    }

    /// Inserts a single column, creating the row if needed.
    pub fn insert_column(&self, key: &[u8], name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) {
        self.write_rows()
            .entry(key.to_vec())
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Removes a row; returns `true` if it existed.
    pub fn remove_row(&self, key: &[u8]) -> bool {
        self.write_rows().remove(key).is_some()
    }

    /// Returns the number of stored rows.
    pub fn row_count(&self) -> usize {
        self.read_rows().len()
    }

    /// Returns how many batched reads this store has served (or refused).
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Returns the consistency level of the most recent batched read.
    pub fn last_consistency(&self) -> Option<Consistency> {
        *self
            .last_consistency
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Makes subsequent reads fail (`true`) or succeed (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn read_rows(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<Vec<u8>, Row>> {
        self.rows
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_rows(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<Vec<u8>, Row>> {
        self.rows
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KvStore for MemoryKvStore {
    fn batch_read(
        &self,
        keys: &[Vec<u8>],
        filter: &ColumnFilter,
        consistency: Consistency,
    ) -> Result<Vec<RawRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        *self
            .last_consistency
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(consistency);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::storage_unavailable(
                "memory store",
                "store is marked unavailable",
            ));
        }

        let rows = self.read_rows();
        let result = keys
            .iter()
            .filter_map(|key| {
                let row = rows.get(key)?;
                let columns = row
                    .iter()
                    .filter(|(name, _)| filter.accepts(name))
                    .map(|(name, value)| Column::new(name.clone(), value.clone()))
                    .collect::<Vec<_>>();
                Some(RawRow::new(key.clone(), columns))
            })
            .collect::<Vec<_>>();

        log::debug!(
            "memory store: served {} of {} requested rows",
            result.len(),
            keys.len()
        );
        Ok(result)
    }
}

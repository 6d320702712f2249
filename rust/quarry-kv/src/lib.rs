//! *Key/value store* abstraction: a client for a distributed, column-oriented
//! store capable of serving batched row reads.
//!
//! A row is addressed by an opaque byte key and holds an ordered set of
//! named columns. Readers never see the store's replication or networking
//! machinery; they only issue [`KvStore::batch_read`] calls and receive
//! whatever rows the store was able to supply.

pub mod memory_store;
pub mod null_store;

use serde::{Deserialize, Serialize};

pub use memory_store::MemoryKvStore;
pub use null_store::NullKvStore;

/// A single named column within a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: Vec<u8>,
    pub value: Vec<u8>,
}

impl Column {
    pub fn new(name: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Column {
        Column {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The result of reading one row: its key plus its columns in name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub key: Vec<u8>,
    pub columns: Vec<Column>,
}

impl RawRow {
    pub fn new(key: impl Into<Vec<u8>>, columns: Vec<Column>) -> RawRow {
        RawRow {
            key: key.into(),
            columns,
        }
    }

    /// Returns the column with the given name, if present.
    pub fn column(&self, name: &[u8]) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Selects which columns of each row a batched read returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnFilter {
    /// All columns whose names fall within `[start, finish]` (byte-wise order).
    /// An empty bound is open on that side.
    Slice { start: Vec<u8>, finish: Vec<u8> },
    /// Exactly the named columns, where present.
    Names(Vec<Vec<u8>>),
}

impl ColumnFilter {
    /// A filter that accepts every column.
    pub fn all() -> ColumnFilter {
        ColumnFilter::Slice {
            start: Vec::new(),
            finish: Vec::new(),
        }
    }

    /// Returns `true` if a column with the given name passes this filter.
    pub fn accepts(&self, name: &[u8]) -> bool {
        match self {
            ColumnFilter::Slice { start, finish } => {
                (start.is_empty() || name >= start.as_slice())
                    && (finish.is_empty() || name <= finish.as_slice())
            }
            ColumnFilter::Names(names) => names.iter().any(|n| n == name),
        }
    }
}

/// Read consistency level: how many replicas must answer a read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Consistency {
    /// A single replica; lowest latency, possibly stale.
    #[default]
    One,
    Quorum,
    All,
}

/// The `KvStore` trait represents the storage client consumed by readers.
pub trait KvStore: Send + Sync + 'static {
    /// Reads the rows for `keys` in a single batched request.
    ///
    /// Implementations may return fewer rows than requested keys: a key with
    /// no stored row is simply absent from the result. Rows are returned in
    /// no particular order.
    ///
    /// # Errors
    ///
    /// Fails with `StorageUnavailable` only when the read cannot complete at
    /// all (e.g. no reachable replica). Implementations do not retry on
    /// behalf of the caller.
    fn batch_read(
        &self,
        keys: &[Vec<u8>],
        filter: &ColumnFilter,
        consistency: Consistency,
    ) -> quarry_common::Result<Vec<RawRow>>;
}

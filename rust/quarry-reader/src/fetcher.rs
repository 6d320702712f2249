//! Batched retrieval of document rows.

use std::{sync::Arc, time::Instant};

use ahash::AHashMap;
use quarry_common::Result;
use quarry_kv::{ColumnFilter, Consistency, KvStore, RawRow};

use crate::{codec::FINAL_TOKEN, key::StorageKey};

/// Issues one batched read per request for a set of document ordinals.
///
/// The fetcher holds nothing but a handle to the store and the consistency
/// level to read at. It reports the rows the store returned, keyed by
/// storage key; deciding what a missing row means is left to the caller.
#[derive(Clone)]
pub struct RowFetcher {
    store: Arc<dyn KvStore>,
    consistency: Consistency,
}

impl RowFetcher {
    pub fn new(store: Arc<dyn KvStore>, consistency: Consistency) -> RowFetcher {
        RowFetcher { store, consistency }
    }

    pub fn consistency(&self) -> Consistency {
        self.consistency
    }

    /// Reads the rows of `ordinals` within `index_name` in a single request.
    ///
    /// With an empty `fields` list every field column is requested, using a
    /// slice that stops short of the metadata column; otherwise only the
    /// named columns are requested.
    ///
    /// # Errors
    ///
    /// Propagates `StorageUnavailable` from the store. Keys without a row
    /// are not an error and are simply absent from the result.
    pub fn fetch_rows(
        &self,
        index_name: &str,
        ordinals: &[u32],
        fields: &[String],
    ) -> Result<AHashMap<StorageKey, RawRow>> {
        if ordinals.is_empty() {
            return Ok(AHashMap::new());
        }

        let keys = ordinals
            .iter()
            .map(|&ordinal| StorageKey::for_document(index_name, ordinal).into_bytes())
            .collect::<Vec<_>>();
        let filter = Self::column_filter(fields);

        let start = Instant::now();
        let rows = self.store.batch_read(&keys, &filter, self.consistency)?;
        log::debug!(
            "batch read of {} rows returned {} in {}ms",
            keys.len(),
            rows.len(),
            start.elapsed().as_millis()
        );

        Ok(rows
            .into_iter()
            .map(|row| (StorageKey::from(row.key.clone()), row))
            .collect())
    }

    fn column_filter(fields: &[String]) -> ColumnFilter {
        if fields.is_empty() {
            ColumnFilter::Slice {
                start: Vec::new(),
                finish: FINAL_TOKEN.as_bytes().to_vec(),
            }
        } else {
            ColumnFilter::Names(fields.iter().map(|f| f.as_bytes().to_vec()).collect())
        }
    }
}

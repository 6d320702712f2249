//! Document materialization with batched prefetch.

use std::{sync::Arc, time::Instant};

use ahash::AHashSet;
use quarry_common::{
    Result,
    error::{Error, ErrorKind},
};
use quarry_kv::RawRow;

use crate::{
    cache::WorkerCacheSet,
    codec,
    document::MaterializedDocument,
    fetcher::RowFetcher,
    key::StorageKey,
};

/// Options of a document lookup: additional ordinals to prefetch into the
/// cache alongside the requested one, and an optional restriction of the
/// fields to read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    prefetch: Vec<u32>,
    fields: Vec<String>,
}

impl Selection {
    pub fn new() -> Selection {
        Default::default()
    }

    pub fn with_prefetch(mut self, ordinals: impl IntoIterator<Item = u32>) -> Self {
        self.prefetch.extend(ordinals);
        self
    }

    pub fn with_fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn prefetch(&self) -> &[u32] {
        &self.prefetch
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

/// Fetches, decodes and caches documents of one logical index.
#[derive(Clone)]
pub struct DocumentAssembler {
    index_name: String,
    fetcher: RowFetcher,
}

impl DocumentAssembler {
    pub fn new(index_name: impl Into<String>, fetcher: RowFetcher) -> DocumentAssembler {
        DocumentAssembler {
            index_name: index_name.into(),
            fetcher,
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Returns the document stored for `ordinal`, or `None` if the store has
    /// no row for it.
    ///
    /// On a cache miss, one batched read covers `ordinal` plus every prefetch
    /// ordinal not already cached. Every returned row is decoded and cached,
    /// including when the requested row itself is missing. Missing prefetch
    /// rows are skipped.
    ///
    /// The cache is keyed by ordinal alone. A document read with a field
    /// restriction is cached with only those fields, and later lookups of
    /// that ordinal return it as-is, whatever their own selection, until the
    /// caches are cleared.
    ///
    /// # Errors
    ///
    /// - `StorageUnavailable` if the batched read fails.
    /// - `CorruptEncoding` if any column of any returned row fails to decode;
    ///   nothing from that read is cached.
    pub fn get_document<C>(
        &self,
        caches: &mut WorkerCacheSet<C>,
        ordinal: u32,
        selection: &Selection,
    ) -> Result<Option<Arc<MaterializedDocument>>> {
        if let Some(doc) = caches.document(ordinal) {
            log::debug!("found document {ordinal} in cache");
            return Ok(Some(Arc::clone(doc)));
        }

        let ordinals = Self::fetch_set(caches, ordinal, selection);
        if ordinals.len() > 1 {
            log::debug!("going to bulk load {} documents", ordinals.len());
        }

        let start = Instant::now();
        let mut rows = self
            .fetcher
            .fetch_rows(&self.index_name, &ordinals, selection.fields())?;

        let mut assembled = Vec::with_capacity(rows.len());
        for &doc_ordinal in &ordinals {
            let key = StorageKey::for_document(&self.index_name, doc_ordinal);
            let Some(row) = rows.remove(&key) else {
                log::warn!("missing document in batch read for: {key:?}");
                continue;
            };
            assembled.push(Arc::new(Self::assemble(doc_ordinal, row)?));
        }

        let documents = caches.documents_mut();
        let mut requested = None;
        for doc in assembled {
            if doc.ordinal() == ordinal {
                requested = Some(Arc::clone(&doc));
            }
            documents.insert(doc.ordinal(), doc);
        }

        log::debug!("document read took: {}ms", start.elapsed().as_millis());
        Ok(requested)
    }

    /// `{ordinal} ∪ prefetch`, minus ordinals already cached, requested
    /// ordinal first.
    fn fetch_set<C>(caches: &WorkerCacheSet<C>, ordinal: u32, selection: &Selection) -> Vec<u32> {
        let mut seen = AHashSet::with_capacity(selection.prefetch().len() + 1);
        seen.insert(ordinal);
        let mut ordinals = vec![ordinal];
        for &other in selection.prefetch() {
            if caches.contains_document(other) || !seen.insert(other) {
                continue;
            }
            ordinals.push(other);
        }
        ordinals
    }

    /// Decodes every field column of `row`, skipping the metadata column.
    fn assemble(ordinal: u32, row: RawRow) -> Result<MaterializedDocument> {
        let mut fields = Vec::with_capacity(row.columns.len());
        for column in &row.columns {
            if codec::is_metadata_column(&column.name) {
                log::debug!("filtering out metadata column");
                continue;
            }
            let decoded = codec::decode_column(&column.name, &column.value)
                .map_err(|e| Self::attach_ordinal(e, ordinal))?;
            fields.extend(decoded);
        }
        Ok(MaterializedDocument::new(ordinal, fields))
    }

    fn attach_ordinal(err: Error, ordinal: u32) -> Error {
        match err.into_kind() {
            ErrorKind::CorruptEncoding {
                column, message, ..
            } => Error::corrupt_encoding(Some(ordinal), column, message),
            other => other.into(),
        }
    }
}

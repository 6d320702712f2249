//! The index reader surface exposed to the search engine.
//!
//! A [`KvIndex`] holds everything that is shared and immutable across
//! workers: the configuration, the document assembler and the norm
//! accumulator. Each worker obtains its own [`WorkerReader`] from it; the
//! worker reader owns that worker's [`WorkerCacheSet`] and is the only path
//! through which the caches are read or invalidated.

use std::{sync::Arc, time::Instant};

use quarry_common::{Result, error::Error};
use quarry_kv::KvStore;

use crate::{
    assembler::{DocumentAssembler, Selection},
    cache::{Term, WorkerCacheSet},
    config::ReaderConfig,
    document::MaterializedDocument,
    fetcher::RowFetcher,
    norms::{NormAccumulator, NormArray, Posting},
};

/// A cursor over the term dictionary, created and advanced by the term
/// enumeration collaborator.
pub trait TermCursor {
    /// Positions the cursor at `term` or the first term after it.
    /// Returns `false` if no such term exists.
    fn skip_to(&mut self, term: &Term) -> Result<bool>;

    /// Number of documents containing the current term.
    fn doc_freq(&self) -> u32;
}

/// Creates term cursors for an index.
pub trait TermCursorProvider: Send + Sync + 'static {
    type Cursor: TermCursor + Clone + Send;

    fn open_cursor(&self, index_name: &str) -> Result<Self::Cursor>;
}

/// Cursor type of [`NoTermCursors`]; has no values.
#[derive(Debug, Clone)]
pub enum NoCursor {}

impl TermCursor for NoCursor {
    fn skip_to(&mut self, _term: &Term) -> Result<bool> {
        match *self {}
    }

    fn doc_freq(&self) -> u32 {
        match *self {}
    }
}

/// A provider for readers that never enumerate terms.
pub struct NoTermCursors;

impl TermCursorProvider for NoTermCursors {
    type Cursor = NoCursor;

    fn open_cursor(&self, _index_name: &str) -> Result<NoCursor> {
        Err(Error::unsupported("term enumeration"))
    }
}

/// The operations a search engine needs from a reader over the store.
///
/// Every method acts on the calling worker's caches only. Lifecycle hooks
/// (`reopen`, `commit`, `close`) invalidate those caches before returning
/// and must not run concurrently with a read on the same worker.
pub trait IndexReader {
    type Cursor;

    /// Returns the stored document for `ordinal`, or `None` if it is absent.
    fn document(
        &mut self,
        ordinal: u32,
        selection: &Selection,
    ) -> Result<Option<Arc<MaterializedDocument>>>;

    /// Norms accumulated so far for `field`; does not trigger accumulation.
    fn norms(&self, field: &str) -> Option<&NormArray>;

    /// Records the norms carried by a field's postings.
    fn accumulate_norms(&mut self, field: &str, postings: &[Posting]) -> Result<()>;

    fn check_term_cursor(&self, term: &Term) -> Option<&Self::Cursor>;

    fn put_term_cursor(&mut self, term: Term, cursor: Self::Cursor);

    /// Empties every cache of this worker.
    fn clear_all(&mut self);

    fn reopen(&mut self) -> Result<()> {
        self.clear_all();
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.clear_all();
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.clear_all();
        Ok(())
    }

    /// Live document count (`N`).
    fn num_docs(&self) -> usize;

    /// Capacity bound (`N + 1`).
    fn max_doc(&self) -> usize;

    fn has_deletions(&self) -> bool {
        false
    }

    fn is_deleted(&self, _ordinal: u32) -> bool {
        false
    }

    fn version(&self) -> u64 {
        u64::MAX
    }

    fn is_optimized(&self) -> bool {
        true
    }

    fn is_current(&self) -> bool {
        true
    }

    fn field_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn set_norm(&mut self, _ordinal: u32, _field: &str, _norm: u8) -> Result<()> {
        Err(Error::unsupported("set norm"))
    }

    fn term_freq_vector_mapper(&self, _ordinal: u32, _field: Option<&str>) -> Result<()> {
        Err(Error::unsupported("term vector mapper"))
    }

    fn term_freq_vectors(&self, _ordinal: u32) -> Result<()> {
        Err(Error::unsupported("term frequency vectors"))
    }
}

/// Shared, per-index state. Cheap to share across workers behind an `Arc`.
pub struct KvIndex<P> {
    config: ReaderConfig,
    assembler: DocumentAssembler,
    accumulator: NormAccumulator,
    cursors: P,
}

impl KvIndex<NoTermCursors> {
    /// Opens an index that serves documents and norms but no term cursors.
    pub fn open(config: ReaderConfig, store: Arc<dyn KvStore>) -> Result<Arc<Self>> {
        KvIndex::with_cursor_provider(config, store, NoTermCursors)
    }
}

impl<P: TermCursorProvider> KvIndex<P> {
    pub fn with_cursor_provider(
        config: ReaderConfig,
        store: Arc<dyn KvStore>,
        cursors: P,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let fetcher = RowFetcher::new(store, config.consistency);
        let assembler = DocumentAssembler::new(config.index_name.clone(), fetcher);
        let accumulator =
            NormAccumulator::new(config.capacity_bound(), config.clamped_initial_norms_len());
        Ok(Arc::new(KvIndex {
            config,
            assembler,
            accumulator,
            cursors,
        }))
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    pub fn cursor_provider(&self) -> &P {
        &self.cursors
    }

    /// Creates a reader for one worker, with empty caches.
    pub fn worker(self: &Arc<Self>) -> WorkerReader<P> {
        WorkerReader {
            index: Arc::clone(self),
            caches: WorkerCacheSet::new(self.config.capacity_bound()),
        }
    }
}

/// A worker's view of a [`KvIndex`]: the shared index plus this worker's
/// private caches.
pub struct WorkerReader<P: TermCursorProvider> {
    index: Arc<KvIndex<P>>,
    caches: WorkerCacheSet<P::Cursor>,
}

impl<P: TermCursorProvider> WorkerReader<P> {
    pub fn index(&self) -> &Arc<KvIndex<P>> {
        &self.index
    }

    pub fn caches(&self) -> &WorkerCacheSet<P::Cursor> {
        &self.caches
    }

    /// Number of documents containing `term`, positioning (and caching) a
    /// term cursor on first use.
    pub fn doc_freq(&mut self, term: &Term) -> Result<u32> {
        if let Some(cursor) = self.caches.check_term_cursor(term) {
            return Ok(cursor.doc_freq());
        }

        let start = Instant::now();
        let mut cursor = self.index.cursors.open_cursor(self.index.index_name())?;
        cursor.skip_to(term)?;
        log::debug!("doc_freq() took: {}ms", start.elapsed().as_millis());

        let freq = cursor.doc_freq();
        self.caches.put_term_cursor(term.clone(), cursor);
        Ok(freq)
    }

    /// A cursor positioned at `term`, reusing a cached one if present.
    /// Returns `None` if the term cannot be positioned.
    pub fn terms_from(&mut self, term: &Term) -> Result<Option<P::Cursor>> {
        let mut cursor = match self.caches.check_term_cursor(term) {
            Some(cached) => cached.clone(),
            None => self.index.cursors.open_cursor(self.index.index_name())?,
        };
        if cursor.skip_to(term)? {
            Ok(Some(cursor))
        } else {
            Ok(None)
        }
    }

    /// Drops every cached entry; used when the engine asks for the backing
    /// directory, which has no persistent state of its own.
    pub fn reset(&mut self) {
        self.caches.clear_all();
    }
}

impl<P: TermCursorProvider> IndexReader for WorkerReader<P> {
    type Cursor = P::Cursor;

    fn document(
        &mut self,
        ordinal: u32,
        selection: &Selection,
    ) -> Result<Option<Arc<MaterializedDocument>>> {
        self.index
            .assembler
            .get_document(&mut self.caches, ordinal, selection)
    }

    fn norms(&self, field: &str) -> Option<&NormArray> {
        self.caches.norms(field)
    }

    fn accumulate_norms(&mut self, field: &str, postings: &[Posting]) -> Result<()> {
        self.index
            .accumulator
            .accumulate(&mut self.caches, field, postings)
    }

    fn check_term_cursor(&self, term: &Term) -> Option<&P::Cursor> {
        self.caches.check_term_cursor(term)
    }

    fn put_term_cursor(&mut self, term: Term, cursor: P::Cursor) {
        self.caches.put_term_cursor(term, cursor);
    }

    fn clear_all(&mut self) {
        self.caches.clear_all();
    }

    fn num_docs(&self) -> usize {
        self.index.config.num_docs()
    }

    fn max_doc(&self) -> usize {
        self.index.config.capacity_bound()
    }
}

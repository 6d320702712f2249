//! Document and norm reader over a distributed, column-oriented key/value
//! store.
//!
//! This crate lets a full-text search engine read stored documents and
//! per-field norms from a [`quarry_kv::KvStore`] instead of local index
//! files. Its pieces, leaves first:
//!
//! - [`codec`]: the stored-field column encoding (trailing type tag,
//!   delimiter-joined multi-values).
//! - [`fetcher::RowFetcher`]: one batched row read per request.
//! - [`assembler::DocumentAssembler`]: decode rows into
//!   [`document::MaterializedDocument`]s, with opportunistic prefetch.
//! - [`norms::NormAccumulator`]: per-field norm arrays built from postings.
//! - [`cache::WorkerCacheSet`]: the per-worker caches and their
//!   invalidation.
//! - [`reader`]: the [`reader::IndexReader`] surface, tying the above
//!   together for one worker.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use quarry_kv::{Column, MemoryKvStore, RawRow};
//! use quarry_reader::{
//!     IndexReader, KvIndex, ReaderConfig, Selection, StorageKey, codec::encode_text,
//! };
//!
//! let store = Arc::new(MemoryKvStore::new());
//! store.insert_row(RawRow::new(
//!     StorageKey::for_document("books", 7).into_bytes(),
//!     vec![Column::new("title", encode_text(&["Dune"]).unwrap())],
//! ));
//!
//! let index = KvIndex::open(ReaderConfig::new("books"), store).unwrap();
//! let mut reader = index.worker();
//! let doc = reader.document(7, &Selection::new()).unwrap().unwrap();
//! assert_eq!(doc.texts("title").collect::<Vec<_>>(), vec!["Dune"]);
//! ```

pub mod assembler;
pub mod cache;
pub mod codec;
pub mod config;
pub mod document;
pub mod fetcher;
pub mod key;
pub mod norms;
pub mod reader;

pub use assembler::{DocumentAssembler, Selection};
pub use cache::{CacheStats, Term, WorkerCacheSet};
pub use config::ReaderConfig;
pub use document::{FieldKind, FieldValue, MaterializedDocument, StoredField};
pub use key::StorageKey;
pub use norms::{DEFAULT_NORM, NormAccumulator, NormArray, Posting};
pub use reader::{
    IndexReader, KvIndex, NoCursor, NoTermCursors, TermCursor, TermCursorProvider, WorkerReader,
};

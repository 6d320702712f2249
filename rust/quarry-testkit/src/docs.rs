//! Encoded document rows and populated stores.

use std::sync::Arc;

use quarry_kv::{Column, MemoryKvStore, RawRow};
use quarry_reader::{
    StorageKey,
    codec::{METADATA_COLUMN, encode_binary, encode_text},
};

/// Builds the stored row of one document.
#[derive(Debug, Clone)]
pub struct DocBuilder {
    index_name: String,
    ordinal: u32,
    columns: Vec<Column>,
}

impl DocBuilder {
    pub fn new(index_name: &str, ordinal: u32) -> DocBuilder {
        DocBuilder {
            index_name: index_name.to_string(),
            ordinal,
            columns: Vec::new(),
        }
    }

    /// Adds a text field; several values make it multi-valued.
    ///
    /// Panics if `values` cannot be encoded; use [`raw`](Self::raw) for
    /// arbitrary column bytes.
    pub fn text(mut self, name: &str, values: &[&str]) -> Self {
        let encoded = encode_text(values).expect("encodable text values");
        self.columns.push(Column::new(name, encoded));
        self
    }

    pub fn binary(mut self, name: &str, bytes: &[u8]) -> Self {
        self.columns.push(Column::new(name, encode_binary(bytes)));
        self
    }

    /// Adds a column with an arbitrary, possibly malformed, value.
    pub fn raw(mut self, name: &str, value: &[u8]) -> Self {
        self.columns.push(Column::new(name, value.to_vec()));
        self
    }

    /// Adds the reserved metadata column.
    pub fn metadata(self, value: &[u8]) -> Self {
        self.raw(METADATA_COLUMN, value)
    }

    pub fn key(&self) -> StorageKey {
        StorageKey::for_document(&self.index_name, self.ordinal)
    }

    pub fn build(self) -> RawRow {
        RawRow::new(self.key().into_bytes(), self.columns)
    }

    pub fn insert_into(self, store: &MemoryKvStore) {
        store.insert_row(self.build());
    }
}

/// A store holding one document per ordinal in `ordinals`, each with a
/// `title` of `"doc {ordinal}"`, a multi-valued `tags` field and a binary
/// `id` field holding the big-endian ordinal.
pub fn store_with_docs(
    index_name: &str,
    ordinals: impl IntoIterator<Item = u32>,
) -> Arc<MemoryKvStore> {
    let store = Arc::new(MemoryKvStore::new());
    for ordinal in ordinals {
        sample_doc(index_name, ordinal).insert_into(&store);
    }
    store
}

/// The document [`store_with_docs`] stores for `ordinal`.
pub fn sample_doc(index_name: &str, ordinal: u32) -> DocBuilder {
    let title = format!("doc {ordinal}");
    DocBuilder::new(index_name, ordinal)
        .text("title", &[title.as_str()])
        .text("tags", &["alpha", "beta"])
        .binary("id", &ordinal.to_be_bytes())
        .metadata(b"meta")
}

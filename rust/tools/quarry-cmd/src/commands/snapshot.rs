//! JSON row snapshots, loaded into an in-memory store.
//!
//! A snapshot is a list of rows:
//!
//! ```json
//! [
//!   { "ordinal": 7, "columns": {
//!       "title": { "text": ["Dune"] },
//!       "cover": { "binary_hex": "89504e47" },
//!       "legacy": { "raw_hex": "616280" } } }
//! ]
//! ```
//!
//! `text` and `binary_hex` are encoded the way the indexer writes them;
//! `raw_hex` is stored verbatim, tag included.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use quarry_kv::{Column, MemoryKvStore, RawRow};
use quarry_reader::{StorageKey, codec};
use serde::Deserialize;

use crate::utils::parse_hex;

#[derive(Debug, Deserialize)]
pub struct SnapshotRow {
    pub ordinal: u32,
    #[serde(default)]
    pub columns: BTreeMap<String, SnapshotColumn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotColumn {
    Text(Vec<String>),
    BinaryHex(String),
    RawHex(String),
}

impl SnapshotColumn {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(match self {
            SnapshotColumn::Text(values) => codec::encode_text(values)?,
            SnapshotColumn::BinaryHex(hex) => codec::encode_binary(&parse_hex(hex)?),
            SnapshotColumn::RawHex(hex) => parse_hex(hex)?,
        })
    }
}

/// Parses snapshot JSON into rows.
pub fn parse(json: &str) -> Result<Vec<SnapshotRow>> {
    serde_json::from_str(json).with_context(|| "Failed to parse row snapshot")
}

/// Writes `rows` of `index_name` into a fresh in-memory store.
pub fn load(index_name: &str, rows: &[SnapshotRow]) -> Result<MemoryKvStore> {
    let store = MemoryKvStore::new();
    for row in rows {
        let columns = row
            .columns
            .iter()
            .map(|(name, column)| {
                let value = column.encode().with_context(|| {
                    format!("Invalid column '{}' of ordinal {}", name, row.ordinal)
                })?;
                Ok(Column::new(name.as_str(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        store.insert_row(RawRow::new(
            StorageKey::for_document(index_name, row.ordinal).into_bytes(),
            columns,
        ));
    }
    log::debug!("loaded {} snapshot rows for '{}'", rows.len(), index_name);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_kv::{ColumnFilter, Consistency, KvStore};

    const SNAPSHOT: &str = r#"[
        { "ordinal": 7, "columns": {
            "title": { "text": ["Dune", "Messiah"] },
            "cover": { "binary_hex": "cafe" },
            "legacy": { "raw_hex": "616280" } } },
        { "ordinal": 8 }
    ]"#;

    #[test]
    fn test_parse_and_load() {
        let rows = parse(SNAPSHOT).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].columns.is_empty());

        let store = load("books", &rows).unwrap();
        assert_eq!(store.row_count(), 2);

        let key = StorageKey::for_document("books", 7).into_bytes();
        let read = store
            .batch_read(&[key], &ColumnFilter::all(), Consistency::One)
            .unwrap();
        let row = &read[0];
        assert_eq!(row.column(b"cover").unwrap().value, vec![0xca, 0xfe, 0x7f]);
        assert_eq!(row.column(b"legacy").unwrap().value, b"ab\x80".to_vec());
        assert_eq!(
            row.column(b"title").unwrap().value,
            codec::encode_text(&["Dune", "Messiah"]).unwrap()
        );
    }

    #[test]
    fn test_bad_hex_names_column() {
        let rows = parse(r#"[{ "ordinal": 3, "columns": { "c": { "binary_hex": "zz" } } }]"#)
            .unwrap();
        let err = load("books", &rows).unwrap_err();
        assert!(err.to_string().contains("Invalid column 'c' of ordinal 3"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(parse(r#"{ "ordinal": 1 }"#).is_err());
        assert!(parse(r#"[{ "ordinal": 1, "columns": { "c": { "numbers": [1] } } }]"#).is_err());
    }
}

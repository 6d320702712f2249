//! Storage keys of document rows.

use std::fmt;

use crate::codec::DELIMITER_BYTES;

/// Row key of a stored document: the index name, the delimiter, and the
/// ordinal rendered as lowercase hexadecimal text without padding.
///
/// The mapping is pure: the same `(index, ordinal)` always yields the same
/// key, and two ordinals of one index never share a key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(Vec<u8>);

impl StorageKey {
    pub fn for_document(index_name: &str, ordinal: u32) -> StorageKey {
        let hex = format!("{ordinal:x}");
        let mut key = Vec::with_capacity(index_name.len() + DELIMITER_BYTES.len() + hex.len());
        key.extend_from_slice(index_name.as_bytes());
        key.extend_from_slice(DELIMITER_BYTES);
        key.extend_from_slice(hex.as_bytes());
        StorageKey(key)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for StorageKey {
    fn from(bytes: Vec<u8>) -> Self {
        StorageKey(bytes)
    }
}

impl AsRef<[u8]> for StorageKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for StorageKey {
    /// Lowercase hex of the raw key bytes.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

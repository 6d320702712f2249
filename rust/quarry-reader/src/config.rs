//! Reader configuration.

use quarry_common::{Result, error::Error, verify_arg};
use quarry_kv::Consistency;
use serde::{Deserialize, Serialize};

/// Default capacity `N` of a logical index.
pub const DEFAULT_MAX_DOCS: u32 = 131_072;

/// Default starting length of a per-field norm array.
pub const DEFAULT_INITIAL_NORMS_LEN: usize = 1024;

/// Configuration of one logical index reader.
///
/// The capacity is configured, never discovered from the store. Ordinals
/// live in `[0, max_docs]`, so the reader reports `max_docs` as its
/// document count and `max_docs + 1` as its capacity bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    pub index_name: String,
    #[serde(default = "default_max_docs")]
    pub max_docs: u32,
    #[serde(default = "default_initial_norms_len")]
    pub initial_norms_len: usize,
    #[serde(default)]
    pub consistency: Consistency,
}

fn default_max_docs() -> u32 {
    DEFAULT_MAX_DOCS
}

fn default_initial_norms_len() -> usize {
    DEFAULT_INITIAL_NORMS_LEN
}

impl ReaderConfig {
    pub fn new(index_name: impl Into<String>) -> ReaderConfig {
        ReaderConfig {
            index_name: index_name.into(),
            max_docs: DEFAULT_MAX_DOCS,
            initial_norms_len: DEFAULT_INITIAL_NORMS_LEN,
            consistency: Consistency::One,
        }
    }

    pub fn with_max_docs(mut self, max_docs: u32) -> Self {
        self.max_docs = max_docs;
        self
    }

    pub fn with_initial_norms_len(mut self, len: usize) -> Self {
        self.initial_norms_len = len;
        self
    }

    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.consistency = consistency;
        self
    }

    /// Parses and validates a JSON configuration document.
    pub fn from_json(json: &str) -> Result<ReaderConfig> {
        let config: ReaderConfig = serde_json::from_str(json)
            .map_err(|e| Error::invalid_format("reader config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        verify_arg!(index_name, !self.index_name.is_empty());
        verify_arg!(max_docs, self.max_docs > 0);
        verify_arg!(initial_norms_len, self.initial_norms_len > 0);
        Ok(())
    }

    /// The live document count reported to callers (`N`).
    pub fn num_docs(&self) -> usize {
        self.max_docs as usize
    }

    /// Number of addressable ordinals (`N + 1`). Bounds the norm arrays and
    /// the observed-ordinal bit set.
    pub fn capacity_bound(&self) -> usize {
        self.max_docs as usize + 1
    }

    /// Starting norm array length, clamped to the capacity bound.
    pub fn clamped_initial_norms_len(&self) -> usize {
        self.initial_norms_len.min(self.capacity_bound())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_common::error::ErrorKind;

    #[test]
    fn test_defaults_from_json() {
        let config = ReaderConfig::from_json(r#"{ "index_name": "books" }"#).unwrap();
        assert_eq!(config, ReaderConfig::new("books"));
        assert_eq!(config.num_docs(), DEFAULT_MAX_DOCS as usize);
        assert_eq!(config.capacity_bound(), config.num_docs() + 1);
        assert_eq!(config.capacity_bound(), DEFAULT_MAX_DOCS as usize + 1);
        assert_eq!(config.consistency, Consistency::One);
    }

    #[test]
    fn test_explicit_values_from_json() {
        let config = ReaderConfig::from_json(
            r#"{ "index_name": "books", "max_docs": 10, "initial_norms_len": 64, "consistency": "all" }"#,
        )
        .unwrap();
        assert_eq!(config.max_docs, 10);
        assert_eq!(config.capacity_bound(), 11);
        assert_eq!(config.clamped_initial_norms_len(), 11);
        assert_eq!(config.consistency, Consistency::All);
    }

    #[test]
    fn test_invalid_config() {
        let err = ReaderConfig::from_json(r#"{ "index_name": "" }"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { name, .. } if name == "index_name"));

        let err = ReaderConfig::from_json(r#"{ "index_name": "x", "max_docs": 0 }"#).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument { name, .. } if name == "max_docs"));

        let err = ReaderConfig::from_json("not json").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
    }
}

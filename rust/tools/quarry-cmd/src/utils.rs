//! Common utilities for quarry-cmd

use anyhow::{Context, Result};
use std::path::Path;

/// Checks if a file exists and is readable
pub fn validate_file_exists(path: &str) -> Result<()> {
    let file_path = Path::new(path);
    if !file_path.exists() {
        anyhow::bail!("File does not exist: {}", path);
    }
    if !file_path.is_file() {
        anyhow::bail!("Path is not a file: {}", path);
    }
    Ok(())
}

/// Reads a whole file into a string, naming the path on failure.
pub fn read_to_string(path: &str) -> Result<String> {
    validate_file_exists(path)?;
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
}

/// Parses a hex string (case-insensitive, optional `0x` prefix) into bytes.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    let text = text.strip_prefix("0x").unwrap_or(text);
    if text.len() % 2 != 0 {
        anyhow::bail!("Hex string has odd length: {}", text.len());
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            let pair = text
                .get(i..i + 2)
                .ok_or_else(|| anyhow::anyhow!("Invalid hex at offset {}", i))?;
            u8::from_str_radix(pair, 16)
                .with_context(|| format!("Invalid hex digits '{}' at offset {}", pair, i))
        })
        .collect()
}

/// Lowercase hex rendering of `bytes`.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("00ff7F").unwrap(), vec![0x00, 0xff, 0x7f]);
        assert_eq!(parse_hex("0x80").unwrap(), vec![0x80]);
        assert!(parse_hex("").unwrap().is_empty());
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
        assert!(parse_hex("éa").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(to_hex(&[0xef, 0xbf, 0xbf, 0x01]), "efbfbf01");
    }

    #[test]
    fn test_validate_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        assert!(validate_file_exists(path.to_str().unwrap()).is_err());
        assert!(validate_file_exists(dir.path().to_str().unwrap()).is_err());
    }
}

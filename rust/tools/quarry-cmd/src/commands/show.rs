use std::sync::Arc;

use anyhow::{Context, Result};

use quarry_reader::{IndexReader, KvIndex, ReaderConfig, Selection};

use crate::{commands::format_field, commands::snapshot, utils::read_to_string};

pub fn run(
    snapshot_path: String,
    config_path: String,
    prefetch: Vec<u32>,
    fields: Vec<String>,
    ordinal: u32,
) -> Result<()> {
    let config = ReaderConfig::from_json(&read_to_string(&config_path)?)
        .with_context(|| format!("Invalid reader config: {}", config_path))?;
    let rows = snapshot::parse(&read_to_string(&snapshot_path)?)?;

    for line in show_document(config, &rows, prefetch, fields, ordinal)? {
        println!("{}", line);
    }
    Ok(())
}

fn show_document(
    config: ReaderConfig,
    rows: &[snapshot::SnapshotRow],
    prefetch: Vec<u32>,
    fields: Vec<String>,
    ordinal: u32,
) -> Result<Vec<String>> {
    let store = Arc::new(snapshot::load(&config.index_name, rows)?);
    let index = KvIndex::open(config, store)?;
    let mut reader = index.worker();

    let selection = Selection::new().with_prefetch(prefetch).with_fields(fields);
    let Some(doc) = reader
        .document(ordinal, &selection)
        .with_context(|| format!("Failed to read document {}", ordinal))?
    else {
        return Ok(vec![format!("No document found for ordinal {}", ordinal)]);
    };

    let mut lines = vec![format!(
        "Document {} ({} field values)",
        doc.ordinal(),
        doc.len()
    )];
    lines.extend(doc.fields().iter().map(|f| format!("  {}", format_field(f))));

    let stats = reader.caches().stats();
    lines.push(format!(
        "Cached documents: {}",
        stats.documents.unwrap_or(0)
    ));
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"[
        { "ordinal": 1, "columns": {
            "title": { "text": ["First"] },
            "tags": { "text": ["a", "b"] },
            "id": { "binary_hex": "01" } } },
        { "ordinal": 2, "columns": { "title": { "text": ["Second"] } } },
        { "ordinal": 3, "columns": { "title": { "raw_hex": "78797a01" } } }
    ]"#;

    fn rows() -> Vec<snapshot::SnapshotRow> {
        snapshot::parse(SNAPSHOT).unwrap()
    }

    #[test]
    fn test_show_document_with_prefetch() {
        let lines = show_document(
            ReaderConfig::new("books"),
            &rows(),
            vec![2],
            Vec::new(),
            1,
        )
        .unwrap();
        assert_eq!(lines[0], "Document 1 (4 field values)");
        assert!(lines.contains(&"  id: 0x01".to_string()));
        assert!(lines.contains(&"  tags: a".to_string()));
        assert!(lines.contains(&"  tags: b".to_string()));
        assert!(lines.contains(&"  title: First".to_string()));
        assert_eq!(lines.last().unwrap(), "Cached documents: 2");
    }

    #[test]
    fn test_show_restricted_fields() {
        let lines = show_document(
            ReaderConfig::new("books"),
            &rows(),
            Vec::new(),
            vec!["title".to_string()],
            1,
        )
        .unwrap();
        assert_eq!(
            lines,
            vec![
                "Document 1 (1 field values)",
                "  title: First",
                "Cached documents: 1"
            ]
        );
    }

    #[test]
    fn test_show_missing_document() {
        let lines =
            show_document(ReaderConfig::new("books"), &rows(), Vec::new(), Vec::new(), 9).unwrap();
        assert_eq!(lines, vec!["No document found for ordinal 9"]);
    }

    #[test]
    fn test_show_corrupt_document() {
        let err = show_document(ReaderConfig::new("books"), &rows(), Vec::new(), Vec::new(), 3)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read document 3"));
    }

    #[test]
    fn test_run_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot_path = dir.path().join("rows.json");
        let config_path = dir.path().join("config.json");
        std::fs::File::create(&snapshot_path)
            .unwrap()
            .write_all(SNAPSHOT.as_bytes())
            .unwrap();
        std::fs::File::create(&config_path)
            .unwrap()
            .write_all(br#"{ "index_name": "books", "max_docs": 16 }"#)
            .unwrap();

        run(
            snapshot_path.to_string_lossy().into_owned(),
            config_path.to_string_lossy().into_owned(),
            Vec::new(),
            Vec::new(),
            2,
        )
        .unwrap();

        let err = run(
            dir.path().join("nope.json").to_string_lossy().into_owned(),
            config_path.to_string_lossy().into_owned(),
            Vec::new(),
            Vec::new(),
            2,
        )
        .unwrap_err();
        assert!(err.to_string().contains("File does not exist"));
    }
}

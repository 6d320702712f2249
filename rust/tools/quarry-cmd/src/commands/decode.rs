use anyhow::{Context, Result};

use quarry_reader::{StoredField, codec};

use crate::{commands::format_field, utils::parse_hex};

pub fn run(column: String, hex: String) -> Result<()> {
    for line in decode_lines(&column, &hex)? {
        println!("{}", line);
    }
    Ok(())
}

fn decode_lines(column: &str, hex: &str) -> Result<Vec<String>> {
    let value = parse_hex(hex)?;
    let fields: Vec<StoredField> = codec::decode_column(column.as_bytes(), &value)
        .with_context(|| format!("Failed to decode column '{}'", column))?;
    Ok(fields.iter().map(format_field).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::to_hex;
    use quarry_reader::codec::{encode_binary, encode_text};

    #[test]
    fn test_decode_text_values() {
        let hex = to_hex(&encode_text(&["red", "green"]).unwrap());
        assert_eq!(
            decode_lines("colors", &hex).unwrap(),
            vec!["colors: red", "colors: green"]
        );
    }

    #[test]
    fn test_decode_binary_value() {
        let hex = to_hex(&encode_binary(&[0xca, 0xfe]));
        assert_eq!(decode_lines("blob", &hex).unwrap(), vec!["blob: 0xcafe"]);
    }

    #[test]
    fn test_decode_unknown_tag_fails() {
        let err = decode_lines("x", "616201").unwrap_err();
        assert!(err.to_string().contains("Failed to decode column 'x'"));
    }
}

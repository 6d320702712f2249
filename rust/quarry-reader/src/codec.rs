//! Stored-field column encoding.
//!
//! Every stored field is written to one column whose value is the payload
//! followed by a single trailing type tag:
//!
//! - [`BINARY_TAG`] (`0x7F`): the payload is opaque bytes, kept verbatim.
//! - [`TEXT_TAG`] (`0x80`): the payload is UTF-8 text. A multi-valued text
//!   field joins its values with [`DELIMITER`] (U+FFFF); decoding splits the
//!   text back into one field entry per non-empty token, in order.
//!
//! This layout must be reproduced byte-for-byte to stay readable against
//! data already in the store.

use quarry_common::{Result, error::Error, verify_arg};

use crate::document::{FieldValue, StoredField};

/// Trailing tag of a binary column value.
pub const BINARY_TAG: u8 = 0x7F;

/// Trailing tag of a text column value.
pub const TEXT_TAG: u8 = 0x80;

/// Separator between multiple values of a text field, and between the
/// index name and the ordinal within a storage key.
pub const DELIMITER: char = '\u{FFFF}';

/// UTF-8 encoding of [`DELIMITER`].
pub const DELIMITER_BYTES: &[u8] = "\u{FFFF}".as_bytes();

/// Reserved column carrying per-document index metadata. Never a field.
pub const METADATA_COLUMN: &str = "\u{FFFF}META\u{FFFF}";

/// Upper bound of an "all fields" column slice. Sorts below
/// [`METADATA_COLUMN`], so a slice ending here leaves the metadata out.
pub const FINAL_TOKEN: &str = "\u{FFFE}\u{FFFE}";

/// Returns `true` for the reserved metadata column name.
#[inline]
pub fn is_metadata_column(name: &[u8]) -> bool {
    name == METADATA_COLUMN.as_bytes()
}

/// Decodes one stored column into its field entries.
///
/// Binary values yield exactly one entry. Text values yield one entry per
/// non-empty delimiter-separated token, or a single entry when the text
/// has no delimiter.
///
/// # Errors
///
/// Fails with `CorruptEncoding` if the value is empty or its trailing byte
/// is neither [`BINARY_TAG`] nor [`TEXT_TAG`].
pub fn decode_column(name: &[u8], value: &[u8]) -> Result<Vec<StoredField>> {
    let field_name = String::from_utf8_lossy(name);
    let Some((&tag, payload)) = value.split_last() else {
        return Err(Error::corrupt_encoding(None, field_name, "empty column value"));
    };

    match tag {
        BINARY_TAG => Ok(vec![StoredField::new(
            field_name,
            FieldValue::Binary(payload.to_vec()),
        )]),
        TEXT_TAG => {
            let text = String::from_utf8_lossy(payload);
            if text.contains(DELIMITER) {
                Ok(text
                    .split(DELIMITER)
                    .filter(|token| !token.is_empty())
                    .map(|token| {
                        StoredField::new(&*field_name, FieldValue::Text(token.to_string()))
                    })
                    .collect())
            } else {
                Ok(vec![StoredField::new(
                    field_name,
                    FieldValue::Text(text.into_owned()),
                )])
            }
        }
        other => Err(Error::corrupt_encoding(
            None,
            field_name,
            format!("unknown type tag 0x{other:02x}"),
        )),
    }
}

/// Encodes the values of a text field into a column value.
///
/// Only inputs that [`decode_column`] reproduces exactly are accepted: at
/// least one value, no value containing [`DELIMITER`], and no empty value
/// unless it is the only one.
///
/// # Errors
///
/// Fails with `InvalidArgument` for any other input.
pub fn encode_text<S: AsRef<str>>(values: &[S]) -> Result<Vec<u8>> {
    verify_arg!(values, !values.is_empty());

    let mut encoded = Vec::new();
    for (i, value) in values.iter().enumerate() {
        let value = value.as_ref();
        if value.contains(DELIMITER) {
            return Err(Error::invalid_arg(
                "values",
                format!("value {i} contains the multi-value delimiter"),
            ));
        }
        if value.is_empty() && values.len() > 1 {
            return Err(Error::invalid_arg(
                "values",
                format!("value {i} is empty in a multi-valued field"),
            ));
        }
        if i > 0 {
            encoded.extend_from_slice(DELIMITER_BYTES);
        }
        encoded.extend_from_slice(value.as_bytes());
    }
    encoded.push(TEXT_TAG);
    Ok(encoded)
}

/// Encodes a binary field into a column value.
pub fn encode_binary(bytes: &[u8]) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(bytes.len() + 1);
    encoded.extend_from_slice(bytes);
    encoded.push(BINARY_TAG);
    encoded
}

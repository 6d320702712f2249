//! Command implementations for quarry-cmd

use quarry_reader::{FieldValue, StoredField};

use crate::utils::to_hex;

pub mod decode;
pub mod key;
pub mod show;
pub mod snapshot;

/// Renders one decoded field as a `name: value` line. Binary values are
/// shown as hex.
pub fn format_field(field: &StoredField) -> String {
    match &field.value {
        FieldValue::Text(text) => format!("{}: {}", field.name, text),
        FieldValue::Binary(bytes) => format!("{}: 0x{}", field.name, to_hex(bytes)),
    }
}

//! Materialized documents and their stored fields.

/// The kind of a stored field value, as recorded by its column type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Binary,
    Text,
}

/// A single stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Binary(Vec<u8>),
    Text(String),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Binary(_) => FieldKind::Binary,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Binary(_) => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Binary(b) => Some(b),
            FieldValue::Text(_) => None,
        }
    }
}

/// One decoded field entry. A multi-valued field appears as several
/// entries with the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredField {
    pub name: String,
    pub value: FieldValue,
}

impl StoredField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> StoredField {
        StoredField {
            name: name.into(),
            value,
        }
    }

    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }
}

/// A fully decoded document, keyed by the ordinal it was read for.
///
/// Documents are immutable once assembled; the cache hands out shared
/// references to the same instance on every hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedDocument {
    ordinal: u32,
    fields: Vec<StoredField>,
}

impl MaterializedDocument {
    pub fn new(ordinal: u32, fields: Vec<StoredField>) -> MaterializedDocument {
        MaterializedDocument { ordinal, fields }
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// All field entries, in column order.
    pub fn fields(&self) -> &[StoredField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Values of every entry named `name`, in order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.name == name)
            .map(|f| &f.value)
    }

    /// Text values of every entry named `name`, in order.
    pub fn texts<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.values(name).filter_map(FieldValue::as_text)
    }

    /// First value named `name`.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }
}

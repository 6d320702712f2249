use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn corrupt_encoding(
        ordinal: Option<u32>,
        column: impl Into<String>,
        message: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::CorruptEncoding {
                ordinal,
                column: column.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn storage_unavailable<E>(context: impl Into<String>, source: E) -> Error
    where
        E: Into<StdErrorBoxed>,
    {
        Error(
            ErrorKind::StorageUnavailable {
                context: context.into(),
                source: source.into(),
            }
            .into(),
        )
    }

    pub fn capacity_exceeded(ordinal: u32, capacity: usize) -> Error {
        Error(ErrorKind::CapacityExceeded { ordinal, capacity }.into())
    }

    pub fn invalid_norm(field: impl Into<String>, len: usize) -> Error {
        Error(
            ErrorKind::InvalidNorm {
                field: field.into(),
                len,
            }
            .into(),
        )
    }

    pub fn unsupported(operation: impl Into<String>) -> Error {
        Error(
            ErrorKind::Unsupported {
                operation: operation.into(),
            }
            .into(),
        )
    }

    pub fn invalid_format(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidFormat {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    /// Returns `true` if this is a `CorruptEncoding` error.
    pub fn is_corrupt_encoding(&self) -> bool {
        matches!(self.kind(), ErrorKind::CorruptEncoding { .. })
    }

    /// Returns `true` if this is a `StorageUnavailable` error.
    pub fn is_storage_unavailable(&self) -> bool {
        matches!(self.kind(), ErrorKind::StorageUnavailable { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A stored column value does not carry a recognized trailing type tag.
    #[error(
        "field is not properly encoded: {}({column}): {message}",
        ordinal_label(.ordinal)
    )]
    CorruptEncoding {
        ordinal: Option<u32>,
        column: String,
        message: String,
    },

    /// The batched storage read could not complete at all.
    #[error("storage unavailable for '{context}': {source}")]
    StorageUnavailable {
        context: String,
        source: StdErrorBoxed,
    },

    #[error("ordinal {ordinal} exceeds the capacity bound {capacity}")]
    CapacityExceeded { ordinal: u32, capacity: usize },

    #[error("norm for field '{field}' must be a single byte, got {len} bytes")]
    InvalidNorm { field: String, len: usize },

    #[error("operation is not supported: {operation}")]
    Unsupported { operation: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid format for '{element}': {message}")]
    InvalidFormat { element: String, message: String },
}

fn ordinal_label(ordinal: &Option<u32>) -> String {
    ordinal.map_or_else(|| "?".to_string(), |o| o.to_string())
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

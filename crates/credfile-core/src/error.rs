#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record index {index} is out of range (store holds {count} rows)")]
    IndexOutOfRange { index: i64, count: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a single row could not be decoded into a [`Record`](crate::Record).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("expected 4 fields, found {found}")]
    FieldCount { found: usize },

    #[error("invalid row syntax: {0}")]
    Syntax(&'static str),

    #[error("row is not valid UTF-8")]
    InvalidUtf8,
}

//! Credential records and the snapshot types returned by store queries.

use serde::Serialize;

use crate::error::CodecError;

// ==============================================================================
// Record
// ==============================================================================

/// One stored credential. Field order matches the on-disk column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Record {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Fields in column order: name, username, email, password.
    pub fn fields(&self) -> [&str; 4] {
        [
            self.name.as_str(),
            self.username.as_str(),
            self.email.as_str(),
            self.password.as_str(),
        ]
    }

    /// True if any field contains `needle`. The caller lowercases `needle`
    /// once; each field is lowercased here.
    pub(crate) fn contains_lowercase(&self, needle: &str) -> bool {
        self.fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

// ==============================================================================
// Query Results
// ==============================================================================

/// A decoded row together with its positional index in the backing file.
///
/// The index is only valid until the next append or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub index: usize,
    #[serde(flatten)]
    pub record: Record,
}

/// A row that failed to decode. It still occupies its index slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRow {
    pub index: usize,
    /// 1-based physical line where the row starts.
    pub line: usize,
    /// Row text without its line terminator, invalid UTF-8 replaced.
    pub raw: String,
    pub error: CodecError,
}

/// Result of a list or search: the matching entries in file order plus
/// every row that was skipped because it could not be decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub entries: Vec<Entry>,
    pub malformed: Vec<MalformedRow>,
}

impl Snapshot {
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(|entry| &entry.record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What a delete took out of the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Removed {
    Record(Record),
    /// Text of a row that never decoded, invalid UTF-8 replaced.
    Malformed(String),
}

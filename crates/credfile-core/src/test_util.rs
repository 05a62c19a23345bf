//! Shared helpers for `credfile-core` unit tests.

use tempfile::TempDir;

use crate::bootstrap::open_for_read_append;
use crate::store::Store;
use crate::types::Record;

/// A record whose every field is derived from `name`, so tests only need to
/// keep one distinguishing string around.
pub fn record(name: &str) -> Record {
    Record::new(
        name,
        format!("{name}-user"),
        format!("{name}@example.com"),
        format!("{name}-secret"),
    )
}

/// An empty store in a fresh temporary directory. Keep the `TempDir` alive
/// for as long as the store is used.
pub fn temp_store() -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = open_for_read_append(dir.path().join("creds.csv")).expect("open temp store");
    (dir, store)
}

/// Current on-disk bytes of the store's backing file.
pub fn bytes_of(store: &Store) -> Vec<u8> {
    std::fs::read(store.path()).expect("read backing file")
}

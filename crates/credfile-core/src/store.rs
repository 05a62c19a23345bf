//! `Store` — the open handle on a credential file and the only code that
//! reads or writes its bytes.
//!
//! Records are addressed by positional index: the 0-based rank of their row
//! in the file at the time of the query. Rows that fail to decode keep their
//! slot, so an index reported by [`Store::list`] or [`Store::search`] always
//! names the same row for [`Store::delete`]. Indices shift after every append
//! or delete; take a fresh snapshot before deleting again.
//!
//! Every operation reads or rewrites the whole file. Concurrent use of one
//! file from several processes is not supported.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::bootstrap::open_file;
use crate::codec::{self, RawRow};
use crate::error::StoreError;
use crate::types::{Entry, MalformedRow, Record, Removed, Snapshot};

const TEMP_PREFIX: &str = ".credfile-";
const TEMP_SUFFIX: &str = ".tmp";

pub struct Store {
    path: PathBuf,
    file: File,
}

impl Store {
    pub(crate) fn from_parts(path: PathBuf, file: File) -> Self {
        Self { path, file }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Every decodable record in file order.
    pub fn list(&mut self) -> Result<Snapshot, StoreError> {
        let bytes = self.read_all()?;
        let snapshot = collect_snapshot(&codec::split_rows(&bytes), |_| true);
        tracing::debug!(
            path = %self.path.display(),
            records = snapshot.len(),
            malformed = snapshot.malformed.len(),
            "listed records"
        );
        Ok(snapshot)
    }

    /// Records with at least one field containing `query`, ignoring case.
    /// An empty query matches every decodable record.
    pub fn search(&mut self, query: &str) -> Result<Snapshot, StoreError> {
        let needle = query.to_lowercase();
        let bytes = self.read_all()?;
        let snapshot = collect_snapshot(&codec::split_rows(&bytes), |record| {
            record.contains_lowercase(&needle)
        });
        tracing::debug!(
            path = %self.path.display(),
            matches = snapshot.len(),
            malformed = snapshot.malformed.len(),
            "searched records"
        );
        Ok(snapshot)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Write `record` as the new last row. Existing rows are never touched.
    ///
    /// The row goes out in one buffer. If the write fails the file is
    /// truncated back to its previous length so no partial row remains.
    pub fn append(&mut self, record: &Record) -> Result<(), StoreError> {
        let row = codec::encode(record);
        let len = self.file.metadata()?.len();

        let mut buf = Vec::with_capacity(row.len() + 1);
        // A hand-edited file may lack its final newline.
        if len > 0 && !self.ends_with_newline(len)? {
            buf.push(b'\n');
        }
        buf.extend_from_slice(row.as_bytes());

        if let Err(err) = self.file.write_all(&buf).and_then(|()| self.file.flush()) {
            if let Err(truncate_err) = self.file.set_len(len) {
                tracing::error!(
                    path = %self.path.display(),
                    error = %truncate_err,
                    "failed to roll back partial append"
                );
            }
            return Err(err.into());
        }

        tracing::info!(path = %self.path.display(), "appended record");
        Ok(())
    }

    /// Remove the row at `index` and atomically replace the file with the
    /// remaining rows.
    ///
    /// `index` must lie in `0..row_count`, where malformed rows count too.
    /// Remaining well-formed rows are re-encoded; malformed rows are copied
    /// through unchanged. The new content is written to a temporary file next
    /// to the original and renamed over it, so a failure at any point leaves
    /// the original file as it was.
    pub fn delete(&mut self, index: i64) -> Result<Removed, StoreError> {
        self.delete_with(index, write_synced)
    }

    fn delete_with<F>(&mut self, index: i64, write: F) -> Result<Removed, StoreError>
    where
        F: FnOnce(&mut NamedTempFile, &[u8]) -> io::Result<()>,
    {
        let bytes = self.read_all()?;
        let rows = codec::split_rows(&bytes);
        let count = rows.len();
        let target = usize::try_from(index)
            .ok()
            .filter(|&i| i < count)
            .ok_or(StoreError::IndexOutOfRange { index, count })?;

        let removed = match codec::decode_bytes(rows[target].bytes) {
            Ok(record) => Removed::Record(record),
            Err(_) => Removed::Malformed(rows[target].display_text()),
        };

        let mut body = Vec::with_capacity(bytes.len());
        for (i, row) in rows.iter().enumerate() {
            if i == target {
                continue;
            }
            match codec::decode_bytes(row.bytes) {
                Ok(record) => body.extend_from_slice(codec::encode(&record).as_bytes()),
                Err(error) => {
                    tracing::warn!(
                        index = i,
                        line = row.line,
                        %error,
                        "keeping malformed row unchanged"
                    );
                    body.extend_from_slice(row.bytes);
                    if !row.bytes.ends_with(b"\n") {
                        body.push(b'\n');
                    }
                }
            }
        }

        self.replace_contents(&body, write)?;
        tracing::info!(
            path = %self.path.display(),
            index = target,
            remaining = count - 1,
            "deleted record"
        );
        Ok(removed)
    }

    // ========================================================================
    // File access
    // ========================================================================

    fn read_all(&mut self) -> Result<Vec<u8>, StoreError> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        self.file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }

    fn ends_with_newline(&mut self, len: u64) -> io::Result<bool> {
        self.file.seek(SeekFrom::Start(len - 1))?;
        let mut last = [0u8; 1];
        self.file.read_exact(&mut last)?;
        Ok(last[0] == b'\n')
    }

    /// Write `body` to a temporary file in the same directory, rename it over
    /// the backing file, then reopen the handle on the new file. The
    /// temporary file is deleted on drop unless the rename succeeded.
    fn replace_contents<F>(&mut self, body: &[u8], write: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut NamedTempFile, &[u8]) -> io::Result<()>,
    {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        write(&mut temp, body)?;
        temp.persist(&self.path).map_err(|err| err.error)?;

        self.file = open_file(&self.path)?;
        Ok(())
    }
}

fn write_synced(temp: &mut NamedTempFile, body: &[u8]) -> io::Result<()> {
    temp.write_all(body)?;
    temp.as_file().sync_all()
}

/// Decode `rows`, keeping entries accepted by `keep` and recording every
/// row that fails to decode.
fn collect_snapshot<P>(rows: &[RawRow<'_>], mut keep: P) -> Snapshot
where
    P: FnMut(&Record) -> bool,
{
    rows.iter()
        .enumerate()
        .fold(Snapshot::default(), |mut snapshot, (index, row)| {
            match codec::decode_bytes(row.bytes) {
                Ok(record) => {
                    if keep(&record) {
                        snapshot.entries.push(Entry { index, record });
                    }
                }
                Err(error) => {
                    tracing::warn!(index, line = row.line, %error, "skipping malformed row");
                    snapshot.malformed.push(MalformedRow {
                        index,
                        line: row.line,
                        raw: row.display_text(),
                        error,
                    });
                }
            }
            snapshot
        })
}

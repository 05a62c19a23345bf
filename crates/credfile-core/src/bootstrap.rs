//! Creating, opening and removing the backing file.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use crate::error::StoreError;
use crate::store::Store;

/// Create an empty backing file if none exists. Succeeds silently when the
/// file is already there. Parent directories are not created.
pub fn ensure_file_exists(path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    restrict_permissions(&mut options);

    match options.open(path) {
        Ok(_) => {
            tracing::info!(path = %path.display(), "created credential file");
            Ok(())
        }
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Open the backing file for reading and appending, creating it if absent,
/// and wrap it in a [`Store`]. The handle is released when the store drops.
///
/// The store keeps the canonical path, so when `path` is a symlink a delete
/// rewrites the link target and the link itself survives.
pub fn open_for_read_append(path: impl AsRef<Path>) -> Result<Store, StoreError> {
    let file = open_file(path.as_ref())?;
    let path = std::fs::canonicalize(path)?;
    tracing::debug!(path = %path.display(), "opened credential file");
    Ok(Store::from_parts(path, file))
}

/// Delete the backing file.
pub fn remove_file(path: impl AsRef<Path>) -> Result<(), StoreError> {
    let path = path.as_ref();
    std::fs::remove_file(path)?;
    tracing::info!(path = %path.display(), "removed credential file");
    Ok(())
}

pub(crate) fn open_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).append(true).create(true);
    restrict_permissions(&mut options);
    options.open(path)
}

// Stored secrets are plaintext, so a newly created file is private to its owner.
#[cfg(unix)]
fn restrict_permissions(options: &mut OpenOptions) {
    use std::os::unix::fs::OpenOptionsExt;
    options.mode(0o600);
}

#[cfg(not(unix))]
fn restrict_permissions(_options: &mut OpenOptions) {}

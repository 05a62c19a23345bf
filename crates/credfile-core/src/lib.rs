pub mod bootstrap;
pub mod codec;
pub mod error;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_util;

pub use bootstrap::{ensure_file_exists, open_for_read_append, remove_file};
pub use error::{CodecError, StoreError};
pub use store::Store;
pub use types::{Entry, MalformedRow, Record, Removed, Snapshot};

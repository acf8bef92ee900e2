//! Crash-safe file replacement.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::storage::errors::{StorageError, StorageResult};

/// write `bytes` to `path` through a temporary sibling file and an atomic rename
///
/// readers either see the previous content or the complete new content
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StorageError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

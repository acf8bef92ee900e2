//! Working-directory access.
//!
//! The working directory is flat: only regular files directly inside it
//! are considered. Subdirectories, including the repository directory,
//! are ignored.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::debug;

use crate::engine::error::GitletResult;
use crate::storage::{blob_fingerprint, BlobId, FileName};

#[derive(Debug, Clone)]
pub struct WorkTree {
    dir: PathBuf,
}

impl WorkTree {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &FileName) -> PathBuf {
        self.dir.join(name)
    }

    /// Names of all regular files, sorted.
    pub fn files(&self) -> GitletResult<BTreeSet<FileName>> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry
                .file_name()
                .to_str()
                .and_then(|name| FileName::new(name).ok())
            {
                names.insert(name);
            }
        }
        Ok(names)
    }

    /// Content of a file, or None if it is not present.
    pub fn read(&self, name: &FileName) -> GitletResult<Option<Vec<u8>>> {
        let path = self.path(name);
        if !path.is_file() {
            return Ok(None);
        }
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fingerprint the file would have as a blob, or None if absent.
    pub fn fingerprint(&self, name: &FileName) -> GitletResult<Option<BlobId>> {
        Ok(self
            .read(name)?
            .map(|bytes| blob_fingerprint(name, &bytes)))
    }

    /// Create or overwrite a file.
    pub fn write(&self, name: &FileName, content: &[u8]) -> GitletResult<()> {
        fs::write(self.path(name), content)?;
        debug!(file = %name, size = content.len(), "wrote working file");
        Ok(())
    }

    /// Delete a file; returns whether it existed.
    pub fn delete(&self, name: &FileName) -> GitletResult<bool> {
        match fs::remove_file(self.path(name)) {
            Ok(()) => {
                debug!(file = %name, "deleted working file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

//! Exclusive repository lock.
//!
//! Every command that opens an existing repository holds an OS-level
//! exclusive lock on `<repo>/lock` until it finishes. Acquisition is
//! non-blocking: a second process fails fast with
//! [`GitletError::RepositoryLocked`]. The lock is released on drop.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::Path;

use fs2::FileExt;
use tracing::debug;

use crate::engine::error::{GitletError, GitletResult};

/// An exclusive lock on the repository.
#[derive(Debug)]
pub struct RepoLock {
    file: File,
}

impl RepoLock {
    /// Attempt to acquire the lock at `path`, creating the file if needed.
    pub fn acquire(path: &Path) -> GitletResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %path.display(), "acquired repository lock");
                Ok(Self { file })
            }
            Err(e)
                if e.kind() == ErrorKind::WouldBlock
                    || e.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
            {
                Err(GitletError::RepositoryLocked)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for RepoLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_acquire_creates_lock_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lock");

        let _lock = RepoLock::acquire(&path).unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_second_acquire_fails_while_held() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lock");

        let _held = RepoLock::acquire(&path).unwrap();
        let result = RepoLock::acquire(&path);
        assert!(matches!(result, Err(GitletError::RepositoryLocked)));
    }

    #[test]
    fn test_lock_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lock");

        {
            let _lock = RepoLock::acquire(&path).unwrap();
        }
        assert!(RepoLock::acquire(&path).is_ok());
    }
}

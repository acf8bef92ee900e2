//!  Branch and reference management.
//!
//!  Branches are plain files under `refs/heads/` holding a commit
//!  fingerprint. `HEAD` holds the name of the current branch. This module
//!  handles:
//! - HEAD resolution and switching
//! - Branch lifecycle (create, move, delete)
//! - Listing branches

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::storage::atomic::write_atomic;
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::types::{BranchName, CommitId};

/// Manages the reference table of a repository.
#[derive(Debug, Clone)]
pub struct RefManager {
    root: PathBuf,
}

impl RefManager {
    /// `root` is the repository directory (the one holding `HEAD`).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn head_path(&self) -> PathBuf {
        self.root.join("HEAD")
    }

    fn heads_dir(&self) -> PathBuf {
        self.root.join("refs").join("heads")
    }

    fn branch_path(&self, branch: &BranchName) -> PathBuf {
        self.root.join(branch.as_ref_path())
    }

    /// Name of the current branch.
    pub fn head_branch(&self) -> StorageResult<BranchName> {
        let raw = read_ref_file(&self.head_path(), "HEAD")?;
        Ok(BranchName::new(raw)?)
    }

    /// Point HEAD at another branch.
    pub fn set_head(&self, branch: &BranchName) -> StorageResult<()> {
        if !self.branch_exists(branch) {
            return Err(StorageError::RefNotFound(branch.to_string()));
        }
        write_atomic(&self.head_path(), branch.as_str().as_bytes())?;
        debug!(%branch, "moved HEAD");
        Ok(())
    }

    /// Commit at the tip of the current branch.
    pub fn head_commit(&self) -> StorageResult<CommitId> {
        let branch = self.head_branch()?;
        self.resolve_branch(&branch)
    }

    /// Resolve a branch name to its current commit ID.
    pub fn resolve_branch(&self, branch: &BranchName) -> StorageResult<CommitId> {
        let raw = read_ref_file(&self.branch_path(branch), branch.as_str())?;
        CommitId::from_hex(&raw).map_err(|source| StorageError::InvalidFingerprint {
            value: raw,
            source,
        })
    }

    /// Check if a branch exists.
    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.branch_path(branch).is_file()
    }

    /// Create a new branch pointing to the given commit.
    pub fn create_branch(&self, branch: &BranchName, target: CommitId) -> StorageResult<()> {
        if self.branch_exists(branch) {
            return Err(StorageError::BranchAlreadyExists(branch.to_string()));
        }
        write_atomic(&self.branch_path(branch), target.to_string().as_bytes())?;
        debug!(%branch, %target, "created branch");
        Ok(())
    }

    /// Move an existing branch to a new commit.
    pub fn update_branch(&self, branch: &BranchName, target: CommitId) -> StorageResult<()> {
        if !self.branch_exists(branch) {
            return Err(StorageError::RefNotFound(branch.to_string()));
        }
        write_atomic(&self.branch_path(branch), target.to_string().as_bytes())?;
        debug!(%branch, %target, "updated branch");
        Ok(())
    }

    /// Delete a branch. The commits it pointed at stay in the store.
    pub fn delete_branch(&self, branch: &BranchName) -> StorageResult<()> {
        match fs::remove_file(self.branch_path(branch)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::RefNotFound(branch.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All branches, sorted by name.
    pub fn list_branches(&self) -> StorageResult<Vec<BranchName>> {
        let mut result = Vec::new();
        for entry in fs::read_dir(self.heads_dir())? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            // temp files from interrupted writes start with '.', which
            // BranchName rejects
            if let Some(branch) = entry
                .file_name()
                .to_str()
                .and_then(|name| BranchName::new(name).ok())
            {
                result.push(branch);
            }
        }
        result.sort();
        Ok(result)
    }

    /// Create the reference table for a fresh repository: the default
    /// branch at `initial_commit` and HEAD pointing at it.
    pub fn init_default_branch(&self, branch: &BranchName, initial_commit: CommitId) -> StorageResult<()> {
        fs::create_dir_all(self.heads_dir())?;
        self.create_branch(branch, initial_commit)?;
        self.set_head(branch)
    }
}

fn read_ref_file(path: &Path, name: &str) -> StorageResult<String> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(raw.trim().to_string()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::RefNotFound(name.to_string())),
        Err(e) => Err(e.into()),
    }
}

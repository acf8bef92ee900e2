//! Repository handle - high-level interface for gitlet.

use tracing::{debug, info};

use crate::engine::config::RepositoryConfig;
use crate::engine::context::RepositoryContext;
use crate::engine::error::{GitletError, GitletResult};
use crate::engine::lock::RepoLock;
use crate::engine::worktree::WorkTree;
use crate::storage::{BranchName, Commit, PrefixMatch, RepoStorage};

/// An open repository.
///
/// Holds the repository lock for as long as it lives; each command method
/// loads its [`RepositoryContext`] fresh and persists it before returning.
#[derive(Debug)]
pub struct Repository {
    storage: RepoStorage,
    worktree: WorkTree,
    _lock: RepoLock,
}

impl Repository {
    /// Create a new repository in the configured working directory.
    pub fn init(config: RepositoryConfig) -> GitletResult<Self> {
        let repo_path = config.repo_path();
        if repo_path.exists() {
            return Err(GitletError::AlreadyInitialized);
        }

        let (storage, initial) = RepoStorage::init(&repo_path, &config.default_branch)?;
        let lock = RepoLock::acquire(&storage.lock_path())?;
        info!(branch = %config.default_branch, commit = %initial.id(), "initialized gitlet repository");

        Ok(Self {
            worktree: WorkTree::new(&config.work_dir),
            storage,
            _lock: lock,
        })
    }

    /// Open the repository in the configured working directory.
    pub fn open(config: RepositoryConfig) -> GitletResult<Self> {
        let repo_path = config.repo_path();
        if !RepoStorage::exists(&repo_path) {
            return Err(GitletError::NotInitialized);
        }

        let storage = RepoStorage::open(&repo_path)?;
        let lock = RepoLock::acquire(&storage.lock_path())?;
        debug!(path = %repo_path.display(), "opened repository");

        Ok(Self {
            worktree: WorkTree::new(&config.work_dir),
            storage,
            _lock: lock,
        })
    }

    pub fn storage(&self) -> &RepoStorage {
        &self.storage
    }

    pub fn worktree(&self) -> &WorkTree {
        &self.worktree
    }

    pub fn current_branch(&self) -> GitletResult<BranchName> {
        Ok(self.storage.refs().head_branch()?)
    }

    pub fn head_commit(&self) -> GitletResult<Commit> {
        Ok(self.storage.head_commit()?)
    }

    pub(crate) fn load_context(&self) -> GitletResult<RepositoryContext> {
        RepositoryContext::load(&self.storage)
    }

    /// Resolve a full or abbreviated commit id to a commit.
    pub fn resolve_commit(&self, id: &str) -> GitletResult<Commit> {
        match self.storage.objects().resolve_commit_prefix(id)? {
            PrefixMatch::Unique(id) => Ok(self.storage.objects().get_commit(id)?),
            PrefixMatch::NotFound => Err(GitletError::UnknownCommitId),
            PrefixMatch::Ambiguous(matches) => Err(GitletError::AmbiguousCommitId(matches.len())),
        }
    }
}

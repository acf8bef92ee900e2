//! Engine error types.
//!
//! Each user-facing variant renders as exactly the message the command
//! prints. Storage and I/O failures are wrapped and keep their diagnostic
//! text.

use thiserror::Error;

use crate::storage::{InvalidNameError, StorageError};

/// Result type for engine operations.
pub type GitletResult<T> = Result<T, GitletError>;

/// Engine errors.
#[derive(Debug, Error)]
pub enum GitletError {
    #[error("Not in an initialized Gitlet directory.")]
    NotInitialized,

    #[error("A Gitlet version-control system already exists in the current directory.")]
    AlreadyInitialized,

    #[error("File does not exist.")]
    FileNotFound,

    #[error("Please enter a commit message.")]
    EmptyCommitMessage,

    #[error("No changes added to the commit.")]
    NothingToCommit,

    #[error("No reason to remove the file.")]
    NothingToRemove,

    /// rm-branch / merge with a missing branch
    #[error("A branch with that name does not exist.")]
    BranchNotFound,

    /// checkout of a missing branch
    #[error("No such branch exists.")]
    NoSuchBranch,

    #[error("No need to checkout the current branch.")]
    AlreadyOnBranch,

    #[error("A branch with that name already exists.")]
    BranchAlreadyExists,

    #[error("Cannot remove the current branch.")]
    CannotRemoveCurrentBranch,

    #[error("No commit with that id exists.")]
    UnknownCommitId,

    #[error("Commit id is ambiguous; {0} commits share that prefix.")]
    AmbiguousCommitId(usize),

    #[error("File does not exist in that commit.")]
    FileNotInCommit,

    #[error("Found no commit with that message.")]
    NoCommitWithMessage,

    #[error("There is an untracked file in the way; delete it, or add and commit it first.")]
    UntrackedFileConflict,

    #[error("You have uncommitted changes.")]
    UncommittedChanges,

    #[error("Cannot merge a branch with itself.")]
    CannotMergeSelf,

    #[error("Given branch is an ancestor of the current branch.")]
    MergeBranchIsAncestor,

    #[error("Incorrect operands.")]
    IncorrectOperands,

    /// a branch name that cannot be stored as a reference
    #[error("Invalid branch name: {0}")]
    InvalidBranchName(#[from] InvalidNameError),

    #[error("Another gitlet command is running in this repository.")]
    RepositoryLocked,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitletError {
    /// Whether this error is part of a command's contract (printed as is)
    /// rather than an internal failure.
    pub fn is_user_error(&self) -> bool {
        !matches!(self, GitletError::Storage(_) | GitletError::Io(_))
    }

    /// Whether the repository's stored objects are damaged.
    pub fn is_corruption(&self) -> bool {
        matches!(self, GitletError::Storage(e) if e.is_integrity_error())
    }
}

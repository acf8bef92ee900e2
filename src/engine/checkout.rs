//! Checkout, reset and the untracked-file safety check.

use tracing::{info, warn};

use crate::engine::context::RepositoryContext;
use crate::engine::error::{GitletError, GitletResult};
use crate::engine::repository::Repository;
use crate::storage::{BlobId, BranchName, Commit, FileName};

impl Repository {
    /// Switch to another branch, rewriting the working directory to its
    /// tip commit.
    pub fn checkout_branch(&self, name: &str) -> GitletResult<()> {
        let branch = BranchName::new(name).map_err(|_| GitletError::NoSuchBranch)?;
        let refs = self.storage().refs();
        if !refs.branch_exists(&branch) {
            return Err(GitletError::NoSuchBranch);
        }

        let mut ctx = self.load_context()?;
        if ctx.branch == branch {
            return Err(GitletError::AlreadyOnBranch);
        }

        let target = self.storage().objects().get_commit(refs.resolve_branch(&branch)?)?;
        self.replace_tree(&ctx, &target)?;
        refs.set_head(&branch)?;
        info!(from = %ctx.branch, to = %branch, commit = %target.id(), "switched branch");

        ctx.branch = branch;
        ctx.head = target;
        ctx.clear_stages();
        ctx.persist(self.storage())
    }

    /// Restore one file from the current commit. Stages are not touched.
    pub fn checkout_file(&self, path: &str) -> GitletResult<()> {
        let head = self.head_commit()?;
        self.restore_file(&head, path)
    }

    /// Restore one file from the commit with the given (possibly
    /// abbreviated) id. Stages are not touched.
    pub fn checkout_file_at(&self, commit_id: &str, path: &str) -> GitletResult<()> {
        let commit = self.resolve_commit(commit_id)?;
        self.restore_file(&commit, path)
    }

    fn restore_file(&self, commit: &Commit, path: &str) -> GitletResult<()> {
        let name = FileName::from_user_path(path).map_err(|_| GitletError::FileNotInCommit)?;
        let id = commit.blob_for(&name).ok_or(GitletError::FileNotInCommit)?;
        let blob = self.storage().objects().get_blob(id)?;
        self.worktree().write(&name, blob.content())?;
        info!(file = %name, commit = %commit.id(), "restored file");
        Ok(())
    }

    /// Move the current branch to an arbitrary commit and rewrite the
    /// working directory to match it.
    pub fn reset(&self, commit_id: &str) -> GitletResult<()> {
        let target = self.resolve_commit(commit_id)?;
        let mut ctx = self.load_context()?;

        self.replace_tree(&ctx, &target)?;
        self.storage().refs().update_branch(&ctx.branch, target.id())?;
        info!(branch = %ctx.branch, commit = %target.id(), "reset branch");

        ctx.head = target;
        ctx.clear_stages();
        ctx.persist(self.storage())
    }

    /// Write every file `target` tracks and delete the files only the
    /// current commit tracks. Other working files are left alone.
    ///
    /// The safety check runs to completion before any file is touched.
    fn replace_tree(&self, ctx: &RepositoryContext, target: &Commit) -> GitletResult<()> {
        self.check_untracked(&ctx.head, target.blobs().iter().map(|(n, id)| (n, *id)))?;

        for (name, id) in target.blobs() {
            let blob = self.storage().objects().get_blob(*id)?;
            self.worktree().write(name, blob.content())?;
        }
        for name in ctx.head.blobs().keys() {
            if !target.tracks(name) {
                self.worktree().delete(name)?;
            }
        }
        Ok(())
    }

    /// Fail if writing `incoming` would clobber a working file that the
    /// current commit does not track and whose content differs.
    pub(crate) fn check_untracked<'a>(
        &self,
        current: &Commit,
        incoming: impl IntoIterator<Item = (&'a FileName, BlobId)>,
    ) -> GitletResult<()> {
        for (name, id) in incoming {
            if current.tracks(name) {
                continue;
            }
            match self.worktree().fingerprint(name)? {
                Some(live) if live != id => {
                    warn!(file = %name, "untracked file would be overwritten");
                    return Err(GitletError::UntrackedFileConflict);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

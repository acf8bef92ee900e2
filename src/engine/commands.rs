//! Staging, committing, branching and history commands.

use tracing::{debug, info};

use crate::engine::context::RepositoryContext;
use crate::engine::error::{GitletError, GitletResult};
use crate::engine::output::{Log, LogEntry};
use crate::engine::repository::Repository;
use crate::storage::{history, Blob, BranchName, Commit, CommitBuilder, CommitId, FileName};

impl Repository {
    /// Stage a working file for addition.
    ///
    /// A file whose content matches the current commit is unstaged instead.
    /// Staging always cancels a pending removal of the same name.
    pub fn add(&self, path: &str) -> GitletResult<()> {
        let name = FileName::from_user_path(path).map_err(|_| GitletError::FileNotFound)?;
        let content = self.worktree().read(&name)?.ok_or(GitletError::FileNotFound)?;
        let mut ctx = self.load_context()?;

        let blob = Blob::new(name.clone(), content);
        ctx.remove_stage.remove(&name);
        if ctx.head.blob_for(&name) == Some(blob.id()) {
            ctx.add_stage.remove(&name);
            debug!(file = %name, "content matches current commit, not staged");
        } else {
            self.storage().objects().put_blob(&blob)?;
            ctx.add_stage.insert(name.clone(), blob.id());
            debug!(file = %name, blob = %blob.id(), "staged for addition");
        }

        ctx.persist(self.storage())
    }

    /// Snapshot the staged changes as a new commit on the current branch.
    pub fn commit(&self, message: &str) -> GitletResult<Commit> {
        if message.is_empty() {
            return Err(GitletError::EmptyCommitMessage);
        }
        let mut ctx = self.load_context()?;
        if !ctx.has_staged_changes() {
            return Err(GitletError::NothingToCommit);
        }

        let parents = vec![ctx.head.id()];
        self.commit_staged(&mut ctx, message, parents)
    }

    /// Create a commit from the current mapping overlaid with both stages,
    /// advance the current branch to it and clear the stages.
    pub(crate) fn commit_staged(
        &self,
        ctx: &mut RepositoryContext,
        message: &str,
        parents: Vec<CommitId>,
    ) -> GitletResult<Commit> {
        let mut blobs = ctx.head.blobs().clone();
        for (name, id) in ctx.add_stage.iter() {
            blobs.insert(name.clone(), *id);
        }
        for name in ctx.remove_stage.names() {
            blobs.remove(name);
        }

        let commit = CommitBuilder::new(self.storage().objects())
            .parents(parents)
            .message(message)
            .blobs(blobs)
            .commit()?;
        self.storage().refs().update_branch(&ctx.branch, commit.id())?;
        info!(branch = %ctx.branch, commit = %commit.id(), files = commit.blobs().len(), "created commit");

        ctx.head = commit.clone();
        ctx.clear_stages();
        ctx.persist(self.storage())?;
        Ok(commit)
    }

    /// Unstage a file, or stage a tracked file for removal and delete it
    /// from the working directory.
    pub fn rm(&self, path: &str) -> GitletResult<()> {
        let name = FileName::from_user_path(path).map_err(|_| GitletError::NothingToRemove)?;
        let mut ctx = self.load_context()?;

        let was_staged = ctx.add_stage.remove(&name).is_some();
        let tracked = ctx.head.blob_for(&name);
        if !was_staged && tracked.is_none() {
            return Err(GitletError::NothingToRemove);
        }

        if let Some(id) = tracked {
            ctx.remove_stage.insert(name.clone(), id);
            self.worktree().delete(&name)?;
            debug!(file = %name, "staged for removal");
        }

        ctx.persist(self.storage())
    }

    /// Create a branch at the current commit. HEAD does not move.
    pub fn branch(&self, name: &str) -> GitletResult<()> {
        let branch = BranchName::new(name)?;
        let refs = self.storage().refs();
        if refs.branch_exists(&branch) {
            return Err(GitletError::BranchAlreadyExists);
        }
        let head = refs.head_commit()?;
        refs.create_branch(&branch, head)?;
        info!(%branch, commit = %head, "created branch");
        Ok(())
    }

    /// Delete a branch pointer; its commits stay in the store.
    pub fn rm_branch(&self, name: &str) -> GitletResult<()> {
        let branch = BranchName::new(name).map_err(|_| GitletError::BranchNotFound)?;
        let refs = self.storage().refs();
        if !refs.branch_exists(&branch) {
            return Err(GitletError::BranchNotFound);
        }
        if refs.head_branch()? == branch {
            return Err(GitletError::CannotRemoveCurrentBranch);
        }
        refs.delete_branch(&branch)?;
        info!(%branch, "removed branch");
        Ok(())
    }

    /// First-parent history of the current commit, newest first.
    pub fn log(&self) -> GitletResult<Log> {
        let head = self.storage().refs().head_commit()?;
        let entries = history(self.storage().objects(), head)
            .map(|commit| commit.map(|c| LogEntry::from(&c)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Log(entries))
    }

    /// Every commit ever made, in ascending fingerprint order.
    pub fn global_log(&self) -> GitletResult<Log> {
        let entries = self
            .storage()
            .objects()
            .list_commits()?
            .iter()
            .map(LogEntry::from)
            .collect();
        Ok(Log(entries))
    }

    /// Ids of all commits whose message is exactly `message`.
    pub fn find(&self, message: &str) -> GitletResult<Vec<CommitId>> {
        let ids: Vec<CommitId> = self
            .storage()
            .objects()
            .list_commits()?
            .into_iter()
            .filter(|c| c.message() == message)
            .map(|c| c.id())
            .collect();
        if ids.is_empty() {
            return Err(GitletError::NoCommitWithMessage);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::RepositoryConfig;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(RepositoryConfig::new(dir.path())).unwrap();
        (dir, repo)
    }

    fn write(dir: &TempDir, name: &str, content: &str) {
        fs::write(dir.path().join(name), content).unwrap();
    }

    fn name(s: &str) -> FileName {
        FileName::new(s).unwrap()
    }

    #[test]
    fn test_add_missing_file() {
        let (_dir, repo) = setup();
        assert!(matches!(repo.add("nope.txt"), Err(GitletError::FileNotFound)));
    }

    #[test]
    fn test_add_stages_and_stores_blob() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "hello");

        repo.add("a.txt").unwrap();
        let ctx = repo.load_context().unwrap();
        let id = ctx.add_stage.get(&name("a.txt")).unwrap();
        assert_eq!(repo.storage().objects().get_blob(id).unwrap().content(), b"hello");
    }

    #[test]
    fn test_add_twice_is_stable() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "hello");

        repo.add("a.txt").unwrap();
        let before = repo.load_context().unwrap().add_stage;
        let objects = repo.storage().objects().list_ids().unwrap().len();

        repo.add("a.txt").unwrap();
        assert_eq!(repo.load_context().unwrap().add_stage, before);
        assert_eq!(repo.storage().objects().list_ids().unwrap().len(), objects);
    }

    #[test]
    fn test_add_unchanged_file_unstages_it() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "v1");
        repo.add("a.txt").unwrap();
        repo.commit("v1").unwrap();

        write(&dir, "a.txt", "v2");
        repo.add("a.txt").unwrap();
        write(&dir, "a.txt", "v1");
        repo.add("a.txt").unwrap();

        assert!(repo.load_context().unwrap().add_stage.is_empty());
    }

    #[test]
    fn test_add_cancels_removal() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "v1");
        repo.add("a.txt").unwrap();
        repo.commit("v1").unwrap();

        repo.rm("a.txt").unwrap();
        write(&dir, "a.txt", "v1");
        repo.add("a.txt").unwrap();

        let ctx = repo.load_context().unwrap();
        assert!(!ctx.has_staged_changes());
    }

    #[test]
    fn test_commit_preconditions() {
        let (_dir, repo) = setup();
        assert!(matches!(repo.commit(""), Err(GitletError::EmptyCommitMessage)));
        assert!(matches!(repo.commit("msg"), Err(GitletError::NothingToCommit)));
    }

    #[test]
    fn test_commit_accepts_whitespace_message() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "hello");
        repo.add("a.txt").unwrap();

        let commit = repo.commit("   ").unwrap();
        assert_eq!(commit.message(), "   ");
        assert_eq!(repo.head_commit().unwrap(), commit);
    }

    #[test]
    fn test_commit_advances_branch_and_clears_stages() {
        let (dir, repo) = setup();
        let root = repo.head_commit().unwrap().id();
        write(&dir, "a.txt", "hello");
        repo.add("a.txt").unwrap();

        let commit = repo.commit("add a").unwrap();
        assert_eq!(commit.parents(), &[root]);
        assert!(commit.tracks(&name("a.txt")));
        assert_eq!(repo.head_commit().unwrap(), commit);
        assert!(!repo.load_context().unwrap().has_staged_changes());
    }

    #[test]
    fn test_commit_applies_removals() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "a");
        write(&dir, "b.txt", "b");
        repo.add("a.txt").unwrap();
        repo.add("b.txt").unwrap();
        repo.commit("two files").unwrap();

        repo.rm("a.txt").unwrap();
        assert!(!dir.path().join("a.txt").exists());
        let commit = repo.commit("drop a").unwrap();

        assert!(!commit.tracks(&name("a.txt")));
        assert!(commit.tracks(&name("b.txt")));
    }

    #[test]
    fn test_rm_untracked_unstaged_file() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "a");
        assert!(matches!(repo.rm("a.txt"), Err(GitletError::NothingToRemove)));
    }

    #[test]
    fn test_rm_staged_file_only_unstages() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "a");
        repo.add("a.txt").unwrap();

        repo.rm("a.txt").unwrap();
        let ctx = repo.load_context().unwrap();
        assert!(!ctx.has_staged_changes());
        assert!(dir.path().join("a.txt").exists());
    }

    #[test]
    fn test_branch_lifecycle() {
        let (_dir, repo) = setup();
        repo.branch("feature").unwrap();
        assert!(matches!(repo.branch("feature"), Err(GitletError::BranchAlreadyExists)));
        assert_eq!(repo.current_branch().unwrap(), BranchName::master());

        assert!(matches!(repo.rm_branch("master"), Err(GitletError::CannotRemoveCurrentBranch)));
        repo.rm_branch("feature").unwrap();
        assert!(matches!(repo.rm_branch("feature"), Err(GitletError::BranchNotFound)));
    }

    #[test]
    fn test_log_and_global_log() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "a");
        repo.add("a.txt").unwrap();
        repo.commit("first").unwrap();

        let log = repo.log().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].message, "first");
        assert_eq!(log.entries()[1].message, "initial commit");

        let global = repo.global_log().unwrap();
        assert_eq!(global.len(), 2);
        let ids: Vec<_> = global.entries().iter().map(|e| e.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_find() {
        let (dir, repo) = setup();
        write(&dir, "a.txt", "a");
        repo.add("a.txt").unwrap();
        let commit = repo.commit("needle").unwrap();

        assert_eq!(repo.find("needle").unwrap(), vec![commit.id()]);
        assert!(matches!(repo.find("needl"), Err(GitletError::NoCommitWithMessage)));
    }
}

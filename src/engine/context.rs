//! Per-command repository state.
//!
//! A command loads the context once, mutates it in memory and persists it
//! before returning. Nothing is kept between commands.

use tracing::debug;

use crate::engine::error::GitletResult;
use crate::storage::{BranchName, Commit, RepoStorage, StagingArea};

#[derive(Debug, Clone)]
pub struct RepositoryContext {
    pub branch: BranchName,
    pub head: Commit,
    pub add_stage: StagingArea,
    pub remove_stage: StagingArea,
}

impl RepositoryContext {
    pub fn load(storage: &RepoStorage) -> GitletResult<Self> {
        let branch = storage.refs().head_branch()?;
        let head_id = storage.refs().resolve_branch(&branch)?;
        let head = storage.objects().get_commit(head_id)?;
        let (add_stage, remove_stage) = storage.load_stages()?;
        debug!(%branch, head = %head.id(), staged = add_stage.len(), removed = remove_stage.len(), "loaded context");
        Ok(Self {
            branch,
            head,
            add_stage,
            remove_stage,
        })
    }

    /// Write both stages back.
    pub fn persist(&self, storage: &RepoStorage) -> GitletResult<()> {
        storage.save_stages(&self.add_stage, &self.remove_stage)?;
        Ok(())
    }

    pub fn has_staged_changes(&self) -> bool {
        !self.add_stage.is_empty() || !self.remove_stage.is_empty()
    }

    pub fn clear_stages(&mut self) {
        self.add_stage.clear();
        self.remove_stage.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{blob_fingerprint, FileName};
    use tempfile::TempDir;

    #[test]
    fn test_load_fresh_repository() {
        let dir = TempDir::new().unwrap();
        let (storage, initial) = RepoStorage::init(dir.path(), &BranchName::master()).unwrap();

        let ctx = RepositoryContext::load(&storage).unwrap();
        assert_eq!(ctx.branch, BranchName::master());
        assert_eq!(ctx.head, initial);
        assert!(!ctx.has_staged_changes());
    }

    #[test]
    fn test_persist_and_clear() {
        let dir = TempDir::new().unwrap();
        let (storage, _) = RepoStorage::init(dir.path(), &BranchName::master()).unwrap();
        let name = FileName::new("a.txt").unwrap();

        let mut ctx = RepositoryContext::load(&storage).unwrap();
        ctx.remove_stage.insert(name.clone(), blob_fingerprint(&name, b"x"));
        ctx.persist(&storage).unwrap();

        let mut reloaded = RepositoryContext::load(&storage).unwrap();
        assert!(reloaded.has_staged_changes());
        assert!(reloaded.remove_stage.contains(&name));

        reloaded.clear_stages();
        assert!(!reloaded.has_staged_changes());
    }
}

//!   On-disk repository layout.
//!
//!  `RepoStorage` ties the object store, the reference table and the two
//!  staging files together under one repository directory:
//!
//! ```text
//! <root>/objects/<fingerprint>
//! <root>/refs/heads/<branch>
//! <root>/HEAD
//! <root>/add_stage
//! <root>/remove_stage
//! <root>/lock
//! ```
//!
//! It knows where things live, not what commands mean; command semantics
//! belong to the engine.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::storage::commit::Commit;
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::object::ObjectStore;
use crate::storage::refs::RefManager;
use crate::storage::stage::StagingArea;
use crate::storage::types::BranchName;

const OBJECTS_DIR: &str = "objects";
const HEAD_FILE: &str = "HEAD";
const ADD_STAGE_FILE: &str = "add_stage";
const REMOVE_STAGE_FILE: &str = "remove_stage";
const LOCK_FILE: &str = "lock";

/// The persisted state of one repository.
#[derive(Debug, Clone)]
pub struct RepoStorage {
    root: PathBuf,
    objects: ObjectStore,
    refs: RefManager,
}

impl RepoStorage {
    /// Whether `root` holds an initialized repository.
    pub fn exists(root: &Path) -> bool {
        root.join(HEAD_FILE).is_file() && root.join(OBJECTS_DIR).is_dir()
    }

    /// Open an existing repository.
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref();
        if !Self::exists(root) {
            return Err(StorageError::NotInitialized(root.to_path_buf()));
        }
        Ok(Self::at(root))
    }

    fn at(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            objects: ObjectStore::new(root.join(OBJECTS_DIR)),
            refs: RefManager::new(root),
        }
    }

    /// Initialize a new repository.
    ///
    /// Writes the shared root commit, creates `default_branch` at it, points
    /// HEAD there and writes two empty stages. Returns the root commit.
    pub fn init(root: impl AsRef<Path>, default_branch: &BranchName) -> StorageResult<(Self, Commit)> {
        let root = root.as_ref();
        fs::create_dir_all(root)?;
        let storage = Self {
            root: root.to_path_buf(),
            objects: ObjectStore::create(root.join(OBJECTS_DIR))?,
            refs: RefManager::new(root),
        };

        let initial = Commit::initial();
        storage.objects.put_commit(&initial)?;
        storage.refs.init_default_branch(default_branch, initial.id())?;
        storage.save_stages(&StagingArea::new(), &StagingArea::new())?;

        info!(path = %root.display(), commit = %initial.id(), "initialized repository");
        Ok((storage, initial))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn refs(&self) -> &RefManager {
        &self.refs
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Load the add-stage and the remove-stage, in that order.
    pub fn load_stages(&self) -> StorageResult<(StagingArea, StagingArea)> {
        let add = StagingArea::load(&self.root.join(ADD_STAGE_FILE))?;
        let remove = StagingArea::load(&self.root.join(REMOVE_STAGE_FILE))?;
        Ok((add, remove))
    }

    pub fn save_stages(&self, add: &StagingArea, remove: &StagingArea) -> StorageResult<()> {
        add.save(&self.root.join(ADD_STAGE_FILE))?;
        remove.save(&self.root.join(REMOVE_STAGE_FILE))
    }

    /// The commit at the tip of the current branch.
    pub fn head_commit(&self) -> StorageResult<Commit> {
        let id = self.refs.head_commit()?;
        self.objects.get_commit(id)
    }
}

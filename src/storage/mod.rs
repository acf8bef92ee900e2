//! storage layer for gitlet
//!
//! this module owns everything that is persisted: the content-addressed
//! object store, the reference table and the staging files. The engine
//! uses this API and never touches the repository directory directly.
//!
//!  # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RepoStorage                           │
//! │        (repository directory layout, stage files)           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//!  ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//!  │ ObjectStore │       │ StagingArea │       │ RefManager  │
//!  │ (fingerpr.) │       │ (add / rm)  │       │ (branches)  │
//!  └─────────────┘       └─────────────┘       └─────────────┘
//!         │
//!         ├──────────────────────┐
//!         ▼                      ▼
//!  ┌─────────────┐       ┌─────────────┐
//!  │    blob     │       │   commit    │
//!  │ (snapshots) │       │  (history)  │
//!  └─────────────┘       └─────────────┘
//!  ```
//!
//! # Usage
//!
//! ```ignore
//! use gitlet::storage::{RepoStorage, BranchName, Blob, FileName};
//!
//! let (storage, root) = RepoStorage::init("./.gitlet", &BranchName::master())?;
//!
//! let blob = Blob::new(FileName::new("a.txt")?, b"hello".to_vec());
//! storage.objects().put_blob(&blob)?;
//!
//! let head = storage.head_commit()?;
//! ```

mod atomic;
mod blob;
mod commit;
mod errors;
mod object;
mod refs;
mod repository;
mod stage;
mod types;

// Re-export public API
pub use blob::{fingerprint as blob_fingerprint, Blob};
pub use commit::{
    ancestor_depths, find_merge_base, history, Commit, CommitBuilder, HistoryIterator,
    INITIAL_COMMIT_MESSAGE,
};
pub use errors::{StorageError, StorageResult};
pub use object::{ObjectKind, ObjectStore, PrefixMatch, StoredObject};
pub use refs::RefManager;
pub use repository::RepoStorage;
pub use stage::StagingArea;
pub use types::{BlobId, BranchName, CommitId, FileName, InvalidNameError, ObjectId};

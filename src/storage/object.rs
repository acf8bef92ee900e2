//! Content-addressed object store.
//!
//! Every blob and commit lives in `objects/<fingerprint>` as a JSON envelope
//! tagged with its kind:
//!
//! ```text
//! {"kind":"blob","name":"a.txt","content":"6869"}
//! {"kind":"commit","message":"...","timestamp":"...","parents":[...],"blobs":{...}}
//! ```
//!
//! Objects are immutable and never deleted. Storing an object whose
//! fingerprint is already present is a no-op.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::atomic::write_atomic;
use crate::storage::blob::Blob;
use crate::storage::commit::Commit;
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::types::{BlobId, CommitId, ObjectId};

/// discriminant of a stored object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Commit,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectKind::Blob => write!(f, "blob"),
            ObjectKind::Commit => write!(f, "commit"),
        }
    }
}

/// the tagged envelope written for every object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoredObject {
    Blob(Blob),
    Commit(Commit),
}

impl StoredObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            StoredObject::Blob(_) => ObjectKind::Blob,
            StoredObject::Commit(_) => ObjectKind::Commit,
        }
    }

    pub fn id(&self) -> ObjectId {
        match self {
            StoredObject::Blob(blob) => blob.id().raw(),
            StoredObject::Commit(commit) => commit.id().raw(),
        }
    }
}

/// result of resolving an abbreviated commit id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixMatch {
    Unique(CommitId),
    NotFound,
    Ambiguous(Vec<CommitId>),
}

/// Append-only store of blobs and commits keyed by fingerprint.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    dir: PathBuf,
}

impl ObjectStore {
    /// Open a store rooted at an existing directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the store directory.
    pub fn create(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn object_path(&self, id: ObjectId) -> PathBuf {
        self.dir.join(id.to_hex())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.object_path(id).is_file()
    }

    /// Write an object under its own fingerprint.
    pub fn put(&self, object: &StoredObject) -> StorageResult<ObjectId> {
        let id = object.id();
        let path = self.object_path(id);
        if path.is_file() {
            debug!(%id, kind = %object.kind(), "object already stored");
            return Ok(id);
        }

        let bytes = serde_json::to_vec(object)?;
        write_atomic(&path, &bytes)?;
        debug!(%id, kind = %object.kind(), size = bytes.len(), "stored object");
        Ok(id)
    }

    pub fn put_blob(&self, blob: &Blob) -> StorageResult<BlobId> {
        self.put(&StoredObject::Blob(blob.clone()))?;
        Ok(blob.id())
    }

    pub fn put_commit(&self, commit: &Commit) -> StorageResult<CommitId> {
        self.put(&StoredObject::Commit(commit.clone()))?;
        Ok(commit.id())
    }

    /// Read an object and verify that its content still hashes to `id`.
    pub fn get(&self, id: ObjectId) -> StorageResult<StoredObject> {
        let path = self.object_path(id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::ObjectNotFound(id.to_hex()))
            }
            Err(e) => return Err(e.into()),
        };

        let object: StoredObject = serde_json::from_slice(&bytes)?;
        if object.id() != id {
            return Err(StorageError::CorruptedData {
                path,
                reason: format!("content hashes to {}", object.id()),
            });
        }
        Ok(object)
    }

    /// Load an object that must be a blob.
    pub fn get_blob(&self, id: BlobId) -> StorageResult<Blob> {
        match self.get(id.raw())? {
            StoredObject::Blob(blob) => Ok(blob),
            other => Err(StorageError::TypeMismatch {
                id: id.to_string(),
                expected: ObjectKind::Blob,
                found: other.kind(),
            }),
        }
    }

    /// Load an object that must be a commit.
    pub fn get_commit(&self, id: CommitId) -> StorageResult<Commit> {
        match self.get(id.raw())? {
            StoredObject::Commit(commit) => Ok(commit),
            other => Err(StorageError::TypeMismatch {
                id: id.to_string(),
                expected: ObjectKind::Commit,
                found: other.kind(),
            }),
        }
    }

    /// All fingerprints in the store, in ascending order.
    ///
    /// Entries whose names are not fingerprints (e.g. leftover temp files)
    /// are skipped.
    pub fn list_ids(&self) -> StorageResult<Vec<ObjectId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(id) = entry
                .file_name()
                .to_str()
                .and_then(|name| ObjectId::from_hex(name).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Every stored commit, ordered by fingerprint.
    pub fn list_commits(&self) -> StorageResult<Vec<Commit>> {
        let mut commits = Vec::new();
        for id in self.list_ids()? {
            if let StoredObject::Commit(commit) = self.get(id)? {
                commits.push(commit);
            }
        }
        Ok(commits)
    }

    /// Resolve a full or abbreviated commit id.
    ///
    /// Only commits are considered; a prefix that matches blobs alone is
    /// reported as not found.
    pub fn resolve_commit_prefix(&self, prefix: &str) -> StorageResult<PrefixMatch> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.is_empty()
            || prefix.len() > ObjectId::HEX_LEN
            || !prefix.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Ok(PrefixMatch::NotFound);
        }

        let mut matches = Vec::new();
        for id in self.list_ids()? {
            if !id.to_hex().starts_with(&prefix) {
                continue;
            }
            if let StoredObject::Commit(commit) = self.get(id)? {
                matches.push(commit.id());
            }
        }

        Ok(match matches.len() {
            0 => PrefixMatch::NotFound,
            1 => PrefixMatch::Unique(matches[0]),
            _ => PrefixMatch::Ambiguous(matches),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::types::FileName;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ObjectStore) {
        let dir = TempDir::new().unwrap();
        let store = ObjectStore::create(dir.path().join("objects")).unwrap();
        (dir, store)
    }

    fn blob(name: &str, content: &str) -> Blob {
        Blob::new(FileName::new(name).unwrap(), content.as_bytes().to_vec())
    }

    #[test]
    fn test_put_and_get_blob() {
        let (_dir, store) = setup();
        let b = blob("a.txt", "hello");

        let id = store.put_blob(&b).unwrap();
        assert!(store.contains(id.raw()));

        let loaded = store.get_blob(id).unwrap();
        assert_eq!(loaded, b);
    }

    #[test]
    fn test_put_is_idempotent() {
        let (_dir, store) = setup();
        let b = blob("a.txt", "hello");

        store.put_blob(&b).unwrap();
        store.put_blob(&b).unwrap();
        store.put_blob(&blob("a.txt", "hello")).unwrap();

        assert_eq!(store.list_ids().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_object() {
        let (_dir, store) = setup();
        let id = blob("a.txt", "never stored").id();
        let result = store.get_blob(id);
        assert!(matches!(result, Err(StorageError::ObjectNotFound(_))));
    }

    #[test]
    fn test_type_mismatch() {
        let (_dir, store) = setup();
        let id = store.put_commit(&Commit::initial()).unwrap();

        // ask for the commit as if it were a blob
        let result = store.get_blob(BlobId::new(id.raw()));
        assert!(matches!(
            result,
            Err(StorageError::TypeMismatch {
                expected: ObjectKind::Blob,
                found: ObjectKind::Commit,
                ..
            })
        ));
    }

    #[test]
    fn test_envelope_is_tagged() {
        let (_dir, store) = setup();
        let id = store.put_blob(&blob("a.txt", "x")).unwrap();
        let raw = fs::read(store.dir().join(id.to_string())).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(json["kind"], "blob");
    }

    #[test]
    fn test_tampered_object_detected() {
        let (_dir, store) = setup();
        let id = store.put_blob(&blob("a.txt", "original")).unwrap();

        let forged = serde_json::to_vec(&StoredObject::Blob(blob("a.txt", "forged"))).unwrap();
        fs::write(store.dir().join(id.to_string()), forged).unwrap();

        let result = store.get_blob(id);
        assert!(matches!(result, Err(StorageError::CorruptedData { .. })));
    }

    #[test]
    fn test_list_commits_skips_blobs_and_junk() {
        let (_dir, store) = setup();
        store.put_blob(&blob("a.txt", "x")).unwrap();
        let root = store.put_commit(&Commit::initial()).unwrap();
        fs::write(store.dir().join(".tmpXYZ"), b"partial").unwrap();

        let commits = store.list_commits().unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].id(), root);
    }

    #[test]
    fn test_resolve_commit_prefix() {
        let (_dir, store) = setup();
        let root = store.put_commit(&Commit::initial()).unwrap();
        let hex = root.to_string();

        assert_eq!(
            store.resolve_commit_prefix(&hex).unwrap(),
            PrefixMatch::Unique(root)
        );
        assert_eq!(
            store.resolve_commit_prefix(&hex[..6]).unwrap(),
            PrefixMatch::Unique(root)
        );
        assert_eq!(
            store.resolve_commit_prefix(&hex[..6].to_uppercase()).unwrap(),
            PrefixMatch::Unique(root)
        );
        assert_eq!(store.resolve_commit_prefix("").unwrap(), PrefixMatch::NotFound);
        assert_eq!(store.resolve_commit_prefix("zz").unwrap(), PrefixMatch::NotFound);
        assert_eq!(
            store.resolve_commit_prefix(&format!("{}0", hex)).unwrap(),
            PrefixMatch::NotFound
        );
    }

    #[test]
    fn test_resolve_prefix_ignores_blobs() {
        let (_dir, store) = setup();
        let id = store.put_blob(&blob("a.txt", "x")).unwrap();
        assert_eq!(
            store.resolve_commit_prefix(&id.to_string()).unwrap(),
            PrefixMatch::NotFound
        );
    }
}

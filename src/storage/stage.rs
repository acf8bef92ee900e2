//! Staging areas.
//!
//! A staging area is a pending mapping from file name to blob fingerprint.
//! The repository keeps two of them: one for additions and one for
//! removals. Both are persisted as JSON after every mutating command.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::storage::atomic::write_atomic;
use crate::storage::errors::StorageResult;
use crate::storage::types::{BlobId, FileName};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingArea {
    blobs: BTreeMap<FileName, BlobId>,
}

impl StagingArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a staging area; a missing file is an empty stage.
    pub fn load(path: &Path) -> StorageResult<Self> {
        match fs::read(path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: &Path) -> StorageResult<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &bytes)
    }

    /// stage `blob` under `name`, replacing any previous entry
    pub fn insert(&mut self, name: FileName, blob: BlobId) {
        self.blobs.insert(name, blob);
    }

    pub fn remove(&mut self, name: &FileName) -> Option<BlobId> {
        self.blobs.remove(name)
    }

    pub fn get(&self, name: &FileName) -> Option<BlobId> {
        self.blobs.get(name).copied()
    }

    pub fn contains(&self, name: &FileName) -> bool {
        self.blobs.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn clear(&mut self) {
        self.blobs.clear();
    }

    /// staged file names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &FileName> {
        self.blobs.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FileName, &BlobId)> {
        self.blobs.iter()
    }
}

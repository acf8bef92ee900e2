//!  Commit creation and history traversal
//!
//!  commits are the immutable nodes of the history DAG:
//! - every commit maps tracked file names to blob fingerprints
//! - normal commits have one parent, merge commits two, the root none
//! - all histories share the same root commit
//!
//! this module handles commit creation, first-parent history walking and
//! merge-base discovery. Commits never point at each other directly; every
//! traversal resolves parents through the [`ObjectStore`].

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::errors::StorageResult;
use crate::storage::object::ObjectStore;
use crate::storage::types::{BlobId, CommitId, FileName, ObjectId};

/// message of the root commit shared by every repository
pub const INITIAL_COMMIT_MESSAGE: &str = "initial commit";

/// an immutable commit object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CommitJson")]
pub struct Commit {
    message: String,
    timestamp: DateTime<Utc>,
    parents: Vec<CommitId>,
    blobs: BTreeMap<FileName, BlobId>,
    #[serde(skip_serializing)]
    id: CommitId,
}

#[derive(Deserialize)]
struct CommitJson {
    message: String,
    timestamp: DateTime<Utc>,
    parents: Vec<CommitId>,
    blobs: BTreeMap<FileName, BlobId>,
}

impl From<CommitJson> for Commit {
    fn from(json: CommitJson) -> Self {
        Commit::from_parts(json.message, json.timestamp, json.parents, json.blobs)
    }
}

impl Commit {
    fn from_parts(
        message: String,
        timestamp: DateTime<Utc>,
        parents: Vec<CommitId>,
        blobs: BTreeMap<FileName, BlobId>,
    ) -> Self {
        let id = fingerprint(&message, &timestamp, &parents, &blobs);
        Self {
            message,
            timestamp,
            parents,
            blobs,
            id,
        }
    }

    /// the root commit: no files, no parents, epoch timestamp
    ///
    /// its inputs are fixed, so its fingerprint is the same everywhere
    pub fn initial() -> Self {
        Self::from_parts(
            INITIAL_COMMIT_MESSAGE.to_string(),
            DateTime::UNIX_EPOCH,
            Vec::new(),
            BTreeMap::new(),
        )
    }

    pub fn id(&self) -> CommitId {
        self.id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn parents(&self) -> &[CommitId] {
        &self.parents
    }

    pub fn blobs(&self) -> &BTreeMap<FileName, BlobId> {
        &self.blobs
    }

    /// blob tracked under `name`, if any
    pub fn blob_for(&self, name: &FileName) -> Option<BlobId> {
        self.blobs.get(name).copied()
    }

    pub fn tracks(&self, name: &FileName) -> bool {
        self.blobs.contains_key(name)
    }

    /// check if this is a merge commit (has multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// get the first (mainline) parent
    pub fn first_parent(&self) -> Option<CommitId> {
        self.parents.first().copied()
    }

    /// timestamp as printed by `log`, in the local time zone
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp
            .with_timezone(&Local)
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }
}

fn fingerprint(
    message: &str,
    timestamp: &DateTime<Utc>,
    parents: &[CommitId],
    blobs: &BTreeMap<FileName, BlobId>,
) -> CommitId {
    let mut fields = Vec::with_capacity(4 + parents.len() + blobs.len());
    fields.push(message.to_string());
    fields.push(timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true));
    fields.push(format!("parents {}", parents.len()));
    fields.extend(parents.iter().map(|p| p.to_string()));
    fields.push(format!("blobs {}", blobs.len()));
    fields.extend(blobs.iter().map(|(name, blob)| format!("{} {}", blob, name)));
    CommitId::new(ObjectId::hash_fields(fields))
}

/// builder for creating commits with a fluent interface
pub struct CommitBuilder<'a> {
    store: &'a ObjectStore,
    parents: Vec<CommitId>,
    message: String,
    blobs: BTreeMap<FileName, BlobId>,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> CommitBuilder<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self {
            store,
            parents: Vec::new(),
            message: String::new(),
            blobs: BTreeMap::new(),
            timestamp: None,
        }
    }

    /// add a parent commit
    pub fn parent(mut self, parent: CommitId) -> Self {
        self.parents.push(parent);
        self
    }

    /// set multiple parents (for merge commits)
    pub fn parents(mut self, parents: Vec<CommitId>) -> Self {
        self.parents = parents;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// set the full file mapping of the new commit
    pub fn blobs(mut self, blobs: BTreeMap<FileName, BlobId>) -> Self {
        self.blobs = blobs;
        self
    }

    /// pin the timestamp (defaults to now)
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// create the commit, store it and return it
    pub fn commit(self) -> StorageResult<Commit> {
        let timestamp = self.timestamp.unwrap_or_else(Utc::now);
        let commit = Commit::from_parts(self.message, timestamp, self.parents, self.blobs);
        self.store.put_commit(&commit)?;
        Ok(commit)
    }
}

/// iterate over first-parent history starting from a commit
pub struct HistoryIterator<'a> {
    store: &'a ObjectStore,
    next: Option<CommitId>,
}

impl<'a> HistoryIterator<'a> {
    pub fn new(store: &'a ObjectStore, start: CommitId) -> Self {
        Self {
            store,
            next: Some(start),
        }
    }
}

impl Iterator for HistoryIterator<'_> {
    type Item = StorageResult<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.store.get_commit(id) {
            Ok(commit) => {
                self.next = commit.first_parent();
                Some(Ok(commit))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// get first-parent history for a commit, newest first
pub fn history(store: &ObjectStore, start: CommitId) -> HistoryIterator<'_> {
    HistoryIterator::new(store, start)
}

/// breadth-first walk over every parent link, recording the BFS depth of
/// each ancestor (the start commit has depth 0)
pub fn ancestor_depths(store: &ObjectStore, start: CommitId) -> StorageResult<HashMap<CommitId, usize>> {
    let mut depths = HashMap::new();
    let mut queue = VecDeque::from([(start, 0usize)]);

    while let Some((id, depth)) = queue.pop_front() {
        if depths.contains_key(&id) {
            continue;
        }
        depths.insert(id, depth);
        let commit = store.get_commit(id)?;
        for parent in commit.parents() {
            if !depths.contains_key(parent) {
                queue.push_back((*parent, depth + 1));
            }
        }
    }

    Ok(depths)
}

/// find the merge base (best common ancestor) of two commits
///
/// Candidates are the commits reachable from both tips. A candidate that is
/// itself an ancestor of another candidate is never chosen. Among the
/// remaining ones the candidate closest to both tips wins; ties go to the
/// one closer to `ours`, then to the smaller fingerprint. The result only
/// depends on the DAG.
///
/// returns None if there is no common ancestor
pub fn find_merge_base(
    store: &ObjectStore,
    ours: CommitId,
    theirs: CommitId,
) -> StorageResult<Option<CommitId>> {
    let our_depths = ancestor_depths(store, ours)?;
    let their_depths = ancestor_depths(store, theirs)?;

    let candidates: Vec<CommitId> = our_depths
        .keys()
        .filter(|id| their_depths.contains_key(id))
        .copied()
        .collect();

    // everything reachable from a candidate's parents is a strictly older
    // common ancestor
    let mut dominated = HashSet::new();
    let mut queue = VecDeque::new();
    for id in &candidates {
        queue.extend(store.get_commit(*id)?.parents().iter().copied());
    }
    while let Some(id) = queue.pop_front() {
        if !dominated.insert(id) {
            continue;
        }
        queue.extend(store.get_commit(id)?.parents().iter().copied());
    }

    let best = candidates
        .into_iter()
        .filter(|id| !dominated.contains(id))
        .min_by_key(|id| {
            let ours = our_depths[id];
            let theirs = their_depths[id];
            (ours + theirs, ours, *id)
        });

    Ok(best)
}

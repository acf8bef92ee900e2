//! Three-way merge of another branch into the current one.
//!
//! Every file name present in the merge base, the current commit or the
//! given branch is resolved independently. All resolutions, including the
//! conflict blobs, are computed and checked against the working directory
//! before the first write.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::engine::error::{GitletError, GitletResult};
use crate::engine::output::MergeOutcome;
use crate::engine::repository::Repository;
use crate::storage::{find_merge_base, Blob, BlobId, BranchName, FileName};

/// What happens to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    /// write the given branch's version and stage it
    Take(BlobId),
    /// delete the file and stage the removal
    Delete,
    /// both sides changed it differently
    Conflict {
        ours: Option<BlobId>,
        theirs: Option<BlobId>,
    },
}

/// Resolve one file from its base, current and given-branch versions.
/// None means the current version stays.
fn resolve(base: Option<BlobId>, ours: Option<BlobId>, theirs: Option<BlobId>) -> Option<Resolution> {
    if ours == theirs || theirs == base {
        return None;
    }
    if ours == base {
        return Some(match theirs {
            Some(id) => Resolution::Take(id),
            None => Resolution::Delete,
        });
    }
    Some(Resolution::Conflict { ours, theirs })
}

fn plan(
    base: &BTreeMap<FileName, BlobId>,
    ours: &BTreeMap<FileName, BlobId>,
    theirs: &BTreeMap<FileName, BlobId>,
) -> Vec<(FileName, Resolution)> {
    let names: BTreeSet<&FileName> = base.keys().chain(ours.keys()).chain(theirs.keys()).collect();
    names
        .into_iter()
        .filter_map(|name| {
            resolve(
                base.get(name).copied(),
                ours.get(name).copied(),
                theirs.get(name).copied(),
            )
            .map(|resolution| (name.clone(), resolution))
        })
        .collect()
}

impl Repository {
    /// Merge the given branch into the current one.
    pub fn merge(&self, name: &str) -> GitletResult<MergeOutcome> {
        let mut ctx = self.load_context()?;
        if ctx.has_staged_changes() {
            return Err(GitletError::UncommittedChanges);
        }

        let branch = BranchName::new(name).map_err(|_| GitletError::BranchNotFound)?;
        let refs = self.storage().refs();
        if !refs.branch_exists(&branch) {
            return Err(GitletError::BranchNotFound);
        }
        if branch == ctx.branch {
            return Err(GitletError::CannotMergeSelf);
        }

        let objects = self.storage().objects();
        let other = objects.get_commit(refs.resolve_branch(&branch)?)?;
        let base_id = find_merge_base(objects, ctx.head.id(), other.id())?;
        if base_id == Some(other.id()) {
            return Err(GitletError::MergeBranchIsAncestor);
        }
        let fast_forward = base_id == Some(ctx.head.id());
        let base_blobs = match base_id {
            Some(id) => objects.get_commit(id)?.blobs().clone(),
            None => BTreeMap::new(),
        };
        info!(
            %branch,
            base = ?base_id.map(|id| id.short()),
            fast_forward,
            "merging"
        );

        // the blobs every written file will hold, conflicts included
        let mut writes: Vec<(FileName, Blob)> = Vec::new();
        let mut deletes: Vec<FileName> = Vec::new();
        let mut conflicted = false;
        for (file, resolution) in plan(&base_blobs, ctx.head.blobs(), other.blobs()) {
            match resolution {
                Resolution::Take(id) => writes.push((file, objects.get_blob(id)?)),
                Resolution::Delete => deletes.push(file),
                Resolution::Conflict { ours, theirs } => {
                    let content = conflict_content(
                        self.blob_content(ours)?.as_deref(),
                        self.blob_content(theirs)?.as_deref(),
                    );
                    warn!(%file, "merge conflict");
                    conflicted = true;
                    writes.push((file.clone(), Blob::new(file, content)));
                }
            }
        }

        self.check_untracked(&ctx.head, writes.iter().map(|(file, blob)| (file, blob.id())))?;

        for (file, blob) in &writes {
            objects.put_blob(blob)?;
            self.worktree().write(file, blob.content())?;
            ctx.add_stage.insert(file.clone(), blob.id());
        }
        for file in deletes {
            self.worktree().delete(&file)?;
            if let Some(id) = ctx.head.blob_for(&file) {
                ctx.remove_stage.insert(file, id);
            }
        }

        let message = format!("Merged {} into {}.", branch, ctx.branch);
        let parents = vec![ctx.head.id(), other.id()];
        let commit = self.commit_staged(&mut ctx, &message, parents)?;

        Ok(MergeOutcome {
            commit: commit.id(),
            fast_forward,
            conflicted,
        })
    }

    fn blob_content(&self, id: Option<BlobId>) -> GitletResult<Option<Vec<u8>>> {
        match id {
            Some(id) => Ok(Some(self.storage().objects().get_blob(id)?.into_content())),
            None => Ok(None),
        }
    }
}

fn conflict_content(ours: Option<&[u8]>, theirs: Option<&[u8]>) -> Vec<u8> {
    let mut content = b"<<<<<<< HEAD\n".to_vec();
    content.extend_from_slice(ours.unwrap_or_default());
    content.extend_from_slice(b"=======\n");
    content.extend_from_slice(theirs.unwrap_or_default());
    content.extend_from_slice(b">>>>>>>\n");
    content
}

//! `status`: branches, stages and the derived working-directory state.

use std::collections::BTreeMap;

use crate::engine::context::RepositoryContext;
use crate::engine::error::GitletResult;
use crate::engine::output::{Modification, StatusReport};
use crate::engine::repository::Repository;
use crate::engine::worktree::WorkTree;
use crate::storage::FileName;

impl Repository {
    pub fn status(&self) -> GitletResult<StatusReport> {
        let ctx = self.load_context()?;
        let branches = self.storage().refs().list_branches()?;
        let modified = unstaged_modifications(&ctx, self.worktree())?;
        let untracked = untracked_files(&ctx, self.worktree())?;

        Ok(StatusReport {
            current_branch: ctx.branch.clone(),
            branches,
            staged: ctx.add_stage.names().cloned().collect(),
            removed: ctx.remove_stage.names().cloned().collect(),
            modified: modified.into_iter().collect(),
            untracked,
        })
    }
}

/// Files whose working copy differs from what the next commit would record.
///
/// Keyed by name; a later classification replaces an earlier one.
fn unstaged_modifications(
    ctx: &RepositoryContext,
    worktree: &WorkTree,
) -> GitletResult<BTreeMap<FileName, Modification>> {
    let mut result = BTreeMap::new();

    for (name, tracked) in ctx.head.blobs() {
        match worktree.fingerprint(name)? {
            Some(live) if live != *tracked && !ctx.add_stage.contains(name) => {
                result.insert(name.clone(), Modification::Modified);
            }
            None if !ctx.remove_stage.contains(name) => {
                result.insert(name.clone(), Modification::Deleted);
            }
            _ => {}
        }
    }

    for (name, staged) in ctx.add_stage.iter() {
        match worktree.fingerprint(name)? {
            Some(live) if live != *staged => {
                result.insert(name.clone(), Modification::Modified);
            }
            None => {
                result.insert(name.clone(), Modification::Deleted);
            }
            _ => {}
        }
    }

    Ok(result)
}

/// Working files that are neither staged for addition nor tracked, plus
/// files staged for removal that are present again.
fn untracked_files(ctx: &RepositoryContext, worktree: &WorkTree) -> GitletResult<Vec<FileName>> {
    Ok(worktree
        .files()?
        .into_iter()
        .filter(|name| {
            let known = ctx.add_stage.contains(name) || ctx.head.tracks(name);
            !known || ctx.remove_stage.contains(name)
        })
        .collect())
}

//! Rendered command results.
//!
//! Commands return these values; the binary only prints them.

use std::fmt;

use crate::storage::{BranchName, Commit, CommitId, FileName};

/// One commit as shown by `log` and `global-log`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: CommitId,
    /// first two parents of a merge commit
    pub merge_parents: Option<(CommitId, CommitId)>,
    pub date: String,
    pub message: String,
}

impl From<&Commit> for LogEntry {
    fn from(commit: &Commit) -> Self {
        let merge_parents = match commit.parents() {
            [first, second, ..] => Some((*first, *second)),
            _ => None,
        };
        Self {
            id: commit.id(),
            merge_parents,
            date: commit.formatted_timestamp(),
            message: commit.message().to_string(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===")?;
        writeln!(f, "commit {}", self.id)?;
        if let Some((first, second)) = &self.merge_parents {
            writeln!(f, "Merge: {} {}", first.short(), second.short())?;
        }
        writeln!(f, "Date: {}", self.date)?;
        writeln!(f, "{}", self.message)
    }
}

/// A sequence of log entries, each followed by a blank line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Log(pub Vec<LogEntry>);

impl Log {
    pub fn entries(&self) -> &[LogEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Log {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.0 {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// How a file differs from what would be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modification {
    Modified,
    Deleted,
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modification::Modified => write!(f, "modified"),
            Modification::Deleted => write!(f, "deleted"),
        }
    }
}

/// Output of `status`. Every list is sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub current_branch: BranchName,
    pub branches: Vec<BranchName>,
    pub staged: Vec<FileName>,
    pub removed: Vec<FileName>,
    pub modified: Vec<(FileName, Modification)>,
    pub untracked: Vec<FileName>,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Branches ===")?;
        for branch in &self.branches {
            if *branch == self.current_branch {
                writeln!(f, "*{}", branch)?;
            } else {
                writeln!(f, "{}", branch)?;
            }
        }
        writeln!(f)?;

        write_section(f, "Staged Files", &self.staged)?;
        write_section(f, "Removed Files", &self.removed)?;

        writeln!(f, "=== Modifications Not Staged For Commit ===")?;
        for (name, kind) in &self.modified {
            writeln!(f, "{} ({})", name, kind)?;
        }
        writeln!(f)?;

        write_section(f, "Untracked Files", &self.untracked)
    }
}

fn write_section(f: &mut fmt::Formatter<'_>, title: &str, names: &[FileName]) -> fmt::Result {
    writeln!(f, "=== {} ===", title)?;
    for name in names {
        writeln!(f, "{}", name)?;
    }
    writeln!(f)
}

/// Result of a successful merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub commit: CommitId,
    /// the current branch was an ancestor of the given one
    pub fast_forward: bool,
    pub conflicted: bool,
}

impl fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fast_forward {
            writeln!(f, "Current branch fast-forwarded.")?;
        }
        if self.conflicted {
            writeln!(f, "Encountered a merge conflict.")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> FileName {
        FileName::new(s).unwrap()
    }

    #[test]
    fn test_log_entry_format() {
        let root = Commit::initial();
        let entry = LogEntry::from(&root);
        let text = entry.to_string();

        assert!(text.starts_with(&format!("===\ncommit {}\nDate: ", root.id())));
        assert!(text.ends_with("\ninitial commit\n"));
        assert!(!text.contains("Merge:"));
    }

    #[test]
    fn test_merge_entry_shows_short_parents() {
        let a = Commit::initial().id();
        let entry = LogEntry {
            id: a,
            merge_parents: Some((a, a)),
            date: "Thu Jan 1 00:00:00 1970 +0000".to_string(),
            message: "Merged b into master.".to_string(),
        };
        let expected = format!(
            "===\ncommit {}\nMerge: {} {}\nDate: Thu Jan 1 00:00:00 1970 +0000\nMerged b into master.\n",
            a,
            a.short(),
            a.short()
        );
        assert_eq!(entry.to_string(), expected);
    }

    #[test]
    fn test_log_separates_entries_with_blank_lines() {
        let entry = LogEntry::from(&Commit::initial());
        let log = Log(vec![entry.clone(), entry.clone()]);
        assert_eq!(log.to_string(), format!("{}\n{}\n", entry, entry));
    }

    #[test]
    fn test_status_format() {
        let report = StatusReport {
            current_branch: BranchName::master(),
            branches: vec![BranchName::master(), BranchName::new("other").unwrap()],
            staged: vec![name("a.txt")],
            removed: vec![name("b.txt")],
            modified: vec![
                (name("c.txt"), Modification::Modified),
                (name("d.txt"), Modification::Deleted),
            ],
            untracked: vec![name("e.txt")],
        };

        let expected = "\
=== Branches ===
*master
other

=== Staged Files ===
a.txt

=== Removed Files ===
b.txt

=== Modifications Not Staged For Commit ===
c.txt (modified)
d.txt (deleted)

=== Untracked Files ===
e.txt

";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_merge_outcome_notices() {
        let id = Commit::initial().id();
        let quiet = MergeOutcome { commit: id, fast_forward: false, conflicted: false };
        assert_eq!(quiet.to_string(), "");

        let both = MergeOutcome { commit: id, fast_forward: true, conflicted: true };
        assert_eq!(
            both.to_string(),
            "Current branch fast-forwarded.\nEncountered a merge conflict.\n"
        );
    }
}

//! Property-based tests for fingerprints and staging.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use std::fs;

use proptest::prelude::*;
use tempfile::TempDir;

use gitlet::engine::{Repository, RepositoryConfig};
use gitlet::storage::{blob_fingerprint, Blob, FileName};

/// Strategy for generating valid flat file names.
fn file_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}\\.txt"
}

/// One step applied to the working directory and stages.
#[derive(Debug, Clone)]
enum Op {
    Write(usize, String),
    Add(usize),
    Rm(usize),
    Commit,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..4usize, "[a-c]{0,3}").prop_map(|(f, c)| Op::Write(f, c)),
        (0..4usize).prop_map(Op::Add),
        (0..4usize).prop_map(Op::Rm),
        Just(Op::Commit),
    ]
}

const FILES: [&str; 4] = ["a.txt", "b.txt", "c.txt", "d.txt"];

proptest! {
    #[test]
    fn blob_fingerprint_is_deterministic(name in file_name(), content in prop::collection::vec(any::<u8>(), 0..256)) {
        let name = FileName::new(name).unwrap();
        let a = Blob::new(name.clone(), content.clone());
        let b = Blob::new(name.clone(), content.clone());

        prop_assert_eq!(a.id(), b.id());
        prop_assert_eq!(a.id(), blob_fingerprint(&name, &content));
    }

    #[test]
    fn blob_fingerprint_depends_on_name(a in file_name(), b in file_name(), content in "[ -~]{0,64}") {
        prop_assume!(a != b);
        let a = FileName::new(a).unwrap();
        let b = FileName::new(b).unwrap();
        prop_assert_ne!(
            blob_fingerprint(&a, content.as_bytes()),
            blob_fingerprint(&b, content.as_bytes())
        );
    }

    #[test]
    fn blob_fingerprint_depends_on_content(name in file_name(), x in "[ -~]{0,64}", y in "[ -~]{0,64}") {
        prop_assume!(x != y);
        let name = FileName::new(name).unwrap();
        prop_assert_ne!(
            blob_fingerprint(&name, x.as_bytes()),
            blob_fingerprint(&name, y.as_bytes())
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn staged_and_removed_are_disjoint(ops in prop::collection::vec(op(), 1..24)) {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(RepositoryConfig::new(dir.path())).unwrap();

        for op in ops {
            // contract errors (missing file, nothing to commit, ...) are
            // part of the exercise
            let _ = match op {
                Op::Write(f, content) => {
                    fs::write(dir.path().join(FILES[f]), content).unwrap();
                    Ok(())
                }
                Op::Add(f) => repo.add(FILES[f]),
                Op::Rm(f) => repo.rm(FILES[f]),
                Op::Commit => repo.commit("step").map(|_| ()),
            };

            let status = repo.status().unwrap();
            for name in &status.staged {
                prop_assert!(!status.removed.contains(name), "{} in both stages", name);
            }
        }
    }
}

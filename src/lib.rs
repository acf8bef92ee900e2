//! gitlet - a minimal content-addressed version-control system
//!
//! Files are snapshotted into immutable, fingerprinted blobs; commits map
//! file names to blobs and form a DAG rooted at a shared initial commit.
//! Branches are named pointers into that DAG, and the working directory is
//! moved between commits by checkout, reset and three-way merge.
//!
//! - [`storage`] persists objects, references and staging areas.
//! - [`engine`] implements the commands on top of it.
//!
//! # Example
//!
//! ```no_run
//! use gitlet::engine::{Repository, RepositoryConfig};
//!
//! let repo = Repository::init(RepositoryConfig::new(".")).unwrap();
//! std::fs::write("hello.txt", "hello").unwrap();
//! repo.add("hello.txt").unwrap();
//! repo.commit("say hello").unwrap();
//! print!("{}", repo.log().unwrap());
//! ```

pub mod engine;
pub mod storage;

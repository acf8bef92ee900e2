//! Repository engine.
//!
//! One [`Repository`] method per command. Each method validates fully,
//! then mutates the working directory, stages and references, and
//! returns a printable result.
//!
//! # Usage
//!
//! ```ignore
//! use gitlet::engine::{Repository, RepositoryConfig};
//!
//! let repo = Repository::init(RepositoryConfig::new("."))?;
//! repo.add("hello.txt")?;
//! repo.commit("say hello")?;
//! print!("{}", repo.log()?);
//! ```

mod checkout;
mod commands;
mod config;
mod context;
mod error;
mod lock;
mod merge;
mod output;
mod repository;
mod status;
mod worktree;

pub use config::{RepositoryConfig, DEFAULT_REPO_DIR};
pub use context::RepositoryContext;
pub use error::{GitletError, GitletResult};
pub use lock::RepoLock;
pub use output::{Log, LogEntry, MergeOutcome, Modification, StatusReport};
pub use repository::Repository;
pub use worktree::WorkTree;

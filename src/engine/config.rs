//! Repository configuration.

use std::path::PathBuf;

use crate::storage::BranchName;

/// Name of the repository directory inside the working directory.
pub const DEFAULT_REPO_DIR: &str = ".gitlet";

/// Repository configuration options.
#[derive(Debug, Clone)]
pub struct RepositoryConfig {
    /// Working directory holding the user's files.
    pub work_dir: PathBuf,
    /// Name of the repository directory inside `work_dir`.
    pub repo_dir_name: String,
    /// Branch created by `init`.
    pub default_branch: BranchName,
    /// Enable verbose logging.
    pub verbose: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            repo_dir_name: DEFAULT_REPO_DIR.to_string(),
            default_branch: BranchName::master(),
            verbose: false,
        }
    }
}

impl RepositoryConfig {
    /// Create a new configuration for the given working directory.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Default::default()
        }
    }

    /// Set the repository directory name.
    pub fn repo_dir_name(mut self, name: impl Into<String>) -> Self {
        self.repo_dir_name = name.into();
        self
    }

    /// Set the branch `init` creates.
    pub fn default_branch(mut self, branch: BranchName) -> Self {
        self.default_branch = branch;
        self
    }

    /// Set verbose flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// Full path of the repository directory.
    pub fn repo_path(&self) -> PathBuf {
        self.work_dir.join(&self.repo_dir_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RepositoryConfig::new("/work");
        assert_eq!(config.repo_path(), PathBuf::from("/work/.gitlet"));
        assert_eq!(config.default_branch, BranchName::master());
        assert!(!config.verbose);
    }

    #[test]
    fn test_builder() {
        let config = RepositoryConfig::new("/work")
            .repo_dir_name(".vcs")
            .default_branch(BranchName::new("main").unwrap())
            .verbose(true);
        assert_eq!(config.repo_path(), PathBuf::from("/work/.vcs"));
        assert_eq!(config.default_branch.as_str(), "main");
        assert!(config.verbose);
    }
}

//! core type-safe wrappers around the primitives of the storage layer.

use std::fmt;
use std::fmt::Formatter;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Raw SHA-1 fingerprint of a stored object.
///
/// Serialized as 40 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId([u8; 20]);

impl ObjectId {
    /// length of the hex form
    pub const HEX_LEN: usize = 40;

    /// hash a sequence of fields, each terminated by a NUL separator
    pub(crate) fn hash_fields<I, T>(fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        let mut hasher = Sha1::new();
        for field in fields {
            hasher.update(field.as_ref());
            hasher.update([0u8]);
        }
        Self(hasher.finalize().into())
    }

    /// parse an ObjectId from a full hex string
    pub fn from_hex(hex_str: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex_str, &mut bytes)?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// short form used in merge log lines
    pub fn short(&self) -> String {
        self.to_hex()[..7].to_string()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for ObjectId {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_hex()
    }
}

/// This makes sure we don't accidentally pass a blob ID where a commit ID
/// is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(pub(crate) ObjectId);

impl CommitId {
    pub(crate) fn new(oid: ObjectId) -> Self {
        Self(oid)
    }

    pub fn raw(&self) -> ObjectId {
        self.0
    }

    /// parse CommitId from a full hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        ObjectId::from_hex(hex).map(CommitId)
    }

    /// short form of the commit ID
    pub fn short(&self) -> String {
        self.0.short()
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// blob identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(pub(crate) ObjectId);

impl BlobId {
    pub(crate) fn new(oid: ObjectId) -> Self {
        Self(oid)
    }

    pub fn raw(&self) -> ObjectId {
        self.0
    }

    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        ObjectId::from_hex(hex).map(BlobId)
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated working-directory file name.
///
/// The working tree is flat, so a file name is a single path component.
/// Arbitrary user paths are reduced to their last component with
/// [`FileName::from_user_path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileName(String);

impl FileName {
    /// create a new FileName, validating the input
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// reduce a user-supplied path (relative or absolute) to its file name
    pub fn from_user_path(path: &str) -> Result<Self, InvalidNameError> {
        let name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| InvalidNameError::InvalidPath(path.to_string()))?;
        Self::new(name)
    }

    fn validate(name: &str) -> Result<(), InvalidNameError> {
        if name.is_empty() {
            return Err(InvalidNameError::Empty);
        }
        if name == "." || name == ".." {
            return Err(InvalidNameError::InvalidPath(name.to_string()));
        }
        if let Some(position) = name.find(['/', '\\', '\0']) {
            let char = name[position..].chars().next().unwrap_or('/');
            return Err(InvalidNameError::InvalidCharacter { char, position });
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for FileName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl TryFrom<String> for FileName {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FileName> for String {
    fn from(name: FileName) -> Self {
        name.0
    }
}

/// a branch name
///
/// Branch names are stored as plain files under `refs/heads`, so they
/// have to be a single, non-hidden path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    /// the default branch created by `init`
    pub const MASTER: &'static str = "master";

    /// create a new BranchName
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidNameError::Empty);
        }
        if name.starts_with('.') || name.contains(['/', '\\', '\0']) {
            return Err(InvalidNameError::InvalidPath(name));
        }
        Ok(Self(name))
    }

    pub fn master() -> Self {
        Self(Self::MASTER.to_string())
    }

    /// get the ref path relative to the repository directory
    pub fn as_ref_path(&self) -> String {
        format!("refs/heads/{}", self.0)
    }

    /// get the short name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// error type for invalid names (files, branches)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidNameError {
    Empty,
    InvalidCharacter { char: char, position: usize },
    InvalidPath(String),
}

impl fmt::Display for InvalidNameError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name cannot be empty"),
            Self::InvalidCharacter { char, position } => {
                write!(f, "invalid character '{}' at position {}", char, position)
            }
            Self::InvalidPath(path) => write!(f, "invalid path: '{}'", path),
        }
    }
}

impl std::error::Error for InvalidNameError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_hex_roundtrip() {
        let id = ObjectId::hash_fields(["hello"]);
        let hex = id.to_hex();
        assert_eq!(hex.len(), ObjectId::HEX_LEN);
        assert_eq!(ObjectId::from_hex(&hex).unwrap(), id);
        assert_eq!(id.short(), hex[..7]);
    }

    #[test]
    fn test_field_separation_matters() {
        // "ab" + "c" must not collide with "a" + "bc"
        let a = ObjectId::hash_fields(["ab", "c"]);
        let b = ObjectId::hash_fields(["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_object_id_rejects_bad_hex() {
        assert!(ObjectId::from_hex("xyz").is_err());
        assert!(ObjectId::from_hex("abcd").is_err());
    }

    #[test]
    fn test_file_name_valid() {
        assert!(FileName::new("a.txt").is_ok());
        assert!(FileName::new(".hidden").is_ok());
        assert!(FileName::new("with space.md").is_ok());
    }

    #[test]
    fn test_file_name_invalid() {
        assert!(FileName::new("").is_err());
        assert!(FileName::new("..").is_err());
        assert!(FileName::new("dir/a.txt").is_err());
    }

    #[test]
    fn test_file_name_from_user_path() {
        assert_eq!(FileName::from_user_path("a.txt").unwrap().as_str(), "a.txt");
        assert_eq!(FileName::from_user_path("./a.txt").unwrap().as_str(), "a.txt");
        assert_eq!(FileName::from_user_path("/tmp/w/b.txt").unwrap().as_str(), "b.txt");
        assert!(FileName::from_user_path("/").is_err());
    }

    #[test]
    fn test_branch_name() {
        assert_eq!(BranchName::master().as_str(), "master");
        assert_eq!(BranchName::master().as_ref_path(), "refs/heads/master");
        assert!(BranchName::new("feature-1").is_ok());
        assert!(BranchName::new("").is_err());
        assert!(BranchName::new("a/b").is_err());
        assert!(BranchName::new(".hidden").is_err());
    }
}

//! Blob objects: one file's content snapshot.
//!
//! A blob is identified by a fingerprint over its file name, its length and
//! its bytes. Two files with the same name and content therefore collapse to
//! a single stored object.

use serde::{Deserialize, Serialize};

use crate::storage::types::{BlobId, FileName, ObjectId};

/// an immutable snapshot of a single working file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BlobJson")]
pub struct Blob {
    name: FileName,
    #[serde(with = "hex")]
    content: Vec<u8>,
    #[serde(skip_serializing)]
    id: BlobId,
}

/// on-disk shape of a blob; the fingerprint is recomputed on load
#[derive(Deserialize)]
struct BlobJson {
    name: FileName,
    #[serde(with = "hex")]
    content: Vec<u8>,
}

impl From<BlobJson> for Blob {
    fn from(json: BlobJson) -> Self {
        Blob::new(json.name, json.content)
    }
}

impl Blob {
    pub fn new(name: FileName, content: impl Into<Vec<u8>>) -> Self {
        let content = content.into();
        let id = fingerprint(&name, &content);
        Self { name, content, id }
    }

    pub fn id(&self) -> BlobId {
        self.id
    }

    pub fn name(&self) -> &FileName {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn into_content(self) -> Vec<u8> {
        self.content
    }
}

/// compute the fingerprint a blob with this name and content would have
///
/// used to compare live working files against tracked versions without
/// building (or storing) a blob
pub fn fingerprint(name: &FileName, content: &[u8]) -> BlobId {
    let len = content.len().to_string();
    BlobId::new(ObjectId::hash_fields([
        name.as_str().as_bytes(),
        len.as_bytes(),
        content,
    ]))
}

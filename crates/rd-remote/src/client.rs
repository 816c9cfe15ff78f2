//! Content client trait and the data it exchanges.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// Repository coordinates: owner, repository name and a branch, tag or commit sha.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepoRef {
    /// Account or organisation owning the repository.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Branch name, tag or commit sha.
    pub reference: String,
}

impl RepoRef {
    /// Create repository coordinates.
    #[must_use]
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            reference: reference.into(),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.owner, self.repo, self.reference)
    }
}

/// Node type in a repository tree listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Plain file.
    Blob,
    /// Directory.
    Tree,
    /// Submodule pointer.
    Commit,
    /// Anything else the remote reports.
    #[serde(other)]
    Other,
}

/// One node of a recursive tree listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Repository-relative path (no leading slash).
    pub path: String,
    /// Node type.
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes (blobs only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Object id, usable as a content stamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

impl TreeEntry {
    /// True for plain files.
    #[must_use]
    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

/// Decoded content of one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFile {
    /// Repository-relative path the content was fetched from.
    pub path: String,
    /// File text (decoded from the transport encoding).
    pub content: String,
    /// Object id of the blob.
    pub sha: String,
}

/// Read access to a remote content repository.
///
/// Implementations translate every failure into a [`RemoteError`] with a
/// semantic kind; callers decide which kinds count as "absent".
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// List the repository tree at `repo.reference`.
    ///
    /// With `recursive` set, every nested file and directory is returned in
    /// the remote's order.
    async fn tree(&self, repo: &RepoRef, recursive: bool) -> Result<Vec<TreeEntry>, RemoteError>;

    /// Fetch one file's content at `repo.reference`.
    ///
    /// Fails with [`RemoteErrorKind::NotFound`](crate::RemoteErrorKind::NotFound)
    /// for a missing path and [`RemoteErrorKind::NotAFile`](crate::RemoteErrorKind::NotAFile)
    /// for directories and other non-blob nodes.
    async fn content(&self, repo: &RepoRef, path: &str) -> Result<RemoteFile, RemoteError>;
}

//! Mock content client for testing.
//!
//! Provides [`MockClient`] for unit testing without network access.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use sha1::{Digest, Sha1};

use crate::client::{ContentClient, EntryKind, RemoteFile, RepoRef, TreeEntry};
use crate::error::{RemoteError, RemoteErrorKind};

/// Backend identifier attached to errors.
const BACKEND: &str = "Mock";

/// Git blob object id for `content`.
fn blob_sha(content: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(format!("blob {}\0", content.len()).as_bytes());
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Mock client for testing.
///
/// Stores files in memory, in insertion order. Use the builder methods to
/// configure the mock with test data and injected failures, and the counters
/// to assert how often the remote was hit.
///
/// # Example
///
/// ```ignore
/// use rd_remote::{ContentClient, MockClient, RepoRef};
///
/// let client = MockClient::new()
///     .with_file("content/docs/index.mdx", "---\ntitle: Home\n---\n");
///
/// let repo = RepoRef::new("acme", "docs", "main");
/// let tree = client.tree(&repo, true).await?;
/// let file = client.content(&repo, "content/docs/index.mdx").await?;
/// ```
#[derive(Debug, Default)]
pub struct MockClient {
    files: RwLock<Vec<(String, String)>>,
    extra_entries: RwLock<Vec<TreeEntry>>,
    failures: RwLock<HashMap<String, RemoteErrorKind>>,
    tree_failure: RwLock<Option<RemoteErrorKind>>,
    tree_calls: AtomicUsize,
    content_calls: RwLock<HashMap<String, usize>>,
}

impl MockClient {
    /// Create a new empty mock client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file.
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.set_file(path, content);
        self
    }

    /// Add a raw tree entry (e.g., a submodule) that has no content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_tree_entry(self, entry: TreeEntry) -> Self {
        self.extra_entries.write().unwrap().push(entry);
        self
    }

    /// Make every content fetch of `path` fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, path: impl Into<String>, kind: RemoteErrorKind) -> Self {
        self.failures.write().unwrap().insert(path.into(), kind);
        self
    }

    /// Make tree listings fail with `kind`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_tree_failure(self, kind: RemoteErrorKind) -> Self {
        *self.tree_failure.write().unwrap() = Some(kind);
        self
    }

    /// Add or replace a file in place.
    ///
    /// Replacing keeps the file's original position in the tree.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_file(&self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        let mut files = self.files.write().unwrap();
        if let Some(existing) = files.iter_mut().find(|(p, _)| *p == path) {
            existing.1 = content;
        } else {
            files.push((path, content));
        }
    }

    /// Remove a file.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove_file(&self, path: &str) {
        self.files.write().unwrap().retain(|(p, _)| p != path);
    }

    /// Number of tree listings served or failed.
    pub fn tree_calls(&self) -> usize {
        self.tree_calls.load(Ordering::SeqCst)
    }

    /// Number of content fetches issued for `path`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn content_calls(&self, path: &str) -> usize {
        self.content_calls
            .read()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(0)
    }

    /// Number of content fetches across all paths.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn total_content_calls(&self) -> usize {
        self.content_calls.read().unwrap().values().sum()
    }

    /// Build tree entries: parent directories first, then each file.
    fn entries(&self) -> Vec<TreeEntry> {
        let files = self.files.read().unwrap();
        let mut entries: Vec<TreeEntry> = Vec::new();

        for (path, content) in files.iter() {
            let mut dir = String::new();
            let segments: Vec<&str> = path.split('/').collect();
            for segment in &segments[..segments.len() - 1] {
                if !dir.is_empty() {
                    dir.push('/');
                }
                dir.push_str(segment);
                if !entries.iter().any(|e| e.path == dir) {
                    entries.push(TreeEntry {
                        path: dir.clone(),
                        kind: EntryKind::Tree,
                        size: None,
                        sha: None,
                    });
                }
            }
            entries.push(TreeEntry {
                path: path.clone(),
                kind: EntryKind::Blob,
                size: Some(content.len() as u64),
                sha: Some(blob_sha(content)),
            });
        }

        entries.extend(self.extra_entries.read().unwrap().iter().cloned());
        entries
    }
}

#[async_trait]
impl ContentClient for MockClient {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn tree(&self, _repo: &RepoRef, recursive: bool) -> Result<Vec<TreeEntry>, RemoteError> {
        self.tree_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(kind) = *self.tree_failure.read().unwrap() {
            return Err(RemoteError::new(kind).with_backend(BACKEND));
        }

        let entries = self.entries();
        if recursive {
            Ok(entries)
        } else {
            Ok(entries.into_iter().filter(|e| !e.path.contains('/')).collect())
        }
    }

    async fn content(&self, _repo: &RepoRef, path: &str) -> Result<RemoteFile, RemoteError> {
        let path = path.trim_start_matches('/');
        *self
            .content_calls
            .write()
            .unwrap()
            .entry(path.to_owned())
            .or_insert(0) += 1;

        if let Some(&kind) = self.failures.read().unwrap().get(path) {
            return Err(RemoteError::new(kind)
                .with_backend(BACKEND)
                .with_path(path));
        }

        let files = self.files.read().unwrap();
        if let Some((p, content)) = files.iter().find(|(p, _)| p == path) {
            return Ok(RemoteFile {
                path: p.clone(),
                content: content.clone(),
                sha: blob_sha(content),
            });
        }

        let dir_prefix = format!("{path}/");
        if files.iter().any(|(p, _)| p.starts_with(&dir_prefix)) {
            return Err(RemoteError::not_a_file(path).with_backend(BACKEND));
        }

        Err(RemoteError::not_found(path).with_backend(BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn repo() -> RepoRef {
        RepoRef::new("acme", "docs", "main")
    }

    #[test]
    fn test_blob_sha_matches_git() {
        // `printf 'hello\n' | git hash-object --stdin`
        assert_eq!(
            blob_sha("hello\n"),
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[tokio::test]
    async fn test_tree_lists_directories_before_files() {
        let client = MockClient::new()
            .with_file("docs/index.mdx", "a")
            .with_file("docs/guides/setup.mdx", "b");

        let tree = client.tree(&repo(), true).await.unwrap();
        let paths: Vec<(&str, EntryKind)> = tree.iter().map(|e| (e.path.as_str(), e.kind)).collect();

        assert_eq!(
            paths,
            vec![
                ("docs", EntryKind::Tree),
                ("docs/index.mdx", EntryKind::Blob),
                ("docs/guides", EntryKind::Tree),
                ("docs/guides/setup.mdx", EntryKind::Blob),
            ]
        );
        assert_eq!(client.tree_calls(), 1);
    }

    #[tokio::test]
    async fn test_non_recursive_tree_lists_top_level_only() {
        let client = MockClient::new()
            .with_file("README.md", "x")
            .with_file("docs/index.mdx", "a");

        let tree = client.tree(&repo(), false).await.unwrap();
        let paths: Vec<&str> = tree.iter().map(|e| e.path.as_str()).collect();

        assert_eq!(paths, vec!["README.md", "docs"]);
    }

    #[tokio::test]
    async fn test_content_found() {
        let client = MockClient::new().with_file("docs/a.mdx", "hello\n");

        let file = client.content(&repo(), "/docs/a.mdx").await.unwrap();

        assert_eq!(file.path, "docs/a.mdx");
        assert_eq!(file.content, "hello\n");
        assert_eq!(file.sha, "ce013625030ba8dba906f756967f9e9ca394464a");
        assert_eq!(client.content_calls("docs/a.mdx"), 1);
    }

    #[tokio::test]
    async fn test_content_missing_and_directory() {
        let client = MockClient::new().with_file("docs/a.mdx", "x");

        let missing = client.content(&repo(), "docs/b.mdx").await.unwrap_err();
        assert_eq!(missing.kind, RemoteErrorKind::NotFound);

        let dir = client.content(&repo(), "docs").await.unwrap_err();
        assert_eq!(dir.kind, RemoteErrorKind::NotAFile);

        assert_eq!(client.total_content_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let client = MockClient::new()
            .with_file("docs/a.mdx", "x")
            .with_failure("docs/a.mdx", RemoteErrorKind::RateLimited)
            .with_tree_failure(RemoteErrorKind::Unavailable);

        let err = client.content(&repo(), "docs/a.mdx").await.unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::RateLimited);

        let err = client.tree(&repo(), true).await.unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::Unavailable);
    }

    #[tokio::test]
    async fn test_set_file_replaces_in_place() {
        let client = MockClient::new()
            .with_file("a.mdx", "1")
            .with_file("b.mdx", "2");

        client.set_file("a.mdx", "changed");
        client.remove_file("b.mdx");

        let tree = client.tree(&repo(), true).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].sha, Some(blob_sha("changed")));
    }
}

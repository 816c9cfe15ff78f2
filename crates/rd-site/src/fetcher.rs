//! Slug routing and cached file fetches.

use std::sync::Arc;

use rd_cache::Cache;
use rd_remote::{ContentClient, RemoteError, RemoteFile, RepoRef, TreeEntry};

use crate::slug::{ContentLayout, Slug};

/// Resolves slugs to repository files through the content cache.
///
/// File contents are cached by repository path. Fetches that carry a blob
/// sha use it as the content stamp, so a changed blob is refetched before
/// its entry expires.
pub struct ContentFetcher {
    client: Arc<dyn ContentClient>,
    repo: RepoRef,
    layout: ContentLayout,
    files: Arc<Cache<String, RemoteFile>>,
}

impl ContentFetcher {
    /// Create a fetcher over `client` for one repository ref.
    #[must_use]
    pub fn new(
        client: Arc<dyn ContentClient>,
        repo: RepoRef,
        layout: ContentLayout,
        files: Arc<Cache<String, RemoteFile>>,
    ) -> Self {
        Self {
            client,
            repo,
            layout,
            files,
        }
    }

    /// Content layout used for routing.
    #[must_use]
    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    /// Repository coordinates.
    #[must_use]
    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// Name of the remote backend, for logs.
    #[must_use]
    pub fn backend(&self) -> &str {
        self.client.name()
    }

    /// Resolve a slug to its file.
    ///
    /// The root index file is tried first for the empty slug and for the
    /// docs-root segment alone, then the direct `<root>/<slug>.<ext>` match.
    /// Every fetch failure counts as "absent"; `None` means the page does
    /// not exist.
    pub async fn resolve(&self, slug: &Slug) -> Option<RemoteFile> {
        let mut candidates = Vec::with_capacity(2);
        if self.layout.is_root_request(slug) {
            candidates.push(self.layout.index_path());
        }
        candidates.extend(self.layout.file_path(slug));

        for path in candidates {
            match self.fetch_file(&path, None).await {
                Ok(file) => return Some(file),
                Err(e) if e.is_absent() => {
                    tracing::debug!(%slug, %path, "candidate not found");
                }
                Err(e) => {
                    tracing::debug!(
                        %slug,
                        %path,
                        backend = self.client.name(),
                        error = %e,
                        "candidate fetch failed, treating as absent"
                    );
                }
            }
        }

        tracing::debug!(%slug, "page not found");
        None
    }

    /// Fetch one file by repository path through the cache.
    ///
    /// `stamp` is the expected blob sha when known. Entries are stored under
    /// the sha the remote returned. Failures are never cached.
    pub async fn fetch_file(
        &self,
        path: &str,
        stamp: Option<&str>,
    ) -> Result<RemoteFile, RemoteError> {
        if let Some(file) = self.files.lookup(path, stamp) {
            return Ok(file);
        }

        let file = self.client.content(&self.repo, path).await?;
        self.files
            .insert(path.to_owned(), file.clone(), Some(file.sha.clone()));
        Ok(file)
    }

    /// Recursive tree listing of the repository. Not cached.
    pub async fn list_tree(&self) -> Result<Vec<TreeEntry>, RemoteError> {
        self.client.tree(&self.repo, true).await
    }
}

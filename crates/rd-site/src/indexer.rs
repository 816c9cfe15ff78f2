//! Page enumeration and metadata loading.
//!
//! Listing a site is split in two phases:
//!
//! 1. [`PageIndexer::enumerate`] lists the repository tree and keeps the page
//!    files under the content root (structural, fails only on the listing).
//! 2. [`PageIndexer::load_entries`] fetches every file concurrently and
//!    parses its frontmatter, failing on the first bad file in listing order.
//!
//! [`PageIndexer::list_all`] runs both behind the `"all-pages"` cache key.

use std::sync::Arc;

use futures::future::join_all;
use rd_cache::Cache;
use serde::Serialize;

use crate::error::IndexError;
use crate::fetcher::ContentFetcher;
use crate::metadata::{PageMetadata, parse_frontmatter};
use crate::slug::Slug;

/// Cache key of the full page listing.
pub const ALL_PAGES_KEY: &str = "all-pages";

/// A page file found by [`PageIndexer::enumerate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListedFile {
    /// Repository path.
    pub path: String,
    /// Slug derived from the path.
    pub slug: Slug,
    /// Blob sha from the listing, if the remote reported one.
    pub sha: Option<String>,
}

/// One indexed page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageEntry {
    /// Page slug.
    pub slug: Slug,
    /// Repository path of the source file.
    pub path: String,
    /// Validated frontmatter.
    pub metadata: PageMetadata,
}

impl PageEntry {
    /// Public URL of the page.
    #[must_use]
    pub fn url(&self) -> String {
        self.slug.url()
    }
}

/// Builds the page listing.
pub struct PageIndexer {
    fetcher: Arc<ContentFetcher>,
    pages: Arc<Cache<String, Arc<Vec<PageEntry>>>>,
}

impl PageIndexer {
    /// Create an indexer sharing `fetcher`'s file cache.
    #[must_use]
    pub fn new(fetcher: Arc<ContentFetcher>, pages: Arc<Cache<String, Arc<Vec<PageEntry>>>>) -> Self {
        Self { fetcher, pages }
    }

    /// List page files in remote listing order.
    ///
    /// Keeps blobs under the content root that carry the page extension.
    pub async fn enumerate(&self) -> Result<Vec<ListedFile>, IndexError> {
        let entries = self.fetcher.list_tree().await.map_err(|e| {
            tracing::warn!(
                repo = %self.fetcher.repo(),
                backend = self.fetcher.backend(),
                error = %e,
                "repository listing failed"
            );
            IndexError::Listing(e)
        })?;

        let layout = self.fetcher.layout();
        let files: Vec<ListedFile> = entries
            .into_iter()
            .filter(|entry| entry.is_blob())
            .filter_map(|entry| {
                let slug = layout.slug_for(&entry.path)?;
                Some(ListedFile {
                    path: entry.path,
                    slug,
                    sha: entry.sha,
                })
            })
            .collect();

        tracing::debug!(count = files.len(), "enumerated page files");
        Ok(files)
    }

    /// Fetch and validate every listed file.
    ///
    /// Fetches run concurrently; results are folded in input order, so the
    /// reported error is the first failing file in listing order.
    pub async fn load_entries(&self, files: &[ListedFile]) -> Result<Vec<PageEntry>, IndexError> {
        join_all(files.iter().map(|file| self.load_entry(file)))
            .await
            .into_iter()
            .collect()
    }

    async fn load_entry(&self, file: &ListedFile) -> Result<PageEntry, IndexError> {
        let remote = self
            .fetcher
            .fetch_file(&file.path, file.sha.as_deref())
            .await
            .map_err(|source| IndexError::Fetch {
                path: file.path.clone(),
                source,
            })?;

        let (frontmatter, _body) =
            parse_frontmatter(&remote.content).map_err(|source| IndexError::Metadata {
                path: file.path.clone(),
                source,
            })?;

        let metadata = frontmatter
            .into_metadata()
            .ok_or_else(|| IndexError::MissingTitle {
                path: file.path.clone(),
            })?;

        Ok(PageEntry {
            slug: file.slug.clone(),
            path: file.path.clone(),
            metadata,
        })
    }

    /// Full page listing, cached under [`ALL_PAGES_KEY`].
    ///
    /// Any failure aborts the listing; a partial list is never returned or
    /// cached.
    pub async fn list_all(&self) -> Result<Arc<Vec<PageEntry>>, IndexError> {
        self.pages
            .get(ALL_PAGES_KEY.to_owned(), None, || async {
                let files = self.enumerate().await?;
                let entries = self.load_entries(&files).await?;
                tracing::info!(pages = entries.len(), "page listing built");
                Ok::<_, IndexError>(Arc::new(entries))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rd_remote::{ContentClient, EntryKind, MockClient, RemoteErrorKind, RepoRef, TreeEntry};

    use super::*;
    use crate::slug::ContentLayout;

    fn page(title: &str) -> String {
        format!("---\ntitle: {title}\n---\n# {title}\n")
    }

    fn indexer(client: &Arc<MockClient>) -> PageIndexer {
        let fetcher = ContentFetcher::new(
            Arc::clone(client) as Arc<dyn ContentClient>,
            RepoRef::new("acme", "docs", "main"),
            ContentLayout::new("docs", "mdx"),
            Arc::new(Cache::new("files")),
        );
        PageIndexer::new(Arc::new(fetcher), Arc::new(Cache::new("pages")))
    }

    #[tokio::test]
    async fn test_list_all_derives_slugs() {
        let client = Arc::new(
            MockClient::new()
                .with_file("docs/index.mdx", page("Home"))
                .with_file("docs/guides/setup.mdx", page("Setup")),
        );

        let pages = indexer(&client).list_all().await.unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].slug, Slug::root());
        assert_eq!(pages[0].metadata.title, "Home");
        assert_eq!(pages[1].slug, Slug::new(["guides", "setup"]));
        assert_eq!(pages[1].path, "docs/guides/setup.mdx");
        assert_eq!(pages[1].url(), "/docs/guides/setup");
    }

    #[tokio::test]
    async fn test_enumerate_filters_paths() {
        let client = Arc::new(
            MockClient::new()
                .with_file("README.md", "readme")
                .with_file("docs/index.mdx", page("Home"))
                .with_file("docs/notes.md", "not a page")
                .with_file("docsite/other.mdx", page("Elsewhere"))
                .with_tree_entry(TreeEntry {
                    path: "docs/vendored.mdx".to_owned(),
                    kind: EntryKind::Commit,
                    size: None,
                    sha: None,
                }),
        );

        let files = indexer(&client).enumerate().await.unwrap();
        let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();

        assert_eq!(paths, vec!["docs/index.mdx"]);
        assert!(files[0].sha.is_some());
    }

    #[tokio::test]
    async fn test_enumerate_preserves_listing_order() {
        let client = Arc::new(
            MockClient::new()
                .with_file("docs/zeta.mdx", page("Zeta"))
                .with_file("docs/alpha.mdx", page("Alpha")),
        );

        let files = indexer(&client).enumerate().await.unwrap();

        assert_eq!(files[0].slug, Slug::new(["zeta"]));
        assert_eq!(files[1].slug, Slug::new(["alpha"]));
    }

    #[tokio::test]
    async fn test_missing_title_fails_whole_listing() {
        let client = Arc::new(
            MockClient::new()
                .with_file("docs/index.mdx", page("Home"))
                .with_file("docs/draft.mdx", "---\ndescription: no title\n---\n")
                .with_file("docs/later.mdx", page("Later")),
        );

        let err = indexer(&client).list_all().await.unwrap_err();

        assert!(matches!(err, IndexError::MissingTitle { .. }));
        assert_eq!(err.path(), Some("docs/draft.mdx"));
    }

    #[tokio::test]
    async fn test_listing_succeeds_validation_fails() {
        let client = Arc::new(MockClient::new().with_file("docs/a.mdx", "no frontmatter"));
        let indexer = indexer(&client);

        let files = indexer.enumerate().await.unwrap();
        assert_eq!(files.len(), 1);

        let err = indexer.load_entries(&files).await.unwrap_err();
        assert!(matches!(err, IndexError::MissingTitle { .. }));
    }

    #[tokio::test]
    async fn test_first_error_in_listing_order_wins() {
        let client = Arc::new(
            MockClient::new()
                .with_file("docs/a.mdx", "---\ntitle: [bad\n---\n")
                .with_file("docs/b.mdx", "untitled"),
        );

        let err = indexer(&client).list_all().await.unwrap_err();

        assert!(matches!(err, IndexError::Metadata { .. }));
        assert_eq!(err.path(), Some("docs/a.mdx"));
    }

    #[tokio::test]
    async fn test_listing_failure_is_loud() {
        let client = Arc::new(
            MockClient::new()
                .with_file("docs/index.mdx", page("Home"))
                .with_tree_failure(RemoteErrorKind::RateLimited),
        );

        let err = indexer(&client).list_all().await.unwrap_err();

        assert!(matches!(err, IndexError::Listing(_)));
    }

    #[tokio::test]
    async fn test_file_fetch_failure_is_fatal() {
        let client = Arc::new(
            MockClient::new()
                .with_file("docs/index.mdx", page("Home"))
                .with_failure("docs/index.mdx", RemoteErrorKind::Unavailable),
        );

        let err = indexer(&client).list_all().await.unwrap_err();

        assert!(matches!(err, IndexError::Fetch { .. }));
        assert_eq!(err.path(), Some("docs/index.mdx"));
    }

    #[tokio::test]
    async fn test_list_all_is_cached() {
        let client = Arc::new(MockClient::new().with_file("docs/index.mdx", page("Home")));
        let indexer = indexer(&client);

        let first = indexer.list_all().await.unwrap();
        client.set_file("docs/new.mdx", page("New"));
        let second = indexer.list_all().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.tree_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_listing_not_cached() {
        let client = Arc::new(MockClient::new().with_file("docs/index.mdx", "untitled"));
        let indexer = indexer(&client);

        assert!(indexer.list_all().await.is_err());
        client.set_file("docs/index.mdx", page("Fixed"));

        let pages = indexer.list_all().await.unwrap();
        assert_eq!(pages[0].metadata.title, "Fixed");
    }

    #[tokio::test]
    async fn test_changed_blob_refetched_by_stamp() {
        let client = Arc::new(MockClient::new().with_file("docs/index.mdx", page("Old")));
        let indexer = indexer(&client);

        let files = indexer.enumerate().await.unwrap();
        indexer.load_entries(&files).await.unwrap();

        client.set_file("docs/index.mdx", page("New"));
        let files = indexer.enumerate().await.unwrap();
        let entries = indexer.load_entries(&files).await.unwrap();

        assert_eq!(entries[0].metadata.title, "New");
        assert_eq!(client.content_calls("docs/index.mdx"), 2);
    }

    #[tokio::test]
    async fn test_unchanged_blob_served_from_cache() {
        let client = Arc::new(MockClient::new().with_file("docs/index.mdx", page("Home")));
        let indexer = indexer(&client);

        let files = indexer.enumerate().await.unwrap();
        indexer.load_entries(&files).await.unwrap();
        indexer.load_entries(&files).await.unwrap();

        assert_eq!(client.content_calls("docs/index.mdx"), 1);
    }
}

//! Site facade wiring the caches, fetcher, indexer and tree together.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rd_cache::{Cache, Clock, DEFAULT_TTL, Invalidate, SystemClock};
use rd_remote::{ContentClient, RemoteFile, RepoRef};

use crate::error::IndexError;
use crate::fetcher::ContentFetcher;
use crate::indexer::{PageEntry, PageIndexer};
use crate::invalidator::CacheInvalidator;
use crate::metadata::{Frontmatter, parse_frontmatter};
use crate::search::DocumentRecord;
use crate::slug::{ContentLayout, Slug};
use crate::tree::{PAGE_TREE_KEY, TreeBuilder, TreeNode};

/// Name of the file content cache.
pub const FILES_CACHE: &str = "files";
/// Name of the page listing cache.
pub const PAGES_CACHE: &str = "pages";
/// Name of the navigation tree cache.
pub const TREE_CACHE: &str = "tree";

/// Site configuration.
#[derive(Clone, Debug)]
pub struct SiteConfig {
    /// Repository coordinates.
    pub repo: RepoRef,
    /// Where pages live in the repository.
    pub layout: ContentLayout,
    /// Time-to-live of every cache entry.
    pub ttl: Duration,
}

impl SiteConfig {
    /// Create a configuration with the default TTL.
    #[must_use]
    pub fn new(repo: RepoRef, layout: ContentLayout) -> Self {
        Self {
            repo,
            layout,
            ttl: DEFAULT_TTL,
        }
    }

    /// Set the cache TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// A single resolved page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Requested slug.
    pub slug: Slug,
    /// Repository path the page was served from.
    pub path: String,
    /// Blob sha of the source file.
    pub sha: String,
    /// Frontmatter fields (title not required for single pages).
    pub frontmatter: Frontmatter,
    /// Markdown body after the frontmatter block.
    pub body: String,
    /// Raw file text.
    pub source: String,
}

/// Documentation site backed by a remote content repository.
///
/// Owns one cache per domain: file contents, page listing and navigation
/// tree, all sharing the configured TTL and clock.
pub struct DocsSite {
    fetcher: Arc<ContentFetcher>,
    indexer: PageIndexer,
    tree: Arc<Cache<String, Arc<TreeNode>>>,
    invalidator: CacheInvalidator,
}

impl DocsSite {
    /// Create a site using the system clock.
    #[must_use]
    pub fn new(client: Arc<dyn ContentClient>, config: SiteConfig) -> Self {
        Self::with_clock(client, config, Arc::new(SystemClock))
    }

    /// Create a site with an explicit time source.
    #[must_use]
    pub fn with_clock(
        client: Arc<dyn ContentClient>,
        config: SiteConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let files: Arc<Cache<String, RemoteFile>> = Arc::new(
            Cache::new(FILES_CACHE)
                .with_ttl(config.ttl)
                .with_clock(Arc::clone(&clock)),
        );
        let pages: Arc<Cache<String, Arc<Vec<PageEntry>>>> = Arc::new(
            Cache::new(PAGES_CACHE)
                .with_ttl(config.ttl)
                .with_clock(Arc::clone(&clock)),
        );
        let tree: Arc<Cache<String, Arc<TreeNode>>> = Arc::new(
            Cache::new(TREE_CACHE)
                .with_ttl(config.ttl)
                .with_clock(clock),
        );

        let invalidator = CacheInvalidator::new()
            .with_cache(Arc::clone(&files) as Arc<dyn Invalidate>)
            .with_cache(Arc::clone(&pages) as Arc<dyn Invalidate>)
            .with_cache(Arc::clone(&tree) as Arc<dyn Invalidate>);

        let fetcher = Arc::new(ContentFetcher::new(
            client,
            config.repo,
            config.layout,
            files,
        ));
        let indexer = PageIndexer::new(Arc::clone(&fetcher), pages);

        Self {
            fetcher,
            indexer,
            tree,
            invalidator,
        }
    }

    /// Repository coordinates.
    #[must_use]
    pub fn repo(&self) -> &RepoRef {
        self.fetcher.repo()
    }

    /// Content layout.
    #[must_use]
    pub fn layout(&self) -> &ContentLayout {
        self.fetcher.layout()
    }

    /// Resolve and parse one page.
    ///
    /// Returns `Ok(None)` if the page does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Metadata`] if the page's frontmatter is not valid YAML.
    pub async fn page(&self, slug: &Slug) -> Result<Option<Page>, IndexError> {
        let Some(file) = self.fetcher.resolve(slug).await else {
            return Ok(None);
        };

        let (frontmatter, body) =
            parse_frontmatter(&file.content).map_err(|source| IndexError::Metadata {
                path: file.path.clone(),
                source,
            })?;
        let body = body.to_owned();

        Ok(Some(Page {
            slug: slug.clone(),
            path: file.path,
            sha: file.sha,
            frontmatter,
            body,
            source: file.content,
        }))
    }

    /// Full page listing.
    pub async fn pages(&self) -> Result<Arc<Vec<PageEntry>>, IndexError> {
        self.indexer.list_all().await
    }

    /// Navigation tree, cached under [`PAGE_TREE_KEY`].
    pub async fn tree(&self) -> Result<Arc<TreeNode>, IndexError> {
        self.tree
            .get(PAGE_TREE_KEY.to_owned(), None, || async {
                let pages = self.indexer.list_all().await?;
                Ok::<_, IndexError>(Arc::new(TreeBuilder::build(&pages)))
            })
            .await
    }

    /// Search records for every listed page, in listing order.
    ///
    /// # Errors
    ///
    /// Fails like [`pages`](Self::pages), and with
    /// [`IndexError::PageVanished`] if a listed file can no longer be fetched.
    pub async fn search_records(&self) -> Result<Vec<DocumentRecord>, IndexError> {
        let pages = self.indexer.list_all().await?;

        join_all(pages.iter().map(|entry| self.search_record(entry)))
            .await
            .into_iter()
            .collect()
    }

    async fn search_record(&self, entry: &PageEntry) -> Result<DocumentRecord, IndexError> {
        let file = self
            .fetcher
            .fetch_file(&entry.path, None)
            .await
            .map_err(|e| {
                tracing::debug!(path = %entry.path, error = %e, "listed page could not be loaded");
                IndexError::PageVanished {
                    path: entry.path.clone(),
                }
            })?;
        let (_, body) = parse_frontmatter(&file.content).map_err(|source| IndexError::Metadata {
            path: file.path.clone(),
            source,
        })?;
        Ok(DocumentRecord::new(entry, body))
    }

    /// Cache invalidator covering all three caches.
    #[must_use]
    pub fn invalidator(&self) -> &CacheInvalidator {
        &self.invalidator
    }
}

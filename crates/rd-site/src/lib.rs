//! Documentation site structure over a remote content repository.
//!
//! This crate provides:
//! - [`ContentFetcher`]: Slug routing to repository files through the file cache
//! - [`PageIndexer`]: Page listing with validated frontmatter (all or nothing)
//! - [`TreeBuilder`]: Navigation tree folded from the listing
//! - [`CacheInvalidator`]: Eviction across the site's caches
//! - [`DocumentRecord`]: Search records for the external index
//! - [`DocsSite`]: Facade owning the caches and wiring the above together
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use rd_remote::{GithubClient, RepoRef, DEFAULT_API_URL};
//! use rd_site::{ContentLayout, DocsSite, SiteConfig, Slug};
//!
//! let client = Arc::new(GithubClient::new(DEFAULT_API_URL, None));
//! let config = SiteConfig::new(
//!     RepoRef::new("acme", "docs-content", "main"),
//!     ContentLayout::new("content/docs", "mdx"),
//! );
//! let site = DocsSite::new(client, config);
//!
//! let tree = site.tree().await?;
//! let page = site.page(&Slug::new(["guides", "setup"])).await?;
//! ```

mod error;
mod fetcher;
mod indexer;
mod invalidator;
mod metadata;
mod search;
mod site;
mod slug;
mod tree;

pub use error::{IndexError, UnknownCache};
pub use fetcher::ContentFetcher;
pub use indexer::{ALL_PAGES_KEY, ListedFile, PageEntry, PageIndexer};
pub use invalidator::CacheInvalidator;
pub use metadata::{Frontmatter, MetadataError, PageMetadata, parse_frontmatter};
pub use search::{ContentBlock, DocumentRecord, Heading, StructuredData, structure};
pub use site::{DocsSite, FILES_CACHE, PAGES_CACHE, Page, SiteConfig, TREE_CACHE};
pub use slug::{ContentLayout, DOCS_URL_PREFIX, Slug};
pub use tree::{PAGE_TREE_KEY, ROOT_NAME, TreeBuilder, TreeNode};

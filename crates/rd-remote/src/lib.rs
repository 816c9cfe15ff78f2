//! Remote content repository access for RD.
//!
//! This crate provides a [`ContentClient`] trait for reading a Git-hosted
//! content repository without knowing which hosting API sits behind it:
//!
//! - [`ContentClient::tree`] lists every node of the repository at a ref
//! - [`ContentClient::content`] fetches one file's decoded text and blob sha
//!
//! # Architecture
//!
//! - [`GithubClient`] talks to the GitHub REST API (or a compatible host)
//! - [`MockClient`] serves in-memory files for tests (behind the `mock` feature)
//! - [`RemoteError`] classifies failures so callers can tell "absent" from
//!   "remote unavailable"
//!
//! # Example
//!
//! ```ignore
//! use rd_remote::{ContentClient, GithubClient, RepoRef, DEFAULT_API_URL};
//!
//! let client = GithubClient::new(DEFAULT_API_URL, None);
//! let repo = RepoRef::new("acme", "docs", "main");
//! let file = client.content(&repo, "content/docs/index.mdx").await?;
//! println!("{} ({})", file.path, file.sha);
//! ```

mod client;
mod error;
mod github;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use client::{ContentClient, EntryKind, RemoteFile, RepoRef, TreeEntry};
pub use error::{ErrorStatus, RemoteError, RemoteErrorKind};
pub use github::{DEFAULT_API_URL, GithubClient};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockClient;

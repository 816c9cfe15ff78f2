//! Site error types.

use rd_remote::RemoteError;

use crate::metadata::MetadataError;

/// Error building the page listing or anything derived from it.
///
/// Every variant aborts the whole operation: a listing, tree or search
/// export is either complete or not produced at all.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The recursive repository listing failed.
    #[error("failed to list repository content: {0}")]
    Listing(#[source] RemoteError),

    /// A listed file could not be fetched.
    #[error("failed to fetch {path}: {source}")]
    Fetch {
        /// Repository path of the file.
        path: String,
        /// Underlying remote error.
        #[source]
        source: RemoteError,
    },

    /// The file's frontmatter is not valid YAML.
    #[error("failed to parse frontmatter of {path}: {source}")]
    Metadata {
        /// Repository path of the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: MetadataError,
    },

    /// The file's frontmatter has no usable title.
    #[error("missing title in frontmatter of {path}")]
    MissingTitle {
        /// Repository path of the file.
        path: String,
    },

    /// A listed page no longer resolves.
    #[error("page {path} is listed but could not be loaded")]
    PageVanished {
        /// Repository path of the file.
        path: String,
    },
}

impl IndexError {
    /// Repository path of the offending file, if the error concerns one.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Listing(_) => None,
            Self::Fetch { path, .. }
            | Self::Metadata { path, .. }
            | Self::MissingTitle { path }
            | Self::PageVanished { path } => Some(path),
        }
    }
}

/// Invalidation addressed to a cache that does not exist.
#[derive(Debug, thiserror::Error)]
#[error("unknown cache: {0}")]
pub struct UnknownCache(pub String);

//! Application state.

use std::sync::Arc;

use rd_site::DocsSite;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Site serving pages, listing and tree.
    pub(crate) site: Arc<DocsSite>,
    /// Application version for ETag computation.
    pub(crate) version: String,
}

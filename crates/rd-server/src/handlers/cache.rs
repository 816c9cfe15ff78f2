//! Cache invalidation endpoint.
//!
//! Meant for content-repository webhooks: a push either evicts one entry
//! or resets every cache so the next request reloads from the remote.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::state::AppState;

/// Body of POST /api/cache/invalidate.
#[derive(Deserialize)]
pub(crate) struct InvalidateRequest {
    /// Cache name (`files`, `pages` or `tree`).
    cache: String,
    /// Key to evict.
    key: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum InvalidateResponse {
    All { cleared: Vec<String> },
    Key { cache: String, key: String, removed: bool },
}

/// Handle POST /api/cache/invalidate.
///
/// Without a JSON body every cache is cleared.
pub(crate) async fn invalidate_cache(
    State(state): State<Arc<AppState>>,
    request: Option<Json<InvalidateRequest>>,
) -> Result<Json<InvalidateResponse>, ServerError> {
    let invalidator = state.site.invalidator();

    let response = match request {
        Some(Json(InvalidateRequest { cache, key })) => {
            let removed = invalidator.invalidate(&cache, &key)?;
            InvalidateResponse::Key {
                cache,
                key,
                removed,
            }
        }
        None => {
            invalidator.invalidate_all();
            InvalidateResponse::All {
                cleared: invalidator.cache_names().map(str::to_owned).collect(),
            }
        }
    };

    Ok(Json(response))
}

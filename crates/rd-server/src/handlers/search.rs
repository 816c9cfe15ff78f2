//! Search export endpoint.
//!
//! Serves the records consumed by the external search-index sync job.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /static.json.
pub(crate) async fn get_search_records(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let records = state.site.search_records().await?;
    Ok((
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Json(records),
    ))
}

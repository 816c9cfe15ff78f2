//! Page listing endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use rd_site::PageEntry;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /api/listing.
pub(crate) async fn get_listing(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PageEntry>>, ServerError> {
    let pages = state.site.pages().await?;
    Ok(Json(pages.to_vec()))
}

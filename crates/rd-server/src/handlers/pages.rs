//! Pages API endpoint.
//!
//! Returns a page's frontmatter and raw markdown body. Rendering is left to
//! the client.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use md5::{Digest, Md5};
use rd_site::{Page, Slug};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// Response for GET /api/pages/{slug}.
#[derive(Serialize)]
struct PageResponse {
    /// Page metadata.
    meta: PageMeta,
    /// Markdown body after the frontmatter block.
    content: String,
}

/// Page metadata.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageMeta {
    /// Title from frontmatter (not required for single pages).
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    /// Description from frontmatter.
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// Public URL.
    path: String,
    /// Repository path of the source file.
    source_file: String,
}

impl From<Page> for PageResponse {
    fn from(page: Page) -> Self {
        Self {
            meta: PageMeta {
                title: page.frontmatter.title,
                description: page.frontmatter.description,
                path: page.slug.url(),
                source_file: page.path,
            },
            content: page.body,
        }
    }
}

/// Handle GET /api/pages/ (root page).
pub(crate) async fn get_root_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    get_page_impl(Slug::root(), &state, &headers).await
}

/// Handle GET /api/pages/{slug}.
pub(crate) async fn get_page(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    get_page_impl(Slug::from_url_path(&slug), &state, &headers).await
}

async fn get_page_impl(
    slug: Slug,
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let Some(page) = state.site.page(&slug).await? else {
        return Err(ServerError::PageNotFound(slug.url()));
    };

    let etag = compute_etag(&state.version, &page.source);

    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "private, max-age=60".to_owned()),
        ],
        Json(PageResponse::from(page)),
    )
        .into_response())
}

/// Compute `ETag` from version and raw file content.
///
/// MD5 truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}

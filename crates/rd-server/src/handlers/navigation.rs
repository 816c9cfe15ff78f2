//! Navigation API endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use rd_site::TreeNode;

use crate::error::ServerError;
use crate::state::AppState;

/// Handle GET /api/navigation.
pub(crate) async fn get_navigation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TreeNode>, ServerError> {
    let tree = state.site.tree().await?;
    Ok(Json(TreeNode::clone(&tree)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use rd_remote::RemoteErrorKind;
    use serde_json::json;

    use crate::app::tests::{docs_client, get, json_body, test_router};

    #[tokio::test]
    async fn test_navigation_tree() {
        let response = get(test_router(&docs_client()), "/api/navigation").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "type": "folder",
                "name": "Documentation",
                "children": [
                    {"type": "page", "name": "Home", "url": "/docs/"},
                    {
                        "type": "folder",
                        "name": "guides",
                        "children": [{"type": "page", "name": "Setup", "url": "/docs/guides/setup"}]
                    }
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_navigation_listing_failure() {
        let client = docs_client();
        client.set_file("content/docs/draft.mdx", "no frontmatter");

        let response = get(test_router(&client), "/api/navigation").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["path"], "content/docs/draft.mdx");
    }

    #[tokio::test]
    async fn test_navigation_remote_unavailable() {
        let client = std::sync::Arc::new(
            rd_remote::MockClient::new().with_tree_failure(RemoteErrorKind::Unavailable),
        );

        let response = get(test_router(&client), "/api/navigation").await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}

//! GitHub REST API client.
//!
//! Uses the blocking `ureq` agent on Tokio's blocking pool so that async
//! callers never stall the runtime on network I/O.
//!
//! Endpoints:
//! - `GET /repos/{owner}/{repo}/git/trees/{ref}?recursive=1`
//! - `GET /repos/{owner}/{repo}/contents/{path}?ref={ref}`

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use ureq::Agent;

use crate::client::{ContentClient, RemoteFile, RepoRef, TreeEntry};
use crate::error::{ErrorStatus, RemoteError, RemoteErrorKind};

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Backend identifier attached to errors.
const BACKEND: &str = "GitHub";

/// REST API version pinned via `X-GitHub-Api-Version`.
const API_VERSION: &str = "2022-11-28";

/// Characters escaped inside a single path segment or query value.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Recursive tree response.
#[derive(Deserialize)]
struct TreeResponse {
    sha: String,
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

/// Contents response: an object for a single node, an array for a directory.
#[derive(Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<serde_json::Value>),
    Node(ContentNode),
}

#[derive(Deserialize)]
struct ContentNode {
    #[serde(rename = "type")]
    kind: String,
    path: String,
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// GitHub REST API client.
#[derive(Clone)]
pub struct GithubClient {
    agent: Agent,
    base_url: String,
    token: Option<String>,
    user_agent: String,
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Create a client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API base URL (e.g., [`DEFAULT_API_URL`] or a GitHub Enterprise URL)
    /// * `token` - Access token; `None` or empty issues unauthenticated requests
    #[must_use]
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        let token = token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::info!("No GitHub token configured, using unauthenticated requests");
        }

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
            user_agent: format!("rd/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Repository API URL.
    fn repo_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}",
            self.base_url,
            encode(&repo.owner),
            encode(&repo.repo)
        )
    }

    /// Issue a GET request and decode the JSON body.
    fn get_json<T: DeserializeOwned>(&self, url: &str, path: &str) -> Result<T, RemoteError> {
        let mut request = self
            .agent
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", &self.user_agent)
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(token) = &self.token {
            request = request.header("Authorization", &format!("Bearer {token}"));
        }

        tracing::debug!(url = %url, "GitHub request");
        let response = request
            .call()
            .map_err(|e| transport_error(e).with_path(path))?;

        let status = response.status().as_u16();
        let rate_limited = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.trim() == "0");
        let mut body = response.into_body();

        if status >= 400 {
            let message = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(RemoteError::from_http_status(status, rate_limited)
                .with_backend(BACKEND)
                .with_path(path)
                .with_message(format!("HTTP {status}: {}", message.trim())));
        }

        body.read_json().map_err(|e| {
            RemoteError::new(RemoteErrorKind::InvalidContent)
                .with_backend(BACKEND)
                .with_path(path)
                .with_source(e)
        })
    }

    /// Blocking tree listing.
    fn fetch_tree(&self, repo: &RepoRef, recursive: bool) -> Result<Vec<TreeEntry>, RemoteError> {
        let mut url = format!("{}/git/trees/{}", self.repo_url(repo), encode(&repo.reference));
        if recursive {
            url.push_str("?recursive=1");
        }

        let response: TreeResponse = self.get_json(&url, "")?;
        complete_listing(response)
    }

    /// Blocking single-file fetch.
    fn fetch_content(&self, repo: &RepoRef, path: &str) -> Result<RemoteFile, RemoteError> {
        let clean = path.trim_start_matches('/');
        let encoded_path = clean.split('/').map(encode).collect::<Vec<_>>().join("/");
        let url = format!(
            "{}/contents/{}?ref={}",
            self.repo_url(repo),
            encoded_path,
            encode(&repo.reference)
        );

        match self.get_json::<ContentsResponse>(&url, clean)? {
            ContentsResponse::Listing(_) => {
                Err(RemoteError::not_a_file(clean).with_backend(BACKEND))
            }
            ContentsResponse::Node(node) => decode_node(node),
        }
    }
}

#[async_trait]
impl ContentClient for GithubClient {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn tree(&self, repo: &RepoRef, recursive: bool) -> Result<Vec<TreeEntry>, RemoteError> {
        let client = self.clone();
        let repo = repo.clone();
        tokio::task::spawn_blocking(move || client.fetch_tree(&repo, recursive))
            .await
            .map_err(|e| {
                RemoteError::new(RemoteErrorKind::Other)
                    .with_backend(BACKEND)
                    .with_source(e)
            })?
    }

    async fn content(&self, repo: &RepoRef, path: &str) -> Result<RemoteFile, RemoteError> {
        let client = self.clone();
        let repo = repo.clone();
        let path = path.to_owned();
        tokio::task::spawn_blocking(move || client.fetch_content(&repo, &path))
            .await
            .map_err(|e| {
                RemoteError::new(RemoteErrorKind::Other)
                    .with_backend(BACKEND)
                    .with_source(e)
            })?
    }
}

/// Percent-encode one path segment or query value.
fn encode(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Map a transport-level failure (DNS, connect, timeout) to a retryable error.
fn transport_error(err: ureq::Error) -> RemoteError {
    let kind = match err {
        ureq::Error::Timeout(_) => RemoteErrorKind::Timeout,
        _ => RemoteErrorKind::Unavailable,
    };
    RemoteError::new(kind)
        .with_status(ErrorStatus::Temporary)
        .with_backend(BACKEND)
        .with_source(err)
}

/// Entries of a tree listing, rejecting one GitHub cut short.
fn complete_listing(response: TreeResponse) -> Result<Vec<TreeEntry>, RemoteError> {
    if response.truncated {
        return Err(RemoteError::new(RemoteErrorKind::InvalidContent)
            .with_backend(BACKEND)
            .with_message(format!(
                "tree listing truncated after {} entries (tree {})",
                response.tree.len(),
                response.sha
            )));
    }
    Ok(response.tree)
}

/// Turn a contents API node into decoded file text.
fn decode_node(node: ContentNode) -> Result<RemoteFile, RemoteError> {
    if node.kind != "file" {
        return Err(RemoteError::not_a_file(node.path).with_backend(BACKEND));
    }

    let invalid = |message: String| {
        RemoteError::new(RemoteErrorKind::InvalidContent)
            .with_backend(BACKEND)
            .with_path(node.path.clone())
            .with_message(message)
    };

    let Some(encoded) = node.content.as_deref() else {
        return Err(invalid("response has no inline content".to_owned()));
    };
    if node.encoding.as_deref() != Some("base64") {
        return Err(invalid(format!(
            "unsupported content encoding: {}",
            node.encoding.as_deref().unwrap_or("none")
        )));
    }

    // GitHub wraps base64 at 60 columns
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| invalid(format!("invalid base64: {e}")))?;
    let content = String::from_utf8(bytes).map_err(|e| invalid(format!("invalid UTF-8: {e}")))?;

    Ok(RemoteFile {
        path: node.path,
        content,
        sha: node.sha,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn node(kind: &str, content: Option<&str>, encoding: Option<&str>) -> ContentNode {
        ContentNode {
            kind: kind.to_owned(),
            path: "content/docs/index.mdx".to_owned(),
            sha: "abc123".to_owned(),
            content: content.map(str::to_owned),
            encoding: encoding.map(str::to_owned),
        }
    }

    #[test]
    fn test_decode_node_with_wrapped_base64() {
        // "---\ntitle: Home\n---\n" split across lines like GitHub does
        let encoded = "LS0tCnRpdGxl\nOiBIb21lCi0t\nLQo=\n";
        let file = decode_node(node("file", Some(encoded), Some("base64"))).unwrap();

        assert_eq!(
            file,
            RemoteFile {
                path: "content/docs/index.mdx".to_owned(),
                content: "---\ntitle: Home\n---\n".to_owned(),
                sha: "abc123".to_owned(),
            }
        );
    }

    #[test]
    fn test_decode_node_rejects_directory() {
        let err = decode_node(node("dir", None, None)).unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::NotAFile);
    }

    #[test]
    fn test_decode_node_rejects_submodule() {
        let err = decode_node(node("submodule", None, None)).unwrap_err();
        assert!(err.is_absent());
    }

    #[test]
    fn test_decode_node_missing_content() {
        let err = decode_node(node("file", None, Some("none"))).unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::InvalidContent);
    }

    #[test]
    fn test_decode_node_invalid_base64() {
        let err = decode_node(node("file", Some("!!!"), Some("base64"))).unwrap_err();
        assert_eq!(err.kind, RemoteErrorKind::InvalidContent);
        assert!(err.to_string().contains("invalid base64"));
    }

    #[test]
    fn test_contents_response_directory_listing() {
        let json = r#"[{"type": "file", "path": "a.mdx", "sha": "1"}]"#;
        let response: ContentsResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(response, ContentsResponse::Listing(_)));
    }

    #[test]
    fn test_contents_response_file_node() {
        let json = r#"{
            "type": "file",
            "encoding": "base64",
            "size": 5,
            "name": "a.mdx",
            "path": "docs/a.mdx",
            "content": "aGVsbG8=\n",
            "sha": "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0"
        }"#;
        let response: ContentsResponse = serde_json::from_str(json).unwrap();
        let ContentsResponse::Node(node) = response else {
            panic!("expected a file node");
        };
        assert_eq!(decode_node(node).unwrap().content, "hello");
    }

    fn tree_response(truncated: bool) -> TreeResponse {
        let json = format!(
            r#"{{
                "sha": "root",
                "url": "https://api.github.com/x",
                "tree": [
                    {{"path": "docs", "type": "tree", "sha": "1"}},
                    {{"path": "docs/a.mdx", "type": "blob", "sha": "2", "size": 3}}
                ],
                "truncated": {truncated}
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_complete_listing() {
        let entries = complete_listing(tree_response(false)).unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries[1].is_blob());
    }

    #[test]
    fn test_truncated_listing_is_an_error() {
        let response = tree_response(true);
        assert!(response.truncated);

        let err = complete_listing(response).unwrap_err();

        assert_eq!(err.kind, RemoteErrorKind::InvalidContent);
        assert!(err.to_string().contains("tree listing truncated after 2 entries"));
    }

    #[test]
    fn test_encode_segment() {
        assert_eq!(encode("getting started.mdx"), "getting%20started.mdx");
        assert_eq!(encode("feature/x"), "feature%2Fx");
        assert_eq!(encode("main"), "main");
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let client = GithubClient::new("https://api.github.com/", Some("  ".to_owned()));
        assert!(client.token.is_none());
        assert_eq!(client.base_url, "https://api.github.com");
    }

    #[test]
    fn test_repo_url() {
        let client = GithubClient::new(DEFAULT_API_URL, None);
        let repo = RepoRef::new("acme", "docs", "main");
        assert_eq!(client.repo_url(&repo), "https://api.github.com/repos/acme/docs");
    }
}

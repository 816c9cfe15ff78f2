//! Page slugs and the mapping between slugs and repository paths.

use std::fmt;

use serde::{Deserialize, Serialize};

/// URL prefix under which pages are published.
pub const DOCS_URL_PREFIX: &str = "/docs/";

/// Ordered path segments identifying a page.
///
/// The root index page has an empty slug.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(Vec<String>);

impl Slug {
    /// Create a slug from segments.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The empty slug of the root index page.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a route path such as `guides/setup/`.
    ///
    /// Empty segments from leading, trailing or doubled slashes are dropped.
    #[must_use]
    pub fn from_url_path(path: &str) -> Self {
        Self::new(path.split('/').filter(|s| !s.is_empty()))
    }

    /// Path segments.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True for the root index page.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments joined with `/`.
    #[must_use]
    pub fn joined(&self) -> String {
        self.0.join("/")
    }

    /// Public URL of the page (`/docs/` + joined segments).
    #[must_use]
    pub fn url(&self) -> String {
        format!("{DOCS_URL_PREFIX}{}", self.joined())
    }

    /// Split into parent directory segments and the final segment.
    #[must_use]
    pub fn split_last(&self) -> Option<(&String, &[String])> {
        self.0.split_last()
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// True if a segment can be part of a repository path.
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".."
}

/// Where pages live inside the repository.
///
/// ```
/// use rd_site::{ContentLayout, Slug};
///
/// let layout = ContentLayout::new("/content/docs/", ".mdx");
/// assert_eq!(layout.index_path(), "content/docs/index.mdx");
/// assert_eq!(
///     layout.file_path(&Slug::new(["guides", "setup"])).as_deref(),
///     Some("content/docs/guides/setup.mdx"),
/// );
/// assert_eq!(
///     layout.slug_for("content/docs/guides/index.mdx"),
///     Some(Slug::new(["guides"])),
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentLayout {
    root: String,
    extension: String,
}

impl ContentLayout {
    /// Create a layout. Surrounding slashes of `root` and a leading dot of
    /// `extension` are ignored.
    #[must_use]
    pub fn new(root: impl AsRef<str>, extension: impl AsRef<str>) -> Self {
        Self {
            root: root.as_ref().trim_matches('/').to_owned(),
            extension: extension.as_ref().trim_start_matches('.').to_owned(),
        }
    }

    /// Repository-relative content root (may be empty).
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Page file extension without the dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Last segment of the content root, if any.
    ///
    /// A request for exactly this segment is served by the root index page.
    #[must_use]
    pub fn docs_root_segment(&self) -> Option<&str> {
        self.root.rsplit('/').next().filter(|s| !s.is_empty())
    }

    fn prefix(&self) -> String {
        if self.root.is_empty() {
            String::new()
        } else {
            format!("{}/", self.root)
        }
    }

    /// Path of the root index page.
    #[must_use]
    pub fn index_path(&self) -> String {
        format!("{}index.{}", self.prefix(), self.extension)
    }

    /// True if `slug` addresses the root index page.
    #[must_use]
    pub fn is_root_request(&self, slug: &Slug) -> bool {
        match slug.segments() {
            [] => true,
            [only] => self.docs_root_segment() == Some(only.as_str()),
            _ => false,
        }
    }

    /// Path of the file a non-empty slug maps to directly.
    ///
    /// Returns `None` for the empty slug and for slugs with segments that
    /// could escape the content root.
    #[must_use]
    pub fn file_path(&self, slug: &Slug) -> Option<String> {
        if slug.is_root() || !slug.segments().iter().all(|s| is_valid_segment(s)) {
            return None;
        }
        Some(format!(
            "{}{}.{}",
            self.prefix(),
            slug.joined(),
            self.extension
        ))
    }

    /// Derive the slug of a repository path.
    ///
    /// Returns `None` unless the path lies under the content root and carries
    /// the page extension. A trailing `index` segment is dropped.
    #[must_use]
    pub fn slug_for(&self, path: &str) -> Option<Slug> {
        let prefix = self.prefix();
        let suffix = format!(".{}", self.extension);
        let relative = path.strip_prefix(prefix.as_str())?.strip_suffix(suffix.as_str())?;

        let mut segments: Vec<&str> = relative.split('/').collect();
        if !segments.iter().all(|s| is_valid_segment(s)) {
            return None;
        }
        if segments.last() == Some(&"index") {
            segments.pop();
        }
        Some(Slug::new(segments))
    }
}

//! Page metadata from YAML frontmatter.
//!
//! A page may start with a metadata block fenced by `---` lines:
//!
//! ```text
//! ---
//! title: Getting Started
//! description: Install and configure the CLI
//! ---
//! # Body
//! ```
//!
//! [`Frontmatter`] holds the fields as written (all optional), and
//! [`PageMetadata`] is the validated form every indexed page must have.

use serde::{Deserialize, Serialize};

/// Frontmatter fields as written in the file.
///
/// Unknown keys (`status`, `author`, ...) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Page title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Short summary for listings and search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Frontmatter {
    /// Validate into [`PageMetadata`].
    ///
    /// Returns `None` when the title is missing or blank.
    #[must_use]
    pub fn into_metadata(self) -> Option<PageMetadata> {
        let title = self.title?.trim().to_owned();
        if title.is_empty() {
            return None;
        }
        Some(PageMetadata {
            title,
            description: self.description,
        })
    }
}

/// Validated page metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Non-empty page title.
    pub title: String,
    /// Optional summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Error type for metadata operations.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    /// YAML parsing error.
    #[error("invalid frontmatter: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Split raw page text into frontmatter and body, then parse the frontmatter.
///
/// Text without a leading `---` block yields empty frontmatter and the whole
/// text as body. An opening fence without a closing one is treated the same.
///
/// # Errors
///
/// Returns an error if the fenced block is not valid YAML for [`Frontmatter`].
pub fn parse_frontmatter(raw: &str) -> Result<(Frontmatter, &str), MetadataError> {
    let Some((yaml, body)) = split_frontmatter(raw) else {
        return Ok((Frontmatter::default(), raw));
    };

    if yaml.trim().is_empty() {
        return Ok((Frontmatter::default(), body));
    }

    let frontmatter = serde_yaml::from_str(yaml)?;
    Ok((frontmatter, body))
}

fn split_frontmatter(raw: &str) -> Option<(&str, &str)> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let rest = raw.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

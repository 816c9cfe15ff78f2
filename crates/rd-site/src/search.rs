//! Search records for the external search index.
//!
//! Each indexed page becomes one [`DocumentRecord`] whose `structured` field
//! splits the markdown body into headings and the text blocks under them.

use std::collections::HashMap;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::indexer::PageEntry;

/// One page as handed to the search-index synchronisation job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    /// Source path, used as the object id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Headings and text blocks of the body.
    pub structured: StructuredData,
    /// Public URL.
    pub url: String,
    /// Page title.
    pub title: String,
    /// Page description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl DocumentRecord {
    /// Build the record of `page` from its markdown body.
    #[must_use]
    pub fn new(page: &PageEntry, body: &str) -> Self {
        Self {
            id: page.path.clone(),
            structured: structure(body),
            url: page.url(),
            title: page.metadata.title.clone(),
            description: page.metadata.description.clone(),
        }
    }
}

/// Body structure: headings in document order and the text blocks that
/// follow them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StructuredData {
    /// Headings with anchor ids.
    pub headings: Vec<Heading>,
    /// Text blocks (paragraphs, list items, code, table cells).
    pub contents: Vec<ContentBlock>,
}

/// A heading with its anchor id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Heading {
    /// Anchor id, unique within the page.
    pub id: String,
    /// Heading text.
    pub content: String,
}

/// A text block and the anchor of the heading it sits under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    /// Anchor id of the closest preceding heading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    /// Block text.
    pub content: String,
}

#[derive(Default)]
struct Extractor {
    data: StructuredData,
    id_counts: HashMap<String, usize>,
    current_heading: Option<String>,
    heading_text: Option<String>,
    block_depth: usize,
    block_text: String,
}

impl Extractor {
    fn push_text(&mut self, text: &str) {
        if let Some(heading) = &mut self.heading_text {
            heading.push_str(text);
        } else if self.block_depth > 0 {
            self.block_text.push_str(text);
        }
    }

    fn open_block(&mut self) {
        self.block_depth += 1;
    }

    fn close_block(&mut self) {
        self.block_depth = self.block_depth.saturating_sub(1);
        if self.block_depth > 0 {
            // Nested blocks (paragraphs inside list items) join their parent
            self.block_text.push(' ');
            return;
        }
        let content = self.block_text.split_whitespace().collect::<Vec<_>>().join(" ");
        self.block_text.clear();
        if !content.is_empty() {
            self.data.contents.push(ContentBlock {
                heading: self.current_heading.clone(),
                content,
            });
        }
    }

    fn close_heading(&mut self) {
        let Some(text) = self.heading_text.take() else {
            return;
        };
        let content = text.trim().to_owned();
        let id = self.unique_id(&content);
        self.current_heading = Some(id.clone());
        self.data.headings.push(Heading { id, content });
    }

    fn unique_id(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str("section");
        }
        let count = self.id_counts.entry(base.clone()).or_default();
        let id = match *count {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Split a markdown body into headings and text blocks.
#[must_use]
pub fn structure(body: &str) -> StructuredData {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let mut extractor = Extractor::default();

    for event in Parser::new_ext(body, options) {
        match event {
            Event::Start(Tag::Heading { .. }) => extractor.heading_text = Some(String::new()),
            Event::End(TagEnd::Heading(_)) => extractor.close_heading(),
            Event::Start(Tag::Paragraph | Tag::Item | Tag::CodeBlock(_) | Tag::TableCell) => {
                extractor.open_block();
            }
            Event::End(TagEnd::Paragraph | TagEnd::Item | TagEnd::CodeBlock | TagEnd::TableCell) => {
                extractor.close_block();
            }
            Event::Text(text) | Event::Code(text) => extractor.push_text(&text),
            Event::SoftBreak | Event::HardBreak => extractor.push_text(" "),
            _ => {}
        }
    }

    extractor.data
}

/// Convert heading text to an anchor id.
///
/// Lowercases ASCII alphanumerics, collapses whitespace, dashes and
/// underscores into single dashes, and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}

//! Navigation tree built from the page listing.

use serde::Serialize;

use crate::indexer::PageEntry;

/// Display name of the root folder.
pub const ROOT_NAME: &str = "Documentation";

/// Cache key of the navigation tree.
pub const PAGE_TREE_KEY: &str = "page-tree";

/// Navigation tree node.
///
/// Serialized with a `type` tag:
/// `{"type": "folder", "name": ..., "children": [...]}` or
/// `{"type": "page", "name": ..., "url": ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    /// Directory grouping, children in first-insertion order.
    Folder {
        /// Directory segment.
        name: String,
        /// Child nodes.
        children: Vec<TreeNode>,
    },
    /// Page leaf.
    Page {
        /// Page title.
        name: String,
        /// Public URL.
        url: String,
    },
}

impl TreeNode {
    /// Empty root folder.
    #[must_use]
    pub fn root() -> Self {
        Self::Folder {
            name: ROOT_NAME.to_owned(),
            children: Vec::new(),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Folder { name, .. } | Self::Page { name, .. } => name,
        }
    }

    /// Child nodes (empty for pages).
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        match self {
            Self::Folder { children, .. } => children,
            Self::Page { .. } => &[],
        }
    }
}

/// Folds a page listing into a [`TreeNode`] hierarchy.
pub struct TreeBuilder;

impl TreeBuilder {
    /// Build the tree for `pages`, in input order.
    ///
    /// Every slug segment but the last becomes a folder, looked up among the
    /// current folder's children by exact name and created on a miss. The
    /// page leaf is appended to the innermost folder; the root page (empty
    /// slug) lands directly under the root. A page never merges with a folder
    /// of the same name: both are kept as siblings.
    #[must_use]
    pub fn build(pages: &[PageEntry]) -> TreeNode {
        let mut root_children = Vec::new();

        for page in pages {
            let dirs = page
                .slug
                .split_last()
                .map_or(&[][..], |(_, dirs)| dirs);

            let mut children = &mut root_children;
            for dir in dirs {
                children = child_folder(children, dir);
            }

            children.push(TreeNode::Page {
                name: page.metadata.title.clone(),
                url: page.url(),
            });
        }

        TreeNode::Folder {
            name: ROOT_NAME.to_owned(),
            children: root_children,
        }
    }
}

/// Children of the folder named `name` under `children`, created if missing.
fn child_folder<'a>(children: &'a mut Vec<TreeNode>, name: &str) -> &'a mut Vec<TreeNode> {
    let index = children
        .iter()
        .position(|node| matches!(node, TreeNode::Folder { name: n, .. } if n == name))
        .unwrap_or_else(|| {
            children.push(TreeNode::Folder {
                name: name.to_owned(),
                children: Vec::new(),
            });
            children.len() - 1
        });

    match &mut children[index] {
        TreeNode::Folder { children, .. } => children,
        TreeNode::Page { .. } => unreachable!("position only matches folders"),
    }
}

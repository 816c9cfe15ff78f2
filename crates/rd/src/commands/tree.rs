//! `rd tree` command implementation.

use clap::Args;
use rd_site::TreeNode;

use super::{SiteArgs, build_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the tree command.
#[derive(Args)]
pub(crate) struct TreeArgs {
    #[command(flatten)]
    site: SiteArgs,
}

impl TreeArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(&self.site.settings())?;
        let tree = build_site(&config).tree().await?;

        for line in outline(&tree) {
            output.data(&line);
        }
        Ok(())
    }
}

/// Render the tree as an indented outline, two spaces per level.
///
/// Folders end with `/`, pages show their URL.
fn outline(root: &TreeNode) -> Vec<String> {
    let mut lines = Vec::new();
    push_node(root, 0, &mut lines);
    lines
}

fn push_node(node: &TreeNode, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    match node {
        TreeNode::Folder { name, children } => {
            lines.push(format!("{indent}{name}/"));
            for child in children {
                push_node(child, depth + 1, lines);
            }
        }
        TreeNode::Page { name, url } => lines.push(format!("{indent}{name} ({url})")),
    }
}

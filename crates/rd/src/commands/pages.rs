//! `rd pages` command implementation.

use clap::Args;
use rd_site::PageEntry;

use super::{SiteArgs, build_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the pages command.
#[derive(Args)]
pub(crate) struct PagesArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Print the listing as JSON.
    #[arg(long)]
    json: bool,
}

impl PagesArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(&self.site.settings())?;
        let pages = build_site(&config).pages().await?;

        if self.json {
            output.data(&serde_json::to_string_pretty(pages.as_slice())?);
            return Ok(());
        }

        for line in listing_lines(&pages) {
            output.data(&line);
        }
        output.success(&format!("{} pages", pages.len()));
        Ok(())
    }
}

/// One aligned line per page: URL, title, source path.
fn listing_lines(pages: &[PageEntry]) -> Vec<String> {
    let urls: Vec<String> = pages.iter().map(PageEntry::url).collect();
    let url_width = urls.iter().map(String::len).max().unwrap_or(0);
    let title_width = pages
        .iter()
        .map(|p| p.metadata.title.chars().count())
        .max()
        .unwrap_or(0);

    pages
        .iter()
        .zip(&urls)
        .map(|(page, url)| {
            format!(
                "{url:<url_width$}  {:<title_width$}  {}",
                page.metadata.title, page.path
            )
        })
        .collect()
}

//! `rd search-index` command implementation.
//!
//! Writes the records consumed by the external search-index sync job.

use std::path::{Path, PathBuf};

use clap::Args;
use rd_site::DocsSite;

use super::{SiteArgs, build_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the search-index command.
#[derive(Args)]
pub(crate) struct SearchIndexArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Output file.
    #[arg(short, long, default_value = "static.json")]
    output: PathBuf,
}

impl SearchIndexArgs {
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(&self.site.settings())?;
        let site = build_site(&config);

        output.info(&format!("Indexing {}", site.repo()));
        let count = write_search_index(&site, &self.output).await?;
        output.success(&format!(
            "Wrote {count} records to {}",
            self.output.display()
        ));
        Ok(())
    }
}

/// Write the site's search records to `path` as a JSON array.
///
/// Nothing is written if any page fails to load.
async fn write_search_index(site: &DocsSite, path: &Path) -> Result<usize, CliError> {
    let records = site.search_records().await?;
    let json = serde_json::to_string_pretty(&records)?;
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    tracing::info!(records = records.len(), path = %path.display(), "search index written");
    Ok(records.len())
}

//! `rd serve` command implementation.

use std::sync::Arc;

use clap::Args;
use rd_server::{run_server, server_config_from_rd_config};

use super::{SiteArgs, build_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let mut settings = self.site.settings();
        settings.host = self.host;
        settings.port = self.port;
        let config = self.site.load_config(&settings)?;

        output.info(&format!(
            "Starting server on {}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Repository: {}/{}@{}",
            config.repository.owner, config.repository.name, config.repository.branch
        ));
        output.info(&format!(
            "Content: {}/**/*.{}",
            config.content.root, config.content.extension
        ));
        if config.cache.enabled {
            output.info(&format!("Cache TTL: {}s", config.cache.ttl_secs));
        } else {
            output.info("Cache: disabled");
        }
        if config.repository.token.is_none() {
            output.info("No API token configured, requests are unauthenticated");
        }

        let site = Arc::new(build_site(&config));
        let server_config = server_config_from_rd_config(&config, version.to_owned());
        run_server(server_config, site)
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}

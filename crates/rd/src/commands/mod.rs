//! CLI command implementations.

pub(crate) mod pages;
pub(crate) mod search_index;
pub(crate) mod serve;
pub(crate) mod tree;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use rd_config::{CliSettings, Config};
use rd_remote::{ContentClient, GithubClient, RepoRef};
use rd_site::{ContentLayout, DocsSite, SiteConfig};

use crate::error::CliError;

pub(crate) use pages::PagesArgs;
pub(crate) use search_index::SearchIndexArgs;
pub(crate) use serve::ServeArgs;
pub(crate) use tree::TreeArgs;

/// Repository options shared by every command.
#[derive(Args, Debug, Default)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover rd.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Repository owner (overrides config).
    #[arg(long)]
    owner: Option<String>,

    /// Repository name (overrides config).
    #[arg(long)]
    repo: Option<String>,

    /// Branch, tag or commit to read (overrides config).
    #[arg(long)]
    branch: Option<String>,

    /// Docs directory inside the repository (overrides config).
    #[arg(long)]
    content_root: Option<String>,

    /// API token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Disable caching.
    #[arg(long)]
    no_cache: bool,
}

impl SiteArgs {
    /// CLI overrides for [`Config::load`].
    pub(crate) fn settings(&self) -> CliSettings {
        CliSettings {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            content_root: self.content_root.clone(),
            token: self.token.clone(),
            cache_enabled: self.no_cache.then_some(false),
            ..CliSettings::default()
        }
    }

    /// Load configuration with `settings` applied.
    pub(crate) fn load_config(&self, settings: &CliSettings) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), Some(settings))?)
    }
}

/// Build a site reading from the configured GitHub repository.
pub(crate) fn build_site(config: &Config) -> DocsSite {
    let repository = &config.repository;
    let client: Arc<dyn ContentClient> = Arc::new(GithubClient::new(
        &repository.api_url,
        repository.token.clone(),
    ));
    DocsSite::new(client, site_config(config))
}

fn site_config(config: &Config) -> SiteConfig {
    let repository = &config.repository;
    SiteConfig::new(
        RepoRef::new(&repository.owner, &repository.name, &repository.branch),
        ContentLayout::new(&config.content.root, &config.content.extension),
    )
    .with_ttl(config.cache.ttl())
}

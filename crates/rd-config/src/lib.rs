//! Configuration management for RD.
//!
//! Parses `rd.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `repository.owner`
//! - `repository.name`
//! - `repository.branch`
//! - `repository.token`
//! - `repository.api_url`

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rd.toml";

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override repository owner.
    pub owner: Option<String>,
    /// Override repository name.
    pub repo: Option<String>,
    /// Override branch.
    pub branch: Option<String>,
    /// Override content root directory inside the repository.
    pub content_root: Option<String>,
    /// Override API token.
    pub token: Option<String>,
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content repository coordinates and credentials.
    pub repository: RepositoryConfig,
    /// Content layout inside the repository.
    pub content: ContentConfig,
    /// Cache configuration.
    pub cache: CacheConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7979,
        }
    }
}

/// Content repository configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Account or organisation owning the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
    /// Branch, tag or commit to read.
    pub branch: String,
    /// API token. Unauthenticated when `None`.
    pub token: Option<String>,
    /// REST API base URL (GitHub Enterprise installs differ).
    pub api_url: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            name: String::new(),
            branch: "main".to_owned(),
            token: None,
            api_url: DEFAULT_API_URL.to_owned(),
        }
    }
}

/// Where documentation pages live inside the repository.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Repository-relative docs directory, without leading or trailing slash.
    pub root: String,
    /// Page file extension, without the dot.
    pub extension: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: "content/docs".to_owned(),
            extension: "mdx".to_owned(),
        }
    }
}

/// Cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether caching is enabled.
    pub enabled: bool,
    /// Entry time-to-live in seconds.
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    /// Effective time-to-live. Zero when caching is disabled.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        if self.enabled {
            Duration::from_secs(self.ttl_secs)
        } else {
            Duration::ZERO
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`repository.token`").
        field: String,
        /// Error message (e.g., "${`GITHUB_TOKEN`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rd.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// CLI settings are applied after env expansion and before validation, so
    /// a required value may come from either source.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the merged configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(owner) = &settings.owner {
            self.repository.owner.clone_from(owner);
        }
        if let Some(repo) = &settings.repo {
            self.repository.name.clone_from(repo);
        }
        if let Some(branch) = &settings.branch {
            self.repository.branch.clone_from(branch);
        }
        if let Some(root) = &settings.content_root {
            self.content.root.clone_from(root);
        }
        if let Some(token) = &settings.token
            && !token.is_empty()
        {
            self.repository.token = Some(token.clone());
        }
        if let Some(enabled) = settings.cache_enabled {
            self.cache.enabled = enabled;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Strip slashes from the content root and the dot from the extension.
    fn normalize(&mut self) {
        self.content.root = self.content.root.trim_matches('/').to_owned();
        self.content.extension = self.content.extension.trim_start_matches('.').to_owned();
        self.repository.api_url = self.repository.api_url.trim_end_matches('/').to_owned();
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_repository()?;
        require_non_empty(&self.content.extension, "content.extension")?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate repository coordinates.
    fn validate_repository(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.repository.owner, "repository.owner")?;
        require_non_empty(&self.repository.name, "repository.name")?;
        require_non_empty(&self.repository.branch, "repository.branch")?;
        require_http_url(&self.repository.api_url, "repository.api_url")?;
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        let repo = &mut self.repository;
        repo.owner = expand::expand_env(&repo.owner, "repository.owner")?;
        repo.name = expand::expand_env(&repo.name, "repository.name")?;
        repo.branch = expand::expand_env(&repo.branch, "repository.branch")?;
        repo.api_url = expand::expand_env(&repo.api_url, "repository.api_url")?;
        repo.token = expand::expand_optional(repo.token.as_deref(), "repository.token")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.repository.owner = "acme".to_owned();
        config.repository.name = "docs-content".to_owned();
        config
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 7979);
        assert_eq!(config.repository.branch, "main");
        assert_eq!(config.repository.api_url, DEFAULT_API_URL);
        assert_eq!(config.repository.token, None);
        assert_eq!(config.content.root, "content/docs");
        assert_eq!(config.content.extension, "mdx");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "0.0.0.0"
port = 9000

[repository]
owner = "acme"
name = "docs-content"
branch = "release"
api_url = "https://git.example.com/api/v3"

[content]
root = "outstatic/content/docs"
extension = "md"

[cache]
enabled = true
ttl_secs = 60
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.repository.owner, "acme");
        assert_eq!(config.repository.name, "docs-content");
        assert_eq!(config.repository.branch, "release");
        assert_eq!(config.repository.api_url, "https://git.example.com/api/v3");
        assert_eq!(config.content.root, "outstatic/content/docs");
        assert_eq!(config.content.extension, "md");
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_cache_disabled_means_zero_ttl() {
        let cache = CacheConfig {
            enabled: false,
            ttl_secs: 300,
        };
        assert_eq!(cache.ttl(), Duration::ZERO);
    }

    #[test]
    fn test_normalize_strips_slashes_and_dot() {
        let mut config = valid_config();
        config.content.root = "/content/docs/".to_owned();
        config.content.extension = ".mdx".to_owned();
        config.repository.api_url = "https://api.github.com/".to_owned();

        config.normalize();

        assert_eq!(config.content.root, "content/docs");
        assert_eq!(config.content.extension, "mdx");
        assert_eq!(config.repository.api_url, "https://api.github.com");
    }

    #[test]
    fn test_apply_cli_settings_multiple() {
        let mut config = Config::default();
        let overrides = CliSettings {
            host: Some("0.0.0.0".to_owned()),
            port: Some(9000),
            owner: Some("acme".to_owned()),
            repo: Some("handbook".to_owned()),
            branch: Some("preview".to_owned()),
            content_root: Some("docs".to_owned()),
            token: Some("ghp_abc".to_owned()),
            cache_enabled: Some(false),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.repository.owner, "acme");
        assert_eq!(config.repository.name, "handbook");
        assert_eq!(config.repository.branch, "preview");
        assert_eq!(config.content.root, "docs");
        assert_eq!(config.repository.token, Some("ghp_abc".to_owned()));
        assert!(!config.cache.enabled);
    }

    #[test]
    fn test_apply_cli_settings_empty_token_ignored() {
        let mut config = Config::default();
        config.repository.token = Some("from-file".to_owned());

        config.apply_cli_settings(&CliSettings {
            token: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(config.repository.token, Some("from-file".to_owned()));
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = valid_config();

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.server.port, 7979);
        assert_eq!(config.repository.owner, "acme");
        assert!(config.cache.enabled);
    }

    #[test]
    fn test_load_explicit_file() {
        let file = write_config(
            r#"
[repository]
owner = "acme"
name = "docs-content"

[content]
root = "/outstatic/content/docs/"
"#,
        );

        let config = Config::load(Some(file.path()), None).unwrap();

        assert_eq!(config.repository.owner, "acme");
        assert_eq!(config.content.root, "outstatic/content/docs");
        assert_eq!(config.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_load_cli_supplies_required_values() {
        let file = write_config("[server]\nport = 8080\n");
        let settings = CliSettings {
            owner: Some("acme".to_owned()),
            repo: Some("docs-content".to_owned()),
            ..Default::default()
        };

        let config = Config::load(Some(file.path()), Some(&settings)).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.repository.name, "docs-content");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/nonexistent/rd.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_toml() {
        let file = write_config("[server\nport = ");
        let err = Config::load(Some(file.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_without_owner_fails_validation() {
        let file = write_config("[repository]\nname = \"docs\"\n");
        let err = Config::load(Some(file.path()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("repository.owner"));
    }

    #[test]
    fn test_expand_env_vars_repository() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("RD_CFG_TEST_OWNER", "acme");
            std::env::set_var("RD_CFG_TEST_TOKEN", "ghp_secret");
        }

        let toml = r#"
[repository]
owner = "${RD_CFG_TEST_OWNER}"
name = "docs"
branch = "${RD_CFG_TEST_BRANCH:-main}"
token = "${RD_CFG_TEST_TOKEN}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.repository.owner, "acme");
        assert_eq!(config.repository.branch, "main");
        assert_eq!(config.repository.token, Some("ghp_secret".to_owned()));

        unsafe {
            std::env::remove_var("RD_CFG_TEST_OWNER");
            std::env::remove_var("RD_CFG_TEST_TOKEN");
        }
    }

    #[test]
    fn test_expand_env_vars_token_default_empty_is_none() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RD_CFG_TEST_NO_TOKEN");
        }

        let toml = r#"
[repository]
token = "${RD_CFG_TEST_NO_TOKEN:-}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.repository.token, None);
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("RD_CFG_TEST_MISSING");
        }

        let toml = r#"
[repository]
name = "${RD_CFG_TEST_MISSING}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let err = config.expand_env_vars().unwrap_err();

        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("RD_CFG_TEST_MISSING"));
        assert!(err.to_string().contains("repository.name"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_server_port_zero() {
        let mut config = valid_config();
        config.server.port = 0;
        assert_validation_error(&config, &["server.port"]);
    }

    #[test]
    fn test_validate_repository_name_empty() {
        let mut config = valid_config();
        config.repository.name = String::new();
        assert_validation_error(&config, &["repository.name", "empty"]);
    }

    #[test]
    fn test_validate_api_url_scheme() {
        let mut config = valid_config();
        config.repository.api_url = "ftp://git.example.com".to_owned();
        assert_validation_error(&config, &["api_url", "http"]);
    }

    #[test]
    fn test_validate_extension_empty() {
        let mut config = valid_config();
        config.content.extension = String::new();
        assert_validation_error(&config, &["content.extension"]);
    }

    #[test]
    fn test_empty_content_root_is_allowed() {
        let mut config = valid_config();
        config.content.root = String::new();
        assert!(config.validate().is_ok());
    }
}

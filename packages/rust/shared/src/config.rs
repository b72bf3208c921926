//! Application configuration for relchron.
//!
//! User config lives at `~/.relchron/relchron.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RelchronError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "relchron.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".relchron";

// ---------------------------------------------------------------------------
// Config structs (matching relchron.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Release feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Catalog build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Milestone resolution settings.
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Tracked upstream products, one catalog document each.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// `[feed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Base URL of the release listing API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Name of the env var holding the bearer token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_env: default_token_env(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_token_env() -> String {
    "RELCHRON_GITHUB_TOKEN".into()
}

/// `[build]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Minimum trailing time span, in days, the catalog must cover.
    #[serde(default = "default_window_days")]
    pub window_days: i64,

    /// Directory catalog documents are written to when a source does not
    /// name its own output path.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_window_days() -> i64 {
    730
}
fn default_output_dir() -> String {
    "var/catalog".into()
}

/// `[resolve]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Surface name whose milestones are candidates for resolution.
    #[serde(default = "default_surface")]
    pub surface: String,

    /// Milestone document paths to process.
    #[serde(default)]
    pub docs: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            surface: default_surface(),
            docs: Vec::new(),
        }
    }
}

fn default_surface() -> String {
    "plugin".into()
}

/// `[[sources]]` entry — a tracked upstream product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Catalog output path; defaults to `<output_dir>/<repo>.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl SourceEntry {
    /// Canonical browse URL of the tracked repository.
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }

    /// Where this source's catalog document is written.
    pub fn output_path(&self, build: &BuildConfig) -> PathBuf {
        match &self.output {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&build.output_dir).join(format!("{}.json", self.repo)),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.relchron/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| RelchronError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.relchron/relchron.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RelchronError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| RelchronError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| RelchronError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| RelchronError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| RelchronError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the bearer token from the configured env var.
///
/// The feed works unauthenticated (at a lower rate limit), so an unset or
/// empty var is not an error.
pub fn resolve_token(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.feed.token_env) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("api_base"));
        assert!(toml_str.contains("RELCHRON_GITHUB_TOKEN"));
        assert!(toml_str.contains("window_days"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.build.window_days, 730);
        assert_eq!(parsed.feed.api_base, "https://api.github.com");
        assert_eq!(parsed.resolve.surface, "plugin");
    }

    #[test]
    fn config_with_sources() {
        let toml_str = r#"
[build]
window_days = 365

[[sources]]
owner = "acme"
repo = "widget-app"

[[sources]]
owner = "acme"
repo = "widget-plugin"
output = "/tmp/catalogs/plugin.json"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.build.window_days, 365);
        assert_eq!(
            config.sources[0].repo_url(),
            "https://github.com/acme/widget-app"
        );
        assert_eq!(
            config.sources[0].output_path(&config.build),
            PathBuf::from("var/catalog/widget-app.json")
        );
        assert_eq!(
            config.sources[1].output_path(&config.build),
            PathBuf::from("/tmp/catalogs/plugin.json")
        );
    }

    #[test]
    fn missing_token_is_none() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.feed.token_env = "RELCHRON_TEST_NONEXISTENT_TOKEN_12345".into();
        assert!(resolve_token(&config).is_none());
    }
}

//! Configuration management for Sanctum.
//!
//! Loads configuration from ${SANCTUM_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::backend::Endpoint;

/// Environment variable holding the service URL.
pub const URL_ENV_VAR: &str = "SANCTUM_URL";
/// Environment variable holding the anonymous API key.
pub const ANON_KEY_ENV_VAR: &str = "SANCTUM_ANON_KEY";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// This ensures new comments/sections from the template are always present,
/// while preserving user's customized values.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for Sanctum configuration and data directories.
    //!
    //! SANCTUM_HOME resolution order:
    //! 1. SANCTUM_HOME environment variable (if set)
    //! 2. ~/.config/sanctum (default)
    //! 3. ./.sanctum when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Sanctum home directory.
    pub fn sanctum_home() -> PathBuf {
        if let Ok(home) = std::env::var("SANCTUM_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".sanctum"),
            |h| h.join(".config").join("sanctum"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        sanctum_home().join("config.toml")
    }

    /// Returns the path to the persisted auth session.
    pub fn session_path() -> PathBuf {
        sanctum_home().join("session.json")
    }

    /// Returns the directory holding log files.
    pub fn logs_dir() -> PathBuf {
        sanctum_home().join("logs")
    }
}

/// Backend service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Service base URL (e.g. `https://project.example.co`).
    pub url: Option<String>,
    /// Anonymous (public) API key.
    pub anon_key: Option<String>,
}

impl BackendConfig {
    /// Returns the effective URL if set and non-empty.
    pub fn effective_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Returns the effective anon key if set and non-empty.
    pub fn effective_anon_key(&self) -> Option<&str> {
        self.anon_key
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Terminal UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Maximum rows fetched per list view.
    pub list_limit: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            list_limit: crate::database::DEFAULT_LIST_LIMIT,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level for the log file (overridden by `SANCTUM_LOG`).
    pub log_level: String,

    /// Whether the setup wizard has been completed once.
    pub setup_completed: bool,

    /// Backend service settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Terminal UI settings.
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    const DEFAULT_LOG_LEVEL: &str = "info";

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the service endpoint from the environment and this config.
    ///
    /// Precedence: env > config > unreachable placeholder. The values are not
    /// validated here; a bad URL or key surfaces when the first request fails.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint_with_env(
            std::env::var(URL_ENV_VAR).ok(),
            std::env::var(ANON_KEY_ENV_VAR).ok(),
        )
    }

    /// Resolves the endpoint with explicitly supplied environment values.
    pub fn endpoint_with_env(&self, env_url: Option<String>, env_key: Option<String>) -> Endpoint {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let url = non_empty(env_url)
            .or_else(|| self.backend.effective_url().map(str::to_string))
            .unwrap_or_else(|| Endpoint::UNREACHABLE_URL.to_string());
        let anon_key = non_empty(env_key)
            .or_else(|| self.backend.effective_anon_key().map(str::to_string))
            .unwrap_or_else(|| Endpoint::PLACEHOLDER_ANON_KEY.to_string());

        Endpoint { url, anon_key }
    }

    /// Saves only the `setup_completed` flag to the config file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or written.
    pub fn save_setup_completed(completed: bool) -> Result<()> {
        Self::save_setup_completed_to(&paths::config_path(), completed)
    }

    /// Saves only the `setup_completed` flag to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or written.
    pub fn save_setup_completed_to(path: &Path, completed: bool) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["setup_completed"] = value(completed);

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Used by `xtask update-default-config` to keep `default_config.toml`
    /// in sync with `Config::default()`.
    ///
    /// # Errors
    /// Returns an error if serialization or template parsing fails.
    pub fn generate() -> Result<String> {
        use toml_edit::DocumentMut;

        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;

        let mut doc: DocumentMut = default_config_template()
            .parse()
            .context("Failed to parse default config template")?;
        let generated_doc: DocumentMut = generated_toml
            .parse()
            .context("Failed to parse generated config")?;

        merge_items(doc.as_table_mut(), generated_doc.as_table());

        Ok(doc.to_string())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Self::DEFAULT_LOG_LEVEL.to_string(),
            setup_completed: false,
            backend: BackendConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(!config.setup_completed);
        assert_eq!(config.ui.list_limit, 50);
        assert!(config.backend.url.is_none());
    }

    #[test]
    fn test_load_partial_config_merges_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        fs::write(
            &config_path,
            "[backend]\nurl = \"https://demo.example.co\"\n",
        )
        .unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert_eq!(
            config.backend.effective_url(),
            Some("https://demo.example.co")
        );
        assert_eq!(config.log_level, "info");
        assert_eq!(config.ui.list_limit, 50);
    }

    #[test]
    fn test_init_creates_config_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("subdir").join("config.toml");

        Config::init(&config_path).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("log_level = \"info\""));
        assert!(contents.contains("# url ="));
    }

    #[test]
    fn test_init_fails_if_exists() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "").unwrap();

        assert!(Config::init(&config_path).is_err());
    }

    #[test]
    fn test_endpoint_env_wins_over_config() {
        let config = Config {
            backend: BackendConfig {
                url: Some("https://from-config.example.co".to_string()),
                anon_key: Some("config-key".to_string()),
            },
            ..Default::default()
        };

        let endpoint = config.endpoint_with_env(
            Some("https://from-env.example.co".to_string()),
            Some("  ".to_string()),
        );
        assert_eq!(endpoint.url, "https://from-env.example.co");
        assert_eq!(endpoint.anon_key, "config-key");
    }

    #[test]
    fn test_endpoint_missing_values_fall_back_to_placeholder() {
        let endpoint = Config::default().endpoint_with_env(None, None);
        assert_eq!(endpoint.url, Endpoint::UNREACHABLE_URL);
        assert_eq!(endpoint.anon_key, Endpoint::PLACEHOLDER_ANON_KEY);
    }

    #[test]
    fn test_save_setup_completed_creates_file_with_template() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");

        Config::save_setup_completed_to(&config_path, true).unwrap();

        let contents = fs::read_to_string(&config_path).unwrap();
        assert!(contents.contains("setup_completed = true"));
        assert!(contents.contains("# Service URL and anonymous API key."));
    }

    #[test]
    fn test_save_setup_completed_preserves_other_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "log_level = \"debug\"\n\n[backend]\nanon_key = \"abc\"\n",
        )
        .unwrap();

        Config::save_setup_completed_to(&config_path, true).unwrap();

        let config = Config::load_from(&config_path).unwrap();
        assert!(config.setup_completed);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.backend.effective_anon_key(), Some("abc"));
    }

    #[test]
    fn test_generate_matches_defaults() {
        let generated = Config::generate().unwrap();
        let parsed: Config = toml::from_str(&generated).unwrap();
        assert_eq!(parsed.log_level, "info");
        assert!(!parsed.setup_completed);
        assert_eq!(parsed.ui.list_limit, 50);
    }
}

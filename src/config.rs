use crate::errors::{CliError, CliResult};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_ENV: &str = "BERTH_CONFIG";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Client settings stored in the user's config directory.
///
/// ```toml
/// ps_format = "{{Id}}\t{{Image}}"
///
/// [http_headers]
/// X-Meta-Team = "infra"
///
/// [auths."registry.example.com"]
/// username = "deploy"
/// auth = "ZGVwbG95OnNlY3JldA=="
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default `--format` for `container list`
    pub ps_format: Option<String>,
    /// Extra headers sent with every daemon request
    pub http_headers: BTreeMap<String, String>,
    pub auths: BTreeMap<String, AuthEntry>,
}

/// Stored credentials for one registry. Opaque to the client core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthEntry {
    pub username: Option<String>,
    pub auth: Option<String>,
    pub email: Option<String>,
}

/// Loads and saves [`ClientConfig`].
///
/// The config directory is, in order: an explicit path, `$BERTH_CONFIG`, then
/// `~/.berth`. A missing file yields the default configuration; the client
/// never creates one on its own.
pub struct ConfigManager {
    config_path: PathBuf,
    config: ClientConfig,
}

impl ConfigManager {
    /// Load configuration from `config_dir` or the default location
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// file exists but cannot be read or parsed.
    pub fn load(config_dir: Option<PathBuf>) -> CliResult<Self> {
        let config_path = Self::get_config_path(config_dir)?;
        let config = Self::load_file(&config_path)?;
        Ok(Self {
            config_path,
            config,
        })
    }

    pub fn get_config_dir(config_dir: Option<PathBuf>) -> CliResult<PathBuf> {
        if let Some(dir) = config_dir {
            return Ok(dir);
        }
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        let base_dirs =
            BaseDirs::new().ok_or_else(|| CliError::config("Failed to get base directories"))?;
        Ok(base_dirs.home_dir().join(".berth"))
    }

    pub fn get_config_path(config_dir: Option<PathBuf>) -> CliResult<PathBuf> {
        Ok(Self::get_config_dir(config_dir)?.join(CONFIG_FILE_NAME))
    }

    fn load_file(path: &Path) -> CliResult<ClientConfig> {
        if !path.exists() {
            return Ok(ClientConfig::default());
        }
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::io_with_source(path, "read config file", e))?;
        toml::from_str(&content).map_err(|e| {
            CliError::config_with_source(format!("failed to parse {}", path.display()), e)
        })
    }

    /// Write the configuration back, creating the directory if needed
    pub fn save(&self) -> CliResult<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| CliError::io_with_source(dir, "create config directory", e))?;
        }
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| CliError::config_with_source("Failed to serialize config", e))?;
        fs::write(&self.config_path, content)
            .map_err(|e| CliError::io_with_source(&self.config_path, "write config file", e))?;
        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    pub fn into_config(self) -> ClientConfig {
        self.config
    }
}

//! Configuration file support for the visitor log.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/visitlog/config.toml`.

use crate::{Error, ExitPolicy, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub visits: VisitsConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_file_name")]
    pub file_name: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: default_file_name(),
        }
    }
}

/// Reconciliation and reporting parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisitsConfig {
    #[serde(default)]
    pub exit_policy: ExitPolicy,

    #[serde(default = "default_top_companies")]
    pub top_companies: usize,

    #[serde(default = "default_latest_records")]
    pub latest_records: usize,
}

impl Default for VisitsConfig {
    fn default() -> Self {
        Self {
            exit_policy: ExitPolicy::default(),
            top_companies: default_top_companies(),
            latest_records: default_latest_records(),
        }
    }
}

/// HTTP front end configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {:?}: {}", self.bind, e)))
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    match dirs::data_local_dir() {
        Some(base) => base.join("visitlog"),
        None => PathBuf::from("."),
    }
}

fn default_file_name() -> String {
    "dados_acesso.csv".into()
}

fn default_top_companies() -> usize {
    10
}

fn default_latest_records() -> usize {
    10
}

fn default_bind() -> String {
    "0.0.0.0:5000".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            config_path => {
                tracing::info!(
                    "No config file found at {:?}, using defaults",
                    config_path
                );
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("visitlog").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Path of the visitor log file inside the given data directory
    pub fn store_path_in(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.data.file_name)
    }

    /// Path of the visitor log file in the configured data directory
    pub fn store_path(&self) -> PathBuf {
        self.store_path_in(&self.data.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.file_name, "dados_acesso.csv");
        assert_eq!(config.visits.exit_policy, ExitPolicy::CloseAll);
        assert_eq!(config.visits.top_companies, 10);
        assert_eq!(config.visits.latest_records, 10);
        assert!(config.server.bind_addr().is_ok());
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.visits.exit_policy = ExitPolicy::CloseMostRecent;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.visits.exit_policy, ExitPolicy::CloseMostRecent);
        assert_eq!(loaded.data.data_dir, config.data.data_dir);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[visits]
exit_policy = "close_most_recent"

[data]
data_dir = "/srv/portaria"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.visits.exit_policy, ExitPolicy::CloseMostRecent);
        assert_eq!(config.visits.top_companies, 10); // default
        assert_eq!(
            config.store_path(),
            PathBuf::from("/srv/portaria/dados_acesso.csv")
        );
    }

    #[test]
    fn test_invalid_bind_address() {
        let server = ServerConfig {
            bind: "not an address".into(),
        };
        assert!(matches!(server.bind_addr(), Err(Error::Config(_))));
    }
}

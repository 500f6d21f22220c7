//! On-disk configuration: servers, throttling defaults, log level.
//!
//! Loaded from `~/.config/nzbmount/config.toml`; a default file is written on
//! first run. Runtime state (mounted jobs, counters) is never persisted —
//! only what the user configured.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::EngineLogLevel;
use crate::model::server::ServerSettings;
use crate::model::throttle::ThrottlingSettings;

/// Errors from loading or seeding the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config directory lookup failed: {0}")]
    Xdg(#[from] xdg::BaseDirectoriesError),
    #[error("config file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Global configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NzbMountConfig {
    /// Directory the engine exposes mounted archives under.
    pub mount_dir: Option<PathBuf>,
    /// Engine log verbosity.
    pub log_level: EngineLogLevel,
    /// Configured news servers, connected in order at startup.
    #[serde(rename = "server")]
    pub servers: Vec<ServerSettings>,
    /// Throttling defaults pushed to the engine at startup.
    pub throttling: ThrottlingSettings,
}

impl Default for NzbMountConfig {
    fn default() -> Self {
        Self {
            mount_dir: None,
            log_level: EngineLogLevel::Warning,
            servers: Vec::new(),
            throttling: ThrottlingSettings::default(),
        }
    }
}

/// Path of the config file under the XDG config home.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let dirs = xdg::BaseDirectories::with_prefix("nzbmount")?;
    Ok(dirs.get_config_home().join("config.toml"))
}

/// Load the configuration, writing a default file on first run.
pub fn load_or_init() -> Result<NzbMountConfig, ConfigError> {
    let path = config_path()?;
    load_or_init_at(path)
}

fn load_or_init_at(path: PathBuf) -> Result<NzbMountConfig, ConfigError> {
    if !path.exists() {
        let default_cfg = NzbMountConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: NzbMountConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::server::Encryption;
    use crate::model::throttle::ThrottlingMode;
    use crate::model::units::DataRateUnit;

    #[test]
    fn default_config_values() {
        let cfg = NzbMountConfig::default();
        assert_eq!(cfg.log_level, EngineLogLevel::Warning);
        assert!(cfg.servers.is_empty());
        assert_eq!(cfg.throttling.mode, ThrottlingMode::Adaptive);
        assert_eq!(cfg.throttling.speed_limit_unit, DataRateUnit::Unlimited);
    }

    #[test]
    fn config_toml_roundtrip() {
        let mut cfg = NzbMountConfig::default();
        cfg.servers.push(ServerSettings {
            host: "news.example.org".into(),
            username: "alice".into(),
            password: "secret".into(),
            port: 563,
            connections: 8,
            encryption: Encryption::Ssl,
        });
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: NzbMountConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.servers, cfg.servers);
        assert_eq!(parsed.log_level, cfg.log_level);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            log_level = "debug"

            [[server]]
            host = "news.example.org"
            port = 119
            connections = 2

            [throttling]
            mode = "constant"
            speed_limit = 5
            speed_limit_unit = "mib_s"
        "#;
        let cfg: NzbMountConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.log_level, EngineLogLevel::Debug);
        assert_eq!(cfg.servers.len(), 1);
        assert_eq!(cfg.servers[0].connections, 2);
        // Omitted server fields take defaults.
        assert_eq!(cfg.servers[0].encryption, Encryption::None);
        assert_eq!(cfg.throttling.mode, ThrottlingMode::Constant);
        assert_eq!(cfg.throttling.speed_limit, 5);
    }

    #[test]
    fn load_or_init_seeds_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let cfg = load_or_init_at(path.clone()).unwrap();
        assert!(path.exists());
        assert!(cfg.servers.is_empty());

        // Second load reads the seeded file back.
        let again = load_or_init_at(path).unwrap();
        assert_eq!(again.log_level, cfg.log_level);
    }
}

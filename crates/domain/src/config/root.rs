use serde::{Deserialize, Serialize};

use super::engine::EngineConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;

const LOCAL_CONFIG_PATH: &str = "ferrous-arp.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/ferrous-arp/config.toml";

/// Main configuration structure for the ARP engine
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ArpConfig {
    /// Cache timing and capacity
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ArpConfig {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-arp.toml in current directory
    /// 3. /etc/ferrous-arp/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let config = if let Some(path) = path {
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_string(), e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation(
                "logging.level cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::logging::LoggingConfig;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub model: ModelConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub headless: bool,
    pub navigation_timeout_seconds: u64,
    /// Extra wait after navigation so the page framework finishes hydrating.
    pub settle_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Ordered feature-column list the model was trained against.
    pub features_path: PathBuf,
    /// Names of the categorical columns within the feature list.
    pub categorical_path: PathBuf,
    /// Serialized regression model artifact.
    pub model_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Listing URLs must resolve to one of these domains (or a subdomain).
    pub allowed_domains: Vec<String>,
    pub allowed_schemes: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8000,
                enable_cors: true,
            },
            browser: BrowserConfig {
                headless: true,
                navigation_timeout_seconds: 60,
                settle_delay_ms: 3000,
            },
            model: ModelConfig {
                features_path: PathBuf::from("artifacts/model_features.json"),
                categorical_path: PathBuf::from("artifacts/categorical_features.json"),
                model_path: PathBuf::from("artifacts/price_model.json"),
            },
            security: SecurityConfig {
                allowed_domains: vec!["cian.ru".to_string(), "samolet.ru".to_string()],
                allowed_schemes: vec!["http".to_string(), "https".to_string()],
            },
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults
    pub async fn load() -> Result<Self> {
        let config_path = get_config_path();

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            info!("No configuration file found, using defaults");
            let mut config = Self::default();
            ConfigOverrides::apply(&mut config);
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub async fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let mut config: AppConfig = toml::from_str(&content)?;

        ConfigOverrides::apply(&mut config);
        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow::anyhow!("Server port must be > 0"));
        }

        if self.browser.navigation_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("Browser navigation_timeout_seconds must be > 0"));
        }

        if self.security.allowed_domains.is_empty()
            || self.security.allowed_domains.iter().any(|d| d.trim().is_empty())
        {
            return Err(anyhow::anyhow!("Security allowed_domains must not be empty"));
        }

        if self.security.allowed_schemes.is_empty() {
            return Err(anyhow::anyhow!("At least one URL scheme must be allowed"));
        }

        Ok(())
    }
}

/// Get the configuration file path
fn get_config_path() -> PathBuf {
    directories::ProjectDirs::from("ru", "flatcast", "flatcast")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default().join("config.toml"))
}

/// Environment-based configuration overrides
pub struct ConfigOverrides;

impl ConfigOverrides {
    /// Apply environment variable overrides to configuration
    pub fn apply(config: &mut AppConfig) {
        if let Ok(host) = std::env::var("FLATCAST_HOST") {
            config.server.host = host;
        }

        if let Ok(port_str) = std::env::var("FLATCAST_PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                config.server.port = port;
            }
        }

        if let Ok(model_dir) = std::env::var("FLATCAST_MODEL_DIR") {
            let dir = PathBuf::from(model_dir);
            config.model.features_path = dir.join("model_features.json");
            config.model.categorical_path = dir.join("categorical_features.json");
            config.model.model_path = dir.join("price_model.json");
        }

        if let Ok(domains) = std::env::var("FLATCAST_ALLOWED_DOMAINS") {
            config.security.allowed_domains = domains
                .split(',')
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect();
        }

        if let Ok(log_level) = std::env::var("FLATCAST_LOG_LEVEL") {
            config.logging.level = log_level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.security.allowed_domains.contains(&"cian.ru".to_string()));
        assert!(config.security.allowed_domains.contains(&"samolet.ru".to_string()));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.security.allowed_domains = vec!["  ".to_string()];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.security.allowed_domains.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.security.allowed_schemes.clear();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let toml_text = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(toml_text.as_bytes()).unwrap();

        let config = AppConfig::load_from_file(file.path()).await.unwrap();
        assert_eq!(config.server.port, AppConfig::default().server.port);
    }
}

//! Service Configuration

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing::Level;

/// Top-level service configuration
///
/// Layered from built-in defaults, an optional TOML file and `BASALT__*`
/// environment variables (e.g. `BASALT__SERVER__BIND_ADDR`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
}

/// Reference data and classifier settings
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Quantile boundary artifact (JSON)
    pub quantiles_path: String,
    /// Serve predictions from the rule-based mock classifier
    pub mock_classifier: bool,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0:8080".to_string(),
            },
            model: ModelConfig {
                quantiles_path: "model/saved_quantiles.json".to_string(),
                mock_classifier: false,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl LoggingConfig {
    /// Parsed max level; unknown names are a configuration error
    pub fn max_level(&self) -> Result<Level, ConfigError> {
        self.level.parse::<Level>().map_err(|_| {
            ConfigError::Message(format!(
                "invalid logging.level {:?}, expected trace, debug, info, warn or error",
                self.level
            ))
        })
    }
}

impl AppConfig {
    /// Load configuration, reading `path` if given or `basalt.toml` if present
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Config::builder()
            .set_default("server.bind_addr", defaults.server.bind_addr)?
            .set_default("model.quantiles_path", defaults.model.quantiles_path)?
            .set_default("model.mock_classifier", defaults.model.mock_classifier)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.json", defaults.logging.json)?
            .add_source(File::with_name(path.unwrap_or("basalt")).required(path.is_some()))
            .add_source(
                Environment::with_prefix("BASALT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Self>()
            .and_then(|config| {
                config.logging.max_level()?;
                Ok(config)
            })
    }
}

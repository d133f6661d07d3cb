//! Configuration management for the climate API server
//!
//! Settings are layered: built-in defaults, then an optional configuration
//! file, then `CLIMATE_*` environment variables. Command line flags are applied
//! on top by the binary.

use crate::error::{ClimateError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix, e.g. `CLIMATE_DATABASE__URL`
pub const ENV_PREFIX: &str = "CLIMATE";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Storage configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// HTTP listener configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SQLite storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://Resources/hawaii.sqlite")
    pub url: String,

    /// Maximum pooled read connections
    pub max_connections: u32,

    /// How long a request waits for a pooled connection
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,

    /// Check the station/measurement tables at start-up
    pub validate_schema: bool,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Bind address
    pub host: String,

    /// Bind port
    pub port: u16,

    /// Enable permissive CORS
    pub enable_cors: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Emit JSON lines instead of compact text
    pub json_format: bool,

    /// Optional log file, rotated daily
    pub file: Option<PathBuf>,

    /// Include thread IDs in every line
    pub thread_ids: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://Resources/hawaii.sqlite".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            validate_schema: true,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            enable_cors: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file: None,
            thread_ids: false,
        }
    }
}

impl HttpConfig {
    /// `host:port` string the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ServerConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            if !path.exists() {
                return Err(ClimateError::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(ClimateError::config("Database URL cannot be empty"));
        }

        if self.database.max_connections == 0 {
            return Err(ClimateError::config(
                "Database max_connections must be greater than zero",
            ));
        }

        if self.database.acquire_timeout.is_zero() {
            return Err(ClimateError::config(
                "Database acquire_timeout must be greater than zero",
            ));
        }

        if self.http.port == 0 {
            return Err(ClimateError::config("HTTP port must be greater than zero"));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ClimateError::config(format!(
                    "Invalid log level: {other}. Use trace, debug, info, warn or error"
                )));
            }
        }

        Ok(())
    }
}

//! Logging setup
//!
//! Builds the global `tracing` subscriber from [`LoggingConfig`]:
//! - stderr output, compact text or JSON lines
//! - optional daily-rotated log file
//! - `RUST_LOG` overrides the configured level

use crate::config::LoggingConfig;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Resolved logging options
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level when `RUST_LOG` is not set
    pub level: Level,

    /// Log to file
    pub file_path: Option<PathBuf>,

    /// Emit JSON lines
    pub json: bool,

    /// Include thread IDs
    pub thread_ids: bool,
}

impl LogConfig {
    /// Resolve options from the server's logging section
    pub fn from_config(config: &LoggingConfig, debug: bool) -> Self {
        let level = if debug {
            Level::DEBUG
        } else {
            parse_level(&config.level).unwrap_or(Level::INFO)
        };

        Self {
            level,
            file_path: config.file.clone(),
            json: config.json_format,
            thread_ids: config.thread_ids,
        }
    }
}

fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Initialize logging with the given configuration
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    let mut layers: Vec<BoxedLayer> = Vec::new();

    layers.push(if config.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_thread_ids(config.thread_ids)
            .boxed()
    } else {
        fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(config.thread_ids)
            .boxed()
    });

    if let Some(file_path) = config.file_path {
        let directory = file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));
        std::fs::create_dir_all(directory)?;

        let file_appender = tracing_appender::rolling::daily(
            directory,
            file_path
                .file_name()
                .unwrap_or_else(|| std::ffi::OsStr::new("climate-api.log")),
        );

        layers.push(if config.json {
            fmt::layer()
                .json()
                .with_writer(file_appender)
                .with_ansi(false)
                .boxed()
        } else {
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .boxed()
        });
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

//! Climate API server - Main Entry Point
//!
//! Two commands are available:
//! - `serve`: run the HTTP API over the configured SQLite dataset
//! - `check`: open the dataset, validate it and print a short summary

use climate_api::{
    http_transport::HttpTransportServer,
    log_structured_error,
    logging::{init_logging, LogConfig},
    storage::SqliteClimateStore,
    ClimateError, ClimateService, ClimateStore, Result, ServerConfig,
};

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Climate API Configuration
#[derive(Parser, Debug)]
#[command(name = "climate-api")]
#[command(about = "Read-only HTTP API over a weather-station dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Config {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, global = true, env = "CLIMATE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// SQLite database URL
    #[arg(long, global = true, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable CORS (permissive mode)
        #[arg(long)]
        enable_cors: bool,
    },
    /// Validate the dataset and print a summary
    Check,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Serve { .. } => "serve",
            Command::Check => "check",
        }
    }
}

impl Config {
    /// Resolve the server configuration with command line overrides applied
    fn server_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref())?;

        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }

        if let Command::Serve {
            host,
            port,
            enable_cors,
        } = &self.command
        {
            if let Some(host) = host {
                config.http.host = host.clone();
            }
            if let Some(port) = port {
                config.http.port = *port;
            }
            if *enable_cors {
                config.http.enable_cors = true;
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Config::parse();
    let config = cli.server_config()?;

    init_logging(LogConfig::from_config(&config.logging, cli.debug))
        .map_err(|e| ClimateError::internal(format!("Failed to initialize logging: {e}")))?;

    info!("🌺 Starting climate API v{}", env!("CARGO_PKG_VERSION"));

    let store = match SqliteClimateStore::connect(&config.database).await {
        Ok(store) => store,
        Err(e) => {
            log_structured_error!(e, "main", "open_dataset");
            return Err(e);
        }
    };

    let result = match &cli.command {
        Command::Serve { .. } => run_server(store.clone(), &config).await,
        Command::Check => run_check(&store).await,
    };

    if let Err(e) = &result {
        log_structured_error!(e, "main", cli.command.name());
    }

    store.close().await;
    result
}

async fn run_server(store: SqliteClimateStore, config: &ServerConfig) -> Result<()> {
    let service = ClimateService::new(Arc::new(store));
    let server = HttpTransportServer::new(service, config.http.clone());
    server.start().await
}

async fn run_check(store: &SqliteClimateStore) -> Result<()> {
    if !store.health_check().await? {
        return Err(ClimateError::storage_unavailable(
            "Dataset did not answer the health check",
        ));
    }

    let stations = store.list_stations().await?;
    let max_date = store.max_date().await?;
    let most_active = store.most_active_station().await?;

    println!("Stations:            {}", stations.len());
    println!("Most recent date:    {max_date}");
    println!("Most active station: {most_active}");

    info!("✅ Dataset check passed");
    Ok(())
}

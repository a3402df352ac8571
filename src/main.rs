use anyhow::{Context, Result};
use clap::Parser;
use jellyroll::config::{default_config_path, ConfigStore};
use jellyroll::http::HttpClient;
use jellyroll::server::{start_server, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "0.0.0.0:8080", env = "JELLYROLL_BIND")]
    bind: SocketAddr,

    /// Path to configuration file
    #[arg(short, long, env = "JELLYROLL_CONFIG")]
    config: Option<PathBuf>,

    /// Directory served under /static
    #[arg(long, default_value = "static", env = "JELLYROLL_STATIC_DIR")]
    static_dir: PathBuf,

    /// Timeout for Jellyfin requests, in seconds
    #[arg(long, default_value_t = 30, env = "JELLYROLL_TIMEOUT_SECS")]
    timeout_secs: u64,

    /// Log level
    #[arg(short, long, default_value = "info", env = "JELLYROLL_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .init();

    info!("Starting Jellyroll v{}", env!("CARGO_PKG_VERSION"));

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = ConfigStore::open(&config_path);
    info!("Using configuration file: {}", config.path().display());

    let http_client = HttpClient::new(Duration::from_secs(cli.timeout_secs))
        .context("Failed to create HTTP client")?;

    let state = AppState::new(config, http_client);
    start_server(cli.bind, state, cli.static_dir).await
}

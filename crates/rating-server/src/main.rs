//! Rating Server
//!
//! Serves chess sessions, game analysis and the player leaderboard over HTTP.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rating_server::config::ServerConfig;
use rating_server::{db, router, AppState};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rating-server", version, about)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value_os_t = ServerConfig::default_path())]
    config: PathBuf,

    /// SQLite database file, overriding the configuration.
    #[arg(long)]
    db: Option<PathBuf>,

    /// Port to listen on, overriding the configuration.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(db) = args.db {
        config.database = db;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    if let Some(dir) = config.database.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating data directory {}", dir.display()))?;
    }

    let pool = db::init_db(&config.database)
        .with_context(|| format!("opening database {}", config.database.display()))?;
    let state = AppState::new(pool, config.autoplay_delay());
    let app = router(state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

//! `clubgest` server binary.
//!
//! # Responsibility
//! - Load YAML config, start logging and open the database.
//! - Serve HTTP until Ctrl-C, then close the database explicitly.

use anyhow::{Context, Result};
use clap::Parser;
use clubgest_core::db::open_db;
use clubgest_core::init_logging;
use clubgest_server::{serve, AppState, ServerConfig, DEFAULT_CONFIG_PATH};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;

const CLOSE_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Parser)]
#[command(name = "clubgest", version, about = "Training attendance server for a sports club")]
struct Cli {
    /// YAML configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Overrides `port` from the configuration file.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ServerConfig::from_file(&cli.config)
        .with_context(|| format!("loading config from `{}`", cli.config.display()))?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let log_dir = config.log.dir.to_string_lossy().into_owned();
    init_logging(&config.log.level, &log_dir, config.log.stderr)
        .map_err(anyhow::Error::msg)
        .context("initializing logging")?;
    info!(
        "event=app_start module=cli status=ok version={} config={}",
        clubgest_core::core_version(),
        cli.config.display()
    );

    if let Some(parent) = config.db.filename.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating database directory `{}`", parent.display()))?;
    }
    let conn = open_db(&config.db.filename)
        .with_context(|| format!("opening database `{}`", config.db.filename.display()))?;
    let state = AppState::new(conn, config.request_timeout());

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    serve(listener, state.clone(), shutdown_signal()).await?;

    if let Err(err) = state.close_when_idle(CLOSE_GRACE).await {
        warn!(
            "event=db_close module=cli status=error error={err} detail=connection_closes_when_last_storage_task_drops_it"
        );
    }
    info!("event=app_stop module=cli status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=signal_listen module=cli status=error error={err}");
        std::future::pending::<()>().await;
    }
}

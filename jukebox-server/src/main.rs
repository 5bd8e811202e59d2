//! Jukebox server - main entry point
//!
//! Serves playback control over HTTP and runs the auto-advance monitor until
//! Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use jukebox_common::config::{resolve_root_folder, JukeboxConfig, ROOT_FOLDER_ENV};
use jukebox_common::db::init_database;
use jukebox_common::events::EventBus;
use jukebox_server::api::{self, AppContext};
use jukebox_server::playback::{
    AutoAdvanceMonitor, HostKeepAwake, KeepAwake, MonitorSettings, NoopKeepAwake,
    PlaybackSupervisor,
};
use jukebox_server::player::{MpvPlayer, MpvSettings, PlayerControl};
use jukebox_server::PlaybackState;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for the jukebox server
#[derive(Parser, Debug)]
#[command(name = "jukebox")]
#[command(about = "Personal jukebox controller")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8000", env = "JUKEBOX_PORT")]
    port: u16,

    /// Root folder holding the database
    #[arg(short, long, env = "JUKEBOX_ROOT")]
    root_folder: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(short, long, env = "JUKEBOX_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "jukebox_server=debug,jukebox_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting jukebox v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let config = JukeboxConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), ROOT_FOLDER_ENV, &config);
    std::fs::create_dir_all(&root_folder)
        .with_context(|| format!("Failed to create root folder {}", root_folder.display()))?;
    info!("Root folder: {}", root_folder.display());

    let db_path = config.database_path(&root_folder);
    let db = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    info!("Database ready: {}", db_path.display());

    let player: Arc<dyn PlayerControl> = Arc::new(MpvPlayer::new(MpvSettings::from_config(&config)));
    let events = Arc::new(EventBus::default());
    let supervisor = Arc::new(PlaybackSupervisor::new(
        db.clone(),
        Arc::clone(&player),
        events,
        PlaybackState::new(config.default_device.clone(), config.default_volume),
    ));

    let keep_awake: Box<dyn KeepAwake> = if config.keep_awake {
        Box::new(HostKeepAwake::new())
    } else {
        info!("Keep-awake disabled by configuration");
        Box::new(NoopKeepAwake)
    };

    let monitor = AutoAdvanceMonitor::new(
        Arc::clone(&supervisor),
        Arc::clone(&player),
        keep_awake,
        MonitorSettings {
            poll_interval: config.poll_interval(),
            confirm_delay: config.confirm_delay(),
            keep_awake_grace: config.keep_awake_grace(),
        },
    );
    let cancel = CancellationToken::new();
    let monitor_handle = tokio::spawn(monitor.run(cancel.clone()));

    let ip = config
        .bind_addr
        .parse()
        .with_context(|| format!("Invalid bind_addr '{}'", config.bind_addr))?;
    let addr = SocketAddr::new(ip, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let ctx = AppContext {
        supervisor: Arc::clone(&supervisor),
        mpv_path: config.mpv_path.clone(),
    };
    let served = api::run(listener, ctx, shutdown_signal()).await;

    cancel.cancel();
    if let Err(e) = monitor_handle.await {
        warn!("Monitor task ended abnormally: {}", e);
    }
    if let Err(e) = supervisor.stop().await {
        warn!("Failed to stop player on shutdown: {}", e);
    }
    db.close().await;

    served.context("Server error")?;
    info!("Shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

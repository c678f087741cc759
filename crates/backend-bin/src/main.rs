use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use elearn_backend_lib::{
    cache::MemoryCache, config::Settings, create_router, mail::LogMailer,
    storage::FlatFileUserStore, AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Auth and session server for the e-learning platform
#[derive(Parser, Debug)]
#[command(name = "elearn-server", version, about)]
struct Args {
    /// Configuration file (defaults to ./config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn init_tracing(settings: &Settings) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.to_lowercase()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load configuration")?;
    if let Some(bind) = args.bind {
        settings.bind_addr = bind;
    }
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    settings.validate().context("invalid configuration")?;

    init_tracing(&settings);

    let store = FlatFileUserStore::new(&settings.data_dir)
        .with_context(|| format!("failed to open user store at {}", settings.data_dir.display()))?;

    let cache = MemoryCache::new();
    let cleanup = cache.spawn_cleanup(Duration::from_secs(settings.cache_cleanup_secs));

    let addr = settings.bind_addr;
    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(cache),
        Arc::new(LogMailer),
        settings,
    )?);

    let limiter = state.sessions.limiter().clone();
    let throttle_cleanup = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });

    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    // Peer addresses scope the login throttle
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    throttle_cleanup.abort();
    tracing::info!("server stopped");
    Ok(())
}

//! FounderOS API - Main Entry Point

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mimalloc::MiMalloc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use founderos_api::agent::spawn_cycle_loop;
use founderos_api::config::{AppConfig, LoggingConfig};
use founderos_api::server::create_app;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Command-line arguments. Unset values fall back to configuration.
#[derive(Parser, Debug)]
#[command(name = "founderos-api")]
#[command(about = "FounderOS API - ambient agent, chat relay and competitor scanning")]
#[command(version)]
struct Args {
    /// Host to bind to.
    #[arg(long, env = "FOUNDEROS_API_HOST")]
    host: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "FOUNDEROS_API_PORT")]
    port: Option<u16>,

    /// Log filter, e.g. `info` or `founderos_api=debug`.
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Config file path.
    #[arg(short, long, env = "FOUNDEROS_API_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load_from(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(args.log_level.as_deref(), &config.logging);
    tracing::info!("Starting FounderOS API v{}", env!("CARGO_PKG_VERSION"));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let cycle_interval = config.agent.cycle_interval_secs;
    let (app, state) = create_app(config)?;

    let shutdown = CancellationToken::new();
    let cycle_loop = (cycle_interval > 0).then(|| {
        spawn_cycle_loop(
            state.agent.clone(),
            Duration::from_secs(cycle_interval),
            shutdown.clone(),
        )
    });
    if cycle_loop.is_none() {
        tracing::info!("Background cycles disabled, use execute_cycle to run tasks");
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await?;

    shutdown.cancel();
    if let Some(handle) = cycle_loop {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Cycle loop ended abnormally");
        }
    }

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Initialize tracing. `RUST_LOG`/`--log-level` wins over the configured level.
fn init_tracing(filter: Option<&str>, logging: &LoggingConfig) {
    let filter = EnvFilter::new(filter.unwrap_or(logging.level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}

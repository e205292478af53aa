//! routeplaned — the routeplane daemon.
//!
//! Assembles the state store, the backend registry, the configured router
//! driver and the REST API into one process.
//!
//! # Usage
//!
//! ```text
//! routeplaned serve --config /etc/routeplane/routeplaned.toml --port 8080
//! ```

mod config;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use config::DaemonConfig;
use routeplane_api::{ApiState, build_router};
use routeplane_router::{BackendRegistry, Dispatcher};
use routeplane_state::StateStore;

#[derive(Parser)]
#[command(name = "routeplaned", about = "routeplane daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the routing API.
    Serve {
        /// TOML configuration file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to listen on (overrides the config file).
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for persistent state (overrides the config file).
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,routeplaned=debug,routeplane=debug")
            }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            data_dir,
        } => {
            let config = DaemonConfig::load(config.as_deref(), port, data_dir)?;
            serve(config).await
        }
    }
}

async fn serve(config: DaemonConfig) -> anyhow::Result<()> {
    info!(driver = %config.router.driver, "routeplane daemon starting");

    std::fs::create_dir_all(&config.data_dir)?;
    let db_path = config.db_path();

    let store = StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");

    let registry = BackendRegistry::new(store.clone());
    let router = config.router.build(registry.clone())?;
    let dispatcher = Dispatcher::new(router);
    info!(capabilities = ?dispatcher.capabilities(), "router driver ready");

    let app = build_router(ApiState::new(dispatcher, registry, store));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("routeplane daemon stopped");
    Ok(())
}

//! Meshgate server: application entry point.
//!
//! Wires the SurrealDB-backed account and activity stores into the
//! account manager and runs until interrupted.

mod config;

use std::sync::Arc;

use clap::Parser;
use meshgate_account::{AccountManager, BroadcastPeersUpdater, StaticDnsDomain};
use meshgate_core::error::MeshError;
use meshgate_core::repository::ActivityStore;
use meshgate_db::{DbError, DbManager};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::config::Cli;

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error("invalid log filter: {0}")]
    LogFilter(#[from] ParseError),

    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("shutdown error: {0}")]
    Shutdown(#[from] MeshError),

    #[error("signal handler error: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("meshgate=info".parse()?))
        .json()
        .init();

    info!("Starting meshgate server...");

    let db = DbManager::connect(&cli.db_config()).await?;
    let peers = BroadcastPeersUpdater::new(cli.update_channel_capacity);
    let updates = tokio::spawn(log_network_map_updates(peers.clone()));

    let manager = Arc::new(AccountManager::new(
        db.account_store(),
        db.activity_store().await?,
        peers,
        StaticDnsDomain::new(cli.dns_domain.clone()),
        cli.manager_config(),
    ));

    info!(
        dns_domain = %cli.dns_domain,
        lock_timeout_secs = ?cli.lock_timeout_secs,
        "Account manager ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    updates.abort();
    manager.activity_store().close().await?;

    info!("Meshgate server stopped.");
    Ok(())
}

/// Stand-in consumer for peer connection handlers.
async fn log_network_map_updates(peers: BroadcastPeersUpdater) {
    let mut rx = peers.subscribe();
    loop {
        match rx.recv().await {
            Ok(update) => debug!(
                account_id = %update.account_id,
                serial = update.serial,
                peers = update.peer_ids.len(),
                "Network map update"
            ),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Network map subscriber lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

//! Discord ↔ Fluxer chat bridge.
//!
//! Relays messages between mapped Discord and Fluxer channels, with
//! per-mapping direction and formatting.

mod bridge;
mod common;
mod config;
mod discord;
mod fluxer;
mod format;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use bridge::{Bridge, RoutingTable};
use common::error::{ConfigError, EnvError};
use common::InboundMessage;
use config::env::{get_config_path, get_fluxer_api_url, load_secrets};
use config::{load_config, EXAMPLE_CONFIG};
use discord::DiscordBot;
use fluxer::{FluxerGateway, FluxerRest};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables take precedence
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "🚀 Starting Discord ↔ Fluxer Bridge v{}...",
        env!("CARGO_PKG_VERSION")
    );

    let secrets = load_secrets().map_err(|e| {
        let EnvError::Missing(names) = &e;
        error!("❌ Missing required environment variables:");
        for name in names {
            error!("   - {}", name);
        }
        e
    })?;

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_config(&config_path).map_err(|e| {
        error!("❌ {}", e);
        if matches!(e, ConfigError::NotFound { .. }) {
            error!(
                "   Create {} next to the bridge. Example:\n{}",
                config_path, EXAMPLE_CONFIG
            );
        }
        e
    })?;

    let routes = RoutingTable::build(&config.mappings);
    let (to_fluxer, to_discord) = routes.counts();
    info!(
        "Configuration loaded: {} mappings ({} routes to Fluxer, {} routes to Discord)",
        config.mappings.len(),
        to_fluxer,
        to_discord
    );
    debug!("Default formatting: {:?}", config.default_formatting);

    // ============================================================
    // Create channels for communication
    // ============================================================
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (discord_tx, discord_rx) = mpsc::unbounded_channel::<InboundMessage>();
    let (fluxer_tx, fluxer_rx) = mpsc::unbounded_channel::<InboundMessage>();

    // ============================================================
    // Create platform clients and the bridge
    // ============================================================
    let fluxer_rest = Arc::new(FluxerRest::new(
        get_fluxer_api_url(),
        secrets.fluxer_token.clone(),
    )?);

    let discord_bot = DiscordBot::build(
        secrets.discord_token,
        config.mappings.clone(),
        discord_tx,
        shutdown_rx.clone(),
    )
    .await?;

    let bridge = Arc::new(Bridge::new(
        routes,
        Arc::new(discord_bot.sink()),
        fluxer_rest.clone(),
    ));

    let fluxer_gateway = FluxerGateway::new(
        fluxer_rest,
        secrets.fluxer_token,
        fluxer_tx,
        shutdown_rx.clone(),
    );

    // ============================================================
    // Run everything
    // ============================================================
    let mut fluxer_task = tokio::spawn(fluxer_gateway.run());
    let mut discord_task = tokio::spawn(discord_bot.run());
    let mut bridge_task = tokio::spawn(bridge.run(discord_rx, fluxer_rx, shutdown_rx));

    // None when a signal asked us to stop, otherwise the task that ended
    let stopped = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("👋 Shutting down bridge...");
            None
        }
        _ = &mut discord_task => Some("Discord"),
        _ = &mut fluxer_task => Some("Fluxer"),
        _ = &mut bridge_task => Some("Bridge"),
    };

    // Signal every task to stop (fire-and-forget - receivers may already be gone)
    if let Err(e) = shutdown_tx.send(true) {
        debug!("Shutdown channel closed: {}", e);
    }

    if stopped.is_none() {
        let teardown = async { tokio::join!(discord_task, fluxer_task, bridge_task) };
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, teardown).await {
            Ok(_) => info!("All connections closed"),
            Err(_) => warn!("Shutdown timed out"),
        }
    }

    let status = exit_status(stopped);
    match &status {
        Ok(()) => info!("Exiting..."),
        Err(e) => error!("❌ {}", e),
    }
    status
}

/// Map how the run ended to the process result.
fn exit_status(stopped: Option<&'static str>) -> Result<()> {
    match stopped {
        None => Ok(()),
        Some(task) => Err(anyhow::anyhow!("{} task exited unexpectedly", task)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_exit_is_success() {
        assert!(exit_status(None).is_ok());
    }

    #[test]
    fn test_task_exit_is_failure() {
        let err = exit_status(Some("Fluxer")).unwrap_err();
        assert_eq!(err.to_string(), "Fluxer task exited unexpectedly");
    }
}

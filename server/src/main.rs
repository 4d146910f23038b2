//! Raffle Pay HTTP server.
//!
//! Raffle ticket reservations settled through the debit-OTP payment gateway.

use raffle_pay_core::environment::SystemClock;
use raffle_pay_server::{
    Config, build_app, build_services, install_metrics_recorder, spawn_registry_sweeper,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file (if present)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,raffle_pay=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Raffle Pay server");

    let config = Config::from_env()?;
    info!(
        gateway_url = %config.gateway.base_url,
        cors_origins = config.server.cors_allowed_origins.len(),
        registry_ttl_secs = ?config.registry.ttl_secs,
        "Configuration loaded"
    );

    let metrics = match install_metrics_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics recorder not installed, /metrics disabled");
            None
        }
    };

    let services = build_services(&config, Arc::new(SystemClock));

    let sweeper = config.registry.ttl_secs.map(|_| {
        spawn_registry_sweeper(
            Arc::clone(&services.registry),
            Duration::from_secs(config.registry.sweep_interval_secs),
        )
    });

    let app = build_app(&config, &services, metrics);

    let addr = config.bind_address();
    info!(address = %addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    info!("Server shut down");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}

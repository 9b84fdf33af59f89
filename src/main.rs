// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Router;
use rbac_gate::{api::router, config::Config, state::AppState, telemetry};
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        e
    })?;

    telemetry::init(config.log_format)?;

    info!(
        auth_domain = %config.auth_domain,
        audience = %config.api_audience,
        algorithms = ?config.algorithms,
        jwks_cache_ttl_secs = config.jwks_cache_ttl.as_secs(),
        "Configuration loaded"
    );

    let gate = config.auth_gate()?;

    // Warm the key cache; a failure here is not fatal, the first request retries.
    if let Err(e) = gate.jwks().refresh().await {
        error!(error = %e, "Initial JWKS fetch failed");
    }

    // The standalone binary serves health and docs only. Services embedding
    // the library pass their own `protect`ed resource router here.
    let app = router(AppState::new(gate), Router::new());

    let addr = config.bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "rbac-gate listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown"),
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGINT");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown");
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

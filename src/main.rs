//! Peercache - A distributed in-memory key-value cache server
//!
//! Every node runs this binary with the same peer list; the consistent
//! hash ring makes each node authoritative for its share of the keys.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use peercache::api::create_router;
use peercache::{AppState, Config, HttpPeerPool, Registry};

/// Main entry point for the peercache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the peer pool over the configured peer list
/// 4. Create the configured databases and wire them to the pool
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peercache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Peercache Server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: self_url={}, peers={}, databases={:?}, max_bytes={}",
        config.self_url,
        config.peers.len(),
        config.databases,
        config.max_bytes
    );

    // Build the peer pool once; the ring is immutable afterwards
    let mut peer_pool = HttpPeerPool::new(config.self_url.clone());
    if !config.peers.is_empty() {
        peer_pool.set_peers(config.peers.iter().cloned());
    }
    let peer_pool = Arc::new(peer_pool);

    // Create databases and wire each one to the shared peer pool
    let registry = Arc::new(Registry::new());
    for id in &config.databases {
        let db = registry.create(*id, config.max_bytes)?;
        db.register_peers(peer_pool.clone())?;
    }
    info!("{} database(s) initialized", registry.len());

    // Create router with all endpoints
    let state = AppState::new(registry);
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

//! Server startup and graceful shutdown

use anyhow::{Context, Result};
use axum::Router;
use memeforge_core::Config;
use std::io::ErrorKind;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Bind `host:start_port`, moving to the next port while the current one is taken.
///
/// Tries at most `attempts` consecutive ports. Errors other than `AddrInUse` are returned
/// immediately.
pub async fn bind_with_probe(host: &str, start_port: u16, attempts: u16) -> Result<TcpListener> {
    for offset in 0..attempts {
        let Some(port) = start_port.checked_add(offset) else {
            break;
        };

        match TcpListener::bind((host, port)).await {
            Ok(listener) => {
                if offset > 0 {
                    tracing::warn!(
                        requested_port = start_port,
                        port,
                        "Requested port in use, bound to the next free port"
                    );
                }
                return Ok(listener);
            }
            Err(e) if e.kind() == ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port in use, trying next");
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to bind {}:{}", host, port));
            }
        }
    }

    Err(anyhow::anyhow!(
        "No free port found in {} attempts starting at {}",
        attempts,
        start_port
    ))
}

/// Start the server with graceful shutdown
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let listener =
        bind_with_probe("0.0.0.0", config.server_port, config.port_probe_attempts).await?;
    let addr = listener.local_addr()?;

    tracing::info!(
        addr = %addr,
        max_upload_mb = config.max_upload_bytes / 1024 / 1024,
        extensions = %config.allowed_extensions.join(","),
        generate_limit_per_hour = config.generate_rate_limit_per_hour,
        cooldown_secs = config.cooldown_secs,
        "Server ready and accepting connections"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
///
/// A handler that cannot be installed is logged and that signal is ignored.
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
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_probe_skips_taken_port() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        let listener = bind_with_probe("127.0.0.1", taken_port, 10).await.unwrap();
        let bound_port = listener.local_addr().unwrap().port();
        assert_ne!(bound_port, taken_port);
        assert!(bound_port > taken_port);
    }

    #[tokio::test]
    async fn test_probe_gives_up() {
        let taken = TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let taken_port = taken.local_addr().unwrap().port();

        assert!(bind_with_probe("127.0.0.1", taken_port, 1).await.is_err());
    }
}

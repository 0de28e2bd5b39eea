//! Startup orchestration.
//!
//! Order: metrics, HTTP server (store, explorer client, verifier),
//! listener, background monitor, signal watcher. Any startup error is
//! fatal.

use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::config::GateConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::wait_for_shutdown_signal;
use crate::observability::metrics;
use crate::payments::monitor::PaymentMonitor;

/// Run the gate until a shutdown signal arrives.
pub async fn run(config: GateConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        explorer = %config.explorer.base_url,
        state_path = %config.storage.state_path,
        bundle = %config.bundle.directory,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let server = HttpServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();

    let monitor = PaymentMonitor::new(server.verifier(), config.payment.clone());
    let monitor_shutdown = shutdown.subscribe();
    let monitor_task = tokio::spawn(async move {
        monitor.run(monitor_shutdown).await;
    });

    let server_shutdown = shutdown.subscribe();
    let mut server_task = tokio::spawn(server.run(listener, server_shutdown));

    tokio::select! {
        _ = wait_for_shutdown_signal() => {
            shutdown.trigger("signal");
            server_task.await??;
        }
        result = &mut server_task => {
            shutdown.trigger("server exited");
            result??;
        }
    }
    if let Err(e) = monitor_task.await {
        tracing::error!(error = %e, "Payment monitor task failed");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Server command - run the file server.
//!
//! Loads configuration, prepares the storage directory, optionally starts the
//! Prometheus endpoint, and serves gRPC until Ctrl-C or SIGTERM. In-flight
//! calls are drained before the command returns.

use std::net::SocketAddr;
use std::sync::Arc;

use eyre::{Result, WrapErr};
use metrics_exporter_prometheus::PrometheusBuilder;
use stash_rpc_server::GrpcServer;
use stash_transfer::{DirStore, TransferService};
use tracing::info;

use crate::args::ServerArgs;
use crate::config::ServerConfig;

/// Run the server command.
pub async fn run(args: ServerArgs) -> Result<()> {
    info!("Starting Stash {}", env!("CARGO_PKG_VERSION"));

    let mut config = ServerConfig::load(args.config.as_deref())?;
    config.apply_args(&args);

    let transfer = config.transfer_config();
    transfer.validate()?;

    let store = DirStore::init(&transfer.storage_dir).await.wrap_err_with(|| {
        format!("failed to prepare storage directory {}", transfer.storage_dir.display())
    })?;
    info!(
        dir = %store.root().display(),
        transfer_capacity = transfer.transfer_capacity,
        list_capacity = transfer.list_capacity,
        chunk_size = transfer.chunk_size,
        "Storage ready"
    );

    // Metric handles bind to the recorder present when they are created, so
    // the exporter goes in before the transfer service.
    if config.metrics.enabled {
        install_metrics_exporter(config.metrics_socket_addr()?)?;
    }

    let transfers = TransferService::new(store, &transfer)?;

    let server = GrpcServer::new(config.grpc_socket_addr()?, transfers);
    let mut serving = tokio::spawn({
        let server = Arc::clone(&server);
        async move { server.start().await }
    });

    info!("Serving on {} (press Ctrl+C to stop)", server.address());

    tokio::select! {
        result = &mut serving => {
            // The server stopped on its own, most likely a bind failure.
            return result.wrap_err("gRPC server task failed")?;
        }
        signal = shutdown_signal() => {
            signal?;
            info!("Received shutdown signal");
        }
    }

    server.stop()?;
    serving.await.wrap_err("gRPC server task failed")??;

    info!("Server shutdown complete");
    Ok(())
}

fn install_metrics_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .wrap_err_with(|| format!("failed to start metrics endpoint on {addr}"))?;
    info!(%addr, "Metrics endpoint listening");
    Ok(())
}

/// Resolve on Ctrl-C, or on SIGTERM where supported.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await?;

    Ok(())
}
